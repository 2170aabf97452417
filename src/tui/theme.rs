// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::{Color, Modifier, Style};
use thiserror::Error;

pub(crate) const PALETTE_ENV: &str = "MERMAIDO_TUI_PALETTE";

/// Slot names of the palette CSV, in order.
const PALETTE_SLOTS: [&str; 18] = [
    "fg",
    "bg",
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright_black",
    "bright_red",
    "bright_green",
    "bright_yellow",
    "bright_blue",
    "bright_magenta",
    "bright_cyan",
    "bright_white",
];

const RED: usize = 1;
const GREEN: usize = 2;
const YELLOW: usize = 3;
const CYAN: usize = 6;
const BRIGHT_BLACK: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ThemeError {
    #[error("invalid env {name}=<non-unicode>")]
    NotUnicode { name: &'static str },
    #[error("invalid env {name}={value} ({reason})")]
    InvalidPalette { name: &'static str, value: String, reason: String },
}

/// Terminal colors, following the diagram's dark-mode setting unless a palette is forced.
#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    palette: Option<TuiPalette>,
    dark: bool,
}

impl TuiTheme {
    pub(crate) fn from_env(dark: bool) -> Result<Self, ThemeError> {
        let palette = match env::var(PALETTE_ENV) {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(TuiPalette::parse_csv(value.trim()).map_err(|reason| {
                ThemeError::InvalidPalette {
                    name: PALETTE_ENV,
                    value: value.trim().to_owned(),
                    reason,
                }
            })?),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ThemeError::NotUnicode { name: PALETTE_ENV })
            }
        };
        Ok(Self { palette, dark })
    }

    pub(crate) fn is_dark(&self) -> bool {
        self.dark
    }

    pub(crate) fn set_dark(&mut self, dark: bool) {
        self.dark = dark;
    }

    pub(crate) fn base_style(&self) -> Style {
        match (&self.palette, self.dark) {
            (Some(palette), _) => Style::default().fg(palette.fg).bg(palette.bg),
            (None, true) => Style::default().fg(Color::Gray).bg(Color::Black),
            (None, false) => Style::default().fg(Color::Black).bg(Color::White),
        }
    }

    fn ansi(&self, idx: usize) -> Color {
        if let Some(palette) = &self.palette {
            return palette.ansi[idx];
        }
        match (idx, self.dark) {
            (RED, true) => Color::LightRed,
            (RED, false) => Color::Red,
            (GREEN, true) => Color::LightGreen,
            (GREEN, false) => Color::Green,
            (YELLOW, _) => Color::Yellow,
            (CYAN, true) => Color::Cyan,
            (CYAN, false) => Color::Blue,
            _ => Color::DarkGray,
        }
    }

    pub(crate) fn border_style(&self) -> Style {
        self.base_style().fg(self.ansi(GREEN))
    }

    pub(crate) fn key_style(&self) -> Style {
        self.base_style().fg(self.ansi(CYAN)).add_modifier(Modifier::BOLD)
    }

    pub(crate) fn muted_style(&self) -> Style {
        self.base_style().fg(self.ansi(BRIGHT_BLACK))
    }

    pub(crate) fn error_style(&self) -> Style {
        self.base_style().fg(self.ansi(RED)).add_modifier(Modifier::BOLD)
    }

    /// Rows of the focused step.
    pub(crate) fn focus_style(&self) -> Style {
        self.base_style().fg(Color::Black).bg(self.ansi(YELLOW)).add_modifier(Modifier::BOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TuiPalette {
    fg: Color,
    bg: Color,
    ansi: [Color; 16],
}

impl TuiPalette {
    fn parse_csv(value: &str) -> Result<Self, String> {
        let parts = value.split(',').map(str::trim).collect::<Vec<_>>();
        if parts.len() != PALETTE_SLOTS.len() {
            return Err(format!(
                "expected {} comma-separated colors ({}), got {}",
                PALETTE_SLOTS.len(),
                PALETTE_SLOTS.join(","),
                parts.len()
            ));
        }

        let mut colors = [Color::Reset; 18];
        for ((slot, part), color) in PALETTE_SLOTS.iter().zip(&parts).zip(colors.iter_mut()) {
            *color = parse_color(part).map_err(|err| format!("{slot}: {err}"))?;
        }
        let mut ansi = [Color::Reset; 16];
        ansi.copy_from_slice(&colors[2..]);
        Ok(Self { fg: colors[0], bg: colors[1], ansi })
    }
}

/// Accepts `#RRGGBB`, `0xRRGGBB`, bare `RRGGBB` and X11 `rgb:RR/GG/BB` (2 or 4 digit channels).
fn parse_color(value: &str) -> Result<Color, String> {
    let lower = value.to_ascii_lowercase();
    if lower.is_empty() {
        return Err("empty color".to_owned());
    }

    if let Some(rest) = lower.strip_prefix("rgb:") {
        let channels =
            rest.split('/').map(parse_x11_channel).collect::<Result<Vec<_>, _>>()?;
        let [r, g, b] = channels.as_slice() else {
            return Err(format!("invalid rgb: value {value}"));
        };
        return Ok(Color::Rgb(*r, *g, *b));
    }

    let hex = lower.strip_prefix('#').or_else(|| lower.strip_prefix("0x")).unwrap_or(&lower);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("invalid hex color {value} (expected #RRGGBB)"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| format!("invalid hex color {value}"))
    };
    Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_x11_channel(value: &str) -> Result<u8, String> {
    let invalid = || format!("invalid rgb: component {value} (expected 2 or 4 hex digits)");
    match value.len() {
        2 => u8::from_str_radix(value, 16).map_err(|_| invalid()),
        4 => u16::from_str_radix(value, 16).map(|v| (v >> 8) as u8).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::{parse_color, TuiPalette, TuiTheme};

    const PALETTE: &str = "#111111,#222222,#000000,#ff0000,#00ff00,#ffff00,#0000ff,#ff00ff,#00ffff,#ffffff,#1a1a1a,#ff1111,#11ff11,#ffff11,#1111ff,#ff11ff,#11ffff,#fefefe";

    #[test]
    fn palette_csv_fills_every_slot() {
        let palette = TuiPalette::parse_csv(PALETTE).expect("palette");
        assert_eq!(palette.fg, Color::Rgb(0x11, 0x11, 0x11));
        assert_eq!(palette.bg, Color::Rgb(0x22, 0x22, 0x22));
        assert_eq!(palette.ansi[1], Color::Rgb(0xff, 0, 0));
        assert_eq!(palette.ansi[15], Color::Rgb(0xfe, 0xfe, 0xfe));
    }

    #[test]
    fn palette_csv_reports_count_and_slot() {
        assert!(TuiPalette::parse_csv("nope").unwrap_err().contains("expected 18"));
        let bad_bg = PALETTE.replacen("#222222", "#22", 1);
        assert!(TuiPalette::parse_csv(&bad_bg).unwrap_err().starts_with("bg:"));
    }

    #[test]
    fn colors_accept_hex_and_x11_forms() {
        assert_eq!(parse_color("0xA0B0C0"), Ok(Color::Rgb(0xa0, 0xb0, 0xc0)));
        assert_eq!(parse_color("rgb:ff/80/00"), Ok(Color::Rgb(0xff, 0x80, 0)));
        assert_eq!(parse_color("rgb:ffff/8000/0000"), Ok(Color::Rgb(0xff, 0x80, 0)));
        assert!(parse_color("rgb:ff/80").is_err());
        assert!(parse_color("").is_err());
    }

    #[test]
    fn dark_mode_switches_base_colors() {
        let mut theme = TuiTheme::default();
        let light = theme.base_style();
        theme.set_dark(true);
        assert_ne!(theme.base_style(), light);
        assert_eq!(theme.base_style().bg, Some(Color::Black));
    }
}
