// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Options the renderer bakes into the generated diagram.
///
/// Changing any of them requires a full re-render; there is no post-hoc restyle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSettings {
    show_sequence_numbers: bool,
    dark_mode: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { show_sequence_numbers: true, dark_mode: false }
    }
}

impl RenderSettings {
    pub fn new(show_sequence_numbers: bool, dark_mode: bool) -> Self {
        Self { show_sequence_numbers, dark_mode }
    }

    pub fn show_sequence_numbers(self) -> bool {
        self.show_sequence_numbers
    }

    pub fn dark_mode(self) -> bool {
        self.dark_mode
    }

    pub fn theme(self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Default
        }
    }

    pub fn with_sequence_numbers(self, show_sequence_numbers: bool) -> Self {
        Self { show_sequence_numbers, ..self }
    }

    pub fn with_dark_mode(self, dark_mode: bool) -> Self {
        Self { dark_mode, ..self }
    }

    pub fn toggled_sequence_numbers(self) -> Self {
        self.with_sequence_numbers(!self.show_sequence_numbers)
    }

    pub fn toggled_dark_mode(self) -> Self {
        self.with_dark_mode(!self.dark_mode)
    }
}

/// Renderer theme derived from [`RenderSettings::dark_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dark => "dark",
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Self::Default => "#ffffff",
            Self::Dark => "#1e1e1e",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderSettings, Theme};

    #[test]
    fn defaults_show_numbers_in_light_theme() {
        let settings = RenderSettings::default();
        assert!(settings.show_sequence_numbers());
        assert!(!settings.dark_mode());
        assert_eq!(settings.theme(), Theme::Default);
    }

    #[test]
    fn toggles_flip_one_field_only() {
        let settings = RenderSettings::default().toggled_dark_mode();
        assert_eq!(settings.theme(), Theme::Dark);
        assert!(settings.show_sequence_numbers());

        let settings = settings.toggled_sequence_numbers();
        assert!(!settings.show_sequence_numbers());
        assert!(settings.dark_mode());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(RenderSettings::new(false, true)).expect("serialize");
        assert_eq!(json, serde_json::json!({ "showSequenceNumbers": false, "darkMode": true }));
    }
}
