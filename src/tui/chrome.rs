// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Title, footer, banner, help, and viewport helpers used by TUI rendering.
fn diagram_title(app: &App) -> String {
    let name = app
        .path
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "demo".to_owned());
    let kind = app.controller.active_kind().unwrap_or_else(|| app.source.kind());
    format!("─ {name} ─ {} ", kind.label())
}

fn placeholder_text(app: &App) -> &'static str {
    if app.source.text().is_empty() {
        "Nothing to render. Press e to edit."
    } else if !app.controller.readiness().is_ready() {
        "Loading Mermaid module…"
    } else if app.controller.is_render_in_flight() {
        "Rendering…"
    } else {
        "No diagram"
    }
}

/// Scroll offset `(rows, cols)` that brings the focused region into the middle of the view.
fn viewport_offset(
    rendered: &RenderedFrame,
    viewport: Viewport,
    view_width: usize,
    view_height: usize,
) -> (u16, u16) {
    let Some(region) = viewport.focus else {
        return (0, 0);
    };
    let row = centered_offset(
        region.row_start,
        region.row_end,
        rendered.height(),
        view_height,
        FOCUS_PADDING_ROWS,
    );
    let col = centered_offset(
        region.col_start,
        region.col_end,
        rendered.width(),
        view_width,
        FOCUS_PADDING_COLS,
    );
    (clamp_to_u16(row), clamp_to_u16(col))
}

/// Centres `start..=end` in `view` cells; `padding` cells before `start` always stay visible.
fn centered_offset(start: usize, end: usize, content: usize, view: usize, padding: usize) -> usize {
    let center = start + end.saturating_sub(start) / 2;
    center
        .saturating_sub(view / 2)
        .min(start.saturating_sub(padding))
        .min(content.saturating_sub(view))
}

fn clamp_to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn frame_text(rendered: &RenderedFrame, viewport: Viewport, theme: &TuiTheme) -> Text<'static> {
    let base = theme.base_style();
    let lines = rendered
        .lines
        .iter()
        .enumerate()
        .map(|(row, line)| match viewport.focus {
            Some(region) if region.rows().contains(&row) => highlighted_line(
                line,
                region.col_start..region.col_end.saturating_add(1),
                base,
                theme.focus_style(),
            ),
            _ => Line::from(Span::styled(line.clone(), base)),
        })
        .collect::<Vec<_>>();
    Text::from(lines)
}

fn highlighted_line(
    line: &str,
    cols: std::ops::Range<usize>,
    base: Style,
    focus: Style,
) -> Line<'static> {
    let chars = line.chars().collect::<Vec<_>>();
    let start = cols.start.min(chars.len());
    let end = cols.end.min(chars.len()).max(start);
    let segment = |from: usize, to: usize| chars[from..to].iter().collect::<String>();
    Line::from(vec![
        Span::styled(segment(0, start), base),
        Span::styled(segment(start, end), focus),
        Span::styled(segment(end, chars.len()), base),
    ])
}

fn step_counter_label(current: usize, total: usize) -> String {
    format!("Step {current}/{total}")
}

fn step_status_line(app: &App) -> Line<'static> {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        step_counter_label(app.current_step, app.total_steps),
        theme.key_style(),
    )];
    match (&app.transition, app.controller.active_kind()) {
        (Some(transition), _) => {
            spans.push(Span::styled(format!("  {transition}"), theme.base_style()))
        }
        (None, Some(kind)) if !kind.is_sequence() => spans.push(Span::styled(
            format!("  {} diagrams have no steps", kind.label()),
            theme.muted_style(),
        )),
        _ => {}
    }
    Line::from(spans)
}

fn footer_key_style(theme: &TuiTheme, disabled: bool) -> Style {
    if disabled {
        theme.muted_style().add_modifier(Modifier::DIM)
    } else {
        theme.key_style()
    }
}

fn push_footer_entry(
    spans: &mut Vec<Span<'static>>,
    theme: &TuiTheme,
    label: &str,
    key: &str,
    disabled: bool,
) {
    if !spans.is_empty() {
        spans.push(Span::styled(" | ", theme.muted_style()));
    }
    spans.push(Span::styled(format!("{label}:"), theme.muted_style()));
    spans.push(Span::styled(key.to_owned(), footer_key_style(theme, disabled)));
}

fn toggle_marker(key: char, on: bool) -> String {
    format!("{key}{}", if on { '◼' } else { '◻' })
}

fn footer_help_line(app: &App, toast_suffix: &str) -> Line<'static> {
    let theme = &app.theme;
    let settings = app.source.settings();
    let steppable = app.controller.active_kind() == Some(DiagramKind::Sequence)
        && !app.controller.is_render_in_flight();
    let at_overview = app.current_step == 0;

    let mut spans = Vec::<Span<'static>>::new();
    push_footer_entry(&mut spans, theme, "Prev", "←", !steppable || at_overview);
    push_footer_entry(&mut spans, theme, "Next", "→", !steppable);
    push_footer_entry(&mut spans, theme, "Reset", "0", !steppable);
    push_footer_entry(&mut spans, theme, "Edit", "e", false);
    if app.path.is_some() {
        push_footer_entry(&mut spans, theme, "Write", "w", false);
    }
    push_footer_entry(&mut spans, theme, "Dark", &toggle_marker('d', settings.dark_mode()), false);
    push_footer_entry(
        &mut spans,
        theme,
        "Numbers",
        &toggle_marker('n', settings.show_sequence_numbers()),
        false,
    );
    push_footer_entry(&mut spans, theme, "Help", "?", false);
    push_footer_entry(&mut spans, theme, "Quit", "q", false);
    if !toast_suffix.is_empty() {
        spans.push(Span::styled(toast_suffix.to_owned(), theme.base_style()));
    }
    Line::from(spans)
}

fn render_error_banner(frame: &mut Frame<'_>, theme: &TuiTheme, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("─ Render error ─ Esc to dismiss ")
        .border_style(theme.error_style())
        .style(theme.base_style());
    let banner = Paragraph::new(message.to_owned())
        .style(theme.error_style())
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(banner, area);
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let split = |direction: Direction, percent: u16, area: Rect| {
        let margin = 100u16.saturating_sub(percent) / 2;
        Layout::default()
            .direction(direction)
            .constraints([
                Constraint::Percentage(margin),
                Constraint::Percentage(percent),
                Constraint::Percentage(margin),
            ])
            .split(area)[1]
    };
    split(Direction::Horizontal, width_percent, split(Direction::Vertical, height_percent, area))
}

const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Steps",
        &[
            ("→ / l / Space", "Next step"),
            ("← / h", "Previous step (step 1 returns to the overview)"),
            ("0 / r", "Reset to the overview"),
            ("y", "Yank the current step's message (OSC 52)"),
        ],
    ),
    (
        "Diagram",
        &[
            ("e", "Edit the diagram in $VISUAL / $EDITOR"),
            ("w", "Write the diagram back to its file"),
            ("d", "Toggle dark mode"),
            ("n", "Toggle sequence numbers"),
        ],
    ),
    ("General", &[("Esc", "Dismiss the render error"), ("?", "Help (toggle)"), ("q", "Quit")]),
];

fn help_lines(theme: &TuiTheme) -> Vec<Line<'static>> {
    let key_width = HELP_SECTIONS
        .iter()
        .flat_map(|(_, rows)| rows.iter())
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    let header_style = theme.base_style().add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for (idx, (title, rows)) in HELP_SECTIONS.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(format!("--- {title} ---"), header_style)));
        for (key, desc) in rows.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:>key_width$}"), theme.key_style()),
                Span::raw("  "),
                Span::styled((*desc).to_owned(), theme.base_style()),
            ]));
        }
    }
    lines
}

fn render_help(frame: &mut Frame<'_>, theme: &TuiTheme, area: Rect) {
    let area = centered_rect(64, 70, area);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("─ Help ─")
        .border_style(theme.border_style())
        .style(theme.base_style());
    let paragraph = Paragraph::new(help_lines(theme)).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
