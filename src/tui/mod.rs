// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! One diagram view with a step footer (ratatui + crossterm). The diagram engine runs as a task
//! on the caller's runtime; this loop only reaches it through [`NavigationController`].

use std::{
    env,
    error::Error,
    fs, io,
    path::{Path, PathBuf},
    process::Command,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::format::mermaid::transition_at_step;
use crate::model::{DiagramKind, DiagramSource, RenderSettings, StepTransitionInfo};
use crate::nav::{HostNotification, NavigationController};
use crate::surface::{ChannelSurface, RenderedFrame, SurfaceEvents, Viewport};

mod theme;

use theme::TuiTheme;

const POLL_INTERVAL: Duration = Duration::from_millis(40);
const TOAST_TTL: Duration = Duration::from_secs(2);
const FOCUS_PADDING_ROWS: usize = 2;
const FOCUS_PADDING_COLS: usize = 4;
const FOOTER_BRAND: &str = "mermaido ";

/// Runs the interactive terminal UI until the user quits.
///
/// `surface` and `events` are the two ends of a running engine (see
/// [`crate::engine::spawn_engine`]). With a `path`, `w` writes edits back to it.
pub fn run(
    source: DiagramSource,
    path: Option<PathBuf>,
    surface: ChannelSurface,
    events: SurfaceEvents,
) -> Result<(), Box<dyn Error>> {
    let theme = TuiTheme::from_env(source.settings().dark_mode())?;
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(source, path, surface, events, theme);

    while !app.should_quit {
        app.pump_surface_events();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                    if let Some(action) = app.take_external_action() {
                        let result =
                            terminal.run_external_action(|| app.execute_external_action(action));
                        if let Err(err) = result {
                            app.set_toast(format!("External action failed: {err}"));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    tracing::info!("terminal ui closed");
    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    frame.render_widget(Block::default().style(app.theme.base_style()), area);

    let banner_height = if app.render_error.is_some() { 3 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);
    let (banner_area, diagram_area, footer_area) = (layout[0], layout[1], layout[2]);

    if let Some(message) = &app.render_error {
        render_error_banner(frame, &app.theme, message, banner_area);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(diagram_title(app))
        .border_style(app.theme.border_style())
        .style(app.theme.base_style());
    match &app.frame {
        Some(rendered) => {
            let inner = block.inner(diagram_area);
            let offset = viewport_offset(
                rendered,
                app.viewport,
                usize::from(inner.width),
                usize::from(inner.height),
            );
            let diagram = Paragraph::new(frame_text(rendered, app.viewport, &app.theme))
                .block(block)
                .scroll(offset);
            frame.render_widget(diagram, diagram_area);
        }
        None => {
            let placeholder = Paragraph::new(placeholder_text(app))
                .style(app.theme.muted_style())
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(placeholder, diagram_area);
        }
    }

    let toast_suffix = app.toast_suffix();
    let footer = Paragraph::new(vec![step_status_line(app), footer_help_line(app, &toast_suffix)])
        .style(app.theme.base_style());
    frame.render_widget(footer, footer_area);
    let brand = Paragraph::new(Line::from(Span::styled(FOOTER_BRAND, app.theme.muted_style())))
        .alignment(Alignment::Right);
    frame.render_widget(brand, Rect { height: 1, ..footer_area });

    if app.show_help {
        render_help(frame, &app.theme, diagram_area);
    }
}

include!("chrome.rs");

struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExternalAction {
    EditDiagram,
}

struct App {
    source: DiagramSource,
    path: Option<PathBuf>,
    controller: NavigationController<ChannelSurface>,
    events: SurfaceEvents,
    theme: TuiTheme,
    frame: Option<RenderedFrame>,
    viewport: Viewport,
    transition: Option<StepTransitionInfo>,
    current_step: usize,
    total_steps: usize,
    render_error: Option<String>,
    engine_lost: bool,
    toast: Option<Toast>,
    show_help: bool,
    pending_external_action: Option<ExternalAction>,
    should_quit: bool,
}

impl App {
    fn new(
        source: DiagramSource,
        path: Option<PathBuf>,
        surface: ChannelSurface,
        events: SurfaceEvents,
        theme: TuiTheme,
    ) -> Self {
        let mut controller = NavigationController::with_settings(surface, source.settings());
        controller.on_source_changed(&source);
        Self {
            source,
            path,
            controller,
            events,
            theme,
            frame: None,
            viewport: Viewport::overview(),
            transition: None,
            current_step: 0,
            total_steps: 0,
            render_error: None,
            engine_lost: false,
            toast: None,
            show_help: false,
            pending_external_action: None,
            should_quit: false,
        }
    }

    /// Feeds every queued engine message to the controller, then applies its notifications.
    fn pump_surface_events(&mut self) {
        while let Some(event) = self.events.try_next() {
            self.controller.handle_surface_event(event);
        }
        if self.events.is_disconnected() && !self.engine_lost {
            self.engine_lost = true;
            tracing::warn!("diagram engine stopped");
            self.render_error = Some("Diagram engine stopped".to_owned());
        }
        self.apply_notifications();
    }

    fn apply_notifications(&mut self) {
        for notification in self.controller.take_notifications() {
            match notification {
                HostNotification::StepChanged(step) => {
                    self.current_step = step;
                    self.transition = if step == 0 {
                        None
                    } else {
                        transition_at_step(self.source.text(), step)
                    };
                }
                HostNotification::TotalStepsChanged(total) => {
                    tracing::debug!(total, "step total changed");
                    self.total_steps = total;
                }
                HostNotification::RenderError(message) => {
                    self.frame = None;
                    self.viewport = Viewport::overview();
                    self.render_error = Some(message);
                }
                HostNotification::RenderCompleted(_) => {
                    if !self.engine_lost {
                        self.render_error = None;
                    }
                }
                HostNotification::FrameReady(frame) => self.frame = Some(frame),
                HostNotification::ViewportChanged(viewport) => self.viewport = viewport,
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    /// Returns `true` when the key asks to quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if self.show_help {
            match code {
                KeyCode::Esc | KeyCode::Char('?') => self.show_help = false,
                KeyCode::Char('q') => return true,
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc => self.dismiss_error(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.controller.next(),
            KeyCode::Left | KeyCode::Char('h') => self.controller.previous(),
            KeyCode::Char('0') | KeyCode::Char('r') => self.controller.reset(),
            KeyCode::Char('e') => self.pending_external_action = Some(ExternalAction::EditDiagram),
            KeyCode::Char('w') => self.write_back(),
            KeyCode::Char('d') => self.toggle_dark_mode(),
            KeyCode::Char('n') => self.toggle_sequence_numbers(),
            KeyCode::Char('y') => self.yank_transition(),
            _ => {}
        }
        self.apply_notifications();
        false
    }

    fn dismiss_error(&mut self) {
        if !self.engine_lost {
            self.render_error = None;
        }
    }

    fn apply_settings(&mut self, settings: RenderSettings) {
        if self.source.set_settings(settings) {
            self.theme.set_dark(settings.dark_mode());
            self.controller.on_settings_changed(settings);
        }
    }

    fn toggle_dark_mode(&mut self) {
        self.apply_settings(self.source.settings().toggled_dark_mode());
        self.set_toast(if self.theme.is_dark() { "Dark mode on" } else { "Dark mode off" });
    }

    fn toggle_sequence_numbers(&mut self) {
        let settings = self.source.settings().toggled_sequence_numbers();
        self.apply_settings(settings);
        self.set_toast(if settings.show_sequence_numbers() {
            "Sequence numbers on"
        } else {
            "Sequence numbers off"
        });
    }

    fn apply_text(&mut self, text: String) {
        if self.source.set_text(text) {
            tracing::debug!(bytes = self.source.text().len(), "diagram text changed");
            self.controller.on_diagram_text_changed(self.source.text());
            self.apply_notifications();
        }
    }

    fn take_external_action(&mut self) -> Option<ExternalAction> {
        self.pending_external_action.take()
    }

    fn execute_external_action(&mut self, action: ExternalAction) -> Result<(), String> {
        match action {
            ExternalAction::EditDiagram => self.edit_diagram_in_editor(),
        }
    }

    fn edit_diagram_in_editor(&mut self) -> Result<(), String> {
        let original = self.source.text().to_owned();
        let temp_path = write_temp_mermaid_file(self.path.as_deref(), &original)?;
        let editor_command = resolve_editor_command();

        let launch_result = launch_editor_command(&editor_command, &temp_path);
        let edited = fs::read_to_string(&temp_path).map_err(|err| {
            format!("failed reading edited Mermaid from {}: {err}", temp_path.display())
        });
        let _ = fs::remove_file(&temp_path);

        launch_result?;
        let edited = edited?;

        if edited == original {
            self.set_toast("Edit cancelled (no changes)");
            return Ok(());
        }
        self.apply_text(edited);
        self.set_toast("Diagram updated");
        Ok(())
    }

    fn write_back(&mut self) {
        let Some(path) = self.path.clone() else {
            self.set_toast("No file to write (started without a path)");
            return;
        };
        match fs::write(&path, self.source.text()) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "diagram written");
                self.set_toast(format!("Wrote {}", path.display()));
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "diagram write failed");
                self.set_toast(format!("Write failed: {err}"));
            }
        }
    }

    fn yank_transition(&mut self) {
        let Some(transition) = &self.transition else {
            self.set_toast("No step selected");
            return;
        };
        let text = transition.to_string();
        match copy_to_clipboard(&text) {
            Ok(backend) => self.set_toast(format!("Yanked step ({backend})")),
            Err(err) => self.set_toast(format!("Clipboard error: {err}")),
        }
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast { message: message.into(), expires_at: Instant::now() + TOAST_TTL });
    }

    fn toast_suffix(&mut self) -> String {
        match &self.toast {
            Some(toast) if toast.expires_at > Instant::now() => format!(" | {}", toast.message),
            Some(_) => {
                self.toast = None;
                String::new()
            }
            None => String::new(),
        }
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let on_err = |err| {
            teardown_terminal();
            err
        };

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(on_err)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).map_err(on_err)?;
        terminal.clear().map_err(on_err)?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }

    /// Leaves the alternate screen for the duration of `action` (e.g. an external editor).
    fn run_external_action(
        &mut self,
        action: impl FnOnce() -> Result<(), String>,
    ) -> Result<(), String> {
        let _suspend = TerminalSuspendGuard::new(&mut self.terminal)
            .map_err(|err| format!("terminal suspend failed: {err}"))?;
        action()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

struct TerminalSuspendGuard<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>,
}

impl<'a> TerminalSuspendGuard<'a> {
    fn new(terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Self> {
        terminal.show_cursor()?;
        disable_raw_mode()?;
        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            restore_terminal(terminal);
            return Err(err);
        }
        ratatui::backend::Backend::flush(terminal.backend_mut())?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSuspendGuard<'_> {
    fn drop(&mut self) {
        restore_terminal(self.terminal);
        let _ = self.terminal.clear();
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    let _ = enable_raw_mode();
    let _ = execute!(terminal.backend_mut(), EnterAlternateScreen);
    let _ = terminal.hide_cursor();
    let _ = ratatui::backend::Backend::flush(terminal.backend_mut());
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

fn copy_to_clipboard(text: &str) -> Result<&'static str, String> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text))).map_err(|err| err.to_string())?;
    Ok("osc52")
}

fn osc52_sequence(text: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    format!("\x1b]52;c;{}\x1b\\", STANDARD.encode(text.as_bytes()))
}

fn resolve_editor_command() -> String {
    ["VISUAL", "EDITOR"]
        .into_iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vi".to_owned())
}

/// Temp file named after the opened file (or `demo`), so editors pick Mermaid highlighting.
fn write_temp_mermaid_file(origin: Option<&Path>, content: &str) -> Result<PathBuf, String> {
    let ts = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let stem = origin
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "demo".to_owned());
    let safe_stem = stem
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect::<String>();
    let temp_path = env::temp_dir().join(format!("mermaido-{safe_stem}-{ts}.mmd"));
    fs::write(&temp_path, content).map_err(|err| {
        format!("failed to create temporary Mermaid file {}: {err}", temp_path.display())
    })?;
    Ok(temp_path)
}

fn launch_editor_command(command: &str, path: &Path) -> Result<(), String> {
    let path_text = path.to_string_lossy();
    if path_text.starts_with('-') {
        return Err("invalid editor temp path".to_owned());
    }

    tracing::debug!(command, path = %path.display(), "launching editor");
    let status = Command::new("sh")
        .arg("-lc")
        .arg(format!("{command} {}", shell_single_quote(&path_text)))
        .status()
        .map_err(|err| format!("failed to run editor command `{command}`: {err}"))?;
    if !status.success() {
        return Err(format!("editor command failed with status {status}"));
    }
    Ok(())
}

fn shell_single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests;
