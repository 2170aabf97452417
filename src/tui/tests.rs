// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{
    centered_offset, draw, footer_help_line, footer_key_style, frame_text, osc52_sequence,
    shell_single_quote, step_status_line, viewport_offset, App, ExternalAction, TuiTheme,
};
use crate::discovery::{discover_step_markers, SvgDocument};
use crate::engine::{render_page, RenderedPage};
use crate::model::{DiagramKind, DiagramSource, Generation, RenderSettings, DEMO_DIAGRAM};
use crate::surface::{
    decode_command, encode_event, ChannelSurface, FocusRegion, RenderedFrame, SurfaceCommand,
    SurfaceEvent, SurfaceEvents, Viewport,
};
use crossterm::event::KeyCode;
use ratatui::{backend::TestBackend, Terminal};
use std::path::PathBuf;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

struct Harness {
    app: App,
    commands: UnboundedReceiver<String>,
    events: UnboundedSender<String>,
}

impl Harness {
    fn new(source: DiagramSource, path: Option<PathBuf>) -> Self {
        let (command_tx, commands) = unbounded_channel();
        let (events, event_rx) = unbounded_channel();
        let app = App::new(
            source,
            path,
            ChannelSurface::new(command_tx),
            SurfaceEvents::new(event_rx),
            TuiTheme::default(),
        );
        Self { app, commands, events }
    }

    fn demo() -> Self {
        Self::new(DiagramSource::demo(), None)
    }

    fn post(&self, event: SurfaceEvent) {
        self.events.send(encode_event(&event).expect("encode")).expect("app listening");
    }

    fn pump(&mut self) {
        self.app.pump_surface_events();
    }

    fn key(&mut self, code: KeyCode) -> bool {
        self.app.handle_key_code(code)
    }

    fn drain_commands(&mut self) -> Vec<SurfaceCommand> {
        let mut out = Vec::new();
        while let Ok(message) = self.commands.try_recv() {
            out.push(decode_command(&message).expect("script call"));
        }
        out
    }

    fn make_ready(&mut self) {
        self.post(SurfaceEvent::Loaded);
        self.post(SurfaceEvent::ModuleReady);
        self.pump();
    }

    /// Answers the latest render the way the engine would, using the real layout.
    fn answer_render(&mut self) -> RenderedPage {
        let request = self
            .drain_commands()
            .into_iter()
            .rev()
            .find_map(|command| match command {
                SurfaceCommand::RenderDiagram(request) => Some(request),
                _ => None,
            })
            .expect("render request");
        let generation = request.generation;
        let page = render_page(&request.text, request.settings).expect("renders");

        self.post(SurfaceEvent::Viewport { generation, viewport: Viewport::overview() });
        self.post(SurfaceEvent::Frame { generation, frame: page.frame.clone() });
        self.post(SurfaceEvent::Rendered { generation, kind: page.frame.kind });
        if page.frame.kind == DiagramKind::Sequence {
            let markers = discover_step_markers(&SvgDocument::parse(&page.svg).expect("svg"));
            self.post(SurfaceEvent::StepsDiscovered { generation, markers });
        }
        self.pump();
        page
    }

    fn footer_text(&self) -> String {
        line_to_string(&step_status_line(&self.app))
    }
}

fn line_to_string(line: &ratatui::text::Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect::<String>()
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect::<String>()
}

#[test]
fn ready_engine_receives_exactly_one_render_of_the_demo() {
    let mut harness = Harness::demo();
    assert!(harness.drain_commands().is_empty());

    harness.make_ready();
    let commands = harness.drain_commands();
    assert_eq!(commands.len(), 1);
    let SurfaceCommand::RenderDiagram(request) = &commands[0] else {
        panic!("expected a render call, got {commands:?}");
    };
    assert_eq!(request.generation, Generation::new(1));
    assert_eq!(request.text, DEMO_DIAGRAM);
}

#[test]
fn stepping_shows_the_transition_of_the_current_message() {
    let mut harness = Harness::demo();
    harness.make_ready();
    harness.answer_render();
    assert_eq!(harness.footer_text(), "Step 0/3");

    harness.key(KeyCode::Right);
    assert_eq!(harness.footer_text(), "Step 1/3  Alice → John: Hello John, how are you?");
    assert!(matches!(
        harness.drain_commands().as_slice(),
        [SurfaceCommand::PanToStep { generation, .. }] if *generation == Generation::new(1)
    ));

    harness.key(KeyCode::Char(' '));
    harness.key(KeyCode::Char('l'));
    assert_eq!(harness.footer_text(), "Step 3/3  Alice → John: See you later!");

    harness.key(KeyCode::Char('0'));
    assert_eq!(harness.footer_text(), "Step 0/3");
    assert!(harness.app.transition.is_none());
}

#[test]
fn previous_is_dimmed_only_at_the_overview() {
    let mut harness = Harness::demo();
    harness.make_ready();
    harness.answer_render();

    let prev_style = |app: &App| {
        footer_help_line(app, "")
            .spans
            .iter()
            .find(|span| span.content == "←")
            .map(|span| span.style)
            .expect("prev entry")
    };
    let theme = TuiTheme::default();
    assert_eq!(prev_style(&harness.app), footer_key_style(&theme, true));
    harness.key(KeyCode::Right);
    assert_eq!(prev_style(&harness.app), footer_key_style(&theme, false));
}

#[test]
fn toggling_sequence_numbers_rerenders_and_drops_the_steps() {
    let mut harness = Harness::demo();
    harness.make_ready();
    harness.answer_render();
    harness.key(KeyCode::Right);
    harness.key(KeyCode::Right);
    harness.drain_commands();

    harness.key(KeyCode::Char('n'));
    assert_eq!(harness.footer_text(), "Step 0/0");
    assert!(harness.app.controller.is_render_in_flight());

    harness.answer_render();
    assert_eq!(harness.footer_text(), "Step 0/0");
    assert!(!harness.app.source.settings().show_sequence_numbers());

    harness.key(KeyCode::Char('n'));
    harness.answer_render();
    assert_eq!(harness.footer_text(), "Step 0/3");
}

#[test]
fn dark_mode_toggle_switches_the_tui_theme_and_rerenders() {
    let mut harness = Harness::demo();
    harness.make_ready();
    harness.answer_render();

    harness.key(KeyCode::Char('d'));
    assert!(harness.app.theme.is_dark());
    let commands = harness.drain_commands();
    assert!(matches!(
        commands.as_slice(),
        [SurfaceCommand::RenderDiagram(request)] if request.settings.dark_mode()
    ));
}

#[test]
fn flowchart_ignores_step_keys() {
    let source = DiagramSource::new("graph TD\n  A --> B\n", RenderSettings::default());
    let mut harness = Harness::new(source, None);
    harness.make_ready();
    harness.answer_render();

    harness.key(KeyCode::Right);
    assert!(harness.drain_commands().is_empty());
    assert_eq!(harness.footer_text(), "Step 0/0  Flowchart diagrams have no steps");
}

#[test]
fn footer_total_follows_notifications_when_a_flowchart_replaces_a_sequence() {
    let mut harness = Harness::new(DiagramSource::demo(), None);
    harness.make_ready();
    harness.answer_render();
    harness.key(KeyCode::Right);
    assert!(harness.footer_text().starts_with("Step 1/3"));

    harness.app.apply_text("graph TD\n  A --> B\n".to_owned());
    assert_eq!(harness.app.total_steps, 0);
    harness.answer_render();
    assert_eq!(harness.footer_text(), "Step 0/0  Flowchart diagrams have no steps");
}

#[test]
fn render_error_banner_is_dismissed_with_esc_or_a_good_render() {
    let source = DiagramSource::new("not a diagram", RenderSettings::default());
    let mut harness = Harness::new(source, None);
    harness.make_ready();
    harness.drain_commands();
    harness.post(SurfaceEvent::RenderFailed {
        generation: Generation::new(1),
        message: "No diagram type detected".to_owned(),
    });
    harness.pump();
    assert_eq!(harness.app.render_error.as_deref(), Some("No diagram type detected"));

    harness.key(KeyCode::Esc);
    assert!(harness.app.render_error.is_none());

    harness.post(SurfaceEvent::RenderFailed {
        generation: Generation::new(1),
        message: "late duplicate".to_owned(),
    });
    harness.pump();
    assert!(harness.app.render_error.is_none());

    harness.app.apply_text(DEMO_DIAGRAM.to_owned());
    harness.answer_render();
    assert!(harness.app.render_error.is_none());
    assert_eq!(harness.footer_text(), "Step 0/3");
}

#[test]
fn stale_frames_from_a_superseded_render_are_not_shown() {
    let mut harness = Harness::demo();
    harness.make_ready();
    harness.app.apply_text("graph TD\n  A --> B\n".to_owned());

    harness.post(SurfaceEvent::Frame {
        generation: Generation::new(1),
        frame: RenderedFrame::default(),
    });
    harness.pump();
    assert!(harness.app.frame.is_none());

    let page = harness.answer_render();
    assert_eq!(harness.app.frame.as_ref(), Some(&page.frame));
}

#[test]
fn lost_engine_is_reported_once_and_stays_visible() {
    let mut harness = Harness::demo();
    drop(std::mem::replace(&mut harness.events, unbounded_channel().0));
    harness.pump();
    assert_eq!(harness.app.render_error.as_deref(), Some("Diagram engine stopped"));
    harness.key(KeyCode::Esc);
    assert!(harness.app.render_error.is_some());
}

#[test]
fn write_back_requires_a_path() {
    let mut harness = Harness::demo();
    harness.key(KeyCode::Char('w'));
    let toast = harness.app.toast.as_ref().map(|toast| toast.message.clone());
    assert_eq!(toast.as_deref(), Some("No file to write (started without a path)"));
}

#[test]
fn write_back_saves_the_current_text() {
    let path = std::env::temp_dir().join(format!("mermaido-write-{}.mmd", std::process::id()));
    std::fs::write(&path, "sequenceDiagram\n").expect("seed file");
    let mut harness = Harness::new(DiagramSource::demo(), Some(path.clone()));

    harness.key(KeyCode::Char('w'));
    let written = std::fs::read_to_string(&path).expect("written file");
    let _ = std::fs::remove_file(&path);
    assert_eq!(written, DEMO_DIAGRAM);
}

#[test]
fn edit_key_queues_the_editor_and_help_swallows_keys() {
    let mut harness = Harness::demo();
    harness.key(KeyCode::Char('e'));
    assert_eq!(harness.app.take_external_action(), Some(ExternalAction::EditDiagram));
    assert_eq!(harness.app.take_external_action(), None);

    harness.key(KeyCode::Char('?'));
    assert!(harness.app.show_help);
    harness.key(KeyCode::Char('e'));
    assert_eq!(harness.app.take_external_action(), None);
    assert!(harness.key(KeyCode::Char('q')));
}

#[test]
fn focus_is_centred_with_padding_and_clamped_to_content() {
    assert_eq!(centered_offset(20, 22, 40, 10, 2), 16);
    assert_eq!(centered_offset(5, 30, 40, 10, 2), 3);
    assert_eq!(centered_offset(36, 38, 40, 10, 2), 30);
    assert_eq!(centered_offset(1, 1, 40, 10, 2), 0);
    assert_eq!(centered_offset(3, 3, 5, 10, 2), 0);

    let rendered = RenderedFrame { lines: vec!["x".repeat(100); 60], ..RenderedFrame::default() };
    let region = FocusRegion { row_start: 30, row_end: 32, col_start: 50, col_end: 70 };
    assert_eq!(viewport_offset(&rendered, Viewport::focused(region), 40, 20), (21, 40));
    assert_eq!(viewport_offset(&rendered, Viewport::overview(), 40, 20), (0, 0));
}

#[test]
fn focused_rows_are_highlighted_within_the_region_columns() {
    let theme = TuiTheme::default();
    let rendered =
        RenderedFrame { lines: vec!["abcdef".to_owned(), "ghijkl".to_owned()], ..Default::default() };
    let region = FocusRegion { row_start: 1, row_end: 1, col_start: 2, col_end: 3 };
    let text = frame_text(&rendered, Viewport::focused(region), &theme);

    assert_eq!(text.lines[0].spans.len(), 1);
    let spans = &text.lines[1].spans;
    assert_eq!(spans[1].content, "ij");
    assert_eq!(spans[1].style, theme.focus_style());
    assert_eq!(line_to_string(&text.lines[1]), "ghijkl");
}

#[test]
fn screen_shows_diagram_and_footer() {
    let mut harness = Harness::demo();
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");

    terminal.draw(|frame| draw(frame, &mut harness.app)).expect("draw");
    assert!(screen_text(&terminal).contains("Loading Mermaid module"));

    harness.make_ready();
    harness.answer_render();
    harness.key(KeyCode::Right);
    terminal.draw(|frame| draw(frame, &mut harness.app)).expect("draw");
    let screen = screen_text(&terminal);
    assert!(screen.contains("Alice"));
    assert!(screen.contains("Step 1/3"));
    assert!(screen.contains("demo"));
}

#[test]
fn osc52_wraps_base64_payload() {
    assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x1b\\");
}

#[test]
fn shell_quoting_escapes_single_quotes() {
    assert_eq!(shell_single_quote("it's here"), "'it'\\''s here'");
}
