// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Deterministic text + SVG layout for the built-in engine.
//!
//! A sequence diagram becomes participant boxes with lifelines, one label row and one arrow row
//! per message, and a `sequenceNumber` glyph per message when numbering is enabled. Any other
//! diagram kind is shown as a source listing.

use thiserror::Error;

use super::canvas::{Canvas, CanvasError, Edges, HORIZONTAL};
use super::text::{text_len, truncate_with_ellipsis, xml_escape};
use crate::discovery::SEQUENCE_NUMBER_CLASS;
use crate::format::mermaid::{
    parse_sequence_diagram, ArrowHead, LineStyle, NotePlacement, SequenceItem, SequenceMessage,
    SequenceParseError, SequenceScript,
};
use crate::model::diagram::content_lines;
use crate::model::{DiagramKind, MarkerAnchor, RenderSettings};
use crate::surface::{FocusRegion, RenderedFrame};

/// SVG user units per frame column.
pub const CELL_WIDTH_PX: f64 = 8.0;
/// SVG user units per frame row.
pub const CELL_HEIGHT_PX: f64 = 16.0;

const LEFT_MARGIN: usize = 2;
const RIGHT_MARGIN: usize = 2;
const BOX_HEIGHT: usize = 3;
const MIN_BOX_GAP: usize = 6;
const LABEL_PADDING: usize = 4;
const MAX_LABEL_WIDTH: usize = 48;
const SELF_LOOP_WIDTH: usize = 4;
const DOTTED: char = '┄';

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No diagram type detected matching given configuration for text: {0}")]
    UnknownDiagramType(String),
    #[error("Parse error: {0}")]
    Parse(#[from] SequenceParseError),
    #[error("layout error: {0}")]
    Canvas(#[from] CanvasError),
}

/// Frame region of one numbered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegion {
    pub element_id: String,
    pub region: FocusRegion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub frame: RenderedFrame,
    pub svg: String,
    pub regions: Vec<StepRegion>,
}

impl RenderedPage {
    /// Resolves a marker anchor to the frame region it belongs to.
    ///
    /// Anchors with an element id must name a region of this page; anchors without one are
    /// matched by row.
    pub fn region_for(&self, anchor: &MarkerAnchor) -> Option<FocusRegion> {
        if let Some(id) = anchor.element_id() {
            return self
                .regions
                .iter()
                .find(|step| step.element_id == id)
                .map(|step| step.region);
        }
        let row = (anchor.y() / CELL_HEIGHT_PX).round();
        if !row.is_finite() || row < 0.0 {
            return None;
        }
        let row = row as usize;
        self.regions
            .iter()
            .find(|step| step.region.rows().contains(&row))
            .map(|step| step.region)
    }
}

pub fn render_page(text: &str, settings: RenderSettings) -> Result<RenderedPage, EngineError> {
    let kind = DiagramKind::detect(text).ok_or_else(|| {
        let first = content_lines(text).next().map(|(_, line)| line).unwrap_or_default();
        EngineError::UnknownDiagramType(truncate_with_ellipsis(first, 60))
    })?;
    match kind {
        DiagramKind::Sequence => {
            let script = parse_sequence_diagram(text)?;
            render_sequence(&script, settings)
        }
        DiagramKind::Flowchart | DiagramKind::Other => Ok(render_listing(kind, text, settings)),
    }
}

struct Column {
    center: usize,
    box_x0: usize,
    box_x1: usize,
    name: String,
}

fn message_label(message: &SequenceMessage, ordinal: usize, settings: RenderSettings) -> String {
    let label = if settings.show_sequence_numbers() {
        format!("({ordinal}) {}", message.label())
    } else {
        message.label().to_owned()
    };
    truncate_with_ellipsis(&label, MAX_LABEL_WIDTH)
}

/// Rows an item occupies, including the blank row above it.
fn item_rows(item: &SequenceItem) -> usize {
    match item {
        SequenceItem::Message(message) if message.is_self_message() => 4,
        SequenceItem::Message(_) => 3,
        SequenceItem::Note { .. }
        | SequenceItem::BlockStart { .. }
        | SequenceItem::BlockBranch { .. }
        | SequenceItem::BlockEnd => 2,
    }
}

fn layout_columns(script: &SequenceScript, settings: RenderSettings) -> (Vec<Column>, usize) {
    let names = script
        .participants()
        .iter()
        .map(|participant| truncate_with_ellipsis(participant.display_name(), MAX_LABEL_WIDTH))
        .collect::<Vec<_>>();
    let widths = names.iter().map(|name| text_len(name) + 4).collect::<Vec<_>>();

    let mut gaps = widths
        .windows(2)
        .map(|pair| (pair[0] - 1 - pair[0] / 2) + pair[1] / 2 + MIN_BOX_GAP)
        .collect::<Vec<_>>();
    let mut right_extra = 0usize;

    for (idx, message) in script.messages().enumerate() {
        let label_len = text_len(&message_label(message, idx + 1, settings));
        let (Some(a), Some(b)) =
            (script.participant_index(message.from()), script.participant_index(message.to()))
        else {
            continue;
        };
        if a == b {
            let needed = (SELF_LOOP_WIDTH + 2).max(label_len + 3);
            match gaps.get_mut(a) {
                Some(gap) => *gap = (*gap).max(needed),
                None => right_extra = right_extra.max(needed),
            }
            continue;
        }
        let (left, right) = if a < b { (a, b) } else { (b, a) };
        let span = right - left;
        let per_gap = (label_len + LABEL_PADDING + span - 1) / span;
        for gap in &mut gaps[left..right] {
            *gap = (*gap).max(per_gap);
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    let mut center = LEFT_MARGIN + widths.first().map(|w| w / 2).unwrap_or(0);
    for (idx, (name, width)) in names.into_iter().zip(widths.iter().copied()).enumerate() {
        if idx > 0 {
            center += gaps[idx - 1];
        }
        let box_x0 = center - width / 2;
        columns.push(Column { center, box_x0, box_x1: box_x0 + width - 1, name });
    }

    let right_edge = columns
        .last()
        .map(|column| (column.box_x1 + 1).max(column.center + right_extra))
        .unwrap_or(0);
    (columns, right_edge + RIGHT_MARGIN)
}

fn render_sequence(
    script: &SequenceScript,
    settings: RenderSettings,
) -> Result<RenderedPage, EngineError> {
    let (columns, width) = layout_columns(script, settings);
    let top = if script.title().is_some() { 2 } else { 0 };
    let body_rows = script.items().iter().map(item_rows).sum::<usize>();
    let footer_top = top + BOX_HEIGHT + body_rows + 1;
    let height = if columns.is_empty() { footer_top } else { footer_top + BOX_HEIGHT };

    let mut canvas = Canvas::new(width.max(1), height.max(1))?;
    let mut svg = SvgWriter::new(width, height, settings);

    if let Some(title) = script.title() {
        canvas.write_str(LEFT_MARGIN, 0, title)?;
        svg.text(None, Some("sequenceTitle"), LEFT_MARGIN, 0, title);
    }

    if !columns.is_empty() {
        for (idx, column) in columns.iter().enumerate() {
            for box_top in [top, footer_top] {
                canvas.draw_box(column.box_x0, box_top, column.box_x1, box_top + BOX_HEIGHT - 1)?;
                canvas.write_str(column.box_x0 + 2, box_top + 1, &column.name)?;
            }
            canvas.add_edges(column.center, top + BOX_HEIGHT - 1, Edges::DOWN)?;
            canvas.add_edges(column.center, footer_top, Edges::UP)?;
            canvas.draw_vline(column.center, top + BOX_HEIGHT, footer_top - 1)?;
            svg.actor(idx, column, top);
        }
    }

    let mut regions = Vec::new();
    let mut ordinal = 0usize;
    let mut y = top + BOX_HEIGHT;
    for item in script.items() {
        let rows = item_rows(item);
        match item {
            SequenceItem::Message(message) => {
                ordinal += 1;
                let (Some(from), Some(to)) = (
                    script.participant_index(message.from()).and_then(|idx| columns.get(idx)),
                    script.participant_index(message.to()).and_then(|idx| columns.get(idx)),
                ) else {
                    y += rows;
                    continue;
                };
                let label = message_label(message, ordinal, settings);
                let label_row = y + 1;
                let (label_x, region) = if message.is_self_message() {
                    draw_self_message(&mut canvas, message, from.center, label_row, &label)?
                } else {
                    draw_message(&mut canvas, message, from.center, to.center, label_row, &label)?
                };
                let element_id = format!("seqnum-{ordinal}");
                svg.message(message, from.center, to.center, label_row, label_x, &label);
                if settings.show_sequence_numbers() {
                    svg.text(
                        Some(&element_id),
                        Some(SEQUENCE_NUMBER_CLASS),
                        label_x,
                        label_row,
                        &ordinal.to_string(),
                    );
                }
                regions.push(StepRegion { element_id, region });
            }
            SequenceItem::Note { placement, text } => {
                let note = format!("[{}]", truncate_with_ellipsis(text, MAX_LABEL_WIDTH));
                let len = text_len(&note);
                let center_of = |id: &str| {
                    script.participant_index(id).and_then(|idx| columns.get(idx)).map(|c| c.center)
                };
                let x = match placement {
                    NotePlacement::LeftOf(id) => {
                        center_of(id).map(|c| c.saturating_sub(len + 1)).unwrap_or(0)
                    }
                    NotePlacement::RightOf(id) => center_of(id).map(|c| c + 2).unwrap_or(0),
                    NotePlacement::Over(first, second) => {
                        let a = center_of(first).unwrap_or(0);
                        let b = second.as_deref().and_then(center_of).unwrap_or(a);
                        ((a + b) / 2).saturating_sub(len / 2)
                    }
                };
                canvas.write_str(x, y + 1, &note)?;
                svg.text(None, Some("note"), x, y + 1, text);
            }
            SequenceItem::BlockStart { keyword, label }
            | SequenceItem::BlockBranch { keyword, label } => {
                let caption = match label {
                    Some(label) => format!(" {keyword} {label} "),
                    None => format!(" {keyword} "),
                };
                draw_rule(&mut canvas, y + 1, &caption)?;
                svg.text(None, Some("loopText"), 1, y + 1, caption.trim());
            }
            SequenceItem::BlockEnd => draw_rule(&mut canvas, y + 1, " end ")?,
        }
        y += rows;
    }

    Ok(RenderedPage {
        frame: RenderedFrame {
            kind: DiagramKind::Sequence,
            theme: settings.theme(),
            lines: canvas.to_lines(),
        },
        svg: svg.finish(),
        regions,
    })
}

fn draw_rule(canvas: &mut Canvas, y: usize, caption: &str) -> Result<(), CanvasError> {
    for x in 1..canvas.width().saturating_sub(1) {
        canvas.fill_blank(x, y, DOTTED)?;
    }
    canvas.write_str(1, y, &truncate_with_ellipsis(caption, canvas.width().saturating_sub(2)))
}

fn head_glyph(head: ArrowHead, rightward: bool) -> Option<char> {
    match (head, rightward) {
        (ArrowHead::None, _) => None,
        (ArrowHead::Filled, true) => Some('▶'),
        (ArrowHead::Filled, false) => Some('◀'),
        (ArrowHead::Open, true) => Some('>'),
        (ArrowHead::Open, false) => Some('<'),
        (ArrowHead::Cross, _) => Some('x'),
    }
}

fn draw_message(
    canvas: &mut Canvas,
    message: &SequenceMessage,
    from: usize,
    to: usize,
    label_row: usize,
    label: &str,
) -> Result<(usize, FocusRegion), CanvasError> {
    let arrow_row = label_row + 1;
    let rightward = to > from;
    let (left, right) = if rightward { (from, to) } else { (to, from) };
    let arrow = message.arrow();

    for x in (left + 1)..right {
        match arrow.line() {
            LineStyle::Solid => canvas.set(x, arrow_row, HORIZONTAL)?,
            LineStyle::Dotted => canvas.fill_blank(x, arrow_row, DOTTED)?,
        }
    }
    if arrow.line() == LineStyle::Solid {
        let side = if rightward { Edges::RIGHT } else { Edges::LEFT };
        canvas.add_edges(from, arrow_row, side)?;
    }
    if let Some(glyph) = head_glyph(arrow.head(), rightward) {
        let head_x = if rightward { to - 1 } else { to + 1 };
        canvas.set(head_x, arrow_row, glyph)?;
        if arrow.is_bidirectional() {
            let tail_x = if rightward { from + 1 } else { from - 1 };
            if let Some(tail) = head_glyph(arrow.head(), !rightward) {
                canvas.set(tail_x, arrow_row, tail)?;
            }
        }
    }

    let len = text_len(label);
    let label_x = ((left + right) / 2).saturating_sub(len / 2).max(left + 1);
    canvas.write_str(label_x, label_row, label)?;

    let region = FocusRegion {
        row_start: label_row,
        row_end: arrow_row,
        col_start: left.min(label_x),
        col_end: right.max(label_x + len.saturating_sub(1)),
    };
    Ok((label_x, region))
}

fn draw_self_message(
    canvas: &mut Canvas,
    message: &SequenceMessage,
    at: usize,
    label_row: usize,
    label: &str,
) -> Result<(usize, FocusRegion), CanvasError> {
    let out_row = label_row + 1;
    let back_row = label_row + 2;
    let corner = at + SELF_LOOP_WIDTH;
    let solid = message.arrow().line() == LineStyle::Solid;

    for x in (at + 1)..corner {
        if solid {
            canvas.set(x, out_row, HORIZONTAL)?;
            canvas.set(x, back_row, HORIZONTAL)?;
        } else {
            canvas.set(x, out_row, DOTTED)?;
            canvas.set(x, back_row, DOTTED)?;
        }
    }
    canvas.add_edges(at, out_row, Edges::RIGHT)?;
    canvas.set(corner, out_row, '┐')?;
    canvas.set(corner, back_row, '┘')?;
    if let Some(glyph) = head_glyph(message.arrow().head(), false) {
        canvas.set(at + 1, back_row, glyph)?;
    }

    let label_x = at + 2;
    canvas.write_str(label_x, label_row, label)?;
    let region = FocusRegion {
        row_start: label_row,
        row_end: back_row,
        col_start: at,
        col_end: corner.max(label_x + text_len(label).saturating_sub(1)),
    };
    Ok((label_x, region))
}

fn render_listing(kind: DiagramKind, text: &str, settings: RenderSettings) -> RenderedPage {
    let mut lines = vec![format!("{} diagram", kind.label()), String::new()];
    lines.extend(text.lines().map(|line| format!("  {}", line.trim_end())));
    while matches!(lines.last(), Some(line) if line.trim().is_empty()) {
        lines.pop();
    }

    let width = lines.iter().map(|line| text_len(line)).max().unwrap_or(0);
    let mut svg = SvgWriter::new(width, lines.len(), settings);
    for (row, line) in lines.iter().enumerate() {
        svg.text(None, Some("source"), 0, row, line);
    }

    RenderedPage {
        frame: RenderedFrame { kind, theme: settings.theme(), lines },
        svg: svg.finish(),
        regions: Vec::new(),
    }
}

fn px_x(col: usize) -> f64 {
    col as f64 * CELL_WIDTH_PX
}

fn px_y(row: usize) -> f64 {
    row as f64 * CELL_HEIGHT_PX
}

struct SvgWriter {
    out: String,
}

impl SvgWriter {
    fn new(cols: usize, rows: usize, settings: RenderSettings) -> Self {
        let (w, h) = (px_x(cols), px_y(rows));
        let theme = settings.theme();
        let out = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" data-theme="{}" style="background-color: {}">"#,
            theme.as_str(),
            theme.background(),
        );
        Self { out }
    }

    fn text(&mut self, id: Option<&str>, class: Option<&str>, col: usize, row: usize, text: &str) {
        self.out.push_str("<text");
        if let Some(id) = id {
            self.out.push_str(&format!(r#" id="{}""#, xml_escape(id)));
        }
        if let Some(class) = class {
            self.out.push_str(&format!(r#" class="{class}""#));
        }
        self.out.push_str(&format!(
            r#" x="{}" y="{}">{}</text>"#,
            px_x(col),
            px_y(row),
            xml_escape(text)
        ));
    }

    fn actor(&mut self, idx: usize, column: &Column, top: usize) {
        self.out.push_str(&format!(
            r#"<g class="actor" id="actor-{idx}"><rect x="{}" y="{}" width="{}" height="{}"/>"#,
            px_x(column.box_x0),
            px_y(top),
            px_x(column.box_x1 - column.box_x0 + 1),
            px_y(BOX_HEIGHT),
        ));
        self.text(None, Some("actor"), column.box_x0 + 2, top + 1, &column.name);
        self.out.push_str("</g>");
    }

    fn message(
        &mut self,
        message: &SequenceMessage,
        from: usize,
        to: usize,
        label_row: usize,
        label_x: usize,
        label: &str,
    ) {
        let class = match message.arrow().line() {
            LineStyle::Solid => "messageLine0",
            LineStyle::Dotted => "messageLine1",
        };
        let y = px_y(label_row + 1);
        self.out.push_str(&format!(
            r#"<line class="{class}" x1="{}" y1="{y}" x2="{}" y2="{y}"/>"#,
            px_x(from),
            px_x(to),
        ));
        self.text(None, Some("messageText"), label_x, label_row, label);
    }

    fn finish(mut self) -> String {
        self.out.push_str("</svg>");
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::{render_page, EngineError, CELL_HEIGHT_PX};
    use crate::discovery::{discover_step_markers, SvgDocument};
    use crate::model::fixtures::{FLOWCHART, MALFORMED, THREE_MESSAGES, WITH_BLOCKS};
    use crate::model::{DiagramKind, MarkerAnchor, RenderSettings, Theme};

    #[test]
    fn sequence_frame_shows_participants_and_numbered_labels() {
        let page = render_page(THREE_MESSAGES, RenderSettings::default()).expect("render");
        let text = page.frame.lines.join("\n");
        assert!(text.contains("│ Alice │"));
        assert!(text.contains("│ John │"));
        assert!(text.contains("(1) Hello John, how are you?"));
        assert!(text.contains("(3) See you later!"));
        assert!(text.contains('▶'));
        assert_eq!(page.frame.kind, DiagramKind::Sequence);
        assert_eq!(page.regions.len(), 3);
    }

    #[test]
    fn svg_carries_one_sequence_number_per_message() {
        let page = render_page(THREE_MESSAGES, RenderSettings::default()).expect("render");
        let doc = SvgDocument::parse(&page.svg).expect("svg");
        let markers = discover_step_markers(&doc);
        assert_eq!(markers.iter().map(|m| m.ordinal()).collect::<Vec<_>>(), [1, 2, 3]);

        for marker in &markers {
            let region = page.region_for(marker.anchor()).expect("region");
            let row = (marker.anchor().y() / CELL_HEIGHT_PX) as usize;
            assert_eq!(region.row_start, row);
        }
    }

    #[test]
    fn numbering_off_renders_no_markers() {
        let settings = RenderSettings::default().with_sequence_numbers(false);
        let page = render_page(THREE_MESSAGES, settings).expect("render");
        let doc = SvgDocument::parse(&page.svg).expect("svg");
        assert!(discover_step_markers(&doc).is_empty());
        assert!(page.frame.lines.join("\n").contains("Hello John, how are you?"));
        assert!(!page.frame.lines.join("\n").contains("(1)"));
    }

    #[test]
    fn blocks_notes_and_self_messages_render() {
        let page = render_page(WITH_BLOCKS, RenderSettings::default()).expect("render");
        let text = page.frame.lines.join("\n");
        assert!(text.contains("[handshake]"));
        assert!(text.contains(" loop every minute "));
        assert!(text.contains(" else degraded "));
        assert!(text.contains("(3) log ok"));
        assert!(text.contains('┘'));
        assert_eq!(page.regions.len(), 4);
    }

    #[test]
    fn dark_mode_sets_frame_theme_and_svg_background() {
        let settings = RenderSettings::default().with_dark_mode(true);
        let page = render_page(THREE_MESSAGES, settings).expect("render");
        assert_eq!(page.frame.theme, Theme::Dark);
        assert!(page.svg.contains("#1e1e1e"));
    }

    #[test]
    fn flowchart_renders_as_listing_without_markers() {
        let page = render_page(FLOWCHART, RenderSettings::default()).expect("render");
        assert_eq!(page.frame.kind, DiagramKind::Flowchart);
        assert_eq!(page.frame.lines[0], "Flowchart diagram");
        let doc = SvgDocument::parse(&page.svg).expect("svg");
        assert!(discover_step_markers(&doc).is_empty());
        assert!(page.region_for(&MarkerAnchor::new(None, 0.0, 0.0)).is_none());
    }

    #[test]
    fn unknown_diagram_type_fails_like_mermaid() {
        let err = render_page("hello world", RenderSettings::default()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownDiagramType(_)));
        assert_eq!(
            err.to_string(),
            "No diagram type detected matching given configuration for text: hello world"
        );
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = render_page(MALFORMED, RenderSettings::default()).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn unknown_anchor_ids_do_not_resolve() {
        let page = render_page(THREE_MESSAGES, RenderSettings::default()).expect("render");
        let stale = MarkerAnchor::new(Some("seqnum-9".to_owned()), 0.0, 0.0);
        assert!(page.region_for(&stale).is_none());
    }
}
