// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::model::diagram::content_lines;
use crate::model::StepTransitionInfo;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceParseError {
    #[error("expected 'sequenceDiagram' as the first non-empty line")]
    MissingHeader,
    #[error("unsupported Mermaid syntax on line {line_no}: {line}")]
    UnsupportedSyntax { line_no: usize, line: String },
    #[error(
        "invalid participant declaration on line {line_no}: {line} (expected 'participant <name> [as <alias>]')"
    )]
    InvalidParticipantDecl { line_no: usize, line: String },
    #[error(
        "missing message text on line {line_no}: {line} (expected '<from><arrow><to>: <text>')"
    )]
    MissingMessageText { line_no: usize, line: String },
    #[error("invalid note on line {line_no}: {line} (expected 'Note left of|right of|over <name>: <text>')")]
    InvalidNote { line_no: usize, line: String },
    #[error("invalid '{keyword}' on line {line_no}: only valid inside an open '{expected}' block")]
    BranchOutsideBlock { line_no: usize, keyword: String, expected: &'static str },
    #[error("unmatched 'end' on line {line_no}: no block is currently open")]
    UnmatchedEnd { line_no: usize },
    #[error("unclosed '{keyword}' block: missing 'end' for block opened on line {opened_on_line_no}")]
    UnclosedBlock { opened_on_line_no: usize, keyword: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowHead {
    None,
    Filled,
    Cross,
    Open,
}

/// A Mermaid message arrow, e.g. `->>`, `--x` or `<<-->>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrow {
    line: LineStyle,
    head: ArrowHead,
    bidirectional: bool,
}

impl Arrow {
    fn from_token(token: &str) -> Option<Self> {
        let (line, head, bidirectional) = match token {
            "->" => (LineStyle::Solid, ArrowHead::None, false),
            "-->" => (LineStyle::Dotted, ArrowHead::None, false),
            "->>" => (LineStyle::Solid, ArrowHead::Filled, false),
            "-->>" => (LineStyle::Dotted, ArrowHead::Filled, false),
            "<<->>" => (LineStyle::Solid, ArrowHead::Filled, true),
            "<<-->>" => (LineStyle::Dotted, ArrowHead::Filled, true),
            "-x" => (LineStyle::Solid, ArrowHead::Cross, false),
            "--x" => (LineStyle::Dotted, ArrowHead::Cross, false),
            "-)" => (LineStyle::Solid, ArrowHead::Open, false),
            "--)" => (LineStyle::Dotted, ArrowHead::Open, false),
            _ => return None,
        };
        Some(Self { line, head, bidirectional })
    }

    pub fn line(self) -> LineStyle {
        self.line
    }

    pub fn head(self) -> ArrowHead {
        self.head
    }

    pub fn is_bidirectional(self) -> bool {
        self.bidirectional
    }
}

const ARROW_TOKENS: &[&str] =
    &["<<-->>", "<<->>", "-->>", "->>", "--x", "-x", "--)", "-)", "-->", "->"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: String,
    display_name: String,
    is_actor: bool,
}

impl Participant {
    fn new(id: &str) -> Self {
        Self { id: id.to_owned(), display_name: id.to_owned(), is_actor: false }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_actor(&self) -> bool {
        self.is_actor
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceMessage {
    from: String,
    to: String,
    arrow: Arrow,
    label: String,
    line_no: usize,
}

impl SequenceMessage {
    /// Participant id of the sender.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Participant id of the receiver.
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn arrow(&self) -> Arrow {
        self.arrow
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn is_self_message(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotePlacement {
    LeftOf(String),
    RightOf(String),
    Over(String, Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceItem {
    Message(SequenceMessage),
    Note { placement: NotePlacement, text: String },
    BlockStart { keyword: String, label: Option<String> },
    BlockBranch { keyword: String, label: Option<String> },
    BlockEnd,
}

/// A parsed `sequenceDiagram`, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceScript {
    title: Option<String>,
    participants: Vec<Participant>,
    items: Vec<SequenceItem>,
}

impl SequenceScript {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Participants in declaration order, implicit ones at their first mention.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn items(&self) -> &[SequenceItem] {
        &self.items
    }

    pub fn messages(&self) -> impl Iterator<Item = &SequenceMessage> {
        self.items.iter().filter_map(|item| match item {
            SequenceItem::Message(message) => Some(message),
            _ => None,
        })
    }

    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    pub fn participant_index(&self, id: &str) -> Option<usize> {
        self.participants.iter().position(|participant| participant.id == id)
    }

    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.participants
            .iter()
            .find(|participant| participant.id == id)
            .map(Participant::display_name)
            .unwrap_or(id)
    }

    /// The message shown at a 1-based step; step 0 is the overview and has none.
    pub fn transition_at_step(&self, step: usize) -> Option<StepTransitionInfo> {
        let message = self.messages().nth(step.checked_sub(1)?)?;
        Some(StepTransitionInfo::new(
            self.display_name(message.from()),
            self.display_name(message.to()),
            message.label(),
        ))
    }

    fn ensure_participant(&mut self, id: &str) {
        if self.participant_index(id).is_none() {
            self.participants.push(Participant::new(id));
        }
    }

    fn declare_participant(&mut self, id: &str, alias: Option<&str>, is_actor: bool) {
        let idx = match self.participant_index(id) {
            Some(idx) => idx,
            None => {
                self.participants.push(Participant::new(id));
                self.participants.len() - 1
            }
        };
        let participant = &mut self.participants[idx];
        if let Some(alias) = alias {
            participant.display_name = alias.to_owned();
        }
        participant.is_actor |= is_actor;
    }
}

/// Convenience for hosts: parse `text` and look up the message at `step`.
///
/// Returns `None` for non-sequence or malformed text.
pub fn transition_at_step(text: &str, step: usize) -> Option<StepTransitionInfo> {
    parse_sequence_diagram(text).ok()?.transition_at_step(step)
}

fn message_re() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(
            r"^(?P<from>[^\s:+<>-][^:]*?)\s*(?P<arrow><<-->>|<<->>|-->>|->>|--x|-x|--\)|-\)|-->|->)(?P<activation>[+-])?\s*(?P<to>[^:]+?)\s*:(?P<label>.*)$",
        )
        .expect("valid message regex")
    })
}

fn participant_re() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(r"^(?P<keyword>participant|actor)\s+(?P<id>[^\s]+?)(?:\s+as\s+(?P<alias>.+?))?\s*$")
            .expect("valid participant regex")
    })
}

fn note_re() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| {
        Regex::new(
            r"(?i)^note\s+(?P<placement>left\s+of|right\s+of|over)\s+(?P<who>[^:]+?)\s*:\s*(?P<text>.*)$",
        )
        .expect("valid note regex")
    })
}

const BLOCK_KEYWORDS: &[&str] =
    &["loop", "alt", "opt", "par", "par_over", "critical", "break", "rect", "box"];

const IGNORED_KEYWORDS: &[&str] =
    &["autonumber", "activate", "deactivate", "destroy", "accTitle", "accDescr", "link", "links"];

fn branch_parents(keyword: &str) -> Option<(&'static [&'static str], &'static str)> {
    match keyword {
        "else" => Some((&["alt"], "alt")),
        "and" => Some((&["par", "par_over"], "par")),
        "option" => Some((&["critical"], "critical")),
        _ => None,
    }
}

fn keyword_label(trimmed: &str, keyword: &str) -> Option<String> {
    let rest = trimmed.get(keyword.len()..).unwrap_or_default().trim();
    (!rest.is_empty()).then(|| rest.to_owned())
}

fn strip_keyword<'a>(trimmed: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = trimmed.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) || rest.starts_with(':') {
        Some(rest)
    } else {
        None
    }
}

struct OpenBlock {
    keyword: String,
    opened_on_line_no: usize,
}

/// Parse the `sequenceDiagram` subset the built-in engine can draw.
///
/// Supported lines (after `sequenceDiagram`):
/// - `participant <id> [as <alias>]`, `actor <id> [as <alias>]`, optionally prefixed by `create`
/// - `<from><arrow>[+|-]<to>: <text>` with any of Mermaid's message arrows
/// - `Note left of|right of|over <id>[,<id>]: <text>`
/// - block keywords (`loop`, `alt`, `opt`, `par`, `critical`, `break`, `rect`, `box`), their
///   branches (`else`, `and`, `option`) and `end`
/// - `title`, `autonumber`, `activate`/`deactivate` and accessibility lines (accepted, not drawn)
///
/// Anything else is rejected with the offending line.
pub fn parse_sequence_diagram(input: &str) -> Result<SequenceScript, SequenceParseError> {
    let mut script = SequenceScript::default();
    let mut saw_header = false;
    let mut open_blocks = Vec::<OpenBlock>::new();

    for (line_no, trimmed) in content_lines(input) {
        if !saw_header {
            if trimmed.split_whitespace().next() == Some("sequenceDiagram") {
                saw_header = true;
                continue;
            }
            return Err(SequenceParseError::MissingHeader);
        }

        let decl = trimmed.strip_prefix("create ").map(str::trim_start).unwrap_or(trimmed);
        if decl.starts_with("participant") || decl.starts_with("actor") {
            if let Some(caps) = participant_re().captures(decl) {
                let is_actor = &caps["keyword"] == "actor";
                let alias = caps.name("alias").map(|alias| alias.as_str());
                script.declare_participant(&caps["id"], alias, is_actor);
                continue;
            }
            if strip_keyword(decl, "participant").is_some() || strip_keyword(decl, "actor").is_some()
            {
                return Err(SequenceParseError::InvalidParticipantDecl {
                    line_no,
                    line: trimmed.to_owned(),
                });
            }
        }

        let keyword = trimmed
            .split(|ch: char| ch.is_whitespace() || ch == ':')
            .next()
            .unwrap_or_default();

        if keyword == "title" {
            let title = trimmed["title".len()..].trim_start_matches(':').trim();
            script.title = (!title.is_empty()).then(|| title.to_owned());
            continue;
        }

        if IGNORED_KEYWORDS.contains(&keyword) {
            continue;
        }

        if BLOCK_KEYWORDS.contains(&keyword) {
            open_blocks.push(OpenBlock { keyword: keyword.to_owned(), opened_on_line_no: line_no });
            script.items.push(SequenceItem::BlockStart {
                keyword: keyword.to_owned(),
                label: keyword_label(trimmed, keyword),
            });
            continue;
        }

        if let Some((parents, expected)) = branch_parents(keyword) {
            let inside = open_blocks
                .last()
                .is_some_and(|block| parents.contains(&block.keyword.as_str()));
            if !inside {
                return Err(SequenceParseError::BranchOutsideBlock {
                    line_no,
                    keyword: keyword.to_owned(),
                    expected,
                });
            }
            script.items.push(SequenceItem::BlockBranch {
                keyword: keyword.to_owned(),
                label: keyword_label(trimmed, keyword),
            });
            continue;
        }

        if keyword == "end" {
            if trimmed != "end" {
                return Err(SequenceParseError::UnsupportedSyntax {
                    line_no,
                    line: trimmed.to_owned(),
                });
            }
            if open_blocks.pop().is_none() {
                return Err(SequenceParseError::UnmatchedEnd { line_no });
            }
            script.items.push(SequenceItem::BlockEnd);
            continue;
        }

        if keyword.eq_ignore_ascii_case("note") {
            let caps = note_re().captures(trimmed).ok_or_else(|| {
                SequenceParseError::InvalidNote { line_no, line: trimmed.to_owned() }
            })?;
            let mut who = caps["who"].split(',').map(str::trim).filter(|who| !who.is_empty());
            let Some(first) = who.next() else {
                return Err(SequenceParseError::InvalidNote { line_no, line: trimmed.to_owned() });
            };
            let second = who.next();
            script.ensure_participant(first);
            if let Some(second) = second {
                script.ensure_participant(second);
            }
            let placement = caps["placement"].to_ascii_lowercase();
            let placement = if placement.starts_with("left") {
                NotePlacement::LeftOf(first.to_owned())
            } else if placement.starts_with("right") {
                NotePlacement::RightOf(first.to_owned())
            } else {
                NotePlacement::Over(first.to_owned(), second.map(str::to_owned))
            };
            script.items.push(SequenceItem::Note {
                placement,
                text: caps["text"].trim().to_owned(),
            });
            continue;
        }

        if let Some(caps) = message_re().captures(trimmed) {
            let arrow = Arrow::from_token(&caps["arrow"]).ok_or_else(|| {
                SequenceParseError::UnsupportedSyntax { line_no, line: trimmed.to_owned() }
            })?;
            let from = caps["from"].trim();
            let to = caps["to"].trim();
            script.ensure_participant(from);
            script.ensure_participant(to);
            script.items.push(SequenceItem::Message(SequenceMessage {
                from: from.to_owned(),
                to: to.to_owned(),
                arrow,
                label: caps["label"].trim().to_owned(),
                line_no,
            }));
            continue;
        }

        if !trimmed.contains(':') && ARROW_TOKENS.iter().any(|token| trimmed.contains(token)) {
            return Err(SequenceParseError::MissingMessageText {
                line_no,
                line: trimmed.to_owned(),
            });
        }

        return Err(SequenceParseError::UnsupportedSyntax { line_no, line: trimmed.to_owned() });
    }

    if !saw_header {
        return Err(SequenceParseError::MissingHeader);
    }

    if let Some(unclosed) = open_blocks.pop() {
        return Err(SequenceParseError::UnclosedBlock {
            opened_on_line_no: unclosed.opened_on_line_no,
            keyword: unclosed.keyword,
        });
    }

    Ok(script)
}
