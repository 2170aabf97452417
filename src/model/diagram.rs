// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::settings::RenderSettings;

/// The diagram shown when no file is opened.
pub const DEMO_DIAGRAM: &str = "sequenceDiagram
    Alice->>John: Hello John, how are you?
    John-->>Alice: Great!
    Alice-)John: See you later!
";

/// Leading keywords Mermaid accepts, apart from the two kinds classified explicitly.
const OTHER_DIAGRAM_KEYWORDS: &[&str] = &[
    "classDiagram",
    "classDiagram-v2",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "gantt",
    "pie",
    "journey",
    "gitGraph",
    "mindmap",
    "timeline",
    "quadrantChart",
    "requirementDiagram",
    "C4Context",
    "C4Container",
    "C4Component",
    "C4Dynamic",
    "C4Deployment",
    "sankey-beta",
    "xychart-beta",
    "block-beta",
    "packet-beta",
    "kanban",
    "architecture-beta",
];

/// The type of diagram, as far as step navigation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    Sequence,
    Flowchart,
    #[default]
    Other,
}

impl DiagramKind {
    /// Detects the diagram type from the leading token of the first meaningful line.
    ///
    /// Blank lines, `%%` comments and a `---` front-matter block are skipped. Returns `None`
    /// when the token is not a diagram keyword Mermaid knows.
    pub fn detect(text: &str) -> Option<Self> {
        let token = leading_token(text)?;
        match token {
            "sequenceDiagram" => Some(Self::Sequence),
            "flowchart" | "graph" => Some(Self::Flowchart),
            _ if OTHER_DIAGRAM_KEYWORDS.contains(&token) => Some(Self::Other),
            _ => None,
        }
    }

    /// Like [`DiagramKind::detect`], but unknown text classifies as [`DiagramKind::Other`].
    pub fn classify(text: &str) -> Self {
        Self::detect(text).unwrap_or_default()
    }

    pub fn is_sequence(self) -> bool {
        self == Self::Sequence
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sequence => "Sequence",
            Self::Flowchart => "Flowchart",
            Self::Other => "Diagram",
        }
    }
}

fn leading_token(text: &str) -> Option<&str> {
    let (_, line) = content_lines(text).next()?;
    line.split(|ch: char| ch.is_whitespace() || ch == ';')
        .next()
        .filter(|token| !token.is_empty())
}

/// Yields `(line_no, trimmed_line)` for every meaningful line of a Mermaid document.
///
/// Blank lines and `%%` comments are skipped, as is a leading `---` front-matter block.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut in_front_matter = false;
    let mut seen_content = false;
    text.lines().enumerate().filter_map(move |(idx, line)| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            return None;
        }
        if trimmed == "---" {
            if in_front_matter {
                in_front_matter = false;
                return None;
            }
            if !seen_content {
                in_front_matter = true;
                return None;
            }
        }
        if in_front_matter {
            return None;
        }
        seen_content = true;
        Some((idx + 1, trimmed))
    })
}

/// The host-owned diagram text plus the settings that affect rendering.
///
/// The navigation layer only ever receives snapshots of this value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagramSource {
    text: String,
    settings: RenderSettings,
}

impl DiagramSource {
    pub fn new(text: impl Into<String>, settings: RenderSettings) -> Self {
        Self { text: text.into(), settings }
    }

    pub fn demo() -> Self {
        Self::new(DEMO_DIAGRAM, RenderSettings::default())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    pub fn kind(&self) -> DiagramKind {
        DiagramKind::classify(&self.text)
    }

    /// Replaces the text, returning whether it changed.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.text == text {
            return false;
        }
        self.text = text;
        true
    }

    /// Replaces the settings, returning whether they changed.
    pub fn set_settings(&mut self, settings: RenderSettings) -> bool {
        if self.settings == settings {
            return false;
        }
        self.settings = settings;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagramKind, DiagramSource, DEMO_DIAGRAM};
    use crate::model::RenderSettings;

    #[test]
    fn detects_sequence_after_comments_and_front_matter() {
        let text = "---\ntitle: Greeting\n---\n%% leading comment\n\n  sequenceDiagram\n  A->>B: hi\n";
        assert_eq!(DiagramKind::detect(text), Some(DiagramKind::Sequence));
    }

    #[test]
    fn detects_flowchart_and_graph_headers() {
        assert_eq!(DiagramKind::detect("flowchart LR\nA-->B"), Some(DiagramKind::Flowchart));
        assert_eq!(DiagramKind::detect("graph TD;A-->B"), Some(DiagramKind::Flowchart));
    }

    #[test]
    fn unknown_leading_token_is_not_detected_but_classifies_as_other() {
        assert_eq!(DiagramKind::detect("sequence Alice->>Bob"), None);
        assert_eq!(DiagramKind::classify("sequence Alice->>Bob"), DiagramKind::Other);
        assert_eq!(DiagramKind::detect(""), None);
        assert_eq!(DiagramKind::detect("pie title Pets"), Some(DiagramKind::Other));
    }

    #[test]
    fn source_setters_report_changes() {
        let mut source = DiagramSource::demo();
        assert_eq!(source.text(), DEMO_DIAGRAM);
        assert_eq!(source.kind(), DiagramKind::Sequence);

        assert!(!source.set_text(DEMO_DIAGRAM));
        assert!(source.set_text("graph TD\nA-->B"));
        assert_eq!(source.kind(), DiagramKind::Flowchart);

        assert!(!source.set_settings(RenderSettings::default()));
        assert!(source.set_settings(RenderSettings::default().toggled_dark_mode()));
        assert!(source.settings().dark_mode());
    }
}
