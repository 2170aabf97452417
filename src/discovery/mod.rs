// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Step-marker discovery in rendered diagrams.
//!
//! A rendered sequence diagram carries one numbered glyph per message. Those glyphs are found by
//! class, their text parsed as the step ordinal, and their position kept as the anchor the
//! viewport focuses on.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{MarkerAnchor, StepMarker};

/// Class Mermaid puts on sequence-number glyphs.
pub const SEQUENCE_NUMBER_CLASS: &str = "sequenceNumber";

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("rendered document is not valid SVG: {0}")]
    InvalidSvg(#[from] roxmltree::Error),
}

/// An element of a rendered document that carries a given class.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedElement {
    id: Option<String>,
    text: String,
    x: f64,
    y: f64,
}

impl MarkedElement {
    pub fn new(id: Option<String>, text: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id, text: text.into(), x, y }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Class lookup over a rendered document.
pub trait MarkerQuery {
    fn elements_with_class(&self, class: &str) -> Vec<MarkedElement>;
}

impl<Q: MarkerQuery + ?Sized> MarkerQuery for &Q {
    fn elements_with_class(&self, class: &str) -> Vec<MarkedElement> {
        (**self).elements_with_class(class)
    }
}

#[derive(Debug, Clone)]
struct ClassedElement {
    classes: Vec<String>,
    element: MarkedElement,
}

/// Owned index of the classed elements of an SVG document.
#[derive(Debug, Clone, Default)]
pub struct SvgDocument {
    elements: Vec<ClassedElement>,
}

impl SvgDocument {
    pub fn parse(svg: &str) -> Result<Self, DiscoveryError> {
        let doc = roxmltree::Document::parse(svg)?;
        let elements = doc
            .descendants()
            .filter(|node| node.is_element())
            .filter_map(|node| {
                let class = node.attribute("class")?;
                let classes = class.split_whitespace().map(str::to_owned).collect::<Vec<_>>();
                if classes.is_empty() {
                    return None;
                }
                let text = node
                    .descendants()
                    .filter(|child| child.is_text())
                    .filter_map(|child| child.text())
                    .collect::<String>();
                let coord = |name: &str| {
                    node.attribute(name).and_then(|value| value.trim().parse::<f64>().ok())
                };
                Some(ClassedElement {
                    classes,
                    element: MarkedElement::new(
                        node.attribute("id").map(str::to_owned),
                        text,
                        coord("x").unwrap_or_default(),
                        coord("y").unwrap_or_default(),
                    ),
                })
            })
            .collect();
        Ok(Self { elements })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl MarkerQuery for SvgDocument {
    fn elements_with_class(&self, class: &str) -> Vec<MarkedElement> {
        self.elements
            .iter()
            .filter(|entry| entry.classes.iter().any(|candidate| candidate == class))
            .map(|entry| entry.element.clone())
            .collect()
    }
}

/// Scans `document` for sequence-number glyphs.
///
/// Glyphs whose text is not a non-negative integer are skipped. The result is sorted by ordinal;
/// gaps and duplicates are kept as found.
pub fn discover_step_markers(document: &impl MarkerQuery) -> Vec<StepMarker> {
    let mut markers = document
        .elements_with_class(SEQUENCE_NUMBER_CLASS)
        .into_iter()
        .filter_map(|element| {
            let ordinal = element.text.trim().parse::<u32>().ok()?;
            Some(StepMarker::new(ordinal, MarkerAnchor::new(element.id, element.x, element.y)))
        })
        .collect::<Vec<_>>();
    markers.sort_by_key(StepMarker::ordinal);
    markers
}

/// Bounded retry for marker discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlePolicy {
    pub attempts: u32,
    #[serde(with = "millis")]
    pub interval: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self { attempts: 4, interval: Duration::from_millis(50) }
    }
}

impl SettlePolicy {
    /// Upper bound on the time spent waiting between scans.
    pub fn max_wait(&self) -> Duration {
        self.interval.saturating_mul(self.attempts.saturating_sub(1))
    }
}

pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Scans with `probe` until it yields markers or the policy runs out of attempts.
///
/// `probe` is called at least once. Between empty scans the task sleeps for `interval`.
pub async fn discover_settled<Q, F>(policy: SettlePolicy, mut probe: F) -> Vec<StepMarker>
where
    Q: MarkerQuery,
    F: FnMut() -> Q,
{
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        let markers = discover_step_markers(&probe());
        if !markers.is_empty() {
            tracing::trace!(attempt, count = markers.len(), "step markers settled");
            return markers;
        }
        if attempt < attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    tracing::trace!(attempts, "no step markers found");
    Vec::new()
}
