// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag distinguishing successive render passes.
///
/// Every render request gets a fresh, strictly larger generation; surface events carrying any
/// other generation are stale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Opaque reference to the visual region of a step marker inside a rendered document.
///
/// Coordinates are in document units (SVG user space for the built-in engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerAnchor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element_id: Option<String>,
    x: f64,
    y: f64,
}

impl MarkerAnchor {
    pub fn new(element_id: Option<String>, x: f64, y: f64) -> Self {
        Self { element_id, x, y }
    }

    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// A numbered navigation target discovered in a rendered sequence diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepMarker {
    ordinal: u32,
    anchor: MarkerAnchor,
}

impl StepMarker {
    pub fn new(ordinal: u32, anchor: MarkerAnchor) -> Self {
        Self { ordinal, anchor }
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn anchor(&self) -> &MarkerAnchor {
        &self.anchor
    }
}

/// Result of applying a navigation command to a [`NavigationState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMove {
    /// Zoom in on the given (1-based) step.
    Focus(usize),
    /// Return to the whole-diagram overview (step 0).
    Overview,
    /// Nothing changed.
    Stay,
}

/// Current stepper position. `current_step == 0` is the overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationState {
    current_step: usize,
    total_steps: usize,
}

impl NavigationState {
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn is_overview(&self) -> bool {
        self.current_step == 0
    }

    /// Back to `(0, 0)`, as at the start of every render pass.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Installs a freshly discovered step count and returns to the overview.
    pub fn restart(&mut self, total_steps: usize) {
        self.current_step = 0;
        self.total_steps = total_steps;
    }

    pub fn next(&mut self) -> StepMove {
        if self.current_step >= self.total_steps {
            return StepMove::Stay;
        }
        self.current_step += 1;
        StepMove::Focus(self.current_step)
    }

    pub fn previous(&mut self) -> StepMove {
        match self.current_step {
            0 => StepMove::Stay,
            1 => {
                self.current_step = 0;
                StepMove::Overview
            }
            step => {
                self.current_step = step - 1;
                StepMove::Focus(self.current_step)
            }
        }
    }

    pub fn reset(&mut self) -> StepMove {
        self.current_step = 0;
        StepMove::Overview
    }
}

/// Who talks to whom at a given step of a sequence diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTransitionInfo {
    source: String,
    target: String,
    label: String,
}

impl StepTransitionInfo {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self { source: source.into(), target: target.into(), label: label.into() }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for StepTransitionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{} → {}", self.source, self.target)
        } else {
            write!(f, "{} → {}: {}", self.source, self.target, self.label)
        }
    }
}
