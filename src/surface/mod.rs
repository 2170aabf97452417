// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The render surface capability and the events it reports back.
//!
//! Every call is fire-and-forget. Outcomes arrive later as [`SurfaceEvent`]s tagged with the
//! [`Generation`] of the request that caused them.

pub mod bridge;
pub mod channel;

use serde::{Deserialize, Serialize};

use crate::model::{DiagramKind, Generation, MarkerAnchor, RenderSettings, StepMarker, Theme};

pub use bridge::{decode_command, decode_event, encode_command, encode_event, BridgeError};
pub use channel::{ChannelSurface, SurfaceEvents};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub generation: Generation,
    pub text: String,
    pub settings: RenderSettings,
}

/// Pan/zoom over the rendered diagram.
pub trait ViewportControl {
    /// Bring the region of `anchor` into view. Unresolvable anchors are ignored.
    fn focus(&mut self, generation: Generation, anchor: &MarkerAnchor);

    /// Return to the whole-diagram overview.
    fn reset_viewport(&mut self, generation: Generation);
}

pub trait RenderSurface: ViewportControl {
    fn render(&mut self, request: RenderRequest);
}

/// Rows and columns of a rendered frame that a viewport is focused on (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusRegion {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl FocusRegion {
    pub fn rows(&self) -> std::ops::RangeInclusive<usize> {
        self.row_start..=self.row_end
    }

    pub fn center_row(&self) -> usize {
        self.row_start + (self.row_end.saturating_sub(self.row_start)) / 2
    }
}

/// What part of the frame is on screen. `None` focus is the overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    #[serde(default)]
    pub focus: Option<FocusRegion>,
}

impl Viewport {
    pub fn overview() -> Self {
        Self::default()
    }

    pub fn focused(region: FocusRegion) -> Self {
        Self { focus: Some(region) }
    }

    pub fn is_overview(&self) -> bool {
        self.focus.is_none()
    }
}

/// A rendered diagram as text rows, ready for a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderedFrame {
    pub kind: DiagramKind,
    pub theme: Theme,
    pub lines: Vec<String>,
}

impl RenderedFrame {
    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn width(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).max().unwrap_or(0)
    }
}

/// Everything a surface reports, serialized as `{"handler": ..., "body": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "handler", content = "body")]
pub enum SurfaceEvent {
    #[serde(rename = "onLoaded")]
    Loaded,
    #[serde(rename = "onModuleReady")]
    ModuleReady,
    #[serde(rename = "onLog")]
    Log(String),
    #[serde(rename = "onRendered")]
    Rendered { generation: Generation, kind: DiagramKind },
    #[serde(rename = "onError")]
    RenderFailed { generation: Generation, message: String },
    #[serde(rename = "stepsDiscovered")]
    StepsDiscovered { generation: Generation, markers: Vec<StepMarker> },
    #[serde(rename = "frame")]
    Frame { generation: Generation, frame: RenderedFrame },
    #[serde(rename = "viewport")]
    Viewport { generation: Generation, viewport: Viewport },
}

impl SurfaceEvent {
    /// The render pass this event belongs to, if any.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Self::Loaded | Self::ModuleReady | Self::Log(_) => None,
            Self::Rendered { generation, .. }
            | Self::RenderFailed { generation, .. }
            | Self::StepsDiscovered { generation, .. }
            | Self::Frame { generation, .. }
            | Self::Viewport { generation, .. } => Some(*generation),
        }
    }

    pub fn handler_name(&self) -> &'static str {
        match self {
            Self::Loaded => "onLoaded",
            Self::ModuleReady => "onModuleReady",
            Self::Log(_) => "onLog",
            Self::Rendered { .. } => "onRendered",
            Self::RenderFailed { .. } => "onError",
            Self::StepsDiscovered { .. } => "stepsDiscovered",
            Self::Frame { .. } => "frame",
            Self::Viewport { .. } => "viewport",
        }
    }
}

/// Calls into a surface, serialized as `{"call": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum SurfaceCommand {
    RenderDiagram(RenderRequest),
    PanToStep { generation: Generation, anchor: MarkerAnchor },
    ResetView { generation: Generation },
}
