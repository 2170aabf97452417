// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Diagram source and render settings (host-owned), surface readiness, step markers and the
//! stepper position.

pub mod diagram;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod readiness;
pub mod settings;
pub mod step;

pub use diagram::{DiagramKind, DiagramSource, DEMO_DIAGRAM};
pub use readiness::{ReadinessError, SurfaceReadiness};
pub use settings::{RenderSettings, Theme};
pub use step::{
    Generation, MarkerAnchor, NavigationState, StepMarker, StepMove, StepTransitionInfo,
};
