// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use thiserror::Error;

/// Load state of one render surface lifetime.
///
/// Transitions only move forward; a replacement surface starts over at `NotLoaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SurfaceReadiness {
    #[default]
    NotLoaded,
    Loaded,
    ModuleReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("surface readiness cannot move backwards from {from:?} to {to:?}")]
pub struct ReadinessError {
    from: SurfaceReadiness,
    to: SurfaceReadiness,
}

impl SurfaceReadiness {
    pub fn is_ready(self) -> bool {
        self == Self::ModuleReady
    }

    /// Moves to `next`, returning whether the state changed.
    ///
    /// Skipping a state (`NotLoaded -> ModuleReady`) is allowed; moving backwards is not.
    pub fn advance(&mut self, next: Self) -> Result<bool, ReadinessError> {
        if next < *self {
            return Err(ReadinessError { from: *self, to: next });
        }
        let changed = next != *self;
        *self = next;
        Ok(changed)
    }
}
