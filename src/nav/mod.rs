// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Step navigation.
//!
//! [`trigger::RenderTrigger`] turns host edits into render requests; [`NavigationController`]
//! issues them, tracks which render pass is current, and moves the stepper over the markers the
//! surface discovers.

pub mod controller;
pub mod trigger;


pub use controller::{HostNotification, NavigationController};
pub use trigger::{RenderSnapshot, RenderTrigger, TriggerDecision};
