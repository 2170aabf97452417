// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaido: step-through viewer for Mermaid sequence diagrams.
//!
//! A [`nav::NavigationController`] drives a render surface (the built-in [`engine`], reached
//! over the JSON [`surface::bridge`]) and walks a rendered sequence diagram message by message.
//! The [`tui`] module is the terminal host.

pub mod discovery;
pub mod engine;
pub mod format;
pub mod logging;
pub mod model;
pub mod nav;
pub mod surface;
pub mod tui;
