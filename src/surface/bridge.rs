// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! JSON script messages exchanged with the engine task.

use serde_json::Value;
use thiserror::Error;

use super::{SurfaceCommand, SurfaceEvent};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("malformed script message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown script handler: {0}")]
    UnknownHandler(String),
    #[error("bridge channel closed")]
    Closed,
}

const HANDLERS: &[&str] = &[
    "onLoaded",
    "onModuleReady",
    "onLog",
    "onRendered",
    "onError",
    "stepsDiscovered",
    "frame",
    "viewport",
];

pub fn encode_event(event: &SurfaceEvent) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(event)?)
}

pub fn decode_event(message: &str) -> Result<SurfaceEvent, BridgeError> {
    let value: Value = serde_json::from_str(message)?;
    match value.get("handler").and_then(Value::as_str) {
        Some(handler) if !HANDLERS.contains(&handler) => {
            Err(BridgeError::UnknownHandler(handler.to_owned()))
        }
        _ => Ok(serde_json::from_value(value)?),
    }
}

pub fn encode_command(command: &SurfaceCommand) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(command)?)
}

pub fn decode_command(message: &str) -> Result<SurfaceCommand, BridgeError> {
    Ok(serde_json::from_str(message)?)
}
