// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tracing setup for the binary.
//!
//! The TUI owns the terminal, so logs go to a file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directives.
pub const LOG_ENV: &str = "MERMAIDO_LOG";
const DEFAULT_DIRECTIVES: &str = "info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    OpenLogFile { path: PathBuf, source: std::io::Error },
    #[error("invalid {LOG_ENV} filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("mermaido.log")
}

/// Parses filter directives, falling back to `info` when none are given.
pub fn env_filter(directives: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let directives = directives.map(str::trim).filter(|d| !d.is_empty());
    Ok(EnvFilter::try_new(directives.unwrap_or(DEFAULT_DIRECTIVES))?)
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenLogFile { path: path.to_owned(), source })
}

/// Installs a global fmt subscriber appending to `path`, filtered by [`LOG_ENV`].
pub fn init_logging(path: &Path) -> Result<(), LoggingError> {
    let filter = env_filter(std::env::var(LOG_ENV).ok().as_deref())?;
    let file = open_log_file(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::{env_filter, open_log_file, LoggingError};

    #[test]
    fn empty_directives_fall_back_to_info() {
        assert_eq!(env_filter(None).expect("filter").to_string(), "info");
        assert_eq!(env_filter(Some("  ")).expect("filter").to_string(), "info");
        assert_eq!(
            env_filter(Some("mermaido=debug")).expect("filter").to_string(),
            "mermaido=debug"
        );
    }

    #[test]
    fn bad_directives_are_reported() {
        assert!(matches!(env_filter(Some("mermaido=loud")), Err(LoggingError::InvalidFilter(_))));
    }

    #[test]
    fn missing_log_directory_is_reported_with_path() {
        let path = std::env::temp_dir().join("mermaido-missing-dir").join("nested").join("x.log");
        let err = open_log_file(&path).unwrap_err();
        assert!(err.to_string().contains("x.log"));
    }
}
