// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mermaido CLI entrypoint.
//!
//! Opens a Mermaid file (or the built-in demo diagram) in the step-through TUI. The diagram
//! engine runs as a task on a current-thread runtime; the TUI loop runs on a blocking thread.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use mermaido::engine::{spawn_engine, EngineConfig};
use mermaido::logging::{default_log_path, init_logging, LOG_ENV};
use mermaido::model::{DiagramSource, RenderSettings};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<file.mmd>] [--dark] [--no-sequence-numbers] [--log-file <path>] [--no-log]\n  {program} --demo [--dark] [--no-sequence-numbers] [--log-file <path>] [--no-log]\n\nWithout a file the built-in demo diagram is shown; --demo cannot be combined with a file.\nA file that does not exist yet starts empty and is created by `w`.\n\nLogs go to --log-file (default {}); set {LOG_ENV} to a tracing filter (default `info`).",
        default_log_path().display()
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    file: Option<PathBuf>,
    dark: bool,
    no_sequence_numbers: bool,
    log_file: Option<PathBuf>,
    no_log: bool,
}

impl CliOptions {
    fn settings(&self) -> RenderSettings {
        RenderSettings::new(!self.no_sequence_numbers, self.dark)
    }
}

fn set_flag(flag: &mut bool) -> Result<(), ()> {
    if *flag {
        return Err(());
    }
    *flag = true;
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => set_flag(&mut options.demo)?,
            "--dark" => set_flag(&mut options.dark)?,
            "--no-sequence-numbers" => set_flag(&mut options.no_sequence_numbers)?,
            "--no-log" => set_flag(&mut options.no_log)?,
            "--log-file" => {
                if options.log_file.is_some() {
                    return Err(());
                }
                options.log_file = Some(PathBuf::from(args.next().ok_or(())?));
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.file.is_some() {
                    return Err(());
                }
                options.file = Some(PathBuf::from(arg));
            }
        }
    }

    if options.demo && options.file.is_some() {
        return Err(());
    }
    if options.no_log && options.log_file.is_some() {
        return Err(());
    }

    Ok(options)
}

fn load_source(options: &CliOptions) -> Result<DiagramSource, Box<dyn Error>> {
    let Some(path) = &options.file else {
        return Ok(DiagramSource::new(mermaido::model::DEMO_DIAGRAM, options.settings()));
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "file not found; starting empty");
            String::new()
        }
        Err(err) => return Err(format!("failed to read {}: {err}", path.display()).into()),
    };
    Ok(DiagramSource::new(text, options.settings()))
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "mermaido".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        if !options.no_log {
            let log_path = options.log_file.clone().unwrap_or_else(default_log_path);
            init_logging(&log_path)?;
        }

        let source = load_source(&options)?;
        let path = options.file.clone();
        tracing::info!(
            path = ?path,
            kind = source.kind().label(),
            settings = ?source.settings(),
            "starting mermaido"
        );

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let (surface, events) = spawn_engine(EngineConfig::default());
            let tui_join = tokio::task::spawn_blocking(move || {
                mermaido::tui::run(source, path, surface, events).map_err(|err| err.to_string())
            })
            .await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("mermaido: {err}");
        std::process::exit(1);
    }
}
