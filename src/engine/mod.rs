// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in diagram engine.
//!
//! Runs as its own tokio task and is reached only through JSON script messages, the way a
//! page script would be. After start-up it reports `onLoaded`, loads its "module" and reports
//! `onModuleReady`; from then on it renders, pans and resets on request.

mod canvas;
pub mod layout;
pub(crate) mod text;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::discovery::{discover_settled, SettlePolicy, SvgDocument};
use crate::model::{DiagramKind, Generation, MarkerAnchor};
use crate::surface::bridge::{decode_command, encode_event};
use crate::surface::{
    ChannelSurface, RenderRequest, SurfaceCommand, SurfaceEvent, SurfaceEvents, Viewport,
};

pub use canvas::CanvasError;
pub use layout::{render_page, EngineError, RenderedPage, StepRegion};

/// Log line posted once the engine accepts renders.
pub const MODULE_READY_LOG: &str = "Mermaid module loaded and ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between `onLoaded` and `onModuleReady`.
    #[serde(with = "crate::discovery::millis")]
    pub module_load_delay: Duration,
    pub settle: SettlePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { module_load_delay: Duration::from_millis(30), settle: SettlePolicy::default() }
    }
}

/// Starts the engine task on the current tokio runtime.
///
/// The task ends when the returned surface (and every clone of it) is dropped.
pub fn spawn_engine(config: EngineConfig) -> (ChannelSurface, SurfaceEvents) {
    let (command_tx, command_rx) = unbounded_channel();
    let (event_tx, event_rx) = unbounded_channel();
    tokio::spawn(run_engine(config, command_rx, event_tx));
    (ChannelSurface::new(command_tx), SurfaceEvents::new(event_rx))
}

#[derive(Debug, Clone)]
struct Outbox {
    events: UnboundedSender<String>,
}

impl Outbox {
    fn post(&self, event: SurfaceEvent) {
        let handler = event.handler_name();
        match encode_event(&event) {
            Ok(message) => {
                if self.events.send(message).is_err() {
                    tracing::trace!(handler, "host gone; dropping script message");
                }
            }
            Err(err) => tracing::warn!(handler, error = %err, "failed to encode script message"),
        }
    }
}

struct Engine {
    config: EngineConfig,
    outbox: Outbox,
    page: Option<(Generation, RenderedPage)>,
}

async fn run_engine(
    config: EngineConfig,
    mut commands: UnboundedReceiver<String>,
    events: UnboundedSender<String>,
) {
    let mut engine = Engine { config, outbox: Outbox { events }, page: None };

    engine.outbox.post(SurfaceEvent::Loaded);
    tokio::time::sleep(config.module_load_delay).await;
    engine.outbox.post(SurfaceEvent::Log(MODULE_READY_LOG.to_owned()));
    engine.outbox.post(SurfaceEvent::ModuleReady);

    while let Some(message) = commands.recv().await {
        match decode_command(&message) {
            Ok(command) => engine.handle(command),
            Err(err) => tracing::warn!(error = %err, "engine dropping script call"),
        }
    }
    tracing::debug!("engine stopped");
}

impl Engine {
    fn handle(&mut self, command: SurfaceCommand) {
        match command {
            SurfaceCommand::RenderDiagram(request) => self.render(request),
            SurfaceCommand::PanToStep { generation, anchor } => self.pan_to(generation, &anchor),
            SurfaceCommand::ResetView { generation } => self.outbox.post(SurfaceEvent::Viewport {
                generation,
                viewport: Viewport::overview(),
            }),
        }
    }

    fn render(&mut self, request: RenderRequest) {
        let RenderRequest { generation, text, settings } = request;
        let started = Instant::now();
        let page = match render_page(&text, settings) {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!(generation = %generation, error = %err, "render failed");
                self.page = None;
                self.outbox.post(SurfaceEvent::RenderFailed { generation, message: err.to_string() });
                return;
            }
        };

        let kind = page.frame.kind;
        self.outbox.post(SurfaceEvent::Viewport { generation, viewport: Viewport::overview() });
        self.outbox.post(SurfaceEvent::Frame { generation, frame: page.frame.clone() });
        self.outbox.post(SurfaceEvent::Rendered { generation, kind });
        self.outbox.post(SurfaceEvent::Log(format!(
            "Rendered {} ({generation}) in {} ms",
            kind.label(),
            started.elapsed().as_millis()
        )));

        if kind == DiagramKind::Sequence {
            let svg = page.svg.clone();
            let settle = self.config.settle;
            let outbox = self.outbox.clone();
            tokio::spawn(async move {
                let markers = match SvgDocument::parse(&svg) {
                    Ok(doc) => discover_settled(settle, || &doc).await,
                    Err(err) => {
                        outbox.post(SurfaceEvent::Log(format!("Step discovery failed: {err}")));
                        Vec::new()
                    }
                };
                outbox.post(SurfaceEvent::StepsDiscovered { generation, markers });
            });
        }
        self.page = Some((generation, page));
    }

    fn pan_to(&self, generation: Generation, anchor: &MarkerAnchor) {
        let region = self
            .page
            .as_ref()
            .filter(|(current, _)| *current == generation)
            .and_then(|(_, page)| page.region_for(anchor));
        match region {
            Some(region) => self.outbox.post(SurfaceEvent::Viewport {
                generation,
                viewport: Viewport::focused(region),
            }),
            None => tracing::debug!(generation = %generation, "pan target not on the current page"),
        }
    }
}
