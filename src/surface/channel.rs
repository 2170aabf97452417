// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use super::bridge::{decode_event, encode_command, BridgeError};
use super::{RenderRequest, RenderSurface, SurfaceCommand, SurfaceEvent, ViewportControl};
use crate::model::{Generation, MarkerAnchor};

/// A [`RenderSurface`] that posts JSON script calls to an engine task.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    commands: UnboundedSender<String>,
}

impl ChannelSurface {
    pub fn new(commands: UnboundedSender<String>) -> Self {
        Self { commands }
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn post(&self, command: SurfaceCommand) {
        if let Err(err) = self.try_post(&command) {
            tracing::warn!(error = %err, "dropping surface command");
        }
    }

    fn try_post(&self, command: &SurfaceCommand) -> Result<(), BridgeError> {
        let message = encode_command(command)?;
        self.commands.send(message).map_err(|_| BridgeError::Closed)
    }
}

impl ViewportControl for ChannelSurface {
    fn focus(&mut self, generation: Generation, anchor: &MarkerAnchor) {
        self.post(SurfaceCommand::PanToStep { generation, anchor: anchor.clone() });
    }

    fn reset_viewport(&mut self, generation: Generation) {
        self.post(SurfaceCommand::ResetView { generation });
    }
}

impl RenderSurface for ChannelSurface {
    fn render(&mut self, request: RenderRequest) {
        self.post(SurfaceCommand::RenderDiagram(request));
    }
}

/// Receiving end of the engine's script messages.
///
/// Malformed messages are logged and skipped.
#[derive(Debug)]
pub struct SurfaceEvents {
    events: UnboundedReceiver<String>,
    disconnected: bool,
}

impl SurfaceEvents {
    pub fn new(events: UnboundedReceiver<String>) -> Self {
        Self { events, disconnected: false }
    }

    /// Whether the sending side has gone away and every queued message was drained.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Next queued event without waiting.
    pub fn try_next(&mut self) -> Option<SurfaceEvent> {
        loop {
            match self.events.try_recv() {
                Ok(message) => {
                    if let Some(event) = decode_logged(&message) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    return None;
                }
            }
        }
    }

    pub async fn next(&mut self) -> Option<SurfaceEvent> {
        loop {
            let Some(message) = self.events.recv().await else {
                self.disconnected = true;
                return None;
            };
            if let Some(event) = decode_logged(&message) {
                return Some(event);
            }
        }
    }
}

fn decode_logged(message: &str) -> Option<SurfaceEvent> {
    match decode_event(message) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::warn!(error = %err, "dropping script message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::{ChannelSurface, SurfaceEvents};
    use crate::model::{Generation, RenderSettings};
    use crate::surface::bridge::{decode_command, encode_event};
    use crate::surface::{RenderRequest, RenderSurface, SurfaceCommand, SurfaceEvent, ViewportControl};

    #[test]
    fn surface_posts_encoded_commands() {
        let (tx, mut rx) = unbounded_channel();
        let mut surface = ChannelSurface::new(tx);
        surface.render(RenderRequest {
            generation: Generation::new(1),
            text: "sequenceDiagram".to_owned(),
            settings: RenderSettings::default(),
        });
        surface.reset_viewport(Generation::new(1));

        let first = decode_command(&rx.try_recv().expect("render")).expect("decode");
        assert!(matches!(first, SurfaceCommand::RenderDiagram(req) if req.generation.get() == 1));
        let second = decode_command(&rx.try_recv().expect("reset")).expect("decode");
        assert_eq!(second, SurfaceCommand::ResetView { generation: Generation::new(1) });
    }

    #[test]
    fn posting_to_a_closed_engine_does_not_panic() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut surface = ChannelSurface::new(tx);
        assert!(surface.is_closed());
        surface.reset_viewport(Generation::new(1));
    }

    #[test]
    fn events_skip_malformed_messages_and_report_disconnect() {
        let (tx, rx) = unbounded_channel();
        let mut events = SurfaceEvents::new(rx);
        tx.send("{oops".to_owned()).expect("send");
        tx.send(encode_event(&SurfaceEvent::Loaded).expect("encode")).expect("send");

        assert_eq!(events.try_next(), Some(SurfaceEvent::Loaded));
        assert_eq!(events.try_next(), None);
        assert!(!events.is_disconnected());

        drop(tx);
        assert_eq!(events.try_next(), None);
        assert!(events.is_disconnected());
    }
}
