// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{
    DiagramKind, DiagramSource, Generation, NavigationState, RenderSettings, StepMarker,
    StepMove, SurfaceReadiness,
};
use crate::surface::{RenderRequest, RenderSurface, RenderedFrame, SurfaceEvent, Viewport};

use super::trigger::{RenderSnapshot, RenderTrigger, TriggerDecision};

/// What the controller reports to the host, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum HostNotification {
    StepChanged(usize),
    TotalStepsChanged(usize),
    RenderError(String),
    RenderCompleted(DiagramKind),
    FrameReady(RenderedFrame),
    ViewportChanged(Viewport),
}

/// The step-navigation state machine.
///
/// Owns the render surface handle, the render-trigger policy and the stepper position. The host
/// feeds it text/settings snapshots, commands and surface events, and drains the resulting
/// [`HostNotification`]s with [`NavigationController::take_notifications`].
#[derive(Debug)]
pub struct NavigationController<S> {
    surface: S,
    readiness: SurfaceReadiness,
    trigger: RenderTrigger,
    generation: Generation,
    in_flight: bool,
    active_kind: Option<DiagramKind>,
    state: NavigationState,
    markers: Vec<StepMarker>,
    outbox: Vec<HostNotification>,
}

impl<S: RenderSurface> NavigationController<S> {
    pub fn new(surface: S) -> Self {
        Self::with_settings(surface, RenderSettings::default())
    }

    pub fn with_settings(surface: S, settings: RenderSettings) -> Self {
        Self {
            surface,
            readiness: SurfaceReadiness::NotLoaded,
            trigger: RenderTrigger::new(settings),
            generation: Generation::default(),
            in_flight: false,
            active_kind: None,
            state: NavigationState::default(),
            markers: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn readiness(&self) -> SurfaceReadiness {
        self.readiness
    }

    /// Generation of the latest render request.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_render_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn active_kind(&self) -> Option<DiagramKind> {
        self.active_kind
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step()
    }

    pub fn total_steps(&self) -> usize {
        self.state.total_steps()
    }

    pub fn markers(&self) -> &[StepMarker] {
        &self.markers
    }

    pub fn has_pending_render(&self) -> bool {
        self.trigger.has_pending()
    }

    pub fn take_notifications(&mut self) -> Vec<HostNotification> {
        std::mem::take(&mut self.outbox)
    }

    pub fn on_diagram_text_changed(&mut self, text: &str) {
        let decision = self.trigger.observe_text(text, self.readiness.is_ready());
        self.apply(decision);
    }

    pub fn on_settings_changed(&mut self, settings: RenderSettings) {
        let decision = self.trigger.observe_settings(settings, self.readiness.is_ready());
        self.apply(decision);
    }

    /// Text and settings in one step, so a combined edit renders once.
    pub fn on_source_changed(&mut self, source: &DiagramSource) {
        let decision =
            self.trigger.observe(source.text(), source.settings(), self.readiness.is_ready());
        self.apply(decision);
    }

    pub fn next(&mut self) {
        if !self.accepts_commands("next") {
            return;
        }
        match self.state.next() {
            StepMove::Focus(step) => self.focus_step(step),
            StepMove::Overview | StepMove::Stay => {}
        }
    }

    pub fn previous(&mut self) {
        if !self.accepts_commands("previous") {
            return;
        }
        match self.state.previous() {
            StepMove::Focus(step) => self.focus_step(step),
            StepMove::Overview => self.show_overview(),
            StepMove::Stay => {}
        }
    }

    pub fn reset(&mut self) {
        if !self.accepts_commands("reset") {
            return;
        }
        self.state.reset();
        self.show_overview();
    }

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        if let Some(generation) = event.generation() {
            if generation != self.generation {
                tracing::trace!(
                    handler = event.handler_name(),
                    event_generation = %generation,
                    generation = %self.generation,
                    "discarding stale surface event"
                );
                return;
            }
        }

        match event {
            SurfaceEvent::Loaded => self.advance_readiness(SurfaceReadiness::Loaded),
            SurfaceEvent::ModuleReady => self.advance_readiness(SurfaceReadiness::ModuleReady),
            SurfaceEvent::Log(message) => tracing::debug!(target: "mermaido::engine", "{message}"),
            SurfaceEvent::Rendered { kind, .. } => self.on_rendered(kind),
            SurfaceEvent::RenderFailed { message, .. } => self.on_render_failed(message),
            SurfaceEvent::StepsDiscovered { markers, .. } => self.on_steps_discovered(markers),
            SurfaceEvent::Frame { frame, .. } => self.outbox.push(HostNotification::FrameReady(frame)),
            SurfaceEvent::Viewport { viewport, .. } => {
                self.outbox.push(HostNotification::ViewportChanged(viewport))
            }
        }
    }

    /// Swaps in a fresh surface (e.g. after the engine restarted).
    ///
    /// Readiness starts over at `NotLoaded`, and the current text renders again once the new
    /// surface is ready.
    pub fn replace_surface(&mut self, surface: S) -> S {
        let previous = std::mem::replace(&mut self.surface, surface);
        self.readiness = SurfaceReadiness::NotLoaded;
        self.trigger.forget_requested();
        self.generation = self.generation.next();
        self.in_flight = false;
        self.active_kind = None;
        self.markers.clear();

        let before = self.state;
        self.state.clear();
        if before.total_steps() != 0 {
            self.outbox.push(HostNotification::TotalStepsChanged(0));
        }
        if before.current_step() != 0 {
            self.outbox.push(HostNotification::StepChanged(0));
        }
        previous
    }

    fn accepts_commands(&self, command: &'static str) -> bool {
        let accepted = self.readiness.is_ready()
            && !self.in_flight
            && self.active_kind == Some(DiagramKind::Sequence);
        if !accepted {
            tracing::trace!(
                command,
                readiness = ?self.readiness,
                in_flight = self.in_flight,
                kind = ?self.active_kind,
                "navigation command dropped"
            );
        }
        accepted
    }

    fn apply(&mut self, decision: TriggerDecision) {
        match decision {
            TriggerDecision::Render(snapshot) => self.start_render(snapshot),
            TriggerDecision::Deferred => {
                tracing::debug!(readiness = ?self.readiness, "render deferred until module ready")
            }
            TriggerDecision::Unchanged => {}
        }
    }

    fn advance_readiness(&mut self, next: SurfaceReadiness) {
        match self.readiness.advance(next) {
            Ok(true) => {
                tracing::debug!(readiness = ?self.readiness, "surface readiness advanced");
                if self.readiness.is_ready() {
                    if let Some(snapshot) = self.trigger.on_ready() {
                        self.start_render(snapshot);
                    }
                }
            }
            Ok(false) => {}
            Err(err) => tracing::warn!(error = %err, "ignoring readiness regression"),
        }
    }

    fn start_render(&mut self, snapshot: RenderSnapshot) {
        self.generation = self.generation.next();
        self.in_flight = true;
        self.active_kind = None;
        self.markers.clear();
        let before = self.state;
        self.state.clear();
        self.outbox.push(HostNotification::StepChanged(0));
        if before.total_steps() != 0 {
            self.outbox.push(HostNotification::TotalStepsChanged(0));
        }

        tracing::debug!(
            generation = %self.generation,
            bytes = snapshot.text.len(),
            settings = ?snapshot.settings,
            "issuing render"
        );
        self.surface.render(RenderRequest {
            generation: self.generation,
            text: snapshot.text,
            settings: snapshot.settings,
        });
    }

    fn on_rendered(&mut self, kind: DiagramKind) {
        if !self.in_flight || self.active_kind.is_some() {
            tracing::debug!(generation = %self.generation, "ignoring duplicate render outcome");
            return;
        }
        self.active_kind = Some(kind);
        self.outbox.push(HostNotification::RenderCompleted(kind));
        if !kind.is_sequence() {
            self.in_flight = false;
            tracing::debug!(generation = %self.generation, kind = kind.label(), "render completed");
        }
    }

    fn on_render_failed(&mut self, message: String) {
        if !self.in_flight {
            return;
        }
        tracing::warn!(generation = %self.generation, %message, "render failed");
        self.in_flight = false;
        self.active_kind = None;
        self.outbox.push(HostNotification::RenderError(message));
    }

    fn on_steps_discovered(&mut self, mut markers: Vec<StepMarker>) {
        if !self.in_flight || self.active_kind != Some(DiagramKind::Sequence) {
            tracing::debug!(generation = %self.generation, "ignoring markers outside a sequence render");
            return;
        }
        markers.sort_by_key(StepMarker::ordinal);
        self.markers = markers;
        self.in_flight = false;
        self.state.restart(self.markers.len());

        let total = self.state.total_steps();
        tracing::debug!(generation = %self.generation, total, "step markers discovered");
        self.outbox.push(HostNotification::TotalStepsChanged(total));
        self.outbox.push(HostNotification::StepChanged(0));
    }

    fn focus_step(&mut self, step: usize) {
        match step.checked_sub(1).and_then(|idx| self.markers.get(idx)) {
            Some(marker) => self.surface.focus(self.generation, marker.anchor()),
            None => tracing::debug!(step, "no marker to focus; viewport unchanged"),
        }
        tracing::trace!(step, total = self.state.total_steps(), "step changed");
        self.outbox.push(HostNotification::StepChanged(step));
    }

    fn show_overview(&mut self) {
        self.surface.reset_viewport(self.generation);
        self.outbox.push(HostNotification::StepChanged(0));
    }
}
