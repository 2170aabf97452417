// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::RenderSettings;

/// The `(text, settings)` pair a render is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderSnapshot {
    pub text: String,
    pub settings: RenderSettings,
}

impl RenderSnapshot {
    pub fn new(text: impl Into<String>, settings: RenderSettings) -> Self {
        Self { text: text.into(), settings }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerDecision {
    /// Issue a render for this snapshot now.
    Render(RenderSnapshot),
    /// The surface is not ready; the snapshot is kept as pending.
    Deferred,
    /// Nothing to render.
    Unchanged,
}

/// Decides when host edits turn into render requests.
///
/// The latest observed pair is compared against the last pair requested for rendering. While
/// the surface is not ready at most one render is pending, always for the latest observed pair.
#[derive(Debug, Clone, Default)]
pub struct RenderTrigger {
    observed: RenderSnapshot,
    requested: Option<RenderSnapshot>,
    pending: bool,
}

impl RenderTrigger {
    pub fn new(settings: RenderSettings) -> Self {
        Self { observed: RenderSnapshot::new(String::new(), settings), ..Self::default() }
    }

    pub fn observed(&self) -> &RenderSnapshot {
        &self.observed
    }

    pub fn requested(&self) -> Option<&RenderSnapshot> {
        self.requested.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn observe_text(&mut self, text: &str, ready: bool) -> TriggerDecision {
        let settings = self.observed.settings;
        self.observe(text, settings, ready)
    }

    pub fn observe_settings(&mut self, settings: RenderSettings, ready: bool) -> TriggerDecision {
        let text = self.observed.text.clone();
        self.observe(&text, settings, ready)
    }

    pub fn observe(&mut self, text: &str, settings: RenderSettings, ready: bool) -> TriggerDecision {
        if self.observed.text != text {
            self.observed.text = text.to_owned();
        }
        self.observed.settings = settings;

        if self.observed.text.is_empty() || !self.differs_from_requested() {
            self.pending = false;
            return TriggerDecision::Unchanged;
        }
        if !ready {
            self.pending = true;
            return TriggerDecision::Deferred;
        }
        TriggerDecision::Render(self.take_request())
    }

    /// Called once the surface reaches module-ready; yields the pending render, if any.
    pub fn on_ready(&mut self) -> Option<RenderSnapshot> {
        if !std::mem::take(&mut self.pending) {
            return None;
        }
        if self.observed.text.is_empty() || !self.differs_from_requested() {
            return None;
        }
        Some(self.take_request())
    }

    /// Drops the record of what was last requested, e.g. after swapping in a fresh surface.
    ///
    /// The current observed pair becomes pending again.
    pub fn forget_requested(&mut self) {
        self.requested = None;
        self.pending = !self.observed.text.is_empty();
    }

    fn differs_from_requested(&self) -> bool {
        self.requested.as_ref() != Some(&self.observed)
    }

    fn take_request(&mut self) -> RenderSnapshot {
        self.pending = false;
        let snapshot = self.observed.clone();
        self.requested = Some(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderSnapshot, RenderTrigger, TriggerDecision};
    use crate::model::RenderSettings;

    #[test]
    fn identical_text_does_not_rerender() {
        let mut trigger = RenderTrigger::default();
        assert!(matches!(trigger.observe_text("graph TD", true), TriggerDecision::Render(_)));
        assert_eq!(trigger.observe_text("graph TD", true), TriggerDecision::Unchanged);
    }

    #[test]
    fn settings_change_renders_current_text() {
        let mut trigger = RenderTrigger::default();
        trigger.observe_text("graph TD", true);
        let dark = RenderSettings::default().with_dark_mode(true);
        assert_eq!(
            trigger.observe_settings(dark, true),
            TriggerDecision::Render(RenderSnapshot::new("graph TD", dark))
        );
        assert_eq!(trigger.observe_settings(dark, true), TriggerDecision::Unchanged);
    }

    #[test]
    fn empty_text_never_renders_but_keeps_settings() {
        let mut trigger = RenderTrigger::default();
        let dark = RenderSettings::default().with_dark_mode(true);
        assert_eq!(trigger.observe_settings(dark, true), TriggerDecision::Unchanged);
        assert_eq!(trigger.observe_text("", true), TriggerDecision::Unchanged);
        assert_eq!(
            trigger.observe_text("pie", true),
            TriggerDecision::Render(RenderSnapshot::new("pie", dark))
        );
    }

    #[test]
    fn only_latest_text_is_pending_at_readiness() {
        let mut trigger = RenderTrigger::default();
        assert_eq!(trigger.observe_text("first", false), TriggerDecision::Deferred);
        assert_eq!(trigger.observe_text("second", false), TriggerDecision::Deferred);
        assert!(trigger.has_pending());

        let snapshot = trigger.on_ready().expect("pending render");
        assert_eq!(snapshot.text, "second");
        assert_eq!(trigger.on_ready(), None);
    }

    #[test]
    fn clearing_text_before_ready_drops_the_pending_render() {
        let mut trigger = RenderTrigger::default();
        trigger.observe_text("first", false);
        assert_eq!(trigger.observe_text("", false), TriggerDecision::Unchanged);
        assert_eq!(trigger.on_ready(), None);
    }

    #[test]
    fn forgetting_requested_makes_current_text_pending() {
        let mut trigger = RenderTrigger::default();
        trigger.observe_text("graph TD", true);
        trigger.forget_requested();
        assert!(trigger.has_pending());
        assert_eq!(trigger.on_ready().map(|s| s.text), Some("graph TD".to_owned()));
    }
}
