//! Guidance hints
//!
//! At most one transient hint is visible at a time. Each shown hint gets a
//! serial number; a timeout only clears the hint it was scheduled for, and
//! showing a new hint aborts the previous hint's timer.

use crate::scene::catalog::SceneId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use tokio::task::JoinHandle;

/// Text shown when a hint would otherwise be empty
pub const GENERIC_GUIDE: &str = "Frame your shot and tap the shutter";

/// Text of the hint shown while a classification is outstanding
pub const SCANNING_TEXT: &str = "Analyzing scene...";

/// Text of the hint shown when detection falls back to auto
pub const FALLBACK_TEXT: &str = "Scene unclear, switched to general mode, adjust manually";

pub const SCANNING_ID: &str = "scanning";
pub const FALLBACK_ID: &str = "fallback";
pub const STATIC_GUIDE_ID: &str = "static-guide";

/// Topic of a hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintKind {
    System,
    Scene,
    Composition,
    Lighting,
    Operation,
}

impl HintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintKind::System => "system",
            HintKind::Scene => "scene",
            HintKind::Composition => "composition",
            HintKind::Lighting => "lighting",
            HintKind::Operation => "operation",
        }
    }
}

impl Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A short message shown over the viewfinder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceHint {
    pub id: String,
    pub text: String,
    pub kind: HintKind,
    /// 1 (high) ..= 3 (low)
    pub priority: u8,
}

impl GuidanceHint {
    /// Build a hint. Blank text is replaced with [`GENERIC_GUIDE`] and the
    /// priority is clamped into 1..=3.
    pub fn new(id: impl Into<String>, text: impl Into<String>, kind: HintKind, priority: u8) -> Self {
        let text = text.into();
        let text = if text.trim().is_empty() {
            GENERIC_GUIDE.to_string()
        } else {
            text
        };
        Self {
            id: id.into(),
            text,
            kind,
            priority: priority.clamp(1, 3),
        }
    }

    /// "Analyzing scene..." while a classification is outstanding
    pub fn scanning() -> Self {
        Self::new(SCANNING_ID, SCANNING_TEXT, HintKind::System, 1)
    }

    /// Shown when an unclear result drops the scene back to auto
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ID, FALLBACK_TEXT, HintKind::System, 1)
    }

    /// A tip announcing a newly detected scene
    pub fn scene_tip(scene: SceneId, text: impl Into<String>) -> Self {
        Self::new(format!("scene-{}", scene), text, HintKind::Scene, 2)
    }

    /// The per-scene default shown when nothing transient is active
    pub fn static_guide(text: impl Into<String>) -> Self {
        Self::new(STATIC_GUIDE_ID, text, HintKind::Composition, 1)
    }

    pub fn is_scanning(&self) -> bool {
        self.id == SCANNING_ID
    }
}

#[derive(Debug)]
struct ActiveHint {
    serial: u64,
    hint: GuidanceHint,
}

/// Holds the single visible hint and its timeout
#[derive(Debug, Default)]
pub struct GuidancePresenter {
    active: Option<ActiveHint>,
    next_serial: u64,
    timer: Option<JoinHandle<()>>,
}

impl GuidancePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the visible hint. Aborts the previous hint's timer.
    ///
    /// Returns the serial to pass to [`clear_if`](Self::clear_if).
    pub fn show(&mut self, hint: GuidanceHint) -> u64 {
        self.cancel_timer();
        self.next_serial += 1;
        let serial = self.next_serial;
        self.active = Some(ActiveHint { serial, hint });
        serial
    }

    /// Keep the timeout task for the hint with `serial`.
    ///
    /// If that hint is no longer visible the task is aborted right away.
    pub fn attach_timer(&mut self, serial: u64, timer: JoinHandle<()>) {
        if self.active_serial() == Some(serial) {
            self.cancel_timer();
            self.timer = Some(timer);
        } else {
            timer.abort();
        }
    }

    /// Clear the hint only if it is still the one with `serial`
    pub fn clear_if(&mut self, serial: u64) -> bool {
        if self.active_serial() == Some(serial) {
            self.active = None;
            // The timer calling us is finishing on its own
            self.timer = None;
            true
        } else {
            false
        }
    }

    /// Clear any visible hint and abort its timer
    pub fn clear(&mut self) -> bool {
        self.cancel_timer();
        self.active.take().is_some()
    }

    /// Clear the hint if it is the scanning status
    pub fn clear_scanning(&mut self) -> bool {
        if self.is_scanning() {
            self.clear()
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&GuidanceHint> {
        self.active.as_ref().map(|active| &active.hint)
    }

    pub fn active_serial(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.serial)
    }

    pub fn is_showing(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_scanning(&self) -> bool {
        self.current().map(GuidanceHint::is_scanning).unwrap_or(false)
    }

    /// Whether a timeout is pending for the visible hint
    #[cfg(test)]
    pub(crate) fn has_timer(&self) -> bool {
        self.timer.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// What to show for `scene` right now
    pub fn display(&self, scene: SceneId) -> GuidanceHint {
        if let Some(hint) = self.current() {
            return hint.clone();
        }
        match scene.descriptor().primary_guide() {
            Some(text) => GuidanceHint::static_guide(text),
            None => GuidanceHint::static_guide(GENERIC_GUIDE),
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for GuidancePresenter {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_blank_text_gets_generic_fallback() {
        let hint = GuidanceHint::new("x", "   ", HintKind::Lighting, 9);
        assert_eq!(hint.text, GENERIC_GUIDE);
        assert_eq!(hint.priority, 3);
        assert_eq!(GuidanceHint::new("y", "ok", HintKind::System, 0).priority, 1);
    }

    #[test]
    fn test_new_hint_replaces_previous() {
        let mut presenter = GuidancePresenter::new();
        let first = presenter.show(GuidanceHint::scanning());
        let second = presenter.show(GuidanceHint::fallback());
        assert_ne!(first, second);
        assert_eq!(presenter.current().unwrap().id, FALLBACK_ID);

        assert!(!presenter.clear_if(first));
        assert!(presenter.is_showing());
        assert!(presenter.clear_if(second));
        assert!(!presenter.is_showing());
    }

    #[test]
    fn test_display_falls_back_to_static_guide() {
        let presenter = GuidancePresenter::new();
        let hint = presenter.display(SceneId::Landscape);
        assert_eq!(hint.id, STATIC_GUIDE_ID);
        assert_eq!(hint.text, "Level the horizon");
        assert_eq!(hint.kind, HintKind::Composition);
    }

    #[test]
    fn test_clear_scanning_keeps_other_hints() {
        let mut presenter = GuidancePresenter::new();
        presenter.show(GuidanceHint::scene_tip(SceneId::Food, "Get close"));
        assert!(!presenter.clear_scanning());
        assert!(presenter.is_showing());

        presenter.show(GuidanceHint::scanning());
        assert!(presenter.clear_scanning());
        assert!(!presenter.is_showing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_aborts_pending_timer() {
        let mut presenter = GuidancePresenter::new();
        let serial = presenter.show(GuidanceHint::fallback());
        presenter.attach_timer(
            serial,
            tokio::spawn(tokio::time::sleep(Duration::from_secs(60))),
        );
        assert!(presenter.clear());
        assert!(!presenter.has_timer());
        assert!(!presenter.clear());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_timer_is_aborted() {
        let mut presenter = GuidancePresenter::new();
        let serial = presenter.show(GuidanceHint::scene_tip(SceneId::Sport, "Pan"));
        presenter.attach_timer(
            serial,
            tokio::spawn(tokio::time::sleep(Duration::from_secs(60))),
        );
        assert!(presenter.has_timer());

        presenter.show(GuidanceHint::scanning());
        assert!(!presenter.has_timer());

        // A timer for a hint that is gone never gets kept
        let stale = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        presenter.attach_timer(serial, stale);
        assert!(!presenter.has_timer());
    }
}
