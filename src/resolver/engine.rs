//! Scene Resolver Engine
//!
//! Periodically samples the live frame, asks a `SceneClassifier` what it
//! sees, and maps the answer onto the capture state. Runs only in automatic
//! mode with a live stream.
//!
//! # Cycle
//!
//! ```text
//! Idle -> Scanning -> Sampling -> AwaitingClassification -> ApplyingResult -> Scanning
//! ```
//!
//! One warm-up cycle fires shortly after start, then one per interval. Cycles
//! never overlap. Every run carries a generation number; cancelling bumps the
//! shared generation, and a result from an older generation is dropped before
//! it can touch the state.

use crate::device::traits::VideoStream;
use crate::resolver::classifier::{Classification, SceneClassifier};
use crate::resolver::sampler::{encode_for_classification, SAMPLE_QUALITY, SAMPLE_WIDTH};
use crate::scene::catalog::SceneId;
use crate::session::events::CameraEvent;
use crate::session::guidance::GuidanceHint;
use crate::session::state::{lock_state, CaptureState, PermissionState, SharedState};
use crossbeam_channel::Sender;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// The stream slot shared between a session and its resolver
pub type SharedStream = Arc<Mutex<Option<Box<dyn VideoStream>>>>;

// =============================================================================
// Configuration
// =============================================================================

/// Timing and sampling settings for the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Time between cycles
    pub interval: Duration,
    /// Delay before the first cycle
    pub warmup: Duration,
    /// Width of the classification sample
    pub sample_width: u32,
    /// JPEG quality of the classification sample
    pub sample_quality: u8,
    /// How long a scene tip stays up
    pub scene_hint_ttl: Duration,
    /// How long the fallback notice stays up
    pub fallback_hint_ttl: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            warmup: Duration::from_millis(500),
            sample_width: SAMPLE_WIDTH,
            sample_quality: SAMPLE_QUALITY,
            scene_hint_ttl: Duration::from_millis(4000),
            fallback_hint_ttl: Duration::from_millis(3500),
        }
    }
}

// =============================================================================
// Phase
// =============================================================================

/// Where the resolver is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResolverPhase {
    /// Not running
    Idle = 0,
    /// Waiting for the next cycle
    Scanning = 1,
    /// Grabbing and encoding a frame
    Sampling = 2,
    /// A classification call is outstanding
    AwaitingClassification = 3,
    /// Mapping the answer onto the state
    ApplyingResult = 4,
}

impl From<u8> for ResolverPhase {
    fn from(value: u8) -> Self {
        match value {
            1 => ResolverPhase::Scanning,
            2 => ResolverPhase::Sampling,
            3 => ResolverPhase::AwaitingClassification,
            4 => ResolverPhase::ApplyingResult,
            _ => ResolverPhase::Idle,
        }
    }
}

// =============================================================================
// Applying results
// =============================================================================

/// What a cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new scene was detected and its defaults applied
    SceneChanged(SceneId),
    /// The detected scene was already current
    Unchanged,
    /// An unclear answer dropped the scene back to auto
    FellBack,
    /// An unclear answer while already in auto; nothing to do
    Ignored,
    /// The classifier call failed; nothing changed
    Failed(String),
    /// The run was cancelled or manual mode is on; result discarded
    Stale,
    /// No live stream to sample
    StreamLost,
}

/// A hint shown by a cycle that should disappear on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintTimer {
    pub serial: u64,
    pub ttl: Duration,
}

/// Result of mapping one classification onto the state
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub outcome: CycleOutcome,
    pub events: Vec<CameraEvent>,
    pub timer: Option<HintTimer>,
}

impl Applied {
    fn quiet(outcome: CycleOutcome) -> Self {
        Self {
            outcome,
            events: Vec::new(),
            timer: None,
        }
    }
}

/// Map a classification onto the state.
///
/// Does not check cancellation; the caller must hold the state lock and have
/// confirmed its generation is current. Manual mode yields `Stale`.
pub fn apply_classification<R: Rng + ?Sized>(
    state: &mut CaptureState,
    classification: Classification,
    rng: &mut R,
    config: &ResolverConfig,
) -> Applied {
    if !state.is_automatic() {
        return Applied::quiet(CycleOutcome::Stale);
    }

    match classification {
        Classification::Recognized(scene) if scene != state.scene() => {
            state.apply_scene(scene);
            let tip = scene.descriptor().pick_tip(rng);
            let hint = GuidanceHint::scene_tip(scene, tip);
            let serial = state.guidance_mut().show(hint.clone());
            info!("Detected scene: {}", scene);
            Applied {
                outcome: CycleOutcome::SceneChanged(scene),
                events: vec![
                    CameraEvent::SceneChanged {
                        scene,
                        detected: true,
                    },
                    CameraEvent::ParametersChanged(state.params().clone()),
                    CameraEvent::HintShown(hint),
                ],
                timer: Some(HintTimer {
                    serial,
                    ttl: config.scene_hint_ttl,
                }),
            }
        }
        Classification::Recognized(_) => {
            let mut applied = Applied::quiet(CycleOutcome::Unchanged);
            if state.guidance_mut().clear_scanning() {
                applied.events.push(CameraEvent::HintCleared);
            }
            applied
        }
        Classification::Inconclusive => {
            if state.scene().is_auto() && !state.guidance().is_scanning() {
                return Applied::quiet(CycleOutcome::Ignored);
            }
            let was_auto = state.scene().is_auto();
            state.apply_scene(SceneId::Auto);
            let hint = GuidanceHint::fallback();
            let serial = state.guidance_mut().show(hint.clone());
            debug!("Scene unclear, falling back to auto");

            let mut events = Vec::new();
            if !was_auto {
                events.push(CameraEvent::SceneChanged {
                    scene: SceneId::Auto,
                    detected: true,
                });
                events.push(CameraEvent::ParametersChanged(state.params().clone()));
            }
            events.push(CameraEvent::HintShown(hint));
            Applied {
                outcome: CycleOutcome::FellBack,
                events,
                timer: Some(HintTimer {
                    serial,
                    ttl: config.fallback_hint_ttl,
                }),
            }
        }
        Classification::Failed(err) => {
            if err.is_rate_limit() {
                debug!("Scene analysis skipped: {}", err);
            } else {
                warn!("Scene analysis skipped: {}", err);
            }
            let reason = err.to_string();
            Applied {
                events: vec![CameraEvent::ClassificationFailed(reason.clone())],
                outcome: CycleOutcome::Failed(reason),
                timer: None,
            }
        }
    }
}

/// Clear the hint with `serial` after `ttl`, unless it was replaced first
pub fn schedule_hint_clear(
    handle: &Handle,
    state: SharedState,
    events: Sender<CameraEvent>,
    timer: HintTimer,
) -> JoinHandle<()> {
    handle.spawn(async move {
        tokio::time::sleep(timer.ttl).await;
        let cleared = lock_state(&state).guidance_mut().clear_if(timer.serial);
        if cleared {
            trace!("Hint {} expired", timer.serial);
            let _ = events.send(CameraEvent::HintCleared);
        }
    })
}

// =============================================================================
// Scene Resolver
// =============================================================================

/// Everything a resolver run needs from its session
#[derive(Clone)]
pub struct ResolverContext {
    pub state: SharedState,
    pub stream: SharedStream,
    pub events: Sender<CameraEvent>,
}

/// Periodic scene detection
pub struct SceneResolver {
    config: ResolverConfig,
    classifier: Arc<dyn SceneClassifier>,
    rng: Mutex<StdRng>,
    generation: AtomicU64,
    phase: AtomicU8,
}

impl SceneResolver {
    /// Create a resolver with an entropy-seeded RNG
    pub fn new(classifier: Arc<dyn SceneClassifier>, config: ResolverConfig) -> Self {
        Self::with_rng(classifier, config, StdRng::from_entropy())
    }

    /// Create a resolver whose tip choice is reproducible
    pub fn with_seed(classifier: Arc<dyn SceneClassifier>, config: ResolverConfig, seed: u64) -> Self {
        Self::with_rng(classifier, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(classifier: Arc<dyn SceneClassifier>, config: ResolverConfig, rng: StdRng) -> Self {
        Self {
            config,
            classifier,
            rng: Mutex::new(rng),
            generation: AtomicU64::new(0),
            phase: AtomicU8::new(ResolverPhase::Idle as u8),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn phase(&self) -> ResolverPhase {
        ResolverPhase::from(self.phase.load(Ordering::SeqCst))
    }

    fn set_phase(&self, phase: ResolverPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Invalidate the running generation. Results still in flight are dropped.
    pub fn cancel(&self) -> u64 {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_phase(ResolverPhase::Idle);
        debug!("Resolver cancelled (generation {})", next);
        next
    }

    /// Start a new run on `handle`, invalidating any previous one
    pub fn spawn(self: &Arc<Self>, handle: &Handle, ctx: ResolverContext) -> JoinHandle<()> {
        let generation = self.cancel();
        let resolver = Arc::clone(self);
        let task_handle = handle.clone();
        info!(
            "Scene resolver started ({} classifier, every {:?})",
            self.classifier.name(),
            self.config.interval
        );
        handle.spawn(async move { resolver.run(task_handle, ctx, generation).await })
    }

    async fn run(self: Arc<Self>, handle: Handle, ctx: ResolverContext, generation: u64) {
        let start = Instant::now();
        self.set_phase(ResolverPhase::Scanning);

        tokio::time::sleep(self.config.warmup).await;
        let mut ticker = interval_at(start + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            match self.run_cycle(&handle, &ctx, generation).await {
                CycleOutcome::Stale => break,
                CycleOutcome::StreamLost => {
                    self.release_lost_stream(&ctx, generation);
                    break;
                }
                outcome => trace!("Resolver cycle: {:?}", outcome),
            }
            ticker.tick().await;
        }

        if self.is_current(generation) {
            self.set_phase(ResolverPhase::Idle);
        }
        debug!("Resolver run {} finished", generation);
    }

    /// Drop a dead stream along with the hint and timer it left behind.
    ///
    /// Does nothing once `generation` is superseded: the session has taken the
    /// stream slot back by then.
    fn release_lost_stream(&self, ctx: &ResolverContext, generation: u64) {
        let cleared = {
            let mut state = lock_state(&ctx.state);
            if !self.is_current(generation) {
                return;
            }
            let dead = ctx.stream.lock().unwrap_or_else(|e| e.into_inner()).take();
            if let Some(mut stream) = dead {
                stream.stop();
            }
            state.set_permission(PermissionState::Unavailable);
            state.guidance_mut().clear()
        };

        warn!("Camera stream lost");
        if cleared {
            let _ = ctx.events.send(CameraEvent::HintCleared);
        }
        let _ = ctx.events.send(CameraEvent::StreamLost);
    }

    /// Run a single sample-classify-apply cycle for `generation`
    pub async fn run_cycle(
        &self,
        handle: &Handle,
        ctx: &ResolverContext,
        generation: u64,
    ) -> CycleOutcome {
        if !self.is_current(generation) || !lock_state(&ctx.state).is_automatic() {
            return CycleOutcome::Stale;
        }

        self.set_phase(ResolverPhase::Sampling);
        let frame = {
            let mut slot = ctx.stream.lock().unwrap_or_else(|e| e.into_inner());
            match slot.as_mut() {
                Some(stream) if stream.is_live() => stream.grab_frame().ok(),
                _ => None,
            }
        };
        let Some(frame) = frame else {
            self.set_phase(ResolverPhase::Idle);
            return CycleOutcome::StreamLost;
        };

        let jpeg = match encode_for_classification(
            &frame,
            self.config.sample_width,
            self.config.sample_quality,
        ) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!("Could not encode sample: {}", e);
                self.set_phase(ResolverPhase::Scanning);
                return CycleOutcome::Failed(e.to_string());
            }
        };

        {
            let mut state = lock_state(&ctx.state);
            if !self.is_current(generation) {
                return CycleOutcome::Stale;
            }
            if state.scene().is_auto() && !state.guidance().is_showing() {
                let hint = GuidanceHint::scanning();
                state.guidance_mut().show(hint.clone());
                let _ = ctx.events.send(CameraEvent::HintShown(hint));
            }
        }

        self.set_phase(ResolverPhase::AwaitingClassification);
        let response = self.classifier.classify(&jpeg).await;
        let classification = Classification::from_response(response);

        let mut state = lock_state(&ctx.state);
        if !self.is_current(generation) {
            debug!("Discarding stale classification {:?}", classification);
            return CycleOutcome::Stale;
        }
        self.set_phase(ResolverPhase::ApplyingResult);

        let applied = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            apply_classification(&mut state, classification, &mut *rng, &self.config)
        };
        for event in applied.events {
            let _ = ctx.events.send(event);
        }
        if let Some(timer) = applied.timer {
            let task = schedule_hint_clear(handle, Arc::clone(&ctx.state), ctx.events.clone(), timer);
            state.guidance_mut().attach_timer(timer.serial, task);
        }

        self.set_phase(ResolverPhase::Scanning);
        applied.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::traits::{CameraDevice, FacingMode, StreamConstraints};
    use crate::resolver::classifier::ClassifyError;
    use crate::scene::catalog::descriptor;
    use crate::session::guidance::{FALLBACK_ID, SCANNING_ID};
    use crate::session::state::CameraMode;
    use crate::testdb::{MockCamera, ScriptedClassifier};
    use crossbeam_channel::{unbounded, Receiver};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn drain(rx: &Receiver<CameraEvent>) -> Vec<CameraEvent> {
        rx.try_iter().collect()
    }

    fn context(camera: &MockCamera) -> (ResolverContext, Receiver<CameraEvent>) {
        let stream = camera
            .open(&StreamConstraints::new(FacingMode::Environment))
            .unwrap();
        let (tx, rx) = unbounded();
        let ctx = ResolverContext {
            state: CaptureState::new().into_shared(),
            stream: Arc::new(Mutex::new(Some(stream))),
            events: tx,
        };
        (ctx, rx)
    }

    #[test]
    fn test_phase_from_u8() {
        assert_eq!(ResolverPhase::from(3), ResolverPhase::AwaitingClassification);
        assert_eq!(ResolverPhase::from(200), ResolverPhase::Idle);
    }

    #[test]
    fn test_recognized_new_scene_applies_defaults_and_tip() {
        let mut state = CaptureState::new();
        let applied = apply_classification(
            &mut state,
            Classification::Recognized(SceneId::Portrait),
            &mut rng(),
            &ResolverConfig::default(),
        );
        assert_eq!(applied.outcome, CycleOutcome::SceneChanged(SceneId::Portrait));
        assert_eq!(state.scene(), SceneId::Portrait);
        assert_eq!(state.params(), &descriptor(SceneId::Portrait).default_params());

        let hint = state.guidance().current().unwrap();
        let tips: Vec<&str> = descriptor(SceneId::Portrait).guides.all().collect();
        assert!(tips.contains(&hint.text.as_str()));
        assert_eq!(applied.timer.unwrap().ttl, Duration::from_millis(4000));
        assert_eq!(applied.events.iter().filter(|e| e.is_hint()).count(), 1);
    }

    #[test]
    fn test_same_scene_only_clears_scanning() {
        let mut state = CaptureState::new();
        state.apply_scene(SceneId::Night);
        state.guidance_mut().show(GuidanceHint::scanning());
        let before = state.params().clone();

        let applied = apply_classification(
            &mut state,
            Classification::Recognized(SceneId::Night),
            &mut rng(),
            &ResolverConfig::default(),
        );
        assert_eq!(applied.outcome, CycleOutcome::Unchanged);
        assert_eq!(state.params(), &before);
        assert!(!state.guidance().is_showing());
        assert_eq!(applied.events, vec![CameraEvent::HintCleared]);
    }

    #[test]
    fn test_inconclusive_in_auto_without_scanning_does_nothing() {
        let mut state = CaptureState::new();
        let applied = apply_classification(
            &mut state,
            Classification::Inconclusive,
            &mut rng(),
            &ResolverConfig::default(),
        );
        assert_eq!(applied.outcome, CycleOutcome::Ignored);
        assert!(applied.events.is_empty());
        assert!(!state.guidance().is_showing());
    }

    #[test]
    fn test_inconclusive_falls_back_to_auto() {
        let mut state = CaptureState::new();
        state.apply_scene(SceneId::Food);
        let applied = apply_classification(
            &mut state,
            Classification::Inconclusive,
            &mut rng(),
            &ResolverConfig::default(),
        );
        assert_eq!(applied.outcome, CycleOutcome::FellBack);
        assert_eq!(state.scene(), SceneId::Auto);
        assert_eq!(state.params(), &descriptor(SceneId::Auto).default_params());
        assert_eq!(state.guidance().current().unwrap().id, FALLBACK_ID);
        assert_eq!(applied.timer.unwrap().ttl, Duration::from_millis(3500));
    }

    #[test]
    fn test_inconclusive_replaces_scanning_hint_in_auto() {
        let mut state = CaptureState::new();
        state.guidance_mut().show(GuidanceHint::scanning());
        let applied = apply_classification(
            &mut state,
            Classification::Inconclusive,
            &mut rng(),
            &ResolverConfig::default(),
        );
        assert_eq!(applied.outcome, CycleOutcome::FellBack);
        assert_eq!(state.guidance().current().unwrap().id, FALLBACK_ID);
        assert!(!applied
            .events
            .iter()
            .any(|e| matches!(e, CameraEvent::SceneChanged { .. })));
    }

    #[test]
    fn test_failure_changes_nothing() {
        for err in [
            ClassifyError::RateLimited,
            ClassifyError::Network("connection reset".into()),
        ] {
            let mut state = CaptureState::new();
            state.apply_scene(SceneId::Sport);
            state.guidance_mut().show(GuidanceHint::scanning());
            let applied = apply_classification(
                &mut state,
                Classification::Failed(err.clone()),
                &mut rng(),
                &ResolverConfig::default(),
            );
            assert_eq!(applied.outcome, CycleOutcome::Failed(err.to_string()));
            assert_eq!(state.scene(), SceneId::Sport);
            assert!(state.guidance().is_scanning());
            assert!(applied.timer.is_none());
        }
    }

    #[test]
    fn test_manual_mode_discards_results() {
        let mut state = CaptureState::new();
        state.set_mode(CameraMode::Manual);
        let applied = apply_classification(
            &mut state,
            Classification::Recognized(SceneId::Document),
            &mut rng(),
            &ResolverConfig::default(),
        );
        assert_eq!(applied.outcome, CycleOutcome::Stale);
        assert_eq!(state.scene(), SceneId::Auto);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_shows_scanning_then_scene_tip_that_expires() {
        let camera = MockCamera::new();
        let (ctx, rx) = context(&camera);
        let classifier = Arc::new(
            ScriptedClassifier::with_answers(["PORTRAIT"]).with_delay(Duration::from_millis(800)),
        );
        let resolver = SceneResolver::with_seed(classifier.clone(), ResolverConfig::default(), 1);
        let handle = Handle::current();

        let outcome = resolver.run_cycle(&handle, &ctx, resolver.generation()).await;
        assert_eq!(outcome, CycleOutcome::SceneChanged(SceneId::Portrait));
        assert!(classifier.last_image_len() > 0);

        let events = drain(&rx);
        let shown: Vec<&GuidanceHint> = events
            .iter()
            .filter_map(|e| match e {
                CameraEvent::HintShown(hint) => Some(hint),
                _ => None,
            })
            .collect();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].id, SCANNING_ID);
        assert_eq!(shown[1].kind, crate::session::guidance::HintKind::Scene);

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(lock_state(&ctx.state).guidance().is_showing());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!lock_state(&ctx.state).guidance().is_showing());
        assert_eq!(drain(&rx), vec![CameraEvent::HintCleared]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_in_flight_result() {
        let camera = MockCamera::new();
        let (ctx, _rx) = context(&camera);
        let classifier =
            Arc::new(ScriptedClassifier::with_answers(["night"]).with_delay(Duration::from_secs(2)));
        let resolver = Arc::new(SceneResolver::with_seed(
            classifier,
            ResolverConfig::default(),
            1,
        ));
        let handle = Handle::current();

        let generation = resolver.generation();
        let cycle = {
            let resolver = Arc::clone(&resolver);
            let ctx = ctx.clone();
            let handle = handle.clone();
            tokio::spawn(async move { resolver.run_cycle(&handle, &ctx, generation).await })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(resolver.phase(), ResolverPhase::AwaitingClassification);

        resolver.cancel();
        assert_eq!(cycle.await.unwrap(), CycleOutcome::Stale);
        assert_eq!(lock_state(&ctx.state).scene(), SceneId::Auto);
        assert_eq!(
            lock_state(&ctx.state).params(),
            &descriptor(SceneId::Auto).default_params()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_scene_and_next_cycle_runs() {
        let camera = MockCamera::new();
        let (ctx, rx) = context(&camera);
        let classifier = Arc::new(ScriptedClassifier::new());
        classifier.push_error(ClassifyError::RateLimited);
        classifier.push_answer("food");
        let resolver = Arc::new(SceneResolver::with_seed(
            classifier.clone(),
            ResolverConfig::default(),
            3,
        ));
        let task = resolver.spawn(&Handle::current(), ctx.clone());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(classifier.call_count(), 1);
        assert_eq!(lock_state(&ctx.state).scene(), SceneId::Auto);
        assert!(drain(&rx)
            .iter()
            .any(|e| matches!(e, CameraEvent::ClassificationFailed(_))));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(classifier.call_count(), 2);
        assert_eq!(lock_state(&ctx.state).scene(), SceneId::Food);

        resolver.cancel();
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_loss_stops_the_run() {
        let camera = MockCamera::new();
        let (ctx, rx) = context(&camera);
        ctx.stream.lock().unwrap().take();

        let resolver = Arc::new(SceneResolver::with_seed(
            Arc::new(ScriptedClassifier::new()),
            ResolverConfig::default(),
            5,
        ));
        let task = resolver.spawn(&Handle::current(), ctx.clone());
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(task.is_finished());
        assert_eq!(resolver.phase(), ResolverPhase::Idle);
        assert!(drain(&rx).contains(&CameraEvent::StreamLost));
        assert_eq!(
            lock_state(&ctx.state).permission(),
            PermissionState::Unavailable
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_loss_clears_hint_timer_and_releases_stream() {
        let camera = MockCamera::new();
        let (ctx, rx) = context(&camera);
        let resolver = Arc::new(SceneResolver::with_seed(
            Arc::new(ScriptedClassifier::with_answers(["food"])),
            ResolverConfig::default(),
            7,
        ));
        let task = resolver.spawn(&Handle::current(), ctx.clone());

        // Scene tip shown at 500 ms with a 4000 ms timeout
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(lock_state(&ctx.state).scene(), SceneId::Food);
        assert!(lock_state(&ctx.state).guidance().has_timer());
        drain(&rx);

        ctx.stream.lock().unwrap().as_mut().unwrap().stop();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(task.is_finished());
        {
            let state = lock_state(&ctx.state);
            assert!(!state.guidance().is_showing());
            assert!(!state.guidance().has_timer());
            assert_eq!(state.permission(), PermissionState::Unavailable);
        }
        assert!(ctx.stream.lock().unwrap().is_none());
        assert_eq!(camera.live_streams(), 0);
        assert_eq!(
            drain(&rx),
            vec![CameraEvent::HintCleared, CameraEvent::StreamLost]
        );

        // Nothing fires once the tip's timeout would have run out
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(drain(&rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_run_leaves_stream_alone() {
        let camera = MockCamera::new();
        let (ctx, rx) = context(&camera);
        let resolver = SceneResolver::with_seed(
            Arc::new(ScriptedClassifier::new()),
            ResolverConfig::default(),
            8,
        );
        let generation = resolver.generation();
        resolver.cancel();

        resolver.release_lost_stream(&ctx, generation);
        assert!(ctx.stream.lock().unwrap().is_some());
        assert_eq!(camera.live_streams(), 1);
        assert!(drain(&rx).is_empty());
    }
}
