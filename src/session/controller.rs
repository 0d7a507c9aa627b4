//! Capture Session Module
//!
//! Provides a thread-safe session that owns the camera stream, the capture
//! state, and the scene resolver task, and communicates with any frontend
//! through an event channel.
//!
//! # Lifecycle
//!
//! - `start()` opens the stream; a refusal leaves the session in the blocking
//!   `PermissionDenied` state until `retry()`
//! - a stream that dies mid-run is released by the resolver; the session
//!   reports `Unavailable` until `retry()`
//! - the resolver runs while the session is automatic and streaming, and is
//!   cancelled on manual mode, facing switches, scene selection and shutdown
//! - `switch_facing()` releases the old stream before opening the new one
//! - `shutdown()` (or drop) cancels everything and releases the stream

use crate::core::error::{CameraError, Result};
use crate::device::traits::{CameraDevice, FacingMode, StreamConstraints, VideoStream};
use crate::resolver::classifier::SceneClassifier;
use crate::resolver::engine::{
    ResolverConfig, ResolverContext, ResolverPhase, SceneResolver, SharedStream,
};
use crate::scene::catalog::SceneId;
use crate::scene::params::{CaptureParameters, ParamKind};
use crate::session::capture::{CaptureAction, PhotoSink};
use crate::session::events::CameraEvent;
use crate::session::guidance::GuidanceHint;
use crate::session::manual::ManualController;
use crate::session::overlay::{GridType, SceneFrame};
use crate::session::state::{
    lock_state, CameraMode, CaptureState, PermissionState, SharedState,
};
use crate::storage::PhotoRecord;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

// =============================================================================
// Snapshot
// =============================================================================

/// Everything a frontend needs to draw one frame of UI
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub mode: CameraMode,
    pub scene: SceneId,
    pub scene_name: &'static str,
    pub params: CaptureParameters,
    pub focused: Option<ParamKind>,
    /// The active hint, or the scene's static guide
    pub hint: GuidanceHint,
    pub grid: GridType,
    pub scene_frame: Option<SceneFrame>,
    pub facing: FacingMode,
    pub permission: PermissionState,
    pub status_line: String,
    pub resolver_phase: ResolverPhase,
    pub streaming: bool,
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`CaptureSession`]
pub struct CaptureSessionBuilder {
    camera: Arc<dyn CameraDevice>,
    classifier: Arc<dyn SceneClassifier>,
    sink: Option<Arc<dyn PhotoSink>>,
    facing: FacingMode,
    scene: SceneId,
    grid: GridType,
    ideal_size: (u32, u32),
    resolver_enabled: bool,
    resolver_config: ResolverConfig,
    capture: CaptureAction,
    seed: Option<u64>,
    handle: Option<Handle>,
}

impl CaptureSessionBuilder {
    /// Where captured photos go
    pub fn with_sink(mut self, sink: Arc<dyn PhotoSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Camera to open first
    pub fn with_facing(mut self, facing: FacingMode) -> Self {
        self.facing = facing;
        self
    }

    /// Scene to start in (its defaults become the initial parameters)
    pub fn with_scene(mut self, scene: SceneId) -> Self {
        self.scene = scene;
        self
    }

    /// Composition grid shown from the start
    pub fn with_grid(mut self, grid: GridType) -> Self {
        self.grid = grid;
        self
    }

    /// Requested stream resolution
    pub fn with_ideal_size(mut self, width: u32, height: u32) -> Self {
        self.ideal_size = (width, height);
        self
    }

    /// Turn periodic scene detection on or off
    pub fn with_resolver_enabled(mut self, enabled: bool) -> Self {
        self.resolver_enabled = enabled;
        self
    }

    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    pub fn with_capture_action(mut self, capture: CaptureAction) -> Self {
        self.capture = capture;
        self
    }

    /// Seed the tip picker for reproducible hints
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Runtime to spawn background tasks on (defaults to the current one)
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Build the session. Fails outside a Tokio runtime unless a handle was given.
    pub fn build(self) -> Result<CaptureSession> {
        let handle = match self.handle {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| {
                CameraError::RuntimeError(format!("no Tokio runtime available: {}", e))
            })?,
        };

        let resolver = match self.seed {
            Some(seed) => SceneResolver::with_seed(self.classifier, self.resolver_config, seed),
            None => SceneResolver::new(self.classifier, self.resolver_config),
        };
        let (event_tx, event_rx) = unbounded();

        let mut state = CaptureState::with_facing(self.facing);
        state.apply_scene(self.scene);
        state.set_grid(self.grid);

        Ok(CaptureSession {
            camera: self.camera,
            sink: self.sink,
            resolver: Arc::new(resolver),
            resolver_enabled: self.resolver_enabled,
            capture: self.capture,
            ideal_size: self.ideal_size,
            state: state.into_shared(),
            stream: Arc::new(Mutex::new(None)),
            resolver_task: Mutex::new(None),
            handle,
            event_tx,
            event_rx,
        })
    }
}

// =============================================================================
// Capture Session
// =============================================================================

/// The capture core: one camera stream, one state, one resolver
pub struct CaptureSession {
    camera: Arc<dyn CameraDevice>,
    sink: Option<Arc<dyn PhotoSink>>,
    resolver: Arc<SceneResolver>,
    resolver_enabled: bool,
    capture: CaptureAction,
    ideal_size: (u32, u32),
    state: SharedState,
    stream: SharedStream,
    resolver_task: Mutex<Option<JoinHandle<()>>>,
    handle: Handle,
    event_tx: Sender<CameraEvent>,
    event_rx: Receiver<CameraEvent>,
}

impl CaptureSession {
    /// Start building a session around a camera and a classifier
    pub fn builder(
        camera: Arc<dyn CameraDevice>,
        classifier: Arc<dyn SceneClassifier>,
    ) -> CaptureSessionBuilder {
        CaptureSessionBuilder {
            camera,
            classifier,
            sink: None,
            facing: FacingMode::Environment,
            scene: SceneId::Auto,
            grid: GridType::None,
            ideal_size: (1920, 1080),
            resolver_enabled: true,
            resolver_config: ResolverConfig::default(),
            capture: CaptureAction::default(),
            seed: None,
            handle: None,
        }
    }

    fn emit(&self, event: CameraEvent) {
        debug!("{}", event.describe());
        let _ = self.event_tx.send(event);
    }

    fn state(&self) -> MutexGuard<'_, CaptureState> {
        lock_state(&self.state)
    }

    fn stream_slot(&self) -> MutexGuard<'_, Option<Box<dyn VideoStream>>> {
        self.stream.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -------------------------------------------------------------------------
    // Stream lifecycle
    // -------------------------------------------------------------------------

    /// Open the camera for the current facing and start scene detection.
    ///
    /// Any stream already held is released first.
    pub fn start(&self) -> Result<()> {
        self.stop_resolver();
        self.release_stream();

        let facing = self.state().facing();
        let constraints = StreamConstraints::new(facing)
            .with_ideal_size(self.ideal_size.0, self.ideal_size.1);

        match self.camera.open(&constraints) {
            Ok(stream) => {
                *self.stream_slot() = Some(stream);
                self.state().set_permission(PermissionState::Granted);
                info!("Camera started: {} ({})", self.camera.name(), facing);
                self.emit(CameraEvent::StreamStarted {
                    facing,
                    device: self.camera.name(),
                });
                self.restart_resolver();
                Ok(())
            }
            Err(e) => {
                error!("Camera error: {}", e);
                self.state().set_permission(PermissionState::Denied);
                self.emit(CameraEvent::PermissionDenied {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Ask for the camera again after a refusal
    pub fn retry(&self) -> Result<()> {
        info!("Retrying camera access");
        self.start()
    }

    /// Switch between the front and rear camera
    pub fn switch_facing(&self) -> Result<FacingMode> {
        self.stop_resolver();
        self.release_stream();

        let facing = {
            let mut state = self.state();
            let facing = state.facing().toggled();
            state.set_facing(facing);
            facing
        };
        self.start()?;
        Ok(facing)
    }

    /// Stop everything and release the camera. Safe to call repeatedly.
    pub fn shutdown(&self) {
        self.stop_resolver();
        if self.release_stream() {
            info!("Camera released");
        }
    }

    /// Stop and drop the stream. Returns whether one was held.
    fn release_stream(&self) -> bool {
        let taken = self.stream_slot().take();
        match taken {
            Some(mut stream) => {
                stream.stop();
                self.emit(CameraEvent::StreamStopped);
                true
            }
            None => false,
        }
    }

    /// Whether a live stream is held
    pub fn is_streaming(&self) -> bool {
        self.stream_slot()
            .as_ref()
            .map(|stream| stream.is_live())
            .unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Resolver
    // -------------------------------------------------------------------------

    /// Cancel the resolver run and clear its hint and timer
    fn stop_resolver(&self) {
        self.resolver.cancel();
        let task = self
            .resolver_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            task.abort();
        }
        let cleared = self.state().guidance_mut().clear();
        if cleared {
            self.emit(CameraEvent::HintCleared);
        }
    }

    /// Start a fresh resolver run if automatic and streaming
    fn restart_resolver(&self) {
        self.stop_resolver();
        if !self.resolver_enabled || !self.state().is_automatic() || !self.is_streaming() {
            return;
        }
        let task = self.resolver.spawn(
            &self.handle,
            ResolverContext {
                state: Arc::clone(&self.state),
                stream: Arc::clone(&self.stream),
                events: self.event_tx.clone(),
            },
        );
        *self.resolver_task.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }

    pub fn resolver_phase(&self) -> ResolverPhase {
        self.resolver.phase()
    }

    // -------------------------------------------------------------------------
    // Mode, scene, manual adjustment, grid
    // -------------------------------------------------------------------------

    /// Switch between automatic and manual mode
    pub fn set_mode(&self, mode: CameraMode) {
        let params = {
            let mut state = self.state();
            if !state.set_mode(mode) {
                return;
            }
            state.params().clone()
        };
        self.emit(CameraEvent::ModeChanged(mode));

        match mode {
            CameraMode::Manual => self.stop_resolver(),
            CameraMode::Automatic => {
                self.emit(CameraEvent::ParametersChanged(params));
                self.restart_resolver();
            }
        }
    }

    pub fn toggle_mode(&self) -> CameraMode {
        let next = self.state().mode().toggled();
        self.set_mode(next);
        next
    }

    /// Pick a scene by hand. Only allowed in automatic mode; restarts detection.
    pub fn select_scene(&self, scene: SceneId) -> bool {
        let params = {
            let mut state = self.state();
            if !state.apply_scene(scene) {
                warn!("Scene selection ignored in manual mode");
                return false;
            }
            state.params().clone()
        };
        self.emit(CameraEvent::SceneChanged {
            scene,
            detected: false,
        });
        self.emit(CameraEvent::ParametersChanged(params));
        self.restart_resolver();
        true
    }

    /// Run `f` against the manual controller.
    ///
    /// Returns `None` outside manual mode. Emits `ParametersChanged` when `f`
    /// changed anything.
    pub fn with_manual<F, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut ManualController<'_>) -> T,
    {
        let (result, changed) = {
            let mut state = self.state();
            let before = state.params().clone();
            let result = {
                let mut manual = state.manual()?;
                f(&mut manual)
            };
            let after = state.params().clone();
            (result, (before != after).then_some(after))
        };
        if let Some(params) = changed {
            self.emit(CameraEvent::ParametersChanged(params));
        }
        Some(result)
    }

    /// Advance the composition grid
    pub fn cycle_grid(&self) -> GridType {
        let grid = self.state().cycle_grid();
        self.emit(CameraEvent::GridChanged(grid));
        grid
    }

    pub fn set_grid(&self, grid: GridType) {
        self.state().set_grid(grid);
        self.emit(CameraEvent::GridChanged(grid));
    }

    /// Current view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        let streaming = self.is_streaming();
        let state = self.state();
        let scene = state.scene();
        SessionSnapshot {
            mode: state.mode(),
            scene,
            scene_name: scene.descriptor().name,
            params: state.params().clone(),
            focused: state.focused(),
            hint: state.guidance().display(scene),
            grid: state.grid(),
            scene_frame: SceneFrame::for_scene(scene),
            facing: state.facing(),
            permission: state.permission(),
            status_line: state.status_line(),
            resolver_phase: self.resolver.phase(),
            streaming,
        }
    }

    // -------------------------------------------------------------------------
    // Capture
    // -------------------------------------------------------------------------

    /// Freeze the current frame and store it.
    ///
    /// Uses the parameters active at the moment of the call. Failures are
    /// returned and also reported as `CaptureFailed`.
    pub async fn capture(&self) -> Result<PhotoRecord> {
        let result = self.capture_inner().await;
        match &result {
            Ok(record) => {
                info!("Photo saved: {}", record.storage_path);
                self.emit(CameraEvent::PhotoCaptured(record.clone()));
            }
            Err(e) => {
                error!("Capture failed: {}", e);
                self.emit(CameraEvent::CaptureFailed(e.to_string()));
            }
        }
        result
    }

    async fn capture_inner(&self) -> Result<PhotoRecord> {
        let sink = self
            .sink
            .clone()
            .ok_or_else(|| CameraError::PersistenceError("no photo sink configured".into()))?;

        let frame = {
            let mut slot = self.stream_slot();
            let stream = slot.as_mut().ok_or(CameraError::NoStream)?;
            stream.grab_frame()?
        };
        let (facing, scene, params) = {
            let state = self.state();
            (state.facing(), state.scene(), state.params().clone())
        };

        self.flash(self.capture.flash_duration());
        let photo = self.capture.freeze(frame, facing, scene, params)?;

        tokio::task::spawn_blocking(move || sink.persist(&photo))
            .await
            .map_err(|e| CameraError::RuntimeError(format!("persist task failed: {}", e)))?
    }

    fn flash(&self, duration: Duration) {
        self.emit(CameraEvent::FlashStarted);
        let events = self.event_tx.clone();
        self.handle.spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = events.send(CameraEvent::FlashEnded);
        });
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Try to receive the next event (non-blocking)
    pub fn try_recv_event(&self) -> Option<CameraEvent> {
        match self.event_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain all pending events
    pub fn drain_events(&self) -> Vec<CameraEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv_event() {
            events.push(event);
        }
        events
    }

    /// A receiver for consumers on another thread
    pub fn subscribe(&self) -> Receiver<CameraEvent> {
        self.event_rx.clone()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
