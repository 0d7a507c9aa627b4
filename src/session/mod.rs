//! Capture session module
//!
//! # Submodules
//!
//! - `state` - The capture state container (mode, scene, parameters, hint, grid)
//! - `manual` - Manual adjustment controller
//! - `guidance` - Transient hints and their timers
//! - `overlay` - Composition grids and scene frames
//! - `capture` - Freezing frames into stills
//! - `events` - Events sent to frontends
//! - `controller` - `CaptureSession`, which ties it all together

pub mod capture;
pub mod controller;
pub mod events;
pub mod guidance;
pub mod manual;
pub mod overlay;
pub mod state;

pub use capture::{CaptureAction, CapturedPhoto, GeoLocation, PhotoSink};
pub use controller::{CaptureSession, CaptureSessionBuilder, SessionSnapshot};
pub use events::CameraEvent;
pub use guidance::{GuidanceHint, GuidancePresenter, HintKind};
pub use manual::ManualController;
pub use overlay::{GridType, GuideLine, SceneFrame};
pub use state::{CameraMode, CaptureState, PermissionState};
