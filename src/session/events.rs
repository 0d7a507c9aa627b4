//! Session Events Module
//!
//! Defines thread-safe event types emitted by a capture session and its
//! background tasks. Events are sent through a channel and consumed by any
//! frontend polling the session.

use crate::device::traits::FacingMode;
use crate::scene::catalog::SceneId;
use crate::scene::params::CaptureParameters;
use crate::session::guidance::GuidanceHint;
use crate::session::overlay::GridType;
use crate::session::state::CameraMode;
use crate::storage::PhotoRecord;

// =============================================================================
// Camera Events
// =============================================================================

/// Events emitted by a capture session
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    /// A stream was acquired
    StreamStarted {
        /// Which camera is live
        facing: FacingMode,
        /// Device name
        device: String,
    },

    /// Camera access was refused; the session waits for a retry
    PermissionDenied {
        /// Why access failed
        reason: String,
    },

    /// The stream was released on request
    StreamStopped,

    /// The stream stopped delivering frames on its own
    StreamLost,

    /// Automatic/manual mode changed
    ModeChanged(CameraMode),

    /// The scene changed
    SceneChanged {
        scene: SceneId,
        /// Whether the resolver (not the user) made the change
        detected: bool,
    },

    /// The active capture parameters changed
    ParametersChanged(CaptureParameters),

    /// A hint became visible, replacing any previous one
    HintShown(GuidanceHint),

    /// The visible hint went away
    HintCleared,

    /// A classification call failed; the scene is unchanged
    ClassificationFailed(String),

    /// Composition grid changed
    GridChanged(GridType),

    /// Shutter flash acknowledgment on
    FlashStarted,

    /// Shutter flash acknowledgment off
    FlashEnded,

    /// A photo was stored
    PhotoCaptured(PhotoRecord),

    /// Capturing or storing a photo failed
    CaptureFailed(String),
}

impl CameraEvent {
    /// Check if this event carries a hint
    pub fn is_hint(&self) -> bool {
        matches!(self, CameraEvent::HintShown(_) | CameraEvent::HintCleared)
    }

    /// Short description for logs and the CLI
    pub fn describe(&self) -> String {
        match self {
            CameraEvent::StreamStarted { facing, device } => {
                format!("Stream started: {} ({})", device, facing)
            }
            CameraEvent::PermissionDenied { reason } => format!("Camera unavailable: {}", reason),
            CameraEvent::StreamStopped => "Stream stopped".to_string(),
            CameraEvent::StreamLost => "Stream lost".to_string(),
            CameraEvent::ModeChanged(mode) => format!("Mode: {}", mode),
            CameraEvent::SceneChanged { scene, detected } => {
                let name = scene.descriptor().name;
                if *detected {
                    format!("Detected scene: {}", name)
                } else {
                    format!("Scene: {}", name)
                }
            }
            CameraEvent::ParametersChanged(params) => params.summary(),
            CameraEvent::HintShown(hint) => format!("Hint [{}]: {}", hint.kind, hint.text),
            CameraEvent::HintCleared => "Hint cleared".to_string(),
            CameraEvent::ClassificationFailed(e) => format!("Scene analysis skipped: {}", e),
            CameraEvent::GridChanged(grid) => format!("Grid: {}", grid),
            CameraEvent::FlashStarted => "Flash".to_string(),
            CameraEvent::FlashEnded => "Flash off".to_string(),
            CameraEvent::PhotoCaptured(record) => format!("Saved {}", record.storage_path),
            CameraEvent::CaptureFailed(e) => format!("Capture failed: {}", e),
        }
    }
}
