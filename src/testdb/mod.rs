//! Test Database Module
//!
//! Test doubles for exercising the capture core without a camera or network
//! access.
//!
//! # Contents
//!
//! - **Mock camera**: solid-color frames, permission denial on demand, and
//!   counters for live streams so tests can check a stream is never held twice
//! - **Scripted classifier**: queued answers and errors, with an optional
//!   delay to keep a call outstanding
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scene_cam::session::CaptureSession;
//! use scene_cam::testdb::{MockCamera, ScriptedClassifier};
//!
//! # async fn demo() -> scene_cam::core::error::Result<()> {
//! let camera = Arc::new(MockCamera::new());
//! let classifier = Arc::new(ScriptedClassifier::with_answers(["portrait"]));
//! let session = CaptureSession::builder(camera, classifier).build()?;
//! session.start()?;
//! # Ok(())
//! # }
//! ```

pub mod mock_camera;
pub mod scripted;

pub use mock_camera::{MockCamera, MockCameraConfig, EDGE_MARKER};
pub use scripted::ScriptedClassifier;
