//! Scene Cam Library
//!
//! The capture core of a scene-aware camera: while in automatic mode a
//! background resolver periodically samples the live stream, asks an AI
//! classifier what kind of scene it sees, and applies that scene's capture
//! presets and guidance. Manual mode hands the parameters to the user.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`core`] - Configuration and error handling
//! - [`scene`] - Scene catalog, capture parameters and their option lists
//! - [`device`] - Camera device abstraction and the image-file replay camera
//! - [`resolver`] - Periodic scene classification (Gemini client, sampling, cancellation)
//! - [`session`] - Capture session: state, guidance hints, manual control, capture
//! - [`storage`] - Local photo gallery with JSON sidecars, trash, quota and albums
//! - [`cli`] - Command-line interface (only used by the binary)
//! - [`testdb`] - Mock camera and scripted classifier for testing
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use scene_cam::resolver::GeminiClassifier;
//! use scene_cam::session::CaptureSession;
//! use scene_cam::storage::FileGallery;
//! use scene_cam::device::ReplayCamera;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let camera = Arc::new(ReplayCamera::new("./frames")?);
//!     let classifier = Arc::new(GeminiClassifier::from_env(
//!         "GEMINI_API_KEY",
//!         Duration::from_secs(20),
//!     )?);
//!     let gallery = Arc::new(FileGallery::open("./gallery")?);
//!
//!     let session = CaptureSession::builder(camera, classifier)
//!         .with_sink(gallery)
//!         .build()?;
//!     session.start()?;
//!
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     for event in session.drain_events() {
//!         println!("{}", event.describe());
//!     }
//!
//!     let record = session.capture().await?;
//!     println!("Saved {}", record.storage_path);
//!     Ok(())
//! }
//! ```
//!
//! # Testing Without a Camera
//!
//! The `testdb` module provides a [`testdb::MockCamera`] with synthetic frames
//! and a [`testdb::ScriptedClassifier`] with queued answers, so the whole
//! session can be driven under a paused Tokio clock.

pub mod cli;
pub mod core;
pub mod device;
pub mod resolver;
pub mod scene;
pub mod session;
pub mod storage;
pub mod testdb;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
