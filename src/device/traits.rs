//! Camera abstraction traits for testability
//!
//! This module defines traits that abstract camera access, allowing both real
//! frame sources (the replay camera) and mock cameras to be used interchangeably.
//! The session only ever talks to these traits.
//!
//! # Architecture
//!
//! - `CameraDevice` - Opens a video stream for a set of constraints
//! - `VideoStream` - A live stream that yields frames until stopped
//! - `Frame` - One decoded RGB video frame
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use scene_cam::device::{CameraDevice, FacingMode, StreamConstraints};
//!
//! fn grab_one<C: CameraDevice>(camera: &C) -> scene_cam::core::error::Result<(u32, u32)> {
//!     let mut stream = camera.open(&StreamConstraints::new(FacingMode::Environment))?;
//!     let frame = stream.grab_frame()?;
//!     stream.stop();
//!     Ok(frame.dimensions())
//! }
//! ```

use crate::core::error::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Which way the camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera; the preview is mirrored
    User,
    /// Rear camera
    #[default]
    Environment,
}

impl FacingMode {
    /// Check if this is a front-facing camera
    pub fn is_front(&self) -> bool {
        matches!(self, FacingMode::User)
    }

    /// The opposite camera
    pub fn toggled(&self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "front" | "selfie" => Ok(FacingMode::User),
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            other => Err(format!("unknown camera facing '{}'", other)),
        }
    }
}

/// Constraints passed when opening a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    /// Preferred width; devices may deliver something else
    pub ideal_width: u32,
    /// Preferred height; devices may deliver something else
    pub ideal_height: u32,
    /// Audio is never requested by the camera view
    pub audio: bool,
}

impl StreamConstraints {
    /// Constraints with the default 1920×1080 ideal and no audio
    pub fn new(facing: FacingMode) -> Self {
        Self {
            facing,
            ideal_width: 1920,
            ideal_height: 1080,
            audio: false,
        }
    }

    /// Set the ideal resolution
    pub fn with_ideal_size(mut self, width: u32, height: u32) -> Self {
        self.ideal_width = width;
        self.ideal_height = height;
        self
    }
}

/// A single decoded video frame
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// A live video stream owned by exactly one session
pub trait VideoStream: Send {
    /// Grab the current frame
    fn grab_frame(&mut self) -> Result<Frame>;

    /// Whether the stream is still delivering frames
    fn is_live(&self) -> bool;

    /// Which camera this stream comes from
    fn facing(&self) -> FacingMode;

    /// Release the underlying camera handle. Idempotent.
    fn stop(&mut self);
}

/// A camera that can be opened into a video stream
pub trait CameraDevice: Send + Sync {
    /// Open a stream. Fails with `CameraError::PermissionDenied` when access is refused.
    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>>;

    /// Human readable device name
    fn name(&self) -> String;
}
