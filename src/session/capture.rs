//! Capture action
//!
//! Freezes a full-resolution frame into a JPEG still, mirrored for the front
//! camera, and hands it to a `PhotoSink` along with the scene and parameters
//! that were active when the shutter was pressed.

use crate::core::error::{CameraError, Result};
use crate::device::traits::{FacingMode, Frame};
use crate::scene::catalog::SceneId;
use crate::scene::params::CaptureParameters;
use crate::storage::PhotoRecord;
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default JPEG quality for stills
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Default length of the flash acknowledgment
pub const DEFAULT_FLASH_MS: u64 = 150;

/// Where a photo was taken
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// A still image ready to be persisted
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    /// Encoded JPEG bytes
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub scene: SceneId,
    pub params: CaptureParameters,
    pub facing: FacingMode,
    pub taken_at: DateTime<Utc>,
    pub location: Option<GeoLocation>,
}

impl CapturedPhoto {
    pub fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    pub fn size(&self) -> u64 {
        self.jpeg.len() as u64
    }
}

/// Persistence collaborator for captured photos
pub trait PhotoSink: Send + Sync {
    /// Store a photo and return its record
    fn persist(&self, photo: &CapturedPhoto) -> Result<PhotoRecord>;
}

/// Encode an RGB image as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
    encoder.encode_image(image)?;
    Ok(output)
}

/// Shutter settings
#[derive(Debug, Clone, Copy)]
pub struct CaptureAction {
    quality: u8,
    flash: Duration,
}

impl Default for CaptureAction {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            flash: Duration::from_millis(DEFAULT_FLASH_MS),
        }
    }
}

impl CaptureAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn with_flash(mut self, flash: Duration) -> Self {
        self.flash = flash;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// How long the flash acknowledgment stays on
    pub fn flash_duration(&self) -> Duration {
        self.flash
    }

    /// Freeze a frame into a still photo
    pub fn freeze(
        &self,
        frame: Frame,
        facing: FacingMode,
        scene: SceneId,
        params: CaptureParameters,
    ) -> Result<CapturedPhoto> {
        let mut image = frame.into_image();
        if image.width() == 0 || image.height() == 0 {
            return Err(CameraError::ImageError("empty frame".to_string()));
        }
        if facing.is_front() {
            image::imageops::flip_horizontal_in_place(&mut image);
        }

        let jpeg = encode_jpeg(&image, self.quality)?;
        let taken_at = Utc::now();
        debug!(
            "Captured {}x{} still ({} bytes, scene {})",
            image.width(),
            image.height(),
            jpeg.len(),
            scene
        );

        Ok(CapturedPhoto {
            jpeg,
            width: image.width(),
            height: image.height(),
            file_name: format!("SceneCam_{}.jpg", taken_at.timestamp_millis()),
            scene,
            params,
            facing,
            taken_at,
            location: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn marked_frame() -> Frame {
        let mut image = RgbImage::from_pixel(16, 8, Rgb([0, 0, 0]));
        for y in 0..8 {
            for x in 0..4 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        Frame::new(image)
    }

    fn decode(photo: &CapturedPhoto) -> RgbImage {
        image::load_from_memory(&photo.jpeg).unwrap().to_rgb8()
    }

    #[test]
    fn test_rear_capture_is_not_mirrored() {
        let photo = CaptureAction::new()
            .freeze(
                marked_frame(),
                FacingMode::Environment,
                SceneId::Auto,
                CaptureParameters::default(),
            )
            .unwrap();
        let image = decode(&photo);
        assert_eq!((photo.width, photo.height), (16, 8));
        assert!(image.get_pixel(1, 4)[0] > 200);
        assert!(image.get_pixel(14, 4)[0] < 60);
    }

    #[test]
    fn test_front_capture_is_mirrored() {
        let photo = CaptureAction::new()
            .freeze(
                marked_frame(),
                FacingMode::User,
                SceneId::Portrait,
                CaptureParameters::default(),
            )
            .unwrap();
        let image = decode(&photo);
        assert!(image.get_pixel(14, 4)[0] > 200);
        assert!(image.get_pixel(1, 4)[0] < 60);
        assert_eq!(photo.scene, SceneId::Portrait);
        assert_eq!(photo.mime_type(), "image/jpeg");
        assert!(photo.file_name.ends_with(".jpg"));
    }

    #[test]
    fn test_builder_clamps_quality() {
        let action = CaptureAction::new()
            .with_quality(0)
            .with_flash(Duration::from_millis(10));
        assert_eq!(action.quality(), 1);
        assert_eq!(action.flash_duration(), Duration::from_millis(10));
        assert_eq!(CaptureAction::default().quality(), 95);
    }
}
