//! Frame sampling for classification
//!
//! Frames are scaled to a fixed width (aspect preserved) and encoded as a
//! low-quality JPEG before being sent off; the classifier only needs the gist.

use crate::core::error::Result;
use crate::device::traits::Frame;
use crate::session::capture::encode_jpeg;
use image::imageops::{self, FilterType};
use log::trace;

/// Default sample width in pixels
pub const SAMPLE_WIDTH: u32 = 320;

/// Default sample JPEG quality
pub const SAMPLE_QUALITY: u8 = 60;

/// Largest side a JPEG can have
const MAX_JPEG_SIDE: u32 = u16::MAX as u32;

/// Height that keeps the frame's aspect ratio at `width`, capped at the JPEG limit
pub fn scaled_height(frame_width: u32, frame_height: u32, width: u32) -> u32 {
    if frame_width == 0 {
        return 1;
    }
    let height = (f64::from(width) / f64::from(frame_width) * f64::from(frame_height)).round();
    (height.min(f64::from(MAX_JPEG_SIDE)) as u32).max(1)
}

/// Downsample and encode a frame for the classifier
pub fn encode_for_classification(frame: &Frame, width: u32, quality: u8) -> Result<Vec<u8>> {
    let width = width.clamp(1, MAX_JPEG_SIDE);
    let height = scaled_height(frame.width(), frame.height(), width);
    let sample = imageops::resize(frame.image(), width, height, FilterType::Triangle);
    let jpeg = encode_jpeg(&sample, quality)?;
    trace!(
        "Sampled {}x{} frame to {}x{} ({} bytes)",
        frame.width(),
        frame.height(),
        width,
        height,
        jpeg.len()
    );
    Ok(jpeg)
}
