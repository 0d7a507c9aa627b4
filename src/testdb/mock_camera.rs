//! Mock camera implementation for testing without a real device
//!
//! This module provides a mock implementation of the camera traits that
//! produces solid-color frames and keeps count of every stream it hands out,
//! so tests can assert that a session never holds two streams at once.

use crate::core::error::{CameraError, Result};
use crate::device::traits::{CameraDevice, FacingMode, Frame, StreamConstraints, VideoStream};
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Configuration for mock camera behavior
#[derive(Debug, Clone)]
pub struct MockCameraConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Fill color of rear camera frames
    pub rear_color: [u8; 3],
    /// Fill color of front camera frames
    pub front_color: [u8; 3],
    /// Paint the left column a distinct color so mirroring is observable
    pub mark_left_edge: bool,
}

impl Default for MockCameraConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            rear_color: [40, 120, 200],
            front_color: [200, 160, 120],
            mark_left_edge: true,
        }
    }
}

/// Marker color used on the left edge of mock frames
pub const EDGE_MARKER: [u8; 3] = [255, 0, 0];

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
}

/// A camera that never touches hardware
#[derive(Debug, Clone)]
pub struct MockCamera {
    config: MockCameraConfig,
    deny_permission: Arc<AtomicBool>,
    counters: Arc<Counters>,
    opened_facings: Arc<Mutex<Vec<FacingMode>>>,
}

impl MockCamera {
    /// Create a mock camera with default configuration
    pub fn new() -> Self {
        Self::with_config(MockCameraConfig::default())
    }

    /// Create with specific configuration
    pub fn with_config(config: MockCameraConfig) -> Self {
        Self {
            config,
            deny_permission: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(Counters::default()),
            opened_facings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Builder: start out refusing access
    pub fn denying_permission(self) -> Self {
        self.set_permission_denied(true);
        self
    }

    /// Toggle whether `open` fails with `PermissionDenied`
    pub fn set_permission_denied(&self, denied: bool) {
        self.deny_permission.store(denied, Ordering::SeqCst);
    }

    /// Number of successful `open` calls
    pub fn open_count(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Streams opened and not yet stopped or dropped
    pub fn live_streams(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live streams ever observed
    pub fn peak_live_streams(&self) -> usize {
        self.counters.peak_live.load(Ordering::SeqCst)
    }

    /// Facing requested by each successful `open`, in order
    pub fn opened_facings(&self) -> Vec<FacingMode> {
        self.opened_facings
            .lock()
            .map(|facings| facings.clone())
            .unwrap_or_default()
    }

    fn render(&self, facing: FacingMode) -> RgbImage {
        let color = if facing.is_front() {
            self.config.front_color
        } else {
            self.config.rear_color
        };
        let mut image = RgbImage::from_pixel(self.config.width, self.config.height, Rgb(color));
        if self.config.mark_left_edge {
            for y in 0..self.config.height {
                image.put_pixel(0, y, Rgb(EDGE_MARKER));
            }
        }
        image
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDevice for MockCamera {
    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>> {
        if self.deny_permission.load(Ordering::SeqCst) {
            return Err(CameraError::PermissionDenied);
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.counters.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak_live.fetch_max(live, Ordering::SeqCst);
        if let Ok(mut facings) = self.opened_facings.lock() {
            facings.push(constraints.facing);
        }

        Ok(Box::new(MockStream {
            frame: self.render(constraints.facing),
            facing: constraints.facing,
            counters: Arc::clone(&self.counters),
            live: true,
        }))
    }

    fn name(&self) -> String {
        "Mock Camera".to_string()
    }
}

struct MockStream {
    frame: RgbImage,
    facing: FacingMode,
    counters: Arc<Counters>,
    live: bool,
}

impl VideoStream for MockStream {
    fn grab_frame(&mut self) -> Result<Frame> {
        if !self.live {
            return Err(CameraError::StreamEnded);
        }
        Ok(Frame::new(self.frame.clone()))
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_stop_tracks_live_streams() {
        let camera = MockCamera::new();
        let mut stream = camera
            .open(&StreamConstraints::new(FacingMode::Environment))
            .unwrap();
        assert_eq!(camera.live_streams(), 1);

        stream.stop();
        stream.stop();
        assert_eq!(camera.live_streams(), 0);
        assert_eq!(camera.open_count(), 1);
    }

    #[test]
    fn test_dropping_stream_releases_it() {
        let camera = MockCamera::new();
        {
            let _a = camera.open(&StreamConstraints::new(FacingMode::User)).unwrap();
            let _b = camera.open(&StreamConstraints::new(FacingMode::User)).unwrap();
            assert_eq!(camera.live_streams(), 2);
        }
        assert_eq!(camera.live_streams(), 0);
        assert_eq!(camera.peak_live_streams(), 2);
    }

    #[test]
    fn test_permission_denied() {
        let camera = MockCamera::new().denying_permission();
        let result = camera.open(&StreamConstraints::new(FacingMode::Environment));
        assert!(matches!(result, Err(CameraError::PermissionDenied)));
        assert_eq!(camera.open_count(), 0);

        camera.set_permission_denied(false);
        assert!(camera
            .open(&StreamConstraints::new(FacingMode::Environment))
            .is_ok());
    }

    #[test]
    fn test_frames_are_marked_on_the_left_edge() {
        let camera = MockCamera::new();
        let mut stream = camera.open(&StreamConstraints::new(FacingMode::User)).unwrap();
        let frame = stream.grab_frame().unwrap();
        assert_eq!(frame.dimensions(), (64, 48));
        assert_eq!(frame.image().get_pixel(0, 10), &Rgb(EDGE_MARKER));
        assert_eq!(frame.image().get_pixel(63, 10), &Rgb([200, 160, 120]));
    }
}
