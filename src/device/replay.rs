//! Replay camera
//!
//! Serves still images from disk as if they were a live camera feed. Point it
//! at a single image or a folder of images; each grabbed frame advances to the
//! next file and wraps around at the end. Used by the CLI, where no platform
//! camera is available.

use crate::core::error::{CameraError, Result};
use crate::device::traits::{CameraDevice, FacingMode, Frame, StreamConstraints, VideoStream};
use log::{debug, info, trace};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Image extensions the replay camera will pick up
const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// A camera backed by image files
#[derive(Debug, Clone)]
pub struct ReplayCamera {
    source: PathBuf,
    frames: Arc<Vec<PathBuf>>,
}

impl ReplayCamera {
    /// Create a replay camera from a file or directory.
    ///
    /// Directories are scanned recursively and replayed in path order.
    pub fn new<P: AsRef<Path>>(source: P) -> Result<Self> {
        let source = source.as_ref().to_path_buf();
        if !source.exists() {
            return Err(CameraError::DeviceUnavailable(format!(
                "frame source not found: {}",
                source.display()
            )));
        }

        let mut frames: Vec<PathBuf> = if source.is_file() {
            vec![source.clone()]
        } else {
            WalkDir::new(&source)
                .follow_links(false)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| is_frame_file(path))
                .collect()
        };
        frames.sort();

        if frames.is_empty() {
            return Err(CameraError::DeviceUnavailable(format!(
                "no .jpg/.png frames in {}",
                source.display()
            )));
        }

        info!(
            "Replay camera ready: {} frame(s) from {}",
            frames.len(),
            source.display()
        );

        Ok(Self {
            source,
            frames: Arc::new(frames),
        })
    }

    /// Number of frames in the replay loop
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl CameraDevice for ReplayCamera {
    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>> {
        debug!(
            "Opening replay stream (facing {}, ideal {}x{})",
            constraints.facing, constraints.ideal_width, constraints.ideal_height
        );
        Ok(Box::new(ReplayStream {
            frames: Arc::clone(&self.frames),
            position: 0,
            facing: constraints.facing,
            live: true,
        }))
    }

    fn name(&self) -> String {
        format!("Replay ({})", self.source.display())
    }
}

/// Stream over the replay camera's frame list
struct ReplayStream {
    frames: Arc<Vec<PathBuf>>,
    position: usize,
    facing: FacingMode,
    live: bool,
}

impl VideoStream for ReplayStream {
    fn grab_frame(&mut self) -> Result<Frame> {
        if !self.live {
            return Err(CameraError::StreamEnded);
        }
        let path = &self.frames[self.position % self.frames.len()];
        self.position = self.position.wrapping_add(1);
        trace!("Replaying frame {}", path.display());

        let image = image::open(path)?.to_rgb8();
        Ok(Frame::new(image))
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn stop(&mut self) {
        self.live = false;
    }
}
