//! Error types for the scene camera
//!
//! This module defines the error types used throughout the library. Classifier
//! failures have their own type in [`crate::resolver::classifier`] because the
//! resolver swallows them instead of propagating.

use thiserror::Error;

/// Main error type for the scene camera
#[derive(Error, Debug)]
pub enum CameraError {
    /// The user (or platform) refused camera access
    #[error("Camera permission denied. Grant access and retry.")]
    PermissionDenied,

    /// The camera exists but could not be opened
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The stream was stopped or the device went away
    #[error("Video stream is not live")]
    StreamEnded,

    /// There is no active stream to capture from
    #[error("No active video stream. Start the session first.")]
    NoStream,

    /// Frame decoding or encoding failed
    #[error("Image error: {0}")]
    ImageError(String),

    /// The persistence collaborator rejected or failed to store a capture
    #[error("Failed to save photo: {0}")]
    PersistenceError(String),

    /// A photo id was not found in the gallery
    #[error("Photo not found: {0}")]
    PhotoNotFound(String),

    /// An album id was not found in the gallery
    #[error("Album not found: {0}")]
    AlbumNotFound(String),

    /// An album operation was rejected (blank name, photo not a member, ...)
    #[error("Invalid album operation: {0}")]
    InvalidAlbum(String),

    /// Storing the photo would go over the gallery's quota
    #[error("Storage quota exceeded: {used} of {quota} bytes in use")]
    QuotaExceeded { used: u64, quota: u64 },

    /// Session operations need a Tokio runtime for timers and the resolver task
    #[error("No async runtime available: {0}")]
    RuntimeError(String),

    /// General I/O error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CameraError>;

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        CameraError::IoError(err.to_string())
    }
}

impl From<image::ImageError> for CameraError {
    fn from(err: image::ImageError) -> Self {
        CameraError::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for CameraError {
    fn from(err: serde_json::Error) -> Self {
        CameraError::PersistenceError(err.to_string())
    }
}
