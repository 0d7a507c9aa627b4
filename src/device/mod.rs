//! Camera device module
//!
//! # Submodules
//!
//! - `traits` - Abstraction traits for testability
//! - `replay` - A camera that replays still images from disk
//!
//! # Architecture
//!
//! The session never touches a concrete camera. It opens a `CameraDevice` into
//! a `VideoStream` and owns that stream exclusively. Both the replay camera and
//! the mock camera in `testdb` implement these traits.

pub mod replay;
pub mod traits;

pub use replay::ReplayCamera;
pub use traits::{CameraDevice, FacingMode, Frame, StreamConstraints, VideoStream};
