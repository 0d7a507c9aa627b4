//! Scene catalog and capture parameters
//!
//! # Submodules
//!
//! - `catalog` - The static scene table and label parsing
//! - `params` - Capture parameters and their discrete option lists

pub mod catalog;
pub mod params;

pub use catalog::{descriptor, parse_label, SceneDescriptor, SceneGuides, SceneId, SCENES};
pub use params::{CaptureParameters, ExposureCompensation, FocusMode, ParamKind};
