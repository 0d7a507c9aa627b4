//! Scene resolver module
//!
//! # Submodules
//!
//! - `classifier` - The classification seam and label validation
//! - `gemini` - Gemini HTTP classifier
//! - `sampler` - Frame downsampling for classification
//! - `engine` - The periodic resolver task

pub mod classifier;
pub mod engine;
pub mod gemini;
pub mod sampler;

pub use classifier::{Classification, ClassifyError, SceneClassifier, SCENE_PROMPT};
pub use engine::{
    apply_classification, CycleOutcome, ResolverConfig, ResolverContext, ResolverPhase,
    SceneResolver, SharedStream,
};
pub use gemini::GeminiClassifier;
