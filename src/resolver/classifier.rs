//! Scene classification seam
//!
//! The resolver hands a small JPEG to a `SceneClassifier` and gets free text
//! back. Interpreting that text against the closed label set happens here too,
//! so every classifier implementation is held to the same rules.

use crate::scene::catalog::{parse_label, SceneId};
use async_trait::async_trait;
use thiserror::Error;

/// Instruction sent alongside every sampled frame
pub const SCENE_PROMPT: &str = "Analyze the image. Return exactly one of these words: \
portrait, landscape, night, food, macro, sport, document. \
If the scene is ambiguous or none fit well, return 'auto'.";

/// Errors from a classification call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Classifier request failed: {0}")]
    Network(String),

    #[error("Classifier rate limit reached")]
    RateLimited,

    #[error("Classifier returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Classifier response had no text: {0}")]
    MalformedResponse(String),

    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),
}

impl ClassifyError {
    /// Whether the failure is a quota/rate limit rather than a hard error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ClassifyError::RateLimited)
    }
}

/// An external image classifier
#[async_trait]
pub trait SceneClassifier: Send + Sync {
    /// Classify a JPEG image, returning the model's raw text answer
    async fn classify(&self, jpeg: &[u8]) -> Result<String, ClassifyError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// A classifier answer after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A detectable scene from the closed label set
    Recognized(SceneId),
    /// `auto`, empty, or anything outside the label set
    Inconclusive,
    /// The call itself failed
    Failed(ClassifyError),
}

impl Classification {
    /// Validate a classifier result
    pub fn from_response(response: Result<String, ClassifyError>) -> Self {
        match response {
            Ok(text) => match parse_label(&text) {
                Some(id) => Classification::Recognized(id),
                None => Classification::Inconclusive,
            },
            Err(e) => Classification::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_detectable_scene() {
        for id in SceneId::DETECTABLE {
            assert!(SCENE_PROMPT.contains(id.as_str()), "prompt misses {}", id);
        }
        assert!(SCENE_PROMPT.contains("'auto'"));
    }

    #[test]
    fn test_from_response() {
        assert_eq!(
            Classification::from_response(Ok(" Food\n".to_string())),
            Classification::Recognized(SceneId::Food)
        );
        assert_eq!(
            Classification::from_response(Ok("auto".to_string())),
            Classification::Inconclusive
        );
        assert_eq!(
            Classification::from_response(Ok("a cat on a sofa".to_string())),
            Classification::Inconclusive
        );
        assert_eq!(
            Classification::from_response(Err(ClassifyError::RateLimited)),
            Classification::Failed(ClassifyError::RateLimited)
        );
    }

    #[test]
    fn test_rate_limit_flag() {
        assert!(ClassifyError::RateLimited.is_rate_limit());
        assert!(!ClassifyError::Network("timeout".into()).is_rate_limit());
    }
}
