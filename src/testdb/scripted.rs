//! Scripted classifier for testing the resolver without network access
//!
//! Responses are queued up front and handed out one per call. An optional
//! delay keeps a call outstanding so tests can change mode mid-flight.

use crate::resolver::classifier::{ClassifyError, SceneClassifier};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A classifier that replays a fixed script of answers
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<String, ClassifyError>>>,
    /// Answer used once the script runs out
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_image_len: AtomicUsize,
}

impl ScriptedClassifier {
    /// Empty script; every call answers `auto`
    pub fn new() -> Self {
        Self {
            fallback: Some("auto".to_string()),
            ..Default::default()
        }
    }

    /// Queue answers in order
    pub fn with_answers<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scripted = Self::new();
        for answer in answers {
            scripted.push_answer(answer);
        }
        scripted
    }

    /// Builder: answer this text forever once the script is exhausted
    pub fn repeating(mut self, answer: &str) -> Self {
        self.fallback = Some(answer.to_string());
        self
    }

    /// Builder: every call takes this long to complete
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_answer<S: Into<String>>(&self, answer: S) {
        self.push(Ok(answer.into()));
    }

    pub fn push_error(&self, error: ClassifyError) {
        self.push(Err(error));
    }

    fn push(&self, response: Result<String, ClassifyError>) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.push_back(response);
    }

    /// Number of `classify` calls started so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Byte length of the most recent image received
    pub fn last_image_len(&self) -> usize {
        self.last_image_len.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SceneClassifier for ScriptedClassifier {
    async fn classify(&self, jpeg: &[u8]) -> Result<String, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_image_len.store(jpeg.len(), Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            script.pop_front()
        };
        match next {
            Some(response) => response,
            None => Ok(self.fallback.clone().unwrap_or_default()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answers_in_order_then_fallback() {
        let classifier = ScriptedClassifier::with_answers(["portrait", "night"]);
        classifier.push_error(ClassifyError::RateLimited);

        assert_eq!(classifier.classify(b"a").await.unwrap(), "portrait");
        assert_eq!(classifier.classify(b"bb").await.unwrap(), "night");
        assert_eq!(
            classifier.classify(b"ccc").await,
            Err(ClassifyError::RateLimited)
        );
        assert_eq!(classifier.classify(b"").await.unwrap(), "auto");
        assert_eq!(classifier.call_count(), 4);
        assert_eq!(classifier.last_image_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_holds_the_call() {
        let classifier = ScriptedClassifier::new()
            .repeating("sport")
            .with_delay(Duration::from_secs(2));
        let start = tokio::time::Instant::now();
        assert_eq!(classifier.classify(b"x").await.unwrap(), "sport");
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
