//! Gemini scene classifier
//!
//! Sends the sampled JPEG inline with the scene instruction to the
//! `generateContent` endpoint and returns the first candidate's text.

use crate::resolver::classifier::{ClassifyError, SceneClassifier, SCENE_PROMPT};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// HTTP client for the Gemini API
pub struct GeminiClassifier {
    api_key: String,
    endpoint: String,
    model: String,
    client: Client,
}

impl GeminiClassifier {
    /// Create a client with an explicit key
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ClassifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifyError::Network(e.to_string()))?;
        Ok(Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        })
    }

    /// Create a client reading the key from the environment variable `var`
    pub fn from_env(var: &str, timeout: Duration) -> Result<Self, ClassifyError> {
        let api_key = std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ClassifyError::MissingApiKey(var.to_string()))?;
        Self::new(api_key, timeout)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }

    fn build_request(jpeg: &[u8]) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: STANDARD.encode(jpeg),
                        },
                    },
                    Part::Text {
                        text: SCENE_PROMPT.to_string(),
                    },
                ],
            }],
        }
    }

    fn extract_text(response: GenerateResponse) -> Result<String, ClassifyError> {
        response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| ClassifyError::MalformedResponse("no candidate text".to_string()))
    }
}

#[async_trait]
impl SceneClassifier for GeminiClassifier {
    async fn classify(&self, jpeg: &[u8]) -> Result<String, ClassifyError> {
        debug!("Classifying {} byte sample with {}", jpeg.len(), self.model);

        let response = self
            .client
            .post(self.url())
            .json(&Self::build_request(jpeg))
            .send()
            .await
            .map_err(|e| ClassifyError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClassifyError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::MalformedResponse(e.without_url().to_string()))?;
        Self::extract_text(parsed)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
