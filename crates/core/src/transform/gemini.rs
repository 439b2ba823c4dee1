//! Gemini image model client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::http::{build_client, read_error, API_KEY_HEADER};
use crate::media::ImagePayload;

use super::traits::{ImageTransformer, TransformError, TransformRequest};

/// Image transform client backed by the `generateContent` endpoint.
pub struct GeminiImageClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
}

impl GeminiImageClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: Some(api_key.into()),
            model: model.into(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.image_model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateRequest {
    fn from_transform(request: TransformRequest) -> Self {
        let inline = Part {
            inline_data: Some(InlineData {
                data: request.image.to_base64(),
                mime_type: request.image.mime_type,
            }),
            text: None,
        };
        let instruction = Part {
            inline_data: None,
            text: Some(request.instruction),
        };

        Self {
            contents: vec![Content {
                parts: vec![inline, instruction],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

/// First inline image part of the first candidate.
fn extract_image(response: GenerateResponse) -> Result<ImagePayload, TransformError> {
    let data = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
        .ok_or(TransformError::NoImage)?;

    ImagePayload::from_base64(&data.data, data.mime_type)
        .map_err(|e| TransformError::InvalidPayload(e.to_string()))
}

#[async_trait]
impl ImageTransformer for GeminiImageClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn transform(&self, request: TransformRequest) -> Result<ImagePayload, TransformError> {
        let api_key = self.api_key.as_deref().ok_or(TransformError::NotConfigured)?;

        debug!(
            model = %self.model,
            mime_type = %request.image.mime_type,
            bytes = request.image.len(),
            "Submitting image transform"
        );

        let body = GenerateRequest::from_transform(request);
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransformError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = read_error(response).await;
            return Err(TransformError::Api { status, message });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TransformError::Json(e.to_string()))?;

        extract_image(parsed)
    }
}
