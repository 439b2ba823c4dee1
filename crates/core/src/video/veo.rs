//! Veo video model client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::gate::ApiKeyHandle;
use crate::http::{build_client, read_error, ApiErrorBody, API_KEY_HEADER};

use super::traits::{
    JobHandle, JobStatus, MediaPayload, VideoJobRequest, VideoServiceError, VideoSynthesizer,
};

/// Video synthesis client backed by the `predictLongRunning` endpoint.
///
/// The API key is read from an [`ApiKeyHandle`] on every call, so it follows whatever
/// the key selector picked.
pub struct VeoClient {
    client: reqwest::Client,
    api_key: ApiKeyHandle,
    model: String,
    api_base: String,
}

impl VeoClient {
    pub fn new(api_key: ApiKeyHandle, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
        }
    }

    pub fn from_config(config: &GeminiConfig, api_key: ApiKeyHandle) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            api_key,
            model: config.video_model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    async fn key(&self) -> Result<String, VideoServiceError> {
        self.api_key
            .get()
            .await
            .filter(|k| !k.is_empty())
            .ok_or(VideoServiceError::NotConfigured)
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Instance {
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reference_images: Vec<ReferenceImage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceImage {
    image: InlineImage,
    reference_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    resolution: String,
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<OperationResponse>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<GeneratedVideo>,
}

#[derive(Debug, Deserialize)]
struct GeneratedVideo {
    #[serde(default)]
    uri: Option<String>,
}

impl PredictRequest {
    fn from_job(request: VideoJobRequest) -> Self {
        let reference_images = request
            .reference_images
            .into_iter()
            .map(|image| ReferenceImage {
                image: InlineImage {
                    bytes_base64_encoded: image.to_base64(),
                    mime_type: image.mime_type,
                },
                reference_type: "asset".to_string(),
            })
            .collect();

        Self {
            instances: vec![Instance {
                prompt: request.prompt,
                reference_images,
            }],
            parameters: Parameters {
                sample_count: request.number_of_videos,
                resolution: request.resolution,
                aspect_ratio: request.aspect_ratio,
            },
        }
    }
}

impl Operation {
    fn into_status(self) -> Result<JobStatus, VideoServiceError> {
        if let Some(error) = self.error {
            return Err(VideoServiceError::Operation {
                code: error.code,
                message: error.message,
            });
        }

        let locator = self
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().next())
            .and_then(|s| s.video)
            .and_then(|v| v.uri);

        Ok(JobStatus {
            done: self.done,
            locator,
        })
    }
}

/// Append the access key to a download locator.
fn with_key(locator: &str, key: &str) -> String {
    let separator = if locator.contains('?') { '&' } else { '?' };
    format!("{}{}key={}", locator, separator, urlencoding::encode(key))
}

#[async_trait]
impl VideoSynthesizer for VeoClient {
    fn name(&self) -> &str {
        "veo"
    }

    async fn submit(&self, request: VideoJobRequest) -> Result<JobHandle, VideoServiceError> {
        let key = self.key().await?;

        debug!(
            model = %self.model,
            references = request.reference_images.len(),
            resolution = %request.resolution,
            aspect_ratio = %request.aspect_ratio,
            "Submitting video job"
        );

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:predictLongRunning",
                self.api_base, self.model
            ))
            .header(API_KEY_HEADER, key)
            .json(&PredictRequest::from_job(request))
            .send()
            .await
            .map_err(|e| VideoServiceError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = read_error(response).await;
            return Err(VideoServiceError::Api { status, message });
        }

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| VideoServiceError::Json(e.to_string()))?;

        if let Some(error) = operation.error {
            return Err(VideoServiceError::Operation {
                code: error.code,
                message: error.message,
            });
        }

        Ok(JobHandle(operation.name))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<JobStatus, VideoServiceError> {
        let key = self.key().await?;

        let response = self
            .client
            .get(format!("{}/v1beta/{}", self.api_base, handle.0))
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(|e| VideoServiceError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = read_error(response).await;
            return Err(VideoServiceError::Api { status, message });
        }

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| VideoServiceError::Json(e.to_string()))?;

        operation.into_status()
    }

    async fn download(&self, locator: &str) -> Result<MediaPayload, VideoServiceError> {
        let key = self.key().await?;

        let response = self
            .client
            .get(with_key(locator, &key))
            .send()
            .await
            .map_err(|e| VideoServiceError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = read_error(response).await;
            return Err(VideoServiceError::Download { status, message });
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("video/"))
            .unwrap_or("video/mp4")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VideoServiceError::Http(e.to_string()))?;

        Ok(MediaPayload {
            bytes: bytes.to_vec(),
            mime_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ImagePayload;

    fn job(references: usize) -> VideoJobRequest {
        VideoJobRequest {
            prompt: "tour".to_string(),
            reference_images: (0..references)
                .map(|i| ImagePayload::new(vec![i as u8], "image/png"))
                .collect(),
            number_of_videos: 1,
            resolution: "720p".to_string(),
            aspect_ratio: "16:9".to_string(),
        }
    }

    #[test]
    fn test_predict_request_serialization() {
        let json = serde_json::to_value(PredictRequest::from_job(job(2))).unwrap();

        let instance = &json["instances"][0];
        assert_eq!(instance["prompt"], "tour");
        assert_eq!(instance["referenceImages"].as_array().unwrap().len(), 2);
        assert_eq!(instance["referenceImages"][0]["referenceType"], "asset");
        assert_eq!(
            instance["referenceImages"][0]["image"]["mimeType"],
            "image/png"
        );
        assert_eq!(json["parameters"]["sampleCount"], 1);
        assert_eq!(json["parameters"]["resolution"], "720p");
        assert_eq!(json["parameters"]["aspectRatio"], "16:9");
    }

    #[test]
    fn test_pending_operation() {
        let op: Operation =
            serde_json::from_str(r#"{"name": "models/veo/operations/abc"}"#).unwrap();
        assert_eq!(op.into_status().unwrap(), JobStatus::pending());
    }

    #[test]
    fn test_finished_operation_locator() {
        let body = r#"{
            "name": "models/veo/operations/abc",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [{"video": {"uri": "https://files.example/v1?alt=media"}}]
                }
            }
        }"#;
        let op: Operation = serde_json::from_str(body).unwrap();
        assert_eq!(
            op.into_status().unwrap(),
            JobStatus::finished("https://files.example/v1?alt=media")
        );
    }

    #[test]
    fn test_finished_operation_without_samples() {
        let body = r#"{"name": "op", "done": true, "response": {}}"#;
        let op: Operation = serde_json::from_str(body).unwrap();
        let status = op.into_status().unwrap();
        assert!(status.done);
        assert!(status.locator.is_none());
    }

    #[test]
    fn test_failed_operation() {
        let body = r#"{"name": "op", "done": true, "error": {"code": 404, "message": "Requested entity was not found."}}"#;
        let op: Operation = serde_json::from_str(body).unwrap();
        match op.into_status() {
            Err(VideoServiceError::Operation { code, message }) => {
                assert_eq!(code, Some(404));
                assert_eq!(message, "Requested entity was not found.");
            }
            other => panic!("unexpected status: {:?}", other),
        }
    }

    #[test]
    fn test_with_key() {
        assert_eq!(
            with_key("https://files.example/v1?alt=media", "k/1"),
            "https://files.example/v1?alt=media&key=k%2F1"
        );
        assert_eq!(
            with_key("https://files.example/v1", "abc"),
            "https://files.example/v1?key=abc"
        );
    }

    #[tokio::test]
    async fn test_submit_without_key_fails_before_network() {
        let client = VeoClient::new(ApiKeyHandle::new(), "veo-3.1-generate-preview");
        let result = client.submit(job(2)).await;
        assert!(matches!(result, Err(VideoServiceError::NotConfigured)));
    }
}
