//! Hosted image analysis over the `images:annotate` REST shape
//!
//! The frame is sent inline as base64 together with label, object and text
//! detection feature requests; the API key travels as a `key` query
//! parameter.

use adintel_capture::CapturedImage;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analyzer::{AnalysisLabel, ImageAnalyzer, LabelKind};
use crate::error::ContentError;

const SERVICE: &str = "Vision";

/// Default image annotation endpoint
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

/// Image analysis client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-feature result limit
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_results: default_max_results(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_VISION_ENDPOINT.to_string()
}

fn default_max_results() -> u32 {
    5
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotations>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotations {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<ObjectAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<AnnotateError>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ObjectAnnotation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct AnnotateError {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: String,
}

/// Image analysis from a hosted vision service
pub struct CloudVisionAnalyzer {
    client: reqwest::Client,
    api_key: String,
    config: VisionConfig,
}

impl CloudVisionAnalyzer {
    pub fn new(config: VisionConfig, api_key: impl Into<String>) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    fn request_body(&self, image: &CapturedImage) -> serde_json::Value {
        let content = general_purpose::STANDARD.encode(image.bytes());
        let max_results = self.config.max_results;
        serde_json::json!({
            "requests": [{
                "image": { "content": content },
                "features": [
                    { "type": "OBJECT_LOCALIZATION", "maxResults": max_results },
                    { "type": "LABEL_DETECTION", "maxResults": max_results },
                    { "type": "TEXT_DETECTION", "maxResults": 1 }
                ]
            }]
        })
    }
}

/// HTTP status equivalent of an in-body RPC error code
fn status_for_code(code: Option<i32>) -> u16 {
    match code {
        // UNAUTHENTICATED, PERMISSION_DENIED
        Some(16) => 401,
        Some(7) => 403,
        Some(code) => u16::try_from(code).unwrap_or(0),
        None => 0,
    }
}

/// Map a raw annotate response body to labels
fn labels_from_body(body: &str) -> Result<Vec<AnalysisLabel>, ContentError> {
    let response: AnnotateResponse = serde_json::from_str(body)?;
    let annotations = response
        .responses
        .into_iter()
        .next()
        .ok_or(ContentError::EmptyResponse(SERVICE))?;

    if let Some(error) = annotations.error {
        return Err(ContentError::Status {
            service: SERVICE,
            status: status_for_code(error.code),
            body: error.message,
        });
    }

    let mut labels: Vec<AnalysisLabel> = annotations
        .localized_object_annotations
        .into_iter()
        .map(|o| AnalysisLabel::new(LabelKind::Object, o.name, o.score))
        .collect();

    labels.extend(
        annotations
            .label_annotations
            .into_iter()
            .map(|l| AnalysisLabel::new(LabelKind::Scene, l.description, l.score)),
    );

    // The first text annotation carries the full detected text
    let text = annotations
        .text_annotations
        .into_iter()
        .next()
        .map(|t| t.description.trim().replace('\n', " "))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "none".to_string());
    labels.push(AnalysisLabel::new(LabelKind::Text, text, None));

    Ok(labels)
}

#[async_trait]
impl ImageAnalyzer for CloudVisionAnalyzer {
    async fn analyze(&self, image: &CapturedImage) -> Result<Vec<AnalysisLabel>, ContentError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(ContentError::MissingCredential { service: SERVICE });
        }

        debug!(
            endpoint = %self.config.endpoint,
            bytes = image.bytes().len(),
            "Sending image for analysis"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", api_key)])
            .json(&self.request_body(image))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, "Image analysis returned non-success status");
            return Err(ContentError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let labels = labels_from_body(&body)?;
        info!(labels = labels.len(), "Image analysis complete");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_from_body() {
        let body = r#"{
            "responses": [{
                "localizedObjectAnnotations": [{ "name": "Chair", "score": 0.91 }],
                "labelAnnotations": [{ "description": "Interior design", "score": 0.8 }],
                "textAnnotations": [{ "description": "OPEN\nDAILY" }, { "description": "OPEN" }]
            }]
        }"#;

        let labels = labels_from_body(body).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0].to_string(), "Object: Chair (91%)");
        assert_eq!(labels[1].kind, LabelKind::Scene);
        assert_eq!(labels[2].to_string(), "Text detected: OPEN DAILY");
    }

    #[test]
    fn test_no_text_reports_none() {
        let labels = labels_from_body(r#"{ "responses": [{}] }"#).unwrap();
        assert_eq!(labels, vec![AnalysisLabel::new(LabelKind::Text, "none", None)]);
    }

    #[test]
    fn test_error_payload() {
        let body = r#"{ "responses": [{ "error": { "code": 3, "message": "Bad image data." } }] }"#;
        let err = labels_from_body(body).unwrap_err();
        assert!(matches!(err, ContentError::Status { status: 3, .. }));

        assert!(matches!(
            labels_from_body(r#"{ "responses": [] }"#),
            Err(ContentError::EmptyResponse(_))
        ));
    }

    #[test]
    fn test_error_codes() {
        for (code, auth) in [(16, true), (7, true), (3, false)] {
            let body = format!(
                r#"{{ "responses": [{{ "error": {{ "code": {}, "message": "nope" }} }}] }}"#,
                code
            );
            let err = labels_from_body(&body).unwrap_err();
            assert_eq!(err.is_authorization(), auth, "code {}", code);
        }
        assert_eq!(status_for_code(Some(-1)), 0);
        assert_eq!(status_for_code(Some(70_000)), 0);
        assert_eq!(status_for_code(None), 0);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let analyzer = CloudVisionAnalyzer::new(VisionConfig::default(), "").unwrap();
        let image = CapturedImage::solid_color(1, 1, [0, 0, 0]).unwrap();
        let err = analyzer.analyze(&image).await.unwrap_err();
        assert!(err.is_authorization());
    }

    #[test]
    fn test_request_body() {
        let analyzer = CloudVisionAnalyzer::new(VisionConfig::default(), "key").unwrap();
        let image = CapturedImage::solid_color(1, 1, [0, 0, 0]).unwrap();
        let body = analyzer.request_body(&image);
        let content = body["requests"][0]["image"]["content"].as_str().unwrap();
        assert_eq!(
            general_purpose::STANDARD.decode(content).unwrap(),
            image.bytes()
        );
        assert_eq!(body["requests"][0]["features"][0]["maxResults"], 5);
    }
}
