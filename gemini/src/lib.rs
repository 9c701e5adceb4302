//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for Gemini's `generateContent` endpoint with:
//! - Structured (JSON schema constrained) text generation
//! - Image generation via inline image parts
//! - Typed errors for network, API and parse failures

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Response contained no usable content")]
    NoContent,
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
        })
    }

    /// Create a client from the environment.
    ///
    /// Reads `GEMINI_API_KEY`, falling back to `API_KEY` (the variable a
    /// hosting environment injects after key selection).
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| Error::NoApiKey)?;
        if api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }
        Self::new(api_key)
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Endpoint URL for a model's `generateContent` method.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    /// Send a `generateContent` request and return the parsed response.
    pub async fn generate_content(&self, model: &str, request: &Request) -> Result<Response, Error> {
        let headers = self.build_headers()?;
        let api_request = ApiRequest::from(request);

        tracing::debug!(model, contents = request.contents.len(), "sending generateContent");

        let response = self
            .client
            .post(self.endpoint(model))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(model, status, "generateContent failed");
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(api_response.into())
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A `generateContent` request.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
    pub generation_config: GenerationConfig,
}

impl Request {
    /// Create a new request with the given conversation contents.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = Some(temperature);
        self
    }

    /// Constrain the output to JSON matching `schema`.
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.generation_config.response_mime_type = Some("application/json".to_string());
        self.generation_config.response_schema = Some(schema);
        self
    }

    pub fn with_image_config(mut self, image_config: ImageConfig) -> Self {
        self.generation_config.image_config = Some(image_config);
        self
    }
}

/// A turn in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user turn with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Create a model turn with text content.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A piece of content within a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineData(Blob),
}

impl Part {
    /// Extract text from a text part.
    pub fn as_text(&self) -> Option<&str> {
        if let Part::Text(text) = self {
            Some(text)
        } else {
            None
        }
    }
}

/// Inline binary data, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

impl Blob {
    /// Wrap raw bytes, encoding them as base64.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>, Error> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| Error::Parse(format!("Invalid base64 image data: {e}")))
    }

    /// Render as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Generation parameters.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<serde_json::Value>,
    pub image_config: Option<ImageConfig>,
}

/// Image output parameters for image-capable models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
    pub image_size: String,
}

impl ImageConfig {
    pub fn new(aspect_ratio: impl Into<String>, image_size: impl Into<String>) -> Self {
        Self {
            aspect_ratio: aspect_ratio.into(),
            image_size: image_size.into(),
        }
    }
}

/// A `generateContent` response.
#[derive(Debug, Clone)]
pub struct Response {
    pub candidates: Vec<Candidate>,
    pub usage: Option<Usage>,
}

impl Response {
    /// Text parts of the first candidate, concatenated.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|part| part.as_text())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    /// First inline blob with a non-empty payload in the first candidate.
    pub fn first_image(&self) -> Option<&Blob> {
        self.candidates.first()?.parts.iter().find_map(|part| match part {
            Part::InlineData(blob) if !blob.data.is_empty() => Some(blob),
            _ => None,
        })
    }
}

/// One generated candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub parts: Vec<Part>,
    pub finish_reason: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub candidate_tokens: u32,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiSystemInstruction>,
    #[serde(skip_serializing_if = "ApiGenerationConfig::is_empty")]
    generation_config: ApiGenerationConfig,
}

impl From<&Request> for ApiRequest {
    fn from(request: &Request) -> Self {
        let config = &request.generation_config;
        Self {
            contents: request.contents.iter().map(ApiContent::from).collect(),
            system_instruction: request
                .system_instruction
                .as_ref()
                .map(|text| ApiSystemInstruction {
                    parts: vec![ApiPart::text(text.clone())],
                }),
            generation_config: ApiGenerationConfig {
                temperature: config.temperature,
                response_mime_type: config.response_mime_type.clone(),
                response_schema: config.response_schema.clone(),
                image_config: config.image_config.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiSystemInstruction {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

impl From<&Content> for ApiContent {
    fn from(content: &Content) -> Self {
        Self {
            role: Some(content.role.as_str().to_string()),
            parts: content.parts.iter().map(ApiPart::from).collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiBlob>,
    /// Thought summaries are not part of the answer.
    #[serde(default, skip_serializing)]
    thought: Option<bool>,
}

impl ApiPart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }
}

impl From<&Part> for ApiPart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text(text) => ApiPart::text(text.clone()),
            Part::InlineData(blob) => ApiPart {
                inline_data: Some(ApiBlob {
                    mime_type: blob.mime_type.clone(),
                    data: blob.data.clone(),
                }),
                ..ApiPart::default()
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiBlob {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

impl ApiGenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.response_mime_type.is_none()
            && self.response_schema.is_none()
            && self.image_config.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl From<ApiResponse> for Response {
    fn from(api: ApiResponse) -> Self {
        let candidates = api
            .candidates
            .into_iter()
            .map(|candidate| Candidate {
                parts: candidate
                    .content
                    .map(|c| c.parts)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|part| part.thought != Some(true))
                    .filter_map(|part| match (part.text, part.inline_data) {
                        (_, Some(blob)) => Some(Part::InlineData(Blob {
                            mime_type: blob.mime_type,
                            data: blob.data,
                        })),
                        (Some(text), None) => Some(Part::Text(text)),
                        (None, None) => None,
                    })
                    .collect(),
                finish_reason: candidate.finish_reason,
            })
            .collect();

        Response {
            candidates,
            usage: api.usage_metadata.map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                candidate_tokens: u.candidates_token_count,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Response {
        let api: ApiResponse = serde_json::from_value(value).unwrap();
        api.into()
    }

    #[test]
    fn test_client_creation() {
        let client = Gemini::new("test-key").unwrap();
        assert_eq!(
            client.endpoint("gemini-3-pro-preview"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }

    #[test]
    fn test_client_with_base_url() {
        let client = Gemini::new("test-key")
            .unwrap()
            .with_base_url("http://localhost:8080/v1beta/");
        assert_eq!(
            client.endpoint("m"),
            "http://localhost:8080/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = Request::new(vec![Content::user("Hello"), Content::model("Hi")])
            .with_system_instruction("Be a narrator")
            .with_temperature(0.8)
            .with_json_schema(json!({"type": "OBJECT"}));

        let value = serde_json::to_value(ApiRequest::from(&request)).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][1]["parts"][0]["text"], "Hi");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Be a narrator");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(value["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_image_request_serializes_image_config() {
        let request = Request::new(vec![Content::user("A castle")])
            .with_image_config(ImageConfig::new("16:9", "2K"));

        let value = serde_json::to_value(ApiRequest::from(&request)).unwrap();
        assert_eq!(value["generationConfig"]["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(value["generationConfig"]["imageConfig"]["imageSize"], "2K");
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_empty_generation_config_is_omitted() {
        let request = Request::new(vec![Content::user("Hello")]);
        let value = serde_json::to_value(ApiRequest::from(&request)).unwrap();
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_skips_thoughts() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "planning...", "thought": true},
                        {"text": "{\"narrative\":"},
                        {"text": "\"x\"}"}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 34}
        }));

        assert_eq!(response.text(), "{\"narrative\":\"x\"}");
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.candidate_tokens, 34);
    }

    #[test]
    fn test_response_first_image() {
        let response = parse(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your scene"},
                        {"inlineData": {"mimeType": "image/png", "data": ""}},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AQID"}}
                    ]
                }
            }]
        }));

        let blob = response.first_image().unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
        assert_eq!(blob.decode().unwrap(), vec![1, 2, 3]);
        assert_eq!(blob.to_data_uri(), "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn test_response_without_candidates() {
        let response = parse(json!({}));
        assert_eq!(response.text(), "");
        assert!(response.first_image().is_none());
    }

    #[test]
    fn test_blob_round_trip() {
        let blob = Blob::from_bytes("image/png", &[0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(blob.decode().unwrap(), vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn test_invalid_base64_is_parse_error() {
        let blob = Blob {
            mime_type: "image/png".to_string(),
            data: "not base64!".to_string(),
        };
        assert!(matches!(blob.decode(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_content_constructors() {
        let user = Content::user("Hello");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.parts[0].as_text(), Some("Hello"));

        let model = Content::model("Hi there");
        assert_eq!(model.role, Role::Model);
    }
}
