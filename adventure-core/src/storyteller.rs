//! The outbound AI boundary.
//!
//! A turn needs exactly two things from the generative backend: a structured
//! story segment and a scene image. [`Storyteller`] captures both so the turn
//! pipeline can run against Gemini or against a scripted mock.

use async_trait::async_trait;
use gemini::{Content, Gemini, ImageConfig, Request};
use thiserror::Error;

use crate::prompts::{scene_prompt, SCENE_ASPECT_RATIO, SYSTEM_INSTRUCTION};
use crate::scene::SceneImage;
use crate::state::{ChatMessage, ImageSize};
use crate::story::{story_schema, StoryResponse};

pub const DEFAULT_STORY_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

/// Errors from the storyteller backend.
#[derive(Debug, Error)]
pub enum StorytellerError {
    #[error("Gemini API error: {0}")]
    Api(#[from] gemini::Error),

    #[error("Malformed story response: {0}")]
    Parse(String),

    #[error("No image data found in response")]
    NoImage,
}

/// Generates story segments and scene images.
#[async_trait]
pub trait Storyteller: Send + Sync {
    /// Continue the story from `history` with the player's `action`.
    async fn generate_story(
        &self,
        history: &[ChatMessage],
        action: &str,
    ) -> Result<StoryResponse, StorytellerError>;

    /// Paint the scene described by `prompt`.
    async fn generate_scene_image(
        &self,
        prompt: &str,
        size: ImageSize,
    ) -> Result<SceneImage, StorytellerError>;
}

/// Configuration for the Gemini-backed storyteller.
#[derive(Debug, Clone)]
pub struct StorytellerConfig {
    pub story_model: String,
    pub image_model: String,
    pub temperature: f32,
    /// Replaces the built-in Dungeon Master instruction.
    pub custom_system_prompt: Option<String>,
}

impl Default for StorytellerConfig {
    fn default() -> Self {
        Self {
            story_model: DEFAULT_STORY_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            temperature: 0.8,
            custom_system_prompt: None,
        }
    }
}

impl StorytellerConfig {
    pub fn with_story_model(mut self, model: impl Into<String>) -> Self {
        self.story_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_system_prompt = Some(prompt.into());
        self
    }

    fn system_prompt(&self) -> &str {
        self.custom_system_prompt
            .as_deref()
            .unwrap_or(SYSTEM_INSTRUCTION)
    }
}

/// Storyteller backed by the Gemini API.
pub struct GeminiStoryteller {
    client: Gemini,
    config: StorytellerConfig,
}

impl GeminiStoryteller {
    pub fn new(client: Gemini, config: StorytellerConfig) -> Self {
        Self { client, config }
    }

    /// Create a storyteller using the API key from the environment.
    pub fn from_env(config: StorytellerConfig) -> Result<Self, StorytellerError> {
        Ok(Self::new(Gemini::from_env()?, config))
    }

    pub fn config(&self) -> &StorytellerConfig {
        &self.config
    }

    /// Build the story request: prior turns plus the new user action.
    pub fn story_request(&self, history: &[ChatMessage], action: &str) -> Request {
        let mut contents: Vec<Content> = history.iter().map(ChatMessage::to_content).collect();
        contents.push(Content::user(action));

        Request::new(contents)
            .with_system_instruction(self.config.system_prompt())
            .with_json_schema(story_schema())
            .with_temperature(self.config.temperature)
    }

    /// Build the image request for a scene description.
    pub fn image_request(&self, prompt: &str, size: ImageSize) -> Request {
        Request::new(vec![Content::user(scene_prompt(prompt))])
            .with_image_config(ImageConfig::new(SCENE_ASPECT_RATIO, size.as_str()))
    }
}

#[async_trait]
impl Storyteller for GeminiStoryteller {
    async fn generate_story(
        &self,
        history: &[ChatMessage],
        action: &str,
    ) -> Result<StoryResponse, StorytellerError> {
        let request = self.story_request(history, action);
        let response = self
            .client
            .generate_content(&self.config.story_model, &request)
            .await?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(StorytellerError::Api(gemini::Error::NoContent));
        }

        let story = StoryResponse::parse(&text).map_err(|e| StorytellerError::Parse(e.to_string()))?;
        tracing::debug!(
            choices = story.choices.len(),
            inventory = story.inventory.len(),
            "story segment received"
        );
        Ok(story)
    }

    async fn generate_scene_image(
        &self,
        prompt: &str,
        size: ImageSize,
    ) -> Result<SceneImage, StorytellerError> {
        let request = self.image_request(prompt, size);
        let response = self
            .client
            .generate_content(&self.config.image_model, &request)
            .await?;

        let blob = response.first_image().ok_or(StorytellerError::NoImage)?;
        let bytes = blob.decode()?;
        tracing::debug!(mime = %blob.mime_type, bytes = bytes.len(), %size, "scene image received");

        Ok(SceneImage::Generated {
            mime_type: blob.mime_type.clone(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storyteller() -> GeminiStoryteller {
        GeminiStoryteller::new(Gemini::new("test-key").unwrap(), StorytellerConfig::default())
    }

    #[test]
    fn test_default_config() {
        let config = StorytellerConfig::default();
        assert_eq!(config.story_model, DEFAULT_STORY_MODEL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.system_prompt(), SYSTEM_INSTRUCTION);
    }

    #[test]
    fn test_config_builder() {
        let config = StorytellerConfig::default()
            .with_story_model("gemini-2.5-flash")
            .with_image_model("imagen")
            .with_temperature(0.3)
            .with_system_prompt("Be terse");
        assert_eq!(config.story_model, "gemini-2.5-flash");
        assert_eq!(config.image_model, "imagen");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.system_prompt(), "Be terse");
    }

    #[test]
    fn test_story_request_appends_action() {
        let history = vec![ChatMessage::model("You wake up."), ChatMessage::user("Stand")];
        let request = storyteller().story_request(&history, "Open the door");

        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[2], Content::user("Open the door"));
        assert_eq!(request.system_instruction.as_deref(), Some(SYSTEM_INSTRUCTION));
        assert_eq!(
            request.generation_config.response_mime_type.as_deref(),
            Some("application/json")
        );
        assert_eq!(request.generation_config.temperature, Some(0.8));
        assert!(request.generation_config.response_schema.is_some());
    }

    #[test]
    fn test_image_request_uses_style_and_size() {
        let request = storyteller().image_request("A misty harbour", ImageSize::FourK);

        assert_eq!(request.contents.len(), 1);
        let text = request.contents[0].parts[0].as_text().unwrap();
        assert!(text.starts_with("Art style:"));
        assert!(text.ends_with("A misty harbour"));
        assert_eq!(
            request.generation_config.image_config,
            Some(ImageConfig::new("16:9", "4K"))
        );
        assert!(request.system_instruction.is_none());
    }
}
