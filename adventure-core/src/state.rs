//! Game state shared between the turn pipeline and front-ends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scene::Scene;

/// Who wrote a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }

    /// Convert to the API's conversation format.
    pub fn to_content(&self) -> gemini::Content {
        match self.role {
            Role::User => gemini::Content::user(self.text.clone()),
            Role::Model => gemini::Content::model(self.text.clone()),
        }
    }
}

/// Resolution requested from the image model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::OneK, ImageSize::TwoK, ImageSize::FourK];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }

    /// Next size in the 1K -> 2K -> 4K -> 1K cycle.
    pub fn next(self) -> Self {
        match self {
            ImageSize::OneK => ImageSize::TwoK,
            ImageSize::TwoK => ImageSize::FourK,
            ImageSize::FourK => ImageSize::OneK,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised image size string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown image size '{0}' (expected 1K, 2K or 4K)")]
pub struct ParseImageSizeError(pub String);

impl FromStr for ImageSize {
    type Err = ParseImageSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(ImageSize::OneK),
            "2K" => Ok(ImageSize::TwoK),
            "4K" => Ok(ImageSize::FourK),
            _ => Err(ParseImageSizeError(s.to_string())),
        }
    }
}

/// Everything the front-end renders.
///
/// Inventory, quest and choices always mirror the last successful story
/// response; failed calls only touch the busy flags.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub inventory: Vec<String>,
    pub current_quest: String,
    pub choices: Vec<String>,
    pub history: Vec<ChatMessage>,
    pub current_scene: Option<Scene>,
    pub is_generating_story: bool,
    pub is_generating_image: bool,
    pub image_size: ImageSize,
    /// Completed story turns, the opening turn included.
    pub turn: u32,
}

impl GameState {
    pub fn new(image_size: ImageSize) -> Self {
        Self {
            image_size,
            ..Self::default()
        }
    }

    /// History in the API's conversation format.
    pub fn api_history(&self) -> Vec<gemini::Content> {
        self.history.iter().map(ChatMessage::to_content).collect()
    }

    /// The most recent narrative segment.
    pub fn narrative(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == Role::Model)
            .map(|m| m.text.as_str())
    }

    /// Whether any request is in flight.
    pub fn is_busy(&self) -> bool {
        self.is_generating_story || self.is_generating_image
    }
}
