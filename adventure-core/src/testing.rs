//! Testing utilities for the adventure engine.
//!
//! This module provides tools for integration testing:
//! - `MockStoryteller` for deterministic turns without API calls
//! - `MockStory` builders for scripted story segments
//! - `TestHarness` for running a session over the mock

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::scene::SceneImage;
use crate::session::{AdventureSession, SessionConfig};
use crate::state::{ChatMessage, ImageSize};
use crate::story::StoryResponse;
use crate::storyteller::{Storyteller, StorytellerError};

/// PNG signature, used as the default generated image payload.
pub const MOCK_IMAGE_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Builder for scripted story segments.
pub struct MockStory;

impl MockStory {
    /// A segment with three generic choices.
    pub fn narrative(text: impl Into<String>) -> StoryResponse {
        let text = text.into();
        StoryResponse {
            image_prompt: format!("Illustration of: {text}"),
            narrative: text,
            inventory: Vec::new(),
            quest: "Survive".to_string(),
            choices: vec![
                "Go forward".to_string(),
                "Look around".to_string(),
                "Wait".to_string(),
            ],
        }
    }

    /// A fully specified segment.
    pub fn full(
        narrative: impl Into<String>,
        inventory: &[&str],
        quest: impl Into<String>,
        choices: &[&str],
        image_prompt: impl Into<String>,
    ) -> StoryResponse {
        StoryResponse {
            narrative: narrative.into(),
            inventory: inventory.iter().map(|s| s.to_string()).collect(),
            quest: quest.into(),
            choices: choices.iter().map(|s| s.to_string()).collect(),
            image_prompt: image_prompt.into(),
        }
    }
}

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Story {
        history: Vec<ChatMessage>,
        action: String,
    },
    Image {
        prompt: String,
        size: ImageSize,
    },
}

enum ScriptedStory {
    Ok(StoryResponse),
    Fail(String),
    Stall,
}

enum ScriptedImage {
    Ok(SceneImage),
    Fail,
}

#[derive(Default)]
struct MockScript {
    stories: VecDeque<ScriptedStory>,
    images: VecDeque<ScriptedImage>,
}

/// A storyteller that replays scripted results.
///
/// Story calls consume the story queue in order; an empty queue yields a
/// stock segment. Image calls consume the image queue and default to a
/// small PNG payload. Every call is recorded in a shared log.
#[derive(Clone, Default)]
pub struct MockStoryteller {
    script: Arc<Mutex<MockScript>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockStoryteller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with scripted story segments.
    pub fn with_stories(stories: Vec<StoryResponse>) -> Self {
        let mock = Self::new();
        for story in stories {
            mock.queue_story(story);
        }
        mock
    }

    pub fn queue_story(&self, story: StoryResponse) {
        self.script().stories.push_back(ScriptedStory::Ok(story));
    }

    /// Make the next story call fail with a parse error carrying `message`.
    pub fn queue_story_failure(&self, message: impl Into<String>) {
        self.script()
            .stories
            .push_back(ScriptedStory::Fail(message.into()));
    }

    /// Make the next story call hang until its future is dropped.
    pub fn queue_story_stall(&self) {
        self.script().stories.push_back(ScriptedStory::Stall);
    }

    pub fn queue_image(&self, image: SceneImage) {
        self.script().images.push_back(ScriptedImage::Ok(image));
    }

    /// Make the next image call fail.
    pub fn queue_image_failure(&self) {
        self.script().images.push_back(ScriptedImage::Fail);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn script(&self) -> MutexGuard<'_, MockScript> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: MockCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl Storyteller for MockStoryteller {
    async fn generate_story(
        &self,
        history: &[ChatMessage],
        action: &str,
    ) -> Result<StoryResponse, StorytellerError> {
        self.record(MockCall::Story {
            history: history.to_vec(),
            action: action.to_string(),
        });

        let next = self.script().stories.pop_front();
        match next {
            Some(ScriptedStory::Ok(story)) => Ok(story),
            Some(ScriptedStory::Fail(message)) => Err(StorytellerError::Parse(message)),
            Some(ScriptedStory::Stall) => std::future::pending().await,
            None => Ok(MockStory::narrative("The story has no more scripted segments.")),
        }
    }

    async fn generate_scene_image(
        &self,
        prompt: &str,
        size: ImageSize,
    ) -> Result<SceneImage, StorytellerError> {
        self.record(MockCall::Image {
            prompt: prompt.to_string(),
            size,
        });

        let next = self.script().images.pop_front();
        match next {
            Some(ScriptedImage::Ok(image)) => Ok(image),
            Some(ScriptedImage::Fail) => Err(StorytellerError::NoImage),
            None => Ok(SceneImage::Generated {
                mime_type: "image/png".to_string(),
                bytes: MOCK_IMAGE_BYTES.to_vec(),
            }),
        }
    }
}

/// Test harness pairing a session with the mock driving it.
pub struct TestHarness {
    pub mock: MockStoryteller,
    pub session: AdventureSession,
}

impl TestHarness {
    /// Create a harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::new())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let mock = MockStoryteller::new();
        let session = AdventureSession::with_storyteller(Box::new(mock.clone()), config);
        Self { mock, session }
    }

    /// Queue a story segment.
    pub fn expect_story(&mut self, story: StoryResponse) -> &mut Self {
        self.mock.queue_story(story);
        self
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
