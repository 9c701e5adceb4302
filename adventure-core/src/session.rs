//! AdventureSession - the turn pipeline.
//!
//! A turn runs in two phases. The text phase asks the storyteller for the
//! next story segment and merges it into the game state; the image phase
//! paints the scene that segment describes. Front-ends can render between
//! the phases so narrative shows up before the picture does.

use std::path::PathBuf;

use thiserror::Error;

use crate::prompts::INITIAL_PROMPT;
use crate::scene::{Scene, SceneImage};
use crate::state::{ChatMessage, GameState, ImageSize};
use crate::story::StoryResponse;
use crate::storyteller::{GeminiStoryteller, Storyteller, StorytellerConfig, StorytellerError};

/// Errors from AdventureSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storyteller error: {0}")]
    Storyteller(#[from] StorytellerError),

    #[error("Action is empty")]
    EmptyAction,

    #[error("A story segment is already being generated")]
    Busy,

    #[error("No choice numbered {0}")]
    NoSuchChoice(usize),

    #[error("No API key configured - set GEMINI_API_KEY environment variable")]
    NoApiKey,
}

/// What the player did to trigger a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnAction {
    /// The opening turn; the prompt is not recorded in history.
    Start,
    /// One of the suggested choices.
    Choice(String),
    /// Free text typed by the player.
    Custom(String),
}

impl TurnAction {
    /// Text sent to the story model.
    pub fn prompt(&self) -> &str {
        match self {
            TurnAction::Start => INITIAL_PROMPT,
            TurnAction::Choice(text) | TurnAction::Custom(text) => text,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, TurnAction::Start)
    }
}

/// Configuration for a new session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Model and prompt settings for the Gemini storyteller.
    pub storyteller: StorytellerConfig,

    /// Starting image resolution.
    pub image_size: ImageSize,

    /// Directory generated scene images are written to.
    pub image_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storyteller(mut self, storyteller: StorytellerConfig) -> Self {
        self.storyteller = storyteller;
        self
    }

    pub fn with_image_size(mut self, size: ImageSize) -> Self {
        self.image_size = size;
        self
    }

    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }
}

/// Result of a full turn (text and image).
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub story: StoryResponse,
    pub scene: Scene,
}

/// A single-player adventure.
pub struct AdventureSession {
    storyteller: Box<dyn Storyteller>,
    state: GameState,
    image_dir: Option<PathBuf>,
}

impl AdventureSession {
    /// Create a session backed by Gemini.
    ///
    /// Requires `GEMINI_API_KEY` (or `API_KEY`) to be set.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let storyteller = GeminiStoryteller::from_env(config.storyteller.clone()).map_err(|e| match e {
            StorytellerError::Api(gemini::Error::NoApiKey) => SessionError::NoApiKey,
            other => SessionError::Storyteller(other),
        })?;
        Ok(Self::with_storyteller(Box::new(storyteller), config))
    }

    /// Create a session over any storyteller.
    pub fn with_storyteller(storyteller: Box<dyn Storyteller>, config: SessionConfig) -> Self {
        Self {
            storyteller,
            state: GameState::new(config.image_size),
            image_dir: config.image_dir,
        }
    }

    /// Run the opening turn's text phase.
    pub async fn start(&mut self) -> Result<StoryResponse, SessionError> {
        self.take_turn(TurnAction::Start).await
    }

    /// Text phase: generate the next story segment and merge it.
    ///
    /// On success the session is left with `is_generating_image` set and the
    /// caller is expected to follow up with [`paint_scene`](Self::paint_scene)
    /// using the returned `image_prompt`. On failure, or if the returned
    /// future is dropped before it completes, only the busy flags change.
    pub async fn take_turn(&mut self, action: TurnAction) -> Result<StoryResponse, SessionError> {
        if self.state.is_generating_story {
            return Err(SessionError::Busy);
        }
        let prompt = action.prompt().trim().to_string();
        if prompt.is_empty() {
            return Err(SessionError::EmptyAction);
        }

        tracing::info!(turn = self.state.turn + 1, start = action.is_start(), "generating story");
        let history = self.state.history.clone();
        let guard = BusyFlags::story(&mut self.state);

        let result = self.storyteller.generate_story(&history, &prompt).await;

        match result {
            Ok(story) => {
                apply_story(guard.finish(), &action, &prompt, &story);
                Ok(story)
            }
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                Err(e.into())
            }
        }
    }

    /// Image phase: paint the scene for the latest segment.
    ///
    /// Never fails. A failed image call falls back to a placeholder so the
    /// game keeps going.
    pub async fn paint_scene(&mut self, prompt: &str) -> &Scene {
        let size = self.state.image_size;
        let stem = format!("scene-{:03}", self.state.turn);
        let guard = BusyFlags::image(&mut self.state);

        let image = match self.storyteller.generate_scene_image(prompt, size).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "image generation failed, using placeholder");
                SceneImage::placeholder()
            }
        };

        let saved_to = match &self.image_dir {
            Some(dir) => match image.save(dir, &stem).await {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(error = %e, dir = %dir.display(), "failed to save scene image");
                    None
                }
            },
            None => None,
        };

        let state = guard.finish();
        state.is_generating_image = false;
        state.current_scene.insert(Scene {
            image,
            prompt: prompt.to_string(),
            size,
            saved_to,
        })
    }

    /// Run both phases of a turn.
    pub async fn play_turn(&mut self, action: TurnAction) -> Result<TurnOutcome, SessionError> {
        let story = self.take_turn(action).await?;
        let scene = self.paint_scene(&story.image_prompt).await.clone();
        Ok(TurnOutcome { story, scene })
    }

    /// Resolve a 1-based choice number from the latest segment.
    pub fn choice(&self, number: usize) -> Result<TurnAction, SessionError> {
        number
            .checked_sub(1)
            .and_then(|idx| self.state.choices.get(idx))
            .map(|text| TurnAction::Choice(text.clone()))
            .ok_or(SessionError::NoSuchChoice(number))
    }

    /// Advance to the next image size and return it.
    pub fn cycle_image_size(&mut self) -> ImageSize {
        self.state.image_size = self.state.image_size.next();
        self.state.image_size
    }

    pub fn set_image_size(&mut self, size: ImageSize) {
        self.state.image_size = size;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn choices(&self) -> &[String] {
        &self.state.choices
    }

    /// The latest narrative segment.
    pub fn narrative(&self) -> Option<&str> {
        self.state.narrative()
    }

    pub fn image_dir(&self) -> Option<&PathBuf> {
        self.image_dir.as_ref()
    }
}

/// Clears the busy flags it raised unless the phase completes.
///
/// A dropped turn future (timeout, `select!`) runs `Drop` here, so the
/// session never stays stuck in a generating state.
struct BusyFlags<'a> {
    state: Option<&'a mut GameState>,
}

impl<'a> BusyFlags<'a> {
    fn story(state: &'a mut GameState) -> Self {
        state.is_generating_story = true;
        Self { state: Some(state) }
    }

    fn image(state: &'a mut GameState) -> Self {
        state.is_generating_image = true;
        Self { state: Some(state) }
    }

    /// Hand the state back without resetting anything.
    fn finish(mut self) -> &'a mut GameState {
        match self.state.take() {
            Some(state) => state,
            None => unreachable!("busy guard finished twice"),
        }
    }
}

impl Drop for BusyFlags<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            state.is_generating_story = false;
            state.is_generating_image = false;
        }
    }
}

/// Merge a story segment into the state and hand over to the image phase.
fn apply_story(state: &mut GameState, action: &TurnAction, prompt: &str, story: &StoryResponse) {
    if !action.is_start() {
        state.history.push(ChatMessage::user(prompt));
    }
    state.history.push(ChatMessage::model(story.narrative.clone()));

    state.inventory = story.inventory.clone();
    state.current_quest = story.quest.clone();
    state.choices = story.choices.clone();
    state.turn += 1;

    state.is_generating_story = false;
    state.is_generating_image = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockStoryteller;

    #[test]
    fn test_session_config() {
        let config = SessionConfig::new()
            .with_image_size(ImageSize::TwoK)
            .with_image_dir("scenes")
            .with_storyteller(StorytellerConfig::default().with_temperature(0.5));

        assert_eq!(config.image_size, ImageSize::TwoK);
        assert_eq!(config.image_dir, Some(PathBuf::from("scenes")));
        assert_eq!(config.storyteller.temperature, 0.5);
    }

    #[test]
    fn test_turn_action_prompt() {
        assert_eq!(TurnAction::Start.prompt(), INITIAL_PROMPT);
        assert!(TurnAction::Start.is_start());
        assert_eq!(TurnAction::Choice("Run".into()).prompt(), "Run");
        assert!(!TurnAction::Custom("Hide".into()).is_start());
    }

    #[tokio::test]
    async fn test_take_turn_rejects_while_story_in_flight() {
        let mock = MockStoryteller::new();
        let mut session =
            AdventureSession::with_storyteller(Box::new(mock.clone()), SessionConfig::new());
        session.state.is_generating_story = true;

        let err = session.take_turn(TurnAction::Start).await.unwrap_err();
        assert!(matches!(err, SessionError::Busy));
        assert!(mock.calls().is_empty());
        assert!(session.state().is_generating_story);
        assert_eq!(session.state().turn, 0);
    }

    #[test]
    fn test_busy_flags_reset_on_drop() {
        let mut state = GameState::new(ImageSize::OneK);
        {
            let _guard = BusyFlags::story(&mut state);
        }
        assert!(!state.is_generating_story);
        assert!(!state.is_generating_image);

        let guard = BusyFlags::image(&mut state);
        guard.finish();
        assert!(state.is_generating_image);
    }
}
