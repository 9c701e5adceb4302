//! Headless game interface for programmatic use.
//!
//! This module provides a simplified interface for running adventures
//! without a TUI. It's designed for:
//! - Script-driven sessions
//! - Coding agents playing the game
//! - Smoke testing against the real API
//!
//! # Example
//!
//! ```ignore
//! use adventure_core::headless::HeadlessGame;
//! use adventure_core::SessionConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut game = HeadlessGame::new(SessionConfig::new())?;
//!
//!     let opening = game.begin().await?;
//!     println!("{}", opening.story.narrative);
//!
//!     // "1" picks the first suggested choice, anything else is free text
//!     let turn = game.send("1").await?;
//!     println!("Quest: {}", game.quest());
//!     println!("Scene: {}", turn.scene.location());
//!     Ok(())
//! }
//! ```

use crate::scene::Scene;
use crate::session::{AdventureSession, SessionConfig, SessionError, TurnAction, TurnOutcome};
use crate::state::ImageSize;
use crate::story::StoryResponse;
use crate::storyteller::Storyteller;

/// A game driven by plain text lines.
pub struct HeadlessGame {
    session: AdventureSession,
}

impl HeadlessGame {
    /// Create a game backed by Gemini (API key from the environment).
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        Ok(Self {
            session: AdventureSession::new(config)?,
        })
    }

    /// Create a game over a custom storyteller.
    pub fn with_storyteller(storyteller: Box<dyn Storyteller>, config: SessionConfig) -> Self {
        Self {
            session: AdventureSession::with_storyteller(storyteller, config),
        }
    }

    /// Wrap an existing session.
    pub fn from_session(session: AdventureSession) -> Self {
        Self { session }
    }

    /// Play the opening turn.
    pub async fn begin(&mut self) -> Result<TurnOutcome, SessionError> {
        self.session.play_turn(TurnAction::Start).await
    }

    /// Play a turn from a line of input.
    ///
    /// A single digit 1-9 picks the matching suggested choice; anything else
    /// is sent as a free-form action.
    pub async fn send(&mut self, input: &str) -> Result<TurnOutcome, SessionError> {
        let action = self.parse_action(input)?;
        self.session.play_turn(action).await
    }

    /// Text phase only, for callers that show the story before the scene.
    pub async fn take_turn(&mut self, action: TurnAction) -> Result<StoryResponse, SessionError> {
        self.session.take_turn(action).await
    }

    /// Image phase for the segment returned by [`take_turn`](Self::take_turn).
    pub async fn paint_scene(&mut self, prompt: &str) -> &Scene {
        self.session.paint_scene(prompt).await
    }

    /// Interpret a line of input as a turn action.
    pub fn parse_action(&self, input: &str) -> Result<TurnAction, SessionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SessionError::EmptyAction);
        }
        match input.parse::<usize>() {
            Ok(number @ 1..=9) => self.session.choice(number),
            _ => Ok(TurnAction::Custom(input.to_string())),
        }
    }

    pub fn cycle_image_size(&mut self) -> ImageSize {
        self.session.cycle_image_size()
    }

    pub fn set_image_size(&mut self, size: ImageSize) {
        self.session.set_image_size(size);
    }

    pub fn image_size(&self) -> ImageSize {
        self.session.state().image_size
    }

    pub fn inventory(&self) -> &[String] {
        &self.session.state().inventory
    }

    pub fn quest(&self) -> &str {
        &self.session.state().current_quest
    }

    pub fn choices(&self) -> &[String] {
        self.session.choices()
    }

    pub fn narrative(&self) -> Option<&str> {
        self.session.narrative()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.session.state().current_scene.as_ref()
    }

    /// Completed turns, the opening turn included.
    pub fn turn_count(&self) -> u32 {
        self.session.state().turn
    }

    pub fn session(&self) -> &AdventureSession {
        &self.session
    }
}
