//! Choose-your-own-adventure engine driven by generative AI.
//!
//! This crate provides:
//! - The game state (inventory, quest, choices, history, scene)
//! - A structured story schema for the text model
//! - The two-phase turn pipeline (story, then scene image)
//! - A headless API and scripted test doubles
//!
//! # Quick Start
//!
//! ```ignore
//! use adventure_core::{AdventureSession, SessionConfig, TurnAction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::new().with_image_dir("scenes");
//!     let mut session = AdventureSession::new(config)?;
//!
//!     let story = session.start().await?;
//!     println!("{}", story.narrative);
//!     session.paint_scene(&story.image_prompt).await;
//!
//!     let outcome = session.play_turn(session.choice(1)?).await?;
//!     println!("{}", outcome.story.narrative);
//!     Ok(())
//! }
//! ```

pub mod headless;
pub mod prompts;
pub mod scene;
pub mod session;
pub mod state;
pub mod story;
pub mod storyteller;
pub mod testing;

// Primary public API
pub use headless::HeadlessGame;
pub use scene::{Scene, SceneImage};
pub use session::{AdventureSession, SessionConfig, SessionError, TurnAction, TurnOutcome};
pub use state::{ChatMessage, GameState, ImageSize, Role};
pub use story::StoryResponse;
pub use storyteller::{GeminiStoryteller, Storyteller, StorytellerConfig, StorytellerError};
pub use testing::{MockStory, MockStoryteller, TestHarness};
