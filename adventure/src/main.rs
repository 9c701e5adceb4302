//! Infinite Adventure TUI application.
//!
//! A vim-style terminal interface for an endless choose-your-own-adventure
//! written and illustrated by Gemini.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a text-based interface suitable for scripts:
//!
//! ```bash
//! cargo run -p adventure -- --headless --image-size 2K
//! ```

mod app;
mod events;
mod headless;
mod ui;
mod worker;

use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use adventure_core::{
    AdventureSession, HeadlessGame, ImageSize, SessionConfig, SessionError, StorytellerConfig,
};
use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{fmt, EnvFilter};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

#[derive(Parser, Debug)]
#[command(name = "adventure")]
#[command(about = "An endless, illustrated choose-your-own-adventure")]
struct Cli {
    /// Run in headless mode (line protocol on stdin/stdout, no TUI)
    #[arg(long)]
    headless: bool,

    /// Directory generated scene images are saved to
    #[arg(long, env = "ADVENTURE_IMAGE_DIR", default_value = "scenes")]
    image_dir: PathBuf,

    /// Starting image size: 1K, 2K or 4K
    #[arg(long, default_value = "1K")]
    image_size: ImageSize,

    /// Model used for the story text
    #[arg(long, env = "ADVENTURE_STORY_MODEL")]
    story_model: Option<String>,

    /// Model used for scene images
    #[arg(long, env = "ADVENTURE_IMAGE_MODEL")]
    image_model: Option<String>,

    /// Sampling temperature for the story model
    #[arg(long)]
    temperature: Option<f32>,

    /// Log file for TUI mode (headless mode logs to stderr)
    #[arg(long, default_value = "adventure.log")]
    log_file: PathBuf,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        let mut storyteller = StorytellerConfig::default();
        if let Some(model) = &self.story_model {
            storyteller = storyteller.with_story_model(model.clone());
        }
        if let Some(model) = &self.image_model {
            storyteller = storyteller.with_image_model(model.clone());
        }
        if let Some(temperature) = self.temperature {
            storyteller = storyteller.with_temperature(temperature);
        }

        SessionConfig::new()
            .with_storyteller(storyteller)
            .with_image_size(self.image_size)
            .with_image_dir(self.image_dir.clone())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // The alternate screen owns stdout/stderr in TUI mode, so logs go to a file
    if cli.headless {
        fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .init();
    } else {
        let log_file = File::create(&cli.log_file)
            .with_context(|| format!("failed to create log file {}", cli.log_file.display()))?;
        fmt()
            .with_env_filter(env_filter())
            .with_writer(Mutex::new(log_file))
            .with_ansi(false)
            .init();
    }

    let session = match AdventureSession::new(cli.session_config()) {
        Ok(session) => session,
        Err(SessionError::NoApiKey) => {
            eprintln!("Error: GEMINI_API_KEY environment variable not set.");
            eprintln!("Please set it in .env file or with: export GEMINI_API_KEY=your_key_here");
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("failed to create adventure session"),
    };

    tracing::info!(
        headless = cli.headless,
        image_size = %cli.image_size,
        image_dir = %cli.image_dir.display(),
        "starting adventure"
    );

    if cli.headless {
        let game = HeadlessGame::from_session(session);
        return headless::run_headless(game).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (request_tx, response_rx) = worker::spawn_worker(session);
    let mut app = App::new(request_tx, response_rx, cli.image_size);
    app.start();

    let result = run_app(&mut terminal, &mut app).await;
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "terminal loop failed");
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        // Worker responses land between frames
        app.poll_worker();

        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout for animations
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            if handle_event(app, ev) == EventResult::Quit {
                return Ok(());
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }

        // Let the worker task make progress on the runtime
        tokio::task::yield_now().await;
    }
}
