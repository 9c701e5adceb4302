//! Main application state and logic

use std::collections::VecDeque;

use adventure_core::{ImageSize, Scene};
use tokio::sync::mpsc;

use crate::ui::theme::GameTheme;
use crate::ui::widgets::narrative::{NarrativeItem, NarrativeKind};
use crate::ui::Overlay;
use crate::worker::{WorkerRequest, WorkerResponse};

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - free text input
    Insert,
    /// Command mode - entering : commands
    Command,
}

/// Main application state
pub struct App {
    // Channel communication with AI worker
    pub request_tx: mpsc::Sender<WorkerRequest>,
    pub response_rx: mpsc::Receiver<WorkerResponse>,

    // Game state snapshot for rendering
    pub inventory: Vec<String>,
    pub quest: String,
    pub choices: Vec<String>,
    pub scene: Option<Scene>,
    pub image_size: ImageSize,
    pub turn: u32,
    pub is_generating_story: bool,
    pub is_generating_image: bool,

    // UI state
    pub theme: GameTheme,
    pub sidebar_visible: bool,
    overlay: Option<Overlay>,

    // Narrative display
    pub narrative_history: Vec<NarrativeItem>,
    pub narrative_scroll: usize,
    pub scroll_locked_to_bottom: bool,

    // Input state
    pub input_mode: InputMode,
    input_buffer: String,
    cursor_position: usize,
    pub input_history: VecDeque<String>,
    pub history_index: Option<usize>,
    pub saved_input: Option<String>,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,
}

impl App {
    /// Create a new application with channel endpoints
    pub fn new(
        request_tx: mpsc::Sender<WorkerRequest>,
        response_rx: mpsc::Receiver<WorkerResponse>,
        image_size: ImageSize,
    ) -> Self {
        Self {
            request_tx,
            response_rx,
            inventory: Vec::new(),
            quest: String::new(),
            choices: Vec::new(),
            scene: None,
            image_size,
            turn: 0,
            is_generating_story: false,
            is_generating_image: false,
            theme: GameTheme::default(),
            sidebar_visible: true,
            overlay: None,
            narrative_history: Vec::new(),
            narrative_scroll: 0,
            scroll_locked_to_bottom: true,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            input_history: VecDeque::with_capacity(100),
            history_index: None,
            saved_input: None,
            status_message: None,
            should_quit: false,
            animation_frame: 0,
        }
    }

    /// Ask the worker for the opening turn.
    pub fn start(&mut self) {
        if self.request_tx.try_send(WorkerRequest::Start).is_ok() {
            self.is_generating_story = true;
            self.set_status("Initializing world...");
        } else {
            self.set_status("Worker unavailable");
        }
    }

    /// Enter command mode (starts with :)
    pub fn enter_command_mode(&mut self) {
        self.input_mode = InputMode::Command;
        self.input_buffer.clear();
        self.input_buffer.push(':');
        self.cursor_position = 1;
    }

    /// Exit to normal mode
    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        if self.input_buffer.starts_with(':') {
            self.input_buffer.clear();
            self.cursor_position = 0;
        }
    }

    /// Add a narrative entry
    pub fn add_narrative(&mut self, content: String, kind: NarrativeKind) {
        self.narrative_history.push(NarrativeItem { content, kind });
        if self.scroll_locked_to_bottom {
            self.scroll_to_bottom();
        }
    }

    /// Scroll narrative to bottom and lock to bottom
    pub fn scroll_to_bottom(&mut self) {
        // The widget caps this to the real maximum
        self.narrative_scroll = usize::MAX / 2;
        self.scroll_locked_to_bottom = true;
    }

    /// Scroll narrative to the top
    pub fn scroll_to_top(&mut self) {
        self.narrative_scroll = 0;
        self.scroll_locked_to_bottom = false;
    }

    /// Rough line count assuming ~60 columns of text
    fn estimate_max_scroll(&self) -> usize {
        const ESTIMATED_WIDTH: usize = 60;
        const ESTIMATED_VISIBLE_HEIGHT: usize = 12;

        let estimated_lines: usize = self
            .narrative_history
            .iter()
            .map(|item| {
                item.content
                    .lines()
                    .map(|line| (line.len() / ESTIMATED_WIDTH).max(1))
                    .sum::<usize>()
                    + 1
            })
            .sum();

        estimated_lines.saturating_sub(ESTIMATED_VISIBLE_HEIGHT)
    }

    /// Scroll narrative up (unlocks from bottom)
    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.estimate_max_scroll();
        if self.narrative_scroll > max_scroll {
            self.narrative_scroll = max_scroll;
        }
        self.narrative_scroll = self.narrative_scroll.saturating_sub(lines);
        self.scroll_locked_to_bottom = false;
    }

    /// Scroll narrative down
    pub fn scroll_down(&mut self, lines: usize) {
        self.narrative_scroll = self.narrative_scroll.saturating_add(lines);
        let max_scroll = self.estimate_max_scroll();
        self.narrative_scroll = self.narrative_scroll.min(max_scroll + 100);
    }

    /// Take the current input, recording it in history
    pub fn submit_input(&mut self) -> Option<String> {
        if self.input_buffer.trim().is_empty() {
            return None;
        }

        let input = std::mem::take(&mut self.input_buffer);
        self.cursor_position = 0;

        if !input.starts_with(':') {
            self.input_history.push_front(input.clone());
            if self.input_history.len() > 100 {
                self.input_history.pop_back();
            }
        }
        self.history_index = None;
        self.saved_input = None;

        Some(input)
    }

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position)
            {
                self.input_buffer
                    .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position) {
            self.input_buffer
                .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Navigate to previous input in history
    pub fn history_prev(&mut self) {
        if self.input_history.is_empty() {
            return;
        }

        if self.history_index.is_none() && !self.input_buffer.is_empty() {
            self.saved_input = Some(self.input_buffer.clone());
        }

        let idx = match self.history_index {
            None => 0,
            Some(i) if i + 1 < self.input_history.len() => i + 1,
            Some(i) => i,
        };

        if let Some(entry) = self.input_history.get(idx) {
            self.input_buffer = entry.clone();
            self.cursor_position = self.input_buffer.chars().count();
            self.history_index = Some(idx);
        }
    }

    /// Navigate to next input in history
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.input_buffer = self.saved_input.take().unwrap_or_default();
                self.cursor_position = self.input_buffer.chars().count();
                self.history_index = None;
            }
            Some(i) => {
                if let Some(entry) = self.input_history.get(i - 1) {
                    self.input_buffer = entry.clone();
                    self.cursor_position = self.input_buffer.chars().count();
                    self.history_index = Some(i - 1);
                }
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
    }

    /// Close any open overlay
    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Send a player action to the AI worker.
    ///
    /// Ignored while a story segment is generating or when the text is blank.
    pub fn send_player_action(&mut self, input: String) -> bool {
        let input = input.trim().to_string();
        if input.is_empty() {
            return false;
        }
        self.request_turn(WorkerRequest::PlayerAction(input))
    }

    /// Pick a suggested choice by its 1-based number.
    pub fn choose(&mut self, number: usize) -> bool {
        if self.is_generating_story {
            self.set_status("The story is still being written...");
            return false;
        }
        match number.checked_sub(1).and_then(|idx| self.choices.get(idx)) {
            Some(choice) => {
                let request = WorkerRequest::Choice(choice.clone());
                self.request_turn(request)
            }
            None => {
                self.set_status(format!("No choice numbered {number}"));
                false
            }
        }
    }

    fn request_turn(&mut self, request: WorkerRequest) -> bool {
        if self.is_generating_story {
            self.set_status("The story is still being written...");
            return false;
        }
        if self.request_tx.try_send(request).is_err() {
            self.set_status("Worker busy, please wait...");
            return false;
        }

        self.is_generating_story = true;
        self.set_status("Writing the next chapter...");
        true
    }

    /// Advance to the next image size and tell the worker.
    pub fn cycle_image_size(&mut self) {
        self.set_image_size(self.image_size.next());
    }

    pub fn set_image_size(&mut self, size: ImageSize) {
        self.image_size = size;
        if self
            .request_tx
            .try_send(WorkerRequest::SetImageSize(size))
            .is_err()
        {
            tracing::warn!(%size, "could not forward image size to worker");
        }
        self.set_status(format!("Image size: {size}"));
    }

    /// Process a colon command. Returns whether it was recognised.
    pub fn process_command(&mut self, command: &str) -> bool {
        let cmd = command.trim_start_matches(':');
        let parts: Vec<&str> = cmd.split_whitespace().collect();

        let Some(&name) = parts.first() else {
            return false;
        };

        match name {
            "q" | "quit" | "exit" => {
                self.should_quit = true;
                true
            }
            "size" => {
                match parts.get(1) {
                    Some(arg) => match arg.parse::<ImageSize>() {
                        Ok(size) => self.set_image_size(size),
                        Err(e) => self.set_status(e.to_string()),
                    },
                    None => self.cycle_image_size(),
                }
                true
            }
            "sidebar" => {
                self.toggle_sidebar();
                true
            }
            "help" | "h" => {
                self.toggle_help();
                true
            }
            _ => {
                self.set_status(format!("Unknown command: {name}"));
                false
            }
        }
    }

    /// Fold a worker response into the UI state
    pub fn apply_worker_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::StoryReady {
                story,
                action,
                turn,
            } => {
                if let Some(action) = action {
                    self.add_narrative(action, NarrativeKind::PlayerAction);
                }
                self.add_narrative(story.narrative, NarrativeKind::Narration);
                self.inventory = story.inventory;
                self.quest = story.quest;
                self.choices = story.choices;
                self.turn = turn;
                self.is_generating_story = false;
                self.is_generating_image = true;
                self.set_status("Painting scene...");
            }
            WorkerResponse::SceneReady(scene) => {
                if scene.image.is_placeholder() {
                    self.set_status("Image unavailable, using placeholder");
                } else {
                    self.clear_status();
                }
                self.scene = Some(scene);
                self.is_generating_image = false;
            }
            WorkerResponse::StoryFailed(message) => {
                self.is_generating_story = false;
                self.is_generating_image = false;
                self.add_narrative(
                    format!("The storyteller faltered: {message}"),
                    NarrativeKind::System,
                );
                self.set_status("Something went wrong. Try again.");
            }
        }
    }

    /// Drain every response the worker has queued
    pub fn poll_worker(&mut self) {
        while let Ok(response) = self.response_rx.try_recv() {
            self.apply_worker_response(response);
        }
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// Stop the worker before exiting
    pub fn shutdown(&self) {
        let _ = self.request_tx.try_send(WorkerRequest::Shutdown);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Clear the input buffer
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
}
