//! Layout calculations for the adventure TUI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the scene panel, borders included
const SCENE_HEIGHT: u16 = 6;

/// Calculate the main layout areas
pub struct AppLayout {
    pub title_area: Rect,
    pub scene_area: Rect,
    pub narrative_area: Rect,
    pub choices_area: Rect,
    pub sidebar_area: Option<Rect>,
    pub status_bar: Rect,
    pub hotkey_bar: Rect,
    pub input_area: Rect,
}

impl AppLayout {
    /// Calculate layout based on terminal size.
    ///
    /// `choice_rows` is the number of choices to show; zero collapses the
    /// choices panel.
    pub fn calculate(area: Rect, sidebar_visible: bool, choice_rows: usize) -> Self {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title bar
                Constraint::Min(8),    // Main content
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Hotkey bar
                Constraint::Length(3), // Input area
            ])
            .split(area);

        let (story_column, sidebar_area) = if sidebar_visible {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(main_chunks[1]);
            (content_chunks[0], Some(content_chunks[1]))
        } else {
            (main_chunks[1], None)
        };

        let choices_height = if choice_rows == 0 {
            0
        } else {
            choice_rows as u16 + 2
        };

        let story_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SCENE_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(choices_height),
            ])
            .split(story_column);

        Self {
            title_area: main_chunks[0],
            scene_area: story_chunks[0],
            narrative_area: story_chunks[1],
            choices_area: story_chunks[2],
            sidebar_area,
            status_bar: main_chunks[2],
            hotkey_bar: main_chunks[3],
            input_area: main_chunks[4],
        }
    }
}

/// Calculate fixed-size centered popup
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
