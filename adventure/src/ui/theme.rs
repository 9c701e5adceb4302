//! Color theme and styling for the adventure TUI

use ratatui::style::{Color, Modifier, Style};

/// Game UI color theme
#[derive(Debug, Clone)]
pub struct GameTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Text colors
    pub player_text: Color,
    pub narrator_text: Color,
    pub system_text: Color,
    pub error_text: Color,

    /// Highlight for `**bold**` story spans, the quest and choice numbers
    pub accent: Color,
}

impl Default for GameTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            player_text: Color::Cyan,
            narrator_text: Color::White,
            system_text: Color::DarkGray,
            error_text: Color::LightRed,

            accent: Color::Yellow,
        }
    }
}

impl GameTheme {
    /// Get style for story narration
    pub fn narrator_style(&self) -> Style {
        Style::default().fg(self.narrator_text)
    }

    /// Get style for player actions
    pub fn player_style(&self) -> Style {
        Style::default()
            .fg(self.player_text)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get style for system messages
    pub fn system_style(&self) -> Style {
        Style::default()
            .fg(self.system_text)
            .add_modifier(Modifier::DIM)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error_text)
    }

    /// Emphasised text inside narration
    pub fn accent_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Get title style
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .add_modifier(Modifier::BOLD)
    }
}
