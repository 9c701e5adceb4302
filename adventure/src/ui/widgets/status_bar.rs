//! Status bar widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::InputMode;
use crate::ui::theme::GameTheme;

/// Status bar showing input mode, generation state and messages
pub struct StatusBarWidget<'a> {
    input_mode: InputMode,
    theme: &'a GameTheme,
    busy: Option<&'a str>,
    message: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(input_mode: InputMode, theme: &'a GameTheme) -> Self {
        Self {
            input_mode,
            theme,
            busy: None,
            message: None,
        }
    }

    /// Label for the phase currently generating, if any
    pub fn busy(mut self, busy: Option<&'a str>) -> Self {
        self.busy = busy;
        self
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (input_mode_text, input_mode_style) = match self.input_mode {
            InputMode::Normal => (
                "NORMAL",
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            InputMode::Insert => (
                "INSERT",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            InputMode::Command => (
                "COMMAND",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        };

        let mut spans = vec![Span::styled(
            format!("-- {input_mode_text} --"),
            input_mode_style,
        )];

        if let Some(busy) = self.busy {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(busy, self.theme.accent_style()));
        }

        if let Some(msg) = self.message {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                msg,
                Style::default().add_modifier(Modifier::DIM),
            ));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

/// Hotkey bar widget
pub struct HotkeyBarWidget {
    input_mode: InputMode,
}

impl HotkeyBarWidget {
    pub fn new(input_mode: InputMode) -> Self {
        Self { input_mode }
    }
}

impl Widget for HotkeyBarWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let hotkeys = match self.input_mode {
            InputMode::Normal => vec![
                ("1-9:choose", true),
                ("i:insert", true),
                ("z:image size", true),
                ("s:sidebar", true),
                ("j/k:scroll", false),
                ("?:help", false),
                ("q:quit", false),
            ],
            InputMode::Insert => vec![
                ("Esc:normal", true),
                ("Enter:send", true),
                ("↑↓:history", false),
            ],
            InputMode::Command => vec![
                ("Esc:cancel", true),
                ("Enter:execute", true),
                (":size 1K|2K|4K", false),
                (":sidebar", false),
                (":q", false),
            ],
        };

        let spans: Vec<Span> = hotkeys
            .iter()
            .flat_map(|(text, primary)| {
                let style = if *primary {
                    Style::default()
                } else {
                    Style::default().add_modifier(Modifier::DIM)
                };
                vec![Span::styled(*text, style), Span::raw("  ")]
            })
            .collect();

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
