//! Suggested choices widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::GameTheme;

/// Numbered list of the actions suggested by the latest segment
pub struct ChoicesWidget<'a> {
    choices: &'a [String],
    theme: &'a GameTheme,
}

impl<'a> ChoicesWidget<'a> {
    pub fn new(choices: &'a [String], theme: &'a GameTheme) -> Self {
        Self { choices, theme }
    }
}

impl Widget for ChoicesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let block = Block::default()
            .title(" What do you do? ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        // Only 1-9 are reachable from the keyboard
        let lines: Vec<Line> = self
            .choices
            .iter()
            .take(9)
            .enumerate()
            .map(|(i, choice)| {
                Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), self.theme.accent_style()),
                    Span::styled(choice.as_str(), self.theme.narrator_style()),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}
