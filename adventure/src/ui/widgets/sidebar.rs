//! Quest and inventory sidebar

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::GameTheme;

pub struct SidebarWidget<'a> {
    quest: &'a str,
    inventory: &'a [String],
    theme: &'a GameTheme,
}

impl<'a> SidebarWidget<'a> {
    pub fn new(quest: &'a str, inventory: &'a [String], theme: &'a GameTheme) -> Self {
        Self {
            quest,
            inventory,
            theme,
        }
    }
}

impl Widget for SidebarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let dim = Style::default().add_modifier(Modifier::DIM);

        // Quest
        let quest_block = Block::default()
            .title(" Quest ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));
        let quest_line = if self.quest.is_empty() {
            Line::from(Span::styled("Unknown", dim))
        } else {
            Line::from(Span::styled(self.quest, self.theme.accent_style()))
        };
        Paragraph::new(quest_line)
            .block(quest_block)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        // Inventory
        let inventory_block = Block::default()
            .title(format!(" Inventory ({}) ", self.inventory.len()))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));
        let items: Vec<Line> = if self.inventory.is_empty() {
            vec![Line::from(Span::styled("Empty", dim))]
        } else {
            self.inventory
                .iter()
                .map(|item| Line::from(format!("• {item}")))
                .collect()
        };
        Paragraph::new(items)
            .block(inventory_block)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);
    }
}
