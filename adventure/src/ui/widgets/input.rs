//! Action input field

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::GameTheme;

const PROMPT: &str = "What do you do?";
const LOCKED: &str = "The story unfolds...";

/// The player's action line.
///
/// While a story segment is generating the field is locked: the draft (or a
/// waiting message) is dimmed and no cursor is drawn.
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a GameTheme,
    focused: bool,
    command_mode: bool,
    locked: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a GameTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            focused: true,
            command_mode: false,
            locked: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn command_mode(mut self, command_mode: bool) -> Self {
        self.command_mode = command_mode;
        self
    }

    /// Lock the field while the next segment is written. Commands stay usable.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    fn is_locked(&self) -> bool {
        self.locked && !self.command_mode
    }

    fn line(&self) -> Line<'a> {
        let dim = Style::default().add_modifier(Modifier::DIM);

        if self.is_locked() {
            let text = if self.content.is_empty() { LOCKED } else { self.content };
            return Line::from(vec![Span::styled("> ", dim), Span::styled(text, dim)]);
        }

        if self.command_mode {
            let command = self.content.strip_prefix(':').unwrap_or(self.content);
            let cursor = self.cursor_position.saturating_sub(1);
            return self.editing_line(":", command, cursor);
        }

        if self.content.is_empty() && !self.focused {
            return Line::from(vec![
                Span::styled("> ", self.theme.player_style()),
                Span::styled(PROMPT, dim),
            ]);
        }

        self.editing_line("> ", self.content, self.cursor_position)
    }

    /// Text split around an underlined cursor cell.
    fn editing_line(&self, prefix: &'static str, text: &'a str, cursor: usize) -> Line<'a> {
        let before: String = text.chars().take(cursor).collect();
        let at = text
            .chars()
            .nth(cursor)
            .map(String::from)
            .unwrap_or_else(|| " ".to_string());
        let after: String = text.chars().skip(cursor + 1).collect();

        let cursor_style = if self.focused {
            Style::default()
                .fg(self.theme.player_text)
                .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::styled(prefix, self.theme.player_style()),
            Span::raw(before),
            Span::styled(at, cursor_style),
            Span::raw(after),
        ])
    }
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused && !self.is_locked()));

        let inner = block.inner(area);
        block.render(area, buf);
        Paragraph::new(self.line()).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn has_cursor(line: &Line) -> bool {
        line.spans
            .iter()
            .any(|s| s.style.add_modifier.contains(Modifier::UNDERLINED))
    }

    #[test]
    fn test_locked_shows_waiting_message_without_cursor() {
        let theme = GameTheme::default();
        let line = InputWidget::new("", &theme).locked(true).line();
        assert_eq!(text(&line), "> The story unfolds...");
        assert!(!has_cursor(&line));
    }

    #[test]
    fn test_locked_keeps_draft_dimmed() {
        let theme = GameTheme::default();
        let line = InputWidget::new("open the door", &theme).locked(true).line();
        assert_eq!(text(&line), "> open the door");
        assert!(line.spans.iter().all(|s| s.style.add_modifier.contains(Modifier::DIM)));
        assert!(!has_cursor(&line));
    }

    #[test]
    fn test_commands_stay_editable_while_locked() {
        let theme = GameTheme::default();
        let line = InputWidget::new(":size", &theme)
            .command_mode(true)
            .locked(true)
            .line();
        assert_eq!(text(&line), ":size ");
        assert!(has_cursor(&line));
    }

    #[test]
    fn test_unfocused_empty_field_prompts() {
        let theme = GameTheme::default();
        let line = InputWidget::new("", &theme).focused(false).line();
        assert_eq!(text(&line), "> What do you do?");
    }

    #[test]
    fn test_cursor_splits_unicode_text() {
        let theme = GameTheme::default();
        let line = InputWidget::new("café", &theme).cursor_position(3).line();
        assert_eq!(line.spans[1].content, "caf");
        assert_eq!(line.spans[2].content, "é");
        assert!(has_cursor(&line));
    }

    #[test]
    fn test_renders_inside_border() {
        let theme = GameTheme::default();
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        InputWidget::new("", &theme).locked(true).render(area, &mut buf);

        let row: String = (1..29).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.starts_with("> The story unfolds..."));
    }
}
