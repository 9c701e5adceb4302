//! Narrative display widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::scrollbar,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget, Wrap,
    },
};

use crate::ui::theme::GameTheme;

/// Who produced a narrative entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeKind {
    Narration,
    PlayerAction,
    System,
}

/// A single entry in the narrative display
#[derive(Debug, Clone)]
pub struct NarrativeItem {
    pub content: String,
    pub kind: NarrativeKind,
}

/// Split a line on `**` markers, styling the enclosed runs with `accent`.
///
/// An unmatched trailing `**` is kept as literal text.
pub fn styled_spans(line: &str, base: Style, accent: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = line;
    let mut bold = false;

    while let Some(pos) = rest.find("**") {
        let (chunk, tail) = rest.split_at(pos);
        let tail = &tail[2..];

        // Opening marker with no partner: emit the rest as-is
        if !bold && !tail.contains("**") {
            break;
        }

        if !chunk.is_empty() {
            let style = if bold { accent } else { base };
            spans.push(Span::styled(chunk.to_string(), style));
        }
        bold = !bold;
        rest = tail;
    }

    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), base));
    }
    spans
}

/// Widget for displaying narrative text
pub struct NarrativeWidget<'a> {
    items: &'a [NarrativeItem],
    scroll: usize,
    theme: &'a GameTheme,
    loading: bool,
}

impl<'a> NarrativeWidget<'a> {
    pub fn new(items: &'a [NarrativeItem], theme: &'a GameTheme) -> Self {
        Self {
            items,
            scroll: 0,
            theme,
            loading: false,
        }
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the opening-turn message when there is nothing to display yet
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    fn style_for_kind(&self, kind: NarrativeKind) -> Style {
        match kind {
            NarrativeKind::Narration => self.theme.narrator_style(),
            NarrativeKind::PlayerAction => self.theme.player_style(),
            NarrativeKind::System => self.theme.error_style(),
        }
    }

    fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = Vec::new();

        if self.items.is_empty() && self.loading {
            lines.push(Line::from(Span::styled(
                "Initializing world...",
                self.theme.system_style(),
            )));
            return lines;
        }

        let accent = self.theme.accent_style();
        for item in self.items {
            let style = self.style_for_kind(item.kind);
            match item.kind {
                NarrativeKind::Narration => {
                    for line in item.content.lines() {
                        lines.push(Line::from(styled_spans(line, style, accent)));
                    }
                }
                NarrativeKind::PlayerAction => {
                    lines.push(Line::from(Span::styled(format!("> {}", item.content), style)));
                }
                NarrativeKind::System => {
                    lines.push(Line::from(Span::styled(format!("[ {} ]", item.content), style)));
                }
            }
            lines.push(Line::from(""));
        }
        lines
    }
}

impl Widget for NarrativeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Story ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(false));

        let inner = block.inner(area);
        block.render(area, buf);

        let lines = self.build_lines();

        let visible_height = inner.height as usize;
        let total_lines = lines.len();
        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll = self.scroll.min(max_scroll);

        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .wrap(Wrap { trim: false })
            .render(inner, buf);

        if total_lines > visible_height {
            let scrollbar_area = Rect {
                x: inner.x + inner.width.saturating_sub(1),
                y: inner.y,
                width: 1,
                height: inner.height,
            };

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .symbols(scrollbar::VERTICAL)
                .thumb_style(Style::default().fg(Color::DarkGray))
                .track_style(Style::default().fg(Color::Black))
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));

            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scroll);
            scrollbar.render(scrollbar_area, buf, &mut scrollbar_state);

            if scroll < max_scroll {
                let hint = format!(" ↓{} more ", max_scroll - scroll);
                let hint_y = inner.y + inner.height.saturating_sub(1);
                let hint_style = Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM);
                for (i, ch) in hint.chars().enumerate() {
                    let x = inner.x + (i as u16);
                    if x < inner.x + inner.width.saturating_sub(2) {
                        buf[(x, hint_y)].set_char(ch).set_style(hint_style);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(spans: &[Span]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_bold_markers_become_accent_spans() {
        let base = Style::default();
        let accent = Style::default().add_modifier(Modifier::BOLD);
        let spans = styled_spans("You find a **silver key** here.", base, accent);

        assert_eq!(contents(&spans), vec!["You find a ", "silver key", " here."]);
        assert_eq!(spans[1].style, accent);
        assert_eq!(spans[2].style, base);
    }

    #[test]
    fn test_unmatched_marker_is_literal() {
        let spans = styled_spans("a ** b", Style::default(), Style::default());
        assert_eq!(contents(&spans), vec!["a ** b"]);
    }

    #[test]
    fn test_plain_line() {
        let spans = styled_spans("nothing special", Style::default(), Style::default());
        assert_eq!(contents(&spans), vec!["nothing special"]);
        assert!(styled_spans("", Style::default(), Style::default()).is_empty());
    }

    #[test]
    fn test_loading_message_only_when_empty() {
        let theme = GameTheme::default();
        let lines = NarrativeWidget::new(&[], &theme).loading(true).build_lines();
        assert_eq!(lines.len(), 1);

        let items = vec![NarrativeItem {
            content: "Hello".to_string(),
            kind: NarrativeKind::Narration,
        }];
        let lines = NarrativeWidget::new(&items, &theme).loading(true).build_lines();
        assert_eq!(lines.len(), 2);
    }
}
