//! Scene panel widget
//!
//! A terminal cannot show the painting itself, so the panel reports where it
//! lives (saved file or placeholder URL) along with its size and prompt.

use adventure_core::{ImageSize, Scene};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::GameTheme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner glyph for an animation frame
pub fn spinner(frame: u8) -> &'static str {
    SPINNER[frame as usize % SPINNER.len()]
}

pub struct ScenePanelWidget<'a> {
    scene: Option<&'a Scene>,
    theme: &'a GameTheme,
    size: ImageSize,
    painting: bool,
    dreaming: bool,
    frame: u8,
}

impl<'a> ScenePanelWidget<'a> {
    pub fn new(scene: Option<&'a Scene>, size: ImageSize, theme: &'a GameTheme) -> Self {
        Self {
            scene,
            theme,
            size,
            painting: false,
            dreaming: false,
            frame: 0,
        }
    }

    /// Image generation in progress
    pub fn painting(mut self, painting: bool) -> Self {
        self.painting = painting;
        self
    }

    /// Story generation in progress
    pub fn dreaming(mut self, dreaming: bool) -> Self {
        self.dreaming = dreaming;
        self
    }

    pub fn frame(mut self, frame: u8) -> Self {
        self.frame = frame;
        self
    }

    fn build_lines(&self) -> Vec<Line<'a>> {
        let dim = Style::default().add_modifier(Modifier::DIM);

        if self.painting {
            return vec![Line::from(Span::styled(
                format!("{} Painting scene ({})...", spinner(self.frame), self.size),
                self.theme.accent_style(),
            ))];
        }

        match self.scene {
            Some(scene) => {
                let (label, location) = match &scene.saved_to {
                    Some(path) => ("Saved", path.display().to_string()),
                    None if scene.image.is_placeholder() => ("Placeholder", scene.location()),
                    None => ("Generated", format!("in memory (.{})", scene.image.extension())),
                };
                vec![
                    Line::from(vec![
                        Span::styled(format!("{label}: "), self.theme.accent_style()),
                        Span::raw(location),
                        Span::styled(format!("  [{}]", scene.size), dim),
                    ]),
                    Line::from(Span::styled(scene.prompt.clone(), self.theme.player_style())),
                ]
            }
            None if self.dreaming => vec![Line::from(Span::styled(
                format!("{} Dreaming...", spinner(self.frame)),
                self.theme.system_style(),
            ))],
            None => vec![Line::from(Span::styled("No image available", dim))],
        }
    }
}

impl Widget for ScenePanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Scene ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.painting));

        let inner = block.inner(area);
        block.render(area, buf);

        Paragraph::new(self.build_lines())
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
