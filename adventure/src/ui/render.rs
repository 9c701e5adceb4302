//! Render orchestration for the adventure TUI

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::ui::layout::{centered_rect_fixed, AppLayout};
use crate::ui::widgets::{
    ChoicesWidget, HotkeyBarWidget, InputWidget, NarrativeWidget, ScenePanelWidget,
    SidebarWidget, StatusBarWidget,
};

/// Overlay types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Choices stay hidden until the next segment lands
    let visible_choices: &[String] = if app.is_generating_story {
        &[]
    } else {
        &app.choices
    };
    let layout = AppLayout::calculate(area, app.sidebar_visible, visible_choices.len().min(9));

    render_title_bar(frame, app, layout.title_area);

    let scene_widget = ScenePanelWidget::new(app.scene.as_ref(), app.image_size, &app.theme)
        .painting(app.is_generating_image)
        .dreaming(app.is_generating_story)
        .frame(app.animation_frame);
    frame.render_widget(scene_widget, layout.scene_area);

    let narrative_widget = NarrativeWidget::new(&app.narrative_history, &app.theme)
        .scroll(app.narrative_scroll)
        .loading(app.is_generating_story);
    frame.render_widget(narrative_widget, layout.narrative_area);

    frame.render_widget(
        ChoicesWidget::new(visible_choices, &app.theme),
        layout.choices_area,
    );

    if let Some(sidebar_area) = layout.sidebar_area {
        frame.render_widget(
            SidebarWidget::new(&app.quest, &app.inventory, &app.theme),
            sidebar_area,
        );
    }

    render_status_bar(frame, app, layout.status_bar);
    frame.render_widget(HotkeyBarWidget::new(app.input_mode), layout.hotkey_bar);
    render_input(frame, app, layout.input_area);

    if let Some(Overlay::Help) = app.overlay() {
        render_help_overlay(frame, app, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Infinite Adventure | Turn {} | Image {} ",
        app.turn, app.image_size
    );
    let line = Line::from(Span::styled(title, app.theme.title_style()));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let busy = if app.is_generating_story {
        Some("Writing...")
    } else if app.is_generating_image {
        Some("Painting...")
    } else {
        None
    };

    let status_widget = StatusBarWidget::new(app.input_mode, &app.theme)
        .busy(busy)
        .message(app.status_message());
    frame.render_widget(status_widget, area);
}

/// Render the input area
fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.input_mode, InputMode::Insert | InputMode::Command);
    let command_mode = matches!(app.input_mode, InputMode::Command);

    let input_widget = InputWidget::new(app.input_buffer(), &app.theme)
        .cursor_position(app.cursor_position())
        .focused(focused)
        .command_mode(command_mode)
        .locked(app.is_generating_story);

    frame.render_widget(input_widget, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let popup_area = centered_rect_fixed(52, 24, area);
    frame.render_widget(Clear, popup_area);

    let heading = Style::default().add_modifier(Modifier::UNDERLINED);
    let help_text = vec![
        Line::from(Span::styled(
            " Infinite Adventure - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Playing:", heading)),
        Line::from("  1-9     Take a suggested action"),
        Line::from("  i       Describe your own action"),
        Line::from("  Enter   Send (INSERT mode)"),
        Line::from("  Esc     Return to NORMAL mode"),
        Line::from(""),
        Line::from(Span::styled("Display:", heading)),
        Line::from("  z       Cycle image size (1K/2K/4K)"),
        Line::from("  s       Toggle quest/inventory sidebar"),
        Line::from("  j/k     Scroll story"),
        Line::from("  g/G     Jump to top/bottom"),
        Line::from(""),
        Line::from(Span::styled("Commands:", heading)),
        Line::from("  :size [1K|2K|4K]   Set or cycle image size"),
        Line::from("  :sidebar           Toggle sidebar"),
        Line::from("  :q                 Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::WorkerResponse;
    use adventure_core::{ImageSize, MockStory};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn screen_text(app: &App) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn test_app() -> App {
        let (request_tx, _request_rx) = mpsc::channel(8);
        let (_response_tx, response_rx) = mpsc::channel(64);
        App::new(request_tx, response_rx, ImageSize::OneK)
    }

    #[test]
    fn test_opening_screen() {
        let mut app = test_app();
        app.is_generating_story = true;
        let text = screen_text(&app);

        assert!(text.contains("Infinite Adventure"));
        assert!(text.contains("Initializing world..."));
        assert!(text.contains("Dreaming..."));
        assert!(text.contains("The story unfolds..."));
    }

    #[test]
    fn test_choices_hidden_while_generating() {
        let mut app = test_app();
        app.apply_worker_response(WorkerResponse::StoryReady {
            story: MockStory::narrative("The tide rolls in."),
            action: None,
            turn: 1,
        });
        assert!(screen_text(&app).contains("Look around"));

        app.is_generating_story = true;
        assert!(!screen_text(&app).contains("Look around"));
    }
}
