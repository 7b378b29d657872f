//! Input line for new list and task names.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::Span,
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, InputTarget, PanelFocus};

/// Render the input box and place the cursor when it is focused.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Input;
    let title = match app.input_target {
        InputTarget::NewList => "New list",
        InputTarget::NewTask => "New task",
    };

    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::INPUT_TITLE)))
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    let paragraph = Paragraph::new(Span::styled(app.input(), theme::input_text())).block(block);
    frame.render_widget(paragraph, area);

    if is_focused {
        let width = u16::try_from(app.input().chars().count()).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(width)
            .min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}
