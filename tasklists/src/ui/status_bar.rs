//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.focus {
        PanelFocus::Lists => {
            "↑↓/jk: move | Enter: open | a: new list | d: delete | r: refresh | Tab: tasks | q: quit"
        }
        PanelFocus::Tasks => {
            "↑↓/jk: move | Space: toggle | a: new task | c: clear done | r: reload | Tab: lists"
        }
        PanelFocus::Input => "Enter: create | Esc: cancel | Ctrl-C: quit",
    };

    let mut spans = vec![Span::styled("tasklists", theme::bold())];
    if app.pending > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("syncing ({})", app.pending),
            theme::normal().fg(theme::WARNING),
        ));
    }
    if let Some(status) = &app.status {
        let color = if status.is_error {
            theme::ERROR
        } else {
            theme::SUCCESS
        };
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(status.timestamp.as_str(), theme::timestamp()));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(status.text.as_str(), theme::normal().fg(color)));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(help_text, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
