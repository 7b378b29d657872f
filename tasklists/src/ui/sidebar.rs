//! Sidebar rendering for the task list index.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the sidebar with every known list, marking the selected one.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Lists;
    let selected = app.registry.selected();

    let items: Vec<ListItem> = app
        .registry
        .lists()
        .iter()
        .enumerate()
        .map(|(idx, list)| {
            let is_highlighted = idx == app.list_cursor;
            let marker = if selected == Some(list.id) { "▸ " } else { "  " };

            let line = Line::from(vec![
                Span::styled(marker, theme::normal().fg(theme::SUCCESS)),
                Span::raw(list.name.as_str()),
            ]);
            let style = if is_highlighted && is_focused {
                theme::selected()
            } else if is_highlighted {
                theme::highlighted()
            } else {
                theme::normal()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let block = Block::default()
        .title(Span::styled("Task Lists", theme::panel_title(theme::LISTS_TITLE)))
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}
