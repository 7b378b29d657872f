//! Task panel rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use super::theme;
use crate::app::{App, PanelFocus};
use crate::session::SessionPhase;

/// Render the tasks of the selected list with the remaining count as title.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Tasks;
    let list_name = app
        .registry
        .selected_summary()
        .map_or("Tasks", |s| s.name.as_str());

    let mut title = vec![Span::styled(
        list_name,
        theme::panel_title(theme::TASKS_TITLE),
    )];
    if app.session.is_ready() {
        title.push(Span::styled(
            format!(" · {} tasks remaining", app.session.remaining()),
            theme::dimmed(),
        ));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    let placeholder = match app.session.phase() {
        SessionPhase::Empty => Some("Select a task list"),
        SessionPhase::Loading => Some("Loading…"),
        SessionPhase::Ready if app.session.tasks().is_empty() => Some("No tasks yet (a to add)"),
        SessionPhase::Ready => None,
    };
    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(Span::styled(text, theme::dimmed())).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .session
        .tasks()
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let checkbox = if task.completed { "[✓]" } else { "[ ]" };
            let text_style = if task.completed {
                theme::completed_task()
            } else {
                theme::normal()
            };

            let line = Line::from(vec![
                Span::styled(checkbox, text_style),
                Span::raw(" "),
                Span::styled(task.name.as_str(), text_style),
            ]);
            let item = ListItem::new(line);
            if idx == app.task_cursor && is_focused {
                item.style(theme::selected())
            } else if idx == app.task_cursor {
                item.style(theme::highlighted())
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items).block(block);

    frame.render_widget(list, area);
}
