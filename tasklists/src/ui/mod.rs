//! Terminal UI rendering.

pub mod input;
pub mod sidebar;
pub mod status_bar;
pub mod task_panel;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Create main layout with status bar at bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let content_area = main_chunks[0];
    let status_area = main_chunks[1];

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30), // Lists
            Constraint::Percentage(70), // Tasks + input
        ])
        .split(content_area);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(content_chunks[1]);

    sidebar::render(frame, content_chunks[0], app);
    task_panel::render(frame, right_chunks[0], app);
    input::render(frame, right_chunks[1], app);

    status_bar::render(frame, status_area, app);
}
