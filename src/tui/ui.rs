use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::state::AppState;
use crate::core::session::ConnectionState;

pub fn draw_ui(f: &mut Frame, state: &mut AppState) {
    let size = f.size();
    state.terminal_size = (size.width, size.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(0),    // Event log
            Constraint::Length(3), // Input line
            Constraint::Length(1), // Message line
        ])
        .split(size);

    // Status bar: port, baud, connection state
    let port = state.port.as_deref().unwrap_or("-");
    let state_style = match state.connection {
        ConnectionState::Connected => Style::default().fg(Color::Green),
        ConnectionState::Disconnected => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Yellow),
    };
    let status = Paragraph::new(format!(
        "{}  {} baud  [{}]",
        port, state.baud, state.connection
    ))
    .style(state_style.add_modifier(Modifier::BOLD))
    .block(Block::default().borders(Borders::ALL).title("serialmon"));
    f.render_widget(status, chunks[0]);

    // Event log: show the tail that fits the viewport
    let log_height = chunks[1].height.saturating_sub(2) as usize;
    let start = state.log.len().saturating_sub(log_height);
    let items: Vec<ListItem> = state.log[start..]
        .iter()
        .map(|line| ListItem::new(Line::from(line.as_str())))
        .collect();
    let log = List::new(items).block(Block::default().borders(Borders::ALL).title("Log"));
    f.render_widget(log, chunks[1]);

    // Input line
    let input_title = if state.input.content().starts_with(':') {
        "Command"
    } else {
        "Send"
    };
    let input = Paragraph::new(state.input.content())
        .block(Block::default().borders(Borders::ALL).title(input_title));
    f.render_widget(input, chunks[2]);
    f.set_cursor(
        chunks[2].x + 1 + state.input.cursor_column() as u16,
        chunks[2].y + 1,
    );

    // Message line
    if let Some(message) = &state.status_message {
        let message = Paragraph::new(message.as_str()).style(Style::default().fg(Color::Cyan));
        f.render_widget(message, chunks[3]);
    }
}
