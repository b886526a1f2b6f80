use crate::core::event::SessionEvent;
use crate::core::history::CommandHistory;
use crate::core::session::ConnectionState;
use crate::tui::input::InputBuffer;

/// Mutable UI state: the scrollback, the input line, and the bits of
/// connection status the draw pass needs. The session itself lives in the
/// app; this struct never touches I/O.
#[derive(Debug)]
pub struct AppState {
    pub input: InputBuffer,
    pub history: CommandHistory,
    /// Rendered event-log lines, oldest first
    pub log: Vec<String>,
    pub connection: ConnectionState,
    /// Port/baud of the current (or last attempted) connection, for the
    /// status bar
    pub port: Option<String>,
    pub baud: u32,
    pub status_message: Option<String>,
    pub terminal_size: (u16, u16),
}

impl AppState {
    pub fn new(default_port: Option<String>, default_baud: u32) -> Self {
        Self {
            input: InputBuffer::new(),
            history: CommandHistory::new(),
            log: Vec::new(),
            connection: ConnectionState::Disconnected,
            port: default_port,
            baud: default_baud,
            status_message: Some(
                "Type :open <port> [baud] to connect, :help for commands".to_string(),
            ),
            terminal_size: (80, 24),
        }
    }

    /// Append a session event to the scrollback in its rendered line form.
    pub fn push_event(&mut self, event: &SessionEvent) {
        self.log.push(event.to_string());
    }

    /// Append a locally generated notice (not a session event).
    pub fn push_notice(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{SessionEvent, StatusKind};

    #[test]
    fn test_push_event_renders_log_line() {
        let mut state = AppState::new(None, 9600);
        state.push_event(&SessionEvent::status(StatusKind::Opened, "/dev/ttyUSB0"));
        assert_eq!(state.log.len(), 1);
        assert!(state.log[0].ends_with("Open <> /dev/ttyUSB0"));
    }

    #[test]
    fn test_clear_log() {
        let mut state = AppState::new(None, 9600);
        state.push_notice("hello");
        state.clear_log();
        assert!(state.log.is_empty());
    }
}
