use chrono::{DateTime, Local};
use tokio::sync::mpsc;

/// Events produced by a connection session, in creation order.
///
/// The display surface consumes these from an unbounded channel and renders
/// them with [`SessionEvent`]'s `Display` impl.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    /// Local wall-clock time at creation, rendered at second resolution
    pub timestamp: DateTime<Local>,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A newline-terminated line arrived from the device
    Received { payload: String },
    /// Text was written to the device
    Sent { payload: String },
    /// The port was opened or closed
    Status { kind: StatusKind, port: String },
    /// A runtime I/O failure, surfaced asynchronously
    Error {
        context: ErrorContext,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Opened,
    Closed,
}

/// Which operation an `Error` event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Connect,
    Read,
    Write,
    Close,
}

impl SessionEvent {
    fn new(kind: EventKind) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
        }
    }

    pub fn received(payload: impl Into<String>) -> Self {
        Self::new(EventKind::Received {
            payload: payload.into(),
        })
    }

    pub fn sent(payload: impl Into<String>) -> Self {
        Self::new(EventKind::Sent {
            payload: payload.into(),
        })
    }

    pub fn status(kind: StatusKind, port: impl Into<String>) -> Self {
        Self::new(EventKind::Status {
            kind,
            port: port.into(),
        })
    }

    pub fn error(context: ErrorContext, message: impl Into<String>) -> Self {
        Self::new(EventKind::Error {
            context,
            message: message.into(),
        })
    }
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ts = self.timestamp.format("%H:%M:%S");
        match &self.kind {
            EventKind::Received { payload } => write!(f, "[{}] Recv <- {}", ts, payload),
            EventKind::Sent { payload } => write!(f, "[{}] Send -> {}", ts, payload),
            EventKind::Status {
                kind: StatusKind::Opened,
                port,
            } => write!(f, "[{}] Open <> {}", ts, port),
            EventKind::Status {
                kind: StatusKind::Closed,
                port,
            } => write!(f, "[{}] Close >< {}", ts, port),
            EventKind::Error { context, message } => {
                write!(f, "[{}] Error !! {}: {}", ts, context, message)
            }
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorContext::Connect => write!(f, "Connect"),
            ErrorContext::Read => write!(f, "Read"),
            ErrorContext::Write => write!(f, "Write"),
            ErrorContext::Close => write!(f, "Close"),
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create the session-to-sink event channel. Unbounded is acceptable here:
/// event volume is operator-paced, and a slow consumer must not stall the
/// reader loop.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_tail(event: &SessionEvent) -> String {
        // Strip the "[HH:MM:SS] " prefix, which varies with the clock
        let line = event.to_string();
        assert_eq!(line.as_bytes()[0], b'[');
        assert_eq!(&line[9..11], "] ");
        line[11..].to_string()
    }

    #[test]
    fn test_log_line_verbs() {
        assert_eq!(
            rendered_tail(&SessionEvent::status(StatusKind::Opened, "/dev/ttyUSB0")),
            "Open <> /dev/ttyUSB0"
        );
        assert_eq!(
            rendered_tail(&SessionEvent::status(StatusKind::Closed, "/dev/ttyUSB0")),
            "Close >< /dev/ttyUSB0"
        );
        assert_eq!(
            rendered_tail(&SessionEvent::sent("AT+RST")),
            "Send -> AT+RST"
        );
        assert_eq!(rendered_tail(&SessionEvent::received("OK")), "Recv <- OK");
    }

    #[test]
    fn test_error_log_line() {
        let event = SessionEvent::error(ErrorContext::Read, "device reports readiness");
        assert_eq!(
            rendered_tail(&event),
            "Error !! Read: device reports readiness"
        );
    }

    #[test]
    fn test_timestamp_prefix_shape() {
        let line = SessionEvent::received("x").to_string();
        // "[HH:MM:SS] ..."
        assert_eq!(line.chars().nth(3), Some(':'));
        assert_eq!(line.chars().nth(6), Some(':'));
        assert_eq!(line.chars().nth(9), Some(']'));
    }
}
