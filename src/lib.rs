//! Serialmon Library
//!
//! Serial port terminal: a connection session manager with a background
//! line reader, timestamped event stream, command history recall, and a
//! terminal UI frontend.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod tui;

pub use self::core::event::{ErrorContext, EventKind, SessionEvent, StatusKind};
pub use self::core::history::CommandHistory;
pub use self::core::session::{ConnectionSession, ConnectionState};
pub use self::domain::config::ConnectionConfig;
pub use self::domain::error::{MonitorError, MonitorResult};
