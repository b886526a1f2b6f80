mod reader;
mod session;
mod state;

pub use session::ConnectionSession;
pub use state::ConnectionState;
