pub mod event;
pub mod history;
pub mod session;
