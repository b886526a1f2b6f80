pub mod app;
pub mod input;
pub mod state;
pub mod ui;

pub use app::App;
