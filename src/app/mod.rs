pub mod actions;
mod app;
pub mod controller;
pub mod events;
pub mod headless;
mod shell;

pub use app::App;
pub use shell::ChatShell;
