pub mod app;
pub mod commands;
pub mod render;
pub mod ui;

pub use app::Cli;
