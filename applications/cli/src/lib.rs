//! Melos CLI
//!
//! Headless front end for the Melos player: library and queue editing,
//! settings, and an interactive line-driven player.

pub mod commands;
pub mod config;
pub mod error;
pub mod headless;
pub mod player;

pub use commands::Workspace;
pub use config::MelosConfig;
pub use error::{CliError, Result};
