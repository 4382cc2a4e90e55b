//! Toolforge CLI module
//!
//! # Commands
//!
//! - `build` - Build service (start, logs, list, cancel, delete, show)
//! - `_commands` - Visible command names, for shell completion
//! - `<name>` - Any `toolforge-<name>` executable found on `PATH`

pub mod app;
pub mod commands;
pub mod context;
pub mod output;
pub mod render;

pub use app::{run, Cli, Commands};
pub use context::CliContext;
pub use output::{OutputFormat, OutputFormatter};
