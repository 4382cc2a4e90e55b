//! Toolforge CLI
//!
//! # Usage
//!
//! ```bash
//! # Show help, including discovered external commands
//! toolforge --help
//!
//! # Build service
//! toolforge build start https://gitlab.wikimedia.org/toolforge-repos/my-tool
//! toolforge build list
//! toolforge -v build show
//! toolforge build cancel --all -y
//!
//! # Anything named toolforge-<name> on PATH
//! toolforge jobs list
//! ```

use colored::Colorize;
use std::ffi::OsString;
use toolforge::cli::{self, app::builtin_names};
use toolforge::config::load_config;
use toolforge::logging::{debug_requested, init_logging};
use toolforge::plugins::{discover, plugin_commands};
use toolforge::ToolforgeResult;

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();

    // logging has to be up before plugin discovery
    init_logging(debug_requested(args.iter().map(|arg| arg.to_string_lossy())));

    if let Err(e) = run(args) {
        if !e.is_child_exit() {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        std::process::exit(e.exit_code());
    }
}

fn run(args: Vec<OsString>) -> ToolforgeResult<()> {
    let config = load_config()?;

    let search_path = std::env::var_os("PATH").unwrap_or_else(|| OsString::from("."));
    let discovered = discover(&search_path, &config.toolforge_prefix);
    let plugins = plugin_commands(discovered, &builtin_names());

    cli::run(config, &plugins, args)
}
