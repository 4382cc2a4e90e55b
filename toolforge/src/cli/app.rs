//! Top-level command line and dispatch.
//!
//! Built-in commands are derived with clap; external commands are added to
//! the same `clap::Command` at runtime and dispatched before the derived
//! parser ever sees their matches.

use super::commands::build::{self, BuildCommand, KubeconfigArg};
use super::CliContext;
use crate::config::Config;
use crate::error::ToolforgeResult;
use crate::plugins::{InvocationFlags, PluginCommand};
use clap::{Command, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::io::IsTerminal;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "toolforge")]
#[command(version)]
#[command(about = "Toolforge command line", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Show extra verbose output. NOTE: Do not rely on the format of the verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show logs to debug the toolforge-* packages. For extra verbose output for say build or job, see --verbose
    #[arg(short, long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build your project from source code
    Build {
        #[command(flatten)]
        kubeconfig: KubeconfigArg,

        #[command(subcommand)]
        command: BuildCommand,
    },

    /// Used internally for tab completion
    #[command(name = "_commands", hide = true)]
    InternalCommands,
}

/// Names of the built-in subcommands, hidden ones included.
pub fn builtin_names() -> Vec<String> {
    Cli::command()
        .get_subcommands()
        .map(|command| command.get_name().to_string())
        .collect()
}

/// The full command line: built-ins plus one subcommand per plugin.
pub fn command(plugins: &[PluginCommand]) -> Command {
    plugins
        .iter()
        .fold(Cli::command(), |command, plugin| command.subcommand(plugin.command()))
}

/// Sorted names of the subcommands shown in help.
pub fn visible_commands(command: &Command) -> Vec<String> {
    let mut names: Vec<String> = command
        .get_subcommands()
        .filter(|command| !command.is_hide_set())
        .map(|command| command.get_name().to_string())
        .collect();
    names.sort();
    names
}

/// Parse `args` and run whatever they select.
///
/// Help, version and usage errors print and exit through clap.
pub fn run<I, T>(config: Config, plugins: &[PluginCommand], args: I) -> ToolforgeResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(plugins).get_matches_from(args);
    let flags = InvocationFlags {
        verbose: matches.get_flag("verbose"),
        debug: matches.get_flag("debug"),
    };
    let ctx = CliContext::new(config, flags, std::io::stdout().is_terminal());

    if let Some((name, sub_matches)) = matches.subcommand() {
        if let Some(plugin) = plugins.iter().find(|plugin| plugin.name == name) {
            debug!("Delegating to {}", plugin.path.display());
            plugin.invoke(&ctx.delegator(), sub_matches)?;
            return Ok(());
        }
    }

    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    match cli.command {
        Commands::Build {
            kubeconfig,
            command,
        } => build::execute(&ctx, &kubeconfig.kubeconfig, command),
        Commands::InternalCommands => {
            for name in visible_commands(&self::command(plugins)) {
                println!("{}", name);
            }
            Ok(())
        }
    }
}
