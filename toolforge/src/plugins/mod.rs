//! External subcommands.
//!
//! Any executable named `<prefix><name>` on the search path shows up as
//! `toolforge <name>`. Its arguments are forwarded untouched and its exit
//! code becomes ours.

pub mod delegate;
pub mod discovery;

pub use delegate::{DelegateError, Delegator, EnvContract, InvocationFlags, POLL_INTERVAL};
pub use discovery::{discover, DiscoveredCommand};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Argument id of the reserved help switch.
pub const HELP_ARG: &str = "help";
/// Argument id of the forwarded argument list.
pub const ARGS_ARG: &str = "args";

type Handler = Box<dyn Fn(&Delegator, &[OsString]) -> Result<(), DelegateError>>;

/// A subcommand backed by an external executable.
pub struct PluginCommand {
    pub name: String,
    pub path: PathBuf,
    handler: Handler,
}

impl std::fmt::Debug for PluginCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCommand")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

impl PluginCommand {
    pub fn new(discovered: DiscoveredCommand) -> Self {
        let path = discovered.executable_path;
        let target = path.clone();
        Self {
            name: discovered.name,
            path,
            handler: Box::new(move |delegator, args| delegator.run(&target, args)),
        }
    }

    /// Clap definition accepting any flags and arguments.
    pub fn command(&self) -> Command {
        Command::new(self.name.clone())
            .about(format!("Run {}", self.path.display()))
            .disable_help_flag(true)
            .arg(
                Arg::new(HELP_ARG)
                    .long("help")
                    .action(ArgAction::SetTrue)
                    .help("Show the help of the external command"),
            )
            .arg(
                Arg::new(ARGS_ARG)
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .value_parser(value_parser!(OsString)),
            )
    }

    /// Arguments to forward for the parsed `matches`.
    pub fn forwarded_args(matches: &ArgMatches) -> Vec<OsString> {
        let mut args = Vec::new();
        if matches.get_flag(HELP_ARG) {
            args.push(OsString::from("--help"));
        }
        if let Some(values) = matches.get_many::<OsString>(ARGS_ARG) {
            args.extend(values.cloned());
        }
        args
    }

    pub fn invoke(&self, delegator: &Delegator, matches: &ArgMatches) -> Result<(), DelegateError> {
        (self.handler)(delegator, &Self::forwarded_args(matches))
    }
}

/// Turn a discovery result into subcommands, skipping names already taken
/// by built-in commands.
pub fn plugin_commands(
    discovered: BTreeMap<String, DiscoveredCommand>,
    builtin: &[String],
) -> Vec<PluginCommand> {
    debug!("Found {} subcommands.", discovered.len());
    discovered
        .into_values()
        .filter(|command| {
            let clash = builtin.contains(&command.name);
            if clash {
                warn!(
                    "Ignoring {}: '{}' is a built-in command",
                    command.executable_path.display(),
                    command.name
                );
            }
            !clash
        })
        .map(PluginCommand::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(name: &str) -> PluginCommand {
        PluginCommand::new(DiscoveredCommand {
            name: name.to_string(),
            executable_path: PathBuf::from(format!("/usr/bin/toolforge-{}", name)),
        })
    }

    fn parse(plugin: &PluginCommand, args: &[&str]) -> Vec<OsString> {
        let matches = Command::new("toolforge")
            .subcommand(plugin.command())
            .try_get_matches_from(std::iter::once("toolforge").chain(args.iter().copied()))
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        PluginCommand::forwarded_args(sub)
    }

    #[test]
    fn forwards_unknown_flags_and_arguments() {
        let jobs = plugin("jobs");
        assert_eq!(
            parse(&jobs, &["jobs", "run", "--image", "python3.11", "-x"]),
            vec!["run", "--image", "python3.11", "-x"]
        );
        assert_eq!(parse(&jobs, &["jobs", "--json"]), vec!["--json"]);
    }

    #[test]
    fn help_flag_is_prepended() {
        let jobs = plugin("jobs");
        assert_eq!(parse(&jobs, &["jobs", "--help"]), vec!["--help"]);
        assert!(parse(&jobs, &["jobs"]).is_empty());
    }

    #[test]
    fn builtin_names_are_not_shadowed() {
        let mut discovered = BTreeMap::new();
        for name in ["build", "jobs"] {
            discovered.insert(
                name.to_string(),
                DiscoveredCommand {
                    name: name.to_string(),
                    executable_path: PathBuf::from(format!("/bin/toolforge-{}", name)),
                },
            );
        }

        let commands = plugin_commands(discovered, &["build".to_string()]);
        let names: Vec<_> = commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["jobs"]);
    }
}
