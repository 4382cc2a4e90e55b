//! Running external commands on behalf of the CLI.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// How often the child is checked for completion.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("{program} exited with code {code}")]
    NonZeroExit { program: String, code: i32 },

    #[error("Unable to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Lost track of {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl DelegateError {
    /// The child's own exit code, when the child ran and failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DelegateError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Environment variables telling a child it runs under this CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvContract {
    pub cli_var: String,
    pub verbose_var: String,
    pub debug_var: String,
}

impl EnvContract {
    /// `toolforge-` gives `TOOLFORGE_CLI`, `TOOLFORGE_VERBOSE` and `TOOLFORGE_DEBUG`.
    pub fn from_prefix(prefix: &str) -> Self {
        let stem = prefix
            .trim_end_matches(['-', '_'])
            .replace('-', "_")
            .to_uppercase();
        Self {
            cli_var: format!("{}_CLI", stem),
            verbose_var: format!("{}_VERBOSE", stem),
            debug_var: format!("{}_DEBUG", stem),
        }
    }

    pub fn vars(&self, flags: InvocationFlags) -> [(&str, &'static str); 3] {
        [
            (self.cli_var.as_str(), "1"),
            (self.verbose_var.as_str(), bool_flag(flags.verbose)),
            (self.debug_var.as_str(), bool_flag(flags.debug)),
        ]
    }
}

fn bool_flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Verbosity the CLI was started with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvocationFlags {
    pub verbose: bool,
    pub debug: bool,
}

/// Spawns children with inherited streams and the environment contract.
#[derive(Debug, Clone)]
pub struct Delegator {
    contract: EnvContract,
    flags: InvocationFlags,
}

impl Delegator {
    pub fn new(contract: EnvContract, flags: InvocationFlags) -> Self {
        Self { contract, flags }
    }

    pub fn flags(&self) -> InvocationFlags {
        self.flags
    }

    /// Run `program` to completion; a non-zero exit becomes
    /// [`DelegateError::NonZeroExit`] carrying the child's code.
    pub fn run(&self, program: &Path, args: &[OsString]) -> Result<(), DelegateError> {
        let program_name = program.display().to_string();
        debug!("Running {} {:?}", program_name, args);

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (name, value) in self.contract.vars(self.flags) {
            command.env(name, value);
        }

        let mut child = command.spawn().map_err(|source| DelegateError::Spawn {
            program: program_name.clone(),
            source,
        })?;

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    return Err(DelegateError::Wait {
                        program: program_name,
                        source,
                    })
                }
            }
        };

        match exit_code(status) {
            0 => Ok(()),
            code => Err(DelegateError::NonZeroExit {
                program: program_name,
                code,
            }),
        }
    }
}

/// Exit code of a finished child; a signal death maps to `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
