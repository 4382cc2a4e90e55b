//! Crate-wide error type.
//!
//! Each concern owns its own error enum (status interpretation, control plane
//! transport, configuration, delegation); `ToolforgeError` folds them together
//! at the command boundary where the binary decides the process exit code.

use crate::config::ConfigError;
use crate::k8s::K8sError;
use crate::plugins::DelegateError;
use crate::status::StatusError;
use thiserror::Error;

/// Exit code used for every failure that is not a delegated child's own exit.
pub const FAILURE_EXIT_CODE: i32 = 1;

#[derive(Debug, Error)]
pub enum ToolforgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    K8s(#[from] K8sError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error("malformed document from the control plane: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Delegate(#[from] DelegateError),

    #[error("{0}")]
    Generic(String),
}

impl ToolforgeError {
    /// Process exit code this error should terminate the CLI with.
    ///
    /// A delegated command that exited non-zero hands back its own code so that
    /// callers chaining on exit status cannot tell the wrapper apart from the child.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolforgeError::Delegate(err) => err.exit_code().unwrap_or(FAILURE_EXIT_CODE),
            _ => FAILURE_EXIT_CODE,
        }
    }

    /// A delegated command failing on its own; the child already reported it.
    pub fn is_child_exit(&self) -> bool {
        matches!(self, ToolforgeError::Delegate(err) if err.exit_code().is_some())
    }
}

pub type ToolforgeResult<T> = Result<T, ToolforgeError>;
