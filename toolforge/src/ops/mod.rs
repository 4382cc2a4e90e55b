//! Operations behind the built-in commands.
//!
//! Pure logic over the control plane collaborator, returning serializable
//! structs that the CLI layer renders.

pub mod build;
pub mod pipeline;
pub mod runs;

pub use build::{CancelOutcome, CancelSkip, StartedBuild};
pub use pipeline::BuildRequest;
pub use runs::{ImageReference, PodInspector, RunDetail, RunParams, TaskDetail};
