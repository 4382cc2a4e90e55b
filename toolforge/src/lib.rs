//! Toolforge command line.
//!
//! A thin front end for the Toolforge build service that also exposes any
//! `toolforge-<name>` executable on `PATH` as `toolforge <name>`.
//!
//! - [`status`] normalizes pipeline, task and step status documents
//! - [`ops`] walks runs into detail trees and implements the build operations
//! - [`plugins`] discovers external commands and runs them
//! - [`cli`] holds the clap definitions and the renderers

pub mod cli;
pub mod config;
pub mod error;
pub mod k8s;
pub mod logging;
pub mod ops;
pub mod plugins;
pub mod status;

pub use error::{ToolforgeError, ToolforgeResult};
