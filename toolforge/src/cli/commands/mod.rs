//! CLI commands module

pub mod build;
