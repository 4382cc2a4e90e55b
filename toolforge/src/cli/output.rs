//! Output formatting for CLI commands

use super::render::{self, Palette};
use crate::error::ToolforgeResult;
use crate::ops::RunDetail;
use colored::Color;
use serde::Serialize;
use std::fmt::Display;

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text and tables (default)
    #[default]
    Text,
    /// JSON documents
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Output formatter for consistent CLI output
pub struct OutputFormatter {
    format: OutputFormat,
    palette: Palette,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_color: bool) -> Self {
        Self {
            format,
            palette: Palette::new(use_color),
        }
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Print a plain line
    pub fn line(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a hint or a skipped item
    pub fn warning(&self, message: &str) {
        println!("{}", self.palette.paint(message, Color::Yellow));
    }

    /// Print a highlighted warning
    pub fn alert(&self, message: &str) {
        println!("{}", self.palette.emphasize(message, Color::Yellow));
    }

    /// Print data as JSON
    pub fn json<T: Serialize>(&self, data: &T) -> ToolforgeResult<()> {
        println!("{}", render::to_json(data)?);
        Ok(())
    }

    /// Print a list of runs: a table, or one JSON document per run
    pub fn runs(&self, runs: &[RunDetail]) -> ToolforgeResult<()> {
        match self.format {
            OutputFormat::Json => runs.iter().try_for_each(|run| self.json(run)),
            OutputFormat::Text => {
                print!("{}", render::runs_table(runs, self.palette));
                Ok(())
            }
        }
    }

    /// Print a single run
    pub fn run(&self, run: &RunDetail) -> ToolforgeResult<()> {
        match self.format {
            OutputFormat::Json => self.json(run),
            OutputFormat::Text => {
                print!("{}", render::run_block(run, self.palette));
                Ok(())
            }
        }
    }
}
