//! Status interpretation for run-like documents.
//!
//! Pipeline runs and task runs share the same status block: a list of
//! conditions plus start/completion timestamps. `interpret` normalizes that
//! block into a [`RunStatusRecord`], the one value every renderer reads from.

pub mod container;

pub use container::{
    classify_init_container, classify_step, ContainerPhase, ContainerRecord, ContainerState,
    ContainerStatus, InitContainerRecord, StepRecord, StepState,
};

use crate::k8s::types::{Condition, Status};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Condition type carrying the overall outcome of a run.
pub const SUCCEEDED_CONDITION: &str = "Succeeded";

pub const PENDING: &str = "pending";
pub const NOT_AVAILABLE: &str = "N/A";
pub const RUNNING: &str = "running";

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status block has a 'Succeeded' condition but no {field}")]
    MissingField { field: &'static str },

    #[error("run '{run}' has no '{param}' parameter")]
    MissingParam { run: String, param: &'static str },
}

/// Normalized outcome of a run or task run.
///
/// Anything that is not one of the known categories is kept as the lower-cased
/// condition status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Ok,
    Error,
    Cancelled,
    NotStarted,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Ok => "ok",
            Category::Error => "error",
            Category::Cancelled => "cancelled",
            Category::NotStarted => "not_started",
            Category::Other(raw) => raw,
        }
    }

    /// Whether the run ended without producing its result.
    pub fn is_failure(&self) -> bool {
        matches!(self, Category::Error | Category::Cancelled)
    }

    fn from_condition(condition: &Condition) -> Self {
        if condition.status == "True" || condition.reason == "Running" {
            Category::Ok
        } else if condition.status == "False" {
            if condition.reason.ends_with(container::CANCELLED_SUFFIX) {
                Category::Cancelled
            } else {
                Category::Error
            }
        } else {
            Category::Other(condition.status.to_lowercase())
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatusRecord {
    pub start_time: String,
    pub end_time: String,
    pub status: Category,
    pub reason: String,
    pub message: String,
}

impl RunStatusRecord {
    /// Record for anything the control plane has not started reporting on.
    pub fn not_started() -> Self {
        Self {
            start_time: PENDING.to_string(),
            end_time: NOT_AVAILABLE.to_string(),
            status: Category::NotStarted,
            reason: NOT_AVAILABLE.to_string(),
            message: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.end_time == RUNNING
    }
}

/// Interpret a status block.
///
/// No status, or no `Succeeded` condition yet, yields [`RunStatusRecord::not_started`].
/// Once the condition exists the start time must be present too.
pub fn interpret(status: Option<&Status>) -> Result<RunStatusRecord, StatusError> {
    let Some(status) = status else {
        return Ok(RunStatusRecord::not_started());
    };
    let Some(condition) = status
        .conditions
        .iter()
        .find(|condition| condition.type_ == SUCCEEDED_CONDITION)
    else {
        return Ok(RunStatusRecord::not_started());
    };

    let start_time = status
        .start_time
        .clone()
        .ok_or(StatusError::MissingField { field: "startTime" })?;
    let end_time = status
        .completion_time
        .clone()
        .unwrap_or_else(|| RUNNING.to_string());

    Ok(RunStatusRecord {
        start_time,
        end_time,
        status: Category::from_condition(condition),
        reason: condition.reason.clone(),
        message: condition.message.clone(),
    })
}
