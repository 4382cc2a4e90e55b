//! Container state union and its classification into display records.
//!
//! The control plane reports a container (a task-run step or a pod init
//! container) as an object carrying at most one of `terminated`, `waiting` or
//! `running`. `ContainerState` turns that presence-encoded union into a sum type
//! once, at deserialization time, so consumers only ever `match`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reason reported for a waiting container that did not say why.
pub const UNKNOWN_REASON: &str = "UnknownReason";

/// Suffix the control plane uses on reasons for cancelled work.
pub const CANCELLED_SUFFIX: &str = "Cancelled";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terminated {
    pub exit_code: i32,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waiting {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Running {
    #[serde(default)]
    pub started_at: Option<String>,
}

/// Exactly one of the mutually exclusive container states.
///
/// `Unknown` keeps the raw object around so it can be surfaced as a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerState {
    Terminated(Terminated),
    Waiting(Waiting),
    Running(Running),
    Unknown(Value),
}

impl ContainerState {
    /// Classify an object that may carry one of the state keys.
    ///
    /// `terminated` is checked first, then `waiting`, then `running`.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, serde_json::Error> {
        if let Some(terminated) = fields.get("terminated") {
            return Ok(ContainerState::Terminated(Terminated::deserialize(terminated)?));
        }
        if let Some(waiting) = fields.get("waiting") {
            return Ok(ContainerState::Waiting(Waiting::deserialize(waiting)?));
        }
        if let Some(running) = fields.get("running") {
            return Ok(ContainerState::Running(Running::deserialize(running)?));
        }
        Ok(ContainerState::Unknown(Value::Object(fields.clone())))
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, ContainerState::Waiting(_))
    }
}

impl Default for ContainerState {
    fn default() -> Self {
        ContainerState::Unknown(Value::Object(Map::new()))
    }
}

impl<'de> Deserialize<'de> for ContainerState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        ContainerState::from_fields(&fields).map_err(de::Error::custom)
    }
}

/// A task-run step: its name plus the state keys inlined next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepState {
    pub name: String,
    pub state: ContainerState,
}

impl<'de> Deserialize<'de> for StepState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| de::Error::missing_field("name"))?
            .to_string();
        let state = ContainerState::from_fields(&fields).map_err(de::Error::custom)?;
        Ok(StepState { name, state })
    }
}

/// An entry of a pod's `initContainerStatuses`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    #[serde(default)]
    pub state: ContainerState,
}

/// Normalized state of a single container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerPhase {
    Ok,
    Error,
    Cancelled,
    Waiting,
    Running,
    Unknown,
}

impl ContainerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerPhase::Ok => "ok",
            ContainerPhase::Error => "error",
            ContainerPhase::Cancelled => "cancelled",
            ContainerPhase::Waiting => "waiting",
            ContainerPhase::Running => "running",
            ContainerPhase::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContainerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display record for a step or an init container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerRecord {
    pub name: String,
    pub status: ContainerPhase,
    pub reason: String,
}

pub type StepRecord = ContainerRecord;
pub type InitContainerRecord = ContainerRecord;

/// Classify a task-run step.
pub fn classify_step(step: &StepState) -> StepRecord {
    let (status, reason) = match &step.state {
        ContainerState::Terminated(terminated) => {
            let reason = terminated.reason.clone().unwrap_or_default();
            let status = if terminated.exit_code == 0 {
                ContainerPhase::Ok
            } else if reason.ends_with(CANCELLED_SUFFIX) {
                ContainerPhase::Cancelled
            } else {
                ContainerPhase::Error
            };
            (status, reason)
        }
        ContainerState::Waiting(waiting) => (ContainerPhase::Waiting, waiting_reason(waiting)),
        ContainerState::Running(running) => (
            ContainerPhase::Running,
            format!(
                "started at [{}]",
                running.started_at.as_deref().unwrap_or("unknown")
            ),
        ),
        ContainerState::Unknown(raw) => (ContainerPhase::Unknown, raw.to_string()),
    };

    StepRecord {
        name: step.name.clone(),
        status,
        reason,
    }
}

/// Classify a pod init container.
///
/// Unlike steps, a failed init container reports `reason:message`.
pub fn classify_init_container(container: &ContainerStatus) -> InitContainerRecord {
    let (status, reason) = match &container.state {
        ContainerState::Terminated(terminated) if terminated.exit_code != 0 => (
            ContainerPhase::Error,
            format!(
                "{}:{}",
                terminated.reason.as_deref().unwrap_or_default(),
                terminated.message.as_deref().unwrap_or_default()
            ),
        ),
        ContainerState::Terminated(terminated) => (
            ContainerPhase::Ok,
            terminated.reason.clone().unwrap_or_default(),
        ),
        ContainerState::Waiting(waiting) => (ContainerPhase::Waiting, waiting_reason(waiting)),
        ContainerState::Running(running) => (
            ContainerPhase::Running,
            format!(
                "started at [{}]",
                running.started_at.as_deref().unwrap_or("unknown")
            ),
        ),
        ContainerState::Unknown(raw) => (ContainerPhase::Unknown, raw.to_string()),
    };

    InitContainerRecord {
        name: container.name.clone(),
        status,
        reason,
    }
}

fn waiting_reason(waiting: &Waiting) -> String {
    waiting
        .reason
        .clone()
        .unwrap_or_else(|| UNKNOWN_REASON.to_string())
}
