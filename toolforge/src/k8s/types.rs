//! Typed views over the control plane documents the CLI reads.
//!
//! Only the fields the CLI consumes are modelled; everything else in the
//! documents is ignored on deserialization.

use crate::status::{ContainerStatus, StepState};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub creation_timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

/// Status block shared by pipeline runs and task runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub completion_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

impl Param {
    /// String value of the parameter; array and object values are rendered as JSON.
    pub fn value_str(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineRunSpec {
    #[serde(default)]
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    #[serde(flatten)]
    pub base: Status,
    /// Keyed by task-run name, in the order the control plane returned them.
    #[serde(default)]
    pub task_runs: IndexMap<String, PipelineTaskRun>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTaskRun {
    pub pipeline_task_name: String,
    #[serde(default)]
    pub status: Option<TaskRunStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRunStatus {
    #[serde(flatten)]
    pub base: Status,
    #[serde(default)]
    pub steps: Option<Vec<StepState>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineRun {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PipelineRunSpec,
    #[serde(default)]
    pub status: Option<PipelineRunStatus>,
}

impl PipelineRun {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn param(&self, name: &str) -> Option<String> {
        self.spec
            .params
            .iter()
            .find(|param| param.name == name)
            .map(Param::value_str)
    }

    pub fn status_block(&self) -> Option<&Status> {
        self.status.as_ref().map(|status| &status.base)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default)]
    pub init_container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pod {
    #[serde(default)]
    pub status: PodStatus,
}
