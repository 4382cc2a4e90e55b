//! Build operations against the control plane.
//!
//! Each function takes the collaborator as `&dyn KubeApi` and returns plain
//! data; printing and confirmation prompts stay in the command layer.

use super::pipeline::{pipeline_run_spec, run_pods_selector, user_selector, BuildRequest};
use super::runs::{parse_run, run_details, run_summary, RunDetail};
use crate::error::ToolforgeResult;
use crate::k8s::types::PipelineRun;
use crate::k8s::{KubeApi, ObjectKind};
use crate::status::interpret;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Value written to `/spec/status` to stop a pipeline run.
pub const CANCELLED_SPEC_STATUS: &str = "PipelineRunCancelled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartedBuild {
    pub run_name: String,
    pub app_image: String,
    pub source_url: String,
}

/// Why a run picked for cancellation was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelSkip {
    AlreadyCompleted,
    AlreadyCancelled,
}

impl CancelSkip {
    fn from_reason(reason: &str) -> Option<Self> {
        match reason.to_lowercase().as_str() {
            "failed" | "succeeded" => Some(CancelSkip::AlreadyCompleted),
            "pipelineruncancelled" => Some(CancelSkip::AlreadyCancelled),
            _ => None,
        }
    }

    pub fn message(&self, run_name: &str) -> String {
        match self {
            CancelSkip::AlreadyCompleted => format!(
                "{} cannot be cancelled because it has already completed",
                run_name
            ),
            CancelSkip::AlreadyCancelled => format!(
                "{} cannot be cancelled again. It has already been cancelled",
                run_name
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelOutcome {
    pub cancelled: usize,
    pub skipped: Vec<(String, CancelSkip)>,
}

/// Submit a new pipeline run and return its generated name.
pub fn start_build(api: &dyn KubeApi, request: &BuildRequest) -> ToolforgeResult<StartedBuild> {
    let created = api.create_object(ObjectKind::PipelineRuns, &pipeline_run_spec(request))?;
    let run = parse_run(created)?;
    debug!(run = run.name(), "pipeline run created");
    Ok(StartedBuild {
        run_name: run.name().to_string(),
        app_image: request.app_image.clone(),
        source_url: request.source_url.clone(),
    })
}

/// Runs started by `user`, newest first.
pub fn user_runs(api: &dyn KubeApi, user: &str) -> ToolforgeResult<Vec<PipelineRun>> {
    let raw = api.get_objects(ObjectKind::PipelineRuns, Some(&user_selector(user)))?;
    let mut runs = raw
        .into_iter()
        .map(parse_run)
        .collect::<ToolforgeResult<Vec<_>>>()?;
    sort_newest_first(&mut runs);
    Ok(runs)
}

/// Descending by creation timestamp; RFC 3339 timestamps order lexically.
pub fn sort_newest_first(runs: &mut [PipelineRun]) {
    runs.sort_by(|a, b| {
        b.metadata
            .creation_timestamp
            .cmp(&a.metadata.creation_timestamp)
    });
}

pub fn list_builds(api: &dyn KubeApi, user: &str) -> ToolforgeResult<Vec<RunDetail>> {
    user_runs(api, user)?.iter().map(run_summary).collect()
}

/// Details of `run_name`, or of the user's latest run when no name is given.
/// `None` when the user has no runs at all.
pub fn show_build(
    api: &dyn KubeApi,
    user: &str,
    run_name: Option<&str>,
    verbose: bool,
) -> ToolforgeResult<Option<RunDetail>> {
    let run = match run_name {
        Some(name) => Some(parse_run(api.get_object(ObjectKind::PipelineRuns, name)?)?),
        None => user_runs(api, user)?.into_iter().next(),
    };

    run.map(|run| run_details(&run, api, verbose)).transpose()
}

/// Names of the user's runs matching `names`, or all of them when `all`.
pub fn select_runs(
    api: &dyn KubeApi,
    user: &str,
    names: &[String],
    all: bool,
) -> ToolforgeResult<Vec<String>> {
    Ok(user_runs(api, user)?
        .into_iter()
        .map(|run| run.metadata.name)
        .filter(|name| all || names.contains(name))
        .collect())
}

/// Request cancellation of each run, classifying the patched result.
pub fn cancel_builds(api: &dyn KubeApi, run_names: &[String]) -> ToolforgeResult<CancelOutcome> {
    let patch = [json!({"op": "add", "path": "/spec/status", "value": CANCELLED_SPEC_STATUS})];
    let mut outcome = CancelOutcome::default();

    for name in run_names {
        let patched = parse_run(api.patch_object(ObjectKind::PipelineRuns, name, &patch)?)?;
        let status = interpret(patched.status_block())?;
        match CancelSkip::from_reason(&status.reason) {
            Some(skip) => outcome.skipped.push((patched.metadata.name, skip)),
            None => outcome.cancelled += 1,
        }
    }

    Ok(outcome)
}

/// Delete each run and the pods it left behind.
pub fn delete_builds(api: &dyn KubeApi, run_names: &[String]) -> ToolforgeResult<usize> {
    for name in run_names {
        api.delete_object(ObjectKind::PipelineRuns, name)?;
        api.delete_objects(ObjectKind::Pods, Some(&run_pods_selector(name)))?;
        debug!(run = %name, "pipeline run deleted");
    }
    Ok(run_names.len())
}
