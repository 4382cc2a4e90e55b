//! Run hierarchy walking.
//!
//! Turns a raw pipeline run into a [`RunDetail`]: the run's own status, its
//! build parameters and, on request, one [`TaskDetail`] per task run with the
//! steps underneath. Pods are only inspected for tasks that failed before any
//! step got to run, since their steps carry no diagnostic signal.

use crate::error::ToolforgeResult;
use crate::k8s::types::{PipelineRun, PipelineTaskRun, Pod};
use crate::k8s::{KubeApi, ObjectKind};
use crate::status::{
    classify_init_container, classify_step, interpret, ContainerStatus, InitContainerRecord,
    RunStatusRecord, StatusError, StepRecord,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const APP_IMAGE_PARAM: &str = "APP_IMAGE";
pub const BUILDER_IMAGE_PARAM: &str = "BUILDER_IMAGE";
pub const SOURCE_URL_PARAM: &str = "SOURCE_URL";
pub const SOURCE_REFERENCE_PARAM: &str = "SOURCE_REFERENCE";

/// Shown when a run was started without an explicit source reference.
pub const NO_REF: &str = "no ref";

/// Tag assumed for an image reference that does not carry one.
pub const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    pub image_name: String,
    pub image_tag: String,
    pub repo_url: String,
    pub source_url: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub builder_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetail {
    pub task_name: String,
    #[serde(flatten)]
    pub status: RunStatusRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_containers: Option<Vec<InitContainerRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunDetail {
    pub name: String,
    #[serde(flatten)]
    pub status: RunStatusRecord,
    pub params: RunParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskDetail>>,
}

/// An image reference split into `(repository, name, tag)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub repository: String,
    pub name: String,
    pub tag: String,
}

impl ImageReference {
    /// Split on the last `/`; in the last path segment the name ends at the
    /// first `:` and the tag starts after the last one. Whatever precedes the
    /// name is the repository.
    pub fn parse(reference: &str) -> Self {
        let (repository, last) = match reference.rsplit_once('/') {
            Some((repository, last)) => (repository, last),
            None => ("", reference),
        };
        let (name, tag) = match (last.split_once(':'), last.rsplit_once(':')) {
            (Some((name, _)), Some((_, tag))) => (name, tag),
            _ => (last, DEFAULT_TAG),
        };
        Self {
            repository: repository.to_string(),
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// Source of init container states for a task's pod.
pub trait PodInspector {
    fn init_container_statuses(&self, pod_name: &str) -> ToolforgeResult<Vec<ContainerStatus>>;
}

impl<T: KubeApi + ?Sized> PodInspector for T {
    fn init_container_statuses(&self, pod_name: &str) -> ToolforgeResult<Vec<ContainerStatus>> {
        let raw = self.get_object(ObjectKind::Pods, pod_name)?;
        let pod: Pod = serde_json::from_value(raw)?;
        Ok(pod.status.init_container_statuses)
    }
}

/// Name of the pod backing a task run.
pub fn pod_name(run_name: &str, task_name: &str) -> String {
    format!("{}-{}-pod", run_name, task_name)
}

pub fn run_params(run: &PipelineRun) -> Result<RunParams, StatusError> {
    let required = |param: &'static str| {
        run.param(param).ok_or_else(|| StatusError::MissingParam {
            run: run.name().to_string(),
            param,
        })
    };

    let image = ImageReference::parse(&required(APP_IMAGE_PARAM)?);
    Ok(RunParams {
        image_name: image.name,
        image_tag: image.tag,
        repo_url: image.repository,
        source_url: required(SOURCE_URL_PARAM)?,
        git_ref: run
            .param(SOURCE_REFERENCE_PARAM)
            .unwrap_or_else(|| NO_REF.to_string()),
        builder_image: required(BUILDER_IMAGE_PARAM)?,
    })
}

/// Run status and parameters, without the task tree.
pub fn run_summary(run: &PipelineRun) -> ToolforgeResult<RunDetail> {
    Ok(RunDetail {
        name: run.name().to_string(),
        status: interpret(run.status_block())?,
        params: run_params(run)?,
        tasks: None,
    })
}

/// Run summary plus, when `verbose`, the task tree.
pub fn run_details<P: PodInspector + ?Sized>(
    run: &PipelineRun,
    pods: &P,
    verbose: bool,
) -> ToolforgeResult<RunDetail> {
    let mut details = run_summary(run)?;
    if verbose {
        details.tasks = Some(task_details(run, pods)?);
    }
    Ok(details)
}

/// One detail per task run, in the order the run document lists them.
pub fn task_details<P: PodInspector + ?Sized>(
    run: &PipelineRun,
    pods: &P,
) -> ToolforgeResult<Vec<TaskDetail>> {
    let Some(status) = &run.status else {
        return Ok(Vec::new());
    };

    status
        .task_runs
        .values()
        .map(|task| task_detail(run.name(), task, pods))
        .collect()
}

fn task_detail<P: PodInspector + ?Sized>(
    run_name: &str,
    task: &PipelineTaskRun,
    pods: &P,
) -> ToolforgeResult<TaskDetail> {
    let status = interpret(task.status.as_ref().map(|status| &status.base))?;
    let steps = task
        .status
        .as_ref()
        .and_then(|status| status.steps.as_ref());

    let mut detail = TaskDetail {
        task_name: task.pipeline_task_name.clone(),
        status,
        steps: steps.map(|steps| steps.iter().map(classify_step).collect()),
        init_containers: None,
    };

    let failed_before_steps = detail.status.status.is_failure()
        && steps.is_some_and(|steps| !steps.is_empty() && steps.iter().all(|s| s.state.is_waiting()));
    if failed_before_steps {
        debug!(
            task = %detail.task_name,
            "task failed with every step waiting, inspecting init containers"
        );
        detail.init_containers = Some(init_container_details(
            run_name,
            &detail.task_name,
            pods,
        )?);
    }

    Ok(detail)
}

/// Init container records of the pod that ran `task_name`.
pub fn init_container_details<P: PodInspector + ?Sized>(
    run_name: &str,
    task_name: &str,
    pods: &P,
) -> ToolforgeResult<Vec<InitContainerRecord>> {
    let statuses = pods.init_container_statuses(&pod_name(run_name, task_name))?;
    Ok(statuses.iter().map(classify_init_container).collect())
}

/// Parse a raw run document.
pub fn parse_run(raw: serde_json::Value) -> ToolforgeResult<PipelineRun> {
    Ok(serde_json::from_value(raw)?)
}
