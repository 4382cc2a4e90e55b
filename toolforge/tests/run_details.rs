//! Walking pipeline runs into detail trees.

mod common;

use common::{fixture, run_fixture, FakeApi};
use pretty_assertions::assert_eq;
use serde_json::json;
use toolforge::k8s::types::PipelineRun;
use toolforge::k8s::ObjectKind;
use toolforge::ops::runs::{run_details, run_summary, task_details};
use toolforge::status::{Category, ContainerPhase, RunStatusRecord};
use toolforge::ToolforgeError;

#[test]
fn successful_run_summary() {
    let run = run_fixture("pipeline_successful_run.json");
    let detail = run_summary(&run).unwrap();

    assert_eq!(detail.name, "minikube-user-buildpacks-pipelinerun-khl99");
    assert_eq!(detail.status.status, Category::Ok);
    assert_eq!(detail.status.start_time, "2022-11-08T09:07:35Z");
    assert_eq!(detail.status.end_time, "2022-11-08T09:11:06Z");
    assert_eq!(detail.status.reason, "Succeeded");
    assert_eq!(
        detail.status.message,
        "Tasks Completed: 1 (Failed: 0, Cancelled 0), Skipped: 0"
    );
    assert_eq!(detail.params.image_name, "python");
    assert_eq!(detail.params.image_tag, "snap");
    assert_eq!(detail.params.repo_url, "192.168.65.2/minikube-user");
    assert_eq!(detail.params.source_url, "https://github.com/david-caro/wm-lol");
    assert_eq!(detail.params.git_ref, "upstream_buildpacks");
    assert_eq!(
        detail.params.builder_image,
        "docker-registry.tools.wmflabs.org/toolforge-bullseye0-builder:latest"
    );
    assert!(detail.tasks.is_none());
}

#[test]
fn failed_run_summary_as_json() {
    let run = run_fixture("pipeline_oom_run.json");
    let detail = run_summary(&run).unwrap();

    assert_eq!(
        serde_json::to_value(&detail).unwrap(),
        json!({
            "name": "test-buildpacks-pipelinerun-7h7c7",
            "start_time": "2022-09-27T08:09:22Z",
            "end_time": "2022-09-27T08:09:58Z",
            "status": "error",
            "reason": "Failed",
            "message": "Tasks Completed: 1 (Failed: 1, Cancelled 0), Skipped: 0",
            "params": {
                "image_name": "python",
                "image_tag": "snap",
                "repo_url": "harbor.toolsbeta.wmflabs.org/test",
                "source_url": "https://github.com/david-caro/wm-lol.git",
                "ref": "upstream_buildpacks",
                "builder_image": "docker-registry.tools.wmflabs.org/toolforge-buster0-builder"
            }
        })
    );
}

#[test]
fn run_without_status_is_not_started() {
    let run = run_fixture("pipeline_without_status.json");
    let detail = run_summary(&run).unwrap();

    assert_eq!(detail.status, RunStatusRecord::not_started());
    assert_eq!(detail.params.image_name, "dcaro");
    assert_eq!(detail.params.image_tag, "latest");
    assert_eq!(detail.params.repo_url, "harbor.tools.wmflabs.org/minikube-user");

    let api = FakeApi::new();
    assert!(task_details(&run, &api).unwrap().is_empty());
    assert!(api.calls().is_empty());
}

#[test]
fn successful_task_tree() {
    let run = run_fixture("pipeline_successful_run.json");
    let api = FakeApi::new();
    let tasks = task_details(&run, &api).unwrap();

    let steps: Vec<serde_json::Value> = [
        "clone",
        "prepare",
        "copy-stack-toml",
        "detect",
        "analyze",
        "restore",
        "build",
        "export",
        "results",
    ]
    .iter()
    .map(|name| json!({"name": name, "status": "ok", "reason": "Completed"}))
    .collect();

    assert_eq!(
        serde_json::to_value(&tasks).unwrap(),
        json!([{
            "task_name": "build-from-git",
            "start_time": "2022-11-08T09:07:35Z",
            "end_time": "2022-11-08T09:11:06Z",
            "status": "ok",
            "reason": "Succeeded",
            "message": "All Steps have completed executing",
            "steps": steps
        }])
    );
    assert!(api.calls().is_empty());
}

#[test]
fn task_without_steps_has_no_step_or_init_container_keys() {
    let run = run_fixture("pipeline_oom_run.json");
    let api = FakeApi::new();
    let tasks = task_details(&run, &api).unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status.status, Category::Error);
    assert!(tasks[0].steps.is_none());
    assert!(tasks[0].init_containers.is_none());

    let value = serde_json::to_value(&tasks[0]).unwrap();
    assert!(value.get("steps").is_none());
    assert!(value.get("init_containers").is_none());
    assert!(api.calls().is_empty());
}

#[test]
fn failed_task_with_all_steps_waiting_inspects_its_pod_once() {
    let run = run_fixture("pipeline_init_container_failure.json");
    let pod_name = "mytool-buildpacks-pipelinerun-x2k9p-build-from-git-pod";
    let api = FakeApi::new().with_object(
        ObjectKind::Pods,
        pod_name,
        fixture("pod_init_container_failure.json"),
    );

    let tasks = task_details(&run, &api).unwrap();

    assert_eq!(api.gets_of(ObjectKind::Pods), vec![pod_name.to_string()]);
    let init_containers = tasks[0].init_containers.as_ref().unwrap();
    let summary: Vec<_> = init_containers
        .iter()
        .map(|c| (c.name.as_str(), c.status, c.reason.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("prepare", ContainerPhase::Ok, "Completed"),
            ("place-scripts", ContainerPhase::Error, "Error:failed to pull image"),
            ("working-dir-initializer", ContainerPhase::Waiting, "UnknownReason"),
        ]
    );
    assert!(tasks[0]
        .steps
        .as_ref()
        .unwrap()
        .iter()
        .all(|step| step.status == ContainerPhase::Waiting));
}

fn with_first_step(run: &PipelineRun, raw: serde_json::Value) -> PipelineRun {
    let mut doc = fixture("pipeline_init_container_failure.json");
    doc["status"]["taskRuns"]["mytool-buildpacks-pipelinerun-x2k9p-build-from-git"]["status"]
        ["steps"][0] = raw;
    let patched: PipelineRun = serde_json::from_value(doc).unwrap();
    assert_eq!(patched.name(), run.name());
    patched
}

#[test]
fn one_running_step_prevents_pod_inspection() {
    let base = run_fixture("pipeline_init_container_failure.json");
    let run = with_first_step(
        &base,
        json!({"name": "clone", "running": {"startedAt": "2023-02-01T10:00:30Z"}}),
    );
    let api = FakeApi::new();

    let tasks = task_details(&run, &api).unwrap();

    assert!(api.calls().is_empty());
    assert!(tasks[0].init_containers.is_none());
    assert_eq!(
        tasks[0].steps.as_ref().unwrap()[0].status,
        ContainerPhase::Running
    );
}

#[test]
fn failed_task_without_steps_is_not_escalated() {
    let mut doc = fixture("pipeline_init_container_failure.json");
    doc["status"]["taskRuns"]["mytool-buildpacks-pipelinerun-x2k9p-build-from-git"]["status"]
        ["steps"] = json!([]);
    let run: PipelineRun = serde_json::from_value(doc).unwrap();
    let api = FakeApi::new();

    let tasks = task_details(&run, &api).unwrap();

    assert_eq!(tasks[0].status.status, Category::Error);
    assert!(api.calls().is_empty());
    assert!(tasks[0].init_containers.is_none());
    assert_eq!(tasks[0].steps.as_deref(), Some(&[][..]));
}

#[test]
fn cancelled_task_with_waiting_steps_also_inspects_its_pod() {
    let mut doc = fixture("pipeline_init_container_failure.json");
    let task = &mut doc["status"]["taskRuns"]["mytool-buildpacks-pipelinerun-x2k9p-build-from-git"];
    task["status"]["conditions"][0]["reason"] = json!("TaskRunCancelled");
    let run: PipelineRun = serde_json::from_value(doc).unwrap();
    let pod_name = "mytool-buildpacks-pipelinerun-x2k9p-build-from-git-pod";
    let api = FakeApi::new().with_object(
        ObjectKind::Pods,
        pod_name,
        fixture("pod_init_container_failure.json"),
    );

    let tasks = task_details(&run, &api).unwrap();

    assert_eq!(tasks[0].status.status, Category::Cancelled);
    assert_eq!(api.gets_of(ObjectKind::Pods).len(), 1);
}

#[test]
fn missing_pod_is_a_hard_error() {
    let run = run_fixture("pipeline_init_container_failure.json");
    let api = FakeApi::new();

    let err = task_details(&run, &api).unwrap_err();
    assert!(matches!(err, ToolforgeError::K8s(ref e) if e.is_not_found()));
}

#[test]
fn verbose_details_carry_tasks() {
    let run = run_fixture("pipeline_successful_run.json");
    let api = FakeApi::new();

    let quiet = run_details(&run, &api, false).unwrap();
    assert!(quiet.tasks.is_none());
    assert!(serde_json::to_value(&quiet).unwrap().get("tasks").is_none());

    let verbose = run_details(&run, &api, true).unwrap();
    assert_eq!(verbose.tasks.as_ref().unwrap().len(), 1);
    assert_eq!(verbose.status, quiet.status);
}

#[test]
fn missing_required_param_is_reported() {
    let mut doc = fixture("pipeline_without_status.json");
    doc["spec"]["params"] = json!([{"name": "APP_IMAGE", "value": "a/b/c:d"}]);
    let run: PipelineRun = serde_json::from_value(doc).unwrap();

    let err = run_summary(&run).unwrap_err();
    assert!(err.to_string().contains("SOURCE_URL"));
}

#[test]
fn missing_ref_uses_placeholder() {
    let run = run_fixture("pipeline_init_container_failure.json");
    assert_eq!(run_summary(&run).unwrap().params.git_ref, "no ref");
}
