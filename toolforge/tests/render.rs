//! Rendering detail trees as text, tables and JSON.

mod common;

use common::{fixture, run_fixture, FakeApi};
use pretty_assertions::assert_eq;
use toolforge::cli::render::{run_block, runs_table, to_json, Palette};
use toolforge::k8s::ObjectKind;
use toolforge::ops::runs::{run_details, run_summary};

#[test]
fn verbose_successful_run_block() {
    let run = run_fixture("pipeline_successful_run.json");
    let detail = run_details(&run, &FakeApi::new(), true).unwrap();

    let expected = "\
Name: minikube-user-buildpacks-pipelinerun-khl99
Start time: 2022-11-08T09:07:35Z
End time: 2022-11-08T09:11:06Z
Status: ok (Succeeded)
Message: Tasks Completed: 1 (Failed: 0, Cancelled 0), Skipped: 0
Parameters:
    source_url: https://github.com/david-caro/wm-lol
    ref: upstream_buildpacks
    image_name: python
    image_tag: snap
    repo_url: 192.168.65.2/minikube-user
    builder_image: docker-registry.tools.wmflabs.org/toolforge-bullseye0-builder:latest
Tasks:
    Task: build-from-git
        Start time: 2022-11-08T09:07:35Z
        End time: 2022-11-08T09:11:06Z
        Status: ok (Succeeded)
        Message: All Steps have completed executing

        Steps:
            Step: clone - ok (Completed)
            Step: prepare - ok (Completed)
            Step: copy-stack-toml - ok (Completed)
            Step: detect - ok (Completed)
            Step: analyze - ok (Completed)
            Step: restore - ok (Completed)
            Step: build - ok (Completed)
            Step: export - ok (Completed)
            Step: results - ok (Completed)

";
    assert_eq!(run_block(&detail, Palette::plain()), expected);
}

#[test]
fn init_containers_are_listed_after_steps() {
    let run = run_fixture("pipeline_init_container_failure.json");
    let api = FakeApi::new().with_object(
        ObjectKind::Pods,
        "mytool-buildpacks-pipelinerun-x2k9p-build-from-git-pod",
        fixture("pod_init_container_failure.json"),
    );
    let detail = run_details(&run, &api, true).unwrap();
    let block = run_block(&detail, Palette::plain());

    let tail: Vec<&str> = block.lines().rev().take(5).collect::<Vec<_>>().into_iter().rev().collect();
    assert_eq!(
        tail,
        vec![
            "",
            "        Init containers:",
            "            Init-container: prepare - ok (Completed)",
            "            Init-container: place-scripts - error (Error:failed to pull image)",
            "            Init-container: working-dir-initializer - waiting (UnknownReason)",
        ]
    );
}

#[test]
fn rendering_is_idempotent() {
    let run = run_fixture("pipeline_successful_run.json");
    let detail = run_details(&run, &FakeApi::new(), true).unwrap();

    for palette in [Palette::plain(), Palette::new(true)] {
        assert_eq!(run_block(&detail, palette), run_block(&detail, palette));
    }
    assert_eq!(to_json(&detail).unwrap(), to_json(&detail).unwrap());
    let details = [detail];
    assert_eq!(
        runs_table(&details, Palette::plain()),
        runs_table(&details, Palette::plain())
    );
}

#[test]
fn text_and_json_agree() {
    let run = run_fixture("pipeline_oom_run.json");
    let detail = run_summary(&run).unwrap();

    let block = run_block(&detail, Palette::plain());
    let json: serde_json::Value = serde_json::from_str(&to_json(&detail).unwrap()).unwrap();

    assert!(block.contains(&format!("Status: {} ({})", json["status"].as_str().unwrap(), json["reason"].as_str().unwrap())));
    assert!(block.contains(&format!("Start time: {}", json["start_time"].as_str().unwrap())));
    assert!(block.contains(&format!("    ref: {}", json["params"]["ref"].as_str().unwrap())));
}

#[test]
fn table_lists_runs_in_given_order() {
    let details: Vec<_> = [
        "pipeline_successful_run.json",
        "pipeline_oom_run.json",
        "pipeline_without_status.json",
    ]
    .iter()
    .map(|name| run_summary(&run_fixture(name)).unwrap())
    .collect();

    let table = runs_table(&details, Palette::plain());
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("run_image  "));
    assert!(lines[1].starts_with("minikube-user-buildpacks-pipelinerun-khl99  ok  "));
    assert!(lines[2].starts_with("test-buildpacks-pipelinerun-7h7c7"));
    assert!(lines[3].contains("not_started  pending"));

    let ref_column = lines[0].find(" ref ").unwrap() + 1;
    assert_eq!(&lines[1][ref_column..ref_column + 19], "upstream_buildpacks");
}
