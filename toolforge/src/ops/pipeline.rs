//! Pipeline run construction for new builds.

use super::runs::{APP_IMAGE_PARAM, BUILDER_IMAGE_PARAM, SOURCE_REFERENCE_PARAM, SOURCE_URL_PARAM};
use serde_json::{json, Value};

pub const PIPELINE_NAME: &str = "buildpacks";
pub const SERVICE_ACCOUNT: &str = "buildpacks-service-account";
/// Uid/gid the build steps run as.
pub const BUILD_ID: &str = "61312";
pub const USER_LABEL: &str = "user";
pub const TOOL_IMAGE_PREFIX: &str = "tool-";

/// Everything needed to submit one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub user: String,
    pub namespace: String,
    pub source_url: String,
    pub git_ref: Option<String>,
    pub app_image: String,
    pub builder_image: String,
}

/// `{repository}/{user}/{name}:{tag}`
pub fn app_image_url(repository: &str, user: &str, name: &str, tag: &str) -> String {
    format!("{}/{}/{}:{}", repository, user, name, tag)
}

/// Image name used when none is given: `tool-` plus the last component of
/// the home directory, falling back to the plain prefix.
pub fn default_image_name() -> String {
    let home = dirs::home_dir()
        .and_then(|home| home.file_name().map(|name| name.to_string_lossy().into_owned()))
        .unwrap_or_default();
    format!("{}{}", TOOL_IMAGE_PREFIX, home)
}

/// Selector matching the runs started by `user`.
pub fn user_selector(user: &str) -> String {
    format!("{}={}", USER_LABEL, user)
}

/// Selector matching the pods created for `run_name`.
pub fn run_pods_selector(run_name: &str) -> String {
    format!("tekton.dev/pipelineRun={}", run_name)
}

/// The pipeline run document submitted for `request`.
pub fn pipeline_run_spec(request: &BuildRequest) -> Value {
    let mut params = vec![
        json!({"name": BUILDER_IMAGE_PARAM, "value": request.builder_image}),
        json!({"name": APP_IMAGE_PARAM, "value": request.app_image}),
        json!({"name": SOURCE_URL_PARAM, "value": request.source_url}),
        json!({"name": "USER_ID", "value": BUILD_ID}),
        json!({"name": "GROUP_ID", "value": BUILD_ID}),
    ];
    if let Some(git_ref) = &request.git_ref {
        params.push(json!({"name": SOURCE_REFERENCE_PARAM, "value": git_ref}));
    }

    json!({
        "apiVersion": "tekton.dev/v1beta1",
        "kind": "PipelineRun",
        "metadata": {
            "generateName": format!("{}-buildpacks-pipelinerun-", request.user),
            "namespace": request.namespace,
            "labels": {USER_LABEL: request.user},
        },
        "spec": {
            "serviceAccountName": SERVICE_ACCOUNT,
            "pipelineRef": {"name": PIPELINE_NAME},
            "params": params,
            "workspaces": [
                {"name": "source-ws", "emptyDir": {}},
                {"name": "cache-ws", "emptyDir": {}},
            ],
        },
    })
}
