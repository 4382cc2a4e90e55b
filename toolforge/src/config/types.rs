//! Configuration types.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFIX: &str = "toolforge-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Registry the built images are pushed to.
    pub dest_repository: String,
    pub builder_image: String,
    /// Namespace the pipeline runs are created in.
    pub build_service_namespace: String,
    pub admin_group_names: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            dest_repository: "tools-harbor.wmcloud.org".to_string(),
            builder_image: "tools-harbor.wmcloud.org/toolforge/heroku-builder-classic:22"
                .to_string(),
            build_service_namespace: "image-build".to_string(),
            admin_group_names: vec!["admins".to_string(), "system:masters".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    /// Filename prefix marking an executable as a `toolforge` subcommand.
    pub toolforge_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build: BuildConfig::default(),
            toolforge_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}
