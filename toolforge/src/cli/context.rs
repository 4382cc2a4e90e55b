//! CLI context - shared state and services for all commands

use super::output::{OutputFormat, OutputFormatter};
use crate::config::Config;
use crate::error::ToolforgeResult;
use crate::k8s::kubeconfig::expand_home;
use crate::k8s::KubeClient;
use crate::plugins::{Delegator, EnvContract, InvocationFlags};
use std::path::Path;
use tracing::debug;

/// Shared context for CLI commands
pub struct CliContext {
    /// Loaded configuration
    pub config: Config,
    /// Verbose mode (task trees, chattier children)
    pub verbose: bool,
    /// Debug mode (debug logs here and in children)
    pub debug: bool,
    /// Whether stdout gets ANSI styling
    pub use_color: bool,
}

impl CliContext {
    pub fn new(config: Config, flags: InvocationFlags, use_color: bool) -> Self {
        Self {
            config,
            verbose: flags.verbose,
            debug: flags.debug,
            use_color,
        }
    }

    pub fn flags(&self) -> InvocationFlags {
        InvocationFlags {
            verbose: self.verbose,
            debug: self.debug,
        }
    }

    /// Delegator carrying this invocation's environment contract
    pub fn delegator(&self) -> Delegator {
        Delegator::new(
            EnvContract::from_prefix(&self.config.toolforge_prefix),
            self.flags(),
        )
    }

    pub fn formatter(&self, format: OutputFormat) -> OutputFormatter {
        OutputFormatter::new(format, self.use_color)
    }

    /// Control plane client scoped to the build service namespace
    pub fn kube_client(&self, kubeconfig: &Path) -> ToolforgeResult<KubeClient> {
        let path = expand_home(kubeconfig);
        debug!("Loading kubeconfig from {}", path.display());
        Ok(KubeClient::from_kubeconfig(
            &path,
            Some(&self.config.build.build_service_namespace),
        )?)
    }
}
