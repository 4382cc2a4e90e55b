// Build command implementation
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::cli::CliContext;
use crate::error::{ToolforgeError, ToolforgeResult};
use crate::k8s::KubeClient;
use crate::ops::build::{self as ops, CancelOutcome};
use crate::ops::pipeline::{app_image_url, default_image_name};
use crate::ops::runs::DEFAULT_TAG;
use crate::ops::BuildRequest;
use clap::{Args, Subcommand};
use colored::Color;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const NO_BUILDS_HINT: &str = "No builds found, you can start one using `toolforge build start`, \
run `toolforge build start --help` for more details";

const LOGS_NOT_AVAILABLE: &str =
    "This feature is not yet available for non-admin users, but will be soon!";

/// Path to the kubeconfig, shared by every build subcommand
#[derive(Args, Debug, Clone)]
pub struct KubeconfigArg {
    #[arg(
        long,
        global = true,
        hide = true,
        env = "KUBECONFIG",
        default_value = "~/.kube/config"
    )]
    pub kubeconfig: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum BuildCommand {
    /// Start a pipeline to build a container image from source code
    Start {
        /// Git URL of the source code
        source_git_url: Option<String>,
        /// Image identifier for the builder that will be used to build the project (ex. python)
        #[arg(short = 'n', long)]
        image_name: Option<String>,
        /// Tag to tag the generated image with
        #[arg(short = 't', long, default_value = DEFAULT_TAG)]
        image_tag: String,
        #[arg(long, hide = true)]
        builder_image: Option<String>,
        #[arg(long, hide = true)]
        dest_repository: Option<String>,
        /// Branch, tag or commit to build, by default will use the HEAD of the given repository
        #[arg(long = "ref")]
        git_ref: Option<String>,
    },
    /// Show the logs for a build (only admins for now)
    Logs { run_name: String },
    /// List builds
    List {
        /// If set, will output in json format
        #[arg(long)]
        json: bool,
    },
    /// Cancel a running build (does nothing for stopped ones)
    Cancel {
        build_name: Vec<String>,
        /// Cancel all the current builds
        #[arg(long)]
        all: bool,
        /// Don't ask for confirmation
        #[arg(short = 'y', long = "yes-i-know")]
        yes_i_know: bool,
    },
    /// Delete a build
    Delete {
        build_name: Vec<String>,
        /// Delete all the current builds
        #[arg(long)]
        all: bool,
        /// Don't ask for confirmation
        #[arg(short = 'y', long = "yes-i-know")]
        yes_i_know: bool,
    },
    /// Show details for a specific build
    Show {
        run_name: Option<String>,
        /// If set, will output in json format
        #[arg(long)]
        json: bool,
    },
}

pub fn execute(ctx: &CliContext, kubeconfig: &Path, command: BuildCommand) -> ToolforgeResult<()> {
    match command {
        BuildCommand::Start {
            source_git_url,
            image_name,
            image_tag,
            builder_image,
            dest_repository,
            git_ref,
        } => {
            let formatter = ctx.formatter(OutputFormat::Text);
            let Some(source_url) = source_git_url else {
                let palette = formatter.palette();
                formatter.line(&format!(
                    "{} Please provide a git url for your source code.\n{} toolforge build start 'https://gitlab.wikimedia.org/toolforge-repos/my-tool'",
                    palette.emphasize("Error:", Color::Red),
                    palette.bold("Example:"),
                ));
                return Ok(());
            };

            let client = ctx.kube_client(kubeconfig)?;
            let build = &ctx.config.build;
            let app_image = app_image_url(
                dest_repository.as_deref().unwrap_or(&build.dest_repository),
                client.user(),
                &image_name.unwrap_or_else(default_image_name),
                &image_tag,
            );
            let request = BuildRequest {
                user: client.user().to_string(),
                namespace: client.namespace().to_string(),
                source_url,
                git_ref,
                app_image,
                builder_image: builder_image.unwrap_or_else(|| build.builder_image.clone()),
            };

            let started = ops::start_build(&client, &request)?;
            formatter.line(&format!(
                "Building '{}' -> '{}'\nYou can see the status with:\n\ttoolforge build show '{}'",
                started.source_url, started.app_image, started.run_name
            ));
        }
        BuildCommand::Logs { run_name } => {
            let client = ctx.kube_client(kubeconfig)?;
            if !client
                .identity()
                .in_any_group(&ctx.config.build.admin_group_names)
            {
                ctx.formatter(OutputFormat::Text).alert(LOGS_NOT_AVAILABLE);
                return Ok(());
            }

            let args = [
                "pipelinerun",
                "logs",
                "--namespace",
                ctx.config.build.build_service_namespace.as_str(),
                "-f",
                run_name.as_str(),
            ]
            .map(OsString::from);
            ctx.delegator().run(Path::new("tkn"), &args)?;
        }
        BuildCommand::List { json } => {
            let client = ctx.kube_client(kubeconfig)?;
            let runs = ops::list_builds(&client, client.user())?;
            ctx.formatter(OutputFormat::from_json_flag(json))
                .runs(&runs)?;
        }
        BuildCommand::Show { run_name, json } => {
            let formatter = ctx.formatter(OutputFormat::from_json_flag(json));
            let client = ctx.kube_client(kubeconfig)?;
            match ops::show_build(&client, client.user(), run_name.as_deref(), ctx.verbose)? {
                Some(run) => formatter.run(&run)?,
                None => formatter.warning(NO_BUILDS_HINT),
            }
        }
        BuildCommand::Cancel {
            build_name,
            all,
            yes_i_know,
        } => {
            let formatter = ctx.formatter(OutputFormat::Text);
            let client = ctx.kube_client(kubeconfig)?;
            let Some(runs) = pick_runs(&client, &formatter, &build_name, all, yes_i_know, "cancel")?
            else {
                return Ok(());
            };
            let outcome = ops::cancel_builds(&client, &runs)?;
            report_cancel(&formatter, &outcome);
        }
        BuildCommand::Delete {
            build_name,
            all,
            yes_i_know,
        } => {
            let formatter = ctx.formatter(OutputFormat::Text);
            let client = ctx.kube_client(kubeconfig)?;
            let Some(runs) = pick_runs(&client, &formatter, &build_name, all, yes_i_know, "delete")?
            else {
                return Ok(());
            };
            let deleted = ops::delete_builds(&client, &runs)?;
            formatter.line(&format!("Deleted {} runs.", deleted));
        }
    }

    Ok(())
}

/// Resolve the runs an action applies to and get confirmation.
///
/// `None` means there is nothing to do; the reason was already printed.
fn pick_runs(
    client: &KubeClient,
    formatter: &OutputFormatter,
    names: &[String],
    all: bool,
    yes_i_know: bool,
    action: &str,
) -> ToolforgeResult<Option<Vec<String>>> {
    if names.is_empty() && !all {
        formatter.line(&format!("No run passed to {}.", action));
        return Ok(None);
    }

    let runs = ops::select_runs(client, client.user(), names, all)?;
    if runs.is_empty() {
        formatter.line(&format!(
            "No runs to {}, maybe there was a typo? (try listing them with toolforge build list)",
            action
        ));
        return Ok(None);
    }

    if !yes_i_know && !confirm(&format!("I'm going to {} {} runs, continue?", action, runs.len()))? {
        return Err(ToolforgeError::Generic("Aborted!".to_string()));
    }

    Ok(Some(runs))
}

fn confirm(prompt: &str) -> ToolforgeResult<bool> {
    dialoguer::Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ToolforgeError::Generic(format!("Failed to read confirmation: {}", e)))
}

fn report_cancel(formatter: &OutputFormatter, outcome: &CancelOutcome) {
    for (run_name, skip) in &outcome.skipped {
        formatter.alert(&skip.message(run_name));
    }
    formatter.line(&format!("Cancelled {} runs", outcome.cancelled));
}
