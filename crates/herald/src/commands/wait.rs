use std::time::{Duration, Instant};

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::Config,
    integrations::github::{GitHub, WorkflowRun},
    state::RunType,
};

#[derive(Clone, Debug, clap::Args)]
pub(crate) struct Args {
    /// The workflow whose latest dispatched run to wait for (file name or ID).
    pub(crate) workflow: String,
    /// The branch the run was started on.
    #[arg(long = "ref", default_value = "main")]
    pub(crate) git_ref: String,
    /// Wait for this specific run instead of the latest one.
    #[arg(long)]
    pub(crate) run_id: Option<u64>,
    /// Seconds between checks.
    #[arg(long, default_value_t = 10)]
    pub(crate) interval: u64,
    /// Give up after this many seconds.
    #[arg(long, default_value_t = 1800)]
    pub(crate) timeout: u64,
}

pub(crate) async fn run(args: RunType<Args>, config: &Config) -> Result<(), super::Error> {
    let (run_type, args) = args.take();
    let repository = config.repository()?;

    if let RunType::DryRun(()) = run_type {
        match args.run_id {
            Some(id) => info!("Would wait for run {id} in {repository}"),
            None => info!(
                "Would wait for the latest run of {} on {} in {repository}",
                args.workflow, args.git_ref
            ),
        }
        return Ok(());
    }

    let github = GitHub::new(config.github_token()?, &config.github.api_url, repository)?;
    let run = match args.run_id {
        Some(id) => github.get_run(id).await?,
        None => github
            .latest_run(&args.workflow, &args.git_ref)
            .await?
            .ok_or_else(|| Error::NoRuns {
                workflow: args.workflow.clone(),
                git_ref: args.git_ref.clone(),
            })?,
    };

    let run = poll(
        &github,
        run,
        Duration::from_secs(args.interval),
        Duration::from_secs(args.timeout),
    )
    .await?;
    if run.succeeded() {
        println!("✅ Workflow run {} succeeded: {}", run.id, run.html_url);
        Ok(())
    } else {
        Err(Error::RunFailed {
            id: run.id,
            conclusion: run.conclusion.unwrap_or_else(|| String::from("unknown")),
            url: run.html_url,
        }
        .into())
    }
}

async fn poll(
    github: &GitHub,
    mut run: WorkflowRun,
    interval: Duration,
    timeout: Duration,
) -> Result<WorkflowRun, super::Error> {
    let started = Instant::now();
    info!("Waiting for {}", run.html_url);
    while !run.is_completed() {
        if started.elapsed() >= timeout {
            return Err(Error::TimedOut {
                id: run.id,
                seconds: timeout.as_secs(),
            }
            .into());
        }
        tokio::time::sleep(interval).await;
        run = github.get_run(run.id).await?;
        debug!("Run {} is {}", run.id, run.status);
    }
    Ok(run)
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("No dispatched runs of {workflow} found on {git_ref}")]
    #[diagnostic(
        code(wait::no_runs),
        help("Trigger the workflow first with `herald trigger`, or pass --run-id.")
    )]
    NoRuns { workflow: String, git_ref: String },
    #[error("Workflow run {id} did not finish within {seconds} seconds")]
    #[diagnostic(
        code(wait::timed_out),
        help("Pass a larger --timeout, or check the run on GitHub.")
    )]
    TimedOut { id: u64, seconds: u64 },
    #[error("Workflow run {id} finished with `{conclusion}`: {url}")]
    #[diagnostic(code(wait::run_failed))]
    RunFailed {
        id: u64,
        conclusion: String,
        url: String,
    },
}
