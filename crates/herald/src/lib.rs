//! `herald` triggers deployment workflows, waits for them, and tells people how they went.

use clap::{Parser, Subcommand};
use miette::Result;
use tracing::Level;

use crate::{
    commands::{announce, auto_merge, trigger, wait},
    config::Config,
    state::RunType,
};

mod commands;
mod config;
mod integrations;
mod state;
#[cfg(test)]
mod test_server;

#[derive(Debug, Parser)]
#[command(author, version, about, propagate_version = true)]
struct Cli {
    /// Pretend to run the command, logging what would have happened instead of touching the
    /// network.
    #[arg(long, global = true)]
    dry_run: bool,
    /// Print extra information while running.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Announce a deployment on the social network, as a public post or a direct message.
    Announce {
        #[command(flatten)]
        deployment: announce::Deployment,
        /// `public` or `dm`. Anything else falls back to `public`.
        #[arg(index = 3, env = "HERALD_ANNOUNCE_MODE")]
        mode: Option<String>,
        /// The storage transaction of the deployed file.
        #[arg(long = "tx", env = "DEPLOY_TX_ID")]
        transaction_id: Option<String>,
        /// Who to send a direct message to (with or without the leading `@`).
        #[arg(long, env = "SOCIAL_DM_RECIPIENT")]
        recipient: Option<String>,
    },
    /// Announce a deployment by direct message only.
    Dm {
        #[command(flatten)]
        deployment: announce::Deployment,
        /// Only `dm` is supported here. Anything else falls back to `dm`.
        #[arg(index = 3)]
        mode: Option<String>,
        /// The storage transaction of the deployed file.
        #[arg(long = "tx", env = "DEPLOY_TX_ID")]
        transaction_id: Option<String>,
        /// Who to send the direct message to (with or without the leading `@`).
        #[arg(long, env = "SOCIAL_DM_RECIPIENT")]
        recipient: Option<String>,
    },
    /// Announce a deployment to the chat webhook.
    Chat {
        #[command(flatten)]
        deployment: announce::Deployment,
        /// The manifest transaction of the deployment.
        #[arg(index = 3, value_name = "MANIFEST_TX")]
        manifest_transaction_id: Option<String>,
    },
    /// Start a `workflow_dispatch` workflow on GitHub.
    Trigger(trigger::Args),
    /// Wait for a GitHub workflow run to finish, failing if it doesn't succeed.
    Wait(wait::Args),
    /// Take a pull request out of draft and merge it.
    AutoMerge(auto_merge::Args),
}

/// Parse the command line and run the chosen command.
///
/// Usage errors exit with code 1 (help and version exit with 0). Everything else is returned as
/// a diagnostic.
pub async fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(i32::from(err.use_stderr()));
        }
    };
    init_tracing(cli.verbose);

    let config = Config::from_env();
    let run_type = if cli.dry_run {
        RunType::DryRun(())
    } else {
        RunType::Real(())
    };

    match cli.command {
        Command::Announce {
            deployment,
            mode,
            transaction_id,
            recipient,
        } => {
            let args = announce::Social {
                deployment,
                mode,
                transaction_id,
                recipient,
            };
            announce::social(announce::ANNOUNCE, run_type.of(args), &config).await?;
        }
        Command::Dm {
            deployment,
            mode,
            transaction_id,
            recipient,
        } => {
            let args = announce::Social {
                deployment,
                mode,
                transaction_id,
                recipient,
            };
            announce::social(announce::DIRECT_MESSAGE, run_type.of(args), &config).await?;
        }
        Command::Chat {
            deployment,
            manifest_transaction_id,
        } => {
            let args = announce::Chat {
                deployment,
                manifest_transaction_id,
            };
            announce::chat(run_type.of(args), &config).await?;
        }
        Command::Trigger(args) => trigger::run(run_type.of(args), &config).await?,
        Command::Wait(args) => wait::run(run_type.of(args), &config).await?,
        Command::AutoMerge(args) => auto_merge::run(run_type.of(args), &config).await?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
