use std::{num::ParseIntError, sync::LazyLock};

use clap::builder::FalseyValueParser;
use herald_announce::{
    Channel, ChannelMode, DeploymentOutcome, DispatchResult, MissingIdentifier, dispatch,
};
use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

use crate::{
    config::{self, Config},
    integrations::{DryRun, chat::ChatWebhook, social::SocialClient},
    state::RunType,
};

/// The deployment being announced, as given on the command line.
#[derive(Clone, Debug, clap::Args)]
pub(crate) struct Deployment {
    /// The deployment (commit) hash, also used as the undername. Pass `no-change` to announce
    /// that nothing was deployed.
    #[arg(index = 1, value_name = "HASH")]
    pub(crate) hash: String,
    /// The deployed file [default: $DEPLOY_FILE_PATH or hello-world.txt]
    #[arg(index = 2, value_name = "FILE")]
    pub(crate) file: Option<String>,
    /// Size of the deployed file in bytes.
    #[arg(long, env = "DEPLOY_FILE_SIZE", default_value_t = 0, value_parser = parse_count)]
    pub(crate) size_bytes: u64,
    /// How long the deployment took, in milliseconds.
    #[arg(long, env = "DEPLOY_DURATION_MS", default_value_t = 0, value_parser = parse_count)]
    pub(crate) duration_ms: u64,
    /// Announce a failed deployment instead of a successful one.
    #[arg(
        long,
        env = "DEPLOY_FAILED",
        action = clap::ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub(crate) failed: bool,
    /// Print the dispatch result as JSON instead of a sentence.
    #[arg(long)]
    pub(crate) json: bool,
}

/// CI often sets these variables to nothing when the value is unknown, which means zero.
fn parse_count(raw: &str) -> Result<u64, ParseIntError> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(0)
    } else {
        raw.parse()
    }
}

static HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // The pattern is a constant
    Regex::new("^[A-Za-z0-9_]{1,15}$").unwrap()
});

/// The direct message recipient, without any leading `@`.
fn recipient(raw: Option<&str>) -> Result<String, super::Error> {
    let handle = raw
        .map(|handle| handle.trim().trim_start_matches('@'))
        .filter(|handle| !handle.is_empty())
        .ok_or(config::Error::MissingRecipient)?;
    if HANDLE.is_match(handle) {
        Ok(handle.to_string())
    } else {
        Err(Error::InvalidRecipient {
            handle: handle.to_string(),
        }
        .into())
    }
}

impl Deployment {
    fn outcome(
        &self,
        transaction_id: Option<String>,
        config: &Config,
    ) -> Result<DeploymentOutcome, MissingIdentifier> {
        DeploymentOutcome::builder(self.hash.as_str())
            .succeeded(!self.failed)
            .file_path(self.file.clone())
            .fallback_file_path(config.default_file_path.as_str())
            .transaction_id(transaction_id)
            .file_size_bytes(self.size_bytes)
            .duration_ms(self.duration_ms)
            .build()
    }
}

/// Which social channel an entry point may use, and which it uses when asked for nothing
/// (or for something it doesn't support).
#[derive(Clone, Copy, Debug)]
pub(crate) struct EntryPoint {
    pub(crate) allowed: &'static [ChannelMode],
    pub(crate) default: ChannelMode,
}

/// `herald announce`: public posts by default, direct messages on request.
pub(crate) const ANNOUNCE: EntryPoint = EntryPoint {
    allowed: &[ChannelMode::Public, ChannelMode::Dm],
    default: ChannelMode::Public,
};

/// `herald dm`: direct messages only.
pub(crate) const DIRECT_MESSAGE: EntryPoint = EntryPoint {
    allowed: &[ChannelMode::Dm],
    default: ChannelMode::Dm,
};

pub(crate) struct Social {
    pub(crate) deployment: Deployment,
    pub(crate) mode: Option<String>,
    pub(crate) transaction_id: Option<String>,
    pub(crate) recipient: Option<String>,
}

pub(crate) async fn social(
    entry_point: EntryPoint,
    args: RunType<Social>,
    config: &Config,
) -> Result<(), super::Error> {
    let (run_type, args) = args.take();
    let outcome = args
        .deployment
        .outcome(args.transaction_id, config)
        .map_err(Error::from)?;
    let mode = ChannelMode::select(args.mode.as_deref(), entry_point.allowed, entry_point.default);
    let channel = match mode {
        ChannelMode::Public => Channel::PublicPost,
        ChannelMode::Dm => Channel::DirectMessage {
            recipient: recipient(args.recipient.as_deref())?,
        },
    };

    let result = match run_type {
        RunType::DryRun(()) => dispatch(&outcome, &channel, &config.announce, &DryRun).await,
        RunType::Real(()) => {
            let client = SocialClient::new(config.social_token()?, &config.social.api_url)
                .map_err(Error::Social)?;
            dispatch(&outcome, &channel, &config.announce, &client).await
        }
    };
    report(&result, &channel, &outcome, args.deployment.json)?;
    Ok(())
}

pub(crate) struct Chat {
    pub(crate) deployment: Deployment,
    pub(crate) manifest_transaction_id: Option<String>,
}

pub(crate) async fn chat(args: RunType<Chat>, config: &Config) -> Result<(), super::Error> {
    let (run_type, args) = args.take();
    let outcome = args
        .deployment
        .outcome(args.manifest_transaction_id, config)
        .map_err(Error::from)?;
    let channel = Channel::ChatWebhook;

    let result = match run_type {
        RunType::DryRun(()) => dispatch(&outcome, &channel, &config.announce, &DryRun).await,
        RunType::Real(()) => {
            let webhook = ChatWebhook::new(config.chat_webhook_url()?).map_err(Error::Chat)?;
            dispatch(&outcome, &channel, &config.announce, &webhook).await
        }
    };
    report(&result, &channel, &outcome, args.deployment.json)?;
    Ok(())
}

/// Print the result and turn anything other than success into an error.
fn report(
    result: &DispatchResult,
    channel: &Channel,
    outcome: &DeploymentOutcome,
    json: bool,
) -> Result<(), Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    if let Some(reason) = &result.reason {
        return Err(Error::Rejected {
            reason: reason.clone(),
        });
    }
    if !result.is_success() {
        return Err(Error::Failed {
            error: result.error.clone().unwrap_or_default(),
        });
    }
    if !json {
        println!("{}", confirmation(result, channel, outcome));
    }
    Ok(())
}

fn confirmation(result: &DispatchResult, channel: &Channel, outcome: &DeploymentOutcome) -> String {
    let hash = outcome.identifier_hash();
    match (channel, &result.deployment_url) {
        (Channel::PublicPost, _) => format!("✅ Posted deployment announcement for {hash}"),
        (Channel::DirectMessage { recipient }, _) => {
            let recipient = result.recipient.as_deref().unwrap_or(recipient);
            format!("✅ Sent direct message to @{recipient} for deployment {hash}")
        }
        (Channel::ChatWebhook, Some(url)) => {
            format!("✅ Sent chat notification for {hash}: {url}")
        }
        (Channel::ChatWebhook, None) => format!("✅ Sent chat notification for {hash}"),
    }
}

#[derive(Debug, Error, Diagnostic)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    MissingIdentifier(#[from] MissingIdentifier),
    #[error("{handle:?} is not a valid account name")]
    #[diagnostic(
        code(announce::invalid_recipient),
        help("Account names are 1 to 15 letters, digits, or underscores, like `@jonniesparkles`.")
    )]
    InvalidRecipient { handle: String },
    #[error("Announcement rejected: {reason}")]
    #[diagnostic(
        code(announce::rejected),
        help("The channel refused the announcement. Check the recipient and the message contents.")
    )]
    Rejected { reason: String },
    #[error("Announcement failed: {error}")]
    #[diagnostic(
        code(announce::failed),
        help("The announcement could not be delivered. Check your network connection and the channel's URL.")
    )]
    Failed { error: String },
    #[error(transparent)]
    #[diagnostic(transparent)]
    Social(crate::integrations::social::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Chat(crate::integrations::chat::Error),
    #[error("Could not serialize the result: {0}")]
    Json(#[from] serde_json::Error),
}
