use herald_announce::{AnnounceSettings, DEFAULT_FILE_PATH};
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;
use tracing::warn;

pub(crate) mod repository;
mod token;

pub(crate) use repository::Repository;
use token::{GITHUB_TOKEN_VARS, SOCIAL_TOKEN_VARS};

const DEFAULT_SOCIAL_API_URL: &str = "https://api.twitter.com/2";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Everything `herald` reads from the environment, read once at startup and passed down.
#[derive(Clone, Debug)]
pub(crate) struct Config {
    /// What the announcement renderer needs to know about the namespace.
    pub(crate) announce: AnnounceSettings,
    /// Used when no file is passed on the command line.
    pub(crate) default_file_path: String,
    pub(crate) social: Social,
    /// Incoming webhook URL for chat notifications.
    pub(crate) chat_webhook_url: Option<String>,
    pub(crate) github: GitHub,
}

#[derive(Clone, Debug)]
pub(crate) struct Social {
    pub(crate) token: Option<String>,
    pub(crate) api_url: String,
}

#[derive(Clone, Debug)]
pub(crate) struct GitHub {
    pub(crate) token: Option<String>,
    /// `owner/repo` if set explicitly.
    pub(crate) repository: Option<String>,
    pub(crate) api_url: String,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any source of variables.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = AnnounceSettings::default();

        let total_apps = match non_empty("TOTAL_APPS") {
            None => defaults.total_apps,
            Some(value) => value.trim().parse().unwrap_or_else(|_| {
                warn!("TOTAL_APPS is set to {value:?}, which is not a number; using 0");
                0
            }),
        };

        Self {
            announce: AnnounceSettings {
                owner_namespace: non_empty("OWNER_ARNS_NAME").unwrap_or(defaults.owner_namespace),
                total_apps,
                gateway: non_empty("ARNS_GATEWAY").unwrap_or(defaults.gateway),
            },
            default_file_path: non_empty("DEPLOY_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_FILE_PATH.to_string()),
            social: Social {
                token: token::resolve(SOCIAL_TOKEN_VARS, &lookup),
                api_url: trim_url(non_empty("TWITTER_API_URL"), DEFAULT_SOCIAL_API_URL),
            },
            chat_webhook_url: non_empty("DISCORD_WEBHOOK_URL"),
            github: GitHub {
                token: token::resolve(GITHUB_TOKEN_VARS, &lookup),
                repository: non_empty("GITHUB_REPOSITORY"),
                api_url: trim_url(non_empty("GITHUB_API_URL"), DEFAULT_GITHUB_API_URL),
            },
        }
    }

    pub(crate) fn social_token(&self) -> Result<&str, Error> {
        self.social.token.as_deref().ok_or_else(|| Error::MissingSocialToken {
            tried: SOCIAL_TOKEN_VARS.iter().join(" or "),
        })
    }

    pub(crate) fn github_token(&self) -> Result<&str, Error> {
        self.github.token.as_deref().ok_or_else(|| Error::MissingGitHubToken {
            tried: GITHUB_TOKEN_VARS.iter().join(" or "),
        })
    }

    pub(crate) fn chat_webhook_url(&self) -> Result<&str, Error> {
        self.chat_webhook_url
            .as_deref()
            .ok_or(Error::MissingWebhook)
    }

    /// The repository GitHub commands operate on.
    pub(crate) fn repository(&self) -> Result<Repository, Error> {
        let remote = if self.github.repository.is_some() {
            None
        } else {
            repository::origin_url()
        };
        Ok(repository::resolve(
            self.github.repository.as_deref(),
            remote,
        )?)
    }
}

fn trim_url(value: Option<String>, default: &str) -> String {
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .trim_end_matches('/')
        .to_string()
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("No social network token found in {tried}")]
    #[diagnostic(
        code(config::missing_social_token),
        help("Set TWITTER_ACCESS_TOKEN to a user access token allowed to post and send direct messages.")
    )]
    MissingSocialToken { tried: String },
    #[error("No GitHub token found in {tried}")]
    #[diagnostic(
        code(config::missing_github_token),
        help("Set GITHUB_TOKEN (or GH_TOKEN) to a token with `actions` and `pull_requests` write access.")
    )]
    MissingGitHubToken { tried: String },
    #[error("No chat webhook configured")]
    #[diagnostic(
        code(config::missing_webhook),
        help("Set DISCORD_WEBHOOK_URL to the incoming webhook URL of the channel to notify.")
    )]
    MissingWebhook,
    #[error("No direct message recipient configured")]
    #[diagnostic(
        code(config::missing_recipient),
        help("Pass --recipient <handle> or set SOCIAL_DM_RECIPIENT.")
    )]
    MissingRecipient,
    #[error(transparent)]
    #[diagnostic(transparent)]
    Repository(#[from] repository::Error),
}
