use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::LazyLock,
};

use miette::Diagnostic;
use regex::Regex;
use tracing::debug;

static GITHUB_REMOTE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // The pattern is a constant
    Regex::new(r"github\.com[:/]([^/\s]+)/([^/\s]+?)(?:\.git)?/?$").unwrap()
});

/// A GitHub repository, identified by its owner and name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Repository {
    pub(crate) owner: String,
    pub(crate) name: String,
}

impl Repository {
    /// Parse an SSH or HTTPS remote URL that points at github.com.
    pub(crate) fn from_remote(url: &str) -> Option<Self> {
        let captures = GITHUB_REMOTE.captures(url.trim())?;
        Some(Self {
            owner: captures[1].to_string(),
            name: captures[2].to_string(),
        })
    }
}

impl FromStr for Repository {
    type Err = Error;

    fn from_str(full_name: &str) -> Result<Self, Self::Err> {
        match full_name.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(Error::InvalidFullName(full_name.to_string())),
        }
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Work out which repository to talk to.
///
/// An explicit `owner/repo` (from `GITHUB_REPOSITORY`) wins, otherwise the remote URL is parsed.
pub(crate) fn resolve(full_name: Option<&str>, remote: Option<String>) -> Result<Repository, Error> {
    if let Some(full_name) = full_name.filter(|name| !name.trim().is_empty()) {
        return full_name.parse();
    }
    let remote = remote.ok_or(Error::NoRemote)?;
    Repository::from_remote(&remote).ok_or(Error::NotGitHub(remote))
}

/// The URL of the `origin` remote of the repo in the current directory, or its first remote if
/// there is no `origin`.
pub(crate) fn origin_url() -> Option<String> {
    let repo = git2::Repository::open_from_env().ok()?;
    let remote = match repo.find_remote("origin") {
        Ok(remote) => remote,
        Err(_) => {
            let remotes = repo.remotes().ok()?;
            let name = remotes.get(0)?;
            repo.find_remote(name).ok()?
        }
    };
    let url = remote.url().map(String::from);
    debug!("Found Git remote {url:?}");
    url
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("GITHUB_REPOSITORY is set to {0:?}, which is not in the form owner/repo")]
    #[diagnostic(
        code(config::repository::full_name),
        help("Set GITHUB_REPOSITORY to something like `octocat/hello-world`, or unset it to use the Git remote.")
    )]
    InvalidFullName(String),
    #[error("Could not determine the GitHub repository")]
    #[diagnostic(
        code(config::repository::no_remote),
        help("Run from inside a Git repository with a GitHub remote, or set GITHUB_REPOSITORY=owner/repo.")
    )]
    NoRemote,
    #[error("The Git remote {0} does not point at github.com")]
    #[diagnostic(
        code(config::repository::not_github),
        help("Set GITHUB_REPOSITORY=owner/repo to choose the repository explicitly.")
    )]
    NotGitHub(String),
}
