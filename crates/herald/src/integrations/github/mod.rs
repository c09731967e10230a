//! The slice of the GitHub REST (and GraphQL) API that `herald` needs.

use miette::Diagnostic;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Repository;

mod pulls;
mod workflows;

pub(crate) use pulls::MergeMethod;
pub(crate) use workflows::WorkflowRun;

/// A GitHub client bound to one repository.
pub(crate) struct GitHub {
    client: reqwest::Client,
    token: String,
    api_url: String,
    repository: Repository,
}

impl GitHub {
    pub(crate) fn new(token: &str, api_url: &str, repository: Repository) -> Result<Self, Error> {
        Ok(Self {
            client: super::http_client().map_err(Error::Client)?,
            token: token.to_string(),
            api_url: api_url.to_string(),
            repository,
        })
    }

    pub(crate) fn repository(&self) -> &Repository {
        &self.repository
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.client.get(self.repo_url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.client.post(self.repo_url(path)))
    }

    fn put(&self, path: &str) -> RequestBuilder {
        self.with_headers(self.client.put(self.repo_url(path)))
    }

    fn graphql(&self) -> RequestBuilder {
        self.with_headers(self.client.post(format!("{}/graphql", self.api_url)))
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    fn repo_url(&self, path: &str) -> String {
        let Repository { owner, name } = &self.repository;
        let url = format!("{}/repos/{owner}/{name}/{path}", self.api_url);
        debug!("API URL: {url}");
        url
    }
}

async fn send(request: RequestBuilder, activity: &'static str) -> Result<Response, Error> {
    let response = request
        .send()
        .await
        .map_err(|source| Error::Request { source, activity })?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("GitHub said: {body}");
    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized { activity },
        StatusCode::NOT_FOUND => Error::NotFound { activity },
        _ => Error::Status {
            status,
            activity,
            body,
        },
    })
}

async fn parse<T: DeserializeOwned>(response: Response, activity: &'static str) -> Result<T, Error> {
    response
        .json()
        .await
        .map_err(|source| Error::Response { source, activity })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Could not set up an HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Trouble communicating with GitHub while {activity}: {source}")]
    #[diagnostic(
        code(github::api_request_error),
        help(
            "There was a problem communicating with GitHub, this may be a network issue or a permissions issue."
        )
    )]
    Request {
        source: reqwest::Error,
        activity: &'static str,
    },
    #[error("GitHub rejected the token while {activity}")]
    #[diagnostic(
        code(github::unauthorized),
        help("Check that GITHUB_TOKEN (or GH_TOKEN) is set to a valid token that hasn't expired.")
    )]
    Unauthorized { activity: &'static str },
    #[error("GitHub could not find what was asked for while {activity}")]
    #[diagnostic(
        code(github::not_found),
        help(
            "Check the repository, workflow, and pull request names, and that the token can access the repository."
        )
    )]
    NotFound { activity: &'static str },
    #[error("GitHub responded with {status} while {activity}: {body}")]
    #[diagnostic(code(github::unexpected_status))]
    Status {
        status: StatusCode,
        activity: &'static str,
        body: String,
    },
    #[error("GitHub refused to merge pull request #{number}: {message}")]
    #[diagnostic(
        code(github::merge_conflict),
        help(
            "The pull request has conflicts or unmet requirements. Update it from its base branch, resolve any conflicts, and try again."
        )
    )]
    NotMergeable { number: u64, message: String },
    #[error("GitHub reported an error while {activity}: {message}")]
    #[diagnostic(code(github::graphql))]
    GraphQl {
        activity: &'static str,
        message: String,
    },
    #[error("Trouble decoding the response from GitHub while {activity}: {source}")]
    #[diagnostic(
        code(github::api_response_error),
        help("Failure to decode a response from GitHub is probably a bug.")
    )]
    Response {
        source: reqwest::Error,
        activity: &'static str,
    },
}
