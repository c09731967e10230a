use std::fmt::{self, Display};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{Error, GitHub, parse, send};

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PullRequest {
    pub(crate) number: u64,
    /// The GraphQL ID, needed to take a pull request out of draft.
    pub(crate) node_id: String,
    /// `open` or `closed`
    pub(crate) state: String,
    #[serde(default)]
    pub(crate) draft: bool,
    #[serde(default)]
    pub(crate) merged: bool,
    pub(crate) html_url: String,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MergeMethod {
    Merge,
    #[default]
    Squash,
    Rebase,
}

impl Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Merge => "merge",
            Self::Squash => "squash",
            Self::Rebase => "rebase",
        })
    }
}

#[derive(Debug, Deserialize)]
struct MergeResult {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

const MARK_READY_MUTATION: &str = r"
mutation($id: ID!) {
  markPullRequestReadyForReview(input: { pullRequestId: $id }) {
    pullRequest { isDraft }
  }
}
";

impl GitHub {
    pub(crate) async fn get_pull(&self, number: u64) -> Result<PullRequest, Error> {
        let activity = "fetching the pull request";
        let response = send(self.get(&format!("pulls/{number}")), activity).await?;
        parse(response, activity).await
    }

    /// Take a pull request out of draft. The REST API can't do this, only GraphQL.
    pub(crate) async fn mark_ready_for_review(&self, node_id: &str) -> Result<(), Error> {
        let activity = "marking the pull request ready for review";
        let response = send(
            self.graphql().json(&json!({
                "query": MARK_READY_MUTATION,
                "variables": { "id": node_id },
            })),
            activity,
        )
        .await?;
        let response: GraphQlResponse = parse(response, activity).await?;
        if response.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::GraphQl {
                activity,
                message: response
                    .errors
                    .into_iter()
                    .map(|error| error.message)
                    .collect::<Vec<_>>()
                    .join("; "),
            })
        }
    }

    /// Merge the pull request, returning the SHA of the resulting commit.
    pub(crate) async fn merge_pull(&self, number: u64, method: MergeMethod) -> Result<String, Error> {
        let activity = "merging the pull request";
        let result = send(
            self.put(&format!("pulls/{number}/merge"))
                .json(&json!({ "merge_method": method })),
            activity,
        )
        .await;
        let response = match result {
            Ok(response) => response,
            // 405: not mergeable (conflicts, failing checks), 409: head changed underneath us
            Err(Error::Status {
                status: StatusCode::METHOD_NOT_ALLOWED | StatusCode::CONFLICT,
                body,
                ..
            }) => {
                return Err(Error::NotMergeable {
                    number,
                    message: api_message(&body),
                });
            }
            Err(err) => return Err(err),
        };
        let merged: MergeResult = parse(response, activity).await?;
        debug!("Merged pull request #{number} as {}", merged.sha);
        Ok(merged.sha)
    }
}

/// GitHub error bodies look like `{"message": "..."}`; fall back to the raw body.
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiMessage {
        message: String,
    }

    serde_json::from_str::<ApiMessage>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.to_string())
}
