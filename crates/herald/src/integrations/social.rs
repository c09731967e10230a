//! Public posts and direct messages through a Twitter-style v2 REST API.

use herald_announce::{Channel, Deliver, Delivery, Payload, SocialPost};
use itertools::Itertools;
use miette::Diagnostic;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use tracing::debug;

pub(crate) struct SocialClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

/// Every v2 response wraps its result in `data`, and reports soft failures in `errors`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<Problem>,
}

#[derive(Debug, Deserialize)]
struct Problem {
    detail: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DirectMessageEvent {
    dm_event_id: String,
}

impl SocialClient {
    pub(crate) fn new(token: &str, api_url: &str) -> Result<Self, Error> {
        Ok(Self {
            client: super::http_client().map_err(Error::Client)?,
            token: token.to_string(),
            api_url: api_url.to_string(),
        })
    }

    async fn post_public(&self, post: &SocialPost) -> Result<Delivery, Error> {
        let url = format!("{}/tweets", self.api_url);
        let envelope: Envelope<Post> = self
            .send(
                self.client.post(&url).json(&json!({ "text": post.text })),
                "publishing a post",
            )
            .await?;
        Ok(match envelope.data {
            Some(post) => Delivery::Delivered { id: Some(post.id) },
            None => Delivery::Rejected {
                reason: envelope.reason("the post was not published"),
            },
        })
    }

    async fn send_direct_message(
        &self,
        recipient: &str,
        post: &SocialPost,
    ) -> Result<Delivery, Error> {
        let url = format!("{}/users/by/username/{recipient}", self.api_url);
        let user: Envelope<User> = self
            .send(self.client.get(&url), "looking up the recipient")
            .await?;
        let Some(user) = user.data else {
            return Ok(Delivery::Rejected {
                reason: format!("no account named @{recipient}"),
            });
        };

        let url = format!(
            "{}/dm_conversations/with/{}/messages",
            self.api_url, user.id
        );
        let envelope: Envelope<DirectMessageEvent> = self
            .send(
                self.client.post(&url).json(&json!({ "text": post.text })),
                "sending a direct message",
            )
            .await?;
        Ok(match envelope.data {
            Some(event) => Delivery::Delivered {
                id: Some(event.dm_event_id),
            },
            None => Delivery::Rejected {
                reason: envelope.reason("the direct message was not sent"),
            },
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        activity: &'static str,
    ) -> Result<T, Error> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| Error::Request { source, activity })?;
        let response = ensure_success(response, activity).await?;
        response
            .json()
            .await
            .map_err(|source| Error::Response { source, activity })
    }
}

impl<T> Envelope<T> {
    fn reason(&self, fallback: &str) -> String {
        let reason = self
            .errors
            .iter()
            .filter_map(|problem| problem.detail.as_ref().or(problem.title.as_ref()))
            .join("; ");
        if reason.is_empty() {
            fallback.to_string()
        } else {
            reason
        }
    }
}

async fn ensure_success(response: Response, activity: &'static str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("Social network said: {body}");
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized { status, activity },
        _ => Error::Status {
            status,
            activity,
            body,
        },
    })
}

impl Deliver for SocialClient {
    type Error = Error;

    async fn deliver(&self, channel: &Channel, payload: &Payload) -> Result<Delivery, Error> {
        let Payload::Social(post) = payload else {
            return Err(Error::Unsupported(channel.to_string()));
        };
        match channel {
            Channel::PublicPost => self.post_public(post).await,
            Channel::DirectMessage { recipient } => self.send_direct_message(recipient, post).await,
            Channel::ChatWebhook => Err(Error::Unsupported(channel.to_string())),
        }
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Could not set up an HTTP client: {0}")]
    #[diagnostic(code(social::client))]
    Client(#[source] reqwest::Error),
    #[error("Trouble communicating with the social network while {activity}: {source}")]
    #[diagnostic(
        code(social::request),
        help("Check your network connection and TWITTER_API_URL.")
    )]
    Request {
        source: reqwest::Error,
        activity: &'static str,
    },
    #[error("The social network refused the token ({status}) while {activity}")]
    #[diagnostic(
        code(social::unauthorized),
        help(
            "Check that TWITTER_ACCESS_TOKEN (or TWITTER_BEARER_TOKEN) is valid, hasn't expired, and is allowed to post and send direct messages."
        )
    )]
    Unauthorized {
        status: StatusCode,
        activity: &'static str,
    },
    #[error("The social network responded with {status} while {activity}: {body}")]
    #[diagnostic(code(social::unexpected_status))]
    Status {
        status: StatusCode,
        activity: &'static str,
        body: String,
    },
    #[error("Trouble decoding the social network's response while {activity}: {source}")]
    #[diagnostic(
        code(social::response),
        help("Check that TWITTER_API_URL points at a v2 API.")
    )]
    Response {
        source: reqwest::Error,
        activity: &'static str,
    },
    #[error("The social network client cannot send {0}")]
    #[diagnostic(code(social::unsupported))]
    Unsupported(String),
}
