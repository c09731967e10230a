//! Notifications through a Discord-style incoming webhook.

use herald_announce::{Channel, Deliver, Delivery, Payload};
use miette::Diagnostic;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

pub(crate) struct ChatWebhook {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Message {
    id: Option<String>,
}

impl ChatWebhook {
    pub(crate) fn new(url: &str) -> Result<Self, Error> {
        Ok(Self {
            client: super::http_client().map_err(Error::Client)?,
            url: url.to_string(),
        })
    }
}

impl Deliver for ChatWebhook {
    type Error = Error;

    async fn deliver(&self, channel: &Channel, payload: &Payload) -> Result<Delivery, Error> {
        let (Channel::ChatWebhook, Payload::Chat(message)) = (channel, payload) else {
            return Err(Error::Unsupported(channel.to_string()));
        };

        // `wait=true` makes the webhook answer with the created message instead of an empty 204.
        let response = self
            .client
            .post(&self.url)
            .query(&[("wait", "true")])
            .json(message)
            .send()
            .await
            .map_err(Error::Request)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Request)?;
        match status {
            _ if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Err(Error::UnknownWebhook { status });
            }
            _ => return Err(Error::Status { status, body }),
        }
        debug!("Webhook said: {body}");

        let id = serde_json::from_str::<Message>(&body)
            .ok()
            .and_then(|message| message.id);
        Ok(Delivery::Delivered { id })
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("Could not set up an HTTP client: {0}")]
    #[diagnostic(code(chat::client))]
    Client(#[source] reqwest::Error),
    #[error("Trouble communicating with the chat webhook: {0}")]
    #[diagnostic(
        code(chat::request),
        help("Check your network connection and DISCORD_WEBHOOK_URL.")
    )]
    Request(#[source] reqwest::Error),
    #[error("The chat webhook refused the request ({status})")]
    #[diagnostic(
        code(chat::unknown_webhook),
        help(
            "The webhook was deleted or its token is wrong. Copy the webhook URL from the channel settings into DISCORD_WEBHOOK_URL again."
        )
    )]
    UnknownWebhook { status: StatusCode },
    #[error("The chat webhook responded with {status}: {body}")]
    #[diagnostic(code(chat::unexpected_status))]
    Status { status: StatusCode, body: String },
    #[error("The chat webhook cannot send {0}")]
    #[diagnostic(code(chat::unsupported))]
    Unsupported(String),
}
