use std::fmt::Display;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{AnnounceSettings, Channel, DeploymentOutcome, Payload, render};

/// What a channel did with a payload it successfully received.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Delivery {
    /// The channel accepted the payload. `id` is whatever the channel calls the message, if it
    /// said.
    Delivered { id: Option<String> },
    /// The channel answered, but refused the payload.
    Rejected { reason: String },
}

/// Something that can carry a rendered [`Payload`] to a [`Channel`].
///
/// Implementations return `Err` only for transport faults (the request never got a usable
/// answer). A channel that answers "no" returns [`Delivery::Rejected`] instead.
#[allow(async_fn_in_trait)]
pub trait Deliver {
    type Error: Display;

    async fn deliver(&self, channel: &Channel, payload: &Payload)
    -> Result<Delivery, Self::Error>;
}

/// The uniform report of one dispatch, whatever channel it went to.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    /// Set when the transport failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the channel rejected the payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DispatchResult {
    #[must_use]
    pub fn delivered(recipient: Option<String>, deployment_url: Option<String>) -> Self {
        Self {
            success: true,
            recipient,
            deployment_url,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            error: Some(if error.trim().is_empty() {
                String::from("unknown transport failure")
            } else {
                error
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Render `outcome` for `channel`, hand it to `courier` once, and report what happened.
///
/// Never fails: transport faults become [`DispatchResult::failed`] and rejections are passed
/// through with the channel's reason intact. Calling this twice posts twice.
pub async fn dispatch<C: Deliver>(
    outcome: &DeploymentOutcome,
    channel: &Channel,
    settings: &AnnounceSettings,
    courier: &C,
) -> DispatchResult {
    let payload = render(outcome, channel, settings);
    debug!("Dispatching {channel} for {}", outcome.identifier_hash());

    match courier.deliver(channel, &payload).await {
        Ok(Delivery::Delivered { id }) => {
            if let Some(id) = id {
                info!("Delivered {channel} (id {id})");
            }
            let recipient = match channel {
                Channel::DirectMessage { recipient } => Some(recipient.clone()),
                Channel::PublicPost | Channel::ChatWebhook => None,
            };
            let deployment_url = match &payload {
                Payload::Chat(message) => message.deployment_url().map(String::from),
                Payload::Social(_) => None,
            };
            DispatchResult::delivered(recipient, deployment_url)
        }
        Ok(Delivery::Rejected { reason }) => {
            warn!("{channel} was rejected: {reason}");
            DispatchResult::rejected(reason)
        }
        Err(err) => {
            warn!("Could not deliver {channel}: {err}");
            DispatchResult::failed(err.to_string())
        }
    }
}
