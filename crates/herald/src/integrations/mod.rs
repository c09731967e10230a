use std::convert::Infallible;

use herald_announce::{Channel, Deliver, Delivery, Payload};
use tracing::info;

pub(crate) mod chat;
pub(crate) mod github;
pub(crate) mod social;

const USER_AGENT: &str = concat!("herald/", env!("CARGO_PKG_VERSION"));

fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}

/// Stands in for a real channel during `--dry-run`: says what it would send and pretends it
/// worked.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DryRun;

impl Deliver for DryRun {
    type Error = Infallible;

    async fn deliver(&self, channel: &Channel, payload: &Payload) -> Result<Delivery, Infallible> {
        info!("Would send {channel}:");
        match payload {
            Payload::Social(post) => {
                for line in post.text.lines() {
                    info!("\t{line}");
                }
            }
            Payload::Chat(message) => {
                let body = serde_json::to_string_pretty(message).unwrap_or_default();
                for line in body.lines() {
                    info!("\t{line}");
                }
            }
        }
        Ok(Delivery::Delivered { id: None })
    }
}
