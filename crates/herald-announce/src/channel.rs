use std::fmt::{self, Display};

use tracing::warn;

/// Where an announcement goes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Channel {
    /// A post everyone following the account can see.
    PublicPost,
    /// A private message to one account.
    DirectMessage { recipient: String },
    /// A message posted to a chat room through an incoming webhook.
    ChatWebhook,
}

impl Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicPost => f.write_str("a public post"),
            Self::DirectMessage { recipient } => write!(f, "a direct message to @{recipient}"),
            Self::ChatWebhook => f.write_str("a chat webhook notification"),
        }
    }
}

/// The social network modes a caller can ask for by name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelMode {
    Public,
    Dm,
}

impl ChannelMode {
    /// Parse a mode argument, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "dm" => Some(Self::Dm),
            _ => None,
        }
    }

    /// Pick the mode for an entry point.
    ///
    /// The requested mode is used only if it is recognized _and_ one the entry point allows.
    /// Anything else (including no request at all) falls back to the entry point's `default`.
    #[must_use]
    pub fn select(requested: Option<&str>, allowed: &[Self], default: Self) -> Self {
        let Some(requested) = requested else {
            return default;
        };
        match Self::parse(requested) {
            Some(mode) if allowed.contains(&mode) => mode,
            _ => {
                warn!("Unsupported mode {requested:?}, using {default} instead");
                default
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Dm => "dm",
        }
    }
}

impl Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
