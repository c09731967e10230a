//! Turn the outcome of a deployment into an announcement and hand it to whichever channel was
//! asked for, always coming back with a [`DispatchResult`].

mod channel;
mod dispatch;
pub mod format;
mod outcome;
mod payload;

pub use channel::{Channel, ChannelMode};
pub use dispatch::{Deliver, Delivery, DispatchResult, dispatch};
pub use outcome::{
    Builder as OutcomeBuilder, DEFAULT_FILE_PATH, DeploymentOutcome, MissingIdentifier,
    NO_CHANGE_SENTINEL, Status,
};
pub use payload::{
    AnnounceSettings, ChatMessage, Embed, EmbedField, Payload, SocialPost, render,
};
