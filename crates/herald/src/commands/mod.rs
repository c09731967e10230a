use miette::Diagnostic;
use thiserror::Error;

use crate::{config, integrations};

pub(crate) mod announce;
pub(crate) mod auto_merge;
pub(crate) mod trigger;
pub(crate) mod wait;

#[derive(Debug, Error, Diagnostic)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Announce(#[from] announce::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    GitHub(#[from] integrations::github::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Wait(#[from] wait::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    AutoMerge(#[from] auto_merge::Error),
}
