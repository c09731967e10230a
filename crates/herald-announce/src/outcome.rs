use std::fmt::{self, Display};

#[cfg(feature = "miette")]
use miette::Diagnostic;

/// A deployment hash equal to this means nothing changed, but people still want to hear about it.
pub const NO_CHANGE_SENTINEL: &str = "no-change";

/// Used when the caller doesn't say which file was deployed and has no fallback of its own.
pub const DEFAULT_FILE_PATH: &str = "hello-world.txt";

/// Everything known about a single deployment attempt.
///
/// Built once per invocation through [`DeploymentOutcome::builder`] and never modified afterward.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeploymentOutcome {
    status: Status,
    identifier_hash: String,
    file_path: String,
    transaction_id: Option<String>,
    file_size_bytes: u64,
    duration_ms: u64,
    is_no_change_event: bool,
}

impl DeploymentOutcome {
    #[must_use]
    pub fn builder(identifier_hash: impl Into<String>) -> Builder {
        Builder {
            identifier_hash: identifier_hash.into(),
            succeeded: true,
            file_path: None,
            fallback_file_path: DEFAULT_FILE_PATH.to_string(),
            transaction_id: None,
            file_size_bytes: 0,
            duration_ms: 0,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == Status::Success
    }

    /// The deployment hash, which doubles as the undername the deployment is published under.
    #[must_use]
    pub fn identifier_hash(&self) -> &str {
        &self.identifier_hash
    }

    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    #[must_use]
    pub fn file_size_bytes(&self) -> u64 {
        self.file_size_bytes
    }

    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    #[must_use]
    pub fn is_no_change_event(&self) -> bool {
        self.is_no_change_event
    }
}

/// Collects the pieces of a [`DeploymentOutcome`] from arguments and environment defaults.
#[derive(Clone, Debug)]
pub struct Builder {
    identifier_hash: String,
    succeeded: bool,
    file_path: Option<String>,
    fallback_file_path: String,
    transaction_id: Option<String>,
    file_size_bytes: u64,
    duration_ms: u64,
}

impl Builder {
    #[must_use]
    pub fn succeeded(mut self, succeeded: bool) -> Self {
        self.succeeded = succeeded;
        self
    }

    /// The deployed file. `None` (or an empty string) means "use the fallback".
    #[must_use]
    pub fn file_path(mut self, file_path: Option<String>) -> Self {
        self.file_path = file_path;
        self
    }

    /// Replace [`DEFAULT_FILE_PATH`] with a configured fallback.
    #[must_use]
    pub fn fallback_file_path(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_file_path = fallback.into();
        self
    }

    #[must_use]
    pub fn transaction_id(mut self, transaction_id: Option<String>) -> Self {
        self.transaction_id = transaction_id;
        self
    }

    #[must_use]
    pub fn file_size_bytes(mut self, file_size_bytes: u64) -> Self {
        self.file_size_bytes = file_size_bytes;
        self
    }

    #[must_use]
    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Finish the outcome.
    ///
    /// ## Errors
    ///
    /// If the identifier hash is empty or only whitespace.
    pub fn build(self) -> Result<DeploymentOutcome, MissingIdentifier> {
        let identifier_hash = self.identifier_hash.trim();
        if identifier_hash.is_empty() {
            return Err(MissingIdentifier);
        }
        let file_path = self
            .file_path
            .filter(|path| !path.trim().is_empty())
            .unwrap_or(self.fallback_file_path);
        Ok(DeploymentOutcome {
            status: if self.succeeded {
                Status::Success
            } else {
                Status::Failure
            },
            is_no_change_event: identifier_hash == NO_CHANGE_SENTINEL,
            identifier_hash: identifier_hash.to_string(),
            file_path,
            transaction_id: self.transaction_id.filter(|id| !id.is_empty()),
            file_size_bytes: self.file_size_bytes,
            duration_ms: self.duration_ms,
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("No deployment hash was provided")]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(outcome::missing_identifier),
        help("Pass the deployment (or commit) hash as the first argument.")
    )
)]
pub struct MissingIdentifier;

/// Whether the deployment worked. Every piece of rendered text for one outcome uses the same
/// glyph and wording.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Success,
    Failure,
}

impl Status {
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Failure => "❌",
        }
    }

    #[must_use]
    pub fn word(self) -> &'static str {
        match self {
            Self::Success => "succeeded",
            Self::Failure => "failed",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Success => "Deployment Succeeded",
            Self::Failure => "Deployment Failed",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.word())
    }
}
