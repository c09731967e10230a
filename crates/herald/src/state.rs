/// Whether a command should actually do its work, or only log what it would have done.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RunType<T> {
    /// A dry run: no network I/O, only log what would have been sent.
    DryRun(T),
    /// A real run.
    Real(T),
}

impl<T> RunType<T> {
    #[must_use]
    pub(crate) fn of<R>(&self, new_value: R) -> RunType<R> {
        match self {
            RunType::DryRun(_) => RunType::DryRun(new_value),
            RunType::Real(_) => RunType::Real(new_value),
        }
    }

    pub(crate) fn take(self) -> (RunType<()>, T) {
        match self {
            RunType::DryRun(inner) => (RunType::DryRun(()), inner),
            RunType::Real(inner) => (RunType::Real(()), inner),
        }
    }
}
