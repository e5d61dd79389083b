//! Errors surfaced by a driving session and by the instance handle.

use std::fmt;

use thiserror::Error;

/// A producer failure, recorded in an instance's error slot.
///
/// The producer's own error is kept as-is; the variant only says where it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<E> {
    /// Calling the producer, or turning its result into a source, failed.
    Invocation(E),
    /// A pull failed: a synchronous `Err` or an asynchronous rejection.
    Pull(E),
}

impl<E> Failure<E> {
    /// The producer's error.
    pub fn get_ref(&self) -> &E {
        match self {
            Failure::Invocation(e) | Failure::Pull(e) => e,
        }
    }

    pub const fn is_invocation(&self) -> bool {
        matches!(self, Failure::Invocation(_))
    }

    pub const fn is_pull(&self) -> bool {
        matches!(self, Failure::Pull(_))
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Invocation(e) => write!(f, "producer invocation failed: {e}"),
            Failure::Pull(e) => write!(f, "pull failed: {e}"),
        }
    }
}

impl<E> std::error::Error for Failure<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.get_ref())
    }
}

/// Misuse of an instance handle.
#[derive(Debug, Error)]
pub enum Error {
    /// `activate` was called while a session was still sourcing or running.
    #[error("instance already has an active session")]
    AlreadyActive,

    /// There is no tokio runtime to spawn the driving loop on.
    #[error("no tokio runtime available to drive the session")]
    NoRuntime,

    /// The driving task panicked, usually inside the yield callback.
    #[error("driving task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_failure_display_names_the_stage() {
        assert_eq!(Failure::Invocation(Boom).to_string(), "producer invocation failed: boom");
        assert_eq!(Failure::Pull(Boom).to_string(), "pull failed: boom");
    }

    #[test]
    fn test_failure_source_is_producer_error() {
        let failure = Failure::Pull(Boom);
        let source = failure.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("boom"));
        assert!(failure.is_pull());
        assert!(!failure.is_invocation());
    }
}
