//! One activation-to-teardown run of the driving loop.
//!
//! A [`Session`] owns everything a run needs once the producer has been called: the
//! classified source, the props snapshot taken at activation, a cancellation token
//! standing in for the `active` flag, and a handle on the instance's status channel. The
//! loop pulls one value at a time, forwards it, and hands it back as the resume value of
//! the next pull.
//!
//! Every write to the status channel happens inside `send_if_modified`, and teardown
//! cancels the token inside the same lock, so a session that has been torn down can never
//! record an error or move its phase.

use std::pin::pin;
use std::sync::Arc;

use futures::future::{Either, select};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::Failure;
use crate::source::{Pull, Source};
use crate::step::Step;
use crate::unit::Props;

/// Where a session stands.
///
/// ```text
/// Idle --activate--> Sourcing --source obtained--> Running
/// Sourcing --producer fails--> Errored
/// Running --complete--> Completed
/// Running --pull fails--> Errored
/// Sourcing/Running --deactivate--> TornDown
/// Running --loop dies--> TornDown
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Never activated.
    #[default]
    Idle,
    /// Calling the producer.
    Sourcing,
    /// Pulling values.
    Running,
    /// The source ran out.
    Completed,
    /// The producer failed; the error slot is set.
    Errored,
    /// The host deactivated the instance first.
    TornDown,
}

impl Phase {
    /// Returns `true` while a driving loop may still act.
    pub const fn is_live(self) -> bool {
        matches!(self, Phase::Sourcing | Phase::Running)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Errored | Phase::TornDown)
    }
}

/// The externally visible state of an instance.
///
/// Subscribers are woken only when `error` changes; `phase` is kept current without
/// waking anyone.
#[derive(Debug)]
pub struct Status<E> {
    pub(crate) phase: Phase,
    pub(crate) error: Option<Arc<Failure<E>>>,
}

impl<E> Status<E> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The recorded producer failure, if any.
    pub fn error(&self) -> Option<&Arc<Failure<E>>> {
        self.error.as_ref()
    }
}

impl<E> Default for Status<E> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            error: None,
        }
    }
}

impl<E> Clone for Status<E> {
    fn clone(&self) -> Self {
        Self {
            phase: self.phase,
            error: self.error.clone(),
        }
    }
}

pub(crate) type StatusSender<E> = Arc<watch::Sender<Status<E>>>;

pub(crate) struct Session<P, T, E> {
    pub(crate) source: Source<T, E>,
    pub(crate) props: Arc<Props<P, T>>,
    pub(crate) token: CancellationToken,
    pub(crate) status: StatusSender<E>,
    pub(crate) label: Arc<str>,
}

impl<P, T, E> Session<P, T, E>
where
    P: Send + Sync + 'static,
    T: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Start the loop in the background; the caller does not wait for it.
    pub(crate) fn spawn(self, runtime: &Handle) -> JoinHandle<()> {
        let span = tracing::debug_span!("session", unit = %self.label);
        runtime.spawn(self.run().instrument(span))
    }

    async fn run(mut self) {
        let _exit = ExitGuard {
            status: &self.status,
            token: &self.token,
        };
        tracing::debug!(is_async = self.source.is_async(), "driving source");

        let mut resume = None;
        loop {
            if self.token.is_cancelled() {
                tracing::debug!("torn down");
                return;
            }

            let pulled = match self.source.pull(resume.take()) {
                Pull::Ready(result) => result,
                Pull::Pending(pending) => {
                    match select(pending, pin!(self.token.cancelled())).await {
                        Either::Left((result, _)) => result,
                        Either::Right(_) => {
                            tracing::debug!("torn down while suspended");
                            return;
                        }
                    }
                }
            };

            match pulled {
                Ok(Step::Yielded(value)) => {
                    // teardown may have landed while the pull was suspended
                    if self.token.is_cancelled() {
                        tracing::debug!("dropping value pulled after teardown");
                        return;
                    }
                    tracing::trace!("forwarding value");
                    self.props.forward(&value);
                    resume = Some(value);
                }
                Ok(Step::Complete(())) => {
                    if advance(&self.status, &self.token, Phase::Completed) {
                        tracing::debug!("source completed");
                    }
                    return;
                }
                Err(e) => {
                    fail(&self.status, &self.token, Failure::Pull(e));
                    return;
                }
            }
        }
    }
}

/// Moves a still-live phase to `TornDown` when the loop exits without reaching a terminal
/// one, e.g. because the yield callback panicked.
struct ExitGuard<'a, E> {
    status: &'a watch::Sender<Status<E>>,
    token: &'a CancellationToken,
}

impl<E> Drop for ExitGuard<'_, E> {
    fn drop(&mut self) {
        self.status.send_if_modified(|status| {
            if !self.token.is_cancelled() && status.phase.is_live() {
                tracing::debug!("driving loop exited while live");
                status.phase = Phase::TornDown;
            }
            self.token.cancel();
            false
        });
    }
}

/// Move to `phase` unless torn down. Never wakes subscribers.
fn advance<E>(
    status: &watch::Sender<Status<E>>,
    token: &CancellationToken,
    phase: Phase,
) -> bool {
    let mut moved = false;
    status.send_if_modified(|status| {
        if !token.is_cancelled() {
            status.phase = phase;
            moved = true;
        }
        false
    });
    moved
}

/// Record a terminal failure unless torn down.
fn fail<E>(
    status: &watch::Sender<Status<E>>,
    token: &CancellationToken,
    failure: Failure<E>,
) {
    let recorded = status.send_if_modified(|status| {
        if token.is_cancelled() {
            return false;
        }
        status.phase = Phase::Errored;
        status.error = Some(Arc::new(failure));
        true
    });

    if recorded {
        tracing::debug!("producer failed; error recorded");
    } else {
        tracing::debug!("discarding failure raised after teardown");
    }
}

/// Cancel `token` under the status lock and mark a live session torn down.
pub(crate) fn tear_down<E>(status: &watch::Sender<Status<E>>, token: &CancellationToken) {
    status.send_if_modified(|status| {
        token.cancel();
        if status.phase.is_live() {
            status.phase = Phase::TornDown;
        }
        false
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{from_fn, try_iter};
    use crate::source::IntoSource;
    use std::sync::Mutex;

    fn session_over(
        source: impl IntoSource<u32, &'static str>,
        props: Props<(), u32>,
    ) -> (Session<(), u32, &'static str>, watch::Receiver<Status<&'static str>>) {
        let (tx, rx) = watch::channel(Status {
            phase: Phase::Running,
            error: None,
        });
        let session = Session {
            source: source.into_source(),
            props: Arc::new(props),
            token: CancellationToken::new(),
            status: Arc::new(tx),
            label: Arc::from("AsyncIterator(test)"),
        };
        (session, rx)
    }

    #[test]
    fn test_phase_classification() {
        assert!(Phase::Running.is_live());
        assert!(Phase::Sourcing.is_live());
        assert!(!Phase::Idle.is_live());
        assert!(Phase::TornDown.is_terminal());
        assert!(!Phase::Idle.is_terminal());
    }

    #[tokio::test]
    async fn test_run_threads_resume_values_through_sync_generator() {
        let resumes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let generator = from_fn({
            let resumes = Arc::clone(&resumes);
            move |resume: Option<u32>| {
                resumes.lock().unwrap().push(resume);
                Ok::<_, &'static str>(match resume {
                    None => Step::Yielded(1),
                    Some(v) if v >= 8 => Step::Complete(()),
                    Some(v) => Step::Yielded(v * 2),
                })
            }
        });
        let props = Props::new(()).on_yield({
            let seen = Arc::clone(&seen);
            move |v: &u32| seen.lock().unwrap().push(*v)
        });
        let (session, rx) = session_over(generator, props);

        session.run().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 4, 8]);
        assert_eq!(
            *resumes.lock().unwrap(),
            vec![None, Some(1), Some(2), Some(4), Some(8)]
        );
        assert_eq!(rx.borrow().phase(), Phase::Completed);
        assert!(rx.borrow().error().is_none());
    }

    #[tokio::test]
    async fn test_run_records_sync_pull_error() {
        let (session, rx) = session_over(try_iter(vec![Ok(1), Err("bad"), Ok(3)]), Props::new(()));

        session.run().await;

        let status = rx.borrow();
        assert_eq!(status.phase(), Phase::Errored);
        assert_eq!(status.error().map(|e| **e == Failure::Pull("bad")), Some(true));
    }

    #[tokio::test]
    async fn test_cancelled_session_never_pulls() {
        let pulls = Arc::new(Mutex::new(0));
        let counted = from_fn({
            let pulls = Arc::clone(&pulls);
            move |_: Option<u32>| {
                *pulls.lock().unwrap() += 1;
                Ok::<_, &'static str>(Step::Yielded(1))
            }
        });
        let (session, rx) = session_over(counted, Props::new(()));

        tear_down(&session.status, &session.token);
        session.run().await;

        assert_eq!(*pulls.lock().unwrap(), 0);
        assert_eq!(rx.borrow().phase(), Phase::TornDown);
        assert!(rx.borrow().error().is_none());
    }

    #[test]
    fn test_exit_guard_leaves_running_when_loop_dies() {
        let (tx, rx) = watch::channel(Status::<&'static str> {
            phase: Phase::Running,
            error: None,
        });
        let token = CancellationToken::new();

        drop(ExitGuard {
            status: &tx,
            token: &token,
        });

        assert_eq!(rx.borrow().phase(), Phase::TornDown);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_exit_guard_keeps_terminal_phase() {
        let (tx, rx) = watch::channel(Status::<&'static str> {
            phase: Phase::Completed,
            error: None,
        });
        let token = CancellationToken::new();

        drop(ExitGuard {
            status: &tx,
            token: &token,
        });

        assert_eq!(rx.borrow().phase(), Phase::Completed);
    }
}
