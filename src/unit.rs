//! Wrapping a producer into something a host can mount.
//!
//! [`create`] turns a producer function into a [`UnitFactory`]. The host instantiates the
//! factory with [`Props`], then drives the resulting [`Instance`] through its
//! [`Lifecycle`]: `activate` calls the producer and starts a background session over
//! what it returned, `deactivate` silences it.
//! Producer failures land in the instance's error slot, which the host reads through
//! [`Instance::render`], [`Instance::error`], or a [`subscribe`](Instance::subscribe)d
//! watch channel.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use itermount::prelude::*;
//!
//! fn greetings(name: &String) -> Result<Vec<String>, std::convert::Infallible> {
//!     Ok(vec![format!("hello {name}"), format!("bye {name}")])
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let factory = create(greetings);
//! assert_eq!(factory.display_name(), "AsyncIterator(greetings)");
//!
//! let mut instance = factory.instantiate(Props::new("ada".to_string()).on_yield({
//!     let seen = Arc::clone(&seen);
//!     move |line: &String| seen.lock().unwrap().push(line.clone())
//! }));
//! instance.activate().unwrap();
//! instance.settled().await.unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), ["hello ada", "bye ada"]);
//! assert!(instance.render().is_ok());
//! # });
//! ```

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Failure};
use crate::lifecycle::Lifecycle;
use crate::session::{Phase, Session, Status, StatusSender, tear_down};
use crate::source::{IntoSource, Source};

/// Type-erased producer: props in, classified source out.
type Producer<P, T, E> = Arc<dyn Fn(&P) -> Result<Source<T, E>, E> + Send + Sync + 'static>;

/// Callback invoked with every value a session forwards.
pub type OnYield<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// What a host hands to an instance: the producer's input plus the yield callback.
pub struct Props<P, T> {
    value: P,
    on_yield: OnYield<T>,
}

impl<P, T> Props<P, T> {
    /// Props with a callback that does nothing.
    pub fn new(value: P) -> Self {
        Self {
            value,
            on_yield: Arc::new(|_: &T| {}),
        }
    }

    /// Replace the yield callback.
    pub fn on_yield<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_yield = Arc::new(f);
        self
    }

    /// The producer's input.
    pub fn value(&self) -> &P {
        &self.value
    }

    pub(crate) fn forward(&self, value: &T) {
        (self.on_yield)(value)
    }
}

impl<P, T> From<P> for Props<P, T> {
    fn from(value: P) -> Self {
        Props::new(value)
    }
}

impl<P: Default, T> Default for Props<P, T> {
    fn default() -> Self {
        Props::new(P::default())
    }
}

impl<P: fmt::Debug, T> fmt::Debug for Props<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// Wrap a producer function into a mountable unit.
///
/// The producer is called once per activation, and nothing is pulled before that. A
/// producer returning `Err` fails the activation with [`Failure::Invocation`].
///
/// The unit's name is taken from the producer's type: a named function gives its own
/// name, anything else falls back to `fn`. Use [`UnitFactory::named`] to override.
pub fn create<P, T, E, S, F>(producer: F) -> UnitFactory<P, T, E>
where
    F: Fn(&P) -> Result<S, E> + Send + Sync + 'static,
    S: IntoSource<T, E> + 'static,
    P: 'static,
    T: 'static,
    E: 'static,
{
    let name = producer_name::<F>();
    UnitFactory {
        producer: Arc::new(move |props: &P| -> Result<Source<T, E>, E> {
            producer(props).map(<S as IntoSource<T, E>>::into_source)
        }),
        name: Arc::from(name),
        runtime: None,
    }
}

/// Best-effort human name of a producer type.
fn producer_name<F>() -> &'static str {
    let path = std::any::type_name::<F>();
    if path.starts_with("fn(") || path.starts_with("for<") || path.contains("{{closure}}") {
        return "fn";
    }
    let path = path.split_once('<').map_or(path, |(head, _)| head);
    match path.rsplit("::").next() {
        Some(name) if !name.is_empty() && !name.starts_with('{') => name,
        _ => "fn",
    }
}

/// A producer ready to be instantiated by a host.
pub struct UnitFactory<P, T, E> {
    producer: Producer<P, T, E>,
    name: Arc<str>,
    runtime: Option<Handle>,
}

impl<P, T, E> UnitFactory<P, T, E> {
    /// Override the name used in [`display_name`](Self::display_name).
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Spawn sessions on `runtime` instead of the ambient one.
    pub fn on_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `AsyncIterator(<name>)`, for diagnostics.
    pub fn display_name(&self) -> String {
        format!("AsyncIterator({})", self.name)
    }

    /// Create an instance holding `props`. Does not start anything.
    pub fn instantiate(&self, props: impl Into<Props<P, T>>) -> Instance<P, T, E> {
        let (status, _) = watch::channel(Status::default());
        Instance {
            producer: Arc::clone(&self.producer),
            label: Arc::from(self.display_name()),
            runtime: self.runtime.clone(),
            props: Arc::new(props.into()),
            status: Arc::new(status),
            session: None,
        }
    }
}

impl<P, T, E> Clone for UnitFactory<P, T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            name: Arc::clone(&self.name),
            runtime: self.runtime.clone(),
        }
    }
}

impl<P, T, E> fmt::Display for UnitFactory<P, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AsyncIterator({})", self.name)
    }
}

impl<P, T, E> fmt::Debug for UnitFactory<P, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

struct ActiveSession {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

/// One mounted unit.
///
/// Dropping an instance deactivates it.
pub struct Instance<P, T, E> {
    producer: Producer<P, T, E>,
    label: Arc<str>,
    runtime: Option<Handle>,
    props: Arc<Props<P, T>>,
    status: StatusSender<E>,
    session: Option<ActiveSession>,
}

impl<P, T, E> Instance<P, T, E> {
    pub fn display_name(&self) -> &str {
        &self.label
    }

    /// The current props; a running session may still be using an older snapshot.
    pub fn props(&self) -> &Props<P, T> {
        &self.props
    }

    /// Replace the props. Takes effect at the next activation.
    pub fn set_props(&mut self, props: impl Into<Props<P, T>>) {
        self.props = Arc::new(props.into());
    }

    pub fn phase(&self) -> Phase {
        self.status.borrow().phase
    }

    /// The current error slot.
    pub fn error(&self) -> Option<Arc<Failure<E>>> {
        self.status.borrow().error.clone()
    }

    /// Re-raise a recorded failure, for hosts that surface errors from their render path.
    pub fn render(&self) -> Result<(), Arc<Failure<E>>> {
        match self.error() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    /// Returns `true` if the error slot differs from `rendered`, the error the host last
    /// rendered. Nothing else about the instance warrants a re-render.
    pub fn should_update(&self, rendered: Option<&Arc<Failure<E>>>) -> bool {
        let status = self.status.borrow();
        match (status.error.as_ref(), rendered) {
            (None, None) => false,
            (Some(current), Some(rendered)) => !Arc::ptr_eq(current, rendered),
            _ => true,
        }
    }

    /// Watch the instance status. Receivers are woken only when the error slot changes.
    pub fn subscribe(&self) -> watch::Receiver<Status<E>> {
        self.status.subscribe()
    }

    /// Wait for the current session's loop to exit.
    ///
    /// Returns immediately if no session was ever started or it was already awaited.
    pub async fn settled(&mut self) -> Result<(), Error> {
        let task = self.session.as_mut().and_then(|session| session.task.take());
        match task {
            Some(task) => Ok(task.await?),
            None => Ok(()),
        }
    }

    fn tear_down(&self) {
        if let Some(session) = &self.session {
            tear_down(&self.status, &session.token);
        }
    }
}

impl<P, T, E> Lifecycle for Instance<P, T, E>
where
    P: Send + Sync + 'static,
    T: Send + 'static,
    E: Send + Sync + 'static,
{
    type Error = Error;

    fn activate(&mut self) -> Result<(), Error> {
        if self.phase().is_live() {
            return Err(Error::AlreadyActive);
        }
        let runtime = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or(Error::NoRuntime)?;

        if let Some(previous) = self.session.take() {
            previous.token.cancel();
        }

        // a fresh session starts with an empty error slot
        self.status.send_if_modified(|status| {
            status.phase = Phase::Sourcing;
            status.error.take().is_some()
        });

        let token = CancellationToken::new();
        let props = Arc::clone(&self.props);
        let source = match (self.producer)(props.value()) {
            Ok(source) => source,
            Err(e) => {
                tracing::debug!(unit = %self.label, "producer invocation failed");
                self.status.send_modify(|status| {
                    status.phase = Phase::Errored;
                    status.error = Some(Arc::new(Failure::Invocation(e)));
                });
                self.session = Some(ActiveSession { token, task: None });
                return Ok(());
            }
        };
        self.status.send_if_modified(|status| {
            status.phase = Phase::Running;
            false
        });
        tracing::debug!(unit = %self.label, is_async = source.is_async(), "activated");

        let session = Session {
            source,
            props,
            token: token.clone(),
            status: Arc::clone(&self.status),
            label: Arc::clone(&self.label),
        };
        self.session = Some(ActiveSession {
            token,
            task: Some(session.spawn(&runtime)),
        });
        Ok(())
    }

    fn deactivate(&mut self) {
        tracing::debug!(unit = %self.label, "deactivated");
        self.tear_down();
    }
}

impl<P, T, E> Drop for Instance<P, T, E> {
    fn drop(&mut self) {
        self.tear_down();
    }
}

impl<P, T, E> fmt::Debug for Instance<P, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("label", &self.label)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
