//! # Itermount: Driving Producers from a Host Lifecycle
//!
//! Mount a value producer (a synchronous iterator or an asynchronous stream) into an
//! object whose lifecycle belongs to someone else, forward every value to a callback, and
//! report producer failures back to the host.
//!
//! ## Core Traits
//!
//! - **[`SyncPull<T, E>`]**: Cursors that answer each pull immediately
//! - **[`AsyncPull<T, E>`]**: Cursors that answer each pull with a future
//! - **[`IntoSource<T, E>`]**: Anything a producer may return; decides which cursor kind it is
//! - **[`Lifecycle`]**: The mount/unmount hooks a host calls
//!
//! ## Key Features
//!
//! - **One pull at a time**: The next pull starts only after the previous value was forwarded
//! - **Resume values**: Each pull receives the value forwarded before it
//! - **Quiet teardown**: After `deactivate`, no callback fires and no error is recorded
//! - **Terminal errors**: The first failure is stored and ends the session
//!
//! ## Example
//!
//! ```
//! use itermount::*;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let factory = create(|limit: &u32| Ok::<_, std::io::Error>(iter(0..*limit)));
//! let mut instance = factory.instantiate(Props::new(3).on_yield(|n: &u32| println!("{n}")));
//!
//! instance.activate().unwrap();
//! instance.settled().await.unwrap();
//! assert_eq!(instance.phase(), Phase::Completed);
//! # });
//! ```
//!
//! ## Common Functions
//!
//! **Building Sources:**
//! - [`iter`] - Yield every item of an iterator
//! - [`try_iter`] - Yield `Ok` items, fail on the first `Err`
//! - [`from_fn`] - Synchronous generator that sees resume values
//! - [`stream`] - Yield every item of a stream
//! - [`try_stream`] - Yield `Ok` items of a stream, fail on the first `Err`
//! - [`from_async_fn`] - Asynchronous generator that sees resume values
//!
//! **Mounting:**
//! - [`create`] - Wrap a producer into a [`UnitFactory`]
//! - [`UnitFactory::instantiate`] - Create an [`Instance`] from [`Props`]

pub mod build;
mod error;
mod lifecycle;
pub mod prelude;
mod pull;
mod session;
mod source;
mod step;
mod unit;

pub use build::*;
pub use error::*;
pub use lifecycle::*;
pub use pull::*;
pub use session::{Phase, Status};
pub use source::*;
pub use step::*;
pub use unit::*;
