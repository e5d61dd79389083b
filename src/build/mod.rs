//! Building sources from scratch
//!
//! This module provides functions and types for turning iterators, streams, and closures
//! into values a producer can return.

mod iter;
mod stream;

// Re-export building blocks
pub use iter::{FromFn, Iter, TryIter, from_fn, iter, try_iter};
pub use stream::{FromAsyncFn, FromStream, TryFromStream, from_async_fn, stream, try_stream};
