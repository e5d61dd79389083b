//! Commonly used imports
//!
//! Use `use itermount::prelude::*;` for quick access to the most common types and functions.

// Core types
pub use crate::{Failure, IntoSource, Lifecycle, Phase, Source, Step};

// Most common constructors
pub use crate::build::{from_async_fn, from_fn, iter, stream, try_iter, try_stream};

// Mounting
pub use crate::unit::{Instance, Props, UnitFactory, create};
