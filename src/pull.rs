//! The two iterator protocols a producer can speak.
//!
//! A source is pulled one value at a time. Each pull may carry a resume value, which the
//! driver fills with the value it just forwarded, so generator-style producers can react to
//! their own output. Sources that do not care simply ignore it.
//!
//! - [`SyncPull`] answers a pull immediately.
//! - [`AsyncPull`] answers with a future; awaiting it is the driver's only suspension point.
//!
//! # Examples
//!
//! ```rust
//! use itermount::{Step, SyncPull};
//!
//! struct Countdown(u32);
//!
//! impl SyncPull<u32, ()> for Countdown {
//!     fn next(&mut self, _resume: Option<u32>) -> Result<Step<u32, ()>, ()> {
//!         if self.0 == 0 {
//!             return Ok(Step::Complete(()));
//!         }
//!         self.0 -= 1;
//!         Ok(Step::Yielded(self.0))
//!     }
//! }
//!
//! let mut countdown = Countdown(2);
//! assert_eq!(countdown.next(None), Ok(Step::Yielded(1)));
//! assert_eq!(countdown.next(Some(1)), Ok(Step::Yielded(0)));
//! assert_eq!(countdown.next(Some(0)), Ok(Step::Complete(())));
//! ```

use futures::future::BoxFuture;

use crate::step::Step;

/// A synchronous cursor: every pull completes before `next` returns.
pub trait SyncPull<T, E> {
    /// Request the next value, passing back the previously forwarded one.
    fn next(&mut self, resume: Option<T>) -> Result<Step<T, ()>, E>;
}

/// An asynchronous cursor: every pull is a suspended computation.
///
/// The returned future borrows the cursor, so at most one pull is in flight at a time.
pub trait AsyncPull<T, E> {
    /// Request the next value, passing back the previously forwarded one.
    fn next(&mut self, resume: Option<T>) -> BoxFuture<'_, Result<Step<T, ()>, E>>;
}

impl<T, E, S> SyncPull<T, E> for Box<S>
where
    S: SyncPull<T, E> + ?Sized,
{
    fn next(&mut self, resume: Option<T>) -> Result<Step<T, ()>, E> {
        (**self).next(resume)
    }
}

impl<T, E, S> AsyncPull<T, E> for Box<S>
where
    S: AsyncPull<T, E> + ?Sized,
{
    fn next(&mut self, resume: Option<T>) -> BoxFuture<'_, Result<Step<T, ()>, E>> {
        (**self).next(resume)
    }
}

impl<T, E, L, R> SyncPull<T, E> for either::Either<L, R>
where
    L: SyncPull<T, E>,
    R: SyncPull<T, E>,
{
    fn next(&mut self, resume: Option<T>) -> Result<Step<T, ()>, E> {
        match self {
            either::Either::Left(l) => l.next(resume),
            either::Either::Right(r) => r.next(resume),
        }
    }
}

impl<T, E, L, R> AsyncPull<T, E> for either::Either<L, R>
where
    L: AsyncPull<T, E>,
    R: AsyncPull<T, E>,
{
    fn next(&mut self, resume: Option<T>) -> BoxFuture<'_, Result<Step<T, ()>, E>> {
        match self {
            either::Either::Left(l) => l.next(resume),
            either::Either::Right(r) => r.next(resume),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use either::Either;

    struct Echo;

    impl SyncPull<u32, ()> for Echo {
        fn next(&mut self, resume: Option<u32>) -> Result<Step<u32, ()>, ()> {
            Ok(Step::Yielded(resume.map_or(0, |v| v + 1)))
        }
    }

    struct Stop;

    impl SyncPull<u32, ()> for Stop {
        fn next(&mut self, _resume: Option<u32>) -> Result<Step<u32, ()>, ()> {
            Ok(Step::Complete(()))
        }
    }

    #[test]
    fn test_either_dispatches_to_active_side() {
        let mut left: Either<Echo, Stop> = Either::Left(Echo);
        assert_eq!(left.next(Some(4)), Ok(Step::Yielded(5)));

        let mut right: Either<Echo, Stop> = Either::Right(Stop);
        assert_eq!(right.next(Some(4)), Ok(Step::Complete(())));
    }

    #[test]
    fn test_boxed_trait_object_forwards_resume() {
        let mut boxed: Box<dyn SyncPull<u32, ()> + Send> = Box::new(Echo);
        assert_eq!(boxed.next(None), Ok(Step::Yielded(0)));
        assert_eq!(boxed.next(Some(9)), Ok(Step::Yielded(10)));
    }
}
