//! Classifying an iterable into one of the two cursor kinds.
//!
//! A producer returns anything implementing [`IntoSource`]. Converting it yields a
//! [`Source`], which is either a [`SyncPull`] or an [`AsyncPull`] cursor. The choice is made
//! once, from the type of the iterable, and the driving loop never asks again.

use futures::future::BoxFuture;

use crate::pull::{AsyncPull, SyncPull};
use crate::step::Step;

/// A live cursor over a producer's values, tagged by protocol.
pub enum Source<T, E> {
    /// Pulls complete immediately.
    Sync(Box<dyn SyncPull<T, E> + Send>),
    /// Pulls complete later.
    Async(Box<dyn AsyncPull<T, E> + Send>),
}

/// The answer to one [`Source::pull`].
pub enum Pull<'a, T, E> {
    /// A synchronous cursor answered on the spot.
    Ready(Result<Step<T, ()>, E>),
    /// An asynchronous cursor is still working; await the future for the answer.
    Pending(BoxFuture<'a, Result<Step<T, ()>, E>>),
}

impl<T, E> Source<T, E> {
    /// Wrap a synchronous cursor.
    pub fn from_sync<S>(cursor: S) -> Self
    where
        S: SyncPull<T, E> + Send + 'static,
    {
        Source::Sync(Box::new(cursor))
    }

    /// Wrap an asynchronous cursor.
    pub fn from_async<S>(cursor: S) -> Self
    where
        S: AsyncPull<T, E> + Send + 'static,
    {
        Source::Async(Box::new(cursor))
    }

    /// Returns `true` if pulls on this source suspend.
    pub const fn is_async(&self) -> bool {
        matches!(self, Source::Async(_))
    }

    /// Request the next value, threading `resume` through to the cursor.
    pub fn pull(&mut self, resume: Option<T>) -> Pull<'_, T, E> {
        match self {
            Source::Sync(cursor) => Pull::Ready(cursor.next(resume)),
            Source::Async(cursor) => Pull::Pending(cursor.next(resume)),
        }
    }
}

impl<T, E> std::fmt::Debug for Source<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Sync(_) => f.write_str("Source::Sync"),
            Source::Async(_) => f.write_str("Source::Async"),
        }
    }
}

/// Conversion from whatever a producer returns into a classified [`Source`].
///
/// Implemented for [`Source`] itself, for every adapter in [`build`](crate::build), for
/// `Vec<T>`, and for `Either` of two sources so a producer can choose per props.
///
/// ```rust
/// use itermount::*;
///
/// let listed: Source<i32, ()> = vec![1, 2].into_source();
/// assert!(!listed.is_async());
///
/// let streamed: Source<i32, ()> = stream(futures::stream::iter([1, 2])).into_source();
/// assert!(streamed.is_async());
/// ```
pub trait IntoSource<T, E> {
    fn into_source(self) -> Source<T, E>;
}

impl<T, E> IntoSource<T, E> for Source<T, E> {
    fn into_source(self) -> Source<T, E> {
        self
    }
}

impl<T, E> IntoSource<T, E> for Vec<T>
where
    T: Send + 'static,
{
    fn into_source(self) -> Source<T, E> {
        crate::build::iter(self).into_source()
    }
}

impl<T, E, L, R> IntoSource<T, E> for either::Either<L, R>
where
    L: IntoSource<T, E>,
    R: IntoSource<T, E>,
{
    fn into_source(self) -> Source<T, E> {
        match self {
            either::Either::Left(l) => l.into_source(),
            either::Either::Right(r) => r.into_source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{iter, stream};
    use either::Either;

    #[test]
    fn test_vec_classifies_as_sync_and_answers_immediately() {
        let mut source: Source<u8, ()> = vec![7_u8].into_source();
        assert!(!source.is_async());

        match source.pull(None) {
            Pull::Ready(Ok(step)) => assert_eq!(step, Step::Yielded(7)),
            _ => panic!("sync source must answer immediately"),
        }
        match source.pull(Some(7)) {
            Pull::Ready(Ok(step)) => assert!(step.is_complete()),
            _ => panic!("sync source must answer immediately"),
        }
    }

    #[tokio::test]
    async fn test_stream_classifies_as_async() {
        let mut source: Source<u8, ()> = stream(futures::stream::iter([1_u8])).into_source();
        assert!(source.is_async());

        match source.pull(None) {
            Pull::Pending(fut) => assert_eq!(fut.await, Ok(Step::Yielded(1))),
            Pull::Ready(_) => panic!("async source must hand back a future"),
        }
    }

    #[test]
    fn test_either_picks_variant_from_chosen_side() {
        let pick = |live: bool| -> Either<_, _> {
            if live {
                Either::Right(stream(futures::stream::iter(vec![1_u8])))
            } else {
                Either::Left(iter(vec![1_u8]))
            }
        };

        let fixed: Source<u8, ()> = pick(false).into_source();
        let live: Source<u8, ()> = pick(true).into_source();
        assert!(!fixed.is_async());
        assert!(live.is_async());
    }
}
