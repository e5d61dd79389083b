use std::future::Future;
use std::pin::Pin;

use futures::future::BoxFuture;
use futures::stream::{Stream, StreamExt};

use crate::{AsyncPull, IntoSource, Source, Step};

/// Yields every item of a stream, then completes.
///
/// Never fails and ignores resume values.
pub struct FromStream<S>(Pin<Box<S>>);

/// Create an asynchronous source from a stream.
///
/// ```rust
/// use itermount::*;
///
/// let source: Source<u8, ()> = stream(futures::stream::iter([1, 2, 3])).into_source();
/// assert!(source.is_async());
/// ```
pub fn stream<S: Stream>(stream: S) -> FromStream<S> {
    FromStream(Box::pin(stream))
}

impl<T, E, S> AsyncPull<T, E> for FromStream<S>
where
    S: Stream<Item = T> + Send,
    T: Send + 'static,
    E: Send + 'static,
{
    fn next(&mut self, _resume: Option<T>) -> BoxFuture<'_, Result<Step<T, ()>, E>> {
        Box::pin(async move { Ok(self.0.next().await.into()) })
    }
}

impl<T, E, S> IntoSource<T, E> for FromStream<S>
where
    S: Stream<Item = T> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn into_source(self) -> Source<T, E> {
        Source::from_async(self)
    }
}

/// Yields the `Ok` items of a stream; the first `Err` fails the pull.
pub struct TryFromStream<S>(Pin<Box<S>>);

/// Create an asynchronous source from a stream of results.
pub fn try_stream<T, E, S>(stream: S) -> TryFromStream<S>
where
    S: Stream<Item = Result<T, E>>,
{
    TryFromStream(Box::pin(stream))
}

impl<T, E, S> AsyncPull<T, E> for TryFromStream<S>
where
    S: Stream<Item = Result<T, E>> + Send,
    T: Send + 'static,
    E: Send + 'static,
{
    fn next(&mut self, _resume: Option<T>) -> BoxFuture<'_, Result<Step<T, ()>, E>> {
        Box::pin(async move { self.0.next().await.transpose().map(Step::from) })
    }
}

impl<T, E, S> IntoSource<T, E> for TryFromStream<S>
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn into_source(self) -> Source<T, E> {
        Source::from_async(self)
    }
}

/// An asynchronous generator built from a closure returning futures.
pub struct FromAsyncFn<F>(F);

/// Create an asynchronous source from a closure that sees each resume value.
///
/// Each call starts one pull; the driver awaits it before calling again.
///
/// ```rust
/// use itermount::*;
///
/// let ticks = from_async_fn(|resume: Option<u32>| async move {
///     match resume {
///         Some(3) => Ok::<_, ()>(Step::Complete(())),
///         Some(n) => Ok(Step::Yielded(n + 1)),
///         None => Ok(Step::Yielded(1)),
///     }
/// });
/// let source: Source<u32, ()> = ticks.into_source();
/// assert!(source.is_async());
/// ```
pub fn from_async_fn<F>(f: F) -> FromAsyncFn<F> {
    FromAsyncFn(f)
}

impl<T, E, F, Fut> AsyncPull<T, E> for FromAsyncFn<F>
where
    F: FnMut(Option<T>) -> Fut,
    Fut: Future<Output = Result<Step<T, ()>, E>> + Send + 'static,
{
    fn next(&mut self, resume: Option<T>) -> BoxFuture<'_, Result<Step<T, ()>, E>> {
        Box::pin((self.0)(resume))
    }
}

impl<T, E, F, Fut> IntoSource<T, E> for FromAsyncFn<F>
where
    F: FnMut(Option<T>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Step<T, ()>, E>> + Send + 'static,
{
    fn into_source(self) -> Source<T, E> {
        Source::from_async(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_completes_after_last_item() {
        let mut numbers = stream(futures::stream::iter(vec![1_u8, 2]));
        assert_eq!(AsyncPull::<u8, ()>::next(&mut numbers, None).await, Ok(Step::Yielded(1)));
        assert_eq!(AsyncPull::<u8, ()>::next(&mut numbers, Some(1)).await, Ok(Step::Yielded(2)));
        assert_eq!(AsyncPull::<u8, ()>::next(&mut numbers, Some(2)).await, Ok(Step::Complete(())));
    }

    #[tokio::test]
    async fn test_try_stream_rejects_on_err_item() {
        let mut items = try_stream(futures::stream::iter(vec![Ok(1_u8), Err("boom")]));
        assert_eq!(items.next(None).await, Ok(Step::Yielded(1)));
        assert_eq!(items.next(Some(1)).await, Err("boom"));
    }

    #[tokio::test]
    async fn test_from_async_fn_receives_resume_value() {
        let mut echo = from_async_fn(|resume: Option<u32>| async move {
            Ok::<_, ()>(Step::Yielded(resume.map_or(10, |v| v * 10)))
        });
        assert_eq!(echo.next(None).await, Ok(Step::Yielded(10)));
        assert_eq!(echo.next(Some(10)).await, Ok(Step::Yielded(100)));
    }
}
