use crate::{IntoSource, Source, Step, SyncPull};

/// Yields every item of an iterator, then completes.
///
/// Never fails and ignores resume values.
pub struct Iter<I>(I);

/// Create a synchronous source from anything iterable.
///
/// ```rust
/// use itermount::*;
///
/// let mut letters = iter(['a', 'b']);
/// assert_eq!(SyncPull::<char, ()>::next(&mut letters, None), Ok(Step::Yielded('a')));
/// assert_eq!(SyncPull::<char, ()>::next(&mut letters, Some('a')), Ok(Step::Yielded('b')));
/// assert_eq!(SyncPull::<char, ()>::next(&mut letters, Some('b')), Ok(Step::Complete(())));
/// ```
pub fn iter<I: IntoIterator>(items: I) -> Iter<I::IntoIter> {
    Iter(items.into_iter())
}

impl<T, E, I> SyncPull<T, E> for Iter<I>
where
    I: Iterator<Item = T>,
{
    fn next(&mut self, _resume: Option<T>) -> Result<Step<T, ()>, E> {
        Ok(self.0.next().into())
    }
}

impl<T, E, I> IntoSource<T, E> for Iter<I>
where
    I: Iterator<Item = T> + Send + 'static,
{
    fn into_source(self) -> Source<T, E> {
        Source::from_sync(self)
    }
}

/// Yields the `Ok` items of an iterator; the first `Err` fails the pull.
pub struct TryIter<I>(I);

/// Create a synchronous source from an iterator of results.
pub fn try_iter<T, E, I>(items: I) -> TryIter<I::IntoIter>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    TryIter(items.into_iter())
}

impl<T, E, I> SyncPull<T, E> for TryIter<I>
where
    I: Iterator<Item = Result<T, E>>,
{
    fn next(&mut self, _resume: Option<T>) -> Result<Step<T, ()>, E> {
        self.0.next().transpose().map(Step::from)
    }
}

impl<T, E, I> IntoSource<T, E> for TryIter<I>
where
    I: Iterator<Item = Result<T, E>> + Send + 'static,
{
    fn into_source(self) -> Source<T, E> {
        Source::from_sync(self)
    }
}

/// A synchronous generator built from a closure.
pub struct FromFn<F>(F);

/// Create a synchronous source from a closure that sees each resume value.
///
/// The closure receives `None` on the first pull and the previously forwarded value after
/// that.
///
/// ```rust
/// use itermount::*;
///
/// // Doubles whatever it produced last, stopping past 10.
/// let mut doubling = from_fn(|resume: Option<u32>| -> Result<Step<u32, ()>, ()> {
///     match resume {
///         None => Ok(Step::Yielded(1)),
///         Some(v) if v * 2 > 10 => Ok(Step::Complete(())),
///         Some(v) => Ok(Step::Yielded(v * 2)),
///     }
/// });
/// assert_eq!(doubling.next(None), Ok(Step::Yielded(1)));
/// assert_eq!(doubling.next(Some(4)), Ok(Step::Yielded(8)));
/// assert_eq!(doubling.next(Some(8)), Ok(Step::Complete(())));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn(f)
}

impl<T, E, F> SyncPull<T, E> for FromFn<F>
where
    F: FnMut(Option<T>) -> Result<Step<T, ()>, E>,
{
    fn next(&mut self, resume: Option<T>) -> Result<Step<T, ()>, E> {
        (self.0)(resume)
    }
}

impl<T, E, F> IntoSource<T, E> for FromFn<F>
where
    F: FnMut(Option<T>) -> Result<Step<T, ()>, E> + Send + 'static,
{
    fn into_source(self) -> Source<T, E> {
        Source::from_sync(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_ignores_resume_values() {
        let mut numbers = iter(vec![1, 2]);
        assert_eq!(SyncPull::<i32, ()>::next(&mut numbers, Some(100)), Ok(Step::Yielded(1)));
        assert_eq!(SyncPull::<i32, ()>::next(&mut numbers, Some(100)), Ok(Step::Yielded(2)));
        assert_eq!(SyncPull::<i32, ()>::next(&mut numbers, Some(100)), Ok(Step::Complete(())));
    }

    #[test]
    fn test_try_iter_surfaces_first_error() {
        let mut items = try_iter(vec![Ok(1), Err("bad"), Ok(3)]);
        assert_eq!(items.next(None), Ok(Step::Yielded(1)));
        assert_eq!(items.next(Some(1)), Err("bad"));
    }

    #[test]
    fn test_from_fn_threads_resume_value() {
        let mut seen = Vec::new();
        let mut counter = from_fn(|resume: Option<u32>| -> Result<Step<u32, ()>, ()> {
            seen.push(resume);
            Ok(Step::Yielded(resume.unwrap_or(0) + 1))
        });

        assert_eq!(counter.next(None), Ok(Step::Yielded(1)));
        assert_eq!(counter.next(Some(1)), Ok(Step::Yielded(2)));
        drop(counter);
        assert_eq!(seen, vec![None, Some(1)]);
    }
}
