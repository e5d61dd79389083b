/// Outcome of a single pull: either a value to forward or the end of the sequence.
///
/// `Step` plays the role of the `{ value, done }` pair of an iterator protocol. Sources
/// return `Step<T, ()>`; the driver forwards every `Yielded` value and stops on `Complete`.
///
/// # Examples
///
/// ```rust
/// use itermount::Step;
///
/// let pulled: Step<i32, ()> = Step::Yielded(42);
/// let finished: Step<i32, ()> = Step::Complete(());
///
/// assert_eq!(pulled.map_yielded(|x| x * 2), Step::Yielded(84));
/// assert!(finished.is_complete());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step<Y, D> {
    /// The source produced a value and can be pulled again
    Yielded(Y),
    /// The source is exhausted
    Complete(D),
}

impl<Y, D> Step<Y, D> {
    /// Returns `true` if the step is `Complete`.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Step::Complete(_))
    }

    /// Maps a `Step<Y, D>` to `Step<Y2, D>` by applying a function to the yielded value.
    #[inline]
    pub fn map_yielded<Y2, F>(self, f: F) -> Step<Y2, D>
    where
        F: FnOnce(Y) -> Y2,
    {
        match self {
            Step::Yielded(y) => Step::Yielded(f(y)),
            Step::Complete(d) => Step::Complete(d),
        }
    }
}

/// `Some(value)` is a yield, `None` is the end of the sequence.
impl<Y> From<Option<Y>> for Step<Y, ()> {
    #[inline]
    fn from(value: Option<Y>) -> Self {
        match value {
            Some(y) => Step::Yielded(y),
            None => Step::Complete(()),
        }
    }
}
