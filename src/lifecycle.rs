//! The hooks a host framework invokes on a mounted unit.

/// Mount/unmount signals delivered by the host.
///
/// The host calls [`activate`](Lifecycle::activate) once the unit is mounted and
/// [`deactivate`](Lifecycle::deactivate) when it is about to unmount. Calls for one
/// instance are expected to be serialized by the host.
pub trait Lifecycle {
    type Error;

    /// The unit is mounted: start driving. Returns as soon as the work is scheduled.
    fn activate(&mut self) -> Result<(), Self::Error>;

    /// The unit is unmounting: stop acting on anything the producer does from now on.
    fn deactivate(&mut self);
}

impl<L> Lifecycle for &mut L
where
    L: Lifecycle + ?Sized,
{
    type Error = L::Error;

    fn activate(&mut self) -> Result<(), Self::Error> {
        (**self).activate()
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}

impl<L> Lifecycle for Box<L>
where
    L: Lifecycle + ?Sized,
{
    type Error = L::Error;

    fn activate(&mut self) -> Result<(), Self::Error> {
        (**self).activate()
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}
