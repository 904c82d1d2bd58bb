use super::error::BoxError;
use super::step::Step;

/// Called once for every analyzed frame.
pub trait FrameObserver<C: ?Sized> {
    fn on_frame(&mut self, step: &Step<'_, C>) -> Result<(), BoxError>;
}

impl<C: ?Sized, F> FrameObserver<C> for F
where
    F: FnMut(&Step<'_, C>) -> Result<(), BoxError>,
{
    fn on_frame(&mut self, step: &Step<'_, C>) -> Result<(), BoxError> {
        self(step)
    }
}

/// Observer that hands a value of its own to the callback on every frame.
pub(crate) struct BoundObserver<T, F> {
    context: T,
    callback: F,
}

impl<T, F> BoundObserver<T, F> {
    pub(crate) fn new(context: T, callback: F) -> Self {
        Self { context, callback }
    }
}

impl<C: ?Sized, T, F> FrameObserver<C> for BoundObserver<T, F>
where
    F: FnMut(&Step<'_, C>, &mut T) -> Result<(), BoxError>,
{
    fn on_frame(&mut self, step: &Step<'_, C>) -> Result<(), BoxError> {
        (self.callback)(step, &mut self.context)
    }
}
