use super::container::FrameContainer;
use crate::core::host::backend::HostError;
use std::fmt;

/// Cursor over the frames of an analysis run.
///
/// `frame` counts analyzed frames across all windows and files, while
/// `chunk_frame` is the index of the current frame inside the resident window.
/// Both are `-1` until the first call to [`Step::advance`].
pub struct Step<'c, C: ?Sized> {
    container: &'c C,
    frame: isize,
    chunk_frame: isize,
}

impl<'c, C: FrameContainer + ?Sized> Step<'c, C> {
    pub fn new(container: &'c C) -> Self {
        Self {
            container,
            frame: -1,
            chunk_frame: -1,
        }
    }

    /// Global index of the current frame.
    pub fn frame(&self) -> isize {
        self.frame
    }

    /// Index of the current frame inside the loaded window.
    pub fn chunk_frame(&self) -> isize {
        self.chunk_frame
    }

    pub fn container(&self) -> &'c C {
        self.container
    }

    /// Resets the in-window cursor before a freshly loaded window.
    pub fn start_new_window(&mut self) {
        self.chunk_frame = -1;
    }

    /// Moves to the next frame and makes it the container's current frame.
    pub fn advance(&mut self) -> Result<(), HostError> {
        self.frame += 1;
        self.chunk_frame += 1;
        self.container.set_current_frame(self.chunk_frame as usize)
    }
}

impl<C: ?Sized> fmt::Display for Step<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}", self.frame)
    }
}

impl<C: ?Sized> fmt::Debug for Step<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("frame", &self.frame)
            .field("chunk_frame", &self.chunk_frame)
            .finish()
    }
}
