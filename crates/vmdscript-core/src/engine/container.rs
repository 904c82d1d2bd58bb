use crate::core::host::backend::{HostBackend, HostError};
use crate::core::io::formats::FileFormat;
use crate::core::objects::molecule::{LoadOptions, Molecule};
use std::path::Path;
use tracing::trace;

/// Inclusive range of source frames requested for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl FrameWindow {
    /// Window of at most `size` frames, every `step`-th, starting at `offset`.
    pub fn at(offset: usize, step: usize, size: usize) -> Self {
        Self {
            start: offset,
            stop: offset + step * size - 1,
            step,
        }
    }

    /// Upper bound on the frames the window can load.
    pub fn capacity(&self) -> usize {
        (self.stop - self.start) / self.step + 1
    }
}

impl From<&FrameWindow> for LoadOptions {
    fn from(window: &FrameWindow) -> Self {
        LoadOptions {
            start: window.start,
            stop: Some(window.stop),
            step: window.step,
            wait: true,
            ..LoadOptions::default()
        }
    }
}

/// Something frames can be loaded into, analyzed in, and dropped from.
///
/// While an analysis runs the analyzer is the only writer: observers get a
/// shared reference and must not load or discard frames themselves.
pub trait FrameContainer {
    /// Appends the frames of `window` read from `source`.
    fn load_window(
        &self,
        source: &Path,
        format: Option<&FileFormat>,
        window: &FrameWindow,
    ) -> Result<(), HostError>;

    /// Number of frames currently held.
    fn resident_count(&self) -> Result<usize, HostError>;

    /// Drops every held frame.
    fn discard_resident(&self) -> Result<(), HostError>;

    fn set_current_frame(&self, index: usize) -> Result<(), HostError>;

    /// Checks that the container can be analyzed at all.
    fn validate(&self) -> Result<(), HostError> {
        Ok(())
    }
}

impl<C: FrameContainer + ?Sized> FrameContainer for &C {
    fn load_window(
        &self,
        source: &Path,
        format: Option<&FileFormat>,
        window: &FrameWindow,
    ) -> Result<(), HostError> {
        (**self).load_window(source, format, window)
    }

    fn resident_count(&self) -> Result<usize, HostError> {
        (**self).resident_count()
    }

    fn discard_resident(&self) -> Result<(), HostError> {
        (**self).discard_resident()
    }

    fn set_current_frame(&self, index: usize) -> Result<(), HostError> {
        (**self).set_current_frame(index)
    }

    fn validate(&self) -> Result<(), HostError> {
        (**self).validate()
    }
}

impl<H: HostBackend + ?Sized> FrameContainer for Molecule<'_, H> {
    fn load_window(
        &self,
        source: &Path,
        format: Option<&FileFormat>,
        window: &FrameWindow,
    ) -> Result<(), HostError> {
        let options = LoadOptions {
            format: format.cloned(),
            ..LoadOptions::from(window)
        };
        let appended = self.load(source, &options)?;
        trace!(molid = %self.molid(), appended, "Window loaded into molecule.");
        Ok(())
    }

    fn resident_count(&self) -> Result<usize, HostError> {
        self.frames().len()
    }

    fn discard_resident(&self) -> Result<(), HostError> {
        self.frames().clear()
    }

    fn set_current_frame(&self, index: usize) -> Result<(), HostError> {
        self.set_frame(index)
    }

    fn validate(&self) -> Result<(), HostError> {
        if self.exists() {
            Ok(())
        } else {
            Err(HostError::MoleculeNotFound(self.molid()))
        }
    }
}
