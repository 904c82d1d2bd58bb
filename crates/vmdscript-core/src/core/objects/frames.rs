use super::molecule::Molecule;
use crate::core::host::backend::{HostBackend, HostError};
use std::ops::Range;
use tracing::debug;

/// View over the frames of a molecule.
pub struct Frames<'h, H: HostBackend + ?Sized> {
    molecule: Molecule<'h, H>,
}

impl<'h, H: HostBackend + ?Sized> Frames<'h, H> {
    pub fn new(molecule: Molecule<'h, H>) -> Self {
        Self { molecule }
    }

    pub fn molecule(&self) -> Molecule<'h, H> {
        self.molecule
    }

    pub fn len(&self) -> Result<usize, HostError> {
        self.molecule.host().num_frames(self.molecule.molid())
    }

    pub fn is_empty(&self) -> Result<bool, HostError> {
        Ok(self.len()? == 0)
    }

    /// Indices of all frames.
    pub fn iter(&self) -> Result<Range<usize>, HostError> {
        Ok(0..self.len()?)
    }

    /// Deletes one frame. Negative indices count from the end.
    pub fn delete(&self, index: isize) -> Result<(), HostError> {
        let len = self.len()?;
        let frame = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize)
        };
        let frame = frame.filter(|&f| f < len).ok_or_else(|| {
            HostError::InvalidArgument(format!("frame index {index} out of range for {len} frame(s)"))
        })?;
        self.delete_one(frame)
    }

    /// Deletes every `step`-th frame of `range`, clamped to the existing
    /// frames.
    ///
    /// Frames are deleted one at a time from the highest index down so that
    /// the remaining indices stay valid.
    pub fn delete_range(&self, range: Range<usize>, step: usize) -> Result<(), HostError> {
        if step == 0 {
            return Err(HostError::InvalidArgument(
                "frame step must be positive".to_string(),
            ));
        }
        let len = self.len()?;
        let end = range.end.min(len);
        let start = range.start.min(end);
        let frames: Vec<usize> = (start..end).step_by(step).collect();
        for frame in frames.into_iter().rev() {
            self.delete_one(frame)?;
        }
        Ok(())
    }

    /// Deletes all frames.
    pub fn clear(&self) -> Result<(), HostError> {
        self.delete_range(0..usize::MAX, 1)
    }

    /// Copies `frame` (the active frame when `None`) and moves the molecule
    /// to the copy.
    pub fn copy(&self, frame: Option<usize>) -> Result<(), HostError> {
        let molid = self.molecule.molid();
        let frame = match frame {
            Some(frame) => frame,
            None => self
                .molecule
                .frame()?
                .ok_or(HostError::NoFrames { molid })?,
        };
        self.molecule.host().duplicate_frame(molid, frame)
    }

    fn delete_one(&self, frame: usize) -> Result<(), HostError> {
        debug!("Deleting frame {}", frame);
        self.molecule
            .host()
            .delete_frame(self.molecule.molid(), frame)
    }
}
