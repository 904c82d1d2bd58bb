use nalgebra::Point3;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Per-atom data carried by a trajectory file alongside the coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomRecord {
    /// The atom name (e.g., "CA", "OW").
    pub name: String,
    /// The residue name, empty when the format has none.
    pub resname: String,
    /// The residue sequence number, `0` when the format has none.
    pub resid: isize,
    /// The chemical element symbol.
    pub element: String,
}

/// Source-frame range to be read from a trajectory file.
///
/// Both bounds are inclusive and expressed in source-frame coordinates; only
/// every `step`-th frame counted from `start` is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRange {
    pub start: usize,
    /// Last frame to consider, `None` for the end of the file.
    pub stop: Option<usize>,
    pub step: usize,
}

impl Default for LoadRange {
    fn default() -> Self {
        Self {
            start: 0,
            stop: None,
            step: 1,
        }
    }
}

impl LoadRange {
    pub fn new(start: usize, stop: Option<usize>, step: usize) -> Self {
        Self { start, stop, step }
    }

    /// Whether the source frame `index` is to be kept.
    pub fn selects(&self, index: usize) -> bool {
        index >= self.start
            && !self.is_past(index)
            && (index - self.start) % self.step.max(1) == 0
    }

    /// Whether the source frame `index` lies beyond the last requested frame.
    pub fn is_past(&self, index: usize) -> bool {
        self.stop.is_some_and(|stop| index > stop)
    }
}

/// Frames selected out of a trajectory file, together with its topology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryChunk {
    /// Atom records of the first frame in the file, even when that frame was
    /// not selected.
    pub atoms: Vec<AtomRecord>,
    /// Bonds as pairs of zero-based atom indices.
    pub bonds: Vec<(usize, usize)>,
    /// Coordinates of each selected frame, in file order.
    pub frames: Vec<Vec<Point3<f64>>>,
}

impl TrajectoryChunk {
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }
}

/// Defines the interface for reading multi-frame coordinate files.
///
/// Readers stream the file: frames outside the requested [`LoadRange`] are
/// scanned but their coordinates are never kept, and reading stops as soon as
/// the range is exhausted, so memory use is bounded by the selected frames.
pub trait TrajectoryFile {
    /// The error type for read operations.
    type Error: Error + From<io::Error> + Send + Sync + 'static;

    /// Reads the frames selected by `range` from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_frames(
        reader: &mut impl BufRead,
        range: &LoadRange,
    ) -> Result<TrajectoryChunk, Self::Error>;

    /// Reads the frames selected by `range` from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_frames_from_path<P: AsRef<Path>>(
        path: P,
        range: &LoadRange,
    ) -> Result<TrajectoryChunk, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_frames(&mut reader, range)
    }
}
