use crate::core::io::formats::FileFormat;
use crate::core::io::traits::{AtomRecord, LoadRange};
use crate::core::select::SelectionParseError;
use nalgebra::Point3;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Handle of a molecule managed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MolId(pub usize);

impl fmt::Display for MolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Molecule {0} does not exist")]
    MoleculeNotFound(MolId),

    #[error("Molecule '{0}' does not exist")]
    MoleculeNameNotFound(String),

    #[error("There are no molecules")]
    NoMolecules,

    #[error("Molecule {molid} has no frames")]
    NoFrames { molid: MolId },

    #[error("Frame {frame} is out of range for molecule {molid} with {num_frames} frame(s)")]
    FrameOutOfRange {
        molid: MolId,
        frame: usize,
        num_frames: usize,
    },

    #[error("Atom {index} does not exist in molecule {molid} with {num_atoms} atom(s)")]
    AtomOutOfRange {
        molid: MolId,
        index: usize,
        num_atoms: usize,
    },

    #[error("Selection '{text}' matches {matched} atoms, expected exactly one")]
    NotSingleAtom { text: String, matched: usize },

    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] SelectionParseError),

    #[error("Cannot detect file format for '{}'", .0.display())]
    UnknownFormat(PathBuf),

    #[error("File format '{0}' is not supported by this host")]
    UnsupportedFormat(FileFormat),

    #[error("File '{}' does not exist", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read '{path}': {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },

    #[error("File has {found} atoms, molecule {molid} has {expected}")]
    AtomCountMismatch {
        molid: MolId,
        expected: usize,
        found: usize,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// The capability a visualization host exposes to the proxy objects.
///
/// Every call translates to one host operation on a molecule identified by
/// its [`MolId`]; implementors own all molecular state, so the methods take
/// `&self` and use interior mutability where they need it.
pub trait HostBackend {
    /// Creates an empty molecule, which becomes the top molecule.
    fn new_molecule(&self, name: &str) -> Result<MolId, HostError>;

    fn delete_molecule(&self, molid: MolId) -> Result<(), HostError>;

    fn exists(&self, molid: MolId) -> bool;

    /// Ids of all molecules, in creation order.
    fn list_molecules(&self) -> Vec<MolId>;

    fn num_molecules(&self) -> usize {
        self.list_molecules().len()
    }

    /// The top molecule, `None` when the host holds no molecules.
    fn top(&self) -> Option<MolId>;

    fn set_top(&self, molid: MolId) -> Result<(), HostError>;

    fn name(&self, molid: MolId) -> Result<String, HostError>;

    fn rename(&self, molid: MolId, name: &str) -> Result<(), HostError>;

    fn visible(&self, molid: MolId) -> Result<bool, HostError>;

    fn set_visible(&self, molid: MolId, visible: bool) -> Result<(), HostError>;

    fn num_frames(&self, molid: MolId) -> Result<usize, HostError>;

    /// The active frame, `None` when the molecule has no frames.
    fn current_frame(&self, molid: MolId) -> Result<Option<usize>, HostError>;

    fn set_frame(&self, molid: MolId, frame: usize) -> Result<(), HostError>;

    fn delete_frame(&self, molid: MolId, frame: usize) -> Result<(), HostError>;

    /// Appends a copy of `frame` and makes the copy the active frame.
    fn duplicate_frame(&self, molid: MolId, frame: usize) -> Result<(), HostError>;

    /// Reads the frames selected by `range` from `path` and appends them to
    /// the molecule. Returns the number of frames appended.
    ///
    /// With `wait` set the call returns only once the data is loaded.
    fn read(
        &self,
        molid: MolId,
        format: &FileFormat,
        path: &Path,
        range: &LoadRange,
        wait: bool,
    ) -> Result<usize, HostError>;

    fn num_atoms(&self, molid: MolId) -> Result<usize, HostError>;

    fn atom_record(&self, molid: MolId, index: usize) -> Result<AtomRecord, HostError>;

    fn atom_position(
        &self,
        molid: MolId,
        frame: usize,
        index: usize,
    ) -> Result<Point3<f64>, HostError>;

    fn set_atom_position(
        &self,
        molid: MolId,
        frame: usize,
        index: usize,
        position: Point3<f64>,
    ) -> Result<(), HostError>;

    /// Indices of the atoms bonded to `index`.
    fn bonds(&self, molid: MolId, index: usize) -> Result<Vec<usize>, HostError>;

    /// Ascending indices of the atoms matched by the selection `text`.
    fn select(&self, molid: MolId, text: &str) -> Result<Vec<usize>, HostError>;
}
