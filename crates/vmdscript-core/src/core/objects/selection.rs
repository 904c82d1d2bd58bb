use super::molecule::Molecule;
use crate::core::host::backend::{HostBackend, HostError};
use crate::core::io::traits::AtomRecord;
use nalgebra::Point3;
use std::fmt;

/// Frame a selection or atom reads coordinates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameRef {
    /// Always the molecule's active frame.
    #[default]
    Now,
    At(usize),
}

impl FrameRef {
    fn resolve<H: HostBackend + ?Sized>(
        self,
        molecule: &Molecule<'_, H>,
    ) -> Result<usize, HostError> {
        match self {
            FrameRef::At(frame) => Ok(frame),
            FrameRef::Now => molecule.frame()?.ok_or(HostError::NoFrames {
                molid: molecule.molid(),
            }),
        }
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRef::Now => f.write_str("now"),
            FrameRef::At(frame) => write!(f, "{}", frame),
        }
    }
}

/// Selection of atoms defined by selection text.
///
/// The text is checked when the selection is created and evaluated again on
/// every access, so the selection follows changes made in the host.
pub struct Selection<'h, H: HostBackend + ?Sized> {
    text: String,
    molecule: Molecule<'h, H>,
    frame: FrameRef,
}

impl<'h, H: HostBackend + ?Sized> Selection<'h, H> {
    /// # Errors
    ///
    /// [`HostError::InvalidSelection`] when the text cannot be parsed.
    pub fn new(
        text: impl Into<String>,
        molecule: Molecule<'h, H>,
        frame: FrameRef,
    ) -> Result<Self, HostError> {
        let selection = Self {
            text: text.into(),
            molecule,
            frame,
        };
        selection.indices()?;
        Ok(selection)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn molecule(&self) -> Molecule<'h, H> {
        self.molecule
    }

    pub fn frame(&self) -> FrameRef {
        self.frame
    }

    pub fn set_frame(&mut self, frame: FrameRef) {
        self.frame = frame;
    }

    pub fn indices(&self) -> Result<Vec<usize>, HostError> {
        self.molecule
            .host()
            .select(self.molecule.molid(), &self.text)
    }

    pub fn len(&self) -> Result<usize, HostError> {
        Ok(self.indices()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, HostError> {
        Ok(self.len()? == 0)
    }

    pub fn atoms(&self) -> Result<Vec<Atom<'h, H>>, HostError> {
        Ok(self
            .indices()?
            .into_iter()
            .map(|index| Atom {
                index,
                molecule: self.molecule,
                frame: self.frame,
            })
            .collect())
    }

    pub fn contains(&self, atom: &Atom<'_, H>) -> Result<bool, HostError> {
        if atom.molecule.molid() != self.molecule.molid() {
            return Ok(false);
        }
        Ok(self.indices()?.binary_search(&atom.index).is_ok())
    }
}

impl<H: HostBackend + ?Sized> fmt::Debug for Selection<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("text", &self.text)
            .field("molecule", &self.molecule)
            .field("frame", &self.frame)
            .finish()
    }
}

/// Proxy for a single atom of a molecule.
pub struct Atom<'h, H: HostBackend + ?Sized> {
    index: usize,
    molecule: Molecule<'h, H>,
    frame: FrameRef,
}

impl<'h, H: HostBackend + ?Sized> Clone for Atom<'h, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'h, H: HostBackend + ?Sized> Copy for Atom<'h, H> {}

impl<'h, H: HostBackend + ?Sized> Atom<'h, H> {
    /// # Errors
    ///
    /// [`HostError::AtomOutOfRange`] when the molecule has no atom `index`.
    pub fn new(index: usize, molecule: Molecule<'h, H>, frame: FrameRef) -> Result<Self, HostError> {
        let num_atoms = molecule.num_atoms()?;
        if index >= num_atoms {
            return Err(HostError::AtomOutOfRange {
                molid: molecule.molid(),
                index,
                num_atoms,
            });
        }
        Ok(Self {
            index,
            molecule,
            frame,
        })
    }

    /// Creates the atom matched by selection text.
    ///
    /// # Errors
    ///
    /// [`HostError::NotSingleAtom`] unless the text matches exactly one atom.
    pub fn pick(text: &str, molecule: Molecule<'h, H>, frame: FrameRef) -> Result<Self, HostError> {
        let indices = molecule.host().select(molecule.molid(), text)?;
        match indices.as_slice() {
            [index] => Ok(Self {
                index: *index,
                molecule,
                frame,
            }),
            _ => Err(HostError::NotSingleAtom {
                text: text.to_string(),
                matched: indices.len(),
            }),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn molecule(&self) -> Molecule<'h, H> {
        self.molecule
    }

    pub fn frame(&self) -> FrameRef {
        self.frame
    }

    pub fn record(&self) -> Result<AtomRecord, HostError> {
        self.molecule
            .host()
            .atom_record(self.molecule.molid(), self.index)
    }

    pub fn name(&self) -> Result<String, HostError> {
        Ok(self.record()?.name)
    }

    pub fn coords(&self) -> Result<Point3<f64>, HostError> {
        let frame = self.frame.resolve(&self.molecule)?;
        self.molecule
            .host()
            .atom_position(self.molecule.molid(), frame, self.index)
    }

    pub fn set_coords(&self, position: Point3<f64>) -> Result<(), HostError> {
        let frame = self.frame.resolve(&self.molecule)?;
        self.molecule
            .host()
            .set_atom_position(self.molecule.molid(), frame, self.index, position)
    }

    pub fn x(&self) -> Result<f64, HostError> {
        Ok(self.coords()?.x)
    }

    pub fn y(&self) -> Result<f64, HostError> {
        Ok(self.coords()?.y)
    }

    pub fn z(&self) -> Result<f64, HostError> {
        Ok(self.coords()?.z)
    }

    pub fn set_x(&self, value: f64) -> Result<(), HostError> {
        let mut position = self.coords()?;
        position.x = value;
        self.set_coords(position)
    }

    pub fn set_y(&self, value: f64) -> Result<(), HostError> {
        let mut position = self.coords()?;
        position.y = value;
        self.set_coords(position)
    }

    pub fn set_z(&self, value: f64) -> Result<(), HostError> {
        let mut position = self.coords()?;
        position.z = value;
        self.set_coords(position)
    }

    /// Atoms bonded to this one, read at the same frame.
    pub fn bonded(&self) -> Result<Vec<Atom<'h, H>>, HostError> {
        Ok(self
            .molecule
            .host()
            .bonds(self.molecule.molid(), self.index)?
            .into_iter()
            .map(|index| Atom {
                index,
                molecule: self.molecule,
                frame: self.frame,
            })
            .collect())
    }
}

impl<H: HostBackend + ?Sized> PartialEq for Atom<'_, H> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.molecule == other.molecule && self.frame == other.frame
    }
}

impl<H: HostBackend + ?Sized> fmt::Debug for Atom<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("index", &self.index)
            .field("molecule", &self.molecule)
            .field("frame", &self.frame)
            .finish()
    }
}
