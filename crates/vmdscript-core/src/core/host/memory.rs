use super::backend::{HostBackend, HostError, MolId};
use crate::core::io::formats::FileFormat;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::{AtomRecord, LoadRange, TrajectoryChunk, TrajectoryFile};
use crate::core::io::xyz::XyzFile;
use crate::core::select;
use nalgebra::Point3;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
struct MemoryMolecule {
    name: String,
    visible: bool,
    atoms: Vec<AtomRecord>,
    bonds: Vec<Vec<usize>>,
    frames: Vec<Vec<Point3<f64>>>,
    current_frame: Option<usize>,
}

impl MemoryMolecule {
    fn check_frame(&self, molid: MolId, frame: usize) -> Result<(), HostError> {
        if frame >= self.frames.len() {
            return Err(HostError::FrameOutOfRange {
                molid,
                frame,
                num_frames: self.frames.len(),
            });
        }
        Ok(())
    }

    fn check_atom(&self, molid: MolId, index: usize) -> Result<(), HostError> {
        if index >= self.atoms.len() {
            return Err(HostError::AtomOutOfRange {
                molid,
                index,
                num_atoms: self.atoms.len(),
            });
        }
        Ok(())
    }

    fn adopt_topology(&mut self, chunk: &TrajectoryChunk) {
        self.atoms = chunk.atoms.clone();
        self.bonds = vec![Vec::new(); chunk.atoms.len()];
        for &(a, b) in &chunk.bonds {
            self.bonds[a].push(b);
            self.bonds[b].push(a);
        }
    }
}

#[derive(Debug, Default)]
struct HostState {
    molecules: BTreeMap<MolId, MemoryMolecule>,
    next_id: usize,
    top: Option<MolId>,
}

impl HostState {
    fn molecule(&self, molid: MolId) -> Result<&MemoryMolecule, HostError> {
        self.molecules
            .get(&molid)
            .ok_or(HostError::MoleculeNotFound(molid))
    }

    fn molecule_mut(&mut self, molid: MolId) -> Result<&mut MemoryMolecule, HostError> {
        self.molecules
            .get_mut(&molid)
            .ok_or(HostError::MoleculeNotFound(molid))
    }
}

/// An in-process host that keeps every molecule in memory.
///
/// Molecule ids are handed out in increasing order starting at `0` and are
/// never reused. Trajectory data is read with the crate's own streaming
/// readers, so only XYZ and PDB files can be loaded.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: RefCell<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_chunk(
        format: &FileFormat,
        path: &Path,
        range: &LoadRange,
    ) -> Result<TrajectoryChunk, HostError> {
        let read_error = |source: Box<dyn std::error::Error + Send + Sync>| HostError::Read {
            path: path.to_path_buf(),
            source,
        };
        match format {
            FileFormat::Xyz => {
                XyzFile::read_frames_from_path(path, range).map_err(|e| read_error(e.into()))
            }
            FileFormat::Pdb => {
                PdbFile::read_frames_from_path(path, range).map_err(|e| read_error(e.into()))
            }
            other => Err(HostError::UnsupportedFormat(other.clone())),
        }
    }
}

impl HostBackend for MemoryHost {
    fn new_molecule(&self, name: &str) -> Result<MolId, HostError> {
        let mut state = self.state.borrow_mut();
        let molid = MolId(state.next_id);
        state.next_id += 1;
        state.molecules.insert(
            molid,
            MemoryMolecule {
                name: name.to_string(),
                visible: true,
                ..Default::default()
            },
        );
        state.top = Some(molid);
        debug!(%molid, name, "Created molecule.");
        Ok(molid)
    }

    fn delete_molecule(&self, molid: MolId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state
            .molecules
            .remove(&molid)
            .ok_or(HostError::MoleculeNotFound(molid))?;
        if state.top == Some(molid) {
            state.top = state.molecules.keys().next().copied();
        }
        debug!(%molid, "Deleted molecule.");
        Ok(())
    }

    fn exists(&self, molid: MolId) -> bool {
        self.state.borrow().molecules.contains_key(&molid)
    }

    fn list_molecules(&self) -> Vec<MolId> {
        self.state.borrow().molecules.keys().copied().collect()
    }

    fn top(&self) -> Option<MolId> {
        self.state.borrow().top
    }

    fn set_top(&self, molid: MolId) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        state.molecule(molid)?;
        state.top = Some(molid);
        Ok(())
    }

    fn name(&self, molid: MolId) -> Result<String, HostError> {
        Ok(self.state.borrow().molecule(molid)?.name.clone())
    }

    fn rename(&self, molid: MolId, name: &str) -> Result<(), HostError> {
        self.state.borrow_mut().molecule_mut(molid)?.name = name.to_string();
        Ok(())
    }

    fn visible(&self, molid: MolId) -> Result<bool, HostError> {
        Ok(self.state.borrow().molecule(molid)?.visible)
    }

    fn set_visible(&self, molid: MolId, visible: bool) -> Result<(), HostError> {
        self.state.borrow_mut().molecule_mut(molid)?.visible = visible;
        Ok(())
    }

    fn num_frames(&self, molid: MolId) -> Result<usize, HostError> {
        Ok(self.state.borrow().molecule(molid)?.frames.len())
    }

    fn current_frame(&self, molid: MolId) -> Result<Option<usize>, HostError> {
        Ok(self.state.borrow().molecule(molid)?.current_frame)
    }

    fn set_frame(&self, molid: MolId, frame: usize) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let molecule = state.molecule_mut(molid)?;
        molecule.check_frame(molid, frame)?;
        molecule.current_frame = Some(frame);
        Ok(())
    }

    fn delete_frame(&self, molid: MolId, frame: usize) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let molecule = state.molecule_mut(molid)?;
        molecule.check_frame(molid, frame)?;
        molecule.frames.remove(frame);
        let remaining = molecule.frames.len();
        molecule.current_frame = match molecule.current_frame {
            _ if remaining == 0 => None,
            Some(current) if current > frame => Some(current - 1),
            Some(current) => Some(current.min(remaining - 1)),
            None => None,
        };
        trace!(%molid, frame, "Deleted frame.");
        Ok(())
    }

    fn duplicate_frame(&self, molid: MolId, frame: usize) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let molecule = state.molecule_mut(molid)?;
        molecule.check_frame(molid, frame)?;
        let copy = molecule.frames[frame].clone();
        molecule.frames.push(copy);
        molecule.current_frame = Some(molecule.frames.len() - 1);
        Ok(())
    }

    fn read(
        &self,
        molid: MolId,
        format: &FileFormat,
        path: &Path,
        range: &LoadRange,
        _wait: bool,
    ) -> Result<usize, HostError> {
        if range.step == 0 {
            return Err(HostError::InvalidArgument(
                "frame step must be positive".to_string(),
            ));
        }
        self.state.borrow().molecule(molid)?;
        if !path.exists() {
            return Err(HostError::FileNotFound(path.to_path_buf()));
        }

        let chunk = Self::read_chunk(format, path, range)?;

        let mut state = self.state.borrow_mut();
        let molecule = state.molecule_mut(molid)?;
        if molecule.atoms.is_empty() {
            molecule.adopt_topology(&chunk);
        } else if !chunk.atoms.is_empty() && chunk.atoms.len() != molecule.atoms.len() {
            return Err(HostError::AtomCountMismatch {
                molid,
                expected: molecule.atoms.len(),
                found: chunk.atoms.len(),
            });
        }

        let appended = chunk.frames.len();
        molecule.frames.extend(chunk.frames);
        if appended > 0 {
            molecule.current_frame = Some(molecule.frames.len() - 1);
        }
        debug!(
            %molid,
            path = %path.display(),
            format = %format,
            appended,
            "Read trajectory data."
        );
        Ok(appended)
    }

    fn num_atoms(&self, molid: MolId) -> Result<usize, HostError> {
        Ok(self.state.borrow().molecule(molid)?.atoms.len())
    }

    fn atom_record(&self, molid: MolId, index: usize) -> Result<AtomRecord, HostError> {
        let state = self.state.borrow();
        let molecule = state.molecule(molid)?;
        molecule.check_atom(molid, index)?;
        Ok(molecule.atoms[index].clone())
    }

    fn atom_position(
        &self,
        molid: MolId,
        frame: usize,
        index: usize,
    ) -> Result<Point3<f64>, HostError> {
        let state = self.state.borrow();
        let molecule = state.molecule(molid)?;
        molecule.check_atom(molid, index)?;
        molecule.check_frame(molid, frame)?;
        Ok(molecule.frames[frame][index])
    }

    fn set_atom_position(
        &self,
        molid: MolId,
        frame: usize,
        index: usize,
        position: Point3<f64>,
    ) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        let molecule = state.molecule_mut(molid)?;
        molecule.check_atom(molid, index)?;
        molecule.check_frame(molid, frame)?;
        molecule.frames[frame][index] = position;
        Ok(())
    }

    fn bonds(&self, molid: MolId, index: usize) -> Result<Vec<usize>, HostError> {
        let state = self.state.borrow();
        let molecule = state.molecule(molid)?;
        molecule.check_atom(molid, index)?;
        Ok(molecule.bonds[index].clone())
    }

    fn select(&self, molid: MolId, text: &str) -> Result<Vec<usize>, HostError> {
        let expr = select::parse(text)?;
        let state = self.state.borrow();
        let molecule = state.molecule(molid)?;
        Ok(select::evaluate(&expr, &molecule.atoms))
    }
}
