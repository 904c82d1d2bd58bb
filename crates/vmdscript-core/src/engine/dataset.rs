use super::error::BoxError;
use super::observer::FrameObserver;
use super::step::Step;
use crate::core::host::backend::HostBackend;
use crate::core::objects::molecule::Molecule;
use crate::core::objects::selection::{FrameRef, Selection};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Data collected frame by frame during an analysis.
pub trait Dataset<C: ?Sized> {
    fn collect(&mut self, step: &Step<'_, C>) -> Result<(), BoxError>;
}

pub(crate) struct DatasetObserver<'d, D: ?Sized>(pub(crate) &'d mut D);

impl<C: ?Sized, D: Dataset<C> + ?Sized> FrameObserver<C> for DatasetObserver<'_, D> {
    fn on_frame(&mut self, step: &Step<'_, C>) -> Result<(), BoxError> {
        self.0.collect(step)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateRow {
    pub frame: usize,
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Positions of the atoms of a selection on every analyzed frame.
#[derive(Debug, Clone)]
pub struct CoordinatesDataset {
    selection: String,
    rows: Vec<CoordinateRow>,
}

impl CoordinatesDataset {
    pub fn new(selection: impl Into<String>) -> Self {
        Self {
            selection: selection.into(),
            rows: Vec::new(),
        }
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn rows(&self) -> &[CoordinateRow] {
        &self.rows
    }

    /// Writes the rows as CSV with a `frame,index,x,y,z` header.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(["frame", "index", "x", "y", "z"])?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), csv::Error> {
        let file = std::fs::File::create(path)?;
        self.write_to(file)
    }
}

impl<'h, H: HostBackend + ?Sized> Dataset<Molecule<'h, H>> for CoordinatesDataset {
    fn collect(&mut self, step: &Step<'_, Molecule<'h, H>>) -> Result<(), BoxError> {
        let frame = step.frame().max(0) as usize;
        let selection = Selection::new(self.selection.as_str(), *step.container(), FrameRef::Now)?;
        for atom in selection.atoms()? {
            let position = atom.coords()?;
            self.rows.push(CoordinateRow {
                frame,
                index: atom.index(),
                x: position.x,
                y: position.y,
                z: position.z,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::memory::MemoryHost;
    use crate::core::objects::molecule::LoadOptions;
    use crate::engine::container::FrameContainer;
    use std::fs;

    #[test]
    fn collects_selected_atoms_at_current_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pair.xyz");
        fs::write(&path, "2\na\nO 0 0 0\nH 1 0 0\n2\nb\nO 0 2 0\nH 1 2 0\n").unwrap();
        let host = MemoryHost::new();
        let molecule = Molecule::create(&host, None).unwrap();
        molecule.load(&path, &LoadOptions::default()).unwrap();

        let mut dataset = CoordinatesDataset::new("hydrogen");
        let mut step = Step::new(&molecule);
        step.start_new_window();
        step.advance().unwrap();
        dataset.collect(&step).unwrap();
        step.advance().unwrap();
        dataset.collect(&step).unwrap();

        assert_eq!(
            dataset.rows(),
            &[
                CoordinateRow { frame: 0, index: 1, x: 1.0, y: 0.0, z: 0.0 },
                CoordinateRow { frame: 1, index: 1, x: 1.0, y: 2.0, z: 0.0 },
            ]
        );
        molecule.discard_resident().unwrap();
    }

    #[test]
    fn writes_header_even_without_rows() {
        let dataset = CoordinatesDataset::new("all");
        let mut out = Vec::new();
        dataset.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "frame,index,x,y,z\n");
    }

    #[test]
    fn writes_one_line_per_row() {
        let mut dataset = CoordinatesDataset::new("all");
        dataset.rows.push(CoordinateRow { frame: 3, index: 0, x: 1.5, y: -2.0, z: 0.25 });
        let mut out = Vec::new();
        dataset.write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "frame,index,x,y,z\n3,0,1.5,-2.0,0.25\n"
        );
    }
}
