use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use tracing::info;
use vmdscript::core::host::backend::HostError;
use vmdscript::core::host::memory::MemoryHost;
use vmdscript::core::io::formats::{FileFormat, guess_file_format};
use vmdscript::core::objects::molecule::{LoadOptions, Molecule};
use vmdscript::core::objects::selection::{Atom, FrameRef, Selection};

/// Atoms listed for a selection before the output is cut short.
const MAX_LISTED_ATOMS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAtom {
    pub index: usize,
    pub name: String,
    pub resname: String,
    pub resid: isize,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct InspectSummary {
    pub name: String,
    pub format: FileFormat,
    pub num_atoms: usize,
    pub num_frames: usize,
    pub num_bonds: usize,
    pub selected: Option<Vec<SelectedAtom>>,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let summary = inspect(&args)?;

    println!("File:   {}", args.file.display());
    println!("Name:   {}", summary.name);
    println!("Format: {}", summary.format);
    println!("Atoms:  {}", summary.num_atoms);
    println!("Bonds:  {}", summary.num_bonds);
    println!("Frames: {}", summary.num_frames);

    if let (Some(text), Some(atoms)) = (&args.selection, &summary.selected) {
        println!("Selection '{}' matches {} atom(s):", text, atoms.len());
        for atom in atoms.iter().take(MAX_LISTED_ATOMS) {
            println!(
                "  {:>6} {:<4} {:<4} {:>5} {:>9.3} {:>9.3} {:>9.3}",
                atom.index,
                atom.name,
                atom.resname,
                atom.resid,
                atom.position[0],
                atom.position[1],
                atom.position[2]
            );
        }
        if atoms.len() > MAX_LISTED_ATOMS {
            println!("  ... {} more", atoms.len() - MAX_LISTED_ATOMS);
        }
    }

    Ok(())
}

pub fn inspect(args: &InspectArgs) -> Result<InspectSummary> {
    let format = match &args.format {
        Some(format) => FileFormat::from(format.clone()),
        None => guess_file_format(&args.file).ok_or_else(|| {
            CliError::Argument(format!(
                "Cannot guess the format of '{}'; pass it with --format.",
                args.file.display()
            ))
        })?,
    };
    let name = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "molecule".to_string());

    let host = MemoryHost::new();
    let molecule = Molecule::create(&host, Some(name.as_str()))?;
    info!("Loading {:?} as {}", &args.file, format);
    let options = LoadOptions {
        format: Some(format.clone()),
        ..LoadOptions::default()
    };
    molecule
        .load(&args.file, &options)
        .map_err(|e| match e {
            HostError::Read { path, source } => CliError::FileParsing {
                path,
                source: anyhow::anyhow!(source),
            },
            other => CliError::Host(other),
        })?;

    let num_atoms = molecule.num_atoms()?;
    let mut num_bonds = 0;
    for index in 0..num_atoms {
        num_bonds += Atom::new(index, molecule, FrameRef::Now)?
            .bonded()?
            .iter()
            .filter(|other| other.index() > index)
            .count();
    }

    let selected = match &args.selection {
        Some(text) => {
            let selection = Selection::new(text.as_str(), molecule, FrameRef::Now)?;
            let mut atoms = Vec::new();
            for atom in selection.atoms()? {
                let record = atom.record()?;
                let position = atom.coords()?;
                atoms.push(SelectedAtom {
                    index: atom.index(),
                    name: record.name,
                    resname: record.resname,
                    resid: record.resid,
                    position: [position.x, position.y, position.z],
                });
            }
            Some(atoms)
        }
        None => None,
    };

    Ok(InspectSummary {
        name: molecule.name()?,
        format,
        num_atoms,
        num_frames: molecule.frames().len()?,
        num_bonds,
        selected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const WATER_PDB: &str = "\
ATOM      1  OH2 TIP W   1       0.000   0.000   0.000  1.00  0.00           O
ATOM      2  H1  TIP W   1       0.957   0.000   0.000  1.00  0.00           H
ATOM      3  H2  TIP W   1      -0.240   0.927   0.000  1.00  0.00           H
CONECT    1    2    3
END
";

    fn args(file: PathBuf, format: Option<&str>, selection: Option<&str>) -> InspectArgs {
        InspectArgs {
            file,
            format: format.map(str::to_string),
            selection: selection.map(str::to_string),
        }
    }

    #[test]
    fn inspect_summarizes_structure_and_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("water.pdb");
        fs::write(&path, WATER_PDB).unwrap();

        let summary = inspect(&args(path, None, Some("hydrogen"))).unwrap();

        assert_eq!(summary.name, "water");
        assert_eq!(summary.format, FileFormat::Pdb);
        assert_eq!(summary.num_atoms, 3);
        assert_eq!(summary.num_frames, 1);
        assert_eq!(summary.num_bonds, 2);
        let selected = summary.selected.unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].name, "H1");
        assert_eq!(selected[1].position, [-0.24, 0.927, 0.0]);
    }

    #[test]
    fn explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.txt");
        fs::write(&path, "1\nonly\nC 1 2 3\n").unwrap();

        let summary = inspect(&args(path, Some("xyz"), None)).unwrap();
        assert_eq!(summary.format, FileFormat::Xyz);
        assert_eq!(summary.num_atoms, 1);
        assert!(summary.selected.is_none());
    }

    #[test]
    fn missing_extension_requires_a_format() {
        let result = inspect(&args(PathBuf::from("trajectory"), None, None));
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn unsupported_format_is_reported_by_the_host() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system.psf");
        fs::write(&path, "PSF\n").unwrap();

        let result = inspect(&args(path, None, None));
        assert!(matches!(
            result,
            Err(CliError::Host(HostError::UnsupportedFormat(FileFormat::Psf)))
        ));
    }
}
