use std::cell::RefCell;
use std::fs;
use std::path::Path;
use vmdscript::core::host::backend::HostBackend;
use vmdscript::core::host::memory::MemoryHost;
use vmdscript::core::objects::manager::MoleculeManager;
use vmdscript::core::objects::molecule::{LoadOptions, Molecule};
use vmdscript::core::objects::selection::{Atom, FrameRef};
use vmdscript::engine::analyzer::Analyzer;
use vmdscript::engine::config::AnalyzerConfigBuilder;
use vmdscript::engine::dataset::CoordinatesDataset;
use vmdscript::engine::error::AnalysisError;

/// Writes a two-atom XYZ trajectory whose oxygen x coordinate is the source
/// frame index.
fn write_trajectory(path: &Path, frames: usize) {
    let mut content = String::new();
    for i in 0..frames {
        content.push_str(&format!("2\nsource frame {i}\nO {i}.0 0.0 0.0\nH {i}.0 1.0 0.0\n"));
    }
    fs::write(path, content).unwrap();
}

fn loaded_molecule<'h>(host: &'h MemoryHost, structure: &Path) -> Molecule<'h, MemoryHost> {
    let molecule = Molecule::create(host, Some("water")).unwrap();
    molecule.load(structure, &LoadOptions::default()).unwrap();
    molecule
}

#[test]
fn long_trajectory_is_streamed_in_bounded_windows() {
    let dir = tempfile::tempdir().unwrap();
    let traj = dir.path().join("long.xyz");
    write_trajectory(&traj, 250);

    let host = MemoryHost::new();
    let molecule = loaded_molecule(&host, &traj);
    let config = AnalyzerConfigBuilder::new()
        .input_file(&traj)
        .sampling_step(2)
        .window_size(100)
        .build()
        .unwrap();

    let seen = RefCell::new(Vec::new());
    let max_resident = RefCell::new(0);
    let summary = {
        let mut analyzer = Analyzer::new(molecule, config).unwrap();
        analyzer.register_callback(|step| {
            let mol = step.container();
            let oxygen = Atom::new(0, *mol, FrameRef::Now)?;
            seen.borrow_mut().push((step.frame(), oxygen.x()?));
            let resident = mol.frames().len()?;
            let mut max = max_resident.borrow_mut();
            *max = (*max).max(resident);
            Ok(())
        });
        analyzer.analyze().unwrap()
    };

    let seen = seen.into_inner();
    assert_eq!(summary.frames_analyzed, 125);
    assert_eq!(seen.len(), 125);
    assert_eq!(seen.last().unwrap().0, 124);
    for (global, x) in &seen {
        assert_eq!(*x, (*global * 2) as f64);
    }
    assert!(max_resident.into_inner() <= 100);
    assert_eq!(molecule.frames().len().unwrap(), 0);
}

#[test]
fn two_files_share_one_frame_counter() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.xyz");
    let second = dir.path().join("b.xyz");
    write_trajectory(&first, 50);
    write_trajectory(&second, 30);

    let host = MemoryHost::new();
    let molecule = loaded_molecule(&host, &first);
    let config = AnalyzerConfigBuilder::new()
        .input_files([&first, &second])
        .build()
        .unwrap();

    let mut dataset = CoordinatesDataset::new("name O");
    let summary = {
        let mut analyzer = Analyzer::new(molecule, config).unwrap();
        analyzer.register_dataset(&mut dataset);
        analyzer.analyze().unwrap()
    };

    assert_eq!(summary.frames_analyzed, 80);
    assert_eq!(summary.files_processed, 2);
    let rows = dataset.rows();
    assert_eq!(rows.len(), 80);
    assert_eq!(rows[49].x, 49.0);
    assert_eq!((rows[50].frame, rows[50].x), (50, 0.0));
    assert_eq!(rows[79].frame, 79);
}

#[test]
fn failing_callback_stops_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let traj = dir.path().join("t.xyz");
    write_trajectory(&traj, 20);

    let host = MemoryHost::new();
    let molecule = loaded_molecule(&host, &traj);
    let config = AnalyzerConfigBuilder::new()
        .input_file(&traj)
        .window_size(8)
        .build()
        .unwrap();

    let mut analyzer = Analyzer::new(molecule, config).unwrap();
    analyzer.register_callback_with(0usize, |step, calls| {
        *calls += 1;
        if step.frame() == 10 {
            return Err(format!("frame {} rejected after {} calls", step.frame(), calls).into());
        }
        Ok(())
    });
    let err = analyzer.analyze().unwrap_err();

    assert!(matches!(err, AnalysisError::Observer { frame: 10, .. }));
    assert!(err.to_string().contains("rejected after 11 calls"));
}

#[test]
fn manager_finds_the_analysis_molecule_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let traj = dir.path().join("t.xyz");
    write_trajectory(&traj, 3);

    let host = MemoryHost::new();
    let molecule = loaded_molecule(&host, &traj);
    let manager = MoleculeManager::new(&host).unwrap();

    let found = manager.get("water").unwrap();
    assert_eq!(found, molecule);
    assert_eq!(manager.top().unwrap(), molecule);
    assert_eq!(host.num_frames(molecule.molid()).unwrap(), 3);
}
