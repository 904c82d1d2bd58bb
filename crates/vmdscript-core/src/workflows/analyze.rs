use crate::core::host::backend::{HostBackend, HostError, MolId};
use crate::core::io::formats::FileFormat;
use crate::core::objects::molecule::{LoadOptions, Molecule};
use crate::core::objects::selection::{FrameRef, Selection};
use crate::engine::analyzer::{AnalysisSummary, Analyzer};
use crate::engine::config::{AnalyzerConfig, ConfigError};
use crate::engine::dataset::CoordinatesDataset;
use crate::engine::error::AnalysisError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Failed to write dataset '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// File providing the topology (and possibly initial frames) of the molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureInput {
    pub path: PathBuf,
    pub format: Option<FileFormat>,
}

/// Coordinates of a selection, written as CSV to `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRequest {
    pub selection: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisRequest {
    pub molecule_name: Option<String>,
    pub structure: Option<StructureInput>,
    pub analyzer: AnalyzerConfig,
    pub datasets: Vec<DatasetRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    pub molid: MolId,
    pub summary: AnalysisSummary,
    pub outputs: Vec<PathBuf>,
}

/// Creates a molecule, streams the trajectories through it and writes the
/// collected datasets.
///
/// The molecule is left in the host without frames once the run succeeds.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run<H: HostBackend + ?Sized>(
    host: &H,
    request: &AnalysisRequest,
    reporter: ProgressReporter<'_>,
) -> Result<AnalysisReport, WorkflowError> {
    let molecule = Molecule::create(host, request.molecule_name.as_deref())?;
    info!(molecule = %molecule, "Created analysis molecule.");

    if let Some(structure) = &request.structure {
        reporter.report(Progress::Message(format!(
            "Loading structure {}",
            structure.path.display()
        )));
        let options = LoadOptions {
            format: structure.format.clone(),
            ..LoadOptions::default()
        };
        let frames = molecule.load(&structure.path, &options)?;
        info!(
            path = %structure.path.display(),
            frames,
            atoms = molecule.num_atoms()?,
            "Loaded structure."
        );
    }

    for dataset in &request.datasets {
        Selection::new(dataset.selection.as_str(), molecule, FrameRef::Now)?;
    }
    let mut datasets: Vec<CoordinatesDataset> = request
        .datasets
        .iter()
        .map(|d| CoordinatesDataset::new(d.selection.as_str()))
        .collect();

    let summary = {
        let mut analyzer =
            Analyzer::new(molecule, request.analyzer.clone())?.with_progress(reporter);
        for dataset in datasets.iter_mut() {
            analyzer.register_dataset(dataset);
        }
        analyzer.analyze()?
    };

    let mut outputs = Vec::with_capacity(datasets.len());
    for (dataset, target) in datasets.iter().zip(&request.datasets) {
        dataset
            .write_csv(&target.output)
            .map_err(|source| WorkflowError::Output {
                path: target.output.clone(),
                source,
            })?;
        info!(
            path = %target.output.display(),
            rows = dataset.rows().len(),
            "Wrote dataset."
        );
        outputs.push(target.output.clone());
    }

    Ok(AnalysisReport {
        molid: molecule.molid(),
        summary,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::memory::MemoryHost;
    use crate::engine::config::AnalyzerConfigBuilder;
    use std::fs;

    fn write_xyz(path: &std::path::Path, frames: usize, offset: usize) {
        let mut content = String::new();
        for i in 0..frames {
            let x = (offset + i) as f64;
            content.push_str(&format!("2\nframe {i}\nO {x} 0 0\nH {x} 1 0\n"));
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn run_writes_one_csv_per_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let structure = dir.path().join("start.xyz");
        let traj = dir.path().join("traj.xyz");
        write_xyz(&structure, 1, 100);
        write_xyz(&traj, 5, 0);

        let request = AnalysisRequest {
            molecule_name: Some("water".to_string()),
            structure: Some(StructureInput {
                path: structure,
                format: None,
            }),
            analyzer: AnalyzerConfigBuilder::new()
                .input_file(&traj)
                .sampling_step(2)
                .window_size(2)
                .build()
                .unwrap(),
            datasets: vec![DatasetRequest {
                selection: "name O".to_string(),
                output: dir.path().join("oxygen.csv"),
            }],
        };

        let host = MemoryHost::new();
        let report = run(&host, &request, ProgressReporter::new()).unwrap();

        assert_eq!(report.summary.frames_analyzed, 3);
        assert_eq!(host.name(report.molid).unwrap(), "water");
        assert_eq!(host.num_frames(report.molid).unwrap(), 0);
        let csv = fs::read_to_string(&report.outputs[0]).unwrap();
        assert_eq!(
            csv,
            "frame,index,x,y,z\n0,0,0.0,0.0,0.0\n1,0,2.0,0.0,0.0\n2,0,4.0,0.0,0.0\n"
        );
    }

    #[test]
    fn invalid_dataset_selection_fails_before_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let request = AnalysisRequest {
            datasets: vec![DatasetRequest {
                selection: "resid abc".to_string(),
                output: dir.path().join("out.csv"),
            }],
            ..AnalysisRequest::default()
        };
        let host = MemoryHost::new();
        let err = run(&host, &request, ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Host(HostError::InvalidSelection(_))
        ));
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn missing_trajectory_is_reported_as_analysis_error() {
        let request = AnalysisRequest {
            analyzer: AnalyzerConfigBuilder::new()
                .input_file("/nonexistent/traj.xyz")
                .build()
                .unwrap(),
            ..AnalysisRequest::default()
        };
        let host = MemoryHost::new();
        let err = run(&host, &request, ProgressReporter::new()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Analysis(AnalysisError::Host(HostError::FileNotFound(_)))
        ));
    }
}
