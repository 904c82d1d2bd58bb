use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use vmdscript::core::io::formats::FileFormat;
use vmdscript::engine::config::AnalyzerConfigBuilder;
use vmdscript::workflows::analyze::{AnalysisRequest, DatasetRequest, StructureInput};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialMoleculeConfig {
    name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialStructureConfig {
    path: Option<PathBuf>,
    format: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialTrajectoryConfig {
    #[serde(default)]
    files: Vec<PathBuf>,
    format: Option<String>,
    step: Option<usize>,
    chunk: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialDatasetConfig {
    Coordinates { selection: String, output: PathBuf },
}

impl From<PartialDatasetConfig> for DatasetRequest {
    fn from(p: PartialDatasetConfig) -> Self {
        match p {
            PartialDatasetConfig::Coordinates { selection, output } => {
                DatasetRequest { selection, output }
            }
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    molecule: Option<PartialMoleculeConfig>,
    structure: Option<PartialStructureConfig>,
    trajectory: Option<PartialTrajectoryConfig>,
    #[serde(default)]
    datasets: Vec<PartialDatasetConfig>,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Combines the file values with the command line; the command line wins.
    pub fn merge_with_cli(mut self, args: &AnalyzeArgs) -> Result<AnalysisRequest> {
        self.apply_set_values(&args.set_values)?;

        let molecule_config = self.molecule.take().unwrap_or_default();
        let structure_config = self.structure.take().unwrap_or_default();
        let trajectory_config = self.trajectory.take().unwrap_or_default();

        let structure = args
            .structure
            .clone()
            .or(structure_config.path)
            .map(|path| StructureInput {
                path,
                format: structure_config.format.map(FileFormat::from),
            });

        let files = if args.trajectories.is_empty() {
            trajectory_config.files
        } else {
            args.trajectories.clone()
        };
        let format = args
            .format
            .clone()
            .or(trajectory_config.format)
            .map(FileFormat::from);

        let mut builder = AnalyzerConfigBuilder::new()
            .input_files(files)
            .format_hint(format);
        if let Some(step) = args.step.or(trajectory_config.step) {
            builder = builder.sampling_step(step);
        }
        if let Some(chunk) = args.chunk.or(trajectory_config.chunk) {
            builder = builder.window_size(chunk);
        }
        let analyzer = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AnalysisRequest {
            molecule_name: args.name.clone().or(molecule_config.name),
            structure,
            analyzer,
            datasets: self.datasets.into_iter().map(Into::into).collect(),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        if set_values.is_empty() {
            return Ok(());
        }
        for kv_pair in set_values {
            let parts: Vec<_> = kv_pair.splitn(2, '=').collect();
            if parts.len() != 2 {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            }
            let key = parts[0];
            let value_str = parts[1];

            match key {
                "molecule.name" => {
                    self.molecule.get_or_insert_with(Default::default).name =
                        Some(value_str.to_string());
                }
                "structure.path" => {
                    self.structure.get_or_insert_with(Default::default).path =
                        Some(PathBuf::from(value_str));
                }
                "structure.format" => {
                    self.structure.get_or_insert_with(Default::default).format =
                        Some(value_str.to_string());
                }
                "trajectory.format" => {
                    self.trajectory.get_or_insert_with(Default::default).format =
                        Some(value_str.to_string());
                }
                "trajectory.step" => {
                    self.trajectory.get_or_insert_with(Default::default).step =
                        Some(parse_integer(key, value_str)?);
                }
                "trajectory.chunk" => {
                    self.trajectory.get_or_insert_with(Default::default).chunk =
                        Some(parse_integer(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unknown or unsupported key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_integer(key: &str, value_str: &str) -> Result<usize> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid integer value for {}: {}",
            key, value_str
        ))
    })
}
