use crate::core::host::backend::HostError;
use crate::core::io::formats::FileFormat;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_SAMPLING_STEP: usize = 1;
pub const DEFAULT_WINDOW_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("Invalid data container: {0}")]
    InvalidContainer(#[source] HostError),
}

/// Settings of one trajectory analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Trajectory files, analyzed in order.
    pub input_files: Vec<PathBuf>,
    /// Analyze every `sampling_step`-th source frame.
    pub sampling_step: usize,
    /// Maximum number of frames resident in the container at once.
    pub window_size: usize,
    /// Format used for every input file; guessed per file when `None`.
    pub format_hint: Option<FileFormat>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            input_files: Vec::new(),
            sampling_step: DEFAULT_SAMPLING_STEP,
            window_size: DEFAULT_WINDOW_SIZE,
            format_hint: None,
        }
    }
}

impl AnalyzerConfig {
    /// Number of source frames covered by one window.
    pub fn window_span(&self) -> usize {
        self.sampling_step.saturating_mul(self.window_size)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_step == 0 {
            return Err(ConfigError::InvalidArgument {
                name: "sampling_step",
                reason: "must be positive".to_string(),
            });
        }
        if self.window_size == 0 {
            return Err(ConfigError::InvalidArgument {
                name: "window_size",
                reason: "must be positive".to_string(),
            });
        }
        if self.sampling_step.checked_mul(self.window_size).is_none() {
            return Err(ConfigError::InvalidArgument {
                name: "window_size",
                reason: format!(
                    "window of {} frames every {} overflows the frame range",
                    self.window_size, self.sampling_step
                ),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct AnalyzerConfigBuilder {
    input_files: Vec<PathBuf>,
    sampling_step: Option<usize>,
    window_size: Option<usize>,
    format_hint: Option<FileFormat>,
}

impl AnalyzerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_files.push(path.into());
        self
    }
    pub fn input_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.input_files.extend(paths.into_iter().map(Into::into));
        self
    }
    pub fn sampling_step(mut self, step: usize) -> Self {
        self.sampling_step = Some(step);
        self
    }
    pub fn window_size(mut self, size: usize) -> Self {
        self.window_size = Some(size);
        self
    }
    pub fn format_hint(mut self, format: Option<FileFormat>) -> Self {
        self.format_hint = format;
        self
    }

    pub fn build(self) -> Result<AnalyzerConfig, ConfigError> {
        let config = AnalyzerConfig {
            input_files: self.input_files,
            sampling_step: self.sampling_step.unwrap_or(DEFAULT_SAMPLING_STEP),
            window_size: self.window_size.unwrap_or(DEFAULT_WINDOW_SIZE),
            format_hint: self.format_hint,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = AnalyzerConfigBuilder::new()
            .input_file("a.dcd")
            .build()
            .unwrap();

        assert_eq!(config.input_files, vec![PathBuf::from("a.dcd")]);
        assert_eq!(config.sampling_step, 1);
        assert_eq!(config.window_size, 100);
        assert_eq!(config.format_hint, None);
        assert_eq!(config.window_span(), 100);
    }

    #[test]
    fn builder_keeps_input_order() {
        let config = AnalyzerConfigBuilder::new()
            .input_file("b.xyz")
            .input_files(["a.xyz", "c.xyz"])
            .sampling_step(3)
            .window_size(10)
            .build()
            .unwrap();

        assert_eq!(
            config.input_files,
            vec![
                PathBuf::from("b.xyz"),
                PathBuf::from("a.xyz"),
                PathBuf::from("c.xyz")
            ]
        );
        assert_eq!(config.window_span(), 30);
    }

    #[test]
    fn build_rejects_zero_step_and_window() {
        let err = AnalyzerConfigBuilder::new().sampling_step(0).build();
        assert!(matches!(
            err,
            Err(ConfigError::InvalidArgument {
                name: "sampling_step",
                ..
            })
        ));

        let err = AnalyzerConfigBuilder::new().window_size(0).build();
        assert!(matches!(
            err,
            Err(ConfigError::InvalidArgument {
                name: "window_size",
                ..
            })
        ));
    }

    #[test]
    fn build_rejects_overflowing_window_span() {
        let err = AnalyzerConfigBuilder::new()
            .sampling_step(usize::MAX)
            .window_size(2)
            .build();
        assert!(matches!(err, Err(ConfigError::InvalidArgument { .. })));
    }

    #[test]
    fn config_deserializes_from_kebab_case_toml_keys() {
        let config: AnalyzerConfig = toml::from_str(
            r#"
            input-files = ["one.dcd", "two.dcd"]
            sampling-step = 5
            format-hint = "dcd"
            "#,
        )
        .unwrap();

        assert_eq!(config.input_files.len(), 2);
        assert_eq!(config.sampling_step, 5);
        assert_eq!(config.window_size, DEFAULT_WINDOW_SIZE);
        assert_eq!(config.format_hint, Some(FileFormat::Dcd));
    }
}
