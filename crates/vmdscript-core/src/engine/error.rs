use crate::core::host::backend::HostError;
use thiserror::Error;

/// Error type returned by frame observers and datasets.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("Callback failed on frame {frame}: {source}")]
    Observer {
        frame: usize,
        #[source]
        source: BoxError,
    },
}
