use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type SketchResult<T> = std::result::Result<T, SketchError>;

/// Failures raised while collecting or analyzing files.
///
/// Only [`SketchError::PathNotFound`] stops a command. Everything else is
/// absorbed at file granularity: the file contributes degraded results and
/// the run continues.
#[derive(Debug, Error)]
pub enum SketchError {
    #[error("Path {} does not exist", .0.display())]
    PathNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pattern matching exceeded its {}ms budget", budget.as_millis())]
    PatternTimeout { budget: Duration },

    #[error("malformed manifest {}: {reason}", path.display())]
    ManifestParse { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SketchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SketchError::PatternTimeout { .. })
    }
}
