//! Harness-level error taxonomy.
//!
//! These are configuration and environment errors: they abort the whole
//! run. Checkable failures (diffs, missing markers, non-zero exits) are
//! never errors — they become Fail results and the run continues.

use std::path::PathBuf;

/// Errors that abort a verification run.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A suite finished without recording a single result. Treated as a
    /// broken suite/fixture setup, not as a test failure.
    #[error("suite {suite} recorded no results")]
    EmptySuiteOutput { suite: String },

    #[error("report directory {} does not exist", .path.display())]
    ReportDirMissing { path: PathBuf },

    #[error("{} is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarnessError::EmptySuiteOutput {
            suite: "suites.mesh_export".to_string(),
        };
        assert!(err.to_string().contains("recorded no results"));

        let err = HarnessError::ReportDirMissing {
            path: PathBuf::from("/no/such/dir"),
        };
        assert!(err.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HarnessError = io.into();
        assert!(err.to_string().contains("io error"));
    }
}
