//! Seam to the converter under test.
//!
//! The host application's import/export operations are opaque to the
//! harness; suites drive them through this trait. Failures are tagged
//! values, not panics, so negative cases can compare the reported kind and
//! message against expectations.

use std::fmt;
use std::path::Path;

/// Closed classification of converter failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertErrorKind {
    /// Reading or interpreting an interchange case failed.
    Import,
    /// Producing an interchange case failed.
    Export,
    /// The model is geometrically invalid for the target format.
    Geometry,
    /// Underlying file access failed.
    Io,
}

impl fmt::Display for ConvertErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ConvertErrorKind::Import => "import",
            ConvertErrorKind::Export => "export",
            ConvertErrorKind::Geometry => "geometry",
            ConvertErrorKind::Io => "io",
        };
        f.write_str(kind)
    }
}

/// Tagged failure reported by the converter under test.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct ConvertError {
    pub kind: ConvertErrorKind,
    pub message: String,
}

impl ConvertError {
    pub fn new(kind: ConvertErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The bidirectional converter under test.
///
/// The host collaborator is not re-entrant; `&mut self` makes concurrent
/// invocation unrepresentable, and the harness drives it strictly
/// sequentially.
pub trait Converter: Send {
    /// Extension (without dot) of native documents, e.g. `blend`.
    fn document_extension(&self) -> &str;

    /// Extension (without dot) of interchange case files, e.g. `fds`.
    fn case_extension(&self) -> &str;

    /// Open a native document, returning the names of the units (scenes)
    /// it contains.
    fn open_document(&mut self, path: &Path) -> Result<Vec<String>, ConvertError>;

    /// Import an interchange case into a fresh unit, returning its name.
    fn import_case(&mut self, path: &Path) -> Result<String, ConvertError>;

    /// Export `unit` as an interchange case, plus any companion artifacts,
    /// into `out_dir`.
    fn export_unit(&mut self, unit: &str, out_dir: &Path) -> Result<(), ConvertError>;
}
