//! goldrun core - golden-reference verification harness
//!
//! A reusable integration-testing framework for bidirectional file-format
//! converters:
//! - a supervised external-command runner with marker-based success
//!   detection and hard timeouts
//! - a recursive, format-aware tree comparator with golden references
//! - a suite registry, runner, and aggregator with persisted run artifacts
//!
//! Embedders implement [`Converter`] for the application under test,
//! register [`Suite`]s built from the driver helpers, and hand the registry
//! to a [`Harness`].

pub mod command;
pub mod compare;
pub mod convert;
pub mod driver;
pub mod error;
pub mod expect;
pub mod report;
pub mod result;
pub mod runner;
pub mod suite;
pub mod telemetry;

pub use command::{
    run_command, run_command_tree, CommandConfig, CommandOutcome, CommandStatus, TreeSweep,
};
pub use compare::{
    compare_trees, filtered_diff, refresh_reference, TEXT_EXTENSIONS, VOLATILE_LINE_PREFIXES,
};
pub use convert::{ConvertError, ConvertErrorKind, Converter};
pub use driver::{export_documents, roundtrip_case, roundtrip_tree, CaseOptions, SweepOptions};
pub use error::{HarnessError, Result};
pub use expect::{check_expected, ExpectedFailure};
pub use report::{PackageTally, RunArtifact, RunReport};
pub use result::{CheckResult, Outcome};
pub use runner::Harness;
pub use suite::{short_name, RunOptions, Suite, SuiteContext, SuiteRegistry};
pub use telemetry::init_tracing;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
