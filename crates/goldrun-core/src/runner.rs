//! The harness: suite selection, strictly sequential execution,
//! aggregation, and fail-fast configuration checks.

use crate::error::HarnessError;
use crate::report::{self, RunReport};
use crate::suite::{short_name, RunOptions, SuiteContext, SuiteRegistry};
use anyhow::Context as _;
use std::path::PathBuf;
use tracing::info;

/// Drives registered suites and aggregates their results.
pub struct Harness {
    registry: SuiteRegistry,
    options: RunOptions,
    report_dir: PathBuf,
}

impl Harness {
    pub fn new(registry: SuiteRegistry, options: RunOptions, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            options,
            report_dir: report_dir.into(),
        }
    }

    /// Run every suite whose short name exactly matches one of the
    /// requested names; an empty request list runs all suites.
    ///
    /// Suites run strictly sequentially in registration order — one suite
    /// completes, subprocesses included, before the next begins. A suite
    /// error propagates immediately with no catching and no retry. A suite
    /// that records zero results aborts the run after persisting the
    /// results gathered so far, so the run directory reflects the suites
    /// that did complete.
    pub async fn run(&self, requested: &[String]) -> anyhow::Result<RunReport> {
        if !self.report_dir.is_dir() {
            return Err(HarnessError::ReportDirMissing {
                path: self.report_dir.clone(),
            }
            .into());
        }

        println!("Available suites:");
        for name in self.registry.names() {
            println!("  {name}");
        }
        println!("Requested suites:");
        if requested.is_empty() {
            println!("  all");
        } else {
            for name in requested {
                println!("  {name}");
            }
        }

        let label = if requested.is_empty() {
            "all".to_string()
        } else {
            requested.join("-")
        };

        println!("Run suites...");
        let mut results = Vec::new();
        for suite in self.registry.suites() {
            let name = suite.name();
            if !requested.is_empty() && !requested.iter().any(|r| r == short_name(name)) {
                continue;
            }

            info!(suite = %name, "running suite");
            let mut cx = SuiteContext::new(name, self.options);
            if let Err(err) = suite.run(&mut cx).await {
                return Err(err).with_context(|| format!("suite {name} failed"));
            }

            let suite_results = cx.into_results();
            if suite_results.is_empty() {
                report::persist(&self.report_dir, &label, &results)?;
                return Err(HarnessError::EmptySuiteOutput {
                    suite: name.to_string(),
                }
                .into());
            }
            results.extend(suite_results);
        }

        let report = report::build(&self.report_dir, &label, results)?;
        report.print();
        Ok(report)
    }
}
