//! Run reporting: console summary and persisted artifacts.
//!
//! Every run persists two files into the report directory, named by a
//! sortable wall-clock timestamp: a plain-text failure log (written even
//! when there are no failures, so historical run directories stay
//! self-describing) and a pretty-JSON artifact with the full result set.

use crate::error::{HarnessError, Result};
use crate::result::{CheckResult, Outcome};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Per-package ok/fail tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageTally {
    pub package: String,
    pub ok: usize,
    pub fail: usize,
}

/// JSON results artifact written for every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub label: String,
    pub tallies: Vec<PackageTally>,
    pub results: Vec<CheckResult>,
}

/// Aggregated outcome of one harness run.
#[derive(Debug)]
pub struct RunReport {
    /// Per-package tallies in first-seen order.
    pub tallies: Vec<PackageTally>,

    /// Every recorded result, in execution order.
    pub results: Vec<CheckResult>,

    /// Path of the persisted plain-text failure log.
    pub failures_path: PathBuf,

    /// Path of the persisted JSON artifact.
    pub results_path: PathBuf,
}

impl RunReport {
    pub fn total_ok(&self) -> usize {
        self.tallies.iter().map(|t| t.ok).sum()
    }

    pub fn total_fail(&self) -> usize {
        self.tallies.iter().map(|t| t.fail).sum()
    }

    pub fn all_passed(&self) -> bool {
        self.total_fail() == 0
    }

    /// Print the per-package failure details followed by the summary table.
    pub fn print(&self) {
        for tally in &self.tallies {
            println!("\nDetailed failures of <{}>:", tally.package);
            if tally.fail == 0 {
                println!("None");
                continue;
            }
            for result in self
                .results
                .iter()
                .filter(|r| r.package == tally.package && !r.is_ok())
            {
                println!("{}", result.detail());
            }
        }

        println!("\nOverall results:");
        for tally in &self.tallies {
            println!(
                "{:>8} = {:>6} ok + {:>6} failed in {}",
                tally.ok + tally.fail,
                tally.ok,
                tally.fail,
                tally.package
            );
        }
        println!("{:>8} completed", self.results.len());
        println!("failure log: {}", self.failures_path.display());
    }
}

/// Group results by package in first-seen order.
pub(crate) fn tally(results: &[CheckResult]) -> Vec<PackageTally> {
    let mut tallies: Vec<PackageTally> = Vec::new();
    for result in results {
        let idx = match tallies.iter().position(|t| t.package == result.package) {
            Some(idx) => idx,
            None => {
                tallies.push(PackageTally {
                    package: result.package.clone(),
                    ok: 0,
                    fail: 0,
                });
                tallies.len() - 1
            }
        };
        match result.outcome {
            Outcome::Ok => tallies[idx].ok += 1,
            Outcome::Fail => tallies[idx].fail += 1,
        }
    }
    tallies
}

fn render_failures(results: &[CheckResult]) -> String {
    let tallies = tally(results);
    if tallies.is_empty() {
        return "no results recorded\n".to_string();
    }
    let mut out = String::new();
    for tally in &tallies {
        out.push_str(&format!("Failures of <{}>:\n", tally.package));
        if tally.fail == 0 {
            out.push_str("none\n");
        } else {
            for result in results
                .iter()
                .filter(|r| r.package == tally.package && !r.is_ok())
            {
                out.push_str(&result.detail());
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out
}

/// Write the failure log and the JSON artifact for the given results.
///
/// Always writes both files, even for an all-pass (or empty) run.
pub(crate) fn persist(
    report_dir: &Path,
    label: &str,
    results: &[CheckResult],
) -> Result<(PathBuf, PathBuf)> {
    if !report_dir.is_dir() {
        return Err(HarnessError::ReportDirMissing {
            path: report_dir.to_path_buf(),
        });
    }
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let failures_path = report_dir.join(format!("{stamp}_{label}_failures.txt"));
    let results_path = report_dir.join(format!("{stamp}_{label}_results.json"));

    fs::write(&failures_path, render_failures(results))?;

    let artifact = RunArtifact {
        schema_version: "1".to_string(),
        generated_at: Utc::now(),
        label: label.to_string(),
        tallies: tally(results),
        results: results.to_vec(),
    };
    fs::write(&results_path, serde_json::to_string_pretty(&artifact)?)?;

    Ok((failures_path, results_path))
}

/// Persist the run artifacts and assemble the final report.
pub(crate) fn build(report_dir: &Path, label: &str, results: Vec<CheckResult>) -> Result<RunReport> {
    let (failures_path, results_path) = persist(report_dir, label, &results)?;
    Ok(RunReport {
        tallies: tally(&results),
        results,
        failures_path,
        results_path,
    })
}
