//! End-to-end harness behavior: filtering, aggregation, fail-fast shape
//! checks, and persisted artifacts.

use async_trait::async_trait;
use goldrun_core::{
    Harness, HarnessError, RunArtifact, RunOptions, Suite, SuiteContext, SuiteRegistry,
};
use std::fs;
use std::path::Path;

struct StaticSuite {
    name: &'static str,
    ok: usize,
    fail: usize,
}

#[async_trait]
impl Suite for StaticSuite {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, cx: &mut SuiteContext) -> anyhow::Result<()> {
        for i in 0..self.ok {
            cx.ok(format!("check {i}"));
        }
        for i in 0..self.fail {
            cx.fail(format!("bad {i}"), "diagnostic text");
        }
        Ok(())
    }
}

/// Misconfigured suite: finishes without recording anything.
struct SilentSuite;

#[async_trait]
impl Suite for SilentSuite {
    fn name(&self) -> &str {
        "suites.gamma"
    }

    async fn run(&self, _cx: &mut SuiteContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Broken suite: errors instead of recording a failure.
struct BrokenSuite;

#[async_trait]
impl Suite for BrokenSuite {
    fn name(&self) -> &str {
        "suites.broken"
    }

    async fn run(&self, _cx: &mut SuiteContext) -> anyhow::Result<()> {
        anyhow::bail!("fixture directory is gone")
    }
}

fn two_suites() -> SuiteRegistry {
    let mut registry = SuiteRegistry::new();
    registry.register(StaticSuite {
        name: "suites.alpha",
        ok: 2,
        fail: 0,
    });
    registry.register(StaticSuite {
        name: "suites.beta",
        ok: 1,
        fail: 1,
    });
    registry
}

fn persisted_failure_logs(dir: &Path) -> Vec<String> {
    let mut logs: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with("_failures.txt"))
        .collect();
    logs.sort();
    logs
}

#[tokio::test]
async fn aggregates_by_package_and_persists_artifacts() {
    let report_dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(two_suites(), RunOptions::default(), report_dir.path());

    let report = harness.run(&[]).await.unwrap();
    assert_eq!(report.tallies.len(), 2);
    assert_eq!(report.tallies[0].package, "suites.alpha");
    assert_eq!(report.tallies[0].ok, 2);
    assert_eq!(report.tallies[0].fail, 0);
    assert_eq!(report.tallies[1].package, "suites.beta");
    assert_eq!(report.tallies[1].fail, 1);
    assert_eq!(report.total_ok(), 3);
    assert_eq!(report.total_fail(), 1);
    assert!(!report.all_passed());

    let failures = fs::read_to_string(&report.failures_path).unwrap();
    assert!(failures.contains("Failures of <suites.alpha>:\nnone"));
    assert!(failures.contains("bad 0"));
    assert!(failures.contains("diagnostic text"));

    let artifact: RunArtifact =
        serde_json::from_str(&fs::read_to_string(&report.results_path).unwrap()).unwrap();
    assert_eq!(artifact.label, "all");
    assert_eq!(artifact.results.len(), 4);
}

#[tokio::test]
async fn failure_log_written_even_when_all_pass() {
    let report_dir = tempfile::tempdir().unwrap();
    let mut registry = SuiteRegistry::new();
    registry.register(StaticSuite {
        name: "suites.alpha",
        ok: 2,
        fail: 0,
    });
    let harness = Harness::new(registry, RunOptions::default(), report_dir.path());

    let report = harness.run(&[]).await.unwrap();
    assert!(report.all_passed());
    let failures = fs::read_to_string(&report.failures_path).unwrap();
    assert!(failures.contains("Failures of <suites.alpha>:\nnone"));
}

#[tokio::test]
async fn zero_result_suite_aborts_after_persisting_prior_results() {
    let report_dir = tempfile::tempdir().unwrap();
    let mut registry = two_suites();
    registry.register(SilentSuite);
    let harness = Harness::new(registry, RunOptions::default(), report_dir.path());

    let err = harness.run(&[]).await.unwrap_err();
    match err.downcast_ref::<HarnessError>() {
        Some(HarnessError::EmptySuiteOutput { suite }) => assert_eq!(suite, "suites.gamma"),
        other => panic!("expected EmptySuiteOutput, got {other:?}"),
    }

    let logs = persisted_failure_logs(report_dir.path());
    assert_eq!(logs.len(), 1);
    let content = fs::read_to_string(report_dir.path().join(&logs[0])).unwrap();
    assert!(content.contains("suites.alpha"));
    assert!(content.contains("suites.beta"));
    assert!(!content.contains("suites.gamma"));
}

#[tokio::test]
async fn suite_error_propagates_and_halts_the_run() {
    let report_dir = tempfile::tempdir().unwrap();
    let mut registry = SuiteRegistry::new();
    registry.register(BrokenSuite);
    registry.register(StaticSuite {
        name: "suites.after",
        ok: 1,
        fail: 0,
    });
    let harness = Harness::new(registry, RunOptions::default(), report_dir.path());

    let err = harness.run(&[]).await.unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("suite suites.broken failed"));
    assert!(chain.contains("fixture directory is gone"));
    // nothing ran afterwards, nothing was persisted
    assert!(persisted_failure_logs(report_dir.path()).is_empty());
}

#[tokio::test]
async fn requested_names_select_by_short_name() {
    let report_dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(two_suites(), RunOptions::default(), report_dir.path());

    let report = harness.run(&["beta".to_string()]).await.unwrap();
    assert_eq!(report.tallies.len(), 1);
    assert_eq!(report.tallies[0].package, "suites.beta");
    assert!(report.results.iter().all(|r| r.package == "suites.beta"));
}

#[tokio::test]
async fn missing_report_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("results");
    let harness = Harness::new(two_suites(), RunOptions::default(), &missing);

    let err = harness.run(&[]).await.unwrap_err();
    match err.downcast_ref::<HarnessError>() {
        Some(HarnessError::ReportDirMissing { path }) => assert_eq!(path, &missing),
        other => panic!("expected ReportDirMissing, got {other:?}"),
    }
}
