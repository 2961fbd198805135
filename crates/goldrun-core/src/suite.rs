//! Suite contract: registration, execution context, and run options.

use crate::result::CheckResult;
use async_trait::async_trait;

/// Toggles passed into every suite invocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Execute the external solver over produced artifacts.
    pub run_solver: bool,

    /// Overwrite reference trees with current output instead of comparing.
    pub set_reference: bool,
}

/// Explicit per-invocation accumulator handed to each suite.
///
/// Recording a result prints its one-line progress marker immediately, so
/// long-running suites show liveness; the collected results flow back to
/// the harness for aggregation once the suite returns. Suites never touch
/// shared state directly.
pub struct SuiteContext {
    package: String,
    options: RunOptions,
    results: Vec<CheckResult>,
}

impl SuiteContext {
    pub(crate) fn new(package: impl Into<String>, options: RunOptions) -> Self {
        Self {
            package: package.into(),
            options,
            results: Vec::new(),
        }
    }

    /// Owning suite identifier, used as the package tag of recorded results.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Record a result, printing its live marker.
    pub fn record(&mut self, result: CheckResult) {
        println!("{result}");
        self.results.push(result);
    }

    pub fn record_all(&mut self, results: impl IntoIterator<Item = CheckResult>) {
        for result in results {
            self.record(result);
        }
    }

    /// Record a passing check.
    pub fn ok(&mut self, name: impl Into<String>) {
        let result = CheckResult::ok(self.package.as_str(), name);
        self.record(result);
    }

    /// Record a failing check with its diagnostic log.
    pub fn fail(&mut self, name: impl Into<String>, log: impl Into<String>) {
        let result = CheckResult::fail(self.package.as_str(), name, log);
        self.record(result);
    }

    pub fn count(&self) -> usize {
        self.results.len()
    }

    pub(crate) fn into_results(self) -> Vec<CheckResult> {
        self.results
    }
}

/// A named, independently runnable unit of checks.
///
/// `name` is dotted and hierarchical; the leaf segment is the short name a
/// user can request when filtering. `run` records at least one result
/// through the context — a suite that records none is a fatal
/// configuration error. Returning `Err` aborts the whole run.
#[async_trait]
pub trait Suite: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, cx: &mut SuiteContext) -> anyhow::Result<()>;
}

/// Leaf segment of a dotted suite name.
pub fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Explicit suite registry. Registration order is discovery order and
/// therefore execution order.
#[derive(Default)]
pub struct SuiteRegistry {
    suites: Vec<Box<dyn Suite>>,
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, suite: impl Suite + 'static) {
        self.suites.push(Box::new(suite));
    }

    pub fn names(&self) -> Vec<&str> {
        self.suites.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub(crate) fn suites(&self) -> &[Box<dyn Suite>] {
        &self.suites
    }
}
