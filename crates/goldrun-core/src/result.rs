//! Check results: the immutable outcome records produced by suite checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display truncation window for long check names.
const LABEL_HEAD: usize = 30;
const LABEL_TAIL: usize = 76;

/// Pass/fail classification of one checked assertion.
///
/// Deliberately two-valued: a suite that wants skip semantics simply
/// records no result for the skipped check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    Fail,
}

/// Outcome of one checkable assertion, tagged by its owning suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Owning suite identifier, used as the aggregation key.
    pub package: String,

    /// Human-readable description of the checked assertion.
    pub name: String,

    /// Pass/fail classification.
    pub outcome: Outcome,

    /// Diagnostic payload: diff text, captured process output, or free
    /// text. Present on failures, optional on successes.
    pub log: Option<String>,
}

impl CheckResult {
    /// A passing result without diagnostics.
    pub fn ok(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            outcome: Outcome::Ok,
            log: None,
        }
    }

    /// A failing result with its diagnostic log.
    pub fn fail(
        package: impl Into<String>,
        name: impl Into<String>,
        log: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            outcome: Outcome::Fail,
            log: Some(log.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }

    fn tag(&self) -> &'static str {
        match self.outcome {
            Outcome::Ok => "[OK]",
            Outcome::Fail => "[FAIL]",
        }
    }

    /// Name shortened for one-line progress markers. Persisted logs always
    /// carry the full name.
    pub fn display_name(&self) -> String {
        let chars: Vec<char> = self.name.chars().collect();
        if chars.len() <= LABEL_HEAD + LABEL_TAIL {
            return self.name.clone();
        }
        let head: String = chars[..LABEL_HEAD].iter().collect();
        let tail: String = chars[chars.len() - LABEL_TAIL..].iter().collect();
        format!("{head}\u{00b7}\u{00b7}\u{00b7}{tail}")
    }

    /// Full record for the persisted failure log: untruncated name plus the
    /// complete diagnostic payload.
    pub fn detail(&self) -> String {
        match &self.log {
            Some(log) => format!("---\n{} {}: {}\n{}", self.tag(), self.package, self.name, log),
            None => format!("---\n{} {}: {}", self.tag(), self.package, self.name),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.tag(), self.package, self.display_name())
    }
}
