//! Expected-failure verification for negative test cases.
//!
//! Some fixtures are deliberately broken: the check passes only when the
//! converter reports exactly the expected failure. Message comparison is
//! exact — if the upstream message format drifts, that drift must surface
//! as a failure here rather than be papered over.

use crate::convert::{ConvertError, ConvertErrorKind};
use crate::result::CheckResult;

/// The failure a negative case asserts the converter must report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedFailure {
    pub kind: ConvertErrorKind,

    /// When set, the reported message must match exactly.
    pub message: Option<String>,
}

impl ExpectedFailure {
    /// Expect a failure of `kind` with any message.
    pub fn kind(kind: ConvertErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Expect a failure of `kind` with exactly `message`.
    pub fn with_message(kind: ConvertErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }
}

/// Check an operation outcome against an expected failure.
///
/// Produces one of four distinct verdicts:
/// - the operation succeeded: Fail ("should have failed"),
/// - it failed with the wrong kind: Fail naming the actual failure,
/// - it failed with the wrong message: Fail quoting both messages,
/// - it failed with the exact kind and message: Ok.
pub fn check_expected<T>(
    package: &str,
    name: impl Into<String>,
    outcome: Result<T, ConvertError>,
    expected: &ExpectedFailure,
) -> CheckResult {
    let name = name.into();
    match outcome {
        Ok(_) => CheckResult::fail(
            package,
            name,
            format!(
                "expected a {} failure, but the operation succeeded",
                expected.kind
            ),
        ),
        Err(err) if err.kind != expected.kind => CheckResult::fail(
            package,
            name,
            format!("expected a {} failure, got: {}", expected.kind, err),
        ),
        Err(err) => match &expected.message {
            Some(message) if *message != err.message => CheckResult::fail(
                package,
                name,
                format!(
                    "unexpected error message <{}>, expected <{}>",
                    err.message, message
                ),
            ),
            _ => CheckResult::ok(package, name),
        },
    }
}
