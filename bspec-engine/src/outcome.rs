//! Outcomes of should-blocks and their causes

use std::fmt;

use bspec_assert::AssertionFailure;
use serde::Serialize;

use crate::capture::UnexpectedError;
use crate::collector::ExampleId;

/// Description of the outcome recorded when a given-block fails outside any
/// should-block
pub const GIVEN_BLOCK: &str = "completes its given block";

/// Why a should-block failed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cause {
    /// One or more checks reported through the checker
    Assertion { failures: Vec<AssertionFailure> },
    /// The closure returned an error or panicked; checks that failed before
    /// that point are kept
    Unexpected {
        error: UnexpectedError,
        failures: Vec<AssertionFailure>,
    },
}

impl Cause {
    /// `None` when the closure finished and nothing was reported
    pub fn from_result(
        result: Result<(), UnexpectedError>,
        failures: Vec<AssertionFailure>,
    ) -> Option<Cause> {
        match result {
            Ok(()) if failures.is_empty() => None,
            Ok(()) => Some(Cause::Assertion { failures }),
            Err(error) => Some(Cause::Unexpected { error, failures }),
        }
    }

    pub fn failures(&self) -> &[AssertionFailure] {
        match self {
            Cause::Assertion { failures } | Cause::Unexpected { failures, .. } => failures,
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, Cause::Unexpected { .. })
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        for failure in self.failures() {
            lines.push(failure.to_string());
        }
        if let Cause::Unexpected { error, .. } = self {
            lines.push(format!("Unexpected error: {}", error));
        }
        f.write_str(&lines.join("\n"))
    }
}

/// Result of one should-block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub example: ExampleId,
    pub description: String,
    pub cause: Option<Cause>,
}

impl Outcome {
    pub fn passed(&self) -> bool {
        self.cause.is_none()
    }

    pub fn failed(&self) -> bool {
        self.cause.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_from_result() {
        assert_eq!(Cause::from_result(Ok(()), Vec::new()), None);

        let failures = vec![AssertionFailure::new("1 == 2")];
        let cause = Cause::from_result(Ok(()), failures.clone()).unwrap();
        assert_eq!(cause, Cause::Assertion { failures: failures.clone() });
        assert_eq!(cause.to_string(), "Invalid assertion, 1 == 2");

        let cause = Cause::from_result(Err(UnexpectedError::new("boom")), failures).unwrap();
        assert!(cause.is_unexpected());
        assert_eq!(
            cause.to_string(),
            "Invalid assertion, 1 == 2\nUnexpected error: boom"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let cause = Cause::Unexpected {
            error: UnexpectedError::new("boom"),
            failures: Vec::new(),
        };
        let value = serde_json::to_value(&cause).unwrap();
        assert_eq!(value["kind"], "unexpected");
        assert_eq!(value["error"]["message"], "boom");
    }
}
