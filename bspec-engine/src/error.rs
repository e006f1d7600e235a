//! Engine error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpecError>;

/// Failures that stop a run before any example executes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecError {
    #[error("{operation}() {reason}")]
    IllegalUsage {
        operation: &'static str,
        reason: &'static str,
    },

    #[error("definition of {subject} failed: {message}")]
    Definition { subject: String, message: String },

    #[error("cannot start worker pool: {0}")]
    WorkerPool(String),
}

impl SpecError {
    pub fn illegal_usage(operation: &'static str, reason: &'static str) -> Self {
        SpecError::IllegalUsage { operation, reason }
    }

    pub fn definition(subject: impl Into<String>, error: &anyhow::Error) -> Self {
        SpecError::Definition {
            subject: subject.into(),
            message: format!("{:#}", error),
        }
    }

    pub fn is_illegal_usage(&self) -> bool {
        matches!(self, SpecError::IllegalUsage { .. })
    }
}
