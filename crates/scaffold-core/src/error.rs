//! Unified error handling for Scaffold Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Scaffold Core operations.
#[derive(Debug, Error, Clone)]
pub enum ScaffoldError {
    /// Errors from the domain layer (registry, manifest, policy violations).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration and I/O failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Missing or unusable configuration (registry/manifest locations, etc.).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl ScaffoldError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {message}"),
                "Run 'scaffold doctor' to check the registry and manifest".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in scaffold".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Compatibility => ErrorCategory::Compatibility,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Configuration,
    /// An external tool (generator, engine, VCS) failed.
    Execution,
    Internal,
}

/// Convenient result type alias.
pub type ScaffoldResult<T> = Result<T, ScaffoldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_task_is_a_compatibility_error() {
        let err: ScaffoldError = DomainError::MissingTask {
            kind: "app".into(),
            generator: "g1".into(),
            missing_tasks: vec!["test".into()],
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Compatibility);
        assert!(err.to_string().contains("tasks.test"));
    }

    #[test]
    fn generator_failure_is_an_execution_error() {
        let err: ScaffoldError = ApplicationError::GeneratorExecution {
            generator: "node_vite".into(),
            exit_code: Some(1),
            stderr: "boom".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Execution);
    }

    #[test]
    fn configuration_has_suggestions() {
        let err = ScaffoldError::Configuration {
            message: "bad".into(),
        };
        assert!(!err.suggestions().is_empty());
    }
}
