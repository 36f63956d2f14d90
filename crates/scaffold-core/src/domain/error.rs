// ============================================================================
// domain/error.rs - REGISTRY / MANIFEST / POLICY ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable
/// - Categorizable (for CLI display and exit codes)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    #[error("unknown kind '{kind}'")]
    UnknownKind { kind: String, available: Vec<String> },

    #[error("unknown generator '{generator}'")]
    UnknownGenerator {
        generator: String,
        available: Vec<String>,
    },

    // ========================================================================
    // Policy Errors
    // ========================================================================
    #[error(
        "generator '{generator}' does not satisfy the CI policy of kind '{kind}': missing {}",
        qualified_tasks(.missing_tasks)
    )]
    MissingTask {
        kind: String,
        generator: String,
        missing_tasks: Vec<String>,
    },

    #[error(
        "generator '{generator}' runs third-party template code and is not marked trusted; \
         re-run with --trust to allow it for this invocation"
    )]
    UntrustedGenerator { generator: String },

    #[error("generator '{generator}' uses the '{actual}' strategy, expected '{expected}'")]
    StrategyMismatch {
        generator: String,
        expected: &'static str,
        actual: &'static str,
    },

    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("invalid registry: {0}")]
    InvalidRegistry(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("invalid vendor provenance: {0}")]
    InvalidProvenance(String),
}

/// Render task names the way they are written in the registry (`tasks.test`).
fn qualified_tasks(tasks: &[String]) -> String {
    tasks
        .iter()
        .map(|t| format!("tasks.{t}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownKind { available, .. } => {
                let mut out = vec!["Kinds are declared under [kinds.<name>] in the registry".into()];
                if !available.is_empty() {
                    out.push(format!("Available kinds: {}", available.join(", ")));
                }
                out
            }
            Self::UnknownGenerator { available, .. } => {
                let mut out = vec![
                    "Generators are declared under [generators.<name>] in the registry".into(),
                    "List them with: scaffold list".into(),
                ];
                if !available.is_empty() {
                    out.push(format!("Available generators: {}", available.join(", ")));
                }
                out
            }
            Self::MissingTask {
                generator,
                missing_tasks,
                ..
            } => missing_tasks
                .iter()
                .map(|t| format!("Add tasks.{t} = [...] to [generators.{generator}]"))
                .chain(std::iter::once(
                    "Or pick another generator with --generator".to_string(),
                ))
                .collect(),
            Self::UntrustedGenerator { generator } => vec![
                "Review the upstream template before running it".into(),
                "Pass --trust to run it for this invocation".into(),
                format!("Or set trusted = true under [generators.{generator}]"),
                format!("Or vendor it: scaffold vendor import {generator} --as <alias>"),
            ],
            Self::InvalidProjectName { .. } => vec![
                "Use ASCII letters, digits, '-', '_' and '.'".into(),
                "Examples: billing-api, my_lib, web2".into(),
            ],
            Self::StrategyMismatch { .. } => {
                vec!["Only external template generators can be vendored".into()]
            }
            _ => vec!["Run 'scaffold doctor' to check the registry and manifest".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownKind { .. } | Self::UnknownGenerator { .. } => ErrorCategory::NotFound,
            Self::MissingTask { .. } | Self::StrategyMismatch { .. } => {
                ErrorCategory::Compatibility
            }
            Self::UntrustedGenerator { .. } | Self::InvalidProjectName { .. } => {
                ErrorCategory::Validation
            }
            Self::InvalidRegistry(_) | Self::InvalidManifest(_) | Self::InvalidProvenance(_) => {
                ErrorCategory::Configuration
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    NotFound,
    Configuration,
}
