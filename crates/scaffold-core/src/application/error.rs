//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! rules. Business rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while orchestrating a use case.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The destination of a new project is already present. Never overwritten.
    #[error("destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// A vendor alias collides with an existing vendor dir or generator.
    #[error("alias '{alias}' already exists in the {location}")]
    AliasExists { alias: String, location: String },

    #[error("'{alias}' is not a vendored template (no {} found)", crate::domain::UPSTREAM_FILE)]
    NotVendored { alias: String },

    /// A previous staged update has not been cleaned up.
    #[error("staging directory already exists: {path}")]
    StagingExists { path: PathBuf },

    /// An external generator, engine or fetch tool exited unsuccessfully.
    #[error("generator '{generator}' failed ({}){}", exit_label(.exit_code), stderr_tail(.stderr))]
    GeneratorExecution {
        generator: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The program could not be started at all.
    #[error("failed to start '{program}': {reason}")]
    ProcessSpawn { program: String, reason: String },

    #[error("failed to fetch '{url}'{}: {reason}", at_ref(.reference))]
    FetchFailed {
        url: String,
        reference: Option<String>,
        reason: String,
    },

    #[error("unknown project '{id}'")]
    UnknownProject { id: String, available: Vec<String> },

    #[error("project '{project}' has no task '{task}'")]
    UnknownTask {
        task: String,
        project: String,
        available: Vec<String>,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Registry or manifest could not be written back.
    #[error("failed to persist {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".into(),
    }
}

fn at_ref(reference: &Option<String>) -> String {
    reference
        .as_deref()
        .map(|r| format!(" at {r}"))
        .unwrap_or_default()
}

fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DestinationExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Choose a different project name".into(),
                "Or remove the directory if it is a leftover from an interrupted run".into(),
            ],
            Self::AliasExists { .. } => vec!["Pick another alias with --as <alias>".into()],
            Self::NotVendored { .. } => vec![
                "Import it first: scaffold vendor import <generator> --as <alias>".into(),
            ],
            Self::StagingExists { .. } => vec![
                "A previous update is still staged; finish the merge and remove both *.__current_tmp__ and *.__upstream_tmp__ directories".into(),
            ],
            Self::GeneratorExecution { .. } => vec![
                "Re-run with -v to see the generator's full output".into(),
                "Check that the generator's tools are installed and on PATH".into(),
            ],
            Self::ProcessSpawn { program, .. } => vec![
                format!("Make sure '{program}' is installed and on PATH"),
                "Tool locations can be set under [tools] in .scaffold.toml".into(),
            ],
            Self::FetchFailed { .. } => vec![
                "Check the source URL and that the ref exists upstream".into(),
                "Check network access and git credentials".into(),
            ],
            Self::UnknownProject { available, .. } => {
                let mut out = vec!["Projects are listed in the manifest under [[projects]]".into()];
                if !available.is_empty() {
                    out.push(format!("Known projects: {}", available.join(", ")));
                }
                out
            }
            Self::UnknownTask { available, .. } => {
                if available.is_empty() {
                    vec!["This project declares no tasks".into()]
                } else {
                    vec![format!("Declared tasks: {}", available.join(", "))]
                }
            }
            Self::FilesystemError { path, .. } | Self::Persistence { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DestinationExists { .. }
            | Self::AliasExists { .. }
            | Self::StagingExists { .. } => ErrorCategory::Validation,
            Self::NotVendored { .. } | Self::UnknownProject { .. } | Self::UnknownTask { .. } => {
                ErrorCategory::NotFound
            }
            Self::GeneratorExecution { .. } | Self::FetchFailed { .. } => ErrorCategory::Execution,
            Self::ProcessSpawn { .. } => ErrorCategory::Configuration,
            Self::FilesystemError { .. } | Self::Persistence { .. } => ErrorCategory::Internal,
        }
    }
}
