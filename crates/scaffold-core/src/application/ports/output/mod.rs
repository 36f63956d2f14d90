//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `scaffold-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::application::ApplicationError;
use crate::domain::TemplateContext;
use crate::error::ScaffoldResult;

/// One entry of a recursive directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the walked root.
    pub path: PathBuf,
    pub is_dir: bool,
    pub executable: bool,
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `scaffold_adapters::filesystem::LocalFilesystem` (production)
/// - `scaffold_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ScaffoldResult<()>;

    /// Read a whole file.
    fn read(&self, path: &Path) -> ScaffoldResult<Vec<u8>>;

    /// Write content to a file, replacing it. The parent must exist.
    fn write_file(&self, path: &Path, content: &[u8]) -> ScaffoldResult<()>;

    /// Append to a file, creating it if needed.
    fn append_file(&self, path: &Path, content: &[u8]) -> ScaffoldResult<()>;

    /// Every entry below `root` (excluding `root`), parents before children,
    /// sorted by path.
    fn walk(&self, root: &Path) -> ScaffoldResult<Vec<TreeEntry>>;

    /// Immediate children of a directory, sorted.
    fn list_dir(&self, path: &Path) -> ScaffoldResult<Vec<PathBuf>>;

    /// Mark a file executable.
    fn set_executable(&self, path: &Path) -> ScaffoldResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> ScaffoldResult<()>;

    fn read_to_string(&self, path: &Path) -> ScaffoldResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: format!("not valid UTF-8: {e}"),
            }
            .into()
        })
    }
}

/// How a child's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect both streams into [`ProcessOutput`].
    Capture,
    /// Inherit the terminal; captured streams come back empty.
    Stream,
}

/// An argv-style command and where to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub mode: OutputMode,
}

impl CommandLine {
    /// Split a non-empty argv into program and arguments.
    pub fn from_argv(argv: &[String], cwd: &Path, mode: OutputMode) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
            mode,
        })
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when no exit code is available.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Port for running external programs (generators, installers, tasks).
///
/// A program that cannot be started is an `Err`; a program that runs and
/// exits nonzero is an `Ok` with that exit code.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    fn run(&self, command: &CommandLine) -> ScaffoldResult<ProcessOutput>;
}

/// Port for fetching template sources from version control.
///
/// Implemented by `scaffold_adapters::vcs::GitCli`.
pub trait VersionControl: Send + Sync {
    /// Materialize `source` at `reference` (or its default branch) into
    /// `destination`, without VCS metadata.
    fn fetch(&self, source: &str, reference: Option<&str>, destination: &Path)
    -> ScaffoldResult<()>;
}

/// Port for the external templating engine.
///
/// Implemented by `scaffold_adapters::engine::CookiecutterEngine`.
pub trait TemplateEngine: Send + Sync {
    /// Render `template_dir` with `context` into `output_dir`. The engine's
    /// own exit status is returned rather than turned into an error.
    fn render(
        &self,
        template_dir: &Path,
        context: &TemplateContext,
        output_dir: &Path,
    ) -> ScaffoldResult<ProcessOutput>;
}

/// The set of adapters a service runs against.
pub struct Ports {
    pub filesystem: Box<dyn Filesystem>,
    pub processes: Box<dyn ProcessRunner>,
    pub vcs: Box<dyn VersionControl>,
    pub engine: Box<dyn TemplateEngine>,
}
