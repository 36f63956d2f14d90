//! Template fetching through the `git` executable.

use std::path::Path;

use tracing::{debug, info, instrument};

use scaffold_core::{
    application::{
        ApplicationError,
        ports::{CommandLine, OutputMode, ProcessOutput, ProcessRunner, VersionControl},
    },
    error::ScaffoldResult,
};

/// `git clone` + `git checkout`, then the `.git` directory is dropped so the
/// destination holds a plain snapshot.
pub struct GitCli {
    program: String,
    processes: Box<dyn ProcessRunner>,
}

impl GitCli {
    pub fn new(program: impl Into<String>, processes: Box<dyn ProcessRunner>) -> Self {
        Self {
            program: program.into(),
            processes,
        }
    }

    fn git(&self, cwd: &Path, args: &[&str]) -> ScaffoldResult<ProcessOutput> {
        let command = CommandLine {
            program: self.program.clone(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: cwd.to_path_buf(),
            mode: OutputMode::Capture,
        };
        debug!(command = %command.display(), "git");
        self.processes.run(&command)
    }
}

impl VersionControl for GitCli {
    #[instrument(skip_all, fields(source = %source, reference = ?reference))]
    fn fetch(
        &self,
        source: &str,
        reference: Option<&str>,
        destination: &Path,
    ) -> ScaffoldResult<()> {
        let failed = |reason: String| ApplicationError::FetchFailed {
            url: source.to_string(),
            reference: reference.map(str::to_string),
            reason,
        };

        let parent = destination.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| failed(e.to_string()))?;
        let dest = destination.to_string_lossy();

        let mut clone_args = vec!["clone", "--quiet"];
        if reference.is_some() {
            clone_args.push("--no-checkout");
        }
        clone_args.extend([source, &*dest]);

        let out = self.git(parent, &clone_args)?;
        if !out.success() {
            return Err(failed(out.stderr.trim().to_string()).into());
        }

        if let Some(reference) = reference {
            let out = self.git(destination, &["checkout", "--quiet", reference])?;
            if !out.success() {
                return Err(failed(out.stderr.trim().to_string()).into());
            }
        }

        let metadata = destination.join(".git");
        if metadata.exists() {
            std::fs::remove_dir_all(&metadata).map_err(|e| failed(e.to_string()))?;
        }
        info!(destination = %destination.display(), "Template fetched");
        Ok(())
    }
}
