//! Task Runner - executes a project's recorded task commands.

use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError, Workspace,
        ports::{CommandLine, Filesystem, OutputMode, ProcessRunner},
        services::stores::ManifestStore,
    },
    domain::Manifest,
    error::ScaffoldResult,
};

/// Exit code reported when the child gave none.
const NO_EXIT_CODE: i32 = 1;

/// Result of running a task in one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRun {
    pub project: String,
    pub exit_code: i32,
}

pub struct TaskRunner {
    workspace: Workspace,
    filesystem: Box<dyn Filesystem>,
    processes: Box<dyn ProcessRunner>,
}

impl TaskRunner {
    pub fn new(
        workspace: Workspace,
        filesystem: Box<dyn Filesystem>,
        processes: Box<dyn ProcessRunner>,
    ) -> Self {
        Self {
            workspace,
            filesystem,
            processes,
        }
    }

    fn manifest(&self) -> ScaffoldResult<Manifest> {
        ManifestStore::new(self.filesystem.as_ref(), self.workspace.manifest_path()).load()
    }

    /// Run `task` for one project and return the child's exit code as-is.
    #[instrument(skip_all, fields(task = %task, project = %project_id))]
    pub fn run(&self, task: &str, project_id: &str) -> ScaffoldResult<i32> {
        let manifest = self.manifest()?;
        self.run_for(&manifest, task, project_id)
    }

    pub fn run_for(&self, manifest: &Manifest, task: &str, project_id: &str) -> ScaffoldResult<i32> {
        let record = manifest
            .get(project_id)
            .ok_or_else(|| ApplicationError::UnknownProject {
                id: project_id.to_string(),
                available: manifest.records().map(|r| r.id).collect(),
            })?;
        let argv = record
            .tasks
            .get(task)
            .ok_or_else(|| ApplicationError::UnknownTask {
                task: task.to_string(),
                project: record.id.clone(),
                available: record.tasks.keys().cloned().collect(),
            })?;

        let cwd = self.workspace.resolve(&record.path);
        if !self.filesystem.is_dir(&cwd) {
            return Err(ApplicationError::FilesystemError {
                path: cwd,
                reason: format!("directory of project '{}' does not exist", record.id),
            }
            .into());
        }

        let Some(command) = CommandLine::from_argv(argv, &cwd, OutputMode::Stream) else {
            info!("Task is declared with an empty command, nothing to run");
            return Ok(0);
        };
        info!(command = %command.display(), "Running task");

        let output = self.processes.run(&command)?;
        let code = output.exit_code.unwrap_or(NO_EXIT_CODE);
        info!(exit_code = code, "Task finished");
        Ok(code)
    }

    /// Run `task` in every project that declares it, in manifest order,
    /// stopping after the first nonzero exit.
    #[instrument(skip_all, fields(task = %task))]
    pub fn run_everywhere(&self, task: &str) -> ScaffoldResult<Vec<TaskRun>> {
        let manifest = self.manifest()?;
        let mut runs = Vec::new();
        for record in manifest.records().filter(|r| r.tasks.contains_key(task)) {
            let exit_code = self.run_for(&manifest, task, &record.id)?;
            runs.push(TaskRun {
                project: record.id,
                exit_code,
            });
            if exit_code != 0 {
                break;
            }
        }
        Ok(runs)
    }
}
