//! Process runner backed by `std::process::Command`.

use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, instrument};

use scaffold_core::{
    application::{
        ApplicationError,
        ports::{CommandLine, OutputMode, ProcessOutput, ProcessRunner},
    },
    error::ScaffoldResult,
};

/// Runs commands as blocking child processes. No timeout is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip_all, fields(program = %command.program, cwd = %command.cwd.display()))]
    fn run(&self, command: &CommandLine) -> ScaffoldResult<ProcessOutput> {
        let mut child = Command::new(&command.program);
        child.args(&command.args).current_dir(&command.cwd);

        let spawn_error = |e: std::io::Error| ApplicationError::ProcessSpawn {
            program: command.program.clone(),
            reason: e.to_string(),
        };

        let output = match command.mode {
            OutputMode::Capture => {
                let out = child
                    .stdin(Stdio::null())
                    .output()
                    .map_err(spawn_error)?;
                ProcessOutput {
                    exit_code: exit_code(out.status),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                }
            }
            OutputMode::Stream => {
                let status = child.status().map_err(spawn_error)?;
                ProcessOutput {
                    exit_code: exit_code(status),
                    ..ProcessOutput::default()
                }
            }
        };

        debug!(exit_code = ?output.exit_code, "Process exited");
        Ok(output)
    }
}

/// The child's code, or `128 + signal` on unix when it was killed.
fn exit_code(status: ExitStatus) -> Option<i32> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status.code().or_else(|| status.signal().map(|s| 128 + s))
    }
    #[cfg(not(unix))]
    {
        status.code()
    }
}
