//! Implementation of the `scaffold run` command.

use tracing::instrument;

use scaffold_core::application::TaskRunner;

use crate::{
    cli::RunArgs,
    context::AppContext,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(task = %args.task))]
pub fn execute(args: RunArgs, ctx: &AppContext, output: &OutputManager) -> CliResult<()> {
    let runner = TaskRunner::new(
        ctx.workspace.clone(),
        ctx.filesystem(),
        ctx.ports().processes,
    );

    match args.project {
        Some(project) => {
            let code = runner.run(&args.task, &project)?;
            if code != 0 {
                return Err(CliError::TaskExited {
                    task: args.task,
                    project,
                    code,
                });
            }
        }
        None => {
            let runs = runner.run_everywhere(&args.task)?;
            if runs.is_empty() {
                output.warning(&format!("No project declares task '{}'", args.task))?;
                return Ok(());
            }
            if let Some(failed) = runs.iter().find(|r| r.exit_code != 0) {
                return Err(CliError::TaskExited {
                    task: args.task,
                    project: failed.project.clone(),
                    code: failed.exit_code,
                });
            }
            output.success(&format!(
                "Task '{}' passed in {} project(s)",
                args.task,
                runs.len()
            ))?;
        }
    }
    Ok(())
}
