//! Implementation of the `scaffold add` command.

use serde_json::json;
use tracing::instrument;

use scaffold_core::application::{AddRequest, GeneratorDispatcher, InstallOutcome};

use crate::{cli::AddArgs, context::AppContext, error::CliResult, output::OutputManager};

#[instrument(skip_all, fields(kind = %args.kind, name = %args.name))]
pub fn execute(args: AddArgs, ctx: &AppContext, output: &OutputManager) -> CliResult<()> {
    let mut request = AddRequest::new(args.kind, args.name)
        .trusted(args.trust)
        .skip_install(args.no_install);
    if let Some(generator) = args.generator {
        request = request.with_generator(generator);
    }

    let dispatcher = GeneratorDispatcher::new(ctx.workspace.clone(), ctx.ports());
    let outcome = dispatcher.add(&request)?;
    let record = &outcome.record;

    if let InstallOutcome::Failed { reason } = &outcome.install {
        output.warning(&format!(
            "Install task failed: {reason}. The project was created; run 'scaffold run install --project {}' to retry.",
            record.id
        ))?;
    }

    if output.is_json() {
        let install = match &outcome.install {
            InstallOutcome::Skipped => "skipped",
            InstallOutcome::NotDeclared => "not_declared",
            InstallOutcome::Succeeded => "succeeded",
            InstallOutcome::Failed { .. } => "failed",
        };
        output.json(&json!({
            "id": record.id,
            "path": record.path,
            "kind": record.kind,
            "generator": record.generator,
            "install": install,
        }))?;
        return Ok(());
    }

    output.success(&format!(
        "Created {} '{}' at {} (generator '{}')",
        record.kind, record.id, record.path, record.generator
    ))?;
    if !record.tasks.is_empty() {
        let tasks: Vec<&str> = record.tasks.keys().map(String::as_str).collect();
        output.print(&format!("  Tasks: {}", tasks.join(", ")))?;
    }
    Ok(())
}
