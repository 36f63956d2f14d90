//! Implementation of `scaffold vendor import` and `scaffold vendor update`.

use serde_json::json;

use scaffold_core::application::VendorService;

use crate::{cli::VendorCommands, context::AppContext, error::CliResult, output::OutputManager};

pub fn execute(cmd: VendorCommands, ctx: &AppContext, output: &OutputManager) -> CliResult<()> {
    let service = VendorService::new(ctx.workspace.clone(), ctx.ports());

    match cmd {
        VendorCommands::Import { generator, alias } => {
            let spinner = output.spinner(&format!("Vendoring '{generator}' as '{alias}'..."));
            let result = service.import(&generator, &alias);
            if let Some(bar) = spinner {
                bar.finish_and_clear();
            }
            let entry = result?;

            if output.is_json() {
                output.json(&json!({
                    "alias": entry.alias.as_str(),
                    "path": entry.path,
                    "source": entry.provenance.source,
                    "ref": entry.provenance.reference,
                    "license": entry.provenance.license,
                }))?;
                return Ok(());
            }
            output.success(&format!(
                "Vendored '{generator}' into {} as generator '{}'",
                entry.path, entry.alias
            ))?;
            if entry.provenance.license.is_none() {
                output.warning("No license file found in the upstream template")?;
            }
        }

        VendorCommands::Update { alias, reference } => {
            let spinner = output.spinner(&format!("Fetching '{alias}' at {reference}..."));
            let result = service.update(&alias, &reference);
            if let Some(bar) = spinner {
                bar.finish_and_clear();
            }
            let staged = result?;

            let current = ctx.workspace.relative_display(&staged.current);
            let upstream = ctx.workspace.relative_display(&staged.upstream);
            if output.is_json() {
                output.json(&json!({ "current": current, "upstream": upstream }))?;
                return Ok(());
            }
            output.success(&format!("Staged '{alias}' at {reference}"))?;
            output.print(&format!("  current:  {current}"))?;
            output.print(&format!("  upstream: {upstream}"))?;
            output.info("Merge the changes into the vendored tree, then delete both directories.")?;
        }
    }
    Ok(())
}
