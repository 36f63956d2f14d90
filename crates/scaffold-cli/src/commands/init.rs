//! `scaffold init`: create an empty registry and manifest.

use std::path::Path;

use scaffold_core::application::Filesystem;

use crate::{cli::InitArgs, context::AppContext, error::CliResult, output::OutputManager};

const REGISTRY_TEMPLATE: &str = r#"# Generator registry.
#
# [kinds.app]
# output_dir = "apps"
# default_generator = "python_copy"
# ci = { lint = true, test = true, build = false }
#
# [generators.python_copy]
# type = "copy"
# source = "tools/templates/internal/python-copy"
# toolchain = "python"
# package_manager = "none"
# substitutions = { "__NAME__" = "{name}", "__NAME_SNAKE__" = "{name_snake}" }
# tasks.lint = ["python", "-m", "compileall", "src"]
# tasks.test = ["python", "-m", "unittest"]
"#;

const MANIFEST_TEMPLATE: &str = "# Projects created by 'scaffold add'.\n";

pub fn execute(args: InitArgs, ctx: &AppContext, output: &OutputManager) -> CliResult<()> {
    let fs = ctx.filesystem();
    let files = [
        (ctx.workspace.registry_path(), REGISTRY_TEMPLATE),
        (ctx.workspace.manifest_path(), MANIFEST_TEMPLATE),
    ];

    for (path, content) in files {
        let shown = ctx.workspace.relative_display(path);
        if fs.exists(path) && !args.force {
            output.warning(&format!(
                "{shown} already exists (use --force to overwrite)"
            ))?;
            continue;
        }
        write(fs.as_ref(), path, content)?;
        output.success(&format!("Created {shown}"))?;
    }
    Ok(())
}

fn write(fs: &dyn Filesystem, path: &Path, content: &str) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent)?;
    }
    fs.write_file(path, content.as_bytes())?;
    Ok(())
}
