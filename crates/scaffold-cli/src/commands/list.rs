//! Implementation of the `scaffold list` command.

use serde_json::{Value, json};

use scaffold_core::{
    application::RegistryStore,
    domain::{GeneratorDefinition, Registry, Strategy},
};

use crate::{
    cli::{ListArgs, ListFormat},
    context::AppContext,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, ctx: &AppContext, output: &OutputManager) -> CliResult<()> {
    let fs = ctx.filesystem();
    let registry = RegistryStore::new(fs.as_ref(), ctx.workspace.registry_path()).load()?;

    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            output.header("Kinds:")?;
            for kind in registry.kinds() {
                output.print(&format!(
                    "  {:<12} {:<20} default: {:<20} ci: {}",
                    kind.name,
                    kind.output_dir,
                    kind.default_generator,
                    ci_flags(kind.ci.lint, kind.ci.test, kind.ci.build)
                ))?;
            }
            output.header("Generators:")?;
            for generator in registry.generators() {
                output.print(&format!(
                    "  {:<24} {:<12} {:<10} {:<8}{}",
                    generator.name,
                    generator.strategy.label(),
                    generator.toolchain,
                    generator.package_manager,
                    if is_untrusted(generator) { " (untrusted)" } else { "" }
                ))?;
            }
        }
        ListFormat::List => {
            for generator in registry.generators() {
                println!("{}", generator.name);
            }
        }
        ListFormat::Json => {
            output.json(&to_json(&registry))?;
        }
    }
    Ok(())
}

fn ci_flags(lint: bool, test: bool, build: bool) -> String {
    let flags: Vec<&str> = [("lint", lint), ("test", test), ("build", build)]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect();
    if flags.is_empty() {
        "-".into()
    } else {
        flags.join(",")
    }
}

fn is_untrusted(generator: &GeneratorDefinition) -> bool {
    matches!(&generator.strategy, Strategy::ExternalTemplate(ext) if !ext.trusted)
}

fn to_json(registry: &Registry) -> Value {
    let kinds: Vec<Value> = registry
        .kinds()
        .map(|kind| {
            json!({
                "name": kind.name,
                "output_dir": kind.output_dir,
                "default_generator": kind.default_generator,
                "ci": { "lint": kind.ci.lint, "test": kind.ci.test, "build": kind.ci.build },
            })
        })
        .collect();
    let generators: Vec<Value> = registry
        .generators()
        .map(|generator| {
            json!({
                "name": generator.name,
                "type": generator.strategy.label(),
                "toolchain": generator.toolchain,
                "package_manager": generator.package_manager,
                "trusted": !is_untrusted(generator),
                "tasks": generator.tasks.keys().collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "kinds": kinds, "generators": generators })
}
