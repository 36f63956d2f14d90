//! Generator strategies: turning a generator definition into a tree on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError, Workspace,
        ports::{CommandLine, OutputMode, Ports},
        services::tree::{CopyMode, copy_tree, remove_quietly},
    },
    domain::{
        CommandTemplate, CopySource, EngineSettings, ExternalTemplate, ProjectName, Strategy,
        Substitution, TemplateContext, TemplateVars,
    },
    error::ScaffoldResult,
};

/// Everything a strategy needs to know about the project being created.
pub struct MaterializeContext<'a> {
    pub workspace: &'a Workspace,
    pub generator: &'a str,
    pub name: &'a ProjectName,
    pub vars: &'a TemplateVars,
    pub destination: &'a Path,
}

/// Common interface of the generator strategies. The destination does not
/// exist on entry and does on success.
pub trait Materialize {
    fn materialize(&self, ports: &Ports, ctx: &MaterializeContext<'_>) -> ScaffoldResult<()>;
}

impl Materialize for Strategy {
    fn materialize(&self, ports: &Ports, ctx: &MaterializeContext<'_>) -> ScaffoldResult<()> {
        match self {
            Self::Copy(copy) => copy.materialize(ports, ctx),
            Self::Command(command) => command.materialize(ports, ctx),
            Self::ExternalTemplate(external) => external.materialize(ports, ctx),
        }
    }
}

impl Materialize for CopySource {
    #[instrument(skip_all, fields(generator = ctx.generator, source = %self.source))]
    fn materialize(&self, ports: &Ports, ctx: &MaterializeContext<'_>) -> ScaffoldResult<()> {
        let source = ctx.workspace.resolve(&self.source);
        if !ports.filesystem.is_dir(&source) {
            return Err(ApplicationError::FilesystemError {
                path: source,
                reason: format!("template source of generator '{}' is not a directory", ctx.generator),
            }
            .into());
        }

        match &self.engine {
            Some(engine) => render_with_engine(ports, ctx, &source, engine),
            None => {
                let substitution = Substitution::new(&self.substitutions, ctx.vars);
                let files = copy_tree(
                    ports.filesystem.as_ref(),
                    &source,
                    ctx.destination,
                    CopyMode::Substitute(&substitution),
                )?;
                info!(files, "Template copied");
                Ok(())
            }
        }
    }
}

impl Materialize for CommandTemplate {
    #[instrument(skip_all, fields(generator = ctx.generator))]
    fn materialize(&self, ports: &Ports, ctx: &MaterializeContext<'_>) -> ScaffoldResult<()> {
        let vars = ctx
            .vars
            .clone()
            .with("dest_dir", ctx.destination.to_string_lossy())
            .with("dest_path", ctx.workspace.relative_display(ctx.destination));
        let argv: Vec<String> = self.argv.iter().map(|arg| vars.render(arg)).collect();

        let command = CommandLine::from_argv(&argv, ctx.workspace.root(), OutputMode::Capture)
            .ok_or_else(|| ApplicationError::GeneratorExecution {
                generator: ctx.generator.to_string(),
                exit_code: None,
                stderr: "empty command".into(),
            })?;
        info!(command = %command.display(), "Running generator command");

        let output = ports.processes.run(&command)?;
        debug!(stdout = %output.stdout, "Generator command finished");
        if !output.success() {
            return Err(ApplicationError::GeneratorExecution {
                generator: ctx.generator.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            }
            .into());
        }

        if !ports.filesystem.exists(ctx.destination) {
            return Err(ApplicationError::GeneratorExecution {
                generator: ctx.generator.to_string(),
                exit_code: output.exit_code,
                stderr: format!(
                    "command succeeded but did not create {}",
                    ctx.workspace.relative_display(ctx.destination)
                ),
            }
            .into());
        }
        Ok(())
    }
}

impl Materialize for ExternalTemplate {
    #[instrument(skip_all, fields(generator = ctx.generator, source = %self.source))]
    fn materialize(&self, ports: &Ports, ctx: &MaterializeContext<'_>) -> ScaffoldResult<()> {
        if !self.needs_fetch() {
            let source = ctx.workspace.resolve(&self.source);
            return render_with_engine(ports, ctx, &source, &self.engine);
        }

        let checkout = ctx.workspace.scratch("fetch");
        let result = ports
            .vcs
            .fetch(
                &ctx.workspace.fetch_locator(&self.source),
                self.reference.as_deref(),
                &checkout,
            )
            .and_then(|()| render_with_engine(ports, ctx, &checkout, &self.engine));
        remove_quietly(ports.filesystem.as_ref(), &checkout);
        result
    }
}

/// Render through the external engine into scratch space, then copy the
/// single top-level directory it produced to the destination.
fn render_with_engine(
    ports: &Ports,
    ctx: &MaterializeContext<'_>,
    template_dir: &Path,
    engine: &EngineSettings,
) -> ScaffoldResult<()> {
    let fs = ports.filesystem.as_ref();
    let output_dir = ctx.workspace.scratch("render");
    let context = TemplateContext::build(engine, ctx.vars, ctx.name);

    let result = fs.create_dir_all(&output_dir).and_then(|()| {
        info!(template = %template_dir.display(), vars = context.len(), "Rendering template");
        let output = ports.engine.render(template_dir, &context, &output_dir)?;
        if !output.success() {
            return Err(ApplicationError::GeneratorExecution {
                generator: ctx.generator.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            }
            .into());
        }

        let rendered = single_top_level_dir(fs, &output_dir).map_err(|found| {
            ApplicationError::GeneratorExecution {
                generator: ctx.generator.to_string(),
                exit_code: output.exit_code,
                stderr: format!(
                    "template engine produced {found} top-level directories, expected exactly one"
                ),
            }
        })?;
        copy_tree(fs, &rendered, ctx.destination, CopyMode::Verbatim)?;
        Ok(())
    });

    remove_quietly(fs, &output_dir);
    result
}

fn single_top_level_dir(
    fs: &dyn crate::application::ports::Filesystem,
    dir: &Path,
) -> Result<PathBuf, usize> {
    let dirs: Vec<PathBuf> = fs
        .list_dir(dir)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| fs.is_dir(p))
        .collect();
    match <[PathBuf; 1]>::try_from(dirs) {
        Ok([only]) => Ok(only),
        Err(dirs) => Err(dirs.len()),
    }
}
