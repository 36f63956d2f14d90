//! Rendering through the `cookiecutter` executable.

use std::path::Path;

use tracing::instrument;

use scaffold_core::{
    application::ports::{CommandLine, OutputMode, ProcessOutput, ProcessRunner, TemplateEngine},
    domain::TemplateContext,
    error::ScaffoldResult,
};

/// `cookiecutter <template> --no-input --output-dir <out> key=value ...`
pub struct CookiecutterEngine {
    program: String,
    processes: Box<dyn ProcessRunner>,
}

impl CookiecutterEngine {
    pub fn new(program: impl Into<String>, processes: Box<dyn ProcessRunner>) -> Self {
        Self {
            program: program.into(),
            processes,
        }
    }

    fn command_line(
        &self,
        template_dir: &Path,
        context: &TemplateContext,
        output_dir: &Path,
    ) -> CommandLine {
        let mut args = vec![
            template_dir.to_string_lossy().into_owned(),
            "--no-input".to_string(),
            "--output-dir".to_string(),
            output_dir.to_string_lossy().into_owned(),
        ];
        args.extend(context.iter().map(|(k, v)| format!("{k}={v}")));
        CommandLine {
            program: self.program.clone(),
            args,
            cwd: output_dir.to_path_buf(),
            mode: OutputMode::Capture,
        }
    }
}

impl TemplateEngine for CookiecutterEngine {
    #[instrument(skip_all, fields(template = %template_dir.display()))]
    fn render(
        &self,
        template_dir: &Path,
        context: &TemplateContext,
        output_dir: &Path,
    ) -> ScaffoldResult<ProcessOutput> {
        self.processes
            .run(&self.command_line(template_dir, context, output_dir))
    }
}
