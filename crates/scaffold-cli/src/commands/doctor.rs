//! Implementation of the `scaffold doctor` command.

use serde_json::json;

use scaffold_core::application::{Doctor, Severity};

use crate::{
    context::AppContext,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(ctx: &AppContext, output: &OutputManager) -> CliResult<()> {
    let report = Doctor::new(ctx.workspace.clone(), ctx.filesystem()).check()?;

    if output.is_json() {
        let findings: Vec<_> = report
            .findings
            .iter()
            .map(|f| {
                json!({
                    "severity": severity_label(f.severity),
                    "subject": f.subject,
                    "message": f.message,
                })
            })
            .collect();
        output.json(&json!({
            "kinds": report.kinds,
            "generators": report.generators,
            "projects": report.projects,
            "findings": findings,
        }))?;
    } else {
        output.header(&format!(
            "Repository at {}",
            ctx.workspace.root().display()
        ))?;
        output.print(&format!(
            "  {} kind(s), {} generator(s), {} project(s)",
            report.kinds, report.generators, report.projects
        ))?;
        for finding in &report.findings {
            let line = format!("{}: {}", finding.subject, finding.message);
            match finding.severity {
                Severity::Error => output.error(&line)?,
                Severity::Warning => output.warning(&line)?,
                Severity::Info => output.info(&line)?,
            }
        }
    }

    if report.has_errors() {
        return Err(CliError::DoctorFailed {
            errors: report.count(Severity::Error),
        });
    }
    output.success("No problems found")?;
    Ok(())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}
