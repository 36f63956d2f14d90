//! Consistency checks over the registry, manifest and vendor tree.

use tracing::instrument;

use crate::{
    application::{
        Workspace,
        ports::Filesystem,
        services::stores::{ManifestStore, RegistryStore},
    },
    domain::{Registry, Strategy, VendorEntry},
    error::ScaffoldResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    /// What the finding is about, e.g. `kind 'app'`.
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorReport {
    pub findings: Vec<Finding>,
    pub kinds: usize,
    pub generators: usize,
    pub projects: usize,
}

impl DoctorReport {
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    fn push(&mut self, severity: Severity, subject: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            severity,
            subject: subject.into(),
            message: message.into(),
        });
    }
}

pub struct Doctor {
    workspace: Workspace,
    filesystem: Box<dyn Filesystem>,
}

impl Doctor {
    pub fn new(workspace: Workspace, filesystem: Box<dyn Filesystem>) -> Self {
        Self {
            workspace,
            filesystem,
        }
    }

    /// Collect findings. Load failures become findings rather than errors so
    /// one broken file does not hide problems in the other.
    #[instrument(skip_all)]
    pub fn check(&self) -> ScaffoldResult<DoctorReport> {
        let fs = self.filesystem.as_ref();
        let mut report = DoctorReport::default();

        let registry_path = self.workspace.registry_path();
        if !fs.exists(registry_path) {
            report.push(
                Severity::Warning,
                "registry",
                format!(
                    "{} not found; run 'scaffold init' to create it",
                    self.workspace.relative_display(registry_path)
                ),
            );
        }
        match RegistryStore::new(fs, registry_path).load() {
            Ok(registry) => self.check_registry(&registry, &mut report),
            Err(e) => report.push(Severity::Error, "registry", e.to_string()),
        }

        match ManifestStore::new(fs, self.workspace.manifest_path()).load() {
            Ok(manifest) => {
                report.projects = manifest.len();
                for record in manifest.records() {
                    let dir = self.workspace.resolve(&record.path);
                    if !fs.is_dir(&dir) {
                        report.push(
                            Severity::Warning,
                            format!("project '{}'", record.id),
                            format!("directory {} does not exist", record.path),
                        );
                    }
                }
            }
            Err(e) => report.push(Severity::Error, "manifest", e.to_string()),
        }

        self.check_vendor_dir(&mut report)?;
        Ok(report)
    }

    fn check_registry(&self, registry: &Registry, report: &mut DoctorReport) {
        let fs = self.filesystem.as_ref();
        report.kinds = registry.kinds().count();
        report.generators = registry.generators().count();

        for kind in registry.kinds() {
            let Ok(generator) = registry.generator(&kind.default_generator) else {
                continue;
            };
            if let Err(e) = registry.validate(kind, generator) {
                report.push(Severity::Error, format!("kind '{}'", kind.name), e.to_string());
            }
        }

        for generator in registry.generators() {
            let subject = format!("generator '{}'", generator.name);
            match &generator.strategy {
                Strategy::Copy(copy) => {
                    let source = self.workspace.resolve(&copy.source);
                    if !fs.is_dir(&source) {
                        report.push(
                            Severity::Error,
                            subject,
                            format!("source directory {} does not exist", copy.source),
                        );
                    }
                }
                Strategy::ExternalTemplate(ext) if !ext.trusted => {
                    report.push(
                        Severity::Info,
                        subject,
                        "external template is not trusted; 'add' requires --trust",
                    );
                }
                _ => {}
            }
        }
    }

    fn check_vendor_dir(&self, report: &mut DoctorReport) -> ScaffoldResult<()> {
        let fs = self.filesystem.as_ref();
        let vendor_dir = self.workspace.vendor_dir();
        if !fs.is_dir(vendor_dir) {
            return Ok(());
        }
        for path in fs.list_dir(vendor_dir)? {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let staged = [
                VendorEntry::current_staging_name(""),
                VendorEntry::upstream_staging_name(""),
            ]
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()));
            if staged {
                report.push(
                    Severity::Warning,
                    format!("vendor '{name}'"),
                    "staged update left behind; merge and remove it",
                );
            }
        }
        Ok(())
    }
}
