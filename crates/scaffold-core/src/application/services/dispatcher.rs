//! Generator Dispatcher - the `add` use case.
//!
//! Workflow:
//! 1. Resolve kind and generator from the registry
//! 2. Check the kind's CI task requirements and the trust gate
//! 3. Refuse an existing destination
//! 4. Materialize the generator's strategy into the destination
//! 5. Optionally run the generator's `install` task
//! 6. Record the project in the manifest
//!
//! Steps 1-3 never touch disk, so a failed precondition leaves no trace.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError, Workspace,
        ports::{CommandLine, OutputMode, Ports},
        services::{
            stores::{ManifestStore, RegistryStore},
            strategy::{Materialize, MaterializeContext},
        },
    },
    domain::{ProjectName, ProjectRecord, TemplateVars, TrustGate},
    error::ScaffoldResult,
};

/// Input of [`GeneratorDispatcher::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub kind: String,
    pub name: String,
    /// Overrides the kind's default generator.
    pub generator: Option<String>,
    /// Allow an untrusted external template for this invocation.
    pub trust: bool,
    pub no_install: bool,
}

impl AddRequest {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            generator: None,
            trust: false,
            no_install: false,
        }
    }

    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = Some(generator.into());
        self
    }

    pub fn trusted(mut self, trust: bool) -> Self {
        self.trust = trust;
        self
    }

    pub fn skip_install(mut self, no_install: bool) -> Self {
        self.no_install = no_install;
        self
    }
}

/// What happened to the post-create `install` task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// `--no-install` was given.
    Skipped,
    /// The generator declares no `install` task.
    NotDeclared,
    Succeeded,
    /// Reported to the user; the project and its manifest entry stay.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub record: ProjectRecord,
    pub destination: PathBuf,
    pub install: InstallOutcome,
}

pub struct GeneratorDispatcher {
    workspace: Workspace,
    ports: Ports,
}

impl GeneratorDispatcher {
    pub fn new(workspace: Workspace, ports: Ports) -> Self {
        Self { workspace, ports }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Create a new project.
    #[instrument(skip_all, fields(kind = %request.kind, name = %request.name))]
    pub fn add(&self, request: &AddRequest) -> ScaffoldResult<AddOutcome> {
        let fs = self.ports.filesystem.as_ref();
        let name = ProjectName::parse(&request.name)?;

        let registry = RegistryStore::new(fs, self.workspace.registry_path()).load()?;
        let (kind, generator) = registry.resolve(&request.kind, request.generator.as_deref())?;
        info!(generator = %generator.name, strategy = generator.strategy.label(), "Generator resolved");

        registry.validate(kind, generator)?;
        TrustGate::check(generator, request.trust)?;

        let manifest_store = ManifestStore::new(fs, self.workspace.manifest_path());
        let mut manifest = manifest_store.load()?;

        let destination = self
            .workspace
            .resolve(&kind.output_dir)
            .join(name.as_str());
        if fs.exists(&destination) {
            return Err(ApplicationError::DestinationExists { path: destination }.into());
        }

        let vars = TemplateVars::for_project(&name);
        let ctx = MaterializeContext {
            workspace: &self.workspace,
            generator: &generator.name,
            name: &name,
            vars: &vars,
            destination: &destination,
        };
        generator.strategy.materialize(&self.ports, &ctx)?;
        info!(destination = %destination.display(), "Project created");

        let install = if request.no_install {
            InstallOutcome::Skipped
        } else {
            match generator.tasks.get("install") {
                None => InstallOutcome::NotDeclared,
                Some(argv) => self.install(argv, &destination),
            }
        };

        let path = self.workspace.relative_display(&destination);
        let record = ProjectRecord::snapshot(name.as_str(), &path, kind, generator);
        manifest.upsert(&record);
        manifest_store.save(&manifest)?;

        Ok(AddOutcome {
            record,
            destination,
            install,
        })
    }

    fn install(&self, argv: &[String], destination: &std::path::Path) -> InstallOutcome {
        let Some(command) = CommandLine::from_argv(argv, destination, OutputMode::Stream) else {
            return InstallOutcome::Succeeded;
        };
        info!(command = %command.display(), "Running install task");

        match self.ports.processes.run(&command) {
            Ok(output) if output.success() => InstallOutcome::Succeeded,
            Ok(output) => {
                let reason = match output.exit_code {
                    Some(code) => format!("'{}' exited with code {code}", command.display()),
                    None => format!("'{}' was terminated", command.display()),
                };
                warn!(%reason, "Install task failed");
                InstallOutcome::Failed { reason }
            }
            Err(e) => {
                warn!(error = %e, "Install task could not be started");
                InstallOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
