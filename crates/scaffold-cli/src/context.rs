//! Wiring of configuration to core services and concrete adapters.

use std::path::PathBuf;

use scaffold_adapters::{CookiecutterEngine, GitCli, LocalFilesystem, SystemProcessRunner};
use scaffold_core::application::{Filesystem, Ports, Workspace};

use crate::config::AppConfig;

pub struct AppContext {
    pub workspace: Workspace,
    pub config: AppConfig,
}

impl AppContext {
    pub fn new(root: PathBuf, config: AppConfig) -> Self {
        Self {
            workspace: config.workspace(&root),
            config,
        }
    }

    pub fn filesystem(&self) -> Box<dyn Filesystem> {
        Box::new(LocalFilesystem::new())
    }

    /// Production adapters for every port.
    pub fn ports(&self) -> Ports {
        Ports {
            filesystem: self.filesystem(),
            processes: Box::new(SystemProcessRunner::new()),
            vcs: Box::new(GitCli::new(
                self.config.tools.git.clone(),
                Box::new(SystemProcessRunner::new()),
            )),
            engine: Box::new(CookiecutterEngine::new(
                self.config.tools.cookiecutter.clone(),
                Box::new(SystemProcessRunner::new()),
            )),
        }
    }
}
