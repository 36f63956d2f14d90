//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only ever sees the [`Workspace`]
//! built from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables (`SCAFFOLD_PATHS__REGISTRY=...`)
//! 2. `--config FILE`
//! 3. `.scaffold.toml` at the repository root
//! 4. User config file (`config.toml` in the platform config dir)
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use scaffold_core::application::{
    Workspace,
    workspace::{DEFAULT_MANIFEST, DEFAULT_REGISTRY, DEFAULT_SCRATCH_DIR, DEFAULT_VENDOR_DIR},
};

/// Per-repository config file name.
pub const LOCAL_CONFIG_FILE: &str = ".scaffold.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Repository layout, relative to the repo root.
    pub paths: PathsConfig,
    /// External executables.
    pub tools: ToolsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub registry: PathBuf,
    pub manifest: PathBuf,
    pub vendor_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub git: String,
    pub cookiecutter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                registry: DEFAULT_REGISTRY.into(),
                manifest: DEFAULT_MANIFEST.into(),
                vendor_dir: DEFAULT_VENDOR_DIR.into(),
                scratch_dir: DEFAULT_SCRATCH_DIR.into(),
            },
            tools: ToolsConfig {
                git: "git".into(),
                cookiecutter: "cookiecutter".into(),
            },
            output: OutputConfig { no_color: false },
        }
    }
}

impl AppConfig {
    /// Load configuration for the repository at `repo_root`.
    ///
    /// Only an explicit `config_file` is required to exist.
    pub fn load(config_file: Option<&PathBuf>, repo_root: &Path) -> anyhow::Result<Self> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&Self::default()).context("Failed to build default configuration")?,
        );

        if let Some(user) = Self::config_path() {
            builder = builder.add_source(File::from(user).required(false));
        }
        builder = builder.add_source(File::from(repo_root.join(LOCAL_CONFIG_FILE)).required(false));
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("SCAFFOLD")
                .prefix_separator("_")
                .separator("__"),
        );

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Path to the user configuration file, if the platform has a config dir.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "scaffold", "scaffold")
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Repository layout for `root` with the configured paths.
    pub fn workspace(&self, root: &Path) -> Workspace {
        Workspace::new(root)
            .with_registry(&self.paths.registry)
            .with_manifest(&self.paths.manifest)
            .with_vendor_dir(&self.paths.vendor_dir)
            .with_scratch_dir(&self.paths.scratch_dir)
    }
}

/// Nearest ancestor of `start` holding the default registry or a local config
/// file, else `start`.
pub fn discover_repo_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(DEFAULT_REGISTRY).is_file() || dir.join(LOCAL_CONFIG_FILE).is_file())
        .unwrap_or(start)
        .to_path_buf()
}
