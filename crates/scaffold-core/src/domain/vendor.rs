//! Vendored template entries and their upstream provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    naming::ProjectName,
    registry::{CopySource, GeneratorDefinition, Strategy},
};

/// Provenance file written at the root of every vendored tree.
pub const UPSTREAM_FILE: &str = "UPSTREAM.toml";

/// License file names looked for at the upstream template root, in order.
pub const LICENSE_CANDIDATES: [&str; 4] = ["LICENSE", "LICENSE.md", "LICENSE.txt", "COPYING"];

const CURRENT_SUFFIX: &str = ".__current_tmp__";
const UPSTREAM_SUFFIX: &str = ".__upstream_tmp__";

/// Contents of `UPSTREAM.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Registry generator the template was imported from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at: Option<DateTime<Utc>>,
}

impl Provenance {
    pub fn from_toml_str(input: &str) -> Result<Self, DomainError> {
        toml::from_str(input).map_err(|e| DomainError::InvalidProvenance(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, DomainError> {
        toml::to_string(self).map_err(|e| DomainError::InvalidProvenance(e.to_string()))
    }

    /// The same provenance pointed at a different upstream ref.
    pub fn at_ref(&self, reference: &str, now: DateTime<Utc>) -> Self {
        Self {
            reference: Some(reference.to_string()),
            imported_at: Some(now),
            ..self.clone()
        }
    }
}

/// A locally mirrored external template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorEntry {
    pub alias: ProjectName,
    /// Vendored tree, repo-relative with forward slashes.
    pub path: String,
    pub provenance: Provenance,
}

impl VendorEntry {
    /// Sibling directory holding a copy of the live vendored tree.
    pub fn current_staging_name(alias: &str) -> String {
        format!("{alias}{CURRENT_SUFFIX}")
    }

    /// Sibling directory holding the upstream tree at the new ref.
    pub fn upstream_staging_name(alias: &str) -> String {
        format!("{alias}{UPSTREAM_SUFFIX}")
    }

    /// Registry entry for the vendored copy: a copy generator rendered through
    /// the template engine with the source generator's settings, tasks and
    /// toolchain metadata.
    pub fn vendored_generator(
        &self,
        source: &GeneratorDefinition,
    ) -> Result<GeneratorDefinition, DomainError> {
        let Strategy::ExternalTemplate(ext) = &source.strategy else {
            return Err(DomainError::StrategyMismatch {
                generator: source.name.clone(),
                expected: "cookiecutter",
                actual: source.strategy.label(),
            });
        };

        Ok(GeneratorDefinition {
            name: self.alias.to_string(),
            toolchain: source.toolchain.clone(),
            package_manager: source.package_manager.clone(),
            tasks: source.tasks.clone(),
            strategy: Strategy::Copy(CopySource {
                source: self.path.clone(),
                substitutions: Default::default(),
                engine: Some(ext.engine.clone()),
            }),
        })
    }
}
