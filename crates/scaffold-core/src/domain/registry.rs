//! Generator and kind registry.
//!
//! # `registry.toml` format
//!
//! ```toml
//! [kinds.app]
//! output_dir        = "apps"
//! default_generator = "python_stdlib_copy"
//! ci                = { lint = true, test = true, build = false }
//!
//! [generators.python_stdlib_copy]
//! type            = "copy"
//! source          = "tools/templates/internal/python-stdlib-copy"
//! toolchain       = "python"
//! package_manager = "none"
//! substitutions   = { "__NAME__" = "{name}", "__NAME_SNAKE__" = "{name_snake}" }
//! tasks.lint      = ["python", "-m", "compileall", "src"]
//! tasks.test      = ["python", "-m", "unittest", "discover", "-s", "tests"]
//!
//! [generators.node_vite]
//! type    = "command"
//! command = ["npm", "create", "vite@latest", "{dest_path}", "--", "--template", "react-ts"]
//!
//! [generators.external]
//! type             = "cookiecutter"           # alias: "external"
//! source           = "https://github.com/org/template.git"
//! ref              = "v1.2.0"
//! trusted          = false
//! name_var         = "project_slug"
//! context_defaults = { package_name = "{name_snake}" }
//! ```
//!
//! Copy generators may carry an `engine = { name_var, context_defaults }`
//! table, in which case the local tree is rendered by the external engine
//! rather than by literal substitution. Vendored templates are registered
//! this way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Task name → argv. Sorted so manifest snapshots serialize deterministically.
pub type TaskTable = BTreeMap<String, Vec<String>>;

/// CI tasks a kind requires from every generator used under it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiPolicy {
    #[serde(default)]
    pub lint: bool,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub build: bool,
}

impl CiPolicy {
    pub fn required_tasks(&self) -> Vec<&'static str> {
        [("lint", self.lint), ("test", self.test), ("build", self.build)]
            .into_iter()
            .filter_map(|(task, required)| required.then_some(task))
            .collect()
    }
}

/// A category of project with its own location and CI requirements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KindDefinition {
    #[serde(skip)]
    pub name: String,
    pub output_dir: String,
    pub default_generator: String,
    #[serde(default)]
    pub ci: CiPolicy,
}

/// Settings for rendering through the external templating engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// The template's own variable holding the project name.
    pub name_var: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context_defaults: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySource {
    /// Directory relative to the repo root (or absolute).
    pub source: String,
    pub substitutions: BTreeMap<String, String>,
    pub engine: Option<EngineSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub argv: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTemplate {
    /// Local path or remote URI.
    pub source: String,
    pub reference: Option<String>,
    pub trusted: bool,
    pub engine: EngineSettings,
}

impl ExternalTemplate {
    /// Remote sources and pinned refs go through version control; a local,
    /// unpinned source is rendered in place.
    pub fn needs_fetch(&self) -> bool {
        self.reference.is_some() || is_remote(&self.source)
    }
}

/// `scheme://...` or scp-style `git@host:path`.
pub fn is_remote(source: &str) -> bool {
    source.contains("://") || source.starts_with("git@")
}

/// How a generator produces its initial tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Copy(CopySource),
    Command(CommandTemplate),
    ExternalTemplate(ExternalTemplate),
}

impl Strategy {
    /// The `type` discriminator as written in the registry.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Copy(_) => "copy",
            Self::Command(_) => "command",
            Self::ExternalTemplate(_) => "cookiecutter",
        }
    }
}

/// One reusable project template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorDefinition {
    pub name: String,
    pub toolchain: String,
    pub package_manager: String,
    pub tasks: TaskTable,
    pub strategy: Strategy,
}

impl GeneratorDefinition {
    /// Task names the kind requires but this generator does not declare.
    pub fn missing_tasks(&self, policy: &CiPolicy) -> Vec<String> {
        policy
            .required_tasks()
            .into_iter()
            .filter(|task| !self.tasks.contains_key(*task))
            .map(str::to_string)
            .collect()
    }

    /// Serialize as a standalone `[generators.<name>]` TOML table.
    pub fn to_toml_snippet(&self) -> Result<String, DomainError> {
        let doc = BTreeMap::from([(
            "generators",
            BTreeMap::from([(self.name.as_str(), GeneratorTable::from(self))]),
        )]);
        toml::to_string(&doc).map_err(|e| {
            DomainError::InvalidRegistry(format!("cannot serialize generator '{}': {e}", self.name))
        })
    }
}

/// Loaded registry: kinds and generators by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    kinds: BTreeMap<String, KindDefinition>,
    generators: BTreeMap<String, GeneratorDefinition>,
}

impl Registry {
    /// Parse and cross-check a registry document.
    pub fn from_toml_str(input: &str) -> Result<Self, DomainError> {
        let file: RegistryFile =
            toml::from_str(input).map_err(|e| DomainError::InvalidRegistry(e.to_string()))?;

        let generators = file
            .generators
            .into_iter()
            .map(|(name, table)| table.into_definition(&name).map(|def| (name, def)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let kinds = file
            .kinds
            .into_iter()
            .map(|(name, mut kind)| {
                kind.name = name.clone();
                (name, kind)
            })
            .collect::<BTreeMap<_, _>>();

        let registry = Self { kinds, generators };
        registry.check_references()?;
        Ok(registry)
    }

    fn check_references(&self) -> Result<(), DomainError> {
        for kind in self.kinds.values() {
            if !self.generators.contains_key(&kind.default_generator) {
                return Err(DomainError::InvalidRegistry(format!(
                    "kind '{}' names default_generator '{}' which is not defined under [generators]",
                    kind.name, kind.default_generator
                )));
            }
            if kind.output_dir.trim().is_empty() {
                return Err(DomainError::InvalidRegistry(format!(
                    "kind '{}' has an empty output_dir",
                    kind.name
                )));
            }
        }
        Ok(())
    }

    pub fn kind(&self, name: &str) -> Result<&KindDefinition, DomainError> {
        self.kinds.get(name).ok_or_else(|| DomainError::UnknownKind {
            kind: name.to_string(),
            available: self.kinds.keys().cloned().collect(),
        })
    }

    pub fn generator(&self, name: &str) -> Result<&GeneratorDefinition, DomainError> {
        self.generators
            .get(name)
            .ok_or_else(|| DomainError::UnknownGenerator {
                generator: name.to_string(),
                available: self.generators.keys().cloned().collect(),
            })
    }

    /// Kind plus the requested generator (or the kind's default).
    pub fn resolve(
        &self,
        kind: &str,
        generator: Option<&str>,
    ) -> Result<(&KindDefinition, &GeneratorDefinition), DomainError> {
        let kind = self.kind(kind)?;
        let generator = self.generator(generator.unwrap_or(&kind.default_generator))?;
        Ok((kind, generator))
    }

    /// Pre-flight check: the generator declares every task the kind's CI
    /// policy requires. Pure; never touches disk.
    pub fn validate(
        &self,
        kind: &KindDefinition,
        generator: &GeneratorDefinition,
    ) -> Result<(), DomainError> {
        let missing_tasks = generator.missing_tasks(&kind.ci);
        if missing_tasks.is_empty() {
            Ok(())
        } else {
            Err(DomainError::MissingTask {
                kind: kind.name.clone(),
                generator: generator.name.clone(),
                missing_tasks,
            })
        }
    }

    pub fn contains_generator(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindDefinition> {
        self.kinds.values()
    }

    pub fn generators(&self) -> impl Iterator<Item = &GeneratorDefinition> {
        self.generators.values()
    }

    pub fn insert_generator(&mut self, generator: GeneratorDefinition) {
        self.generators.insert(generator.name.clone(), generator);
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() && self.generators.is_empty()
    }
}

// ── On-disk representation ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    kinds: BTreeMap<String, KindDefinition>,
    #[serde(default)]
    generators: BTreeMap<String, GeneratorTable>,
}

/// Flat `[generators.<name>]` table; which fields matter depends on `type`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct GeneratorTable {
    #[serde(rename = "type")]
    strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<Vec<String>>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trusted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name_var: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    context_defaults: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    toolchain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    package_manager: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    substitutions: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    engine: Option<EngineSettings>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    tasks: TaskTable,
}

impl GeneratorTable {
    fn into_definition(self, name: &str) -> Result<GeneratorDefinition, DomainError> {
        let invalid = |what: &str| {
            DomainError::InvalidRegistry(format!("generator '{name}' ({}): {what}", self.strategy))
        };

        let strategy = match self.strategy.as_str() {
            "copy" => Strategy::Copy(CopySource {
                source: self
                    .source
                    .clone()
                    .ok_or_else(|| invalid("missing 'source'"))?,
                substitutions: self.substitutions.clone(),
                engine: self.engine.clone(),
            }),
            "command" => {
                let argv = self
                    .command
                    .clone()
                    .filter(|argv| !argv.is_empty())
                    .ok_or_else(|| invalid("missing or empty 'command'"))?;
                Strategy::Command(CommandTemplate { argv })
            }
            "cookiecutter" | "external" => Strategy::ExternalTemplate(ExternalTemplate {
                source: self
                    .source
                    .clone()
                    .ok_or_else(|| invalid("missing 'source'"))?,
                reference: self.reference.clone(),
                trusted: self.trusted.unwrap_or(false),
                engine: EngineSettings {
                    name_var: self
                        .name_var
                        .clone()
                        .ok_or_else(|| invalid("missing 'name_var'"))?,
                    context_defaults: self.context_defaults.clone(),
                },
            }),
            other => {
                return Err(DomainError::InvalidRegistry(format!(
                    "generator '{name}' has unknown type '{other}' (expected copy, command or cookiecutter)"
                )));
            }
        };

        Ok(GeneratorDefinition {
            name: name.to_string(),
            toolchain: self.toolchain.unwrap_or_default(),
            package_manager: self.package_manager.unwrap_or_default(),
            tasks: self.tasks,
            strategy,
        })
    }
}

impl From<&GeneratorDefinition> for GeneratorTable {
    fn from(def: &GeneratorDefinition) -> Self {
        let mut table = Self {
            strategy: def.strategy.label().to_string(),
            toolchain: Some(def.toolchain.clone()).filter(|s| !s.is_empty()),
            package_manager: Some(def.package_manager.clone()).filter(|s| !s.is_empty()),
            tasks: def.tasks.clone(),
            ..Self::default()
        };

        match &def.strategy {
            Strategy::Copy(copy) => {
                table.source = Some(copy.source.clone());
                table.substitutions = copy.substitutions.clone();
                table.engine = copy.engine.clone();
            }
            Strategy::Command(cmd) => {
                table.command = Some(cmd.argv.clone());
            }
            Strategy::ExternalTemplate(ext) => {
                table.source = Some(ext.source.clone());
                table.reference = ext.reference.clone();
                table.trusted = Some(ext.trusted);
                table.name_var = Some(ext.engine.name_var.clone());
                table.context_defaults = ext.engine.context_defaults.clone();
            }
        }
        table
    }
}
