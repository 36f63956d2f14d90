//! Project manifest (`monorepo.toml`).
//!
//! Entries are stored as generic ordered TOML tables, not as a fixed struct,
//! so operator-added keys (`owner = "team-x"`) survive every rewrite in their
//! original position relative to each other. [`ProjectRecord`] is the typed
//! view over the keys the tool itself manages.

use toml::{Table, Value};

use crate::domain::{
    error::DomainError,
    registry::{CiPolicy, GeneratorDefinition, KindDefinition, TaskTable},
};

/// Keys owned by the tool, in the order they are persisted.
pub const KNOWN_FIELDS: [&str; 8] = [
    "id",
    "path",
    "kind",
    "generator",
    "toolchain",
    "package_manager",
    "ci",
    "tasks",
];

const PROJECTS_KEY: &str = "projects";

/// Typed snapshot of one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: String,
    /// Repo-relative, forward slashes.
    pub path: String,
    pub kind: String,
    pub generator: String,
    pub toolchain: String,
    pub package_manager: String,
    pub ci: CiPolicy,
    pub tasks: TaskTable,
}

impl ProjectRecord {
    /// Snapshot a generator at creation time. Later registry edits never
    /// reach back into existing records.
    pub fn snapshot(
        id: &str,
        path: &str,
        kind: &KindDefinition,
        generator: &GeneratorDefinition,
    ) -> Self {
        Self {
            id: id.to_string(),
            path: path.to_string(),
            kind: kind.name.clone(),
            generator: generator.name.clone(),
            toolchain: generator.toolchain.clone(),
            package_manager: generator.package_manager.clone(),
            ci: kind.ci,
            tasks: generator.tasks.clone(),
        }
    }

    /// Project a raw entry. `id` and `path` are required; everything else
    /// falls back to empty so hand-written entries stay usable.
    pub fn from_table(table: &Table) -> Result<Self, DomainError> {
        let text = |key: &str| table.get(key).and_then(Value::as_str).map(str::to_string);

        let id = text("id").ok_or_else(|| {
            DomainError::InvalidManifest("project entry is missing a string 'id'".into())
        })?;
        let path = text("path").ok_or_else(|| {
            DomainError::InvalidManifest(format!("project '{id}' is missing a string 'path'"))
        })?;

        let ci = table
            .get("ci")
            .and_then(Value::as_table)
            .map(|ci| {
                let flag = |k: &str| ci.get(k).and_then(Value::as_bool).unwrap_or(false);
                CiPolicy {
                    lint: flag("lint"),
                    test: flag("test"),
                    build: flag("build"),
                }
            })
            .unwrap_or_default();

        let mut tasks = TaskTable::new();
        if let Some(raw) = table.get("tasks").and_then(Value::as_table) {
            for (name, argv) in raw {
                let argv = argv
                    .as_array()
                    .and_then(|items| {
                        items
                            .iter()
                            .map(|v| v.as_str().map(str::to_string))
                            .collect::<Option<Vec<_>>>()
                    })
                    .ok_or_else(|| {
                        DomainError::InvalidManifest(format!(
                            "project '{id}': tasks.{name} must be a list of strings"
                        ))
                    })?;
                tasks.insert(name.clone(), argv);
            }
        }

        Ok(Self {
            kind: text("kind").unwrap_or_default(),
            generator: text("generator").unwrap_or_default(),
            toolchain: text("toolchain").unwrap_or_default(),
            package_manager: text("package_manager").unwrap_or_default(),
            id,
            path,
            ci,
            tasks,
        })
    }

    fn known_values(&self) -> [(&'static str, Value); 8] {
        let mut ci = Table::new();
        ci.insert("lint".into(), Value::Boolean(self.ci.lint));
        ci.insert("test".into(), Value::Boolean(self.ci.test));
        ci.insert("build".into(), Value::Boolean(self.ci.build));

        let tasks = self
            .tasks
            .iter()
            .map(|(name, argv)| {
                let argv = argv.iter().cloned().map(Value::String).collect();
                (name.clone(), Value::Array(argv))
            })
            .collect::<Table>();

        [
            ("id", Value::String(self.id.clone())),
            ("path", Value::String(self.path.clone())),
            ("kind", Value::String(self.kind.clone())),
            ("generator", Value::String(self.generator.clone())),
            ("toolchain", Value::String(self.toolchain.clone())),
            ("package_manager", Value::String(self.package_manager.clone())),
            ("ci", Value::Table(ci)),
            ("tasks", Value::Table(tasks)),
        ]
    }
}

/// The whole manifest document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Top-level keys other than `projects`, kept as-is.
    document: Table,
    projects: Vec<Table>,
}

impl Manifest {
    pub fn from_toml_str(input: &str) -> Result<Self, DomainError> {
        let parsed: Table =
            toml::from_str(input).map_err(|e| DomainError::InvalidManifest(e.to_string()))?;

        // Split off `projects` without disturbing the order of the other keys.
        let mut raw_projects = None;
        let document: Table = parsed
            .into_iter()
            .filter_map(|(key, value)| {
                if key == PROJECTS_KEY {
                    raw_projects = Some(value);
                    None
                } else {
                    Some((key, value))
                }
            })
            .collect();

        let projects = match raw_projects {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Value::Table(table) => {
                        ProjectRecord::from_table(&table)?;
                        Ok(table)
                    }
                    other => Err(DomainError::InvalidManifest(format!(
                        "projects[{idx}] must be a table, found {}",
                        other.type_str()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(DomainError::InvalidManifest(format!(
                    "'projects' must be an array of tables, found {}",
                    other.type_str()
                )));
            }
        };

        let manifest = Self { document, projects };
        manifest.check_unique_ids()?;
        Ok(manifest)
    }

    fn check_unique_ids(&self) -> Result<(), DomainError> {
        let mut seen = std::collections::HashSet::new();
        for record in self.records() {
            if !seen.insert(record.id.clone()) {
                return Err(DomainError::InvalidManifest(format!(
                    "duplicate project id '{}'",
                    record.id
                )));
            }
        }
        Ok(())
    }

    /// Canonical serialization: known fields first in fixed order, then the
    /// entry's other keys in their original order.
    pub fn to_toml_string(&self) -> Result<String, DomainError> {
        let mut root = self.document.clone();
        let projects = self.projects.iter().map(canonical_entry).collect();
        root.insert(PROJECTS_KEY.into(), Value::Array(projects));
        toml::to_string(&root).map_err(|e| DomainError::InvalidManifest(e.to_string()))
    }

    /// Merge the tool-owned fields of `record` into the entry with the same
    /// id, or append a new entry. Other keys on an existing entry are left
    /// untouched.
    pub fn upsert(&mut self, record: &ProjectRecord) {
        let position = self
            .projects
            .iter()
            .position(|t| t.get("id").and_then(Value::as_str) == Some(record.id.as_str()));

        let table = match position {
            Some(idx) => &mut self.projects[idx],
            None => {
                self.projects.push(Table::new());
                let last = self.projects.len() - 1;
                &mut self.projects[last]
            }
        };

        for (key, value) in record.known_values() {
            table.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, id: &str) -> Option<ProjectRecord> {
        self.records().find(|r| r.id == id)
    }

    /// Typed views in manifest order. Entries were validated on load.
    pub fn records(&self) -> impl Iterator<Item = ProjectRecord> + '_ {
        self.projects
            .iter()
            .filter_map(|t| ProjectRecord::from_table(t).ok())
    }

    /// Raw entry, extra keys included.
    pub fn raw_entry(&self, id: &str) -> Option<&Table> {
        self.projects
            .iter()
            .find(|t| t.get("id").and_then(Value::as_str) == Some(id))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

fn canonical_entry(entry: &Table) -> Value {
    let mut ordered = Table::new();
    for key in KNOWN_FIELDS {
        if let Some(value) = entry.get(key) {
            ordered.insert(key.to_string(), value.clone());
        }
    }
    for (key, value) in entry {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            ordered.insert(key.clone(), value.clone());
        }
    }
    Value::Table(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{CopySource, Strategy};
    use std::collections::BTreeMap;

    fn record(id: &str) -> ProjectRecord {
        let kind = KindDefinition {
            name: "app".into(),
            output_dir: "apps".into(),
            default_generator: "g1".into(),
            ci: CiPolicy {
                lint: true,
                test: true,
                build: false,
            },
        };
        let generator = GeneratorDefinition {
            name: "g1".into(),
            toolchain: "python".into(),
            package_manager: "pdm".into(),
            tasks: BTreeMap::from([
                ("install".to_string(), vec!["pdm".to_string(), "install".to_string()]),
                ("test".to_string(), vec!["pdm".to_string(), "run".to_string()]),
            ]),
            strategy: Strategy::Copy(CopySource {
                source: "tpl".into(),
                substitutions: BTreeMap::new(),
                engine: None,
            }),
        };
        ProjectRecord::snapshot(id, &format!("apps/{id}"), &kind, &generator)
    }

    #[test]
    fn empty_input_is_an_empty_manifest() {
        let manifest = Manifest::from_toml_str("").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn upsert_then_reload_round_trips() {
        let mut manifest = Manifest::default();
        manifest.upsert(&record("billing-api"));

        let text = manifest.to_toml_string().unwrap();
        let reloaded = Manifest::from_toml_str(&text).unwrap();
        assert_eq!(reloaded.get("billing-api"), Some(record("billing-api")));
    }

    #[test]
    fn operator_fields_survive_upserts() {
        let input = r#"
version = 1

[[projects]]
owner = "team-x"
id = "billing-api"
path = "apps/billing-api"
generator = "g1"
notes = { oncall = "pager" }
"#;
        let mut manifest = Manifest::from_toml_str(input).unwrap();
        manifest.upsert(&record("billing-api"));
        manifest.upsert(&record("payments-api"));

        let text = manifest.to_toml_string().unwrap();
        let reloaded = Manifest::from_toml_str(&text).unwrap();
        let entry = reloaded.raw_entry("billing-api").unwrap();
        assert_eq!(entry.get("owner").and_then(Value::as_str), Some("team-x"));
        assert!(entry.get("notes").is_some());
        assert_eq!(reloaded.len(), 2);
        assert!(text.starts_with("version = 1"), "{text}");
    }

    #[test]
    fn known_fields_come_first_then_extras_in_original_order() {
        let input = r#"
[[projects]]
zeta = 1
id = "p"
alpha = 2
path = "apps/p"
"#;
        let manifest = Manifest::from_toml_str(input).unwrap();
        let text = manifest.to_toml_string().unwrap();
        let reloaded: Table = toml::from_str(&text).unwrap();
        let entry = reloaded["projects"].as_array().unwrap()[0].as_table().unwrap();
        let keys: Vec<&str> = entry.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "path", "zeta", "alpha"]);
    }

    #[test]
    fn serialization_is_deterministic() {
        let mut manifest = Manifest::default();
        manifest.upsert(&record("a"));
        manifest.upsert(&record("b"));
        let once = manifest.to_toml_string().unwrap();
        let twice = Manifest::from_toml_str(&once)
            .unwrap()
            .to_toml_string()
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_non_table_entries() {
        let err = Manifest::from_toml_str("projects = [1]").unwrap_err();
        assert!(err.to_string().contains("projects[0]"));
    }

    #[test]
    fn rejects_entries_without_id() {
        let err = Manifest::from_toml_str("[[projects]]\npath = \"x\"\n").unwrap_err();
        assert!(matches!(err, DomainError::InvalidManifest(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let input = "[[projects]]\nid = \"a\"\npath = \"x\"\n[[projects]]\nid = \"a\"\npath = \"y\"\n";
        assert!(Manifest::from_toml_str(input).is_err());
    }
}
