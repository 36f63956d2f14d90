//! Placeholder rendering, literal substitution and external template context.
//!
//! Two kinds of templating meet here:
//!
//! - **Literal substitution** (copy generators): `{name}`-style placeholders
//!   plus generator-declared tokens such as `__NAME__` are replaced verbatim
//!   in file contents and file names.
//! - **External templating** (cookiecutter-style engines): the engine owns
//!   rendering; we only build its variable context. Paths carrying the
//!   engine's own markers (`{{ ... }}`, `{% ... %}`) are never touched by
//!   literal substitution so nested third-party templates survive a copy
//!   byte-for-byte.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::domain::{naming::ProjectName, registry::EngineSettings};

/// Ordered `{key}` → value placeholder table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
    vars: Vec<(String, String)>,
}

impl TemplateVars {
    /// `{name}` and `{name_snake}` for a project.
    pub fn for_project(name: &ProjectName) -> Self {
        Self::default()
            .with("name", name.as_str())
            .with("name_snake", name.snake())
    }

    /// Set a variable, replacing an existing value in place.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every `{key}` occurrence with its value.
    pub fn render(&self, input: &str) -> String {
        self.vars.iter().fold(input.to_string(), |acc, (k, v)| {
            acc.replace(&format!("{{{k}}}"), v)
        })
    }
}

/// Literal token replacement used by the copy strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pairs: Vec<(String, String)>,
}

impl Substitution {
    /// Generator-declared tokens (values rendered against `vars`) followed by
    /// the `{var}` placeholders themselves.
    pub fn new(declared: &BTreeMap<String, String>, vars: &TemplateVars) -> Self {
        let mut pairs: Vec<(String, String)> = declared
            .iter()
            .filter(|(token, _)| !token.is_empty())
            .map(|(token, value)| (token.clone(), vars.render(value)))
            .collect();
        // Longest token first so `__NAME_SNAKE__` is not clobbered by a shorter prefix token.
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        pairs.extend(
            vars.vars
                .iter()
                .map(|(k, v)| (format!("{{{k}}}"), v.clone())),
        );
        Self { pairs }
    }

    pub fn apply(&self, text: &str) -> String {
        self.pairs
            .iter()
            .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
    }

    /// Apply to every normal component of a relative path.
    pub fn apply_path(&self, path: &Path) -> PathBuf {
        path.components()
            .map(|c| match c {
                Component::Normal(part) => PathBuf::from(self.apply(&part.to_string_lossy())),
                other => PathBuf::from(other.as_os_str()),
            })
            .collect()
    }
}

/// `true` when any component of `path` carries an unrendered external
/// templating marker.
pub fn has_template_marker(path: &Path) -> bool {
    path.components().any(|c| {
        let part = c.as_os_str().to_string_lossy();
        (part.contains("{{") && part.contains("}}")) || (part.contains("{%") && part.contains("%}"))
    })
}

/// Variable context handed to the external templating engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    entries: Vec<(String, String)>,
}

impl TemplateContext {
    /// `context_defaults` (placeholders rendered) with `name_var = name` on top.
    pub fn build(engine: &EngineSettings, vars: &TemplateVars, name: &ProjectName) -> Self {
        let mut ctx = Self {
            entries: engine
                .context_defaults
                .iter()
                .map(|(k, v)| (k.clone(), vars.render(v)))
                .collect(),
        };
        ctx.set(&engine.name_var, name.as_str());
        ctx
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> TemplateVars {
        TemplateVars::for_project(&ProjectName::parse("billing-api").unwrap())
    }

    #[test]
    fn renders_name_placeholders() {
        assert_eq!(vars().render("{name}/{name_snake}"), "billing-api/billing_api");
    }

    #[test]
    fn with_replaces_in_place() {
        let v = vars().with("name", "other");
        assert_eq!(v.get("name"), Some("other"));
        assert_eq!(v.render("{name}"), "other");
    }

    #[test]
    fn declared_tokens_resolve_against_vars() {
        let declared = BTreeMap::from([
            ("__NAME__".to_string(), "{name}".to_string()),
            ("__NAME_SNAKE__".to_string(), "{name_snake}".to_string()),
        ]);
        let sub = Substitution::new(&declared, &vars());
        assert_eq!(
            sub.apply("pkg __NAME_SNAKE__ for __NAME__"),
            "pkg billing_api for billing-api"
        );
    }

    #[test]
    fn longer_tokens_win_over_prefixes() {
        let declared = BTreeMap::from([
            ("__N".to_string(), "short".to_string()),
            ("__NAME".to_string(), "long".to_string()),
        ]);
        let sub = Substitution::new(&declared, &vars());
        assert_eq!(sub.apply("__NAME"), "long");
    }

    #[test]
    fn paths_are_substituted_per_component() {
        let sub = Substitution::new(&BTreeMap::new(), &vars());
        assert_eq!(
            sub.apply_path(Path::new("src/{name_snake}/__init__.py")),
            PathBuf::from("src/billing_api/__init__.py")
        );
    }

    #[test]
    fn detects_markers() {
        assert!(has_template_marker(Path::new(
            "internal/{{cookiecutter.project_slug}}/README.md"
        )));
        assert!(has_template_marker(Path::new("{% if x %}a{% endif %}")));
        assert!(!has_template_marker(Path::new("src/{name}/main.py")));
    }

    #[test]
    fn context_puts_name_var_over_defaults() {
        let engine = EngineSettings {
            name_var: "project_slug".into(),
            context_defaults: BTreeMap::from([
                ("package_name".to_string(), "{name_snake}".to_string()),
                ("project_slug".to_string(), "placeholder".to_string()),
            ]),
        };
        let name = ProjectName::parse("ext-proj").unwrap();
        let ctx = TemplateContext::build(&engine, &TemplateVars::for_project(&name), &name);
        assert_eq!(ctx.get("package_name"), Some("ext_proj"));
        assert_eq!(ctx.get("project_slug"), Some("ext-proj"));
        assert_eq!(ctx.len(), 2);
    }
}
