//! Shared fixtures: an in-memory repository plus fake process, git and
//! template engine adapters that operate on the same memory filesystem.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use scaffold_adapters::MemoryFilesystem;
use scaffold_core::{
    application::{
        ApplicationError, Ports, Workspace,
        ports::{CommandLine, Filesystem, ProcessOutput, ProcessRunner, TemplateEngine, VersionControl},
    },
    domain::TemplateContext,
    error::ScaffoldResult,
};

pub const ROOT: &str = "/repo";

pub const REGISTRY: &str = r#"# Generator registry
[kinds.app]
output_dir = "apps"
default_generator = "python_copy"
ci = { lint = true, test = true, build = false }

[kinds.lib]
output_dir = "packages"
default_generator = "python_copy"
ci = { lint = false, test = true, build = false }

[generators.python_copy]
type = "copy"
source = "tools/templates/internal/python-copy"
toolchain = "python"
package_manager = "none"
substitutions = { "__NAME__" = "{name}", "__NAME_SNAKE__" = "{name_snake}" }
tasks.lint = ["python", "-m", "compileall", "src"]
tasks.test = ["python", "-m", "unittest", "discover", "-s", "tests"]

[generators.lint_only]
type = "copy"
source = "tools/templates/internal/python-copy"
tasks.lint = ["python", "-m", "compileall", "src"]

[generators.python_pdm_lib]
type = "copy"
source = "tools/templates/internal/python-pdm-lib"
toolchain = "python"
package_manager = "pdm"
substitutions = { "__NAME__" = "{name}", "__NAME_SNAKE__" = "{name_snake}" }
tasks.install = ["pdm", "install"]
tasks.lint = ["pdm", "run", "ruff", "check", "."]
tasks.test = ["pdm", "run", "pytest", "-q"]

[generators.cmd]
type = "command"
toolchain = "generic"
package_manager = "none"
command = ["gen", "{dest_dir}", "{dest_path}", "{name_snake}"]
tasks.lint = []
tasks.test = []

[generators.cmd_noop]
type = "command"
command = ["true"]
tasks.lint = []
tasks.test = []

[generators.cmd_fail]
type = "command"
command = ["fail"]
tasks.lint = []
tasks.test = []

[generators.external_local]
type = "cookiecutter"
source = "https://example.com/upstream.git"
ref = "v1"
trusted = false
name_var = "project_slug"
context_defaults = { package_name = "{name_snake}" }
toolchain = "python"
package_manager = "none"
tasks.lint = ["python", "-m", "compileall", "src"]
tasks.test = ["python", "-m", "unittest", "discover", "-s", "tests"]
"#;

pub fn repo_path(rel: &str) -> PathBuf {
    Path::new(ROOT).join(rel)
}

/// Calls seen by [`ScriptedRunner`].
pub type CallLog = Arc<Mutex<Vec<CommandLine>>>;

/// Process runner that understands a handful of fake programs:
/// `gen <dest_dir> ...` creates the directory, `fail` exits 3, `pdm`/`npm`
/// exit with the configured install code, anything else exits 0.
#[derive(Clone)]
pub struct ScriptedRunner {
    pub fs: MemoryFilesystem,
    pub calls: CallLog,
    pub install_code: i32,
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &CommandLine) -> ScaffoldResult<ProcessOutput> {
        self.calls.lock().unwrap().push(command.clone());
        let exit = |code: i32, stderr: &str| ProcessOutput {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        };
        match command.program.as_str() {
            "gen" => {
                let dest = PathBuf::from(&command.args[0]);
                self.fs.create_dir_all(&dest)?;
                self.fs
                    .write_file(&dest.join("CREATED_BY_COMMAND.txt"), b"ok\n")?;
                Ok(exit(0, ""))
            }
            "fail" => Ok(exit(3, "generator exploded")),
            "pdm" | "npm" => Ok(exit(self.install_code, "")),
            "missing-tool" => Err(ApplicationError::ProcessSpawn {
                program: command.program.clone(),
                reason: "No such file or directory".into(),
            }
            .into()),
            _ => Ok(exit(0, "")),
        }
    }
}

/// Version control fake: `source@ref` maps to a directory in the memory
/// filesystem whose contents are copied to the destination.
#[derive(Clone)]
pub struct FakeVcs {
    pub fs: MemoryFilesystem,
    pub snapshots: BTreeMap<String, PathBuf>,
    pub fetches: Arc<Mutex<Vec<(String, Option<String>)>>>,
}

impl VersionControl for FakeVcs {
    fn fetch(&self, source: &str, reference: Option<&str>, destination: &Path) -> ScaffoldResult<()> {
        self.fetches
            .lock()
            .unwrap()
            .push((source.to_string(), reference.map(str::to_string)));
        let key = format!("{source}@{}", reference.unwrap_or("HEAD"));
        let Some(snapshot) = self.snapshots.get(&key) else {
            return Err(ApplicationError::FetchFailed {
                url: source.to_string(),
                reference: reference.map(str::to_string),
                reason: "unknown revision".into(),
            }
            .into());
        };
        copy_dir(&self.fs, snapshot, destination)
    }
}

/// Cookiecutter look-alike: renders the template's `{{cookiecutter.*}}`
/// directory, substituting `{{cookiecutter.key}}` and
/// `{{ cookiecutter.key }}` in paths and contents.
#[derive(Clone)]
pub struct FakeEngine {
    pub fs: MemoryFilesystem,
    pub renders: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl FakeEngine {
    fn render_text(text: &str, context: &TemplateContext) -> String {
        context.iter().fold(text.to_string(), |acc, (k, v)| {
            acc.replace(&format!("{{{{cookiecutter.{k}}}}}"), v)
                .replace(&format!("{{{{ cookiecutter.{k} }}}}"), v)
        })
    }
}

impl TemplateEngine for FakeEngine {
    fn render(
        &self,
        template_dir: &Path,
        context: &TemplateContext,
        output_dir: &Path,
    ) -> ScaffoldResult<ProcessOutput> {
        self.renders.lock().unwrap().push(
            context
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        if !self.fs.exists(&template_dir.join("cookiecutter.json")) {
            return Ok(ProcessOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "A valid repository could not be found".into(),
            });
        }
        for entry in self.fs.walk(template_dir)? {
            let rel = entry.path.to_string_lossy().into_owned();
            if !rel.starts_with("{{") {
                continue;
            }
            let target = output_dir.join(Self::render_text(&rel, context));
            if entry.is_dir {
                self.fs.create_dir_all(&target)?;
            } else {
                let text = self.fs.read_to_string(&template_dir.join(&entry.path))?;
                self.fs
                    .write_file(&target, Self::render_text(&text, context).as_bytes())?;
            }
        }
        Ok(ProcessOutput {
            exit_code: Some(0),
            ..ProcessOutput::default()
        })
    }
}

pub fn copy_dir(fs: &MemoryFilesystem, from: &Path, to: &Path) -> ScaffoldResult<()> {
    fs.create_dir_all(to)?;
    for entry in fs.walk(from)? {
        let target = to.join(&entry.path);
        if entry.is_dir {
            fs.create_dir_all(&target)?;
        } else {
            fs.write_file(&target, &fs.read(&from.join(&entry.path))?)?;
        }
    }
    Ok(())
}

/// A seeded in-memory monorepo and handles to every fake.
pub struct Harness {
    pub fs: MemoryFilesystem,
    pub calls: CallLog,
    pub vcs: FakeVcs,
    pub engine: FakeEngine,
    pub install_code: i32,
}

impl Harness {
    pub fn new() -> Self {
        let fs = MemoryFilesystem::new()
            .with_file(repo_path("tools/scaffold/registry.toml"), REGISTRY)
            .with_file(
                repo_path("tools/templates/internal/python-copy/README.md"),
                "# __NAME__\n",
            )
            .with_file(
                repo_path("tools/templates/internal/python-copy/src/__NAME_SNAKE__/__init__.py"),
                "NAME = \"{name}\"\n",
            )
            .with_file(
                repo_path("tools/templates/internal/python-copy/scripts/run.sh"),
                "#!/bin/sh\necho __NAME__\n",
            )
            .with_file(
                repo_path("tools/templates/internal/python-copy/__pycache__/junk.pyc"),
                [0u8, 159, 146, 150],
            )
            .with_file(
                repo_path(
                    "tools/templates/internal/python-copy/nested/{{cookiecutter.project_slug}}/README.md",
                ),
                "# {{ cookiecutter.project_slug }} __NAME__\n",
            )
            .with_file(
                repo_path("tools/templates/internal/python-pdm-lib/pyproject.toml"),
                "[project]\nname = \"__NAME__\"\n\n[tool.pdm]\ndistribution = true\n",
            )
            .with_file("/upstream/v1/cookiecutter.json", "{\"project_slug\": \"my-project\"}\n")
            .with_file(
                "/upstream/v1/{{cookiecutter.project_slug}}/README.md",
                "# {{ cookiecutter.project_slug }}\n",
            )
            .with_file(
                "/upstream/v1/{{cookiecutter.project_slug}}/src/{{cookiecutter.package_name}}/__init__.py",
                "def add(a, b):\n    return a + b\n",
            )
            .with_file("/upstream/v1/LICENSE", "MIT License\n")
            .with_file("/upstream/v2/cookiecutter.json", "{\"project_slug\": \"my-project\"}\n")
            .with_file(
                "/upstream/v2/{{cookiecutter.project_slug}}/README.md",
                "# updated\n",
            )
            .with_file("/upstream/v2/LICENSE", "MIT License\n");
        fs.set_executable(&repo_path("tools/templates/internal/python-copy/scripts/run.sh"))
            .unwrap();

        let snapshots = BTreeMap::from([
            (
                "https://example.com/upstream.git@v1".to_string(),
                PathBuf::from("/upstream/v1"),
            ),
            (
                "https://example.com/upstream.git@v2".to_string(),
                PathBuf::from("/upstream/v2"),
            ),
        ]);

        Self {
            vcs: FakeVcs {
                fs: fs.clone(),
                snapshots,
                fetches: Arc::default(),
            },
            engine: FakeEngine {
                fs: fs.clone(),
                renders: Arc::default(),
            },
            calls: Arc::default(),
            install_code: 0,
            fs,
        }
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(ROOT)
    }

    pub fn ports(&self) -> Ports {
        Ports {
            filesystem: Box::new(self.fs.clone()),
            processes: Box::new(ScriptedRunner {
                fs: self.fs.clone(),
                calls: self.calls.clone(),
                install_code: self.install_code,
            }),
            vcs: Box::new(self.vcs.clone()),
            engine: Box::new(self.engine.clone()),
        }
    }

    pub fn append_registry(&self, extra: &str) {
        self.fs
            .append_file(&repo_path("tools/scaffold/registry.toml"), extra.as_bytes())
            .unwrap();
    }

    pub fn read(&self, rel: &str) -> Option<String> {
        self.fs.read_file(&repo_path(rel))
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.fs.exists(&repo_path(rel))
    }

    /// Every file under `rel`, relative to it.
    pub fn files_under(&self, rel: &str) -> Vec<String> {
        let root = repo_path(rel);
        self.fs
            .list_files()
            .into_iter()
            .filter_map(|p| {
                p.strip_prefix(&root)
                    .ok()
                    .map(|r| r.to_string_lossy().into_owned())
            })
            .collect()
    }

    pub fn manifest(&self) -> toml::Table {
        toml::from_str(&self.read("tools/scaffold/monorepo.toml").unwrap_or_default()).unwrap()
    }

    pub fn project(&self, id: &str) -> Option<toml::Table> {
        self.manifest()
            .get("projects")?
            .as_array()?
            .iter()
            .filter_map(|p| p.as_table())
            .find(|p| p.get("id").and_then(|v| v.as_str()) == Some(id))
            .cloned()
    }
}
