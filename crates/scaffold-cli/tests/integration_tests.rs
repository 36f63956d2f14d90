//! End-to-end tests for the `scaffold` binary against temporary repositories.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REGISTRY: &str = r##"# Team registry, hand-maintained.
[kinds.app]
output_dir = "apps"
default_generator = "python_copy"
ci = { lint = true, test = true, build = false }

[kinds.lib]
output_dir = "packages"
default_generator = "python_pdm_lib"
ci = { lint = true, test = true, build = true }

[generators.python_copy]
type = "copy"
source = "tools/templates/internal/python-copy"
toolchain = "python"
package_manager = "none"
substitutions = { "__NAME__" = "{name}", "__NAME_SNAKE__" = "{name_snake}" }
tasks.lint = ["python3", "-m", "compileall", "-q", "src"]
tasks.test = ["python3", "-m", "unittest"]

[generators.python_pdm_lib]
type = "copy"
source = "tools/templates/internal/python-pdm-lib"
toolchain = "python"
package_manager = "pdm"
substitutions = { "__NAME__" = "{name}", "__NAME_SNAKE__" = "{name_snake}" }
tasks.install = ["pdm", "install"]
tasks.lint = ["pdm", "run", "ruff", "check", "."]
tasks.test = ["pdm", "run", "pytest", "-q"]
tasks.build = ["pdm", "build"]

[generators.shell_gen]
type = "command"
toolchain = "generic"
package_manager = "none"
command = ["sh", "-c", "mkdir -p \"$1\" && echo \"# $2\" > \"$1/README.md\"", "sh", "{dest_dir}", "{name}"]
tasks.lint = ["sh", "-c", "echo linting"]
tasks.test = ["sh", "-c", "echo hello-from-task"]
tasks.build = ["sh", "-c", "exit 7"]

[generators.external_tpl]
type = "cookiecutter"
source = "https://example.invalid/template.git"
ref = "v1.0.0"
trusted = false
name_var = "project_slug"
tasks.lint = []
tasks.test = []
"##;

/// A temporary monorepo with a registry and two copy templates.
struct Repo {
    dir: TempDir,
}

impl Repo {
    fn new() -> Self {
        let repo = Self {
            dir: TempDir::new().unwrap(),
        };
        repo.write("tools/scaffold/registry.toml", REGISTRY);
        repo.write("tools/templates/internal/python-copy/README.md", "# __NAME__\n");
        repo.write(
            "tools/templates/internal/python-copy/src/__NAME_SNAKE__/__init__.py",
            "",
        );
        repo.write(
            "tools/templates/internal/python-pdm-lib/pyproject.toml",
            "[project]\nname = \"__NAME__\"\n\n[tool.pdm]\ndistribution = true\n",
        );
        repo.write(
            "tools/templates/internal/python-pdm-lib/src/__NAME_SNAKE__/__init__.py",
            "",
        );
        repo
    }

    fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path().join(rel)).unwrap()
    }

    fn manifest(&self) -> toml::Table {
        toml::from_str(&self.read("tools/scaffold/monorepo.toml")).unwrap()
    }

    fn project(&self, id: &str) -> toml::Table {
        self.manifest()["projects"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p.as_table())
            .find(|p| p["id"].as_str() == Some(id))
            .cloned()
            .unwrap_or_else(|| panic!("project '{id}' not in manifest"))
    }

    fn scaffold(&self) -> Command {
        let mut cmd = Command::cargo_bin("scaffold").unwrap();
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".xdg"))
            .env_remove("RUST_LOG")
            .env_remove("NO_COLOR")
            .env_remove("SCAFFOLD_REPO_ROOT")
            .arg("--no-color")
            .arg("--repo-root")
            .arg(self.path());
        cmd
    }
}

#[test]
fn help_lists_commands() {
    Repo::empty()
        .scaffold()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("vendor"));
}

#[test]
fn version_flag() {
    Repo::empty()
        .scaffold()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn doctor_passes_on_consistent_repo() {
    let repo = Repo::new();
    repo.scaffold()
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 generator(s)"));
}

#[test]
fn doctor_fails_when_a_kind_default_lacks_ci_tasks() {
    let repo = Repo::new();
    repo.write(
        "tools/scaffold/registry.toml",
        r#"
[kinds.app]
output_dir = "apps"
default_generator = "g1"
ci = { test = true }

[generators.g1]
type = "copy"
source = "tools/templates/internal/python-copy"
tasks.lint = []
"#,
    );
    repo.scaffold()
        .arg("doctor")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("tasks.test"));
}

#[test]
fn add_copy_generator_creates_project_and_manifest_entry() {
    let repo = Repo::new();
    repo.scaffold()
        .args(["add", "app", "billing-api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("apps/billing-api"));

    assert_eq!(repo.read("apps/billing-api/README.md"), "# billing-api\n");
    assert!(
        repo.path()
            .join("apps/billing-api/src/billing_api/__init__.py")
            .exists()
    );

    let project = repo.project("billing-api");
    assert_eq!(project["path"].as_str(), Some("apps/billing-api"));
    assert_eq!(project["generator"].as_str(), Some("python_copy"));
    assert_eq!(project["toolchain"].as_str(), Some("python"));
}

#[test]
fn missing_ci_task_is_rejected_before_creating_anything() {
    let repo = Repo::new();
    repo.write(
        "tools/scaffold/registry.toml",
        r#"
[kinds.app]
output_dir = "apps"
default_generator = "g1"
ci = { test = true }

[generators.g1]
type = "copy"
source = "tools/templates/internal/python-copy"
tasks.lint = []
"#,
    );

    repo.scaffold()
        .args(["add", "app", "foo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tasks.test"));
    assert!(!repo.path().join("apps/foo").exists());
    assert!(!repo.path().join("tools/scaffold/monorepo.toml").exists());
}

#[test]
fn operator_fields_survive_add() {
    let repo = Repo::new();
    repo.write(
        "tools/scaffold/monorepo.toml",
        r#"[[projects]]
id = "legacy"
path = "apps/legacy"
owner = "team-payments"
"#,
    );

    repo.scaffold()
        .args(["add", "app", "fresh"])
        .assert()
        .success();

    assert_eq!(repo.project("legacy")["owner"].as_str(), Some("team-payments"));
    assert_eq!(repo.project("fresh")["path"].as_str(), Some("apps/fresh"));
}

#[test]
fn pdm_library_records_package_manager_and_install_task() {
    let repo = Repo::new();
    repo.scaffold()
        .args([
            "add",
            "lib",
            "mylib",
            "--generator",
            "python_pdm_lib",
            "--no-install",
        ])
        .assert()
        .success();

    let pyproject: toml::Table =
        toml::from_str(&repo.read("packages/mylib/pyproject.toml")).unwrap();
    assert_eq!(pyproject["project"]["name"].as_str(), Some("mylib"));
    assert_eq!(pyproject["tool"]["pdm"]["distribution"].as_bool(), Some(true));

    let project = repo.project("mylib");
    assert_eq!(project["package_manager"].as_str(), Some("pdm"));
    let install: Vec<&str> = project["tasks"]["install"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(install, vec!["pdm", "install"]);
}

#[test]
fn existing_destination_is_not_overwritten() {
    let repo = Repo::new();
    repo.write("apps/taken/keep.txt", "mine");

    repo.scaffold()
        .args(["add", "app", "taken"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(repo.read("apps/taken/keep.txt"), "mine");
    assert!(!repo.path().join("apps/taken/README.md").exists());
}

#[test]
fn invalid_project_name_is_a_user_error() {
    let repo = Repo::new();
    repo.scaffold()
        .args(["add", "app", ".hidden"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid project name"));
}

#[test]
fn unknown_kind_is_not_found() {
    let repo = Repo::new();
    repo.scaffold()
        .args(["add", "service", "x"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown kind 'service'"));
}

#[test]
fn untrusted_external_template_needs_trust_flag() {
    let repo = Repo::new();
    repo.scaffold()
        .args(["add", "app", "ext", "--generator", "external_tpl"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--trust"));
    assert!(!repo.path().join("apps/ext").exists());
}

#[test]
fn matrix_prints_one_json_line() {
    let repo = Repo::new();
    repo.scaffold()
        .args(["add", "app", "api"])
        .assert()
        .success();

    let out = repo.scaffold().arg("matrix").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1);

    let matrix: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let row = &matrix["include"][0];
    assert_eq!(row["id"], "api");
    assert_eq!(row["path"], "apps/api");
    assert_eq!(row["toolchain"], "python");
    assert_eq!(row["ci_lint"], true);
    assert_eq!(row["ci_build"], false);
}

#[test]
fn matrix_of_empty_manifest_has_placeholder_row() {
    let repo = Repo::new();
    repo.scaffold()
        .arg("matrix")
        .assert()
        .success()
        .stdout(predicate::str::contains("__no_projects__"));
}

#[test]
fn list_json_names_generators() {
    let repo = Repo::new();
    let out = repo
        .scaffold()
        .args(["list", "--format", "json"])
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    let names: Vec<&str> = value["generators"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|g| g["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec!["external_tpl", "python_copy", "python_pdm_lib", "shell_gen"]
    );
}

#[test]
fn init_creates_files_once() {
    let repo = Repo::empty();
    repo.scaffold().arg("init").assert().success();
    assert!(repo.path().join("tools/scaffold/registry.toml").exists());
    assert!(repo.path().join("tools/scaffold/monorepo.toml").exists());

    repo.write("tools/scaffold/registry.toml", "# mine\n");
    repo.scaffold()
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(repo.read("tools/scaffold/registry.toml"), "# mine\n");

    repo.scaffold().arg("doctor").assert().success();
}

#[test]
fn config_get_reads_local_config_file() {
    let repo = Repo::new();
    repo.write(".scaffold.toml", "[tools]\ngit = \"/opt/git/bin/git\"\n");
    repo.scaffold()
        .args(["config", "get", "tools.git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/git/bin/git"));
}

#[test]
fn vendor_update_of_unknown_alias_is_not_found() {
    let repo = Repo::new();
    repo.scaffold()
        .args(["vendor", "update", "python_copy", "--ref", "v2"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not a vendored template"));
}

#[test]
fn run_unknown_project_is_not_found() {
    let repo = Repo::new();
    repo.scaffold()
        .args(["run", "test", "--project", "ghost"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown project 'ghost'"));
}

#[cfg(unix)]
mod unix {
    use super::*;

    fn repo_with_shell_project() -> Repo {
        let repo = Repo::new();
        repo.scaffold()
            .args(["add", "app", "tool", "--generator", "shell_gen"])
            .assert()
            .success();
        repo
    }

    #[test]
    fn command_generator_runs_with_rendered_placeholders() {
        let repo = repo_with_shell_project();
        assert_eq!(repo.read("apps/tool/README.md"), "# tool\n");
        assert_eq!(repo.project("tool")["generator"].as_str(), Some("shell_gen"));
    }

    #[test]
    fn run_streams_task_output() {
        let repo = repo_with_shell_project();
        repo.scaffold()
            .args(["run", "test", "--project", "tool"])
            .assert()
            .success()
            .stdout(predicate::str::contains("hello-from-task"));
    }

    #[test]
    fn run_propagates_task_exit_code() {
        let repo = repo_with_shell_project();
        repo.scaffold()
            .args(["run", "build", "--project", "tool"])
            .assert()
            .code(7);
    }

    #[test]
    fn run_without_project_covers_every_declaring_project() {
        let repo = repo_with_shell_project();
        repo.scaffold()
            .args(["add", "app", "tool-two", "--generator", "shell_gen"])
            .assert()
            .success();

        let out = repo.scaffold().args(["run", "lint"]).assert().success();
        let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
        assert_eq!(stdout.matches("linting").count(), 2);
    }

    #[test]
    fn failing_command_generator_reports_its_exit_code() {
        let repo = Repo::new();
        repo.write(
            "tools/scaffold/registry.toml",
            r#"
[kinds.app]
output_dir = "apps"
default_generator = "broken"

[generators.broken]
type = "command"
command = ["sh", "-c", "echo nope >&2; exit 5"]
"#,
        );
        repo.scaffold()
            .args(["add", "app", "x"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("exit code 5"))
            .stderr(predicate::str::contains("nope"));
        assert!(repo.project_file_missing());
    }

    impl Repo {
        fn project_file_missing(&self) -> bool {
            !self.path().join("tools/scaffold/monorepo.toml").exists()
        }
    }
}
