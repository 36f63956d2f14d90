//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "scaffold",
    bin_name = "scaffold",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Monorepo project scaffolding",
    long_about = "Creates projects in a monorepo from registered generators, \
                  records them in the project manifest, runs their tasks and \
                  vendors external templates.",
    after_help = "EXAMPLES:\n\
        \x20 scaffold add app billing-api\n\
        \x20 scaffold add lib mylib --generator python_pdm_lib --no-install\n\
        \x20 scaffold run test --project billing-api\n\
        \x20 scaffold vendor import external_tpl --as company-tpl\n\
        \x20 scaffold doctor",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project from a generator.
    #[command(
        about = "Create a new project",
        after_help = "EXAMPLES:\n\
            \x20 scaffold add app billing-api\n\
            \x20 scaffold add app web --generator node_vite\n\
            \x20 scaffold add app ext --generator external_tpl --trust"
    )]
    Add(AddArgs),

    /// Run a recorded task.
    #[command(
        about = "Run a project task",
        after_help = "EXAMPLES:\n\
            \x20 scaffold run test --project billing-api\n\
            \x20 scaffold run lint            # every project declaring 'lint'"
    )]
    Run(RunArgs),

    /// Check the registry, manifest and vendor tree for consistency.
    #[command(about = "Check repository consistency")]
    Doctor,

    /// Import or update vendored templates.
    #[command(
        about = "Manage vendored templates",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 scaffold vendor import external_tpl --as company-tpl\n\
            \x20 scaffold vendor update company-tpl --ref v2.0.0"
    )]
    Vendor(VendorCommands),

    /// List kinds and generators.
    #[command(visible_alias = "ls", about = "List kinds and generators")]
    List(ListArgs),

    /// Print the CI build matrix as one line of JSON.
    #[command(about = "Print the CI matrix as JSON")]
    Matrix,

    /// Create an empty registry and manifest.
    #[command(about = "Initialise registry and manifest files")]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 scaffold completions bash > ~/.local/share/bash-completion/completions/scaffold\n\
            \x20 scaffold completions zsh  > ~/.zfunc/_scaffold"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 scaffold config get paths.registry\n\
            \x20 scaffold config list"
    )]
    Config(ConfigCommands),
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `scaffold add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Project kind declared in the registry (e.g. `app`, `lib`).
    #[arg(value_name = "KIND")]
    pub kind: String,

    /// Project name; becomes the directory name under the kind's output dir.
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Use this generator instead of the kind's default.
    #[arg(short = 'g', long = "generator", value_name = "GENERATOR")]
    pub generator: Option<String>,

    /// Allow an untrusted external template for this invocation.
    #[arg(long = "trust")]
    pub trust: bool,

    /// Do not run the generator's `install` task.
    #[arg(long = "no-install")]
    pub no_install: bool,
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Arguments for `scaffold run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Task name (`install`, `lint`, `test`, `build`, ...).
    #[arg(value_name = "TASK")]
    pub task: String,

    /// Project id from the manifest. Without it the task runs in every
    /// project that declares it.
    #[arg(short = 'p', long = "project", value_name = "ID")]
    pub project: Option<String>,
}

// ── vendor ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum VendorCommands {
    /// Mirror an external template generator into the vendor directory.
    Import {
        /// External template generator to vendor.
        generator: String,
        /// Name of the new generator and vendor directory.
        #[arg(long = "as", value_name = "ALIAS")]
        alias: String,
    },
    /// Stage an upstream ref next to a vendored template for manual merge.
    Update {
        /// Vendored alias.
        alias: String,
        /// Upstream ref (tag, branch or commit) to stage.
        #[arg(long = "ref", value_name = "REF")]
        reference: String,
    },
}

// ── list ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One generator name per line.
    List,
    /// JSON object with `kinds` and `generators`.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite existing registry and manifest files.
    #[arg(short = 'f', long = "force", help = "Overwrite existing files")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `paths.registry`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the user configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_add_with_flags() {
        let cli = Cli::parse_from([
            "scaffold",
            "add",
            "lib",
            "mylib",
            "--generator",
            "python_pdm_lib",
            "--no-install",
        ]);
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.kind, "lib");
                assert_eq!(args.name, "mylib");
                assert_eq!(args.generator.as_deref(), Some("python_pdm_lib"));
                assert!(args.no_install);
                assert!(!args.trust);
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn parse_vendor_import_alias() {
        let cli = Cli::parse_from(["scaffold", "vendor", "import", "ext", "--as", "tpl"]);
        match cli.command {
            Commands::Vendor(VendorCommands::Import { generator, alias }) => {
                assert_eq!(generator, "ext");
                assert_eq!(alias, "tpl");
            }
            other => panic!("expected vendor import, got {other:?}"),
        }
    }

    #[test]
    fn vendor_update_requires_ref() {
        assert!(Cli::try_parse_from(["scaffold", "vendor", "update", "tpl"]).is_err());
    }

    #[test]
    fn run_project_is_optional() {
        let cli = Cli::parse_from(["scaffold", "run", "test"]);
        assert!(matches!(cli.command, Commands::Run(RunArgs { project: None, .. })));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["scaffold", "--quiet", "--verbose", "doctor"]);
        assert!(result.is_err());
    }
}
