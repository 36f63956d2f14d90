//! Shell completion generation.

use clap::CommandFactory;
use clap_complete::{generate, shells};

use crate::cli::{Cli, CompletionsArgs, Shell};

pub fn execute(args: CompletionsArgs) -> crate::error::CliResult<()> {
    let mut cmd = Cli::command();
    let out = &mut std::io::stdout();

    match args.shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, "scaffold", out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, "scaffold", out),
        Shell::Fish => generate(shells::Fish, &mut cmd, "scaffold", out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, "scaffold", out),
        Shell::Elvish => generate(shells::Elvish, &mut cmd, "scaffold", out),
    }

    Ok(())
}
