use crate::cli::{Cli, Shell};
use clap::CommandFactory;
use clap_complete::{generate, Shell as ClapShell};
use std::io;

const BIN_NAME: &str = "nhncloud-rds";

impl From<Shell> for ClapShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => ClapShell::Bash,
            Shell::Zsh => ClapShell::Zsh,
            Shell::Fish => ClapShell::Fish,
            Shell::PowerShell => ClapShell::PowerShell,
            Shell::Elvish => ClapShell::Elvish,
        }
    }
}

fn install_hint(shell: &Shell) -> String {
    match shell {
        Shell::Bash => format!("eval \"$({BIN_NAME} completions bash)\"    # ~/.bashrc"),
        Shell::Zsh => format!("eval \"$({BIN_NAME} completions zsh)\"     # ~/.zshrc"),
        Shell::Fish => {
            format!("{BIN_NAME} completions fish > ~/.config/fish/completions/{BIN_NAME}.fish")
        }
        Shell::PowerShell => {
            format!("{BIN_NAME} completions powershell | Out-String | Invoke-Expression")
        }
        Shell::Elvish => format!("eval ({BIN_NAME} completions elvish | slurp)"),
    }
}

/// Completion script goes to stdout, install hint to stderr.
pub fn execute(shell: Shell) {
    let mut cmd = Cli::command();
    let hint = install_hint(&shell);

    generate(ClapShell::from(shell), &mut cmd, BIN_NAME, &mut io::stdout());
    eprintln!("\n# Install with:\n#   {}", hint);
}
