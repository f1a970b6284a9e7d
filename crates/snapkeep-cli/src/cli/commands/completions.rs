//! `snapkeep completions <shell>` – emit shell completion definitions.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;

pub fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "snapkeep", &mut std::io::stdout());
}
