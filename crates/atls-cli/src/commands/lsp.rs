use std::process::{Command, Stdio};

use miette::miette;

/// Exec the separate `atls-lsp` binary on this process's stdio.
pub fn run() -> miette::Result<()> {
    let status = Command::new("atls-lsp")
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();
    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(s) => Err(miette!("atls-lsp exited with {s}")),
        Err(_) => Err(miette!(
            help = "install it with: cargo install --path crates/atls-lsp",
            "atls-lsp binary not found"
        )),
    }
}
