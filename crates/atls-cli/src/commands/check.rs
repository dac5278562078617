use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use atls_analysis::diagnostics::{count, render_findings};
use atls_analysis::{Finding, Severity, diagnose};
use atls_docs::FileType;
use atls_syntax::{SyntaxResult, parse};
use colored::Colorize;
use miette::{Context, IntoDiagnostic, miette};

use crate::ColorChoice;

/// Diagnose every make file in `files`. Files of unknown type are checked as
/// make files; `configure.ac` has no checks and is skipped.
pub fn run(files: &[PathBuf], color: ColorChoice) -> miette::Result<()> {
    let color = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stderr().is_terminal(),
    };
    colored::control::set_override(color);

    let mut errors = 0;
    let mut warnings = 0;
    for file in files {
        let path = file.as_path();
        let name = path.display().to_string();
        if FileType::detect(&name) == Some(FileType::Config) {
            eprintln!("  {} {name} (no checks for configure.ac)", "Skipping".dimmed());
            continue;
        }
        let source = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot read {name}"))?;
        let findings = check_source(&source, path)
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot parse {name}"))?;
        eprint!("{}", render_findings(&source, &name, &findings, color));
        errors += count(&findings, Severity::Error);
        warnings += count(&findings, Severity::Warning);
    }

    print_summary(files.len(), errors, warnings);
    if errors > 0 {
        return Err(miette!(
            "check failed with {errors} error{}",
            if errors == 1 { "" } else { "s" }
        ));
    }
    Ok(())
}

fn check_source(source: &str, path: &Path) -> SyntaxResult<Vec<Finding>> {
    let tree = parse(source)?;
    let directory = path
        .parent()
        .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir });
    Ok(diagnose(&tree, directory))
}

fn print_summary(files: usize, errors: usize, warnings: usize) {
    let plural = |n: usize| if n == 1 { "" } else { "s" };
    if errors > 0 {
        eprintln!(
            "  {} {} error{}, {} warning{}",
            "Failed".red().bold(),
            errors,
            plural(errors),
            warnings,
            plural(warnings),
        );
    } else if warnings > 0 {
        eprintln!("  {} {} warning{}", "Checked".yellow().bold(), warnings, plural(warnings));
    } else {
        eprintln!("  {} {} file{}, no problems", "Checked".green().bold(), files, plural(files));
    }
}
