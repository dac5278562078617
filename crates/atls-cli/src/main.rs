//! CLI frontend for the autotools language server.

mod commands;

use std::path::PathBuf;

use atls_docs::{DocumentationSource, FileType};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "atls",
    about = "Autotools language server: checks and tooling for configure.ac and Makefiles",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// When to color terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Report syntax errors, missing includes and repeated targets in make files
    Check {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Color the report
        #[arg(long, value_enum, default_value = "auto")]
        color: ColorChoice,
    },

    /// Print the JSON schema of the documented names of a file type
    GenerateSchema {
        /// File type: config or make
        file_type: FileType,

        /// Spaces per indentation level
        #[arg(short, long, default_value = "2")]
        indent: usize,

        /// Where documentation comes from: builtin, cache or system
        #[arg(long, default_value = "builtin")]
        source: DocumentationSource,

        /// Read documentation from this JSON artifact instead
        #[arg(long)]
        documentation: Option<PathBuf>,
    },

    /// Start the Language Server Protocol server (for IDE integration)
    Lsp,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files, color } => commands::check::run(&files, color),
        Commands::GenerateSchema {
            file_type,
            indent,
            source,
            documentation,
        } => commands::schema::run(file_type, indent, source, documentation.as_deref()),
        Commands::Lsp => commands::lsp::run(),
    }
}
