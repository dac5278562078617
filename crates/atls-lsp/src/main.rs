//! Language Server Protocol (LSP) server for autoconf and make files.

mod config;
mod logging;
mod server;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use atls_docs::DocumentationSource;
use clap::Parser;
use tower_lsp::{LspService, Server};

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(
    name = "atls-lsp",
    about = "Language server for configure.ac and Makefiles, speaking LSP over stdio",
    version
)]
struct Args {
    /// Where documentation comes from: builtin, cache or system
    #[arg(long, default_value = "builtin")]
    documentation_source: DocumentationSource,

    /// Read documentation from this JSON artifact instead
    #[arg(long)]
    documentation: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init();

    let config = ServerConfig::default()
        .with_source(args.documentation_source)
        .with_path(args.documentation);
    let docs = match config.load() {
        Ok(docs) => Arc::new(docs),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    tracing::info!(source = %config.documentation_source, "starting language server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(|client| server::AtlsLanguageServer::new(client, config, docs));
    Server::new(stdin, stdout, socket).serve(service).await;
}
