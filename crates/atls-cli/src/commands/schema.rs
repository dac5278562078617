use std::path::Path;

use atls_docs::schema::{schema, to_json_string};
use atls_docs::{DocumentationSource, FileType, load_table};
use miette::IntoDiagnostic;

pub fn run(
    file_type: FileType,
    indent: usize,
    source: DocumentationSource,
    documentation: Option<&Path>,
) -> miette::Result<()> {
    let table = load_table(source, documentation).into_diagnostic()?;
    let json = to_json_string(&schema(&table, file_type), indent).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
