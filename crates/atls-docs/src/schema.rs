use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::{DocsError, DocsResult};
use crate::filetype::FileType;
use crate::table::DocumentationTable;

/// JSON schema describing every documented name of a file type.
pub fn schema(table: &DocumentationTable, file_type: FileType) -> Value {
    let properties: Map<String, Value> = table
        .entries(file_type)
        .map(|(name, description)| (name.to_string(), json!({ "description": description })))
        .collect();
    json!({
        "$id": format!("urn:atls:schema:{file_type}"),
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$comment": format!(
            "Don't edit this file directly! It is generated by `atls generate-schema {file_type}`."
        ),
        "type": "object",
        "properties": properties,
    })
}

/// Pretty-print JSON with `indent` spaces per level.
pub fn to_json_string(value: &Value, indent: usize) -> DocsResult<String> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer).map_err(DocsError::Serialize)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
