//! Server configuration: command line first, initialization options on top.

use std::path::PathBuf;

use atls_docs::{DocsResult, DocumentationSource, DocumentationTable, load_table};
use serde::Deserialize;

/// Configuration of the language server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Where the documentation table is loaded from.
    pub documentation_source: DocumentationSource,
    /// Explicit documentation artifact; wins over the source.
    pub documentation_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Set the documentation source.
    pub fn with_source(mut self, source: DocumentationSource) -> Self {
        self.documentation_source = source;
        self
    }

    /// Set or clear the documentation artifact path.
    pub fn with_path(mut self, path: Option<PathBuf>) -> Self {
        self.documentation_path = path;
        self
    }

    /// Apply the options a client sent with `initialize`.
    pub fn merge(mut self, options: InitializationOptions) -> Self {
        if let Some(source) = options.documentation_source {
            self.documentation_source = source;
            self.documentation_path = None;
        }
        if let Some(path) = options.documentation_path {
            self.documentation_path = Some(path);
        }
        self
    }

    /// Load the documentation table this configuration names.
    pub fn load(&self) -> DocsResult<DocumentationTable> {
        load_table(self.documentation_source, self.documentation_path.as_deref())
    }
}

/// `initializationOptions` of the `initialize` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationOptions {
    /// `"builtin"`, `"cache"` or `"system"`. Also accepted as `method`.
    #[serde(default, alias = "method")]
    pub documentation_source: Option<DocumentationSource>,
    /// Path of a documentation artifact.
    #[serde(default)]
    pub documentation_path: Option<PathBuf>,
}

impl InitializationOptions {
    /// Parse the raw options; absent or `null` options are empty.
    pub fn from_value(value: Option<serde_json::Value>) -> serde_json::Result<Self> {
        match value {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value),
        }
    }

    /// Whether the client asked for anything.
    pub fn is_empty(&self) -> bool {
        self.documentation_source.is_none() && self.documentation_path.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.documentation_source, DocumentationSource::Builtin);
        assert_eq!(cfg.documentation_path, None);
    }

    #[test]
    fn builder_methods() {
        let cfg = ServerConfig::default()
            .with_source(DocumentationSource::Cache)
            .with_path(Some(PathBuf::from("/tmp/docs.json")));
        assert_eq!(cfg.documentation_source, DocumentationSource::Cache);
        assert_eq!(cfg.documentation_path, Some(PathBuf::from("/tmp/docs.json")));
    }

    #[test]
    fn options_are_camel_case() {
        let options = InitializationOptions::from_value(Some(json!({
            "documentationSource": "system",
            "documentationPath": "/tmp/docs.json",
        })))
        .unwrap();
        assert_eq!(options.documentation_source, Some(DocumentationSource::System));
        assert_eq!(options.documentation_path, Some(PathBuf::from("/tmp/docs.json")));
    }

    #[test]
    fn method_is_an_alias() {
        let options = InitializationOptions::from_value(Some(json!({ "method": "cache" }))).unwrap();
        assert_eq!(options.documentation_source, Some(DocumentationSource::Cache));
    }

    #[test]
    fn missing_options_are_empty() {
        assert!(InitializationOptions::from_value(None).unwrap().is_empty());
        assert!(InitializationOptions::from_value(Some(serde_json::Value::Null)).unwrap().is_empty());
        assert!(InitializationOptions::from_value(Some(json!({}))).unwrap().is_empty());
    }

    #[test]
    fn unknown_source_is_rejected() {
        let result = InitializationOptions::from_value(Some(json!({ "method": "manual" })));
        assert!(result.is_err());
    }

    #[test]
    fn options_override_command_line() {
        let cfg = ServerConfig::default()
            .with_path(Some(PathBuf::from("/etc/docs.json")))
            .merge(InitializationOptions {
                documentation_source: Some(DocumentationSource::Builtin),
                documentation_path: None,
            });
        assert_eq!(cfg.documentation_path, None);

        let cfg = ServerConfig::default().merge(InitializationOptions {
            documentation_source: None,
            documentation_path: Some(PathBuf::from("/tmp/a.json")),
        });
        assert_eq!(cfg.documentation_path, Some(PathBuf::from("/tmp/a.json")));
        assert_eq!(cfg.documentation_source, DocumentationSource::Builtin);
    }

    #[test]
    fn load_reads_explicit_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(&path, r#"{"make": {"subst": "Replace."}}"#).unwrap();
        let table = ServerConfig::default().with_path(Some(path)).load().unwrap();
        assert_eq!(table.describe("subst", atls_docs::FileType::Make), Some("Replace."));
    }

    #[test]
    fn load_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ServerConfig::default().with_path(Some(dir.path().join("nope.json")));
        assert!(cfg.load().is_err());
    }
}
