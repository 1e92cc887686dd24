//! Schema lookup in the spec repository
//!
//! The spec repository keeps one directory per schema type (`collections/`,
//! `stored_queries/` and so on). Each holds YAML or JSON files named after
//! the thing they describe, possibly nested in subdirectories:
//!
//! ```text
//! spec/
//!   collections/
//!     djornl/
//!       djornl_node.yaml
//!       djornl_edge.yaml
//!   data_sources/
//!     go_ontology.json
//! ```
//!
//! [`SpecLoader`] resolves a type and name to that file, so callers only need
//! to know which collection they are writing to.

use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::schema::{read_document, SchemaValidator};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;
use walkdir::WalkDir;

/// File extensions a schema may be stored under, in lookup order
const EXTENSIONS: [&str; 2] = ["yaml", "json"];

/// Where the document schema sits inside a collection definition
pub const COLLECTION_SCHEMA_POINTER: &str = "/schema";

/// Kinds of schema kept in the spec repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Collection,
    Dataset,
    DataSource,
    StoredQuery,
    View,
}

impl SchemaType {
    pub const ALL: [SchemaType; 5] = [
        Self::Collection,
        Self::Dataset,
        Self::DataSource,
        Self::StoredQuery,
        Self::View,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Dataset => "dataset",
            Self::DataSource => "data_source",
            Self::StoredQuery => "stored_query",
            Self::View => "view",
        }
    }

    /// Directory under the spec root holding this type's files
    pub fn directory(self) -> &'static str {
        match self {
            Self::Collection => "collections",
            Self::Dataset => "datasets",
            Self::DataSource => "data_sources",
            Self::StoredQuery => "stored_queries",
            Self::View => "views",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the singular or the directory (plural) form
impl FromStr for SchemaType {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s || t.directory() == s)
            .ok_or_else(|| IngestError::schema_nonexistent(s, None))
    }
}

/// Finds schema files under a spec repository root
#[derive(Debug, Clone)]
pub struct SpecLoader {
    root: PathBuf,
}

impl SpecLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loader rooted at the configured spec path
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        Ok(Self::new(config.spec_path()?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every schema file of `schema_type`, ordered by path
    ///
    /// A missing type directory holds no schemas rather than being an error.
    fn schema_files(&self, schema_type: SchemaType) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(schema_type.directory());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).follow_links(false).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_schema = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext));
            if is_schema {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Names of all schemas of `schema_type`, sorted
    pub fn names(&self, schema_type: SchemaType) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .schema_files(schema_type)?
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Path of the schema file for `name`
    ///
    /// When several subdirectories hold a file of that name, the first in
    /// path order wins.
    pub fn schema_path(&self, schema_type: SchemaType, name: &str) -> Result<PathBuf> {
        let wanted: Vec<String> = EXTENSIONS
            .iter()
            .map(|ext| format!("{}.{}", name, ext))
            .collect();

        let path = self
            .schema_files(schema_type)?
            .into_iter()
            .find(|path| {
                path.file_name()
                    .and_then(|file| file.to_str())
                    .is_some_and(|file| wanted.iter().any(|w| w == file))
            })
            .ok_or_else(|| IngestError::schema_nonexistent(schema_type.as_str(), Some(name)))?;

        debug!(schema_type = %schema_type, name, path = %path.display(), "Resolved schema");
        Ok(path)
    }

    /// Parsed schema document for `name`
    pub fn schema(&self, schema_type: SchemaType, name: &str) -> Result<Value> {
        read_document(&self.schema_path(schema_type, name)?)
    }

    pub fn collection_path(&self, name: &str) -> Result<PathBuf> {
        self.schema_path(SchemaType::Collection, name)
    }

    pub fn collection(&self, name: &str) -> Result<Value> {
        self.schema(SchemaType::Collection, name)
    }

    /// Validator for documents stored in collection `name`
    pub fn collection_validator(&self, name: &str) -> Result<SchemaValidator> {
        SchemaValidator::from_file_at(self.collection_path(name)?, Some(COLLECTION_SCHEMA_POINTER))
    }

    /// Collection definition for a document id of the form `collection/key`
    pub fn schema_for_doc(&self, doc_id: &str) -> Result<Value> {
        let (collection, _key) = doc_id.split_once('/').ok_or_else(|| {
            IngestError::validation(format!(
                "invalid document id '{}'; expected collection/key",
                doc_id
            ))
        })?;
        self.collection(collection)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::network::test_support::write_file;
    use serde_json::json;
    use tempfile::TempDir;

    const NODE_COLLECTION: &str = "name: djornl_node\ntype: vertex\nschema:\n  type: object\n  required: [_key]\n  properties:\n    _key: {type: string}\n";

    fn spec_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "collections/djornl/djornl_node.yaml", NODE_COLLECTION);
        write_file(
            dir.path(),
            "collections/djornl/djornl_edge.json",
            r#"{"name": "djornl_edge", "type": "edge", "schema": {"type": "object"}}"#,
        );
        write_file(dir.path(), "collections/README.md", "# collections\n");
        write_file(dir.path(), "collections/z_last/djornl_node.yaml", "name: shadowed\n");
        write_file(dir.path(), "data_sources/go_ontology.json", r#"{"ns": "go_ontology"}"#);
        dir
    }

    #[test]
    fn test_schema_type_parse() {
        assert_eq!("collection".parse::<SchemaType>().unwrap(), SchemaType::Collection);
        assert_eq!("stored_queries".parse::<SchemaType>().unwrap(), SchemaType::StoredQuery);
        assert_eq!(SchemaType::DataSource.directory(), "data_sources");

        let err = "widgets".parse::<SchemaType>().unwrap_err();
        assert_eq!(err.to_string(), "Widgets does not exist.");
    }

    #[test]
    fn test_names_are_sorted_stems() {
        let dir = spec_root();
        let loader = SpecLoader::new(dir.path());

        assert_eq!(
            loader.names(SchemaType::Collection).unwrap(),
            vec!["djornl_edge", "djornl_node", "djornl_node"]
        );
        assert_eq!(loader.names(SchemaType::DataSource).unwrap(), vec!["go_ontology"]);
        assert!(loader.names(SchemaType::View).unwrap().is_empty());
    }

    #[test]
    fn test_schema_path_searches_subdirectories() {
        let dir = spec_root();
        let loader = SpecLoader::new(dir.path());

        let path = loader.collection_path("djornl_edge").unwrap();
        assert_eq!(path, dir.path().join("collections/djornl/djornl_edge.json"));

        // First match in path order
        let path = loader.collection_path("djornl_node").unwrap();
        assert_eq!(path, dir.path().join("collections/djornl/djornl_node.yaml"));
    }

    #[test]
    fn test_missing_schema() {
        let dir = spec_root();
        let loader = SpecLoader::new(dir.path());

        let err = loader.collection_path("README").unwrap_err();
        assert!(matches!(
            &err,
            IngestError::SchemaNonexistent { schema_type, name: Some(name) }
                if schema_type == "collection" && name == "README"
        ));
        assert_eq!(err.to_string(), "Collection 'README' does not exist.");

        let err = loader.schema(SchemaType::StoredQuery, "list_nodes").unwrap_err();
        assert_eq!(err.to_string(), "Stored query 'list_nodes' does not exist.");
    }

    #[test]
    fn test_schema_reads_yaml_and_json() {
        let dir = spec_root();
        let loader = SpecLoader::new(dir.path());

        assert_eq!(loader.collection("djornl_node").unwrap()["type"], json!("vertex"));
        assert_eq!(loader.collection("djornl_edge").unwrap()["type"], json!("edge"));
        assert_eq!(
            loader.schema(SchemaType::DataSource, "go_ontology").unwrap(),
            json!({"ns": "go_ontology"})
        );
    }

    #[test]
    fn test_collection_validator_uses_nested_schema() {
        let dir = spec_root();
        let validator = SpecLoader::new(dir.path())
            .collection_validator("djornl_node")
            .unwrap();

        assert!(validator.is_valid(&json!({"_key": "AT1G01010"})));
        assert!(!validator.is_valid(&json!({"name": "no key"})));
    }

    #[test]
    fn test_schema_for_doc() {
        let dir = spec_root();
        let loader = SpecLoader::new(dir.path());

        let schema = loader.schema_for_doc("djornl_edge/abc123").unwrap();
        assert_eq!(schema["name"], json!("djornl_edge"));

        let err = loader.schema_for_doc("djornl_edge").unwrap_err();
        assert!(matches!(err, IngestError::Validation(_)));

        let err = loader.schema_for_doc("nope/1").unwrap_err();
        assert_eq!(err.to_string(), "Collection 'nope' does not exist.");
    }

    #[test]
    fn test_from_config() {
        let dir = spec_root();
        let config = IngestConfig::new().with_spec_path(dir.path());
        let loader = SpecLoader::from_config(&config).unwrap();
        assert_eq!(loader.root(), dir.path());

        assert!(SpecLoader::from_config(&IngestConfig::new()).is_err());
    }
}
