//! Manifest loading and validation
//!
//! The manifest (`manifest.yaml` in the root data directory) lists every
//! file the parser reads, its role and its shape. It is checked in three
//! passes, all at configuration time:
//!
//! 1. the document is validated against [`manifest_schema`]
//! 2. column indices and paths are checked against each other
//! 3. every listed path must exist and be a regular file

use super::error::{ParserError, Result, TypeField};
use crate::schema::SchemaValidator;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// File name of the manifest inside the root data directory
pub const MANIFEST_FILE_NAME: &str = "manifest.yaml";

/// Marker text for every manifest validation failure
pub const MANIFEST_VALIDATION_FAILED: &str = "The manifest file failed validation";

// ============================================================================
// Types
// ============================================================================

/// Logical role of a data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRole {
    /// Tab-separated edge list
    #[serde(alias = "edges")]
    Edge,
    /// Node attribute table
    #[serde(alias = "node_metadata")]
    Node,
    /// Cluster membership list
    Cluster,
}

impl DataRole {
    /// Delimiter used when the descriptor does not name one
    pub fn default_delimiter(self) -> char {
        match self {
            DataRole::Edge | DataRole::Cluster => '\t',
            DataRole::Node => ',',
        }
    }

    /// Label used in vocabulary errors
    pub fn type_field(self) -> TypeField {
        match self {
            DataRole::Edge => TypeField::Edge,
            DataRole::Node | DataRole::Cluster => TypeField::Node,
        }
    }
}

impl std::fmt::Display for DataRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataRole::Edge => write!(f, "edge"),
            DataRole::Node => write!(f, "node"),
            DataRole::Cluster => write!(f, "cluster"),
        }
    }
}

/// One entry of the manifest `file_list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path relative to the root data directory
    pub path: String,

    #[serde(rename = "data_type")]
    pub role: DataRole,

    /// Column count every row (header included) must have
    pub expected_columns: usize,

    /// 0-based index of the type column, if the file has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_column: Option<usize>,

    /// Closed set of permitted type values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,

    #[serde(default = "default_true")]
    pub has_header: bool,

    /// Node key column (node files) or cluster id column (cluster files)
    #[serde(default)]
    pub key_column: usize,

    #[serde(default)]
    pub from_column: usize,

    #[serde(default = "default_second_column")]
    pub to_column: usize,

    /// Namespace prepended to cluster ids, e.g. `markov_i2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_prefix: Option<String>,

    #[serde(default = "default_second_column")]
    pub members_column: usize,

    #[serde(default = "default_member_separator")]
    pub member_separator: char,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_second_column() -> usize {
    1
}

fn default_member_separator() -> char {
    ','
}

impl FileDescriptor {
    /// Effective field delimiter
    pub fn delimiter(&self) -> char {
        self.delimiter.unwrap_or_else(|| self.role.default_delimiter())
    }

    /// Quoted fields are only honoured in comma-separated files
    pub fn quoting(&self) -> bool {
        self.delimiter() == ','
    }

    /// Columns this descriptor reads by index, with the setting that names them
    fn indexed_columns(&self) -> Vec<(&'static str, usize)> {
        let mut columns = match self.role {
            DataRole::Edge => vec![("from_column", self.from_column), ("to_column", self.to_column)],
            DataRole::Node => vec![("key_column", self.key_column)],
            DataRole::Cluster => vec![
                ("key_column", self.key_column),
                ("members_column", self.members_column),
            ],
        };
        if let Some(type_column) = self.type_column {
            columns.push(("type_column", type_column));
        }
        columns
    }

    /// Cross-field checks the schema cannot express
    fn layout_errors(&self, index: usize) -> Vec<String> {
        let mut errors = Vec::new();
        let at = format!("/file_list/{}", index);

        let path = Path::new(&self.path);
        let escapes = path.components().any(|c| {
            matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if escapes {
            errors.push(format!(
                "{}/path: '{}' must be relative to the data directory",
                at, self.path
            ));
        }

        if !self.delimiter().is_ascii() {
            errors.push(format!("{}/delimiter: must be a single ASCII character", at));
        }

        for (setting, column) in self.indexed_columns() {
            if column >= self.expected_columns {
                errors.push(format!(
                    "{}/{}: column {} is out of range for {} columns",
                    at, setting, column, self.expected_columns
                ));
            }
        }

        if self.role == DataRole::Cluster && self.key_column == self.members_column {
            errors.push(format!(
                "{}/members_column: must differ from key_column",
                at
            ));
        }

        errors
    }
}

/// The validated manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub file_list: Vec<FileDescriptor>,
}

impl Manifest {
    /// Locate, validate and check the manifest under `root`
    ///
    /// Every failure is a [`ParserError::Configuration`].
    pub fn load(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MANIFEST_FILE_NAME);
        if !manifest_path.is_file() {
            return Err(ParserError::configuration(format!(
                "No manifest file found at {}",
                manifest_path.display()
            )));
        }

        let content = std::fs::read_to_string(&manifest_path).map_err(|e| {
            ParserError::configuration(format!("{}: {}", manifest_path.display(), e))
        })?;
        let manifest = Self::parse(&content)?;
        manifest.check_files(root)?;

        info!(
            manifest = %manifest_path.display(),
            files = manifest.file_list.len(),
            "Loaded manifest '{}'",
            manifest.name
        );
        Ok(manifest)
    }

    /// Validate manifest text without touching the file system
    pub fn parse(content: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(content)
            .map_err(|e| validation_failed(vec![format!("invalid YAML: {}", e)]))?;

        let validator = SchemaValidator::new(&manifest_schema())
            .map_err(|e| ParserError::configuration(e.to_string()))?;
        let errors = validator.errors(&document);
        if !errors.is_empty() {
            return Err(validation_failed(errors));
        }

        let manifest: Manifest =
            serde_json::from_value(document).map_err(|e| validation_failed(vec![e.to_string()]))?;

        let errors: Vec<String> = manifest
            .file_list
            .iter()
            .enumerate()
            .flat_map(|(i, descriptor)| descriptor.layout_errors(i))
            .collect();
        if !errors.is_empty() {
            return Err(validation_failed(errors));
        }

        Ok(manifest)
    }

    /// Descriptors with the given role, in manifest order
    pub fn files_with_role(&self, role: DataRole) -> impl Iterator<Item = &FileDescriptor> {
        self.file_list.iter().filter(move |d| d.role == role)
    }

    /// Absolute location of a descriptor's file
    pub fn resolve(root: &Path, descriptor: &FileDescriptor) -> PathBuf {
        root.join(&descriptor.path)
    }

    fn check_files(&self, root: &Path) -> Result<()> {
        for descriptor in &self.file_list {
            let path = Self::resolve(root, descriptor);
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {
                    debug!(path = %path.display(), role = %descriptor.role, "Found data file");
                },
                Ok(_) => {
                    return Err(ParserError::configuration(format!(
                        "{}: not a file",
                        path.display()
                    )));
                },
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(ParserError::configuration(format!(
                        "{}: file does not exist",
                        path.display()
                    )));
                },
                Err(e) => {
                    return Err(ParserError::configuration(format!("{}: {}", path.display(), e)));
                },
            }
        }
        Ok(())
    }
}

fn validation_failed(errors: Vec<String>) -> ParserError {
    ParserError::configuration(format!(
        "{}:\n  {}",
        MANIFEST_VALIDATION_FAILED,
        errors.join("\n  ")
    ))
}

/// JSON Schema for `manifest.yaml`
pub fn manifest_schema() -> Value {
    let column = json!({"type": "integer", "minimum": 0});
    let single_char = json!({"type": "string", "minLength": 1, "maxLength": 1});

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Network data manifest",
        "type": "object",
        "required": ["name", "file_list"],
        "additionalProperties": false,
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "release_date": {"type": "string"},
            "notes": {"type": "string"},
            "file_list": {
                "type": "array",
                "minItems": 1,
                "items": {"$ref": "#/definitions/file"}
            }
        },
        "definitions": {
            "file": {
                "type": "object",
                "required": ["path", "data_type", "expected_columns"],
                "additionalProperties": false,
                "properties": {
                    "path": {"type": "string", "minLength": 1},
                    "data_type": {"enum": ["edge", "edges", "node", "node_metadata", "cluster"]},
                    "expected_columns": {"type": "integer", "minimum": 1},
                    "type_column": column,
                    "vocabulary": {
                        "type": "array",
                        "minItems": 1,
                        "uniqueItems": true,
                        "items": {"type": "string", "minLength": 1}
                    },
                    "delimiter": single_char,
                    "has_header": {"type": "boolean"},
                    "key_column": column,
                    "from_column": column,
                    "to_column": column,
                    "cluster_prefix": {"type": "string", "minLength": 1},
                    "members_column": column,
                    "member_separator": single_char,
                    "date": {"type": "string"},
                    "description": {"type": "string"}
                },
                "allOf": [
                    {
                        "if": {
                            "required": ["data_type"],
                            "properties": {"data_type": {"const": "cluster"}}
                        },
                        "then": {"required": ["cluster_prefix"]}
                    },
                    {
                        "if": {"required": ["vocabulary"]},
                        "then": {"required": ["type_column"]}
                    }
                ]
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID: &str = r#"
name: Dan Jacobson Exascale dataset
release_date: "2020-06-08"
file_list:
  - path: edges.tsv
    data_type: edge
    expected_columns: 5
    type_column: 4
    vocabulary: [regulatory, physical]
  - path: nodes.csv
    data_type: node_metadata
    expected_columns: 3
    type_column: 1
    vocabulary: [gene, pheno]
  - path: clusters/markov_i2.tsv
    data_type: cluster
    expected_columns: 2
    cluster_prefix: markov_i2
"#;

    #[test]
    fn test_parse_valid_manifest() {
        let manifest = Manifest::parse(VALID).unwrap();
        assert_eq!(manifest.name, "Dan Jacobson Exascale dataset");
        assert_eq!(manifest.file_list.len(), 3);

        let edges = &manifest.file_list[0];
        assert_eq!(edges.role, DataRole::Edge);
        assert_eq!(edges.delimiter(), '\t');
        assert!(edges.has_header);
        assert_eq!((edges.from_column, edges.to_column), (0, 1));

        let nodes = &manifest.file_list[1];
        assert_eq!(nodes.role, DataRole::Node);
        assert_eq!(nodes.delimiter(), ',');
        assert!(nodes.quoting());

        let clusters = &manifest.file_list[2];
        assert_eq!(clusters.cluster_prefix.as_deref(), Some("markov_i2"));
        assert_eq!(clusters.member_separator, ',');
        assert_eq!(manifest.files_with_role(DataRole::Cluster).count(), 1);
    }

    #[test]
    fn test_schema_violation_is_reported() {
        let content = "name: broken\nfile_list:\n  - path: edges.tsv\n    data_type: spaghetti\n";
        let err = Manifest::parse(content).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(MANIFEST_VALIDATION_FAILED));
        // expected_columns is also missing; both are reported
        assert!(err.to_string().contains("expected_columns"));
    }

    #[test]
    fn test_cluster_requires_prefix() {
        let content = "name: n\nfile_list:\n  - path: c.tsv\n    data_type: cluster\n    expected_columns: 2\n";
        let err = Manifest::parse(content).unwrap_err();
        assert!(err.to_string().contains(MANIFEST_VALIDATION_FAILED));
    }

    #[test]
    fn test_vocabulary_requires_type_column() {
        let content = "name: n\nfile_list:\n  - path: e.tsv\n    data_type: edge\n    expected_columns: 3\n    vocabulary: [a]\n";
        let err = Manifest::parse(content).unwrap_err();
        assert!(err.to_string().contains(MANIFEST_VALIDATION_FAILED));
    }

    #[test]
    fn test_column_out_of_range() {
        let content = "name: n\nfile_list:\n  - path: e.tsv\n    data_type: edge\n    expected_columns: 3\n    type_column: 3\n";
        let err = Manifest::parse(content).unwrap_err().to_string();
        assert!(err.contains(MANIFEST_VALIDATION_FAILED));
        assert!(err.contains("/file_list/0/type_column"));
    }

    #[test]
    fn test_path_must_stay_inside_root() {
        let content = "name: n\nfile_list:\n  - path: ../e.tsv\n    data_type: edge\n    expected_columns: 3\n";
        let err = Manifest::parse(content).unwrap_err().to_string();
        assert!(err.contains("must be relative to the data directory"));
    }

    #[test]
    fn test_not_yaml_mapping() {
        let err = Manifest::parse("- just\n- a list\n").unwrap_err();
        assert!(err.to_string().contains(MANIFEST_VALIDATION_FAILED));
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load(dir.path()).unwrap_err();
        let expected = format!(
            "No manifest file found at {}",
            dir.path().join(MANIFEST_FILE_NAME).display()
        );
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_load_checks_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE_NAME), VALID).unwrap();

        let err = Manifest::load(dir.path()).unwrap_err().to_string();
        assert!(err.ends_with(": file does not exist"));
        assert!(err.contains("edges.tsv"));

        std::fs::create_dir(dir.path().join("edges.tsv")).unwrap();
        let err = Manifest::load(dir.path()).unwrap_err().to_string();
        assert_eq!(err, format!("{}: not a file", dir.path().join("edges.tsv").display()));

        std::fs::remove_dir(dir.path().join("edges.tsv")).unwrap();
        std::fs::write(dir.path().join("edges.tsv"), "").unwrap();
        std::fs::write(dir.path().join("nodes.csv"), "").unwrap();
        std::fs::create_dir(dir.path().join("clusters")).unwrap();
        std::fs::write(dir.path().join("clusters/markov_i2.tsv"), "").unwrap();

        let manifest = Manifest::load(dir.path()).unwrap();
        assert_eq!(manifest.file_list.len(), 3);
    }
}
