//! JSON Schema validation
//!
//! Thin wrapper over the `jsonschema` crate exposing the two questions the
//! importers ask: is this document valid, and if not, what are all the
//! reasons. Schemas may be stored as YAML or JSON.

use crate::error::{IngestError, Result};
use serde_json::Value;
use std::path::Path;

/// A compiled JSON Schema
pub struct SchemaValidator {
    validator: jsonschema::Validator,
}

/// Read a YAML or JSON file into a JSON value
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
pub(crate) fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| IngestError::schema(format!("cannot read {}: {}", path.display(), e)))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl SchemaValidator {
    /// Compile a schema document
    pub fn new(schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| IngestError::schema(format!("invalid schema: {}", e)))?;
        Ok(Self { validator })
    }

    /// Load and compile a schema file
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_at(path, None)
    }

    /// Load a schema nested inside a larger document, e.g. the `/schema`
    /// member of a collection definition
    pub fn from_file_at(path: impl AsRef<Path>, pointer: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let document = read_document(path)?;

        match pointer {
            Some(pointer) => {
                let schema = document.pointer(pointer).ok_or_else(|| {
                    IngestError::schema(format!("{}: no schema at {}", path.display(), pointer))
                })?;
                Self::new(schema)
            },
            None => Self::new(&document),
        }
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.validator.is_valid(document)
    }

    /// Every violation in `document`, sorted for stable reporting
    pub fn errors(&self, document: &Value) -> Vec<String> {
        let mut errors: Vec<String> = self
            .validator
            .iter_errors(document)
            .map(|e| {
                let location = e.instance_path.to_string();
                if location.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", location, e)
                }
            })
            .collect();
        errors.sort();
        errors
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}
