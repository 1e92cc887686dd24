//! Error types for the importers built around the network parser

use crate::network::ParserError;
use thiserror::Error;

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error type for importer workflows
#[derive(Error, Debug)]
pub enum IngestError {
    /// The network parser rejected its configuration or a data file
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// A JSON Schema could not be read or compiled
    #[error("Schema error: {0}")]
    Schema(String),

    /// No schema file of this type (and name) exists under the spec root
    #[error("{}", missing_schema(.schema_type, .name.as_deref()))]
    SchemaNonexistent {
        schema_type: String,
        name: Option<String>,
    },

    /// A document failed validation during bulk staging
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The save collaborator reported a failure
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// "Stored query 'x' does not exist." style message
fn missing_schema(schema_type: &str, name: Option<&str>) -> String {
    let label = schema_type.replace('_', " ");
    let mut chars = label.chars();
    let label = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    };
    match name {
        Some(name) => format!("{} '{}' does not exist.", label, name),
        None => format!("{} does not exist.", label),
    }
}

impl IngestError {
    /// Create a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn schema_nonexistent(schema_type: impl Into<String>, name: Option<&str>) -> Self {
        Self::SchemaNonexistent {
            schema_type: schema_type.into(),
            name: name.map(str::to_string),
        }
    }
}
