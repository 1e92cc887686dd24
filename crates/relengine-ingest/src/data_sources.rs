//! Data source catalogue import
//!
//! Loads `data_sources.json` from the data directory. Unlike the network
//! loaders, validation here accumulates: every document is checked and every
//! problem reported, and nothing is saved unless the whole file is clean.

use crate::error::{IngestError, Result};
use crate::schema::SchemaValidator;
use crate::store::{DocumentStore, OnDuplicate, SaveOutcome};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Catalogue file name inside the data directory
pub const DATA_SOURCES_FILE: &str = "data_sources.json";

/// Collection receiving data source documents
pub const COLLECTION: &str = "data_sources_nodes";

/// Field copied into `_key`
const KEY_FIELD: &str = "ns";

/// Result of one import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    /// Documents read from the file
    pub documents: usize,
    /// Documents that passed validation
    pub valid: usize,
    /// Every validation problem, grouped by document in file order
    pub errors: Vec<String>,
    /// Store counts, present only when documents were handed to the store
    pub saved: Option<SaveOutcome>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the catalogue in `data_dir` and save it unless `dry_run`
///
/// Unreadable or non-array input is an error. Invalid documents are not: they
/// are listed in [`ImportReport::errors`] and block the save.
#[instrument(skip(data_dir, validator, store), fields(data_dir = %data_dir.display()))]
pub fn import_data_sources(
    data_dir: &Path,
    validator: &SchemaValidator,
    store: &mut dyn DocumentStore,
    dry_run: bool,
) -> Result<ImportReport> {
    let path = data_dir.join(DATA_SOURCES_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        IngestError::config(format!("cannot read {}: {}", path.display(), e))
    })?;

    let documents = match serde_json::from_str::<Value>(&content)? {
        Value::Array(documents) => documents,
        _ => {
            return Err(IngestError::validation(format!(
                "{}: expected a JSON array of data sources",
                path.display()
            )))
        },
    };

    let mut report = ImportReport {
        documents: documents.len(),
        ..ImportReport::default()
    };
    let mut to_save = Vec::with_capacity(documents.len());

    for (index, mut document) in documents.into_iter().enumerate() {
        let problems = validator.errors(&document);
        if !problems.is_empty() {
            for problem in problems {
                error!(document = index, "Validation error: {}", problem);
                report.errors.push(format!("document {}: {}", index, problem));
            }
            continue;
        }

        let Some(key) = document
            .get(KEY_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            report
                .errors
                .push(format!("document {}: missing string field '{}'", index, KEY_FIELD));
            continue;
        };
        if let Some(fields) = document.as_object_mut() {
            fields.insert("_key".to_string(), Value::String(key));
        }
        to_save.push(document);
    }
    report.valid = to_save.len();

    if !report.is_success() {
        warn!(
            errors = report.errors.len(),
            dry_run,
            "Data did not validate; nothing will be saved"
        );
        return Ok(report);
    }

    if dry_run {
        info!(documents = report.valid, "Dry run completed successfully; data not saved");
        return Ok(report);
    }

    let outcome = store.save(COLLECTION, &to_save, OnDuplicate::Update)?;
    info!(
        collection = COLLECTION,
        created = outcome.created,
        updated = outcome.updated,
        "Saved data sources"
    );
    report.saved = Some(outcome);
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::DryRunStore;
    use serde_json::json;
    use tempfile::TempDir;

    fn validator() -> SchemaValidator {
        SchemaValidator::new(&json!({
            "type": "object",
            "required": ["ns", "category", "title"],
            "properties": {
                "ns": {"type": "string", "pattern": "^[a-z_]+$"},
                "category": {"type": "string"},
                "title": {"type": "string"}
            }
        }))
        .unwrap()
    }

    fn data_dir(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(DATA_SOURCES_FILE), content).unwrap();
        dir
    }

    #[test]
    fn test_import_saves_with_keys() {
        let dir = data_dir(
            r#"[{"ns": "go_ontology", "category": "ontology", "title": "GO"},
                {"ns": "ncbi_taxonomy", "category": "taxonomy", "title": "NCBI"}]"#,
        );
        let mut store = DryRunStore::new();

        let report = import_data_sources(dir.path(), &validator(), &mut store, false).unwrap();
        assert!(report.is_success());
        assert_eq!(report.documents, 2);
        assert_eq!(report.saved.unwrap().created, 2);

        let saved: Vec<&Value> = store.documents_in(COLLECTION).collect();
        assert_eq!(saved[0]["_key"], json!("go_ontology"));
        assert_eq!(saved[1]["_key"], json!("ncbi_taxonomy"));
    }

    #[test]
    fn test_dry_run_saves_nothing() {
        let dir = data_dir(r#"[{"ns": "go_ontology", "category": "ontology", "title": "GO"}]"#);
        let mut store = DryRunStore::new();

        let report = import_data_sources(dir.path(), &validator(), &mut store, true).unwrap();
        assert!(report.is_success());
        assert_eq!(report.valid, 1);
        assert!(report.saved.is_none());
        assert!(store.batches().is_empty());
    }

    #[test]
    fn test_errors_accumulate_across_documents() {
        let dir = data_dir(
            r#"[{"ns": "Bad NS", "category": "x"},
                {"ns": "fine", "category": "x", "title": "ok"},
                {"title": 3}]"#,
        );
        let mut store = DryRunStore::new();

        let report = import_data_sources(dir.path(), &validator(), &mut store, false).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.valid, 1);
        assert!(report.errors.len() >= 4);
        assert!(report.errors.iter().any(|e| e.starts_with("document 0:")));
        assert!(report.errors.iter().any(|e| e.starts_with("document 2:")));
        assert!(!report.errors.iter().any(|e| e.starts_with("document 1:")));
        assert!(report.saved.is_none());
        assert!(store.batches().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = import_data_sources(dir.path(), &validator(), &mut DryRunStore::new(), true)
            .unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
    }

    #[test]
    fn test_not_an_array() {
        let dir = data_dir(r#"{"ns": "go_ontology"}"#);
        let err = import_data_sources(dir.path(), &validator(), &mut DryRunStore::new(), true)
            .unwrap_err();
        assert!(matches!(err, IngestError::Validation(_)));
    }
}
