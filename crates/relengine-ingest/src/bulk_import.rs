//! Bulk import staging
//!
//! Newline-delimited JSON is validated line by line and rewritten into a
//! temporary file, which a [`BulkLoader`] then imports in one call. Edge
//! documents without a `_key` get the same deterministic key the network
//! parser assigns, and every document is stamped with `updated_at`.

use crate::error::{IngestError, Result};
use crate::schema::SchemaValidator;
use crate::store::{OnDuplicate, SaveOutcome};
use relengine_common::keys::assign_edge_key;
use serde_json::Value;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Field stamped with the staging time in epoch milliseconds
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Target of a bulk import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkImportRequest {
    pub collection: String,
    pub on_duplicate: OnDuplicate,
}

impl BulkImportRequest {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            on_duplicate: OnDuplicate::default(),
        }
    }

    pub fn with_on_duplicate(mut self, on_duplicate: OnDuplicate) -> Self {
        self.on_duplicate = on_duplicate;
        self
    }
}

/// Imports a staged file of one JSON document per line
pub trait BulkLoader {
    fn import_file(&mut self, path: &Path, request: &BulkImportRequest) -> Result<SaveOutcome>;
}

/// Validated documents waiting in a temporary file
///
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct StagedImport {
    file: NamedTempFile,
    count: usize,
}

impl StagedImport {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Number of staged documents
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Validate and stage every document in `input`
///
/// Blank lines are skipped. The first unparsable or invalid line aborts
/// staging with its 1-based line number; the partial file is removed.
pub fn stage_documents<R: BufRead>(
    input: R,
    validator: &SchemaValidator,
    now_ms: i64,
) -> Result<StagedImport> {
    let mut file = NamedTempFile::new()?;
    let mut count = 0;

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut document: Value = serde_json::from_str(&line).map_err(|e| {
            IngestError::validation(format!("line {}: invalid JSON: {}", line_number, e))
        })?;

        let errors = validator.errors(&document);
        if !errors.is_empty() {
            return Err(IngestError::validation(format!(
                "line {}: {}",
                line_number,
                errors.join("; ")
            )));
        }

        let fields = document.as_object_mut().ok_or_else(|| {
            IngestError::validation(format!("line {}: expected a JSON object", line_number))
        })?;
        if assign_edge_key(fields) {
            debug!(line = line_number, "Assigned edge key");
        }
        fields.insert(UPDATED_AT_FIELD.to_string(), Value::from(now_ms));

        serde_json::to_writer(&mut file, &document)?;
        file.write_all(b"\n")?;
        count += 1;
    }

    file.flush()?;
    file.as_file_mut().seek(SeekFrom::Start(0))?;
    Ok(StagedImport { file, count })
}

/// Stage `input` and hand the staged file to `loader`
#[instrument(skip_all, fields(collection = %request.collection, on_duplicate = %request.on_duplicate))]
pub fn bulk_import<R: BufRead>(
    input: R,
    validator: &SchemaValidator,
    loader: &mut dyn BulkLoader,
    request: &BulkImportRequest,
    now_ms: i64,
) -> Result<SaveOutcome> {
    let staged = stage_documents(input, validator, now_ms)?;
    info!(documents = staged.count(), path = %staged.path().display(), "Documents staged");

    loader.import_file(staged.path(), request)
}

/// Loader that counts the staged documents instead of importing them
#[derive(Debug, Default)]
pub struct DryRunLoader {
    imported: Vec<(BulkImportRequest, usize)>,
}

impl DryRunLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imported(&self) -> &[(BulkImportRequest, usize)] {
        &self.imported
    }
}

impl BulkLoader for DryRunLoader {
    fn import_file(&mut self, path: &Path, request: &BulkImportRequest) -> Result<SaveOutcome> {
        let reader = BufReader::new(std::fs::File::open(path)?);
        let mut count = 0;
        for line in reader.lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }

        info!(collection = %request.collection, documents = count, "Dry run: staged file not imported");
        self.imported.push((request.clone(), count));
        Ok(SaveOutcome {
            created: count,
            ..SaveOutcome::default()
        })
    }
}
