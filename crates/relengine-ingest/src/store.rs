//! Document store seam
//!
//! Loaded network data leaves this crate through [`DocumentStore`]. The only
//! implementation shipped here is [`DryRunStore`], which records and logs
//! what would have been written; a remote store plugs in behind the same
//! trait.

use crate::error::{IngestError, Result};
use crate::network::NetworkParser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{info, instrument};

/// Collection receiving network nodes
pub const NODE_COLLECTION: &str = "djornl_node";

/// Collection receiving network edges
pub const EDGE_COLLECTION: &str = "djornl_edge";

/// What the store does when a document's `_key` already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnDuplicate {
    /// Merge the new fields into the existing document
    #[default]
    Update,
    Replace,
    Ignore,
    Error,
}

impl OnDuplicate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Ignore => "ignore",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for OnDuplicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OnDuplicate {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "update" => Ok(Self::Update),
            "replace" => Ok(Self::Replace),
            "ignore" => Ok(Self::Ignore),
            "error" => Ok(Self::Error),
            other => Err(IngestError::config(format!(
                "invalid on_duplicate value '{}'; expected update, replace, ignore or error",
                other
            ))),
        }
    }
}

/// Counts reported back by a store after a save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub created: usize,
    pub updated: usize,
    pub ignored: usize,
    pub errors: usize,
}

impl SaveOutcome {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.ignored + self.errors
    }
}

impl std::ops::AddAssign for SaveOutcome {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.updated += other.updated;
        self.ignored += other.ignored;
        self.errors += other.errors;
    }
}

/// Destination for loaded documents
pub trait DocumentStore {
    fn save(
        &mut self,
        collection: &str,
        documents: &[Value],
        on_duplicate: OnDuplicate,
    ) -> Result<SaveOutcome>;
}

/// One recorded call to [`DryRunStore::save`]
#[derive(Debug, Clone, PartialEq)]
pub struct SavedBatch {
    pub collection: String,
    pub on_duplicate: OnDuplicate,
    pub documents: Vec<Value>,
}

/// Store that writes nothing and remembers every batch it was given
#[derive(Debug, Default)]
pub struct DryRunStore {
    batches: Vec<SavedBatch>,
}

impl DryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[SavedBatch] {
        &self.batches
    }

    /// Documents sent to `collection`, across all batches
    pub fn documents_in<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = &'a Value> + 'a {
        self.batches
            .iter()
            .filter(move |batch| batch.collection == collection)
            .flat_map(|batch| batch.documents.iter())
    }
}

impl DocumentStore for DryRunStore {
    fn save(
        &mut self,
        collection: &str,
        documents: &[Value],
        on_duplicate: OnDuplicate,
    ) -> Result<SaveOutcome> {
        info!(
            collection,
            documents = documents.len(),
            on_duplicate = %on_duplicate,
            "Dry run: documents not saved"
        );

        self.batches.push(SavedBatch {
            collection: collection.to_string(),
            on_duplicate,
            documents: documents.to_vec(),
        });

        Ok(SaveOutcome {
            created: documents.len(),
            ..SaveOutcome::default()
        })
    }
}

/// Totals from [`load_and_save`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSaveSummary {
    pub nodes: SaveOutcome,
    pub edges: SaveOutcome,
}

/// Load the whole network and hand it to `store`
///
/// All three loads finish before the first save, so a bad data file never
/// leaves a partial import behind. The saves themselves are not atomic:
/// node stubs, node metadata and cluster nodes go to [`NODE_COLLECTION`]
/// first, then edges to [`EDGE_COLLECTION`], each with
/// [`OnDuplicate::Update`] so later batches merge into earlier ones.
#[instrument(skip_all, fields(root = %parser.root().display()))]
pub fn load_and_save(
    parser: &NetworkParser,
    store: &mut dyn DocumentStore,
) -> Result<NetworkSaveSummary> {
    let edge_data = parser.load_edges()?;
    let metadata = parser.load_node_metadata()?;
    let clusters = parser.load_cluster_data()?;

    let mut summary = NetworkSaveSummary::default();

    for batch in [&edge_data.nodes, &metadata.nodes, &clusters.nodes] {
        let documents = batch
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        summary.nodes += store.save(NODE_COLLECTION, &documents, OnDuplicate::Update)?;
    }

    let documents = edge_data
        .edges
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;
    summary.edges += store.save(EDGE_COLLECTION, &documents, OnDuplicate::Update)?;

    info!(
        nodes = summary.nodes.total(),
        edges = summary.edges.total(),
        "Network saved"
    );
    Ok(summary)
}
