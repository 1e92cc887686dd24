//! Network data parser
//!
//! Reads a gene interaction network (edges, node metadata and cluster
//! memberships) from a directory described by `manifest.yaml` and turns it
//! into keyed records ready for bulk loading.
//!
//! The manifest is validated once, in [`NetworkParser::configure`]. Every
//! `load_*` call re-reads its files from disk, validates them row by row
//! and either returns the complete result or the first error: nothing is
//! cached and nothing partial is returned.
//!
//! # Example
//!
//! ```no_run
//! use relengine_ingest::network::NetworkParser;
//!
//! # fn main() -> Result<(), relengine_ingest::network::ParserError> {
//! let parser = NetworkParser::configure("/data/djornl")?;
//! let edges = parser.load_edges()?;
//! let delta = parser.check_data_delta()?;
//! println!("{} edges, consistent: {}", edges.edges.len(), delta.is_consistent());
//! # Ok(())
//! # }
//! ```

pub mod clusters;
pub mod delta;
pub mod edges;
pub mod error;
pub mod manifest;
pub mod models;
pub mod nodes;
pub mod rows;
pub mod vocabulary;

pub use delta::DeltaReport;
pub use error::{FormatIssue, ParserError, Result, TypeField};
pub use manifest::{DataRole, FileDescriptor, Manifest};
pub use models::{Attributes, Edge, EdgeData, Node, NodeData};

use crate::config::IngestConfig;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Parser bound to one root data directory and its validated manifest
#[derive(Debug, Clone)]
pub struct NetworkParser {
    root: PathBuf,
    manifest: Manifest,
}

impl NetworkParser {
    /// Validate the manifest under `root` and every file it lists
    pub fn configure(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest = Manifest::load(&root)?;
        Ok(Self { root, manifest })
    }

    /// Configure from the importer configuration's root data directory
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        let root = config
            .root_data_path()
            .map_err(|e| ParserError::configuration(e.to_string()))?;
        Self::configure(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Edges plus a stub node for every endpoint
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_edges(&self) -> Result<EdgeData> {
        let data = edges::load_edges(&self.root, self.manifest.files_with_role(DataRole::Edge))?;
        info!(nodes = data.nodes.len(), edges = data.edges.len(), "Edges loaded");
        Ok(data)
    }

    /// One node per metadata row
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_node_metadata(&self) -> Result<NodeData> {
        let data =
            nodes::load_node_metadata(&self.root, self.manifest.files_with_role(DataRole::Node))?;
        info!(nodes = data.nodes.len(), "Node metadata loaded");
        Ok(data)
    }

    /// Nodes annotated with their cluster ids
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_cluster_data(&self) -> Result<NodeData> {
        let data = clusters::load_cluster_data(
            &self.root,
            self.manifest.files_with_role(DataRole::Cluster),
        )?;
        info!(nodes = data.nodes.len(), "Cluster data loaded");
        Ok(data)
    }

    /// Run all three loads and compare their node keys
    ///
    /// Load failures propagate; key mismatches only show up in the report.
    pub fn check_data_delta(&self) -> Result<DeltaReport> {
        let edges = self.load_edges()?;
        let metadata = self.load_node_metadata()?;
        let clusters = self.load_cluster_data()?;

        let report = DeltaReport::compute(&edges, &metadata, &clusters);
        report.log_summary();
        Ok(report)
    }
}
