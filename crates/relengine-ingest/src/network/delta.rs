//! Cross-checks between the three loaded data sets
//!
//! Mismatches are diagnostics, never errors: the caller decides whether a
//! non-empty report should stop an import.

use super::models::{EdgeData, NodeData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Node keys that appear in one data set but not another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaReport {
    /// Referenced by an edge, no metadata row
    pub edge_nodes_without_metadata: BTreeSet<String>,
    /// Described by metadata, not referenced by any edge
    pub metadata_nodes_without_edges: BTreeSet<String>,
    /// In a cluster, no metadata row
    pub cluster_nodes_without_metadata: BTreeSet<String>,
    /// Described by metadata, in no cluster
    pub metadata_nodes_without_clusters: BTreeSet<String>,
    /// In a cluster, not referenced by any edge
    pub cluster_nodes_without_edges: BTreeSet<String>,
}

impl DeltaReport {
    pub fn compute(edges: &EdgeData, metadata: &NodeData, clusters: &NodeData) -> Self {
        let edge_keys: BTreeSet<&str> = edges
            .node_keys()
            .chain(edges.edges.iter().flat_map(|e| [e.from.as_str(), e.to.as_str()]))
            .collect();
        let metadata_keys: BTreeSet<&str> = metadata.keys().collect();
        let cluster_keys: BTreeSet<&str> = clusters.keys().collect();

        let missing = |left: &BTreeSet<&str>, right: &BTreeSet<&str>| -> BTreeSet<String> {
            left.difference(right).map(|k| k.to_string()).collect()
        };

        Self {
            edge_nodes_without_metadata: missing(&edge_keys, &metadata_keys),
            metadata_nodes_without_edges: missing(&metadata_keys, &edge_keys),
            cluster_nodes_without_metadata: missing(&cluster_keys, &metadata_keys),
            metadata_nodes_without_clusters: missing(&metadata_keys, &cluster_keys),
            cluster_nodes_without_edges: missing(&cluster_keys, &edge_keys),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.sections().iter().all(|(_, keys)| keys.is_empty())
    }

    /// Each set with a label, in report order
    pub fn sections(&self) -> [(&'static str, &BTreeSet<String>); 5] {
        [
            ("edge nodes without metadata", &self.edge_nodes_without_metadata),
            ("metadata nodes without edges", &self.metadata_nodes_without_edges),
            ("cluster nodes without metadata", &self.cluster_nodes_without_metadata),
            ("metadata nodes without clusters", &self.metadata_nodes_without_clusters),
            ("cluster nodes without edges", &self.cluster_nodes_without_edges),
        ]
    }

    /// One warning per non-empty set
    pub fn log_summary(&self) {
        if self.is_consistent() {
            info!("Node keys agree across edges, metadata and clusters");
            return;
        }

        for (label, keys) in self.sections() {
            if keys.is_empty() {
                continue;
            }
            let sample: Vec<&str> = keys.iter().take(5).map(String::as_str).collect();
            warn!(count = keys.len(), sample = ?sample, "Delta: {}", label);
        }
    }
}
