// Records produced by the network loaders

use relengine_common::keys::edge_key;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute mapping attached to nodes and edges
pub type Attributes = BTreeMap<String, Value>;

/// A graph node keyed by its external identifier (e.g. a locus id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "_key")]
    pub key: String,

    /// Absent on stubs inferred from edge endpoints
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    #[serde(default)]
    pub attributes: Attributes,
}

impl Node {
    /// Minimal node for an edge endpoint
    pub fn stub(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            node_type: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A directed edge between two node keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Derived from `_from` and `_to`, see [`edge_key`]
    #[serde(rename = "_key")]
    pub key: String,

    #[serde(rename = "_from")]
    pub from: String,

    #[serde(rename = "_to")]
    pub to: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,

    #[serde(default)]
    pub attributes: Attributes,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            key: edge_key(&from, &to),
            from,
            to,
            edge_type: None,
            attributes: Attributes::new(),
        }
    }

    pub fn with_type(mut self, edge_type: impl Into<String>) -> Self {
        self.edge_type = Some(edge_type.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Result of loading edge files: `{"nodes": [...], "edges": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Result of loading node metadata or cluster files: `{"nodes": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub nodes: Vec<Node>,
}

impl NodeData {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.key.as_str())
    }
}

impl EdgeData {
    /// Keys of every node an edge references
    pub fn node_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.key.as_str())
    }
}
