//! Shared fixtures for the integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const EDGE_FILE: &str = "merged_edges-AMW-060820_AF.tsv";
pub const NODE_FILE: &str = "aranet2-aragwas-MERGED-AMW-v2_091319_nodeTable.csv";
pub const CLUSTER_FILE: &str = "cluster_data/out.aranetv2_subnet_AT-CX_top10percent_anno_AF_082919.abc.I2_named.tsv";

/// Columns in the node metadata table
pub const NODE_COLUMNS: usize = 20;

/// Manifest describing one edge, one node and one cluster file
pub fn standard_manifest() -> String {
    format!(
        r#"name: Dan Jacobson Exascale dataset
release_date: "2020-06-06"
file_list:
  - path: {EDGE_FILE}
    data_type: edge
    expected_columns: 5
    type_column: 4
    vocabulary: [AraGWAS-Phenotype_Associations, AraNetv2-CX_pairwise-gene-coexpression, AraNetv2-HT_high-throughput-ppi]
  - path: {NODE_FILE}
    data_type: node_metadata
    expected_columns: {NODE_COLUMNS}
    type_column: 1
    vocabulary: [gene, pheno]
  - path: {CLUSTER_FILE}
    data_type: cluster
    expected_columns: 2
    cluster_prefix: markov_i2
"#
    )
}

/// Edge table header
pub fn edge_header() -> &'static str {
    "node1\tnode2\tedge\tedge_descrip\tlayer_descrip\n"
}

/// Node table header with `NODE_COLUMNS` columns
pub fn node_header() -> String {
    let mut columns = vec!["node_id".to_string(), "node_type".to_string()];
    columns.extend((2..NODE_COLUMNS).map(|i| format!("attr_{}", i)));
    format!("{}\n", columns.join(","))
}

/// Node table row with `columns` fields
pub fn node_row(key: &str, node_type: &str, columns: usize) -> String {
    let mut fields = vec![key.to_string(), node_type.to_string()];
    fields.extend((2..columns).map(|i| format!("v{}", i)));
    format!("{}\n", fields.join(","))
}

/// A temporary data directory populated file by file
pub struct NetworkFixture {
    dir: TempDir,
}

impl NetworkFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Fixture with the standard manifest and all three files
    pub fn standard(edges: &str, nodes: &str, clusters: &str) -> Self {
        Self::new()
            .manifest(&standard_manifest())
            .file(EDGE_FILE, edges)
            .file(NODE_FILE, nodes)
            .file(CLUSTER_FILE, clusters)
    }

    pub fn manifest(self, content: &str) -> Self {
        self.file("manifest.yaml", content)
    }

    pub fn file(self, name: &str, content: &str) -> Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    pub fn dir(self, name: &str) -> Self {
        fs::create_dir_all(self.dir.path().join(name)).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}
