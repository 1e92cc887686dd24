// Cluster membership loading

use super::error::Result;
use super::manifest::FileDescriptor;
use super::models::{Attributes, Node, NodeData};
use super::rows::scan_file;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Attribute holding a node's cluster ids
pub const CLUSTERS_ATTRIBUTE: &str = "clusters";

/// Load every cluster file into cluster-annotated nodes
///
/// Each row names a cluster and a separated list of member keys. Every
/// member gets `<cluster_prefix>:<cluster id>` added to its `clusters`
/// attribute; a node in several clusters is returned once, nodes sorted by
/// key.
pub fn load_cluster_data<'a, I>(root: &Path, descriptors: I) -> Result<NodeData>
where
    I: IntoIterator<Item = &'a FileDescriptor>,
{
    let mut memberships: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for descriptor in descriptors {
        let prefix = descriptor.cluster_prefix.as_deref().unwrap_or_default();

        let rows = scan_file(root, descriptor, |scanned| {
            let cluster_id = format!("{}:{}", prefix, scanned.identifier(descriptor.key_column)?);
            let members = scanned
                .row
                .get(descriptor.members_column)
                .split(descriptor.member_separator)
                .map(str::trim)
                .filter(|member| !member.is_empty());

            for member in members {
                let clusters = memberships.entry(member.to_string()).or_default();
                if !clusters.contains(&cluster_id) {
                    clusters.push(cluster_id.clone());
                }
            }
            Ok(())
        })?;

        info!(file = %descriptor.path, clusters = rows, "Loaded cluster file");
    }

    let nodes = memberships
        .into_iter()
        .map(|(key, clusters)| {
            let mut attributes = Attributes::new();
            attributes.insert(
                CLUSTERS_ATTRIBUTE.to_string(),
                Value::Array(clusters.into_iter().map(Value::String).collect()),
            );
            Node::stub(key).with_attributes(attributes)
        })
        .collect();

    Ok(NodeData { nodes })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::network::test_support::{descriptor, write_file};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_cluster_data() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "markov_i2.tsv",
            "cluster_id\tnode_ids\nCluster1\tAT1G01010,AT1G01020\nCluster2\tAT1G01030, AT1G01010,\n",
        );
        write_file(dir.path(), "markov_i4.tsv", "cluster_id\tnode_ids\nCluster1\tAT1G01020\n");
        let i2 = descriptor("path: markov_i2.tsv\ndata_type: cluster\nexpected_columns: 2\ncluster_prefix: markov_i2\n");
        let i4 = descriptor("path: markov_i4.tsv\ndata_type: cluster\nexpected_columns: 2\ncluster_prefix: markov_i4\n");

        let data = load_cluster_data(dir.path(), [&i2, &i4]).unwrap();
        let as_json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            as_json,
            json!({"nodes": [
                {"_key": "AT1G01010", "attributes": {"clusters": ["markov_i2:Cluster1", "markov_i2:Cluster2"]}},
                {"_key": "AT1G01020", "attributes": {"clusters": ["markov_i2:Cluster1", "markov_i4:Cluster1"]}},
                {"_key": "AT1G01030", "attributes": {"clusters": ["markov_i2:Cluster2"]}}
            ]})
        );
    }

    #[test]
    fn test_empty_cluster_file() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "c.tsv", "");
        let d = descriptor("path: c.tsv\ndata_type: cluster\nexpected_columns: 2\ncluster_prefix: m\n");
        assert_eq!(load_cluster_data(dir.path(), [&d]).unwrap(), NodeData::default());
    }

    #[test]
    fn test_cluster_column_count() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "c.tsv", "cluster_id\tnode_ids\nCluster1\ta\textra\n");
        let d = descriptor("path: c.tsv\ndata_type: cluster\nexpected_columns: 2\ncluster_prefix: m\n");

        let err = load_cluster_data(dir.path(), [&d]).unwrap_err();
        assert_eq!(err.to_string(), "c.tsv line 2: expected 2 cols, found 3");
    }
}
