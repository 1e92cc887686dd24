// Node metadata loading

use super::error::Result;
use super::manifest::FileDescriptor;
use super::models::{Node, NodeData};
use super::rows::scan_file;
use std::path::Path;
use tracing::info;

/// Load every node metadata file, one node per data row
///
/// Keys repeated across rows or files are passed through as-is; the caller
/// reconciles them.
pub fn load_node_metadata<'a, I>(root: &Path, descriptors: I) -> Result<NodeData>
where
    I: IntoIterator<Item = &'a FileDescriptor>,
{
    let mut nodes = Vec::new();

    for descriptor in descriptors {
        let skip: Vec<usize> = [Some(descriptor.key_column), descriptor.type_column]
            .into_iter()
            .flatten()
            .collect();

        let rows = scan_file(root, descriptor, |scanned| {
            let key = scanned.identifier(descriptor.key_column)?;
            let mut node = Node::stub(key).with_attributes(scanned.attributes(&skip));
            if let Some(node_type) = scanned.row_type {
                node = node.with_type(node_type);
            }
            nodes.push(node);
            Ok(())
        })?;

        info!(file = %descriptor.path, nodes = rows, "Loaded node metadata file");
    }

    Ok(NodeData { nodes })
}
