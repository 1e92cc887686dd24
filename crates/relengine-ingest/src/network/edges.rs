//! Edge file loading
//!
//! Each edge row becomes one [`Edge`] keyed by its endpoints; every distinct
//! endpoint also becomes a stub [`Node`]. Stubs are de-duplicated within a
//! single call only.

use super::error::Result;
use super::manifest::FileDescriptor;
use super::models::{Edge, EdgeData, Node};
use super::rows::scan_file;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

/// Load every edge file, failing on the first bad row
pub fn load_edges<'a, I>(root: &Path, descriptors: I) -> Result<EdgeData>
where
    I: IntoIterator<Item = &'a FileDescriptor>,
{
    let mut edges = Vec::new();
    let mut endpoints = BTreeSet::new();

    for descriptor in descriptors {
        let skip: Vec<usize> = [
            Some(descriptor.from_column),
            Some(descriptor.to_column),
            descriptor.type_column,
        ]
        .into_iter()
        .flatten()
        .collect();

        let rows = scan_file(root, descriptor, |scanned| {
            let from = scanned.identifier(descriptor.from_column)?;
            let to = scanned.identifier(descriptor.to_column)?;
            endpoints.insert(from.to_string());
            endpoints.insert(to.to_string());

            let mut edge = Edge::new(from, to).with_attributes(scanned.attributes(&skip));
            if let Some(edge_type) = scanned.row_type {
                edge = edge.with_type(edge_type);
            }
            edges.push(edge);
            Ok(())
        })?;

        info!(file = %descriptor.path, edges = rows, "Loaded edge file");
    }

    Ok(EdgeData {
        nodes: endpoints.into_iter().map(Node::stub).collect(),
        edges,
    })
}
