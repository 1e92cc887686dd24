//! Relation Engine ingest library
//!
//! Parsers and importers that turn research data files into documents for
//! the Relation Engine graph store.
//!
//! # Modules
//!
//! - **network**: gene interaction network parser driven by `manifest.yaml`
//! - **data_sources**: catalogue importer for `data_sources.json`
//! - **bulk_import**: validation and staging of newline-delimited JSON
//! - **store**: the save seam shared by the importers
//! - **spec**: schema lookup by collection name in the spec repository
//!
//! # Example
//!
//! ```no_run
//! use relengine_ingest::network::NetworkParser;
//! use relengine_ingest::store::{load_and_save, DryRunStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let parser = NetworkParser::configure("/data/djornl")?;
//!     let mut store = DryRunStore::new();
//!     let summary = load_and_save(&parser, &mut store)?;
//!     println!("{} edges", summary.edges.created);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod bulk_import;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod network;
pub mod schema;
pub mod spec;
pub mod store;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use network::{DeltaReport, NetworkParser, ParserError};
pub use schema::SchemaValidator;
pub use spec::{SchemaType, SpecLoader};
pub use store::{DocumentStore, DryRunStore, OnDuplicate, SaveOutcome};
