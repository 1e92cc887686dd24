//! Relation Engine Common Library
//!
//! Shared types, utilities, and error handling for the Relation Engine importers.
//!
//! # Overview
//!
//! - **Error Handling**: Common error type and result alias
//! - **Keys**: Deterministic document keys for graph edges
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```
//! use relengine_common::keys::edge_key;
//!
//! let key = edge_key("AT1G01010", "AT1G01020");
//! assert_eq!(key.len(), 16);
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod keys;
pub mod logging;

// Re-export commonly used types
pub use error::{CommonError, Result};
