//! Importer configuration
//!
//! Built once at startup and passed by reference to whatever needs it.
//! Nothing below `main` reads the environment.

use crate::error::{IngestError, Result};
use std::path::{Path, PathBuf};

// ============================================================================
// Environment variable names
// ============================================================================

/// Root directory holding `manifest.yaml` and the files it lists
pub const ROOT_DATA_PATH_VAR: &str = "RES_ROOT_DATA_PATH";

/// Root of the schema repository: `collections/`, `data_sources/` and so on
pub const SPEC_PATH_VAR: &str = "RES_SPEC_PATH";

/// Relation Engine API base URL, used by the external save step
pub const API_URL_VAR: &str = "RES_API_URL";

/// Relation Engine auth token, used by the external save step
pub const AUTH_TOKEN_VAR: &str = "RES_AUTH_TOKEN";

/// Importer configuration
#[derive(Clone, Default)]
pub struct IngestConfig {
    root_data_path: Option<PathBuf>,
    spec_path: Option<PathBuf>,
    api_url: Option<String>,
    auth_token: Option<String>,
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from environment variables
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Self {
            root_data_path: non_empty(ROOT_DATA_PATH_VAR).map(PathBuf::from),
            spec_path: non_empty(SPEC_PATH_VAR).map(PathBuf::from),
            api_url: non_empty(API_URL_VAR),
            auth_token: non_empty(AUTH_TOKEN_VAR),
        }
    }

    /// Override the root data directory
    pub fn with_root_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_data_path = Some(path.into());
        self
    }

    /// Override the schema repository root
    pub fn with_spec_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec_path = Some(path.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Root data directory, required by every data-reading command
    pub fn root_data_path(&self) -> Result<&Path> {
        self.root_data_path.as_deref().ok_or_else(|| {
            IngestError::config(format!(
                "no root data directory; set {} or pass --root",
                ROOT_DATA_PATH_VAR
            ))
        })
    }

    /// Schema repository root, required when a schema is looked up by name
    pub fn spec_path(&self) -> Result<&Path> {
        self.spec_path.as_deref().ok_or_else(|| {
            IngestError::config(format!(
                "no spec directory; set {} or pass --spec-root",
                SPEC_PATH_VAR
            ))
        })
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

impl std::fmt::Debug for IngestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestConfig")
            .field("root_data_path", &self.root_data_path)
            .field("spec_path", &self.spec_path)
            .field("api_url", &self.api_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
