// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry configuration.
//!
//! Constants for schema discovery plus the [`RegistryConfig`] builder that
//! seeds the compiler search list.
//!
//! # Example
//!
//! ```rust
//! use protodyn::config::RegistryConfig;
//!
//! let config = RegistryConfig::new()
//!     .include_path("schemas")
//!     .schema_extension("proto");
//! assert_eq!(config.include_paths.len(), 2);
//! ```

use std::env;
use std::path::{Path, PathBuf};

/// File extension (without the dot) of schema sources picked up by a
/// directory load.
pub const DEFAULT_SCHEMA_EXTENSION: &str = "proto";

/// Include path every registry starts with, and the first entry installed
/// by a directory load.
pub const CURRENT_DIR: &str = ".";

/// Environment variable holding extra include paths, separated with the
/// platform path separator (`:` on Unix, `;` on Windows).
pub const INCLUDE_PATH_ENV: &str = "PROTODYN_INCLUDE_PATH";

/// Configuration consumed by [`crate::SchemaRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Ordered compiler search list.
    pub include_paths: Vec<PathBuf>,
    /// Extension of schema sources for directory loads.
    pub schema_extension: String,
    /// Follow symbolic links while walking a directory.
    pub follow_links: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_paths: vec![PathBuf::from(CURRENT_DIR)],
            schema_extension: DEFAULT_SCHEMA_EXTENSION.to_string(),
            follow_links: false,
        }
    }
}

impl RegistryConfig {
    /// Create the default configuration (`.` as the only include path).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `PROTODYN_INCLUDE_PATH`.
    ///
    /// Entries from the variable are appended after `.`; an unset or empty
    /// variable yields the default configuration.
    pub fn from_env() -> Self {
        let config = Self::default();
        match env::var_os(INCLUDE_PATH_ENV) {
            Some(raw) if !raw.is_empty() => {
                config.include_paths(env::split_paths(&raw).filter(|p| !p.as_os_str().is_empty()))
            }
            _ => config,
        }
    }

    /// Append one include path.
    pub fn include_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        if !self.include_paths.contains(&path) {
            self.include_paths.push(path);
        }
        self
    }

    /// Append several include paths, skipping ones already present.
    pub fn include_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            self = self.include_path(path);
        }
        self
    }

    /// Set the schema file extension. A leading dot is ignored.
    pub fn schema_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.schema_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Enable or disable following symbolic links during directory walks.
    pub fn follow_links(mut self, enable: bool) -> Self {
        self.follow_links = enable;
        self
    }

    /// Check whether `path` carries the configured schema extension.
    pub fn is_schema_file(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.schema_extension.as_str())
    }
}
