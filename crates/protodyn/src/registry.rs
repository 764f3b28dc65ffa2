// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema registry.
//!
//! Compiles schema sources and keeps one [`MessageHandle`] per message type
//! name. Two loading policies coexist on purpose:
//!
//! - [`SchemaRegistry::compile_and_load`] registers a single named type and
//!   overwrites whatever was registered under that name.
//! - [`SchemaRegistry::compile_and_load_all`] and
//!   [`SchemaRegistry::load_directory`] register every top-level type they
//!   find and fail on the first name already present.
//!
//! Bulk loads are not transactional: handles registered before a failure
//! stay registered.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::compiler::{CompileError, ProtoxCompiler, SchemaCompiler};
use crate::config::{RegistryConfig, CURRENT_DIR};
use crate::message::MessageHandle;

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors produced by the schema registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("message type '{message_type}' not found in schema {}", path.display())]
    MessageNotFound { message_type: String, path: PathBuf },

    #[error("message type '{0}' is not registered")]
    NotRegistered(String),

    #[error("message type '{message_type}' from {} is already registered", path.display())]
    DuplicateName { message_type: String, path: PathBuf },

    #[error("I/O error while walking {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RegistryError {
    /// True when a message type could not be found, either in a schema or
    /// in the registry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MessageNotFound { .. } | Self::NotRegistered(_))
    }
}

// ---------------------------------------------------------------------------
// SchemaRegistry
// ---------------------------------------------------------------------------

/// Compiler plus a map from message type name to handle.
///
/// Not synchronized: one writer at a time.
#[derive(Debug)]
pub struct SchemaRegistry<C = ProtoxCompiler> {
    compiler: C,
    config: RegistryConfig,
    messages: HashMap<String, MessageHandle>,
}

impl SchemaRegistry<ProtoxCompiler> {
    /// Create an empty registry searching `.` only.
    ///
    /// The environment is not consulted. Hosts that want
    /// `PROTODYN_INCLUDE_PATH` honoured use [`crate::new_registry`].
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry from `config`.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_compiler(ProtoxCompiler::default(), config)
    }
}

impl Default for SchemaRegistry<ProtoxCompiler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: SchemaCompiler> SchemaRegistry<C> {
    /// Create an empty registry around a custom compiler.
    ///
    /// The compiler's search list is replaced with `config.include_paths`.
    pub fn with_compiler(mut compiler: C, config: RegistryConfig) -> Self {
        compiler.set_include_paths(config.include_paths.clone());
        Self {
            compiler,
            config,
            messages: HashMap::new(),
        }
    }

    /// Compile `path` and register the top-level type `message_type` from it.
    ///
    /// Any handle already registered under that name is replaced.
    pub fn compile_and_load(
        &mut self,
        path: impl AsRef<Path>,
        message_type: &str,
    ) -> Result<&mut MessageHandle, RegistryError> {
        let path = path.as_ref();
        let files = self.compiler.compile(path)?;
        let descriptor = files
            .first()
            .and_then(|file| file.message(message_type))
            .cloned()
            .ok_or_else(|| RegistryError::MessageNotFound {
                message_type: message_type.to_string(),
                path: path.to_path_buf(),
            })?;

        let handle = MessageHandle::new(descriptor);
        match self.messages.entry(message_type.to_string()) {
            Entry::Occupied(mut slot) => {
                log::warn!(
                    "[registry] replacing handle for '{}' with one from {}",
                    message_type,
                    path.display()
                );
                slot.insert(handle);
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => {
                log::debug!(
                    "[registry] registered '{}' from {}",
                    message_type,
                    path.display()
                );
                Ok(slot.insert(handle))
            }
        }
    }

    /// Compile `path` and register every top-level type of every compiled
    /// file. Returns how many handles were added.
    ///
    /// Fails on the first name already registered; earlier names from this
    /// call stay registered.
    pub fn compile_and_load_all(&mut self, path: impl AsRef<Path>) -> Result<usize, RegistryError> {
        let path = path.as_ref();
        let files = self.compiler.compile(path)?;

        let mut added = 0;
        for file in &files {
            for descriptor in file.messages() {
                let name = descriptor.name();
                if self.messages.contains_key(name) {
                    return Err(RegistryError::DuplicateName {
                        message_type: name.to_string(),
                        path: path.to_path_buf(),
                    });
                }
                log::debug!(
                    "[registry] registered '{}' ({}) from {}",
                    name,
                    descriptor.full_name(),
                    file.name()
                );
                self.messages
                    .insert(name.to_string(), MessageHandle::new(descriptor.clone()));
                added += 1;
            }
        }
        Ok(added)
    }

    /// Recursively load every schema file under `folder`.
    ///
    /// The compiler search list becomes exactly `[".", folder]`, discarding
    /// earlier include paths. Files are visited in file-name order and the
    /// walk stops at the first error. Returns how many handles were added.
    pub fn load_directory(&mut self, folder: impl AsRef<Path>) -> Result<usize, RegistryError> {
        let folder = folder.as_ref();
        self.compiler
            .set_include_paths(vec![PathBuf::from(CURRENT_DIR), folder.to_path_buf()]);

        let walker = WalkDir::new(folder)
            .follow_links(self.config.follow_links)
            .sort_by_file_name();

        let mut added = 0;
        let mut files = 0;
        for entry in walker {
            let entry = entry.map_err(|e| RegistryError::Io {
                path: e
                    .path()
                    .map_or_else(|| folder.to_path_buf(), Path::to_path_buf),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() || !self.config.is_schema_file(entry.path()) {
                continue;
            }
            added += self.compile_and_load_all(entry.path())?;
            files += 1;
        }

        log::debug!(
            "[registry] loaded {} type(s) from {} file(s) under {}",
            added,
            files,
            folder.display()
        );
        Ok(added)
    }

    /// Look up a registered handle.
    pub fn get(&self, message_type: &str) -> Result<&MessageHandle, RegistryError> {
        self.messages
            .get(message_type)
            .ok_or_else(|| RegistryError::NotRegistered(message_type.to_string()))
    }

    /// Look up a registered handle for mutation.
    pub fn get_mut(&mut self, message_type: &str) -> Result<&mut MessageHandle, RegistryError> {
        self.messages
            .get_mut(message_type)
            .ok_or_else(|| RegistryError::NotRegistered(message_type.to_string()))
    }

    /// Whether a handle is registered under `message_type`.
    pub fn contains(&self, message_type: &str) -> bool {
        self.messages.contains_key(message_type)
    }

    /// Unregister a handle, returning it.
    pub fn remove(&mut self, message_type: &str) -> Option<MessageHandle> {
        self.messages.remove(message_type)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.messages.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Current compiler search list.
    pub fn include_paths(&self) -> &[PathBuf] {
        self.compiler.include_paths()
    }

    /// Configuration the registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
