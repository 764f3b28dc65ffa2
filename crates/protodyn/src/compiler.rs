// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema compiler seam.
//!
//! The registry never parses schema text itself. It hands a source path to a
//! [`SchemaCompiler`] and receives one [`CompiledFile`] per requested file.
//! [`ProtoxCompiler`] is the default implementation, backed by `protox`.

use std::path::{Path, PathBuf};

use prost_reflect::MessageDescriptor;
use thiserror::Error;

/// Compilation failures.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Syntax or resolution error reported by the compiler.
    #[error("failed to compile schema {}: {message}", path.display())]
    Schema { path: PathBuf, message: String },

    /// The compiler succeeded but produced nothing.
    #[error("no files parsed from schema {}", path.display())]
    NoFiles { path: PathBuf },
}

/// Output of compiling one requested schema file.
#[derive(Debug, Clone)]
pub struct CompiledFile {
    name: String,
    messages: Vec<MessageDescriptor>,
}

impl CompiledFile {
    /// Create a compiled file result.
    pub fn new(name: impl Into<String>, messages: Vec<MessageDescriptor>) -> Self {
        Self {
            name: name.into(),
            messages,
        }
    }

    /// File name relative to the include path it was resolved against.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level message types in declaration order.
    pub fn messages(&self) -> &[MessageDescriptor] {
        &self.messages
    }

    /// Look up a top-level message type by its short name.
    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name() == name)
    }
}

/// Turns schema sources into compiled file descriptors.
pub trait SchemaCompiler {
    /// Current ordered search list.
    fn include_paths(&self) -> &[PathBuf];

    /// Replace the search list.
    fn set_include_paths(&mut self, paths: Vec<PathBuf>);

    /// Compile the schema at `path` (and whatever it imports).
    ///
    /// Only the requested file is returned; imported files are resolved but
    /// not listed.
    fn compile(&self, path: &Path) -> Result<Vec<CompiledFile>, CompileError>;
}

/// [`SchemaCompiler`] backed by the pure-Rust `protox` compiler.
#[derive(Debug, Clone)]
pub struct ProtoxCompiler {
    include_paths: Vec<PathBuf>,
}

impl ProtoxCompiler {
    /// Create a compiler with the given search list.
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self { include_paths }
    }

    /// Search list used for one compilation of `path`.
    ///
    /// A source sitting outside every include path, absolute or relative
    /// (`../person.proto`), gets its parent directory appended so it can
    /// still be opened. A bare file name is resolved through `.`.
    fn effective_includes(&self, path: &Path) -> Vec<PathBuf> {
        let mut includes = self.include_paths.clone();
        let covered = includes
            .iter()
            .any(|inc| inc.as_os_str() != "." && path.starts_with(inc));
        if !covered {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !includes.iter().any(|p| p == parent) {
                    includes.push(parent.to_path_buf());
                }
            }
        }
        includes
    }
}

impl Default for ProtoxCompiler {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(crate::config::CURRENT_DIR)])
    }
}

impl SchemaCompiler for ProtoxCompiler {
    fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    fn set_include_paths(&mut self, paths: Vec<PathBuf>) {
        self.include_paths = paths;
    }

    fn compile(&self, path: &Path) -> Result<Vec<CompiledFile>, CompileError> {
        let schema_error = |e: protox::Error| CompileError::Schema {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let includes = self.effective_includes(path);
        log::debug!(
            "[compiler] compiling {} (includes: {:?})",
            path.display(),
            includes
        );

        let mut compiler = protox::Compiler::new(&includes).map_err(schema_error)?;
        compiler.include_imports(false);
        compiler.include_source_info(false);
        compiler.open_file(path).map_err(schema_error)?;

        let pool = compiler.descriptor_pool();
        let files: Vec<CompiledFile> = compiler
            .file_descriptor_set()
            .file
            .iter()
            .filter_map(|proto| pool.get_file_by_name(proto.name()))
            .map(|file| CompiledFile::new(file.name(), file.messages().collect()))
            .collect();

        if files.is_empty() {
            return Err(CompileError::NoFiles {
                path: path.to_path_buf(),
            });
        }

        log::debug!(
            "[compiler] {} -> {} file(s), {} message type(s)",
            path.display(),
            files.len(),
            files.iter().map(|f| f.messages().len()).sum::<usize>()
        );
        Ok(files)
    }
}
