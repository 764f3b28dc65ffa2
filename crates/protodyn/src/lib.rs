// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime protobuf schemas and dynamic messages.
//!
//! Compile `.proto` sources at runtime, then build, inspect, encode and
//! decode messages of the compiled types without generated code.
//!
//! # Features
//!
//! - **SchemaRegistry**: compiles one file or a whole directory tree and
//!   keeps a handle per message type name
//! - **MessageHandle**: one descriptor plus one mutable dynamic instance,
//!   with typed field access and wire-format encode/decode
//! - **Coercion table**: host values (`int`, `int64`, `float`, `text`) are
//!   converted through an explicit per-kind table
//! - **Pluggable compiler**: `protox` by default, any [`SchemaCompiler`]
//!   otherwise
//!
//! # Example
//!
//! ```rust,no_run
//! use protodyn::{SchemaRegistry, Value};
//!
//! let mut registry = SchemaRegistry::new();
//! let person = registry.compile_and_load("person.proto", "Person")?;
//! person.set_field("age", 30)?;
//! person.set_field("name", "Ada")?;
//! let bytes = person.encode()?;
//!
//! let mut copy = person.fresh();
//! copy.decode(&bytes)?;
//! assert_eq!(copy.get_field("age")?, Value::I32(30));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod coerce;
pub mod compiler;
pub mod config;
pub mod message;
pub mod registry;

pub use coerce::{FieldClass, FieldInput, InputKind};
pub use compiler::{CompileError, CompiledFile, ProtoxCompiler, SchemaCompiler};
pub use config::RegistryConfig;
pub use message::{MessageError, MessageHandle};
pub use registry::{RegistryError, SchemaRegistry};

// Reflection types that appear in the public API.
pub use prost_reflect::{FieldDescriptor, Kind, MessageDescriptor, Value};

/// Create an empty registry configured from the environment.
///
/// Entry point for hosts embedding this crate. Unlike
/// [`SchemaRegistry::new`], which always starts from `.` alone, this appends
/// the entries of `PROTODYN_INCLUDE_PATH` (see [`RegistryConfig::from_env`]).
pub fn new_registry() -> SchemaRegistry {
    SchemaRegistry::with_config(RegistryConfig::from_env())
}
