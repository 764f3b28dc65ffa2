// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host value coercion.
//!
//! Values arrive from the caller as a [`FieldInput`] and are converted into
//! the reflection [`Value`] a field expects. Conversion goes through a closed
//! table ([`COERCIONS`]): each row names a field class, the input kinds it
//! accepts and the function doing the conversion. Supporting a new field
//! kind means adding a row.

use std::fmt;

use prost_reflect::{FieldDescriptor, Kind, Value};

/// A value handed over by the caller for [`crate::MessageHandle::set_field`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    /// Native platform integer.
    Int(isize),
    /// Explicit 64-bit integer.
    Int64(i64),
    /// Floating-point number.
    Float(f64),
    /// Text.
    Text(String),
    /// Boolean. No field class accepts it yet.
    Bool(bool),
}

/// Discriminant of a [`FieldInput`], used in acceptance sets and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Int,
    Int64,
    Float,
    Text,
    Bool,
}

impl FieldInput {
    /// Kind of this input.
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Int(_) => InputKind::Int,
            Self::Int64(_) => InputKind::Int64,
            Self::Float(_) => InputKind::Float,
            Self::Text(_) => InputKind::Text,
            Self::Bool(_) => InputKind::Bool,
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Text => "text",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

macro_rules! impl_from_input {
    ($ty:ty, $variant:ident, $conv:ty) => {
        impl From<$ty> for FieldInput {
            fn from(v: $ty) -> Self {
                Self::$variant(<$conv>::from(v))
            }
        }
    };
}

impl_from_input!(i8, Int, isize);
impl_from_input!(i16, Int, isize);
impl_from_input!(u8, Int, isize);
impl_from_input!(isize, Int, isize);
impl_from_input!(i64, Int64, i64);
impl_from_input!(u32, Int64, i64);
impl_from_input!(f32, Float, f64);
impl_from_input!(f64, Float, f64);
impl_from_input!(bool, Bool, bool);
impl_from_input!(String, Text, String);

impl From<i32> for FieldInput {
    fn from(v: i32) -> Self {
        // isize is at least 32 bits on every supported target
        Self::Int(v as isize)
    }
}

impl From<&str> for FieldInput {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Field classes the coercion table distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// `int64` only; zigzag and fixed-width encodings have no row.
    Int64,
    /// `int32` only.
    Int32,
    /// `string`.
    Text,
}

impl fmt::Display for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int64 => "int64",
            Self::Int32 => "int32",
            Self::Text => "string",
        };
        f.write_str(name)
    }
}

/// One row of the dispatch table.
pub struct Coercion {
    pub class: FieldClass,
    pub accepts: &'static [InputKind],
    pub convert: fn(&FieldInput) -> Option<Value>,
}

/// The dispatch table.
pub const COERCIONS: &[Coercion] = &[
    Coercion {
        class: FieldClass::Int64,
        accepts: &[InputKind::Int, InputKind::Int64, InputKind::Float],
        convert: to_i64,
    },
    Coercion {
        class: FieldClass::Int32,
        accepts: &[InputKind::Int, InputKind::Int64, InputKind::Float],
        convert: to_i32,
    },
    Coercion {
        class: FieldClass::Text,
        accepts: &[InputKind::Text],
        convert: to_text,
    },
];

/// Outcome of looking up the table for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Supported(FieldClass),
    /// Human-readable name of a kind with no table row.
    Unsupported(String),
}

/// Classify a field by its declared kind and cardinality.
pub fn classify(field: &FieldDescriptor) -> Classified {
    if field.is_map() {
        return Classified::Unsupported("map".to_string());
    }
    if field.is_list() {
        return Classified::Unsupported(format!("repeated {}", kind_name(&field.kind())));
    }
    match field.kind() {
        Kind::Int64 => Classified::Supported(FieldClass::Int64),
        Kind::Int32 => Classified::Supported(FieldClass::Int32),
        Kind::String => Classified::Supported(FieldClass::Text),
        other => Classified::Unsupported(kind_name(&other)),
    }
}

/// Find the table row for a class.
pub fn coercion_for(class: FieldClass) -> Option<&'static Coercion> {
    COERCIONS.iter().find(|c| c.class == class)
}

/// Schema-language name of a field kind.
pub fn kind_name(kind: &Kind) -> String {
    match kind {
        Kind::Double => "double".into(),
        Kind::Float => "float".into(),
        Kind::Int32 => "int32".into(),
        Kind::Int64 => "int64".into(),
        Kind::Uint32 => "uint32".into(),
        Kind::Uint64 => "uint64".into(),
        Kind::Sint32 => "sint32".into(),
        Kind::Sint64 => "sint64".into(),
        Kind::Fixed32 => "fixed32".into(),
        Kind::Fixed64 => "fixed64".into(),
        Kind::Sfixed32 => "sfixed32".into(),
        Kind::Sfixed64 => "sfixed64".into(),
        Kind::Bool => "bool".into(),
        Kind::String => "string".into(),
        Kind::Bytes => "bytes".into(),
        Kind::Message(m) => format!("message {}", m.full_name()),
        Kind::Enum(e) => format!("enum {}", e.full_name()),
    }
}

// Float inputs truncate toward zero; `as` saturates out-of-range values and
// maps NaN to 0.
fn to_i64(input: &FieldInput) -> Option<Value> {
    match input {
        FieldInput::Int(v) => Some(Value::I64(*v as i64)),
        FieldInput::Int64(v) => Some(Value::I64(*v)),
        FieldInput::Float(v) => Some(Value::I64(v.trunc() as i64)),
        _ => None,
    }
}

// Integer inputs keep their low 32 bits.
fn to_i32(input: &FieldInput) -> Option<Value> {
    match input {
        FieldInput::Int(v) => Some(Value::I32(*v as i32)),
        FieldInput::Int64(v) => Some(Value::I32(*v as i32)),
        FieldInput::Float(v) => Some(Value::I32(v.trunc() as i32)),
        _ => None,
    }
}

fn to_text(input: &FieldInput) -> Option<Value> {
    match input {
        FieldInput::Text(s) => Some(Value::String(s.clone())),
        _ => None,
    }
}
