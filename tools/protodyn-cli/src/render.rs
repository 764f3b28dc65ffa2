// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text in, text out: assignment parsing and value formatting.

use anyhow::bail;
use protodyn::coerce::kind_name;
use protodyn::{FieldDescriptor, FieldInput, Kind, MessageDescriptor, Value};

/// Split `field=value` and pick an input kind for the value.
///
/// String fields always receive the raw text. Other fields get an
/// integer, then a float, then a boolean, falling back to text so the
/// registry reports the mismatch.
pub fn parse_assignment(
    descriptor: &MessageDescriptor,
    assignment: &str,
) -> anyhow::Result<(String, FieldInput)> {
    let Some((field, raw)) = assignment.split_once('=') else {
        bail!("expected FIELD=VALUE, got '{}'", assignment);
    };
    let field = field.trim();
    if field.is_empty() {
        bail!("empty field name in '{}'", assignment);
    }

    let is_text = descriptor
        .get_field_by_name(field)
        .is_some_and(|f| matches!(f.kind(), Kind::String) && !f.is_list());
    let input = if is_text {
        FieldInput::Text(raw.to_string())
    } else if let Ok(v) = raw.trim().parse::<i64>() {
        FieldInput::Int64(v)
    } else if let Ok(v) = raw.trim().parse::<f64>() {
        FieldInput::Float(v)
    } else if let Ok(v) = raw.trim().parse::<bool>() {
        FieldInput::Bool(v)
    } else {
        FieldInput::Text(raw.to_string())
    };
    Ok((field.to_string(), input))
}

/// One line per field: number, name, kind.
///
/// Map fields print as `map<K, V>` instead of their synthetic entry type.
pub fn describe_fields(descriptor: &MessageDescriptor) -> Vec<String> {
    descriptor
        .fields()
        .map(|f| format!("{:>3} {} {}", f.number(), f.name(), field_kind(&f)))
        .collect()
}

fn field_kind(field: &FieldDescriptor) -> String {
    match field.kind() {
        Kind::Message(entry) if field.is_map() => format!(
            "map<{}, {}>",
            kind_name(&entry.map_entry_key_field().kind()),
            kind_name(&entry.map_entry_value_field().kind())
        ),
        kind if field.is_list() => format!("repeated {}", kind_name(&kind)),
        kind => kind_name(&kind),
    }
}

/// Render a reflection value for display.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Bool(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::String(s) => format!("{:?}", s),
        Value::Bytes(b) => format!("0x{}", hex::encode(b)),
        Value::EnumNumber(n) => format!("enum({})", n),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        other => format!("{:?}", other),
    }
}
