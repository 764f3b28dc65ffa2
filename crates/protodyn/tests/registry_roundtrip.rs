// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! End-to-end tests: real schema files on disk, compiled with protox.

use std::fs;
use std::path::{Component, Path, PathBuf};

use protodyn::{
    CompileError, FieldInput, MessageError, RegistryConfig, RegistryError, SchemaRegistry, Value,
};

const PERSON: &str = r#"
syntax = "proto3";
package people;

message Person {
  int32 age = 1;
  string name = 2;
  int64 id = 3;
  bool active = 4;
  repeated string tags = 5;
}
"#;

fn write(dir: &Path, rel: &str, body: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create schema dir");
    }
    fs::write(&path, body).expect("write schema");
    path
}

/// `target` spelled relative to the working directory, climbing with `..`
/// up to the filesystem root first. The working directory is never changed.
fn relative_to_cwd(target: &Path) -> PathBuf {
    let cwd = std::env::current_dir().expect("cwd");
    let mut rel = PathBuf::new();
    for _ in cwd.components().filter(|c| matches!(c, Component::Normal(_))) {
        rel.push("..");
    }
    for part in target.components().filter(|c| matches!(c, Component::Normal(_))) {
        rel.push(part);
    }
    rel
}

#[test]
fn person_scenario_roundtrip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(dir.path(), "person.proto", PERSON);

    let mut registry = SchemaRegistry::new();
    let handle = registry.compile_and_load(&path, "Person").expect("load Person");
    handle.set_field("age", 30).expect("set age");
    handle.set_field("name", "Ada").expect("set name");
    let bytes = handle.encode().expect("encode");
    assert!(!bytes.is_empty());

    let mut copy = handle.fresh();
    copy.decode(&bytes).expect("decode");
    assert_eq!(copy.get_field("age").unwrap(), Value::I32(30));
    assert_eq!(copy.get_field("name").unwrap(), Value::String("Ada".into()));

    // The registered handle is the one that was populated.
    let registered = registry.get("Person").expect("registered");
    assert_eq!(registered.get_field("age").unwrap(), Value::I32(30));
}

#[test]
fn parent_relative_path_loads_like_absolute() {
    let dir = tempfile::tempdir().expect("tempdir");
    let absolute = write(dir.path(), "person.proto", PERSON);
    fs::create_dir_all(dir.path().join("work")).expect("work dir");
    let relative = relative_to_cwd(&dir.path().join("work")).join("../person.proto");
    assert!(relative.starts_with(".."));

    let mut registry = SchemaRegistry::new();
    let handle = registry
        .compile_and_load(&relative, "Person")
        .expect("load through ..");
    handle.set_field("age", 41).unwrap();
    let bytes = handle.encode().unwrap();

    let mut other = SchemaRegistry::new();
    let mut copy = other.compile_and_load(&absolute, "Person").unwrap().fresh();
    copy.decode(&bytes).unwrap();
    assert_eq!(copy.get_field("age").unwrap(), Value::I32(41));
    // Search list is only widened for that one compilation.
    assert_eq!(registry.include_paths(), &[PathBuf::from(".")]);
}

#[test]
fn second_load_gives_an_independent_handle() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(dir.path(), "person.proto", PERSON);

    let mut registry = SchemaRegistry::new();
    let first = {
        let handle = registry.compile_and_load(&path, "Person").unwrap();
        handle.set_field("name", "first").unwrap();
        handle.clone()
    };
    registry.compile_and_load(&path, "Person").unwrap();

    assert_eq!(first.get_field("name").unwrap(), Value::String("first".into()));
    assert_eq!(
        registry.get("Person").unwrap().get_field("name").unwrap(),
        Value::String(String::new())
    );
}

#[test]
fn int32_truncation_for_every_accepted_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(dir.path(), "person.proto", PERSON);
    let mut registry = SchemaRegistry::new();
    let handle = registry.compile_and_load(&path, "Person").unwrap();

    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..256 {
        let x = rng.i64(..);
        handle.set_field("age", x).unwrap();
        assert_eq!(handle.get_field("age").unwrap(), Value::I32(x as i32));

        let n = rng.i32(..);
        handle.set_field("age", n).unwrap();
        assert_eq!(handle.get_field("age").unwrap(), Value::I32(n));

        let f = rng.f64() * 2.0e9 - 1.0e9;
        handle.set_field("age", f).unwrap();
        assert_eq!(handle.get_field("age").unwrap(), Value::I32(f.trunc() as i32));
    }
}

#[test]
fn randomized_roundtrip_across_supported_kinds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(dir.path(), "person.proto", PERSON);
    let mut registry = SchemaRegistry::new();
    let handle = registry.compile_and_load(&path, "Person").unwrap();

    let mut rng = fastrand::Rng::with_seed(42);
    for round in 0..64 {
        let age = rng.i32(..);
        let id = rng.i64(..);
        let name: String = (0..rng.usize(0..24)).map(|_| rng.alphanumeric()).collect();

        handle.set_field("age", age).unwrap();
        handle.set_field("id", FieldInput::Int64(id)).unwrap();
        handle.set_field("name", name.as_str()).unwrap();

        let bytes = handle.encode().unwrap();
        let mut decoded = handle.fresh();
        decoded.decode(&bytes).unwrap();

        for field in ["age", "id", "name"] {
            assert_eq!(
                decoded.get_field(field).unwrap(),
                handle.get_field(field).unwrap(),
                "round {} field {}",
                round,
                field
            );
        }
    }
}

#[test]
fn unsupported_and_unknown_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(dir.path(), "person.proto", PERSON);
    let mut registry = SchemaRegistry::new();
    let handle = registry.compile_and_load(&path, "Person").unwrap();

    for input in [
        FieldInput::Int(1),
        FieldInput::Int64(1),
        FieldInput::Float(1.0),
        FieldInput::Text("true".into()),
        FieldInput::Bool(true),
    ] {
        let err = handle.set_field("active", input.clone()).unwrap_err();
        assert!(err.is_type_mismatch(), "bool field accepted {:?}", input);
        let err = handle.set_field("tags", input).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    let before = handle.encode().unwrap();
    let err = handle.set_field("nickname", "x").unwrap_err();
    assert!(matches!(err, MessageError::FieldNotFound { .. }));
    assert_eq!(handle.encode().unwrap(), before);

    // Unsupported for writing, still readable.
    assert_eq!(handle.get_field("active").unwrap(), Value::Bool(false));
    assert_eq!(handle.get_field("tags").unwrap(), Value::List(Vec::new()));
}

#[test]
fn zigzag_integer_fields_reject_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(
        dir.path(),
        "counter.proto",
        "syntax = \"proto3\";\nmessage Counter { int32 n = 1; sint32 s = 2; sfixed64 f = 3; }\n",
    );
    let mut registry = SchemaRegistry::new();
    let handle = registry.compile_and_load(&path, "Counter").unwrap();

    handle.set_field("n", 5).unwrap();
    for field in ["s", "f"] {
        let err = handle.set_field(field, 5).unwrap_err();
        assert!(
            matches!(err, MessageError::UnsupportedKind { .. }),
            "{} accepted an integer",
            field
        );
    }
    assert_eq!(handle.get_field("s").unwrap(), Value::I32(0));
    assert_eq!(handle.get_field("n").unwrap(), Value::I32(5));
}

#[test]
fn load_reports_missing_type_and_bad_schema() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = write(dir.path(), "person.proto", PERSON);
    let bad = write(dir.path(), "bad.proto", "syntax = \"proto3\";\nmessage {\n");

    let mut registry = SchemaRegistry::new();
    let err = registry.compile_and_load(&good, "Robot").unwrap_err();
    assert!(err.is_not_found());

    let err = registry.compile_and_load(&bad, "Anything").unwrap_err();
    assert!(matches!(err, RegistryError::Compile(CompileError::Schema { .. })));
    assert!(registry.is_empty());
}

#[test]
fn get_nonexistent_on_empty_registry() {
    let registry = SchemaRegistry::new();
    let err = registry.get("Nonexistent").unwrap_err();
    assert!(matches!(err, RegistryError::NotRegistered(ref name) if name == "Nonexistent"));
}

#[test]
fn load_all_registers_every_top_level_type() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(
        dir.path(),
        "shapes.proto",
        "syntax = \"proto3\";\nmessage Circle { int32 r = 1; }\nmessage Square { int32 side = 1; }\n",
    );

    let mut registry = SchemaRegistry::new();
    assert_eq!(registry.compile_and_load_all(&path).unwrap(), 2);
    assert_eq!(registry.type_names(), vec!["Circle", "Square"]);

    let err = registry.compile_and_load_all(&path).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName { ref message_type, .. } if message_type == "Circle"));
    assert_eq!(registry.len(), 2);
}

#[test]
fn directory_load_resolves_imports_and_skips_other_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "common/meta.proto",
        "syntax = \"proto3\";\npackage common;\nmessage Meta { string id = 1; }\n",
    );
    write(
        dir.path(),
        "event.proto",
        "syntax = \"proto3\";\nimport \"common/meta.proto\";\nmessage Event { common.Meta meta = 1; int64 at = 2; }\n",
    );
    write(dir.path(), "README.txt", "not a schema");

    let mut registry = SchemaRegistry::new();
    let added = registry.load_directory(dir.path()).expect("load directory");
    assert_eq!(added, 2);
    assert_eq!(registry.type_names(), vec!["Event", "Meta"]);

    let event = registry.get_mut("Event").unwrap();
    event.set_field("at", 1_700_000_000i64).unwrap();
    assert!(event.set_field("meta", "x").unwrap_err().is_type_mismatch());
}

#[test]
fn directory_duplicate_keeps_first_and_stops_walk() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "a.proto",
        "syntax = \"proto3\";\npackage a;\nmessage Shared { int32 v = 1; }\n",
    );
    write(
        dir.path(),
        "b.proto",
        "syntax = \"proto3\";\npackage b;\nmessage Shared { string v = 1; }\n",
    );
    write(
        dir.path(),
        "c.proto",
        "syntax = \"proto3\";\npackage c;\nmessage Late { int32 v = 1; }\n",
    );

    let mut registry = SchemaRegistry::new();
    let err = registry.load_directory(dir.path()).unwrap_err();
    match err {
        RegistryError::DuplicateName { message_type, path } => {
            assert_eq!(message_type, "Shared");
            assert!(path.ends_with("b.proto"));
        }
        other => panic!("unexpected error: {}", other),
    }

    assert_eq!(registry.get("Shared").unwrap().full_name(), "a.Shared");
    assert!(!registry.contains("Late"));
}

#[test]
fn directory_compile_error_keeps_partial_results() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "a.proto", "syntax = \"proto3\";\nmessage First { int32 v = 1; }\n");
    write(dir.path(), "b.proto", "syntax = \"proto3\";\nmessage Broken { int32 v = ; }\n");
    write(dir.path(), "c.proto", "syntax = \"proto3\";\nmessage Third { int32 v = 1; }\n");

    let mut registry = SchemaRegistry::new();
    let err = registry.load_directory(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::Compile(_)));
    assert!(registry.contains("First"));
    assert!(!registry.contains("Third"));
}

#[test]
fn directory_load_replaces_include_paths() {
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");
    write(first.path(), "one.proto", "syntax = \"proto3\";\nmessage One { int32 v = 1; }\n");
    write(second.path(), "two.proto", "syntax = \"proto3\";\nmessage Two { int32 v = 1; }\n");

    let mut registry = SchemaRegistry::with_config(RegistryConfig::new().include_path("extra"));
    registry.load_directory(first.path()).unwrap();
    assert_eq!(
        registry.include_paths(),
        &[PathBuf::from("."), first.path().to_path_buf()]
    );

    registry.load_directory(second.path()).unwrap();
    assert_eq!(
        registry.include_paths(),
        &[PathBuf::from("."), second.path().to_path_buf()]
    );
    assert_eq!(registry.type_names(), vec!["One", "Two"]);
}

#[test]
fn directory_load_missing_folder_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut registry = SchemaRegistry::new();
    let err = registry.load_directory(dir.path().join("nope")).unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
    assert!(err.to_string().contains("nope"));
}

#[test]
fn custom_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "person.schema", PERSON);
    write(dir.path(), "ignored.proto", "syntax = \"proto3\";\nmessage Ignored {}\n");

    let mut registry = SchemaRegistry::with_config(RegistryConfig::new().schema_extension("schema"));
    registry.load_directory(dir.path()).unwrap();
    assert_eq!(registry.type_names(), vec!["Person"]);
}
