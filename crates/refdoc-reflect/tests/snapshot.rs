use std::fs;

use pretty_assertions::assert_eq;
use refdoc_reflect::{EntityKind, Reflect, ReflectError, Snapshot};
use tempfile::TempDir;

const DUMP: &str = r#"{
  "entities": [
    {
      "kind": "module",
      "name": "geometry",
      "doc": "Plane geometry helpers.",
      "attributes": [
        { "name": "distance", "target": 1 },
        { "name": "Point", "target": 2 },
        { "name": "PI", "target": 5 },
        { "name": "Path", "target": 7 }
      ]
    },
    {
      "kind": "function",
      "name": "distance",
      "module": 0,
      "signature": {
        "parameters": [
          { "name": "a", "annotation": "Point" },
          { "name": "b", "annotation": "Point" }
        ],
        "returns": "float"
      }
    },
    {
      "kind": "class",
      "name": "Point",
      "module": 0,
      "attributes": [
        { "name": "__init__", "target": 3 },
        { "name": "origin", "target": 4 }
      ]
    },
    {
      "kind": "function",
      "name": "__init__",
      "module": 0,
      "signature": {
        "parameters": [
          { "name": "self" },
          { "name": "x", "annotation": "float", "default": "0.0" },
          { "name": "y", "annotation": "float", "default": "0.0" }
        ]
      }
    },
    { "kind": "class_method", "module": 0, "wraps": 6 },
    { "kind": "other", "doc": "float(x=0, /)" },
    {
      "kind": "function",
      "name": "origin",
      "module": 0,
      "signature": { "parameters": [{ "name": "cls" }] }
    },
    { "kind": "class", "name": "Path", "module": 8 },
    { "kind": "module", "name": "pathlib" }
  ]
}"#;

fn write_dump(contents: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("snapshot.json");
    fs::write(&path, contents).expect("write snapshot");
    (dir, path)
}

#[test]
fn loads_dump_from_disk_and_answers_queries() {
    let (_dir, path) = write_dump(DUMP);
    let snapshot = Snapshot::from_path(&path).expect("load snapshot");

    let point = snapshot.lookup("geometry.Point").expect("Point");
    assert_eq!(snapshot.kind(point), EntityKind::Class);
    assert_eq!(
        snapshot.constructor_signature(point).unwrap().to_string(),
        "(self, x: float = 0.0, y: float = 0.0)"
    );

    let origin = snapshot.lookup("geometry.Point.origin").expect("origin");
    assert_eq!(snapshot.kind(origin), EntityKind::ClassMethod);
    let function = snapshot.wrapped_function(origin).expect("wrapped");
    assert_eq!(snapshot.name(function), Some("origin"));

    let distance = snapshot.lookup("geometry.distance").expect("distance");
    assert_eq!(
        snapshot.signature(distance).unwrap().to_string(),
        "(a: Point, b: Point) -> float"
    );
}

#[test]
fn members_are_alphabetical_and_attributes_keep_declaration_order() {
    let snapshot = Snapshot::from_json(DUMP).expect("parse");
    let module = snapshot.lookup("geometry").expect("module");

    let declared: Vec<_> = snapshot
        .own_attributes(module)
        .into_iter()
        .map(|attr| attr.name)
        .collect();
    assert_eq!(declared, vec!["distance", "Point", "PI", "Path"]);

    let members: Vec<_> = snapshot
        .members(module)
        .into_iter()
        .map(|attr| attr.name)
        .collect();
    assert_eq!(members, vec!["PI", "Path", "Point", "distance"]);
}

#[test]
fn paths_do_not_descend_into_foreign_classes() {
    let snapshot = Snapshot::from_json(DUMP).expect("parse");
    let paths: Vec<_> = snapshot.paths().into_iter().map(|(path, _)| path).collect();

    assert!(paths.contains(&"geometry.Point.__init__".to_string()));
    assert!(paths.contains(&"geometry.Path".to_string()));
    assert!(paths.contains(&"pathlib".to_string()));
    assert!(!paths.iter().any(|path| path.starts_with("geometry.Path.")));
}

#[test]
fn malformed_dump_is_a_parse_error() {
    let err = Snapshot::from_json("{ \"entities\": [ { \"kind\": \"gizmo\" } ] }").unwrap_err();
    assert!(matches!(err, ReflectError::Parse(_)));
}

#[test]
fn missing_file_reports_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent.json");
    let err = Snapshot::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}
