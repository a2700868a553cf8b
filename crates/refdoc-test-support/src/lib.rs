//! Shared test harness utilities for refdoc crates.

use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Event, Options, Parser, Tag};
use refdoc_config::Config;
use refdoc_reflect::{EntityId, Parameter, Signature, Snapshot, SnapshotBuilder};

/// Returns a baseline configuration for tests.
pub fn test_config() -> Config {
    Config::default()
}

/// The `test.test_module` package used across the test suites, with handles
/// to every entity tests refer to.
#[derive(Debug)]
pub struct Fixture {
    pub snapshot: Snapshot,
    pub module: EntityId,
    pub class: EntityId,
    pub class_nodoc: EntityId,
    pub init: EntityId,
    pub method: EntityId,
    /// Class-method wrapper bound on `Class`.
    pub classmethod: EntityId,
    /// Static-method wrapper bound on `Class`.
    pub staticmethod: EntityId,
    pub method_nodoc: EntityId,
    pub private_method: EntityId,
    pub function: EntityId,
    pub function_nodoc: EntityId,
    pub helper: EntityId,
    /// `Enum`, imported from the `enum` module.
    pub imported: EntityId,
    pub sub_module: EntityId,
    pub sub_module_function: EntityId,
}

pub fn fixture() -> Fixture {
    let mut builder = SnapshotBuilder::new();

    let enum_module = builder.module("enum", None);
    let imported = builder.class(enum_module, "Enum", Some("Generic enumeration."));

    let module = builder.module("test.test_module", Some("This is a test module!"));
    builder.bind(module, "Enum", imported);

    let class = builder.class(module, "Class", Some("This is a test class!"));
    let init = builder.function(
        class,
        "__init__",
        Some("This is a test init!"),
        Signature::new(vec![
            Parameter::new("self"),
            Parameter::new("x").annotated("float"),
        ]),
    );
    let method = builder.function(
        class,
        "method",
        Some("This is a test method!"),
        Signature::new(vec![
            Parameter::new("self"),
            Parameter::new("y").annotated("float"),
        ]),
    );
    let classmethod = builder.class_method(
        class,
        "classmethod",
        Some("This is a test classmethod!"),
        Signature::new(vec![Parameter::new("cls")]),
    );
    let staticmethod = builder.static_method(
        class,
        "staticmethod",
        Some("This is a test staticmethod!"),
        Signature::default(),
    );
    let method_nodoc = builder.function(
        class,
        "method_nodoc",
        None,
        Signature::new(vec![Parameter::new("self")]),
    );
    let private_method = builder.function(
        class,
        "_private",
        Some("Not part of the public surface."),
        Signature::new(vec![Parameter::new("self")]),
    );

    let class_nodoc = builder.class(module, "ClassNoDoc", None);

    let function = builder.function(
        module,
        "function",
        Some("This is a test function!"),
        Signature::new(vec![
            Parameter::new("x").annotated("int"),
            Parameter::new("y").annotated("str"),
        ]),
    );
    let function_nodoc = builder.function(module, "function_nodoc", None, Signature::default());
    let helper = builder.function(
        module,
        "_helper",
        Some("Internal helper."),
        Signature::default(),
    );
    builder.value(module, "VERSION", Some("str(object='') -> str"));

    let sub_module = builder.submodule(
        module,
        "test.test_module.sub_module_file",
        Some("This is a test sub-module in a file!"),
    );
    let sub_module_function =
        builder.function(sub_module, "sub_module_function", None, Signature::default());

    Fixture {
        snapshot: builder.build(),
        module,
        class,
        class_nodoc,
        init,
        method,
        classmethod,
        staticmethod,
        method_nodoc,
        private_method,
        function,
        function_nodoc,
        helper,
        imported,
        sub_module,
        sub_module_function,
    }
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture file");
    path
}

/// Writes the fixture snapshot as JSON into `dir` and returns its path.
pub fn write_fixture_snapshot(dir: &Path) -> PathBuf {
    let json = fixture()
        .snapshot
        .to_json_pretty()
        .expect("serialize fixture snapshot");
    write_file(dir, "snapshot.json", &json)
}

/// Heading structure of a Markdown document as `(level, text)` pairs, with
/// inline code reduced to its contents.
pub fn headings(markdown: &str) -> Vec<(usize, String)> {
    let mut headings = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for event in Parser::new_ext(markdown, Options::empty()) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                current = Some((level as usize, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buffer)) = current.as_mut() {
                    buffer.push_str(&text);
                }
            }
            Event::End(Tag::Heading(..)) => headings.extend(current.take()),
            _ => {}
        }
    }

    headings
}
