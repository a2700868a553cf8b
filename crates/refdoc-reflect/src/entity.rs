use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to an entity owned by a reflection provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Runtime classification of an entity, as reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Module,
    Class,
    Function,
    /// Class-method wrapper around a function.
    ClassMethod,
    /// Static-method wrapper around a function.
    StaticMethod,
    #[default]
    Other,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Module => "module",
            EntityKind::Class => "class",
            EntityKind::Function => "function",
            EntityKind::ClassMethod => "class_method",
            EntityKind::StaticMethod => "static_method",
            EntityKind::Other => "other",
        }
    }

    /// Whether the entity is a method wrapper holding a separate function.
    pub fn is_method_wrapper(self) -> bool {
        matches!(self, EntityKind::ClassMethod | EntityKind::StaticMethod)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named attribute binding as seen in a namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub target: EntityId,
}

impl Attribute {
    pub fn new(name: impl Into<String>, target: EntityId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}
