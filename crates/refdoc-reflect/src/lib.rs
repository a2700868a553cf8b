//! Reflection data consumed by the refdoc documentation engine.
//!
//! The engine never inspects a program directly. It asks a [`Reflect`]
//! provider for kinds, names, docstrings, signatures and namespaces;
//! [`Snapshot`] is the provider backed by a serialized dump.

mod entity;
mod error;
mod provider;
mod signature;
mod snapshot;

pub use entity::{Attribute, EntityId, EntityKind};
pub use error::{ReflectError, ReflectResult};
pub use provider::Reflect;
pub use signature::{Parameter, ParameterKind, Signature};
pub use snapshot::{Entity, Snapshot, SnapshotBuilder};
