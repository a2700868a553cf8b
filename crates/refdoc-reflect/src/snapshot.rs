//! Serialized reflection dumps.
//!
//! A snapshot is an arena of entities addressed by [`EntityId`] (their index),
//! as emitted by a host-side exporter. It implements [`Reflect`], so the
//! engine can document a program without running inside it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::{Attribute, EntityId, EntityKind};
use crate::error::{ReflectError, ReflectResult};
use crate::provider::Reflect;
use crate::signature::Signature;

/// One reflected entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    /// Declaring module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<EntityId>,
    /// Namespace bindings in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<EntityId>,
    /// Function held by a class-method or static-method wrapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wraps: Option<EntityId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    entities: Vec<Entity>,
}

impl Snapshot {
    /// Builds a snapshot from raw entities, rejecting dangling references.
    pub fn new(entities: Vec<Entity>) -> ReflectResult<Self> {
        let snapshot = Snapshot { entities };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_json(contents: &str) -> ReflectResult<Self> {
        let raw: Snapshot = serde_json::from_str(contents)?;
        raw.validate()?;
        tracing::debug!(entities = raw.entities.len(), "loaded reflection snapshot");
        Ok(raw)
    }

    pub fn from_path(path: &Path) -> ReflectResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ReflectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn to_json_pretty(&self) -> ReflectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        (0..self.entities.len()).map(EntityId)
    }

    fn validate(&self) -> ReflectResult<()> {
        for (index, entity) in self.entities.iter().enumerate() {
            let from = EntityId(index);
            let references = entity
                .module
                .iter()
                .chain(entity.wraps.iter())
                .chain(entity.bases.iter())
                .chain(entity.attributes.iter().map(|attr| &attr.target));
            for to in references {
                if to.0 >= self.entities.len() {
                    return Err(ReflectError::DanglingReference { from, to: *to });
                }
            }
        }
        Ok(())
    }

    /// Resolves a dotted path such as `pkg.module.Class.method`.
    ///
    /// The longest module name that prefixes the path wins; remaining
    /// segments are followed through declared attributes.
    pub fn lookup(&self, path: &str) -> Option<EntityId> {
        let (module, rest) = self
            .ids()
            .filter(|id| self.kind(*id) == EntityKind::Module)
            .filter_map(|id| {
                let name = self.name(id)?;
                if path == name {
                    Some((id, ""))
                } else {
                    path.strip_prefix(name)
                        .and_then(|rest| rest.strip_prefix('.'))
                        .map(|rest| (id, rest))
                }
            })
            .max_by_key(|(id, _)| self.name(*id).map_or(0, str::len))?;

        rest.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(module, |current, segment| {
                self.entity(current)?
                    .attributes
                    .iter()
                    .find(|attr| attr.name == segment)
                    .map(|attr| attr.target)
            })
    }

    /// Every addressable dotted path: modules, their own declarations, and
    /// the attributes of classes declared in them.
    pub fn paths(&self) -> Vec<(String, EntityId)> {
        let mut out = Vec::new();
        for module in self.ids().filter(|id| self.kind(*id) == EntityKind::Module) {
            let Some(name) = self.name(module) else {
                continue;
            };
            out.push((name.to_string(), module));
            let mut visited = HashSet::from([module]);
            self.collect_paths(module, module, name, &mut visited, &mut out);
        }
        out
    }

    fn collect_paths(
        &self,
        owner: EntityId,
        module: EntityId,
        prefix: &str,
        visited: &mut HashSet<EntityId>,
        out: &mut Vec<(String, EntityId)>,
    ) {
        for attr in self.own_attributes(owner) {
            if self.kind(attr.target) == EntityKind::Module {
                continue;
            }
            let path = format!("{prefix}.{}", attr.name);
            out.push((path.clone(), attr.target));
            let declared_here = self.declaring_module(attr.target) == Some(module);
            if self.kind(attr.target) == EntityKind::Class
                && declared_here
                && visited.insert(attr.target)
            {
                self.collect_paths(attr.target, module, &path, visited, out);
            }
        }
    }

    fn find_constructor(
        &self,
        class: EntityId,
        visited: &mut HashSet<EntityId>,
    ) -> Option<EntityId> {
        if !visited.insert(class) {
            return None;
        }
        let entity = self.entity(class)?;
        let own = entity
            .attributes
            .iter()
            .find(|attr| {
                attr.name == "__init__" && self.kind(attr.target) == EntityKind::Function
            })
            .map(|attr| attr.target);
        own.or_else(|| {
            entity
                .bases
                .iter()
                .find_map(|base| self.find_constructor(*base, visited))
        })
    }
}

impl Reflect for Snapshot {
    fn kind(&self, id: EntityId) -> EntityKind {
        self.entity(id).map_or(EntityKind::Other, |entity| entity.kind)
    }

    fn name(&self, id: EntityId) -> Option<&str> {
        self.entity(id)?.name.as_deref()
    }

    fn doc(&self, id: EntityId) -> Option<&str> {
        self.entity(id)?.doc.as_deref()
    }

    fn signature(&self, id: EntityId) -> ReflectResult<Signature> {
        let entity = self.entity(id).ok_or(ReflectError::UnknownEntity(id))?;
        entity
            .signature
            .clone()
            .ok_or_else(|| ReflectError::MissingSignature {
                name: self.display_name(id),
            })
    }

    fn own_attributes(&self, id: EntityId) -> Vec<Attribute> {
        self.entity(id)
            .map(|entity| entity.attributes.clone())
            .unwrap_or_default()
    }

    fn declaring_module(&self, id: EntityId) -> Option<EntityId> {
        match self.entity(id)? {
            entity if entity.kind == EntityKind::Module => Some(id),
            entity => entity.module,
        }
    }

    fn wrapped_function(&self, id: EntityId) -> Option<EntityId> {
        self.entity(id)?.wraps
    }

    fn constructor(&self, class: EntityId) -> Option<EntityId> {
        self.find_constructor(class, &mut HashSet::new())
    }
}

/// Programmatic construction of snapshots.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    entities: Vec<Entity>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, entity: Entity) -> EntityId {
        self.entities.push(entity);
        EntityId(self.entities.len() - 1)
    }

    fn module_of(&self, owner: EntityId) -> Option<EntityId> {
        let entity = self.entities.get(owner.0)?;
        if entity.kind == EntityKind::Module {
            Some(owner)
        } else {
            entity.module
        }
    }

    /// Adds `name = target` to the owner's namespace.
    pub fn bind(&mut self, owner: EntityId, name: &str, target: EntityId) -> &mut Self {
        if let Some(entity) = self.entities.get_mut(owner.0) {
            entity.attributes.push(Attribute::new(name, target));
        }
        self
    }

    pub fn module(&mut self, name: &str, doc: Option<&str>) -> EntityId {
        self.push(Entity {
            kind: EntityKind::Module,
            name: Some(name.to_string()),
            doc: doc.map(str::to_string),
            ..Entity::default()
        })
    }

    /// Declares a sub-module and binds it under its last dotted segment.
    pub fn submodule(&mut self, parent: EntityId, name: &str, doc: Option<&str>) -> EntityId {
        let id = self.module(name, doc);
        let short = name.rsplit('.').next().unwrap_or(name).to_string();
        self.bind(parent, &short, id);
        id
    }

    pub fn class(&mut self, owner: EntityId, name: &str, doc: Option<&str>) -> EntityId {
        let module = self.module_of(owner);
        let id = self.push(Entity {
            kind: EntityKind::Class,
            name: Some(name.to_string()),
            doc: doc.map(str::to_string),
            module,
            ..Entity::default()
        });
        self.bind(owner, name, id);
        id
    }

    pub fn base(&mut self, class: EntityId, base: EntityId) -> &mut Self {
        if let Some(entity) = self.entities.get_mut(class.0) {
            entity.bases.push(base);
        }
        self
    }

    pub fn function(
        &mut self,
        owner: EntityId,
        name: &str,
        doc: Option<&str>,
        signature: Signature,
    ) -> EntityId {
        let id = self.detached_function(owner, name, doc, signature);
        self.bind(owner, name, id);
        id
    }

    /// A function declared under `owner` without a namespace binding.
    fn detached_function(
        &mut self,
        owner: EntityId,
        name: &str,
        doc: Option<&str>,
        signature: Signature,
    ) -> EntityId {
        let module = self.module_of(owner);
        self.push(Entity {
            kind: EntityKind::Function,
            name: Some(name.to_string()),
            doc: doc.map(str::to_string),
            signature: Some(signature),
            module,
            ..Entity::default()
        })
    }

    /// A function without introspectable signature.
    pub fn opaque_function(&mut self, owner: EntityId, name: &str, doc: Option<&str>) -> EntityId {
        let id = self.function(owner, name, doc, Signature::default());
        self.entities[id.0].signature = None;
        id
    }

    pub fn class_method(
        &mut self,
        class: EntityId,
        name: &str,
        doc: Option<&str>,
        signature: Signature,
    ) -> EntityId {
        self.method_wrapper(EntityKind::ClassMethod, class, name, doc, signature)
    }

    pub fn static_method(
        &mut self,
        class: EntityId,
        name: &str,
        doc: Option<&str>,
        signature: Signature,
    ) -> EntityId {
        self.method_wrapper(EntityKind::StaticMethod, class, name, doc, signature)
    }

    fn method_wrapper(
        &mut self,
        kind: EntityKind,
        class: EntityId,
        name: &str,
        doc: Option<&str>,
        signature: Signature,
    ) -> EntityId {
        let function = self.detached_function(class, name, doc, signature);
        let module = self.module_of(class);
        let wrapper = self.push(Entity {
            kind,
            module,
            wraps: Some(function),
            ..Entity::default()
        });
        self.bind(class, name, wrapper);
        wrapper
    }

    /// Any other value bound in a namespace (constants, instances, ...).
    pub fn value(&mut self, owner: EntityId, name: &str, doc: Option<&str>) -> EntityId {
        let id = self.push(Entity {
            kind: EntityKind::Other,
            doc: doc.map(str::to_string),
            ..Entity::default()
        });
        self.bind(owner, name, id);
        id
    }

    pub fn build(self) -> Snapshot {
        Snapshot {
            entities: self.entities,
        }
    }
}
