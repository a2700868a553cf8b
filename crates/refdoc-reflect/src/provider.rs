use crate::entity::{Attribute, EntityId, EntityKind};
use crate::error::ReflectResult;
use crate::signature::Signature;

/// Host reflection facility consulted by the documentation engine.
///
/// Lookups on handles the provider does not know degrade to "nothing"
/// (`Other`, `None`, empty lists); only [`Reflect::signature`] fails.
pub trait Reflect {
    fn kind(&self, id: EntityId) -> EntityKind;

    /// The entity's own name. Modules report their fully qualified name.
    fn name(&self, id: EntityId) -> Option<&str>;

    /// Attached documentation text, exactly as declared.
    fn doc(&self, id: EntityId) -> Option<&str>;

    fn signature(&self, id: EntityId) -> ReflectResult<Signature>;

    /// Attributes declared directly on the entity, in declaration order.
    fn own_attributes(&self, id: EntityId) -> Vec<Attribute>;

    /// Members in canonical (alphabetical) order.
    fn members(&self, id: EntityId) -> Vec<Attribute> {
        let mut members = self.own_attributes(id);
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }

    /// Module in which the entity was declared.
    fn declaring_module(&self, id: EntityId) -> Option<EntityId>;

    /// The function held by a class-method or static-method wrapper.
    fn wrapped_function(&self, id: EntityId) -> Option<EntityId>;

    /// The constructor a class uses, own or inherited.
    fn constructor(&self, class: EntityId) -> Option<EntityId>;

    fn constructor_signature(&self, class: EntityId) -> ReflectResult<Signature> {
        match self.constructor(class) {
            Some(init) => self.signature(init),
            None => Ok(Signature::default_constructor()),
        }
    }

    /// Name or a placeholder, for diagnostics.
    fn display_name(&self, id: EntityId) -> String {
        self.name(id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }
}
