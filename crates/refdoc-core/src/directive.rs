use std::path::PathBuf;

use refdoc_reflect::EntityId;

use crate::documentable::{Context, Documentable, Variant};
use crate::toc::{TableOfContents, DEFAULT_TOC_HEADER};

/// Structural instruction placed among the entities of a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Paste a Markdown file verbatim.
    Markdown(PathBuf),
    /// Nest following table of contents entries one level deeper.
    Indent,
    Dedent,
    HorizontalRule,
    TableOfContents { header: String },
    /// Document an entity with every descendant expanded.
    IncludeChildren(EntityId),
}

impl Directive {
    pub fn markdown(path: impl Into<PathBuf>) -> Self {
        Directive::Markdown(path.into())
    }

    pub fn table_of_contents() -> Self {
        Self::table_of_contents_titled(DEFAULT_TOC_HEADER)
    }

    pub fn table_of_contents_titled(header: impl Into<String>) -> Self {
        Directive::TableOfContents {
            header: header.into(),
        }
    }

    /// First phase: produce the documentable that stands in this position.
    pub fn resolve<'r>(&self, ctx: Context<'r>) -> Documentable<'r> {
        match self {
            Directive::Markdown(path) => Documentable::markdown(ctx, path.clone()),
            Directive::Indent => Documentable::new(ctx, Variant::Indent),
            Directive::Dedent => Documentable::new(ctx, Variant::Dedent),
            Directive::HorizontalRule => Documentable::new(ctx, Variant::HorizontalRule),
            Directive::TableOfContents { header } => Documentable::new(
                ctx,
                Variant::TableOfContents(TableOfContents::new(header.clone())),
            ),
            Directive::IncludeChildren(id) => Documentable::from_entity(ctx, *id).expanded(),
        }
    }

    /// Whether the resolved documentable waits for the second phase, where
    /// it receives the outline of the complete document.
    pub fn binds_context(&self) -> bool {
        matches!(self, Directive::TableOfContents { .. })
    }
}

/// One position of a document: an entity documented by kind, or a directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    Entity(EntityId),
    Directive(Directive),
}

impl Item {
    pub fn resolve<'r>(&self, ctx: Context<'r>) -> Documentable<'r> {
        match self {
            Item::Entity(id) => Documentable::from_entity(ctx, *id),
            Item::Directive(directive) => directive.resolve(ctx),
        }
    }

    pub fn binds_context(&self) -> bool {
        matches!(self, Item::Directive(directive) if directive.binds_context())
    }
}

impl From<EntityId> for Item {
    fn from(id: EntityId) -> Self {
        Item::Entity(id)
    }
}

impl From<Directive> for Item {
    fn from(directive: Directive) -> Self {
        Item::Directive(directive)
    }
}
