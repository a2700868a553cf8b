//! The documentable object model.
//!
//! A [`Documentable`] wraps one reflected entity (or a structural marker) and
//! knows how to describe itself: a short text, a one-line signature, its
//! children, and the complete Markdown rendering of itself and, when
//! expanded, its descendants.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use refdoc_config::HeadingScheme;
use refdoc_reflect::{EntityId, EntityKind, Reflect};

use crate::docstring::clean;
use crate::error::DocResult;
use crate::markdown::MarkdownFile;
use crate::toc::{Outline, TableOfContents};

const CONSTRUCTOR: &str = "__init__";
const HORIZONTAL_RULE: &str = "\n---\n";

/// Reflection provider and heading scheme shared by every documentable of a
/// single assembly pass.
#[derive(Clone, Copy)]
pub struct Context<'r> {
    host: &'r dyn Reflect,
    scheme: HeadingScheme,
}

impl<'r> Context<'r> {
    pub fn new(host: &'r dyn Reflect) -> Self {
        Self {
            host,
            scheme: HeadingScheme::default(),
        }
    }

    pub fn with_scheme(mut self, scheme: HeadingScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn host(&self) -> &'r dyn Reflect {
        self.host
    }

    pub fn scheme(&self) -> HeadingScheme {
        self.scheme
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodFlavor {
    Instance,
    Class,
    Static,
}

/// Closed set of documentable shapes.
#[derive(Clone, Debug)]
pub enum Variant {
    /// Anything the host does not classify.
    Generic(EntityId),
    Function(EntityId),
    /// A method, identified by its underlying function.
    Method(EntityId, MethodFlavor),
    Class(EntityId),
    Module(EntityId),
    Markdown(MarkdownFile),
    Indent,
    Dedent,
    HorizontalRule,
    TableOfContents(TableOfContents),
}

impl Variant {
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Generic(_) => "Generic",
            Variant::Function(_) => "Function",
            Variant::Method(_, MethodFlavor::Instance) => "Method",
            Variant::Method(_, MethodFlavor::Class) => "ClassMethod",
            Variant::Method(_, MethodFlavor::Static) => "StaticMethod",
            Variant::Class(_) => "Class",
            Variant::Module(_) => "Module",
            Variant::Markdown(_) => "Markdown",
            Variant::Indent => "Indent",
            Variant::Dedent => "Dedent",
            Variant::HorizontalRule => "HorizontalRule",
            Variant::TableOfContents(_) => "TableOfContents",
        }
    }

    /// The reflected entity this variant documents, if any.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Variant::Generic(id)
            | Variant::Function(id)
            | Variant::Method(id, _)
            | Variant::Class(id)
            | Variant::Module(id) => Some(*id),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Documentable<'r> {
    ctx: Context<'r>,
    variant: Variant,
    expand: bool,
    includes: BTreeSet<String>,
    excludes: BTreeSet<String>,
}

impl<'r> Documentable<'r> {
    pub fn new(ctx: Context<'r>, variant: Variant) -> Self {
        Self {
            ctx,
            variant,
            expand: false,
            includes: BTreeSet::new(),
            excludes: BTreeSet::new(),
        }
    }

    /// Selects the most specific variant for a reflected entity.
    ///
    /// Method wrappers document the function they hold. Entities the host
    /// cannot classify, including wrappers with nothing inside, fall back to
    /// [`Variant::Generic`].
    pub fn from_entity(ctx: Context<'r>, id: EntityId) -> Self {
        let host = ctx.host();
        let variant = match host.kind(id) {
            EntityKind::Module => Variant::Module(id),
            EntityKind::Class => Variant::Class(id),
            EntityKind::Function => Variant::Function(id),
            EntityKind::ClassMethod => host
                .wrapped_function(id)
                .map_or(Variant::Generic(id), |function| {
                    Variant::Method(function, MethodFlavor::Class)
                }),
            EntityKind::StaticMethod => host
                .wrapped_function(id)
                .map_or(Variant::Generic(id), |function| {
                    Variant::Method(function, MethodFlavor::Static)
                }),
            EntityKind::Other => Variant::Generic(id),
        };
        Self::new(ctx, variant)
    }

    pub fn markdown(ctx: Context<'r>, path: impl Into<PathBuf>) -> Self {
        Self::new(ctx, Variant::Markdown(MarkdownFile::new(path)))
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn context(&self) -> Context<'r> {
        self.ctx
    }

    /// Number of `#` markers in the rendered heading; `None` for variants
    /// that render without one.
    pub fn heading_level(&self) -> Option<u8> {
        let scheme = self.ctx.scheme();
        match self.variant {
            Variant::Generic(_) => Some(0),
            Variant::Function(_) => Some(scheme.function_level()),
            Variant::Method(..) => Some(scheme.method_level()),
            Variant::Class(_) => Some(scheme.class_level()),
            Variant::Module(_) => Some(scheme.module_level()),
            _ => None,
        }
    }

    pub fn expands(&self) -> bool {
        self.expand
    }

    pub fn set_expand(&mut self, expand: bool) {
        self.expand = expand;
    }

    pub fn expanded(mut self) -> Self {
        self.expand = true;
        self
    }

    /// Adds a name that is documented even when the naming rules hide it.
    pub fn include(mut self, name: impl Into<String>) -> Self {
        self.includes.insert(name.into());
        self
    }

    /// Adds a name that is never documented as a plain child.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excludes.insert(name.into());
        self
    }

    /// Short description: cleaned documentation text, or the raw contents of
    /// a Markdown file.
    pub fn text(&self) -> DocResult<String> {
        if let Variant::Markdown(file) = &self.variant {
            return file.text();
        }
        let doc = self
            .variant
            .entity()
            .and_then(|id| self.ctx.host().doc(id))
            .unwrap_or_default();
        Ok(clean(doc))
    }

    pub fn oneliner(&self) -> DocResult<String> {
        let host = self.ctx.host();
        let line = match self.variant {
            Variant::Function(id) | Variant::Method(id, _) => {
                format!("{}{}", self.name_of(id), host.signature(id)?)
            }
            Variant::Class(id) => {
                let signature = host.constructor_signature(id)?.without_first();
                format!("{}{signature}", self.name_of(id))
            }
            Variant::Module(id) => self.name_of(id).to_string(),
            _ => String::new(),
        };
        Ok(line)
    }

    /// Child documentables, discovered afresh on every call. Each child
    /// copies this documentable's current expansion flag.
    pub fn children(&self) -> Vec<Documentable<'r>> {
        let mut children = match self.variant {
            Variant::Class(id) => self.class_children(id),
            Variant::Module(id) => self.module_children(id),
            _ => Vec::new(),
        };
        for child in &mut children {
            child.expand = self.expand;
        }
        children
    }

    fn class_children(&self, class: EntityId) -> Vec<Documentable<'r>> {
        let host = self.ctx.host();
        host.own_attributes(class)
            .into_iter()
            .filter_map(|attr| match host.kind(attr.target) {
                EntityKind::Function => {
                    let name = host.name(attr.target).unwrap_or(&attr.name);
                    let visible = !name.starts_with('_')
                        || name == CONSTRUCTOR
                        || self.includes.contains(name);
                    (visible && !self.excludes.contains(name)).then(|| {
                        Documentable::new(
                            self.ctx,
                            Variant::Method(attr.target, MethodFlavor::Instance),
                        )
                    })
                }
                kind if kind.is_method_wrapper() => {
                    Some(Documentable::from_entity(self.ctx, attr.target))
                }
                _ => None,
            })
            .collect()
    }

    fn module_children(&self, module: EntityId) -> Vec<Documentable<'r>> {
        let host = self.ctx.host();
        host.members(module)
            .into_iter()
            .filter(|attr| {
                matches!(
                    host.kind(attr.target),
                    EntityKind::Class | EntityKind::Function
                )
            })
            .filter(|attr| host.declaring_module(attr.target) == Some(module))
            .filter(|attr| {
                let name = host.name(attr.target).unwrap_or(&attr.name);
                let visible = !name.starts_with('_') || self.includes.contains(name);
                visible && !self.excludes.contains(name)
            })
            .map(|attr| Documentable::from_entity(self.ctx, attr.target))
            .collect()
    }

    /// Complete rendering of this documentable and, when expanded, its
    /// children.
    pub fn full_doc(&self) -> DocResult<String> {
        match &self.variant {
            Variant::Function(_) | Variant::Method(..) => {
                let doc = format!(
                    "{} `{}`\n\n{}\n",
                    self.heading(),
                    self.oneliner()?,
                    self.text()?
                );
                Ok(clean(&doc))
            }
            Variant::Class(_) => {
                let doc = format!(
                    "{} `{}`\n\n{}\n\n{}\n\n",
                    self.heading(),
                    self.oneliner()?,
                    self.text()?,
                    self.child_docs()?
                );
                Ok(clean(&doc))
            }
            Variant::Module(id) => {
                let doc = format!(
                    "{} `{}`\n\n{}\n\n{}\n",
                    self.heading(),
                    self.name_of(*id),
                    self.text()?,
                    self.child_docs()?
                );
                Ok(clean(&doc))
            }
            Variant::Markdown(file) => file.text(),
            Variant::HorizontalRule => Ok(HORIZONTAL_RULE.to_string()),
            Variant::TableOfContents(toc) => Ok(toc.render()),
            Variant::Generic(_) | Variant::Indent | Variant::Dedent => Ok(String::new()),
        }
    }

    /// Whether both documentables render to the same text.
    pub fn same_rendering(&self, other: &Documentable<'_>) -> DocResult<bool> {
        Ok(self.full_doc()? == other.full_doc()?)
    }

    /// Second resolution phase: hands the outline of the complete document
    /// to a table of contents. Other variants ignore it.
    pub fn bind(&mut self, outline: &Outline) {
        if let Variant::TableOfContents(toc) = &mut self.variant {
            toc.bind(outline.clone());
        }
    }

    fn child_docs(&self) -> DocResult<String> {
        if !self.expand {
            return Ok(String::new());
        }
        let docs = self
            .children()
            .iter()
            .map(Documentable::full_doc)
            .collect::<DocResult<Vec<_>>>()?;
        Ok(docs.join("\n"))
    }

    fn heading(&self) -> String {
        "#".repeat(usize::from(self.heading_level().unwrap_or(0)))
    }

    fn name_of(&self, id: EntityId) -> &'r str {
        self.ctx.host().name(id).unwrap_or_default()
    }
}

impl PartialEq for Documentable<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.same_rendering(other).unwrap_or(false)
    }
}

impl fmt::Debug for Documentable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let oneliner = self.oneliner().unwrap_or_default();
        write!(f, "<{} {}>", self.variant.label(), oneliner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use refdoc_reflect::{Parameter, Signature, Snapshot, SnapshotBuilder};

    struct Sample {
        snapshot: Snapshot,
        module: EntityId,
        class: EntityId,
        function: EntityId,
        constant: EntityId,
    }

    fn sample() -> Sample {
        let mut builder = SnapshotBuilder::new();
        let module = builder.module("shapes", Some("Shapes."));
        let class = builder.class(
            module,
            "Square",
            Some("\n    A square.\n\n\n\n    Four sides.\n    "),
        );
        builder.function(
            class,
            "__init__",
            None,
            Signature::new(vec![
                Parameter::new("self"),
                Parameter::new("side").annotated("int"),
            ]),
        );
        builder.function(class, "_grow", None, Signature::new(vec![Parameter::new("self")]));
        let function = builder.function(
            module,
            "area",
            Some("Area of a square."),
            Signature::new(vec![Parameter::new("square").annotated("Square")]).returning("int"),
        );
        let constant = builder.value(module, "SIDES", Some("int([x]) -> integer"));
        Sample {
            snapshot: builder.build(),
            module,
            class,
            function,
            constant,
        }
    }

    #[test]
    fn factory_selects_variant_by_kind() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);

        let labels: Vec<_> = [sample.module, sample.class, sample.function, sample.constant]
            .into_iter()
            .map(|id| Documentable::from_entity(ctx, id).variant().label())
            .collect();
        assert_eq!(labels, vec!["Module", "Class", "Function", "Generic"]);
    }

    #[test]
    fn generic_documentable_has_text_but_no_rendering() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);
        let value = Documentable::from_entity(ctx, sample.constant);

        assert_eq!(value.heading_level(), Some(0));
        assert_eq!(value.variant().entity(), Some(sample.constant));
        assert_eq!(value.text().unwrap(), "int([x]) -> integer");
        assert_eq!(value.oneliner().unwrap(), "");
        assert_eq!(value.full_doc().unwrap(), "");
        assert!(value.children().is_empty());
        assert_eq!(format!("{value:?}"), "<Generic >");
    }

    #[test]
    fn class_text_is_cleaned() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);
        let class = Documentable::from_entity(ctx, sample.class);
        assert_eq!(class.text().unwrap(), "\nA square.\n\nFour sides.\n");
    }

    #[test]
    fn unexpanded_class_omits_children() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);
        let class = Documentable::from_entity(ctx, sample.class);

        assert_eq!(class.oneliner().unwrap(), "Square(side: int)");
        assert_eq!(
            class.full_doc().unwrap(),
            "## `Square(side: int)`\n\nA square.\n\nFour sides.\n\n"
        );
    }

    #[test]
    fn private_methods_need_an_include() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);

        fn names(doc: &Documentable<'_>) -> Vec<String> {
            doc.children()
                .iter()
                .map(|child| child.oneliner().unwrap())
                .collect()
        }

        let class = Documentable::from_entity(ctx, sample.class);
        assert_eq!(names(&class), vec!["__init__(self, side: int)"]);
        assert_eq!(
            names(&class.clone().include("_grow")),
            vec!["__init__(self, side: int)", "_grow(self)"]
        );
        assert!(names(&class.exclude("__init__")).is_empty());
    }

    #[test]
    fn children_copy_expansion_flag() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);
        let module = Documentable::from_entity(ctx, sample.module).expanded();

        let children = module.children();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(Documentable::expands));
        assert!(matches!(children[0].variant(), Variant::Class(_)));
        assert!(matches!(children[1].variant(), Variant::Function(_)));
        assert!(matches!(
            children[0].children()[0].variant(),
            Variant::Method(_, MethodFlavor::Instance)
        ));
    }

    #[test]
    fn flat_scheme_lifts_methods() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot).with_scheme(HeadingScheme::Flat);
        let class = Documentable::from_entity(ctx, sample.class).expanded();
        let init = &class.children()[0];
        assert_eq!(init.heading_level(), Some(2));
        assert_eq!(init.full_doc().unwrap(), "## `__init__(self, side: int)`\n\n");
    }

    #[test]
    fn structural_markers_render_without_heading() {
        let snapshot = Snapshot::default();
        let ctx = Context::new(&snapshot);

        let rule = Documentable::new(ctx, Variant::HorizontalRule);
        assert_eq!(rule.full_doc().unwrap(), "\n---\n");
        assert_eq!(rule.heading_level(), None);

        for variant in [Variant::Indent, Variant::Dedent] {
            let marker = Documentable::new(ctx, variant);
            assert_eq!(marker.full_doc().unwrap(), "");
            assert_eq!(marker.oneliner().unwrap(), "");
            assert_eq!(marker.heading_level(), None);
        }
    }

    #[test]
    fn equality_compares_renderings() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);

        let function = Documentable::from_entity(ctx, sample.function);
        assert_eq!(function, Documentable::from_entity(ctx, sample.function));
        assert_ne!(function, Documentable::from_entity(ctx, sample.class));

        let indent = Documentable::new(ctx, Variant::Indent);
        let dedent = Documentable::new(ctx, Variant::Dedent);
        assert_eq!(indent, dedent);
    }

    #[test]
    fn debug_reads_like_a_repr() {
        let sample = sample();
        let ctx = Context::new(&sample.snapshot);
        let function = Documentable::from_entity(ctx, sample.function);
        assert_eq!(format!("{function:?}"), "<Function area(square: Square) -> int>");
    }
}
