//! Documentation assembly driven by reflection data.
//!
//! Entities and directives are resolved into [`Documentable`]s, context
//! dependent directives are bound against the complete resolved list, and
//! the renderings are concatenated into one Markdown document.

pub mod assembler;
pub mod directive;
pub mod docstring;
pub mod documentable;
pub mod error;
pub mod markdown;
pub mod toc;

pub use assembler::Assembler;
pub use directive::{Directive, Item};
pub use documentable::{Context, Documentable, MethodFlavor, Variant};
pub use error::{DocError, DocResult};
pub use markdown::MarkdownFile;
pub use refdoc_config::HeadingScheme;
pub use toc::{Outline, OutlineEntry, TableOfContents, DEFAULT_TOC_HEADER};
