use std::path::Path;

use refdoc_config::{HeadingScheme, RenderSettings};
use refdoc_reflect::Reflect;
use refdoc_utils::atomic_write;

use crate::directive::Item;
use crate::docstring::clean;
use crate::documentable::{Context, Documentable};
use crate::error::{DocError, DocResult};
use crate::toc::Outline;

/// Turns an ordered list of items into one Markdown document.
#[derive(Clone, Copy, Debug)]
pub struct Assembler<'r> {
    ctx: Context<'r>,
    expand_all: bool,
}

impl<'r> Assembler<'r> {
    pub fn new(host: &'r dyn Reflect) -> Self {
        Self {
            ctx: Context::new(host),
            expand_all: false,
        }
    }

    pub fn from_config(host: &'r dyn Reflect, settings: &RenderSettings) -> Self {
        Self::new(host)
            .with_scheme(settings.heading_scheme)
            .expand_all(settings.expand_all)
    }

    pub fn with_scheme(mut self, scheme: HeadingScheme) -> Self {
        self.ctx = self.ctx.with_scheme(scheme);
        self
    }

    /// Expands every top-level documentable, and through them every
    /// descendant.
    pub fn expand_all(mut self, expand_all: bool) -> Self {
        self.expand_all = expand_all;
        self
    }

    pub fn context(&self) -> Context<'r> {
        self.ctx
    }

    /// Resolves every item in order, then binds the outline of the resolved
    /// list into the documentables that asked for it.
    pub fn resolve(&self, items: &[Item]) -> DocResult<Vec<Documentable<'r>>> {
        let mut resolved: Vec<_> = items
            .iter()
            .map(|item| {
                let mut doc = item.resolve(self.ctx);
                if self.expand_all {
                    doc.set_expand(true);
                }
                doc
            })
            .collect();
        tracing::debug!(items = resolved.len(), "resolved document items");

        let pending: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.binds_context())
            .map(|(index, _)| index)
            .collect();
        if pending.is_empty() {
            return Ok(resolved);
        }

        let outline = Outline::of(&resolved)?;
        for index in pending {
            resolved[index].bind(&outline);
        }
        tracing::debug!(entries = outline.len(), "bound table of contents");
        Ok(resolved)
    }

    /// Renders the document without writing it.
    pub fn render(&self, items: &[Item]) -> DocResult<String> {
        let docs = self
            .resolve(items)?
            .iter()
            .map(Documentable::full_doc)
            .collect::<DocResult<Vec<_>>>()?;
        Ok(clean(&docs.join("\n")))
    }

    /// Renders the document and replaces `path` with it. Nothing is written
    /// when rendering fails.
    pub fn document(&self, items: &[Item], path: &Path) -> DocResult<()> {
        let rendered = self.render(items)?;
        atomic_write(path, &rendered).map_err(|source| DocError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            bytes = rendered.len(),
            "wrote documentation"
        );
        Ok(())
    }
}
