pub use refdoc_config::DEFAULT_TOC_HEADER;

use crate::documentable::{Documentable, Variant};
use crate::error::DocResult;

const INDENT_UNIT: &str = "    ";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    /// Nesting depth; may go negative when dedents outnumber indents.
    pub depth: isize,
    pub label: String,
}

/// Flattened view of a resolved document used to render a table of contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outline {
    pub entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Walks the resolved top-level siblings in order.
    ///
    /// Indent and dedent markers shift the depth without emitting anything.
    /// Every documentable with a non-empty one-liner emits an entry, and
    /// expanded documentables contribute their children one level deeper.
    pub fn of(siblings: &[Documentable<'_>]) -> DocResult<Self> {
        let mut outline = Outline::default();
        let mut depth = 0;
        for doc in siblings {
            outline.visit(doc, &mut depth)?;
        }
        Ok(outline)
    }

    fn visit(&mut self, doc: &Documentable<'_>, depth: &mut isize) -> DocResult<()> {
        match doc.variant() {
            Variant::Indent => *depth += 1,
            Variant::Dedent => *depth -= 1,
            _ => {}
        }

        let label = doc.oneliner()?;
        if !label.is_empty() {
            self.entries.push(OutlineEntry {
                depth: *depth,
                label,
            });
        }

        if doc.expands() {
            *depth += 1;
            for child in doc.children() {
                self.visit(&child, depth)?;
            }
            *depth -= 1;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Table of contents whose outline is bound after every sibling is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableOfContents {
    header: String,
    outline: Option<Outline>,
}

impl TableOfContents {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            outline: None,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_bound(&self) -> bool {
        self.outline.is_some()
    }

    pub fn bind(&mut self, outline: Outline) {
        self.outline = Some(outline);
    }

    /// Renders the header and one bullet per outline entry. An unbound
    /// table renders the header alone.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("# {}", self.header), String::new()];
        if let Some(outline) = &self.outline {
            lines.extend(outline.entries.iter().map(|entry| {
                let depth = usize::try_from(entry.depth).unwrap_or(0);
                format!("{}* `{}`", INDENT_UNIT.repeat(depth), entry.label)
            }));
        }
        lines.join("\n")
    }
}

impl Default for TableOfContents {
    fn default() -> Self {
        Self::new(DEFAULT_TOC_HEADER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(depth: isize, label: &str) -> OutlineEntry {
        OutlineEntry {
            depth,
            label: label.to_string(),
        }
    }

    #[test]
    fn unbound_table_renders_header_only() {
        let toc = TableOfContents::new("Contents");
        assert!(!toc.is_bound());
        assert_eq!(toc.render(), "# Contents\n");
    }

    #[test]
    fn default_header_matches_render_settings() {
        let settings = refdoc_config::RenderSettings::default();
        assert_eq!(TableOfContents::default().header(), settings.toc_header);
    }

    #[test]
    fn renders_nested_bullets() {
        let mut toc = TableOfContents::default();
        toc.bind(Outline {
            entries: vec![entry(0, "Class(x: float)"), entry(1, "method(self, y: float)")],
        });
        assert_eq!(
            toc.render(),
            "# Table of Contents\n\n* `Class(x: float)`\n    * `method(self, y: float)`"
        );
    }

    #[test]
    fn negative_depth_renders_flush() {
        let mut toc = TableOfContents::new("Toc");
        toc.bind(Outline {
            entries: vec![entry(-2, "function()")],
        });
        assert_eq!(toc.render(), "# Toc\n\n* `function()`");
    }
}
