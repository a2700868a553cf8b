use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocError, DocResult};

/// A Markdown file pasted verbatim into the document.
///
/// The file is read on first access and cached for the lifetime of the value.
/// `\r\n` and lone `\r` line endings are read as `\n`.
#[derive(Clone, Debug)]
pub struct MarkdownFile {
    path: PathBuf,
    contents: OnceCell<String>,
}

impl MarkdownFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.contents.get().is_some()
    }

    pub fn text(&self) -> DocResult<String> {
        if let Some(contents) = self.contents.get() {
            return Ok(contents.clone());
        }

        tracing::debug!(path = %self.path.display(), "reading markdown file");
        let contents = fs::read_to_string(&self.path).map_err(|source| DocError::Markdown {
            path: self.path.clone(),
            source,
        })?;
        Ok(self
            .contents
            .get_or_init(|| normalize_newlines(contents))
            .clone())
    }
}

fn normalize_newlines(contents: String) -> String {
    if !contents.contains('\r') {
        return contents;
    }
    contents.replace("\r\n", "\n").replace('\r', "\n")
}
