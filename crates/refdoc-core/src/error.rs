use std::io;
use std::path::PathBuf;

use refdoc_reflect::ReflectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocError {
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error("failed to read markdown file {path}: {source}")]
    Markdown { path: PathBuf, source: io::Error },

    #[error("failed to write documentation to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

pub type DocResult<T> = Result<T, DocError>;
