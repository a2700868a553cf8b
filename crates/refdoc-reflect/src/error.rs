use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::entity::EntityId;

#[derive(Debug, Error)]
pub enum ReflectError {
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("no signature available for `{name}`")]
    MissingSignature { name: String },

    #[error("failed to read snapshot {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("entity {from} refers to missing entity {to}")]
    DanglingReference { from: EntityId, to: EntityId },
}

pub type ReflectResult<T> = Result<T, ReflectError>;
