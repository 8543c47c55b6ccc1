//! Typed errors for the persistence layer. Absence of a record is not an error
//! here: lookups return `Ok(None)` and callers decide whether that matters.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{EntityId, EntityKind};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A workflow needed a record that does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// A mandatory relation points at a record that no longer exists.
    #[error("{owner} {owner_id} references missing {target} {target_id} through `{field}`")]
    DanglingMandatoryReference {
        owner: EntityKind,
        owner_id: EntityId,
        field: &'static str,
        target: EntityKind,
        target_id: EntityId,
    },

    /// The SQLite backend failed to open or to run a statement.
    #[error("storage unavailable: {action}")]
    StorageUnavailable {
        action: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A stored body could not be turned into a record, or the reverse.
    #[error("failed to encode or decode a record in {collection}")]
    Encoding {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create data directory {}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storage worker stopped unexpectedly")]
    Worker(#[from] tokio::task::JoinError),

    #[error("storage lock poisoned by an earlier panic")]
    Poisoned,
}

/// Attach a description of the failed action to SQLite errors, mirroring
/// `anyhow::Context` while keeping the error typed.
pub(crate) trait StorageContext<T> {
    fn storage(self, action: &str) -> StoreResult<T>;

    fn storage_with<F: FnOnce() -> String>(self, action: F) -> StoreResult<T>;
}

impl<T> StorageContext<T> for Result<T, rusqlite::Error> {
    fn storage(self, action: &str) -> StoreResult<T> {
        self.storage_with(|| action.to_string())
    }

    fn storage_with<F: FnOnce() -> String>(self, action: F) -> StoreResult<T> {
        self.map_err(|source| StoreError::StorageUnavailable {
            action: action(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_message_names_both_ends() {
        let err = StoreError::DanglingMandatoryReference {
            owner: EntityKind::Grade,
            owner_id: 9,
            field: "student",
            target: EntityKind::Student,
            target_id: 2,
        };
        assert_eq!(
            err.to_string(),
            "grade 9 references missing student 2 through `student`"
        );
    }

    #[test]
    fn storage_context_keeps_the_action() {
        let failed: Result<(), rusqlite::Error> = Err(rusqlite::Error::InvalidQuery);
        match failed.storage("failed to load courses") {
            Err(StoreError::StorageUnavailable { action, .. }) => {
                assert_eq!(action, "failed to load courses")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
