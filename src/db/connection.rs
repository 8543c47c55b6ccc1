use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::debug;

use crate::error::{StorageContext, StoreError, StoreResult};
use crate::models::EntityKind;

/// Shared handle to the embedded SQLite store. Cloning is cheap; every clone
/// talks to the same connection.
///
/// Each unit of work runs on tokio's blocking pool while holding the
/// connection lock, so callers never block their own thread and two
/// operations never interleave.
#[derive(Clone)]
pub struct Database {
    shared: Arc<Mutex<Handle>>,
}

/// The connection plus the set of collections already created on it.
struct Handle {
    conn: Connection,
    opened: HashSet<EntityKind>,
}

impl Handle {
    /// Create the backing table for each kind on first use. The schema (key
    /// field `id`, JSON body, insertion sequence) never changes afterwards.
    fn open_collections(&mut self, kinds: &[EntityKind]) -> StoreResult<()> {
        for &kind in kinds {
            if self.opened.contains(&kind) {
                continue;
            }
            let name = kind.collection();
            self.conn
                .execute(
                    &format!(
                        "CREATE TABLE IF NOT EXISTS {name} (
                            seq INTEGER PRIMARY KEY AUTOINCREMENT,
                            id INTEGER NOT NULL UNIQUE,
                            body TEXT NOT NULL
                        )"
                    ),
                    [],
                )
                .storage_with(|| format!("failed to create {name} collection"))?;
            debug!(collection = name, "collection opened");
            self.opened.insert(kind);
        }
        Ok(())
    }
}

impl Database {
    /// Open (or create) the database file at `path`, creating parent
    /// directories as needed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).storage("failed to open SQLite database")?;
        debug!(path = %path.display(), "database opened");
        Ok(Self::from_connection(conn))
    }

    /// A private database that disappears with the last handle. Used by tests
    /// and throwaway sessions.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().storage("failed to open in-memory database")?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Handle {
                conn,
                opened: HashSet::new(),
            })),
        }
    }

    /// Run `op` against the connection after making sure the listed
    /// collections exist. Each statement inside `op` commits on its own.
    pub(crate) async fn run<T, F>(&self, kinds: &[EntityKind], op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let kinds = kinds.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut handle = shared.lock().map_err(|_| StoreError::Poisoned)?;
            handle.open_collections(&kinds)?;
            op(&handle.conn)
        })
        .await?
    }

    /// Like [`Database::run`], but everything `op` writes commits together or
    /// not at all. Spans any number of collections.
    pub(crate) async fn transaction<T, F>(&self, kinds: &[EntityKind], op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        let kinds = kinds.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut guard = shared.lock().map_err(|_| StoreError::Poisoned)?;
            let handle = &mut *guard;
            handle.open_collections(&kinds)?;

            let tx = handle
                .conn
                .transaction()
                .storage("failed to begin transaction")?;
            // Dropping `tx` on the error path rolls it back.
            let value = op(&*tx)?;
            tx.commit().storage("failed to commit transaction")?;
            Ok(value)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collections_are_created_lazily() {
        let db = Database::open_in_memory().unwrap();
        let tables = db
            .run(&[EntityKind::Course], |conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT name FROM sqlite_master
                         WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                    )
                    .storage("failed to list tables")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))
                    .storage("failed to list tables")?
                    .collect::<Result<Vec<_>, _>>()
                    .storage("failed to collect tables")?;
                Ok(names)
            })
            .await
            .unwrap();

        assert_eq!(tables, vec!["courses".to_string()]);
    }

    #[tokio::test]
    async fn failed_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let result: StoreResult<()> = db
            .transaction(&[EntityKind::Teacher], |conn| {
                conn.execute("INSERT INTO teachers (id, body) VALUES (1, '{}')", [])
                    .storage("insert")?;
                Err(StoreError::NotFound {
                    kind: EntityKind::Course,
                    id: 1,
                })
            })
            .await;
        assert!(result.is_err());

        let count: i64 = db
            .run(&[EntityKind::Teacher], |conn| {
                conn.query_row("SELECT COUNT(*) FROM teachers", [], |row| row.get(0))
                    .storage("count")
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
