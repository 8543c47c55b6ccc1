//! Storage for the resource ledger. Resources are not one of the five entity
//! kinds: nothing references them and they are never resolved, so they get a
//! plain table of their own next to the entity collections instead of an
//! [`EntityKind`](crate::models::EntityKind).

use rusqlite::{params, Connection};

use crate::db::collection::{decode, encode};
use crate::error::{StorageContext, StoreResult};
use crate::ledger::Resource;

const RESOURCES: &str = "resources";

/// Create the resources table if this database has never held one.
fn ensure_table(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS resources (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id INTEGER NOT NULL UNIQUE,
            body TEXT NOT NULL
        )",
        [],
    )
    .storage("failed to create resources collection")?;
    Ok(())
}

/// Every stored resource, in the order the ledger last wrote them.
pub(crate) fn load_resources(conn: &Connection) -> StoreResult<Vec<Resource>> {
    ensure_table(conn)?;
    let mut stmt = conn
        .prepare("SELECT body FROM resources ORDER BY seq")
        .storage("failed to prepare resources query")?;

    let bodies = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .storage("failed to load resources")?
        .collect::<Result<Vec<_>, _>>()
        .storage("failed to collect resources")?;

    bodies.iter().map(|body| decode(RESOURCES, body)).collect()
}

/// Overwrite the stored resources with `resources`. Callers run this inside a
/// transaction so a failure part-way leaves the previous snapshot in place.
pub(crate) fn replace_resources(conn: &Connection, resources: &[Resource]) -> StoreResult<()> {
    ensure_table(conn)?;
    conn.execute("DELETE FROM resources", [])
        .storage("failed to clear resources")?;

    for resource in resources {
        let body = encode(RESOURCES, resource)?;
        conn.execute(
            "INSERT INTO resources (id, body) VALUES (?1, ?2)",
            params![resource.id, body],
        )
        .storage_with(|| format!("failed to insert resource {}", resource.id))?;
    }
    Ok(())
}
