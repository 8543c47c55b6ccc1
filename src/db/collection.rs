//! Raw document operations on a single collection. Each function wraps one
//! statement; callers above this layer deal in typed records, never SQL.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::records::FlatRecord;
use crate::error::{StorageContext, StoreError, StoreResult};
use crate::models::{EntityId, EntityKind};

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upsert {
    Inserted,
    Replaced,
}

/// Parse a stored JSON body. `collection` only labels the error.
pub(crate) fn decode<R: DeserializeOwned>(collection: &'static str, body: &str) -> StoreResult<R> {
    serde_json::from_str(body).map_err(|source| StoreError::Encoding { collection, source })
}

pub(crate) fn encode<R: Serialize>(collection: &'static str, record: &R) -> StoreResult<String> {
    serde_json::to_string(record).map_err(|source| StoreError::Encoding { collection, source })
}

/// Fetch one record by id, or `None` when the collection has no such id.
pub(crate) fn fetch_record<R: FlatRecord>(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
) -> StoreResult<Option<R>> {
    let name = kind.collection();
    let body: Option<String> = conn
        .query_row(
            &format!("SELECT body FROM {name} WHERE id = ?1"),
            params![id],
            |row| row.get(0),
        )
        .optional()
        .storage_with(|| format!("failed to fetch {kind} {id}"))?;

    body.map(|body| decode(name, &body)).transpose()
}

/// Every record in the collection, in the order they were first inserted.
pub(crate) fn fetch_records<R: FlatRecord>(
    conn: &Connection,
    kind: EntityKind,
) -> StoreResult<Vec<R>> {
    let name = kind.collection();
    let mut stmt = conn
        .prepare(&format!("SELECT body FROM {name} ORDER BY seq"))
        .storage_with(|| format!("failed to prepare {name} query"))?;

    let bodies = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .storage_with(|| format!("failed to load {name}"))?
        .collect::<Result<Vec<_>, _>>()
        .storage_with(|| format!("failed to collect {name}"))?;

    bodies.iter().map(|body| decode(name, body)).collect()
}

pub(crate) fn record_exists(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
) -> StoreResult<bool> {
    let name = kind.collection();
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {name} WHERE id = ?1)"),
        params![id],
        |row| row.get(0),
    )
    .storage_with(|| format!("failed to check for {kind} {id}"))
}

/// Insert the record if its id is new, otherwise replace the stored body in
/// full. Replacing keeps the original insertion position.
pub(crate) fn upsert_record<R: FlatRecord>(
    conn: &Connection,
    kind: EntityKind,
    record: &R,
) -> StoreResult<Upsert> {
    let name = kind.collection();
    let id = record.id();
    let body = encode(name, record)?;

    if record_exists(conn, kind, id)? {
        conn.execute(
            &format!("UPDATE {name} SET body = ?1 WHERE id = ?2"),
            params![body, id],
        )
        .storage_with(|| format!("failed to update {kind} {id}"))?;
        Ok(Upsert::Replaced)
    } else {
        conn.execute(
            &format!("INSERT INTO {name} (id, body) VALUES (?1, ?2)"),
            params![id, body],
        )
        .storage_with(|| format!("failed to insert {kind} {id}"))?;
        Ok(Upsert::Inserted)
    }
}

/// Remove a record. Returns whether anything was deleted.
pub(crate) fn delete_record(
    conn: &Connection,
    kind: EntityKind,
    id: EntityId,
) -> StoreResult<bool> {
    let name = kind.collection();
    let deleted = conn
        .execute(&format!("DELETE FROM {name} WHERE id = ?1"), params![id])
        .storage_with(|| format!("failed to delete {kind} {id}"))?;
    Ok(deleted > 0)
}

/// Highest id in the collection, or 0 when it is empty.
pub(crate) fn max_id(conn: &Connection, kind: EntityKind) -> StoreResult<EntityId> {
    let name = kind.collection();
    conn.query_row(
        &format!("SELECT COALESCE(MAX(id), 0) FROM {name}"),
        [],
        |row| row.get(0),
    )
    .storage_with(|| format!("failed to read highest {kind} id"))
}

pub(crate) fn count_records(conn: &Connection, kind: EntityKind) -> StoreResult<usize> {
    let name = kind.collection();
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {name}"), [], |row| row.get(0))
        .storage_with(|| format!("failed to count {name}"))?;
    Ok(usize::try_from(count).unwrap_or_default())
}
