//! Foreign-key resolution helpers shared by every entity mapping. Each helper
//! looks an id up in the owning collection and applies one of the three
//! dangling-reference policies.

use rusqlite::Connection;
use tracing::warn;

use crate::db::collection::fetch_record;
use crate::db::mapping::Entity;
use crate::error::{StoreError, StoreResult};
use crate::models::{EntityId, EntityKind, Ref};

/// The record whose references are being resolved, for error and log context.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Owner {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl Owner {
    pub(crate) fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

/// Load a target one level deep: its own references stay as bare ids.
pub(crate) fn lookup<E: Entity>(conn: &Connection, id: EntityId) -> StoreResult<Option<E>> {
    Ok(fetch_record::<E::Record>(conn, E::KIND, id)?.map(E::shallow))
}

/// Optional single reference. A missing target degrades to `None`.
pub(crate) fn resolve_optional<E: Entity>(
    conn: &Connection,
    owner: Owner,
    field: &'static str,
    id: Option<EntityId>,
) -> StoreResult<Option<Ref<E>>> {
    let Some(id) = id else {
        return Ok(None);
    };

    match lookup::<E>(conn, id)? {
        Some(target) => Ok(Some(Ref::from(target))),
        None => {
            warn!(
                owner = %owner.kind,
                owner_id = owner.id,
                field,
                target_kind = %E::KIND,
                target_id = id,
                "optional reference is dangling, treating as unset"
            );
            Ok(None)
        }
    }
}

/// List of references. Missing targets stay in place as `Ref::Dangling` so the
/// stored id survives a later save.
pub(crate) fn resolve_many<E: Entity>(
    conn: &Connection,
    owner: Owner,
    field: &'static str,
    ids: &[EntityId],
) -> StoreResult<Vec<Ref<E>>> {
    let mut refs = Vec::with_capacity(ids.len());
    for &id in ids {
        match lookup::<E>(conn, id)? {
            Some(target) => refs.push(Ref::from(target)),
            None => {
                warn!(
                    owner = %owner.kind,
                    owner_id = owner.id,
                    field,
                    target_kind = %E::KIND,
                    target_id = id,
                    "list reference is dangling"
                );
                refs.push(Ref::Dangling(id));
            }
        }
    }
    Ok(refs)
}

/// Mandatory reference. A missing target fails the whole read.
pub(crate) fn resolve_mandatory<E: Entity>(
    conn: &Connection,
    owner: Owner,
    field: &'static str,
    id: EntityId,
) -> StoreResult<Ref<E>> {
    match lookup::<E>(conn, id)? {
        Some(target) => Ok(Ref::from(target)),
        None => {
            warn!(
                owner = %owner.kind,
                owner_id = owner.id,
                field,
                target_kind = %E::KIND,
                target_id = id,
                "mandatory reference is dangling"
            );
            Err(StoreError::DanglingMandatoryReference {
                owner: owner.kind,
                owner_id: owner.id,
                field,
                target: E::KIND,
                target_id: id,
            })
        }
    }
}
