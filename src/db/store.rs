use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::debug;

use crate::db::collection::{
    count_records, delete_record, fetch_record, fetch_records, max_id, upsert_record, Upsert,
};
use crate::db::connection::Database;
use crate::db::mapping::Entity;
use crate::db::records::FlatRecord;
use crate::error::StoreResult;
use crate::models::{EntityId, UNASSIGNED_ID};

/// The CRUD contract every entity kind offers to its callers.
#[async_trait]
pub trait Dao<E: Entity>: Send + Sync {
    /// Fully resolved entity, or `None` when the id is absent.
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<E>>;

    /// Every entity of the kind, resolved, in insertion order.
    async fn get_all(&self) -> StoreResult<Vec<E>>;

    /// Insert or fully replace by id. Returns the stored id, which the store
    /// assigns when the entity's id is unassigned.
    async fn save(&self, entity: &E) -> StoreResult<EntityId>;

    /// Same contract as [`Dao::save`].
    async fn update(&self, entity: &E) -> StoreResult<EntityId>;

    /// Remove by id. Dependent records are left untouched.
    async fn delete(&self, id: EntityId) -> StoreResult<()>;
}

/// Store for one entity kind, backed by that kind's collection.
///
/// The store owns no state besides the database handle; every call opens the
/// collection lazily, runs on the blocking pool and returns owned values.
pub struct Store<E> {
    db: Database,
    kind: PhantomData<fn() -> E>,
}

impl<E> Clone for Store<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            kind: PhantomData,
        }
    }
}

impl<E: Entity> Store<E> {
    /// A store for `E` on the given database. Does no I/O.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            kind: PhantomData,
        }
    }

    /// The id a client should use for a new entity: highest stored id plus one.
    pub async fn next_id(&self) -> StoreResult<EntityId> {
        self.db
            .run(&[E::KIND], |conn| Ok(max_id(conn, E::KIND)? + 1))
            .await
    }

    /// Number of stored records, without resolving any of them.
    pub async fn count(&self) -> StoreResult<usize> {
        self.db
            .run(&[E::KIND], |conn| count_records(conn, E::KIND))
            .await
    }

    /// Whether the collection holds no records. The seeder uses this to decide
    /// whether a kind still needs sample data.
    pub async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.count().await? == 0)
    }

    /// Stored record without any reference lookups.
    pub(crate) async fn get_record(&self, id: EntityId) -> StoreResult<Option<E::Record>> {
        self.db
            .run(&[E::KIND], move |conn| fetch_record(conn, E::KIND, id))
            .await
    }

    /// Write an already-flat record back. Used by workflows that edit ids
    /// directly so unresolvable references are carried over untouched.
    pub(crate) async fn put_record(&self, record: E::Record) -> StoreResult<()> {
        self.db
            .run(&[E::KIND], move |conn| {
                upsert_record(conn, E::KIND, &record)?;
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl<E: Entity> Dao<E> for Store<E> {
    async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<E>> {
        self.db
            .run(E::READS, move |conn| {
                fetch_record::<E::Record>(conn, E::KIND, id)?
                    .map(|record| E::resolve(conn, record))
                    .transpose()
            })
            .await
    }

    async fn get_all(&self) -> StoreResult<Vec<E>> {
        self.db
            .run(E::READS, |conn| {
                fetch_records::<E::Record>(conn, E::KIND)?
                    .into_iter()
                    .map(|record| E::resolve(conn, record))
                    .collect()
            })
            .await
    }

    async fn save(&self, entity: &E) -> StoreResult<EntityId> {
        let mut record = entity.flatten();
        self.db
            .run(&[E::KIND], move |conn| {
                if record.id() <= UNASSIGNED_ID {
                    record.set_id(max_id(conn, E::KIND)? + 1);
                }
                let action = match upsert_record(conn, E::KIND, &record)? {
                    Upsert::Inserted => "inserted",
                    Upsert::Replaced => "replaced",
                };
                debug!(kind = %E::KIND, id = record.id(), action, "record saved");
                Ok(record.id())
            })
            .await
    }

    async fn update(&self, entity: &E) -> StoreResult<EntityId> {
        self.save(entity).await
    }

    async fn delete(&self, id: EntityId) -> StoreResult<()> {
        self.db
            .run(&[E::KIND], move |conn| {
                if delete_record(conn, E::KIND, id)? {
                    debug!(kind = %E::KIND, id, "record deleted");
                } else {
                    debug!(kind = %E::KIND, id, "delete skipped, no such record");
                }
                Ok(())
            })
            .await
    }
}
