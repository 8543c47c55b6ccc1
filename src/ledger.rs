//! Ledger of shared school resources (rooms, equipment, supplies).
//!
//! The ledger is an ordinary owned value: whoever needs it is handed it
//! explicitly, there is no process-wide instance. Edits happen in memory;
//! [`ResourceLedger::load`] and [`ResourceLedger::persist`] move a snapshot to
//! and from the database so stock levels survive a restart.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::{load_resources, replace_resources, Database};
use crate::error::StoreResult;
use crate::models::EntityId;

/// One stocked item the school can hand out and take back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Identifier unique within the ledger. The ledger refuses a second
    /// resource with the same id.
    pub id: EntityId,
    /// Display name, e.g. `Projector` or `Room 101`.
    pub name: String,
    /// Free-form category such as `classroom`, `equipment` or `supplies`.
    pub kind: String,
    /// Units currently in stock.
    pub quantity: u32,
    /// Whether at least one unit can be allocated. Kept in step with
    /// `quantity` by every ledger operation that changes stock.
    pub available: bool,
}

impl Resource {
    /// Build a resource; `available` follows from the starting quantity.
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        kind: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
            quantity,
            available: quantity > 0,
        }
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.available = quantity > 0;
    }
}

/// Resources in the order they were added.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResourceLedger {
    resources: Vec<Resource>,
}

impl ResourceLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the last persisted snapshot. A database that never stored any
    /// resources yields an empty ledger.
    pub async fn load(db: &Database) -> StoreResult<Self> {
        let resources = db.run(&[], load_resources).await?;
        debug!(count = resources.len(), "resource ledger loaded");
        Ok(Self { resources })
    }

    /// Replace the stored snapshot with the ledger's current contents. The
    /// write is a single transaction: readers see the old or the new snapshot,
    /// never a mix.
    pub async fn persist(&self, db: &Database) -> StoreResult<()> {
        let resources = self.resources.clone();
        let count = resources.len();
        db.transaction(&[], move |conn| replace_resources(conn, &resources)).await?;
        debug!(count, "resource ledger persisted");
        Ok(())
    }

    /// Append a resource. Returns `false` and leaves the ledger unchanged when
    /// a resource with the same id is already present.
    pub fn add(&mut self, resource: Resource) -> bool {
        if self.get(resource.id).is_some() {
            return false;
        }
        self.resources.push(resource);
        true
    }

    /// Every resource, in insertion order.
    pub fn all(&self) -> &[Resource] {
        &self.resources
    }

    /// Look a resource up by id.
    pub fn get(&self, id: EntityId) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.id == id)
    }

    /// Resources whose category matches `kind` exactly.
    pub fn by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |resource| resource.kind == kind)
    }

    /// Resources with stock left.
    pub fn available(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|resource| resource.available)
    }

    /// Replace the resource with the same id. Returns `false` if unknown.
    /// `available` is recomputed from the new quantity.
    pub fn update(&mut self, mut resource: Resource) -> bool {
        match self.resources.iter_mut().find(|existing| existing.id == resource.id) {
            Some(existing) => {
                resource.available = resource.quantity > 0;
                *existing = resource;
                true
            }
            None => false,
        }
    }

    /// Drop the resource with this id. Returns whether anything was removed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.resources.len();
        self.resources.retain(|resource| resource.id != id);
        self.resources.len() != before
    }

    /// Take `quantity` units. Fails without side effects when the resource is
    /// unknown or short on stock.
    pub fn allocate(&mut self, id: EntityId, quantity: u32) -> bool {
        match self.resources.iter_mut().find(|resource| resource.id == id) {
            Some(resource) if resource.quantity >= quantity => {
                resource.set_quantity(resource.quantity - quantity);
                true
            }
            _ => false,
        }
    }

    /// Return `quantity` units to stock.
    pub fn release(&mut self, id: EntityId, quantity: u32) -> bool {
        match self.resources.iter_mut().find(|resource| resource.id == id) {
            Some(resource) => {
                resource.set_quantity(resource.quantity.saturating_add(quantity));
                true
            }
            None => false,
        }
    }
}
