//! Core library surface for the school manager: an embedded, per-entity-kind
//! document store that keeps relations as ids on disk and hands callers fully
//! resolved entities.
//!
//! The binary uses the same pieces; presentation layers only ever talk to
//! [`School`] and the five stores it owns.
pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod school;
pub mod seed;
pub mod services;

/// Persistence handles and the CRUD contract.
pub use db::{Dao, Database, Entity, Store};

pub use error::{StoreError, StoreResult};

/// Domain types that callers build and receive.
pub use models::{
    Classroom, Course, CourseTemplate, EntityId, EntityKind, Grade, Ref, Student, Teacher,
    UNASSIGNED_ID,
};
pub use services::{Service, ServiceKind};

pub use ledger::{Resource, ResourceLedger};
pub use school::{DanglingReference, School};
pub use seed::{seed_sample_data, SeedReport};
