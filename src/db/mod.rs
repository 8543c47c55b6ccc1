//! Persistence module split across logical submodules. Everything that knows
//! about SQL lives below this point; the rest of the crate sees typed records,
//! the [`Entity`] mapping and the per-kind [`Store`].

mod collection;
mod connection;
mod mapping;
mod records;
mod resolve;
mod resources;
mod store;

pub(crate) use collection::{fetch_record, fetch_records, upsert_record};
pub use connection::Database;
pub use mapping::Entity;
pub(crate) use records::{link_id, unlink_id};
pub use records::{
    ClassroomRecord, CourseRecord, FlatRecord, GradeRecord, StudentRecord, TeacherRecord,
};
pub(crate) use resources::{load_resources, replace_resources};
pub use store::{Dao, Store};
