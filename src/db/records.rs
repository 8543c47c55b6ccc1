//! Persisted shapes of each entity. Relations are stored as ids only, never as
//! nested entity bodies, so no stored document can contain a cycle.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::EntityId;
use crate::services::Service;

/// A flat record keyed by integer id.
pub trait FlatRecord: Serialize + DeserializeOwned + Send + 'static {
    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);
}

macro_rules! flat_record {
    ($($record:ty),+ $(,)?) => {
        $(
            impl FlatRecord for $record {
                fn id(&self) -> EntityId {
                    self.id
                }

                fn set_id(&mut self, id: EntityId) {
                    self.id = id;
                }
            }
        )+
    };
}

flat_record!(
    StudentRecord,
    TeacherRecord,
    CourseRecord,
    ClassroomRecord,
    GradeRecord,
);

/// Stored form of a [`Student`](crate::Student). Services are kept inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub course_ids: Vec<EntityId>,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// Stored form of a [`Teacher`](crate::Teacher). Assigned courses are derived
/// from course records on read, so they have no field here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub id: EntityId,
    pub name: String,
    pub specialization: String,
}

/// Stored form of a [`Course`](crate::Course).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub teacher_id: Option<EntityId>,
    #[serde(default)]
    pub student_ids: Vec<EntityId>,
}

/// Stored form of a [`Classroom`](crate::Classroom).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassroomRecord {
    pub id: EntityId,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub main_teacher_id: Option<EntityId>,
    #[serde(default)]
    pub student_ids: Vec<EntityId>,
    #[serde(default)]
    pub course_ids: Vec<EntityId>,
}

/// Stored form of a [`Grade`](crate::Grade). Both ids are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: EntityId,
    pub value: f64,
    pub description: String,
    pub date: NaiveDate,
    pub student_id: EntityId,
    pub course_id: EntityId,
}

/// Append `id` unless it is already present. Returns whether the list grew.
pub(crate) fn link_id(ids: &mut Vec<EntityId>, id: EntityId) -> bool {
    if ids.contains(&id) {
        return false;
    }
    ids.push(id);
    true
}

/// Drop every occurrence of `id`. Returns whether the list shrank.
pub(crate) fn unlink_id(ids: &mut Vec<EntityId>, id: EntityId) -> bool {
    let before = ids.len();
    ids.retain(|existing| *existing != id);
    ids.len() != before
}
