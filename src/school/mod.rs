//! The school as a whole: one store per entity kind plus the workflows that
//! touch more than one of them.
//!
//! Workflows that change relations edit the flat records directly. Going
//! through resolved entities would turn a dangling optional reference into
//! `None` and silently erase it on the next write.

mod classrooms;
mod enrollment;
mod grading;
mod integrity;

pub use integrity::DanglingReference;

use crate::db::{Dao, Database, Entity, Store};
use crate::error::{StoreError, StoreResult};
use crate::models::{Classroom, Course, EntityId, Grade, Student, Teacher};

/// Entry point for everything the school stores.
///
/// Each field is the store for one entity kind and offers the plain CRUD
/// contract through [`Dao`]. The methods on `School` itself are the
/// workflows that need more than one store, such as enrollment or the
/// dangling-reference scan. Cloning is cheap and every clone shares the same
/// database handle, so a `School` can be moved into spawned tasks freely.
#[derive(Clone)]
pub struct School {
    db: Database,
    pub students: Store<Student>,
    pub teachers: Store<Teacher>,
    pub courses: Store<Course>,
    pub classrooms: Store<Classroom>,
    pub grades: Store<Grade>,
}

impl School {
    /// Build the five stores on top of one database handle. Collections are
    /// created lazily, so this does no I/O.
    pub fn new(db: Database) -> Self {
        Self {
            students: Store::new(db.clone()),
            teachers: Store::new(db.clone()),
            courses: Store::new(db.clone()),
            classrooms: Store::new(db.clone()),
            grades: Store::new(db.clone()),
            db,
        }
    }

    /// The shared handle, for work that spans collections in one transaction.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Courses currently taught by the given teacher.
    pub async fn courses_by_teacher(&self, teacher_id: EntityId) -> StoreResult<Vec<Course>> {
        let courses = self.courses.get_all().await?;
        Ok(courses
            .into_iter()
            .filter(|course| course.teacher_id() == Some(teacher_id))
            .collect())
    }

    /// Teachers whose specialization matches exactly, in insertion order.
    pub async fn teachers_by_specialization(
        &self,
        specialization: &str,
    ) -> StoreResult<Vec<Teacher>> {
        let teachers = self.teachers.get_all().await?;
        Ok(teachers
            .into_iter()
            .filter(|teacher| teacher.specialization == specialization)
            .collect())
    }

    /// Point a course at a teacher, replacing any previous assignment. The
    /// teacher must exist at the time of the call.
    pub async fn assign_teacher_to_course(
        &self,
        course_id: EntityId,
        teacher_id: EntityId,
    ) -> StoreResult<()> {
        require_record(&self.teachers, teacher_id).await?;
        let mut course = require_record(&self.courses, course_id).await?;
        course.teacher_id = Some(teacher_id);
        self.courses.put_record(course).await
    }
}

/// Flat record for `id`, or `NotFound`.
async fn require_record<E: Entity>(store: &Store<E>, id: EntityId) -> StoreResult<E::Record> {
    store
        .get_record(id)
        .await?
        .ok_or(StoreError::NotFound { kind: E::KIND, id })
}
