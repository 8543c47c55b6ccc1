use tracing::info;

use super::{require_record, School};
use crate::db::{
    fetch_record, link_id, unlink_id, upsert_record, CourseRecord, Entity, StudentRecord,
};
use crate::error::{StoreError, StoreResult};
use crate::models::{EntityId, EntityKind, Student};
use crate::services::Service;

impl School {
    /// Enroll a student in a course on both sides of the relation.
    ///
    /// The student and the course are written as two independent store
    /// operations, student first. If the second write fails the relation is
    /// left one-sided; use [`School::enroll_student_in_course_atomically`]
    /// when that is not acceptable. Returns `false` when both sides already
    /// had the link.
    pub async fn enroll_student_in_course(
        &self,
        student_id: EntityId,
        course_id: EntityId,
    ) -> StoreResult<bool> {
        let mut student = require_record(&self.students, student_id).await?;
        let mut course = require_record(&self.courses, course_id).await?;

        let student_changed = link_id(&mut student.course_ids, course_id);
        let course_changed = link_id(&mut course.student_ids, student_id);

        if student_changed {
            self.students.put_record(student).await?;
        }
        if course_changed {
            self.courses.put_record(course).await?;
        }

        if student_changed || course_changed {
            info!(student_id, course_id, "student enrolled in course");
        }
        Ok(student_changed || course_changed)
    }

    /// Same outcome as [`School::enroll_student_in_course`], but both records
    /// are written in one transaction.
    pub async fn enroll_student_in_course_atomically(
        &self,
        student_id: EntityId,
        course_id: EntityId,
    ) -> StoreResult<bool> {
        let changed = self
            .database()
            .transaction(&[EntityKind::Student, EntityKind::Course], move |conn| {
                let mut student: StudentRecord =
                    fetch_record(conn, EntityKind::Student, student_id)?.ok_or(
                        StoreError::NotFound {
                            kind: EntityKind::Student,
                            id: student_id,
                        },
                    )?;
                let mut course: CourseRecord = fetch_record(conn, EntityKind::Course, course_id)?
                    .ok_or(StoreError::NotFound {
                        kind: EntityKind::Course,
                        id: course_id,
                    })?;

                let student_changed = link_id(&mut student.course_ids, course_id);
                let course_changed = link_id(&mut course.student_ids, student_id);
                if student_changed {
                    upsert_record(conn, EntityKind::Student, &student)?;
                }
                if course_changed {
                    upsert_record(conn, EntityKind::Course, &course)?;
                }
                Ok(student_changed || course_changed)
            })
            .await?;

        if changed {
            info!(student_id, course_id, "student enrolled in course (transactional)");
        }
        Ok(changed)
    }

    /// Undo an enrollment on both sides, again as two independent writes.
    pub async fn withdraw_student_from_course(
        &self,
        student_id: EntityId,
        course_id: EntityId,
    ) -> StoreResult<bool> {
        let mut student = require_record(&self.students, student_id).await?;
        let mut course = require_record(&self.courses, course_id).await?;

        let student_changed = unlink_id(&mut student.course_ids, course_id);
        let course_changed = unlink_id(&mut course.student_ids, student_id);

        if student_changed {
            self.students.put_record(student).await?;
        }
        if course_changed {
            self.courses.put_record(course).await?;
        }

        if student_changed || course_changed {
            info!(student_id, course_id, "student withdrawn from course");
        }
        Ok(student_changed || course_changed)
    }

    /// Apply a service to a stored student. Returns `false` when the student
    /// already had a service with that id.
    pub async fn add_service_to_student(
        &self,
        student_id: EntityId,
        service: &Service,
    ) -> StoreResult<bool> {
        let mut student = Student::shallow(require_record(&self.students, student_id).await?);
        if !service.apply_to_student(&mut student) {
            return Ok(false);
        }
        self.students.put_record(student.flatten()).await?;
        Ok(true)
    }

    /// Detach the service with the same id from a stored student. Returns
    /// `false` when the student never had it.
    pub async fn remove_service_from_student(
        &self,
        student_id: EntityId,
        service: &Service,
    ) -> StoreResult<bool> {
        let mut student = Student::shallow(require_record(&self.students, student_id).await?);
        if !service.remove_from_student(&mut student) {
            return Ok(false);
        }
        self.students.put_record(student.flatten()).await?;
        Ok(true)
    }
}
