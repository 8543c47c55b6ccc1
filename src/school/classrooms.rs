use super::{require_record, School};
use crate::db::link_id;
use crate::error::StoreResult;
use crate::models::EntityId;

impl School {
    /// Make `teacher_id` the classroom's main teacher.
    pub async fn assign_teacher_to_classroom(
        &self,
        classroom_id: EntityId,
        teacher_id: EntityId,
    ) -> StoreResult<()> {
        require_record(&self.teachers, teacher_id).await?;
        let mut classroom = require_record(&self.classrooms, classroom_id).await?;
        classroom.main_teacher_id = Some(teacher_id);
        self.classrooms.put_record(classroom).await
    }

    /// Seat a student in the classroom. Returns `false` if already seated.
    pub async fn add_student_to_classroom(
        &self,
        classroom_id: EntityId,
        student_id: EntityId,
    ) -> StoreResult<bool> {
        require_record(&self.students, student_id).await?;
        let mut classroom = require_record(&self.classrooms, classroom_id).await?;
        if !link_id(&mut classroom.student_ids, student_id) {
            return Ok(false);
        }
        self.classrooms.put_record(classroom).await?;
        Ok(true)
    }

    /// Schedule a course in the classroom. Returns `false` if already there.
    pub async fn add_course_to_classroom(
        &self,
        classroom_id: EntityId,
        course_id: EntityId,
    ) -> StoreResult<bool> {
        require_record(&self.courses, course_id).await?;
        let mut classroom = require_record(&self.classrooms, classroom_id).await?;
        if !link_id(&mut classroom.course_ids, course_id) {
            return Ok(false);
        }
        self.classrooms.put_record(classroom).await?;
        Ok(true)
    }
}
