use super::School;
use crate::db::Dao;
use crate::error::StoreResult;
use crate::models::{EntityId, Grade};

/// Mean of the grade values; 0.0 when there are none.
pub(crate) fn average(grades: &[Grade]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    grades.iter().map(|grade| grade.value).sum::<f64>() / grades.len() as f64
}

impl School {
    /// Every grade awarded to the student, in insertion order. Fails like
    /// `grades.get_all()` when any stored grade has a dangling reference.
    pub async fn grades_for_student(&self, student_id: EntityId) -> StoreResult<Vec<Grade>> {
        let grades = self.grades.get_all().await?;
        Ok(grades
            .into_iter()
            .filter(|grade| grade.student.id() == student_id)
            .collect())
    }

    /// Every grade recorded for the course, in insertion order.
    pub async fn grades_for_course(&self, course_id: EntityId) -> StoreResult<Vec<Grade>> {
        let grades = self.grades.get_all().await?;
        Ok(grades
            .into_iter()
            .filter(|grade| grade.course.id() == course_id)
            .collect())
    }

    /// Mean grade value for the student across all courses, or 0.0 when
    /// the student has no grades (including unknown ids).
    pub async fn student_average(&self, student_id: EntityId) -> StoreResult<f64> {
        Ok(average(&self.grades_for_student(student_id).await?))
    }

    /// Mean grade value for the course across all students, or 0.0 when
    /// nothing has been graded yet.
    pub async fn course_average(&self, course_id: EntityId) -> StoreResult<f64> {
        Ok(average(&self.grades_for_course(course_id).await?))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::Ref;

    fn grade(value: f64) -> Grade {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        Grade::new(1, value, "Quiz", date, Ref::to(1), Ref::to(1))
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn average_is_the_arithmetic_mean() {
        assert_eq!(average(&[grade(12.0), grade(15.0), grade(18.0)]), 15.0);
    }
}
