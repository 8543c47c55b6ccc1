use std::collections::HashSet;

use rusqlite::Connection;

use super::School;
use crate::db::{
    fetch_records, ClassroomRecord, CourseRecord, FlatRecord, GradeRecord, StudentRecord,
    TeacherRecord,
};
use crate::error::StoreResult;
use crate::models::{EntityId, EntityKind};

/// A stored id whose target no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Kind of the record holding the stale id.
    pub owner: EntityKind,
    pub owner_id: EntityId,
    /// Relation field on the owner, named as in the domain model.
    pub field: &'static str,
    /// Kind the stale id was meant to point at.
    pub target: EntityKind,
    pub target_id: EntityId,
    /// Whether reading the owner fails because of this reference.
    pub mandatory: bool,
}

/// The kinds a relation can point at. Classrooms and grades are never the
/// target of a reference, so they have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Student,
    Teacher,
    Course,
}

impl Target {
    fn kind(self) -> EntityKind {
        match self {
            Target::Student => EntityKind::Student,
            Target::Teacher => EntityKind::Teacher,
            Target::Course => EntityKind::Course,
        }
    }
}

/// One relation field to verify: the ids it holds and the ids that exist.
struct Check<'a> {
    owner: (EntityKind, EntityId),
    field: &'static str,
    target: Target,
    known: &'a HashSet<EntityId>,
    mandatory: bool,
}

impl Check<'_> {
    fn run(&self, ids: &[EntityId], found: &mut Vec<DanglingReference>) {
        for &target_id in ids {
            if !self.known.contains(&target_id) {
                found.push(DanglingReference {
                    owner: self.owner.0,
                    owner_id: self.owner.1,
                    field: self.field,
                    target: self.target.kind(),
                    target_id,
                    mandatory: self.mandatory,
                });
            }
        }
    }
}

/// Ids present in each collection that can be the target of a reference.
struct Known {
    students: HashSet<EntityId>,
    teachers: HashSet<EntityId>,
    courses: HashSet<EntityId>,
}

impl Known {
    fn check(
        &self,
        owner: (EntityKind, EntityId),
        field: &'static str,
        target: Target,
        mandatory: bool,
    ) -> Check<'_> {
        let known = match target {
            Target::Student => &self.students,
            Target::Teacher => &self.teachers,
            Target::Course => &self.courses,
        };
        Check {
            owner,
            field,
            target,
            known,
            mandatory,
        }
    }
}

fn ids_of<R: FlatRecord>(records: &[R]) -> HashSet<EntityId> {
    records.iter().map(FlatRecord::id).collect()
}

fn scan(conn: &Connection) -> StoreResult<Vec<DanglingReference>> {
    let students: Vec<StudentRecord> = fetch_records(conn, EntityKind::Student)?;
    let teachers: Vec<TeacherRecord> = fetch_records(conn, EntityKind::Teacher)?;
    let courses: Vec<CourseRecord> = fetch_records(conn, EntityKind::Course)?;
    let classrooms: Vec<ClassroomRecord> = fetch_records(conn, EntityKind::Classroom)?;
    let grades: Vec<GradeRecord> = fetch_records(conn, EntityKind::Grade)?;

    let known = Known {
        students: ids_of(&students),
        teachers: ids_of(&teachers),
        courses: ids_of(&courses),
    };
    let mut found = Vec::new();

    for student in &students {
        let owner = (EntityKind::Student, student.id);
        known
            .check(owner, "courses", Target::Course, false)
            .run(&student.course_ids, &mut found);
    }
    for course in &courses {
        let owner = (EntityKind::Course, course.id);
        let teacher: Vec<EntityId> = course.teacher_id.into_iter().collect();
        known.check(owner, "teacher", Target::Teacher, false).run(&teacher, &mut found);
        known
            .check(owner, "students", Target::Student, false)
            .run(&course.student_ids, &mut found);
    }
    for classroom in &classrooms {
        let owner = (EntityKind::Classroom, classroom.id);
        let teacher: Vec<EntityId> = classroom.main_teacher_id.into_iter().collect();
        known.check(owner, "main_teacher", Target::Teacher, false).run(&teacher, &mut found);
        known
            .check(owner, "students", Target::Student, false)
            .run(&classroom.student_ids, &mut found);
        known
            .check(owner, "courses", Target::Course, false)
            .run(&classroom.course_ids, &mut found);
    }
    for grade in &grades {
        let owner = (EntityKind::Grade, grade.id);
        known
            .check(owner, "student", Target::Student, true)
            .run(&[grade.student_id], &mut found);
        known.check(owner, "course", Target::Course, true).run(&[grade.course_id], &mut found);
    }

    Ok(found)
}

impl School {
    /// Every stored reference whose target has been deleted, across all
    /// collections. Deletes never cascade, so this is how callers find what a
    /// delete left behind.
    pub async fn find_dangling_references(&self) -> StoreResult<Vec<DanglingReference>> {
        self.database().run(&EntityKind::ALL, scan).await
    }
}
