//! Per-kind mapping between domain entities and their flat records.
//!
//! Writes go through [`Entity::flatten`], which replaces every reference with
//! its id. Reads go through [`Entity::resolve`], which looks each id up once.
//! Targets of those lookups are built with [`Entity::shallow`], leaving their
//! own references as ids; that single level of depth is what keeps
//! student/course graphs finite.

use rusqlite::Connection;

use crate::db::collection::fetch_records;
use crate::db::records::{
    ClassroomRecord, CourseRecord, FlatRecord, GradeRecord, StudentRecord, TeacherRecord,
};
use crate::db::resolve::{resolve_many, resolve_mandatory, resolve_optional, Owner};
use crate::error::StoreResult;
use crate::models::{
    ref_ids, Classroom, Course, EntityId, EntityKind, Grade, Identified, Ref, Student, Teacher,
};

/// Ties a domain type to its flat record and its collection.
pub trait Entity: Identified + Clone + Send + Sync + 'static {
    /// Collection this kind is stored in.
    const KIND: EntityKind;

    /// Every collection a top-level read of this kind can touch.
    const READS: &'static [EntityKind];

    /// Persisted, id-only shape of the entity.
    type Record: FlatRecord;

    /// Replace every reference with its id. Derived fields are dropped.
    fn flatten(&self) -> Self::Record;

    /// Rebuild the entity without touching other collections: references
    /// become [`Ref::Unresolved`] and derived fields stay empty.
    fn shallow(record: Self::Record) -> Self;

    /// Rebuild the entity with one level of references looked up, applying
    /// each relation's dangling policy.
    fn resolve(conn: &Connection, record: Self::Record) -> StoreResult<Self>;
}

fn unresolved<T>(ids: Vec<EntityId>) -> Vec<Ref<T>> {
    ids.into_iter().map(Ref::to).collect()
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;
    const READS: &'static [EntityKind] = &[EntityKind::Student, EntityKind::Course];
    type Record = StudentRecord;

    fn flatten(&self) -> StudentRecord {
        StudentRecord {
            id: self.id,
            name: self.name.clone(),
            course_ids: ref_ids(&self.courses),
            services: self.services.clone(),
        }
    }

    fn shallow(record: StudentRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            courses: unresolved(record.course_ids),
            services: record.services,
        }
    }

    fn resolve(conn: &Connection, record: StudentRecord) -> StoreResult<Self> {
        let owner = Owner::new(Self::KIND, record.id);
        let courses = resolve_many(conn, owner, "courses", &record.course_ids)?;
        Ok(Self {
            id: record.id,
            name: record.name,
            courses,
            services: record.services,
        })
    }
}

impl Entity for Teacher {
    const KIND: EntityKind = EntityKind::Teacher;
    const READS: &'static [EntityKind] = &[EntityKind::Teacher, EntityKind::Course];
    type Record = TeacherRecord;

    fn flatten(&self) -> TeacherRecord {
        TeacherRecord {
            id: self.id,
            name: self.name.clone(),
            specialization: self.specialization.clone(),
        }
    }

    fn shallow(record: TeacherRecord) -> Self {
        Self::new(record.id, record.name, record.specialization)
    }

    fn resolve(conn: &Connection, record: TeacherRecord) -> StoreResult<Self> {
        let assigned_courses = fetch_records::<CourseRecord>(conn, EntityKind::Course)?
            .into_iter()
            .filter(|course| course.teacher_id == Some(record.id))
            .map(|course| Ref::from(Course::shallow(course)))
            .collect();

        let mut teacher = Self::shallow(record);
        teacher.assigned_courses = assigned_courses;
        Ok(teacher)
    }
}

impl Entity for Course {
    const KIND: EntityKind = EntityKind::Course;
    const READS: &'static [EntityKind] =
        &[EntityKind::Course, EntityKind::Teacher, EntityKind::Student];
    type Record = CourseRecord;

    fn flatten(&self) -> CourseRecord {
        CourseRecord {
            id: self.id,
            name: self.name.clone(),
            teacher_id: self.teacher_id(),
            student_ids: ref_ids(&self.students),
        }
    }

    fn shallow(record: CourseRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            teacher: record.teacher_id.map(Ref::to),
            students: unresolved(record.student_ids),
        }
    }

    fn resolve(conn: &Connection, record: CourseRecord) -> StoreResult<Self> {
        let owner = Owner::new(Self::KIND, record.id);
        let teacher = resolve_optional(conn, owner, "teacher", record.teacher_id)?;
        let students = resolve_many(conn, owner, "students", &record.student_ids)?;
        Ok(Self {
            id: record.id,
            name: record.name,
            teacher,
            students,
        })
    }
}

impl Entity for Classroom {
    const KIND: EntityKind = EntityKind::Classroom;
    const READS: &'static [EntityKind] = &[
        EntityKind::Classroom,
        EntityKind::Teacher,
        EntityKind::Student,
        EntityKind::Course,
    ];
    type Record = ClassroomRecord;

    fn flatten(&self) -> ClassroomRecord {
        ClassroomRecord {
            id: self.id,
            name: self.name.clone(),
            capacity: self.capacity,
            main_teacher_id: self.main_teacher.as_ref().map(Ref::id),
            student_ids: ref_ids(&self.students),
            course_ids: ref_ids(&self.courses),
        }
    }

    fn shallow(record: ClassroomRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            capacity: record.capacity,
            main_teacher: record.main_teacher_id.map(Ref::to),
            students: unresolved(record.student_ids),
            courses: unresolved(record.course_ids),
        }
    }

    fn resolve(conn: &Connection, record: ClassroomRecord) -> StoreResult<Self> {
        let owner = Owner::new(Self::KIND, record.id);
        let main_teacher = resolve_optional(conn, owner, "main_teacher", record.main_teacher_id)?;
        let students = resolve_many(conn, owner, "students", &record.student_ids)?;
        let courses = resolve_many(conn, owner, "courses", &record.course_ids)?;
        Ok(Self {
            id: record.id,
            name: record.name,
            capacity: record.capacity,
            main_teacher,
            students,
            courses,
        })
    }
}

impl Entity for Grade {
    const KIND: EntityKind = EntityKind::Grade;
    const READS: &'static [EntityKind] =
        &[EntityKind::Grade, EntityKind::Student, EntityKind::Course];
    type Record = GradeRecord;

    fn flatten(&self) -> GradeRecord {
        GradeRecord {
            id: self.id,
            value: self.value,
            description: self.description.clone(),
            date: self.date,
            student_id: self.student.id(),
            course_id: self.course.id(),
        }
    }

    fn shallow(record: GradeRecord) -> Self {
        Self {
            id: record.id,
            value: record.value,
            description: record.description,
            date: record.date,
            student: Ref::to(record.student_id),
            course: Ref::to(record.course_id),
        }
    }

    fn resolve(conn: &Connection, record: GradeRecord) -> StoreResult<Self> {
        let owner = Owner::new(Self::KIND, record.id);
        let student = resolve_mandatory(conn, owner, "student", record.student_id)?;
        let course = resolve_mandatory(conn, owner, "course", record.course_id)?;
        Ok(Self {
            id: record.id,
            value: record.value,
            description: record.description,
            date: record.date,
            student,
            course,
        })
    }
}
