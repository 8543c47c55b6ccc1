//! Domain models handed to and returned from the stores. Relations are held as
//! [`Ref`] values: the stores resolve them on read and flatten them back to
//! bare ids on write, so the types here never need to know how persistence
//! works.
//!
//! The structs are plain data holders with public fields. Callers build them,
//! hand them to a store, and get fresh copies back on every read; nothing here
//! stays linked to the database after the call returns.

use std::fmt;

use chrono::NaiveDate;

use crate::services::Service;

/// Integer identity shared by every entity kind. Unique within one kind only.
pub type EntityId = i64;

/// Ids at or below this value ask the store to assign the next free id.
pub const UNASSIGNED_ID: EntityId = 0;

/// The five kinds of entity the school keeps, one collection each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Student,
    Teacher,
    Course,
    Classroom,
    Grade,
}

impl EntityKind {
    /// Every kind, in the order collections are listed and scanned.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Student,
        EntityKind::Teacher,
        EntityKind::Course,
        EntityKind::Classroom,
        EntityKind::Grade,
    ];

    /// Name of the backing collection. Doubles as the SQLite table name, so it
    /// must stay a plain identifier.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Teacher => "teachers",
            EntityKind::Course => "courses",
            EntityKind::Classroom => "classrooms",
            EntityKind::Grade => "grades",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Student => "student",
            EntityKind::Teacher => "teacher",
            EntityKind::Course => "course",
            EntityKind::Classroom => "classroom",
            EntityKind::Grade => "grade",
        };
        f.write_str(label)
    }
}

/// Anything addressable by an [`EntityId`].
pub trait Identified {
    fn id(&self) -> EntityId;
}

/// A reference from one entity to another.
///
/// Callers building an entity can embed the full target (`Ref::from(teacher)`)
/// or just its id (`Ref::to(3)`); both flatten to the same stored id. Reads
/// produce `Resolved` for targets that exist and `Dangling` for list members
/// whose target has since been deleted. Entities nested inside a resolved
/// reference keep their own references as `Unresolved`.
#[derive(Debug, Clone, PartialEq)]
pub enum Ref<T> {
    Unresolved(EntityId),
    Resolved(Box<T>),
    Dangling(EntityId),
}

impl<T> Ref<T> {
    /// Reference a target by id without loading it.
    pub fn to(id: EntityId) -> Self {
        Ref::Unresolved(id)
    }

    /// The resolved target, if this reference was looked up successfully.
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Ref::Resolved(target) => Some(&**target),
            Ref::Unresolved(_) | Ref::Dangling(_) => None,
        }
    }

    /// True when the target was looked up and found missing.
    pub fn is_dangling(&self) -> bool {
        matches!(self, Ref::Dangling(_))
    }
}

impl<T: Identified> Ref<T> {
    /// Id of the target. Every variant has one, so flattening never fails.
    pub fn id(&self) -> EntityId {
        match self {
            Ref::Unresolved(id) | Ref::Dangling(id) => *id,
            Ref::Resolved(target) => target.id(),
        }
    }
}

impl<T> From<T> for Ref<T> {
    fn from(target: T) -> Self {
        Ref::Resolved(Box::new(target))
    }
}

/// Collect the ids out of a list of references, keeping order.
pub(crate) fn ref_ids<T: Identified>(refs: &[Ref<T>]) -> Vec<EntityId> {
    refs.iter().map(Ref::id).collect()
}

/// A pupil enrolled at the school.
///
/// Enrollment is recorded on both sides: the student lists its courses and
/// each course lists its students. The two lists are written by separate
/// store calls, see [`School::enroll_student_in_course`].
///
/// [`School::enroll_student_in_course`]: crate::School::enroll_student_in_course
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    /// Primary key within the student collection. Use [`UNASSIGNED_ID`] to
    /// let the store pick one on the first save.
    pub id: EntityId,
    /// Full display name.
    pub name: String,
    /// Enrolled courses in enrollment order.
    pub courses: Vec<Ref<Course>>,
    /// Applied services, stored by value alongside the student.
    pub services: Vec<Service>,
}

impl Student {
    /// A student with no courses and no services yet.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            courses: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Whether `course_id` appears in the course list, resolved or not.
    pub fn is_enrolled_in(&self, course_id: EntityId) -> bool {
        self.courses.iter().any(|course| course.id() == course_id)
    }
}

impl Identified for Student {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A member of staff who can be assigned to courses and classrooms.
#[derive(Debug, Clone, PartialEq)]
pub struct Teacher {
    /// Primary key within the teacher collection.
    pub id: EntityId,
    /// Full display name.
    pub name: String,
    /// Subject label such as `Mathematics`. Matched exactly by
    /// [`School::teachers_by_specialization`](crate::School::teachers_by_specialization)
    /// and by the seeder when it pairs courses with teachers.
    pub specialization: String,
    /// Courses whose teacher is this one. Derived from the course collection
    /// on a top-level read and ignored on write; empty when the teacher was
    /// loaded as the target of another entity's reference.
    pub assigned_courses: Vec<Ref<Course>>,
}

impl Teacher {
    /// A teacher with no derived courses; those only appear on reads.
    pub fn new(id: EntityId, name: impl Into<String>, specialization: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            specialization: specialization.into(),
            assigned_courses: Vec::new(),
        }
    }
}

impl Identified for Teacher {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl fmt::Display for Teacher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.specialization)
    }
}

/// A subject taught to a group of students, optionally by one teacher.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    /// Primary key within the course collection.
    pub id: EntityId,
    /// Display name, e.g. `Mathematics` or `Spanish Language`.
    pub name: String,
    /// `None` means the course is unassigned. A teacher deleted after
    /// assignment also reads back as `None`.
    pub teacher: Option<Ref<Teacher>>,
    /// Enrolled students, mirrored by each student's course list. Entries for
    /// deleted students come back as [`Ref::Dangling`].
    pub students: Vec<Ref<Student>>,
}

impl Course {
    /// An unassigned course with nobody enrolled.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            teacher: None,
            students: Vec::new(),
        }
    }

    /// Builder-style teacher assignment. Accepts a full [`Teacher`] or a bare
    /// `Ref::to(id)`; both are stored as the id.
    pub fn with_teacher(mut self, teacher: impl Into<Ref<Teacher>>) -> Self {
        self.teacher = Some(teacher.into());
        self
    }

    /// Build one of the stock courses the school offers.
    pub fn from_template(id: EntityId, template: CourseTemplate) -> Self {
        Self::new(id, template.course_name())
    }

    /// Id of the assigned teacher, if any.
    pub fn teacher_id(&self) -> Option<EntityId> {
        self.teacher.as_ref().map(Ref::id)
    }

    /// Whether `student_id` appears in the student list.
    pub fn has_student(&self, student_id: EntityId) -> bool {
        self.students.iter().any(|student| student.id() == student_id)
    }
}

impl Identified for Course {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Stock course catalogue used by the seeder and by callers that want the
/// canonical names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseTemplate {
    Mathematics,
    Science,
    History,
    Language(String),
    Art,
    PhysicalEducation,
}

impl CourseTemplate {
    /// Canonical course name for the template. Language courses are named
    /// after their language, e.g. `English Language`.
    pub fn course_name(&self) -> String {
        match self {
            CourseTemplate::Mathematics => "Mathematics".to_string(),
            CourseTemplate::Science => "Science".to_string(),
            CourseTemplate::History => "History".to_string(),
            CourseTemplate::Language(language) => format!("{language} Language"),
            CourseTemplate::Art => "Art".to_string(),
            CourseTemplate::PhysicalEducation => "Physical Education".to_string(),
        }
    }
}

/// A physical room with a homeroom teacher, the students seated there and the
/// courses held there.
#[derive(Debug, Clone, PartialEq)]
pub struct Classroom {
    /// Primary key within the classroom collection.
    pub id: EntityId,
    /// Room label shown to users, e.g. `Room 101`.
    pub name: String,
    /// Seat count. Informational only: seating more students than this is
    /// not rejected.
    pub capacity: u32,
    /// Homeroom teacher. Reads back as `None` once that teacher is deleted.
    pub main_teacher: Option<Ref<Teacher>>,
    /// Students seated in the room, in the order they were added.
    pub students: Vec<Ref<Student>>,
    /// Courses scheduled in the room, in the order they were added.
    pub courses: Vec<Ref<Course>>,
}

impl Classroom {
    /// An empty room with no main teacher.
    pub fn new(id: EntityId, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
            main_teacher: None,
            students: Vec::new(),
            courses: Vec::new(),
        }
    }
}

impl Identified for Classroom {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A mark awarded to a student for a course. Both references are mandatory:
/// reading a grade whose student or course is gone is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Grade {
    /// Primary key within the grade collection.
    pub id: EntityId,
    /// Expected within 0..=20; the store does not enforce the range.
    pub value: f64,
    /// What the mark was for, e.g. `Midterm` or `Essay`.
    pub description: String,
    /// Day the mark was awarded. Stored as an ISO-8601 date.
    pub date: NaiveDate,
    /// The student who earned the mark.
    pub student: Ref<Student>,
    /// The course the mark counts towards.
    pub course: Ref<Course>,
}

impl Grade {
    /// Build a grade. Both references accept a full entity or `Ref::to(id)`.
    pub fn new(
        id: EntityId,
        value: f64,
        description: impl Into<String>,
        date: NaiveDate,
        student: impl Into<Ref<Student>>,
        course: impl Into<Ref<Course>>,
    ) -> Self {
        Self {
            id,
            value,
            description: description.into(),
            date,
            student: student.into(),
            course: course.into(),
        }
    }
}

impl Identified for Grade {
    fn id(&self) -> EntityId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_id_is_the_same_for_every_variant() {
        let teacher = Teacher::new(4, "Ada", "Math");
        assert_eq!(Ref::from(teacher).id(), 4);
        assert_eq!(Ref::<Teacher>::to(4).id(), 4);
        assert_eq!(Ref::<Teacher>::Dangling(4).id(), 4);
    }

    #[test]
    fn language_template_names_the_language() {
        let course = Course::from_template(2, CourseTemplate::Language("Spanish".into()));
        assert_eq!(course.name, "Spanish Language");
        assert!(course.teacher.is_none());
    }

    #[test]
    fn enrollment_checks_match_on_id() {
        let mut student = Student::new(1, "Jean");
        student.courses.push(Ref::to(7));
        assert!(student.is_enrolled_in(7));
        assert!(!student.is_enrolled_in(8));
    }
}
