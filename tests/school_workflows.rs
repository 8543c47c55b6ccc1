//! Workflows spanning several collections, seeding, and persistence across
//! reopening the database file.

use chrono::NaiveDate;
use school_manager::{
    seed_sample_data, Classroom, Course, Dao, Database, EntityKind, Grade, Ref, School, Service,
    StoreError, Student, Teacher,
};
use tempfile::tempdir;

fn school() -> School {
    School::new(Database::open_in_memory().expect("open in-memory database"))
}

async fn two_students_and_a_course(school: &School) {
    school.students.save(&Student::new(1, "Jean")).await.unwrap();
    school.students.save(&Student::new(2, "Marie")).await.unwrap();
    school.courses.save(&Course::new(1, "Algebra")).await.unwrap();
}

#[tokio::test]
async fn enrollment_updates_both_sides_only_for_that_student() {
    let school = school();
    two_students_and_a_course(&school).await;

    assert!(school.enroll_student_in_course(1, 1).await.unwrap());

    let students = school.students.get_all().await.unwrap();
    let jean = students.iter().find(|s| s.id == 1).unwrap();
    let marie = students.iter().find(|s| s.id == 2).unwrap();
    assert_eq!(jean.courses.len(), 1);
    assert_eq!(jean.courses[0].resolved().map(|c| c.name.as_str()), Some("Algebra"));
    assert!(marie.courses.is_empty());

    let courses = school.courses.get_all().await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].students.len(), 1);
    assert_eq!(courses[0].students[0].resolved().map(|s| s.name.as_str()), Some("Jean"));
}

#[tokio::test]
async fn enrolling_twice_reports_no_change() {
    let school = school();
    two_students_and_a_course(&school).await;

    assert!(school.enroll_student_in_course(1, 1).await.unwrap());
    assert!(!school.enroll_student_in_course(1, 1).await.unwrap());
    assert!(!school.enroll_student_in_course_atomically(1, 1).await.unwrap());

    let course = school.courses.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(course.students.len(), 1);
}

#[tokio::test]
async fn transactional_enrollment_writes_nothing_on_missing_course() {
    let school = school();
    two_students_and_a_course(&school).await;

    let err = school
        .enroll_student_in_course_atomically(2, 42)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Course,
            id: 42
        }
    ));
    let marie = school.students.get_by_id(2).await.unwrap().unwrap();
    assert!(marie.courses.is_empty());

    assert!(school.enroll_student_in_course_atomically(2, 1).await.unwrap());
    let course = school.courses.get_by_id(1).await.unwrap().unwrap();
    assert!(course.has_student(2));
}

#[tokio::test]
async fn withdrawal_removes_both_sides() {
    let school = school();
    two_students_and_a_course(&school).await;
    school.enroll_student_in_course(1, 1).await.unwrap();

    assert!(school.withdraw_student_from_course(1, 1).await.unwrap());
    assert!(!school.withdraw_student_from_course(1, 1).await.unwrap());

    let jean = school.students.get_by_id(1).await.unwrap().unwrap();
    let course = school.courses.get_by_id(1).await.unwrap().unwrap();
    assert!(jean.courses.is_empty());
    assert!(course.students.is_empty());
}

#[tokio::test]
async fn enrolling_a_missing_student_is_not_found() {
    let school = school();
    school.courses.save(&Course::new(1, "Algebra")).await.unwrap();
    let err = school.enroll_student_in_course(5, 1).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            kind: EntityKind::Student,
            id: 5
        }
    ));
}

#[tokio::test]
async fn services_are_applied_once_and_removable() {
    let school = school();
    school.students.save(&Student::new(1, "Paul")).await.unwrap();
    let football = Service::sports(1, "Football", 10);

    assert!(school.add_service_to_student(1, &football).await.unwrap());
    assert!(!school.add_service_to_student(1, &football).await.unwrap());
    let paul = school.students.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(paul.services, vec![football.clone()]);

    assert!(school.remove_service_from_student(1, &football).await.unwrap());
    let paul = school.students.get_by_id(1).await.unwrap().unwrap();
    assert!(paul.services.is_empty());
}

#[tokio::test]
async fn teacher_queries_filter_courses_and_specializations() {
    let school = school();
    school.teachers.save(&Teacher::new(1, "A", "Math")).await.unwrap();
    school.teachers.save(&Teacher::new(2, "B", "History")).await.unwrap();
    school.courses.save(&Course::new(1, "Algebra")).await.unwrap();
    school.courses.save(&Course::new(2, "Rome")).await.unwrap();

    school.assign_teacher_to_course(1, 1).await.unwrap();
    school.assign_teacher_to_course(2, 2).await.unwrap();

    let math: Vec<_> = school
        .courses_by_teacher(1)
        .await
        .unwrap()
        .into_iter()
        .map(|course| course.name)
        .collect();
    assert_eq!(math, ["Algebra"]);

    let historians = school.teachers_by_specialization("History").await.unwrap();
    assert_eq!(historians.len(), 1);
    assert_eq!(historians[0].name, "B");

    let err = school.assign_teacher_to_course(1, 9).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: EntityKind::Teacher, .. }));
}

#[tokio::test]
async fn classroom_membership_is_idempotent() {
    let school = school();
    two_students_and_a_course(&school).await;
    school.teachers.save(&Teacher::new(1, "A", "Math")).await.unwrap();
    school.classrooms.save(&Classroom::new(1, "Room 101", 30)).await.unwrap();

    school.assign_teacher_to_classroom(1, 1).await.unwrap();
    assert!(school.add_student_to_classroom(1, 1).await.unwrap());
    assert!(!school.add_student_to_classroom(1, 1).await.unwrap());
    assert!(school.add_course_to_classroom(1, 1).await.unwrap());

    let room = school.classrooms.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(room.capacity, 30);
    assert_eq!(room.main_teacher.as_ref().map(Ref::id), Some(1));
    assert_eq!(room.students.len(), 1);
    assert_eq!(room.courses.len(), 1);
    assert!(room.students[0].resolved().is_some());
}

#[tokio::test]
async fn averages_cover_only_matching_grades() {
    let school = school();
    two_students_and_a_course(&school).await;
    school.courses.save(&Course::new(2, "Physics")).await.unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

    for (id, value, student, course) in [(1, 12.0, 1, 1), (2, 18.0, 1, 2), (3, 8.0, 2, 1)] {
        let grade = Grade::new(id, value, "Test", day, Ref::to(student), Ref::to(course));
        school.grades.save(&grade).await.unwrap();
    }

    assert_eq!(school.student_average(1).await.unwrap(), 15.0);
    assert_eq!(school.course_average(1).await.unwrap(), 10.0);
    assert_eq!(school.student_average(99).await.unwrap(), 0.0);
    assert_eq!(school.grades_for_course(2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn integrity_scan_lists_what_deletes_left_behind() {
    let school = school();
    two_students_and_a_course(&school).await;
    school.teachers.save(&Teacher::new(1, "A", "Math")).await.unwrap();
    school.assign_teacher_to_course(1, 1).await.unwrap();
    school.enroll_student_in_course(1, 1).await.unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
    school
        .grades
        .save(&Grade::new(1, 11.0, "Quiz", day, Ref::to(1), Ref::to(1)))
        .await
        .unwrap();
    assert!(school.find_dangling_references().await.unwrap().is_empty());

    school.teachers.delete(1).await.unwrap();
    school.students.delete(1).await.unwrap();

    let dangling = school.find_dangling_references().await.unwrap();
    let summary: Vec<_> = dangling
        .iter()
        .map(|d| (d.owner, d.field, d.target_id, d.mandatory))
        .collect();
    assert_eq!(
        summary,
        vec![
            (EntityKind::Course, "teacher", 1, false),
            (EntityKind::Course, "students", 1, false),
            (EntityKind::Grade, "student", 1, true),
        ]
    );
}

#[tokio::test]
async fn seeding_fills_empty_collections_once() {
    let school = school();

    let first = seed_sample_data(&school).await.unwrap();
    assert_eq!((first.teachers, first.courses, first.students), (5, 5, 5));

    let second = seed_sample_data(&school).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(school.students.count().await.unwrap(), 5);

    let maths = school.courses.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(maths.name, "Mathematics");
    let teacher = maths.teacher.as_ref().and_then(|t| t.resolved()).unwrap();
    assert_eq!(teacher.specialization, "Mathematics");
}

#[tokio::test]
async fn records_persist_across_reopening_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("school.sqlite");

    {
        let school = School::new(Database::open(&path).unwrap());
        school.teachers.save(&Teacher::new(1, "A", "Math")).await.unwrap();
        school
            .courses
            .save(&Course::new(1, "Algebra").with_teacher(Ref::to(1)))
            .await
            .unwrap();
    }

    let school = School::new(Database::open(&path).unwrap());
    let course = school.courses.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(
        course.teacher.as_ref().and_then(|t| t.resolved()).map(|t| t.name.as_str()),
        Some("A")
    );
}
