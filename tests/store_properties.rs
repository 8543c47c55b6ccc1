//! Behaviour of the per-kind stores: upsert, resolution, dangling references
//! and deletes without cascade.

use chrono::NaiveDate;
use school_manager::{
    Course, Dao, Database, Grade, Ref, School, Service, StoreError, Student, Teacher,
    UNASSIGNED_ID,
};

fn school() -> School {
    School::new(Database::open_in_memory().expect("open in-memory database"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[tokio::test]
async fn saving_twice_keeps_one_record_with_latest_values() {
    let school = school();
    let mut teacher = Teacher::new(1, "A", "Math");

    school.teachers.save(&teacher).await.unwrap();
    teacher.specialization = "Physics".to_string();
    school.teachers.save(&teacher).await.unwrap();

    let all = school.teachers.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].specialization, "Physics");
}

#[tokio::test]
async fn update_behaves_like_save_for_new_ids() {
    let school = school();
    let id = school.students.update(&Student::new(4, "Sophie")).await.unwrap();
    assert_eq!(id, 4);
    assert_eq!(school.students.count().await.unwrap(), 1);
}

#[tokio::test]
async fn course_teacher_resolves_to_the_stored_teacher() {
    let school = school();
    let teacher = Teacher::new(1, "A", "Math");
    school.teachers.save(&teacher).await.unwrap();
    school
        .courses
        .save(&Course::new(1, "Algebra").with_teacher(Ref::to(1)))
        .await
        .unwrap();

    let course = school.courses.get_by_id(1).await.unwrap().expect("course stored");
    assert_eq!(course.id, 1);
    assert_eq!(course.name, "Algebra");
    let resolved = course
        .teacher
        .as_ref()
        .and_then(|teacher| teacher.resolved())
        .expect("teacher resolved, not a bare id");
    assert_eq!(resolved, &teacher);
}

#[tokio::test]
async fn deleted_teacher_reads_back_as_unassigned() {
    let school = school();
    school.teachers.save(&Teacher::new(1, "A", "Math")).await.unwrap();
    school
        .courses
        .save(&Course::new(1, "Algebra").with_teacher(Ref::to(1)))
        .await
        .unwrap();

    school.teachers.delete(1).await.unwrap();

    let course = school.courses.get_by_id(1).await.unwrap().expect("course survives");
    assert_eq!(course.teacher, None);
}

#[tokio::test]
async fn grade_read_fails_once_its_student_is_gone() {
    let school = school();
    let student = Student::new(1, "Jean");
    let course = Course::new(1, "History");
    school.students.save(&student).await.unwrap();
    school.courses.save(&course).await.unwrap();
    school
        .grades
        .save(&Grade::new(1, 16.0, "Essay", date(2024, 2, 10), student, course))
        .await
        .unwrap();
    assert!(school.grades.get_by_id(1).await.unwrap().is_some());

    school.students.delete(1).await.unwrap();

    let err = school.grades.get_by_id(1).await.unwrap_err();
    match err {
        StoreError::DanglingMandatoryReference {
            field, target_id, ..
        } => {
            assert_eq!(field, "student");
            assert_eq!(target_id, 1);
        }
        other => panic!("expected a dangling reference error, got {other:?}"),
    }
    assert!(school.grades.get_all().await.is_err());
}

#[tokio::test]
async fn deleting_a_student_does_not_cascade_into_courses() {
    let school = school();
    school.students.save(&Student::new(1, "Jean")).await.unwrap();
    school.courses.save(&Course::new(1, "Algebra")).await.unwrap();
    school.enroll_student_in_course(1, 1).await.unwrap();

    school.students.delete(1).await.unwrap();

    let course = school.courses.get_by_id(1).await.unwrap().expect("course survives");
    assert_eq!(course.students, vec![Ref::Dangling(1)]);

    // re-saving the course keeps the dangling id on disk
    school.courses.save(&course).await.unwrap();
    let again = school.courses.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(again.students, vec![Ref::Dangling(1)]);
}

#[tokio::test]
async fn missing_ids_are_none_not_errors() {
    let school = school();
    assert!(school.classrooms.get_by_id(99).await.unwrap().is_none());
    school.classrooms.delete(99).await.unwrap();
}

#[tokio::test]
async fn store_assigns_ids_after_the_highest_one() {
    let school = school();
    assert_eq!(school.students.next_id().await.unwrap(), 1);
    school.students.save(&Student::new(7, "Paul")).await.unwrap();

    let id = school
        .students
        .save(&Student::new(UNASSIGNED_ID, "Marie"))
        .await
        .unwrap();
    assert_eq!(id, 8);
    assert_eq!(school.students.next_id().await.unwrap(), 9);
}

#[tokio::test]
async fn get_all_keeps_insertion_order_across_updates() {
    let school = school();
    for (id, name) in [(3, "C"), (1, "A"), (2, "B")] {
        school.teachers.save(&Teacher::new(id, name, "Art")).await.unwrap();
    }
    school.teachers.update(&Teacher::new(3, "C2", "Art")).await.unwrap();

    let ids: Vec<_> = school
        .teachers
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|teacher| teacher.id)
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[tokio::test]
async fn teacher_courses_are_derived_from_course_records() {
    let school = school();
    school.teachers.save(&Teacher::new(1, "A", "Math")).await.unwrap();
    school
        .courses
        .save(&Course::new(1, "Algebra").with_teacher(Ref::to(1)))
        .await
        .unwrap();
    school
        .courses
        .save(&Course::new(2, "Geometry").with_teacher(Ref::to(1)))
        .await
        .unwrap();
    school.courses.save(&Course::new(3, "Art")).await.unwrap();

    let teacher = school.teachers.get_by_id(1).await.unwrap().unwrap();
    let names: Vec<_> = teacher
        .assigned_courses
        .iter()
        .filter_map(|course| course.resolved())
        .map(|course| course.name.as_str())
        .collect();
    assert_eq!(names, ["Algebra", "Geometry"]);
}

#[tokio::test]
async fn student_services_survive_a_round_trip() {
    let school = school();
    let mut student = Student::new(1, "Lucas");
    student.services.push(Service::tutoring(1, "Math", 6));
    student.services.push(Service::arts(2, "Theatre", "beginner"));
    school.students.save(&student).await.unwrap();

    let stored = school.students.get_by_id(1).await.unwrap().unwrap();
    assert_eq!(stored.services, student.services);
}

#[tokio::test]
async fn nested_references_stay_as_ids() {
    let school = school();
    school.teachers.save(&Teacher::new(1, "A", "Math")).await.unwrap();
    school
        .courses
        .save(&Course::new(1, "Algebra").with_teacher(Ref::to(1)))
        .await
        .unwrap();
    school.students.save(&Student::new(1, "Jean")).await.unwrap();
    school.enroll_student_in_course(1, 1).await.unwrap();

    let student = school.students.get_by_id(1).await.unwrap().unwrap();
    let course = student.courses[0].resolved().expect("course resolved");
    assert_eq!(course.teacher, Some(Ref::to(1)));
    assert_eq!(course.students, vec![Ref::to(1)]);
}

#[tokio::test]
async fn grade_read_fails_once_its_course_is_gone() {
    let school = school();
    school.students.save(&Student::new(1, "Jean")).await.unwrap();
    school.courses.save(&Course::new(1, "History")).await.unwrap();
    school
        .grades
        .save(&Grade::new(1, 9.5, "Oral", date(2024, 4, 2), Ref::to(1), Ref::to(1)))
        .await
        .unwrap();

    school.courses.delete(1).await.unwrap();

    let err = school.grades.get_by_id(1).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::DanglingMandatoryReference {
            field: "course",
            target_id: 1,
            ..
        }
    ));
    assert_eq!(err.to_string(), "grade 1 references missing course 1 through `course`");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_of_new_students_get_distinct_ids() {
    let school = school();

    let mut handles = Vec::new();
    for n in 0..50 {
        let school = school.clone();
        handles.push(tokio::spawn(async move {
            school
                .students
                .save(&Student::new(UNASSIGNED_ID, format!("Student {n}")))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.expect("save task").expect("save succeeds"));
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids, (1..=50).collect::<Vec<_>>());
    assert_eq!(school.students.count().await.unwrap(), 50);
}
