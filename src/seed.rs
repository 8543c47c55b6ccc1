//! First-run sample data. Each collection is only filled when it is empty, so
//! running the seeder on every start is harmless.

use tracing::info;

use crate::db::Dao;
use crate::error::StoreResult;
use crate::models::{Course, CourseTemplate, Student, Teacher, UNASSIGNED_ID};
use crate::school::School;

const SAMPLE_TEACHERS: &[(&str, &str)] = &[
    ("Alexandre Martin", "Mathematics"),
    ("Emilie Dubois", "French"),
    ("Thomas Laurent", "History"),
    ("Camille Robert", "Physics"),
    ("Nicolas Bernard", "English"),
];

const SAMPLE_STUDENTS: &[&str] = &[
    "Jean Dupont",
    "Marie Durand",
    "Paul Martin",
    "Sophie Petit",
    "Lucas Bernard",
];

/// How many records each collection received.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Sample teachers saved; zero when the collection already had data.
    pub teachers: usize,
    /// Sample courses saved, one per stock template.
    pub courses: usize,
    /// Sample students saved.
    pub students: usize,
}

impl SeedReport {
    /// True when every collection was already populated.
    pub fn is_empty(&self) -> bool {
        self.teachers == 0 && self.courses == 0 && self.students == 0
    }
}

/// Fill empty collections with sample records, letting the stores assign ids.
pub async fn seed_sample_data(school: &School) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();

    if school.teachers.is_empty().await? {
        for (name, specialization) in SAMPLE_TEACHERS {
            school
                .teachers
                .save(&Teacher::new(UNASSIGNED_ID, *name, *specialization))
                .await?;
            report.teachers += 1;
        }
    }

    if school.courses.is_empty().await? {
        let teachers = school.teachers.get_all().await?;
        let find = |specialization: &str| {
            teachers
                .iter()
                .find(|teacher| teacher.specialization == specialization)
                .cloned()
        };

        let catalogue = [
            (CourseTemplate::Mathematics, find("Mathematics")),
            (CourseTemplate::Science, find("Physics")),
            (CourseTemplate::History, find("History")),
            (CourseTemplate::Language("English".to_string()), find("English")),
            (CourseTemplate::Art, None),
        ];
        for (template, teacher) in catalogue {
            let mut course = Course::from_template(UNASSIGNED_ID, template);
            if let Some(teacher) = teacher {
                course = course.with_teacher(teacher);
            }
            school.courses.save(&course).await?;
            report.courses += 1;
        }
    }

    if school.students.is_empty().await? {
        for name in SAMPLE_STUDENTS {
            school
                .students
                .save(&Student::new(UNASSIGNED_ID, *name))
                .await?;
            report.students += 1;
        }
    }

    if report.is_empty() {
        info!("sample data already present, nothing seeded");
    } else {
        info!(
            teachers = report.teachers,
            courses = report.courses,
            students = report.students,
            "seeded sample data"
        );
    }
    Ok(report)
}
