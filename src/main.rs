//! Binary entry point that glues configuration, logging and the SQLite-backed
//! stores together. The startup pipeline is linear: read the
//! environment, install the `tracing` subscriber, open (or create) the
//! database, seed empty collections on first run, then print a short roster
//! of what is stored along with any references left dangling by deletes.
//! Presentation layers are expected to replace the roster with their own
//! screens while keeping the same bootstrapping steps.
use anyhow::{Context, Result};
use school_manager::config::Config;
use school_manager::logging::init_logging;
use school_manager::{seed_sample_data, Dao, Database, School};
use tracing::info;

/// Bootstrap the school database and report its contents.
///
/// Returning a `Result` bubbles fatal initialization problems (an unreadable
/// home directory, a database file that cannot be opened) up to the terminal
/// with context attached instead of panicking.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_logging(&config.log_filter);

    let db = Database::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    info!(path = %config.db_path.display(), "database ready");
    let school = School::new(db);

    if config.seed_sample_data {
        seed_sample_data(&school)
            .await
            .context("failed to seed sample data")?;
    }

    print_roster(&school).await
}

/// Print teachers, courses and students with their relation counts. Only the
/// first level of each relation is resolved, matching what the stores return.
async fn print_roster(school: &School) -> Result<()> {
    let teachers = school.teachers.get_all().await.context("failed to load teachers")?;
    println!("Teachers ({})", teachers.len());
    for teacher in &teachers {
        println!("  #{} {} - {} course(s)", teacher.id, teacher, teacher.assigned_courses.len());
    }

    let courses = school.courses.get_all().await.context("failed to load courses")?;
    println!("Courses ({})", courses.len());
    for course in &courses {
        let teacher = course
            .teacher
            .as_ref()
            .and_then(|teacher| teacher.resolved())
            .map(|teacher| teacher.name.as_str())
            .unwrap_or("unassigned");
        println!(
            "  #{} {} - {} - {} student(s)",
            course.id,
            course,
            teacher,
            course.students.len()
        );
    }

    let students = school.students.get_all().await.context("failed to load students")?;
    println!("Students ({})", students.len());
    for student in &students {
        println!(
            "  #{} {} - {} course(s), {} service(s)",
            student.id,
            student,
            student.courses.len(),
            student.services.len()
        );
    }

    let dangling = school
        .find_dangling_references()
        .await
        .context("failed to check references")?;
    if !dangling.is_empty() {
        println!("Dangling references ({})", dangling.len());
        for reference in &dangling {
            println!(
                "  {} #{} .{} -> missing {} #{}",
                reference.owner,
                reference.owner_id,
                reference.field,
                reference.target,
                reference.target_id
            );
        }
    }

    Ok(())
}
