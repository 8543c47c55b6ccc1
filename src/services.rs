//! Extra-curricular services a student can sign up for. Each service is a
//! value record carried inline by the student, so there is no separate
//! collection and nothing to resolve on read.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{EntityId, Student};

/// An extra-curricular service attached to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Identifies the service within one student's list; applying a second
    /// service with the same id is a no-op.
    pub id: EntityId,
    /// What the service is, with its kind-specific details.
    #[serde(flatten)]
    pub kind: ServiceKind,
}

/// Kind-specific payload. Serialized with a `type` tag next to the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceKind {
    Tutoring { subject: String, hours: u32 },
    Sports { sport: String, sessions: u32 },
    Arts { art_form: String, level: String },
}

impl Service {
    /// Tutoring in `subject` for a number of hours.
    pub fn tutoring(id: EntityId, subject: impl Into<String>, hours: u32) -> Self {
        Self {
            id,
            kind: ServiceKind::Tutoring {
                subject: subject.into(),
                hours,
            },
        }
    }

    /// A sport practised over a number of sessions.
    pub fn sports(id: EntityId, sport: impl Into<String>, sessions: u32) -> Self {
        Self {
            id,
            kind: ServiceKind::Sports {
                sport: sport.into(),
                sessions,
            },
        }
    }

    /// An art form at a given level, e.g. `beginner`.
    pub fn arts(id: EntityId, art_form: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            id,
            kind: ServiceKind::Arts {
                art_form: art_form.into(),
                level: level.into(),
            },
        }
    }

    /// Short category label shown next to the service name.
    pub fn label(&self) -> &'static str {
        match self.kind {
            ServiceKind::Tutoring { .. } => "Tutoring",
            ServiceKind::Sports { .. } => "Sport",
            ServiceKind::Arts { .. } => "Arts",
        }
    }

    /// Short human-readable name, e.g. `Math Tutoring` or `Football`.
    pub fn name(&self) -> String {
        match &self.kind {
            ServiceKind::Tutoring { subject, .. } => format!("{subject} Tutoring"),
            ServiceKind::Sports { sport, .. } => sport.clone(),
            ServiceKind::Arts { art_form, .. } => art_form.clone(),
        }
    }

    /// One-sentence summary including the kind-specific details.
    pub fn description(&self) -> String {
        match &self.kind {
            ServiceKind::Tutoring { subject, hours } => {
                format!("Tutoring in {subject} for {hours} hours")
            }
            ServiceKind::Sports { sport, sessions } => {
                format!("{sport} activity for {sessions} sessions")
            }
            ServiceKind::Arts { art_form, level } => {
                format!("{art_form} activities at {level} level")
            }
        }
    }

    /// Attach this service to the student unless one with the same id is
    /// already there. Returns whether the student changed.
    pub fn apply_to_student(&self, student: &mut Student) -> bool {
        if student.services.iter().any(|service| service.id == self.id) {
            return false;
        }
        student.services.push(self.clone());
        info!(
            service = %self.name(),
            kind = self.label(),
            student = %student.name,
            "service applied to student"
        );
        true
    }

    /// Detach the service with this id. Returns whether the student changed.
    pub fn remove_from_student(&self, student: &mut Student) -> bool {
        let Some(index) = student
            .services
            .iter()
            .position(|service| service.id == self.id)
        else {
            return false;
        };
        student.services.remove(index);
        info!(
            service = %self.name(),
            student = %student.name,
            "service removed from student"
        );
        true
    }
}
