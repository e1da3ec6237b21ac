//! Assessment pipeline: turns one submitted measurement into a correctly
//! ordered update of the roster. Pure over the roster value; the caller's
//! roster is never touched until the report call has succeeded, so a failed
//! call leaves everything exactly as it was.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{normalize_name, Assessment, MeasurementSample, Student};
use crate::report::{ReportClient, ReportError};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("measurement name must not be empty")]
    EmptyName,
    #[error(transparent)]
    Report(#[from] ReportError),
}

pub struct SubmitOutcome {
    pub roster: Vec<Student>,
    pub student_id: String,
    pub assessment: Assessment,
    /// True when the submission created the student rather than extending an
    /// existing history.
    pub created_student: bool,
}

/// Timestamp rule: a parseable `assessmentDate` (calendar date, midnight UTC)
/// wins; anything else silently falls back to now.
fn assessment_timestamp(measurement: &MeasurementSample) -> DateTime<Utc> {
    measurement
        .assessment_date
        .as_deref()
        .and_then(|raw| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now)
}

fn apply_demographics(student: &mut Student, m: &MeasurementSample) {
    student.age = Some(m.age);
    student.height_cm = Some(m.height_cm);
    student.sex = Some(m.sex);
    student.goal = m.goal;
    student.activity_level = m.activity_level;
    student.health_conditions = m.health_conditions.clone();
    student.medical_restrictions = m.medical_restrictions.clone();
    student.supplements = m.supplements.clone();
}

/// Submit one measurement against the roster.
///
/// Resolves the target student by normalized name, feeds the most recent prior
/// measurement (if any) to the report client as comparison context, and
/// returns an updated roster in which the target's history is sorted
/// descending by timestamp. All-or-nothing: on any error the input roster is
/// the only roster there is.
pub fn submit_assessment(
    roster: &[Student],
    measurement: MeasurementSample,
    client: &dyn ReportClient,
) -> Result<SubmitOutcome, SubmitError> {
    let key = normalize_name(&measurement.name);
    if key.is_empty() {
        return Err(SubmitError::EmptyName);
    }

    let existing = roster.iter().position(|s| s.normalized_name() == key);

    // Comparison context is the most recent prior assessment, read before any
    // mutation. Index 0 of an already-descending list.
    let previous = existing
        .and_then(|i| roster[i].assessments.first())
        .map(|a| a.measurement.clone());

    let result = client.analyze(&measurement, previous.as_ref())?;

    let assessment = Assessment {
        id: Uuid::new_v4().to_string(),
        timestamp: assessment_timestamp(&measurement),
        measurement,
        result,
    };

    let mut roster = roster.to_vec();
    let (student_id, created_student) = match existing {
        Some(i) => {
            let student = &mut roster[i];
            apply_demographics(student, &assessment.measurement);
            student.assessments.insert(0, assessment.clone());
            // A backdated entry must land in chronological position, not at
            // the front.
            student
                .assessments
                .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            (student.id.clone(), false)
        }
        None => {
            let mut student = Student {
                id: Uuid::new_v4().to_string(),
                name: assessment.measurement.name.trim().to_string(),
                password: None,
                age: None,
                height_cm: None,
                sex: None,
                goal: assessment.measurement.goal,
                activity_level: None,
                health_conditions: None,
                medical_restrictions: None,
                supplements: None,
                assessments: vec![assessment.clone()],
            };
            apply_demographics(&mut student, &assessment.measurement);
            let id = student.id.clone();
            roster.push(student);
            (id, true)
        }
    };

    Ok(SubmitOutcome {
        roster,
        student_id,
        assessment,
        created_student,
    })
}
