use serde_json::json;
use tracing::{info, warn};

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    attach_persistence, persist_roster, require_admin, require_can_view_student,
    require_workspace,
};
use crate::ipc::types::{AppState, Request};
use crate::model::MeasurementSample;
use crate::pipeline::{self, SubmitError};
use crate::screen::Screen;

fn handle_assessments_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_admin(state, req) {
        return resp;
    }
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let Some(raw) = req.params.get("measurement") else {
        return err(&req.id, "bad_params", "missing measurement", None);
    };
    let measurement: MeasurementSample = match serde_json::from_value(raw.clone()) {
        Ok(m) => m,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    let outcome = match pipeline::submit_assessment(&state.roster, measurement, &*state.report) {
        Ok(o) => o,
        Err(SubmitError::EmptyName) => {
            return err(&req.id, "bad_params", "measurement name must not be empty", None)
        }
        Err(SubmitError::Report(e)) => {
            // Roster untouched; the form stays on screen and may retry.
            warn!(error = %e, "report generation failed");
            return err(&req.id, "report_failed", e.to_string(), None);
        }
    };

    info!(
        student_id = %outcome.student_id,
        created = outcome.created_student,
        "assessment recorded"
    );
    state.roster = outcome.roster;
    state.screen = Screen::Result {
        student_id: outcome.student_id.clone(),
        assessment_id: outcome.assessment.id.clone(),
    };

    let (persisted, warning) = persist_roster(state);
    let mut result = json!({
        "studentId": outcome.student_id,
        "createdStudent": outcome.created_student,
        "assessment": outcome.assessment,
        "screen": state.screen,
    });
    attach_persistence(&mut result, persisted, warning);
    ok(&req.id, result)
}

fn handle_assessments_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    if let Err(resp) = require_can_view_student(state, req, student_id) {
        return resp;
    }
    match state.roster.iter().find(|s| s.id == student_id) {
        Some(s) => ok(&req.id, json!({ "assessments": s.assessments })),
        None => err(&req.id, "not_found", "student not found", None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assessments.submit" => Some(handle_assessments_submit(state, req)),
        "assessments.list" => Some(handle_assessments_list(state, req)),
        _ => None,
    }
}
