use serde_json::{json, Value};
use tracing::error;

use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::model::{CurrentUser, Role, Student};
use crate::store;

pub fn require_workspace(state: &AppState, req: &Request) -> Result<(), Value> {
    if state.db.is_none() {
        return Err(err(&req.id, "no_workspace", "select a workspace first", None));
    }
    Ok(())
}

pub fn require_user(state: &AppState, req: &Request) -> Result<CurrentUser, Value> {
    state
        .user
        .clone()
        .ok_or_else(|| err(&req.id, "not_logged_in", "log in first", None))
}

pub fn require_admin(state: &AppState, req: &Request) -> Result<CurrentUser, Value> {
    let user = require_user(state, req)?;
    if user.role != Role::Admin {
        return Err(err(&req.id, "forbidden", "admin role required", None));
    }
    Ok(user)
}

/// A client may only read their own record; admins may read anyone's.
pub fn require_can_view_student(
    state: &AppState,
    req: &Request,
    student_id: &str,
) -> Result<CurrentUser, Value> {
    let user = require_user(state, req)?;
    match user.role {
        Role::Admin => Ok(user),
        Role::Client if user.id.as_deref() == Some(student_id) => Ok(user),
        Role::Client => Err(err(&req.id, "forbidden", "not your record", None)),
    }
}

/// Best-effort roster save. A failure is logged and reported back to the
/// caller as `persisted: false` plus a warning; the in-memory roster stays
/// authoritative for the session.
pub fn persist_roster(state: &AppState) -> (bool, Option<String>) {
    let Some(conn) = state.db.as_ref() else {
        return (false, Some("no workspace selected".to_string()));
    };
    match store::roster_save(conn, &state.roster) {
        Ok(()) => (true, None),
        Err(e) => {
            error!(error = %e, "roster save failed; in-memory state kept");
            (false, Some(e.to_string()))
        }
    }
}

pub fn attach_persistence(result: &mut Value, persisted: bool, warning: Option<String>) {
    result["persisted"] = json!(persisted);
    if let Some(w) = warning {
        result["storageWarning"] = json!(w);
    }
}

pub fn student_summary(s: &Student) -> Value {
    json!({
        "id": s.id,
        "name": s.name,
        "goal": s.goal,
        "assessmentCount": s.assessments.len(),
        "lastAssessmentAt": s.assessments.first().map(|a| a.timestamp),
    })
}

/// Full record for the history/edit screens, minus the stored password.
pub fn student_detail(s: &Student) -> Value {
    let mut v = serde_json::to_value(s).unwrap_or_else(|_| json!({}));
    if let Some(obj) = v.as_object_mut() {
        obj.remove("password");
        obj.insert("hasPassword".to_string(), json!(s.password.is_some()));
    }
    v
}
