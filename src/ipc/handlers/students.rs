use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{
    attach_persistence, persist_roster, require_admin, require_can_view_student,
    require_workspace, student_detail, student_summary,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{normalize_name, ActivityLevel, Goal, Sex, Student};
use crate::screen::Screen;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileParams {
    name: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    confirm_password: Option<String>,
    #[serde(default)]
    age: Option<u32>,
    #[serde(default)]
    height_cm: Option<f64>,
    #[serde(default)]
    sex: Option<Sex>,
    goal: Goal,
    #[serde(default)]
    activity_level: Option<ActivityLevel>,
    #[serde(default)]
    health_conditions: Option<String>,
    #[serde(default)]
    medical_restrictions: Option<String>,
    #[serde(default)]
    supplements: Option<String>,
}

/// Password rules apply only when a new password is actually being set; a
/// blank field means "leave unchanged".
fn validate_password(
    req: &Request,
    password: &Option<String>,
    confirm: &Option<String>,
) -> Result<Option<String>, serde_json::Value> {
    let Some(password) = password.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    if confirm.as_deref() != Some(password) {
        return Err(err(
            &req.id,
            "password_mismatch",
            "password confirmation does not match",
            None,
        ));
    }
    if password.len() < 6 {
        return Err(err(
            &req.id,
            "password_too_short",
            "password must have at least 6 characters",
            None,
        ));
    }
    Ok(Some(password.to_string()))
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_admin(state, req) {
        return resp;
    }
    let students: Vec<_> = state.roster.iter().map(student_summary).collect();
    ok(&req.id, json!({ "students": students }))
}

fn handle_students_register(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_admin(state, req) {
        return resp;
    }
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }

    let params: ProfileParams = match serde_json::from_value(req.params.clone()) {
        Ok(p) => p,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    let name = params.name.trim().to_string();
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }
    let key = normalize_name(&name);
    if state.roster.iter().any(|s| s.normalized_name() == key) {
        return err(
            &req.id,
            "duplicate_name",
            "a student with this name already exists",
            None,
        );
    }
    let password = match validate_password(req, &params.password, &params.confirm_password) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let student = Student {
        id: Uuid::new_v4().to_string(),
        name,
        password,
        age: params.age,
        height_cm: params.height_cm,
        sex: params.sex,
        goal: params.goal,
        activity_level: params.activity_level,
        health_conditions: params.health_conditions,
        medical_restrictions: params.medical_restrictions,
        supplements: params.supplements,
        assessments: Vec::new(),
    };
    let detail = student_detail(&student);
    state.roster.push(student);

    let (persisted, warning) = persist_roster(state);
    let mut result = json!({ "student": detail });
    attach_persistence(&mut result, persisted, warning);
    ok(&req.id, result)
}

fn handle_students_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(student_id) = req.params.get("studentId").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    if let Err(resp) = require_can_view_student(state, req, student_id) {
        return resp;
    }
    match state.roster.iter().find(|s| s.id == student_id) {
        Some(s) => ok(&req.id, json!({ "student": student_detail(s) })),
        None => err(&req.id, "not_found", "student not found", None),
    }
}

fn handle_students_update_profile(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_admin(state, req) {
        return resp;
    }
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let Some(student_id) = req
        .params
        .get("studentId")
        .and_then(|v| v.as_str())
        .map(str::to_string)
    else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let params: ProfileParams = match serde_json::from_value(req.params.clone()) {
        Ok(p) => p,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };

    let name = params.name.trim().to_string();
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }
    let key = normalize_name(&name);
    // Uniqueness check excludes the student being edited.
    if state
        .roster
        .iter()
        .any(|s| s.id != student_id && s.normalized_name() == key)
    {
        return err(
            &req.id,
            "duplicate_name",
            "another student already uses this name",
            None,
        );
    }
    let password = match validate_password(req, &params.password, &params.confirm_password) {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let Some(student) = state.roster.iter_mut().find(|s| s.id == student_id) else {
        return err(&req.id, "not_found", "student not found", None);
    };
    student.name = name;
    if let Some(p) = password {
        student.password = Some(p);
    }
    student.age = params.age;
    student.height_cm = params.height_cm;
    student.sex = params.sex;
    student.goal = params.goal;
    student.activity_level = params.activity_level;
    student.health_conditions = params.health_conditions;
    student.medical_restrictions = params.medical_restrictions;
    student.supplements = params.supplements;
    let detail = student_detail(student);

    state.screen = Screen::History {
        student_id: student_id.clone(),
    };
    let (persisted, warning) = persist_roster(state);
    let mut result = json!({ "student": detail, "screen": state.screen });
    attach_persistence(&mut result, persisted, warning);
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.register" => Some(handle_students_register(state, req)),
        "students.get" => Some(handle_students_get(state, req)),
        "students.updateProfile" => Some(handle_students_update_profile(state, req)),
        _ => None,
    }
}
