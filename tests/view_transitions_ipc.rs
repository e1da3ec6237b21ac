
use serde_json::json;
use test_support::{
    measurement, open_and_login_admin, request_err, request_ok, spawn_sidecar, temp_dir,
};

#[test]
fn navigation_walks_list_history_form_and_back() {
    let workspace = temp_dir("fitbook-view-walk");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login_admin(&mut stdin, &mut reader, &workspace);

    let registered = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.register",
        json!({ "name": "Ana", "goal": "lose_weight" }),
    );
    let student_id = registered["student"]["id"].as_str().expect("id").to_string();

    let history = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "view.dispatch",
        json!({ "event": "selectStudent", "studentId": student_id }),
    );
    assert_eq!(history["screen"]["screen"], json!("history"));
    assert_eq!(history["screen"]["studentId"], json!(student_id.clone()));

    let form = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "view.dispatch",
        json!({ "event": "addAssessment" }),
    );
    assert_eq!(form["screen"]["screen"], json!("form"));
    assert_eq!(form["screen"]["studentId"], json!(student_id.clone()));

    // Back from a targeted form returns to that student's history.
    let back = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "view.dispatch",
        json!({ "event": "back" }),
    );
    assert_eq!(back["screen"]["screen"], json!("history"));

    let list = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "view.dispatch",
        json!({ "event": "back" }),
    );
    assert_eq!(list["screen"]["screen"], json!("list"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn submit_navigates_to_result_and_back_to_history() {
    let workspace = temp_dir("fitbook-view-submit");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login_admin(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "view.dispatch",
        json!({ "event": "addStudent" }),
    );
    let saved = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "assessments.submit",
        json!({ "measurement": measurement("Ana", None) }),
    );
    assert_eq!(saved["screen"]["screen"], json!("result"));

    let back = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "view.dispatch",
        json!({ "event": "back" }),
    );
    assert_eq!(back["screen"]["screen"], json!("history"));
    assert_eq!(back["screen"]["studentId"], saved["studentId"]);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn invalid_transitions_and_logged_out_dispatch_are_errors() {
    let workspace = temp_dir("fitbook-view-invalid");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login_admin(&mut stdin, &mut reader, &workspace);

    // addAssessment is only valid from a history screen.
    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "view.dispatch",
        json!({ "event": "addAssessment" }),
    );
    assert_eq!(code, "bad_transition");

    let _ = request_ok(&mut stdin, &mut reader, "2", "auth.logout", json!({}));
    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "view.dispatch",
        json!({ "event": "addStudent" }),
    );
    assert_eq!(code, "not_logged_in");

    drop(stdin);
    let _ = child.wait();
}
