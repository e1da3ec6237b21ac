
use serde_json::json;
use test_support::{open_and_login_admin, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("fitbook-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());

    open_and_login_admin(&mut stdin, &mut reader, &workspace);

    let registered = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.register",
        json!({ "name": "Smoke Student", "goal": "general_health" }),
    );
    let student_id = registered
        .get("student")
        .and_then(|v| v.get("id"))
        .and_then(|v| v.as_str())
        .expect("student id")
        .to_string();

    let listed = request_ok(&mut stdin, &mut reader, "3", "students.list", json!({}));
    let students = listed
        .get("students")
        .and_then(|v| v.as_array())
        .expect("students array");
    assert_eq!(students.len(), 1);
    assert_eq!(
        students[0].get("assessmentCount").and_then(|v| v.as_u64()),
        Some(0)
    );

    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.get",
        json!({ "studentId": student_id }),
    );
    assert_eq!(
        fetched
            .get("student")
            .and_then(|v| v.get("name"))
            .and_then(|v| v.as_str()),
        Some("Smoke Student")
    );

    let view = request_ok(&mut stdin, &mut reader, "5", "view.state", json!({}));
    assert_eq!(
        view.get("screen").and_then(|s| s.get("screen")),
        Some(&json!("list"))
    );

    let _ = request_ok(&mut stdin, &mut reader, "6", "auth.logout", json!({}));
    let after = request(&mut stdin, &mut reader, "7", "students.list", json!({}));
    assert_eq!(after.get("ok").and_then(|v| v.as_bool()), Some(false));

    let unknown = request(&mut stdin, &mut reader, "8", "no.such.method", json!({}));
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
}
