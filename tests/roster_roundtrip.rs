
use serde_json::json;
use test_support::{measurement, open_and_login_admin, request_ok, spawn_sidecar, temp_dir};

#[test]
fn roster_survives_a_daemon_restart() {
    let workspace = temp_dir("fitbook-roundtrip");

    let submitted = {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        open_and_login_admin(&mut stdin, &mut reader, &workspace);
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "students.register",
            json!({
                "name": "Bruno",
                "goal": "gain_muscle",
                "password": "segredo",
                "confirmPassword": "segredo"
            }),
        );
        let saved = request_ok(
            &mut stdin,
            &mut reader,
            "2",
            "assessments.submit",
            json!({ "measurement": measurement("Bruno", Some("2024-01-15")) }),
        );
        drop(stdin);
        let _ = child.wait();
        saved
    };
    let student_id = submitted["studentId"].as_str().expect("id").to_string();

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login_admin(&mut stdin, &mut reader, &workspace);

    let fetched = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.get",
        json!({ "studentId": student_id }),
    );
    let student = &fetched["student"];
    assert_eq!(student["name"], json!("Bruno"));
    // Demographics were overwritten from the submitted measurement.
    assert_eq!(student["goal"], json!("lose_weight"));
    assert_eq!(student["age"], json!(29));
    // Passwords never leave the daemon, but their presence does.
    assert!(student.get("password").is_none());
    assert_eq!(student["hasPassword"], json!(true));

    let history = student["assessments"].as_array().expect("assessments");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], submitted["assessment"]);

    // The stored password still works after the restart.
    let _ = request_ok(&mut stdin, &mut reader, "4", "auth.logout", json!({}));
    let login = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "auth.login",
        json!({ "username": "bruno", "password": "segredo" }),
    );
    assert_eq!(login["user"]["role"], json!("client"));

    drop(stdin);
    let _ = child.wait();
}
