
use serde_json::json;
use test_support::{
    open_and_login_admin, request_err, request_ok, spawn_sidecar, temp_dir,
};

#[test]
fn client_role_sees_only_their_own_record() {
    let workspace = temp_dir("fitbook-auth-roles");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login_admin(&mut stdin, &mut reader, &workspace);

    let ana = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.register",
        json!({ "name": "Ana", "goal": "lose_weight" }),
    );
    let ana_id = ana["student"]["id"].as_str().expect("ana id").to_string();
    let bruno = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.register",
        json!({ "name": "Bruno", "goal": "maintain" }),
    );
    let bruno_id = bruno["student"]["id"].as_str().expect("bruno id").to_string();

    // Ana has no stored password, so the default applies.
    let _ = request_ok(&mut stdin, &mut reader, "3", "auth.logout", json!({}));
    let login = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "auth.login",
        json!({ "username": "ana", "password": "student123" }),
    );
    assert_eq!(login["user"]["role"], json!("client"));
    assert_eq!(login["user"]["id"], json!(ana_id.clone()));

    let own = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.get",
        json!({ "studentId": ana_id }),
    );
    assert_eq!(own["student"]["name"], json!("Ana"));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "students.get",
        json!({ "studentId": bruno_id }),
    );
    assert_eq!(code, "forbidden");
    let code = request_err(&mut stdin, &mut reader, "7", "students.list", json!({}));
    assert_eq!(code, "forbidden");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn bad_credentials_are_rejected() {
    let workspace = temp_dir("fitbook-auth-bad");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "auth.login",
        json!({ "username": "admin", "password": "nope" }),
    );
    assert_eq!(code, "invalid_credentials");
    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "auth.login",
        json!({ "username": "ghost", "password": "student123" }),
    );
    assert_eq!(code, "invalid_credentials");

    drop(stdin);
    let _ = child.wait();
}
