use serde_json::json;
use tracing::info;

use crate::auth;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::screen::Screen;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let username = req.params.get("username").and_then(|v| v.as_str());
    let password = req.params.get("password").and_then(|v| v.as_str());
    let (Some(username), Some(password)) = (username, password) else {
        return err(&req.id, "bad_params", "missing username or password", None);
    };

    match auth::login(&state.roster, username, password) {
        Ok(user) => {
            info!(name = %user.name, role = ?user.role, "login");
            state.user = Some(user.clone());
            // Post-login initial screen.
            state.screen = Screen::List;
            ok(
                &req.id,
                json!({ "user": user, "screen": state.screen }),
            )
        }
        Err(e) => err(&req.id, "invalid_credentials", e.to_string(), None),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Logout discards all view context regardless of where the session was.
    state.user = None;
    state.screen = Screen::Login;
    ok(&req.id, json!({ "screen": state.screen }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
