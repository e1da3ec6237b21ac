use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::require_user;
use crate::ipc::types::{AppState, Request};
use crate::screen::ScreenEvent;

fn handle_view_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({ "screen": state.screen, "user": state.user }),
    )
}

/// Pure navigation events (select, back, cancel...). Mutating operations
/// (login, submit, profile save) move the screen themselves.
fn handle_view_dispatch(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_user(state, req) {
        return resp;
    }
    let event: ScreenEvent = match serde_json::from_value(req.params.clone()) {
        Ok(e) => e,
        Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
    };
    match state.screen.apply(event) {
        Ok(next) => {
            state.screen = next;
            ok(&req.id, json!({ "screen": state.screen }))
        }
        Err(e) => err(&req.id, "bad_transition", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "view.state" => Some(handle_view_state(state, req)),
        "view.dispatch" => Some(handle_view_dispatch(state, req)),
        _ => None,
    }
}
