use crate::ipc::error::{err, ok};
use crate::ipc::helpers::param_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let user = param_str(req, "username").unwrap_or("");
    let password = param_str(req, "password").unwrap_or("");
    if !state.config.credentials_match(user, password) {
        tracing::info!("admin login rejected");
        return err(&req.id, "unauthorized", "invalid username or password", None);
    }
    state.admin = true;
    tracing::info!("admin logged in");
    ok(&req.id, json!({ "admin": true }))
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.admin = false;
    ok(&req.id, json!({ "admin": false }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(handle_login(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        "session.status" => Some(ok(&req.id, json!({ "admin": state.admin }))),
        _ => None,
    }
}
