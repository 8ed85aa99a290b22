use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn param_index(req: &Request, key: &str) -> Option<usize> {
    req.params
        .get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
}

pub fn param_confirmed(req: &Request) -> bool {
    req.params
        .get("confirm")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    param_str(req, key)
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

pub fn required_index(req: &Request, key: &str) -> Result<usize, serde_json::Value> {
    param_index(req, key).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("missing or negative {key}"),
            None,
        )
    })
}

pub fn require_admin(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    if state.admin {
        return Ok(());
    }
    Err(err(&req.id, "unauthorized", "admin login required", None))
}

pub fn require_workspace(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    if state.db.is_some() {
        return Ok(());
    }
    Err(err(&req.id, "no_workspace", "select a workspace first", None))
}

/// Gate shared by every editing method.
pub fn require_editor(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    require_admin(state, req)?;
    require_workspace(state, req)
}

/// Persists the touched course and answers with its fresh state.
pub fn course_mutated(
    state: &AppState,
    req: &Request,
    course_id: &str,
    mut result: serde_json::Value,
) -> serde_json::Value {
    if let Ok(entry) = state.store.get(course_id) {
        result["course"] = json!(entry);
    }
    if let Some(message) = state.persist_course(course_id) {
        result["persistError"] = json!(message);
    }
    ok(&req.id, result)
}
