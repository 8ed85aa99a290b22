use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{param_str, require_editor, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::time::Instant;

fn handle_roster_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    ok(
        &req.id,
        json!({
            "text": state.roster_text,
            "students": state.roster,
        }),
    )
}

fn handle_roster_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let Some(text) = param_str(req, "text") else {
        return err(&req.id, "bad_params", "missing text", None);
    };
    state.set_roster_text(text.to_string(), Instant::now());
    ok(
        &req.id,
        json!({
            "students": state.roster,
            "studentCount": state.roster.len(),
            "writePending": state.roster_writes.is_pending(),
        }),
    )
}

fn handle_roster_flush(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    match state.flush_roster() {
        Ok(flushed) => ok(&req.id, json!({ "flushed": flushed })),
        Err(e) => {
            tracing::warn!(error = %e, "roster save failed");
            ok(
                &req.id,
                json!({ "flushed": false, "persistError": e.to_string() }),
            )
        }
    }
}

fn handle_roster_available(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.available_students(&course_id, &state.roster) {
        Ok(students) => ok(&req.id, json!({ "students": students })),
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.get" => Some(handle_roster_get(state, req)),
        "roster.update" => Some(handle_roster_update(state, req)),
        "roster.flush" => Some(handle_roster_flush(state, req)),
        "roster.available" => Some(handle_roster_available(state, req)),
        _ => None,
    }
}
