use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{param_confirmed, param_str, require_editor};
use crate::ipc::types::{AppState, Request};
use crate::roster::parse_roster;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "admin": state.admin,
            "courseCount": state.store.entries().len(),
            "studentCount": state.roster.len(),
            "rosterWritePending": state.roster_writes.is_pending(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = param_str(req, "path").map(PathBuf::from) else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match state.open_workspace(&path) {
        Ok(()) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "courseCount": state.store.entries().len(),
                "studentCount": state.roster.len(),
            }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

/// Wipes every course and restores the default roster in one transaction.
fn handle_workspace_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    if !param_confirmed(req) {
        return err(
            &req.id,
            "bad_params",
            "reset deletes every course and group; pass confirm: true",
            None,
        );
    }
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let default_roster = state.config.default_roster.clone();
    let deleted = match db::replace_all(conn, &default_roster, &[]) {
        Ok(n) => n,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    // A pending debounced write would resurrect the old roster.
    let _ = state.roster_writes.take();
    state.roster = parse_roster(&default_roster);
    state.roster_text = default_roster;
    state.store.clear();
    tracing::info!(deleted, "workspace reset");

    ok(
        &req.id,
        json!({
            "coursesDeleted": deleted,
            "studentCount": state.roster.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "workspace.reset" => Some(handle_workspace_reset(state, req)),
        _ => None,
    }
}
