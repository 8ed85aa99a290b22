use crate::backup::{read_bundle, write_bundle, WorkspaceSnapshot};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{require_editor, required_str};
use crate::ipc::types::{AppState, Request};
use crate::roster::parse_roster;
use crate::store::GroupStore;
use serde_json::json;
use std::path::PathBuf;

fn path_param(req: &Request, key: &str) -> Result<PathBuf, serde_json::Value> {
    match required_str(req, key) {
        Ok(v) if !v.trim().is_empty() => Ok(PathBuf::from(v.trim())),
        Ok(_) => Err(err(&req.id, "bad_params", format!("missing {key}"), None)),
        Err(resp) => Err(resp),
    }
}

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let out_path = match path_param(req, "outPath") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = state.flush_roster() {
        tracing::warn!(error = %e, "roster save before backup failed");
    }

    let snapshot = WorkspaceSnapshot {
        roster_text: state.roster_text.clone(),
        courses: state.store.entries().to_vec(),
    };
    match write_bundle(&snapshot, &out_path) {
        Ok(summary) => {
            tracing::info!(
                path = %out_path.to_string_lossy(),
                courses = summary.course_count,
                "workspace bundle written"
            );
            ok(
                &req.id,
                json!({
                    "path": out_path.to_string_lossy(),
                    "courseCount": summary.course_count,
                    "entryCount": summary.entry_count,
                }),
            )
        }
        Err(e) => err(&req.id, "backup_failed", format!("{e:#}"), None),
    }
}

/// Replaces the open workspace's roster and courses with a bundle's content.
/// The bundle is validated in full before the database is touched.
fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let in_path = match path_param(req, "inPath") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let snapshot = match read_bundle(&in_path) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "backup_failed", format!("{e:#}"), None),
    };
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if let Err(e) = db::replace_all(conn, &snapshot.roster_text, &snapshot.courses) {
        return err(&req.id, "db_query_failed", format!("{e:#}"), None);
    }

    // A pending debounced write would overwrite the restored roster.
    let _ = state.roster_writes.take();
    state.roster = parse_roster(&snapshot.roster_text);
    state.roster_text = snapshot.roster_text;
    state.store = GroupStore::from_entries(snapshot.courses);
    tracing::info!(
        courses = state.store.entries().len(),
        students = state.roster.len(),
        "workspace bundle restored"
    );
    ok(
        &req.id,
        json!({
            "courseCount": state.store.entries().len(),
            "studentCount": state.roster.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(handle_backup_export(state, req)),
        "backup.importWorkspaceBundle" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}
