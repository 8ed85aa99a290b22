use crate::export::{export_all, export_course, ExportSummary};
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{require_editor, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn out_dir(req: &Request) -> Result<PathBuf, serde_json::Value> {
    match req.params.get("outDir").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(PathBuf::from(v.trim())),
        _ => Err(err(&req.id, "bad_params", "missing outDir", None)),
    }
}

fn exported(req: &Request, res: anyhow::Result<ExportSummary>) -> serde_json::Value {
    match res {
        Ok(summary) => {
            tracing::info!(
                path = %summary.path.to_string_lossy(),
                rows = summary.rows_exported,
                "csv exported"
            );
            ok(
                &req.id,
                json!({
                    "path": summary.path.to_string_lossy(),
                    "rowsExported": summary.rows_exported,
                }),
            )
        }
        Err(e) => err(&req.id, "io_failed", format!("{e:#}"), None),
    }
}

fn handle_export_course(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let dir = match out_dir(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let entry = match state.store.get(&course_id) {
        Ok(e) => e,
        Err(e) => return store_err(&req.id, e),
    };
    exported(req, export_course(entry, &dir))
}

fn handle_export_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let dir = match out_dir(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if state.store.is_empty() {
        return err(&req.id, "bad_params", "there are no courses to export", None);
    }
    exported(req, export_all(state.store.entries(), &dir))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.courseCsv" => Some(handle_export_course(state, req)),
        "export.allCsv" => Some(handle_export_all(state, req)),
        _ => None,
    }
}
