use crate::dates::parse_presentation_date;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{param_str, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::views::{search_by_student_name, upcoming_presentations, WindowPolicy};
use chrono::Local;
use serde_json::json;

fn handle_views_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let term = param_str(req, "term").unwrap_or("");
    let results = search_by_student_name(term, state.store.entries());
    ok(
        &req.id,
        json!({ "results": results, "count": results.len() }),
    )
}

fn handle_views_upcoming(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let window = match param_str(req, "window") {
        None => WindowPolicy::default(),
        Some(raw) => match WindowPolicy::parse(raw) {
            Some(w) => w,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("unknown window: {raw}"),
                    Some(json!({ "allowed": ["today", "3days", "7days", "all"] })),
                )
            }
        },
    };
    let today = match param_str(req, "today") {
        None => Local::now().date_naive(),
        Some(raw) => match parse_presentation_date(raw) {
            Some(d) => d,
            None => return err(&req.id, "bad_params", "today must be YYYY-MM-DD", None),
        },
    };

    let buckets = upcoming_presentations(state.store.entries(), window, today);
    ok(
        &req.id,
        json!({ "today": today, "buckets": buckets }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "views.search" => Some(handle_views_search(state, req)),
        "views.upcoming" => Some(handle_views_upcoming(state, req)),
        _ => None,
    }
}
