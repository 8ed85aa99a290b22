use crate::db;
use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{course_mutated, require_editor, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::CourseField;
use serde_json::json;

fn handle_courses_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let courses: Vec<serde_json::Value> = state
        .store
        .entries()
        .iter()
        .map(|e| {
            json!({
                "id": e.course.id,
                "name": e.course.name,
                "assignmentNotes": e.course.assignment_notes,
                "groupCount": e.groups.len(),
                "memberCount": e.groups.iter().map(|g| g.members.len()).sum::<usize>(),
            })
        })
        .collect();
    ok(&req.id, json!({ "courses": courses }))
}

fn handle_courses_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let course_id = state.store.add_course().course.id.clone();
    tracing::info!(course_id = %course_id, "course created");
    course_mutated(state, req, &course_id, json!({ "courseId": course_id }))
}

fn handle_courses_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let (course_id, field, value) = match (
        required_str(req, "courseId"),
        required_str(req, "field"),
        required_str(req, "value"),
    ) {
        (Ok(c), Ok(f), Ok(v)) => (c, f, v),
        (Err(resp), _, _) | (_, Err(resp), _) | (_, _, Err(resp)) => return resp,
    };
    let Some(field) = CourseField::parse(&field) else {
        return err(
            &req.id,
            "bad_params",
            format!("unknown course field: {field}"),
            Some(json!({ "allowed": ["name", "assignmentNotes"] })),
        );
    };
    if let Err(e) = state.store.edit_course_field(&course_id, field, &value) {
        return store_err(&req.id, e);
    }
    course_mutated(state, req, &course_id, json!({}))
}

fn handle_courses_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let removed = match state.store.remove_course(&course_id) {
        Ok(entry) => entry,
        Err(e) => return store_err(&req.id, e),
    };
    tracing::info!(course_id = %course_id, groups = removed.groups.len(), "course deleted");

    let mut result = json!({ "courseId": course_id, "groupsDeleted": removed.groups.len() });
    let mut persist_errors = Vec::new();
    if let Some(conn) = state.db.as_ref() {
        if let Err(e) = db::delete_course_groups(conn, &[course_id.clone()]) {
            tracing::warn!(course_id = %course_id, error = %e, "course delete failed");
            persist_errors.push(e.to_string());
        }
    }
    // Positions shifted; keep stored order aligned with the list.
    if let Some(message) = state.persist_all_courses() {
        persist_errors.push(message);
    }
    if !persist_errors.is_empty() {
        result["persistError"] = json!(persist_errors.join("; "));
    }
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" => Some(handle_courses_list(state, req)),
        "courses.create" => Some(handle_courses_create(state, req)),
        "courses.update" => Some(handle_courses_update(state, req)),
        "courses.delete" => Some(handle_courses_delete(state, req)),
        _ => None,
    }
}
