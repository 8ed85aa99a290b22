use crate::ipc::error::{err, ok, store_err};
use crate::ipc::helpers::{
    course_mutated, param_confirmed, param_str, require_editor, require_workspace, required_index,
    required_str,
};
use crate::ipc::types::{AppState, Request};
use crate::model::Group;
use crate::parser::parse_and_generate;
use crate::roster::find_student;
use serde_json::json;

/// Course id plus group position, the address most edits start from.
fn group_address(req: &Request) -> Result<(String, usize), serde_json::Value> {
    Ok((
        required_str(req, "courseId")?,
        required_index(req, "groupIndex")?,
    ))
}

fn handle_groups_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.get(&course_id) {
        Ok(entry) => ok(
            &req.id,
            json!({ "course": entry.course, "groups": entry.groups }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_groups_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.add_group(&course_id) {
        Ok(idx) => course_mutated(state, req, &course_id, json!({ "groupIndex": idx })),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_groups_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let (course_id, group_index) = match group_address(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if !param_confirmed(req) {
        return err(
            &req.id,
            "bad_params",
            format!("removing group {} cannot be undone; pass confirm: true", group_index + 1),
            None,
        );
    }
    match state.store.remove_group(&course_id, group_index) {
        Ok(removed) => course_mutated(
            state,
            req,
            &course_id,
            json!({ "removedGroupId": removed.id }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_groups_update_title(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let (course_id, group_index) = match group_address(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(title) = param_str(req, "title") else {
        return err(&req.id, "bad_params", "missing title", None);
    };
    match state.store.edit_group_title(&course_id, group_index, title) {
        Ok(()) => course_mutated(state, req, &course_id, json!({})),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_groups_update_presentation_time(
    state: &mut AppState,
    req: &Request,
) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let (course_id, group_index) = match group_address(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // Any text is accepted; unparsable values simply never count as upcoming.
    let date = param_str(req, "presentationTime").unwrap_or("");
    match state
        .store
        .edit_group_presentation_time(&course_id, group_index, date)
    {
        Ok(()) => course_mutated(state, req, &course_id, json!({})),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_groups_sort(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state.store.sort_groups_by_presentation_time(&course_id) {
        Ok(()) => course_mutated(state, req, &course_id, json!({})),
        Err(e) => store_err(&req.id, e),
    }
}

/// Bulk generation from pasted text. Without `confirm: true` it only previews,
/// because applying replaces every existing group of the course.
fn handle_groups_generate(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(text) = param_str(req, "text") else {
        return err(&req.id, "bad_params", "missing text", None);
    };
    let existing = match state.store.get(&course_id) {
        Ok(entry) => entry.groups.len(),
        Err(e) => return store_err(&req.id, e),
    };

    let outcome = parse_and_generate(text, &state.roster);
    if outcome.has_warnings() {
        tracing::info!(
            course_id = %course_id,
            not_found = outcome.not_found_names.len(),
            duplicates = outcome.duplicate_names.len(),
            "group text had unresolved names"
        );
    }

    let mut result = json!({
        "groups": outcome.groups,
        "notFoundNames": outcome.not_found_names,
        "duplicateNames": outcome.duplicate_names,
        "replacedGroupCount": existing,
        "applied": false,
    });
    if !param_confirmed(req) {
        return ok(&req.id, result);
    }

    if let Err(e) = state.store.replace_groups(&course_id, outcome.groups) {
        return store_err(&req.id, e);
    }
    tracing::info!(course_id = %course_id, replaced = existing, "groups generated");
    result["applied"] = json!(true);
    course_mutated(state, req, &course_id, result)
}

fn handle_groups_replace(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let groups: Vec<Group> = match req.params.get("groups").cloned() {
        Some(v) => match serde_json::from_value(v) {
            Ok(g) => g,
            Err(e) => return err(&req.id, "bad_params", format!("invalid groups: {e}"), None),
        },
        None => return err(&req.id, "bad_params", "missing groups", None),
    };
    match state.store.replace_groups(&course_id, groups) {
        Ok(()) => course_mutated(state, req, &course_id, json!({})),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_members_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let (course_id, group_index) = match group_address(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match required_str(req, "studentName") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(student) = find_student(&name, &state.roster).cloned() else {
        return err(
            &req.id,
            "not_found",
            format!("{} is not on the roster", name.trim()),
            None,
        );
    };
    match state.store.add_member(&course_id, group_index, student) {
        Ok(()) => course_mutated(state, req, &course_id, json!({})),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_members_remove(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let (course_id, group_index) = match group_address(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let member_index = match required_index(req, "memberIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state
        .store
        .remove_member(&course_id, group_index, member_index)
    {
        Ok(removed) => course_mutated(
            state,
            req,
            &course_id,
            json!({ "removed": removed }),
        ),
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_members_update_role(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_editor(state, req) {
        return resp;
    }
    let (course_id, group_index) = match group_address(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let member_index = match required_index(req, "memberIndex") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(role) = param_str(req, "role") else {
        return err(&req.id, "bad_params", "missing role", None);
    };
    match state
        .store
        .edit_member_role(&course_id, group_index, member_index, role)
    {
        Ok(()) => course_mutated(state, req, &course_id, json!({})),
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "groups.list" => Some(handle_groups_list(state, req)),
        "groups.add" => Some(handle_groups_add(state, req)),
        "groups.remove" => Some(handle_groups_remove(state, req)),
        "groups.updateTitle" => Some(handle_groups_update_title(state, req)),
        "groups.updatePresentationTime" => {
            Some(handle_groups_update_presentation_time(state, req))
        }
        "groups.sortByPresentationTime" => Some(handle_groups_sort(state, req)),
        "groups.generate" => Some(handle_groups_generate(state, req)),
        "groups.replace" => Some(handle_groups_replace(state, req)),
        "members.add" => Some(handle_members_add(state, req)),
        "members.remove" => Some(handle_members_remove(state, req)),
        "members.updateRole" => Some(handle_members_update_role(state, req)),
        _ => None,
    }
}
