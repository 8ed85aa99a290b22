//! Free-text group parser.
//!
//! Pasted text is cut into blank-line separated blocks. The first line of a
//! block names the assignment; every following line names one student. Names
//! are resolved against the roster and anything that does not resolve is
//! handed back as a warning instead of failing the parse.

use crate::model::{Group, Member};
use crate::roster::{find_student, Student};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutcome {
    pub groups: Vec<Group>,
    pub not_found_names: Vec<String>,
    /// Roster students listed again after their first placement.
    pub duplicate_names: Vec<String>,
}

impl GenerateOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.not_found_names.is_empty() || !self.duplicate_names.is_empty()
    }
}

pub fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for raw in text.trim().lines() {
        let line = raw.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// `- Materi 1 : Linear Search` -> `Linear Search`. Lines without a colon are kept whole.
pub fn extract_title(line: &str) -> String {
    match line.rfind(':') {
        Some(pos) => line[pos + 1..].trim().to_string(),
        None => line.trim().to_string(),
    }
}

pub fn parse_and_generate(text: &str, roster: &[Student]) -> GenerateOutcome {
    let mut out = GenerateOutcome::default();
    let mut placed: Vec<&Student> = Vec::new();

    for block in split_blocks(text) {
        let Some((title_line, names)) = block.split_first() else {
            continue;
        };
        if names.is_empty() {
            continue;
        }

        let mut members = Vec::new();
        for name in names {
            let Some(student) = find_student(name, roster) else {
                out.not_found_names.push(name.to_string());
                continue;
            };
            if placed.iter().any(|p| p.same_as(student)) {
                out.duplicate_names.push(name.to_string());
                continue;
            }
            placed.push(student);
            members.push(Member::new(student.clone()));
        }

        if members.is_empty() {
            continue;
        }
        out.groups.push(Group {
            id: Uuid::new_v4().to_string(),
            assignment_title: extract_title(title_line),
            presentation_time: String::new(),
            members,
        });
    }

    out
}
