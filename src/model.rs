use crate::roster::Student;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "Anggota";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub assignment_notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseField {
    Name,
    AssignmentNotes,
}

impl CourseField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "name" => Some(Self::Name),
            "assignmentNotes" => Some(Self::AssignmentNotes),
            _ => None,
        }
    }
}

/// A roster snapshot paired with a free-text role. The student is copied by value:
/// later roster edits never reach members that were already placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub student: Student,
    #[serde(default = "default_role")]
    pub role: String,
}

impl Member {
    pub fn new(student: Student) -> Self {
        Self {
            student,
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub assignment_title: String,
    /// `YYYY-MM-DD`, empty when unset.
    #[serde(default)]
    pub presentation_time: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Group {
    pub fn empty(id: String) -> Self {
        Self {
            id,
            assignment_title: String::new(),
            presentation_time: String::new(),
            members: Vec::new(),
        }
    }

    pub fn has_student(&self, student: &Student) -> bool {
        self.members.iter().any(|m| m.student.same_as(student))
    }
}

/// One course with its ordered groups. Group number shown to users is `index + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGroups {
    pub course: Course,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl CourseGroups {
    pub fn has_student(&self, student: &Student) -> bool {
        self.groups.iter().any(|g| g.has_student(student))
    }
}
