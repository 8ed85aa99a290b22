//! In-memory course/group aggregate.
//!
//! All edits are synchronous and positional. Persistence happens afterwards,
//! driven by the IPC layer, and never gates an edit.

use crate::dates::parse_presentation_date;
use crate::model::{Course, CourseField, CourseGroups, Group, Member};
use crate::roster::Student;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("course not found: {0}")]
    CourseNotFound(String),
    #[error("group {index} out of range ({len} groups)")]
    GroupOutOfRange { index: usize, len: usize },
    #[error("member {index} out of range ({len} members)")]
    MemberOutOfRange { index: usize, len: usize },
    #[error("{name} is already in group {group_number} of this course")]
    DuplicateMember { name: String, group_number: usize },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CourseNotFound(_) => "not_found",
            Self::GroupOutOfRange { .. } | Self::MemberOutOfRange { .. } => "out_of_range",
            Self::DuplicateMember { .. } => "duplicate_member",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct GroupStore {
    entries: Vec<CourseGroups>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<CourseGroups>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CourseGroups] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, course_id: &str) -> StoreResult<&CourseGroups> {
        self.entries
            .iter()
            .find(|e| e.course.id == course_id)
            .ok_or_else(|| StoreError::CourseNotFound(course_id.to_string()))
    }

    fn get_mut(&mut self, course_id: &str) -> StoreResult<&mut CourseGroups> {
        self.entries
            .iter_mut()
            .find(|e| e.course.id == course_id)
            .ok_or_else(|| StoreError::CourseNotFound(course_id.to_string()))
    }

    fn group_mut(&mut self, course_id: &str, group_index: usize) -> StoreResult<&mut Group> {
        let entry = self.get_mut(course_id)?;
        let len = entry.groups.len();
        entry
            .groups
            .get_mut(group_index)
            .ok_or(StoreError::GroupOutOfRange {
                index: group_index,
                len,
            })
    }

    pub fn position(&self, course_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.course.id == course_id)
    }

    fn next_course_id(&self) -> String {
        let base = Utc::now().timestamp_millis().to_string();
        if self.position(&base).is_none() {
            return base;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.position(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn add_course(&mut self) -> &CourseGroups {
        let course = Course {
            id: self.next_course_id(),
            name: String::new(),
            assignment_notes: String::new(),
        };
        self.entries.push(CourseGroups {
            course,
            groups: Vec::new(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Course and groups live in the same entry, so removal is all-or-nothing.
    pub fn remove_course(&mut self, course_id: &str) -> StoreResult<CourseGroups> {
        let idx = self
            .position(course_id)
            .ok_or_else(|| StoreError::CourseNotFound(course_id.to_string()))?;
        Ok(self.entries.remove(idx))
    }

    pub fn edit_course_field(
        &mut self,
        course_id: &str,
        field: CourseField,
        value: &str,
    ) -> StoreResult<()> {
        let entry = self.get_mut(course_id)?;
        match field {
            CourseField::Name => entry.course.name = value.to_string(),
            CourseField::AssignmentNotes => entry.course.assignment_notes = value.to_string(),
        }
        Ok(())
    }

    pub fn add_group(&mut self, course_id: &str) -> StoreResult<usize> {
        let entry = self.get_mut(course_id)?;
        entry.groups.push(Group::empty(Uuid::new_v4().to_string()));
        Ok(entry.groups.len() - 1)
    }

    pub fn remove_group(&mut self, course_id: &str, group_index: usize) -> StoreResult<Group> {
        let entry = self.get_mut(course_id)?;
        if group_index >= entry.groups.len() {
            return Err(StoreError::GroupOutOfRange {
                index: group_index,
                len: entry.groups.len(),
            });
        }
        Ok(entry.groups.remove(group_index))
    }

    /// Rejects a student already placed anywhere in the same course.
    pub fn add_member(
        &mut self,
        course_id: &str,
        group_index: usize,
        student: Student,
    ) -> StoreResult<()> {
        let entry = self.get_mut(course_id)?;
        if group_index >= entry.groups.len() {
            return Err(StoreError::GroupOutOfRange {
                index: group_index,
                len: entry.groups.len(),
            });
        }
        if let Some(existing) = entry.groups.iter().position(|g| g.has_student(&student)) {
            return Err(StoreError::DuplicateMember {
                name: student.name,
                group_number: existing + 1,
            });
        }
        entry.groups[group_index].members.push(Member::new(student));
        Ok(())
    }

    pub fn remove_member(
        &mut self,
        course_id: &str,
        group_index: usize,
        member_index: usize,
    ) -> StoreResult<Member> {
        let group = self.group_mut(course_id, group_index)?;
        if member_index >= group.members.len() {
            return Err(StoreError::MemberOutOfRange {
                index: member_index,
                len: group.members.len(),
            });
        }
        Ok(group.members.remove(member_index))
    }

    pub fn edit_member_role(
        &mut self,
        course_id: &str,
        group_index: usize,
        member_index: usize,
        role: &str,
    ) -> StoreResult<()> {
        let group = self.group_mut(course_id, group_index)?;
        let len = group.members.len();
        let member = group
            .members
            .get_mut(member_index)
            .ok_or(StoreError::MemberOutOfRange {
                index: member_index,
                len,
            })?;
        member.role = role.to_string();
        Ok(())
    }

    pub fn edit_group_title(
        &mut self,
        course_id: &str,
        group_index: usize,
        title: &str,
    ) -> StoreResult<()> {
        self.group_mut(course_id, group_index)?.assignment_title = title.to_string();
        Ok(())
    }

    pub fn edit_group_presentation_time(
        &mut self,
        course_id: &str,
        group_index: usize,
        date: &str,
    ) -> StoreResult<()> {
        self.group_mut(course_id, group_index)?.presentation_time = date.trim().to_string();
        Ok(())
    }

    /// Dated groups first, ascending; undated or unparsable groups keep their
    /// relative order at the end. `sort_by_key` is stable, so ties keep order too.
    pub fn sort_groups_by_presentation_time(&mut self, course_id: &str) -> StoreResult<()> {
        let entry = self.get_mut(course_id)?;
        entry.groups.sort_by_key(|g| {
            match parse_presentation_date(&g.presentation_time) {
                Some(d) => (0u8, Some(d)),
                None => (1u8, None),
            }
        });
        Ok(())
    }

    pub fn replace_groups(&mut self, course_id: &str, groups: Vec<Group>) -> StoreResult<()> {
        self.get_mut(course_id)?.groups = groups;
        Ok(())
    }

    /// Roster students not yet placed in any group of the course, in roster order.
    pub fn available_students(
        &self,
        course_id: &str,
        roster: &[Student],
    ) -> StoreResult<Vec<Student>> {
        let entry = self.get(course_id)?;
        Ok(roster
            .iter()
            .filter(|s| !entry.has_student(s))
            .cloned()
            .collect())
    }
}
