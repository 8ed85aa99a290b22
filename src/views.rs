use crate::dates::{format_display_date, parse_presentation_date};
use crate::model::{CourseGroups, Member};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub course_name: String,
    pub assignment_title: String,
    pub assignment_notes: String,
    pub group_number: usize,
    pub student_role: String,
    pub group_members: Vec<Member>,
    pub presentation_time: String,
    pub presentation_label: String,
}

/// Every member whose name contains `term` (case-insensitive) yields one result,
/// in course-then-group order. A blank term matches nothing.
pub fn search_by_student_name(term: &str, entries: &[CourseGroups]) -> Vec<SearchResult> {
    if term.trim().is_empty() {
        return Vec::new();
    }
    let needle = term.to_lowercase();
    let mut out = Vec::new();
    for entry in entries {
        for (idx, group) in entry.groups.iter().enumerate() {
            for member in &group.members {
                if !member.student.name.to_lowercase().contains(&needle) {
                    continue;
                }
                out.push(SearchResult {
                    course_name: entry.course.name.clone(),
                    assignment_title: group.assignment_title.clone(),
                    assignment_notes: entry.course.assignment_notes.clone(),
                    group_number: idx + 1,
                    student_role: member.role.clone(),
                    group_members: group.members.clone(),
                    presentation_time: group.presentation_time.clone(),
                    presentation_label: format_display_date(&group.presentation_time),
                });
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPolicy {
    Today,
    Next3Days,
    #[default]
    Next7Days,
    All,
}

impl WindowPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "today" => Some(Self::Today),
            "3days" => Some(Self::Next3Days),
            "7days" => Some(Self::Next7Days),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Last calendar day still inside the window, `None` when unbounded.
    pub fn last_day(self, today: NaiveDate) -> Option<NaiveDate> {
        let offset = match self {
            Self::Today => 0,
            Self::Next3Days => 3,
            Self::Next7Days => 7,
            Self::All => return None,
        };
        Some(today + Duration::days(offset))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingPresentation {
    pub date: String,
    pub course_name: String,
    pub assignment_title: String,
    pub group_number: usize,
    pub group_members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBucket {
    pub date: NaiveDate,
    pub label: String,
    pub presentations: Vec<UpcomingPresentation>,
}

pub fn upcoming_presentations(
    entries: &[CourseGroups],
    window: WindowPolicy,
    today: NaiveDate,
) -> Vec<DateBucket> {
    let last_day = window.last_day(today);
    let mut found: Vec<(NaiveDate, UpcomingPresentation)> = Vec::new();

    for entry in entries {
        for (idx, group) in entry.groups.iter().enumerate() {
            let Some(date) = parse_presentation_date(&group.presentation_time) else {
                continue;
            };
            if date < today {
                continue;
            }
            if last_day.is_some_and(|end| date > end) {
                continue;
            }
            found.push((
                date,
                UpcomingPresentation {
                    date: group.presentation_time.clone(),
                    course_name: entry.course.name.clone(),
                    assignment_title: group.assignment_title.clone(),
                    group_number: idx + 1,
                    group_members: group.members.clone(),
                },
            ));
        }
    }

    found.sort_by_key(|(d, _)| *d);

    let mut buckets: Vec<DateBucket> = Vec::new();
    for (date, p) in found {
        let label = format_display_date(&p.date);
        match buckets.iter_mut().find(|b| b.label == label) {
            Some(b) => b.presentations.push(p),
            None => buckets.push(DateBucket {
                date,
                label,
                presentations: vec![p],
            }),
        }
    }
    buckets
}
