use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
        }
    }

    /// Case-insensitive, whitespace-trimmed identity used everywhere students are compared.
    pub fn same_as(&self, other: &Student) -> bool {
        names_match(&self.name, &other.name)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Parses pasted `Name[,Email]` lines. Malformed lines are dropped, never reported.
pub fn parse_roster(text: &str) -> Vec<Student> {
    let mut out = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (name, email) = match line.split_once(',') {
            Some((n, e)) => (n.trim(), e.trim()),
            None => (line, ""),
        };
        if name.is_empty() {
            continue;
        }
        out.push(Student {
            name: name.to_string(),
            email: if email.is_empty() {
                None
            } else {
                Some(email.to_string())
            },
        });
    }
    out
}

/// First roster entry whose name matches; duplicates in the roster are not disambiguated.
pub fn find_student<'a>(candidate: &str, roster: &'a [Student]) -> Option<&'a Student> {
    let wanted = normalize_name(candidate);
    roster.iter().find(|s| normalize_name(&s.name) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_drops_blank_lines() {
        let roster = parse_roster("  Ada , 1924250001 \n\n   \nBudi\n");
        assert_eq!(
            roster,
            vec![Student::with_email("Ada", "1924250001"), Student::new("Budi")]
        );
    }

    #[test]
    fn parse_drops_lines_without_a_name() {
        let roster = parse_roster(",orphan@example.com\nCici,\n");
        assert_eq!(roster, vec![Student::new("Cici")]);
    }

    #[test]
    fn parse_splits_on_first_comma_only() {
        let roster = parse_roster("Doe, Jane, extra");
        assert_eq!(roster[0].name, "Doe");
        assert_eq!(roster[0].email.as_deref(), Some("Jane, extra"));
    }

    #[test]
    fn parse_is_idempotent() {
        let text = "Ada,1\nBudi,2\r\nCici\n";
        assert_eq!(parse_roster(text), parse_roster(text));
    }

    #[test]
    fn match_ignores_case_and_whitespace() {
        let roster = parse_roster("Ada\nada\nBudi");
        let hit = find_student("  ada  ", &roster).expect("ada");
        assert_eq!(hit.name, "Ada");
        let lower = parse_roster("ada");
        assert_eq!(find_student("ADA", &lower).map(|s| s.name.as_str()), Some("ada"));
        assert!(find_student("Ad", &roster).is_none());
    }
}
