//! Comma-separated exports of group assignments.
//!
//! Files are UTF-8 with a byte-order mark and CRLF line endings so that
//! spreadsheet programs open them without an import dialog.

use crate::dates::format_export_date;
use crate::model::CourseGroups;
use crate::roster::Student;
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const BOM: &str = "\u{FEFF}";
pub const ALL_COURSES_FILENAME: &str = "rekap_semua_mahasiswa.csv";

pub const COURSE_HEADERS: [&str; 8] = [
    "Mata Kuliah",
    "Judul Tugas",
    "Catatan Tugas",
    "Tanggal Presentasi",
    "No. Kelompok",
    "Nama",
    "Email",
    "Role",
];

pub const ALL_HEADERS: [&str; 8] = [
    "Nama",
    "Email",
    "Mata Kuliah",
    "Judul Tugas",
    "Catatan Tugas",
    "Tanggal Presentasi",
    "Kelompok",
    "Role",
];

pub type Row = Vec<String>;

/// Every data field is quoted; embedded quotes are doubled.
pub fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Spaces and anything a filesystem treats as a separator or reserved become
/// `_`, so the name always stays a single component inside the output dir.
pub fn course_filename(course_name: &str) -> String {
    let safe: String = course_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("kelompok-{}.csv", safe)
}

/// One row per (group, member), group order then member order.
pub fn course_rows(entry: &CourseGroups) -> Vec<Row> {
    let mut rows = Vec::new();
    for (idx, group) in entry.groups.iter().enumerate() {
        let date = format_export_date(&group.presentation_time);
        for member in &group.members {
            rows.push(vec![
                entry.course.name.clone(),
                group.assignment_title.clone(),
                entry.course.assignment_notes.clone(),
                date.clone(),
                (idx + 1).to_string(),
                member.student.name.clone(),
                member.student.email.clone().unwrap_or_default(),
                member.role.clone(),
            ]);
        }
    }
    rows
}

struct Assignment {
    course_name: String,
    assignment_title: String,
    assignment_notes: String,
    presentation_time: String,
    group_number: usize,
    role: String,
}

/// Rows grouped per student (keyed by email, else name) in first-encounter order.
pub fn all_course_rows(entries: &[CourseGroups]) -> Vec<Row> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut students: Vec<(Student, Vec<Assignment>)> = Vec::new();

    for entry in entries {
        for (idx, group) in entry.groups.iter().enumerate() {
            for member in &group.members {
                let key = match member.student.email.as_deref() {
                    Some(email) if !email.is_empty() => email.to_string(),
                    _ => member.student.name.clone(),
                };
                let slot = *index.entry(key).or_insert_with(|| {
                    students.push((member.student.clone(), Vec::new()));
                    students.len() - 1
                });
                students[slot].1.push(Assignment {
                    course_name: entry.course.name.clone(),
                    assignment_title: group.assignment_title.clone(),
                    assignment_notes: entry.course.assignment_notes.clone(),
                    presentation_time: group.presentation_time.clone(),
                    group_number: idx + 1,
                    role: member.role.clone(),
                });
            }
        }
    }

    let mut rows = Vec::new();
    for (student, assignments) in students {
        for a in assignments {
            rows.push(vec![
                student.name.clone(),
                student.email.clone().unwrap_or_default(),
                a.course_name,
                a.assignment_title,
                a.assignment_notes,
                format_export_date(&a.presentation_time),
                a.group_number.to_string(),
                a.role,
            ]);
        }
    }
    rows
}

pub fn render_csv(headers: &[&str], rows: &[Row]) -> String {
    let mut csv = String::from(BOM);
    csv.push_str(&headers.join(","));
    csv.push_str("\r\n");
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| csv_quote(c)).collect();
        csv.push_str(&cells.join(","));
        csv.push_str("\r\n");
    }
    csv
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows_exported: usize,
}

fn write_csv(out_dir: &Path, filename: &str, csv: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;
    let path = out_dir.join(filename);
    std::fs::write(&path, csv)
        .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;
    Ok(path)
}

pub fn export_course(entry: &CourseGroups, out_dir: &Path) -> anyhow::Result<ExportSummary> {
    let rows = course_rows(entry);
    let csv = render_csv(&COURSE_HEADERS, &rows);
    let path = write_csv(out_dir, &course_filename(&entry.course.name), &csv)?;
    Ok(ExportSummary {
        path,
        rows_exported: rows.len(),
    })
}

pub fn export_all(entries: &[CourseGroups], out_dir: &Path) -> anyhow::Result<ExportSummary> {
    let rows = all_course_rows(entries);
    let csv = render_csv(&ALL_HEADERS, &rows);
    let path = write_csv(out_dir, ALL_COURSES_FILENAME, &csv)?;
    Ok(ExportSummary {
        path,
        rows_exported: rows.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Course, Group, Member};

    fn parse_csv_record(line: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut buf = String::new();
        let mut in_quotes = false;
        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '"' if in_quotes && chars.peek() == Some(&'"') => {
                    buf.push('"');
                    chars.next();
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => out.push(std::mem::take(&mut buf)),
                _ => buf.push(ch),
            }
        }
        out.push(buf);
        out
    }

    fn entry(name: &str, groups: Vec<Group>) -> CourseGroups {
        CourseGroups {
            course: Course {
                id: name.to_string(),
                name: name.to_string(),
                assignment_notes: String::new(),
            },
            groups,
        }
    }

    fn group(title: &str, date: &str, members: Vec<Student>) -> Group {
        Group {
            id: title.to_string(),
            assignment_title: title.to_string(),
            presentation_time: date.to_string(),
            members: members.into_iter().map(Member::new).collect(),
        }
    }

    #[test]
    fn quoted_fields_survive_a_csv_reader() {
        let original = "Doe, Jane \"JD\"";
        let quoted = csv_quote(original);
        assert_eq!(quoted, "\"Doe, Jane \"\"JD\"\"\"");
        assert_eq!(parse_csv_record(&quoted), vec![original.to_string()]);
        assert_eq!(csv_quote("plain"), "\"plain\"");
    }

    #[test]
    fn course_rows_follow_group_then_member_order() {
        let e = entry(
            "Struktur Data",
            vec![
                group(
                    "Stack",
                    "2024-03-18",
                    vec![Student::with_email("Ada", "1"), Student::new("Budi")],
                ),
                group("Queue", "", vec![Student::new("Cici")]),
            ],
        );
        let rows = course_rows(&e);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][3], "Senin, 18 Maret 2024");
        assert_eq!(rows[0][6], "1");
        assert_eq!(rows[1][6], "");
        assert_eq!(rows[2][1], "Queue");
        assert_eq!(rows[2][3], "");
        assert_eq!(rows[2][4], "2");
        assert_eq!(
            course_filename("Struktur Data Lanjut"),
            "kelompok-Struktur_Data_Lanjut.csv"
        );
    }

    #[test]
    fn all_rows_group_per_student_keyed_by_email_then_name() {
        let entries = vec![
            entry(
                "A",
                vec![group(
                    "a1",
                    "",
                    vec![Student::with_email("Ada", "1"), Student::new("Budi")],
                )],
            ),
            entry(
                "B",
                vec![
                    group("b1", "", vec![Student::new("Budi")]),
                    group("b2", "", vec![Student::with_email("Ada L.", "1")]),
                ],
            ),
        ];
        let rows = all_course_rows(&entries);
        let summary: Vec<(String, String, String)> = rows
            .iter()
            .map(|r| (r[0].clone(), r[2].clone(), r[6].clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Ada".to_string(), "A".to_string(), "1".to_string()),
                ("Ada".to_string(), "B".to_string(), "2".to_string()),
                ("Budi".to_string(), "A".to_string(), "1".to_string()),
                ("Budi".to_string(), "B".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn rendered_csv_has_bom_header_and_crlf() {
        let e = entry("X", vec![group("T", "", vec![Student::new("Doe, Jane")])]);
        let csv = render_csv(&COURSE_HEADERS, &course_rows(&e));
        assert!(csv.starts_with(BOM));
        let body = csv.trim_start_matches(BOM);
        let lines: Vec<&str> = body.split("\r\n").collect();
        assert_eq!(lines[0], COURSE_HEADERS.join(","));
        let fields = parse_csv_record(lines[1]);
        assert_eq!(fields[5], "Doe, Jane");
        assert_eq!(lines[2], "");
    }

    #[test]
    fn course_names_with_separators_stay_inside_out_dir() {
        assert_eq!(course_filename("../etc/passwd"), "kelompok-.._etc_passwd.csv");
        assert_eq!(course_filename("A\\B: C?"), "kelompok-A_B__C_.csv");

        let out = std::env::temp_dir().join(format!(
            "classgroups-export-sep-{}",
            std::process::id()
        ));
        let e = entry("../Kelas/2024", vec![group("T", "", vec![Student::new("Ada")])]);
        let summary = export_course(&e, &out).expect("export");
        assert_eq!(summary.path.parent(), Some(out.as_path()));
        assert!(summary.path.is_file());
        let _ = std::fs::remove_dir_all(&out);
    }
}
