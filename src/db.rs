use crate::model::{Course, CourseGroups, Group};
use anyhow::Context;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILENAME: &str = "classgroups.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILENAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS roster_slot(
            id INTEGER PRIMARY KEY CHECK (id = 1),
            text TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS course_groups(
            id TEXT PRIMARY KEY,
            course_json TEXT NOT NULL,
            groups_json TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_course_groups_sort ON course_groups(sort_order)",
        [],
    )?;

    Ok(conn)
}

/// `None` when the slot has never been written.
pub fn load_roster_text(conn: &Connection) -> anyhow::Result<Option<String>> {
    let text = conn
        .query_row("SELECT text FROM roster_slot WHERE id = 1", [], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(text)
}

pub fn save_roster_text(conn: &Connection, text: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO roster_slot(id, text, updated_at) VALUES(1, ?, ?)
         ON CONFLICT(id) DO UPDATE SET text = excluded.text, updated_at = excluded.updated_at",
        (text, Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

pub fn load_all_course_groups(conn: &Connection) -> anyhow::Result<Vec<CourseGroups>> {
    let mut stmt = conn.prepare(
        "SELECT id, course_json, groups_json FROM course_groups ORDER BY sort_order, rowid",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = Vec::with_capacity(rows.len());
    for (id, course_json, groups_json) in rows {
        let course: Course = serde_json::from_str(&course_json)
            .with_context(|| format!("course record {id} is not valid JSON"))?;
        let groups: Vec<Group> = serde_json::from_str(&groups_json)
            .with_context(|| format!("groups of course {id} are not valid JSON"))?;
        out.push(CourseGroups { course, groups });
    }
    Ok(out)
}

pub fn upsert_course_group(
    conn: &Connection,
    entry: &CourseGroups,
    sort_order: usize,
) -> anyhow::Result<()> {
    let course_json = serde_json::to_string(&entry.course)?;
    let groups_json = serde_json::to_string(&entry.groups)?;
    conn.execute(
        "INSERT INTO course_groups(id, course_json, groups_json, sort_order, updated_at)
         VALUES(?, ?, ?, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
           course_json = excluded.course_json,
           groups_json = excluded.groups_json,
           sort_order = excluded.sort_order,
           updated_at = excluded.updated_at",
        (
            &entry.course.id,
            course_json,
            groups_json,
            sort_order as i64,
            Utc::now().to_rfc3339(),
        ),
    )?;
    Ok(())
}

pub fn delete_course_groups(conn: &Connection, ids: &[String]) -> anyhow::Result<usize> {
    let mut deleted = 0usize;
    for id in ids {
        deleted += conn.execute("DELETE FROM course_groups WHERE id = ?", [id])?;
    }
    Ok(deleted)
}

/// Swaps the whole workspace content in one transaction: every course record
/// is dropped, `courses` are written in order and the roster slot rewritten.
/// Returns how many records were dropped.
pub fn replace_all(
    conn: &Connection,
    roster_text: &str,
    courses: &[CourseGroups],
) -> anyhow::Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let deleted = tx.execute("DELETE FROM course_groups", [])?;
    for (pos, entry) in courses.iter().enumerate() {
        upsert_course_group(&tx, entry, pos)?;
    }
    save_roster_text(&tx, roster_text)?;
    tx.commit()?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Member;
    use crate::roster::Student;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn sample(id: &str, name: &str) -> CourseGroups {
        let mut g = Group::empty(format!("{id}-g1"));
        g.assignment_title = "Sorting".to_string();
        g.members.push(Member::new(Student::with_email("Ada", "1924250001")));
        CourseGroups {
            course: Course {
                id: id.to_string(),
                name: name.to_string(),
                assignment_notes: String::new(),
            },
            groups: vec![g],
        }
    }

    #[test]
    fn records_roundtrip_in_sort_order() {
        let ws = temp_dir("classgroups-db-roundtrip");
        let conn = open_db(&ws).expect("open");
        assert_eq!(load_roster_text(&conn).expect("roster"), None);

        save_roster_text(&conn, "Ada,1924250001").expect("save roster");
        save_roster_text(&conn, "Ada,1924250001\nBudi").expect("save roster again");
        assert_eq!(
            load_roster_text(&conn).expect("roster").as_deref(),
            Some("Ada,1924250001\nBudi")
        );

        upsert_course_group(&conn, &sample("b", "Basis Data"), 1).expect("upsert b");
        upsert_course_group(&conn, &sample("a", "Algoritma"), 0).expect("upsert a");
        let mut renamed = sample("a", "Algoritma Lanjut");
        renamed.groups.clear();
        upsert_course_group(&conn, &renamed, 0).expect("update a");

        let all = load_all_course_groups(&conn).expect("load");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].course.name, "Algoritma Lanjut");
        assert!(all[0].groups.is_empty());
        assert_eq!(all[1], sample("b", "Basis Data"));

        assert_eq!(
            delete_course_groups(&conn, &["a".to_string(), "zzz".to_string()]).expect("delete"),
            1
        );
        assert_eq!(load_all_course_groups(&conn).expect("load").len(), 1);

        drop(conn);
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn reset_clears_courses_and_rewrites_roster() {
        let ws = temp_dir("classgroups-db-reset");
        let conn = open_db(&ws).expect("open");
        save_roster_text(&conn, "Someone").expect("save");
        upsert_course_group(&conn, &sample("a", "A"), 0).expect("upsert");
        assert_eq!(replace_all(&conn, "Default,1", &[]).expect("reset"), 1);
        assert!(load_all_course_groups(&conn).expect("load").is_empty());
        assert_eq!(
            load_roster_text(&conn).expect("roster").as_deref(),
            Some("Default,1")
        );
        drop(conn);
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn replace_all_writes_courses_in_given_order() {
        let ws = temp_dir("classgroups-db-replace");
        let conn = open_db(&ws).expect("open");
        upsert_course_group(&conn, &sample("old", "Old"), 0).expect("upsert");
        let incoming = vec![sample("b", "B"), sample("a", "A")];
        assert_eq!(replace_all(&conn, "Ada", &incoming).expect("replace"), 1);
        assert_eq!(load_all_course_groups(&conn).expect("load"), incoming);
        assert_eq!(load_roster_text(&conn).expect("roster").as_deref(), Some("Ada"));
        drop(conn);
        let _ = std::fs::remove_dir_all(ws);
    }
}
