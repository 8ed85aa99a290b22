use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::Connection;
use serde::Deserialize;

use crate::config::Config;
use crate::db;
use crate::debounce::Debouncer;
use crate::roster::{parse_roster, Student};
use crate::store::GroupStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything one daemon process owns. Handlers receive it by `&mut`, so the
/// aggregate store is never ambient global state.
pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub admin: bool,
    pub roster_text: String,
    pub roster: Vec<Student>,
    pub store: GroupStore,
    pub roster_writes: Debouncer<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let roster_writes = Debouncer::new(config.roster_debounce());
        let roster_text = config.default_roster.clone();
        let roster = parse_roster(&roster_text);
        Self {
            config,
            workspace: None,
            db: None,
            admin: false,
            roster_text,
            roster,
            store: GroupStore::new(),
            roster_writes,
        }
    }

    /// Re-parses the roster synchronously; the persisted copy catches up after
    /// the debounce quiet period.
    pub fn set_roster_text(&mut self, text: String, now: Instant) {
        self.roster = parse_roster(&text);
        self.roster_text = text.clone();
        if self.db.is_some() {
            self.roster_writes.push(text, now);
        }
    }

    /// Switches to the workspace at `path`. On failure the previously open
    /// workspace stays selected and untouched.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        if let Err(e) = self.flush_roster() {
            tracing::warn!(error = %e, "could not flush roster before switching workspace");
        }

        let conn = db::open_db(path)?;
        let roster_text = match db::load_roster_text(&conn)? {
            Some(text) => text,
            None => {
                db::save_roster_text(&conn, &self.config.default_roster)?;
                self.config.default_roster.clone()
            }
        };
        let entries = db::load_all_course_groups(&conn)?;

        self.roster = parse_roster(&roster_text);
        self.roster_text = roster_text;
        self.store = GroupStore::from_entries(entries);
        self.workspace = Some(path.to_path_buf());
        self.db = Some(conn);
        tracing::info!(
            workspace = %path.to_string_lossy(),
            courses = self.store.entries().len(),
            students = self.roster.len(),
            "workspace opened"
        );
        Ok(())
    }

    /// Writes a pending roster text now. Returns whether anything was written.
    pub fn flush_roster(&mut self) -> anyhow::Result<bool> {
        let Some(text) = self.roster_writes.take() else {
            return Ok(false);
        };
        let Some(conn) = self.db.as_ref() else {
            return Ok(false);
        };
        db::save_roster_text(conn, &text)?;
        tracing::debug!(bytes = text.len(), "roster text saved");
        Ok(true)
    }

    pub fn flush_roster_if_due(&mut self, now: Instant) {
        let Some(text) = self.roster_writes.take_if_due(now) else {
            return;
        };
        let Some(conn) = self.db.as_ref() else {
            return;
        };
        match db::save_roster_text(conn, &text) {
            Ok(()) => tracing::debug!(bytes = text.len(), "roster text saved"),
            Err(e) => tracing::warn!(error = %e, "debounced roster save failed"),
        }
    }

    /// Upserts one course record. Failures are logged and returned as a message;
    /// the in-memory edit stands either way.
    pub fn persist_course(&self, course_id: &str) -> Option<String> {
        let conn = self.db.as_ref()?;
        let pos = self.store.position(course_id)?;
        let entry = &self.store.entries()[pos];
        match db::upsert_course_group(conn, entry, pos) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(course_id, error = %e, "course save failed");
                Some(e.to_string())
            }
        }
    }

    pub fn persist_all_courses(&self) -> Option<String> {
        let conn = self.db.as_ref()?;
        let mut failures = Vec::new();
        for (pos, entry) in self.store.entries().iter().enumerate() {
            if let Err(e) = db::upsert_course_group(conn, entry, pos) {
                tracing::warn!(course_id = %entry.course.id, error = %e, "course save failed");
                failures.push(e.to_string());
            }
        }
        if failures.is_empty() {
            None
        } else {
            Some(failures.join("; "))
        }
    }
}
