use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ROSTER_DEBOUNCE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: Option<PathBuf>,
    pub admin_user: String,
    pub admin_password: String,
    pub roster_debounce_ms: u64,
    /// Roster text used for fresh workspaces and after a reset.
    pub default_roster: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            admin_user: "admin".to_string(),
            admin_password: "admin".to_string(),
            roster_debounce_ms: DEFAULT_ROSTER_DEBOUNCE_MS,
            default_roster: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Config::default();
        if let Some(p) = lookup("CLASSGROUPS_WORKSPACE").filter(|v| !v.trim().is_empty()) {
            cfg.workspace = Some(PathBuf::from(p.trim()));
        }
        if let Some(u) = lookup("CLASSGROUPS_ADMIN_USER") {
            cfg.admin_user = u;
        }
        if let Some(p) = lookup("CLASSGROUPS_ADMIN_PASSWORD") {
            cfg.admin_password = p;
        }
        if let Some(ms) = lookup("CLASSGROUPS_ROSTER_DEBOUNCE_MS") {
            cfg.roster_debounce_ms = ms
                .trim()
                .parse()
                .with_context(|| format!("CLASSGROUPS_ROSTER_DEBOUNCE_MS is not a number: {ms}"))?;
        }
        if let Some(path) = lookup("CLASSGROUPS_DEFAULT_ROSTER").filter(|v| !v.trim().is_empty()) {
            cfg.default_roster = std::fs::read_to_string(path.trim())
                .with_context(|| format!("failed to read default roster {}", path.trim()))?;
        }
        Ok(cfg)
    }

    pub fn roster_debounce(&self) -> Duration {
        Duration::from_millis(self.roster_debounce_ms)
    }

    pub fn credentials_match(&self, user: &str, password: &str) -> bool {
        user == self.admin_user && password == self.admin_password
    }
}
