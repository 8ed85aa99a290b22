//! Portable workspace bundles.
//!
//! A bundle is a zip holding the roster text and one JSON record per course.
//! `manifest.json` lists the entries in course order with a SHA-256 of each,
//! so a bundle can be checked completely before anything is written.

use crate::model::CourseGroups;
use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const BUNDLE_FORMAT: &str = "classgroups-bundle-v1";
const MANIFEST_ENTRY: &str = "manifest.json";
const ROSTER_ENTRY: &str = "roster.txt";

/// Everything a workspace holds, in the order the daemon shows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSnapshot {
    pub roster_text: String,
    pub courses: Vec<CourseGroups>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    exported_at: String,
    roster_sha256: String,
    courses: Vec<ManifestCourse>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestCourse {
    id: String,
    entry: String,
    sha256: String,
}

#[derive(Debug, Clone)]
pub struct BundleSummary {
    pub course_count: usize,
    pub entry_count: usize,
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn course_entry_name(position: usize) -> String {
    format!("courses/{:04}.json", position)
}

pub fn write_bundle(
    snapshot: &WorkspaceSnapshot,
    out_path: &Path,
) -> anyhow::Result<BundleSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path)
        .with_context(|| format!("failed to create bundle {}", out_path.to_string_lossy()))?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut listed = Vec::with_capacity(snapshot.courses.len());
    for (pos, entry) in snapshot.courses.iter().enumerate() {
        let name = course_entry_name(pos);
        let bytes = serde_json::to_vec_pretty(entry)
            .with_context(|| format!("failed to serialize course {}", entry.course.id))?;
        zip.start_file(name.as_str(), opts)
            .with_context(|| format!("failed to start {name}"))?;
        zip.write_all(&bytes)
            .with_context(|| format!("failed to write {name}"))?;
        listed.push(ManifestCourse {
            id: entry.course.id.clone(),
            entry: name,
            sha256: sha256_hex(&bytes),
        });
    }

    zip.start_file(ROSTER_ENTRY, opts)
        .context("failed to start roster entry")?;
    zip.write_all(snapshot.roster_text.as_bytes())
        .context("failed to write roster entry")?;

    let manifest = Manifest {
        format: BUNDLE_FORMAT.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: Utc::now().to_rfc3339(),
        roster_sha256: sha256_hex(snapshot.roster_text.as_bytes()),
        courses: listed,
    };
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).context("failed to serialize manifest")?;
    zip.write_all(&manifest_bytes)
        .context("failed to write manifest entry")?;

    zip.finish().context("failed to finalize bundle")?;

    Ok(BundleSummary {
        course_count: snapshot.courses.len(),
        entry_count: snapshot.courses.len() + 2,
    })
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    archive
        .by_name(name)
        .with_context(|| format!("bundle missing {name}"))?
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to read {name}"))?;
    Ok(bytes)
}

fn check_digest(name: &str, bytes: &[u8], expected: &str) -> anyhow::Result<()> {
    let actual = sha256_hex(bytes);
    if actual != expected {
        bail!("checksum mismatch for {name}: manifest {expected} vs bundle {actual}");
    }
    Ok(())
}

/// Reads and fully validates a bundle. Nothing is returned unless every entry
/// matches its manifest digest and every course id is unique.
pub fn read_bundle(in_path: &Path) -> anyhow::Result<WorkspaceSnapshot> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("not a zip bundle")?;

    let manifest: Manifest = serde_json::from_slice(&read_entry(&mut archive, MANIFEST_ENTRY)?)
        .context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT {
        bail!("unsupported bundle format: {}", manifest.format);
    }

    let roster_bytes = read_entry(&mut archive, ROSTER_ENTRY)?;
    check_digest(ROSTER_ENTRY, &roster_bytes, &manifest.roster_sha256)?;
    let roster_text = String::from_utf8(roster_bytes).context("roster.txt is not UTF-8")?;

    let mut seen = HashSet::new();
    let mut courses = Vec::with_capacity(manifest.courses.len());
    for listed in &manifest.courses {
        let bytes = read_entry(&mut archive, &listed.entry)?;
        check_digest(&listed.entry, &bytes, &listed.sha256)?;
        let entry: CourseGroups = serde_json::from_slice(&bytes)
            .with_context(|| format!("{} is not a course record", listed.entry))?;
        if entry.course.id != listed.id {
            return Err(anyhow!(
                "{} holds course {} but the manifest lists {}",
                listed.entry,
                entry.course.id,
                listed.id
            ));
        }
        if !seen.insert(entry.course.id.clone()) {
            bail!("course {} appears twice", entry.course.id);
        }
        courses.push(entry);
    }

    Ok(WorkspaceSnapshot {
        roster_text,
        courses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_keep_course_order_lexically() {
        assert_eq!(course_entry_name(0), "courses/0000.json");
        assert!(course_entry_name(9) < course_entry_name(10));
    }

    #[test]
    fn digest_mismatch_names_the_entry() {
        let err = check_digest("roster.txt", b"abc", "00").expect_err("mismatch");
        assert!(err.to_string().contains("roster.txt"));
        assert!(check_digest("roster.txt", b"abc", &sha256_hex(b"abc")).is_ok());
    }
}
