use classgroupsd::backup::{self, WorkspaceSnapshot};
use classgroupsd::model::{Course, CourseGroups, Group, Member};
use classgroupsd::roster::Student;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
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

fn course(id: &str, name: &str, title: &str, members: &[&str]) -> CourseGroups {
    let mut group = Group::empty(format!("{id}-g1"));
    group.assignment_title = title.to_string();
    group.presentation_time = "2024-03-18".to_string();
    group.members = members
        .iter()
        .map(|n| Member::new(Student::new(*n)))
        .collect();
    CourseGroups {
        course: Course {
            id: id.to_string(),
            name: name.to_string(),
            assignment_notes: "Kumpul via LMS".to_string(),
        },
        groups: vec![group],
    }
}

fn sample_snapshot() -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        roster_text: "Ada,ada@kampus.ac.id\nBudi".to_string(),
        courses: vec![
            course("1710720000000", "Struktur Data", "Stack", &["Ada"]),
            course("1710720000000-1", "Basis Data", "ERD", &["Budi"]),
        ],
    }
}

fn read_zip_entry(path: &Path, name: &str) -> Vec<u8> {
    let f = File::open(path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut bytes = Vec::new();
    archive
        .by_name(name)
        .expect("bundle entry")
        .read_to_end(&mut bytes)
        .expect("read entry");
    bytes
}

/// Rewrites `src` into `dst`, passing each entry through `edit`.
fn rewrite_bundle(src: &Path, dst: &Path, edit: impl Fn(&str, Vec<u8>) -> Vec<u8>) {
    let f = File::open(src).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let out = File::create(dst).expect("create bundle");
    let mut zip = zip::ZipWriter::new(out);
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).expect("entry");
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).expect("read entry");
        zip.start_file(name.as_str(), zip::write::FileOptions::default())
            .expect("start entry");
        zip.write_all(&edit(&name, bytes)).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

#[test]
fn bundle_roundtrip_keeps_roster_and_course_order() {
    let out_dir = temp_dir("classgroups-bundle-out");
    let bundle_path = out_dir.join("nested").join("workspace.classgroups.zip");
    let snapshot = sample_snapshot();

    let summary = backup::write_bundle(&snapshot, &bundle_path).expect("write bundle");
    assert_eq!(summary.course_count, 2);
    assert_eq!(summary.entry_count, 4);

    let manifest: serde_json::Value =
        serde_json::from_slice(&read_zip_entry(&bundle_path, "manifest.json")).expect("manifest");
    assert_eq!(manifest["format"], serde_json::json!(backup::BUNDLE_FORMAT));
    assert_eq!(manifest["courses"][1]["id"], serde_json::json!("1710720000000-1"));
    assert_eq!(
        read_zip_entry(&bundle_path, "roster.txt"),
        snapshot.roster_text.as_bytes()
    );

    let restored = backup::read_bundle(&bundle_path).expect("read bundle");
    assert_eq!(restored, snapshot);

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn edited_course_record_fails_its_checksum() {
    let out_dir = temp_dir("classgroups-bundle-tamper");
    let original = out_dir.join("original.zip");
    let tampered = out_dir.join("tampered.zip");
    backup::write_bundle(&sample_snapshot(), &original).expect("write bundle");

    rewrite_bundle(&original, &tampered, |name, bytes| {
        if name == "courses/0001.json" {
            String::from_utf8(bytes)
                .expect("utf8")
                .replace("Budi", "Mallory")
                .into_bytes()
        } else {
            bytes
        }
    });

    let err = backup::read_bundle(&tampered).expect_err("tampered bundle must fail");
    let message = format!("{err:#}");
    assert!(message.contains("checksum mismatch"), "{message}");
    assert!(message.contains("courses/0001.json"), "{message}");

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn foreign_formats_are_rejected() {
    let out_dir = temp_dir("classgroups-bundle-foreign");
    let original = out_dir.join("original.zip");
    let renamed = out_dir.join("renamed.zip");
    backup::write_bundle(&sample_snapshot(), &original).expect("write bundle");

    rewrite_bundle(&original, &renamed, |name, bytes| {
        if name == "manifest.json" {
            String::from_utf8(bytes)
                .expect("utf8")
                .replace(backup::BUNDLE_FORMAT, "other-app-v9")
                .into_bytes()
        } else {
            bytes
        }
    });
    let err = backup::read_bundle(&renamed).expect_err("unknown format");
    assert!(format!("{err:#}").contains("unsupported bundle format"));

    let raw = out_dir.join("copy.sqlite3");
    std::fs::write(&raw, b"SQLite format 3\0").expect("write raw file");
    assert!(backup::read_bundle(&raw).is_err());

    let _ = std::fs::remove_dir_all(out_dir);
}
