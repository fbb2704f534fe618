//! Work queue for batch verification.
//!
//! The manifest is loaded up front and every entry is pushed onto a
//! std::sync::mpsc channel; worker threads share the receiving end.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// One manifest row: a certificate image and the claim it backs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub student: Option<String>,
    /// Image path, relative paths resolve against the manifest's directory
    pub image: String,
    pub skill: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub projects: u32,
    #[serde(default)]
    pub repo: Option<String>,
}

/// A work item for a batch worker.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Position in the manifest (0-based)
    pub index: usize,
    pub entry: ManifestEntry,
    /// Resolved image location
    pub image_path: PathBuf,
}

/// Reads a JSON manifest (array of entries) into jobs.
pub fn load_manifest(path: &Path) -> Result<Vec<BatchJob>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let image = PathBuf::from(&entry.image);
            let image_path = if image.is_absolute() {
                image
            } else {
                base_dir.join(image)
            };
            BatchJob {
                index,
                entry,
                image_path,
            }
        })
        .collect())
}

/// Creates a new work queue.
///
/// Returns a tuple of (sender, receiver). The receiver sits behind a mutex
/// so several workers can pull from it; the channel is unbounded.
pub fn create_work_queue() -> (Sender<BatchJob>, Mutex<Receiver<BatchJob>>) {
    let (sender, receiver) = channel();
    (sender, Mutex::new(receiver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_manifest_resolves_relative_images() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        fs::write(
            &manifest,
            r#"[
                { "student": "s1", "image": "certs/a.png", "skill": "Python", "projects": 2 },
                { "image": "/abs/b.png", "skill": "Rust", "repo": "https://github.com/x/y" }
            ]"#,
        )
        .unwrap();

        let jobs = load_manifest(&manifest).unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].image_path, dir.path().join("certs/a.png"));
        assert_eq!(jobs[0].entry.projects, 2);
        assert_eq!(jobs[1].index, 1);
        assert_eq!(jobs[1].entry.projects, 0);
        assert_eq!(jobs[1].entry.student, None);
        assert_eq!(jobs[1].entry.repo.as_deref(), Some("https://github.com/x/y"));
    }

    #[test]
    fn test_load_manifest_rejects_bad_json() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        fs::write(&manifest, r#"{ "image": "a.png" }"#).unwrap();

        assert!(load_manifest(&manifest).is_err());
    }

    #[test]
    fn test_work_queue_send_receive() {
        let (sender, receiver) = create_work_queue();

        sender
            .send(BatchJob {
                index: 7,
                entry: ManifestEntry {
                    student: None,
                    image: "a.png".into(),
                    skill: "Go".into(),
                    level: None,
                    projects: 1,
                    repo: None,
                },
                image_path: PathBuf::from("a.png"),
            })
            .expect("Failed to send");
        drop(sender);

        let receiver = receiver.lock().unwrap();
        assert_eq!(receiver.recv().unwrap().index, 7);
        assert!(receiver.recv().is_err());
    }
}
