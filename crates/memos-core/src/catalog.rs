//! Recording catalog read straight from the Voice Memos directory

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::RECORDING_EXTENSION;
use crate::error::StorageUnavailable;

/// A recording file, built fresh on every listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Local>,
}

impl Recording {
    pub fn size_kib(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Read-only view over the recordings directory
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Full path of a recording in this catalog
    pub fn resolve(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Up to `limit` recordings, newest first. A limit of zero or below
    /// yields nothing.
    pub fn list(&self, limit: i64) -> Result<Vec<Recording>, StorageUnavailable> {
        debug!("Listing recordings in {}", self.root.display());

        let entries = std::fs::read_dir(&self.root).map_err(|source| StorageUnavailable {
            path: self.root.clone(),
            source,
        })?;

        let suffix = format!(".{}", RECORDING_EXTENSION);
        let mut recordings = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(&suffix) {
                continue;
            }

            // Follows symlinks, unlike DirEntry::metadata
            let metadata = match std::fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to stat {}: {}", name, e);
                    continue;
                }
            };
            let modified = match metadata.modified() {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("No modification time for {}: {}", name, e);
                    continue;
                }
            };

            recordings.push(Recording {
                name,
                size_bytes: metadata.len(),
                modified_at: DateTime::<Local>::from(modified),
            });
        }

        recordings.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        recordings.truncate(limit.max(0) as usize);

        Ok(recordings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_recording(dir: &Path, name: &str, bytes: usize, age_secs: u64) {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[test]
    fn test_list_filters_extension() {
        let temp = TempDir::new().unwrap();
        write_recording(temp.path(), "memo1.m4a", 10, 30);
        write_recording(temp.path(), "memo2.m4a", 10, 20);
        write_recording(temp.path(), "other.txt", 10, 10);
        write_recording(temp.path(), "memo3.m4a.bak", 10, 5);

        let catalog = Catalog::new(temp.path());
        let recordings = catalog.list(20).unwrap();
        let names: Vec<_> = recordings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["memo2.m4a", "memo1.m4a"]);
    }

    #[test]
    fn test_list_sorted_newest_first() {
        let temp = TempDir::new().unwrap();
        write_recording(temp.path(), "old.m4a", 1, 3000);
        write_recording(temp.path(), "new.m4a", 1, 10);
        write_recording(temp.path(), "mid.m4a", 1, 600);

        let recordings = Catalog::new(temp.path()).list(20).unwrap();
        let names: Vec<_> = recordings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["new.m4a", "mid.m4a", "old.m4a"]);
        assert!(recordings[0].modified_at >= recordings[1].modified_at);
    }

    #[test]
    fn test_list_truncates_after_sorting() {
        let temp = TempDir::new().unwrap();
        for i in 0..5u64 {
            write_recording(temp.path(), &format!("memo{}.m4a", i), 1, 100 * (i + 1));
        }

        let catalog = Catalog::new(temp.path());
        let recordings = catalog.list(2).unwrap();
        let names: Vec<_> = recordings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["memo0.m4a", "memo1.m4a"]);
        assert_eq!(catalog.list(100).unwrap().len(), 5);
    }

    #[test]
    fn test_list_non_positive_limit_is_empty() {
        let temp = TempDir::new().unwrap();
        write_recording(temp.path(), "memo.m4a", 1, 1);

        let catalog = Catalog::new(temp.path());
        assert!(catalog.list(0).unwrap().is_empty());
        assert!(catalog.list(-5).unwrap().is_empty());
    }

    #[test]
    fn test_list_reports_size() {
        let temp = TempDir::new().unwrap();
        write_recording(temp.path(), "memo.m4a", 2560, 1);

        let recordings = Catalog::new(temp.path()).list(1).unwrap();
        assert_eq!(recordings[0].size_bytes, 2560);
        assert!((recordings[0].size_kib() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_list_skips_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("folder.m4a")).unwrap();
        write_recording(temp.path(), "memo.m4a", 1, 1);

        let recordings = Catalog::new(temp.path()).list(20).unwrap();
        assert_eq!(recordings.len(), 1);
        assert_eq!(recordings[0].name, "memo.m4a");
    }

    #[cfg(unix)]
    #[test]
    fn test_list_follows_symlinks() {
        let temp = TempDir::new().unwrap();
        write_recording(temp.path(), "real.data", 4096, 60);
        std::os::unix::fs::symlink(temp.path().join("real.data"), temp.path().join("linked.m4a"))
            .unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.data"), temp.path().join("dangling.m4a"))
            .unwrap();

        let recordings = Catalog::new(temp.path()).list(20).unwrap();
        let names: Vec<_> = recordings.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["linked.m4a"]);
        assert_eq!(recordings[0].size_bytes, 4096);
    }

    #[test]
    fn test_empty_directory_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(Catalog::new(temp.path()).list(20).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("Recordings");
        let err = Catalog::new(&missing).list(20).unwrap_err();
        assert_eq!(err.path, missing);
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_resolve() {
        let catalog = Catalog::new("/tmp/Recordings");
        assert_eq!(
            catalog.resolve("memo.m4a"),
            PathBuf::from("/tmp/Recordings/memo.m4a")
        );
    }
}
