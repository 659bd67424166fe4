use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app::ports::WrittenFile;
use crate::error::Result;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn temp_path_for(path: &Path) -> PathBuf {
    sibling(path, ".tmp")
}

fn backup_path_for(path: &Path) -> PathBuf {
    sibling(path, ".bak")
}

/// Write `bytes` next to `path` without touching `path` itself.
fn stage(path: &Path, bytes: &[u8]) -> Result<WrittenFile> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let temp = temp_path_for(path);
    if let Err(e) = fs::write(&temp, bytes) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(WrittenFile {
        path: path.to_path_buf(),
        bytes: bytes.len() as u64,
        sha256: sha256_hex(bytes),
    })
}

/// Write `bytes` to a sibling temp file and rename it over `path`.
/// Readers never observe a half-written file.
pub fn commit(path: &Path, bytes: &[u8]) -> Result<WrittenFile> {
    let written = stage(path, bytes)?;
    let temp = temp_path_for(path);
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(written)
}

/// Files written and removed by a committed [`FileSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommittedFiles {
    /// In the order the writes were added
    pub written: Vec<WrittenFile>,
    /// Removals whose target existed
    pub removed: Vec<PathBuf>,
}

/// Writes and removals applied together.
///
/// Every write is staged first, existing destinations are moved aside, then the staged files
/// are renamed into place. Any failure puts the moved-aside files back, so the destinations
/// end up either all updated or all as they were.
#[derive(Debug, Default)]
pub struct FileSet {
    writes: Vec<(PathBuf, Vec<u8>)>,
    removals: Vec<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.writes.push((path.into(), bytes));
    }

    pub fn remove(&mut self, path: impl Into<PathBuf>) {
        self.removals.push(path.into());
    }

    pub fn commit(self) -> Result<CommittedFiles> {
        let mut staged: Vec<WrittenFile> = Vec::new();
        for (path, bytes) in &self.writes {
            match stage(path, bytes) {
                Ok(file) => staged.push(file),
                Err(e) => {
                    remove_temps(&staged);
                    return Err(e);
                }
            }
        }

        let mut moved_aside: Vec<(PathBuf, PathBuf)> = Vec::new();
        let targets = self.writes.iter().map(|(path, _)| path).chain(&self.removals);
        for path in targets {
            if !path.exists() {
                continue;
            }
            let backup = backup_path_for(path);
            if let Err(e) = fs::rename(path, &backup) {
                restore(&moved_aside);
                remove_temps(&staged);
                return Err(e.into());
            }
            moved_aside.push((path.clone(), backup));
        }

        for (installed, file) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(temp_path_for(&file.path), &file.path) {
                for done in &staged[..installed] {
                    let _ = fs::remove_file(&done.path);
                }
                remove_temps(&staged[installed..]);
                restore(&moved_aside);
                return Err(e.into());
            }
        }

        let mut removed = Vec::new();
        for (path, backup) in moved_aside {
            if let Err(e) = fs::remove_file(&backup) {
                warn!(path = %backup.display(), error = %e, "Could not remove backup file");
            }
            if self.removals.contains(&path) {
                removed.push(path);
            }
        }

        Ok(CommittedFiles {
            written: staged,
            removed,
        })
    }
}

fn remove_temps(staged: &[WrittenFile]) {
    for file in staged {
        let _ = fs::remove_file(temp_path_for(&file.path));
    }
}

fn restore(moved_aside: &[(PathBuf, PathBuf)]) {
    for (path, backup) in moved_aside.iter().rev() {
        if let Err(e) = fs::rename(backup, path) {
            warn!(path = %path.display(), error = %e, "Could not restore file after failed commit");
        }
    }
}
