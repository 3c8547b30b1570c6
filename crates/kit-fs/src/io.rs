//! Crash-safe single-file writes
//!
//! Every write goes to a temporary file in the target's own directory, is
//! flushed and fsynced, then renamed over the target. The rename stays on one
//! filesystem, so readers see either the old or the new content.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Options for a single atomic write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Copy a pre-existing target to `<target>.bak` before writing.
    pub create_backup: bool,
}

impl WriteOptions {
    pub fn with_backup() -> Self {
        Self {
            create_backup: true,
        }
    }
}

/// Result of a successful atomic write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The file that was written.
    pub path: PathBuf,
    /// Backup of the previous content, if one was taken.
    pub backup: Option<PathBuf>,
}

/// Path of the backup taken for `target` (`<target>.bak`).
pub fn backup_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".bak");
    target.with_file_name(name)
}

/// Write `target` atomically, letting `write` fill the temporary file.
///
/// If `write` (or any later step) fails, the temporary file is removed and,
/// when a backup was taken, the backup is copied back over the target. The
/// original error is returned. Backups are never pruned.
pub fn write_with<F>(target: &Path, options: WriteOptions, write: F) -> Result<WriteOutcome>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let backup = if options.create_backup && target.is_file() {
        let backup = backup_path(target);
        fs::copy(target, &backup).map_err(|e| Error::io(&backup, e))?;
        tracing::debug!(target = %target.display(), backup = %backup.display(), "Backed up existing file");
        Some(backup)
    } else {
        None
    };

    match write_via_temp(target, &dir, write) {
        Ok(()) => Ok(WriteOutcome {
            path: target.to_path_buf(),
            backup,
        }),
        Err(err) => {
            if let Some(backup) = &backup {
                match fs::copy(backup, target) {
                    Ok(_) => tracing::debug!(target = %target.display(), "Restored backup after failed write"),
                    Err(restore) => tracing::warn!(
                        target = %target.display(),
                        error = %restore,
                        "Could not restore backup after failed write"
                    ),
                }
            }
            Err(err)
        }
    }
}

fn write_via_temp<F>(target: &Path, dir: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Dropping the handle on any early return deletes the temp file.
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io(dir, e))?;

    write(temp.as_file_mut()).map_err(|e| Error::io(target, e))?;
    temp.as_file_mut()
        .flush()
        .map_err(|e| Error::io(target, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(target, e))?;

    temp.persist(target).map_err(|e| Error::io(target, e.error))?;
    Ok(())
}

/// Write bytes to `target` atomically without a backup.
pub fn write_atomic(target: &Path, content: &[u8]) -> Result<WriteOutcome> {
    write_with(target, WriteOptions::default(), |file| file.write_all(content))
}

/// Stream `source` into `target` through an atomic write.
pub fn copy_atomic(source: &Path, target: &Path, options: WriteOptions) -> Result<WriteOutcome> {
    let mut input = File::open(source).map_err(|e| Error::io(source, e))?;
    write_with(target, options, |file| io::copy(&mut input, file).map(|_| ()))
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read text content, returning `None` when the file does not exist.
pub fn read_text_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}
