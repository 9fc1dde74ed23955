//! Archive extraction
//!
//! Best effort: an entry that cannot be written is logged and skipped, and the
//! remaining entries are still extracted. Only failing to open the archive or
//! to create the destination root is an error.

use crate::archive::open_archive;
use crate::error::Result;
use crate::types::{EntryFailure, ExtractReport};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, error};

/// Extract every entry of `archive_path` under `destination_root`.
///
/// Existing files at the same paths are overwritten.
pub fn extract(archive_path: &Path, destination_root: &Path) -> Result<ExtractReport> {
    let mut archive = open_archive(archive_path)?;
    fs::create_dir_all(destination_root)?;

    let mut report = ExtractReport::default();
    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                let failure = EntryFailure {
                    entry: format!("#{}", index),
                    message: e.to_string(),
                };
                log_failure(archive_path, destination_root, &failure);
                report.failures.push(failure);
                continue;
            }
        };

        let name = entry.name().to_string();
        let Some(relative) = entry.enclosed_name() else {
            let failure = EntryFailure {
                entry: name,
                message: "entry path escapes the destination".to_string(),
            };
            log_failure(archive_path, destination_root, &failure);
            report.failures.push(failure);
            continue;
        };
        let target = destination_root.join(relative);

        let written = if entry.is_dir() {
            fs::create_dir_all(&target).map(|()| EntryKind::Dir)
        } else {
            write_file(&mut entry, &target).map(|()| EntryKind::File)
        };

        match written {
            Ok(EntryKind::Dir) => report.dirs_created += 1,
            Ok(EntryKind::File) => {
                debug!(entry = %name, target = %target.display(), "Extracted entry");
                report.files_written += 1;
            }
            Err(e) => {
                let failure = EntryFailure {
                    entry: name,
                    message: e.to_string(),
                };
                log_failure(archive_path, destination_root, &failure);
                report.failures.push(failure);
            }
        }
    }

    Ok(report)
}

enum EntryKind {
    Dir,
    File,
}

fn write_file<R: io::Read>(reader: &mut R, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(target)?;
    io::copy(reader, &mut out)?;
    Ok(())
}

fn log_failure(archive_path: &Path, destination_root: &Path, failure: &EntryFailure) {
    error!(
        archive = %archive_path.display(),
        destination = %destination_root.display(),
        entry = %failure.entry,
        error = %failure.message,
        "Error extracting entry"
    );
}
