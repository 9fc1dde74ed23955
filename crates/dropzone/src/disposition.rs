//! Terminal handling of a processed file: delete it, or move it to quarantine.

use crate::error::{IntakeError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Delete a source file after its archive has been extracted.
pub fn delete_source(source: &Path) -> Result<()> {
    fs::remove_file(source).map_err(|e| IntakeError::disposition("delete", source, e))?;
    info!(file = %source.display(), "Cleanup: source deleted");
    Ok(())
}

/// Move a source file into `rejected_dir`, replacing a file of the same name.
///
/// Two steps: move the file, then remove the source path. The second step is
/// normally a no-op because the move already took the file away; it matters
/// when the move had to fall back to a copy.
pub fn quarantine(source: &Path, rejected_dir: &Path) -> Result<PathBuf> {
    quarantine_with(source, rejected_dir, |from: &Path, to: &Path| fs::rename(from, to))
}

fn quarantine_with<F>(source: &Path, rejected_dir: &Path, rename: F) -> Result<PathBuf>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    let file_name = source.file_name().ok_or_else(|| {
        IntakeError::disposition(
            "quarantine",
            source,
            io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
        )
    })?;
    let target = rejected_dir.join(file_name);

    move_replacing(source, &target, rename).map_err(|e| IntakeError::disposition("quarantine", source, e))?;

    match fs::remove_file(source) {
        Ok(()) => debug!(file = %source.display(), "Removed source left behind by copy"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(IntakeError::disposition("remove quarantined source", source, e));
        }
    }

    info!(file = %source.display(), target = %target.display(), "Moved to rejected files");
    Ok(target)
}

/// Rename, falling back to copy when the rename is refused (for example when
/// the rejected directory lives on another filesystem).
fn move_replacing<F>(source: &Path, target: &Path, rename: F) -> io::Result<()>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    match rename(source, target) {
        Ok(()) => Ok(()),
        Err(rename_err) if source.is_file() => {
            warn!(
                file = %source.display(),
                error = %rename_err,
                "Rename into rejected directory failed, copying instead"
            );
            if target.is_file() {
                fs::remove_file(target)?;
            }
            fs::copy(source, target).map(|_| ())
        }
        Err(rename_err) => Err(rename_err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let upload = temp.path().join("in");
        let rejected = temp.path().join("bad");
        fs::create_dir_all(&upload).unwrap();
        fs::create_dir_all(&rejected).unwrap();
        (temp, upload, rejected)
    }

    #[test]
    fn test_delete_source() {
        let (_temp, upload, _) = setup();
        let file = upload.join("FileA.zip");
        fs::write(&file, b"zip").unwrap();

        delete_source(&file).unwrap();
        assert!(!file.exists());
    }

    #[test]
    fn test_delete_missing_source_is_error() {
        let (_temp, upload, _) = setup();
        let err = delete_source(&upload.join("gone.zip")).unwrap_err();
        assert!(matches!(err, IntakeError::Disposition { action: "delete", .. }));
    }

    #[test]
    fn test_quarantine_moves_file() {
        let (_temp, upload, rejected) = setup();
        let file = upload.join("StaleFile.txt");
        fs::write(&file, b"stale").unwrap();

        let target = quarantine(&file, &rejected).unwrap();

        assert_eq!(target, rejected.join("StaleFile.txt"));
        assert!(!file.exists());
        assert_eq!(fs::read(&target).unwrap(), b"stale");
    }

    #[test]
    fn test_quarantine_replaces_existing() {
        let (_temp, upload, rejected) = setup();
        fs::write(rejected.join("FileC.zip"), b"previous").unwrap();
        let file = upload.join("FileC.zip");
        fs::write(&file, b"current").unwrap();

        quarantine(&file, &rejected).unwrap();

        assert_eq!(fs::read(rejected.join("FileC.zip")).unwrap(), b"current");
        assert!(!file.exists());
    }

    #[test]
    fn test_quarantine_missing_source_is_error() {
        let (_temp, upload, rejected) = setup();
        let err = quarantine(&upload.join("gone.zip"), &rejected).unwrap_err();
        assert!(matches!(
            err,
            IntakeError::Disposition {
                action: "quarantine",
                ..
            }
        ));
        assert!(!rejected.join("gone.zip").exists());
    }

    #[test]
    fn test_quarantine_into_missing_directory_leaves_source() {
        let (temp, upload, _) = setup();
        let file = upload.join("FileC.zip");
        fs::write(&file, b"current").unwrap();

        let result = quarantine(&file, &temp.path().join("no_such_dir"));
        assert!(result.is_err());
        // the file stays for the next scan
        assert!(file.exists());
    }

    fn refuse_rename(_: &Path, _: &Path) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "cross-device link"))
    }

    #[test]
    fn test_quarantine_copies_when_rename_refused() {
        let (_temp, upload, rejected) = setup();
        let file = upload.join("FileC.zip");
        fs::write(&file, b"current").unwrap();
        fs::write(rejected.join("FileC.zip"), b"older").unwrap();

        let target = quarantine_with(&file, &rejected, refuse_rename).unwrap();

        assert_eq!(target, rejected.join("FileC.zip"));
        assert_eq!(fs::read(&target).unwrap(), b"current");
        // the copy left the source behind; the second step removed it
        assert!(!file.exists());
    }

    #[test]
    fn test_refused_rename_of_missing_source_is_error() {
        let (_temp, upload, rejected) = setup();

        let result = quarantine_with(&upload.join("gone.zip"), &rejected, refuse_rename);

        assert!(result.is_err());
        assert!(!rejected.join("gone.zip").exists());
    }
}
