//! Shared fixtures for the end-to-end tests

#![allow(dead_code)]

use dropzone::{IntakeConfig, RuleConfig};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const FILE_A: &str = "FileA-2025-07-13.zip";
pub const FILE_B: &str = "FileB-20250713.zip";
pub const FILE_C: &str = "FileC-20250713.zip";
pub const STALE: &str = "StaleFile.txt";

/// Temp directories laid out like a real deployment
pub struct TestEnv {
    /// Temp directory (cleaned up on drop)
    _temp: TempDir,
    pub config: IntakeConfig,
}

impl TestEnv {
    pub fn new(stale_file_wait_ms: u64) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let config = IntakeConfig {
            upload_dir: temp.path().join("files_in"),
            destination_base: temp.path().join("files_out"),
            rejected_dir: temp.path().join("files_bad"),
            stale_file_wait_ms,
            poll_interval_ms: 50,
            rules: vec![
                RuleConfig {
                    pattern: r"FileA-\d{4}-\d{2}-\d{2}\.zip".to_string(),
                    expected_entry_count: 3,
                    destination: "FileA".to_string(),
                },
                RuleConfig {
                    pattern: r"File[BC]-\d{8}\.zip".to_string(),
                    expected_entry_count: 2,
                    destination: "FileB".to_string(),
                },
            ],
        };
        config
            .ensure_directories()
            .expect("Failed to create intake dirs");
        Self {
            _temp: temp,
            config,
        }
    }

    pub fn upload_path(&self, name: &str) -> PathBuf {
        self.config.upload_dir.join(name)
    }

    pub fn out(&self, rel: &str) -> PathBuf {
        self.config.destination_base.join(rel)
    }

    pub fn rejected(&self, name: &str) -> PathBuf {
        self.config.rejected_dir.join(name)
    }

    pub fn write_upload(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.upload_path(name);
        fs::write(&path, content).expect("Failed to write upload");
        path
    }

    pub fn upload_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.config.upload_dir)
            .expect("Failed to list upload dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// FileA: one directory and two files (3 entries)
pub fn file_a_zip() -> Vec<u8> {
    zip_bytes(&[
        ("reports/", None),
        ("reports/summary.txt", Some(b"summary".as_slice())),
        ("data.csv", Some(b"id,value\n1,10\n2,20\n".as_slice())),
    ])
}

/// FileB: two files (2 entries)
pub fn file_b_zip() -> Vec<u8> {
    zip_bytes(&[
        ("b1.txt", Some(b"first".as_slice())),
        ("b2.txt", Some(b"second".as_slice())),
    ])
}

/// FileC: matches the FileB rule but holds 3 entries instead of 2
pub fn file_c_zip() -> Vec<u8> {
    zip_bytes(&[
        ("c1.txt", Some(b"1".as_slice())),
        ("c2.txt", Some(b"2".as_slice())),
        ("c3.txt", Some(b"3".as_slice())),
    ])
}

/// Build a zip in memory. `None` content marks a directory entry.
pub fn zip_bytes(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // Fixed timestamp so the same entries always produce the same bytes
    let options = SimpleFileOptions::default()
        .last_modified_time(
            zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0).expect("Valid date"),
        )
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        match content {
            None => zip.add_directory(*name, options).unwrap(),
            Some(bytes) => {
                zip.start_file(*name, options).unwrap();
                zip.write_all(bytes).unwrap();
            }
        }
    }
    zip.finish().unwrap().into_inner()
}

/// Push a file's mtime far into the past.
pub fn make_stale(path: &Path) {
    set_file_mtime(path, FileTime::from_unix_time(1_000_000, 0)).expect("Failed to set mtime");
}

/// Write `content` to `dest` in small chunks with a pause after each, the way
/// a slow network copy would.
pub fn slow_copy(content: Vec<u8>, dest: PathBuf, chunk: usize, delay: Duration) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut file = fs::File::create(&dest).expect("Failed to create upload");
        for piece in content.chunks(chunk) {
            file.write_all(piece).expect("Failed to write chunk");
            file.flush().expect("Failed to flush chunk");
            std::thread::sleep(delay);
        }
    })
}
