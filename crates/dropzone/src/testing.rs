//! Zip fixture helpers for unit tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub(crate) enum ZipItem<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
}

/// Write a zip with the given entries, in order, and return its path.
pub(crate) fn write_zip(path: &Path, items: &[ZipItem<'_>]) -> PathBuf {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for item in items {
        match item {
            ZipItem::Dir(name) => zip.add_directory(*name, options).unwrap(),
            ZipItem::File(name, content) => {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content).unwrap();
            }
        }
    }
    zip.finish().unwrap();
    path.to_path_buf()
}
