//! Bundling of selected files into the single payload sent to a provider
//!
//! One file travels unchanged. Two or more files are packed into an in-memory
//! zip archive whose entries keep the input order.

use bytes::Bytes;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::humanize::ByteSize;

/// Archive name used when no other name is configured
pub const DEFAULT_ARCHIVE_NAME: &str = "archive.zip";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("no files to bundle")]
    Empty,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input path has no file name: {0}")]
    NoFileName(String),

    #[error("failed to write archive entry '{entry}': {source}")]
    Archive {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to write archive entry '{entry}': {source}")]
    Io {
        entry: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BundleError>;

/// A file selected by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub bytes: Bytes,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, naming it by its final path component
    pub async fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BundleError::NoFileName(path.display().to_string()))?;

        let bytes = tokio::fs::read(path).await.map_err(|source| BundleError::Read {
            path: path.display().to_string(),
            source,
        })?;

        tracing::debug!(file = %name, size = %ByteSize::of(&bytes), "Read input file");

        Ok(Self::new(name, bytes))
    }
}

/// The single payload actually transmitted to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub filename: String,
    pub bytes: Bytes,
}

impl Bundle {
    pub fn size(&self) -> ByteSize {
        ByteSize::of(&self.bytes)
    }
}

/// Produce one bundle from the selected files
///
/// A lone file is returned as-is. Otherwise every file becomes a zip entry named
/// after the file, in input order, and the archive is named `archive_name`.
/// Repeated names get a counter suffix (see [`unique_entry_names`]).
pub fn bundle(files: &[InputFile], archive_name: &str) -> Result<Bundle> {
    match files {
        [] => Err(BundleError::Empty),
        [single] => Ok(Bundle {
            filename: single.name.clone(),
            bytes: single.bytes.clone(),
        }),
        many => {
            let bytes = write_archive(many)?;
            tracing::debug!(
                entries = many.len(),
                archive = archive_name,
                size = %ByteSize::of(&bytes),
                "Built archive"
            );
            Ok(Bundle {
                filename: archive_name.to_string(),
                bytes,
            })
        }
    }
}

fn write_archive(files: &[InputFile]) -> Result<Bytes> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let names = unique_entry_names(files.iter().map(|f| f.name.as_str()));

    for (file, entry) in files.iter().zip(names) {
        writer
            .start_file(entry.as_str(), options)
            .map_err(|source| BundleError::Archive {
                entry: entry.clone(),
                source,
            })?;
        writer
            .write_all(&file.bytes)
            .map_err(|source| BundleError::Io { entry, source })?;
    }

    let cursor = writer.finish().map_err(|source| BundleError::Archive {
        entry: String::new(),
        source,
    })?;

    Ok(Bytes::from(cursor.into_inner()))
}

/// Assign each name a unique entry name, keeping the first occurrence as-is
///
/// `a.txt, a.txt, a.txt` becomes `a.txt, a (1).txt, a (2).txt`.
pub fn unique_entry_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.into_iter().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.to_string();
        let mut counter = 1;
        while taken.contains(&candidate) {
            candidate = with_counter(name, counter);
            counter += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

fn with_counter(name: &str, counter: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &name[..dot], counter, &name[dot..]),
        _ => format!("{name} ({counter})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut entry = archive.by_index(i).unwrap();
                let mut content = Vec::new();
                entry.read_to_end(&mut content).unwrap();
                (entry.name().to_string(), content)
            })
            .collect()
    }

    #[test]
    fn test_single_file_passes_through() {
        let file = InputFile::new("photo.jpg", vec![1u8, 2, 3, 4]);
        let bundle = bundle(&[file.clone()], DEFAULT_ARCHIVE_NAME).unwrap();

        assert_eq!(bundle.filename, "photo.jpg");
        assert_eq!(bundle.bytes, file.bytes);
    }

    #[test]
    fn test_two_files_become_archive() {
        let files = vec![InputFile::new("a.txt", "hi"), InputFile::new("b.txt", "bye")];
        let bundle = bundle(&files, DEFAULT_ARCHIVE_NAME).unwrap();

        assert_eq!(bundle.filename, "archive.zip");
        assert_eq!(
            read_entries(&bundle.bytes),
            vec![
                ("a.txt".to_string(), b"hi".to_vec()),
                ("b.txt".to_string(), b"bye".to_vec()),
            ]
        );
    }

    #[test]
    fn test_archive_keeps_input_order_and_count() {
        let files: Vec<InputFile> = ["z.bin", "m.bin", "a.bin", "q.bin"]
            .iter()
            .enumerate()
            .map(|(i, name)| InputFile::new(*name, vec![i as u8; 100 + i]))
            .collect();

        let bundle = bundle(&files, "custom.zip").unwrap();
        let entries = read_entries(&bundle.bytes);

        assert_eq!(bundle.filename, "custom.zip");
        assert_eq!(entries.len(), files.len());
        for (entry, file) in entries.iter().zip(&files) {
            assert_eq!(entry.0, file.name);
            assert_eq!(entry.1, file.bytes.to_vec());
        }
    }

    #[test]
    fn test_colliding_names_are_disambiguated() {
        let files = vec![
            InputFile::new("notes.txt", "one"),
            InputFile::new("notes.txt", "two"),
            InputFile::new("README", "three"),
            InputFile::new("README", "four"),
        ];
        let bundle = bundle(&files, DEFAULT_ARCHIVE_NAME).unwrap();
        let entries = read_entries(&bundle.bytes);

        assert_eq!(
            entries,
            vec![
                ("notes.txt".to_string(), b"one".to_vec()),
                ("notes (1).txt".to_string(), b"two".to_vec()),
                ("README".to_string(), b"three".to_vec()),
                ("README (1)".to_string(), b"four".to_vec()),
            ]
        );
    }

    #[test]
    fn test_unique_names_skip_existing_suffix() {
        let names = unique_entry_names(["a.txt", "a (1).txt", "a.txt", ".env", ".env"]);
        assert_eq!(names, vec!["a.txt", "a (1).txt", "a (2).txt", ".env", ".env (1)"]);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(bundle(&[], DEFAULT_ARCHIVE_NAME), Err(BundleError::Empty)));
    }

    #[tokio::test]
    async fn test_read_uses_final_path_component() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let file = InputFile::read(&path).await.unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(&file.bytes[..], b"%PDF-1.7");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = InputFile::read(&dir.path().join("missing.txt")).await;
        assert!(matches!(result, Err(BundleError::Read { .. })));
    }
}
