//! The Output Archive: an in-memory zip, keyed by entry name.
//!
//! Entries are collected in a map and the zip is written once at finalize,
//! so duplicate names resolve last-write-wins instead of producing two zip
//! entries, and a partially processed row can never leave bytes behind.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to start archive entry {name}: {source}")]
    StartEntry {
        name: String,
        source: zip::result::ZipError,
    },
    #[error("failed to write archive entry {name}: {source}")]
    WriteEntry {
        name: String,
        source: std::io::Error,
    },
    #[error("failed to finalize zip archive: {0}")]
    Finish(#[source] zip::result::ZipError),
}

#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; an existing entry with the same name is replaced.
    pub fn insert(&mut self, name: String, bytes: Vec<u8>) {
        match self.entries.iter_mut().find(|(entry, _)| *entry == name) {
            Some(slot) => slot.1 = bytes,
            None => self.entries.push((name, bytes)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialize the zip bytes.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, bytes) in &self.entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|source| ArchiveError::StartEntry {
                    name: name.clone(),
                    source,
                })?;
            writer
                .write_all(bytes)
                .map_err(|source| ArchiveError::WriteEntry {
                    name: name.clone(),
                    source,
                })?;
        }
        let cursor = writer.finish().map_err(ArchiveError::Finish)?;
        Ok(cursor.into_inner())
    }
}
