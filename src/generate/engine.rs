//! The Bulk Document Generator.
//!
//! One pass over the recipient rows: render the template, splice the
//! hyperlink, apply the style pass, file the result in the archive and log
//! the outcome. Failures are isolated per row; the run always completes and
//! returns a full log.

use std::collections::HashMap;

use crate::docx::{
    apply_uniform_style, flatten_text, render_placeholders, splice_hyperlink, DocxFile,
    LINK_MARKER,
};
use crate::table::{ColumnMapping, DataTable};

use super::archive::{ArchiveBuilder, ArchiveError};
use super::models::{LogEntry, Progress, RowError};

/// Template placeholder mapped to the recipient's name.
pub const NAME_PLACEHOLDER: &str = "nama_penyelenggara";
/// Template placeholder mapped to the link marker.
pub const LINK_PLACEHOLDER: &str = "short_link";

/// Per-row progress observer.
pub trait ProgressSink {
    fn report(&mut self, progress: &Progress);
}

/// Sink for callers that do not watch progress.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _progress: &Progress) {}
}

/// Result of a whole run: the materialized archive plus the full log.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub archive: Vec<u8>,
    pub log: Vec<LogEntry>,
    pub entry_count: usize,
}

impl GenerationOutcome {
    pub fn success_count(&self) -> usize {
        self.log.iter().filter(|entry| entry.is_success()).count()
    }
}

/// Single-row preview: steps 1-4 of the row algorithm, no archive, no log.
#[derive(Debug)]
pub struct PreviewOutput {
    pub nama: String,
    /// Flattened paragraph text for on-screen display.
    pub text: String,
    /// Serialized document for an optional single-file download.
    pub bytes: Vec<u8>,
    pub filename: String,
}

pub struct LetterGenerator<'a> {
    template: &'a [u8],
}

impl<'a> LetterGenerator<'a> {
    pub fn new(template: &'a [u8]) -> Self {
        Self { template }
    }

    /// Run the whole batch. Produces one archive entry per successful row
    /// (last write wins on duplicate names) and exactly one log entry per
    /// input row, reporting progress after each.
    pub fn generate_all(
        &self,
        table: &DataTable,
        mapping: ColumnMapping,
        progress: &mut dyn ProgressSink,
    ) -> Result<GenerationOutcome, ArchiveError> {
        let total = table.len();
        let mut archive = ArchiveBuilder::new();
        let mut log = Vec::with_capacity(total);

        for (index, row) in table.rows.iter().enumerate() {
            let nama = row
                .get(mapping.name)
                .map(|cell| cell.trim())
                .unwrap_or_default()
                .to_string();

            match self.process_row(row, mapping) {
                Ok((entry_name, bytes)) => {
                    archive.insert(entry_name, bytes);
                    log.push(LogEntry::success(&nama));
                }
                Err(err) => {
                    log::warn!("row {} ({nama:?}) failed: {err}", index + 1);
                    log.push(LogEntry::failure(&nama, &err));
                }
            }

            progress.report(&Progress::new(index + 1, total));
        }

        let entry_count = archive.len();
        let archive = archive.finish()?;
        Ok(GenerationOutcome {
            archive,
            log,
            entry_count,
        })
    }

    /// Render one selected row without touching archive or log, and flatten
    /// the result for display.
    pub fn preview(&self, nama: &str, link: &str) -> Result<PreviewOutput, RowError> {
        let nama = nama.trim();
        let link = link.trim();
        if nama.is_empty() {
            return Err(RowError::MissingName);
        }
        if link.is_empty() {
            return Err(RowError::MissingLink);
        }

        let doc = self.render_letter(nama, link)?;
        let text = flatten_text(&doc).map_err(RowError::Docx)?;
        let bytes = doc.to_bytes().map_err(RowError::Docx)?;
        Ok(PreviewOutput {
            nama: nama.to_string(),
            text,
            bytes,
            filename: format!("preview_{nama}.docx"),
        })
    }

    fn process_row(
        &self,
        row: &[String],
        mapping: ColumnMapping,
    ) -> Result<(String, Vec<u8>), RowError> {
        let nama = row
            .get(mapping.name)
            .map(|cell| cell.trim())
            .unwrap_or_default();
        if nama.is_empty() {
            return Err(RowError::MissingName);
        }
        let link = row
            .get(mapping.link)
            .map(|cell| cell.trim())
            .unwrap_or_default();
        if link.is_empty() {
            return Err(RowError::MissingLink);
        }

        let doc = self.render_letter(nama, link)?;
        let bytes = doc.to_bytes().map_err(RowError::Docx)?;
        Ok((format!("{nama}.docx"), bytes))
    }

    /// Steps 1-4 of the row algorithm: fresh template copy, placeholder
    /// render (link deferred to the marker), hyperlink splice, style pass.
    fn render_letter(&self, nama: &str, link: &str) -> Result<DocxFile, RowError> {
        let mut doc = DocxFile::open(self.template).map_err(RowError::Docx)?;

        let mut fields = HashMap::new();
        fields.insert(NAME_PLACEHOLDER.to_string(), nama.to_string());
        fields.insert(LINK_PLACEHOLDER.to_string(), LINK_MARKER.to_string());
        let rendered = render_placeholders(&doc.document_xml().map_err(RowError::Docx)?, &fields);
        doc.set_document_xml(rendered);

        splice_hyperlink(&mut doc, link).map_err(RowError::Docx)?;
        apply_uniform_style(&mut doc).map_err(RowError::Docx)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_progress_is_silent() {
        NullProgress.report(&Progress::new(1, 2));
    }

    #[test]
    fn test_generate_all_rejects_nothing_on_empty_table() {
        let table = DataTable {
            headers: vec!["nama".to_string(), "link".to_string()],
            rows: Vec::new(),
        };
        let generator = LetterGenerator::new(b"not a real template");
        let outcome = generator
            .generate_all(&table, ColumnMapping { name: 0, link: 1 }, &mut NullProgress)
            .expect("empty run");
        assert!(outcome.log.is_empty());
        assert_eq!(outcome.entry_count, 0);
    }

    #[test]
    fn test_bad_template_fails_per_row_not_per_run() {
        let table = DataTable {
            headers: vec!["nama".to_string(), "link".to_string()],
            rows: vec![vec!["Budi".to_string(), "https://a.co".to_string()]],
        };
        let generator = LetterGenerator::new(b"not a zip at all");
        let outcome = generator
            .generate_all(&table, ColumnMapping { name: 0, link: 1 }, &mut NullProgress)
            .expect("run completes");
        assert_eq!(outcome.log.len(), 1);
        assert!(!outcome.log[0].is_success());
        assert_eq!(outcome.entry_count, 0);
    }
}
