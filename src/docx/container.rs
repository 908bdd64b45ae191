//! The .docx zip container.
//!
//! All parts are held in memory so a template can be cloned cheaply per row
//! and serialized back without touching disk.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::DocxError;

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Relationship part for the main document (hyperlink targets live here).
pub const RELS_PART: &str = "word/_rels/document.xml.rels";

const RELS_SKELETON: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#,
);

/// An open .docx container: an ordered list of `(part name, bytes)` pairs.
#[derive(Debug, Clone)]
pub struct DocxFile {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxFile {
    /// Open a container from raw bytes, validating that a document part exists.
    pub fn open(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive =
            ZipArchive::new(Cursor::new(bytes)).map_err(DocxError::OpenContainer)?;
        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(DocxError::OpenContainer)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|source| DocxError::ReadPart {
                    name: name.clone(),
                    source,
                })?;
            parts.push((name, data));
        }

        let file = Self { parts };
        if file.part(DOCUMENT_PART).is_none() {
            return Err(DocxError::MissingDocumentXml);
        }
        Ok(file)
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part, _)| part == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Replace a part, or append it when the container does not have it yet.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|(part, _)| part == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    pub fn document_xml(&self) -> Result<String, DocxError> {
        self.part(DOCUMENT_PART)
            .map(|data| String::from_utf8_lossy(data).into_owned())
            .ok_or(DocxError::MissingDocumentXml)
    }

    pub fn set_document_xml(&mut self, xml: String) {
        self.set_part(DOCUMENT_PART, xml.into_bytes());
    }

    /// Relationship XML for the main document; a fresh skeleton when absent.
    pub fn relationships_xml(&self) -> String {
        self.part(RELS_PART)
            .map(|data| String::from_utf8_lossy(data).into_owned())
            .unwrap_or_else(|| RELS_SKELETON.to_string())
    }

    pub fn set_relationships_xml(&mut self, xml: String) {
        self.set_part(RELS_PART, xml.into_bytes());
    }

    /// Serialize the container back into .docx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.parts {
            writer
                .start_file(name.as_str(), options)
                .map_err(|source| DocxError::StartPart {
                    name: name.clone(),
                    source,
                })?;
            writer
                .write_all(data)
                .map_err(|source| DocxError::WritePart {
                    name: name.clone(),
                    source,
                })?;
        }
        let cursor = writer.finish().map_err(DocxError::FinishContainer)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_docx() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer
            .write_all(b"<w:document><w:body></w:body></w:document>")
            .unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_and_roundtrip() {
        let doc = DocxFile::open(&minimal_docx()).expect("open");
        assert!(doc.document_xml().unwrap().contains("<w:body>"));

        let bytes = doc.to_bytes().expect("serialize");
        let reopened = DocxFile::open(&bytes).expect("reopen");
        assert_eq!(reopened.document_xml().unwrap(), doc.document_xml().unwrap());
    }

    #[test]
    fn test_open_rejects_missing_document_part() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/other.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            DocxFile::open(&bytes),
            Err(DocxError::MissingDocumentXml)
        ));
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(matches!(
            DocxFile::open(b"definitely not a zip"),
            Err(DocxError::OpenContainer(_))
        ));
    }

    #[test]
    fn test_set_part_replaces_and_appends() {
        let mut doc = DocxFile::open(&minimal_docx()).unwrap();
        doc.set_document_xml("<w:document/>".to_string());
        assert_eq!(doc.document_xml().unwrap(), "<w:document/>");

        assert!(doc.part(RELS_PART).is_none());
        doc.set_relationships_xml("<Relationships/>".to_string());
        assert_eq!(doc.relationships_xml(), "<Relationships/>");
    }
}
