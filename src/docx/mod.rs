//! OOXML (.docx) primitives for the letter pipeline.
//!
//! A .docx file is a zip container of XML parts. This module works on the
//! container directly: `container` reads and rewrites the zip, `template`
//! substitutes `{{placeholder}}` fields in `word/document.xml`, `hyperlink`
//! splices a real `<w:hyperlink>` run in place of the `[short_link]` marker,
//! and `style` applies the uniform paragraph/run style pass and flattens
//! paragraph text for previews.

pub mod container;
pub mod hyperlink;
pub mod style;
pub mod template;
pub mod xmlutil;

pub use container::DocxFile;
pub use hyperlink::{splice_hyperlink, LINK_MARKER};
pub use style::{apply_uniform_style, flatten_text};
pub use template::render_placeholders;

use thiserror::Error;

/// Font family forced onto every run of a generated letter.
pub const LETTER_FONT: &str = "Arial";
/// Run size in half-points (24 = 12 pt).
pub const LETTER_SIZE_HALF_POINTS: u32 = 24;
/// Hyperlink run color (RGB hex, no leading `#`).
pub const LINK_COLOR: &str = "0000FF";

/// Errors that can occur while manipulating a .docx container.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("failed to open .docx container: {0}")]
    OpenContainer(#[source] zip::result::ZipError),
    #[error("failed to read container part {name}: {source}")]
    ReadPart {
        name: String,
        source: std::io::Error,
    },
    #[error("container has no word/document.xml part")]
    MissingDocumentXml,
    #[error("failed to start container part {name}: {source}")]
    StartPart {
        name: String,
        source: zip::result::ZipError,
    },
    #[error("failed to write container part {name}: {source}")]
    WritePart {
        name: String,
        source: std::io::Error,
    },
    #[error("failed to finalize .docx container: {0}")]
    FinishContainer(#[source] zip::result::ZipError),
}
