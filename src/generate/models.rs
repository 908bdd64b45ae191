//! Data types for one generation run.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::docx::DocxError;

/// Status string recorded for a successfully generated letter.
pub const STATUS_SUCCESS: &str = "\u{2705} Berhasil";
/// Prefix of the status string recorded for a failed row.
pub const STATUS_FAILURE_PREFIX: &str = "\u{274c} Gagal";

/// One Generation Log entry: exactly one per input row, in input order,
/// never mutated after append.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
    #[schema(example = "Budi")]
    pub nama: String,
    #[schema(example = "\u{2705} Berhasil")]
    pub status: String,
}

impl LogEntry {
    pub fn success(nama: impl Into<String>) -> Self {
        Self {
            nama: nama.into(),
            status: STATUS_SUCCESS.to_string(),
        }
    }

    pub fn failure(nama: impl Into<String>, error: &RowError) -> Self {
        Self {
            nama: nama.into(),
            status: format!("{STATUS_FAILURE_PREFIX}: {error}"),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Snapshot reported after each processed row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Progress {
    /// Integer percentage, monotonically non-decreasing across a run.
    pub percent: u8,
    pub done: usize,
    pub total: usize,
    /// Human-readable "k / n" status.
    #[schema(example = "3 / 10")]
    pub label: String,
}

impl Progress {
    pub fn new(done: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((done * 100) / total) as u8
        };
        Self {
            percent,
            done,
            total,
            label: format!("{done} / {total}"),
        }
    }
}

/// Everything that can go wrong for a single row. Caught at the row boundary
/// and recorded in the log; never aborts the batch.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("name field is empty")]
    MissingName,
    #[error("link field is empty")]
    MissingLink,
    #[error(transparent)]
    Docx(#[from] DocxError),
}
