//! Ad-hoc analysis over an uploaded table: descriptive statistics,
//! histograms, value counts and a missing-values summary. The server only
//! computes numbers; charting stays in the frontend.

pub mod handlers;
pub mod models;
pub mod stats;

pub use models::*;
pub use stats::{describe, histogram, numeric_columns, summarize, value_counts, AnalysisError};
