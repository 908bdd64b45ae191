use serde::Serialize;
use utoipa::ToSchema;

/// Descriptive statistics for one numeric column (pandas `describe` shape).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0.0 for a single observation.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValueCounts {
    pub column: String,
    pub entries: Vec<ValueCount>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MissingSummary {
    pub column: String,
    pub missing: usize,
    pub missing_pct: f64,
}

/// Top-level overview of an uploaded table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub total_missing: usize,
    pub missing: Vec<MissingSummary>,
}
