//! Statistics over string-cell tables.
//!
//! A column counts as numeric when every non-empty cell parses as f64 and at
//! least one does. Quartiles use linear interpolation between order
//! statistics, matching what the original tool displayed.

use thiserror::Error;

use crate::table::DataTable;

use super::models::{
    ColumnStats, Histogram, HistogramBin, MissingSummary, TableSummary, ValueCount, ValueCounts,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("column '{0}' has no numeric values")]
    NotNumeric(String),
}

/// Non-empty cells of one column parsed as f64, when all of them parse.
fn numeric_values(table: &DataTable, col: usize) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for row in &table.rows {
        let cell = row.get(col).map(|s| s.trim()).unwrap_or_default();
        if cell.is_empty() {
            continue;
        }
        values.push(cell.parse::<f64>().ok()?);
    }
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Headers of all numeric columns, in table order.
pub fn numeric_columns(table: &DataTable) -> Vec<String> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(col, _)| numeric_values(table, *col).is_some())
        .map(|(_, header)| header.clone())
        .collect()
}

/// Interpolated quantile of an ascending-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = lo + 1;
    let frac = pos - lo as f64;
    if hi >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

fn column_stats(column: &str, values: &[f64]) -> ColumnStats {
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    ColumnStats {
        column: column.to_string(),
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    }
}

/// Descriptive statistics for every numeric column.
pub fn describe(table: &DataTable) -> Vec<ColumnStats> {
    table
        .headers
        .iter()
        .enumerate()
        .filter_map(|(col, header)| {
            numeric_values(table, col).map(|values| column_stats(header, &values))
        })
        .collect()
}

/// Equal-width histogram over one numeric column. The bin count is clamped
/// to 5..=100, matching the slider range of the original UI.
pub fn histogram(table: &DataTable, column: &str, bins: usize) -> Result<Histogram, AnalysisError> {
    let col = table
        .column_index(column)
        .ok_or_else(|| AnalysisError::MissingColumn(column.to_string()))?;
    let values =
        numeric_values(table, col).ok_or_else(|| AnalysisError::NotNumeric(column.to_string()))?;

    let bins = bins.clamp(5, 100);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Ok(Histogram {
            column: column.to_string(),
            bins: vec![HistogramBin {
                start: min,
                end: max,
                count: values.len(),
            }],
        });
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in &values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    Ok(Histogram {
        column: column.to_string(),
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                start: min + width * i as f64,
                end: min + width * (i + 1) as f64,
                count,
            })
            .collect(),
    })
}

/// The `top_n` most frequent values of one column, ties broken by first
/// appearance. Empty cells count under an empty-string bucket.
pub fn value_counts(
    table: &DataTable,
    column: &str,
    top_n: usize,
) -> Result<ValueCounts, AnalysisError> {
    let col = table
        .column_index(column)
        .ok_or_else(|| AnalysisError::MissingColumn(column.to_string()))?;

    let mut entries: Vec<ValueCount> = Vec::new();
    for row in &table.rows {
        let value = row.get(col).map(|s| s.trim()).unwrap_or_default();
        match entries.iter_mut().find(|entry| entry.value == value) {
            Some(entry) => entry.count += 1,
            None => entries.push(ValueCount {
                value: value.to_string(),
                count: 1,
            }),
        }
    }
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(top_n.max(1));

    Ok(ValueCounts {
        column: column.to_string(),
        entries,
    })
}

/// Overview of the whole table.
pub fn summarize(table: &DataTable) -> TableSummary {
    let numeric = numeric_columns(table);
    let categorical: Vec<String> = table
        .headers
        .iter()
        .filter(|header| !numeric.contains(header))
        .cloned()
        .collect();

    let rows = table.len();
    let mut total_missing = 0;
    let missing = table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let count = table
                .rows
                .iter()
                .filter(|row| row.get(col).map(|s| s.trim().is_empty()).unwrap_or(true))
                .count();
            total_missing += count;
            MissingSummary {
                column: header.clone(),
                missing: count,
                missing_pct: if rows == 0 {
                    0.0
                } else {
                    let pct = count as f64 * 100.0 / rows as f64;
                    (pct * 100.0).round() / 100.0
                },
            }
        })
        .collect();

    TableSummary {
        rows,
        columns: table.headers.len(),
        numeric_columns: numeric,
        categorical_columns: categorical,
        total_missing,
        missing,
    }
}
