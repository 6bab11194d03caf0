// ── Tabular cleaning and descriptive statistics ──
//
// Small helpers over header+rows tables: duplicate/missing-value
// cleanup, per-column summaries, and a date-ordered trend report. Values
// stay as strings until a computation needs numbers; columns where
// nothing parses are simply skipped by the numeric operations.

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    #[error("column '{name}' has no numeric values")]
    NoNumericValues { name: String },

    #[error("unparseable date '{value}' in column '{column}'")]
    InvalidDate { column: String, value: String },

    #[error("table has no rows")]
    Empty,
}

/// Missing-value strategy for [`Table::clean`].
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Drop rows containing empty cells (wins over `fill_value`).
    pub drop_missing: bool,
    /// Replace empty cells with this value instead of dropping.
    pub fill_value: Option<String>,
}

/// Per-column descriptive summary.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Count of values that parsed as numbers.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; 0.0 with fewer than two values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Direction of a series between its first and last date-ordered values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

/// Date-ordered trend statistics for one value column.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrendReport {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub direction: TrendDirection,
}

/// A header row plus data rows, all cells as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV text; the first row is the header.
    pub fn from_csv(text: &str, sep: char) -> Result<Self, TableError> {
        let mut rows = parse_rows(text, sep);
        if rows.is_empty() {
            return Err(TableError::Empty);
        }
        let headers = rows.remove(0);
        Ok(Self { headers, rows })
    }

    /// Serialize back to CSV, header first.
    pub fn to_csv(&self, sep: char) -> String {
        let mut out = String::new();
        write_row(&mut out, &self.headers, sep);
        for row in &self.rows {
            write_row(&mut out, row, sep);
        }
        out
    }

    /// Remove duplicate rows, then handle missing values per `options`.
    ///
    /// Duplicates are removed first (keeping the first occurrence), as
    /// filled rows could otherwise collide with pre-existing ones.
    pub fn clean(&self, options: &CleanOptions) -> Self {
        let mut seen: HashSet<&[String]> = HashSet::new();
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if seen.insert(row.as_slice()) {
                rows.push(row.clone());
            }
        }

        if options.drop_missing {
            rows.retain(|row| !row.iter().any(String::is_empty));
        } else if let Some(fill) = &options.fill_value {
            for row in &mut rows {
                for cell in row.iter_mut() {
                    if cell.is_empty() {
                        fill.clone_into(cell);
                    }
                }
            }
        }

        Self {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// Summarize every column that contains at least one numeric value.
    pub fn summarize(&self) -> Vec<ColumnSummary> {
        self.headers
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                let values = self.numeric_column(index);
                (!values.is_empty()).then(|| summary_of(name, &values))
            })
            .collect()
    }

    /// Trend statistics for `value_column`, ordered by `date_column`.
    pub fn trend(&self, date_column: &str, value_column: &str) -> Result<TrendReport, TableError> {
        let date_index = self.column_index(date_column)?;
        let value_index = self.column_index(value_column)?;

        let mut series: Vec<(i64, f64)> = Vec::new();
        for row in &self.rows {
            let date_cell = row.get(date_index).map(String::as_str).unwrap_or_default();
            let value_cell = row.get(value_index).map(String::as_str).unwrap_or_default();
            let Ok(value) = value_cell.trim().parse::<f64>() else {
                continue;
            };
            let date = parse_date(date_cell).ok_or_else(|| TableError::InvalidDate {
                column: date_column.to_string(),
                value: date_cell.to_string(),
            })?;
            series.push((date, value));
        }

        if series.is_empty() {
            return Err(TableError::NoNumericValues {
                name: value_column.to_string(),
            });
        }
        series.sort_by_key(|(date, _)| *date);

        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let summary = summary_of(value_column, &values);
        let first = values.first().copied().unwrap_or_default();
        let last = values.last().copied().unwrap_or_default();

        Ok(TrendReport {
            mean: summary.mean,
            median: median_of(&values),
            std: summary.std,
            min: summary.min,
            max: summary.max,
            direction: if last > first {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            },
        })
    }

    fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    fn numeric_column(&self, index: usize) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index))
            .filter_map(|cell| cell.trim().parse::<f64>().ok())
            .collect()
    }
}

fn summary_of(name: &str, values: &[f64]) -> ColumnSummary {
    let count = values.len();
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if count > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ColumnSummary {
        name: name.to_string(),
        count,
        mean,
        std,
        min,
        max,
    }
}

fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Parse a date cell as days since the epoch. Accepts ISO dates,
/// RFC 3339 timestamps, and US-style `m/d/Y`.
fn parse_date(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(cell) {
        return Some(dt.timestamp());
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
        }
    }
    None
}

// ── CSV parsing / writing ────────────────────────────────────────────

/// Minimal CSV/TSV parser: double-quote escapes, CRLF tolerant, blank
/// lines skipped.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(std::mem::take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(std::mem::take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush a trailing row without a final newline.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row(out: &mut String, row: &[String], sep: char) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        if needs_quotes(cell, sep) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    fn sample() -> Table {
        Table {
            headers: row(&["date", "city", "reading"]),
            rows: vec![
                row(&["2024-01-03", "north", "12.5"]),
                row(&["2024-01-01", "north", "10.0"]),
                row(&["2024-01-02", "south", ""]),
                row(&["2024-01-03", "north", "12.5"]),
            ],
        }
    }

    #[test]
    fn csv_round_trip_preserves_quoting() {
        let text = "name,note\nalpha,\"hello, \"\"world\"\"\"\r\nbeta,plain\n";
        let table = Table::from_csv(text, ',').expect("parse");
        assert_eq!(table.headers, row(&["name", "note"]));
        assert_eq!(table.rows[0], row(&["alpha", "hello, \"world\""]));
        assert_eq!(table.rows[1], row(&["beta", "plain"]));

        let rendered = table.to_csv(',');
        assert_eq!(
            rendered,
            "name,note\nalpha,\"hello, \"\"world\"\"\"\nbeta,plain\n"
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = parse_rows("a,b\n\n1,2\n", ',');
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn clean_drops_duplicates_and_missing_rows() {
        let cleaned = sample().clean(&CleanOptions {
            drop_missing: true,
            fill_value: None,
        });
        assert_eq!(
            cleaned.rows,
            vec![
                row(&["2024-01-03", "north", "12.5"]),
                row(&["2024-01-01", "north", "10.0"]),
            ]
        );
    }

    #[test]
    fn clean_can_fill_missing_cells_instead() {
        let cleaned = sample().clean(&CleanOptions {
            drop_missing: false,
            fill_value: Some("0".into()),
        });
        assert_eq!(cleaned.rows.len(), 3);
        assert_eq!(cleaned.rows[2], row(&["2024-01-02", "south", "0"]));
    }

    #[test]
    fn summarize_covers_numeric_columns_only() {
        let summaries = sample().summarize();
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];
        assert_eq!(s.name, "reading");
        assert_eq!(s.count, 3);
        assert!((s.mean - 11.666_666_666_666_666).abs() < 1e-9);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.max, 12.5);
    }

    #[test]
    fn summary_std_is_sample_std() {
        let values = [2.0, 4.0, 6.0];
        let s = summary_of("x", &values);
        assert!((s.std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn trend_orders_by_date_before_comparing() {
        // Rows arrive out of order; 2024-01-01 holds the lowest value,
        // so the date-ordered series is increasing.
        let report = sample().trend("date", "reading").expect("trend");
        assert_eq!(report.direction, TrendDirection::Increasing);
        assert_eq!(report.min, 10.0);
        assert_eq!(report.max, 12.5);
        assert!((report.median - 12.5).abs() < 1e-12);
    }

    #[test]
    fn trend_rejects_unknown_columns() {
        let err = sample().trend("nope", "reading").expect_err("missing column");
        assert!(matches!(err, TableError::ColumnNotFound { .. }));
    }

    #[test]
    fn trend_rejects_unparseable_dates() {
        let table = Table {
            headers: row(&["date", "v"]),
            rows: vec![row(&["not-a-date", "1"])],
        };
        let err = table.trend("date", "v").expect_err("bad date");
        assert!(matches!(err, TableError::InvalidDate { .. }));
    }

    #[test]
    fn median_of_even_series_averages_the_middle_pair() {
        assert!((median_of(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
    }
}
