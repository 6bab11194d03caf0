//! Output formatting: table, JSON, CSV, plain.
//!
//! Renders data in the format selected by `--output`. Table uses
//! `tabled`, structured formats use serde, CSV reuses the core table
//! writer, plain emits one identifier per line.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(&to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Csv => {
            let rows: Vec<R> = data.iter().map(&to_row).collect();
            render_csv(&rows)
        }
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item.
///
/// Table and CSV rendering use a custom `detail_fn` returning a
/// pre-formatted string, since single-item detail views don't use the
/// `Tabled` derive.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table | OutputFormat::Csv => detail_fn(data),
        OutputFormat::Json => render_json_pretty(data),
        OutputFormat::JsonCompact => render_json_compact(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// CSV via the core table writer (quote-aware).
fn render_csv<R: Tabled>(rows: &[R]) -> String {
    let headers: Vec<String> = R::headers().iter().map(ToString::to_string).collect();
    let data: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.fields().iter().map(ToString::to_string).collect())
        .collect();
    geoport_core::table::Table {
        headers,
        rows: data,
    }
    .to_csv(',')
}

/// Pretty-printed JSON.
pub fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}
