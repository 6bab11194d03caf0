//! `geoport stats` -- clean a CSV table and report descriptive
//! statistics or a date-ordered trend.

use tabled::Tabled;

use geoport_core::table::{CleanOptions, Table, TrendDirection, TrendReport};

use crate::cli::{GlobalOpts, StatsArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SummaryRow {
    column: String,
    count: usize,
    mean: String,
    std: String,
    min: String,
    max: String,
}

pub fn handle(args: &StatsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&args.file)?;
    let table = Table::from_csv(&text, args.sep)?;

    let cleaned = table.clean(&CleanOptions {
        drop_missing: args.drop_missing,
        fill_value: args.fill.clone(),
    });

    if let Some(path) = &args.export_cleaned {
        std::fs::write(path, cleaned.to_csv(args.sep))?;
        if !global.quiet {
            eprintln!("Wrote cleaned table to {}", path.display());
        }
    }

    let rendered = match (&args.date_column, &args.value_column) {
        (Some(date_column), Some(value_column)) => {
            let report = cleaned.trend(date_column, value_column)?;
            output::render_single(&global.output, &report, trend_detail, |r| {
                direction_label(r.direction).to_string()
            })
        }
        _ => {
            let summaries = cleaned.summarize();
            output::render_list(
                &global.output,
                &summaries,
                |s| SummaryRow {
                    column: s.name.clone(),
                    count: s.count,
                    mean: fmt_value(s.mean),
                    std: fmt_value(s.std),
                    min: fmt_value(s.min),
                    max: fmt_value(s.max),
                },
                |s| s.name.clone(),
            )
        }
    };

    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn fmt_value(value: f64) -> String {
    format!("{value:.4}")
}

fn direction_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Increasing => "increasing",
        TrendDirection::Decreasing => "decreasing",
    }
}

fn trend_detail(report: &TrendReport) -> String {
    [
        format!("mean:      {}", fmt_value(report.mean)),
        format!("median:    {}", fmt_value(report.median)),
        format!("std:       {}", fmt_value(report.std)),
        format!("min:       {}", fmt_value(report.min)),
        format!("max:       {}", fmt_value(report.max)),
        format!("direction: {}", direction_label(report.direction)),
    ]
    .join("\n")
}
