//! CLI display utilities for the run report

use crate::core::styles::StyleRole;
use crate::core::validation::{validate_choice, ValidationError};
use crate::pipeline::api::{RunReport, WorkerReport};
use prettytable::{format, Cell, Row, Table};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match validate_choice("output", value, &["text", "json"])?.as_str() {
            "json" => Ok(OutputFormat::Json),
            _ => Ok(OutputFormat::Text),
        }
    }
}

/// Print `report` to stdout in the requested format
pub fn display_report(
    report: &RunReport,
    output: OutputFormat,
    use_color: bool,
) -> Result<(), String> {
    match output {
        OutputFormat::Json => {
            println!("{}", render_json(report)?);
        }
        OutputFormat::Text => {
            println!("{}", render_summary(report, use_color));
            let table = worker_table(report, use_color);
            if use_color {
                table.print_tty(true).map_err(|e| e.to_string())?;
            } else {
                print!("{}", table);
            }
        }
    }
    Ok(())
}

pub fn render_json(report: &RunReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("Cannot serialise report: {}", e))
}

/// Headline and totals shown above the worker table
pub fn render_summary(report: &RunReport, use_color: bool) -> String {
    let status = if report.shutdown_requested {
        StyleRole::Failure.paint("interrupted", use_color)
    } else if report.is_complete() {
        StyleRole::Success.paint("complete", use_color)
    } else {
        StyleRole::Failure.paint("incomplete", use_color)
    };

    let line = |label: &str, value: String| {
        format!(
            "  {:<16} {}",
            StyleRole::Label.paint(label, use_color),
            StyleRole::Value.paint(&value, use_color)
        )
    };

    let mut lines = vec![
        format!("{} {}", StyleRole::Header.paint("Pipeline run", use_color), status),
        line("Started", report.started_at.clone()),
        line("Elapsed", format!("{} ms", report.elapsed_ms)),
        line("Source items", report.source_items.to_string()),
        line("Produced", report.total_produced.to_string()),
        line("Consumed", report.total_consumed.to_string()),
        line("Sink items", report.sink_items.to_string()),
        line("Sink sample", format!("[{}]", report.sink_sample.join(", "))),
        line(
            "Queue",
            format!(
                "capacity {}, peak {}, left {}",
                report.capacity, report.peak_queue_len, report.queue_remaining
            ),
        ),
    ];
    if report.shutdown_requested {
        lines.push(StyleRole::Dim.paint(
            "  Shutdown was requested before the run completed",
            use_color,
        ));
    }
    lines.join("\n")
}

fn styled_cell(text: &str, role: StyleRole, use_color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec() {
        Some(spec) if use_color => cell.style_spec(&spec),
        _ => cell,
    }
}

fn worker_row(worker: &WorkerReport, use_color: bool) -> Row {
    let (status, role) = if worker.panicked {
        ("panicked", StyleRole::Failure)
    } else {
        ("ok", StyleRole::Success)
    };
    Row::new(vec![
        Cell::new(&worker.name),
        styled_cell(&worker.role.to_string(), StyleRole::Dim, use_color),
        Cell::new(&worker.items.to_string()).style_spec("r"),
        styled_cell(status, role, use_color),
    ])
}

/// One row per worker: name, role, items moved, thread status
pub fn worker_table(report: &RunReport, use_color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(
        ["Worker", "Role", "Items", "Status"]
            .iter()
            .map(|title| styled_cell(title, StyleRole::Header, use_color))
            .collect(),
    ));
    for worker in report.producers.iter().chain(&report.consumers) {
        table.add_row(worker_row(worker, use_color));
    }
    table
}
