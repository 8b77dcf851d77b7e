use std::fmt::Write as _;

use serde::Serialize;

use crate::core::{CellStatus, GRID_COLUMNS, LifeMetrics, LifeSnapshot, MonthGrid};

pub const PAGE_TITLE: &str = "Visualize Your Life in Months";
pub const GRID_HEADING: &str = "Your Life in Months";
pub const LEGEND_NOTE: &str = "Each row = 3 years";
pub const FOOTER: &str = "Inspired by Wait But Why's visualization of life in months.";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TextStyle {
    Plain,
    Ansi,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LegendEntry {
    pub status: CellStatus,
    pub color: &'static str,
    pub label: &'static str,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDisplay {
    pub months_lived: String,
    pub months_total: String,
    pub percentage_lived: String,
}

pub fn status_color(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Future => "lightgray",
        CellStatus::Lived => "blue",
        CellStatus::Current => "red",
    }
}

pub fn legend() -> [LegendEntry; 3] {
    [
        LegendEntry {
            status: CellStatus::Lived,
            color: status_color(CellStatus::Lived),
            label: "Blue: Months lived",
        },
        LegendEntry {
            status: CellStatus::Current,
            color: status_color(CellStatus::Current),
            label: "Red: Current month",
        },
        LegendEntry {
            status: CellStatus::Future,
            color: status_color(CellStatus::Future),
            label: "Gray: Future months",
        },
    ]
}

pub fn format_with_separators(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_metrics(metrics: &LifeMetrics) -> MetricsDisplay {
    MetricsDisplay {
        months_lived: format_with_separators(u64::from(metrics.months_lived)),
        months_total: format_with_separators(u64::from(metrics.months_total)),
        percentage_lived: format!("{:.2}%", metrics.percentage_lived),
    }
}

pub fn render_grid_html(grid: &MonthGrid) -> String {
    let mut out = String::with_capacity(grid.rows() * GRID_COLUMNS * 64);
    let _ = write!(
        out,
        "<div class=\"life-grid\" style=\"display: grid; grid-template-columns: repeat({GRID_COLUMNS}, 1fr); gap: 2px; width: 100%; max-width: 800px;\">"
    );
    for status in grid.iter_cells() {
        let _ = write!(
            out,
            "<div class=\"cell status-{}\" style=\"aspect-ratio: 1; background-color: {};\"></div>",
            status.code(),
            status_color(status)
        );
    }
    out.push_str("</div>");
    out
}

pub fn render_html_document(snapshot: &LifeSnapshot) -> String {
    let display = format_metrics(&snapshot.metrics);
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(
        out,
        "<head><meta charset=\"utf-8\"><title>{PAGE_TITLE}</title></head>"
    );
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<h1>{PAGE_TITLE}</h1>");
    let _ = writeln!(
        out,
        "<p>Expected lifespan: {} years. Current age: {} years.</p>",
        snapshot.params.expected_lifespan_years(),
        snapshot.params.current_age_years()
    );
    let _ = writeln!(out, "<h2>{GRID_HEADING}</h2>");
    let _ = writeln!(out, "{}", render_grid_html(&snapshot.grid));
    let _ = writeln!(out, "<h3>Grid Legend</h3>");
    let _ = writeln!(out, "<ul>");
    for entry in legend() {
        let _ = writeln!(
            out,
            "<li><span style=\"color: {};\">&#9632;</span> {}</li>",
            entry.color, entry.label
        );
    }
    let _ = writeln!(out, "</ul>");
    let _ = writeln!(out, "<p>{LEGEND_NOTE}</p>");
    let _ = writeln!(out, "<dl>");
    for (label, value) in metric_rows(&display) {
        let _ = writeln!(out, "<dt>{label}</dt><dd>{value}</dd>");
    }
    let _ = writeln!(out, "</dl>");
    let _ = writeln!(out, "<hr><p>{FOOTER}</p>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}

fn metric_rows(display: &MetricsDisplay) -> [(&'static str, &str); 3] {
    [
        ("Months Lived", display.months_lived.as_str()),
        ("Total Months", display.months_total.as_str()),
        ("Percentage of Life", display.percentage_lived.as_str()),
    ]
}

fn plain_glyph(status: CellStatus) -> char {
    match status {
        CellStatus::Future => '.',
        CellStatus::Lived => '#',
        CellStatus::Current => '@',
    }
}

fn ansi_color(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Future => "\x1b[37m",
        CellStatus::Lived => "\x1b[34m",
        CellStatus::Current => "\x1b[31m",
    }
}

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_CELL: char = '\u{25A0}';

pub fn render_text(snapshot: &LifeSnapshot, style: TextStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{PAGE_TITLE}");
    let _ = writeln!(
        out,
        "Expected lifespan: {}  Current age: {}",
        snapshot.params.expected_lifespan_years(),
        snapshot.params.current_age_years()
    );
    let _ = writeln!(out);

    for row in snapshot.grid.iter_rows() {
        for &status in row {
            match style {
                TextStyle::Plain => out.push(plain_glyph(status)),
                TextStyle::Ansi => {
                    out.push_str(ansi_color(status));
                    out.push(ANSI_CELL);
                }
            }
        }
        if style == TextStyle::Ansi {
            out.push_str(ANSI_RESET);
        }
        out.push('\n');
    }

    let _ = writeln!(out);
    for entry in legend() {
        let marker = match style {
            TextStyle::Plain => plain_glyph(entry.status).to_string(),
            TextStyle::Ansi => format!("{}{ANSI_CELL}{ANSI_RESET}", ansi_color(entry.status)),
        };
        let _ = writeln!(out, "{marker} {}", entry.label);
    }
    let _ = writeln!(out, "{LEGEND_NOTE}");
    let _ = writeln!(out);

    let display = format_metrics(&snapshot.metrics);
    for (label, value) in metric_rows(&display) {
        let _ = writeln!(out, "{label}: {value}");
    }
    out
}
