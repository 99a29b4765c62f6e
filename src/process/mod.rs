// src/process/mod.rs

//! Structural scan of a report grid: locates the true column-header row and
//! the free-text reporting period printed above it.

pub mod columns;
pub mod period;
pub mod table_name;

use crate::sheet::{row_text, CellValue};
use once_cell::sync::Lazy;
use regex::Regex;

/// Rows above the header examined for period text.
const PERIOD_LOOKBACK: usize = 8;

/// Canonical markers for the true column-header row in these report
/// layouts. Keyed deliberately on this exact wording: a report phrased
/// differently is reported as unparseable rather than guessed at.
static HEADER_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(TAX|PREMISES COUNT)\b").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

const PERIOD_KEYWORDS: &[&str] = &["PERIOD", "YEAR", "MONTH", "DATE", "TO"];

/// Everything the scan derives from a raw grid; mirrors the structured
/// columns of the provenance ledger.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GridInspection {
    pub header_row: Option<usize>,
    pub column_count: Option<usize>,
    pub header_names: Option<String>,
    pub start_period: Option<String>,
    pub end_period: Option<String>,
}

/// Index of the first row whose concatenated text carries a header marker,
/// scanning top to bottom.
pub fn find_header_row(grid: &[Vec<CellValue>]) -> Option<usize> {
    grid.iter()
        .position(|row| HEADER_MARKER_RE.is_match(&row_text(row)))
}

/// Scan upward from the header, at most [`PERIOD_LOOKBACK`] rows, for the
/// first non-blank row naming a period keyword or carrying a 4-digit
/// number; its full text is the period candidate.
pub fn find_period_text(grid: &[Vec<CellValue>], header_row: usize) -> Option<String> {
    let from = header_row.saturating_sub(PERIOD_LOOKBACK);
    for row in &grid[from..header_row.min(grid.len())] {
        let text = row_text(row);
        if text.is_empty() {
            continue;
        }
        let upper = text.to_uppercase();
        if PERIOD_KEYWORDS.iter().any(|k| upper.contains(k)) || YEAR_RE.is_match(&text) {
            return Some(text);
        }
    }
    None
}

/// Non-empty labels of a header row, in column order.
pub fn header_labels(row: &[CellValue]) -> Vec<String> {
    row.iter()
        .map(|cell| cell.as_text().trim().to_string())
        .filter(|label| !label.is_empty())
        .collect()
}

/// Pipe-delimited ledger form of the header labels; embedded newlines
/// become spaces so the ledger stays one line per document.
pub fn header_names_field(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| label.replace('\n', " "))
        .collect::<Vec<_>>()
        .join("|")
}

/// Full structural scan of a grid. A grid with no recognizable header row
/// yields an empty inspection; the caller still records the download and
/// the loader skips the document.
pub fn inspect_grid(grid: &[Vec<CellValue>]) -> GridInspection {
    let Some(header_row) = find_header_row(grid) else {
        return GridInspection::default();
    };
    let labels = header_labels(&grid[header_row]);
    let (start_period, end_period) = match find_period_text(grid, header_row) {
        Some(text) => period::parse_period_text(&text),
        None => (None, None),
    };
    GridInspection {
        header_row: Some(header_row),
        column_count: Some(labels.len()),
        header_names: Some(header_names_field(&labels)),
        start_period,
        end_period,
    }
}
