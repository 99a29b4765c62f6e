// src/sheet/mod.rs

//! Raw spreadsheet access: reads the first worksheet of a report into a
//! dense grid of cells at absolute coordinates.

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use std::path::Path;

/// A single spreadsheet cell, reduced to the shapes these reports use.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text rendering used for header scanning and TEXT columns. Empty
    /// cells render as the empty string so row concatenation never fails.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(v) => v.to_string(),
            CellValue::Text(v) => v.clone(),
            CellValue::DateTime(v) => v.to_string(),
        }
    }

    /// Integer view; whole floats count, since the xlsx writer stores most
    /// numbers as floats.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            CellValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(v) => CellValue::Int(*v),
            Data::Float(v) => CellValue::Float(*v),
            Data::Bool(v) => CellValue::Bool(*v),
            Data::String(v) => CellValue::Text(v.clone()),
            Data::DateTime(v) => v
                .as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Empty),
            Data::DateTimeIso(v) => CellValue::Text(v.clone()),
            Data::DurationIso(v) => CellValue::Text(v.clone()),
            Data::Error(_) => CellValue::Empty,
        }
    }
}

/// Read sheet 0 into a rectangular grid. Rows and columns before the used
/// range are padded with empty cells so row indices match what the publisher
/// sees in the spreadsheet application.
pub fn read_grid(path: &Path) -> Result<Vec<Vec<CellValue>>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening workbook {:?}", path))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook {:?} has no sheets", path))?
        .with_context(|| format!("reading first sheet of {:?}", path))?;

    let (row0, col0) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let width = col0 + range.width();

    let mut grid = vec![vec![CellValue::Empty; width]; row0];
    for row in range.rows() {
        let mut cells = Vec::with_capacity(width);
        cells.resize(col0, CellValue::Empty);
        cells.extend(row.iter().map(CellValue::from));
        cells.resize(width, CellValue::Empty);
        grid.push(cells);
    }
    Ok(grid)
}

/// A row's cell text joined with single spaces, the form the header and
/// period scans match against.
pub fn row_text(row: &[CellValue]) -> String {
    row.iter()
        .map(CellValue::as_text)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cells_render_empty() {
        let row = vec![
            CellValue::Text("LGA".into()),
            CellValue::Empty,
            CellValue::Int(42),
        ];
        assert_eq!(row_text(&row), "LGA  42");
    }

    #[test]
    fn whole_floats_read_as_integers() {
        assert_eq!(CellValue::Float(17.0).as_i64(), Some(17));
        assert_eq!(CellValue::Float(17.5).as_i64(), None);
        assert_eq!(CellValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Text("17".into()).as_i64(), None);
    }
}
