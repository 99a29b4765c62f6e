//! End-to-end structural scan of a synthetic report grid: header location,
//! period parsing, column compaction, schema inference, table naming.

use pokiescraper::process::{self, table_name::derive_table_name};
use pokiescraper::schema::{self, SqlType};
use pokiescraper::sheet::CellValue;

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_string())
}

fn blank(width: usize) -> Vec<CellValue> {
    vec![CellValue::Empty; width]
}

/// Shaped like the published clubs reports: a title block, the period line
/// a few rows above the header, spacer rows, then the data table.
fn clubs_report_grid() -> Vec<Vec<CellValue>> {
    vec![
        vec![text("Clubs gaming machine report by LGA")],
        blank(5),
        vec![text("Reporting period: 1 June 2023 to 30 November 2023")],
        blank(5),
        blank(5),
        vec![
            text("Local Government Area (LGA)"),
            text("Premises Count"),
            text("Total Tax Paid ($)"),
            text("Net Profit"),
            CellValue::Empty,
        ],
        vec![
            text("Sydney"),
            CellValue::Float(37.0),
            CellValue::Float(1_234_567.89),
            CellValue::Float(9_876_543.21),
            CellValue::Empty,
        ],
        vec![
            text("Newcastle"),
            CellValue::Int(12),
            CellValue::Float(234_567.0),
            CellValue::Int(876_543),
            CellValue::Empty,
        ],
        blank(5),
    ]
}

#[test]
fn scan_locates_header_and_period() {
    let inspection = process::inspect_grid(&clubs_report_grid());
    assert_eq!(inspection.header_row, Some(5));
    assert_eq!(inspection.column_count, Some(4));
    assert_eq!(
        inspection.header_names.as_deref(),
        Some("Local Government Area (LGA)|Premises Count|Total Tax Paid ($)|Net Profit")
    );
    assert_eq!(inspection.start_period.as_deref(), Some("20230601"));
    assert_eq!(inspection.end_period.as_deref(), Some("20231130"));
}

#[test]
fn scanned_metadata_drives_schema_and_naming() {
    let grid = clubs_report_grid();
    let inspection = process::inspect_grid(&grid);
    let header_row = inspection.header_row.unwrap();

    // Column names come from the full header row, blanks falling back to
    // positional names, exactly as the loader derives them.
    let labels: Vec<String> = grid[header_row]
        .iter()
        .map(|cell| cell.as_text().trim().to_string())
        .collect();
    let names = schema::derive_column_names(&labels);
    assert_eq!(
        names,
        vec!["lga", "prem_cnt", "total_tax_paid", "net_profit", "col_5"]
    );

    let data_rows: Vec<Vec<CellValue>> = grid[header_row + 1..]
        .iter()
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .cloned()
        .collect();
    assert_eq!(data_rows.len(), 2, "the trailing blank row is dropped");

    let columns = schema::infer_columns(&names, &data_rows);
    let types: Vec<SqlType> = columns.iter().map(|c| c.sql_type).collect();
    assert_eq!(
        types,
        vec![
            SqlType::Text,
            SqlType::Integer,
            SqlType::Numeric,
            SqlType::Numeric,
            SqlType::Text,
        ]
    );

    let table = derive_table_name(
        "club",
        inspection.start_period.as_deref().unwrap(),
        inspection.end_period.as_deref().unwrap(),
    )
    .unwrap();
    assert_eq!(table, "clb_gam_202306_202311");

    let ddl = schema::create_table_sql("land", &table, &columns);
    assert!(ddl.starts_with("CREATE TABLE land.clb_gam_202306_202311 (id SERIAL PRIMARY KEY"));
    assert!(ddl.contains("prem_cnt INTEGER"));
    assert!(ddl.contains("total_tax_paid NUMERIC"));
    assert!(ddl.contains("loaded_at TIMESTAMPTZ DEFAULT now()"));
}

#[test]
fn grid_without_marker_is_catalogued_but_not_loadable() {
    let grid = vec![
        vec![text("Licensed premises list as at 1 July 2025")],
        vec![text("Premises Name"), text("Suburb"), text("Licence Type")],
        vec![text("The Local"), text("Enmore"), text("Hotel")],
    ];
    let inspection = process::inspect_grid(&grid);
    assert_eq!(inspection, process::GridInspection::default());
}
