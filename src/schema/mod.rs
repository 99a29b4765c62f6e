// src/schema/mod.rs

//! Landing-table schema inference.
//!
//! Inference is a separate pass from SQL emission: the loader derives a
//! typed column descriptor list from the in-memory grid, and only then
//! renders DDL, so the inference logic tests without a database.

use crate::process::columns::normalize_column_name;
use crate::sheet::CellValue;

/// Storage type for a landed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Numeric,
    Text,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Numeric => "NUMERIC",
            Self::Text => "TEXT",
        }
    }
}

/// A derived destination column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: SqlType,
}

/// Compact header labels into column names. Blank labels (merged or spacer
/// cells) get positional fallbacks since a schema cannot hold a blank name.
pub fn derive_column_names(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let name = normalize_column_name(label);
            if name.is_empty() {
                format!("col_{}", idx + 1)
            } else {
                name
            }
        })
        .collect()
}

/// Infer each column's storage type from the cells observed in `rows`:
/// all-integer columns land as INTEGER, any other all-numeric mix as
/// NUMERIC, everything else (or a column with no samples) as TEXT.
pub fn infer_columns(names: &[String], rows: &[Vec<CellValue>]) -> Vec<ColumnSpec> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut saw_value = false;
            let mut all_int = true;
            let mut all_numeric = true;
            for row in rows {
                match row.get(idx) {
                    None | Some(CellValue::Empty) => continue,
                    Some(cell @ (CellValue::Int(_) | CellValue::Float(_))) => {
                        saw_value = true;
                        if cell.as_i64().is_none() {
                            all_int = false;
                        }
                    }
                    Some(_) => {
                        saw_value = true;
                        all_int = false;
                        all_numeric = false;
                    }
                }
            }
            let sql_type = if !saw_value || !all_numeric {
                SqlType::Text
            } else if all_int {
                SqlType::Integer
            } else {
                SqlType::Numeric
            };
            ColumnSpec {
                name: name.clone(),
                sql_type,
            }
        })
        .collect()
}

/// DDL for one landing table: surrogate key, the reporting-period bounds,
/// the derived columns, and a load timestamp.
pub fn create_table_sql(schema: &str, table: &str, columns: &[ColumnSpec]) -> String {
    let column_defs = columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.sql_type.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE {schema}.{table} (id SERIAL PRIMARY KEY, start_period DATE, end_period DATE, {column_defs}, loaded_at TIMESTAMPTZ DEFAULT now())"
    )
}

pub fn drop_table_sql(schema: &str, table: &str) -> String {
    format!("DROP TABLE IF EXISTS {schema}.{table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(labels: &[&str]) -> Vec<String> {
        derive_column_names(&labels.iter().map(|l| l.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn blank_labels_get_positional_names() {
        assert_eq!(
            names(&["Local Government Area (LGA)", "", "()", "Premises Count"]),
            vec!["lga", "col_2", "col_3", "prem_cnt"]
        );
    }

    #[test]
    fn integer_numeric_and_text_columns() {
        let names = vec!["lga".to_string(), "prem_cnt".to_string(), "profit".to_string()];
        let rows = vec![
            vec![
                CellValue::Text("Sydney".into()),
                CellValue::Float(12.0),
                CellValue::Float(1053.75),
            ],
            vec![
                CellValue::Text("Newcastle".into()),
                CellValue::Int(8),
                CellValue::Int(210),
            ],
        ];
        let columns = infer_columns(&names, &rows);
        assert_eq!(columns[0].sql_type, SqlType::Text);
        assert_eq!(columns[1].sql_type, SqlType::Integer);
        assert_eq!(columns[2].sql_type, SqlType::Numeric);
    }

    #[test]
    fn empty_cells_do_not_change_a_columns_type() {
        let names = vec!["prem_cnt".to_string()];
        let rows = vec![
            vec![CellValue::Empty],
            vec![CellValue::Int(3)],
            vec![CellValue::Empty],
        ];
        assert_eq!(infer_columns(&names, &rows)[0].sql_type, SqlType::Integer);
    }

    #[test]
    fn mixed_and_sample_free_columns_fall_back_to_text() {
        let names = vec!["notes".to_string(), "spacer".to_string()];
        let rows = vec![
            vec![CellValue::Int(1), CellValue::Empty],
            vec![CellValue::Text("n/a".into()), CellValue::Empty],
        ];
        let columns = infer_columns(&names, &rows);
        assert_eq!(columns[0].sql_type, SqlType::Text);
        assert_eq!(columns[1].sql_type, SqlType::Text);
    }

    #[test]
    fn ddl_carries_period_and_audit_columns() {
        let columns = vec![
            ColumnSpec { name: "lga".into(), sql_type: SqlType::Text },
            ColumnSpec { name: "tax".into(), sql_type: SqlType::Numeric },
        ];
        let sql = create_table_sql("land", "clb_gam_202306_202311", &columns);
        assert_eq!(
            sql,
            "CREATE TABLE land.clb_gam_202306_202311 (id SERIAL PRIMARY KEY, \
             start_period DATE, end_period DATE, lga TEXT, tax NUMERIC, \
             loaded_at TIMESTAMPTZ DEFAULT now())"
        );
        assert_eq!(
            drop_table_sql("land", "clb_gam_202306_202311"),
            "DROP TABLE IF EXISTS land.clb_gam_202306_202311"
        );
    }
}
