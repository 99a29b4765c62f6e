//! pokiescraper: downloads NSW gaming-machine regulatory reports, records
//! download provenance in a CSV ledger, infers table structure from the
//! semi-structured spreadsheet layouts, and loads each report into a
//! per-period PostgreSQL landing table with a two-stage promotion ETL.

pub mod config;
pub mod etl;
pub mod fetch;
pub mod ledger;
pub mod load;
pub mod process;
pub mod report;
pub mod schema;
pub mod sheet;
