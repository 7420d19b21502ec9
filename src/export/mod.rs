//! CSV Export
//!
//! - **csv_export**: filter history by date range, write/read `Timestamp,Value` CSV
//! - **bounds**: parse user-entered range bounds
//! - **error**: Error types

pub mod bounds;
pub mod csv_export;
pub mod error;

pub use bounds::{parse_bound, parse_range};
pub use csv_export::{
    export_csv, parse_csv, CSV_HEADER, EXPORT_CONTENT_TYPE, EXPORT_FILENAME, TIMESTAMP_FORMAT,
};
pub use error::{ExportError, ExportResult};
