//! CSV Export
//!
//! Writes the filtered history as `Timestamp,Value` rows and reads such
//! files back.

use chrono::NaiveDateTime;

use super::error::{ExportError, ExportResult};
use crate::history::{DateRange, DisplayZone, Reading};

/// Download name of the exported file
pub const EXPORT_FILENAME: &str = "temperature_data.csv";

/// MIME type of the exported file
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Header row, always present
pub const CSV_HEADER: [&str; 2] = ["Timestamp", "Value"];

/// Day-month-year, 24-hour clock
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Export `history` restricted to `range`.
///
/// Rows keep history order. Timestamps are written in `zone`; values in
/// their shortest decimal form. Fields are never quoted: neither column
/// can contain a comma.
pub fn export_csv(history: &[Reading], range: &DateRange, zone: DisplayZone) -> ExportResult<Vec<u8>> {
    let rows = range.filter(history);
    if rows.is_empty() {
        return Err(ExportError::EmptyExport);
    }

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for reading in &rows {
        writer.write_record([
            zone.format(reading.timestamp, TIMESTAMP_FORMAT),
            reading.value.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))?;

    tracing::debug!(
        rows = rows.len(),
        total = history.len(),
        bytes = bytes.len(),
        "CSV export built"
    );

    Ok(bytes)
}

/// Read back a file produced by [`export_csv`]
pub fn parse_csv(data: &[u8], zone: DisplayZone) -> ExportResult<Vec<Reading>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if headers.iter().ne(CSV_HEADER.iter().copied()) {
        return Err(ExportError::InvalidRow {
            line: 1,
            message: format!("expected header Timestamp,Value, got {:?}", headers),
        });
    }

    let mut readings = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result?;

        let invalid = |message: String| ExportError::InvalidRow { line, message };

        let ts_str = record.get(0).ok_or_else(|| invalid("missing timestamp".to_string()))?;
        let value_str = record.get(1).ok_or_else(|| invalid("missing value".to_string()))?;

        let naive = NaiveDateTime::parse_from_str(ts_str.trim(), TIMESTAMP_FORMAT)
            .map_err(|e| invalid(format!("timestamp {:?}: {}", ts_str, e)))?;
        let timestamp = zone
            .to_utc(naive)
            .ok_or_else(|| invalid(format!("timestamp {:?} does not exist in {}", ts_str, zone)))?;
        let value: f64 = value_str
            .trim()
            .parse()
            .map_err(|_| invalid(format!("value {:?} is not a number", value_str)))?;

        readings.push(Reading::new(timestamp, value));
    }

    Ok(readings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn history() -> Vec<Reading> {
        vec![
            Reading::new(at(8, 0), 21.0),
            Reading::new(at(9, 0), 22.1),
            Reading::new(at(9, 30), 22.5),
            Reading::new(at(10, 0), 23.4),
            Reading::new(at(11, 0), 24.0),
        ]
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_unbounded_export() {
        let csv = text(export_csv(&history(), &DateRange::unbounded(), DisplayZone::utc()).unwrap());

        assert_eq!(
            csv,
            "Timestamp,Value\n\
             01/01/2024 08:00:00,21\n\
             01/01/2024 09:00:00,22.1\n\
             01/01/2024 09:30:00,22.5\n\
             01/01/2024 10:00:00,23.4\n\
             01/01/2024 11:00:00,24\n"
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::new(Some(at(9, 0)), Some(at(10, 0)));
        let csv = text(export_csv(&history(), &range, DisplayZone::utc()).unwrap());

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Timestamp,Value",
                "01/01/2024 09:00:00,22.1",
                "01/01/2024 09:30:00,22.5",
                "01/01/2024 10:00:00,23.4",
            ]
        );
    }

    #[test]
    fn test_single_open_bound() {
        let range = DateRange::new(None, Some(at(8, 0)));
        let csv = text(export_csv(&history(), &range, DisplayZone::utc()).unwrap());
        assert_eq!(csv, "Timestamp,Value\n01/01/2024 08:00:00,21\n");

        let range = DateRange::new(Some(at(10, 30)), None);
        let csv = text(export_csv(&history(), &range, DisplayZone::utc()).unwrap());
        assert_eq!(csv, "Timestamp,Value\n01/01/2024 11:00:00,24\n");
    }

    #[test]
    fn test_empty_export() {
        let range = DateRange::new(Some(at(12, 0)), None);
        let err = export_csv(&history(), &range, DisplayZone::utc()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyExport));

        let err = export_csv(&[], &DateRange::unbounded(), DisplayZone::utc()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyExport));

        // Start after end selects nothing
        let range = DateRange::new(Some(at(11, 0)), Some(at(8, 0)));
        assert!(matches!(
            export_csv(&history(), &range, DisplayZone::utc()),
            Err(ExportError::EmptyExport)
        ));
    }

    #[test]
    fn test_zone_shifts_timestamps() {
        let zone: DisplayZone = "+07:00".parse().unwrap();
        let range = DateRange::new(Some(at(11, 0)), None);
        let csv = text(export_csv(&history(), &range, zone).unwrap());
        assert_eq!(csv, "Timestamp,Value\n01/01/2024 18:00:00,24\n");
    }

    #[test]
    fn test_read_back_recovers_filtered_rows() {
        let zone: DisplayZone = "-03:00".parse().unwrap();
        let range = DateRange::new(Some(at(9, 0)), Some(at(10, 0)));

        let bytes = export_csv(&history(), &range, zone).unwrap();
        let parsed = parse_csv(&bytes, zone).unwrap();

        let expected: Vec<Reading> = range.filter(&history()).into_iter().copied().collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_read_back_rejects_foreign_files() {
        let err = parse_csv(b"date,temp\n2024-01-01,20\n", DisplayZone::utc()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidRow { line: 1, .. }));

        let err = parse_csv(
            b"Timestamp,Value\n01/01/2024 08:00:00,warm\n",
            DisplayZone::utc(),
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::InvalidRow { line: 2, .. }));
    }
}
