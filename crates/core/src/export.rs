//! CSV and JSON export of committed measurements
//!
//! JSON carries every field, including the type-specific payloads, and reads
//! back without loss. CSV flattens each measurement to a fixed set of scalar
//! columns for spreadsheets; everything else is intentionally left out.

use crate::error::ExportResult;
use crate::measurement::Measurement;
use crate::store::MeasurementStore;
use std::io::{Read, Write};

/// Configuration for CSV export
#[derive(Debug, Clone)]
pub struct CsvExportConfig {
    /// Include column headers in the output
    pub include_headers: bool,

    /// CSV delimiter character
    pub delimiter: u8,

    /// Export only measurements from specific pages (None = all pages)
    pub page_filter: Option<Vec<u16>>,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
            page_filter: None,
        }
    }
}

/// CSV column headers, in order
pub const CSV_HEADERS: [&str; 8] = ["ID", "Type", "Label", "Length", "Area", "Unit", "Notes", "Page"];

/// Export measurements to CSV format
///
/// CSV columns:
/// - ID: Unique measurement identifier
/// - Type: Tool tag (trench, bore-shot, ...)
/// - Label: Display label with per-type sequence number (e.g. "Trench 2")
/// - Length: Derived length in real units, empty if not applicable
/// - Area: Derived area in square real units, empty if not applicable
/// - Unit: Linear unit in effect when the measurement was committed
/// - Notes: User notes (if any)
/// - Page: Page index (0-based)
pub fn export_measurements_csv<W: Write>(
    writer: W,
    store: &MeasurementStore,
    config: &CsvExportConfig,
) -> ExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.include_headers)
        .from_writer(writer);

    if config.include_headers {
        csv_writer.write_record(CSV_HEADERS)?;
    }

    let included = |m: &&Measurement| match &config.page_filter {
        Some(pages) => pages.contains(&m.page_index()),
        None => true,
    };

    for measurement in store.list().iter().filter(included) {
        csv_writer.write_record(&[
            measurement.id().to_string(),
            measurement.tool_type().to_string(),
            store.label(measurement.id()).unwrap_or_default(),
            format_optional(measurement.length()),
            format_optional(measurement.area()),
            measurement.unit().to_string(),
            measurement.notes().unwrap_or("").to_string(),
            measurement.page_index().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export measurements to a CSV string
pub fn export_measurements_csv_string(
    store: &MeasurementStore,
    config: &CsvExportConfig,
) -> ExportResult<String> {
    let mut buffer = Vec::new();
    export_measurements_csv(&mut buffer, store, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Export every measurement, with all fields, as a pretty-printed JSON array
pub fn export_measurements_json<W: Write>(writer: W, store: &MeasurementStore) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, store.list())?;
    Ok(())
}

/// Read measurements previously written by [`export_measurements_json`]
///
/// Each record is checked for agreement between its type and geometry.
pub fn import_measurements_json<R: Read>(reader: R) -> ExportResult<Vec<Measurement>> {
    let measurements: Vec<Measurement> = serde_json::from_reader(reader)?;
    for measurement in &measurements {
        measurement.validate()?;
    }
    Ok(measurements)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
