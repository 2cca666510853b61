//! FILENAME: core/dataset/src/export.rs
//! PURPOSE: CSV serialization of the fact table.
//! CONTEXT: Output must be byte-compatible with the published demo file:
//! header row, one row per record, fields quoted only when they contain a
//! comma or a double quote (quotes doubled), numbers in shortest decimal
//! form, rows joined by '\n' with no trailing newline.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::record::{FactRecord, FIELD_NAMES};

/// Default file name for the download action.
pub const CSV_FILE_NAME: &str = "elderly_care_market_data.csv";

/// Writes the table as CSV to any writer.
pub fn write_csv<W: Write>(records: &[FactRecord], mut out: W) -> Result<(), ExportError> {
    let encoder = RowEncoder::new();

    out.write_all(&encoder.encode(FIELD_NAMES)?)?;
    for record in records {
        out.write_all(b"\n")?;
        out.write_all(&encoder.encode(&record_fields(record))?)?;
    }

    out.flush()?;
    Ok(())
}

/// Renders the table as a CSV string.
pub fn to_csv_string(records: &[FactRecord]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes the table to `path`, returning the number of data rows written.
pub fn export_csv(records: &[FactRecord], path: impl AsRef<Path>) -> Result<usize, ExportError> {
    let file = File::create(path.as_ref())?;
    write_csv(records, BufWriter::new(file))?;
    Ok(records.len())
}

/// Encodes one row at a time so the separator between rows stays under our
/// control (the csv writer always terminates a record).
struct RowEncoder {
    builder: WriterBuilder,
}

impl RowEncoder {
    fn new() -> Self {
        let mut builder = WriterBuilder::new();
        builder
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .buffer_capacity(512);
        RowEncoder { builder }
    }

    fn encode<I, T>(&self, fields: I) -> Result<Vec<u8>, ExportError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut writer = self.builder.from_writer(Vec::new());
        writer.write_record(fields)?;
        let mut bytes = writer.into_inner().map_err(|e| e.into_error())?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        Ok(bytes)
    }
}

fn record_fields(record: &FactRecord) -> [String; 17] {
    [
        record.record_id.to_string(),
        record.year.to_string(),
        record.region.to_string(),
        record.country.to_string(),
        record.care_type.to_string(),
        record.service_offering.to_string(),
        record.care_option.to_string(),
        record.application.to_string(),
        record.gender.to_string(),
        record.age_group.to_string(),
        record.volume_units.to_string(),
        format_number(record.price),
        format_number(record.revenue),
        format_number(record.market_value_usd),
        format_number(record.market_share_pct),
        format_number(record.cagr),
        format_number(record.yoy_growth),
    ]
}

/// Shortest round-trip decimal; negative zero prints as `0`.
fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
