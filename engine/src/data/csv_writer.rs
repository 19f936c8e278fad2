// Serializes a table back to delimited text using the csv crate writer.
use crate::error::EngineError;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use shared::models::Delimiter;

/// File name used for CSV downloads.
pub const CSV_FILE_NAME: &str = "edited_file.csv";

/// Writes headers and rows as delimited text.
///
/// Every field is quoted and inner quotes are doubled, whether or not the
/// field needs it. Lines are separated by `\n` with no trailing newline. Rows
/// are written as they are, without padding to the header width.
pub fn serialize_csv(headers: &[String], rows: &[Vec<String>], delimiter: Delimiter) -> Result<String, EngineError> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    for record in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        // The writer would emit `""` for a record without fields.
        if record.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.push(write_line(record, delimiter)?);
    }
    Ok(lines.join("\n"))
}

fn write_line(record: &[String], delimiter: Delimiter) -> Result<String, EngineError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(record)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| EngineError::ProcessingError(format!("CSV writer flush failed: {}", e.error())))?;
    let mut line = String::from_utf8(bytes)
        .map_err(|e| EngineError::ProcessingError(format!("CSV writer produced invalid UTF-8: {}", e)))?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}
