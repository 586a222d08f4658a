//! CSV serialization for transformed reports.
//!
//! Fields are quoted only when needed and records end with `\r\n`.

use std::io::Write;
use std::path::Path;

use super::columns::Report;
use crate::error::{CsvError, CsvResult};

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::CRLF);
    builder
}

/// Write every row of the report, header first. Returns the number of rows
/// written including the header.
pub fn write_report<W: Write>(report: &Report, out: W) -> CsvResult<usize> {
    let mut writer = writer_builder().from_writer(out);
    let mut written = 0;

    for row in report.rows() {
        writer.write_record(&row)?;
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}

/// Write the report to a file, creating or truncating it.
pub fn write_report_file<P: AsRef<Path>>(report: &Report, path: P) -> CsvResult<usize> {
    let file = std::fs::File::create(path.as_ref())?;
    write_report(report, std::io::BufWriter::new(file))
}

/// Render the report to CSV bytes.
pub fn report_to_bytes(report: &Report) -> CsvResult<Vec<u8>> {
    let mut writer = writer_builder().from_writer(Vec::new());
    for row in report.rows() {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))
}
