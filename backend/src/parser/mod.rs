//! CSV to [`Table`] parser with encoding auto-detection.
//!
//! Reads comma-separated exports with standard quoting. The first record is
//! the header; every later record contributes one cell to each column.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::Table;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed columns
    pub table: Table,
    /// Detected encoding
    pub encoding: String,
    /// Column headers in file order
    pub headers: Vec<String>,
    /// Number of data rows read
    pub row_count: usize,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Latin-1 labels decode as windows-1252, the WHATWG mapping for them.
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "iso-8859-15" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Parse decoded CSV text into a [`Table`].
///
/// Short rows are padded with empty cells and surplus cells are dropped, so
/// each column ends up with exactly one cell per data row.
///
/// # Example
/// ```ignore
/// use reportload::parse_csv;
///
/// let table = parse_csv("name,age\nAlice,30\nBob,25").unwrap();
///
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.column("name").unwrap()[1], "Bob");
/// ```
pub fn parse_csv(content: &str) -> CsvResult<Table> {
    let (table, _) = read_table(content)?;
    Ok(table)
}

fn read_table(content: &str) -> CsvResult<(Table, Vec<String>)> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(CsvError::DuplicateHeader(header.clone()));
        }
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (i, cells) in columns.iter_mut().enumerate() {
            cells.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let table = Table::from_columns(headers.iter().cloned().zip(columns));
    Ok((table, headers))
}

/// Parse CSV bytes with auto-detection of encoding.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let (table, headers) = read_table(&content)?;

    Ok(ParseResult {
        row_count: table.row_count(),
        table,
        encoding,
        headers,
    })
}

/// Parse a CSV file with auto-detection of encoding.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_csv("name,age\nAlice,30\nBob,25").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("name").unwrap(), ["Alice", "Bob"]);
        assert_eq!(table.column("age").unwrap(), ["30", "25"]);
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name,value\n\"Smith, Jane\",\"said \"\"hi\"\"\"\n";
        let table = parse_csv(csv).unwrap();

        assert_eq!(table.column("name").unwrap()[0], "Smith, Jane");
        assert_eq!(table.column("value").unwrap()[0], "said \"hi\"");
    }

    #[test]
    fn test_short_rows_padded() {
        let table = parse_csv("a,b,c\n1,,3\n4\n").unwrap();

        assert!(!table.is_ragged());
        assert_eq!(table.column("b").unwrap(), ["", ""]);
        assert_eq!(table.column("c").unwrap(), ["3", ""]);
    }

    #[test]
    fn test_extra_cells_ignored() {
        let table = parse_csv("a,b\n1,2,3,4").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column("a").unwrap(), ["1"]);
        assert_eq!(table.column("b").unwrap(), ["2"]);
    }

    #[test]
    fn test_header_only() {
        let table = parse_csv("a,b\n").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv(""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_csv("  \n"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_duplicate_header_error() {
        let err = parse_csv("a,b,a\n1,2,3").unwrap_err();
        assert!(matches!(err, CsvError::DuplicateHeader(ref name) if name == "a"));
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let table = parse_csv("\u{feff}Person Code,x\npc1,1").unwrap();
        assert!(table.contains("Person Code"));
    }

    #[test]
    fn test_auto_parse() {
        let csv = "name,age\nAlice,30\nBob,25";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.row_count, 2);
        assert_eq!(result.headers, vec!["name", "age"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_currency_sign() {
        assert_eq!(decode_content(&[0xA4], "iso-8859-1"), "¤");
        assert_eq!(decode_content(&[0xBD], "latin1"), "½");
        assert_eq!(decode_content(&[0xA4], "iso-8859-15"), "€");
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let result = parse_csv_file_auto(&path).unwrap();
        assert_eq!(result.table.column("b").unwrap(), ["2"]);

        let missing = parse_csv_file_auto(dir.path().join("nope.csv"));
        assert!(matches!(missing, Err(CsvError::IoError(_))));
    }
}
