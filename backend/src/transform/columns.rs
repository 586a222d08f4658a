//! Column transformer for project/person exports.
//!
//! Applies a fixed mapping to a parsed [`Table`]:
//!
//! 1. **Rename** `Project External System Code` → `PROJECT Code` and
//!    `Project Description` → `PROJECT Series`, into a new table.
//! 2. **Clean** both renamed columns by dropping one trailing ASCII digit.
//! 3. **Select** the nine output columns in [`OUTPUT_COLUMNS`] order.
//! 4. **Assemble** rows: the header names first, then one row per index up
//!    to the shortest selected column.
//!
//! The output schema lists `Project Code` twice and never surfaces the
//! cleaned `PROJECT Code` column. That mapping is reproduced as-is.

use crate::error::{TransformError, TransformResult};
use crate::models::Table;

/// Source column renamed to [`PROJECT_CODE`].
pub const SOURCE_PROJECT_CODE: &str = "Project External System Code";

/// Source column renamed to [`PROJECT_SERIES`].
pub const SOURCE_PROJECT_SERIES: &str = "Project Description";

pub const PROJECT_CODE: &str = "PROJECT Code";
pub const PROJECT_SERIES: &str = "PROJECT Series";

/// Renames applied before selection, as `(source, destination)`.
pub const RENAMES: [(&str, &str); 2] = [
    (SOURCE_PROJECT_CODE, PROJECT_CODE),
    (SOURCE_PROJECT_SERIES, PROJECT_SERIES),
];

/// Columns that must be present in the input.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    SOURCE_PROJECT_CODE,
    SOURCE_PROJECT_SERIES,
    "Person Account",
    "Person Code",
    "Person First Name",
    "Person Last Name",
    "Project Code",
    "Project Title",
    "Project End Date",
];

/// Number of columns in every output row.
pub const OUTPUT_WIDTH: usize = 9;

/// Output schema, in order.
pub const OUTPUT_COLUMNS: [&str; OUTPUT_WIDTH] = [
    "Person Account",
    "Person Code",
    "Person First Name",
    "Person Last Name",
    "Project Code",
    PROJECT_SERIES,
    "Project Code",
    "Project Title",
    "Project End Date",
];

/// Drop a single trailing ASCII digit.
///
/// Only one digit is removed: `"AB123"` becomes `"AB12"`.
pub fn strip_trailing_digit(value: &str) -> &str {
    match value.as_bytes().last() {
        // ASCII digits are one byte, so the slice stays on a char boundary.
        Some(b) if b.is_ascii_digit() => &value[..value.len() - 1],
        _ => value,
    }
}

/// Check that every required source column is present.
///
/// Reports the first missing column in [`REQUIRED_COLUMNS`] order.
pub fn check_required(table: &Table) -> TransformResult<()> {
    match REQUIRED_COLUMNS.iter().find(|name| !table.contains(name)) {
        Some(name) => Err(TransformError::MissingColumn(name.to_string())),
        None => Ok(()),
    }
}

/// Return a new table with the [`RENAMES`] applied.
///
/// Renamed columns take the position of their source column and replace any
/// input column already carrying the destination name. The input is left
/// untouched.
pub fn rename_columns(table: &Table) -> Table {
    let shadowed = |name: &str| {
        RENAMES
            .iter()
            .any(|(from, to)| *to == name && table.contains(from))
    };

    Table::from_columns(
        table
            .iter()
            .filter(|(name, _)| !shadowed(*name))
            .map(|(name, cells)| {
                let name = RENAMES
                    .iter()
                    .find(|(from, _)| *from == name)
                    .map_or(name, |(_, to)| *to);
                (name, cells.to_vec())
            }),
    )
}

/// Run the full column transformation.
///
/// Fails with [`TransformError::MissingColumn`] before producing anything if
/// a required column is absent.
pub fn transform(table: &Table) -> TransformResult<Report> {
    check_required(table)?;

    let mut renamed = rename_columns(table);

    for name in [PROJECT_CODE, PROJECT_SERIES] {
        let cleaned: Vec<String> = renamed
            .column(name)
            .map(|cells| cells.iter().map(|c| strip_trailing_digit(c).to_string()).collect())
            .ok_or_else(|| TransformError::MissingColumn(name.to_string()))?;
        renamed.insert_column(name, cleaned);
    }

    let mut columns = Vec::with_capacity(OUTPUT_WIDTH);
    for name in OUTPUT_COLUMNS {
        let cells = renamed
            .column(name)
            .ok_or_else(|| TransformError::MissingColumn(name.to_string()))?;
        columns.push(cells.to_vec());
    }

    Ok(Report::new(columns))
}

// =============================================================================
// Report
// =============================================================================

/// Transformed output: the selected columns in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    columns: Vec<Vec<String>>,
    data_rows: usize,
}

impl Report {
    fn new(columns: Vec<Vec<String>>) -> Self {
        let data_rows = columns.iter().map(Vec::len).min().unwrap_or(0);
        Self { columns, data_rows }
    }

    /// Output header names.
    pub fn header(&self) -> [&'static str; OUTPUT_WIDTH] {
        OUTPUT_COLUMNS
    }

    /// Number of data rows (excluding the header).
    pub fn data_row_count(&self) -> usize {
        self.data_rows
    }

    /// True when the selected columns had different lengths and the longer
    /// ones were cut to the shortest.
    pub fn is_truncated(&self) -> bool {
        self.columns.iter().any(|c| c.len() != self.data_rows)
    }

    /// Iterate the header row followed by every data row.
    ///
    /// Each call starts a fresh pass.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            report: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = Vec<&'a str>;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

/// Iterator over a [`Report`]'s rows, header first.
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    report: &'a Report,
    next: usize,
}

impl<'a> Iterator for Rows<'a> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        if index > self.report.data_rows {
            return None;
        }
        self.next += 1;

        let row = if index == 0 {
            OUTPUT_COLUMNS.to_vec()
        } else {
            self.report
                .columns
                .iter()
                .map(|column| column[index - 1].as_str())
                .collect()
        };
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.report.data_rows + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT_HEADER: [&str; 9] = [
        "Project External System Code",
        "Project Description",
        "Person Account",
        "Person Code",
        "Person First Name",
        "Person Last Name",
        "Project Code",
        "Project Title",
        "Project End Date",
    ];

    fn sample_table(rows: &[[&str; 9]]) -> Table {
        Table::from_columns(
            INPUT_HEADER
                .iter()
                .enumerate()
                .map(|(i, name)| (*name, rows.iter().map(|r| r[i]).collect::<Vec<_>>())),
        )
    }

    #[test]
    fn test_strip_single_trailing_digit() {
        assert_eq!(strip_trailing_digit("AB123"), "AB12");
        assert_eq!(strip_trailing_digit("ABC123"), "ABC12");
        assert_eq!(strip_trailing_digit("DESC9"), "DESC");
        assert_eq!(strip_trailing_digit("DESC"), "DESC");
        assert_eq!(strip_trailing_digit("7"), "");
        assert_eq!(strip_trailing_digit(""), "");
        assert_eq!(strip_trailing_digit("Série"), "Série");
        assert_eq!(strip_trailing_digit("x٣"), "x٣");
    }

    #[test]
    fn test_strip_is_not_idempotent() {
        let once = strip_trailing_digit("AB123");
        assert_ne!(strip_trailing_digit(once), once);
    }

    #[test]
    fn test_rename_produces_new_table() {
        let table = sample_table(&[["ABC123", "DESC9", "a", "b", "c", "d", "e", "f", "g"]]);
        let renamed = rename_columns(&table);

        assert!(!renamed.contains(SOURCE_PROJECT_CODE));
        assert!(!renamed.contains(SOURCE_PROJECT_SERIES));
        assert_eq!(renamed.column(PROJECT_CODE).unwrap(), ["ABC123"]);
        assert_eq!(renamed.column(PROJECT_SERIES).unwrap(), ["DESC9"]);
        assert_eq!(renamed.column_names().next(), Some(PROJECT_CODE));

        // input untouched
        assert!(table.contains(SOURCE_PROJECT_CODE));
        assert!(!table.contains(PROJECT_CODE));
    }

    #[test]
    fn test_end_to_end_row() {
        let table = sample_table(&[[
            "ABC123", "DESC9", "acct1", "pc1", "First", "Last", "PC1", "Title1", "2024-01-01",
        ]]);
        let report = transform(&table).unwrap();
        let rows: Vec<Vec<&str>> = report.rows().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], OUTPUT_COLUMNS.to_vec());
        assert_eq!(
            rows[1],
            vec!["acct1", "pc1", "First", "Last", "PC1", "DESC", "PC1", "Title1", "2024-01-01"]
        );
    }

    #[test]
    fn test_header_independent_of_input_order() {
        let mut names = INPUT_HEADER;
        names.reverse();
        let table = Table::from_columns(names.iter().map(|n| (*n, vec!["v1"])));

        let report = transform(&table).unwrap();
        assert_eq!(
            report.rows().next().unwrap(),
            vec![
                "Person Account",
                "Person Code",
                "Person First Name",
                "Person Last Name",
                "Project Code",
                "PROJECT Series",
                "Project Code",
                "Project Title",
                "Project End Date",
            ]
        );
        assert_eq!(report.header(), OUTPUT_COLUMNS);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let mut table = sample_table(&[["A1", "S2", "a", "b", "c", "d", "e", "f", "g"]]);
        table.insert_column("Notes", vec!["ignored".into()]);

        let report = transform(&table).unwrap();
        let row = report.rows().nth(1).unwrap();
        assert_eq!(row.len(), OUTPUT_WIDTH);
        assert!(!row.contains(&"ignored"));
    }

    #[test]
    fn test_renamed_column_replaces_existing_destination() {
        let mut table = sample_table(&[["ABC123", "DESC9", "a", "b", "c", "d", "e", "f", "g"]]);
        table.insert_column(PROJECT_SERIES, vec!["STALE".into()]);
        table.insert_column(PROJECT_CODE, vec!["OLD7".into()]);

        let renamed = rename_columns(&table);
        assert_eq!(renamed.len(), INPUT_HEADER.len());
        assert_eq!(renamed.column(PROJECT_SERIES).unwrap(), ["DESC9"]);
        assert_eq!(renamed.column(PROJECT_CODE).unwrap(), ["ABC123"]);

        let report = transform(&table).unwrap();
        let row = report.rows().nth(1).unwrap();
        assert_eq!(row[5], "DESC");
        assert!(!row.contains(&"STALE"));
    }

    #[test]
    fn test_destination_kept_without_source() {
        let table = Table::from_columns([(PROJECT_SERIES, vec!["kept"])]);
        let renamed = rename_columns(&table);
        assert_eq!(renamed.column(PROJECT_SERIES).unwrap(), ["kept"]);
    }

    #[test]
    fn test_missing_column() {
        let mut columns: Vec<(&str, Vec<&str>)> =
            INPUT_HEADER.iter().map(|n| (*n, vec!["x"])).collect();
        columns.retain(|(name, _)| *name != "Project Title");
        let table = Table::from_columns(columns);

        assert_eq!(
            transform(&table),
            Err(TransformError::MissingColumn("Project Title".to_string()))
        );
    }

    #[test]
    fn test_missing_dead_source_column_still_fails() {
        let table = Table::from_columns(
            INPUT_HEADER
                .iter()
                .filter(|n| **n != SOURCE_PROJECT_CODE)
                .map(|n| (*n, vec!["x"])),
        );

        assert_eq!(
            check_required(&table),
            Err(TransformError::MissingColumn(SOURCE_PROJECT_CODE.to_string()))
        );
    }

    #[test]
    fn test_row_count_is_shortest_column() {
        let mut table = sample_table(&[
            ["A1", "S1", "a", "b", "c", "d", "e", "f", "g"],
            ["A2", "S2", "a", "b", "c", "d", "e", "f", "g"],
            ["A3", "S3", "a", "b", "c", "d", "e", "f", "g"],
        ]);
        table.insert_column("Project Title", vec!["t1".into(), "t2".into()]);

        let report = transform(&table).unwrap();
        assert!(report.is_truncated());
        assert_eq!(report.data_row_count(), 2);
        assert_eq!(report.rows().len(), 3);
        assert_eq!(report.rows().count(), 3);
    }

    #[test]
    fn test_rows_restartable() {
        let table = sample_table(&[
            ["A1", "S1", "a1", "b", "c", "d", "e", "f", "g"],
            ["A2", "S2", "a2", "b", "c", "d", "e", "f", "g"],
        ]);
        let report = transform(&table).unwrap();

        let first: Vec<_> = report.rows().collect();
        let second: Vec<_> = (&report).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(!report.is_truncated());
    }

    #[test]
    fn test_empty_table_yields_header_only() {
        let table = sample_table(&[]);
        let report = transform(&table).unwrap();

        let rows: Vec<_> = report.rows().collect();
        assert_eq!(rows, vec![OUTPUT_COLUMNS.to_vec()]);
    }

    #[test]
    fn test_series_cleaned_code_dropped() {
        let table = sample_table(&[["ABC123", "SERIES42", "a", "b", "c", "d", "e", "f", "g"]]);
        let report = transform(&table).unwrap();
        let row = report.rows().nth(1).unwrap();

        assert_eq!(row[5], "SERIES4");
        // Project Code passes through untouched in both slots
        assert_eq!(row[4], "e");
        assert_eq!(row[6], "e");
        assert!(!row.contains(&"ABC12"));
    }
}
