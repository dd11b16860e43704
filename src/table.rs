//! Tab-separated tables materialized from document sections.

use crate::error::{Error, ParseError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::path::Path;

/// A tabular section: optional column names plus data rows
///
/// `columns` is `None` for header-less sections, whose rows are addressed
/// positionally instead of by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    /// Column names; `None` for header-less tables
    pub columns: Option<Vec<String>>,
    /// Data rows, one `Vec` of fields per row
    pub rows: Vec<Vec<String>>,
}

/// A column requested for removal that the table does not have
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownColumn(
    /// The missing column's name
    pub String,
);

impl Table {
    /// Parse a buffered section body as tab-separated rows
    ///
    /// With `with_header` the first row becomes the column names; without it
    /// every row is data. Ragged rows are rejected by the reader.
    pub fn parse(body: &str, with_header: bool) -> std::result::Result<Self, csv::Error> {
        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_reader(body.as_bytes());
        Self::collect(reader, with_header)
    }

    /// Load a table previously persisted with [`write_tsv`](Self::write_tsv)
    pub fn read_tsv(path: &Path, with_header: bool) -> Result<Self> {
        let file = File::open(path)?;
        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_reader(file);
        Self::collect(reader, with_header).map_err(|e| {
            Error::Parse(ParseError::MalformedTable {
                file: path.to_path_buf(),
                reason: e.to_string(),
            })
        })
    }

    /// Persist the table as a tab-separated file, header row first if present
    pub fn write_tsv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(file);
        let write_failed = |e: csv::Error| {
            Error::Parse(ParseError::MalformedTable {
                file: path.to_path_buf(),
                reason: e.to_string(),
            })
        };
        if let Some(columns) = &self.columns {
            writer.write_record(columns).map_err(write_failed)?;
        }
        for row in &self.rows {
            writer.write_record(row).map_err(write_failed)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, from the header or the first data row
    pub fn width(&self) -> usize {
        self.columns
            .as_ref()
            .map(Vec::len)
            .or_else(|| self.rows.first().map(Vec::len))
            .unwrap_or(0)
    }

    /// Return a copy of the table with the named columns removed
    ///
    /// Strict: every requested name must be present, otherwise the first
    /// absent one is reported. A header-less table has no named columns, so
    /// any request against it fails the same way.
    pub fn drop_columns(&self, names: &[&str]) -> std::result::Result<Self, UnknownColumn> {
        let Some(columns) = &self.columns else {
            let first = names.first().copied().unwrap_or_default();
            return Err(UnknownColumn(first.to_string()));
        };
        if let Some(absent) = names.iter().find(|n| !columns.iter().any(|c| c == **n)) {
            return Err(UnknownColumn((*absent).to_string()));
        }

        let keep: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !names.contains(&column.as_str()))
            .map(|(index, _)| index)
            .collect();
        let project = |row: &Vec<String>| {
            keep.iter()
                .map(|&index| row.get(index).cloned().unwrap_or_default())
                .collect::<Vec<String>>()
        };
        Ok(Self {
            columns: Some(project(columns)),
            rows: self.rows.iter().map(project).collect(),
        })
    }

    fn collect<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        with_header: bool,
    ) -> std::result::Result<Self, csv::Error> {
        let mut records: Vec<Vec<String>> = Vec::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            records.push(record.iter().map(str::to_string).collect());
        }
        let columns = if with_header && !records.is_empty() {
            Some(records.remove(0))
        } else {
            None
        };
        Ok(Self {
            columns,
            rows: records,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const PROBES_BODY: &str = "ID\tSymbol\tDefinition\nILMN_1\tA1BG\talpha-1-B\nILMN_2\tA2M\talpha-2-M\n";

    #[test]
    fn parse_with_header_splits_columns_from_rows() {
        let table = Table::parse(PROBES_BODY, true).unwrap();
        assert_eq!(
            table.columns,
            Some(vec![
                "ID".to_string(),
                "Symbol".to_string(),
                "Definition".to_string()
            ])
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][0], "ILMN_1");
    }

    #[test]
    fn parse_without_header_keeps_every_row_as_data() {
        let table = Table::parse("a\tb\nc\td\ne\tf\n", false).unwrap();
        assert_eq!(table.columns, None);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.width(), 2);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = Table::parse("a\tb\tc\nd\te\n", true);
        assert!(result.is_err(), "short row should fail to parse");
    }

    #[test]
    fn drop_columns_removes_exactly_the_named_ones() {
        let table = Table::parse(PROBES_BODY, true).unwrap();
        let reduced = table.drop_columns(&["Definition"]).unwrap();
        assert_eq!(
            reduced.columns,
            Some(vec!["ID".to_string(), "Symbol".to_string()])
        );
        assert_eq!(reduced.rows[0], vec!["ILMN_1", "A1BG"]);
        assert_eq!(reduced.rows[1], vec!["ILMN_2", "A2M"]);
        // original untouched
        assert_eq!(table.width(), 3);
    }

    #[test]
    fn drop_columns_is_strict_about_absent_names() {
        let table = Table::parse(PROBES_BODY, true).unwrap();
        let err = table.drop_columns(&["Symbol", "Probe_Sequence"]).unwrap_err();
        assert_eq!(err, UnknownColumn("Probe_Sequence".to_string()));
    }

    #[test]
    fn drop_columns_on_headerless_table_fails() {
        let table = Table::parse("1\t2\n3\t4\n", false).unwrap();
        assert!(table.drop_columns(&["Definition"]).is_err());
    }

    #[test]
    fn write_then_read_preserves_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Probes.tsv");

        let table = Table::parse(PROBES_BODY, true).unwrap();
        table.write_tsv(&path).unwrap();

        let loaded = Table::read_tsv(&path, true).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn write_then_read_preserves_headerless_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Heading.tsv");

        let table = Table::parse("x\ty\nz\tw\n", false).unwrap();
        table.write_tsv(&path).unwrap();

        let loaded = Table::read_tsv(&path, false).unwrap();
        assert_eq!(loaded.columns, None);
        assert_eq!(loaded.rows, vec![vec!["x", "y"], vec!["z", "w"]]);
    }

    #[test]
    fn read_tsv_on_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Table::read_tsv(&dir.path().join("absent.tsv"), true).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
