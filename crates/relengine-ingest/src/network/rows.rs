// Structural row validation shared by every loader

use super::error::{FormatIssue, ParserError, Result};
use super::manifest::{FileDescriptor, Manifest};
use super::models::Attributes;
use super::vocabulary::TypeVocabulary;
use csv::StringRecord;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::debug;

// ============================================================================
// Row
// ============================================================================

/// A row that passed the column-count check
#[derive(Debug, Clone)]
pub struct Row {
    /// 1-indexed physical line, header included
    pub line: u64,
    pub fields: StringRecord,
}

impl Row {
    /// Field at `index`; indices are checked against the column count at
    /// configuration time
    pub fn get(&self, index: usize) -> &str {
        self.fields.get(index).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// RowReader
// ============================================================================

/// Lazy, fail-fast reader over a delimited file
///
/// Physical lines are read here and only split by `csv`, so a blank line is
/// a row with zero columns rather than something to skip. With quoting on,
/// a quoted field may span lines; the row keeps its first line number.
///
/// Yields every row whose column count matches `expected_columns`. The
/// first mismatch (or unreadable record) is yielded as an error and the
/// reader stops: nothing after it is read.
pub struct RowReader<R: BufRead> {
    file_name: String,
    expected_columns: usize,
    lines: Lines<R>,
    splitter: csv::ReaderBuilder,
    quoting: bool,
    line: u64,
    finished: bool,
}

impl RowReader<BufReader<File>> {
    /// Open the file a descriptor points at
    pub fn open(root: &Path, descriptor: &FileDescriptor) -> Result<Self> {
        let file = File::open(Manifest::resolve(root, descriptor))?;
        Ok(Self::new(
            BufReader::new(file),
            &descriptor.path,
            descriptor.expected_columns,
            descriptor.delimiter(),
            descriptor.quoting(),
        ))
    }
}

impl<R: BufRead> RowReader<R> {
    pub fn new(
        reader: R,
        file_name: &str,
        expected_columns: usize,
        delimiter: char,
        quoting: bool,
    ) -> Self {
        let mut splitter = csv::ReaderBuilder::new();
        splitter
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter as u8)
            .quoting(quoting);

        Self {
            file_name: file_name.to_string(),
            expected_columns,
            lines: reader.lines(),
            splitter,
            quoting,
            line: 0,
            finished: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn fail(&mut self, line: u64, issue: FormatIssue) -> Option<Result<Row>> {
        self.finished = true;
        Some(Err(ParserError::format(&self.file_name, line, issue)))
    }

    /// Next record's text and starting line, joining lines inside quotes
    fn next_record_text(&mut self) -> Option<Result<(u64, String)>> {
        let mut text = match self.lines.next()? {
            Ok(text) => text,
            Err(e) => return Some(Err(e.into())),
        };
        self.line += 1;
        let start = self.line;

        while self.quoting && has_open_quote(&text) {
            match self.lines.next() {
                Some(Ok(more)) => {
                    self.line += 1;
                    text.push('\n');
                    text.push_str(&more);
                },
                Some(Err(e)) => return Some(Err(e.into())),
                None => {
                    return Some(Err(ParserError::format(
                        &self.file_name,
                        start,
                        FormatIssue::Malformed("unterminated quoted field".to_string()),
                    )))
                },
            }
        }

        Some(Ok((start, text)))
    }

    fn split(&self, text: &str) -> std::result::Result<StringRecord, FormatIssue> {
        let mut fields = StringRecord::new();
        self.splitter
            .from_reader(text.as_bytes())
            .read_record(&mut fields)
            .map_err(|e| FormatIssue::Malformed(e.to_string()))?;
        Ok(fields)
    }
}

fn has_open_quote(text: &str) -> bool {
    text.bytes().filter(|b| *b == b'"').count() % 2 == 1
}

impl<R: BufRead> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let (line, text) = match self.next_record_text()? {
            Ok(record) => record,
            Err(e) => {
                self.finished = true;
                return Some(Err(e));
            },
        };

        let fields = if text.is_empty() {
            StringRecord::new()
        } else {
            match self.split(&text) {
                Ok(fields) => fields,
                Err(issue) => return self.fail(line, issue),
            }
        };

        if fields.len() != self.expected_columns {
            return self.fail(
                line,
                FormatIssue::ColumnCount {
                    expected: self.expected_columns,
                    found: fields.len(),
                },
            );
        }

        Some(Ok(Row { line, fields }))
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Everything a loader sees for one data row
pub struct ScannedRow<'a> {
    pub file: &'a str,
    pub row: &'a Row,
    /// Value of the type column, already checked against the vocabulary
    pub row_type: Option<&'a str>,
    /// Column names from the header, or `col_<n>` for headerless files
    pub header: &'a [String],
}

impl ScannedRow<'_> {
    /// Fail the scan at this row
    pub fn error(&self, issue: FormatIssue) -> ParserError {
        ParserError::format(self.file, self.row.line, issue)
    }

    /// Non-empty identifier from `column`
    pub fn identifier(&self, column: usize) -> Result<&str> {
        let value = self.row.get(column);
        if value.is_empty() {
            return Err(self.error(FormatIssue::EmptyValue { column }));
        }
        Ok(value)
    }

    /// Name of `column` for use as an attribute key
    pub fn column_name(&self, column: usize) -> &str {
        self.header.get(column).map(String::as_str).unwrap_or_default()
    }

    /// Every column except `skip` as string attributes keyed by column name
    pub fn attributes(&self, skip: &[usize]) -> Attributes {
        self.row
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| !skip.contains(i))
            .map(|(i, value)| {
                let name = match self.column_name(i) {
                    "" => format!("col_{}", i),
                    name => name.to_string(),
                };
                (name, Value::String(value.to_string()))
            })
            .collect()
    }
}

/// Validate one file row by row and hand each data row to `on_row`
///
/// The header (if any) goes through the column-count check but not the
/// vocabulary check. Returns the number of data rows seen.
pub fn scan_file<F>(root: &Path, descriptor: &FileDescriptor, on_row: F) -> Result<usize>
where
    F: FnMut(ScannedRow<'_>) -> Result<()>,
{
    let reader = RowReader::open(root, descriptor)?;
    scan_rows(reader, descriptor, on_row)
}

/// Same as [`scan_file`] over an already-open reader
pub fn scan_rows<R, F>(
    mut reader: RowReader<R>,
    descriptor: &FileDescriptor,
    mut on_row: F,
) -> Result<usize>
where
    R: BufRead,
    F: FnMut(ScannedRow<'_>) -> Result<()>,
{
    let vocabulary = TypeVocabulary::for_descriptor(descriptor);
    let mut header: Vec<String> = (0..descriptor.expected_columns)
        .map(|i| format!("col_{}", i))
        .collect();

    if descriptor.has_header {
        match reader.next() {
            Some(row) => header = row?.fields.iter().map(|h| h.trim().to_string()).collect(),
            None => {
                debug!(file = %descriptor.path, "Empty file");
                return Ok(0);
            },
        }
    }

    let mut count = 0;
    for row in reader {
        let row = row?;
        let row_type = match &vocabulary {
            Some(vocabulary) => Some(vocabulary.check(&descriptor.path, &row)?),
            None => None,
        };
        on_row(ScannedRow {
            file: &descriptor.path,
            row: &row,
            row_type,
            header: &header,
        })?;
        count += 1;
    }

    debug!(file = %descriptor.path, rows = count, "Scanned file");
    Ok(count)
}
