use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use wcstats_common::{Result, WcStatsError};

/// One data line zipped with the header. `line` is the 1-based line number in the file.
#[derive(Debug, Clone)]
pub struct Row {
    pub line: usize,
    pub values: HashMap<String, String>,
}

impl Row {
    pub fn get(&self, column: &str) -> Result<&str> {
        self.values
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| WcStatsError::MissingColumn { column: column.to_owned() })
    }
}

/// Lazily yields [`Row`]s from any line source. The first line is the header.
/// Bare split on the delimiter: no quoting or escaping.
pub struct RowReader<R: BufRead> {
    lines: Lines<R>,
    columns: Vec<String>,
    delimiter: char,
    line_no: usize,
    // first blank line seen since the last data row
    pending_blank: Option<usize>,
}

impl RowReader<BufReader<File>> {
    pub fn open(path: &Path, delimiter: char) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), delimiter)
    }
}

impl<R: BufRead> RowReader<R> {
    pub fn new(source: R, delimiter: char) -> Result<Self> {
        let mut lines = source.lines();
        let header = lines.next().ok_or(WcStatsError::EmptyInput)??;
        let header = header.strip_prefix('\u{feff}').unwrap_or(&header);
        let columns: Vec<String> = split_row(header, delimiter)
            .into_iter()
            .map(|c| c.trim().to_owned())
            .collect();
        log::debug!("header: {} columns: {}", columns.len(), columns.join("|"));
        Ok(Self { lines, columns, delimiter, line_no: 1, pending_blank: None })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fails with `MissingColumn` on the first name not present in the header.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        for col in required {
            if !self.columns.iter().any(|c| c == col) {
                return Err(WcStatsError::MissingColumn { column: (*col).to_owned() });
            }
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            // blank lines are tolerated only at the end of the input
            if raw.trim().is_empty() {
                self.pending_blank.get_or_insert(self.line_no);
                continue;
            }
            if let Some(line) = self.pending_blank.take() {
                return Some(Err(WcStatsError::FieldCount { line, expected: self.columns.len(), found: 1 }));
            }
            let fields = split_row(&raw, self.delimiter);
            if fields.len() != self.columns.len() {
                return Some(Err(WcStatsError::FieldCount {
                    line: self.line_no,
                    expected: self.columns.len(),
                    found: fields.len(),
                }));
            }
            let values = self
                .columns
                .iter()
                .cloned()
                .zip(fields.into_iter().map(str::to_owned))
                .collect();
            return Some(Ok(Row { line: self.line_no, values }));
        }
    }
}

pub fn split_row(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}
