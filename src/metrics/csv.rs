//! Minimal reader for the analysis tool's comma-separated output.
//!
//! Handles quoted fields with embedded commas and doubled quotes; columns
//! are addressed by header name.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let columns = lines
            .next()
            .map(|header| {
                split_record(header)
                    .into_iter()
                    .enumerate()
                    .map(|(i, name)| (name.trim().trim_start_matches('\u{feff}').to_string(), i))
                    .collect()
            })
            .unwrap_or_default();
        let rows = lines.map(split_record).collect();
        Self { columns, rows }
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Names from `required` that are not in the header.
    #[must_use]
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().enumerate().map(move |(index, fields)| Record {
            table: self,
            index,
            fields,
        })
    }
}

/// One data row.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a CsvTable,
    /// 0-based position among data rows.
    pub index: usize,
    fields: &'a [String],
}

impl<'a> Record<'a> {
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let &i = self.table.columns.get(column)?;
        self.fields.get(i).map(|f| f.trim())
    }
}

fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
