use std::io::Read;

use crate::input::InputError;

/// A delimited table held as trimmed strings. Cells are coerced to numbers
/// only when a stage needs them.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn require_column(&self, column: &str) -> Result<usize, InputError> {
        self.column_index(column)
            .ok_or_else(|| InputError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Short rows read as empty cells.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}

pub fn read_table<R: Read>(name: &str, reader: R) -> Result<Table, InputError> {
    let csv_err = |source: csv::Error| InputError::Csv {
        table: name.to_string(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table {
        name: name.to_string(),
        headers,
        rows,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/table.rs"]
mod tests;
