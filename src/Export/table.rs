use crate::Export::record::{CellValue, ExportRecord};
use crate::error::PipelineError;
use csv::Writer;
use log::info;
use prettytable::{Cell, Row, Table};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

/// columns left out of the human-readable view
const TECHNICAL_COLUMNS: [&str; 5] = ["inchi", "molarity_max", "reaction_", "antisolvent", "volume"];

/// Rows of `ExportRecord`s sharing one column list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    pub columns: Vec<String>,
    pub rows: Vec<ExportRecord>,
}

static EMPTY: CellValue = CellValue::Empty;

impl ExportTable {
    /// Table over the union of the records' columns, in first-seen order.
    pub fn from_records(records: Vec<ExportRecord>) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut columns = Vec::new();
        for record in &records {
            for column in record.columns() {
                if seen.insert(column.to_string()) {
                    columns.push(column.to_string());
                }
            }
        }
        Self {
            columns,
            rows: records,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// the cell of a row, `Empty` when the record lacks the column
    pub fn cell(&self, row: usize, column: &str) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// A reaction without the i-th chemical of a role has 0 mol/L of it
    pub fn zero_fill_molarity(&mut self) {
        let molarity_columns: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.ends_with("___molarity"))
            .cloned()
            .collect();
        for row in self.rows.iter_mut() {
            for column in &molarity_columns {
                if row.get(column).is_none_or(|cell| cell.is_empty()) {
                    row.set(column, 0.0);
                }
            }
        }
    }

    /// view without identifiers, molarity ceilings, reaction conditions, antisolvent and volumes
    pub fn human_readable(&self) -> ExportTable {
        let keep: Vec<String> = self
            .columns
            .iter()
            .filter(|c| {
                let lower = c.to_lowercase();
                !TECHNICAL_COLUMNS.iter().any(|t| lower.contains(t))
            })
            .cloned()
            .collect();
        self.select(&keep)
    }

    /// table restricted to the given columns, in the given order
    pub fn select(&self, columns: &[String]) -> ExportTable {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut record = ExportRecord::new();
                for column in columns {
                    if let Some(cell) = row.get(column) {
                        record.set(column, cell.clone());
                    }
                }
                record
            })
            .collect();
        ExportTable {
            columns: columns.to_vec(),
            rows,
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PipelineError> {
        let mut csv_writer = Writer::from_writer(writer);
        csv_writer.write_record(&self.columns)?;
        for i in 0..self.rows.len() {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| self.cell(i, c).to_string())
                .collect();
            csv_writer.write_record(&cells)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// writes the table to `path`, creating parent directories as needed
    pub fn to_csv_file(&self, path: &Path) -> Result<(), PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.write_csv(fs::File::create(path)?)?;
        info!("{} rows written to '{}'", self.rows.len(), path.display());
        Ok(())
    }

    pub fn to_pretty_table(&self) -> Table {
        let mut table = Table::new();
        let header: Vec<Cell> = self.columns.iter().map(|c| Cell::new(c)).collect();
        table.add_row(Row::new(header));
        for i in 0..self.rows.len() {
            let row: Vec<Cell> = self
                .columns
                .iter()
                .map(|c| Cell::new(&self.cell(i, c).to_string()))
                .collect();
            table.add_row(Row::new(row));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ExportTable {
        ExportTable::from_records(vec![
            ExportRecord::new()
                .with("identifier", "R1")
                .with("organic___0___inchikey", "AAAAAAAAAAAAAA-AAAAAAAAAA-N")
                .with("organic___0___molarity", 2.0)
                .with("organic___0___molarity_max", 13.3)
                .with("alpha_vial_volume", 1e-3),
            ExportRecord::new()
                .with("identifier", "R2")
                .with("inorganic___0___molarity", 1.0)
                .with("reaction_time", 3600.0),
        ])
    }

    #[test]
    fn test_union_of_columns_in_first_seen_order() {
        let t = table();
        assert_eq!(
            t.columns,
            vec![
                "identifier",
                "organic___0___inchikey",
                "organic___0___molarity",
                "organic___0___molarity_max",
                "alpha_vial_volume",
                "inorganic___0___molarity",
                "reaction_time"
            ]
        );
        assert!(t.cell(1, "organic___0___molarity").is_empty());
    }

    #[test]
    fn test_zero_fill_molarity() {
        let mut t = table();
        t.zero_fill_molarity();
        assert_eq!(t.cell(1, "organic___0___molarity"), &CellValue::Number(0.0));
        assert_eq!(t.cell(0, "inorganic___0___molarity"), &CellValue::Number(0.0));
        assert!(t.cell(1, "organic___0___molarity_max").is_empty());
    }

    #[test]
    fn test_human_readable() {
        let t = table().human_readable();
        assert_eq!(
            t.columns,
            vec!["identifier", "organic___0___molarity", "inorganic___0___molarity"]
        );
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_write_csv() {
        let mut buffer = Vec::new();
        table().select(&["identifier".to_string(), "organic___0___molarity".to_string()])
            .write_csv(&mut buffer)
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "identifier,organic___0___molarity\nR1,2\nR2,\n");
    }
}
