use std::collections::HashMap;
use std::fmt;

/// typed cell of an exported table
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(x) => Some(*x),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(_) | CellValue::Empty => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Integer(value as i64)
    }
}

impl From<u8> for CellValue {
    fn from(value: u8) -> Self {
        CellValue::Integer(value as i64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(x) => write!(f, "{}", x),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Empty => Ok(()),
        }
    }
}

/// One row of an export: named cells in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRecord {
    cells: Vec<(String, CellValue)>,
    index: HashMap<String, usize>,
}

impl ExportRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// sets a cell; a column set twice keeps its first position and the last value
    pub fn set<V: Into<CellValue>>(&mut self, column: &str, value: V) {
        let value = value.into();
        match self.index.get(column) {
            Some(&i) => self.cells[i].1 = value,
            None => {
                self.index.insert(column.to_string(), self.cells.len());
                self.cells.push((column.to_string(), value));
            }
        }
    }

    pub fn with<V: Into<CellValue>>(mut self, column: &str, value: V) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.index.get(column).map(|&i| &self.cells[i].1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_column_order() {
        let mut record = ExportRecord::new()
            .with("identifier", "R1")
            .with("outcome", Some(4usize))
            .with("alpha_vial_volume", 5e-4);
        record.set("identifier", "R2");
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["identifier", "outcome", "alpha_vial_volume"]);
        assert_eq!(record.get("identifier"), Some(&CellValue::Text("R2".to_string())));
        assert_eq!(record.get("outcome").and_then(|c| c.as_f64()), Some(4.0));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::from(None::<f64>).to_string(), "");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
        assert_eq!(CellValue::from("1%1%0%0").to_string(), "1%1%0%0");
    }
}
