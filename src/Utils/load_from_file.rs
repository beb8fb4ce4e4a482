use crate::Chemistry::chemical::Chemical;
use crate::Chemistry::role::Role;
use crate::Dispensing::dispense::RawRecord;
use crate::error::PipelineError;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{error, info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub const INCHIKEY_COLUMN: &str = "InChI Key (ID)";
pub const INCHI_COLUMN: &str = "InChI=";
pub const NAME_COLUMN: &str = "Chemical Name";
pub const MOLAR_MASS_COLUMN: &str = "Molecular Weight (g/mol)";
pub const DENSITY_COLUMN: &str = "Density (g/mL)";
pub const CATEGORY_COLUMN: &str = "Chemical Category";

/// file set of one run: the raw dispensing records and, optionally, the chemical inventory
pub struct LoadData {
    pub records_file: PathBuf,
    pub inventory_file: Option<PathBuf>,
}

impl LoadData {
    pub fn new(records_file: PathBuf, inventory_file: Option<PathBuf>) -> Self {
        LoadData {
            records_file,
            inventory_file,
        }
    }
    pub fn load_records(&self) -> Result<Vec<RawRecord>, PipelineError> {
        load_raw_records(&self.records_file)
    }
    pub fn load_inventory(&self) -> Result<Option<Vec<Chemical>>, PipelineError> {
        match &self.inventory_file {
            Some(path) => Ok(Some(load_inventory_from_csv(path)?)),
            None => Ok(None),
        }
    }
}

fn open(path: &Path) -> Result<File, PipelineError> {
    if !path.exists() {
        error!("file '{}' does not exist", path.display());
        return Err(PipelineError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file '{}' does not exist", path.display()),
        )));
    }
    Ok(File::open(path)?)
}

/// lab exports pad header names with runs of spaces ("Density            (g/mL)")
fn normalize_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| normalize_header(h) == name)
}

/// parses a number written with thousands separators ("1,234.5")
fn parse_number(field: &str) -> Option<f64> {
    let cleaned: String = field.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses the chemical inventory from any reader.
/// Rows without InChIKey, name, molar mass, density or category are skipped with a warning.
pub fn parse_inventory<R: Read>(reader: R) -> Result<Vec<Chemical>, PipelineError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut columns: HashMap<&str, usize> = HashMap::new();
    for name in [
        INCHIKEY_COLUMN,
        NAME_COLUMN,
        MOLAR_MASS_COLUMN,
        DENSITY_COLUMN,
        CATEGORY_COLUMN,
    ] {
        match column_index(&headers, name) {
            Some(index) => {
                columns.insert(name, index);
            }
            None => {
                error!("chemical inventory has no '{}' column", name);
                return Err(PipelineError::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("chemical inventory has no '{}' column", name),
                )));
            }
        }
    }
    let inchi_column = column_index(&headers, INCHI_COLUMN);

    let mut chemicals = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = line + 2;
        let field = |name: &str| record.get(columns[name]).unwrap_or("").trim();

        let inchikey = field(INCHIKEY_COLUMN);
        let name = field(NAME_COLUMN);
        let molar_mass = parse_number(field(MOLAR_MASS_COLUMN));
        let density = parse_number(field(DENSITY_COLUMN));
        let category = field(CATEGORY_COLUMN);
        let (Some(molar_mass), Some(density)) = (molar_mass, density) else {
            warn!(
                "inventory line {} ({}) has no usable molar mass or density, skipped",
                line, inchikey
            );
            continue;
        };
        if inchikey.is_empty() || name.is_empty() || category.is_empty() {
            warn!("inventory line {} is incomplete, skipped", line);
            continue;
        }
        let role = match Role::from_category(category) {
            Ok(role) => role,
            Err(e) => {
                warn!("inventory line {} ({}): {}, skipped", line, inchikey, e);
                continue;
            }
        };

        let mut chemical = Chemical::new(inchikey, name)
            .with_category(role)
            .with_constants(molar_mass, density);
        if let Some(index) = inchi_column {
            chemical = chemical.with_inchi(record.get(index).unwrap_or("").trim());
        }
        chemicals.push(chemical);
    }
    Ok(chemicals)
}

/// Loads the chemical inventory CSV.
pub fn load_inventory_from_csv(path: &Path) -> Result<Vec<Chemical>, PipelineError> {
    let chemicals = parse_inventory(open(path)?)?;
    if chemicals.is_empty() {
        warn!("chemical inventory '{}' is empty", path.display());
    }
    info!(
        "loaded {} chemicals from '{}'",
        chemicals.len(),
        path.display()
    );
    Ok(chemicals)
}

/// Parses raw dispensing records (one row per dispensed chemical) from any reader.
pub fn parse_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, PipelineError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for record in csv_reader.deserialize() {
        let record: RawRecord = record?;
        records.push(record);
    }
    Ok(records)
}

/// Loads the raw dispensing records CSV.
pub fn load_raw_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>, PipelineError> {
    let path = path.as_ref();
    let records = parse_raw_records(open(path)?)?;
    info!(
        "loaded {} dispensing records from '{}'",
        records.len(),
        path.display()
    );
    Ok(records)
}
