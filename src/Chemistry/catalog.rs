use crate::Chemistry::chemical::{Chemical, RawChemicalRef};
use crate::Utils::load_from_file::load_inventory_from_csv;
use crate::error::{PipelineError, PlumbError};
use log::{info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};

fn inchikey_regex() -> &'static Regex {
    static INCHIKEY: OnceLock<Regex> = OnceLock::new();
    INCHIKEY.get_or_init(|| {
        Regex::new(r"^[A-Z]{14}-[A-Z]{10}-[A-Z]$").expect("InChIKey pattern is a valid regex")
    })
}

/// Trims and upper-cases an InChIKey and checks its layout (14-10-1 upper-case letters).
pub fn normalize_inchikey(raw: &str) -> Result<String, PlumbError> {
    let key = raw.trim().to_uppercase();
    if key.is_empty() {
        return Err(PlumbError::UnresolvedChemical {
            reference: raw.to_string(),
            reason: "empty structural identifier".to_string(),
        });
    }
    if !inchikey_regex().is_match(&key) {
        return Err(PlumbError::UnresolvedChemical {
            reference: raw.to_string(),
            reason: "malformed InChIKey".to_string(),
        });
    }
    Ok(key)
}

/// Names of the constants a raw reference carries with a value other than the canonical
/// chemical's. Constants missing on either side never conflict.
pub(crate) fn conflicting_constants(chemical: &Chemical, raw: &RawChemicalRef) -> Vec<&'static str> {
    let differs = |known: Option<f64>, seen: Option<f64>| match (known, seen) {
        (Some(known), Some(seen)) => (known - seen).abs() > 1e-9 * known.abs().max(seen.abs()),
        _ => false,
    };
    let mut conflicts = Vec::new();
    if differs(chemical.molar_mass, raw.molar_mass) {
        conflicts.push("molar mass");
    }
    if differs(chemical.density, raw.density) {
        conflicts.push("density");
    }
    conflicts
}

/// Catalog of canonical chemicals.
///
/// The catalog is passed by reference to every component that needs to resolve a chemical,
/// so tests can build isolated catalogs. An *open* catalog memoizes every well-formed reference
/// it sees; a *closed* catalog (loaded from the chemical inventory) resolves known keys only.
/// The memo is guarded by a `RwLock`: one writer while records are canonicalized, many readers
/// afterwards.
#[derive(Debug, Default)]
pub struct ChemicalCatalog {
    chemicals: RwLock<HashMap<String, Arc<Chemical>>>,
    closed: bool,
}

impl ChemicalCatalog {
    /// empty catalog that learns chemicals from the references it canonicalizes
    pub fn open() -> Self {
        Self {
            chemicals: RwLock::new(HashMap::new()),
            closed: false,
        }
    }

    /// catalog restricted to the given chemicals
    pub fn closed(chemicals: Vec<Chemical>) -> Result<Self, PlumbError> {
        let mut map = HashMap::new();
        for mut chemical in chemicals {
            let key = normalize_inchikey(&chemical.inchikey)?;
            chemical.inchikey = key.clone();
            if map.insert(key.clone(), Arc::new(chemical)).is_some() {
                return Err(PlumbError::DuplicateChemical(key));
            }
        }
        Ok(Self {
            chemicals: RwLock::new(map),
            closed: true,
        })
    }

    /// closed catalog built from the chemical inventory CSV
    pub fn from_inventory_csv<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let chemicals = load_inventory_from_csv(path.as_ref())?;
        info!(
            "chemical inventory '{}' provides {} chemicals",
            path.as_ref().display(),
            chemicals.len()
        );
        Ok(Self::closed(chemicals)?)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// read-only lookup, safe to call from worker threads
    pub fn lookup(&self, inchikey: &str) -> Option<Arc<Chemical>> {
        let key = inchikey.trim().to_uppercase();
        self.read().get(&key).cloned()
    }

    /// Resolves a raw reference to its canonical chemical.
    /// Equal InChIKeys always give the same `Arc`, whatever name or batch the reference carries.
    pub fn canonicalize(&self, raw: &RawChemicalRef) -> Result<Arc<Chemical>, PlumbError> {
        let key = normalize_inchikey(&raw.inchikey)?;
        if let Some(found) = self.read().get(&key) {
            self.report_conflicts(found, raw);
            return Ok(Arc::clone(found));
        }
        if self.closed {
            return Err(PlumbError::UnresolvedChemical {
                reference: raw.inchikey.clone(),
                reason: "not present in the chemical inventory".to_string(),
            });
        }
        let mut chemicals = self.chemicals.write().unwrap_or_else(|e| e.into_inner());
        // another writer may have inserted the key between the two locks
        if let Some(found) = chemicals.get(&key) {
            self.report_conflicts(found, raw);
            return Ok(Arc::clone(found));
        }
        let entry = chemicals.entry(key.clone()).or_insert_with(|| {
            if raw.name.trim().is_empty() {
                warn!("chemical {} has no name, the InChIKey is used instead", key);
            }
            let name = if raw.name.trim().is_empty() {
                key.clone()
            } else {
                raw.name.trim().to_string()
            };
            Arc::new(Chemical {
                inchikey: key.clone(),
                inchi: raw.inchi.trim().to_string(),
                name,
                category: None,
                molar_mass: raw.molar_mass,
                density: raw.density,
            })
        });
        Ok(Arc::clone(entry))
    }

    /// An open catalog keeps the constants it saw first for a key; later disagreeing
    /// records point at a data-entry error upstream.
    fn report_conflicts(&self, found: &Chemical, raw: &RawChemicalRef) {
        if self.closed {
            return;
        }
        let conflicts = conflicting_constants(found, raw);
        if !conflicts.is_empty() {
            warn!(
                "chemical {} is recorded with a different {} ({:?}/{:?} g/mol, {:?}/{:?} g/mL), the first seen values are kept",
                found.inchikey,
                conflicts.join(" and "),
                found.molar_mass,
                raw.molar_mass,
                found.density,
                raw.density
            );
        }
    }

    /// all chemicals sorted by InChIKey
    pub fn chemicals(&self) -> Vec<Arc<Chemical>> {
        let mut all: Vec<Arc<Chemical>> = self.read().values().cloned().collect();
        all.sort();
        all
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Chemical>>> {
        self.chemicals.read().unwrap_or_else(|e| e.into_inner())
    }
}
