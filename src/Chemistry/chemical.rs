use crate::Chemistry::role::Role;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Canonical chemical: identity is the InChIKey, everything else is descriptive.
/// Instances are created by the `ChemicalCatalog` and shared as `Arc<Chemical>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chemical {
    pub inchikey: String,
    pub inchi: String,
    pub name: String,
    /// role the inventory assigns to the chemical, a dispense may still use it in another role
    pub category: Option<Role>,
    /// g/mol
    pub molar_mass: Option<f64>,
    /// g/mL
    pub density: Option<f64>,
}

impl Chemical {
    pub fn new(inchikey: &str, name: &str) -> Self {
        Self {
            inchikey: inchikey.to_string(),
            inchi: String::new(),
            name: name.to_string(),
            category: None,
            molar_mass: None,
            density: None,
        }
    }

    pub fn with_inchi(mut self, inchi: &str) -> Self {
        self.inchi = inchi.to_string();
        self
    }

    pub fn with_category(mut self, category: Role) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_constants(mut self, molar_mass: f64, density: f64) -> Self {
        self.molar_mass = Some(molar_mass);
        self.density = Some(density);
        self
    }

    /// molarity of the neat chemical, mol/L: 1000 * density / molar mass
    pub fn pure_molarity(&self) -> Option<f64> {
        match (self.density, self.molar_mass) {
            (Some(density), Some(molar_mass)) if molar_mass > 0.0 => {
                Some(1e3 * density / molar_mass)
            }
            _ => None,
        }
    }

    /// full comparison of all fields, used to detect two different records claiming one InChIKey
    pub fn same_record(&self, other: &Chemical) -> bool {
        self.inchikey == other.inchikey
            && self.inchi == other.inchi
            && self.name == other.name
            && self.molar_mass == other.molar_mass
            && self.density == other.density
    }
}

impl PartialEq for Chemical {
    fn eq(&self, other: &Self) -> bool {
        self.inchikey == other.inchikey
    }
}

impl Eq for Chemical {}

impl Hash for Chemical {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inchikey.hash(state);
    }
}

impl PartialOrd for Chemical {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Chemical {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inchikey.cmp(&other.inchikey)
    }
}

impl fmt::Display for Chemical {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.inchikey)
    }
}

/// Chemical reference as it comes with a raw dispensing record, before canonicalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawChemicalRef {
    pub inchikey: String,
    pub inchi: String,
    pub name: String,
    pub molar_mass: Option<f64>,
    pub density: Option<f64>,
}

impl RawChemicalRef {
    pub fn new(inchikey: &str, name: &str) -> Self {
        Self {
            inchikey: inchikey.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_equality_is_by_inchikey_only() {
        let a = Chemical::new("XLYOFNOQVPJJNP-UHFFFAOYSA-N", "water");
        let b = Chemical::new("XLYOFNOQVPJJNP-UHFFFAOYSA-N", "Water, HPLC grade").with_constants(18.015, 1.0);
        assert_eq!(a, b);
        assert!(!a.same_record(&b));
        let set: HashSet<Chemical> = vec![a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_pure_molarity() {
        let water = Chemical::new("XLYOFNOQVPJJNP-UHFFFAOYSA-N", "water").with_constants(18.015, 1.0);
        assert_relative_eq!(water.pure_molarity().unwrap(), 55.509, epsilon = 1e-3);
        let no_density = Chemical::new("XLYOFNOQVPJJNP-UHFFFAOYSA-N", "water");
        assert!(no_density.pure_molarity().is_none());
    }
}
