use crate::Chemistry::chemical::{Chemical, RawChemicalRef};
use crate::Chemistry::role::Role;
use crate::error::PlumbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Vial of a vapor-diffusion reaction: alpha holds the reactive mixture, beta the antisolvent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VialId {
    Alpha,
    Beta,
}

impl VialId {
    pub fn as_str(&self) -> &'static str {
        match self {
            VialId::Alpha => "alpha",
            VialId::Beta => "beta",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, PlumbError> {
        match s.trim().to_lowercase().as_str() {
            "alpha" | "a" => Ok(VialId::Alpha),
            "beta" | "b" => Ok(VialId::Beta),
            other => Err(PlumbError::UnknownVial(other.to_string())),
        }
    }
}

impl fmt::Display for VialId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dispensed amount with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Amount {
    Milliliter(f64),
    Microliter(f64),
    Gram(f64),
}

impl Amount {
    /// Builds an amount from a value and the unit tag used by the lab database
    pub fn from_unit(value: f64, unit: &str) -> Result<Self, PlumbError> {
        match unit.trim().to_lowercase().as_str() {
            "milliliter" | "ml" => Ok(Amount::Milliliter(value)),
            "microliter" | "ul" => Ok(Amount::Microliter(value)),
            "gram" | "g" => Ok(Amount::Gram(value)),
            other => Err(PlumbError::UnknownUnit(other.to_string())),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Amount::Milliliter(v) | Amount::Microliter(v) | Amount::Gram(v) => *v,
        }
    }

    /// volume in liters, `None` for a mass
    pub fn liters(&self) -> Option<f64> {
        match self {
            Amount::Milliliter(v) => Some(v * 1e-3),
            Amount::Microliter(v) => Some(v * 1e-6),
            Amount::Gram(_) => None,
        }
    }

    pub fn is_mass(&self) -> bool {
        matches!(self, Amount::Gram(_))
    }
}

/// One physical act of adding a chemical to a vial.
/// Events that share a dispense index inside a reaction are the components of one reagent.
#[derive(Debug, Clone, PartialEq)]
pub struct DispenseEvent {
    pub reaction_id: String,
    pub vial: VialId,
    pub dispense_index: usize,
    pub chemical: Arc<Chemical>,
    pub role: Role,
    pub amount: Amount,
    /// mol/L of the chemical in the dispensed solution, `None` when dispensed neat
    pub source_concentration: Option<f64>,
}

impl DispenseEvent {
    pub fn new(
        reaction_id: &str,
        vial: VialId,
        dispense_index: usize,
        chemical: Arc<Chemical>,
        role: Role,
        amount: Amount,
    ) -> Self {
        Self {
            reaction_id: reaction_id.to_string(),
            vial,
            dispense_index,
            chemical,
            role,
            amount,
            source_concentration: None,
        }
    }

    pub fn with_concentration(mut self, concentration: f64) -> Self {
        self.source_concentration = Some(concentration);
        self
    }

    pub fn is_neat(&self) -> bool {
        self.source_concentration.is_none()
    }
}

/// One row of the raw dispensing export of the lab database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub reaction_id: String,
    pub vial: String,
    pub dispense_index: usize,
    pub role: String,
    pub inchikey: String,
    #[serde(default)]
    pub inchi: String,
    pub chemical_name: String,
    pub amount: f64,
    pub amount_unit: String,
    pub vial_volume_ml: f64,
    #[serde(default)]
    pub concentration_molar: Option<f64>,
    #[serde(default)]
    pub molar_mass: Option<f64>,
    #[serde(default)]
    pub density: Option<f64>,
    #[serde(default)]
    pub outcome: Option<i64>,
    pub reaction_time_s: f64,
    pub reaction_temperature_c: f64,
    #[serde(default)]
    pub experiment_version: Option<String>,
}

impl RawRecord {
    pub fn chemical_ref(&self) -> RawChemicalRef {
        RawChemicalRef {
            inchikey: self.inchikey.clone(),
            inchi: self.inchi.clone(),
            name: self.chemical_name.clone(),
            molar_mass: self.molar_mass,
            density: self.density,
        }
    }
}
