use crate::error::PlumbError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a chemical in a vapor-diffusion reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Organic,
    Inorganic,
    Solvent,
    Acid,
    Antisolvent,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Organic,
        Role::Inorganic,
        Role::Solvent,
        Role::Acid,
        Role::Antisolvent,
    ];
    /// roles counted in a reaction fingerprint, in fingerprint order
    pub const FINGERPRINT_ROLES: [Role; 4] =
        [Role::Organic, Role::Inorganic, Role::Solvent, Role::Acid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Organic => "organic",
            Role::Inorganic => "inorganic",
            Role::Solvent => "solvent",
            Role::Acid => "acid",
            Role::Antisolvent => "antisolvent",
        }
    }

    /// position in the fingerprint, `None` for the antisolvent
    pub fn fingerprint_slot(&self) -> Option<usize> {
        match self {
            Role::Organic => Some(0),
            Role::Inorganic => Some(1),
            Role::Solvent => Some(2),
            Role::Acid => Some(3),
            Role::Antisolvent => None,
        }
    }

    /// Parses a role tag.
    /// Inventory categories may list several roles separated by commas: if "acid" is among them
    /// the chemical is an acid, any other combination is ambiguous.
    pub fn from_category(category: &str) -> Result<Self, PlumbError> {
        let category = category.trim().to_lowercase();
        if category.contains(',') {
            let parts: Vec<&str> = category.split(',').map(|s| s.trim()).collect();
            if parts.contains(&"acid") {
                return Ok(Role::Acid);
            }
            return Err(PlumbError::UnknownRole(format!(
                "more than one category: {}",
                category
            )));
        }
        match category.as_str() {
            "organic" => Ok(Role::Organic),
            "inorganic" => Ok(Role::Inorganic),
            "solvent" => Ok(Role::Solvent),
            "acid" => Ok(Role::Acid),
            "antisolvent" => Ok(Role::Antisolvent),
            _ => Err(PlumbError::UnknownRole(category)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
