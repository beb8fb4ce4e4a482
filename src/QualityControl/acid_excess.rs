use crate::Chemistry::role::Role;
use crate::Reactions::summary::ReactionSummary;
use serde::Serialize;

/// A reaction with more acid in the alpha vial than the threshold allows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcidExcess {
    pub reaction_id: String,
    pub inchikey: String,
    pub name: String,
    /// mol/L in the alpha vial
    pub molarity: f64,
}

/// Acid dispenses above `threshold` mol/L (10 M in the usual workflow).
/// Such reactions are usually a mislabeled reagent, e.g. antisolvent entered as acid.
pub fn acid_excess(summaries: &[ReactionSummary], threshold: f64) -> Vec<AcidExcess> {
    let mut found = Vec::new();
    for summary in summaries {
        for (chemical, molarity) in summary.role_molarities(Role::Acid) {
            if molarity > threshold {
                found.push(AcidExcess {
                    reaction_id: summary.identifier.clone(),
                    inchikey: chemical.inchikey.clone(),
                    name: chemical.name.clone(),
                    molarity,
                });
            }
        }
    }
    found
}
