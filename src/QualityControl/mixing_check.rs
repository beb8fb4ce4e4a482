use crate::Chemistry::chemical::Chemical;
use crate::Dispensing::dispense::VialId;
use crate::Dispensing::normalizer::{dispensed_volume_liters, reagent_molarity};
use crate::Dispensing::vial::{Vial, aggregate};
use crate::error::PlumbError;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct MixingMismatch {
    pub chemical: Arc<Chemical>,
    /// V·S/ΣV
    pub mixed: f64,
    /// moles over the recorded vial volume
    pub recorded: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MixingReport {
    pub vial: VialId,
    /// ΣV, liters
    pub dispensed_volume: f64,
    /// liters
    pub recorded_volume: f64,
    pub mismatches: Vec<MixingMismatch>,
}

impl MixingReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Re-derives the vial molarities by mixing its reagents and compares them with `aggregate`.
///
/// Reagents are the dispenses sharing a dispense index; they share the dispensed volume.
/// With S the reagents x chemicals matrix of composition molarities and V the dispensed
/// volumes, the mixed molarities are V·S/ΣV. A mismatch beyond `rel_tol` means the recorded
/// vial volume is not the sum of what was dispensed into it.
pub fn mixing_check(vial: &Vial, rel_tol: f64) -> Result<MixingReport, PlumbError> {
    let recorded = aggregate(vial)?;

    let mut reagents: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, event) in vial.events.iter().enumerate() {
        reagents.entry(event.dispense_index).or_default().push(i);
    }
    let chemicals: Vec<Arc<Chemical>> = recorded.keys().cloned().collect();
    let column: BTreeMap<&str, usize> = chemicals
        .iter()
        .enumerate()
        .map(|(j, c)| (c.inchikey.as_str(), j))
        .collect();

    let mut s = DMatrix::<f64>::zeros(reagents.len(), chemicals.len());
    let mut v = DVector::<f64>::zeros(reagents.len());
    for (row, members) in reagents.values().enumerate() {
        v[row] = dispensed_volume_liters(&vial.events[members[0]])?;
        for &i in members {
            let event = &vial.events[i];
            s[(row, column[event.chemical.inchikey.as_str()])] += reagent_molarity(event)?;
        }
    }

    let dispensed_volume = v.sum();
    let mut mismatches = Vec::new();
    if dispensed_volume > 0.0 {
        let mixed = s.transpose() * &v / dispensed_volume;
        for (j, chemical) in chemicals.iter().enumerate() {
            let recorded_molarity = recorded[chemical];
            let scale = mixed[j].abs().max(recorded_molarity.abs());
            if (mixed[j] - recorded_molarity).abs() > rel_tol * scale {
                mismatches.push(MixingMismatch {
                    chemical: Arc::clone(chemical),
                    mixed: mixed[j],
                    recorded: recorded_molarity,
                });
            }
        }
    }
    Ok(MixingReport {
        vial: vial.id,
        dispensed_volume,
        recorded_volume: vial.total_volume,
        mismatches,
    })
}
