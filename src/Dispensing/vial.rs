use crate::Chemistry::chemical::Chemical;
use crate::Dispensing::dispense::{DispenseEvent, VialId};
use crate::Dispensing::normalizer::moles;
use crate::error::PlumbError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// relative slack above the ceiling, a vial filled with one neat chemical sits right on it
const CEILING_TOLERANCE: f64 = 1e-9;

/// chemical -> mol/L, ordered by InChIKey
pub type MolarityMap = BTreeMap<Arc<Chemical>, f64>;

/// A vial with the volume recorded at reaction start and the dispenses it received
#[derive(Debug, Clone, PartialEq)]
pub struct Vial {
    pub id: VialId,
    /// liters
    pub total_volume: f64,
    pub events: Vec<DispenseEvent>,
}

impl Vial {
    pub fn new(id: VialId, total_volume: f64) -> Self {
        Self {
            id,
            total_volume,
            events: Vec::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<DispenseEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn push(&mut self, event: DispenseEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn checked_volume(&self) -> Result<f64, PlumbError> {
        if !self.total_volume.is_finite() || self.total_volume <= 0.0 {
            return Err(PlumbError::ZeroVolume {
                vial: self.id.as_str().to_string(),
                volume: self.total_volume,
            });
        }
        Ok(self.total_volume)
    }
}

/// Total moles of every chemical in the vial, summed over its dispenses
pub fn moles_by_chemical(vial: &Vial) -> Result<MolarityMap, PlumbError> {
    let mut totals: MolarityMap = BTreeMap::new();
    for event in &vial.events {
        let n = moles(event)?;
        *totals.entry(Arc::clone(&event.chemical)).or_insert(0.0) += n;
    }
    Ok(totals)
}

/// Molarity of every chemical in the vial: moles summed per chemical over the vial volume.
/// The result does not depend on dispense order.
pub fn aggregate(vial: &Vial) -> Result<MolarityMap, PlumbError> {
    let volume = vial.checked_volume()?;
    let mut molarities = moles_by_chemical(vial)?;
    for value in molarities.values_mut() {
        *value /= volume;
    }
    Ok(molarities)
}

/// A molarity above what the neat chemical itself would have
#[derive(Debug, Clone, PartialEq)]
pub struct MolarityCeilingViolation {
    pub chemical: Arc<Chemical>,
    pub molarity: f64,
    pub ceiling: f64,
}

impl MolarityCeilingViolation {
    pub fn to_error(&self) -> PlumbError {
        PlumbError::MolarityCeilingViolation {
            inchikey: self.chemical.inchikey.clone(),
            molarity: self.molarity,
            ceiling: self.ceiling,
        }
    }
}

/// Molarities exceeding the pure-form ceiling. They are reported, never clamped:
/// such a value points at a data-entry error upstream.
/// Chemicals without density or molar mass have no known ceiling and are not checked.
pub fn ceiling_violations(molarities: &MolarityMap) -> Vec<MolarityCeilingViolation> {
    molarities
        .iter()
        .filter_map(|(chemical, &molarity)| {
            let ceiling = chemical.pure_molarity()?;
            (molarity > ceiling * (1.0 + CEILING_TOLERANCE)).then(|| MolarityCeilingViolation {
                chemical: Arc::clone(chemical),
                molarity,
                ceiling,
            })
        })
        .collect()
}

/// Molarity ceiling of every chemical in the map, `None` where it is unknown
pub fn molarity_ceilings(molarities: &MolarityMap) -> BTreeMap<Arc<Chemical>, Option<f64>> {
    molarities
        .keys()
        .map(|chemical| (Arc::clone(chemical), chemical.pure_molarity()))
        .collect()
}
