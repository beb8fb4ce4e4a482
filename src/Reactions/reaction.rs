use crate::Chemistry::chemical::Chemical;
use crate::Chemistry::role::Role;
use crate::Dispensing::dispense::{DispenseEvent, VialId};
use crate::Dispensing::vial::{MolarityMap, Vial, aggregate};
use crate::error::PlumbError;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

/// A vapor-diffusion reaction: the alpha vial holds the reactive mixture, the beta vial
/// the antisolvent that diffuses into it.
/// Fingerprint and molarities are always derived from the dispenses, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    pub identifier: String,
    pub experiment_version: Option<String>,
    pub alpha: Vial,
    pub beta: Vial,
    /// crystal score 1..=4
    pub outcome: Option<u8>,
    /// seconds
    pub reaction_time: f64,
    /// degrees Celsius
    pub reaction_temperature: f64,
}

impl Reaction {
    pub fn new(identifier: &str, alpha: Vial, beta: Vial) -> Self {
        Self {
            identifier: identifier.to_string(),
            experiment_version: None,
            alpha,
            beta,
            outcome: None,
            reaction_time: 0.0,
            reaction_temperature: 0.0,
        }
    }

    pub fn vial(&self, id: VialId) -> &Vial {
        match id {
            VialId::Alpha => &self.alpha,
            VialId::Beta => &self.beta,
        }
    }

    /// every dispense of the reaction, alpha vial first
    pub fn events(&self) -> impl Iterator<Item = &DispenseEvent> {
        self.alpha.events.iter().chain(self.beta.events.iter())
    }

    /// distinct canonical chemicals of the reaction, whatever their role or vial
    pub fn chemicals(&self) -> BTreeSet<Arc<Chemical>> {
        self.events().map(|e| Arc::clone(&e.chemical)).collect()
    }

    /// role -> distinct chemicals of that role in InChIKey order (indexed columns of the export)
    pub fn chemicals_by_role(&self) -> BTreeMap<Role, Vec<Arc<Chemical>>> {
        let mut sets: BTreeMap<Role, BTreeSet<Arc<Chemical>>> = BTreeMap::new();
        for event in self.events() {
            sets.entry(event.role)
                .or_default()
                .insert(Arc::clone(&event.chemical));
        }
        sets.into_iter()
            .map(|(role, set)| (role, set.into_iter().collect()))
            .collect()
    }

    pub fn alpha_molarities(&self) -> Result<MolarityMap, PlumbError> {
        aggregate(&self.alpha)
    }

    /// An empty beta vial has no molarities, otherwise the vial volume must be valid
    pub fn beta_molarities(&self) -> Result<MolarityMap, PlumbError> {
        if self.beta.is_empty() {
            return Ok(MolarityMap::new());
        }
        aggregate(&self.beta)
    }

    /// Molarity of every chemical in the vial it was dispensed to.
    /// A chemical present in both vials reports its alpha-vial molarity.
    pub fn molarities(&self) -> Result<MolarityMap, PlumbError> {
        let mut all = self.beta_molarities()?;
        all.extend(self.alpha_molarities()?);
        Ok(all)
    }

    /// The single antisolvent chemical, `None` when no antisolvent was dispensed
    pub fn antisolvent(&self) -> Result<Option<Arc<Chemical>>, PlumbError> {
        let antisolvents: BTreeSet<Arc<Chemical>> = self
            .events()
            .filter(|e| e.role == Role::Antisolvent)
            .map(|e| Arc::clone(&e.chemical))
            .collect();
        if antisolvents.len() > 1 {
            let keys: Vec<&str> = antisolvents.iter().map(|c| c.inchikey.as_str()).collect();
            return Err(PlumbError::InvalidReactionParameter {
                reaction_id: self.identifier.clone(),
                parameter: "antisolvent",
                reason: format!("more than one antisolvent: {}", keys.join(", ")),
            });
        }
        Ok(antisolvents.into_iter().next())
    }

    /// Dispenses grouped into reagents: one entry per (vial, dispense index)
    pub fn reagents(&self) -> BTreeMap<(VialId, usize), Vec<&DispenseEvent>> {
        let mut reagents: BTreeMap<(VialId, usize), Vec<&DispenseEvent>> = BTreeMap::new();
        for event in self.events() {
            reagents
                .entry((event.vial, event.dispense_index))
                .or_default()
                .push(event);
        }
        reagents
    }

    /// Date prefix of the identifier, `YYYY-MM-DDTHH_MM` if present, else `YYYY-MM-DD`.
    /// Reactions started together share it.
    pub fn experiment_header(&self) -> Option<String> {
        static MINUTE: OnceLock<Regex> = OnceLock::new();
        static DAY: OnceLock<Regex> = OnceLock::new();
        let minute = MINUTE.get_or_init(|| {
            Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}_\d{2}").expect("valid date pattern")
        });
        let day = DAY.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date pattern"));
        minute
            .find(&self.identifier)
            .or_else(|| day.find(&self.identifier))
            .map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dispensing::dispense::Amount;

    fn chem(key: &str, name: &str) -> Arc<Chemical> {
        Arc::new(Chemical::new(key, name).with_constants(100.0, 1.0))
    }

    fn reaction_with_two_antisolvents() -> Reaction {
        let dcm = chem("YMWUJEATGCHHMB-UHFFFAOYSA-N", "dichloromethane");
        let chloroform = chem("HEDRZPFGACZZDS-UHFFFAOYSA-N", "chloroform");
        let beta = Vial::new(VialId::Beta, 1e-3).with_events(vec![
            DispenseEvent::new("R", VialId::Beta, 0, dcm, Role::Antisolvent, Amount::Milliliter(0.5)),
            DispenseEvent::new("R", VialId::Beta, 1, chloroform, Role::Antisolvent, Amount::Milliliter(0.5)),
        ]);
        Reaction::new("R", Vial::new(VialId::Alpha, 1e-3), beta)
    }

    #[test]
    fn test_experiment_header() {
        let mut r = Reaction::new(
            "2019-03-14T16_42_19.123_LBL_HC_3",
            Vial::new(VialId::Alpha, 1e-3),
            Vial::new(VialId::Beta, 1e-3),
        );
        assert_eq!(r.experiment_header().as_deref(), Some("2019-03-14T16_42"));
        r.identifier = "2018-11-02_HC_7".to_string();
        assert_eq!(r.experiment_header().as_deref(), Some("2018-11-02"));
        r.identifier = "no-date".to_string();
        assert_eq!(r.experiment_header(), None);
    }

    #[test]
    fn test_antisolvent_must_be_unique() {
        let r = reaction_with_two_antisolvents();
        assert!(matches!(
            r.antisolvent(),
            Err(PlumbError::InvalidReactionParameter { parameter: "antisolvent", .. })
        ));
    }

    #[test]
    fn test_reagents_group_by_dispense_index() {
        let r = reaction_with_two_antisolvents();
        let reagents = r.reagents();
        assert_eq!(reagents.len(), 2);
        assert!(reagents.contains_key(&(VialId::Beta, 1)));
    }
}
