use crate::Chemistry::chemical::Chemical;
use crate::Chemistry::role::Role;
use crate::Dispensing::normalizer::moles;
use crate::Dispensing::vial::{MolarityMap, ceiling_violations};
use crate::Reactions::fingerprint::{Fingerprint, fingerprint};
use crate::Reactions::reaction::Reaction;
use crate::error::{PlumbError, ReactionIssue};
use log::warn;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything derived from one reaction: fingerprint, molarities, antisolvent identity,
/// and the issues met on the way. A summary with an error issue is skipped by the exports.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionSummary {
    pub identifier: String,
    pub experiment_version: Option<String>,
    pub outcome: Option<u8>,
    pub reaction_time: f64,
    pub reaction_temperature: f64,
    /// liters
    pub alpha_volume: f64,
    /// liters
    pub beta_volume: f64,
    pub fingerprint: Fingerprint,
    pub chemicals_by_role: BTreeMap<Role, Vec<Arc<Chemical>>>,
    /// every chemical in the vial it was dispensed to
    pub molarities: MolarityMap,
    pub alpha_molarities: MolarityMap,
    pub antisolvent: Option<Arc<Chemical>>,
    pub issues: Vec<ReactionIssue>,
}

impl ReactionSummary {
    pub fn is_skipped(&self) -> bool {
        self.issues.iter().any(|i| i.is_skip_reason())
    }

    /// all skip reasons joined, `None` for an exportable reaction
    pub fn skip_reason(&self) -> Option<String> {
        let reasons: Vec<String> = self
            .issues
            .iter()
            .filter(|i| i.is_skip_reason())
            .map(|i| i.error.to_string())
            .collect();
        (!reasons.is_empty()).then(|| reasons.join("; "))
    }

    /// InChIKey -> alpha-vial molarity: the point external feasibility checks test
    /// against the stock-solution hull
    pub fn molarity_vector(&self) -> BTreeMap<String, f64> {
        self.alpha_molarities
            .iter()
            .map(|(chemical, molarity)| (chemical.inchikey.clone(), *molarity))
            .collect()
    }

    /// molarity of every chemical of a role, in the role's index order
    pub fn role_molarities(&self, role: Role) -> Vec<(Arc<Chemical>, f64)> {
        self.chemicals_by_role
            .get(&role)
            .map(|chemicals| {
                chemicals
                    .iter()
                    .map(|c| (Arc::clone(c), self.molarities.get(c).copied().unwrap_or(0.0)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `expver-<version>_<fingerprint>`, the key reactions of one experimental design share
    pub fn group_key(&self) -> String {
        format!(
            "expver-{}_{}",
            self.experiment_version.as_deref().unwrap_or("unknown"),
            self.fingerprint
        )
    }
}

/// Attaches the dispense a molarity error came from. Vial-level errors (zero volume) stay
/// unlocated.
fn locate_molarity_error(reaction: &Reaction, error: PlumbError) -> ReactionIssue {
    let failing = reaction
        .events()
        .find(|event| moles(event).err().as_ref() == Some(&error));
    let issue = ReactionIssue::error(&reaction.identifier, error);
    match failing {
        Some(event) => issue
            .at_dispense(event.dispense_index)
            .with_chemical(&event.chemical.inchikey),
        None => issue,
    }
}

/// Derives the summary of one reaction. Nothing here aborts: failures become issues.
pub fn summarize(reaction: &Reaction, check_ceiling: bool) -> ReactionSummary {
    let mut issues = Vec::new();
    let id = reaction.identifier.as_str();

    let (alpha_molarities, molarities) = match (reaction.alpha_molarities(), reaction.molarities()) {
        (Ok(alpha), Ok(all)) => (alpha, all),
        (Err(e), _) | (_, Err(e)) => {
            issues.push(locate_molarity_error(reaction, e));
            (MolarityMap::new(), MolarityMap::new())
        }
    };
    if check_ceiling {
        for violation in ceiling_violations(&molarities) {
            let issue = ReactionIssue::warning(id, violation.to_error())
                .with_chemical(&violation.chemical.inchikey);
            warn!("{}", issue);
            issues.push(issue);
        }
    }
    let antisolvent = match reaction.antisolvent() {
        Ok(found) => found,
        Err(e) => {
            issues.push(ReactionIssue::error(id, e));
            None
        }
    };
    if reaction.alpha.is_empty() {
        issues.push(ReactionIssue::error(
            id,
            PlumbError::InvalidReactionParameter {
                reaction_id: id.to_string(),
                parameter: "alpha vial",
                reason: "nothing was dispensed".to_string(),
            },
        ));
    }

    ReactionSummary {
        identifier: reaction.identifier.clone(),
        experiment_version: reaction.experiment_version.clone(),
        outcome: reaction.outcome,
        reaction_time: reaction.reaction_time,
        reaction_temperature: reaction.reaction_temperature,
        alpha_volume: reaction.alpha.total_volume,
        beta_volume: reaction.beta.total_volume,
        fingerprint: fingerprint(reaction),
        chemicals_by_role: reaction.chemicals_by_role(),
        molarities,
        alpha_molarities,
        antisolvent,
        issues,
    }
}

/// Summaries of all reactions, in input order. Reactions are independent, so with `parallel`
/// they are processed on the rayon pool.
pub fn summarize_all(
    reactions: &[Reaction],
    check_ceiling: bool,
    parallel: bool,
) -> Vec<ReactionSummary> {
    if parallel {
        reactions
            .par_iter()
            .map(|r| summarize(r, check_ceiling))
            .collect()
    } else {
        reactions.iter().map(|r| summarize(r, check_ceiling)).collect()
    }
}

/// reaction identifiers by `expver-<version>_<fingerprint>`, skipped reactions left out
pub fn group_by_fingerprint(summaries: &[ReactionSummary]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for summary in summaries.iter().filter(|s| !s.is_skipped()) {
        groups
            .entry(summary.group_key())
            .or_default()
            .push(summary.identifier.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dispensing::dispense::{Amount, DispenseEvent, VialId};
    use crate::Dispensing::vial::Vial;
    use crate::error::Severity;
    use approx::assert_relative_eq;

    fn chem(key: &str, mw: f64, density: f64) -> Arc<Chemical> {
        Arc::new(Chemical::new(key, key).with_constants(mw, density))
    }

    fn scenario() -> Reaction {
        let a = chem("AAAAAAAAAAAAAA-AAAAAAAAAA-N", 150.0, 2.0);
        let b = chem("BBBBBBBBBBBBBB-BBBBBBBBBB-N", 460.0, 6.0);
        let dcm = chem("YMWUJEATGCHHMB-UHFFFAOYSA-N", 84.93, 1.33);
        let alpha = Vial::new(VialId::Alpha, 1e-3).with_events(vec![
            DispenseEvent::new("S", VialId::Alpha, 0, a, Role::Organic, Amount::Milliliter(0.5))
                .with_concentration(4.0),
            DispenseEvent::new("S", VialId::Alpha, 1, b, Role::Inorganic, Amount::Milliliter(0.5))
                .with_concentration(2.0),
        ]);
        let beta = Vial::new(VialId::Beta, 2.5e-3).with_events(vec![DispenseEvent::new(
            "S",
            VialId::Beta,
            2,
            dcm,
            Role::Antisolvent,
            Amount::Milliliter(2.0),
        )]);
        let mut r = Reaction::new("2020-01-01_S", alpha, beta);
        r.experiment_version = Some("3.0".to_string());
        r
    }

    #[test]
    fn test_summary_of_reference_scenario() {
        let s = summarize(&scenario(), true);
        assert!(!s.is_skipped());
        assert_eq!(s.fingerprint, Fingerprint::from_counts(1, 1, 0, 0));
        let v = s.molarity_vector();
        assert_relative_eq!(v["AAAAAAAAAAAAAA-AAAAAAAAAA-N"], 2.0, epsilon = 1e-12);
        assert_relative_eq!(v["BBBBBBBBBBBBBB-BBBBBBBBBB-N"], 1.0, epsilon = 1e-12);
        assert_eq!(v.len(), 2);
        assert_eq!(
            s.antisolvent.as_ref().map(|c| c.inchikey.as_str()),
            Some("YMWUJEATGCHHMB-UHFFFAOYSA-N")
        );
        // 2 mL of neat DCM in a 2.5 mL beta vial
        let dcm = s.role_molarities(Role::Antisolvent);
        assert_relative_eq!(dcm[0].1, 0.8 * 1e3 * 1.33 / 84.93, epsilon = 1e-9);
        assert!(s.issues.is_empty());
        assert_eq!(s.group_key(), "expver-3.0_1%1%0%0");
    }

    #[test]
    fn test_zero_volume_becomes_skip_reason() {
        let mut r = scenario();
        r.alpha.total_volume = 0.0;
        let s = summarize(&r, true);
        assert!(s.is_skipped());
        assert!(s.skip_reason().unwrap().contains("non-positive volume"));
        assert!(s.molarities.is_empty());
        assert_eq!(s.issues[0].dispense_index, None);
        assert!(group_by_fingerprint(&[s]).is_empty());
    }

    #[test]
    fn test_molarity_error_names_its_dispense() {
        let mut r = scenario();
        let no_density = Arc::new(Chemical::new("QHJPGANWSLEMTI-UHFFFAOYSA-N", "fai"));
        r.alpha.events.push(DispenseEvent::new(
            "S",
            VialId::Alpha,
            7,
            no_density,
            Role::Organic,
            Amount::Microliter(10.0),
        ));
        let s = summarize(&r, true);
        assert!(s.is_skipped());
        let issue = &s.issues[0];
        assert!(matches!(issue.error, PlumbError::MissingPhysicalConstant { .. }));
        assert_eq!(issue.dispense_index, Some(7));
        assert_eq!(issue.chemical.as_deref(), Some("QHJPGANWSLEMTI-UHFFFAOYSA-N"));
    }

    #[test]
    fn test_ceiling_violation_is_only_a_warning() {
        let mut r = scenario();
        r.beta.total_volume = 1e-3;
        let s = summarize(&r, true);
        assert!(!s.is_skipped());
        assert_eq!(s.issues.len(), 1);
        assert_eq!(s.issues[0].severity, Severity::Warning);
        let unchecked = summarize(&r, false);
        assert!(unchecked.issues.is_empty());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let reactions: Vec<Reaction> = (0..8)
            .map(|i| {
                let mut r = scenario();
                r.identifier = format!("R{}", i);
                r.alpha.total_volume = 1e-3 * (i + 1) as f64;
                r
            })
            .collect();
        assert_eq!(
            summarize_all(&reactions, true, true),
            summarize_all(&reactions, true, false)
        );
        let groups = group_by_fingerprint(&summarize_all(&reactions, true, true));
        assert_eq!(groups["expver-3.0_1%1%0%0"].len(), 8);
    }
}
