//! # Reagent grouping
//!
//! Reagent dispenses of a batch of reactions are partitioned by *chemical system*: the set of
//! distinct chemicals a reaction uses, whatever their role or vial. Inside every partition two
//! views are produced:
//! - distinguishable: one row per dispense, keyed by (reaction id, dispense index). Two dispenses
//!   of the same water into two vials stay two rows.
//! - indistinguishable: rows with equal (chemical, role, molarity) are collapsed, `count` says
//!   how many distinguishable rows fell into each.
//!
//! Molarity equality is governed by `MolarityMatch`. Exact matching compares the bit patterns
//! of the normalized molarity, so float noise from unit conversions prevents collapsing;
//! the default rounds to 6 decimals before comparing.
use crate::Chemistry::chemical::Chemical;
use crate::Chemistry::role::Role;
use crate::Dispensing::dispense::VialId;
use crate::Dispensing::normalizer::{dispensed_volume_liters, reagent_molarity};
use crate::Reactions::reaction::Reaction;
use crate::error::{PlumbError, ReactionIssue};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

/// How two molarities are judged equal when collapsing reagents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MolarityMatch {
    /// bit-exact comparison of the normalized value
    Exact,
    /// comparison after rounding to the given number of decimals
    Decimals(u32),
}

impl Default for MolarityMatch {
    fn default() -> Self {
        MolarityMatch::Decimals(6)
    }
}

/// Hashable, totally ordered image of a molarity under a `MolarityMatch`: the bit pattern of
/// the (rounded) value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MolarityKey(u64);

// -0.0 and 0.0 are the same molarity
fn unsigned_zero(molarity: f64) -> f64 {
    if molarity == 0.0 { 0.0 } else { molarity }
}

impl MolarityMatch {
    pub fn key(&self, molarity: f64) -> MolarityKey {
        let molarity = unsigned_zero(molarity);
        match self {
            MolarityMatch::Exact => MolarityKey(molarity.to_bits()),
            MolarityMatch::Decimals(decimals) => {
                let scale = 10f64.powi((*decimals).min(i32::MAX as u32) as i32);
                let rounded = (molarity * scale).round() / scale;
                // past f64 resolution the scaling overflows, the value is then its own key
                if rounded.is_finite() {
                    MolarityKey(unsigned_zero(rounded).to_bits())
                } else {
                    MolarityKey(molarity.to_bits())
                }
            }
        }
    }
}

/// Distinct chemicals (InChIKeys) of a reaction, independent of role, vial and order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChemicalSystem(BTreeSet<String>);

impl ChemicalSystem {
    pub fn new<I, S>(inchikeys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(inchikeys.into_iter().map(Into::into).collect())
    }

    /// Builds the system key of a reaction. Fails when the reaction has no dispenses or when
    /// one InChIKey is bound to two different chemical records (e.g. resolved by two catalogs).
    pub fn from_reaction(reaction: &Reaction) -> Result<Self, PlumbError> {
        let mut seen: HashMap<&str, &Arc<Chemical>> = HashMap::new();
        for event in reaction.events() {
            let chemical = &event.chemical;
            if let Some(previous) = seen.insert(chemical.inchikey.as_str(), chemical) {
                if !Arc::ptr_eq(previous, chemical) && !previous.same_record(chemical) {
                    return Err(PlumbError::InconsistentChemicalSystem {
                        reaction_id: reaction.identifier.clone(),
                        reason: format!(
                            "{} is bound to two different chemical records",
                            chemical.inchikey
                        ),
                    });
                }
            }
        }
        if seen.is_empty() {
            return Err(PlumbError::InconsistentChemicalSystem {
                reaction_id: reaction.identifier.clone(),
                reason: "no dispensed chemicals".to_string(),
            });
        }
        Ok(Self::new(seen.keys().copied()))
    }

    pub fn inchikeys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, inchikey: &str) -> bool {
        self.0.contains(inchikey)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// InChIKeys joined with `@`, used in file names of the reagent tables
impl fmt::Display for ChemicalSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let keys: Vec<&str> = self.inchikeys().collect();
        write!(f, "{}", keys.join("@"))
    }
}

/// One dispense, keyed by its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct DistinguishableRow {
    pub reaction_id: String,
    pub dispense_index: usize,
    pub vial: VialId,
    pub chemical: Arc<Chemical>,
    pub role: Role,
    /// composition molarity of the dispensed source, mol/L
    pub molarity: f64,
    /// volume added to the vial, liters
    pub volume_added: f64,
    pub outcome: Option<u8>,
}

/// Dispenses of one composition, collapsed
#[derive(Debug, Clone, PartialEq)]
pub struct IndistinguishableRow {
    pub chemical: Arc<Chemical>,
    pub role: Role,
    /// molarity of the first collapsed row
    pub molarity: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupingOptions {
    pub molarity_match: MolarityMatch,
    /// build the per-reaction rows on the rayon pool
    pub parallel: bool,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            molarity_match: MolarityMatch::default(),
            parallel: true,
        }
    }
}

/// composition key of a distinguishable row
pub fn composition_key(
    row: &DistinguishableRow,
    options: &GroupingOptions,
) -> (String, Role, MolarityKey) {
    (
        row.chemical.inchikey.clone(),
        row.role,
        options.molarity_match.key(row.molarity),
    )
}

#[derive(Debug, Clone, Default)]
pub struct ReagentGrouping {
    pub distinguishable: BTreeMap<ChemicalSystem, Vec<DistinguishableRow>>,
    pub indistinguishable: BTreeMap<ChemicalSystem, Vec<IndistinguishableRow>>,
    /// reactions left out of both views
    pub issues: Vec<ReactionIssue>,
}

impl ReagentGrouping {
    pub fn systems(&self) -> impl Iterator<Item = &ChemicalSystem> {
        self.distinguishable.keys()
    }

    pub fn distinguishable_len(&self) -> usize {
        self.distinguishable.values().map(|rows| rows.len()).sum()
    }
}

fn reaction_rows(
    reaction: &Reaction,
) -> Result<(ChemicalSystem, Vec<DistinguishableRow>), ReactionIssue> {
    let system = ChemicalSystem::from_reaction(reaction)
        .map_err(|e| ReactionIssue::error(&reaction.identifier, e))?;
    let mut rows = Vec::new();
    for event in reaction.events() {
        let located = |e: PlumbError| {
            ReactionIssue::error(&reaction.identifier, e)
                .at_dispense(event.dispense_index)
                .with_chemical(&event.chemical.inchikey)
        };
        let molarity = reagent_molarity(event).map_err(located)?;
        let volume_added = dispensed_volume_liters(event).map_err(located)?;
        rows.push(DistinguishableRow {
            reaction_id: reaction.identifier.clone(),
            dispense_index: event.dispense_index,
            vial: event.vial,
            chemical: Arc::clone(&event.chemical),
            role: event.role,
            molarity,
            volume_added,
            outcome: reaction.outcome,
        });
    }
    rows.sort_by(|a, b| {
        (a.dispense_index, a.vial, &a.chemical).cmp(&(b.dispense_index, b.vial, &b.chemical))
    });
    Ok((system, rows))
}

/// Collapses distinguishable rows by composition, rows come out ordered by
/// (InChIKey, role, molarity).
pub fn collapse(
    rows: &[DistinguishableRow],
    options: &GroupingOptions,
) -> Vec<IndistinguishableRow> {
    let mut collapsed: BTreeMap<(String, Role, MolarityKey), IndistinguishableRow> = BTreeMap::new();
    for row in rows {
        collapsed
            .entry(composition_key(row, options))
            .and_modify(|group| group.count += 1)
            .or_insert_with(|| IndistinguishableRow {
                chemical: Arc::clone(&row.chemical),
                role: row.role,
                molarity: row.molarity,
                count: 1,
            });
    }
    collapsed.into_values().collect()
}

/// Partitions the reagent dispenses of all reactions by chemical system and builds the
/// distinguishable and indistinguishable views. A reaction that cannot be keyed or whose
/// dispenses cannot be normalized is excluded from both views and reported in `issues`.
pub fn group(reactions: &[Reaction], options: &GroupingOptions) -> ReagentGrouping {
    let per_reaction: Vec<Result<(ChemicalSystem, Vec<DistinguishableRow>), ReactionIssue>> =
        if options.parallel {
            reactions.par_iter().map(reaction_rows).collect()
        } else {
            reactions.iter().map(reaction_rows).collect()
        };

    let mut grouping = ReagentGrouping::default();
    for result in per_reaction {
        match result {
            Ok((system, rows)) => grouping
                .distinguishable
                .entry(system)
                .or_default()
                .extend(rows),
            Err(issue) => {
                warn!("excluded from reagent export: {}", issue);
                grouping.issues.push(issue);
            }
        }
    }
    for (system, rows) in &grouping.distinguishable {
        grouping
            .indistinguishable
            .insert(system.clone(), collapse(rows, options));
    }
    info!(
        "{} reagent rows in {} chemical systems, {} reactions excluded",
        grouping.distinguishable_len(),
        grouping.distinguishable.len(),
        grouping.issues.len()
    );
    grouping
}
