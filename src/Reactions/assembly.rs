use crate::Chemistry::catalog::ChemicalCatalog;
use crate::Chemistry::role::Role;
use crate::Dispensing::dispense::{Amount, DispenseEvent, RawRecord, VialId};
use crate::Dispensing::vial::Vial;
use crate::Reactions::reaction::Reaction;
use crate::error::{PlumbError, ReactionIssue};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// keep reactions without a crystal score (e.g. not yet scored)
    pub ignore_absent_outcome: bool,
}

fn invalid(reaction_id: &str, parameter: &'static str, reason: String) -> ReactionIssue {
    ReactionIssue::error(
        reaction_id,
        PlumbError::InvalidReactionParameter {
            reaction_id: reaction_id.to_string(),
            parameter,
            reason,
        },
    )
}

/// the value every row of a reaction must agree on
fn common<T: PartialEq + Clone + std::fmt::Debug>(
    reaction_id: &str,
    parameter: &'static str,
    rows: &[&RawRecord],
    get: impl Fn(&RawRecord) -> T,
) -> Result<T, ReactionIssue> {
    let first = get(rows[0]);
    for row in &rows[1..] {
        let value = get(*row);
        if value != first {
            return Err(invalid(
                reaction_id,
                parameter,
                format!("rows disagree: {:?} vs {:?}", first, value),
            ));
        }
    }
    Ok(first)
}

fn check_outcome(
    reaction_id: &str,
    outcome: Option<i64>,
    options: &AssemblyOptions,
) -> Result<Option<u8>, ReactionIssue> {
    match outcome {
        Some(score @ 1..=4) => Ok(Some(score as u8)),
        Some(score) => Err(invalid(
            reaction_id,
            "outcome",
            format!("crystal score {} is outside 1..=4", score),
        )),
        None if options.ignore_absent_outcome => Ok(None),
        None => Err(invalid(reaction_id, "outcome", "crystal score is missing".to_string())),
    }
}

fn build_reaction(
    reaction_id: &str,
    rows: &[&RawRecord],
    catalog: &ChemicalCatalog,
    options: &AssemblyOptions,
    warnings: &mut Vec<ReactionIssue>,
) -> Result<Reaction, ReactionIssue> {
    let reaction_time = common(reaction_id, "reaction time", rows, |r| r.reaction_time_s)?;
    if !reaction_time.is_finite() || reaction_time <= 1e-5 {
        return Err(invalid(
            reaction_id,
            "reaction time",
            format!("{} s", reaction_time),
        ));
    }
    let reaction_temperature =
        common(reaction_id, "reaction temperature", rows, |r| r.reaction_temperature_c)?;
    if !reaction_temperature.is_finite() || reaction_temperature <= -273.15 {
        return Err(invalid(
            reaction_id,
            "reaction temperature",
            format!("{} C", reaction_temperature),
        ));
    }
    let outcome = check_outcome(
        reaction_id,
        common(reaction_id, "outcome", rows, |r| r.outcome)?,
        options,
    )?;
    let experiment_version = common(reaction_id, "experiment version", rows, |r| {
        r.experiment_version.clone()
    })?;

    let mut volumes: BTreeMap<VialId, f64> = BTreeMap::new();
    let mut dispensed: BTreeSet<(VialId, usize, String)> = BTreeSet::new();
    let mut alpha_events = Vec::new();
    let mut beta_events = Vec::new();
    for row in rows {
        let located = |e: PlumbError| {
            ReactionIssue::error(reaction_id, e)
                .at_dispense(row.dispense_index)
                .with_chemical(&row.inchikey)
        };
        let vial = VialId::from_str(&row.vial).map_err(located)?;
        let role = Role::from_category(&row.role).map_err(located)?;
        let amount = Amount::from_unit(row.amount, &row.amount_unit).map_err(located)?;
        let chemical = catalog.canonicalize(&row.chemical_ref()).map_err(located)?;
        // a chemical appears once per dispense, a repeated row would count its moles twice
        if !dispensed.insert((vial, row.dispense_index, chemical.inchikey.clone())) {
            return Err(invalid(
                reaction_id,
                "dispense",
                format!(
                    "{} listed twice in dispense {} of the {} vial",
                    chemical.inchikey, row.dispense_index, vial
                ),
            )
            .at_dispense(row.dispense_index)
            .with_chemical(&chemical.inchikey));
        }

        let volume = row.vial_volume_ml * 1e-3;
        if let Some(known) = volumes.insert(vial, volume) {
            if (known - volume).abs() > 1e-9 * known.abs().max(volume.abs()) {
                return Err(invalid(
                    reaction_id,
                    "vial volume",
                    format!("{} vial recorded as {} L and {} L", vial, known, volume),
                ));
            }
        }
        if (role == Role::Antisolvent) != (vial == VialId::Beta) {
            warnings.push(
                ReactionIssue::warning(
                    reaction_id,
                    PlumbError::InvalidReactionParameter {
                        reaction_id: reaction_id.to_string(),
                        parameter: "vial",
                        reason: format!("{} dispensed to the {} vial", role, vial),
                    },
                )
                .at_dispense(row.dispense_index)
                .with_chemical(&chemical.inchikey),
            );
        }

        let mut event =
            DispenseEvent::new(reaction_id, vial, row.dispense_index, chemical, role, amount);
        event.source_concentration = row.concentration_molar;
        match vial {
            VialId::Alpha => alpha_events.push(event),
            VialId::Beta => beta_events.push(event),
        }
    }

    let alpha = Vial::new(
        VialId::Alpha,
        volumes.get(&VialId::Alpha).copied().unwrap_or(0.0),
    )
    .with_events(alpha_events);
    let beta = Vial::new(
        VialId::Beta,
        volumes.get(&VialId::Beta).copied().unwrap_or(0.0),
    )
    .with_events(beta_events);

    let mut reaction = Reaction::new(reaction_id, alpha, beta);
    reaction.experiment_version = experiment_version;
    reaction.outcome = outcome;
    reaction.reaction_time = reaction_time;
    reaction.reaction_temperature = reaction_temperature;
    Ok(reaction)
}

/// Builds reactions from raw dispensing rows.
///
/// Rows are grouped by reaction id (reactions come out sorted by id), chemicals are
/// canonicalized through the catalog and the reaction-level fields are validated.
/// A reaction that fails is dropped and its issue returned; the batch always continues.
/// The returned issues also carry non-fatal warnings.
pub fn assemble_reactions(
    records: &[RawRecord],
    catalog: &ChemicalCatalog,
    options: &AssemblyOptions,
) -> (Vec<Reaction>, Vec<ReactionIssue>) {
    let mut by_reaction: BTreeMap<&str, Vec<&RawRecord>> = BTreeMap::new();
    for record in records {
        by_reaction
            .entry(record.reaction_id.trim())
            .or_default()
            .push(record);
    }

    let mut reactions = Vec::new();
    let mut issues = Vec::new();
    for (reaction_id, rows) in by_reaction {
        match build_reaction(reaction_id, &rows, catalog, options, &mut issues) {
            Ok(reaction) => reactions.push(reaction),
            Err(issue) => {
                warn!("{}", issue);
                warn!("the reaction is DROPPED!");
                issues.push(issue);
            }
        }
    }
    info!(
        "assembled {} reactions from {} records",
        reactions.len(),
        records.len()
    );
    (reactions, issues)
}
