//! # Pipeline
//!
//! One run over a batch of raw dispensing records:
//! 1. reactions are assembled and their chemicals canonicalized through the catalog;
//! 2. every reaction is summarized (molarities, fingerprint, antisolvent identity);
//! 3. the reaction tables are built: every exportable reaction, and the reactions with
//!    exactly `filter_count` chemicals of `filter_role`;
//! 4. reagent dispenses are grouped by chemical system;
//! 5. quality checks run (acid excess, vial mixing).
//!
//! Problems with a single reaction never stop the run, they end up in `PipelineOutput::issues`.
//! Only an empty batch, an empty closed catalog and I/O failures are fatal.
use crate::Chemistry::catalog::ChemicalCatalog;
use crate::Dispensing::dispense::RawRecord;
use crate::Export::csv_writer::write_reagent_tables;
use crate::Export::reaction_table::{molarity_vector_table, reaction_table};
use crate::Export::record::ExportRecord;
use crate::Export::report::{fingerprint_table, issue_table};
use crate::Export::table::ExportTable;
use crate::QualityControl::acid_excess::{AcidExcess, acid_excess};
use crate::QualityControl::mixing_check::{MixingReport, mixing_check};
use crate::Reactions::assembly::assemble_reactions;
use crate::Reactions::fingerprint::matches;
use crate::Reactions::reaction::Reaction;
use crate::Reactions::reagent_groups::{ReagentGrouping, group};
use crate::Reactions::summary::{ReactionSummary, group_by_fingerprint, summarize_all};
use crate::error::{PipelineError, ReactionIssue};
use crate::settings::PlumbConfig;
use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct PipelineOutput {
    pub reactions: Vec<Reaction>,
    /// one per assembled reaction, same order
    pub summaries: Vec<ReactionSummary>,
    /// every exportable reaction
    pub reaction_table: ExportTable,
    /// reactions with exactly `filter_count` chemicals of `filter_role`
    pub filtered_table: ExportTable,
    pub molarity_vectors: ExportTable,
    pub grouping: ReagentGrouping,
    /// `expver-<version>_<fingerprint>` -> reaction identifiers
    pub fingerprint_groups: BTreeMap<String, Vec<String>>,
    pub acid_excess: Vec<AcidExcess>,
    /// vials whose recorded volume disagrees with the dispensed volumes
    pub mixing_mismatches: Vec<(String, MixingReport)>,
    /// every issue of the run, ordered by reaction
    pub issues: Vec<ReactionIssue>,
}

impl PipelineOutput {
    pub fn skipped(&self) -> usize {
        self.summaries.iter().filter(|s| s.is_skipped()).count()
    }
}

fn check_mixing(
    summaries: &[ReactionSummary],
    reactions: &[Reaction],
    rel_tol: f64,
) -> Vec<(String, MixingReport)> {
    let mut mismatches = Vec::new();
    for (reaction, _) in reactions
        .iter()
        .zip(summaries)
        .filter(|(_, s)| !s.is_skipped())
    {
        for vial in [&reaction.alpha, &reaction.beta] {
            if vial.is_empty() {
                continue;
            }
            match mixing_check(vial, rel_tol) {
                Ok(report) if report.is_consistent() => {}
                Ok(report) => {
                    warn!(
                        "reaction {}: {} vial recorded as {} L, {} L were dispensed",
                        reaction.identifier, vial.id, report.recorded_volume, report.dispensed_volume
                    );
                    mismatches.push((reaction.identifier.clone(), report));
                }
                Err(e) => warn!(
                    "reaction {}: mixing check of the {} vial failed: {}",
                    reaction.identifier, vial.id, e
                ),
            }
        }
    }
    mismatches
}

/// Runs the whole normalization over a batch of records.
pub fn run(
    records: &[RawRecord],
    catalog: &ChemicalCatalog,
    config: &PlumbConfig,
) -> Result<PipelineOutput, PipelineError> {
    if records.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }
    if catalog.is_closed() && catalog.is_empty() {
        return Err(PipelineError::EmptyCatalog);
    }

    let (reactions, mut issues) = assemble_reactions(records, catalog, &config.assembly_options());
    let summaries = summarize_all(&reactions, config.check_ceiling, config.parallel);
    for summary in &summaries {
        issues.extend(summary.issues.iter().cloned());
    }

    let table = reaction_table(&summaries);
    let filtered_table = reaction_table(
        reactions
            .iter()
            .zip(&summaries)
            .filter(|(r, _)| matches(r, config.filter_role, config.filter_count))
            .map(|(_, s)| s),
    );
    let molarity_vectors = molarity_vector_table(&summaries);

    let exportable: Vec<Reaction> = reactions
        .iter()
        .zip(&summaries)
        .filter(|(_, s)| !s.is_skipped())
        .map(|(r, _)| r.clone())
        .collect();
    let grouping = group(&exportable, &config.grouping_options());
    issues.extend(grouping.issues.iter().cloned());

    let acid = acid_excess(&summaries, config.acid_threshold);
    for found in &acid {
        warn!(
            "reaction {}: {} at {:.3} M exceeds {} M",
            found.reaction_id, found.name, found.molarity, config.acid_threshold
        );
    }
    let mixing_mismatches = check_mixing(&summaries, &reactions, config.mixing_tolerance);

    issues.sort_by(|a, b| a.reaction_id.cmp(&b.reaction_id));
    let output = PipelineOutput {
        fingerprint_groups: group_by_fingerprint(&summaries),
        reactions,
        summaries,
        reaction_table: table,
        filtered_table,
        molarity_vectors,
        grouping,
        acid_excess: acid,
        mixing_mismatches,
        issues,
    };
    info!(
        "{} reactions assembled, {} skipped, {} in the filtered export, {} issues",
        output.reactions.len(),
        output.skipped(),
        output.filtered_table.len(),
        output.issues.len()
    );
    Ok(output)
}

fn issues_table(issues: &[ReactionIssue]) -> ExportTable {
    ExportTable::from_records(
        issues
            .iter()
            .map(|issue| {
                ExportRecord::new()
                    .with("reaction_id", issue.reaction_id.as_str())
                    .with("severity", issue.severity.as_str())
                    .with("dispense_index", issue.dispense_index)
                    .with("chemical", issue.chemical.clone())
                    .with("problem", issue.error.to_string())
            })
            .collect(),
    )
}

/// Writes every table of the run under `out_dir` and returns the written files.
pub fn write_outputs(
    output: &PipelineOutput,
    config: &PlumbConfig,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    let filtered_name = format!(
        "reactions_{}_{}.csv",
        config.filter_count, config.filter_role
    );
    let tables = [
        ("reactions_raw.csv".to_string(), output.reaction_table.clone()),
        (filtered_name, output.filtered_table.clone()),
        (
            "reactions_human_readable.csv".to_string(),
            output.filtered_table.human_readable(),
        ),
        ("molarity_vectors.csv".to_string(), output.molarity_vectors.clone()),
        ("issues.csv".to_string(), issues_table(&output.issues)),
    ];
    let mut written = Vec::new();
    for (name, table) in tables {
        let path = out_dir.join(name);
        table.to_csv_file(&path)?;
        written.push(path);
    }
    written.extend(write_reagent_tables(&output.grouping, out_dir)?);
    Ok(written)
}

/// prints the fingerprint counts and the issues of the run
pub fn print_summary(output: &PipelineOutput) {
    fingerprint_table(&output.summaries).printstd();
    if !output.issues.is_empty() {
        issue_table(&output.issues).printstd();
    }
}
