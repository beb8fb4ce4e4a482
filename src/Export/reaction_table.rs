use crate::Chemistry::role::Role;
use crate::Export::record::ExportRecord;
use crate::Export::table::ExportTable;
use crate::Reactions::summary::ReactionSummary;

/// `<role>___<index>___<field>`
pub fn role_column(role: Role, index: usize, field: &str) -> String {
    format!("{}___{}___{}", role.as_str(), index, field)
}

/// Flattens a summary into one export row. Chemicals of a role are indexed from 0 in
/// InChIKey order; the molarity is the one in the vial the chemical was dispensed to.
pub fn reaction_record(summary: &ReactionSummary) -> ExportRecord {
    let mut record = ExportRecord::new()
        .with("identifier", summary.identifier.as_str())
        .with("fingerprint", summary.fingerprint.to_string())
        .with("outcome", summary.outcome)
        .with("alpha_vial_volume", summary.alpha_volume)
        .with("beta_vial_volume", summary.beta_volume)
        .with("reaction_time", summary.reaction_time)
        .with("reaction_temperature", summary.reaction_temperature)
        .with(
            "antisolvent_identity",
            summary.antisolvent.as_ref().map(|c| c.inchikey.clone()),
        );
    for (role, chemicals) in &summary.chemicals_by_role {
        for (i, chemical) in chemicals.iter().enumerate() {
            record.set(&role_column(*role, i, "inchikey"), chemical.inchikey.as_str());
            record.set(&role_column(*role, i, "inchi"), chemical.inchi.as_str());
            record.set(&role_column(*role, i, "chemname"), chemical.name.as_str());
            record.set(
                &role_column(*role, i, "molarity"),
                summary.molarities.get(chemical).copied(),
            );
            record.set(
                &role_column(*role, i, "molarity_max"),
                chemical.pure_molarity(),
            );
        }
    }
    record
}

/// One row per exportable reaction; skipped reactions are left out.
/// Missing molarities of absent role indices are filled with 0.
pub fn reaction_table<'a, I>(summaries: I) -> ExportTable
where
    I: IntoIterator<Item = &'a ReactionSummary>,
{
    let records = summaries
        .into_iter()
        .filter(|s| !s.is_skipped())
        .map(reaction_record)
        .collect();
    let mut table = ExportTable::from_records(records);
    table.zero_fill_molarity();
    table
}

/// reaction id with its InChIKey -> molarity vector (alpha vial), one row per chemical
pub fn molarity_vector_table<'a, I>(summaries: I) -> ExportTable
where
    I: IntoIterator<Item = &'a ReactionSummary>,
{
    let mut records = Vec::new();
    for summary in summaries.into_iter().filter(|s| !s.is_skipped()) {
        for (inchikey, molarity) in summary.molarity_vector() {
            records.push(
                ExportRecord::new()
                    .with("identifier", summary.identifier.as_str())
                    .with("inchikey", inchikey)
                    .with("molarity", molarity),
            );
        }
    }
    ExportTable::from_records(records)
}
