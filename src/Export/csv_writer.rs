use crate::Export::reagent_table::{distinguishable_table, indistinguishable_table};
use crate::Reactions::reagent_groups::{ChemicalSystem, ReagentGrouping};
use crate::error::PipelineError;
use log::info;
use std::path::{Path, PathBuf};

pub const DISTINGUISHABLE_DIR: &str = "reaction_distinguishable";
pub const INDISTINGUISHABLE_DIR: &str = "reaction_indistinguishable";

/// `REAGENT@@<InChIKey>@<InChIKey>...csv`
pub fn reagent_file_name(system: &ChemicalSystem) -> String {
    format!("REAGENT@@{}.csv", system)
}

/// Writes both reagent views of every chemical system under `out_dir`, one CSV per system.
/// Returns the written files.
pub fn write_reagent_tables(
    grouping: &ReagentGrouping,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written = Vec::new();
    for (system, rows) in &grouping.distinguishable {
        let path = out_dir.join(DISTINGUISHABLE_DIR).join(reagent_file_name(system));
        distinguishable_table(rows).to_csv_file(&path)?;
        written.push(path);
    }
    for (system, rows) in &grouping.indistinguishable {
        let path = out_dir.join(INDISTINGUISHABLE_DIR).join(reagent_file_name(system));
        indistinguishable_table(rows).to_csv_file(&path)?;
        written.push(path);
    }
    info!(
        "reagent tables of {} chemical systems written to '{}'",
        grouping.distinguishable.len(),
        out_dir.display()
    );
    Ok(written)
}
