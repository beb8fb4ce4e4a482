use crate::Export::record::ExportRecord;
use crate::Export::table::ExportTable;
use crate::Reactions::reagent_groups::{DistinguishableRow, IndistinguishableRow};

pub fn distinguishable_table(rows: &[DistinguishableRow]) -> ExportTable {
    let records = rows
        .iter()
        .map(|row| {
            ExportRecord::new()
                .with("reaction_id", row.reaction_id.as_str())
                .with("dispense_index", row.dispense_index)
                .with("vial", row.vial.as_str())
                .with("inchikey", row.chemical.inchikey.as_str())
                .with("chemname", row.chemical.name.as_str())
                .with("role", row.role.as_str())
                .with("molarity", row.molarity)
                .with("volume_added", row.volume_added)
                .with("outcome", row.outcome)
        })
        .collect();
    ExportTable::from_records(records)
}

pub fn indistinguishable_table(rows: &[IndistinguishableRow]) -> ExportTable {
    let records = rows
        .iter()
        .map(|row| {
            ExportRecord::new()
                .with("inchikey", row.chemical.inchikey.as_str())
                .with("chemname", row.chemical.name.as_str())
                .with("role", row.role.as_str())
                .with("molarity", row.molarity)
                .with("count", row.count)
        })
        .collect();
    ExportTable::from_records(records)
}
