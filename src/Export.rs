/// typed cells and ordered rows of the exported tables
pub mod record;
/// table over records: column union, zero-filling of molarities, human-readable view,
/// CSV and prettytable output
pub mod table;
/// reaction table: one row per reaction with `<role>___<index>___<field>` columns, and the
/// per-reaction molarity vectors
pub mod reaction_table;
/// distinguishable and indistinguishable reagent tables of one chemical system
pub mod reagent_table;
/// writes the reagent tables as `REAGENT@@<system>.csv`
pub mod csv_writer;
/// prettytable summaries printed at the end of a run
pub mod report;
