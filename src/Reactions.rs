/// a reaction: its alpha (reagents) and beta (antisolvent) vials with their dispenses
pub mod reaction;
/// Builds reactions out of raw dispensing rows and validates reaction time, temperature,
/// crystal score and vial volumes. A bad reaction is dropped, the batch goes on.
pub mod assembly;
mod assembly_tests;
/// fingerprint classifier: distinct chemicals per role, printed as `o%i%s%a`
pub mod fingerprint;
/// per-reaction summary (molarities, fingerprint, antisolvent identity, issues)
pub mod summary;
pub mod reagent_groups;
