/// Roles a chemical plays in a reaction (organic, inorganic, solvent, acid, antisolvent)
pub mod role;
/// Canonical chemical record: InChIKey, InChI, name, category and the physical constants
/// (molar mass, density) needed to turn neat dispenses into moles.
pub mod chemical;
/// eng
/// Chemical identity resolver. Every raw chemical reference of the records is mapped to one
/// shared `Arc<Chemical>` keyed by its normalized InChIKey, so two dispenses of the same
/// compound are recognized as the same chemical whatever name, batch or vendor they carry.
/// The catalog is either closed (built from the chemical inventory, unknown keys are
/// rejected) or open (learns the chemicals from the records themselves).
pub mod catalog;
