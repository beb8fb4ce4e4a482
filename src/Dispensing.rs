/// dispense events, amounts with their units and the raw record rows
pub mod dispense;
/// Conversion of a single dispense to moles: solutions by volume and concentration, neat
/// chemicals by volume or mass through density and molar mass.
pub mod normalizer;
/// eng
/// Vial aggregator. Moles of all dispenses into one vial are summed per canonical chemical
/// and divided by the vial volume. The result does not depend on dispense order, and a
/// molarity above the pure-form ceiling of its chemical is reported, never clamped.
pub mod vial;
mod vial_tests;
