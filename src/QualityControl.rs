/// reactions whose acid molarity is implausibly high
pub mod acid_excess;
/// eng
/// Volume bookkeeping of a vial. The molarities are computed a second time by mixing the
/// reagents: with S the matrix of stock-solution compositions (reagents x chemicals) and V the
/// dispensed volumes, the vial holds V·S/ΣV. This is compared with the molarities derived from
/// the recorded vial volume; a difference means the recorded volume and the dispensed volumes
/// disagree.
pub mod mixing_check;
