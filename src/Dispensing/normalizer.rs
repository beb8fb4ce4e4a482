//! Conversion of a dispense into the amount of substance it contributes.
use crate::Dispensing::dispense::{Amount, DispenseEvent};
use crate::error::PlumbError;

fn invalid(event: &DispenseEvent, value: f64, reason: &str) -> PlumbError {
    PlumbError::InvalidAmount {
        inchikey: event.chemical.inchikey.clone(),
        amount: value,
        reason: reason.to_string(),
    }
}

fn check_amount(event: &DispenseEvent) -> Result<f64, PlumbError> {
    let value = event.amount.value();
    if !value.is_finite() {
        return Err(invalid(event, value, "amount is not finite"));
    }
    if value < 0.0 {
        return Err(invalid(event, value, "amount is negative"));
    }
    Ok(value)
}

fn molar_mass(event: &DispenseEvent) -> Result<f64, PlumbError> {
    match event.chemical.molar_mass {
        Some(mw) if mw.is_finite() && mw > 0.0 => Ok(mw),
        _ => Err(PlumbError::MissingPhysicalConstant {
            inchikey: event.chemical.inchikey.clone(),
            constant: "molar mass",
        }),
    }
}

fn density(event: &DispenseEvent) -> Result<f64, PlumbError> {
    match event.chemical.density {
        Some(rho) if rho.is_finite() && rho > 0.0 => Ok(rho),
        _ => Err(PlumbError::MissingPhysicalConstant {
            inchikey: event.chemical.inchikey.clone(),
            constant: "density",
        }),
    }
}

/// Moles contributed by a dispense.
///
/// - solution: volume (L) * source concentration (mol/L)
/// - neat liquid: mL * density (g/mL) / molar mass (g/mol)
/// - neat solid: g / molar mass
pub fn moles(event: &DispenseEvent) -> Result<f64, PlumbError> {
    let value = check_amount(event)?;
    if let Some(concentration) = event.source_concentration {
        if !concentration.is_finite() || concentration < 0.0 {
            return Err(invalid(event, concentration, "invalid source concentration"));
        }
        let liters = event
            .amount
            .liters()
            .ok_or_else(|| invalid(event, value, "a weighed amount cannot carry a concentration"))?;
        return Ok(liters * concentration);
    }
    match event.amount {
        Amount::Gram(grams) => Ok(grams / molar_mass(event)?),
        Amount::Milliliter(_) | Amount::Microliter(_) => {
            let milliliters = event.amount.liters().unwrap_or(0.0) * 1e3;
            Ok(milliliters * density(event)? / molar_mass(event)?)
        }
    }
}

/// Molarity of the dispensed source itself (not diluted by the vial):
/// the source concentration, or the pure-form molarity for a neat dispense.
/// This is the composition the indistinguishable reagent view is keyed by.
pub fn reagent_molarity(event: &DispenseEvent) -> Result<f64, PlumbError> {
    check_amount(event)?;
    if let Some(concentration) = event.source_concentration {
        if !concentration.is_finite() || concentration < 0.0 {
            return Err(invalid(event, concentration, "invalid source concentration"));
        }
        return Ok(concentration);
    }
    let mw = molar_mass(event)?;
    let rho = density(event)?;
    Ok(1e3 * rho / mw)
}

/// Volume the dispense adds to its vial, in liters. A weighed neat solid is converted with its density.
pub fn dispensed_volume_liters(event: &DispenseEvent) -> Result<f64, PlumbError> {
    let value = check_amount(event)?;
    match event.amount {
        Amount::Gram(_) => {
            if event.source_concentration.is_some() {
                return Err(invalid(event, value, "a weighed amount cannot carry a concentration"));
            }
            Ok(1e-3 * value / density(event)?)
        }
        Amount::Milliliter(_) | Amount::Microliter(_) => Ok(event.amount.liters().unwrap_or(0.0)),
    }
}
