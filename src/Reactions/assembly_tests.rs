/////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
/////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Chemistry::catalog::ChemicalCatalog;
    use crate::Chemistry::chemical::Chemical;
    use crate::Chemistry::role::Role;
    use crate::Dispensing::dispense::{RawRecord, VialId};
    use crate::Reactions::assembly::{AssemblyOptions, assemble_reactions};
    use crate::error::{PlumbError, Severity};
    use approx::assert_relative_eq;

    const FAI: &str = "QHJPGANWSLEMTI-UHFFFAOYSA-N";
    const DCM: &str = "YMWUJEATGCHHMB-UHFFFAOYSA-N";

    fn row(reaction_id: &str, vial: &str, index: usize, role: &str, inchikey: &str) -> RawRecord {
        RawRecord {
            reaction_id: reaction_id.to_string(),
            vial: vial.to_string(),
            dispense_index: index,
            role: role.to_string(),
            inchikey: inchikey.to_string(),
            chemical_name: "x".to_string(),
            amount: 100.0,
            amount_unit: "microliter".to_string(),
            vial_volume_ml: if vial == "beta" { 1.0 } else { 0.5 },
            concentration_molar: Some(1.0),
            outcome: Some(4),
            reaction_time_s: 3600.0,
            reaction_temperature_c: 105.0,
            experiment_version: Some("3.0".to_string()),
            ..Default::default()
        }
    }

    fn valid_reaction(id: &str) -> Vec<RawRecord> {
        vec![row(id, "alpha", 0, "organic", FAI), row(id, "beta", 1, "antisolvent", DCM)]
    }

    #[test]
    fn test_rows_are_grouped_into_vials() {
        let catalog = ChemicalCatalog::open();
        let mut records = valid_reaction("R2");
        records.extend(valid_reaction("R1"));
        let (reactions, issues) = assemble_reactions(&records, &catalog, &AssemblyOptions::default());
        assert!(issues.is_empty());
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[0].identifier, "R1");
        let r = &reactions[0];
        assert_relative_eq!(r.alpha.total_volume, 5e-4);
        assert_relative_eq!(r.beta.total_volume, 1e-3);
        assert_eq!(r.alpha.events.len(), 1);
        assert_eq!(r.beta.events[0].role, Role::Antisolvent);
        assert_eq!(r.outcome, Some(4));
        assert_eq!(r.experiment_version.as_deref(), Some("3.0"));
        // both reactions share the canonical chemical
        assert!(std::sync::Arc::ptr_eq(
            &reactions[0].alpha.events[0].chemical,
            &reactions[1].alpha.events[0].chemical
        ));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_bad_reaction_is_dropped_not_the_batch() {
        let catalog = ChemicalCatalog::open();
        let mut records = valid_reaction("GOOD");
        let mut bad = valid_reaction("BAD");
        bad[0].inchikey = "not-a-key".to_string();
        records.extend(bad);
        let (reactions, issues) = assemble_reactions(&records, &catalog, &AssemblyOptions::default());
        assert_eq!(reactions.len(), 1);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].reaction_id, "BAD");
        assert_eq!(issues[0].dispense_index, Some(0));
        assert!(matches!(issues[0].error, PlumbError::UnresolvedChemical { .. }));
    }

    #[test]
    fn test_closed_catalog_rejects_unknown_chemicals() {
        let catalog = ChemicalCatalog::closed(vec![Chemical::new(FAI, "formamidinium iodide")]).unwrap();
        let (reactions, issues) =
            assemble_reactions(&valid_reaction("R"), &catalog, &AssemblyOptions::default());
        assert!(reactions.is_empty());
        assert_eq!(issues[0].chemical.as_deref(), Some(DCM));
    }

    #[test]
    fn test_reaction_parameters_are_validated() {
        let catalog = ChemicalCatalog::open();
        let mut cold = valid_reaction("COLD");
        for r in cold.iter_mut() {
            r.reaction_temperature_c = -300.0;
        }
        let mut unscored = valid_reaction("UNSCORED");
        for r in unscored.iter_mut() {
            r.outcome = None;
        }
        let mut split = valid_reaction("SPLIT");
        split[1].reaction_time_s = 10.0;
        let mut records = cold;
        records.extend(unscored.clone());
        records.extend(split);
        let (reactions, issues) = assemble_reactions(&records, &catalog, &AssemblyOptions::default());
        assert!(reactions.is_empty());
        let parameters: Vec<&str> = issues
            .iter()
            .map(|i| match &i.error {
                PlumbError::InvalidReactionParameter { parameter, .. } => *parameter,
                _ => "other",
            })
            .collect();
        assert_eq!(parameters, vec!["reaction temperature", "reaction time", "outcome"]);

        let lenient = AssemblyOptions {
            ignore_absent_outcome: true,
        };
        let (reactions, issues) = assemble_reactions(&unscored, &catalog, &lenient);
        assert_eq!(reactions.len(), 1);
        assert!(issues.is_empty());
        assert_eq!(reactions[0].outcome, None);
    }

    #[test]
    fn test_conflicting_vial_volume_and_misplaced_antisolvent() {
        let catalog = ChemicalCatalog::open();
        let mut records = valid_reaction("R");
        let mut second = row("R", "alpha", 2, "organic", FAI);
        second.vial_volume_ml = 0.75;
        records.push(second);
        let (reactions, issues) = assemble_reactions(&records, &catalog, &AssemblyOptions::default());
        assert!(reactions.is_empty());
        assert!(matches!(
            issues[0].error,
            PlumbError::InvalidReactionParameter { parameter: "vial volume", .. }
        ));

        let misplaced = vec![row("M", "alpha", 0, "organic", FAI), row("M", "alpha", 1, "antisolvent", DCM)];
        let (reactions, issues) = assemble_reactions(&misplaced, &catalog, &AssemblyOptions::default());
        assert_eq!(reactions.len(), 1);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(reactions[0].alpha.events[1].vial, VialId::Alpha);
    }

    #[test]
    fn test_repeated_dispense_row_rejects_the_reaction() {
        let catalog = ChemicalCatalog::open();
        let mut records = valid_reaction("TWICE");
        let mut repeated = row("TWICE", "alpha", 0, "organic", &FAI.to_lowercase());
        repeated.concentration_molar = Some(2.0);
        records.push(repeated);
        let (reactions, issues) = assemble_reactions(&records, &catalog, &AssemblyOptions::default());
        assert!(reactions.is_empty());
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0].error,
            PlumbError::InvalidReactionParameter { parameter: "dispense", .. }
        ));
        assert_eq!(issues[0].dispense_index, Some(0));
        assert_eq!(issues[0].chemical.as_deref(), Some(FAI));

        // the same chemical in a later dispense is a second addition, not a repeat
        let mut records = valid_reaction("AGAIN");
        records.push(row("AGAIN", "alpha", 2, "organic", FAI));
        let (reactions, issues) = assemble_reactions(&records, &catalog, &AssemblyOptions::default());
        assert!(issues.is_empty());
        assert_eq!(reactions[0].alpha.events.len(), 2);
    }
}
