/////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
/////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Chemistry::chemical::Chemical;
    use crate::Chemistry::role::Role;
    use crate::Dispensing::dispense::{Amount, DispenseEvent, VialId};
    use crate::Dispensing::vial::{
        Vial, aggregate, ceiling_violations, molarity_ceilings, moles_by_chemical,
    };
    use crate::error::PlumbError;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn organic() -> Arc<Chemical> {
        Arc::new(
            Chemical::new("QHJPGANWSLEMTI-UHFFFAOYSA-N", "formamidinium iodide")
                .with_constants(171.969, 2.2),
        )
    }

    fn inorganic() -> Arc<Chemical> {
        Arc::new(Chemical::new("RQQRAHKHDFPBMC-UHFFFAOYSA-L", "lead iodide").with_constants(461.01, 6.16))
    }

    fn water() -> Arc<Chemical> {
        Arc::new(Chemical::new("XLYOFNOQVPJJNP-UHFFFAOYSA-N", "water").with_constants(18.015, 1.0))
    }

    fn solution(index: usize, chemical: Arc<Chemical>, role: Role, ul: f64, molar: f64) -> DispenseEvent {
        DispenseEvent::new("R1", VialId::Alpha, index, chemical, role, Amount::Microliter(ul))
            .with_concentration(molar)
    }

    #[test]
    fn test_two_chemicals_in_one_milliliter() {
        // 2 mmol of organic and 1 mmol of inorganic in a 1 mL alpha vial
        let vial = Vial::new(VialId::Alpha, 1e-3).with_events(vec![
            solution(0, organic(), Role::Organic, 500.0, 4.0),
            solution(1, inorganic(), Role::Inorganic, 500.0, 2.0),
        ]);
        let molarities = aggregate(&vial).unwrap();
        assert_eq!(molarities.len(), 2);
        assert_relative_eq!(molarities[&organic()], 2.0, epsilon = 1e-12);
        assert_relative_eq!(molarities[&inorganic()], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_same_chemical_from_two_dispenses_is_summed() {
        let vial = Vial::new(VialId::Alpha, 2e-3).with_events(vec![
            solution(0, organic(), Role::Organic, 250.0, 4.0),
            solution(3, organic(), Role::Organic, 750.0, 4.0),
        ]);
        let molarities = aggregate(&vial).unwrap();
        assert_eq!(molarities.len(), 1);
        assert_relative_eq!(molarities[&organic()], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_aggregation_round_trip_and_idempotence() {
        let vial = Vial::new(VialId::Alpha, 8e-4).with_events(vec![
            solution(0, organic(), Role::Organic, 300.0, 3.1),
            solution(1, inorganic(), Role::Inorganic, 200.0, 1.7),
            DispenseEvent::new("R1", VialId::Alpha, 2, water(), Role::Solvent, Amount::Microliter(300.0)),
        ]);
        let first = aggregate(&vial).unwrap();
        let second = aggregate(&vial).unwrap();
        assert_eq!(first, second);
        let moles = moles_by_chemical(&vial).unwrap();
        for (chemical, molarity) in &first {
            assert_relative_eq!(moles[chemical] / vial.total_volume, *molarity, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_order_independence() {
        let events = vec![
            solution(0, organic(), Role::Organic, 300.0, 3.1),
            solution(1, inorganic(), Role::Inorganic, 200.0, 1.7),
            solution(2, organic(), Role::Organic, 100.0, 0.5),
        ];
        let mut reversed = events.clone();
        reversed.reverse();
        let a = aggregate(&Vial::new(VialId::Alpha, 6e-4).with_events(events)).unwrap();
        let b = aggregate(&Vial::new(VialId::Alpha, 6e-4).with_events(reversed)).unwrap();
        for (chemical, molarity) in &a {
            assert_relative_eq!(b[chemical], *molarity, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_volume() {
        let vial = Vial::new(VialId::Beta, 0.0);
        assert_eq!(
            aggregate(&vial),
            Err(PlumbError::ZeroVolume {
                vial: "beta".to_string(),
                volume: 0.0
            })
        );
        assert!(aggregate(&Vial::new(VialId::Alpha, -1.0)).is_err());
    }

    #[test]
    fn test_ceiling_violation_is_reported_not_clamped() {
        // 1 mL of neat water in a 0.5 mL vial doubles its pure molarity
        let vial = Vial::new(VialId::Alpha, 5e-4).with_events(vec![DispenseEvent::new(
            "R1",
            VialId::Alpha,
            0,
            water(),
            Role::Solvent,
            Amount::Milliliter(1.0),
        )]);
        let molarities = aggregate(&vial).unwrap();
        let violations = ceiling_violations(&molarities);
        assert_eq!(violations.len(), 1);
        assert_relative_eq!(violations[0].molarity, 2.0 * 1e3 / 18.015, epsilon = 1e-9);
        assert_relative_eq!(molarities[&water()], violations[0].molarity);
        assert!(matches!(
            violations[0].to_error(),
            PlumbError::MolarityCeilingViolation { .. }
        ));
        let ceilings = molarity_ceilings(&molarities);
        assert_relative_eq!(ceilings[&water()].unwrap(), 1e3 / 18.015);
    }
}
