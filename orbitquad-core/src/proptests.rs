use proptest::prelude::*;

use crate::{
    assemble, monomial_count, monomial_exponents, ArithmeticMode, BarycentricOrbit,
    OrbitDescriptor, OrbitEntry, Scalar,
};
use std::collections::HashSet;

const F: ArithmeticMode = ArithmeticMode::Floating;

fn bits(rows: &[Vec<f64>]) -> HashSet<Vec<u64>> {
    rows.iter()
        .map(|r| r.iter().map(|x| x.to_bits()).collect())
        .collect()
}

/// Distinct positive magnitudes with multiplicities fitting in `dim`.
fn arb_groups() -> impl Strategy<Value = (usize, Vec<(f64, usize)>)> {
    (1usize..=5).prop_flat_map(|dim| {
        let groups = prop::collection::vec(1usize..=2, 0..=3).prop_map(move |mults| {
            let mut left = dim;
            mults
                .into_iter()
                .enumerate()
                .filter_map(|(i, k)| {
                    let k = k.min(left);
                    left -= k;
                    (k > 0).then(|| (0.5 + i as f64, k))
                })
                .collect::<Vec<_>>()
        });
        (Just(dim), groups)
    })
}

fn arb_magnitudes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![Just(0.0), 0.1f64..4.0], 1..=5)
}

proptest! {
    #[test]
    fn prop_fsd_size_matches_expansion((dim, groups) in arb_groups()) {
        let d = OrbitDescriptor::fsd(groups).unwrap();
        let rows = d.expand(dim, F).unwrap();
        prop_assert_eq!(rows.len(), d.orbit_size(dim).unwrap());
        prop_assert_eq!(bits(&rows).len(), rows.len());
        prop_assert!(rows.iter().all(|r| r.len() == dim));
    }

    #[test]
    fn prop_expansion_is_repeatable((dim, groups) in arb_groups()) {
        let d = OrbitDescriptor::fsd(groups).unwrap();
        prop_assert_eq!(d.expand(dim, F).unwrap(), d.expand(dim, F).unwrap());
    }

    #[test]
    fn prop_pm_array_size(magnitudes in arb_magnitudes()) {
        let dim = magnitudes.len();
        let nonzero = magnitudes.iter().filter(|m| **m != 0.0).count();
        let d = OrbitDescriptor::pm_array(magnitudes).unwrap();
        let rows = d.expand(dim, F).unwrap();
        prop_assert_eq!(rows.len(), 1 << nonzero);
        prop_assert_eq!(d.orbit_size(dim).unwrap(), rows.len());
        prop_assert_eq!(bits(&rows).len(), rows.len());
    }

    #[test]
    fn prop_barycentric_rows_sum_to_one(a in 0.01f64..0.3, b in 0.01f64..0.3) {
        for orbit in [
            BarycentricOrbit::S111 { a, b },
            BarycentricOrbit::S211 { a, b },
            BarycentricOrbit::S22 { a },
        ] {
            let rows = orbit.expand(F).unwrap();
            prop_assert_eq!(rows.len(), orbit.orbit_size());
            for row in rows {
                let sum: f64 = row.iter().sum();
                prop_assert!((sum - 1.0).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn prop_pm_rows_are_sign_variants(m in 0.1f64..4.0, dim in 1usize..=8) {
        let rows = OrbitDescriptor::pm(m).expand(dim, F).unwrap();
        prop_assert_eq!(rows.len(), 1 << dim);
        prop_assert_eq!(bits(&rows).len(), rows.len());
        for row in &rows {
            prop_assert_eq!(row.len(), dim);
            prop_assert!(row.iter().all(|x| x.abs() == m));
        }
    }

    #[test]
    fn prop_assembled_weight_sum(w in 0.1f64..2.0, m in 0.1f64..2.0, dim in 1usize..=4) {
        let entries = [OrbitEntry::orbit(w, OrbitDescriptor::pm(m))];
        let t = assemble(&entries, dim, F).unwrap();
        prop_assert_eq!(t.len(), 1 << dim);
        prop_assert!(t.weight_sum().agrees(&(w * (1 << dim) as f64), &Default::default()));
    }

    #[test]
    fn prop_monomial_count(dim in 1usize..=6, degree in 0usize..=8) {
        prop_assert_eq!(Some(monomial_exponents(dim, degree).len()), monomial_count(dim, degree));
    }
}
