//! Property tests: the dynamic program against explicit subsequence
//! enumeration, and invariants of the aggregate kernel on random input.

use proptest::prelude::*;
use rssk::core::KernelConfig;
use rssk::data::Symbol;
use rssk::feature_map::FeatureMap;
use rssk::kernel::{gap_weighted_kernel, subsequence_kernel, DpWorkspace, MatchMode, SumStringKernel};

fn symbols(text: &str) -> Vec<Symbol> {
    text.bytes().map(Symbol::from).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn dp_matches_feature_map(
        s in "[abc]{0,7}",
        t in "[abc]{0,7}",
        min_kn in 1usize..=3,
        extra in 0usize..=2,
        lambda in 0.1f64..=1.0,
    ) {
        let max_kn = min_kn + extra;
        let mut workspace = DpWorkspace::new();
        let dp = gap_weighted_kernel(
            &symbols(&s),
            &symbols(&t),
            min_kn,
            max_kn,
            lambda,
            &MatchMode::Hard,
            &mut workspace,
        );

        let phi_s = FeatureMap::from_bytes(&s, min_kn, max_kn, lambda);
        let phi_t = FeatureMap::from_bytes(&t, min_kn, max_kn, lambda);
        let explicit = phi_s.dot(&phi_t);

        prop_assert!(close(dp, explicit), "dp {} vs explicit {}", dp, explicit);
    }

    #[test]
    fn one_pass_equals_per_length_sum(
        s in "[acgt]{0,9}",
        t in "[acgt]{0,9}",
        lambda in 0.1f64..=1.0,
    ) {
        let (s, t) = (symbols(&s), symbols(&t));
        let mut workspace = DpWorkspace::new();
        let one_pass = gap_weighted_kernel(&s, &t, 1, 4, lambda, &MatchMode::Hard, &mut workspace);
        let summed: f64 = (1..=4)
            .map(|k| subsequence_kernel(&s, &t, k, lambda, &MatchMode::Hard, &mut workspace))
            .sum();

        prop_assert!(close(one_pass, summed));
    }

    #[test]
    fn kernel_is_symmetric(
        s in "[a-e]{0,8}",
        t in "[a-e]{0,8}",
        k in 1usize..=4,
    ) {
        let (s, t) = (symbols(&s), symbols(&t));
        let mut workspace = DpWorkspace::new();
        let st = subsequence_kernel(&s, &t, k, 0.5, &MatchMode::Hard, &mut workspace);
        let ts = subsequence_kernel(&t, &s, k, 0.5, &MatchMode::Hard, &mut workspace);
        prop_assert!(close(st, ts));
    }

    #[test]
    fn normalized_entries_bounded(
        sequences in prop::collection::vec("[a-d]{1,8}", 2..6),
    ) {
        let mut kernel = SumStringKernel::<f64>::new(KernelConfig::with_lengths(1, 2)).unwrap();
        kernel.set_data(&sequences).unwrap();
        kernel.compute_kernel().unwrap();

        let values = kernel.values().unwrap();
        for i in 0..sequences.len() {
            prop_assert_eq!(values.get(i, i), 1.0);
            for j in 0..sequences.len() {
                let v = values.get(i, j);
                prop_assert!((0.0..=1.0 + 1e-12).contains(&v));
                prop_assert_eq!(v, values.get(j, i));
            }
        }
    }
}
