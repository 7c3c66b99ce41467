use proptest::prelude::*;
use tessera_conformance::reference;
use tessera_core::{Array, DType};
use tessera_linalg as la;

/// Square matrices with a dominant diagonal, plus a right-hand side.
fn system() -> impl Strategy<Value = (usize, Vec<f32>, Vec<f32>)> {
    (1usize..=5).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec(-1.0f32..1.0, n * n),
            prop::collection::vec(-10.0f32..10.0, n),
        )
            .prop_map(|(n, mut a, b)| {
                for i in 0..n {
                    a[i * n + i] += if a[i * n + i] >= 0.0 { n as f32 } else { -(n as f32) };
                }
                (n, a, b)
            })
    })
}

fn residual(a: &[f32], x: &[f32], b: &[f32], n: usize) -> f32 {
    reference::matmul(a, x, n, n, 1)
        .iter()
        .zip(b)
        .map(|(l, r)| (l - r).abs())
        .fold(0.0, f32::max)
}

proptest! {
    #[test]
    fn solve_satisfies_system((n, a, b) in system()) {
        let am = Array::create(&a, &[n, n], DType::F32).unwrap();
        let bv = Array::create(&b, &[n], DType::F32).unwrap();
        let x = la::solve(&am, &bv).unwrap();
        prop_assert_eq!(x.shape(), &[n]);
        prop_assert!(residual(&a, &x.to_vec_f32(), &b, n) < 1e-3);
    }

    #[test]
    fn lstsq_on_square_system_matches_solve((n, a, b) in system()) {
        let am = Array::create(&a, &[n, n], DType::F32).unwrap();
        let bv = Array::create(&b, &[n], DType::F32).unwrap();
        let x = la::lstsq(&am, &bv).unwrap();
        prop_assert!(residual(&a, &x.to_vec_f32(), &b, n) < 1e-2);
    }

    #[test]
    fn det_scales_by_power_of_factor((n, a, _b) in system(), scale in 0.5f32..2.0) {
        let am = Array::create(&a, &[n, n], DType::F32).unwrap();
        let scaled: Vec<f32> = a.iter().map(|x| x * scale).collect();
        let sm = Array::create(&scaled, &[n, n], DType::F32).unwrap();
        let d = la::det(&am).unwrap().item().unwrap();
        let ds = la::det(&sm).unwrap().item().unwrap();
        let want = d * f64::from(scale).powi(n as i32);
        prop_assert!((ds - want).abs() <= 1e-3 * want.abs().max(1.0));
    }

    #[test]
    fn rank_of_dominant_matrix_is_full((n, a, _b) in system()) {
        let am = Array::create(&a, &[n, n], DType::F32).unwrap();
        prop_assert_eq!(la::matrix_rank(&am).unwrap().item().unwrap(), n as f64);
    }
}
