mod common;

use common::{
    gap_entries_are_zero, matching_triplets, non_gap_indices, random_parameters,
    synthetic_alignment, synthetic_weights,
};
use triplet_pll::msa::Alignment;
use triplet_pll::objective::numdiff::check_gradient;
use triplet_pll::objective::{
    evaluate_triplet_pll, EvaluatorConfig, L2Regularization, ParameterLayout,
    TripletPseudoLikelihood,
};
use triplet_pll::triplets::SymbolTriplet;

const EPSILON: f64 = 1e-5;
const TOLERANCE: f64 = 1e-6;

fn objective(
    regularization: Option<L2Regularization>,
    config: EvaluatorConfig,
) -> TripletPseudoLikelihood {
    let alignment = synthetic_alignment(12, 6, 11);
    let triplets = matching_triplets(&alignment, &[[0, 2, 4], [1, 3, 5], [0, 1, 5], [2, 3, 4]]);
    TripletPseudoLikelihood::new(
        alignment,
        synthetic_weights(12, 3),
        triplets,
        regularization,
        config,
    )
    .expect("objective initialises")
}

fn assert_gradient_matches(objective: &TripletPseudoLikelihood, x: &[f64]) {
    let mut g = vec![0.0; objective.nvar()];
    objective.evaluate(x, &mut g).expect("evaluation succeeds");

    let indices = non_gap_indices(objective.layout(), 7);
    let checks = check_gradient(
        |probe| {
            let mut scratch = vec![0.0; probe.len()];
            objective.evaluate(probe, &mut scratch)
        },
        x,
        &g,
        &indices,
        EPSILON,
    )
    .expect("gradient check runs");

    for check in checks {
        assert!(
            check.relative_error() < TOLERANCE,
            "index {}: analytic {} vs numeric {}",
            check.index,
            check.analytic,
            check.numeric
        );
    }
}

#[test]
fn gradient_matches_finite_differences() {
    let objective = objective(None, EvaluatorConfig::default());
    let x = random_parameters(objective.layout(), 0.3, 5);
    assert_gradient_matches(&objective, &x);
}

#[test]
fn regularized_gradient_matches_finite_differences() {
    let objective = objective(
        Some(L2Regularization::new(0.5, 0.1, 0.2)),
        EvaluatorConfig::default(),
    );
    let x = random_parameters(objective.layout(), 0.3, 9);
    assert_gradient_matches(&objective, &x);
}

#[test]
fn gap_gradient_entries_are_exactly_zero() {
    let objective = objective(Some(L2Regularization::default()), EvaluatorConfig::default());
    let x = random_parameters(objective.layout(), 1.0, 2);
    let mut g = vec![0.0; objective.nvar()];
    objective.evaluate(&x, &mut g).unwrap();
    assert!(gap_entries_are_zero(objective.layout(), &g));
}

#[test]
fn gradient_buffer_is_fully_overwritten() {
    let objective = objective(None, EvaluatorConfig::default());
    let x = random_parameters(objective.layout(), 0.2, 4);

    let mut clean = vec![0.0; objective.nvar()];
    let mut dirty = vec![f64::NAN; objective.nvar()];
    let f_clean = objective.evaluate(&x, &mut clean).unwrap();
    let f_dirty = objective.evaluate(&x, &mut dirty).unwrap();
    assert_eq!(f_clean, f_dirty);
    assert_eq!(clean, dirty);
}

#[test]
fn objective_is_linear_in_weights() {
    let alignment = synthetic_alignment(8, 5, 21);
    let triplets = matching_triplets(&alignment, &[[0, 2, 4]]);
    let weights = synthetic_weights(8, 1);
    let doubled: Vec<f64> = weights.iter().map(|w| 2.0 * w).collect();

    let single = TripletPseudoLikelihood::new(
        alignment.clone(),
        weights,
        triplets.clone(),
        None,
        EvaluatorConfig::default(),
    )
    .unwrap();
    let double =
        TripletPseudoLikelihood::new(alignment, doubled, triplets, None, EvaluatorConfig::default())
            .unwrap();

    let x = random_parameters(single.layout(), 0.5, 8);
    let mut g1 = vec![0.0; single.nvar()];
    let mut g2 = vec![0.0; single.nvar()];
    let f1 = single.evaluate(&x, &mut g1).unwrap();
    let f2 = double.evaluate(&x, &mut g2).unwrap();

    assert!((f2 - 2.0 * f1).abs() <= 1e-10 * f1.abs().max(1.0));
    for (a, b) in g1.iter().zip(&g2) {
        assert!((b - 2.0 * a).abs() <= 1e-10 * a.abs().max(1.0));
    }
}

#[test]
fn zero_weights_give_zero_objective() {
    let alignment = synthetic_alignment(4, 4, 2);
    let objective = TripletPseudoLikelihood::new(
        alignment,
        vec![0.0; 4],
        Vec::new(),
        None,
        EvaluatorConfig::default(),
    )
    .unwrap();
    let x = random_parameters(objective.layout(), 1.0, 3);
    let mut g = vec![1.0; objective.nvar()];
    assert_eq!(objective.evaluate(&x, &mut g).unwrap(), 0.0);
    assert!(g.iter().all(|&v| v == 0.0));
}

#[test]
fn two_column_coupling_has_closed_form() {
    // one row (A, R) with a single coupling x2[A, R] = 1
    let layout = ParameterLayout::new(2, 0);
    let mut x = vec![0.0; layout.nvar()];
    let (_, x2, _) = layout.split_mut(&mut x);
    x2[ParameterLayout::pair_offset(0, 0, 1)] = 1.0;

    let mut g = vec![0.0; layout.nvar()];
    let fx = evaluate_triplet_pll(&x, &mut g, &[1.0], &[0, 1], &[], 1, 2, 0).unwrap();

    let e = std::f64::consts::E;
    let log_z = (e + 19.0).ln();
    assert!((fx - 2.0 * (log_z - 1.0)).abs() < 1e-12);

    let p_hit = e / (e + 19.0);
    let p_miss = 1.0 / (e + 19.0);
    let (g1, g2, _) = layout.split(&g);
    assert!((g1[0] - (p_hit - 1.0)).abs() < 1e-12);
    assert!((g1[2] - p_miss).abs() < 1e-12);
    assert!((g1[21 + 1] - (p_hit - 1.0)).abs() < 1e-12);
    assert!((g2[ParameterLayout::pair_offset(0, 0, 1)] - (2.0 * p_hit - 2.0)).abs() < 1e-12);
    assert!((g2[ParameterLayout::pair_offset(0, 5, 1)] - p_miss).abs() < 1e-12);
}

#[test]
fn triplet_gradient_counts_observed_matches() {
    // all three triplet symbols observed: g3 = sum of conditionals - 3
    let alignment = Alignment::from_rows(&[vec![0u8, 1, 2]]).unwrap();
    let triplet = SymbolTriplet::new(0, 1, 2, 0, 1, 2, 0.0);
    let objective = TripletPseudoLikelihood::new(
        alignment,
        vec![1.0],
        vec![triplet],
        None,
        EvaluatorConfig::default(),
    )
    .unwrap();
    let x = vec![0.0; objective.nvar()];
    let mut g = vec![0.0; objective.nvar()];
    objective.evaluate(&x, &mut g).unwrap();
    let g3 = g[objective.nvar() - 1];
    assert!((g3 - (3.0 * 0.05 - 3.0)).abs() < 1e-12);
}

#[test]
fn parallel_blocks_agree_with_sequential() {
    let sequential = objective(None, EvaluatorConfig::sequential());
    let parallel = objective(
        None,
        EvaluatorConfig::parallel().with_rows_per_block(5).unwrap(),
    );
    let x = random_parameters(sequential.layout(), 0.4, 13);

    let mut g_seq = vec![0.0; sequential.nvar()];
    let mut g_par = vec![0.0; parallel.nvar()];
    let f_seq = sequential.evaluate(&x, &mut g_seq).unwrap();
    let f_par = parallel.evaluate(&x, &mut g_par).unwrap();

    assert!((f_seq - f_par).abs() <= 1e-9 * f_seq.abs());
    for (a, b) in g_seq.iter().zip(&g_par) {
        assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
    }
}

#[test]
fn flat_entry_point_matches_objective_object() {
    let objective = objective(None, EvaluatorConfig::default());
    let alignment = objective.alignment();
    let mut packed = Vec::new();
    for t in objective.triplets() {
        packed.extend_from_slice(&[t.i, t.j, t.k, t.a as u32, t.b as u32, t.c as u32]);
    }
    let x = random_parameters(objective.layout(), 0.3, 17);

    let mut g_obj = vec![0.0; objective.nvar()];
    let mut g_flat = vec![0.0; objective.nvar()];
    let f_obj = objective.evaluate(&x, &mut g_obj).unwrap();
    let f_flat = evaluate_triplet_pll(
        &x,
        &mut g_flat,
        objective.weights(),
        alignment.as_slice(),
        &packed,
        alignment.nrow(),
        alignment.ncol(),
        objective.triplets().len(),
    )
    .unwrap();
    assert_eq!(f_obj, f_flat);
    assert_eq!(g_obj, g_flat);
}
