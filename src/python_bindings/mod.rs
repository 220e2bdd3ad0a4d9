//! Python bindings that expose the triplet finder and objective via PyO3.
//!
//! Arrays cross the boundary as flat lists in the layouts documented on the
//! Rust side: the pair tensor is `ncol x ncol x 21 x 21` row-major, the
//! alignment `nrow x ncol` row-major, triplets packed with six fields each.
use std::str::FromStr;

use pyo3::{exceptions::PyValueError, prelude::*, types::PyModule};

use crate::objective::{evaluate_triplet_pll, ParameterLayout};
use crate::triplets::{
    find_triplets_parallel, select_triplets as run_selection, ColumnTripletScorer, PairTensor,
    PairTransform, SelectionConfig, SelectionStrategy, SymbolTripletScorer, TripletRecord,
};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn pair_tensor(pair: Vec<f64>, ncol: usize) -> PyResult<PairTensor> {
    PairTensor::new(ncol, pair).map_err(value_error)
}

/// Best `(i, j, k, a, b, c)` triplets.
///
/// Returns:
///     `(packed, scores)`: six `u32` fields per triplet and the parallel
///     scores, best first.
#[pyfunction]
#[pyo3(signature = (pair, ncol, ntriplets, min_separation = 5))]
pub fn find_triplet6(
    py: Python<'_>,
    pair: Vec<f64>,
    ncol: usize,
    ntriplets: usize,
    min_separation: usize,
) -> PyResult<(Vec<u32>, Vec<f64>)> {
    let pair = pair_tensor(pair, ncol)?;
    let selection = py
        .allow_threads(|| {
            find_triplets_parallel(&pair, ntriplets, min_separation, &SymbolTripletScorer)
        })
        .map_err(value_error)?;
    Ok((selection.packed(), selection.scores()))
}

/// Best `(i, j, k)` column triplets, scored over all non-gap symbols.
///
/// Returns:
///     `(packed, scores)`: three `u32` fields per triplet and the parallel
///     scores, best first.
#[pyfunction]
#[pyo3(signature = (pair, ncol, ntriplets, min_separation = 5))]
pub fn find_triplet3(
    py: Python<'_>,
    pair: Vec<f64>,
    ncol: usize,
    ntriplets: usize,
    min_separation: usize,
) -> PyResult<(Vec<u32>, Vec<f64>)> {
    let pair = pair_tensor(pair, ncol)?;
    let selection = py
        .allow_threads(|| {
            find_triplets_parallel(&pair, ntriplets, min_separation, &ColumnTripletScorer)
        })
        .map_err(value_error)?;
    Ok((selection.packed(), selection.scores()))
}

/// Run a named selection strategy (`random`, `best-ijk`, `best-ijkabc`)
/// with an optional pair transform (`identity`, `abs`, `square`).
///
/// Returns:
///     `(packed, scores)` with six fields per symbol triplet.
#[pyfunction]
#[pyo3(signature = (
    pair,
    ncol,
    ntriplets,
    min_separation = 5,
    strategy = "best-ijkabc",
    transform = "identity",
    seed = None
))]
#[allow(clippy::too_many_arguments)]
pub fn select_triplets(
    py: Python<'_>,
    pair: Vec<f64>,
    ncol: usize,
    ntriplets: usize,
    min_separation: usize,
    strategy: &str,
    transform: &str,
    seed: Option<u64>,
) -> PyResult<(Vec<u32>, Vec<f64>)> {
    let pair = pair_tensor(pair, ncol)?;
    let mut config = SelectionConfig::default()
        .with_ntriplets(ntriplets)
        .with_min_separation(min_separation)
        .with_strategy(SelectionStrategy::from_str(strategy).map_err(value_error)?)
        .with_transform(PairTransform::from_str(transform).map_err(value_error)?)
        .with_parallel(true);
    config.seed = seed;

    let triplets = py
        .allow_threads(|| run_selection(&pair, &config))
        .map_err(value_error)?;
    let mut packed = Vec::with_capacity(triplets.len() * 6);
    for t in &triplets {
        t.extend_fields(&mut packed);
    }
    Ok((packed, triplets.iter().map(|t| t.score).collect()))
}

/// Objective value and gradient at `x`.
///
/// Returns:
///     `(fx, g)`.
#[pyfunction]
pub fn evaluate(
    py: Python<'_>,
    x: Vec<f64>,
    weights: Vec<f64>,
    msa: Vec<u8>,
    triplets: Vec<u32>,
    nrow: usize,
    ncol: usize,
) -> PyResult<(f64, Vec<f64>)> {
    let ntriplets = triplets.len() / 6;
    let mut g = vec![0.0; ParameterLayout::new(ncol, ntriplets).nvar()];
    let fx = py
        .allow_threads(|| {
            evaluate_triplet_pll(&x, &mut g, &weights, &msa, &triplets, nrow, ncol, ntriplets)
        })
        .map_err(value_error)?;
    Ok((fx, g))
}

/// Create Python module.
#[pymodule]
pub fn triplet_pll(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(find_triplet6, m)?)?;
    m.add_function(wrap_pyfunction!(find_triplet3, m)?)?;
    m.add_function(wrap_pyfunction!(select_triplets, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate, m)?)?;
    Ok(())
}
