use super::blocks::{evaluate_rows, EvaluatorConfig};
use super::layout::ParameterLayout;
use super::{try_zeroed, ObjectiveError};
use crate::alphabet::{GAP, N_ALPHA, N_SYMBOLS};
use crate::msa::Alignment;
use crate::triplets::{SymbolTriplet, TripletRecord};

/// Per-row working buffers: potentials, log partition functions and
/// conditional probabilities for every column.
#[derive(Debug)]
pub(crate) struct Scratch {
    sum_pot: Vec<f64>,
    log_z: Vec<f64>,
    p_cond: Vec<f64>,
}

impl Scratch {
    pub(crate) fn try_new(ncol: usize) -> Result<Self, ObjectiveError> {
        Ok(Self {
            sum_pot: try_zeroed(ncol * N_ALPHA)?,
            log_z: try_zeroed(ncol)?,
            p_cond: try_zeroed(ncol * N_ALPHA)?,
        })
    }

    #[inline]
    fn pot(&self, i: usize, a: usize) -> f64 {
        self.sum_pot[i * N_ALPHA + a]
    }

    #[inline]
    fn pot_mut(&mut self, i: usize, a: usize) -> &mut f64 {
        &mut self.sum_pot[i * N_ALPHA + a]
    }

    #[inline]
    fn p(&self, i: usize, a: usize) -> f64 {
        self.p_cond[i * N_ALPHA + a]
    }
}

/// Add the contribution of one weighted row to `fx` and `g`.
///
/// `g` is accumulated into, not reset; gap entries are left dirty and must be
/// cleared with [`zero_gap_gradient`] once all rows are in.
#[allow(clippy::too_many_arguments)]
pub(crate) fn accumulate_row(
    layout: &ParameterLayout,
    x: &[f64],
    triplets: &[SymbolTriplet],
    row: &[u8],
    weight: f64,
    scratch: &mut Scratch,
    fx: &mut f64,
    g: &mut [f64],
) {
    let ncol = layout.ncol();
    let (x1, x2, x3) = layout.split(x);

    // potentials
    scratch.sum_pot.fill(0.0);
    for i in 0..ncol {
        for a in 0..N_SYMBOLS {
            *scratch.pot_mut(i, a) = x1[ParameterLayout::single_offset(i, a)];
        }
    }

    for (ij, (i, j)) in layout.pairs().enumerate() {
        let (xi, xj) = (row[i] as usize, row[j] as usize);
        for a in 0..N_SYMBOLS {
            *scratch.pot_mut(i, a) += x2[ParameterLayout::pair_offset(ij, a, xj)];
            *scratch.pot_mut(j, a) += x2[ParameterLayout::pair_offset(ij, xi, a)];
        }
    }

    for (t, triplet) in triplets.iter().enumerate() {
        let [i, j, k] = triplet.columns().map(|c| c as usize);
        let [a, b, c] = triplet.symbols();
        let (hit_i, hit_j, hit_k) = (row[i] == a, row[j] == b, row[k] == c);
        if hit_j && hit_k {
            *scratch.pot_mut(i, a as usize) += x3[t];
        }
        if hit_i && hit_k {
            *scratch.pot_mut(j, b as usize) += x3[t];
        }
        if hit_i && hit_j {
            *scratch.pot_mut(k, c as usize) += x3[t];
        }
    }

    for i in 0..ncol {
        *scratch.pot_mut(i, GAP as usize) = 0.0;
    }

    // log partition functions over the non-gap symbols
    for i in 0..ncol {
        let z: f64 = (0..N_SYMBOLS).map(|a| scratch.pot(i, a).exp()).sum();
        scratch.log_z[i] = z.ln();
    }

    scratch.p_cond.fill(0.0);
    for i in 0..ncol {
        for a in 0..N_SYMBOLS {
            scratch.p_cond[i * N_ALPHA + a] = (scratch.pot(i, a) - scratch.log_z[i]).exp();
        }
    }

    let (g1, g2, g3) = layout.split_mut(g);

    for (i, &obs) in row.iter().enumerate() {
        let log_z = scratch.log_z[i];
        *fx -= weight * (scratch.pot(i, obs as usize) - log_z);
        if obs == GAP {
            // gap positions contribute nothing
            *fx -= weight * log_z;
            scratch.p_cond[i * N_ALPHA..(i + 1) * N_ALPHA].fill(0.0);
        } else {
            g1[ParameterLayout::single_offset(i, obs as usize)] -= weight;
        }
    }

    for i in 0..ncol {
        for a in 0..N_SYMBOLS {
            g1[ParameterLayout::single_offset(i, a)] += weight * scratch.p(i, a);
        }
    }

    for (ij, (i, j)) in layout.pairs().enumerate() {
        let (xi, xj) = (row[i] as usize, row[j] as usize);
        g2[ParameterLayout::pair_offset(ij, xi, xj)] -= weight * 2.0;
        for a in 0..N_SYMBOLS {
            g2[ParameterLayout::pair_offset(ij, a, xj)] += weight * scratch.p(i, a);
            g2[ParameterLayout::pair_offset(ij, xi, a)] += weight * scratch.p(j, a);
        }
    }

    for (t, triplet) in triplets.iter().enumerate() {
        let [i, j, k] = triplet.columns().map(|c| c as usize);
        let [a, b, c] = triplet.symbols();
        let (hit_i, hit_j, hit_k) = (row[i] == a, row[j] == b, row[k] == c);
        if hit_j && hit_k {
            g3[t] += weight * scratch.p(i, a as usize);
        }
        if hit_i && hit_k {
            g3[t] += weight * scratch.p(j, b as usize);
        }
        if hit_i && hit_j {
            g3[t] += weight * scratch.p(k, c as usize);
        }
        if hit_i && hit_j && hit_k {
            g3[t] -= weight * 3.0;
        }
    }
}

/// Force every gap entry of the `x1` and `x2` gradient segments to zero.
pub(crate) fn zero_gap_gradient(layout: &ParameterLayout, g: &mut [f64]) {
    let gap = GAP as usize;
    let (g1, g2, _) = layout.split_mut(g);
    for i in 0..layout.ncol() {
        g1[ParameterLayout::single_offset(i, gap)] = 0.0;
    }
    for ij in 0..layout.npairs() {
        for a in 0..N_ALPHA {
            g2[ParameterLayout::pair_offset(ij, a, gap)] = 0.0;
            g2[ParameterLayout::pair_offset(ij, gap, a)] = 0.0;
        }
    }
}

/// Check triplet columns against `ncol` and their symbols against the
/// alphabet.
pub(crate) fn validate_triplets(
    triplets: &[SymbolTriplet],
    ncol: usize,
) -> Result<(), ObjectiveError> {
    for (t, triplet) in triplets.iter().enumerate() {
        let [i, j, k] = triplet.columns();
        if [i, j, k].iter().any(|&c| c as usize >= ncol) {
            return Err(ObjectiveError::InvalidInput(format!(
                "triplet {t} references column outside [0, {ncol}): ({i}, {j}, {k})"
            )));
        }
        if i == j || i == k || j == k {
            return Err(ObjectiveError::InvalidInput(format!(
                "triplet {t} repeats a column: ({i}, {j}, {k})"
            )));
        }
        if triplet.symbols().iter().any(|&s| s as usize >= N_ALPHA) {
            return Err(ObjectiveError::InvalidInput(format!(
                "triplet {t} has a symbol outside the alphabet: {:?}",
                triplet.symbols()
            )));
        }
    }
    Ok(())
}

/// Decode a packed `u32` triplet array with six fields `(i, j, k, a, b, c)`
/// per triplet, validating it against `ncol`.
pub fn parse_triplets(
    packed: &[u32],
    ntriplets: usize,
    ncol: usize,
) -> Result<Vec<SymbolTriplet>, ObjectiveError> {
    if packed.len() != ntriplets * 6 {
        return Err(ObjectiveError::InvalidInput(format!(
            "triplet array has {} entries, expected 6 x {ntriplets}",
            packed.len()
        )));
    }
    let mut triplets = Vec::with_capacity(ntriplets);
    for (t, fields) in packed.chunks_exact(6).enumerate() {
        let symbol = |v: u32| {
            u8::try_from(v).map_err(|_| {
                ObjectiveError::InvalidInput(format!(
                    "triplet {t} has a symbol outside the alphabet: {v}"
                ))
            })
        };
        triplets.push(SymbolTriplet::new(
            fields[0],
            fields[1],
            fields[2],
            symbol(fields[3])?,
            symbol(fields[4])?,
            symbol(fields[5])?,
            0.0,
        ));
    }
    validate_triplets(&triplets, ncol)?;
    Ok(triplets)
}

/// Evaluate the objective on flat arrays, writing the gradient into `g`.
///
/// * `x`, `g`: parameter and gradient vectors of length
///   [`ParameterLayout::nvar`]; `g` is fully overwritten;
/// * `weights`: one non-negative weight per row;
/// * `msa`: row-major `nrow x ncol` symbol codes;
/// * `triplets`: `6 * ntriplets` packed fields `(i, j, k, a, b, c)`.
///
/// Returns the objective value. Rows are processed sequentially in order.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_triplet_pll(
    x: &[f64],
    g: &mut [f64],
    weights: &[f64],
    msa: &[u8],
    triplets: &[u32],
    nrow: usize,
    ncol: usize,
    ntriplets: usize,
) -> Result<f64, ObjectiveError> {
    Alignment::validate(nrow, ncol, msa)?;
    crate::msa::validate_weights(weights, nrow)?;
    let triplets = parse_triplets(triplets, ntriplets, ncol)?;
    let layout = ParameterLayout::new(ncol, ntriplets);
    layout.check_len(x, "parameter vector")?;
    layout.check_len(g, "gradient vector")?;

    evaluate_rows(
        &layout,
        x,
        g,
        msa,
        weights,
        &triplets,
        &EvaluatorConfig::sequential(),
    )
}
