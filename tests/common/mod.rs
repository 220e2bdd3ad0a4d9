#![allow(dead_code)]

use triplet_pll::alphabet::{GAP, N_SYMBOLS};
use triplet_pll::msa::Alignment;
use triplet_pll::objective::ParameterLayout;
use triplet_pll::triplets::{PairTensor, SymbolTriplet};

/// Random alignment over a small alphabet subset so that pairs and triplets
/// recur across rows; roughly one cell in ten is a gap.
pub fn synthetic_alignment(nrow: usize, ncol: usize, seed: u64) -> Alignment {
    let mut rng = fastrand::Rng::with_seed(seed);
    let data = (0..nrow * ncol)
        .map(|_| {
            if rng.u8(0..10) == 0 {
                GAP
            } else {
                rng.u8(0..4)
            }
        })
        .collect();
    Alignment::new(nrow, ncol, data).expect("synthetic alignment is valid")
}

/// Random weights in `[0.5, 1.5)`.
pub fn synthetic_weights(nrow: usize, seed: u64) -> Vec<f64> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..nrow).map(|_| 0.5 + rng.f64()).collect()
}

/// Random parameters in `[-scale, scale)`.
pub fn random_parameters(layout: &ParameterLayout, scale: f64, seed: u64) -> Vec<f64> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..layout.nvar())
        .map(|_| scale * (2.0 * rng.f64() - 1.0))
        .collect()
}

/// Triplets read off the non-gap cells of the first rows, so each matches at
/// least one row.
pub fn matching_triplets(alignment: &Alignment, columns: &[[usize; 3]]) -> Vec<SymbolTriplet> {
    let mut triplets = Vec::new();
    for (n, &[i, j, k]) in columns.iter().enumerate() {
        let row = alignment.row(n % alignment.nrow());
        let symbol = |c: usize| if row[c] == GAP { 0 } else { row[c] };
        triplets.push(SymbolTriplet::new(
            i as u32,
            j as u32,
            k as u32,
            symbol(i),
            symbol(j),
            symbol(k),
            0.0,
        ));
    }
    triplets
}

/// Symmetric pair tensor with pseudo-random non-gap couplings.
pub fn random_pair_tensor(ncol: usize, seed: u64) -> PairTensor {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut pair = PairTensor::zeros(ncol);
    for i in 0..ncol {
        for j in (i + 1)..ncol {
            for a in 0..N_SYMBOLS {
                for b in 0..N_SYMBOLS {
                    pair.set_symmetric(i, j, a, b, 2.0 * rng.f64() - 1.0);
                }
            }
        }
    }
    pair
}

/// Indices of non-gap parameters, sampled with a stride.
pub fn non_gap_indices(layout: &ParameterLayout, stride: usize) -> Vec<usize> {
    let gap = GAP as usize;
    let single = layout.single_len();
    let pair = layout.pair_len();
    (0..layout.nvar())
        .step_by(stride.max(1))
        .filter(|&idx| {
            if idx < single {
                idx % 21 != gap
            } else if idx < single + pair {
                let off = idx - single;
                (off / 21) % 21 != gap && off % 21 != gap
            } else {
                true
            }
        })
        .chain(single + pair..layout.nvar())
        .collect()
}

/// Whether every gap entry of the `x1` and `x2` gradient segments is zero.
pub fn gap_entries_are_zero(layout: &ParameterLayout, g: &[f64]) -> bool {
    let gap = GAP as usize;
    let (g1, g2, _) = layout.split(g);
    let singles = g1.chunks_exact(21).all(|col| col[gap] == 0.0);
    let pairs = g2.chunks_exact(21 * 21).all(|block| {
        (0..21).all(|a| block[a * 21 + gap] == 0.0 && block[gap * 21 + a] == 0.0)
    });
    singles && pairs
}
