#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::layout::ParameterLayout;
use super::ObjectiveError;
use crate::alphabet::{GAP, N_ALPHA, N_SYMBOLS};

/// Quadratic penalty on fields, couplings and triplet couplings.
///
/// `fx += λs·Σ(x1 − c)² + λp·Σx2² + λt·Σx3²` over the non-gap entries, so
/// gap entries of the gradient stay exactly zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct L2Regularization {
    /// Weight of the single-field penalty.
    pub lambda_single: f64,
    /// Weight of the pair-coupling penalty.
    pub lambda_pair: f64,
    /// Weight of the triplet-coupling penalty.
    pub lambda_triplet: f64,
    /// Optional centre for `x1`, laid out like the `x1` segment.
    pub center_single: Option<Vec<f64>>,
}

impl Default for L2Regularization {
    fn default() -> Self {
        Self {
            lambda_single: 10.0,
            lambda_pair: 0.2,
            lambda_triplet: 0.2,
            center_single: None,
        }
    }
}

impl L2Regularization {
    /// Penalty with the given weights and no centring.
    pub fn new(lambda_single: f64, lambda_pair: f64, lambda_triplet: f64) -> Self {
        Self {
            lambda_single,
            lambda_pair,
            lambda_triplet,
            center_single: None,
        }
    }

    /// Centre the single fields on `center`.
    pub fn with_center(mut self, center: Vec<f64>) -> Self {
        self.center_single = Some(center);
        self
    }

    /// Centre derived from weighted single counts (`ncol x 21`): per column,
    /// the log of the pseudocounted non-gap frequencies minus their mean.
    /// Gap entries are zero.
    pub fn center_from_counts(single_counts: &[f64], pseudocount: f64) -> Vec<f64> {
        let mut center = vec![0.0; single_counts.len()];
        for (counts, out) in single_counts
            .chunks_exact(N_ALPHA)
            .zip(center.chunks_exact_mut(N_ALPHA))
        {
            let total: f64 =
                counts[..N_SYMBOLS].iter().sum::<f64>() + pseudocount * N_SYMBOLS as f64;
            for a in 0..N_SYMBOLS {
                out[a] = ((counts[a] + pseudocount) / total).ln();
            }
            let mean = out[..N_SYMBOLS].iter().sum::<f64>() / N_SYMBOLS as f64;
            for v in &mut out[..N_SYMBOLS] {
                *v -= mean;
            }
        }
        center
    }

    /// Check the centre, when present, against `layout`.
    pub(crate) fn validate(&self, layout: &ParameterLayout) -> Result<(), ObjectiveError> {
        let finite = [self.lambda_single, self.lambda_pair, self.lambda_triplet]
            .iter()
            .all(|l| l.is_finite() && *l >= 0.0);
        if !finite {
            return Err(ObjectiveError::InvalidInput(
                "regularization coefficients must be finite and non-negative".to_string(),
            ));
        }
        if let Some(center) = &self.center_single {
            if center.len() != layout.single_len() {
                return Err(ObjectiveError::InvalidInput(format!(
                    "single-field centre has {} entries, expected {}",
                    center.len(),
                    layout.single_len()
                )));
            }
        }
        Ok(())
    }

    /// Add the penalty to `fx` and its gradient to `g`.
    pub fn apply(&self, layout: &ParameterLayout, x: &[f64], g: &mut [f64]) -> f64 {
        let (x1, x2, x3) = layout.split(x);
        let (g1, g2, g3) = layout.split_mut(g);
        let gap = GAP as usize;
        let mut fx = 0.0;

        for (idx, (&x, g)) in x1.iter().zip(g1.iter_mut()).enumerate() {
            if idx % N_ALPHA == gap {
                continue;
            }
            let offset = x - self.center_single.as_ref().map_or(0.0, |c| c[idx]);
            fx += self.lambda_single * offset * offset;
            *g += 2.0 * self.lambda_single * offset;
        }

        for (idx, (&x, g)) in x2.iter().zip(g2.iter_mut()).enumerate() {
            let (a, b) = ((idx / N_ALPHA) % N_ALPHA, idx % N_ALPHA);
            if a == gap || b == gap {
                continue;
            }
            fx += self.lambda_pair * x * x;
            *g += 2.0 * self.lambda_pair * x;
        }

        for (&x, g) in x3.iter().zip(g3.iter_mut()) {
            fx += self.lambda_triplet * x * x;
            *g += 2.0 * self.lambda_triplet * x;
        }

        fx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_skips_gap_entries() {
        let layout = ParameterLayout::new(2, 1);
        let x = vec![1.0; layout.nvar()];
        let mut g = vec![0.0; layout.nvar()];
        let reg = L2Regularization::new(1.0, 0.5, 2.0);
        let fx = reg.apply(&layout, &x, &mut g);

        let expected = 2.0 * 20.0 + 0.5 * 400.0 + 2.0;
        assert!((fx - expected).abs() < 1e-12);
        assert_eq!(g[GAP as usize], 0.0);
        assert_eq!(g[0], 2.0);
        let (_, g2, g3) = layout.split(&g);
        assert_eq!(g2[ParameterLayout::pair_offset(0, 3, GAP as usize)], 0.0);
        assert_eq!(g2[ParameterLayout::pair_offset(0, 3, 4)], 1.0);
        assert_eq!(g3, &[4.0]);
    }

    #[test]
    fn centre_shifts_single_penalty() {
        let layout = ParameterLayout::new(1, 0);
        let center: Vec<f64> = (0..N_ALPHA).map(|a| a as f64).collect();
        let reg = L2Regularization::new(1.0, 0.0, 0.0).with_center(center.clone());
        let mut g = vec![0.0; layout.nvar()];
        assert_eq!(reg.apply(&layout, &center, &mut g), 0.0);
        assert!(g.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn centre_from_counts_has_zero_mean() {
        let mut counts = vec![0.0; N_ALPHA];
        counts[0] = 10.0;
        counts[GAP as usize] = 5.0;
        let center = L2Regularization::center_from_counts(&counts, 1.0);
        let mean: f64 = center[..N_SYMBOLS].iter().sum::<f64>() / N_SYMBOLS as f64;
        assert!(mean.abs() < 1e-12);
        assert!(center[0] > center[1]);
        assert_eq!(center[GAP as usize], 0.0);
    }

    #[test]
    fn validation_checks_centre_length() {
        let layout = ParameterLayout::new(2, 0);
        assert!(L2Regularization::default().validate(&layout).is_ok());
        let bad = L2Regularization::default().with_center(vec![0.0; 3]);
        assert!(bad.validate(&layout).is_err());
    }
}
