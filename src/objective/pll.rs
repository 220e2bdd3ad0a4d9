use tracing::debug;

use super::blocks::{evaluate_rows, EvaluatorConfig};
use super::evaluator::validate_triplets;
use super::layout::ParameterLayout;
use super::regularization::L2Regularization;
use super::ObjectiveError;
use crate::msa::{validate_weights, Alignment};
use crate::triplets::SymbolTriplet;

/// Triplet-extended pseudo-likelihood objective bound to one alignment.
///
/// Construction validates every input once; [`Self::evaluate`] then only
/// checks vector lengths.
#[derive(Debug, Clone)]
pub struct TripletPseudoLikelihood {
    alignment: Alignment,
    weights: Vec<f64>,
    triplets: Vec<SymbolTriplet>,
    regularization: Option<L2Regularization>,
    config: EvaluatorConfig,
    layout: ParameterLayout,
}

impl TripletPseudoLikelihood {
    /// Bind the objective to an alignment, its row weights and the selected
    /// triplets.
    pub fn new(
        alignment: Alignment,
        weights: Vec<f64>,
        triplets: Vec<SymbolTriplet>,
        regularization: Option<L2Regularization>,
        config: EvaluatorConfig,
    ) -> Result<Self, ObjectiveError> {
        validate_weights(&weights, alignment.nrow())?;
        validate_triplets(&triplets, alignment.ncol())?;
        let layout = ParameterLayout::new(alignment.ncol(), triplets.len());
        if let Some(regularization) = &regularization {
            regularization.validate(&layout)?;
        }

        debug!(
            nrow = alignment.nrow(),
            ncol = alignment.ncol(),
            ntriplets = triplets.len(),
            nvar = layout.nvar(),
            regularized = regularization.is_some(),
            "triplet pseudo-likelihood ready"
        );

        Ok(Self {
            alignment,
            weights,
            triplets,
            regularization,
            config,
            layout,
        })
    }

    /// Parameter layout.
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Number of parameters.
    pub fn nvar(&self) -> usize {
        self.layout.nvar()
    }

    /// Bound alignment.
    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Row weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Triplets whose couplings occupy the `x3` segment, in order.
    pub fn triplets(&self) -> &[SymbolTriplet] {
        &self.triplets
    }

    /// Starting point: zeros, with single fields set to the regularization
    /// centre when one is configured.
    pub fn initial_parameters(&self) -> Vec<f64> {
        let mut x = vec![0.0; self.nvar()];
        if let Some(center) = self
            .regularization
            .as_ref()
            .and_then(|r| r.center_single.as_ref())
        {
            let (x1, _, _) = self.layout.split_mut(&mut x);
            x1.copy_from_slice(center);
        }
        x
    }

    /// Objective value at `x`; the gradient is written to `g`.
    pub fn evaluate(&self, x: &[f64], g: &mut [f64]) -> Result<f64, ObjectiveError> {
        self.layout.check_len(x, "parameter vector")?;
        self.layout.check_len(g, "gradient vector")?;

        let mut fx = evaluate_rows(
            &self.layout,
            x,
            g,
            self.alignment.as_slice(),
            &self.weights,
            &self.triplets,
            &self.config,
        )?;
        if let Some(regularization) = &self.regularization {
            fx += regularization.apply(&self.layout, x, g);
        }
        Ok(fx)
    }
}
