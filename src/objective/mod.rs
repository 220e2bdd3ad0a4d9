//! Negative weighted log pseudo-likelihood of the triplet-extended model.
//!
//! The parameter vector concatenates three segments (see
//! [`ParameterLayout`]):
//!
//! * `x1`: one field per column and symbol, `ncol x 21`;
//! * `x2`: one `21 x 21` coupling block per column pair `i < j`;
//! * `x3`: one scalar coupling per selected symbol triplet.
//!
//! [`evaluate_triplet_pll`] is the flat-array entry point. Most callers go
//! through [`TripletPseudoLikelihood`], which owns the alignment, weights,
//! triplets and optional [`L2Regularization`], and evaluates rows in blocks
//! configured by [`EvaluatorConfig`].

mod blocks;
mod evaluator;
mod layout;
pub mod numdiff;
mod pll;
mod regularization;

pub use blocks::{BlockContext, EvaluatorConfig};
pub use evaluator::{evaluate_triplet_pll, parse_triplets};
pub use layout::ParameterLayout;
pub use pll::TripletPseudoLikelihood;
pub use regularization::L2Regularization;

use std::collections::TryReserveError;

use thiserror::Error;

use crate::msa::AlignmentError;

/// Errors raised while evaluating the objective.
#[derive(Debug, Error)]
pub enum ObjectiveError {
    /// Array lengths, triplet definitions or configuration are inconsistent.
    #[error("invalid objective input: {0}")]
    InvalidInput(String),

    /// A scratch or gradient buffer could not be allocated.
    #[error("failed to allocate {requested} values: {source}")]
    Allocation {
        /// Number of `f64` values requested.
        requested: usize,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },

    /// Alignment or weights are malformed.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

/// Allocate a zeroed buffer, reporting allocation failure as an error.
pub(crate) fn try_zeroed(len: usize) -> Result<Vec<f64>, ObjectiveError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|source| ObjectiveError::Allocation {
            requested: len,
            source,
        })?;
    buffer.resize(len, 0.0);
    Ok(buffer)
}
