//! # Triplet-extended pseudo-likelihood for coevolution models
//!
//! This library fits third-order statistical coupling models to multiple
//! sequence alignments of proteins. It provides the two numerical pieces an
//! optimizer needs:
//!
//! 1. **Triplet selection**: enumerate position/symbol triplets under a
//!    minimum-separation constraint, score them from a pairwise coupling
//!    tensor and keep the top K with a bounded heap.
//! 2. **Objective evaluation**: the negative weighted log pseudo-likelihood of
//!    a model with single-site fields, pairwise couplings and one coupling per
//!    selected triplet, together with its full gradient.
//!
//! ## Usage Example
//!
//! ```no_run
//! use triplet_pll::msa::Alignment;
//! use triplet_pll::objective::{EvaluatorConfig, TripletPseudoLikelihood};
//! use triplet_pll::triplets::{find_triplets, PairTensor, SymbolTripletScorer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ncol = 8;
//! let pair = PairTensor::zeros(ncol);
//! let selection = find_triplets(&pair, 100, 2, &SymbolTripletScorer)?;
//!
//! let alignment = Alignment::new(2, ncol, vec![0u8; 2 * ncol])?;
//! let objective = TripletPseudoLikelihood::new(
//!     alignment,
//!     vec![1.0, 1.0],
//!     selection.into_records(),
//!     None,
//!     EvaluatorConfig::default(),
//! )?;
//!
//! let x = objective.initial_parameters();
//! let mut g = vec![0.0; objective.nvar()];
//! let fx = objective.evaluate(&x, &mut g)?;
//! # let _ = fx;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod alphabet;   // Amino-acid + gap alphabet
pub mod heap;       // Bounded top-K heap
pub mod msa;        // Alignments, weights, counts
pub mod objective;  // Pseudo-likelihood objective and gradient
pub mod triplets;   // Triplet scoring, selection and output
/// Python bindings for exposing the finder and evaluator to external runtimes.
#[cfg(feature = "python-bindings")]
pub mod python_bindings;

// Re-exports for convenience
pub use alphabet::{GAP, N_ALPHA, N_SYMBOLS};
pub use heap::{BoundedHeap, HeapError};
pub use msa::{Alignment, AlignmentError};
pub use objective::{
    evaluate_triplet_pll, EvaluatorConfig, L2Regularization, ObjectiveError, ParameterLayout,
    TripletPseudoLikelihood,
};
pub use triplets::{
    find_triplets, find_triplets_parallel, select_triplets, ColumnTriplet, ColumnTripletScorer,
    FinderError, PairTensor, PairTransform, SelectionConfig, SelectionStrategy, SymbolTriplet,
    SymbolTripletScorer, TripletSelection,
};
