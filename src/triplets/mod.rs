//! Triplet candidate scoring and top-K selection.
//!
//! Candidates are position triplets `i < j < k` (optionally with one symbol
//! per position) whose pairwise separations are at least `min_separation`.
//! Each candidate is scored from a dense pairwise coupling tensor, offered to
//! a [`BoundedHeap`](crate::heap::BoundedHeap) of capacity `ntriplets`, and
//! the survivors are returned sorted by descending score.
//!
//! Scoring is pluggable through [`TripletScorer`]:
//!
//! * [`SymbolTripletScorer`] scores every `(i, j, k, a, b, c)` as
//!   `w_ij(a,b) + w_ik(a,c) + w_jk(b,c)`;
//! * [`ColumnTripletScorer`] scores `(i, j, k)` by summing that quantity over
//!   all non-gap `(a, b, c)`.

mod finder;
mod pair;
mod record;
mod strategy;
mod write;

pub use finder::{
    column_triples, find_triplets, find_triplets_parallel, ColumnTripletScorer,
    SymbolTripletScorer, TripletScorer,
};
pub use pair::PairTensor;
pub use record::{by_score, ColumnTriplet, SymbolTriplet, TripletRecord, TripletSelection};
pub use strategy::{
    expand_column_triplets, pick_random_triplets, select_triplets, PairTransform,
    SelectionConfig, SelectionStrategy,
};
pub use write::{write_triplet_table, write_triplets};

use crate::heap::HeapError;
use thiserror::Error;

/// Errors raised while scoring or selecting triplets.
#[derive(Debug, Error)]
pub enum FinderError {
    /// Inputs are inconsistent (e.g. tensor length does not match `ncol`).
    #[error("invalid finder input: {0}")]
    InvalidInput(String),

    /// Error propagated from the top-K heap.
    #[error("heap error: {0}")]
    Heap(#[from] HeapError),
}
