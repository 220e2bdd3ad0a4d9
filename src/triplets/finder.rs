use rayon::prelude::*;
use tracing::debug;

use super::record::{by_score, ColumnTriplet, SymbolTriplet, TripletRecord, TripletSelection};
use super::{FinderError, PairTensor};
use crate::alphabet::N_SYMBOLS;
use crate::heap::{BoundedHeap, HeapError};

/// Scoring strategy plugged into the generic top-K search.
///
/// `prepare` runs once per search and may precompute tables from the pair
/// tensor; `candidates` then emits every scored record for one column triple.
pub trait TripletScorer: Sync {
    /// Record type produced by this scorer.
    type Record: TripletRecord;
    /// Per-search precomputed data.
    type Context: Sync;

    /// Precompute per-search data.
    fn prepare(&self, pair: &PairTensor) -> Self::Context;

    /// Emit all scored candidates on columns `i < j < k`.
    fn candidates<F>(
        &self,
        pair: &PairTensor,
        context: &Self::Context,
        columns: [usize; 3],
        emit: F,
    ) -> Result<(), HeapError>
    where
        F: FnMut(Self::Record) -> Result<(), HeapError>;
}

/// Scores each `(i, j, k, a, b, c)` as `w_ij(a,b) + w_ik(a,c) + w_jk(b,c)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolTripletScorer;

impl TripletScorer for SymbolTripletScorer {
    type Record = SymbolTriplet;
    type Context = ();

    fn prepare(&self, _pair: &PairTensor) -> Self::Context {}

    fn candidates<F>(
        &self,
        pair: &PairTensor,
        _context: &Self::Context,
        [i, j, k]: [usize; 3],
        mut emit: F,
    ) -> Result<(), HeapError>
    where
        F: FnMut(Self::Record) -> Result<(), HeapError>,
    {
        for a in 0..N_SYMBOLS {
            for b in 0..N_SYMBOLS {
                let ab = pair.get(i, j, a, b);
                for c in 0..N_SYMBOLS {
                    let score = ab + pair.get(i, k, a, c) + pair.get(j, k, b, c);
                    emit(SymbolTriplet::new(
                        i as u32, j as u32, k as u32, a as u8, b as u8, c as u8, score,
                    ))?;
                }
            }
        }
        Ok(())
    }
}

/// Scores `(i, j, k)` by summing the symbol-triplet score over all non-gap
/// `(a, b, c)`.
///
/// Each pairwise term is independent of the third symbol, so the sum reduces
/// to `20 * (S_ij + S_ik + S_jk)` with `S` the non-gap block sums, which are
/// computed once per search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnTripletScorer;

impl TripletScorer for ColumnTripletScorer {
    type Record = ColumnTriplet;
    /// Non-gap block sums, indexed `i * ncol + j`.
    type Context = Vec<f64>;

    fn prepare(&self, pair: &PairTensor) -> Self::Context {
        let ncol = pair.ncol();
        let mut sums = vec![0.0; ncol * ncol];
        for i in 0..ncol {
            for j in 0..ncol {
                if i != j {
                    sums[i * ncol + j] = pair.block_sum(i, j);
                }
            }
        }
        sums
    }

    fn candidates<F>(
        &self,
        pair: &PairTensor,
        sums: &Self::Context,
        [i, j, k]: [usize; 3],
        mut emit: F,
    ) -> Result<(), HeapError>
    where
        F: FnMut(Self::Record) -> Result<(), HeapError>,
    {
        let ncol = pair.ncol();
        let score =
            N_SYMBOLS as f64 * (sums[i * ncol + j] + sums[i * ncol + k] + sums[j * ncol + k]);
        emit(ColumnTriplet::new(i as u32, j as u32, k as u32, score))
    }
}

/// All column triples `i < j < k` with `j - i >= sep` and `k - j >= sep`
/// whose first column is `i`.
///
/// Offsets saturate, so a separation past `ncol` yields no triples.
fn triples_from(i: usize, ncol: usize, sep: usize) -> impl Iterator<Item = [usize; 3]> {
    (i.saturating_add(sep)..ncol)
        .flat_map(move |j| (j.saturating_add(sep)..ncol).map(move |k| [i, j, k]))
}

/// All valid column triples for `ncol` columns, in lexicographic order.
///
/// A separation of zero is treated as one so that columns stay distinct.
pub fn column_triples(ncol: usize, min_separation: usize) -> impl Iterator<Item = [usize; 3]> {
    let sep = min_separation.max(1);
    (0..ncol).flat_map(move |i| triples_from(i, ncol, sep))
}

type ScoreHeap<R> = BoundedHeap<R, fn(&R, &R) -> std::cmp::Ordering>;

fn new_heap<R: TripletRecord>(capacity: usize) -> Result<ScoreHeap<R>, HeapError> {
    BoundedHeap::with_capacity(capacity, by_score::<R> as fn(&R, &R) -> std::cmp::Ordering)
}

fn offer_triples<S, I>(
    heap: &mut ScoreHeap<S::Record>,
    pair: &PairTensor,
    scorer: &S,
    context: &S::Context,
    triples: I,
) -> Result<(), HeapError>
where
    S: TripletScorer,
    I: Iterator<Item = [usize; 3]>,
{
    for columns in triples {
        scorer.candidates(pair, context, columns, |record| {
            heap.push_over(record).map(|_| ())
        })?;
    }
    Ok(())
}

/// Select the `ntriplets` best-scoring candidates under `scorer`.
///
/// Returns fewer records when fewer candidates exist; an `ncol` too small for
/// any triple yields an empty selection.
pub fn find_triplets<S: TripletScorer>(
    pair: &PairTensor,
    ntriplets: usize,
    min_separation: usize,
    scorer: &S,
) -> Result<TripletSelection<S::Record>, FinderError> {
    debug!(
        ncol = pair.ncol(),
        ntriplets, min_separation, "searching triplet candidates"
    );

    let context = scorer.prepare(pair);
    let mut heap = new_heap::<S::Record>(ntriplets)?;
    offer_triples(
        &mut heap,
        pair,
        scorer,
        &context,
        column_triples(pair.ncol(), min_separation),
    )?;

    let records = heap.into_sorted_vec();
    debug!(
        selected = records.len(),
        best = records.first().map(TripletRecord::score),
        "triplet search finished"
    );
    Ok(TripletSelection::from_sorted(records))
}

/// Parallel variant of [`find_triplets`].
///
/// Candidates are partitioned by their first column; each partition fills a
/// private heap and the partial heaps are reduced pairwise, so live memory
/// scales with the worker count rather than with `ncol`. The retained score
/// multiset equals the sequential result; records with tied scores at the
/// cut-off may differ.
pub fn find_triplets_parallel<S: TripletScorer>(
    pair: &PairTensor,
    ntriplets: usize,
    min_separation: usize,
    scorer: &S,
) -> Result<TripletSelection<S::Record>, FinderError> {
    let ncol = pair.ncol();
    let sep = min_separation.max(1);
    debug!(ncol, ntriplets, min_separation, "searching triplet candidates in parallel");

    let context = scorer.prepare(pair);
    let merged = (0..ncol)
        .into_par_iter()
        .map(|i| -> Result<ScoreHeap<S::Record>, HeapError> {
            let mut heap = new_heap::<S::Record>(ntriplets)?;
            offer_triples(&mut heap, pair, scorer, &context, triples_from(i, ncol, sep))?;
            Ok(heap)
        })
        .try_reduce_with(
            |mut left: ScoreHeap<S::Record>,
             right: ScoreHeap<S::Record>|
             -> Result<ScoreHeap<S::Record>, HeapError> {
                for record in right.into_vec() {
                    left.push_over(record)?;
                }
                Ok(left)
            },
        )
        .transpose()?;

    let records = merged.map_or_else(Vec::new, BoundedHeap::into_sorted_vec);
    debug!(selected = records.len(), "parallel triplet search finished");
    Ok(TripletSelection::from_sorted(records))
}
