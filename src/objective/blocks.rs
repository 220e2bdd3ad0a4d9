use std::ops::Range;

use rayon::prelude::*;
use tracing::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::evaluator::{accumulate_row, zero_gap_gradient, Scratch};
use super::layout::ParameterLayout;
use super::{try_zeroed, ObjectiveError};
use crate::triplets::SymbolTriplet;

/// Row-blocking configuration for objective evaluation.
///
/// Rows are split into contiguous blocks. Sequential evaluation visits the
/// blocks in order with a single accumulator, so its result does not depend
/// on the block size. Parallel evaluation gives every block private
/// accumulators and sums the partial results in block order, which makes it
/// deterministic for a fixed block size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvaluatorConfig {
    /// Rows per block; `None` splits rows evenly across the rayon pool.
    pub rows_per_block: Option<usize>,
    /// Evaluate blocks on the rayon pool.
    pub parallel: bool,
}

impl EvaluatorConfig {
    /// Sequential evaluation in row order.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Parallel evaluation with automatically sized blocks.
    pub fn parallel() -> Self {
        Self {
            rows_per_block: None,
            parallel: true,
        }
    }

    /// Set an explicit block size.
    pub fn with_rows_per_block(mut self, rows_per_block: usize) -> Result<Self, ObjectiveError> {
        if rows_per_block == 0 {
            return Err(ObjectiveError::InvalidInput(
                "rows per block must be > 0".to_string(),
            ));
        }
        self.rows_per_block = Some(rows_per_block);
        Ok(self)
    }

    /// Enable or disable parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Effective block size for `nrow` rows.
    pub fn block_size(&self, nrow: usize) -> usize {
        self.rows_per_block
            .unwrap_or_else(|| nrow.div_ceil(rayon::current_num_threads()))
            .max(1)
    }

    /// Number of blocks covering `nrow` rows.
    pub fn num_blocks(&self, nrow: usize) -> usize {
        nrow.div_ceil(self.block_size(nrow))
    }

    /// Context of block `block_id` (1-indexed) for `nrow` rows.
    pub fn block_context(
        &self,
        nrow: usize,
        block_id: usize,
    ) -> Result<BlockContext, ObjectiveError> {
        let num_blocks = self.num_blocks(nrow);
        if block_id == 0 || block_id > num_blocks {
            return Err(ObjectiveError::InvalidInput(format!(
                "block id {block_id} out of range (max {num_blocks})"
            )));
        }
        let block_size = self.block_size(nrow);
        let start = (block_id - 1) * block_size;
        let end = (start + block_size).min(nrow);
        Ok(BlockContext {
            block_id,
            range: start..end,
        })
    }

    /// All block contexts for `nrow` rows, in order.
    pub fn blocks(&self, nrow: usize) -> impl Iterator<Item = BlockContext> {
        let block_size = self.block_size(nrow);
        (0..self.num_blocks(nrow)).map(move |b| {
            let start = b * block_size;
            BlockContext {
                block_id: b + 1,
                range: start..(start + block_size).min(nrow),
            }
        })
    }
}

/// Rows covered by one evaluation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockContext {
    /// 1-indexed block identifier.
    pub block_id: usize,
    /// Row range covered by the block.
    pub range: Range<usize>,
}

impl BlockContext {
    /// Number of rows in the block.
    pub fn len(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Whether the block covers no rows.
    pub fn is_empty(&self) -> bool {
        self.range.end <= self.range.start
    }
}

/// Evaluate the objective over all rows of `msa`.
///
/// Inputs must already be validated against `layout`. `g` is overwritten.
pub(crate) fn evaluate_rows(
    layout: &ParameterLayout,
    x: &[f64],
    g: &mut [f64],
    msa: &[u8],
    weights: &[f64],
    triplets: &[SymbolTriplet],
    config: &EvaluatorConfig,
) -> Result<f64, ObjectiveError> {
    let nrow = weights.len();
    let ncol = layout.ncol();
    let row = |n: usize| &msa[n * ncol..(n + 1) * ncol];

    g.fill(0.0);
    let mut fx = 0.0;

    if !config.parallel || config.num_blocks(nrow) <= 1 {
        let mut scratch = Scratch::try_new(ncol)?;
        for n in 0..nrow {
            accumulate_row(layout, x, triplets, row(n), weights[n], &mut scratch, &mut fx, g);
        }
        zero_gap_gradient(layout, g);
        return Ok(fx);
    }

    let blocks: Vec<BlockContext> = config.blocks(nrow).collect();
    debug!(
        nrow,
        blocks = blocks.len(),
        block_size = config.block_size(nrow),
        nvar = layout.nvar(),
        "evaluating objective in parallel row blocks"
    );

    let partials = blocks
        .into_par_iter()
        .map(|block| {
            let mut scratch = Scratch::try_new(ncol)?;
            let mut partial_g = try_zeroed(layout.nvar())?;
            let mut partial_fx = 0.0;
            for n in block.range.clone() {
                accumulate_row(
                    layout,
                    x,
                    triplets,
                    row(n),
                    weights[n],
                    &mut scratch,
                    &mut partial_fx,
                    &mut partial_g,
                );
            }
            trace!(block = block.block_id, rows = block.len(), "block evaluated");
            Ok((partial_fx, partial_g))
        })
        .collect::<Result<Vec<_>, ObjectiveError>>()?;

    for (partial_fx, partial_g) in partials {
        fx += partial_fx;
        for (total, part) in g.iter_mut().zip(&partial_g) {
            *total += part;
        }
    }
    zero_gap_gradient(layout, g);
    Ok(fx)
}
