use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::finder::{
    find_triplets, find_triplets_parallel, ColumnTripletScorer, SymbolTripletScorer,
};
use super::record::{ColumnTriplet, SymbolTriplet};
use super::{FinderError, PairTensor};
use crate::alphabet::N_SYMBOLS;

/// How candidate triplets are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SelectionStrategy {
    /// Uniform random draws respecting the separation constraint.
    Random,
    /// Best column triplets, expanded to every non-gap symbol combination.
    BestIjk,
    /// Best individual symbol triplets.
    #[default]
    BestIjkabc,
}

/// Element-wise transform applied to the pair tensor before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PairTransform {
    /// Scores use the couplings as given.
    #[default]
    Identity,
    /// Absolute value, ranking strong negative couplings too.
    Abs,
    /// Squared value.
    Square,
}

impl PairTransform {
    /// Transform one coupling value.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Identity => value,
            Self::Abs => value.abs(),
            Self::Square => value * value,
        }
    }
}

/// Parameters of a triplet selection run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionConfig {
    /// Number of triplets to keep (column triplets for `best-ijk`).
    pub ntriplets: usize,
    /// Minimum index distance between neighbouring triplet columns.
    pub min_separation: usize,
    /// Selection strategy.
    pub strategy: SelectionStrategy,
    /// Transform applied to the couplings before scoring.
    pub transform: PairTransform,
    /// Seed for the `random` strategy; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Use the partitioned parallel search.
    pub parallel: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            ntriplets: 1000,
            min_separation: 5,
            strategy: SelectionStrategy::default(),
            transform: PairTransform::default(),
            seed: None,
            parallel: false,
        }
    }
}

impl SelectionConfig {
    /// Set the number of triplets to keep.
    pub fn with_ntriplets(mut self, ntriplets: usize) -> Self {
        self.ntriplets = ntriplets;
        self
    }

    /// Set the minimum column separation.
    pub fn with_min_separation(mut self, min_separation: usize) -> Self {
        self.min_separation = min_separation;
        self
    }

    /// Set the selection strategy.
    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the coupling transform.
    pub fn with_transform(mut self, transform: PairTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enable or disable the parallel search.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Run the configured strategy and return symbol triplets, best first.
///
/// For `random` the order is the draw order and every score is zero.
pub fn select_triplets(
    pair: &PairTensor,
    config: &SelectionConfig,
) -> Result<Vec<SymbolTriplet>, FinderError> {
    info!(
        strategy = %config.strategy,
        transform = %config.transform,
        ntriplets = config.ntriplets,
        min_separation = config.min_separation,
        "selecting triplets"
    );

    if config.strategy == SelectionStrategy::Random {
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        return Ok(pick_random_triplets(
            &mut rng,
            pair.ncol(),
            config.ntriplets,
            config.min_separation,
        ));
    }

    let transformed;
    let scored = if config.transform == PairTransform::Identity {
        pair
    } else {
        let transform = config.transform;
        transformed = pair.map(|v| transform.apply(v));
        &transformed
    };

    let triplets = match (config.strategy, config.parallel) {
        (SelectionStrategy::BestIjk, false) => expand_column_triplets(
            find_triplets(scored, config.ntriplets, config.min_separation, &ColumnTripletScorer)?
                .records(),
        ),
        (SelectionStrategy::BestIjk, true) => expand_column_triplets(
            find_triplets_parallel(
                scored,
                config.ntriplets,
                config.min_separation,
                &ColumnTripletScorer,
            )?
            .records(),
        ),
        (_, false) => {
            find_triplets(scored, config.ntriplets, config.min_separation, &SymbolTripletScorer)?
                .into_records()
        }
        (_, true) => find_triplets_parallel(
            scored,
            config.ntriplets,
            config.min_separation,
            &SymbolTripletScorer,
        )?
        .into_records(),
    };

    debug!(selected = triplets.len(), "triplet selection finished");
    Ok(triplets)
}

/// Draw `ntriplets` random symbol triplets with neighbouring columns at least
/// `min_separation` apart. Returns nothing when `ncol < 2 * sep + 1`, including
/// separations so large that the span overflows.
pub fn pick_random_triplets(
    rng: &mut fastrand::Rng,
    ncol: usize,
    ntriplets: usize,
    min_separation: usize,
) -> Vec<SymbolTriplet> {
    let sep = min_separation.max(1);
    let span = sep.checked_mul(2).and_then(|s| s.checked_add(1));
    if span.map_or(true, |span| ncol < span) {
        return Vec::new();
    }

    (0..ntriplets)
        .map(|_| {
            let i = rng.usize(0..=ncol - 2 * sep - 1);
            let j = rng.usize(i + sep..=ncol - sep - 1);
            let k = rng.usize(j + sep..=ncol - 1);
            let a = rng.u8(0..N_SYMBOLS as u8);
            let b = rng.u8(0..N_SYMBOLS as u8);
            let c = rng.u8(0..N_SYMBOLS as u8);
            SymbolTriplet::new(i as u32, j as u32, k as u32, a, b, c, 0.0)
        })
        .collect()
}

/// Expand each column triplet, in order, into all of its non-gap symbol
/// triplets.
pub fn expand_column_triplets(columns: &[ColumnTriplet]) -> Vec<SymbolTriplet> {
    let mut out = Vec::with_capacity(columns.len() * N_SYMBOLS.pow(3));
    for column in columns {
        out.extend(column.expand());
    }
    out
}
