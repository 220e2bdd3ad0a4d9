use super::ObjectiveError;
use crate::alphabet::N_ALPHA;
use crate::triplets::PairTensor;

/// Index arithmetic for the flat parameter and gradient vectors.
///
/// Layout: `x1[i * 21 + a]`, then `x2[(ij * 21 + a) * 21 + b]` where `ij`
/// enumerates column pairs `i < j` in row-major upper-triangular order, then
/// `x3[t]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterLayout {
    ncol: usize,
    ntriplets: usize,
}

impl ParameterLayout {
    /// Layout for `ncol` columns and `ntriplets` triplet couplings.
    pub fn new(ncol: usize, ntriplets: usize) -> Self {
        Self { ncol, ntriplets }
    }

    /// Number of alignment columns.
    pub fn ncol(&self) -> usize {
        self.ncol
    }

    /// Number of triplet couplings.
    pub fn ntriplets(&self) -> usize {
        self.ntriplets
    }

    /// Number of column pairs `i < j`.
    pub fn npairs(&self) -> usize {
        self.ncol * self.ncol.saturating_sub(1) / 2
    }

    /// Length of the `x1` segment.
    pub fn single_len(&self) -> usize {
        self.ncol * N_ALPHA
    }

    /// Length of the `x2` segment.
    pub fn pair_len(&self) -> usize {
        self.npairs() * N_ALPHA * N_ALPHA
    }

    /// Total number of parameters.
    pub fn nvar(&self) -> usize {
        self.single_len() + self.pair_len() + self.ntriplets
    }

    /// Position of the pair `(i, j)`, `i < j`, in the pair enumeration.
    #[inline]
    pub fn pair_index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < j && j < self.ncol);
        i * self.ncol - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Column pairs `(i, j)` in pair-index order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        let ncol = self.ncol;
        (0..ncol).flat_map(move |i| ((i + 1)..ncol).map(move |j| (i, j)))
    }

    /// Offset of `x1[i, a]` within the `x1` segment.
    #[inline]
    pub fn single_offset(i: usize, a: usize) -> usize {
        i * N_ALPHA + a
    }

    /// Offset of `x2[ij, a, b]` within the `x2` segment.
    #[inline]
    pub fn pair_offset(ij: usize, a: usize, b: usize) -> usize {
        (ij * N_ALPHA + a) * N_ALPHA + b
    }

    /// Check that `values` has exactly [`Self::nvar`] entries.
    pub fn check_len(&self, values: &[f64], name: &str) -> Result<(), ObjectiveError> {
        if values.len() != self.nvar() {
            return Err(ObjectiveError::InvalidInput(format!(
                "{name} has {} entries, expected {} (ncol = {}, ntriplets = {})",
                values.len(),
                self.nvar(),
                self.ncol,
                self.ntriplets
            )));
        }
        Ok(())
    }

    /// Split a full vector into its `(x1, x2, x3)` segments.
    pub fn split<'a>(&self, values: &'a [f64]) -> (&'a [f64], &'a [f64], &'a [f64]) {
        let (single, rest) = values.split_at(self.single_len());
        let (pair, triplet) = rest.split_at(self.pair_len());
        (single, pair, triplet)
    }

    /// Mutable counterpart of [`Self::split`].
    pub fn split_mut<'a>(
        &self,
        values: &'a mut [f64],
    ) -> (&'a mut [f64], &'a mut [f64], &'a mut [f64]) {
        let (single, rest) = values.split_at_mut(self.single_len());
        let (pair, triplet) = rest.split_at_mut(self.pair_len());
        (single, pair, triplet)
    }

    /// Dense symmetric pair tensor built from the `x2` segment of `x`.
    ///
    /// `T[i, j, a, b] = T[j, i, b, a] = x2[ij, a, b]`; diagonal blocks are zero.
    pub fn pair_tensor(&self, x: &[f64]) -> Result<PairTensor, ObjectiveError> {
        self.check_len(x, "parameter vector")?;
        let (_, x2, _) = self.split(x);
        let mut tensor = PairTensor::zeros(self.ncol);
        for (ij, (i, j)) in self.pairs().enumerate() {
            for a in 0..N_ALPHA {
                for b in 0..N_ALPHA {
                    tensor.set_symmetric(i, j, a, b, x2[Self::pair_offset(ij, a, b)]);
                }
            }
        }
        Ok(tensor)
    }
}
