use super::FinderError;
use crate::alphabet::{N_ALPHA, N_SYMBOLS};

/// Dense pairwise coupling tensor of shape `ncol x ncol x 21 x 21`.
///
/// Entry `(i, j, a, b)` is the coupling between symbol `a` at column `i` and
/// symbol `b` at column `j`. Only `i != j` entries are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct PairTensor {
    ncol: usize,
    data: Vec<f64>,
}

impl PairTensor {
    /// Wrap a flat row-major tensor, checking its length against `ncol`.
    pub fn new(ncol: usize, data: Vec<f64>) -> Result<Self, FinderError> {
        let expected = Self::len_for(ncol);
        if data.len() != expected {
            return Err(FinderError::InvalidInput(format!(
                "pair tensor has {} entries, expected {} for ncol = {}",
                data.len(),
                expected,
                ncol
            )));
        }
        Ok(Self { ncol, data })
    }

    /// All-zero tensor for `ncol` columns.
    pub fn zeros(ncol: usize) -> Self {
        Self {
            ncol,
            data: vec![0.0; Self::len_for(ncol)],
        }
    }

    /// Number of entries for `ncol` columns.
    pub fn len_for(ncol: usize) -> usize {
        ncol * ncol * N_ALPHA * N_ALPHA
    }

    /// Number of alignment columns.
    pub fn ncol(&self) -> usize {
        self.ncol
    }

    #[inline]
    fn index(&self, i: usize, j: usize, a: usize, b: usize) -> usize {
        ((i * self.ncol + j) * N_ALPHA + a) * N_ALPHA + b
    }

    /// Coupling between `a` at column `i` and `b` at column `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize, a: usize, b: usize) -> f64 {
        self.data[self.index(i, j, a, b)]
    }

    /// Set one entry.
    pub fn set(&mut self, i: usize, j: usize, a: usize, b: usize, value: f64) {
        let idx = self.index(i, j, a, b);
        self.data[idx] = value;
    }

    /// Set `(i, j, a, b)` and its mirror `(j, i, b, a)`.
    pub fn set_symmetric(&mut self, i: usize, j: usize, a: usize, b: usize, value: f64) {
        self.set(i, j, a, b, value);
        self.set(j, i, b, a, value);
    }

    /// The `21 x 21` block for columns `(i, j)`.
    pub fn block(&self, i: usize, j: usize) -> &[f64] {
        let start = self.index(i, j, 0, 0);
        &self.data[start..start + N_ALPHA * N_ALPHA]
    }

    /// Sum of the non-gap `20 x 20` sub-block for columns `(i, j)`.
    pub fn block_sum(&self, i: usize, j: usize) -> f64 {
        self.block(i, j)
            .chunks_exact(N_ALPHA)
            .take(N_SYMBOLS)
            .map(|row| row[..N_SYMBOLS].iter().sum::<f64>())
            .sum()
    }

    /// Apply `f` element-wise, returning a new tensor.
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            ncol: self.ncol,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Whether `(i, j, a, b)` equals `(j, i, b, a)` for every entry.
    pub fn is_symmetric(&self) -> bool {
        (0..self.ncol).all(|i| {
            (0..self.ncol).all(|j| {
                (0..N_ALPHA).all(|a| {
                    (0..N_ALPHA).all(|b| self.get(i, j, a, b) == self.get(j, i, b, a))
                })
            })
        })
    }

    /// Flat row-major entries.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
