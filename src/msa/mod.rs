//! Multiple sequence alignments encoded over the protein alphabet.
//!
//! Alignments are row-major matrices of symbol codes. They are read-only to
//! the rest of the crate: the objective and the counting routines borrow rows
//! and never modify them.

mod counts;

use thiserror::Error;

use crate::alphabet::is_valid_symbol;

/// Errors raised when constructing or using an [`Alignment`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlignmentError {
    /// Data length does not match `nrow * ncol`.
    #[error("alignment data has {actual} cells, expected {nrow} x {ncol} = {expected}")]
    ShapeMismatch {
        /// Number of rows.
        nrow: usize,
        /// Number of columns.
        ncol: usize,
        /// Expected number of cells.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },

    /// A cell holds a code outside the alphabet.
    #[error("invalid symbol code {code} at row {row}, column {col}")]
    InvalidSymbol {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// Offending code.
        code: u8,
    },

    /// A row passed to [`Alignment::from_rows`] differs in length from the first.
    #[error("row {row} has {len} columns, expected {ncol}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Length of the offending row.
        len: usize,
        /// Length of the first row.
        ncol: usize,
    },

    /// A triplet refers to a column or symbol outside the alignment.
    #[error("triplet {index} ({columns:?}, {symbols:?}) does not fit {ncol} columns")]
    InvalidTriplet {
        /// Position of the triplet in its list.
        index: usize,
        /// Columns `[i, j, k]` of the triplet.
        columns: [u32; 3],
        /// Symbols `[a, b, c]` of the triplet.
        symbols: [u8; 3],
        /// Number of alignment columns.
        ncol: usize,
    },

    /// Number of sequence weights differs from the number of rows.
    #[error("expected {expected} sequence weights, got {actual}")]
    WeightCount {
        /// Number of rows.
        expected: usize,
        /// Number of weights supplied.
        actual: usize,
    },

    /// A sequence weight is negative or not finite.
    #[error("sequence weight {value} at row {row} must be finite and non-negative")]
    InvalidWeight {
        /// Row of the offending weight.
        row: usize,
        /// Offending value.
        value: f64,
    },
}

/// Row-major alignment of `nrow` sequences over `ncol` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    nrow: usize,
    ncol: usize,
    data: Vec<u8>,
}

impl Alignment {
    /// Wrap `data` as an `nrow x ncol` alignment, validating shape and codes.
    pub fn new(nrow: usize, ncol: usize, data: Vec<u8>) -> Result<Self, AlignmentError> {
        Self::validate(nrow, ncol, &data)?;
        Ok(Self { nrow, ncol, data })
    }

    /// Build an alignment from equally long rows.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, AlignmentError> {
        let nrow = rows.len();
        let ncol = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(nrow.saturating_mul(ncol));
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != ncol {
                return Err(AlignmentError::RaggedRow {
                    row: idx,
                    len: row.len(),
                    ncol,
                });
            }
            data.extend_from_slice(row);
        }
        Self::new(nrow, ncol, data)
    }

    /// Check that `data` is a valid `nrow x ncol` alignment without copying it.
    pub fn validate(nrow: usize, ncol: usize, data: &[u8]) -> Result<(), AlignmentError> {
        let expected = nrow * ncol;
        if data.len() != expected {
            return Err(AlignmentError::ShapeMismatch {
                nrow,
                ncol,
                expected,
                actual: data.len(),
            });
        }
        if let Some(pos) = data.iter().position(|&code| !is_valid_symbol(code)) {
            return Err(AlignmentError::InvalidSymbol {
                row: pos / ncol,
                col: pos % ncol,
                code: data[pos],
            });
        }
        Ok(())
    }

    /// Number of sequences.
    pub fn nrow(&self) -> usize {
        self.nrow
    }

    /// Number of columns.
    pub fn ncol(&self) -> usize {
        self.ncol
    }

    /// Symbol codes of row `n`.
    pub fn row(&self, n: usize) -> &[u8] {
        &self.data[n * self.ncol..(n + 1) * self.ncol]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.ncol.max(1))
    }

    /// Flat row-major symbol codes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Check that `weights` holds one finite, non-negative weight per row.
pub fn validate_weights(weights: &[f64], nrow: usize) -> Result<(), AlignmentError> {
    if weights.len() != nrow {
        return Err(AlignmentError::WeightCount {
            expected: nrow,
            actual: weights.len(),
        });
    }
    if let Some((row, &value)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(AlignmentError::InvalidWeight { row, value });
    }
    Ok(())
}

/// Uniform weights of 1.0 for every row.
pub fn uniform_weights(nrow: usize) -> Vec<f64> {
    vec![1.0; nrow]
}
