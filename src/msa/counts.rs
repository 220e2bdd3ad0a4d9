//! Weighted symbol counts over single columns, column pairs and triplets.

use super::{validate_weights, Alignment, AlignmentError};
use crate::alphabet::{is_valid_symbol, N_ALPHA};
use crate::triplets::{SymbolTriplet, TripletRecord};

impl Alignment {
    /// Weighted single-column counts, shape `ncol x 21`, index `i * 21 + a`.
    pub fn single_counts(&self, weights: &[f64]) -> Result<Vec<f64>, AlignmentError> {
        validate_weights(weights, self.nrow)?;
        let mut counts = vec![0.0; self.ncol * N_ALPHA];
        for (row, &w) in self.rows().zip(weights) {
            for (i, &a) in row.iter().enumerate() {
                counts[i * N_ALPHA + a as usize] += w;
            }
        }
        Ok(counts)
    }

    /// Weighted pair counts, shape `ncol x ncol x 21 x 21`.
    ///
    /// Both orientations are filled, and the diagonal blocks hold the single
    /// counts on their diagonal.
    pub fn pair_counts(&self, weights: &[f64]) -> Result<Vec<f64>, AlignmentError> {
        validate_weights(weights, self.nrow)?;
        let ncol = self.ncol;
        let mut counts = vec![0.0; ncol * ncol * N_ALPHA * N_ALPHA];
        for (row, &w) in self.rows().zip(weights) {
            for (i, &a) in row.iter().enumerate() {
                for (j, &b) in row.iter().enumerate() {
                    counts[((i * ncol + j) * N_ALPHA + a as usize) * N_ALPHA + b as usize] += w;
                }
            }
        }
        Ok(counts)
    }

    /// Summed weight of the rows that carry all three symbols of each triplet.
    ///
    /// Every triplet must name columns below `ncol` and symbols of the
    /// alphabet.
    pub fn triplet_counts(
        &self,
        weights: &[f64],
        triplets: &[SymbolTriplet],
    ) -> Result<Vec<f64>, AlignmentError> {
        validate_weights(weights, self.nrow)?;
        for (index, t) in triplets.iter().enumerate() {
            let columns = t.columns();
            let symbols = t.symbols();
            let fits = columns.iter().all(|&c| (c as usize) < self.ncol)
                && symbols.iter().all(|&s| is_valid_symbol(s));
            if !fits {
                return Err(AlignmentError::InvalidTriplet {
                    index,
                    columns,
                    symbols,
                    ncol: self.ncol,
                });
            }
        }
        let mut counts = vec![0.0; triplets.len()];
        for (row, &w) in self.rows().zip(weights) {
            for (count, t) in counts.iter_mut().zip(triplets) {
                if t.matches(row) {
                    *count += w;
                }
            }
        }
        Ok(counts)
    }
}
