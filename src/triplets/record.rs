use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alphabet::N_SYMBOLS;

/// Common interface of packed triplet records.
pub trait TripletRecord: Copy + Send + Sync + fmt::Debug {
    /// Number of `u32` fields per record in packed form.
    const FIELDS: usize;

    /// Ranking score.
    fn score(&self) -> f64;

    /// Column indices `[i, j, k]`.
    fn columns(&self) -> [u32; 3];

    /// Append the packed fields of this record to `out`.
    fn extend_fields(&self, out: &mut Vec<u32>);
}

/// Comparator ranking records by ascending score (lower ranks first).
pub fn by_score<R: TripletRecord>(a: &R, b: &R) -> Ordering {
    a.score().total_cmp(&b.score())
}

/// Position triplet with one non-gap symbol per position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymbolTriplet {
    /// First column.
    pub i: u32,
    /// Second column.
    pub j: u32,
    /// Third column.
    pub k: u32,
    /// Symbol at `i`.
    pub a: u8,
    /// Symbol at `j`.
    pub b: u8,
    /// Symbol at `k`.
    pub c: u8,
    /// Selection score.
    pub score: f64,
}

impl SymbolTriplet {
    /// Construct a new record.
    pub fn new(i: u32, j: u32, k: u32, a: u8, b: u8, c: u8, score: f64) -> Self {
        Self {
            i,
            j,
            k,
            a,
            b,
            c,
            score,
        }
    }

    /// Symbols `[a, b, c]`.
    pub fn symbols(&self) -> [u8; 3] {
        [self.a, self.b, self.c]
    }

    /// Whether `row` carries all three triplet symbols at the triplet columns.
    pub fn matches(&self, row: &[u8]) -> bool {
        row[self.i as usize] == self.a
            && row[self.j as usize] == self.b
            && row[self.k as usize] == self.c
    }
}

impl TripletRecord for SymbolTriplet {
    const FIELDS: usize = 6;

    fn score(&self) -> f64 {
        self.score
    }

    fn columns(&self) -> [u32; 3] {
        [self.i, self.j, self.k]
    }

    fn extend_fields(&self, out: &mut Vec<u32>) {
        out.extend_from_slice(&[
            self.i,
            self.j,
            self.k,
            self.a as u32,
            self.b as u32,
            self.c as u32,
        ]);
    }
}

/// Position triplet scored over all symbol combinations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnTriplet {
    /// First column.
    pub i: u32,
    /// Second column.
    pub j: u32,
    /// Third column.
    pub k: u32,
    /// Selection score.
    pub score: f64,
}

impl ColumnTriplet {
    /// Construct a new record.
    pub fn new(i: u32, j: u32, k: u32, score: f64) -> Self {
        Self { i, j, k, score }
    }

    /// All `N_SYMBOLS^3` symbol triplets on these columns, in `(a, b, c)`
    /// lexicographic order, each carrying this record's score.
    pub fn expand(&self) -> impl Iterator<Item = SymbolTriplet> + '_ {
        (0..N_SYMBOLS as u8).flat_map(move |a| {
            (0..N_SYMBOLS as u8).flat_map(move |b| {
                (0..N_SYMBOLS as u8)
                    .map(move |c| SymbolTriplet::new(self.i, self.j, self.k, a, b, c, self.score))
            })
        })
    }
}

impl TripletRecord for ColumnTriplet {
    const FIELDS: usize = 3;

    fn score(&self) -> f64 {
        self.score
    }

    fn columns(&self) -> [u32; 3] {
        [self.i, self.j, self.k]
    }

    fn extend_fields(&self, out: &mut Vec<u32>) {
        out.extend_from_slice(&[self.i, self.j, self.k]);
    }
}

/// Triplets selected by the finder, sorted by descending score.
#[derive(Debug, Clone, PartialEq)]
pub struct TripletSelection<R> {
    records: Vec<R>,
}

impl<R: TripletRecord> TripletSelection<R> {
    /// Wrap records that are already in their final order.
    pub fn from_sorted(records: Vec<R>) -> Self {
        Self { records }
    }

    /// Number of selected triplets.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selected records, best first.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Consume the selection, returning the records.
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Scores parallel to [`Self::packed`].
    pub fn scores(&self) -> Vec<f64> {
        self.records.iter().map(TripletRecord::score).collect()
    }

    /// Flat array with `R::FIELDS` unsigned fields per record.
    pub fn packed(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.records.len() * R::FIELDS);
        for record in &self.records {
            record.extend_fields(&mut out);
        }
        out
    }

    /// Copy into caller-provided packed and score buffers, returning the
    /// number of records written. Buffers shorter than the selection receive
    /// a prefix.
    pub fn write_packed(&self, fields: &mut [u32], scores: &mut [f64]) -> usize {
        let n = self
            .records
            .len()
            .min(fields.len() / R::FIELDS)
            .min(scores.len());
        let packed = self.packed();
        fields[..n * R::FIELDS].copy_from_slice(&packed[..n * R::FIELDS]);
        for (dst, record) in scores.iter_mut().zip(&self.records[..n]) {
            *dst = record.score();
        }
        n
    }
}
