//! Fixed protein alphabet shared by alignments, parameters and triplets.
//!
//! Symbols are encoded as `u8` codes in `[0, 21)`: the twenty amino acids in
//! the order of [`AMINO_ACIDS`] followed by the gap symbol, which always
//! occupies the last index.

/// Alphabet size including the gap symbol.
pub const N_ALPHA: usize = 21;

/// Number of non-gap symbols.
pub const N_SYMBOLS: usize = N_ALPHA - 1;

/// Code of the gap symbol.
pub const GAP: u8 = (N_ALPHA - 1) as u8;

/// One-letter codes in symbol order, gap last.
pub const AMINO_ACIDS: &[u8; N_ALPHA] = b"ARNDCQEGHILKMFPSTWYV-";

/// Whether `code` is a valid alphabet symbol (gap included).
#[inline]
pub fn is_valid_symbol(code: u8) -> bool {
    (code as usize) < N_ALPHA
}

/// Whether `code` is the gap symbol.
#[inline]
pub fn is_gap(code: u8) -> bool {
    code == GAP
}

/// One-letter representation of a symbol code, `'?'` for out-of-range codes.
pub fn symbol_char(code: u8) -> char {
    AMINO_ACIDS
        .get(code as usize)
        .map(|&c| c as char)
        .unwrap_or('?')
}
