//! Bounded priority container for top-K selection.
//!
//! The heap keeps at most `K` elements and always exposes the *worst*
//! retained element at its root, so a new candidate only has to beat the
//! root to enter the retained set.

mod bounded;

pub use bounded::{BoundedHeap, HeapError};
