use std::cmp::Ordering;
use std::collections::TryReserveError;
use std::fmt;

use thiserror::Error;

/// Errors raised by [`BoundedHeap`].
#[derive(Debug, Error)]
pub enum HeapError {
    /// `push` was called on a heap that already holds `capacity` elements.
    #[error("cannot push onto a full heap (capacity {capacity})")]
    CapacityExceeded {
        /// Maximum number of elements the heap may hold.
        capacity: usize,
    },

    /// `pop` was called on an empty heap.
    #[error("cannot pop from an empty heap")]
    Empty,

    /// The element buffer could not be allocated.
    #[error("failed to allocate heap storage for {requested} elements")]
    Allocation {
        /// Number of elements requested.
        requested: usize,
        /// Underlying allocator error.
        #[source]
        source: TryReserveError,
    },
}

impl HeapError {
    /// Whether the error signals a broken caller contract rather than a
    /// resource problem. Such errors are not recoverable by retrying.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, HeapError::CapacityExceeded { .. } | HeapError::Empty)
    }
}

#[inline]
fn parent(pos: usize) -> usize {
    (pos - 1) / 2
}

#[inline]
fn left_child(pos: usize) -> usize {
    2 * pos + 1
}

/// Fixed-capacity binary heap ordered by a caller-supplied comparator.
///
/// `compare(a, b) == Ordering::Less` means `a` ranks before (is worse than)
/// `b`. Every parent ranks before-or-equal its children, so the root is the
/// worst element currently retained. Combined with [`BoundedHeap::push_over`]
/// this keeps the `capacity` best elements ever offered.
pub struct BoundedHeap<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    data: Vec<T>,
    capacity: usize,
    compare: F,
}

impl<T, F> BoundedHeap<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Create an empty heap holding up to `capacity` elements.
    ///
    /// Storage is reserved up front; allocation failure is reported instead
    /// of aborting.
    pub fn with_capacity(capacity: usize, compare: F) -> Result<Self, HeapError> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|source| HeapError::Allocation {
                requested: capacity,
                source,
            })?;
        Ok(Self {
            data,
            capacity,
            compare,
        })
    }

    /// Maximum number of retained elements.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements currently retained.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the heap holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the heap holds `capacity` elements.
    pub fn is_full(&self) -> bool {
        self.data.len() >= self.capacity
    }

    /// Worst retained element.
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// Iterate over retained elements in heap (not sorted) order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Insert `element`. Fails with [`HeapError::CapacityExceeded`] at capacity.
    pub fn push(&mut self, element: T) -> Result<(), HeapError> {
        if self.is_full() {
            return Err(HeapError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.data.push(element);
        let last = self.data.len() - 1;
        self.sift_down(0, last);
        Ok(())
    }

    /// Remove and return the worst retained element.
    pub fn pop(&mut self) -> Result<T, HeapError> {
        let last = self.data.pop().ok_or(HeapError::Empty)?;
        if self.data.is_empty() {
            return Ok(last);
        }
        let root = std::mem::replace(&mut self.data[0], last);
        self.sift_up(0);
        Ok(root)
    }

    /// Offer `element` against the root without growing the heap.
    ///
    /// If the root ranks strictly before `element`, the root is evicted and
    /// returned; otherwise `element` is returned unchanged.
    pub fn pushpop(&mut self, mut element: T) -> T {
        let evicts_root = self
            .data
            .first()
            .is_some_and(|root| (self.compare)(root, &element) == Ordering::Less);
        if evicts_root {
            std::mem::swap(&mut element, &mut self.data[0]);
            self.sift_up(0);
        }
        element
    }

    /// Push while below capacity, otherwise [`BoundedHeap::pushpop`].
    ///
    /// Returns the element that left the retained set, if any.
    pub fn push_over(&mut self, element: T) -> Result<Option<T>, HeapError> {
        if self.is_full() {
            Ok(Some(self.pushpop(element)))
        } else {
            self.push(element)?;
            Ok(None)
        }
    }

    /// Consume the heap, returning elements in heap order.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Consume the heap, returning elements sorted best first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        let Self { mut data, compare, .. } = self;
        data.sort_by(|a, b| compare(b, a));
        data
    }

    /// Check the heap invariant on every parent/child pair.
    pub fn is_valid_heap(&self) -> bool {
        (1..self.data.len()).all(|pos| {
            (self.compare)(&self.data[parent(pos)], &self.data[pos]) != Ordering::Greater
        })
    }

    /// Move the element at `pos` toward the root while it ranks before its
    /// parent, never rising above `start`.
    fn sift_down(&mut self, start: usize, mut pos: usize) {
        while pos > start {
            let parent_pos = parent(pos);
            if (self.compare)(&self.data[pos], &self.data[parent_pos]) != Ordering::Less {
                break;
            }
            self.data.swap(pos, parent_pos);
            pos = parent_pos;
        }
    }

    /// Walk the element at `pos` down to a leaf along the lower-ranked child,
    /// then settle it back up with [`Self::sift_down`].
    fn sift_up(&mut self, mut pos: usize) {
        let start = pos;
        let len = self.data.len();
        let mut child = left_child(pos);
        while child < len {
            let right = child + 1;
            if right < len && (self.compare)(&self.data[child], &self.data[right]) != Ordering::Less
            {
                child = right;
            }
            self.data.swap(pos, child);
            pos = child;
            child = left_child(pos);
        }
        self.sift_down(start, pos);
    }
}

impl<T: fmt::Debug, F> fmt::Debug for BoundedHeap<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedHeap")
            .field("capacity", &self.capacity)
            .field("data", &self.data)
            .finish()
    }
}
