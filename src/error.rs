//! The error type of fallible [`PolyVec`](crate::PolyVec) operations.

use core::alloc::Layout;

use polyvec_internals::RawAllocError;

/// Errors returned by [`PolyVec`](crate::PolyVec).
///
/// # Examples
///
/// ```
/// use polyvec::{PolyVec, PolyVecError};
///
/// trait Shape {}
///
/// let shapes = PolyVec::<dyn Shape>::new();
/// assert_eq!(
///     shapes.at(3).err(),
///     Some(PolyVecError::IndexOutOfRange { index: 3, len: 0 })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PolyVecError {
    /// The index does not refer to an element.
    #[display("index {index} is out of range for a poly vector of length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of elements at the time of the call.
        len: usize,
    },
    /// The buffer would have to grow beyond the largest possible allocation.
    #[display("capacity overflow")]
    CapacityOverflow,
    /// The allocator failed to provide memory for a larger buffer.
    #[display("memory allocation of {} bytes failed", layout.size())]
    AllocationFailure {
        /// The layout that was requested.
        layout: Layout,
    },
}

impl PolyVecError {
    /// Creates an [`IndexOutOfRange`](Self::IndexOutOfRange) error.
    #[inline]
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }
}

impl From<RawAllocError> for PolyVecError {
    #[inline]
    fn from(error: RawAllocError) -> Self {
        match error {
            RawAllocError::CapacityOverflow => Self::CapacityOverflow,
            RawAllocError::AllocationFailure { layout } => Self::AllocationFailure { layout },
        }
    }
}
