//! Errors from reserving buffer memory.

use core::alloc::Layout;

/// The buffer could not be grown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum RawAllocError {
    /// The requested capacity cannot be described by a [`Layout`].
    #[display("capacity overflow")]
    CapacityOverflow,
    /// The global allocator returned a null pointer.
    #[display("memory allocation of {} bytes (align {}) failed", layout.size(), layout.align())]
    AllocationFailure {
        /// The layout that was passed to the allocator.
        layout: Layout,
    },
}
