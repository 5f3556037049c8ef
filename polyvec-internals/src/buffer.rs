//! Owned, aligned byte storage.
//!
//! This module encapsulates the fields of [`RawBuffer`], so the pairing of the
//! pointer with the [`Layout`] it was allocated with can only be established in
//! [`RawBuffer::try_allocate`]. [`RawBuffer::drop`] relies on that pairing to
//! hand the memory back to the global allocator.
//!
//! A buffer with a capacity of zero owns no allocation. Its pointer is a
//! dangling pointer aligned to the buffer alignment, so zero-sized values can
//! still be placed at offset zero.

use alloc::alloc::{alloc, dealloc};
use core::{alloc::Layout, ptr::NonNull};

use crate::error::RawAllocError;

/// An exclusively owned block of uninitialized bytes.
///
/// The buffer never reads or drops its contents; tracking which bytes hold
/// live values is the job of the owner.
pub(crate) struct RawBuffer {
    /// Start of the storage.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. If `layout.size() > 0`, the pointer was returned by the global
    ///    allocator for exactly `layout` and has not been deallocated.
    /// 2. If `layout.size() == 0`, the pointer is dangling and aligned to
    ///    `layout.align()`; it does not own an allocation.
    ptr: NonNull<u8>,
    /// Size and alignment of the storage.
    layout: Layout,
}

impl RawBuffer {
    /// Creates a buffer that owns no memory.
    #[inline]
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            layout: Layout::new::<()>(),
        }
    }

    /// Allocates a buffer of `capacity` bytes aligned to `align`.
    ///
    /// `align` must be a power of two. A `capacity` of zero does not allocate.
    pub(crate) fn try_allocate(capacity: usize, align: usize) -> Result<Self, RawAllocError> {
        let layout =
            Layout::from_size_align(capacity, align).map_err(|_| RawAllocError::CapacityOverflow)?;

        if layout.size() == 0 {
            let ptr = core::ptr::without_provenance_mut::<u8>(layout.align());
            // `Layout` guarantees a non-zero alignment
            let ptr = NonNull::new(ptr).ok_or(RawAllocError::CapacityOverflow)?;
            return Ok(Self { ptr, layout });
        }

        // SAFETY:
        // 1. `layout` has a non-zero size, checked above.
        let ptr = unsafe { alloc(layout) };
        let ptr = NonNull::new(ptr).ok_or(RawAllocError::AllocationFailure { layout })?;

        Ok(Self { ptr, layout })
    }

    /// The number of bytes this buffer can hold.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.layout.size()
    }

    /// The alignment of the start of the buffer.
    #[inline]
    pub(crate) fn align(&self) -> usize {
        self.layout.align()
    }

    /// Returns a pointer to the byte at `offset`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `offset <= self.capacity()`.
    #[inline]
    pub(crate) unsafe fn at(&self, offset: usize) -> NonNull<u8> {
        debug_assert!(offset <= self.capacity());

        // SAFETY:
        // 1. The offset stays within the allocation or one past its end, as
        //    guaranteed by the caller. For an empty buffer the only permitted
        //    offset is zero.
        unsafe { self.ptr.add(offset) }
    }
}

impl Drop for RawBuffer {
    #[inline]
    fn drop(&mut self) {
        if self.layout.size() == 0 {
            return;
        }

        // SAFETY:
        // 1. The pointer was allocated by the global allocator with exactly
        //    `self.layout`, and the size is non-zero, as guaranteed by the
        //    invariants on this type.
        // 2. We are in the drop function, so the pointer is not used again.
        unsafe {
            dealloc(self.ptr.as_ptr(), self.layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer() {
        let buffer = RawBuffer::empty();
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.align(), 1);
    }

    #[test]
    fn test_zero_capacity_is_aligned() {
        let buffer = RawBuffer::try_allocate(0, 64).unwrap();
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.align(), 64);
        // SAFETY: zero is always a valid offset
        let ptr = unsafe { buffer.at(0) };
        assert_eq!(ptr.as_ptr().addr() % 64, 0);
    }

    #[test]
    fn test_allocation_is_aligned() {
        for align in [1usize, 2, 8, 32, 128] {
            let buffer = RawBuffer::try_allocate(100, align).unwrap();
            assert_eq!(buffer.capacity(), 100);
            assert_eq!(buffer.align(), align);
            // SAFETY: zero is always a valid offset
            let ptr = unsafe { buffer.at(0) };
            assert_eq!(ptr.as_ptr().addr() % align, 0);
        }
    }

    #[test]
    fn test_capacity_overflow() {
        assert_eq!(
            RawBuffer::try_allocate(usize::MAX, 8).err(),
            Some(RawAllocError::CapacityOverflow)
        );
        assert_eq!(
            RawBuffer::try_allocate(isize::MAX as usize, 16).err(),
            Some(RawAllocError::CapacityOverflow)
        );
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_not_impl_any!(RawBuffer: Send, Sync);
    }
}
