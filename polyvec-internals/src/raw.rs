//! The type-erased container.
//!
//! This module encapsulates the fields of [`RawPolyVec`]. Since this is the
//! only place they are visible, the offset table is guaranteed to stay in sync
//! with the buffer contents: an entry is only pushed right after a value of the
//! entry's vtable type was written at the entry's offset, and the buffer is only
//! replaced after every entry has been relocated into the replacement.
//!
//! # Layout
//!
//! Elements are stored back to back in insertion order. Each element starts at
//! the end of the previous one, rounded up to the element's alignment, and the
//! buffer itself is aligned to the largest alignment of any element it has
//! held. When the buffer is replaced, every element keeps its offset, so the
//! alignment of each element is preserved.
//!
//! # Pointer revalidation
//!
//! No pointer into the buffer is stored. Every access recomputes the element
//! address from the current buffer base and the stored offset, and references
//! handed out borrow the [`RawPolyVec`], so none of them can outlive a
//! reallocation.

use alloc::vec::Vec;
use core::{any::TypeId, fmt, ptr::NonNull};

use crate::{
    buffer::RawBuffer,
    element::Element,
    error::RawAllocError,
    growth::GrowthPolicy,
    vtable::ElementVtable,
};

/// The location and type of one stored element.
struct Entry<B: ?Sized + 'static> {
    /// Byte offset of the element from the start of the buffer.
    offset: usize,
    /// Vtable of the element's concrete type.
    vtable: &'static ElementVtable<B>,
}

impl<B: ?Sized + 'static> Clone for Entry<B> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized + 'static> Copy for Entry<B> {}

/// A growable, contiguous buffer of values of different concrete types, all
/// viewed through the common interface `B`.
///
/// This type does not know which growth policy its owner uses; operations that
/// may reallocate take the policy as an argument.
pub struct RawPolyVec<B: ?Sized + 'static> {
    /// Storage for the elements.
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. For every entry in `entries`, the bytes at
    ///    `entry.offset..entry.offset + entry.vtable.layout().size()` hold an
    ///    initialized value of the vtable's element type, aligned for that
    ///    type.
    /// 2. `buffer.align()` is at least the alignment of every element type in
    ///    `entries`.
    buffer: RawBuffer,
    /// The offset table, in insertion order.
    ///
    /// # Safety
    ///
    /// Offsets are non-decreasing and no two elements overlap.
    entries: Vec<Entry<B>>,
    /// End offset of the last element.
    ///
    /// # Safety
    ///
    /// `total_size <= buffer.capacity()`, and no element extends past it.
    total_size: usize,
}

impl<B: ?Sized + 'static> RawPolyVec<B> {
    /// Creates an empty container without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self {
            buffer: RawBuffer::empty(),
            entries: Vec::new(),
            total_size: 0,
        }
    }

    /// Creates an empty container with room for `capacity` bytes, aligned to
    /// `align`.
    ///
    /// `align` must be a power of two.
    pub fn try_with_capacity(capacity: usize, align: usize) -> Result<Self, RawAllocError> {
        Ok(Self {
            buffer: RawBuffer::try_allocate(capacity, align)?,
            entries: Vec::new(),
            total_size: 0,
        })
    }

    /// The number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The size of the buffer in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// The alignment of the buffer.
    #[inline]
    pub fn align(&self) -> usize {
        self.buffer.align()
    }

    /// The number of bytes in use, including alignment padding between
    /// elements.
    #[inline]
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Appends `value`, reallocating with `policy` if it does not fit.
    ///
    /// On error the container is left unchanged and `value` is dropped.
    pub fn try_push<T, G>(&mut self, value: T, policy: &G) -> Result<(), RawAllocError>
    where
        T: Element<B>,
        G: GrowthPolicy + ?Sized,
    {
        let vtable = ElementVtable::<B>::new::<T>();
        let layout = vtable.layout();

        let offset = self
            .total_size
            .checked_next_multiple_of(layout.align())
            .ok_or(RawAllocError::CapacityOverflow)?;
        let end = offset
            .checked_add(layout.size())
            .ok_or(RawAllocError::CapacityOverflow)?;

        if end > self.buffer.capacity() {
            self.grow(end, layout.align(), policy)?;
        } else if layout.align() > self.buffer.align() {
            // The bytes fit, only the alignment has to be raised.
            self.reallocate(self.buffer.capacity(), layout.align())?;
        }
        self.entries.reserve(1);

        // SAFETY:
        // 1. `offset <= end <= capacity`, ensured by the growth check above.
        let dst = unsafe { self.buffer.at(offset) };
        let dst: NonNull<T> = dst.cast::<T>();

        // SAFETY:
        // 1. `dst` is aligned for `T`: the buffer is aligned to at least
        //    `align_of::<T>()` and `offset` is a multiple of it.
        // 2. `dst..dst + size_of::<T>()` lies inside the buffer and past
        //    `total_size`, so it holds no live element.
        unsafe {
            dst.write(value);
        }

        self.entries.push(Entry { offset, vtable });
        self.total_size = end;
        Ok(())
    }

    /// Makes sure at least `additional` more bytes fit after the last element
    /// without reallocating, using `policy` if the buffer has to grow.
    pub fn try_reserve<G>(&mut self, additional: usize, policy: &G) -> Result<(), RawAllocError>
    where
        G: GrowthPolicy + ?Sized,
    {
        let required = self
            .total_size
            .checked_add(additional)
            .ok_or(RawAllocError::CapacityOverflow)?;

        if required > self.buffer.capacity() {
            self.grow(required, self.buffer.align(), policy)?;
        }
        Ok(())
    }

    /// Reallocates the buffer to exactly the number of bytes in use.
    pub fn try_shrink_to_fit(&mut self) -> Result<(), RawAllocError> {
        if self.buffer.capacity() > self.total_size {
            self.reallocate(self.total_size, self.buffer.align())?;
        }
        Ok(())
    }

    /// Computes the new capacity for holding `required` bytes at alignment
    /// `align`, then reallocates.
    fn grow<G>(&mut self, required: usize, align: usize, policy: &G) -> Result<(), RawAllocError>
    where
        G: GrowthPolicy + ?Sized,
    {
        let align = align.max(self.buffer.align());
        let max = max_capacity(align);
        if required > max {
            return Err(RawAllocError::CapacityOverflow);
        }

        let capacity = policy
            .grow(self.buffer.capacity(), required, max)
            .min(max)
            .max(required);

        self.reallocate(capacity, align)
    }

    /// Moves every element into a new buffer of `capacity` bytes aligned to
    /// `align`, at the same offsets.
    ///
    /// The new buffer is allocated before anything is moved, so on error the
    /// container is unchanged.
    fn reallocate(&mut self, capacity: usize, align: usize) -> Result<(), RawAllocError> {
        debug_assert!(capacity >= self.total_size);
        debug_assert!(align >= self.buffer.align());

        let buffer = RawBuffer::try_allocate(capacity, align)?;

        tracing::debug!(
            old_capacity = self.buffer.capacity(),
            new_capacity = capacity,
            align,
            elements = self.entries.len(),
            "reallocating poly vector buffer"
        );

        for entry in &self.entries {
            // SAFETY:
            // 1. `entry.offset <= total_size <= capacity` of the old buffer.
            let src = unsafe { self.buffer.at(entry.offset) };
            // SAFETY:
            // 1. `entry.offset <= total_size <= capacity` of the new buffer.
            let dst = unsafe { buffer.at(entry.offset) };

            // SAFETY:
            // 1. `src` holds an initialized value of the vtable's type, as
            //    guaranteed by the invariants on this type.
            // 2. `dst` is aligned for that type since `align` is at least the
            //    old alignment and the offset is unchanged, and it lies inside
            //    the new buffer.
            // 3. The buffers are different allocations. For zero-sized
            //    elements the regions are empty.
            // 4. The old buffer is released below without touching its
            //    contents.
            unsafe {
                entry.vtable.relocate(src, dst);
            }
        }

        // The old buffer only holds moved-from bytes now. Dropping it releases
        // the memory without running any destructor.
        drop(core::mem::replace(&mut self.buffer, buffer));

        for entry in &self.entries {
            // SAFETY:
            // 1. `entry.offset <= total_size <= capacity`.
            let ptr = unsafe { self.buffer.at(entry.offset) };

            // SAFETY:
            // 1. The element was relocated to `ptr` above.
            // 2. We hold `&mut self`, so no other reference to it exists.
            unsafe {
                entry.vtable.relocated(ptr);
            }
        }

        Ok(())
    }

    /// Drops every element in insertion order. The buffer is kept.
    ///
    /// If a destructor panics, the remaining elements are leaked.
    pub fn clear(&mut self) {
        tracing::trace!(elements = self.entries.len(), "clearing poly vector");

        self.total_size = 0;
        for entry in self.entries.drain(..) {
            // SAFETY:
            // 1. `entry.offset <= capacity`.
            let ptr = unsafe { self.buffer.at(entry.offset) };

            // SAFETY:
            // 1. The element at `ptr` is initialized and of the vtable's type,
            //    as guaranteed by the invariants on this type.
            // 2. The entry has been removed from the table, so the element is
            //    never reached again.
            unsafe {
                entry.vtable.drop_in_place(ptr);
            }
        }
    }

    /// Looks up an entry and the current address of its element.
    #[inline]
    fn locate(&self, index: usize) -> Option<(Entry<B>, NonNull<u8>)> {
        let entry = *self.entries.get(index)?;
        // SAFETY:
        // 1. `entry.offset <= total_size <= capacity`.
        let ptr = unsafe { self.buffer.at(entry.offset) };
        Some((entry, ptr))
    }

    /// Returns the element at `index` through the common interface.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&B> {
        let (entry, ptr) = self.locate(index)?;

        // SAFETY:
        // 1. `ptr` holds an initialized value of the vtable's type, as
        //    guaranteed by the invariants on this type.
        // 2. We hold `&self`, so no mutable reference to it exists.
        let base = unsafe { entry.vtable.as_base(ptr) };

        // SAFETY: The pointer was derived from a shared reference to a live
        // element, which stays alive and unaliased by mutable references for as
        // long as `self` is borrowed.
        Some(unsafe { base.as_ref() })
    }

    /// Returns the element at `index` mutably through the common interface.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut B> {
        let (entry, ptr) = self.locate(index)?;

        // SAFETY:
        // 1. `ptr` holds an initialized value of the vtable's type, as
        //    guaranteed by the invariants on this type.
        // 2. We hold `&mut self`, so no other reference to it exists.
        let mut base = unsafe { entry.vtable.as_base_mut(ptr) };

        // SAFETY: The pointer was derived from a unique reference to a live
        // element, which stays alive and unaliased for as long as `self` is
        // mutably borrowed.
        Some(unsafe { base.as_mut() })
    }

    /// Returns the element at `index` as a `T`, if that is its concrete type.
    #[inline]
    pub fn downcast_ref<T: 'static>(&self, index: usize) -> Option<&T> {
        let (entry, ptr) = self.locate(index)?;
        if entry.vtable.type_id() != TypeId::of::<T>() {
            return None;
        }

        let ptr: NonNull<T> = ptr.cast::<T>();
        // SAFETY:
        // 1. The element at `ptr` is an initialized `T`: the type ids match.
        // 2. We hold `&self`, so no mutable reference to it exists.
        Some(unsafe { ptr.as_ref() })
    }

    /// Returns the element at `index` mutably as a `T`, if that is its
    /// concrete type.
    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self, index: usize) -> Option<&mut T> {
        let (entry, ptr) = self.locate(index)?;
        if entry.vtable.type_id() != TypeId::of::<T>() {
            return None;
        }

        let mut ptr: NonNull<T> = ptr.cast::<T>();
        // SAFETY:
        // 1. The element at `ptr` is an initialized `T`: the type ids match.
        // 2. We hold `&mut self`, so no other reference to it exists.
        Some(unsafe { ptr.as_mut() })
    }

    /// The byte offset of the element at `index`.
    #[inline]
    pub fn offset_at(&self, index: usize) -> Option<usize> {
        self.entries.get(index).map(|entry| entry.offset)
    }

    /// The size in bytes of the concrete type of the element at `index`.
    #[inline]
    pub fn size_at(&self, index: usize) -> Option<usize> {
        self.entries
            .get(index)
            .map(|entry| entry.vtable.layout().size())
    }

    /// The [`TypeId`] of the concrete type of the element at `index`.
    #[inline]
    pub fn type_id_at(&self, index: usize) -> Option<TypeId> {
        self.entries.get(index).map(|entry| entry.vtable.type_id())
    }

    /// The [`core::any::type_name`] of the concrete type of the element at
    /// `index`.
    #[inline]
    pub fn type_name_at(&self, index: usize) -> Option<&'static str> {
        self.entries.get(index).map(|entry| entry.vtable.type_name())
    }
}

impl<B: ?Sized + 'static> Default for RawPolyVec<B> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ?Sized + 'static> Drop for RawPolyVec<B> {
    #[inline]
    fn drop(&mut self) {
        self.clear();
    }
}

impl<B: ?Sized + 'static> fmt::Debug for RawPolyVec<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawPolyVec")
            .field("len", &self.entries.len())
            .field("total_size", &self.total_size)
            .field("capacity", &self.buffer.capacity())
            .field("align", &self.buffer.align())
            .finish()
    }
}

/// The largest buffer size that can be allocated at alignment `align`.
#[inline]
fn max_capacity(align: usize) -> usize {
    isize::MAX as usize - (align - 1)
}
