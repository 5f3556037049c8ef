//! Vtable for type-erased element operations.
//!
//! This module contains the [`ElementVtable`] which lets the container drop,
//! relocate and project elements whose concrete type `T` has been erased. The
//! vtable stores function pointers that dispatch to the correct typed
//! implementations.
//!
//! This module encapsulates the fields of [`ElementVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameter matches the type of the value
//! stored at the offset it is paired with**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`ElementVtable::new`], which pairs the function pointers
//! with a specific `T` at compile time, and because [`RawPolyVec`] only ever
//! records a vtable next to the offset of a value it wrote with the same `T`.
//!
//! [`RawPolyVec`]: crate::RawPolyVec

use core::{alloc::Layout, any::TypeId, ptr::NonNull};

use crate::element::Element;

/// Vtable for type-erased element operations.
///
/// # Safety Invariant
///
/// The function pointer fields are guaranteed to point to the functions
/// defined below instantiated with the element type `T` that was used to
/// create this [`ElementVtable`], and `layout` is `Layout::new::<T>()`.
pub(crate) struct ElementVtable<B: ?Sized + 'static> {
    /// Gets the [`TypeId`] of the element type.
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the element type.
    type_name: fn() -> &'static str,
    /// Size and alignment of the element type.
    layout: Layout,
    /// Drops the element in place.
    drop_in_place: unsafe fn(NonNull<u8>),
    /// Moves the element to an uninitialized destination.
    relocate: unsafe fn(NonNull<u8>, NonNull<u8>),
    /// Runs [`Element::relocated`] on the element.
    relocated: unsafe fn(NonNull<u8>),
    /// Projects the element to a shared pointer to the common interface.
    as_base: unsafe fn(NonNull<u8>) -> NonNull<B>,
    /// Projects the element to a unique pointer to the common interface.
    as_base_mut: unsafe fn(NonNull<u8>) -> NonNull<B>,
}

impl<B: ?Sized + 'static> ElementVtable<B> {
    /// Creates a new [`ElementVtable`] for the element type `T`.
    pub(crate) const fn new<T: Element<B>>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                layout: Layout::new::<T>(),
                drop_in_place: drop_in_place::<T>,
                relocate: relocate::<T>,
                relocated: relocated::<T, B>,
                as_base: as_base::<T, B>,
                as_base_mut: as_base_mut::<T, B>,
            }
        }
    }

    /// Gets the [`TypeId`] of the element type that was used to create this
    /// [`ElementVtable`].
    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the element type that was used to
    /// create this [`ElementVtable`].
    #[inline]
    pub(crate) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// The [`Layout`] of the element type.
    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }

    /// Drops the element pointed to by `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the element type of this
    ///    [`ElementVtable`].
    /// 2. The value is not used again after this call.
    #[inline]
    pub(crate) unsafe fn drop_in_place(&self, ptr: NonNull<u8>) {
        // SAFETY: `self.drop_in_place` points to `drop_in_place::<T>` below.
        // That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            (self.drop_in_place)(ptr);
        }
    }

    /// Moves the element at `src` to `dst`.
    ///
    /// After this call `src` is logically uninitialized and `dst` holds the
    /// value. Nothing is dropped.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `src` points to an initialized value of the element type of this
    ///    [`ElementVtable`].
    /// 2. `dst` is valid for writes of that type and properly aligned.
    /// 3. The two regions do not overlap.
    /// 4. `src` is not read or dropped again until it is re-initialized.
    #[inline]
    pub(crate) unsafe fn relocate(&self, src: NonNull<u8>, dst: NonNull<u8>) {
        // SAFETY: `self.relocate` points to `relocate::<T>` below. That
        // function's safety requirements are upheld:
        // 1-4. Guaranteed by the caller
        unsafe {
            (self.relocate)(src, dst);
        }
    }

    /// Runs the [`Element::relocated`] hook of the element at `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the element type of this
    ///    [`ElementVtable`].
    /// 2. No other reference to that value exists for the duration of the call.
    #[inline]
    pub(crate) unsafe fn relocated(&self, ptr: NonNull<u8>) {
        // SAFETY: `self.relocated` points to `relocated::<T, B>` below. That
        // function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            (self.relocated)(ptr);
        }
    }

    /// Projects the element at `ptr` to the common interface `B`.
    ///
    /// The returned pointer is derived from a shared reference and must only
    /// be used for reads.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the element type of this
    ///    [`ElementVtable`].
    /// 2. No mutable reference to that value exists for the duration of the
    ///    call.
    #[inline]
    pub(crate) unsafe fn as_base(&self, ptr: NonNull<u8>) -> NonNull<B> {
        // SAFETY: `self.as_base` points to `as_base::<T, B>` below. That
        // function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.as_base)(ptr) }
    }

    /// Projects the element at `ptr` to the common interface `B`, for
    /// mutation.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized value of the element type of this
    ///    [`ElementVtable`].
    /// 2. No other reference to that value exists for the duration of the
    ///    call.
    #[inline]
    pub(crate) unsafe fn as_base_mut(&self, ptr: NonNull<u8>) -> NonNull<B> {
        // SAFETY: `self.as_base_mut` points to `as_base_mut::<T, B>` below.
        // That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.as_base_mut)(ptr) }
    }
}

/// Drops the `T` pointed to by `ptr`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `T`.
/// 2. The value is not used again after this call.
unsafe fn drop_in_place<T>(ptr: NonNull<u8>) {
    let ptr: NonNull<T> = ptr.cast::<T>();
    // SAFETY:
    // 1. The pointer is aligned and points to an initialized `T`, as
    //    guaranteed by the caller.
    // 2. The value is not used again, as guaranteed by the caller.
    unsafe {
        ptr.drop_in_place();
    }
}

/// Moves the `T` at `src` to `dst`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `src` points to an initialized `T`.
/// 2. `dst` is valid for writes of `T` and aligned for `T`.
/// 3. The two regions do not overlap.
/// 4. `src` is treated as uninitialized afterwards.
unsafe fn relocate<T>(src: NonNull<u8>, dst: NonNull<u8>) {
    let src: NonNull<T> = src.cast::<T>();
    let dst: NonNull<T> = dst.cast::<T>();
    // SAFETY:
    // 1-3. Guaranteed by the caller.
    // 4. Ownership of the value is transferred to `dst`; the caller never
    //    drops the source.
    unsafe {
        src.copy_to_nonoverlapping(dst, 1);
    }
}

/// Runs [`Element::relocated`] on the `T` at `ptr`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `T`.
/// 2. No other reference to the value exists during the call.
unsafe fn relocated<T: Element<B>, B: ?Sized + 'static>(ptr: NonNull<u8>) {
    let mut ptr: NonNull<T> = ptr.cast::<T>();
    // SAFETY:
    // 1. The pointer is aligned and initialized, as guaranteed by the caller.
    // 2. The access is unique, as guaranteed by the caller.
    let value: &mut T = unsafe { ptr.as_mut() };
    value.relocated();
}

/// Projects the `T` at `ptr` to `B` through [`Element::as_base`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `T`.
/// 2. No mutable reference to the value exists during the call.
unsafe fn as_base<T: Element<B>, B: ?Sized + 'static>(ptr: NonNull<u8>) -> NonNull<B> {
    let ptr: NonNull<T> = ptr.cast::<T>();
    // SAFETY:
    // 1. The pointer is aligned and initialized, as guaranteed by the caller.
    // 2. Shared access is allowed, as guaranteed by the caller.
    let value: &T = unsafe { ptr.as_ref() };
    NonNull::from(value.as_base())
}

/// Projects the `T` at `ptr` to `B` through [`Element::as_base_mut`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `T`.
/// 2. No other reference to the value exists during the call.
unsafe fn as_base_mut<T: Element<B>, B: ?Sized + 'static>(ptr: NonNull<u8>) -> NonNull<B> {
    let mut ptr: NonNull<T> = ptr.cast::<T>();
    // SAFETY:
    // 1. The pointer is aligned and initialized, as guaranteed by the caller.
    // 2. The access is unique, as guaranteed by the caller.
    let value: &mut T = unsafe { ptr.as_mut() };
    NonNull::from(value.as_base_mut())
}
