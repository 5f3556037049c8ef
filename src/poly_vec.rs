//! The [`PolyVec`] container.

use alloc::alloc::handle_alloc_error;
use core::{any::TypeId, fmt, ops};

use polyvec_internals::{
    Element, RawPolyVec,
    growth::{Geometric, GrowthPolicy},
};

use crate::error::PolyVecError;

/// A growable vector of values of different concrete types, stored back to
/// back in one buffer and accessed through the common interface `B`.
///
/// `B` is usually a trait object such as `dyn Shape`. Any type implementing
/// [`Element<B>`] can be added; the [`poly_element!`](crate::poly_element)
/// macro writes that implementation for you.
///
/// The buffer grows according to the growth policy `G`, which defaults to
/// [`Geometric`] (1.5×). Growing moves every stored value to the new buffer at
/// the same offset and then calls [`Element::relocated`] on it.
///
/// `PolyVec` is neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```
/// use polyvec::{PolyVec, poly_element};
///
/// trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// struct Circle {
///     radius: f64,
/// }
///
/// struct Rect {
///     width: f64,
///     height: f64,
/// }
///
/// impl Shape for Circle {
///     fn area(&self) -> f64 {
///         3.0 * self.radius * self.radius
///     }
/// }
///
/// impl Shape for Rect {
///     fn area(&self) -> f64 {
///         self.width * self.height
///     }
/// }
///
/// poly_element!(dyn Shape => Circle, Rect);
///
/// let mut shapes = PolyVec::<dyn Shape>::new();
/// shapes.add(Circle { radius: 1.0 });
/// shapes.add(Rect { width: 2.0, height: 4.0 });
///
/// assert_eq!(shapes.size(), 2);
/// assert_eq!(shapes.at(1)?.area(), 8.0);
/// assert_eq!(shapes.size_at(0)?, size_of::<Circle>());
/// # Ok::<(), polyvec::PolyVecError>(())
/// ```
pub struct PolyVec<B: ?Sized + 'static, G = Geometric> {
    raw: RawPolyVec<B>,
    policy: G,
}

impl<B: ?Sized + 'static> PolyVec<B> {
    /// Creates an empty `PolyVec` with the default growth policy. Does not
    /// allocate.
    #[inline]
    pub const fn new() -> Self {
        Self {
            raw: RawPolyVec::new(),
            policy: Geometric,
        }
    }

    /// Creates an empty `PolyVec` with a buffer of at least `capacity` bytes.
    ///
    /// The buffer is aligned for `usize`; storing a type with a stricter
    /// alignment reallocates.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is too large to be allocated. Aborts if the
    /// allocator fails.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_policy(capacity, Geometric)
    }

    /// Like [`with_capacity`](Self::with_capacity), but returns an error
    /// instead of panicking or aborting.
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, PolyVecError> {
        Self::try_with_capacity_and_policy(capacity, Geometric)
    }
}

impl<B: ?Sized + 'static, G: GrowthPolicy> PolyVec<B, G> {
    /// Creates an empty `PolyVec` that grows according to `policy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use polyvec::{PolyVec, growth::Exact, poly_element};
    ///
    /// trait Id {
    ///     fn id(&self) -> u32;
    /// }
    ///
    /// impl Id for u32 {
    ///     fn id(&self) -> u32 {
    ///         *self
    ///     }
    /// }
    ///
    /// poly_element!(dyn Id => u32);
    ///
    /// let mut ids = PolyVec::<dyn Id, _>::with_growth_policy(Exact);
    /// ids.add(7u32);
    /// ids.add(8u32);
    /// assert_eq!(ids.capacity(), 2 * size_of::<u32>());
    /// ```
    #[inline]
    pub const fn with_growth_policy(policy: G) -> Self {
        Self {
            raw: RawPolyVec::new(),
            policy,
        }
    }

    /// Creates an empty `PolyVec` with a buffer of at least `capacity` bytes
    /// that grows according to `policy`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is too large to be allocated. Aborts if the
    /// allocator fails.
    pub fn with_capacity_and_policy(capacity: usize, policy: G) -> Self {
        match Self::try_with_capacity_and_policy(capacity, policy) {
            Ok(vec) => vec,
            Err(error) => alloc_failed(error),
        }
    }

    /// Like [`with_capacity_and_policy`](Self::with_capacity_and_policy), but
    /// returns an error instead of panicking or aborting.
    pub fn try_with_capacity_and_policy(capacity: usize, policy: G) -> Result<Self, PolyVecError> {
        let raw = RawPolyVec::try_with_capacity(capacity, align_of::<usize>())?;
        Ok(Self { raw, policy })
    }

    /// Appends `value`.
    ///
    /// If the buffer is too small, or not aligned strictly enough for `T`, a
    /// new buffer is allocated and every stored value is moved into it. The
    /// borrow checker guarantees that no reference from [`at`](Self::at) is
    /// alive across this call.
    ///
    /// # Panics
    ///
    /// Panics if the buffer would exceed the largest possible allocation.
    /// Aborts if the allocator fails.
    #[inline]
    pub fn add<T: Element<B>>(&mut self, value: T) {
        if let Err(error) = self.try_add(value) {
            alloc_failed(error);
        }
    }

    /// Appends `value`, returning an error instead of panicking or aborting
    /// when the buffer cannot grow.
    ///
    /// On error the vector is unchanged and `value` is dropped.
    #[inline]
    pub fn try_add<T: Element<B>>(&mut self, value: T) -> Result<(), PolyVecError> {
        self.raw.try_push(value, &self.policy)?;
        Ok(())
    }

    /// Makes sure at least `additional` more bytes fit without reallocating.
    ///
    /// Padding needed to align the next element counts against the reserved
    /// bytes.
    ///
    /// # Panics
    ///
    /// Panics if the buffer would exceed the largest possible allocation.
    /// Aborts if the allocator fails.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(error) = self.try_reserve(additional) {
            alloc_failed(error);
        }
    }

    /// Like [`reserve`](Self::reserve), but returns an error instead of
    /// panicking or aborting.
    #[inline]
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), PolyVecError> {
        self.raw.try_reserve(additional, &self.policy)?;
        Ok(())
    }

    /// Reallocates the buffer to the number of bytes in use.
    ///
    /// # Panics
    ///
    /// Aborts if the allocator fails.
    pub fn shrink_to_fit(&mut self) {
        if let Err(error) = self.raw.try_shrink_to_fit() {
            alloc_failed(error.into());
        }
    }

    /// The growth policy of this vector.
    #[inline]
    pub fn growth_policy(&self) -> &G {
        &self.policy
    }
}

impl<B: ?Sized + 'static, G> PolyVec<B, G> {
    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyVecError::IndexOutOfRange`] if `index >= self.size()`.
    #[inline]
    pub fn at(&self, index: usize) -> Result<&B, PolyVecError> {
        self.raw
            .get(index)
            .ok_or_else(|| PolyVecError::out_of_range(index, self.raw.len()))
    }

    /// Returns the element at `index` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`PolyVecError::IndexOutOfRange`] if `index >= self.size()`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut B, PolyVecError> {
        let len = self.raw.len();
        self.raw
            .get_mut(index)
            .ok_or_else(|| PolyVecError::out_of_range(index, len))
    }

    /// Returns the element at `index`, or `None` if it is out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&B> {
        self.raw.get(index)
    }

    /// Returns the element at `index` mutably, or `None` if it is out of
    /// range.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut B> {
        self.raw.get_mut(index)
    }

    /// The number of elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    /// The number of elements. Same as [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The size in bytes of the concrete value stored at `index`.
    ///
    /// Alignment padding between elements is not included.
    ///
    /// # Errors
    ///
    /// Returns [`PolyVecError::IndexOutOfRange`] if `index >= self.size()`.
    #[inline]
    pub fn size_at(&self, index: usize) -> Result<usize, PolyVecError> {
        self.raw
            .size_at(index)
            .ok_or_else(|| PolyVecError::out_of_range(index, self.raw.len()))
    }

    /// The [`TypeId`] of the concrete value stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyVecError::IndexOutOfRange`] if `index >= self.size()`.
    #[inline]
    pub fn type_id_at(&self, index: usize) -> Result<TypeId, PolyVecError> {
        self.raw
            .type_id_at(index)
            .ok_or_else(|| PolyVecError::out_of_range(index, self.raw.len()))
    }

    /// The [`core::any::type_name`] of the concrete value stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyVecError::IndexOutOfRange`] if `index >= self.size()`.
    #[inline]
    pub fn type_name_at(&self, index: usize) -> Result<&'static str, PolyVecError> {
        self.raw
            .type_name_at(index)
            .ok_or_else(|| PolyVecError::out_of_range(index, self.raw.len()))
    }

    /// Returns `true` if the value at `index` exists and is a `T`.
    #[inline]
    pub fn is_at<T: 'static>(&self, index: usize) -> bool {
        self.raw.type_id_at(index) == Some(TypeId::of::<T>())
    }

    /// Returns the value at `index` as its concrete type, or `None` if the
    /// index is out of range or the value is not a `T`.
    #[inline]
    pub fn downcast_ref<T: 'static>(&self, index: usize) -> Option<&T> {
        self.raw.downcast_ref(index)
    }

    /// Mutable version of [`downcast_ref`](Self::downcast_ref).
    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self, index: usize) -> Option<&mut T> {
        self.raw.downcast_mut(index)
    }

    /// Drops every element in insertion order. The buffer is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// The size of the buffer in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// The number of bytes in use, including padding between elements.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.raw.total_size()
    }

    /// The alignment of the buffer.
    #[inline]
    pub fn buffer_align(&self) -> usize {
        self.raw.align()
    }
}

impl<B: ?Sized + 'static, G: Default> Default for PolyVec<B, G> {
    #[inline]
    fn default() -> Self {
        Self {
            raw: RawPolyVec::new(),
            policy: G::default(),
        }
    }
}

impl<B: ?Sized + 'static, G> ops::Index<usize> for PolyVec<B, G> {
    type Output = B;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &B {
        match self.raw.get(index) {
            Some(element) => element,
            None => index_out_of_range(index, self.raw.len()),
        }
    }
}

impl<B: ?Sized + 'static, G> ops::IndexMut<usize> for PolyVec<B, G> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut B {
        let len = self.raw.len();
        match self.raw.get_mut(index) {
            Some(element) => element,
            None => index_out_of_range(index, len),
        }
    }
}

impl<B: ?Sized + fmt::Debug + 'static, G> fmt::Debug for PolyVec<B, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.raw.len()).filter_map(|index| self.raw.get(index)))
            .finish()
    }
}

#[cold]
#[track_caller]
fn index_out_of_range(index: usize, len: usize) -> ! {
    panic!("{}", PolyVecError::out_of_range(index, len))
}

/// Turns a failed reservation into a panic or an allocation-error abort, the
/// way `Vec` does.
#[cold]
#[track_caller]
fn alloc_failed(error: PolyVecError) -> ! {
    match error {
        PolyVecError::AllocationFailure { layout } => handle_alloc_error(layout),
        error => panic!("{error}"),
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::String};
    use core::cell::Cell;

    use super::*;
    use crate::poly_element;

    trait Animal {
        fn name(&self) -> &str;
        fn legs(&self) -> u32;
        fn rename(&mut self, name: &str);
    }

    #[derive(Debug)]
    struct Dog {
        name: String,
    }

    impl Animal for Dog {
        fn name(&self) -> &str {
            &self.name
        }

        fn legs(&self) -> u32 {
            4
        }

        fn rename(&mut self, name: &str) {
            self.name = String::from(name);
        }
    }

    #[derive(Debug)]
    struct Bird {
        wings: [u8; 2],
    }

    impl Animal for Bird {
        fn name(&self) -> &str {
            "bird"
        }

        fn legs(&self) -> u32 {
            2
        }

        fn rename(&mut self, _name: &str) {
            self.wings = [0, 0];
        }
    }

    impl fmt::Debug for dyn Animal {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}({})", self.name(), self.legs())
        }
    }

    poly_element!(dyn Animal => Dog, Bird);

    fn dog(name: &str) -> Dog {
        Dog {
            name: String::from(name),
        }
    }

    #[test]
    fn test_new_is_empty() {
        let vec = PolyVec::<dyn Animal>::new();
        assert_eq!(vec.size(), 0);
        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), 0);
        assert_eq!(vec.growth_policy(), &Geometric);
    }

    #[test]
    fn test_add_and_at() {
        let mut vec = PolyVec::<dyn Animal>::new();
        vec.add(dog("rex"));
        vec.add(Bird { wings: [1, 1] });

        assert_eq!(vec.size(), 2);
        assert_eq!(vec.at(0).unwrap().name(), "rex");
        assert_eq!(vec.at(1).unwrap().legs(), 2);
        assert_eq!(vec[1].name(), "bird");
    }

    #[test]
    fn test_at_out_of_range() {
        let mut vec = PolyVec::<dyn Animal>::new();
        assert_eq!(
            vec.at(0).err(),
            Some(PolyVecError::IndexOutOfRange { index: 0, len: 0 })
        );

        vec.add(dog("rex"));
        assert_eq!(
            vec.at_mut(1).err(),
            Some(PolyVecError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(
            vec.size_at(5).err(),
            Some(PolyVecError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert!(vec.type_id_at(1).is_err());
        assert!(vec.type_name_at(1).is_err());
        assert!(vec.get(1).is_none());
    }

    #[test]
    #[should_panic(expected = "index 2 is out of range for a poly vector of length 1")]
    fn test_index_panics() {
        let mut vec = PolyVec::<dyn Animal>::new();
        vec.add(dog("rex"));
        let _ = vec[2].legs();
    }

    #[test]
    fn test_at_mut() {
        let mut vec = PolyVec::<dyn Animal>::new();
        vec.add(dog("rex"));
        vec.at_mut(0).unwrap().rename("fido");
        vec[0].rename("max");
        assert_eq!(vec.at(0).unwrap().name(), "max");
    }

    #[test]
    fn test_size_at() {
        let mut vec = PolyVec::<dyn Animal>::new();
        vec.add(Bird { wings: [1, 1] });
        vec.add(dog("rex"));

        assert_eq!(vec.size_at(0), Ok(size_of::<Bird>()));
        assert_eq!(vec.size_at(1), Ok(size_of::<Dog>()));
    }

    #[test]
    fn test_downcast() {
        let mut vec = PolyVec::<dyn Animal>::new();
        vec.add(dog("rex"));
        vec.add(Bird { wings: [1, 2] });

        assert!(vec.is_at::<Dog>(0));
        assert!(!vec.is_at::<Dog>(1));
        assert!(!vec.is_at::<Dog>(2));
        assert_eq!(vec.downcast_ref::<Bird>(1).unwrap().wings, [1, 2]);
        assert!(vec.downcast_ref::<Bird>(0).is_none());

        vec.downcast_mut::<Dog>(0).unwrap().name.push('!');
        assert_eq!(vec[0].name(), "rex!");
        assert_eq!(vec.type_id_at(1), Ok(TypeId::of::<Bird>()));
        assert!(vec.type_name_at(0).unwrap().ends_with("Dog"));
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut vec = PolyVec::<dyn Animal>::new();
        for index in 0..8 {
            vec.add(dog(&format!("dog{index}")));
        }
        let capacity = vec.capacity();

        vec.clear();
        assert!(vec.is_empty());
        assert_eq!(vec.byte_len(), 0);
        assert_eq!(vec.capacity(), capacity);

        vec.add(Bird { wings: [0, 0] });
        assert_eq!(vec.size(), 1);
        assert_eq!(vec[0].name(), "bird");
    }

    #[test]
    fn test_with_capacity() {
        let mut vec = PolyVec::<dyn Animal>::with_capacity(256);
        assert_eq!(vec.capacity(), 256);
        assert_eq!(vec.buffer_align(), align_of::<usize>());

        vec.add(dog("rex"));
        vec.add(Bird { wings: [0, 0] });
        assert_eq!(vec.capacity(), 256);
    }

    #[test]
    fn test_try_with_capacity_overflow() {
        assert_eq!(
            PolyVec::<dyn Animal>::try_with_capacity(usize::MAX).err(),
            Some(PolyVecError::CapacityOverflow)
        );
    }

    #[test]
    fn test_reserve_and_shrink() {
        let mut vec = PolyVec::<dyn Animal>::new();
        vec.add(Bird { wings: [0, 0] });
        vec.reserve(100);
        assert!(vec.capacity() >= vec.byte_len() + 100);

        vec.shrink_to_fit();
        assert_eq!(vec.capacity(), vec.byte_len());
        assert_eq!(vec[0].legs(), 2);

        assert_eq!(vec.try_reserve(usize::MAX), Err(PolyVecError::CapacityOverflow));
    }

    #[test]
    fn test_custom_growth_policy() {
        struct Doubling;

        impl GrowthPolicy for Doubling {
            fn grow(&self, current: usize, required: usize, max: usize) -> usize {
                current.saturating_mul(2).max(required).min(max)
            }
        }

        let mut vec = PolyVec::<dyn Animal, _>::with_growth_policy(Doubling);
        assert_eq!(vec.growth_policy().grow(3, 4, 100), 6);
        vec.add(Bird { wings: [0, 0] });
        assert_eq!(vec.capacity(), 2);
        vec.add(Bird { wings: [0, 0] });
        assert_eq!(vec.capacity(), 4);
        vec.add(Bird { wings: [0, 0] });
        assert_eq!(vec.capacity(), 8);
    }

    #[test]
    fn test_relocated_hook() {
        trait Tracked {
            fn moves(&self) -> usize;
        }

        struct Mover {
            moves: Cell<usize>,
            _padding: [u64; 3],
        }

        impl Tracked for Mover {
            fn moves(&self) -> usize {
                self.moves.get()
            }
        }

        impl Element<dyn Tracked> for Mover {
            fn as_base(&self) -> &(dyn Tracked + 'static) {
                self
            }

            fn as_base_mut(&mut self) -> &mut (dyn Tracked + 'static) {
                self
            }

            fn relocated(&mut self) {
                self.moves.set(self.moves.get() + 1);
            }
        }

        let mover = || Mover {
            moves: Cell::new(0),
            _padding: [0; 3],
        };

        let mut vec = PolyVec::<dyn Tracked>::new();
        vec.add(mover());
        assert_eq!(vec[0].moves(), 0);

        vec.add(mover());
        assert_eq!(vec[0].moves(), 1);
        assert_eq!(vec[1].moves(), 0);
    }

    #[test]
    fn test_debug() {
        let mut vec = PolyVec::<dyn Animal>::new();
        vec.add(dog("rex"));
        vec.add(Bird { wings: [0, 0] });
        assert_eq!(format!("{vec:?}"), "[rex(4), bird(2)]");
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_not_impl_any!(PolyVec<dyn Animal>: Send, Sync);
    }
}
