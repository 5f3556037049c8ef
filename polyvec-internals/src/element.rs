//! The capability trait every type stored in a [`RawPolyVec`] implements.
//!
//! [`RawPolyVec`]: crate::RawPolyVec

/// A concrete type that can be stored in a poly vector whose common interface
/// is `B`.
///
/// `B` is normally a trait object type such as `dyn Shape`. The two projection
/// methods are how the container turns a stored value back into the common
/// interface without ever naming the concrete type again; for a trait object
/// they are just the implicit unsizing coercion `self`.
///
/// Implementing this trait is the only requirement for storing a type. A type
/// that does not implement it for the container's `B` is rejected at compile
/// time.
///
/// # Relocation
///
/// When the container outgrows its buffer, every element is moved to the new
/// allocation at the same relative offset. The move is a bitwise copy; the old
/// location is treated as uninitialized afterwards and is never dropped. Once
/// the new buffer is in place, [`relocated`](Element::relocated) is called on
/// every element that moved. Values are never cloned by the container.
///
/// # Examples
///
/// ```
/// use polyvec_internals::Element;
///
/// trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// impl Element<dyn Shape> for Square {
///     fn as_base(&self) -> &(dyn Shape + 'static) {
///         self
///     }
///
///     fn as_base_mut(&mut self) -> &mut (dyn Shape + 'static) {
///         self
///     }
/// }
/// ```
pub trait Element<B: ?Sized + 'static>: Sized + 'static {
    /// Views this value through the common interface.
    fn as_base(&self) -> &B;

    /// Views this value mutably through the common interface.
    fn as_base_mut(&mut self) -> &mut B;

    /// Called after this value has been moved to a new address by a buffer
    /// reallocation.
    ///
    /// The default implementation does nothing.
    #[inline]
    fn relocated(&mut self) {}
}
