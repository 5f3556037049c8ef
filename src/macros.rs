/// Implements [`Element`] for one or more types.
///
/// `poly_element!(dyn Trait => A, B<3>)` lets `A` and `B<3>` be stored in a
/// `PolyVec<dyn Trait>`. Each listed type must implement the trait. The
/// interface is written as `dyn` followed by a trait path.
///
/// The generated implementation keeps the default
/// [`relocated`](crate::Element::relocated) hook; write the impl by hand when
/// a type needs to react to being moved.
///
/// [`Element`]: crate::Element
///
/// # Examples
///
/// ```
/// use polyvec::{PolyVec, poly_element};
///
/// trait Sensor {
///     fn read(&self) -> i32;
/// }
///
/// struct Fixed(i32);
///
/// struct Window<const N: usize> {
///     samples: [i32; N],
/// }
///
/// impl Sensor for Fixed {
///     fn read(&self) -> i32 {
///         self.0
///     }
/// }
///
/// impl<const N: usize> Sensor for Window<N> {
///     fn read(&self) -> i32 {
///         self.samples.iter().sum()
///     }
/// }
///
/// poly_element!(dyn Sensor => Fixed, Window<2>, Window<16>);
///
/// let mut sensors = PolyVec::<dyn Sensor>::new();
/// sensors.add(Fixed(3));
/// sensors.add(Window { samples: [1, 2] });
/// assert_eq!(sensors[1].read(), 3);
/// ```
#[macro_export]
macro_rules! poly_element {
    (dyn $base:path => $($element:ty),+ $(,)?) => {
        $(
            impl $crate::Element<dyn $base> for $element {
                #[inline]
                fn as_base(&self) -> &(dyn $base + 'static) {
                    self
                }

                #[inline]
                fn as_base_mut(&mut self) -> &mut (dyn $base + 'static) {
                    self
                }
            }
        )+
    };
}
