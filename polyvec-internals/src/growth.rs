//! Buffer growth policies.

/// Decides how large a buffer becomes when it has to be reallocated.
///
/// The container calls [`grow`](GrowthPolicy::grow) with the current capacity
/// and the smallest capacity that fits the pending insertion. Returning less
/// than `required` is allowed; the container then asks for exactly `required`.
pub trait GrowthPolicy {
    /// Returns the capacity in bytes to allocate.
    ///
    /// `max` is the largest capacity that can be represented for the buffer's
    /// alignment.
    fn grow(&self, current: usize, required: usize, max: usize) -> usize;
}

/// Geometric growth by a factor of 1.5.
///
/// The new capacity is `max(required, current + current / 2)`, capped at the
/// largest representable size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometric;

impl GrowthPolicy for Geometric {
    #[inline]
    fn grow(&self, current: usize, required: usize, max: usize) -> usize {
        if current > max - current / 2 {
            return max;
        }

        let geometric = current + current / 2;
        if required >= geometric {
            required
        } else {
            geometric
        }
    }
}

/// Allocates exactly the required capacity on every reallocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exact;

impl GrowthPolicy for Exact {
    #[inline]
    fn grow(&self, _current: usize, required: usize, _max: usize) -> usize {
        required
    }
}

impl<G: GrowthPolicy + ?Sized> GrowthPolicy for &G {
    #[inline]
    fn grow(&self, current: usize, required: usize, max: usize) -> usize {
        (**self).grow(current, required, max)
    }
}
