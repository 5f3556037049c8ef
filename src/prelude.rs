//! Commonly used items for convenient importing.
//!
//! ```rust
//! use polyvec::prelude::*;
//!
//! trait Tick {
//!     fn tick(&mut self) -> u32;
//! }
//!
//! struct Counter(u32);
//!
//! impl Tick for Counter {
//!     fn tick(&mut self) -> u32 {
//!         self.0 += 1;
//!         self.0
//!     }
//! }
//!
//! poly_element!(dyn Tick => Counter);
//!
//! fn first_tick(ticks: &mut PolyVec<dyn Tick>) -> Result<u32, PolyVecError> {
//!     Ok(ticks.at_mut(0)?.tick())
//! }
//!
//! let mut ticks = PolyVec::<dyn Tick>::new();
//! assert!(first_tick(&mut ticks).is_err());
//! ticks.add(Counter(0));
//! assert_eq!(first_tick(&mut ticks), Ok(1));
//! ```

pub use crate::{
    Element, PolyVec, PolyVecError,
    growth::{Geometric, GrowthPolicy},
    poly_element,
};
