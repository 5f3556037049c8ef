#![cfg_attr(not(doc), no_std)]
#![forbid(unsafe_code)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A growable vector that stores values of different types contiguously.
//!
//! ## Overview
//!
//! A `Vec<Box<dyn Trait>>` puts every element in its own heap allocation and
//! reaches it through a pointer. [`PolyVec<dyn Trait>`](PolyVec) instead writes
//! the values themselves, whatever their concrete type, back to back into a
//! single buffer, and hands them out as `&dyn Trait`. Adding is amortized O(1)
//! like `Vec::push`, and iterating by index walks memory in order.
//!
//! ## Quick Example
//!
//! ```
//! use polyvec::prelude::*;
//!
//! trait Greet {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! struct Named {
//!     name: &'static str,
//!     excited: bool,
//! }
//!
//! impl Greet for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! impl Greet for Named {
//!     fn greet(&self) -> String {
//!         let mark = if self.excited { "!" } else { "" };
//!         format!("hello {}{mark}", self.name)
//!     }
//! }
//!
//! poly_element!(dyn Greet => English, Named);
//!
//! let mut greeters = PolyVec::<dyn Greet>::new();
//! greeters.add(English);
//! greeters.add(Named { name: "world", excited: true });
//!
//! let greetings: Vec<String> = (0..greeters.size())
//!     .map(|index| greeters[index].greet())
//!     .collect();
//! assert_eq!(greetings, ["hello", "hello world!"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **The interface** `B`, usually `dyn Trait`, is how every element is seen
//!   after insertion.
//! - **Elements** are values of any type implementing [`Element<B>`]. The
//!   trait has two methods that view the value as a `B`; for trait objects
//!   they are a plain coercion, which [`poly_element!`] writes for you.
//!   Forgetting the implementation is a compile error, not a runtime one.
//! - **Growth** happens when an added value does not fit. A new, larger buffer
//!   is allocated first, then every element is moved into it at the same
//!   offset, then the old buffer is freed. Values are moved, never cloned, and
//!   each element learns about the move through [`Element::relocated`]. How
//!   much larger the buffer gets is decided by a [`GrowthPolicy`]; the
//!   default, [`Geometric`], grows by 1.5×.
//! - **References** returned by [`PolyVec::at`] borrow the vector, so the
//!   compiler rejects any use of them after a call that might reallocate.
//!
//! Elements cannot be removed one by one; [`PolyVec::clear`] drops all of
//! them. The vector is not `Send` or `Sync`.
//!
//! ## Errors
//!
//! Lookups with an out-of-range index return
//! [`PolyVecError::IndexOutOfRange`]. Growth failures abort or panic in
//! [`PolyVec::add`], the same way `Vec::push` does, and are returned as
//! [`PolyVecError`] from [`PolyVec::try_add`].
//!
//! For implementation details, see the [`polyvec-internals`] crate.
//!
//! [`polyvec-internals`]: polyvec_internals
//! [`Geometric`]: growth::Geometric
//! [`GrowthPolicy`]: growth::GrowthPolicy

extern crate alloc;

mod error;
mod macros;
mod poly_vec;
pub mod prelude;

/// Policies deciding how much the buffer grows.
pub mod growth {
    pub use polyvec_internals::growth::{Exact, Geometric, GrowthPolicy};
}

pub use polyvec_internals::Element;

pub use self::{error::PolyVecError, poly_vec::PolyVec};
