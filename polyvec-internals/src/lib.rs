#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`polyvec`].
//!
//! # Overview
//!
//! This crate contains the type-erased storage and every unsafe operation
//! behind the [`polyvec`] container: values of different concrete types are
//! written back to back into a single aligned byte buffer and later read back
//! through a common interface type `B`, usually a trait object.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`polyvec`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - [`RawPolyVec`]: the container. Owns the buffer and the offset table,
//!   places new values, relocates all values when the buffer grows, and drops
//!   them on [`clear`](RawPolyVec::clear) or drop.
//! - [`RawBuffer`]: an exclusively owned, aligned block of uninitialized bytes.
//! - [`ElementVtable`]: function pointers for dropping, relocating and
//!   projecting an element whose concrete type has been erased. One `&'static`
//!   vtable exists per pair of element type and interface type.
//! - [`Element`]: the trait a type implements to be storable. It projects the
//!   value to the interface type and may react to being relocated.
//! - [`growth`]: the policy deciding the new capacity when the buffer grows.
//!
//! # Safety Strategy
//!
//! - **Module-based encapsulation**: the fields of [`RawBuffer`],
//!   [`ElementVtable`] and [`RawPolyVec`] are private to their modules, so each
//!   invariant can be checked by reading a single file.
//! - **Vtables built at compile time**: a vtable is created together with the
//!   value it describes, from the same type parameter, so the two cannot
//!   disagree.
//! - **Offsets instead of pointers**: element addresses are recomputed from
//!   the current buffer on every access, and every reference borrows the
//!   container, so a reallocation can never leave a dangling reference behind.
//!
//! [`polyvec`]: https://docs.rs/polyvec/latest/polyvec/
//! [`RawBuffer`]: buffer::RawBuffer
//! [`ElementVtable`]: vtable::ElementVtable

extern crate alloc;

mod buffer;
mod element;
mod error;
pub mod growth;
mod raw;
mod vtable;

pub use element::Element;
pub use error::RawAllocError;
pub use raw::RawPolyVec;
