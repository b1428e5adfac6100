//! # immutablecollections
//!
//! Immutable, value-semantic collections with deterministic iteration order,
//! canonical empty instances, and copy-on-first-write builders.
//!
//! ## Overview
//!
//! Five collection families, each with a module-level factory and a builder:
//!
//! - [`ImmutableList`]: immutable ordered sequence over a shared buffer
//! - [`ImmutableSet`]: deduplicated set iterating in first-insertion order,
//!   with an ordered view, set algebra, and optional element validation
//! - [`ImmutableDict`]: insertion-ordered key→value mapping
//! - [`ImmutableSetMultiDict`] / [`ImmutableListMultiDict`]: key→group
//!   mappings whose value-groups are sets or lists
//!
//! The design discipline shared by all families:
//!
//! - **Whole-instance sharing.** Built instances are never mutated, so they
//!   are shared instead of defensively copied: `clone` is a reference-count
//!   bump, and each factory applied to an already-immutable instance of its
//!   own family passes it through unchanged.
//! - **Canonical empties.** Every empty-construction path yields the same
//!   allocation-free value, and code paths that produce no content route to
//!   it rather than allocating.
//! - **Copy-on-first-write builders.** A builder seeded from an existing
//!   instance copies nothing until its first mutation, and building it
//!   unmutated returns the source itself.
//! - **Deterministic order.** Sets and dictionaries iterate in
//!   first-insertion order; construction from hash-ordered sources is a
//!   compile error unless explicitly overridden with [`AssumeOrdered`].
//!
//! ## Feature Flags
//!
//! - `arc`: share storage with `Arc` instead of `Rc`, making built
//!   collections `Send + Sync`
//! - `serde`: serialization to and reconstruction from the plain
//!   sequence/map forms, re-validating invariants on deserialize
//! - `fxhash` / `ahash`: swap the internal membership hashers
//! - `full`: `serde` + `arc`
//!
//! ## Example
//!
//! ```rust
//! use immutablecollections::{immutabledict, immutableset};
//!
//! let set = immutableset(vec![3, 1, 2, 3]);
//! assert_eq!(set.len(), 3);
//! assert_eq!(set.get(0), Some(&3)); // first-insertion order
//!
//! let dict = immutabledict(vec![("a", 1)]);
//! let merged = dict.to_builder().put("b", 2).build();
//! assert_eq!(merged.len(), 2);
//! assert_eq!(dict.len(), 1); // the source is never touched
//! ```
//!
//! ## Concurrency
//!
//! Construction is single-threaded: builders are consumed by value, so
//! exclusive access is enforced by the borrow checker rather than by runtime
//! defense. Built instances are safe for unrestricted concurrent reads under
//! the `arc` feature because they are never mutated after construction.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

mod check;
mod dict;
mod error;
mod list;
mod multidict;
mod set;
mod shared;
mod source;

pub use check::ElementCheck;
pub use dict::ImmutableDict;
pub use dict::ImmutableDictBuilder;
pub use dict::ImmutableDictIntoIterator;
pub use dict::ImmutableDictIterator;
pub use dict::ImmutableDictKeysIterator;
pub use dict::ImmutableDictValuesIterator;
pub use dict::immutabledict;
pub use dict::immutabledict_from_unique_keys;
pub use error::CheckViolation;
pub use error::DuplicateElements;
pub use error::DuplicateKeys;
pub use error::UnionCheckViolation;
pub use error::UnionSide;
pub use list::ImmutableList;
pub use list::ImmutableListBuilder;
pub use list::ImmutableListIntoIterator;
pub use list::immutablelist;
pub use multidict::ImmutableListMultiDict;
pub use multidict::ImmutableListMultiDictBuilder;
pub use multidict::ImmutableListMultiDictIterator;
pub use multidict::ImmutableSetMultiDict;
pub use multidict::ImmutableSetMultiDictBuilder;
pub use multidict::ImmutableSetMultiDictIterator;
pub use multidict::immutablelistmultidict;
pub use multidict::immutablesetmultidict;
pub use set::CheckedImmutableSetBuilder;
pub use set::ImmutableSet;
pub use set::ImmutableSetBuilder;
pub use set::ImmutableSetIntoIterator;
pub use set::ImmutableSetIterator;
pub use set::immutableset;
pub use set::immutableset_checked;
pub use set::immutableset_from_unique_elements;
pub use source::AssumeOrdered;
pub use source::DictSource;
pub use source::IntoImmutableDict;
pub use source::IntoImmutableList;
pub use source::IntoImmutableListMultiDict;
pub use source::IntoImmutableSet;
pub use source::IntoImmutableSetMultiDict;
pub use source::ListMultiDictSource;
pub use source::ListSource;
pub use source::SetMultiDictSource;
pub use source::SetSource;

/// Prelude module for convenient imports.
///
/// Re-exports the collection types, factories, and conversion traits.
///
/// # Usage
///
/// ```rust
/// use immutablecollections::prelude::*;
///
/// let set = immutableset(vec![1, 2, 3]);
/// assert_eq!(set.len(), 3);
/// ```
pub mod prelude {
    pub use crate::check::ElementCheck;
    pub use crate::dict::{ImmutableDict, immutabledict, immutabledict_from_unique_keys};
    pub use crate::list::{ImmutableList, immutablelist};
    pub use crate::multidict::{
        ImmutableListMultiDict, ImmutableSetMultiDict, immutablelistmultidict,
        immutablesetmultidict,
    };
    pub use crate::set::{
        ImmutableSet, immutableset, immutableset_checked, immutableset_from_unique_elements,
    };
    pub use crate::source::{
        AssumeOrdered, IntoImmutableDict, IntoImmutableList, IntoImmutableListMultiDict,
        IntoImmutableSet, IntoImmutableSetMultiDict,
    };
}
