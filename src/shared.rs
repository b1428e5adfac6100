//! Crate-internal type aliases and hashing helpers.
//!
//! The collection families share three pieces of plumbing:
//!
//! - [`ReferenceCounter`]: the shared-ownership pointer used for
//!   whole-instance sharing of backing storage. `Rc` by default, `Arc` when
//!   the `arc` feature is enabled.
//! - [`LazyValue`]: the one-shot cell used for lazily computed, cached values
//!   (the multidict total-length cache). Switches alongside
//!   [`ReferenceCounter`] so cached state stays thread-safe exactly when the
//!   collections themselves are.
//! - [`Membership`] / [`OrderedEntries`]: the backing hash structures. The
//!   default hasher can be swapped for `rustc-hash` or `ahash` via the
//!   `fxhash` / `ahash` features without affecting the crate-visible `Hash`
//!   implementations, which always go through [`element_hash`] /
//!   [`pair_hash`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

/// One-shot lazily-initialized cell, paired with [`ReferenceCounter`]:
/// `OnceLock` when collections are `Arc`-shared, `OnceCell` otherwise.
#[cfg(feature = "arc")]
pub(crate) type LazyValue<T> = std::sync::OnceLock<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type LazyValue<T> = std::cell::OnceCell<T>;

// =============================================================================
// Backing Hash Structures
// =============================================================================

#[cfg(feature = "fxhash")]
pub(crate) type DefaultBuildHasher = rustc_hash::FxBuildHasher;

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub(crate) type DefaultBuildHasher = ahash::RandomState;

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub(crate) type DefaultBuildHasher = std::collections::hash_map::RandomState;

/// Hash-based membership structure backing the general set representation.
pub(crate) type Membership<T> = std::collections::HashSet<T, DefaultBuildHasher>;

/// Insertion-ordered hash map backing the dictionary families.
pub(crate) type OrderedEntries<K, V> = indexmap::IndexMap<K, V, DefaultBuildHasher>;

// =============================================================================
// Range clamping
// =============================================================================

/// Resolves a range over an ordered view to clamped `(start, end)` bounds.
///
/// Out-of-range bounds degrade gracefully instead of panicking: slicing
/// beyond the end yields an empty range, matching the graceful-slicing
/// contract of the ordered collection views.
pub(crate) fn clamp_range(
    range: impl std::ops::RangeBounds<usize>,
    length: usize,
) -> (usize, usize) {
    use std::ops::Bound;

    let start = match range.start_bound() {
        Bound::Included(&bound) => bound,
        Bound::Excluded(&bound) => bound.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&bound) => bound.saturating_add(1),
        Bound::Excluded(&bound) => bound,
        Bound::Unbounded => length,
    };
    (start.min(length), end.min(length))
}

// =============================================================================
// Hash computation
// =============================================================================

/// Computes the hash of a single element using `DefaultHasher`.
///
/// Used by the order-insensitive `Hash` implementations: per-element hashes
/// are combined with XOR so that iteration order does not affect the result.
pub(crate) fn element_hash<T: Hash + ?Sized>(element: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    element.hash(&mut hasher);
    hasher.finish()
}

/// Computes the hash of a key-value pair using `DefaultHasher`.
pub(crate) fn pair_hash<K: Hash + ?Sized, V: Hash + ?Sized>(key: &K, value: &V) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    value.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Tests
// =============================================================================
