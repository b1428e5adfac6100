//! Construction sources: conversion traits and the ordered-input guard.
//!
//! Every collection family has a module-level factory (`immutablelist`,
//! `immutableset`, …) that is generic over a per-family conversion trait.
//! The traits serve two purposes:
//!
//! 1. **Identity passthrough.** The implementation for the family's own type
//!    is the identity: the existing instance flows through the factory
//!    without copying, because it is immutable and already satisfies every
//!    invariant. Repeatedly wrapping an already-immutable value is
//!    near-zero-cost.
//! 2. **Order-determinism guard.** Sets, dictionaries, and multidicts
//!    preserve first-insertion iteration order, so they must be constructed
//!    from sources whose own iteration order is deterministic. Types with
//!    hash-dependent iteration order (`std::collections::HashSet`,
//!    `std::collections::HashMap`) deliberately do not implement the
//!    conversion traits: constructing from them is a compile error rather
//!    than a silent loss of determinism.
//!
//! The guard can be overridden with [`AssumeOrdered`], which admits any
//! iterator by explicit caller assertion:
//!
//! ```rust
//! use immutablecollections::{AssumeOrdered, immutableset};
//! use std::collections::HashSet;
//!
//! let hash_ordered: HashSet<i32> = [1, 2, 3].into_iter().collect();
//! // The caller takes responsibility for iteration order.
//! let set = immutableset(AssumeOrdered(hash_ordered));
//! assert_eq!(set.len(), 3);
//! ```
//!
//! Without the wrapper the same call does not compile:
//!
//! ```compile_fail
//! use immutablecollections::immutableset;
//! use std::collections::HashSet;
//!
//! let hash_ordered: HashSet<i32> = [1, 2, 3].into_iter().collect();
//! let set = immutableset(hash_ordered);
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::dict::ImmutableDict;
use crate::list::ImmutableList;
use crate::multidict::{ImmutableListMultiDict, ImmutableSetMultiDict};
use crate::set::ImmutableSet;

// =============================================================================
// Ordered-Input Opt-Out
// =============================================================================

/// Admits an arbitrary iterator to order-sensitive construction.
///
/// Wrapping a source in `AssumeOrdered` is the caller's explicit assertion
/// that its iteration order is deterministic (or that order does not matter
/// for the use at hand). This is the opt-out for the compile-time
/// order-determinism guard described in the [module docs](self).
#[derive(Debug, Clone, Copy)]
pub struct AssumeOrdered<I>(pub I);

// =============================================================================
// Source Enums
// =============================================================================

/// Resolved input to the [`immutablelist`] factory.
///
/// [`immutablelist`]: crate::immutablelist
pub enum ListSource<T> {
    /// An existing list to be passed through unchanged.
    Built(ImmutableList<T>),
    /// Raw items to build a fresh list from.
    Items(Vec<T>),
}

/// Resolved input to the [`immutableset`] family of factories.
///
/// [`immutableset`]: crate::immutableset
pub enum SetSource<T> {
    /// An existing set to be passed through unchanged.
    Built(ImmutableSet<T>),
    /// Raw items, in iteration order, to deduplicate and build from.
    Items(Vec<T>),
}

/// Resolved input to the [`immutabledict`] family of factories.
///
/// [`immutabledict`]: crate::immutabledict
pub enum DictSource<K, V> {
    /// An existing dictionary to be passed through unchanged.
    Built(ImmutableDict<K, V>),
    /// Raw key-value pairs, in iteration order, to build from.
    Pairs(Vec<(K, V)>),
}

/// Resolved input to the [`immutablesetmultidict`] factory.
///
/// [`immutablesetmultidict`]: crate::immutablesetmultidict
pub enum SetMultiDictSource<K, V> {
    /// An existing multidict to be passed through unchanged.
    Built(ImmutableSetMultiDict<K, V>),
    /// Raw key-value pairs, in iteration order, to build from.
    Pairs(Vec<(K, V)>),
}

/// Resolved input to the [`immutablelistmultidict`] factory.
///
/// [`immutablelistmultidict`]: crate::immutablelistmultidict
pub enum ListMultiDictSource<K, V> {
    /// An existing multidict to be passed through unchanged.
    Built(ImmutableListMultiDict<K, V>),
    /// Raw key-value pairs, in iteration order, to build from.
    Pairs(Vec<(K, V)>),
}

// =============================================================================
// Conversion Traits
// =============================================================================

/// Types that can be turned into an [`ImmutableList`].
pub trait IntoImmutableList<T> {
    /// Resolves this value into a [`ListSource`].
    fn into_list_source(self) -> ListSource<T>;
}

/// Types with deterministic iteration order that can be turned into an
/// [`ImmutableSet`].
///
/// `std::collections::HashSet` intentionally does not implement this trait;
/// see the [module docs](self) for the rationale and the [`AssumeOrdered`]
/// opt-out.
pub trait IntoImmutableSet<T> {
    /// Resolves this value into a [`SetSource`].
    fn into_set_source(self) -> SetSource<T>;
}

/// Types with deterministic iteration order that can be turned into an
/// [`ImmutableDict`].
///
/// `std::collections::HashMap` intentionally does not implement this trait;
/// see the [module docs](self) for the rationale and the [`AssumeOrdered`]
/// opt-out.
pub trait IntoImmutableDict<K, V> {
    /// Resolves this value into a [`DictSource`].
    fn into_dict_source(self) -> DictSource<K, V>;
}

/// Pair sources with deterministic iteration order that can be turned into
/// an [`ImmutableSetMultiDict`].
pub trait IntoImmutableSetMultiDict<K, V> {
    /// Resolves this value into a [`SetMultiDictSource`].
    fn into_set_multidict_source(self) -> SetMultiDictSource<K, V>;
}

/// Pair sources with deterministic iteration order that can be turned into
/// an [`ImmutableListMultiDict`].
pub trait IntoImmutableListMultiDict<K, V> {
    /// Resolves this value into a [`ListMultiDictSource`].
    fn into_list_multidict_source(self) -> ListMultiDictSource<K, V>;
}

// =============================================================================
// List Implementations
// =============================================================================

impl<T> IntoImmutableList<T> for ImmutableList<T> {
    #[inline]
    fn into_list_source(self) -> ListSource<T> {
        ListSource::Built(self)
    }
}

impl<T> IntoImmutableList<T> for &ImmutableList<T> {
    #[inline]
    fn into_list_source(self) -> ListSource<T> {
        // Shares the backing storage; no elements are copied.
        ListSource::Built(self.clone())
    }
}

impl<T> IntoImmutableList<T> for Vec<T> {
    #[inline]
    fn into_list_source(self) -> ListSource<T> {
        ListSource::Items(self)
    }
}

impl<T: Clone> IntoImmutableList<T> for &Vec<T> {
    #[inline]
    fn into_list_source(self) -> ListSource<T> {
        ListSource::Items(self.clone())
    }
}

impl<T: Clone> IntoImmutableList<T> for &[T] {
    #[inline]
    fn into_list_source(self) -> ListSource<T> {
        ListSource::Items(self.to_vec())
    }
}

impl<T, const N: usize> IntoImmutableList<T> for [T; N] {
    #[inline]
    fn into_list_source(self) -> ListSource<T> {
        ListSource::Items(self.into())
    }
}

impl<T> IntoImmutableList<T> for VecDeque<T> {
    #[inline]
    fn into_list_source(self) -> ListSource<T> {
        ListSource::Items(self.into_iter().collect())
    }
}

impl<I: IntoIterator> IntoImmutableList<I::Item> for AssumeOrdered<I> {
    #[inline]
    fn into_list_source(self) -> ListSource<I::Item> {
        ListSource::Items(self.0.into_iter().collect())
    }
}

// =============================================================================
// Set Implementations
// =============================================================================

impl<T> IntoImmutableSet<T> for ImmutableSet<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Built(self)
    }
}

impl<T: Clone> IntoImmutableSet<T> for &ImmutableSet<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        // Shares the backing storage; no elements are copied.
        SetSource::Built(self.clone())
    }
}

impl<T> IntoImmutableSet<T> for Vec<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self)
    }
}

impl<T: Clone> IntoImmutableSet<T> for &Vec<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self.clone())
    }
}

impl<T: Clone> IntoImmutableSet<T> for &[T] {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self.to_vec())
    }
}

impl<T, const N: usize> IntoImmutableSet<T> for [T; N] {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self.into())
    }
}

impl<T> IntoImmutableSet<T> for VecDeque<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self.into_iter().collect())
    }
}

// B-tree iteration order is sorted, hence deterministic.
impl<T> IntoImmutableSet<T> for BTreeSet<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self.into_iter().collect())
    }
}

impl<T: Clone> IntoImmutableSet<T> for ImmutableList<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self.to_vec())
    }
}

impl<T: Clone> IntoImmutableSet<T> for &ImmutableList<T> {
    #[inline]
    fn into_set_source(self) -> SetSource<T> {
        SetSource::Items(self.to_vec())
    }
}

impl<I: IntoIterator> IntoImmutableSet<I::Item> for AssumeOrdered<I> {
    #[inline]
    fn into_set_source(self) -> SetSource<I::Item> {
        SetSource::Items(self.0.into_iter().collect())
    }
}

// =============================================================================
// Dict Implementations
// =============================================================================

impl<K, V> IntoImmutableDict<K, V> for ImmutableDict<K, V> {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Built(self)
    }
}

impl<K, V> IntoImmutableDict<K, V> for &ImmutableDict<K, V> {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        // Shares the backing storage; no entries are copied.
        DictSource::Built(self.clone())
    }
}

impl<K, V> IntoImmutableDict<K, V> for Vec<(K, V)> {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Pairs(self)
    }
}

impl<K: Clone, V: Clone> IntoImmutableDict<K, V> for &Vec<(K, V)> {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Pairs(self.clone())
    }
}

impl<K: Clone, V: Clone> IntoImmutableDict<K, V> for &[(K, V)] {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Pairs(self.to_vec())
    }
}

impl<K, V, const N: usize> IntoImmutableDict<K, V> for [(K, V); N] {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Pairs(self.into())
    }
}

// B-tree iteration order is sorted, hence deterministic.
impl<K, V> IntoImmutableDict<K, V> for BTreeMap<K, V> {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Pairs(self.into_iter().collect())
    }
}

// IndexMap iterates in insertion order regardless of its hasher.
impl<K, V, S> IntoImmutableDict<K, V> for indexmap::IndexMap<K, V, S> {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Pairs(self.into_iter().collect())
    }
}

impl<K, V, I: IntoIterator<Item = (K, V)>> IntoImmutableDict<K, V> for AssumeOrdered<I> {
    #[inline]
    fn into_dict_source(self) -> DictSource<K, V> {
        DictSource::Pairs(self.0.into_iter().collect())
    }
}

// =============================================================================
// MultiDict Implementations
// =============================================================================

impl<K, V> IntoImmutableSetMultiDict<K, V> for ImmutableSetMultiDict<K, V> {
    #[inline]
    fn into_set_multidict_source(self) -> SetMultiDictSource<K, V> {
        SetMultiDictSource::Built(self)
    }
}

impl<K, V> IntoImmutableSetMultiDict<K, V> for &ImmutableSetMultiDict<K, V> {
    #[inline]
    fn into_set_multidict_source(self) -> SetMultiDictSource<K, V> {
        // Shares the backing storage; no entries are copied.
        SetMultiDictSource::Built(self.clone())
    }
}

impl<K, V> IntoImmutableSetMultiDict<K, V> for Vec<(K, V)> {
    #[inline]
    fn into_set_multidict_source(self) -> SetMultiDictSource<K, V> {
        SetMultiDictSource::Pairs(self)
    }
}

impl<K: Clone, V: Clone> IntoImmutableSetMultiDict<K, V> for &[(K, V)] {
    #[inline]
    fn into_set_multidict_source(self) -> SetMultiDictSource<K, V> {
        SetMultiDictSource::Pairs(self.to_vec())
    }
}

impl<K, V, const N: usize> IntoImmutableSetMultiDict<K, V> for [(K, V); N] {
    #[inline]
    fn into_set_multidict_source(self) -> SetMultiDictSource<K, V> {
        SetMultiDictSource::Pairs(self.into())
    }
}

impl<K, V, I: IntoIterator<Item = (K, V)>> IntoImmutableSetMultiDict<K, V> for AssumeOrdered<I> {
    #[inline]
    fn into_set_multidict_source(self) -> SetMultiDictSource<K, V> {
        SetMultiDictSource::Pairs(self.0.into_iter().collect())
    }
}

impl<K, V> IntoImmutableListMultiDict<K, V> for ImmutableListMultiDict<K, V> {
    #[inline]
    fn into_list_multidict_source(self) -> ListMultiDictSource<K, V> {
        ListMultiDictSource::Built(self)
    }
}

impl<K, V> IntoImmutableListMultiDict<K, V> for &ImmutableListMultiDict<K, V> {
    #[inline]
    fn into_list_multidict_source(self) -> ListMultiDictSource<K, V> {
        // Shares the backing storage; no entries are copied.
        ListMultiDictSource::Built(self.clone())
    }
}

impl<K, V> IntoImmutableListMultiDict<K, V> for Vec<(K, V)> {
    #[inline]
    fn into_list_multidict_source(self) -> ListMultiDictSource<K, V> {
        ListMultiDictSource::Pairs(self)
    }
}

impl<K: Clone, V: Clone> IntoImmutableListMultiDict<K, V> for &[(K, V)] {
    #[inline]
    fn into_list_multidict_source(self) -> ListMultiDictSource<K, V> {
        ListMultiDictSource::Pairs(self.to_vec())
    }
}

impl<K, V, const N: usize> IntoImmutableListMultiDict<K, V> for [(K, V); N] {
    #[inline]
    fn into_list_multidict_source(self) -> ListMultiDictSource<K, V> {
        ListMultiDictSource::Pairs(self.into())
    }
}

impl<K, V, I: IntoIterator<Item = (K, V)>> IntoImmutableListMultiDict<K, V> for AssumeOrdered<I> {
    #[inline]
    fn into_list_multidict_source(self) -> ListMultiDictSource<K, V> {
        ListMultiDictSource::Pairs(self.0.into_iter().collect())
    }
}
