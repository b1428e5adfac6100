//! Immutable key→value mapping with insertion-ordered iteration.
//!
//! This module provides [`ImmutableDict`], an immutable mapping whose keys,
//! values, and entries iterate in the order keys were first inserted.
//! Iteration order is ignored when determining equality and hash codes,
//! matching standard mapping semantics.
//!
//! # Overview
//!
//! - O(1) lookup through an insertion-ordered hash map backing
//! - Deterministic iteration in first-insertion order of keys
//! - Canonical empty, identity-preserving factory, and a
//!   copy-on-first-write builder seeded from an existing instance
//! - Construction helpers: [`ImmutableDict::index_by`],
//!   [`ImmutableDict::inverse`], [`ImmutableDict::filter_keys`]
//!
//! # Examples
//!
//! ```rust
//! use immutablecollections::immutabledict;
//!
//! let dict = immutabledict(vec![("a", 1), ("b", 2)]);
//! assert_eq!(dict.get("a"), Some(&1));
//!
//! // A builder seeded from an existing dictionary copies nothing until the
//! // first mutation; building without one returns the source itself.
//! let same = dict.to_builder().build();
//! assert!(same.ptr_eq(&dict));
//!
//! let extended = dict.to_builder().put("c", 3).build();
//! assert_eq!(extended.len(), 3);
//! assert_eq!(dict.len(), 2); // source unchanged
//! ```

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::Index;

use crate::error::DuplicateKeys;
use crate::shared::{
    DefaultBuildHasher, Membership, OrderedEntries, ReferenceCounter, pair_hash,
};
use crate::source::{DictSource, IntoImmutableDict};

// =============================================================================
// Factories
// =============================================================================

/// Creates an immutable dictionary with the given mappings.
///
/// The iteration order of the created keys, values, and entries matches the
/// source; a repeated key silently keeps the later value at the first
/// occurrence's position. If the source is already an [`ImmutableDict`], it
/// is returned unchanged — immutable instances can always be shared safely.
///
/// Sources must have deterministic iteration order; hash-ordered inputs are
/// rejected at compile time unless wrapped in
/// [`AssumeOrdered`](crate::AssumeOrdered).
///
/// # Examples
///
/// ```rust
/// use immutablecollections::immutabledict;
///
/// let dict = immutabledict(vec![("a", 1), ("b", 2), ("a", 3)]);
/// assert_eq!(dict.len(), 2);
/// assert_eq!(dict.get("a"), Some(&3));
///
/// let same = immutabledict(&dict);
/// assert!(same.ptr_eq(&dict));
/// ```
#[must_use]
pub fn immutabledict<K, V, S>(source: S) -> ImmutableDict<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: IntoImmutableDict<K, V>,
{
    match source.into_dict_source() {
        DictSource::Built(dict) => dict,
        DictSource::Pairs(pairs) => ImmutableDict::from_pairs(pairs),
    }
}

/// Creates an immutable dictionary, erroring if the source repeats a key.
///
/// The returned [`DuplicateKeys`] error names every key that occurred more
/// than once. The duplicate-finding scan only runs once a length mismatch
/// between input and deduplicated output has been detected, so the common
/// path pays nothing for it.
///
/// # Errors
///
/// Returns [`DuplicateKeys`] if any key occurs more than once.
///
/// # Examples
///
/// ```rust
/// use immutablecollections::immutabledict_from_unique_keys;
///
/// let error =
///     immutabledict_from_unique_keys(vec![(7, 8), (9, 10), (7, 11), (9, 12)]).unwrap_err();
/// assert_eq!(error.keys(), &[7, 9]);
/// ```
pub fn immutabledict_from_unique_keys<K, V, S>(
    source: S,
) -> Result<ImmutableDict<K, V>, DuplicateKeys<K>>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: IntoImmutableDict<K, V>,
{
    match source.into_dict_source() {
        // An existing ImmutableDict cannot contain repeated keys.
        DictSource::Built(dict) => Ok(dict),
        DictSource::Pairs(pairs) => {
            let mut entries = new_entries(pairs.len());
            for (key, value) in &pairs {
                entries.insert(key.clone(), value.clone());
            }
            if entries.len() == pairs.len() {
                Ok(ImmutableDict::from_entries(entries))
            } else {
                Err(DuplicateKeys::new(duplicate_key_scan(pairs)))
            }
        }
    }
}

fn new_entries<K, V>(capacity: usize) -> OrderedEntries<K, V> {
    OrderedEntries::with_capacity_and_hasher(capacity, DefaultBuildHasher::default())
}

/// Finds every key occurring more than once, in first-occurrence order.
///
/// Only called on the failure path, after a length mismatch has already been
/// detected; the result is guaranteed non-empty there.
fn duplicate_key_scan<K: Clone + Eq + Hash, V>(pairs: Vec<(K, V)>) -> Vec<K> {
    let mut seen: Membership<K> = Membership::default();
    let mut reported: Membership<K> = Membership::default();
    let mut duplicates = Vec::new();
    for (key, _) in pairs {
        if seen.contains(&key) {
            if !reported.contains(&key) {
                reported.insert(key.clone());
                duplicates.push(key);
            }
        } else {
            seen.insert(key);
        }
    }
    duplicates
}

// =============================================================================
// Representation
// =============================================================================

/// Internal representation of the dictionary.
///
/// `Empty` is the canonical empty; `Entries` is never zero-length.
enum DictRepr<K, V> {
    Empty,
    Entries(ReferenceCounter<OrderedEntries<K, V>>),
}

/// An immutable mapping with insertion-ordered, deterministic iteration.
///
/// Equality and hashing consider only the key-value pairs, not their order,
/// and agree with `std::collections::HashMap` and `BTreeMap` holding the
/// same pairs. Cloning shares the backing storage.
///
/// # Examples
///
/// ```rust
/// use immutablecollections::immutabledict;
///
/// let dict = immutabledict(vec![("one", 1), ("two", 2)]);
/// let keys: Vec<&&str> = dict.keys().collect();
/// assert_eq!(keys, vec![&"one", &"two"]);
/// assert_eq!(dict["two"], 2);
/// ```
pub struct ImmutableDict<K, V> {
    repr: DictRepr<K, V>,
}

impl<K, V> ImmutableDict<K, V> {
    /// Creates the canonical empty dictionary.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            repr: DictRepr::Empty,
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.repr {
            DictRepr::Empty => 0,
            DictRepr::Entries(entries) => entries.len(),
        }
    }

    /// Returns `true` if the dictionary contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.repr, DictRepr::Empty)
    }

    /// Returns an iterator over `(key, value)` pairs in insertion order.
    #[inline]
    pub fn iter(&self) -> ImmutableDictIterator<'_, K, V> {
        ImmutableDictIterator {
            inner: self.entries().map(OrderedEntries::iter),
        }
    }

    /// Returns an iterator over the keys in insertion order.
    #[inline]
    pub fn keys(&self) -> ImmutableDictKeysIterator<'_, K, V> {
        ImmutableDictKeysIterator {
            inner: self.entries().map(OrderedEntries::keys),
        }
    }

    /// Returns an iterator over the values in key-insertion order.
    #[inline]
    pub fn values(&self) -> ImmutableDictValuesIterator<'_, K, V> {
        ImmutableDictValuesIterator {
            inner: self.entries().map(OrderedEntries::values),
        }
    }

    /// Returns `true` if both dictionaries are the canonical empty or share
    /// the same backing storage.
    ///
    /// `ptr_eq` implies equality; it is the observation used to verify that
    /// construction paths reuse instances instead of copying.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (DictRepr::Empty, DictRepr::Empty) => true,
            (DictRepr::Entries(left), DictRepr::Entries(right)) => {
                ReferenceCounter::ptr_eq(left, right)
            }
            _ => false,
        }
    }

    fn entries(&self) -> Option<&OrderedEntries<K, V>> {
        match &self.repr {
            DictRepr::Empty => None,
            DictRepr::Entries(entries) => Some(entries),
        }
    }
}

impl<K: Eq + Hash, V> ImmutableDict<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// Supports borrowed forms of the key type: an
    /// `ImmutableDict<String, _>` can be probed with a `&str`.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries().and_then(|entries| entries.get(key))
    }

    /// Returns `true` if the dictionary contains the given key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> ImmutableDict<K, V> {
    /// Creates a dictionary containing a single entry.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::from_pairs(vec![(key, value)])
    }

    /// Gets an object which can build an `ImmutableDict`.
    #[inline]
    #[must_use]
    pub fn builder() -> ImmutableDictBuilder<K, V> {
        ImmutableDictBuilder::new()
    }

    /// Gets a builder seeded with this dictionary's entries.
    ///
    /// The builder holds only a reference until its first mutating call;
    /// building it without mutation returns this instance itself (see
    /// [`ImmutableDictBuilder`]).
    #[must_use]
    pub fn to_builder(&self) -> ImmutableDictBuilder<K, V> {
        ImmutableDictBuilder::from_source(self.clone())
    }

    /// Builds a dictionary from raw pairs; a repeated key keeps the later
    /// value at the first occurrence's position.
    pub(crate) fn from_pairs(pairs: Vec<(K, V)>) -> Self {
        let mut entries = new_entries(pairs.len());
        for (key, value) in pairs {
            entries.insert(key, value);
        }
        Self::from_entries(entries)
    }

    /// Routes empty accumulated state to the canonical empty.
    fn from_entries(entries: OrderedEntries<K, V>) -> Self {
        if entries.is_empty() {
            Self::new()
        } else {
            Self {
                repr: DictRepr::Entries(ReferenceCounter::new(entries)),
            }
        }
    }

    /// Gets a mapping to each item from the result of applying a key
    /// function.
    ///
    /// Each item appears as a value, keyed by `key_function` applied to it.
    /// If two items map to the same key, the later item silently wins; use
    /// [`immutabledict_from_unique_keys`] over explicit pairs when that
    /// should be an error instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutablecollections::ImmutableDict;
    ///
    /// let by_length = ImmutableDict::index_by(vec!["a", "bc", "de"], |s| s.len());
    /// assert_eq!(by_length.get(&1), Some(&"a"));
    /// assert_eq!(by_length.get(&2), Some(&"de"));
    /// ```
    #[must_use]
    pub fn index_by<I, F>(items: I, key_function: F) -> Self
    where
        I: IntoIterator<Item = V>,
        F: Fn(&V) -> K,
    {
        let pairs: Vec<(K, V)> = items
            .into_iter()
            .map(|item| (key_function(&item), item))
            .collect();
        Self::from_pairs(pairs)
    }

    /// Gets the dictionary mapping each value back to its key.
    ///
    /// A pair `(k, v)` in this dictionary appears as `(v, k)` in the result.
    /// Inversion goes through the uniqueness-enforcing construction path:
    /// values that are not unique cannot become keys.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateKeys`] naming every value that occurred more than
    /// once as a key-candidate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutablecollections::immutabledict;
    ///
    /// let dict = immutabledict(vec![("a", 1), ("b", 2)]);
    /// let inverse = dict.inverse().unwrap();
    /// assert_eq!(inverse.get(&1), Some(&"a"));
    ///
    /// let clashing = immutabledict(vec![("a", 1), ("b", 1)]);
    /// assert_eq!(clashing.inverse().unwrap_err().keys(), &[1]);
    /// ```
    pub fn inverse(&self) -> Result<ImmutableDict<V, K>, DuplicateKeys<V>>
    where
        V: Eq + Hash,
    {
        let swapped: Vec<(V, K)> = self
            .iter()
            .map(|(key, value)| (value.clone(), key.clone()))
            .collect();
        immutabledict_from_unique_keys(swapped)
    }

    /// Filters this dictionary by a predicate on its keys.
    ///
    /// Keys failing the predicate are removed; surviving keys keep their
    /// relative order. When every key passes, this instance itself is
    /// returned and nothing is copied.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutablecollections::immutabledict;
    ///
    /// let dict = immutabledict(vec![(1, "a"), (2, "b"), (3, "c")]);
    /// let odd = dict.filter_keys(|key| key % 2 == 1);
    /// assert_eq!(odd.len(), 2);
    ///
    /// let all = dict.filter_keys(|_| true);
    /// assert!(all.ptr_eq(&dict));
    /// ```
    #[must_use]
    pub fn filter_keys(&self, predicate: impl Fn(&K) -> bool) -> Self {
        let retained: Vec<(K, V)> = self
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if retained.len() == self.len() {
            self.clone()
        } else {
            Self::from_pairs(retained)
        }
    }

    /// Copies the entries into a plain `Vec` of pairs in insertion order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(K, V)> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Accumulation state of [`ImmutableDictBuilder`].
///
/// A builder seeded from a source starts `Unwritten`, holding only a
/// reference. The first mutating call consumes that state, replays the
/// source's entries into a fresh accumulator, and transitions to `Writing` —
/// exactly once, with no possibility of re-entry.
enum DictBuilderState<K, V> {
    Unwritten(ImmutableDict<K, V>),
    Writing(OrderedEntries<K, V>),
}

/// Accumulates entries for an [`ImmutableDict`].
///
/// The builder is a single-owner accumulator: its methods consume and return
/// it, so exclusive access is enforced by move semantics rather than by
/// runtime checks. Created via [`ImmutableDict::builder`] (empty) or
/// [`ImmutableDict::to_builder`] (copy-on-first-write from a source).
///
/// # Examples
///
/// ```rust
/// use immutablecollections::ImmutableDict;
///
/// let dict = ImmutableDict::builder()
///     .put("a", 1)
///     .put_all(vec![("b", 2), ("c", 3)])
///     .build();
/// assert_eq!(dict.len(), 3);
/// ```
pub struct ImmutableDictBuilder<K, V> {
    state: DictBuilderState<K, V>,
}

impl<K: Clone + Eq + Hash, V: Clone> ImmutableDictBuilder<K, V> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: DictBuilderState::Writing(OrderedEntries::default()),
        }
    }

    pub(crate) fn from_source(source: ImmutableDict<K, V>) -> Self {
        Self {
            state: DictBuilderState::Unwritten(source),
        }
    }

    /// Resolves the accumulator, replaying the source on the first mutation.
    fn into_writing(self) -> OrderedEntries<K, V> {
        match self.state {
            DictBuilderState::Writing(entries) => entries,
            DictBuilderState::Unwritten(source) => {
                let mut entries = new_entries(source.len());
                for (key, value) in source.iter() {
                    entries.insert(key.clone(), value.clone());
                }
                entries
            }
        }
    }

    /// Adds a mapping from `key` to `value`, replacing any existing value
    /// for the key while keeping its original position.
    #[must_use]
    pub fn put(self, key: K, value: V) -> Self {
        let mut entries = self.into_writing();
        entries.insert(key, value);
        Self {
            state: DictBuilderState::Writing(entries),
        }
    }

    /// Adds every pair of a deterministic-order source, in its order.
    #[must_use]
    pub fn put_all<S: IntoImmutableDict<K, V>>(self, source: S) -> Self {
        let mut entries = self.into_writing();
        match source.into_dict_source() {
            DictSource::Built(dict) => {
                for (key, value) in dict.iter() {
                    entries.insert(key.clone(), value.clone());
                }
            }
            DictSource::Pairs(pairs) => {
                for (key, value) in pairs {
                    entries.insert(key, value);
                }
            }
        }
        Self {
            state: DictBuilderState::Writing(entries),
        }
    }

    /// Finalizes the accumulated entries into an [`ImmutableDict`].
    ///
    /// A builder seeded from a source that was never mutated returns the
    /// source itself; otherwise a fresh instance is constructed, or the
    /// canonical empty if nothing was accumulated.
    #[must_use]
    pub fn build(self) -> ImmutableDict<K, V> {
        match self.state {
            DictBuilderState::Unwritten(source) => source,
            DictBuilderState::Writing(entries) => ImmutableDict::from_entries(entries),
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone> Default for ImmutableDictBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Borrowing iterator over the entries of an [`ImmutableDict`] in insertion
/// order.
pub struct ImmutableDictIterator<'a, K, V> {
    inner: Option<indexmap::map::Iter<'a, K, V>>,
}

impl<K, V> ImmutableDictIterator<'_, K, V> {
    /// Iterator over no entries; used by the empty multidict representation.
    pub(crate) const fn empty() -> Self {
        Self { inner: None }
    }
}

impl<'a, K, V> Iterator for ImmutableDictIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut().and_then(Iterator::next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.as_ref().map_or(0, ExactSizeIterator::len);
        (remaining, Some(remaining))
    }
}

impl<K, V> DoubleEndedIterator for ImmutableDictIterator<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.as_mut().and_then(DoubleEndedIterator::next_back)
    }
}

impl<K, V> ExactSizeIterator for ImmutableDictIterator<'_, K, V> {}

impl<K, V> FusedIterator for ImmutableDictIterator<'_, K, V> {}

/// Borrowing iterator over the keys of an [`ImmutableDict`] in insertion
/// order.
pub struct ImmutableDictKeysIterator<'a, K, V> {
    inner: Option<indexmap::map::Keys<'a, K, V>>,
}

impl<K, V> ImmutableDictKeysIterator<'_, K, V> {
    /// Iterator over no keys; used by the empty multidict representation.
    pub(crate) const fn empty() -> Self {
        Self { inner: None }
    }
}

impl<'a, K, V> Iterator for ImmutableDictKeysIterator<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut().and_then(Iterator::next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.as_ref().map_or(0, ExactSizeIterator::len);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for ImmutableDictKeysIterator<'_, K, V> {}

impl<K, V> FusedIterator for ImmutableDictKeysIterator<'_, K, V> {}

/// Borrowing iterator over the values of an [`ImmutableDict`] in
/// key-insertion order.
pub struct ImmutableDictValuesIterator<'a, K, V> {
    inner: Option<indexmap::map::Values<'a, K, V>>,
}

impl<K, V> ImmutableDictValuesIterator<'_, K, V> {
    /// Iterator over no values; used by the empty multidict representation.
    pub(crate) const fn empty() -> Self {
        Self { inner: None }
    }
}

impl<'a, K, V> Iterator for ImmutableDictValuesIterator<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut().and_then(Iterator::next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.as_ref().map_or(0, ExactSizeIterator::len);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for ImmutableDictValuesIterator<'_, K, V> {}

impl<K, V> FusedIterator for ImmutableDictValuesIterator<'_, K, V> {}

/// Owning iterator over the entries of an [`ImmutableDict`] in insertion
/// order.
///
/// If the backing storage is shared with other instances it is cloned once
/// up front; otherwise entries are moved out directly.
pub struct ImmutableDictIntoIterator<K, V> {
    inner: Option<indexmap::map::IntoIter<K, V>>,
}

impl<K, V> Iterator for ImmutableDictIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut().and_then(Iterator::next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.inner.as_ref().map_or(0, ExactSizeIterator::len);
        (remaining, Some(remaining))
    }
}

impl<K, V> ExactSizeIterator for ImmutableDictIntoIterator<K, V> {}

impl<K, V> FusedIterator for ImmutableDictIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Clone for ImmutableDict<K, V> {
    /// Shares the backing storage; entries are not copied.
    fn clone(&self) -> Self {
        match &self.repr {
            DictRepr::Empty => Self::new(),
            DictRepr::Entries(entries) => Self {
                repr: DictRepr::Entries(ReferenceCounter::clone(entries)),
            },
        }
    }
}

impl<K, V> Default for ImmutableDict<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> FromIterator<(K, V)> for ImmutableDict<K, V> {
    /// Collects an iterator of pairs, trusting its order to be
    /// deterministic; this is the explicit escape hatch next to
    /// [`AssumeOrdered`](crate::AssumeOrdered).
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter.into_iter().collect())
    }
}

impl<K: Clone + Eq + Hash, V: Clone> From<Vec<(K, V)>> for ImmutableDict<K, V> {
    #[inline]
    fn from(pairs: Vec<(K, V)>) -> Self {
        Self::from_pairs(pairs)
    }
}

impl<K: Clone + Eq + Hash, V: Clone, const N: usize> From<[(K, V); N]> for ImmutableDict<K, V> {
    #[inline]
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_pairs(pairs.into())
    }
}

impl<'a, K, V> IntoIterator for &'a ImmutableDict<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = ImmutableDictIterator<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> IntoIterator for ImmutableDict<K, V> {
    type Item = (K, V);
    type IntoIter = ImmutableDictIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let inner = match self.repr {
            DictRepr::Empty => None,
            DictRepr::Entries(shared) => Some(
                ReferenceCounter::try_unwrap(shared)
                    .unwrap_or_else(|shared| (*shared).clone())
                    .into_iter(),
            ),
        };
        ImmutableDictIntoIterator { inner }
    }
}

impl<K, V, Q> Index<&Q> for ImmutableDict<K, V>
where
    K: Borrow<Q> + Eq + Hash,
    Q: Eq + Hash + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present, like `HashMap` indexing.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for ImmutableDict<K, V> {
    /// Order-insensitive equality over the key-value pairs.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Eq + Hash, V: Eq> Eq for ImmutableDict<K, V> {}

impl<K: Eq + Hash, V: PartialEq, S: BuildHasher> PartialEq<HashMap<K, V, S>>
    for ImmutableDict<K, V>
{
    fn eq(&self, other: &HashMap<K, V, S>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Eq + Hash, V: PartialEq, S: BuildHasher> PartialEq<ImmutableDict<K, V>>
    for HashMap<K, V, S>
{
    fn eq(&self, other: &ImmutableDict<K, V>) -> bool {
        other == self
    }
}

impl<K: Eq + Hash + Ord, V: PartialEq> PartialEq<BTreeMap<K, V>> for ImmutableDict<K, V> {
    fn eq(&self, other: &BTreeMap<K, V>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Eq + Hash + Ord, V: PartialEq> PartialEq<ImmutableDict<K, V>> for BTreeMap<K, V> {
    fn eq(&self, other: &ImmutableDict<K, V>) -> bool {
        other == self
    }
}

impl<K: Hash, V: Hash> Hash for ImmutableDict<K, V> {
    /// Order-insensitive hash: the XOR of each `(key, value)` pair's hash,
    /// matching the order-independence of equality.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut accumulator = 0u64;
        for (key, value) in self {
            accumulator ^= pair_hash(key, value);
        }
        state.write_u64(accumulator);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ImmutableDict<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for ImmutableDict<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for ImmutableDict<K, V> {
    /// Serializes as a plain map in iteration order, never exposing the
    /// internal representation.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct ImmutableDictVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<K, V> ImmutableDictVisitor<K, V> {
    const fn new() -> Self {
        Self {
            marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for ImmutableDictVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = ImmutableDict<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = map.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut pairs = Vec::with_capacity(capacity);
        while let Some(pair) = map.next_entry()? {
            pairs.push(pair);
        }
        // Reconstructs through the public construction path, re-validating
        // the key-uniqueness and canonical-empty invariants.
        Ok(ImmutableDict::from_pairs(pairs))
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for ImmutableDict<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(ImmutableDictVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_new_creates_canonical_empty() {
        let dict: ImmutableDict<i32, i32> = ImmutableDict::new();
        assert!(dict.is_empty());
        assert!(dict.ptr_eq(&ImmutableDict::new()));
    }

    #[rstest]
    fn test_factory_identity_passthrough() {
        let dict = immutabledict(vec![("a", 1)]);
        let same = immutabledict(&dict);
        assert!(same.ptr_eq(&dict));
    }

    #[rstest]
    fn test_insertion_order_preserved() {
        let dict = immutabledict(vec![("b", 2), ("a", 1), ("c", 3)]);
        let keys: Vec<&&str> = dict.keys().collect();
        assert_eq!(keys, vec![&"b", &"a", &"c"]);
    }

    #[rstest]
    fn test_repeated_key_keeps_later_value_at_first_position() {
        let dict = immutabledict(vec![("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(dict.get("a"), Some(&3));
        let keys: Vec<&&str> = dict.keys().collect();
        assert_eq!(keys, vec![&"a", &"b"]);
    }

    #[rstest]
    fn test_unique_keys_factory_names_all_duplicates() {
        let error =
            immutabledict_from_unique_keys(vec![(7, 8), (9, 10), (7, 11), (9, 12)]).unwrap_err();
        assert_eq!(error.keys(), &[7, 9]);
    }

    #[rstest]
    fn test_builder_copy_on_first_write() {
        let source = immutabledict(vec![("a", 1)]);

        // No mutation: the source itself is reused.
        assert!(source.to_builder().build().ptr_eq(&source));

        // One mutation: a distinct, merged instance; the source unchanged.
        let extended = source.to_builder().put("b", 2).build();
        assert!(!extended.ptr_eq(&source));
        assert_eq!(extended, immutabledict(vec![("a", 1), ("b", 2)]));
        assert_eq!(source.len(), 1);
    }

    #[rstest]
    fn test_builder_put_overrides_source_value() {
        let source = immutabledict(vec![("a", 1), ("b", 2)]);
        let updated = source.to_builder().put("a", 10).build();
        assert_eq!(updated.get("a"), Some(&10));
        assert_eq!(updated.get("b"), Some(&2));
        assert_eq!(source.get("a"), Some(&1));
    }

    #[rstest]
    fn test_builder_empty_build_is_canonical() {
        let built: ImmutableDict<i32, i32> = ImmutableDict::builder().build();
        assert!(built.ptr_eq(&ImmutableDict::new()));
    }

    #[rstest]
    fn test_index_by_later_item_wins() {
        let dict = ImmutableDict::index_by(vec![1, 11, 2], |n| n % 10);
        assert_eq!(dict.get(&1), Some(&11));
        assert_eq!(dict.get(&2), Some(&2));
    }

    #[rstest]
    fn test_inverse_roundtrip_and_error() {
        let dict = immutabledict(vec![("a", 1), ("b", 2)]);
        let inverse = dict.inverse().unwrap();
        assert_eq!(inverse, immutabledict(vec![(1, "a"), (2, "b")]));

        let clashing = immutabledict(vec![("a", 1), ("b", 1), ("c", 2), ("d", 2)]);
        let error = clashing.inverse().unwrap_err();
        assert_eq!(error.keys(), &[1, 2]);
    }

    #[rstest]
    fn test_filter_keys_identity_when_all_pass() {
        let dict = immutabledict(vec![(1, "a"), (2, "b")]);
        assert!(dict.filter_keys(|_| true).ptr_eq(&dict));
        let filtered = dict.filter_keys(|key| *key == 2);
        assert_eq!(filtered, immutabledict(vec![(2, "b")]));
    }

    #[rstest]
    fn test_equality_and_hash_ignore_order() {
        use std::collections::hash_map::DefaultHasher;

        let forward = immutabledict(vec![("a", 1), ("b", 2)]);
        let backward = immutabledict(vec![("b", 2), ("a", 1)]);
        assert_eq!(forward, backward);

        let hash_of = |value: &ImmutableDict<&str, i32>| {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash_of(&forward), hash_of(&backward));
    }

    #[rstest]
    fn test_equality_with_native_maps() {
        let dict = immutabledict(vec![("a", 1), ("b", 2)]);
        let native: HashMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
        let sorted: BTreeMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
        assert_eq!(dict, native);
        assert_eq!(native, dict);
        assert_eq!(dict, sorted);
        assert_eq!(sorted, dict);
    }

    #[rstest]
    #[should_panic(expected = "no entry found for key")]
    fn test_index_missing_key_panics() {
        let dict = immutabledict(vec![("a", 1)]);
        let _ = dict["b"];
    }

    #[rstest]
    fn test_display() {
        let dict = immutabledict(vec![("a", 1)]);
        assert_eq!(dict.to_string(), "{a: 1}");
        assert_eq!(ImmutableDict::<i32, i32>::new().to_string(), "{}");
    }

    #[cfg(not(feature = "arc"))]
    mod single_threaded {
        use super::super::ImmutableDict;

        static_assertions::assert_not_impl_any!(ImmutableDict<i32, i32>: Send, Sync);
    }

    #[cfg(feature = "arc")]
    mod thread_safe {
        use super::super::ImmutableDict;

        static_assertions::assert_impl_all!(ImmutableDict<i32, i32>: Send, Sync);
    }
}
