//! Immutable key→group-of-values mappings.
//!
//! This module provides the two multidict families, which compose the other
//! collections: each key maps to a *value-group* — an
//! [`ImmutableSet`] for [`ImmutableSetMultiDict`] (values deduplicated per
//! key) or an [`ImmutableList`] for [`ImmutableListMultiDict`] (duplicates
//! preserved per key). Both are internally backed by an [`ImmutableDict`]
//! from key to value-group.
//!
//! # Length semantics
//!
//! The length of a multidict is the total number of key-value mappings: the
//! sum of the group lengths. For the set variant that sum counts
//! *deduplicated* group sizes; for the list variant duplicates count. The
//! total is computed lazily on first access and cached — valid only because
//! the backing structure never mutates after construction.
//!
//! # Examples
//!
//! ```rust
//! use immutablecollections::{ImmutableListMultiDict, ImmutableSetMultiDict};
//!
//! let set_valued = ImmutableSetMultiDict::from_groups([(1, vec![2, 2, 3])]);
//! assert_eq!(set_valued.len(), 2); // {2, 3}
//!
//! let list_valued = ImmutableListMultiDict::from_groups([(1, vec![2, 2, 3])]);
//! assert_eq!(list_valued.len(), 3); // [2, 2, 3]
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use crate::dict::{
    ImmutableDict, ImmutableDictIterator, ImmutableDictKeysIterator, ImmutableDictValuesIterator,
};
use crate::list::ImmutableList;
use crate::set::ImmutableSet;
use crate::shared::{LazyValue, Membership, OrderedEntries, ReferenceCounter, pair_hash};
use crate::source::{
    IntoImmutableListMultiDict, IntoImmutableSetMultiDict, ListMultiDictSource,
    SetMultiDictSource,
};

// =============================================================================
// Factories
// =============================================================================

/// Creates an immutable set-valued multidict with the given mappings.
///
/// Mappings are specified as key-value pairs; each key's values are
/// deduplicated, and iteration order follows first appearance of keys and,
/// within a key, first appearance of values. If the source is already an
/// [`ImmutableSetMultiDict`], it is returned unchanged.
///
/// For grouped input (key → collection of values), see
/// [`ImmutableSetMultiDict::from_groups`].
///
/// # Examples
///
/// ```rust
/// use immutablecollections::immutablesetmultidict;
///
/// let multidict = immutablesetmultidict(vec![(1, "a"), (1, "a"), (2, "b")]);
/// assert_eq!(multidict.len(), 2);
/// ```
#[must_use]
pub fn immutablesetmultidict<K, V, S>(source: S) -> ImmutableSetMultiDict<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
    S: IntoImmutableSetMultiDict<K, V>,
{
    match source.into_set_multidict_source() {
        SetMultiDictSource::Built(multidict) => multidict,
        SetMultiDictSource::Pairs(pairs) => ImmutableSetMultiDict::builder()
            .put_all_items(pairs)
            .build(),
    }
}

/// Creates an immutable list-valued multidict with the given mappings.
///
/// Mappings are specified as key-value pairs; duplicates within a key are
/// preserved, in order. If the source is already an
/// [`ImmutableListMultiDict`], it is returned unchanged.
///
/// For grouped input (key → collection of values), see
/// [`ImmutableListMultiDict::from_groups`].
///
/// # Examples
///
/// ```rust
/// use immutablecollections::immutablelistmultidict;
///
/// let multidict = immutablelistmultidict(vec![(1, "a"), (1, "a"), (2, "b")]);
/// assert_eq!(multidict.len(), 3);
/// ```
#[must_use]
pub fn immutablelistmultidict<K, V, S>(source: S) -> ImmutableListMultiDict<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: IntoImmutableListMultiDict<K, V>,
{
    match source.into_list_multidict_source() {
        ListMultiDictSource::Built(multidict) => multidict,
        ListMultiDictSource::Pairs(pairs) => ImmutableListMultiDict::builder()
            .put_all_items(pairs)
            .build(),
    }
}

// =============================================================================
// Shared Core
// =============================================================================

/// Backing storage shared by all clones of a non-empty multidict: the group
/// dictionary plus the lazily-computed total length.
struct MultiDictCore<K, G> {
    groups: ImmutableDict<K, G>,
    total_length: LazyValue<usize>,
}

impl<K, G> MultiDictCore<K, G> {
    fn new(groups: ImmutableDict<K, G>) -> Self {
        Self {
            groups,
            total_length: LazyValue::new(),
        }
    }
}

type ValueComparator<V> = Box<dyn Fn(&V, &V) -> Ordering>;

// =============================================================================
// ImmutableSetMultiDict
// =============================================================================

/// Internal representation; `Backed` never holds an empty group dictionary.
enum SetMultiDictRepr<K, V> {
    Empty,
    Backed(ReferenceCounter<MultiDictCore<K, ImmutableSet<V>>>),
}

/// An immutable mapping from keys to [`ImmutableSet`]s of values.
///
/// Values are deduplicated within each key's group. Keys iterate in
/// first-insertion order; within a key, values iterate in their group's
/// order. Cloning shares the backing storage, including the cached total
/// length.
///
/// # Examples
///
/// ```rust
/// use immutablecollections::{ImmutableSetMultiDict, immutableset};
///
/// let multidict = ImmutableSetMultiDict::from_groups([("k", vec![2, 1, 2])]);
/// assert_eq!(multidict.group("k"), immutableset(vec![2, 1]));
/// assert!(multidict.group("missing").is_empty());
/// ```
pub struct ImmutableSetMultiDict<K, V> {
    repr: SetMultiDictRepr<K, V>,
}

impl<K, V> ImmutableSetMultiDict<K, V> {
    /// Creates the canonical empty multidict.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            repr: SetMultiDictRepr::Empty,
        }
    }

    /// Returns the total number of key-value mappings: the sum of the
    /// deduplicated group sizes.
    ///
    /// Computed once on first access and cached; never recomputed, which is
    /// valid because the backing structure never mutates post-construction.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.repr {
            SetMultiDictRepr::Empty => 0,
            SetMultiDictRepr::Backed(core) => *core
                .total_length
                .get_or_init(|| core.groups.values().map(ImmutableSet::len).sum()),
        }
    }

    /// Returns `true` if the multidict contains no mappings.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.repr, SetMultiDictRepr::Empty)
    }

    /// Returns an iterator over the keys in first-insertion order.
    #[inline]
    pub fn keys(&self) -> ImmutableDictKeysIterator<'_, K, ImmutableSet<V>> {
        match &self.repr {
            SetMultiDictRepr::Empty => ImmutableDictKeysIterator::empty(),
            SetMultiDictRepr::Backed(core) => core.groups.keys(),
        }
    }

    /// Returns an iterator over the value-groups, one [`ImmutableSet`] per
    /// key, in key order.
    #[inline]
    pub fn value_groups(&self) -> ImmutableDictValuesIterator<'_, K, ImmutableSet<V>> {
        match &self.repr {
            SetMultiDictRepr::Empty => ImmutableDictValuesIterator::empty(),
            SetMultiDictRepr::Backed(core) => core.groups.values(),
        }
    }

    /// Returns an iterator over the individual `(key, value)` mappings,
    /// ordered first by key, then by the value's position in its group.
    #[inline]
    pub fn iter(&self) -> ImmutableSetMultiDictIterator<'_, K, V> {
        let outer = match &self.repr {
            SetMultiDictRepr::Empty => ImmutableDictIterator::empty(),
            SetMultiDictRepr::Backed(core) => core.groups.iter(),
        };
        ImmutableSetMultiDictIterator {
            outer,
            current: None,
        }
    }

    /// Returns `true` if both multidicts are the canonical empty or share
    /// the same backing storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (SetMultiDictRepr::Empty, SetMultiDictRepr::Empty) => true,
            (SetMultiDictRepr::Backed(left), SetMultiDictRepr::Backed(right)) => {
                ReferenceCounter::ptr_eq(left, right)
            }
            _ => false,
        }
    }

    fn groups(&self) -> Option<&ImmutableDict<K, ImmutableSet<V>>> {
        match &self.repr {
            SetMultiDictRepr::Empty => None,
            SetMultiDictRepr::Backed(core) => Some(&core.groups),
        }
    }
}

impl<K: Eq + Hash, V> ImmutableSetMultiDict<K, V> {
    /// Returns a reference to the group of values for `key`, if present.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&ImmutableSet<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.groups().and_then(|groups| groups.get(key))
    }

    /// Returns `true` if at least one value is associated with `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K: Clone + Eq + Hash, V: Clone + Eq + Hash> ImmutableSetMultiDict<K, V> {
    /// Gets an object which can build an `ImmutableSetMultiDict`.
    #[inline]
    #[must_use]
    pub fn builder() -> ImmutableSetMultiDictBuilder<K, V> {
        ImmutableSetMultiDictBuilder::new()
    }

    /// Gets a builder seeded with this multidict's mappings.
    ///
    /// The builder holds only a reference until its first mutating call;
    /// building it without mutation returns this instance itself.
    #[must_use]
    pub fn to_builder(&self) -> ImmutableSetMultiDictBuilder<K, V> {
        ImmutableSetMultiDictBuilder::from_source(self.clone())
    }

    /// Creates a multidict from grouped input: each key paired with a
    /// collection of its values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutablecollections::ImmutableSetMultiDict;
    ///
    /// let multidict = ImmutableSetMultiDict::from_groups([(1, vec![2, 2, 3])]);
    /// assert_eq!(multidict.len(), 2);
    /// ```
    #[must_use]
    pub fn from_groups<G, I>(groups: I) -> Self
    where
        G: IntoIterator<Item = V>,
        I: IntoIterator<Item = (K, G)>,
    {
        Self::builder().put_all(groups).build()
    }

    /// Routes an empty group dictionary to the canonical empty.
    fn from_group_dict(groups: ImmutableDict<K, ImmutableSet<V>>) -> Self {
        if groups.is_empty() {
            Self::new()
        } else {
            Self {
                repr: SetMultiDictRepr::Backed(ReferenceCounter::new(MultiDictCore::new(groups))),
            }
        }
    }

    /// Returns the group of values for `key`, or the canonical empty set if
    /// the key is absent.
    #[must_use]
    pub fn group<Q>(&self, key: &Q) -> ImmutableSet<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Gets the backing map from each key to the group of its values.
    ///
    /// The returned dictionary shares storage with this multidict.
    #[must_use]
    pub fn as_dict(&self) -> ImmutableDict<K, ImmutableSet<V>> {
        self.groups().cloned().unwrap_or_default()
    }

    /// Filters this multidict by a predicate on its keys.
    ///
    /// When every key passes, this instance itself is returned and nothing
    /// is copied.
    #[must_use]
    pub fn filter_keys(&self, predicate: impl Fn(&K) -> bool) -> Self {
        match &self.repr {
            SetMultiDictRepr::Empty => self.clone(),
            SetMultiDictRepr::Backed(core) => {
                let filtered = core.groups.filter_keys(predicate);
                if filtered.ptr_eq(&core.groups) {
                    self.clone()
                } else {
                    Self::from_group_dict(filtered)
                }
            }
        }
    }

    /// Gets the inverse of this multidict as a list multidict.
    ///
    /// Every `(k, v)` mapping yields a `(v, k)` mapping in the result; since
    /// each group here is a set, each inverted pair appears at most once per
    /// source membership.
    #[must_use]
    pub fn invert_to_list_multidict(&self) -> ImmutableListMultiDict<V, K> {
        let mut builder = ImmutableListMultiDict::builder();
        for (key, value) in self.iter() {
            builder = builder.put(value.clone(), key.clone());
        }
        builder.build()
    }

    /// Gets the inverse of this multidict as a set multidict.
    ///
    /// The result contains `(v, k)` if and only if `(k, v)` is a mapping of
    /// this multidict.
    #[must_use]
    pub fn invert_to_set_multidict(&self) -> ImmutableSetMultiDict<V, K> {
        let mut builder = ImmutableSetMultiDict::builder();
        for (key, value) in self.iter() {
            builder = builder.put(value.clone(), key.clone());
        }
        builder.build()
    }
}

// =============================================================================
// ImmutableSetMultiDict Builder
// =============================================================================

/// Per-key accumulator of the set-valued builder: deduplicating membership
/// plus first-insertion order.
struct GroupAccumulator<V> {
    members: Membership<V>,
    order: Vec<V>,
}

impl<V: Clone + Eq + Hash> GroupAccumulator<V> {
    fn new() -> Self {
        Self {
            members: Membership::default(),
            order: Vec::new(),
        }
    }

    fn insert(&mut self, value: V) {
        if !self.members.contains(&value) {
            self.members.insert(value.clone());
            self.order.push(value);
        }
    }
}

/// Accumulation state of the multidict builders; see
/// [`ImmutableDictBuilder`](crate::ImmutableDictBuilder) for the
/// copy-on-first-write discipline this follows.
enum SetMultiDictBuilderState<K, V> {
    Unwritten(ImmutableSetMultiDict<K, V>),
    Writing(OrderedEntries<K, GroupAccumulator<V>>),
}

/// Accumulates mappings for an [`ImmutableSetMultiDict`], deduplicating
/// values per key.
///
/// Single-owner, consumed by value; optionally sorts each group by a value
/// order key at build time.
///
/// # Examples
///
/// ```rust
/// use immutablecollections::{ImmutableSetMultiDict, immutableset};
///
/// let multidict = ImmutableSetMultiDict::builder()
///     .put("k", 2)
///     .put("k", 2)
///     .put("k", 1)
///     .build();
/// assert_eq!(multidict.group("k"), immutableset(vec![2, 1]));
/// ```
pub struct ImmutableSetMultiDictBuilder<K, V> {
    state: SetMultiDictBuilderState<K, V>,
    value_comparator: Option<ValueComparator<V>>,
}

impl<K: Clone + Eq + Hash, V: Clone + Eq + Hash> ImmutableSetMultiDictBuilder<K, V> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SetMultiDictBuilderState::Writing(OrderedEntries::default()),
            value_comparator: None,
        }
    }

    fn from_source(source: ImmutableSetMultiDict<K, V>) -> Self {
        Self {
            state: SetMultiDictBuilderState::Unwritten(source),
            value_comparator: None,
        }
    }

    /// Orders every built group by `key` instead of by value insertion.
    #[must_use]
    pub fn with_value_order_key<O, F>(mut self, key: F) -> Self
    where
        O: Ord,
        F: Fn(&V) -> O + 'static,
    {
        self.value_comparator = Some(Box::new(move |left, right| key(left).cmp(&key(right))));
        self
    }

    /// Resolves the accumulator, replaying the source on the first mutation.
    fn into_writing(
        state: SetMultiDictBuilderState<K, V>,
    ) -> OrderedEntries<K, GroupAccumulator<V>> {
        match state {
            SetMultiDictBuilderState::Writing(groups) => groups,
            SetMultiDictBuilderState::Unwritten(source) => {
                let mut groups = OrderedEntries::default();
                for (key, value) in source.iter() {
                    groups
                        .entry(key.clone())
                        .or_insert_with(GroupAccumulator::new)
                        .insert(value.clone());
                }
                groups
            }
        }
    }

    /// Adds a mapping from `key` to `value`, ignoring it if the key's group
    /// already contains the value.
    #[must_use]
    pub fn put(self, key: K, value: V) -> Self {
        let mut groups = Self::into_writing(self.state);
        groups
            .entry(key)
            .or_insert_with(GroupAccumulator::new)
            .insert(value);
        Self {
            state: SetMultiDictBuilderState::Writing(groups),
            value_comparator: self.value_comparator,
        }
    }

    /// Adds every mapping of grouped input: each key paired with a
    /// collection of its values.
    #[must_use]
    pub fn put_all<G, I>(mut self, groups: I) -> Self
    where
        G: IntoIterator<Item = V>,
        I: IntoIterator<Item = (K, G)>,
    {
        for (key, values) in groups {
            for value in values {
                self = self.put(key.clone(), value);
            }
        }
        self
    }

    /// Adds each key-value mapping from a sequence of pairs.
    #[must_use]
    pub fn put_all_items<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self = self.put(key, value);
        }
        self
    }

    /// Finalizes the accumulated mappings into an [`ImmutableSetMultiDict`].
    ///
    /// A builder seeded from a source that was never mutated returns the
    /// source itself; building nothing yields the canonical empty.
    #[must_use]
    pub fn build(self) -> ImmutableSetMultiDict<K, V> {
        let Self {
            state,
            value_comparator,
        } = self;
        match state {
            SetMultiDictBuilderState::Unwritten(source) => source,
            SetMultiDictBuilderState::Writing(groups) => {
                let pairs: Vec<(K, ImmutableSet<V>)> = groups
                    .into_iter()
                    .map(|(key, accumulator)| {
                        let GroupAccumulator { members, mut order } = accumulator;
                        if order.len() > 1
                            && let Some(comparator) = &value_comparator
                        {
                            order.sort_by(|left, right| comparator(left, right));
                        }
                        (key, ImmutableSet::from_deduplicated(members, order, None))
                    })
                    .collect();
                ImmutableSetMultiDict::from_group_dict(ImmutableDict::from_pairs(pairs))
            }
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone + Eq + Hash> Default for ImmutableSetMultiDictBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ImmutableListMultiDict
// =============================================================================

/// Internal representation; `Backed` never holds an empty group dictionary.
enum ListMultiDictRepr<K, V> {
    Empty,
    Backed(ReferenceCounter<MultiDictCore<K, ImmutableList<V>>>),
}

/// An immutable mapping from keys to [`ImmutableList`]s of values.
///
/// Duplicates are preserved within each key's group, in insertion order.
/// Keys iterate in first-insertion order. Cloning shares the backing
/// storage, including the cached total length.
///
/// # Examples
///
/// ```rust
/// use immutablecollections::{ImmutableListMultiDict, immutablelist};
///
/// let multidict = ImmutableListMultiDict::from_groups([("k", vec![2, 2, 1])]);
/// assert_eq!(multidict.group("k"), immutablelist(vec![2, 2, 1]));
/// assert!(multidict.group("missing").is_empty());
/// ```
pub struct ImmutableListMultiDict<K, V> {
    repr: ListMultiDictRepr<K, V>,
}

impl<K, V> ImmutableListMultiDict<K, V> {
    /// Creates the canonical empty multidict.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            repr: ListMultiDictRepr::Empty,
        }
    }

    /// Returns the total number of key-value mappings: the sum of the group
    /// lengths, duplicates included.
    ///
    /// Computed once on first access and cached; never recomputed, which is
    /// valid because the backing structure never mutates post-construction.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.repr {
            ListMultiDictRepr::Empty => 0,
            ListMultiDictRepr::Backed(core) => *core
                .total_length
                .get_or_init(|| core.groups.values().map(ImmutableList::len).sum()),
        }
    }

    /// Returns `true` if the multidict contains no mappings.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.repr, ListMultiDictRepr::Empty)
    }

    /// Returns an iterator over the keys in first-insertion order.
    #[inline]
    pub fn keys(&self) -> ImmutableDictKeysIterator<'_, K, ImmutableList<V>> {
        match &self.repr {
            ListMultiDictRepr::Empty => ImmutableDictKeysIterator::empty(),
            ListMultiDictRepr::Backed(core) => core.groups.keys(),
        }
    }

    /// Returns an iterator over the value-groups, one [`ImmutableList`] per
    /// key, in key order.
    #[inline]
    pub fn value_groups(&self) -> ImmutableDictValuesIterator<'_, K, ImmutableList<V>> {
        match &self.repr {
            ListMultiDictRepr::Empty => ImmutableDictValuesIterator::empty(),
            ListMultiDictRepr::Backed(core) => core.groups.values(),
        }
    }

    /// Returns an iterator over the individual `(key, value)` mappings,
    /// ordered first by key, then by the value's position in its group.
    #[inline]
    pub fn iter(&self) -> ImmutableListMultiDictIterator<'_, K, V> {
        let outer = match &self.repr {
            ListMultiDictRepr::Empty => ImmutableDictIterator::empty(),
            ListMultiDictRepr::Backed(core) => core.groups.iter(),
        };
        ImmutableListMultiDictIterator {
            outer,
            current: None,
        }
    }

    /// Returns `true` if both multidicts are the canonical empty or share
    /// the same backing storage.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (ListMultiDictRepr::Empty, ListMultiDictRepr::Empty) => true,
            (ListMultiDictRepr::Backed(left), ListMultiDictRepr::Backed(right)) => {
                ReferenceCounter::ptr_eq(left, right)
            }
            _ => false,
        }
    }

    fn groups(&self) -> Option<&ImmutableDict<K, ImmutableList<V>>> {
        match &self.repr {
            ListMultiDictRepr::Empty => None,
            ListMultiDictRepr::Backed(core) => Some(&core.groups),
        }
    }
}

impl<K: Eq + Hash, V> ImmutableListMultiDict<K, V> {
    /// Returns a reference to the group of values for `key`, if present.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&ImmutableList<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.groups().and_then(|groups| groups.get(key))
    }

    /// Returns `true` if at least one value is associated with `key`.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> ImmutableListMultiDict<K, V> {
    /// Gets an object which can build an `ImmutableListMultiDict`.
    #[inline]
    #[must_use]
    pub fn builder() -> ImmutableListMultiDictBuilder<K, V> {
        ImmutableListMultiDictBuilder::new()
    }

    /// Gets a builder seeded with this multidict's mappings.
    ///
    /// The builder holds only a reference until its first mutating call;
    /// building it without mutation returns this instance itself.
    #[must_use]
    pub fn to_builder(&self) -> ImmutableListMultiDictBuilder<K, V> {
        ImmutableListMultiDictBuilder::from_source(self.clone())
    }

    /// Creates a multidict from grouped input: each key paired with a
    /// collection of its values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use immutablecollections::ImmutableListMultiDict;
    ///
    /// let multidict = ImmutableListMultiDict::from_groups([(1, vec![2, 2, 3])]);
    /// assert_eq!(multidict.len(), 3);
    /// ```
    #[must_use]
    pub fn from_groups<G, I>(groups: I) -> Self
    where
        G: IntoIterator<Item = V>,
        I: IntoIterator<Item = (K, G)>,
    {
        Self::builder().put_all(groups).build()
    }

    /// Routes an empty group dictionary to the canonical empty.
    fn from_group_dict(groups: ImmutableDict<K, ImmutableList<V>>) -> Self {
        if groups.is_empty() {
            Self::new()
        } else {
            Self {
                repr: ListMultiDictRepr::Backed(ReferenceCounter::new(MultiDictCore::new(groups))),
            }
        }
    }

    /// Returns the group of values for `key`, or the canonical empty list
    /// if the key is absent.
    #[must_use]
    pub fn group<Q>(&self, key: &Q) -> ImmutableList<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Gets the backing map from each key to the group of its values.
    ///
    /// The returned dictionary shares storage with this multidict.
    #[must_use]
    pub fn as_dict(&self) -> ImmutableDict<K, ImmutableList<V>> {
        self.groups().cloned().unwrap_or_default()
    }

    /// Filters this multidict by a predicate on its keys.
    ///
    /// When every key passes, this instance itself is returned and nothing
    /// is copied.
    #[must_use]
    pub fn filter_keys(&self, predicate: impl Fn(&K) -> bool) -> Self {
        match &self.repr {
            ListMultiDictRepr::Empty => self.clone(),
            ListMultiDictRepr::Backed(core) => {
                let filtered = core.groups.filter_keys(predicate);
                if filtered.ptr_eq(&core.groups) {
                    self.clone()
                } else {
                    Self::from_group_dict(filtered)
                }
            }
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone + Eq + Hash> ImmutableListMultiDict<K, V> {
    /// Gets the inverse of this multidict as a list multidict.
    ///
    /// Every `(k, v)` mapping yields a `(v, k)` mapping in the result, once
    /// per occurrence: duplicates in a source group become duplicate
    /// inverted mappings.
    #[must_use]
    pub fn invert_to_list_multidict(&self) -> ImmutableListMultiDict<V, K> {
        let mut builder = ImmutableListMultiDict::builder();
        for (key, value) in self.iter() {
            builder = builder.put(value.clone(), key.clone());
        }
        builder.build()
    }

    /// Gets the inverse of this multidict as a set multidict.
    ///
    /// The result contains `(v, k)` if and only if `(k, v)` is a mapping of
    /// this multidict; duplicate occurrences collapse.
    #[must_use]
    pub fn invert_to_set_multidict(&self) -> ImmutableSetMultiDict<V, K> {
        let mut builder = ImmutableSetMultiDict::builder();
        for (key, value) in self.iter() {
            builder = builder.put(value.clone(), key.clone());
        }
        builder.build()
    }
}

// =============================================================================
// ImmutableListMultiDict Builder
// =============================================================================

/// Accumulation state of [`ImmutableListMultiDictBuilder`].
enum ListMultiDictBuilderState<K, V> {
    Unwritten(ImmutableListMultiDict<K, V>),
    Writing(OrderedEntries<K, Vec<V>>),
}

/// Accumulates mappings for an [`ImmutableListMultiDict`], preserving
/// duplicate values per key.
///
/// Single-owner, consumed by value.
///
/// # Examples
///
/// ```rust
/// use immutablecollections::{ImmutableListMultiDict, immutablelist};
///
/// let multidict = ImmutableListMultiDict::builder()
///     .put("k", 2)
///     .put("k", 2)
///     .build();
/// assert_eq!(multidict.group("k"), immutablelist(vec![2, 2]));
/// ```
pub struct ImmutableListMultiDictBuilder<K, V> {
    state: ListMultiDictBuilderState<K, V>,
}

impl<K: Clone + Eq + Hash, V: Clone> ImmutableListMultiDictBuilder<K, V> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ListMultiDictBuilderState::Writing(OrderedEntries::default()),
        }
    }

    fn from_source(source: ImmutableListMultiDict<K, V>) -> Self {
        Self {
            state: ListMultiDictBuilderState::Unwritten(source),
        }
    }

    /// Resolves the accumulator, replaying the source on the first mutation.
    fn into_writing(state: ListMultiDictBuilderState<K, V>) -> OrderedEntries<K, Vec<V>> {
        match state {
            ListMultiDictBuilderState::Writing(groups) => groups,
            ListMultiDictBuilderState::Unwritten(source) => {
                let mut groups = OrderedEntries::default();
                for (key, value) in source.iter() {
                    groups
                        .entry(key.clone())
                        .or_insert_with(Vec::new)
                        .push(value.clone());
                }
                groups
            }
        }
    }

    /// Adds a mapping from `key` to `value`, keeping duplicates.
    #[must_use]
    pub fn put(self, key: K, value: V) -> Self {
        let mut groups = Self::into_writing(self.state);
        groups.entry(key).or_insert_with(Vec::new).push(value);
        Self {
            state: ListMultiDictBuilderState::Writing(groups),
        }
    }

    /// Adds every mapping of grouped input: each key paired with a
    /// collection of its values.
    #[must_use]
    pub fn put_all<G, I>(mut self, groups: I) -> Self
    where
        G: IntoIterator<Item = V>,
        I: IntoIterator<Item = (K, G)>,
    {
        for (key, values) in groups {
            for value in values {
                self = self.put(key.clone(), value);
            }
        }
        self
    }

    /// Adds each key-value mapping from a sequence of pairs.
    #[must_use]
    pub fn put_all_items<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self = self.put(key, value);
        }
        self
    }

    /// Finalizes the accumulated mappings into an [`ImmutableListMultiDict`].
    ///
    /// A builder seeded from a source that was never mutated returns the
    /// source itself; building nothing yields the canonical empty.
    #[must_use]
    pub fn build(self) -> ImmutableListMultiDict<K, V> {
        match self.state {
            ListMultiDictBuilderState::Unwritten(source) => source,
            ListMultiDictBuilderState::Writing(groups) => {
                let pairs: Vec<(K, ImmutableList<V>)> = groups
                    .into_iter()
                    .map(|(key, values)| (key, ImmutableList::from_vec(values)))
                    .collect();
                ImmutableListMultiDict::from_group_dict(ImmutableDict::from_pairs(pairs))
            }
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone> Default for ImmutableListMultiDictBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over the individual `(key, value)` mappings of an
/// [`ImmutableSetMultiDict`].
pub struct ImmutableSetMultiDictIterator<'a, K, V> {
    outer: ImmutableDictIterator<'a, K, ImmutableSet<V>>,
    current: Option<(&'a K, crate::set::ImmutableSetIterator<'a, V>)>,
}

impl<'a, K, V> Iterator for ImmutableSetMultiDictIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = &mut self.current
                && let Some(value) = values.next()
            {
                return Some((key, value));
            }
            match self.outer.next() {
                Some((key, group)) => self.current = Some((key, group.iter())),
                None => return None,
            }
        }
    }
}

impl<K, V> FusedIterator for ImmutableSetMultiDictIterator<'_, K, V> {}

/// Iterator over the individual `(key, value)` mappings of an
/// [`ImmutableListMultiDict`].
pub struct ImmutableListMultiDictIterator<'a, K, V> {
    outer: ImmutableDictIterator<'a, K, ImmutableList<V>>,
    current: Option<(&'a K, std::slice::Iter<'a, V>)>,
}

impl<'a, K, V> Iterator for ImmutableListMultiDictIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = &mut self.current
                && let Some(value) = values.next()
            {
                return Some((key, value));
            }
            match self.outer.next() {
                Some((key, group)) => self.current = Some((key, group.iter())),
                None => return None,
            }
        }
    }
}

impl<K, V> FusedIterator for ImmutableListMultiDictIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Clone for ImmutableSetMultiDict<K, V> {
    /// Shares the backing storage, including the cached total length.
    fn clone(&self) -> Self {
        match &self.repr {
            SetMultiDictRepr::Empty => Self::new(),
            SetMultiDictRepr::Backed(core) => Self {
                repr: SetMultiDictRepr::Backed(ReferenceCounter::clone(core)),
            },
        }
    }
}

impl<K, V> Clone for ImmutableListMultiDict<K, V> {
    /// Shares the backing storage, including the cached total length.
    fn clone(&self) -> Self {
        match &self.repr {
            ListMultiDictRepr::Empty => Self::new(),
            ListMultiDictRepr::Backed(core) => Self {
                repr: ListMultiDictRepr::Backed(ReferenceCounter::clone(core)),
            },
        }
    }
}

impl<K, V> Default for ImmutableSetMultiDict<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Default for ImmutableListMultiDict<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash, V: Clone + Eq + Hash> FromIterator<(K, V)>
    for ImmutableSetMultiDict<K, V>
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::builder().put_all_items(iter).build()
    }
}

impl<K: Clone + Eq + Hash, V: Clone> FromIterator<(K, V)> for ImmutableListMultiDict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::builder().put_all_items(iter).build()
    }
}

impl<'a, K, V> IntoIterator for &'a ImmutableSetMultiDict<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = ImmutableSetMultiDictIterator<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a ImmutableListMultiDict<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = ImmutableListMultiDictIterator<'a, K, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Eq + Hash, V: Eq + Hash> PartialEq for ImmutableSetMultiDict<K, V> {
    /// Key-order-insensitive equality: the same keys mapping to equal value
    /// sets.
    fn eq(&self, other: &Self) -> bool {
        match (self.groups(), other.groups()) {
            (None, None) => true,
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

impl<K: Eq + Hash, V: Eq + Hash> Eq for ImmutableSetMultiDict<K, V> {}

impl<K: Eq + Hash, V: PartialEq> PartialEq for ImmutableListMultiDict<K, V> {
    /// Key-order-insensitive equality: the same keys mapping to equal value
    /// lists (which are themselves order-sensitive).
    fn eq(&self, other: &Self) -> bool {
        match (self.groups(), other.groups()) {
            (None, None) => true,
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

impl<K: Eq + Hash, V: Eq> Eq for ImmutableListMultiDict<K, V> {}

impl<K: Hash, V: Hash> Hash for ImmutableSetMultiDict<K, V> {
    /// Order-insensitive hash: the XOR of each `(key, value)` mapping's
    /// hash.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut accumulator = 0u64;
        for (key, value) in self.iter() {
            accumulator ^= pair_hash(key, value);
        }
        state.write_u64(accumulator);
    }
}

impl<K: Hash, V: Hash> Hash for ImmutableListMultiDict<K, V> {
    /// Order-insensitive hash: the XOR of each `(key, value)` mapping's
    /// hash. Note that duplicate mappings cancel under XOR; equality, which
    /// is duplicate-sensitive, remains the authority.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut accumulator = 0u64;
        for (key, value) in self.iter() {
            accumulator ^= pair_hash(key, value);
        }
        state.write_u64(accumulator);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ImmutableSetMultiDict<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = formatter.debug_map();
        if let Some(groups) = self.groups() {
            map.entries(groups.iter());
        }
        map.finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ImmutableListMultiDict<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = formatter.debug_map();
        if let Some(groups) = self.groups() {
            map.entries(groups.iter());
        }
        map.finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for ImmutableSetMultiDict<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        if let Some(groups) = self.groups() {
            for (key, group) in groups.iter() {
                if first {
                    first = false;
                } else {
                    write!(formatter, ", ")?;
                }
                write!(formatter, "{key}: {group}")?;
            }
        }
        write!(formatter, "}}")
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for ImmutableListMultiDict<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        if let Some(groups) = self.groups() {
            for (key, group) in groups.iter() {
                if first {
                    first = false;
                } else {
                    write!(formatter, ", ")?;
                }
                write!(formatter, "{key}: {group}")?;
            }
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for ImmutableSetMultiDict<K, V> {
    /// Serializes as a plain map from each key to the sequence of its
    /// values, never exposing the internal representation.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.keys().len()))?;
        if let Some(groups) = self.groups() {
            for (key, group) in groups.iter() {
                map.serialize_entry(key, group)?;
            }
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for ImmutableListMultiDict<K, V> {
    /// Serializes as a plain map from each key to the sequence of its
    /// values, never exposing the internal representation.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.keys().len()))?;
        if let Some(groups) = self.groups() {
            for (key, group) in groups.iter() {
                map.serialize_entry(key, group)?;
            }
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct ImmutableSetMultiDictVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for ImmutableSetMultiDictVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone + Eq + Hash,
{
    type Value = ImmutableSetMultiDict<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map from keys to sequences of values")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut builder = ImmutableSetMultiDict::builder();
        while let Some((key, values)) = map.next_entry::<K, Vec<V>>()? {
            for value in values {
                builder = builder.put(key.clone(), value);
            }
        }
        // Reconstructs through the public construction path, re-validating
        // per-group deduplication.
        Ok(builder.build())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for ImmutableSetMultiDict<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone + Eq + Hash,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(ImmutableSetMultiDictVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

#[cfg(feature = "serde")]
struct ImmutableListMultiDictVisitor<K, V> {
    marker: std::marker::PhantomData<(K, V)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for ImmutableListMultiDictVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = ImmutableListMultiDict<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map from keys to sequences of values")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut builder = ImmutableListMultiDict::builder();
        while let Some((key, values)) = map.next_entry::<K, Vec<V>>()? {
            for value in values {
                builder = builder.put(key.clone(), value);
            }
        }
        Ok(builder.build())
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for ImmutableListMultiDict<K, V>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(ImmutableListMultiDictVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
