//! Unit tests for ImmutableDict.
//!
//! Covers insertion-order iteration, canonical empty routing, the
//! copy-on-first-write builder, indexing/inversion/filtering, and
//! equality/hash cross-compatibility with the native map types.

use immutablecollections::{
    AssumeOrdered, ImmutableDict, immutabledict, immutabledict_from_unique_keys,
};
use rstest::rstest;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// =============================================================================
// Canonical empty
// =============================================================================

#[rstest]
fn test_every_empty_construction_path_is_canonical() {
    let from_new: ImmutableDict<i32, i32> = ImmutableDict::new();
    let from_factory = immutabledict(Vec::<(i32, i32)>::new());
    let from_builder: ImmutableDict<i32, i32> = ImmutableDict::builder().build();

    assert!(from_new.ptr_eq(&from_factory));
    assert!(from_new.ptr_eq(&from_builder));
}

// =============================================================================
// Identity reuse
// =============================================================================

#[rstest]
fn test_factory_returns_existing_instance() {
    let dict = immutabledict(vec![("a", 1), ("b", 2)]);
    assert!(immutabledict(&dict).ptr_eq(&dict));

    let empty: ImmutableDict<&str, i32> = ImmutableDict::new();
    assert!(immutabledict(&empty).ptr_eq(&empty));
}

// =============================================================================
// Order and duplicate keys
// =============================================================================

#[rstest]
fn test_iteration_follows_key_insertion_order() {
    let dict = immutabledict(vec![("c", 3), ("a", 1), ("b", 2)]);
    let keys: Vec<&&str> = dict.keys().collect();
    assert_eq!(keys, vec![&"c", &"a", &"b"]);
    let values: Vec<&i32> = dict.values().collect();
    assert_eq!(values, vec![&3, &1, &2]);
}

#[rstest]
fn test_later_value_wins_for_repeated_key() {
    let dict = immutabledict(vec![(1, "first"), (2, "other"), (1, "second")]);
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.get(&1), Some(&"second"));
}

#[rstest]
fn test_unique_keys_factory_names_every_offender() {
    let error =
        immutabledict_from_unique_keys(vec![(7, 8), (9, 10), (7, 11), (9, 12)]).unwrap_err();
    assert_eq!(error.keys(), &[7, 9]);
    assert!(error.to_string().contains("multiple times"));
}

#[rstest]
fn test_btree_and_indexmap_sources_are_accepted() {
    let sorted: BTreeMap<i32, &str> = [(2, "b"), (1, "a")].into_iter().collect();
    let dict = immutabledict(sorted);
    let keys: Vec<&i32> = dict.keys().collect();
    assert_eq!(keys, vec![&1, &2]);

    let hash_ordered: HashMap<i32, &str> = [(1, "a")].into_iter().collect();
    let dict = immutabledict(AssumeOrdered(hash_ordered));
    assert_eq!(dict.len(), 1);
}

// =============================================================================
// Copy-on-first-write builder
// =============================================================================

#[rstest]
fn test_unmutated_builder_returns_source() {
    let source = immutabledict(vec![("a", 1)]);
    let rebuilt = source.to_builder().build();
    assert!(rebuilt.ptr_eq(&source));
}

#[rstest]
fn test_mutated_builder_produces_merged_copy() {
    let source = immutabledict(vec![("a", 1)]);
    let merged = source.to_builder().put("b", 2).build();

    assert!(!merged.ptr_eq(&source));
    assert_eq!(merged, immutabledict(vec![("a", 1), ("b", 2)]));
    assert_eq!(source, immutabledict(vec![("a", 1)]));
}

#[rstest]
fn test_builder_replays_source_before_new_entries() {
    let source = immutabledict(vec![("a", 1), ("b", 2)]);
    let updated = source.to_builder().put("a", 10).put("c", 3).build();

    let keys: Vec<&&str> = updated.keys().collect();
    assert_eq!(keys, vec![&"a", &"b", &"c"]);
    assert_eq!(updated.get("a"), Some(&10));
}

#[rstest]
fn test_builder_put_all_merges_sources() {
    let dict = ImmutableDict::builder()
        .put(1, "one")
        .put_all(vec![(2, "two"), (3, "three")])
        .build();
    assert_eq!(dict.len(), 3);
}

// =============================================================================
// index_by, inverse, filter_keys
// =============================================================================

#[rstest]
fn test_index_by_keys_items_by_function() {
    let dict = ImmutableDict::index_by(vec!["apple", "banana", "cherry"], |word| {
        word.chars().next().unwrap()
    });
    assert_eq!(dict.get(&'a'), Some(&"apple"));
    assert_eq!(dict.get(&'b'), Some(&"banana"));
    assert_eq!(dict.get(&'c'), Some(&"cherry"));
}

#[rstest]
fn test_inverse_swaps_keys_and_values() {
    let dict = immutabledict(vec![("a", 1), ("b", 2)]);
    let inverse = dict.inverse().unwrap();
    assert_eq!(inverse.get(&1), Some(&"a"));
    assert_eq!(inverse.get(&2), Some(&"b"));
}

#[rstest]
fn test_inverse_rejects_duplicate_values_naming_all() {
    let dict = immutabledict(vec![("a", 1), ("b", 1), ("c", 2), ("d", 2), ("e", 3)]);
    let error = dict.inverse().unwrap_err();
    assert_eq!(error.keys(), &[1, 2]);
}

#[rstest]
fn test_filter_keys_identity_and_filtering() {
    let dict = immutabledict(vec![(1, "a"), (2, "b"), (3, "c")]);
    assert!(dict.filter_keys(|_| true).ptr_eq(&dict));

    let filtered = dict.filter_keys(|key| *key != 2);
    let keys: Vec<&i32> = filtered.keys().collect();
    assert_eq!(keys, vec![&1, &3]);
}

#[rstest]
fn test_filter_keys_to_nothing_is_canonical_empty() {
    let dict = immutabledict(vec![(1, "a")]);
    assert!(dict.filter_keys(|_| false).ptr_eq(&ImmutableDict::new()));
}

// =============================================================================
// Equality and hashing
// =============================================================================

#[rstest]
fn test_permutation_invariant_equality_and_hash() {
    let forward = immutabledict(vec![("a", 1), ("b", 2), ("c", 3)]);
    let backward = immutabledict(vec![("c", 3), ("b", 2), ("a", 1)]);
    assert_eq!(forward, backward);
    assert_eq!(hash_of(&forward), hash_of(&backward));
}

#[rstest]
fn test_cross_compatibility_with_native_maps() {
    let dict = immutabledict(vec![("a", 1), ("b", 2)]);
    let native: HashMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
    let sorted: BTreeMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();

    assert_eq!(dict, native);
    assert_eq!(native, dict);
    assert_eq!(dict, sorted);
    assert_eq!(sorted, dict);
}

#[rstest]
fn test_usable_as_hash_map_key() {
    let mut outer: HashMap<ImmutableDict<&str, i32>, &str> = HashMap::new();
    outer.insert(immutabledict(vec![("a", 1), ("b", 2)]), "value");
    assert_eq!(
        outer.get(&immutabledict(vec![("b", 2), ("a", 1)])),
        Some(&"value")
    );
}

// =============================================================================
// Lookup
// =============================================================================

#[rstest]
fn test_borrowed_key_lookup() {
    let dict = immutabledict(vec![("key".to_string(), 42)]);
    assert_eq!(dict.get("key"), Some(&42));
    assert!(dict.contains_key("key"));
    assert!(!dict.contains_key("other"));
}

#[rstest]
fn test_index_syntax() {
    let dict = immutabledict(vec![("a", 1)]);
    assert_eq!(dict["a"], 1);
}
