//! Serialization tests for every collection family.
//!
//! Each family serializes to its *plain* form — a sequence of items or a map
//! of pairs, never internal representation details — and deserializes
//! through the public construction path, re-validating invariants. These
//! tests check both the wire shape and the round trips for empty, singleton,
//! and multi-element values.

use immutablecollections::{
    ImmutableDict, ImmutableList, ImmutableListMultiDict, ImmutableSet, ImmutableSetMultiDict,
    immutabledict, immutablelist, immutableset,
};
use rstest::rstest;

// =============================================================================
// Wire shape
// =============================================================================

#[rstest]
fn test_list_serializes_as_plain_sequence() {
    let list = immutablelist(vec![1, 2, 3]);
    assert_eq!(serde_json::to_string(&list).unwrap(), "[1,2,3]");
}

#[rstest]
fn test_set_serializes_in_iteration_order() {
    let set = immutableset(vec![3, 1, 2]);
    assert_eq!(serde_json::to_string(&set).unwrap(), "[3,1,2]");
}

#[rstest]
fn test_dict_serializes_as_plain_map_in_order() {
    let dict = immutabledict(vec![("b", 2), ("a", 1)]);
    assert_eq!(serde_json::to_string(&dict).unwrap(), r#"{"b":2,"a":1}"#);
}

#[rstest]
fn test_multidicts_serialize_as_maps_of_sequences() {
    let set_valued = ImmutableSetMultiDict::from_groups([("k", vec![2, 2, 1])]);
    assert_eq!(
        serde_json::to_string(&set_valued).unwrap(),
        r#"{"k":[2,1]}"#
    );

    let list_valued = ImmutableListMultiDict::from_groups([("k", vec![2, 2, 1])]);
    assert_eq!(
        serde_json::to_string(&list_valued).unwrap(),
        r#"{"k":[2,2,1]}"#
    );
}

// =============================================================================
// Round trips
// =============================================================================

#[rstest]
#[case(vec![])]
#[case(vec![7])]
#[case(vec![3, 1, 2])]
fn test_list_round_trip(#[case] items: Vec<i32>) {
    let original = immutablelist(items);
    let json = serde_json::to_string(&original).unwrap();
    let restored: ImmutableList<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, original);
}

#[rstest]
#[case(vec![])]
#[case(vec![7])]
#[case(vec![3, 1, 2])]
fn test_set_round_trip_preserves_order(#[case] items: Vec<i32>) {
    let original = immutableset(items);
    let json = serde_json::to_string(&original).unwrap();
    let restored: ImmutableSet<i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, original);
    assert_eq!(restored.to_vec(), original.to_vec());
}

#[rstest]
fn test_dict_round_trip_preserves_order() {
    let original = immutabledict(vec![
        ("b".to_string(), 2),
        ("a".to_string(), 1),
        ("c".to_string(), 3),
    ]);
    let json = serde_json::to_string(&original).unwrap();
    let restored: ImmutableDict<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, original);

    let original_keys: Vec<&String> = original.keys().collect();
    let restored_keys: Vec<&String> = restored.keys().collect();
    assert_eq!(restored_keys, original_keys);
}

#[rstest]
fn test_empty_dict_round_trip_is_canonical() {
    let json = serde_json::to_string(&ImmutableDict::<String, i32>::new()).unwrap();
    let restored: ImmutableDict<String, i32> = serde_json::from_str(&json).unwrap();
    assert!(restored.ptr_eq(&ImmutableDict::new()));
}

#[rstest]
fn test_set_multidict_round_trip() {
    let original = ImmutableSetMultiDict::from_groups([
        ("a".to_string(), vec![1, 2]),
        ("b".to_string(), vec![3]),
    ]);
    let json = serde_json::to_string(&original).unwrap();
    let restored: ImmutableSetMultiDict<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, original);
    assert_eq!(restored.len(), 3);
}

#[rstest]
fn test_list_multidict_round_trip_keeps_duplicates() {
    let original = ImmutableListMultiDict::from_groups([("a".to_string(), vec![1, 1, 2])]);
    let json = serde_json::to_string(&original).unwrap();
    let restored: ImmutableListMultiDict<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, original);
    assert_eq!(restored.len(), 3);
}

// =============================================================================
// Re-validation on deserialize
// =============================================================================

#[rstest]
fn test_set_deserialization_revalidates_dedup() {
    // A hand-written payload with duplicates goes through the public
    // construction path, which deduplicates rather than trusting the wire.
    let restored: ImmutableSet<i32> = serde_json::from_str("[3,1,3,2,1]").unwrap();
    assert_eq!(restored, immutableset(vec![3, 1, 2]));
    assert_eq!(restored.to_vec(), vec![3, 1, 2]);
}

#[rstest]
fn test_empty_payloads_restore_canonical_empties() {
    let list: ImmutableList<i32> = serde_json::from_str("[]").unwrap();
    assert!(list.ptr_eq(&ImmutableList::new()));

    let set: ImmutableSet<i32> = serde_json::from_str("[]").unwrap();
    assert!(set.ptr_eq(&ImmutableSet::new()));

    let multidict: ImmutableSetMultiDict<String, i32> = serde_json::from_str("{}").unwrap();
    assert!(multidict.ptr_eq(&ImmutableSetMultiDict::new()));
}

#[rstest]
fn test_dict_deserialization_later_key_wins() {
    let restored: ImmutableDict<String, i32> = serde_json::from_str(r#"{"a":1,"a":2}"#).unwrap();
    assert_eq!(restored.get("a"), Some(&2));
    assert_eq!(restored.len(), 1);
}
