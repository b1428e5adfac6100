//! Unit tests for ImmutableSetMultiDict and ImmutableListMultiDict.
//!
//! Covers the length semantics of the two group kinds, inversion in both
//! directions, the copy-on-first-write builders, and group lookup routing to
//! canonical empties.

use immutablecollections::{
    ImmutableListMultiDict, ImmutableSet, ImmutableSetMultiDict, immutablelist,
    immutablelistmultidict, immutableset, immutablesetmultidict,
};
use rstest::rstest;

// =============================================================================
// Canonical empty
// =============================================================================

#[rstest]
fn test_every_empty_construction_path_is_canonical() {
    let from_new: ImmutableSetMultiDict<i32, i32> = ImmutableSetMultiDict::new();
    let from_factory = immutablesetmultidict(Vec::<(i32, i32)>::new());
    let from_builder: ImmutableSetMultiDict<i32, i32> = ImmutableSetMultiDict::builder().build();
    assert!(from_new.ptr_eq(&from_factory));
    assert!(from_new.ptr_eq(&from_builder));

    let list_new: ImmutableListMultiDict<i32, i32> = ImmutableListMultiDict::new();
    let list_factory = immutablelistmultidict(Vec::<(i32, i32)>::new());
    assert!(list_new.ptr_eq(&list_factory));
}

// =============================================================================
// Identity reuse
// =============================================================================

#[rstest]
fn test_factories_return_existing_instances() {
    let set_valued = immutablesetmultidict(vec![(1, "a")]);
    assert!(immutablesetmultidict(&set_valued).ptr_eq(&set_valued));

    let list_valued = immutablelistmultidict(vec![(1, "a")]);
    assert!(immutablelistmultidict(&list_valued).ptr_eq(&list_valued));
}

// =============================================================================
// Length semantics
// =============================================================================

#[rstest]
fn test_set_multidict_length_dedups_within_groups() {
    let multidict = ImmutableSetMultiDict::from_groups([(1, vec![2, 2, 3])]);
    assert_eq!(multidict.len(), 2);
}

#[rstest]
fn test_list_multidict_length_counts_duplicates() {
    let multidict = ImmutableListMultiDict::from_groups([(1, vec![2, 2, 3])]);
    assert_eq!(multidict.len(), 3);
}

#[rstest]
fn test_length_sums_across_keys_and_is_stable() {
    let multidict =
        ImmutableListMultiDict::from_groups([(1, vec![10, 11]), (2, vec![20]), (3, vec![])]);
    // Keys with no values contribute no group at all.
    assert_eq!(multidict.len(), 3);
    assert_eq!(multidict.len(), 3); // cached second read
    assert!(!multidict.contains_key(&3));
}

// =============================================================================
// Group lookup
// =============================================================================

#[rstest]
fn test_group_lookup_and_canonical_empty_default() {
    let multidict = ImmutableSetMultiDict::from_groups([(1, vec![2, 3, 2])]);
    assert_eq!(multidict.group(&1), immutableset(vec![2, 3]));
    assert!(multidict.group(&9).ptr_eq(&ImmutableSet::new()));
    assert_eq!(multidict.get(&9), None);
}

#[rstest]
fn test_list_groups_preserve_duplicates_in_order() {
    let multidict = immutablelistmultidict(vec![(1, "a"), (2, "x"), (1, "b"), (1, "a")]);
    assert_eq!(
        multidict.group(&1),
        immutablelist(vec!["a", "b", "a"])
    );
}

#[rstest]
fn test_as_dict_exposes_group_mapping() {
    let multidict = ImmutableSetMultiDict::from_groups([(1, vec![2])]);
    let dict = multidict.as_dict();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.get(&1), Some(&immutableset(vec![2])));
}

// =============================================================================
// Inversion
// =============================================================================

#[rstest]
fn test_list_inversion_preserves_occurrences() {
    let source = ImmutableListMultiDict::from_groups([(1, vec![2, 2])]);
    assert_eq!(
        source.invert_to_list_multidict(),
        ImmutableListMultiDict::from_groups([(2, vec![1, 1])])
    );
}

#[rstest]
fn test_set_inversion_of_same_source_collapses() {
    let source = ImmutableListMultiDict::from_groups([(1, vec![2, 2])]);
    assert_eq!(
        source.invert_to_set_multidict(),
        ImmutableSetMultiDict::from_groups([(2, vec![1])])
    );
}

#[rstest]
fn test_set_multidict_inversion_both_directions() {
    let source = ImmutableSetMultiDict::from_groups([(1, vec![2, 3]), (4, vec![3])]);
    assert_eq!(
        source.invert_to_set_multidict(),
        ImmutableSetMultiDict::from_groups([(2, vec![1]), (3, vec![1, 4])])
    );
    assert_eq!(
        source.invert_to_list_multidict(),
        ImmutableListMultiDict::from_groups([(2, vec![1]), (3, vec![1, 4])])
    );
}

// =============================================================================
// Builders
// =============================================================================

#[rstest]
fn test_put_dedups_only_for_set_variant() {
    let set_valued = ImmutableSetMultiDict::builder()
        .put(1, "a")
        .put(1, "a")
        .build();
    assert_eq!(set_valued.len(), 1);

    let list_valued = ImmutableListMultiDict::builder()
        .put(1, "a")
        .put(1, "a")
        .build();
    assert_eq!(list_valued.len(), 2);
}

#[rstest]
fn test_unmutated_seeded_builders_return_source() {
    let set_valued = ImmutableSetMultiDict::from_groups([(1, vec![2])]);
    assert!(set_valued.to_builder().build().ptr_eq(&set_valued));

    let list_valued = ImmutableListMultiDict::from_groups([(1, vec![2])]);
    assert!(list_valued.to_builder().build().ptr_eq(&list_valued));
}

#[rstest]
fn test_mutated_seeded_builders_copy_and_merge() {
    let source = ImmutableSetMultiDict::from_groups([(1, vec![2])]);
    let merged = source.to_builder().put(1, 3).put(2, 9).build();
    assert_eq!(
        merged,
        ImmutableSetMultiDict::from_groups([(1, vec![2, 3]), (2, vec![9])])
    );
    assert_eq!(source.len(), 1);
}

#[rstest]
fn test_value_order_key_orders_each_group() {
    let multidict = ImmutableSetMultiDict::builder()
        .with_value_order_key(|value: &i32| std::cmp::Reverse(*value))
        .put_all([(1, vec![1, 3, 2]), (2, vec![5, 6])])
        .build();
    assert_eq!(multidict.group(&1).to_vec(), vec![3, 2, 1]);
    assert_eq!(multidict.group(&2).to_vec(), vec![6, 5]);
}

// =============================================================================
// Iteration
// =============================================================================

#[rstest]
fn test_pair_iteration_order() {
    let multidict = immutablelistmultidict(vec![(2, "x"), (1, "a"), (2, "y")]);
    let pairs: Vec<(i32, &str)> = multidict.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(pairs, vec![(2, "x"), (2, "y"), (1, "a")]);
}

#[rstest]
fn test_keys_and_value_groups() {
    let multidict = ImmutableSetMultiDict::from_groups([(1, vec![2]), (3, vec![4, 5])]);
    let keys: Vec<&i32> = multidict.keys().collect();
    assert_eq!(keys, vec![&1, &3]);
    let group_sizes: Vec<usize> = multidict.value_groups().map(ImmutableSet::len).collect();
    assert_eq!(group_sizes, vec![1, 2]);
}

// =============================================================================
// Filtering and equality
// =============================================================================

#[rstest]
fn test_filter_keys_identity_and_canonical_empty() {
    let multidict = ImmutableListMultiDict::from_groups([(1, vec![2]), (3, vec![4])]);
    assert!(multidict.filter_keys(|_| true).ptr_eq(&multidict));
    assert!(
        multidict
            .filter_keys(|_| false)
            .ptr_eq(&ImmutableListMultiDict::new())
    );
}

#[rstest]
fn test_equality_is_group_wise() {
    let left = immutablelistmultidict(vec![(1, "a"), (1, "b")]);
    let right = immutablelistmultidict(vec![(1, "a"), (1, "b")]);
    let reordered = immutablelistmultidict(vec![(1, "b"), (1, "a")]);
    assert_eq!(left, right);
    // List groups are order-sensitive within a key.
    assert_ne!(left, reordered);
}
