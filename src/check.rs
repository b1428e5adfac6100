//! Element checks: named membership constraints validated at insertion.
//!
//! An [`ElementCheck`] is the crate's rendering of an optional run-time
//! constraint on the direct elements of an [`ImmutableSet`]: a named
//! predicate that every element is validated against when the set is built
//! through a checking construction path. The check is recorded on the built
//! set, so a set already known to satisfy a check is never re-scanned when
//! asked to guarantee the same check again.
//!
//! Checks are compared by identity (label plus predicate address), not by
//! extensional behavior: two checks built from different function items are
//! distinct even if they accept the same elements.
//!
//! # Examples
//!
//! ```rust
//! use immutablecollections::{ElementCheck, immutableset_checked};
//!
//! const NON_NEGATIVE: ElementCheck<i32> = ElementCheck::new("non-negative", |n| *n >= 0);
//!
//! let accepted = immutableset_checked(vec![0, 1, 2], NON_NEGATIVE);
//! assert!(accepted.is_ok());
//!
//! let rejected = immutableset_checked(vec![0, -1, 2], NON_NEGATIVE);
//! assert!(rejected.is_err());
//! ```
//!
//! [`ImmutableSet`]: crate::ImmutableSet

use std::fmt;
use std::ptr;

/// A named predicate every direct element of a checked set must satisfy.
///
/// The predicate is a plain function pointer so that checks are `Copy` and
/// comparable by address; closures capturing state are deliberately not
/// supported, because check identity is what allows re-validation to be
/// skipped (see [`immutableset_checked`]).
///
/// [`immutableset_checked`]: crate::immutableset_checked
pub struct ElementCheck<T: ?Sized> {
    label: &'static str,
    predicate: fn(&T) -> bool,
}

impl<T: ?Sized> ElementCheck<T> {
    /// Creates a check from a label and a predicate.
    ///
    /// The label appears in error messages when an element is rejected.
    #[inline]
    #[must_use]
    pub const fn new(label: &'static str, predicate: fn(&T) -> bool) -> Self {
        Self { label, predicate }
    }

    /// Returns the label naming this check.
    #[inline]
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Returns `true` if `element` satisfies this check.
    #[inline]
    #[must_use]
    pub fn admits(&self, element: &T) -> bool {
        (self.predicate)(element)
    }
}

impl<T: ?Sized> Clone for ElementCheck<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ElementCheck<T> {}

impl<T: ?Sized> PartialEq for ElementCheck<T> {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && ptr::fn_addr_eq(self.predicate, other.predicate)
    }
}

impl<T: ?Sized> Eq for ElementCheck<T> {}

impl<T: ?Sized> fmt::Debug for ElementCheck<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ElementCheck")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::ElementCheck;
    use rstest::rstest;

    const NON_NEGATIVE: ElementCheck<i32> = ElementCheck::new("non-negative", |n| *n >= 0);
    const EVEN: ElementCheck<i32> = ElementCheck::new("even", |n| n % 2 == 0);

    #[rstest]
    fn test_admits() {
        assert!(NON_NEGATIVE.admits(&0));
        assert!(NON_NEGATIVE.admits(&17));
        assert!(!NON_NEGATIVE.admits(&-1));
    }

    #[rstest]
    fn test_label() {
        assert_eq!(NON_NEGATIVE.label(), "non-negative");
    }

    #[rstest]
    fn test_identity_equality() {
        assert_eq!(NON_NEGATIVE, NON_NEGATIVE);
        assert_ne!(NON_NEGATIVE, EVEN);
    }

    #[rstest]
    fn test_str_element_check() {
        const LOWERCASE: ElementCheck<str> =
            ElementCheck::new("lowercase", |s| !s.chars().any(char::is_uppercase));
        assert!(LOWERCASE.admits("abc"));
        assert!(!LOWERCASE.admits("Abc"));
    }
}
