//! Error types for construction paths that enforce invariants.
//!
//! Every error in this crate is surfaced synchronously to the immediate
//! caller and carries the complete diagnostic payload: uniqueness violations
//! name *all* offending elements or keys, not just the first one found.
//! Construction is all-or-nothing — a failed factory or builder call never
//! leaves a partially-built collection observable.

use std::fmt;

use crate::check::ElementCheck;

// =============================================================================
// Element Check Violations
// =============================================================================

/// An element failed the [`ElementCheck`] declared for a set.
///
/// Returned by checked factories and by [`CheckedImmutableSetBuilder`] at the
/// point of insertion.
///
/// # Examples
///
/// ```rust
/// use immutablecollections::{CheckViolation, ElementCheck};
///
/// const NON_NEGATIVE: ElementCheck<i32> = ElementCheck::new("non-negative", |n| *n >= 0);
///
/// let violation = CheckViolation::new(NON_NEGATIVE, -3);
/// assert_eq!(
///     format!("{}", violation),
///     "expected every element to satisfy check `non-negative`, but got -3"
/// );
/// ```
///
/// [`CheckedImmutableSetBuilder`]: crate::CheckedImmutableSetBuilder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckViolation<T> {
    check: &'static str,
    element: T,
}

impl<T> CheckViolation<T> {
    /// Creates a violation for `element` against `check`.
    #[must_use]
    pub fn new(check: ElementCheck<T>, element: T) -> Self {
        Self {
            check: check.label(),
            element,
        }
    }

    /// The label of the violated check.
    #[must_use]
    pub const fn check(&self) -> &'static str {
        self.check
    }

    /// The element that failed the check.
    #[must_use]
    pub const fn element(&self) -> &T {
        &self.element
    }
}

impl<T: fmt::Debug> fmt::Display for CheckViolation<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "expected every element to satisfy check `{}`, but got {:?}",
            self.check, self.element
        )
    }
}

impl<T: fmt::Debug> std::error::Error for CheckViolation<T> {}

/// Which operand of a set union the offending elements came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionSide {
    /// The receiver of the union call.
    Left,
    /// The argument of the union call.
    Right,
}

impl fmt::Display for UnionSide {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => formatter.write_str("left"),
            Self::Right => formatter.write_str("right"),
        }
    }
}

/// One side of a checked union contained elements failing the check.
///
/// The scan runs up front, before any part of the result is constructed, and
/// reports at most [`UnionCheckViolation::MAX_REPORTED`] offenders per side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionCheckViolation<T> {
    check: &'static str,
    side: UnionSide,
    offenders: Vec<T>,
}

impl<T> UnionCheckViolation<T> {
    /// Upper bound on the number of offending elements reported.
    pub const MAX_REPORTED: usize = 10;

    pub(crate) fn new(check: ElementCheck<T>, side: UnionSide, offenders: Vec<T>) -> Self {
        debug_assert!(!offenders.is_empty());
        debug_assert!(offenders.len() <= Self::MAX_REPORTED);
        Self {
            check: check.label(),
            side,
            offenders,
        }
    }

    /// The label of the violated check.
    #[must_use]
    pub const fn check(&self) -> &'static str {
        self.check
    }

    /// The operand the offenders came from.
    #[must_use]
    pub const fn side(&self) -> UnionSide {
        self.side
    }

    /// The offending elements, in the operand's iteration order.
    #[must_use]
    pub fn offenders(&self) -> &[T] {
        &self.offenders
    }
}

impl<T: fmt::Debug> fmt::Display for UnionCheckViolation<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "elements in set union were asked to satisfy check `{}`, but got {:?} on the {}",
            self.check, self.offenders, self.side
        )
    }
}

impl<T: fmt::Debug> std::error::Error for UnionCheckViolation<T> {}

// =============================================================================
// Uniqueness Violations
// =============================================================================

/// Duplicate elements were found where uniqueness was explicitly requested.
///
/// The duplicate-finding scan only runs once a length mismatch between input
/// and deduplicated output has been detected, so its cost is isolated to the
/// failure path. Every element occurring more than once is named, in
/// first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateElements<T> {
    duplicates: Vec<T>,
}

impl<T> DuplicateElements<T> {
    pub(crate) fn new(duplicates: Vec<T>) -> Self {
        debug_assert!(!duplicates.is_empty());
        Self { duplicates }
    }

    /// Every element that occurred more than once, in first-occurrence order.
    #[must_use]
    pub fn duplicates(&self) -> &[T] {
        &self.duplicates
    }
}

impl<T: fmt::Debug> fmt::Display for DuplicateElements<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "duplicate elements were forbidden, but some occur multiple times in input: {:?}",
            self.duplicates
        )
    }
}

impl<T: fmt::Debug> std::error::Error for DuplicateElements<T> {}

/// Duplicate keys were found where uniqueness was explicitly requested.
///
/// Raised by [`immutabledict_from_unique_keys`] and by
/// [`ImmutableDict::inverse`] when the source values are not unique. Every
/// offending key is named, in first-occurrence order.
///
/// [`immutabledict_from_unique_keys`]: crate::immutabledict_from_unique_keys
/// [`ImmutableDict::inverse`]: crate::ImmutableDict::inverse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeys<K> {
    keys: Vec<K>,
}

impl<K> DuplicateKeys<K> {
    pub(crate) fn new(keys: Vec<K>) -> Self {
        debug_assert!(!keys.is_empty());
        Self { keys }
    }

    /// Every key that occurred more than once, in first-occurrence order.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }
}

impl<K: fmt::Debug> fmt::Display for DuplicateKeys<K> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "duplicate keys were forbidden, but some occur multiple times in input: {:?}",
            self.keys
        )
    }
}

impl<K: fmt::Debug> std::error::Error for DuplicateKeys<K> {}

// =============================================================================
// Tests
// =============================================================================
