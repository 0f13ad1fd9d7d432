//! Comparators.
//!
//! The tree never calls `Ord` directly; it asks its comparator. A
//! comparator orders a stored value (`L`) against a probe (`R`), which lets
//! lookups use a borrowed form of the key just like the standard
//! collections do.

use std::borrow::Borrow;
use std::cmp::Ordering;

/// A strict weak ordering between a stored value and a probe.
pub trait Compare<L: ?Sized, R: ?Sized = L> {
    /// Orders `left` relative to `right`.
    fn compare(&self, left: &L, right: &R) -> Ordering;
}

/// Orders values by their [`Ord`] implementation, through [`Borrow`].
///
/// # Examples
///
/// ```rust
/// use rbcore::compare::{Compare, Natural};
/// use std::cmp::Ordering;
///
/// assert_eq!(Natural.compare(&1, &2), Ordering::Less);
/// let owned = String::from("b");
/// assert_eq!(Compare::<String, str>::compare(&Natural, &owned, "a"), Ordering::Greater);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<L, R> Compare<L, R> for Natural
where
    L: Borrow<R> + ?Sized,
    R: Ord + ?Sized,
{
    #[inline]
    fn compare(&self, left: &L, right: &R) -> Ordering {
        left.borrow().cmp(right)
    }
}

/// Inverts another comparator.
///
/// # Examples
///
/// ```rust
/// use rbcore::compare::{Compare, Natural, Reverse};
/// use std::cmp::Ordering;
///
/// assert_eq!(Reverse(Natural).compare(&1, &2), Ordering::Greater);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reverse<C>(pub C);

impl<L, R, C> Compare<L, R> for Reverse<C>
where
    L: ?Sized,
    R: ?Sized,
    C: Compare<L, R>,
{
    #[inline]
    fn compare(&self, left: &L, right: &R) -> Ordering {
        self.0.compare(left, right).reverse()
    }
}

/// Adapts a closure into a comparator.
///
/// # Examples
///
/// ```rust
/// use rbcore::compare::{Compare, CompareFn};
///
/// let by_length = CompareFn(|left: &&str, right: &&str| left.len().cmp(&right.len()));
/// assert!(by_length.compare(&"ab", &"abc").is_lt());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareFn<F>(pub F);

impl<L, R, F> Compare<L, R> for CompareFn<F>
where
    L: ?Sized,
    R: ?Sized,
    F: Fn(&L, &R) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &L, right: &R) -> Ordering {
        (self.0)(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 2, Ordering::Less)]
    #[case(2, 2, Ordering::Equal)]
    #[case(3, 2, Ordering::Greater)]
    fn test_natural(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(Natural.compare(&left, &right), expected);
    }

    #[rstest]
    fn test_natural_borrowed_probe() {
        let stored = String::from("key");
        assert_eq!(
            Compare::<String, str>::compare(&Natural, &stored, "key"),
            Ordering::Equal
        );
    }

    #[rstest]
    fn test_reverse_inverts() {
        assert_eq!(Reverse(Natural).compare(&1, &2), Ordering::Greater);
        assert_eq!(Reverse(Reverse(Natural)).compare(&1, &2), Ordering::Less);
    }

    #[rstest]
    fn test_compare_fn_by_key() {
        let by_first = CompareFn(|left: &(i32, char), right: &(i32, char)| left.0.cmp(&right.0));
        assert_eq!(by_first.compare(&(1, 'z'), &(1, 'a')), Ordering::Equal);
        assert_eq!(by_first.compare(&(0, 'z'), &(1, 'a')), Ordering::Less);
    }
}
