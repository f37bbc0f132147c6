//! Linear scans and binary searches.

use crate::contract::ElementContract;
use core::cmp::Ordering;

/*──────────────────── linear scans ───────────────────────*/

/// First index `>= from` holding an element equal to `value`.
pub fn find<C>(contract: &C, items: &[C::Item], from: usize, value: &C::Item) -> Option<usize>
where
    C: ElementContract + ?Sized,
{
    find_if(items, from, |x| contract.equals(x, value))
}

/// First index `>= from` whose element satisfies `pred`.
pub fn find_if<T, P>(items: &[T], from: usize, mut pred: P) -> Option<usize>
where
    P: FnMut(&T) -> bool,
{
    let tail = items.get(from..)?;
    tail.iter().position(|x| pred(x)).map(|i| i + from)
}

/// Last index `<= from` holding an element equal to `value`.
///
/// `from` past the end starts the scan at the last element.
pub fn find_last<C>(contract: &C, items: &[C::Item], from: usize, value: &C::Item) -> Option<usize>
where
    C: ElementContract + ?Sized,
{
    find_last_if(items, from, |x| contract.equals(x, value))
}

/// Last index `<= from` whose element satisfies `pred`.
pub fn find_last_if<T, P>(items: &[T], from: usize, mut pred: P) -> Option<usize>
where
    P: FnMut(&T) -> bool,
{
    let start = from.min(items.len().checked_sub(1)?);
    items[..=start].iter().rposition(|x| pred(x))
}

/// First index `>= from` where `pred(element, key)` holds.
pub fn look<T, K, P>(items: &[T], from: usize, key: &K, mut pred: P) -> Option<usize>
where
    K: ?Sized,
    P: FnMut(&T, &K) -> bool,
{
    find_if(items, from, |x| pred(x, key))
}

#[inline]
pub fn contains<C>(contract: &C, items: &[C::Item], value: &C::Item) -> bool
where
    C: ElementContract + ?Sized,
{
    find(contract, items, 0, value).is_some()
}

pub fn count<C>(contract: &C, items: &[C::Item], value: &C::Item) -> usize
where
    C: ElementContract + ?Sized,
{
    count_if(items, |x| contract.equals(x, value))
}

pub fn count_if<T, P>(items: &[T], mut pred: P) -> usize
where
    P: FnMut(&T) -> bool,
{
    items.iter().filter(|x| pred(x)).count()
}

/// `true` for an empty slice.
pub fn all<T, P: FnMut(&T) -> bool>(items: &[T], pred: P) -> bool {
    items.iter().all(pred)
}

/// Stops at the first match.
pub fn any<T, P: FnMut(&T) -> bool>(items: &[T], pred: P) -> bool {
    items.iter().any(pred)
}

pub fn none<T, P: FnMut(&T) -> bool>(items: &[T], pred: P) -> bool {
    !any(items, pred)
}

/*──────────────────── binary searches ───────────────────────*/
// every routine below expects `items` sorted ascending by the same `cmp`

/// Smallest index whose element fails `pred`, assuming all passing elements come
/// first. The predicate is evaluated on every step.
fn partition_point<T, P>(items: &[T], mut pred: P) -> usize
where
    P: FnMut(&T) -> bool,
{
    let (mut lo, mut hi) = (0, items.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(&items[mid]) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Smallest `i` with `items[i] >= key`, or `items.len()`.
pub fn lower_bound<T, F>(items: &[T], key: &T, mut cmp: F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    partition_point(items, |x| cmp(x, key) == Ordering::Less)
}

/// Smallest `i` with `items[i] > key`, or `items.len()`.
pub fn upper_bound<T, F>(items: &[T], key: &T, mut cmp: F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    partition_point(items, |x| cmp(x, key) != Ordering::Greater)
}

/// Some index whose element compares equal to `key`.
pub fn binary_search<T, F>(items: &[T], key: &T, mut cmp: F) -> Option<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let i = lower_bound(items, key, &mut cmp);
    (i < items.len() && cmp(&items[i], key) == Ordering::Equal).then_some(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Natural;

    const C: Natural<i32> = Natural::new();

    #[test]
    fn forward_and_backward_scans() {
        let v = [4, 1, 4, 2, 4];
        assert_eq!(find(&C, &v, 0, &4), Some(0));
        assert_eq!(find(&C, &v, 1, &4), Some(2));
        assert_eq!(find(&C, &v, 5, &4), None);
        assert_eq!(find(&C, &v, 99, &4), None);
        assert_eq!(find(&C, &v, 0, &7), None);

        assert_eq!(find_last(&C, &v, 4, &4), Some(4));
        assert_eq!(find_last(&C, &v, 3, &4), Some(2));
        assert_eq!(find_last(&C, &v, 99, &1), Some(1));
        assert_eq!(find_last(&C, &v, 0, &1), None);
        assert_eq!(find_last_if(&[] as &[i32], 3, |_| true), None);

        assert_eq!(find_if(&v, 0, |x| *x < 3), Some(1));
        assert_eq!(find_last_if(&v, 4, |x| *x < 3), Some(3));
    }

    #[test]
    fn look_uses_the_binary_predicate() {
        let v = [10, 20, 30];
        assert_eq!(look(&v, 0, &25, |x, k| x > k), Some(2));
        assert_eq!(look(&v, 0, &99, |x, k| x > k), None);
    }

    #[test]
    fn counting_and_quantifiers() {
        let v = [1, 2, 2, 3, 2];
        assert_eq!(count(&C, &v, &2), 3);
        assert_eq!(count_if(&v, |x| x % 2 == 1), 2);
        assert!(contains(&C, &v, &3));
        assert!(!contains(&C, &v, &9));

        assert!(all(&v, |x| *x > 0));
        assert!(any(&v, |x| *x == 3));
        assert!(none(&v, |x| *x > 3));
        assert!(all(&[] as &[i32], |_| false));
        assert!(!any(&[] as &[i32], |_| true));
    }

    #[test]
    fn any_short_circuits() {
        let v = [1, 2, 3, 4];
        let mut seen = 0;
        assert!(any(&v, |x| {
            seen += 1;
            *x == 2
        }));
        assert_eq!(seen, 2);
    }

    #[test]
    fn bounds_on_duplicates() {
        let v = [1, 2, 2, 2, 5, 7];
        assert_eq!(lower_bound(&v, &2, i32::cmp), 1);
        assert_eq!(upper_bound(&v, &2, i32::cmp), 4);
        assert_eq!(lower_bound(&v, &0, i32::cmp), 0);
        assert_eq!(upper_bound(&v, &7, i32::cmp), 6);
        assert_eq!(lower_bound(&v, &8, i32::cmp), 6);
        assert_eq!(lower_bound(&v, &3, i32::cmp), 4);
        assert_eq!(upper_bound(&v, &3, i32::cmp), 4);

        assert!(matches!(binary_search(&v, &2, i32::cmp), Some(1..=3)));
        assert_eq!(binary_search(&v, &3, i32::cmp), None);
        assert_eq!(binary_search(&[] as &[i32], &3, i32::cmp), None);
    }

    #[test]
    fn bounds_invoke_the_comparator() {
        // a descending comparator must flip the answer, which it cannot do if the
        // comparator is never actually called
        let v = [9, 7, 7, 3];
        let desc = |a: &i32, b: &i32| b.cmp(a);
        assert_eq!(lower_bound(&v, &7, desc), 1);
        assert_eq!(upper_bound(&v, &7, desc), 3);
        assert_eq!(binary_search(&v, &3, desc), Some(3));
    }
}
