//! Whole-sequence comparison and extremal elements.

use crate::contract::{ElementContract, ensure_same_type, same_type};
use crate::error::Result;
use core::cmp::Ordering;

/// Outcome of a three-way sequence comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// The sequences hold incompatible element types.
    Undefined,
    Less,
    Equal,
    Greater,
}

impl From<Ordering> for Comparison {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Less => Comparison::Less,
            Ordering::Equal => Comparison::Equal,
            Ordering::Greater => Comparison::Greater,
        }
    }
}

impl Comparison {
    /// `None` for [`Comparison::Undefined`].
    pub fn ordering(self) -> Option<Ordering> {
        match self {
            Comparison::Undefined => None,
            Comparison::Less => Some(Ordering::Less),
            Comparison::Equal => Some(Ordering::Equal),
            Comparison::Greater => Some(Ordering::Greater),
        }
    }
}

/// Elementwise equality through `a_contract.equals`, stopping at the first mismatch.
///
/// Fails with `TypeMismatch` before looking at any element if the contracts differ.
pub fn equals<A, B>(a_contract: &A, a: &[A::Item], b_contract: &B, b: &[A::Item]) -> Result<bool>
where
    A: ElementContract + ?Sized,
    B: ElementContract<Item = A::Item> + ?Sized,
{
    ensure_same_type(a_contract, b_contract)?;
    if a.len() != b.len() {
        return Ok(false);
    }
    Ok(a.iter().zip(b).all(|(x, y)| a_contract.equals(x, y)))
}

/// Lexicographic three-way comparison; a proper prefix orders first.
pub fn compare<A, B, F>(
    a_contract: &A,
    a: &[A::Item],
    b_contract: &B,
    b: &[A::Item],
    mut cmp: F,
) -> Comparison
where
    A: ElementContract + ?Sized,
    B: ElementContract<Item = A::Item> + ?Sized,
    F: FnMut(&A::Item, &A::Item) -> Ordering,
{
    if !same_type(a_contract, b_contract) {
        return Comparison::Undefined;
    }
    for (x, y) in a.iter().zip(b) {
        match cmp(x, y) {
            Ordering::Equal => continue,
            o => return o.into(),
        }
    }
    a.len().cmp(&b.len()).into()
}

/// Index of the first smallest element.
pub fn min_position<T, F>(items: &[T], mut cmp: F) -> Option<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut best = 0;
    for i in 1..items.len() {
        if cmp(&items[i], &items[best]) == Ordering::Less {
            best = i;
        }
    }
    (!items.is_empty()).then_some(best)
}

/// Index of the first largest element.
pub fn max_position<T, F>(items: &[T], mut cmp: F) -> Option<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut best = 0;
    for i in 1..items.len() {
        if cmp(&items[i], &items[best]) == Ordering::Greater {
            best = i;
        }
    }
    (!items.is_empty()).then_some(best)
}

#[inline]
pub fn minimum<T, F>(items: &[T], cmp: F) -> Option<&T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    min_position(items, cmp).map(|i| &items[i])
}

#[inline]
pub fn maximum<T, F>(items: &[T], cmp: F) -> Option<&T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    max_position(items, cmp).map(|i| &items[i])
}
