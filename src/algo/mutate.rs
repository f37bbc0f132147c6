//! In-place rearrangement and overwriting.

use crate::buffer::Scratch;
use crate::contract::ElementContract;
use crate::error::Result;
use core::mem::MaybeUninit;
use rand::Rng;

/// Exchanges `items[a]` and `items[b]` with three contract moves through a stack
/// temporary.
///
/// # Panics
/// If either index is out of bounds.
#[inline]
pub fn swap<C>(contract: &C, items: &mut [C::Item], a: usize, b: usize)
where
    C: ElementContract + ?Sized,
{
    assert!(
        a < items.len() && b < items.len(),
        "swap ({a}, {b}) out of bounds for length {}",
        items.len()
    );
    if a == b {
        return;
    }
    let base = items.as_mut_ptr();
    let mut tmp = MaybeUninit::<C::Item>::uninit();
    unsafe {
        contract.move_to(tmp.as_mut_ptr(), base.add(a));
        contract.move_to(base.add(a), base.add(b));
        contract.move_to(base.add(b), tmp.as_mut_ptr());
    }
}

/// Two pointers walking inwards.
pub fn reverse<C>(contract: &C, items: &mut [C::Item])
where
    C: ElementContract + ?Sized,
{
    let (mut lo, mut hi) = (0, items.len());
    while lo + 1 < hi {
        hi -= 1;
        swap(contract, items, lo, hi);
        lo += 1;
    }
}

/// Fisher–Yates: every index from 1 up swaps with a uniform pick from `[0, i]`.
pub fn shuffle<C, R>(contract: &C, items: &mut [C::Item], rng: &mut R)
where
    C: ElementContract + ?Sized,
    R: Rng + ?Sized,
{
    for i in 1..items.len() {
        let j = rng.gen_range(0..=i);
        swap(contract, items, i, j);
    }
}

/// A uniformly chosen element, `None` when empty.
pub fn choose<'a, T, R>(items: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }
    items.get(rng.gen_range(0..items.len()))
}

/// Copy-assigns `value` into every slot.
pub fn fill<C>(contract: &C, items: &mut [C::Item], value: &C::Item)
where
    C: ElementContract + ?Sized,
{
    for slot in items {
        contract.copy_assign(slot, value);
    }
}

/// Copy-assigns `new` over every element equal to `old`.
pub fn replace<C>(contract: &C, items: &mut [C::Item], old: &C::Item, new: &C::Item)
where
    C: ElementContract + ?Sized,
{
    replace_if(contract, items, new, |x| contract.equals(old, x));
}

/// Copy-assigns `new` over every element matching `pred`.
pub fn replace_if<C, P>(contract: &C, items: &mut [C::Item], new: &C::Item, mut pred: P)
where
    C: ElementContract + ?Sized,
    P: FnMut(&C::Item) -> bool,
{
    for slot in items {
        if pred(&*slot) {
            contract.copy_assign(slot, new);
        }
    }
}

pub fn for_each<T, A: FnMut(&mut T)>(items: &mut [T], act: A) {
    items.iter_mut().for_each(act);
}

/// Stable partition: elements satisfying `pred` move to the front, keeping their
/// order, and the rest follow in their original order.
///
/// Returns the split index, i.e. how many elements satisfied `pred` (`0` and
/// `items.len()` included). `pred` runs exactly once per element. The rejected
/// elements are parked in scratch taken from the contract, which is the only way
/// this can fail.
pub fn partition<C, P>(contract: &C, items: &mut [C::Item], mut pred: P) -> Result<usize>
where
    C: ElementContract + ?Sized,
    P: FnMut(&C::Item) -> bool,
{
    let len = items.len();
    // the accepted prefix is already in place
    let Some(first_out) = items.iter().position(|x| !pred(x)) else {
        return Ok(len);
    };

    let scratch = Scratch::new(contract, len - first_out)?;
    let base = items.as_mut_ptr();
    let mut gap = PartitionGap {
        contract,
        base,
        parked_at: scratch.slot(0),
        write: first_out,
        read: first_out + 1,
        parked: 1,
    };
    unsafe {
        contract.move_to(gap.parked_at, base.add(first_out));
        while gap.read < len {
            let cur = base.add(gap.read);
            if pred(&*cur) {
                contract.move_to(base.add(gap.write), cur);
                gap.write += 1;
            } else {
                contract.move_to(gap.parked_at.add(gap.parked), cur);
                gap.parked += 1;
            }
            gap.read += 1;
        }
    }
    Ok(gap.write)
}

/// `[write, read)` is a hole exactly `parked` long. Dropping the gap moves the
/// parked elements into it, after the last element or during unwinding alike.
struct PartitionGap<'a, C: ElementContract + ?Sized> {
    contract: &'a C,
    base: *mut C::Item,
    parked_at: *mut C::Item,
    write: usize,
    read: usize,
    parked: usize,
}

impl<C: ElementContract + ?Sized> Drop for PartitionGap<'_, C> {
    fn drop(&mut self) {
        debug_assert_eq!(self.write + self.parked, self.read);
        for k in 0..self.parked {
            unsafe {
                self.contract
                    .move_to(self.base.add(self.write + k), self.parked_at.add(k))
            }
        }
    }
}
