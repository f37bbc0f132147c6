//! Introsort, mergesort and the sortedness check.

use super::mutate::swap;
use crate::buffer::Scratch;
use crate::contract::ElementContract;
use crate::error::Result;
use core::cmp::Ordering;

/// Ranges this short are finished with insertion sort.
const SMALL_SORT: usize = 16;

/// Sorts in place. Not stable.
///
/// Quicksort with a median-of-three pivot, recursing into the smaller side only.
/// Once the depth budget (`2 * floor(log2 n) + 2`) runs out the remaining range is
/// heapsorted, so the worst case stays `O(n log n)`.
pub fn sort<C, F>(contract: &C, items: &mut [C::Item], mut cmp: F)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    let limit = 2 * (usize::BITS - items.len().leading_zeros());
    introsort(contract, items, &mut cmp, limit);
}

fn introsort<C, F>(contract: &C, mut v: &mut [C::Item], cmp: &mut F, mut limit: u32)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    loop {
        let len = v.len();
        if len <= SMALL_SORT {
            insertion_sort(contract, v, cmp);
            return;
        }
        if limit == 0 {
            tracing::debug!(len, "quicksort depth exhausted, switching to heapsort");
            heapsort(contract, v, cmp);
            return;
        }
        limit -= 1;

        let p = partition_at_pivot(contract, v, cmp);
        let (left, right) = core::mem::take(&mut v).split_at_mut(p);
        let right = &mut right[1..];
        if left.len() < right.len() {
            introsort(contract, left, cmp, limit);
            v = right;
        } else {
            introsort(contract, right, cmp, limit);
            v = left;
        }
    }
}

/// Orders first/middle/last and swaps the median into the first slot.
fn median_of_three<C, F>(contract: &C, v: &mut [C::Item], cmp: &mut F)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    let (a, b, c) = (0, v.len() / 2, v.len() - 1);
    if cmp(&v[b], &v[a]) == Ordering::Less {
        swap(contract, v, a, b);
    }
    if cmp(&v[c], &v[b]) == Ordering::Less {
        swap(contract, v, b, c);
        if cmp(&v[b], &v[a]) == Ordering::Less {
            swap(contract, v, a, b);
        }
    }
    swap(contract, v, a, b);
}

/// Partitions around the median-of-three pivot and returns its final index.
///
/// Both scans stop on elements equal to the pivot, so runs of duplicates are split
/// evenly instead of degrading to one-sided partitions.
fn partition_at_pivot<C, F>(contract: &C, v: &mut [C::Item], cmp: &mut F) -> usize
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    median_of_three(contract, v, cmp);

    let (head, rest) = v.split_at_mut(1);
    let pivot = &head[0];
    let (mut i, mut j) = (0, rest.len());
    loop {
        while i < j && cmp(&rest[i], pivot) == Ordering::Less {
            i += 1;
        }
        while i < j && cmp(&rest[j - 1], pivot) == Ordering::Greater {
            j -= 1;
        }
        if i >= j {
            break;
        }
        // rest[i] >= pivot >= rest[j - 1]
        j -= 1;
        swap(contract, rest, i, j);
        i += 1;
    }

    // rest[..i] <= pivot <= rest[i..]
    swap(contract, v, 0, i);
    i
}

fn insertion_sort<C, F>(contract: &C, v: &mut [C::Item], cmp: &mut F)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && cmp(&v[j], &v[j - 1]) == Ordering::Less {
            swap(contract, v, j, j - 1);
            j -= 1;
        }
    }
}

fn heapsort<C, F>(contract: &C, v: &mut [C::Item], cmp: &mut F)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    let len = v.len();
    for node in (0..len / 2).rev() {
        sift_down(contract, v, node, len, cmp);
    }
    for end in (1..len).rev() {
        swap(contract, v, 0, end);
        sift_down(contract, v, 0, end, cmp);
    }
}

fn sift_down<C, F>(contract: &C, v: &mut [C::Item], mut node: usize, end: usize, cmp: &mut F)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    loop {
        let mut child = 2 * node + 1;
        if child >= end {
            return;
        }
        if child + 1 < end && cmp(&v[child], &v[child + 1]) == Ordering::Less {
            child += 1;
        }
        if cmp(&v[node], &v[child]) != Ordering::Less {
            return;
        }
        swap(contract, v, node, child);
        node = child;
    }
}

/*──────────────────── stable ───────────────────────*/

/// Stable top-down mergesort; equal elements keep their relative order.
///
/// One scratch region of `items.len()` slots is taken from the contract up front and
/// reused by every merge. Fails only if that allocation does.
pub fn stable_sort<C, F>(contract: &C, items: &mut [C::Item], mut cmp: F) -> Result<()>
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    if items.len() < 2 {
        return Ok(());
    }
    let scratch = Scratch::new(contract, items.len())?;
    merge_sort(contract, items, &scratch, &mut cmp);
    Ok(())
}

fn merge_sort<C, F>(contract: &C, v: &mut [C::Item], scratch: &Scratch<'_, C>, cmp: &mut F)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    let len = v.len();
    if len < 2 {
        return;
    }
    let mid = len / 2;
    {
        let (left, right) = v.split_at_mut(mid);
        merge_sort(contract, left, scratch, cmp);
        merge_sort(contract, right, scratch, cmp);
    }
    merge(contract, v, mid, scratch, cmp);
}

/// Merges the sorted runs `v[..mid]` and `v[mid..]`.
///
/// Both runs are moved into scratch and interleaved back, left first on ties.
fn merge<C, F>(contract: &C, v: &mut [C::Item], mid: usize, scratch: &Scratch<'_, C>, cmp: &mut F)
where
    C: ElementContract + ?Sized,
    F: FnMut(&C::Item, &C::Item) -> Ordering,
{
    let len = v.len();
    let dst = v.as_mut_ptr();
    unsafe {
        for k in 0..len {
            contract.move_to(scratch.slot(k), dst.add(k));
        }
    }

    let mut hole = MergeHole {
        contract,
        src: scratch.slot(0),
        dst,
        left: 0,
        mid,
        right: mid,
        end: len,
        out: 0,
    };
    while hole.left < hole.mid && hole.right < hole.end {
        let take_right = unsafe {
            cmp(&*hole.src.add(hole.right), &*hole.src.add(hole.left)) == Ordering::Less
        };
        let from = if take_right { &mut hole.right } else { &mut hole.left };
        unsafe { contract.move_to(hole.dst.add(hole.out), hole.src.add(*from)) };
        *from += 1;
        hole.out += 1;
    }
    // dropping the hole moves whatever is left over
}

/// Tracks a merge in flight. On drop (normal or unwinding) the unconsumed scratch
/// elements are moved back, so `v` always ends up holding every element once.
struct MergeHole<'a, C: ElementContract + ?Sized> {
    contract: &'a C,
    src: *mut C::Item,
    dst: *mut C::Item,
    left: usize,
    mid: usize,
    right: usize,
    end: usize,
    out: usize,
}

impl<C: ElementContract + ?Sized> Drop for MergeHole<'_, C> {
    fn drop(&mut self) {
        unsafe {
            for k in (self.left..self.mid).chain(self.right..self.end) {
                self.contract.move_to(self.dst.add(self.out), self.src.add(k));
                self.out += 1;
            }
        }
    }
}

/// `true` if no adjacent pair is out of order.
pub fn sorted<T, F>(items: &[T], mut cmp: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    items.windows(2).all(|w| cmp(&w[0], &w[1]) != Ordering::Greater)
}
