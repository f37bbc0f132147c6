//! The growable, contract-driven vector.

use crate::algo::{self, Comparison};
use crate::buffer::RawBuffer;
use crate::config::VecConfig;
use crate::contract::{ElementContract, ensure_same_type};
use crate::error::{ContainerError, Result};
use core::cmp::Ordering;
use core::fmt;
use core::mem::MaybeUninit;
use core::ops::{Index, IndexMut, Range};
use rand::Rng;

/// Destroys an element that was already moved out of its slot.
#[inline]
fn dispose<C: ElementContract + ?Sized>(contract: &C, item: C::Item) {
    let mut item = MaybeUninit::new(item);
    if !contract.is_trivial() {
        unsafe { contract.destroy(item.as_mut_ptr()) }
    }
}

/*──────────────────── vector type ───────────────────────*/
/// A contiguous, growable sequence whose every element operation goes through a
/// contract `C`.
///
/// The contract decides how elements are copied, relocated, compared, destroyed and
/// where the storage comes from. Growth and removal only ever *move* elements, so a
/// type with an expensive copy is never copied behind the caller's back.
///
/// A vector is either valid or invalidated. [`take`](Vector::take) and
/// [`destroy`](Vector::destroy) invalidate it. From then on every operation except
/// [`reinit`](Vector::reinit) fails with [`ContainerError::UseAfterInvalidate`], while
/// `len` and `capacity` report `0`.
///
/// # Layout:
///
/// ```text
///   [ live live live ...spare... ]
///     ▲              ▲          ▲
///     │              │          └─ capacity
///     │              └─ len
///     └─ slot 0
/// ```
///
/// # Example
///
/// ```rust
/// use contract_vec::{Natural, Vector};
///
/// let mut v = Vector::with_capacity(Natural::<i32>::new(), 2).unwrap();
/// v.push_back_move(5).unwrap();
/// v.push_back_move(3).unwrap();
/// v.push_back_move(8).unwrap();
/// assert_eq!(v.capacity(), 3);
///
/// v.sort(i32::cmp).unwrap();
/// assert_eq!(v.as_slice().unwrap(), [3, 5, 8]);
/// assert_eq!(v.lower_bound(&4, i32::cmp), Ok(1));
/// assert_eq!(v.pop(), Ok(8));
/// ```
pub struct Vector<C: ElementContract> {
    buf: Option<RawBuffer<C::Item>>, // None once invalidated
    len: usize,
    contract: C,
    config: VecConfig,
}

impl<C: ElementContract> Drop for Vector<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/*──────────────────── construction ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    fn build(contract: C, cap: usize, config: VecConfig) -> Result<Self> {
        let buf = RawBuffer::allocate(&contract, cap)?;
        Ok(Self {
            buf: Some(buf),
            len: 0,
            contract,
            config,
        })
    }

    /// An empty vector with the default capacity (16).
    #[inline]
    pub fn new(contract: C) -> Result<Self> {
        Self::with_config(contract, VecConfig::default())
    }

    /// An empty vector with room for exactly `cap` elements.
    #[inline]
    pub fn with_capacity(contract: C, cap: usize) -> Result<Self> {
        Self::build(contract, cap, VecConfig::default())
    }

    /// An empty vector sized and grown according to `config`.
    #[inline]
    pub fn with_config(contract: C, config: VecConfig) -> Result<Self> {
        Self::build(contract, config.default_capacity, config)
    }

    /// A vector holding contract copies of `items`, with no spare capacity.
    pub fn from_slice(contract: C, items: &[C::Item]) -> Result<Self> {
        let mut v = Self::with_capacity(contract, items.len())?;
        v.extend_copied(items)?;
        Ok(v)
    }

    /// Rebinds the vector to `contract` with an empty buffer of `cap` slots.
    ///
    /// Works on valid and invalidated vectors alike. Any live contents are destroyed
    /// with the old contract first. The [`VecConfig`] is kept. If the allocation
    /// fails the vector stays invalidated.
    pub fn reinit(&mut self, contract: C, cap: usize) -> Result<()> {
        self.teardown();
        self.contract = contract;
        self.buf = Some(RawBuffer::allocate(&self.contract, cap)?);
        Ok(())
    }

    /// Moves storage and elements into a new vector and invalidates `self`.
    pub fn take(&mut self) -> Result<Self>
    where
        C: Clone,
    {
        let buf = self.buf.take().ok_or(ContainerError::UseAfterInvalidate)?;
        Ok(Self {
            buf: Some(buf),
            len: core::mem::take(&mut self.len),
            contract: self.contract.clone(),
            config: self.config,
        })
    }

    /// Destroys every element, releases the storage and invalidates `self`.
    pub fn destroy(&mut self) -> Result<()> {
        let len = self.len;
        if !self.teardown() {
            return Err(ContainerError::UseAfterInvalidate);
        }
        tracing::debug!(len, "vector destroyed");
        Ok(())
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.buf.is_some()
    }

    /// Returns `false` if there was nothing to tear down.
    fn teardown(&mut self) -> bool {
        let Some(mut buf) = self.buf.take() else {
            return false;
        };
        let len = core::mem::take(&mut self.len);
        unsafe { buf.destroy_range(&self.contract, 0..len) };
        buf.release(&self.contract);
        true
    }
}

/*──────────────────── internals ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    #[inline]
    fn checked_len(&self) -> Result<usize> {
        match self.buf {
            Some(_) => Ok(self.len),
            None => Err(ContainerError::UseAfterInvalidate),
        }
    }

    #[inline]
    fn parts_mut(&mut self) -> Result<(&mut RawBuffer<C::Item>, &C, &mut usize)> {
        let buf = self.buf.as_mut().ok_or(ContainerError::UseAfterInvalidate)?;
        Ok((buf, &self.contract, &mut self.len))
    }

    #[inline]
    fn split_mut(&mut self) -> Result<(&mut [C::Item], &C)> {
        let buf = self.buf.as_mut().ok_or(ContainerError::UseAfterInvalidate)?;
        Ok((unsafe { buf.as_mut_slice(self.len) }, &self.contract))
    }

    /// Makes room for one more element, growing by the configured factor.
    fn grow_if_full(&mut self) -> Result<()> {
        let cap = self.capacity();
        if self.checked_len()? < cap {
            return Ok(());
        }
        let new_cap = self
            .config
            .next_capacity(cap)
            .ok_or(ContainerError::OutOfMemory { bytes: usize::MAX })?;
        self.reallocate(new_cap)
    }

    /// Moves the live elements into a fresh buffer of `new_cap` slots.
    fn reallocate(&mut self, new_cap: usize) -> Result<()> {
        let contract = &self.contract;
        let old = self.buf.as_mut().ok_or(ContainerError::UseAfterInvalidate)?;
        debug_assert!(new_cap >= self.len);

        let mut fresh = RawBuffer::allocate(contract, new_cap)?;
        unsafe { old.relocate_into(contract, &mut fresh, self.len) };
        let old_cap = old.capacity();
        core::mem::replace(old, fresh).release(contract);
        tracing::trace!(old_cap, new_cap, len = self.len, "vector storage moved");
        Ok(())
    }

    /// Appends copies of `items`, reserving once up front.
    fn extend_copied(&mut self, items: &[C::Item]) -> Result<()> {
        let need = self
            .checked_len()?
            .checked_add(items.len())
            .ok_or(ContainerError::OutOfMemory { bytes: usize::MAX })?;
        self.reserve(need)?;
        for item in items {
            let fresh = self.contract.copy(item);
            self.push_back_move(fresh)?;
        }
        Ok(())
    }

    /// Removes up to `limit` elements matching `pred` in one left-to-right pass and
    /// returns how many went.
    fn erase_where<P>(&mut self, limit: usize, mut pred: P) -> Result<usize>
    where
        P: FnMut(&C, &C::Item) -> bool,
    {
        let (buf, contract, len) = self.parts_mut()?;
        let original = *len;
        let base = buf.slot(0);
        *len = 0;
        let mut gap = EraseGap {
            contract,
            base,
            read: 0,
            write: 0,
            original,
            len,
        };
        while gap.read < original && gap.read - gap.write < limit {
            unsafe {
                let cur = base.add(gap.read);
                if pred(contract, &*cur) {
                    gap.read += 1;
                    if !contract.is_trivial() {
                        contract.destroy(cur);
                    }
                } else {
                    if gap.read != gap.write {
                        contract.move_to(base.add(gap.write), cur);
                    }
                    gap.read += 1;
                    gap.write += 1;
                }
            }
        }
        Ok(gap.read - gap.write)
    }
}

/// `[write, read)` is dead while an erase pass runs. Dropping the gap shifts the
/// unvisited tail down over it and publishes the final length, so a panicking
/// predicate leaves a shorter but valid vector.
struct EraseGap<'a, C: ElementContract> {
    contract: &'a C,
    base: *mut C::Item,
    read: usize,
    write: usize,
    original: usize,
    len: &'a mut usize,
}

impl<C: ElementContract> Drop for EraseGap<'_, C> {
    fn drop(&mut self) {
        let tail = self.original - self.read;
        if self.read != self.write {
            for k in 0..tail {
                unsafe {
                    self.contract
                        .move_to(self.base.add(self.write + k), self.base.add(self.read + k))
                }
            }
        }
        *self.len = self.write + tail;
    }
}

/*──────────────────── views ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    /// Live element count, `0` once invalidated.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slots, `0` once invalidated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.as_ref().map_or(0, RawBuffer::capacity)
    }

    #[inline]
    pub fn contract(&self) -> &C {
        &self.contract
    }

    #[inline]
    pub fn config(&self) -> &VecConfig {
        &self.config
    }

    #[inline]
    pub fn as_slice(&self) -> Result<&[C::Item]> {
        let buf = self.buf.as_ref().ok_or(ContainerError::UseAfterInvalidate)?;
        Ok(unsafe { buf.as_slice(self.len) })
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> Result<&mut [C::Item]> {
        self.split_mut().map(|(items, _)| items)
    }

    #[inline]
    pub fn iter(&self) -> Result<core::slice::Iter<'_, C::Item>> {
        self.as_slice().map(|s| s.iter())
    }

    pub fn for_each<A: FnMut(&mut C::Item)>(&mut self, act: A) -> Result<()> {
        algo::for_each(self.as_mut_slice()?, act);
        Ok(())
    }
}

/*──────────────────── element access ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    #[inline]
    fn out_of_range(&self, index: usize) -> ContainerError {
        ContainerError::IndexOutOfRange {
            index,
            len: self.len,
        }
    }

    #[inline]
    fn last_index(&self) -> Result<usize> {
        self.checked_len()?
            .checked_sub(1)
            .ok_or(self.out_of_range(0))
    }

    pub fn get(&self, index: usize) -> Result<&C::Item> {
        let items = self.as_slice()?;
        items.get(index).ok_or(self.out_of_range(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut C::Item> {
        let err = self.out_of_range(index);
        self.as_mut_slice()?.get_mut(index).ok_or(err)
    }

    /// Copy-assigns `item` over the element at `index`.
    pub fn set_copy(&mut self, index: usize, item: &C::Item) -> Result<()> {
        let err = self.out_of_range(index);
        let (items, contract) = self.split_mut()?;
        let slot = items.get_mut(index).ok_or(err)?;
        contract.copy_assign(slot, item);
        Ok(())
    }

    /// Moves `item` into `index`, destroying the element it replaces.
    pub fn set_move(&mut self, index: usize, item: C::Item) -> Result<()> {
        let err = self.out_of_range(index);
        let (buf, contract, len) = self.parts_mut()?;
        if index >= *len {
            return Err(err);
        }
        let old = unsafe {
            let old = buf.take(contract, index);
            buf.emplace(contract, index, item);
            old
        };
        dispose(contract, old);
        Ok(())
    }

    #[inline]
    pub fn front(&self) -> Result<&C::Item> {
        self.get(0)
    }

    #[inline]
    pub fn back(&self) -> Result<&C::Item> {
        self.get(self.last_index()?)
    }

    #[inline]
    pub fn set_first_copy(&mut self, item: &C::Item) -> Result<()> {
        self.set_copy(0, item)
    }

    #[inline]
    pub fn set_first_move(&mut self, item: C::Item) -> Result<()> {
        self.set_move(0, item)
    }

    #[inline]
    pub fn set_last_copy(&mut self, item: &C::Item) -> Result<()> {
        self.set_copy(self.last_index()?, item)
    }

    #[inline]
    pub fn set_last_move(&mut self, item: C::Item) -> Result<()> {
        self.set_move(self.last_index()?, item)
    }
}

impl<C: ElementContract> Index<usize> for Vector<C> {
    type Output = C::Item;

    fn index(&self, index: usize) -> &C::Item {
        match self.get(index) {
            Ok(item) => item,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<C: ElementContract> IndexMut<usize> for Vector<C> {
    fn index_mut(&mut self, index: usize) -> &mut C::Item {
        match self.get_mut(index) {
            Ok(item) => item,
            Err(e) => panic!("{e}"),
        }
    }
}

/*──────────────────── insert / push ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    /// Moves `item` into position `index`, shifting `[index, len)` one slot up.
    ///
    /// `index == len` appends. Grows first if the vector is full.
    pub fn insert_move(&mut self, index: usize, item: C::Item) -> Result<()> {
        if index > self.checked_len()? {
            return Err(self.out_of_range(index));
        }
        self.grow_if_full()?;
        let (buf, contract, len) = self.parts_mut()?;
        unsafe {
            buf.shift(contract, index, index + 1, *len - index);
            buf.emplace(contract, index, item);
        }
        *len += 1;
        Ok(())
    }

    /// [`insert_move`](Self::insert_move) of a contract copy of `item`.
    pub fn insert_copy(&mut self, index: usize, item: &C::Item) -> Result<()> {
        if index > self.checked_len()? {
            return Err(self.out_of_range(index));
        }
        let fresh = self.contract.copy(item);
        self.insert_move(index, fresh)
    }

    #[inline]
    pub fn push_back_move(&mut self, item: C::Item) -> Result<()> {
        let len = self.checked_len()?;
        self.insert_move(len, item)
    }

    #[inline]
    pub fn push_back_copy(&mut self, item: &C::Item) -> Result<()> {
        let len = self.checked_len()?;
        self.insert_copy(len, item)
    }
}

/*──────────────────── pop / erase ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    /// Moves the last element out.
    pub fn pop(&mut self) -> Result<C::Item> {
        let last = self.last_index()?;
        let (buf, contract, len) = self.parts_mut()?;
        *len = last;
        Ok(unsafe { buf.take(contract, last) })
    }

    /// Destroys the last element.
    pub fn pop_back(&mut self) -> Result<()> {
        let item = self.pop()?;
        dispose(&self.contract, item);
        Ok(())
    }

    /// Destroys the element at `index` and closes the gap.
    pub fn erase(&mut self, index: usize) -> Result<()> {
        let err = self.out_of_range(index);
        let (buf, contract, len) = self.parts_mut()?;
        if index >= *len {
            return Err(err);
        }
        let gone = unsafe {
            let gone = buf.take(contract, index);
            buf.shift(contract, index + 1, index, *len - index - 1);
            gone
        };
        *len -= 1;
        dispose(contract, gone);
        Ok(())
    }

    /// Destroys every element in `range` and closes the gap.
    pub fn erase_range(&mut self, range: Range<usize>) -> Result<()> {
        let Range { start, end } = range;
        let total = self.checked_len()?;
        if end > total {
            return Err(self.out_of_range(end));
        }
        if start > end {
            return Err(self.out_of_range(start));
        }
        let (buf, contract, len) = self.parts_mut()?;
        // the tail leaks rather than double drops if a destroy panics
        *len = start;
        unsafe {
            buf.destroy_range(contract, start..end);
            buf.shift(contract, end, start, total - end);
        }
        *len = total - (end - start);
        Ok(())
    }

    /// Removes every element matching `pred`, keeping the order of the rest.
    ///
    /// `pred` sees each element once. Returns how many were removed.
    pub fn erase_if<P>(&mut self, mut pred: P) -> Result<usize>
    where
        P: FnMut(&C::Item) -> bool,
    {
        self.erase_where(usize::MAX, |_, x| pred(x))
    }

    /// Removes every element equal to `value`.
    pub fn erase_all_of(&mut self, value: &C::Item) -> Result<usize> {
        self.erase_where(usize::MAX, |c, x| c.equals(x, value))
    }

    /// Removes the first element equal to `value`, if any.
    pub fn erase_first_of(&mut self, value: &C::Item) -> Result<bool> {
        Ok(self.erase_where(1, |c, x| c.equals(x, value))? == 1)
    }

    /// Removes the first `amount` elements equal to `value`.
    pub fn erase_amount_of(&mut self, value: &C::Item, amount: usize) -> Result<usize> {
        self.erase_where(amount, |c, x| c.equals(x, value))
    }
}

/*──────────────────── storage ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    /// Destroys every element and starts over with the configured default capacity.
    ///
    /// If that allocation fails the error is returned, but the vector is already
    /// empty and stays valid with no capacity.
    pub fn clear(&mut self) -> Result<()> {
        let len = self.len;
        if !self.teardown() {
            return Err(ContainerError::UseAfterInvalidate);
        }
        let cap = self.config.default_capacity;
        match RawBuffer::allocate(&self.contract, cap) {
            Ok(buf) => {
                self.buf = Some(buf);
                tracing::debug!(len, cap, "vector cleared");
                Ok(())
            }
            Err(e) => {
                self.buf = Some(RawBuffer::empty());
                Err(e)
            }
        }
    }

    /// Makes sure the capacity is at least `cap`.
    pub fn reserve(&mut self, cap: usize) -> Result<()> {
        self.checked_len()?;
        if cap <= self.capacity() {
            return Ok(());
        }
        self.reallocate(cap)
    }

    /// Drops the spare capacity.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        let len = self.checked_len()?;
        let cap = self.capacity();
        if cap == len {
            return Ok(());
        }
        tracing::debug!(len, cap, "shrinking vector");
        self.reallocate(len)
    }
}

/*──────────────────── whole vectors ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    /// Elementwise equality. Fails if the two contracts describe different types.
    pub fn equals<D>(&self, other: &Vector<D>) -> Result<bool>
    where
        D: ElementContract<Item = C::Item>,
    {
        algo::equals(
            &self.contract,
            self.as_slice()?,
            &other.contract,
            other.as_slice()?,
        )
    }

    /// Exchanges the contents of two vectors without touching any element.
    pub fn swap(&mut self, other: &mut Self) -> Result<()> {
        self.checked_len()?;
        other.checked_len()?;
        ensure_same_type(&self.contract, &other.contract)?;
        core::mem::swap(self, other);
        Ok(())
    }

    /// An independent deep copy with the same contract, config and capacity.
    pub fn try_clone(&self) -> Result<Self>
    where
        C: Clone,
    {
        let items = self.as_slice()?;
        let mut v = Self::build(self.contract.clone(), self.capacity(), self.config)?;
        v.extend_copied(items)?;
        Ok(v)
    }

    /// Replaces the contents with contract copies of `other`'s elements.
    pub fn copy_from<D>(&mut self, other: &Vector<D>) -> Result<()>
    where
        D: ElementContract<Item = C::Item>,
    {
        self.checked_len()?;
        let items = other.as_slice()?;
        ensure_same_type(&self.contract, &other.contract)?;

        let (buf, contract, len) = self.parts_mut()?;
        let n = core::mem::take(len);
        unsafe { buf.destroy_range(contract, 0..n) };
        self.extend_copied(items)
    }
}

/*──────────────────── algorithms ───────────────────────*/
impl<C: ElementContract> Vector<C> {
    pub fn find(&self, from: usize, value: &C::Item) -> Result<Option<usize>> {
        Ok(algo::find(&self.contract, self.as_slice()?, from, value))
    }

    pub fn find_if<P>(&self, from: usize, pred: P) -> Result<Option<usize>>
    where
        P: FnMut(&C::Item) -> bool,
    {
        Ok(algo::find_if(self.as_slice()?, from, pred))
    }

    /// Scans backwards from `from`, clamped to the last element.
    pub fn find_last(&self, from: usize, value: &C::Item) -> Result<Option<usize>> {
        Ok(algo::find_last(&self.contract, self.as_slice()?, from, value))
    }

    pub fn find_last_if<P>(&self, from: usize, pred: P) -> Result<Option<usize>>
    where
        P: FnMut(&C::Item) -> bool,
    {
        Ok(algo::find_last_if(self.as_slice()?, from, pred))
    }

    pub fn look<K, P>(&self, from: usize, key: &K, pred: P) -> Result<Option<usize>>
    where
        K: ?Sized,
        P: FnMut(&C::Item, &K) -> bool,
    {
        Ok(algo::look(self.as_slice()?, from, key, pred))
    }

    pub fn contains(&self, value: &C::Item) -> Result<bool> {
        Ok(algo::contains(&self.contract, self.as_slice()?, value))
    }

    pub fn count(&self, value: &C::Item) -> Result<usize> {
        Ok(algo::count(&self.contract, self.as_slice()?, value))
    }

    pub fn count_if<P: FnMut(&C::Item) -> bool>(&self, pred: P) -> Result<usize> {
        Ok(algo::count_if(self.as_slice()?, pred))
    }

    pub fn all<P: FnMut(&C::Item) -> bool>(&self, pred: P) -> Result<bool> {
        Ok(algo::all(self.as_slice()?, pred))
    }

    pub fn any<P: FnMut(&C::Item) -> bool>(&self, pred: P) -> Result<bool> {
        Ok(algo::any(self.as_slice()?, pred))
    }

    pub fn none<P: FnMut(&C::Item) -> bool>(&self, pred: P) -> Result<bool> {
        Ok(algo::none(self.as_slice()?, pred))
    }

    pub fn lower_bound<F>(&self, key: &C::Item, cmp: F) -> Result<usize>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        Ok(algo::lower_bound(self.as_slice()?, key, cmp))
    }

    pub fn upper_bound<F>(&self, key: &C::Item, cmp: F) -> Result<usize>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        Ok(algo::upper_bound(self.as_slice()?, key, cmp))
    }

    pub fn binary_search<F>(&self, key: &C::Item, cmp: F) -> Result<Option<usize>>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        Ok(algo::binary_search(self.as_slice()?, key, cmp))
    }

    /// Unstable in-place sort, see [`algo::sort`].
    pub fn sort<F>(&mut self, cmp: F) -> Result<()>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        let (items, contract) = self.split_mut()?;
        algo::sort(contract, items, cmp);
        Ok(())
    }

    /// Stable sort, see [`algo::stable_sort`].
    pub fn stable_sort<F>(&mut self, cmp: F) -> Result<()>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        let (items, contract) = self.split_mut()?;
        algo::stable_sort(contract, items, cmp)
    }

    pub fn sorted<F>(&self, cmp: F) -> Result<bool>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        Ok(algo::sorted(self.as_slice()?, cmp))
    }

    pub fn minimum<F>(&self, cmp: F) -> Result<Option<&C::Item>>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        Ok(algo::minimum(self.as_slice()?, cmp))
    }

    pub fn maximum<F>(&self, cmp: F) -> Result<Option<&C::Item>>
    where
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        Ok(algo::maximum(self.as_slice()?, cmp))
    }

    /// Stable partition, returns the split index.
    pub fn partition<P: FnMut(&C::Item) -> bool>(&mut self, pred: P) -> Result<usize> {
        let (items, contract) = self.split_mut()?;
        algo::partition(contract, items, pred)
    }

    pub fn reverse(&mut self) -> Result<()> {
        let (items, contract) = self.split_mut()?;
        algo::reverse(contract, items);
        Ok(())
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let (items, contract) = self.split_mut()?;
        algo::shuffle(contract, items, rng);
        Ok(())
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<&C::Item>> {
        Ok(algo::choose(self.as_slice()?, rng))
    }

    pub fn fill(&mut self, value: &C::Item) -> Result<()> {
        let (items, contract) = self.split_mut()?;
        algo::fill(contract, items, value);
        Ok(())
    }

    pub fn replace(&mut self, old: &C::Item, new: &C::Item) -> Result<()> {
        let (items, contract) = self.split_mut()?;
        algo::replace(contract, items, old, new);
        Ok(())
    }

    pub fn replace_if<P>(&mut self, new: &C::Item, pred: P) -> Result<()>
    where
        P: FnMut(&C::Item) -> bool,
    {
        let (items, contract) = self.split_mut()?;
        algo::replace_if(contract, items, new, pred);
        Ok(())
    }

    /// Lexicographic comparison, [`Comparison::Undefined`] across element types.
    pub fn compare<D, F>(&self, other: &Vector<D>, cmp: F) -> Result<Comparison>
    where
        D: ElementContract<Item = C::Item>,
        F: FnMut(&C::Item, &C::Item) -> Ordering,
    {
        Ok(algo::compare(
            &self.contract,
            self.as_slice()?,
            &other.contract,
            other.as_slice()?,
            cmp,
        ))
    }
}

impl<C> fmt::Debug for Vector<C>
where
    C: ElementContract,
    C::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_slice() {
            Ok(items) => f.debug_list().entries(items).finish(),
            Err(_) => f.write_str("<invalidated>"),
        }
    }
}

#[cfg(test)]
fn ints(xs: &[i32]) -> Vector<crate::contract::Natural<i32>> {
    Vector::from_slice(crate::contract::Natural::new(), xs).unwrap()
}

#[test]
fn push_pop_is_lifo() {
    let mut v = ints(&[]);
    for i in 0..40 {
        v.push_back_move(i).unwrap();
    }
    for i in (0..40).rev() {
        assert_eq!(v.pop(), Ok(i));
    }
    assert!(v.is_empty());
    assert_eq!(
        v.pop(),
        Err(ContainerError::IndexOutOfRange { index: 0, len: 0 })
    );
    assert_eq!(
        v.pop_back(),
        Err(ContainerError::IndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn insert_then_erase_restores() {
    let mut v = ints(&[1, 2, 3]);
    v.insert_copy(1, &9).unwrap();
    assert_eq!(v.as_slice().unwrap(), [1, 9, 2, 3]);
    v.erase(1).unwrap();
    assert_eq!(v.as_slice().unwrap(), [1, 2, 3]);

    v.insert_move(3, 4).unwrap();
    v.insert_move(0, 0).unwrap();
    assert_eq!(v.as_slice().unwrap(), [0, 1, 2, 3, 4]);

    assert_eq!(
        v.insert_move(6, 7),
        Err(ContainerError::IndexOutOfRange { index: 6, len: 5 })
    );
    assert_eq!(
        v.erase(5),
        Err(ContainerError::IndexOutOfRange { index: 5, len: 5 })
    );
}

#[test]
fn growth_rounds_up() {
    let mut v = Vector::with_capacity(crate::contract::Natural::<i32>::new(), 2).unwrap();
    let mut caps = alloc::vec::Vec::new();
    for i in 1..=4 {
        v.push_back_move(i).unwrap();
        caps.push(v.capacity());
    }
    assert_eq!(caps, [2, 2, 3, 5]);
    assert_eq!(v.as_slice().unwrap(), [1, 2, 3, 4]);

    let mut v = Vector::with_capacity(crate::contract::Natural::<i32>::new(), 0).unwrap();
    v.push_back_move(1).unwrap();
    assert_eq!(v.capacity(), 1);
}

#[test]
fn growth_follows_the_config() {
    let cfg = VecConfig::new(4).with_growth(2, 1);
    let mut v = Vector::with_config(crate::contract::Natural::<u8>::new(), cfg).unwrap();
    assert_eq!(v.capacity(), 4);
    for i in 0..5 {
        v.push_back_move(i).unwrap();
    }
    assert_eq!(v.capacity(), 8);

    v.clear().unwrap();
    assert_eq!(v.capacity(), 4);
    assert!(v.is_empty());
}

#[test]
fn sort_then_search() {
    let mut v = ints(&[]);
    v.push_back_move(5).unwrap();
    v.push_back_move(3).unwrap();
    v.push_back_move(8).unwrap();
    v.sort(i32::cmp).unwrap();
    assert_eq!(v.as_slice().unwrap(), [3, 5, 8]);
    assert_eq!(v.lower_bound(&4, i32::cmp), Ok(1));
    assert_eq!(v.upper_bound(&5, i32::cmp), Ok(2));
    assert_eq!(v.binary_search(&3, i32::cmp), Ok(Some(0)));
    assert_eq!(v.binary_search(&4, i32::cmp), Ok(None));
}

#[test]
fn erase_if_removes_evens() {
    let mut v = ints(&[1, 2, 3, 4, 5, 6]);
    assert_eq!(v.erase_if(|x| x % 2 == 0), Ok(3));
    assert_eq!(v.as_slice().unwrap(), [1, 3, 5]);
}

#[test]
fn erase_by_value() {
    let mut v = ints(&[7, 1, 7, 2, 7, 3, 7]);
    assert_eq!(v.erase_first_of(&7), Ok(true));
    assert_eq!(v.as_slice().unwrap(), [1, 7, 2, 7, 3, 7]);
    assert_eq!(v.erase_amount_of(&7, 2), Ok(2));
    assert_eq!(v.as_slice().unwrap(), [1, 2, 3, 7]);
    assert_eq!(v.erase_all_of(&7), Ok(1));
    assert_eq!(v.erase_first_of(&7), Ok(false));
    assert_eq!(v.erase_all_of(&7), Ok(0));
    assert_eq!(v.as_slice().unwrap(), [1, 2, 3]);
}

#[test]
fn erase_range_closes_the_gap() {
    let mut v = ints(&[0, 1, 2, 3, 4, 5]);
    v.erase_range(1..4).unwrap();
    assert_eq!(v.as_slice().unwrap(), [0, 4, 5]);
    v.erase_range(2..2).unwrap();
    assert_eq!(v.len(), 3);
    assert_eq!(
        v.erase_range(1..9),
        Err(ContainerError::IndexOutOfRange { index: 9, len: 3 })
    );
    #[allow(clippy::reversed_empty_ranges)]
    let backwards = 2..1;
    assert_eq!(
        v.erase_range(backwards),
        Err(ContainerError::IndexOutOfRange { index: 2, len: 3 })
    );
    v.erase_range(0..3).unwrap();
    assert!(v.is_empty());
}

#[test]
fn access_and_assignment() {
    let mut v = ints(&[1, 2, 3]);
    assert_eq!(v.front(), Ok(&1));
    assert_eq!(v.back(), Ok(&3));
    v.set_first_copy(&10).unwrap();
    v.set_last_move(30).unwrap();
    v.set_copy(1, &20).unwrap();
    assert_eq!(v.as_slice().unwrap(), [10, 20, 30]);
    *v.get_mut(1).unwrap() += 1;
    v[0] += 1;
    assert_eq!(v[0], 11);
    assert_eq!(v[1], 21);
    assert_eq!(
        v.set_move(3, 0),
        Err(ContainerError::IndexOutOfRange { index: 3, len: 3 })
    );

    let empty = ints(&[]);
    assert_eq!(
        empty.back(),
        Err(ContainerError::IndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
#[should_panic(expected = "index 3 out of range for length 3")]
fn indexing_past_the_end_panics() {
    let v = ints(&[1, 2, 3]);
    let _past_end = v[3];
}

#[test]
fn reserve_and_shrink() {
    let mut v = ints(&[1, 2, 3]);
    v.reserve(100).unwrap();
    assert!(v.capacity() >= 100);
    v.shrink_to_fit().unwrap();
    assert_eq!(v.capacity(), 3);
    assert_eq!(v.as_slice().unwrap(), [1, 2, 3]);
}

#[test]
fn take_invalidates_the_donor() {
    let mut a = ints(&[1, 2]);
    let b = a.take().unwrap();
    assert_eq!(b.as_slice().unwrap(), [1, 2]);

    assert!(!a.is_valid());
    assert_eq!(a.len(), 0);
    assert_eq!(a.capacity(), 0);
    assert_eq!(a.push_back_move(3), Err(ContainerError::UseAfterInvalidate));
    assert_eq!(a.get(0), Err(ContainerError::UseAfterInvalidate));
    assert_eq!(a.take().err(), Some(ContainerError::UseAfterInvalidate));
    assert_eq!(a.clear(), Err(ContainerError::UseAfterInvalidate));

    a.reinit(crate::contract::Natural::new(), 4).unwrap();
    assert!(a.is_valid());
    a.push_back_move(3).unwrap();
    assert_eq!(a.as_slice().unwrap(), [3]);
}

#[test]
fn destroy_then_reinit() {
    let mut v = ints(&[1, 2, 3]);
    v.destroy().unwrap();
    assert!(!v.is_valid());
    assert_eq!(v.destroy(), Err(ContainerError::UseAfterInvalidate));
    assert_eq!(v.sort(i32::cmp), Err(ContainerError::UseAfterInvalidate));
    assert_eq!(alloc::format!("{v:?}"), "<invalidated>");
    v.reinit(crate::contract::Natural::new(), 0).unwrap();
    assert_eq!(alloc::format!("{v:?}"), "[]");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Natural, Tagged, global_allocate, global_deallocate};
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::cell::Cell;
    use core::ptr::NonNull;

    #[derive(Default)]
    struct Stats {
        allocs: Cell<usize>,
        deallocs: Cell<usize>,
        copies: Cell<usize>,
        destroys: Cell<usize>,
        // allocations still allowed, `None` means unlimited
        budget: Cell<Option<usize>>,
    }

    fn bump(c: &Cell<usize>) {
        c.set(c.get() + 1);
    }

    /// Strings with every contract call counted.
    #[derive(Clone, Default)]
    struct Counting(Rc<Stats>);

    unsafe impl ElementContract for Counting {
        type Item = String;

        fn type_name(&self) -> &'static str {
            "counted string"
        }

        fn copy(&self, src: &String) -> String {
            bump(&self.0.copies);
            src.clone()
        }

        fn equals(&self, a: &String, b: &String) -> bool {
            a == b
        }

        unsafe fn destroy(&self, elem: *mut String) {
            bump(&self.0.destroys);
            unsafe { core::ptr::drop_in_place(elem) }
        }

        fn allocate(&self, n: usize) -> Result<NonNull<String>> {
            if let Some(left) = self.0.budget.get() {
                if left == 0 {
                    return Err(ContainerError::OutOfMemory {
                        bytes: n * core::mem::size_of::<String>(),
                    });
                }
                self.0.budget.set(Some(left - 1));
            }
            bump(&self.0.allocs);
            global_allocate(n)
        }

        unsafe fn deallocate(&self, ptr: NonNull<String>, n: usize) {
            bump(&self.0.deallocs);
            unsafe { global_deallocate(ptr, n) }
        }
    }

    impl Counting {
        fn refuse_after(&self, allocations: usize) {
            self.0.budget.set(Some(allocations));
        }

        fn balanced(&self) -> bool {
            self.0.allocs.get() == self.0.deallocs.get()
        }
    }

    fn is_oom<T>(res: Result<T>) -> bool {
        matches!(res, Err(ContainerError::OutOfMemory { .. }))
    }

    /// Plain integer handles whose release has to be seen by the contract.
    #[derive(Clone, Default)]
    struct Handles(Rc<Cell<usize>>);

    unsafe impl ElementContract for Handles {
        type Item = u32;

        fn type_name(&self) -> &'static str {
            "handle"
        }

        fn copy(&self, src: &u32) -> u32 {
            *src
        }

        fn equals(&self, a: &u32, b: &u32) -> bool {
            a == b
        }

        unsafe fn destroy(&self, _elem: *mut u32) {
            bump(&self.0);
        }
    }

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn growth_moves_and_pairs_allocations() {
        let c = Counting::default();
        let mut v = Vector::with_capacity(c.clone(), 2).unwrap();
        let mut caps = Vec::new();
        for i in 1..=4 {
            v.push_back_move(i.to_string()).unwrap();
            caps.push(v.capacity());
        }
        assert_eq!(caps, [2, 2, 3, 5]);
        assert_eq!(c.0.allocs.get(), 3);
        assert_eq!(c.0.deallocs.get(), 2);
        assert_eq!(c.0.copies.get(), 0);
        assert_eq!(c.0.destroys.get(), 0);
        assert_eq!(v.as_slice().unwrap(), strings(&["1", "2", "3", "4"]));

        drop(v);
        assert_eq!(c.0.allocs.get(), c.0.deallocs.get());
        assert_eq!(c.0.destroys.get(), 4);
    }

    #[test]
    fn moved_from_slots_are_never_destroyed() {
        let c = Counting::default();
        let mut v = Vector::from_slice(c.clone(), &strings(&["a", "b", "c", "d", "e"])).unwrap();
        assert_eq!(c.0.copies.get(), 5);

        v.erase(1).unwrap();
        v.insert_move(0, "z".to_string()).unwrap();
        v.reverse().unwrap();
        v.sort(String::cmp).unwrap();
        v.stable_sort(|a, b| b.cmp(a)).unwrap();
        assert_eq!(v.partition(|s| s.as_str() < "d"), Ok(2));
        assert_eq!(c.0.destroys.get(), 1);

        let taken = v.pop().unwrap();
        assert_eq!(c.0.destroys.get(), 1);
        drop(taken);
        v.pop_back().unwrap();
        assert_eq!(c.0.destroys.get(), 2);

        let left = v.len();
        drop(v);
        assert_eq!(c.0.destroys.get(), 2 + left);
        assert_eq!(c.0.allocs.get(), c.0.deallocs.get());
    }

    #[test]
    fn clear_destroys_and_resets_capacity() {
        let c = Counting::default();
        let mut v = Vector::new(c.clone()).unwrap();
        for i in 0..20 {
            v.push_back_move(i.to_string()).unwrap();
        }
        assert!(v.capacity() > 16);
        v.clear().unwrap();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), VecConfig::DEFAULT_CAPACITY);
        assert_eq!(c.0.destroys.get(), 20);
        drop(v);
        assert_eq!(c.0.allocs.get(), c.0.deallocs.get());
    }

    #[test]
    fn clones_are_independent() {
        let c = Counting::default();
        let mut a = Vector::from_slice(c.clone(), &strings(&["x", "y"])).unwrap();
        let b = a.try_clone().unwrap();
        a.set_copy(0, &"changed".to_string()).unwrap();
        a.push_back_copy(&"w".to_string()).unwrap();

        assert_eq!(b.as_slice().unwrap(), strings(&["x", "y"]));
        assert_eq!(b.capacity(), 2);
        assert_eq!(a.equals(&b), Ok(false));

        let mut d = Vector::new(c.clone()).unwrap();
        d.push_back_move("old".to_string()).unwrap();
        d.copy_from(&b).unwrap();
        assert_eq!(d.equals(&b), Ok(true));
    }

    #[test]
    fn mismatched_contracts_are_refused() {
        let mut m = Vector::from_slice(Tagged::<f64>::new("meters"), &[1.0, 2.0]).unwrap();
        let mut s = Vector::from_slice(Tagged::<f64>::new("seconds"), &[1.0, 2.0]).unwrap();
        let mismatch = ContainerError::TypeMismatch {
            left: "meters",
            right: "seconds",
        };
        assert_eq!(m.equals(&s), Err(mismatch.clone()));
        assert_eq!(m.copy_from(&s), Err(mismatch.clone()));
        assert_eq!(m.swap(&mut s), Err(mismatch));
        assert_eq!(m.compare(&s, f64::total_cmp), Ok(Comparison::Undefined));

        // a tag spelled like the native token describes the same type
        let n = Vector::from_slice(Natural::<f64>::new(), &[1.0, 2.0]).unwrap();
        let f = Vector::from_slice(Tagged::<f64>::new("f64"), &[1.0, 2.0]).unwrap();
        assert_eq!(n.equals(&f), Ok(true));
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a = ints(&[1, 2, 3]);
        let mut b = ints(&[9]);
        a.swap(&mut b).unwrap();
        assert_eq!(a.as_slice().unwrap(), [9]);
        assert_eq!(b.as_slice().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn delegated_algorithms() {
        let mut v = ints(&[4, 8, 15, 16, 23, 42]);
        assert_eq!(v.find(0, &15), Ok(Some(2)));
        assert_eq!(v.find_last(99, &4), Ok(Some(0)));
        assert_eq!(v.find_if(0, |x| *x > 20), Ok(Some(4)));
        assert_eq!(v.find_last_if(3, |x| *x % 2 == 0), Ok(Some(3)));
        assert_eq!(v.look(0, &10, |x, k| x > k), Ok(Some(2)));
        assert_eq!(v.contains(&23), Ok(true));
        assert_eq!(v.count(&8), Ok(1));
        assert_eq!(v.count_if(|x| x % 2 == 0), Ok(4));
        assert_eq!(v.all(|x| *x > 0), Ok(true));
        assert_eq!(v.any(|x| *x == 42), Ok(true));
        assert_eq!(v.none(|x| *x < 0), Ok(true));
        assert_eq!(v.sorted(i32::cmp), Ok(true));
        assert_eq!(v.minimum(i32::cmp), Ok(Some(&4)));
        assert_eq!(v.maximum(i32::cmp), Ok(Some(&42)));

        v.replace(&15, &0).unwrap();
        v.replace_if(&1, |x| *x > 20).unwrap();
        assert_eq!(v.as_slice().unwrap(), [4, 8, 0, 16, 1, 1]);

        v.for_each(|x| *x += 1).unwrap();
        assert_eq!(v.as_slice().unwrap(), [5, 9, 1, 17, 2, 2]);

        v.fill(&7).unwrap();
        assert_eq!(v.iter().unwrap().sum::<i32>(), 42);

        let w = ints(&[7, 7, 7, 7, 7, 7, 0]);
        assert_eq!(v.compare(&w, i32::cmp), Ok(Comparison::Less));
    }

    #[test]
    fn shuffle_and_choose() {
        use rand::SeedableRng;
        use rand::rngs::SmallRng;

        let mut rng = SmallRng::seed_from_u64(42);
        let mut v = ints(&[1, 2, 3, 4, 5, 6, 7, 8]);
        v.shuffle(&mut rng).unwrap();
        let picked = *v.choose(&mut rng).unwrap().unwrap();
        assert!((1..=8).contains(&picked));
        v.sort(i32::cmp).unwrap();
        assert_eq!(v.as_slice().unwrap(), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn erase_if_survives_a_panicking_predicate() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let c = Counting::default();
        let names = strings(&["a", "bb", "c", "dd", "e", "ff"]);
        let mut v = Vector::from_slice(c.clone(), &names).unwrap();
        let mut calls = 0;
        let res = catch_unwind(AssertUnwindSafe(|| {
            v.erase_if(|s| {
                calls += 1;
                if calls == 4 {
                    panic!("predicate gave up");
                }
                s.len() == 2
            })
        }));
        assert!(res.is_err());
        // "bb" went before the panic, everything from "dd" on is kept
        assert_eq!(v.as_slice().unwrap(), strings(&["a", "c", "dd", "e", "ff"]));
        assert_eq!(c.0.destroys.get(), 1);
        drop(v);
        assert_eq!(c.0.destroys.get(), 6);
        assert_eq!(c.0.allocs.get(), c.0.deallocs.get());
    }

    #[test]
    fn zero_sized_items() {
        let mut v = Vector::new(Natural::<()>::new()).unwrap();
        for _ in 0..100 {
            v.push_back_move(()).unwrap();
        }
        assert_eq!(v.len(), 100);
        assert_eq!(v.erase_all_of(&()), Ok(100));
        assert!(v.is_empty());
    }

    #[test]
    fn custom_destroy_runs_for_plain_data() {
        let h = Handles::default();
        let mut v = Vector::with_capacity(h.clone(), 2).unwrap();
        for fd in 3..7 {
            v.push_back_move(fd).unwrap();
        }
        // growth moved every handle without releasing any
        assert_eq!(h.0.get(), 0);

        v.set_copy(0, &9).unwrap();
        v.erase(0).unwrap();
        v.pop_back().unwrap();
        assert_eq!(h.0.get(), 3);
        assert_eq!(v.as_slice().unwrap(), [4, 5]);

        assert_eq!(v.erase_all_of(&4), Ok(1));
        assert_eq!(h.0.get(), 4);
        drop(v);
        assert_eq!(h.0.get(), 5);
    }

    #[test]
    fn clear_reports_a_failed_reallocation() {
        let c = Counting::default();
        let mut v = Vector::new(c.clone()).unwrap();
        v.push_back_move("a".to_string()).unwrap();
        c.refuse_after(0);

        assert!(is_oom(v.clear()));
        assert!(v.is_valid());
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 0);
        assert_eq!(c.0.destroys.get(), 1);

        c.0.budget.set(None);
        v.push_back_move("b".to_string()).unwrap();
        assert_eq!(v.capacity(), 1);
        drop(v);
        assert!(c.balanced());
    }

    #[test]
    fn allocation_failures_leave_contents_intact() {
        let c = Counting::default();
        let names = strings(&["d", "a", "c", "b"]);
        let mut v = Vector::from_slice(c.clone(), &names).unwrap();
        assert_eq!(v.capacity(), 4);
        c.refuse_after(0);

        assert!(is_oom(v.push_back_move("e".to_string())));
        assert!(is_oom(v.insert_move(0, "e".to_string())));
        assert!(is_oom(v.insert_copy(2, &"e".to_string())));
        assert!(is_oom(v.reserve(10)));
        assert!(is_oom(v.try_clone()));
        assert!(is_oom(v.stable_sort(String::cmp)));
        assert!(is_oom(v.partition(|s| s.as_str() < "c")));
        assert!(is_oom(Vector::new(c.clone())));

        assert_eq!(v.len(), 4);
        assert_eq!(v.capacity(), 4);
        assert_eq!(v.as_slice().unwrap(), names);
        assert_eq!(c.0.destroys.get(), 0);
        assert!(!c.balanced());

        // the failed calls left nothing behind, so one release settles the books
        drop(v);
        assert!(c.balanced());
        assert_eq!(c.0.allocs.get(), 1);
    }
}
