//raw pointer plumbing, only ever driven from inside the crate

use crate::contract::ElementContract;
use crate::error::Result;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ops::Range;
use core::ptr::NonNull;
use core::slice;

/// Raw contiguous storage for `cap` items, with no idea which slots are live.
///
/// Memory is only ever obtained from and returned to a contract. Zero-capacity
/// buffers and zero-sized items never touch the allocator, so `release` mirrors
/// `allocate` exactly.
///
/// # Layout:
///
/// ```text
///   ptr (low addr)
///     │
///     ▼
///   [ slot0, slot1, ... slot(cap-1) ]
/// ```
pub(crate) struct RawBuffer<T> {
    ptr: NonNull<T>,
    cap: usize,
    _ph: PhantomData<T>,
}

unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    #[inline]
    const fn backed(cap: usize) -> bool {
        cap != 0 && size_of::<T>() != 0
    }

    pub(crate) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _ph: PhantomData,
        }
    }

    pub(crate) fn allocate<C>(contract: &C, cap: usize) -> Result<Self>
    where
        C: ElementContract<Item = T> + ?Sized,
    {
        let ptr = if Self::backed(cap) {
            contract.allocate(cap)?
        } else {
            NonNull::dangling()
        };
        Ok(Self {
            ptr,
            cap,
            _ph: PhantomData,
        })
    }

    /// Hands the memory back. Live slots must already be destroyed or moved out.
    pub(crate) fn release<C>(self, contract: &C)
    where
        C: ElementContract<Item = T> + ?Sized,
    {
        if Self::backed(self.cap) {
            unsafe { contract.deallocate(self.ptr, self.cap) }
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    /// Pointer to slot `offset` (one past the end is allowed).
    #[inline]
    pub(crate) fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(offset <= self.cap, "slot {offset} outside capacity {}", self.cap);
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// # Safety
    /// The first `len` slots must be live.
    #[inline]
    pub(crate) unsafe fn as_slice(&self, len: usize) -> &[T] {
        debug_assert!(len <= self.cap);
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), len) }
    }

    /// # Safety
    /// The first `len` slots must be live.
    #[inline]
    pub(crate) unsafe fn as_mut_slice(&mut self, len: usize) -> &mut [T] {
        debug_assert!(len <= self.cap);
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), len) }
    }

    /*──────────────────── element plumbing ───────────────────────*/

    /// Moves the live run `[src, src + count)` so it starts at `dst`.
    /// Overlapping runs are fine.
    ///
    /// # Safety
    /// The source run must be live, the destination run must be in bounds and every
    /// destination slot outside the source run must be dead.
    pub(crate) unsafe fn shift<C>(&mut self, contract: &C, src: usize, dst: usize, count: usize)
    where
        C: ElementContract<Item = T> + ?Sized,
    {
        debug_assert!(src + count <= self.cap && dst + count <= self.cap);
        unsafe {
            if dst < src {
                for k in 0..count {
                    contract.move_to(self.slot(dst + k), self.slot(src + k));
                }
            } else if dst > src {
                for k in (0..count).rev() {
                    contract.move_to(self.slot(dst + k), self.slot(src + k));
                }
            }
        }
    }

    /// Moves the first `count` live slots into the start of `other`.
    ///
    /// # Safety
    /// `[0, count)` must be live here and dead in `other`, which must be big enough.
    pub(crate) unsafe fn relocate_into<C>(
        &self,
        contract: &C,
        other: &mut RawBuffer<T>,
        count: usize,
    ) where
        C: ElementContract<Item = T> + ?Sized,
    {
        debug_assert!(count <= self.cap && count <= other.cap);
        for k in 0..count {
            unsafe { contract.move_to(other.slot(k), self.slot(k)) }
        }
    }

    /// Destroys every slot in `range`.
    ///
    /// # Safety
    /// Every slot in `range` must be live, they are all dead afterwards.
    pub(crate) unsafe fn destroy_range<C>(&mut self, contract: &C, range: Range<usize>)
    where
        C: ElementContract<Item = T> + ?Sized,
    {
        debug_assert!(range.end <= self.cap);
        if contract.is_trivial() {
            return;
        }
        for k in range {
            unsafe { contract.destroy(self.slot(k)) }
        }
    }

    /// Places `item` in a dead slot through the contract's move.
    ///
    /// # Safety
    /// `offset` must be in bounds and dead.
    #[inline]
    pub(crate) unsafe fn emplace<C>(&mut self, contract: &C, offset: usize, item: T)
    where
        C: ElementContract<Item = T> + ?Sized,
    {
        let mut item = core::mem::MaybeUninit::new(item);
        unsafe { contract.move_to(self.slot(offset), item.as_mut_ptr()) }
    }

    /// Moves the element out of a live slot, leaving it dead.
    ///
    /// # Safety
    /// `offset` must be in bounds and live.
    #[inline]
    pub(crate) unsafe fn take<C>(&mut self, contract: &C, offset: usize) -> T
    where
        C: ElementContract<Item = T> + ?Sized,
    {
        let mut out = core::mem::MaybeUninit::<T>::uninit();
        unsafe {
            contract.move_to(out.as_mut_ptr(), self.slot(offset));
            out.assume_init()
        }
    }
}

/*──────────────────── scratch ───────────────────────*/

/// Temporary storage borrowed from a contract, released when dropped.
///
/// Holders must make sure no live element is left in it by then.
pub(crate) struct Scratch<'c, C: ElementContract + ?Sized> {
    buf: RawBuffer<C::Item>,
    contract: &'c C,
}

impl<'c, C: ElementContract + ?Sized> Scratch<'c, C> {
    pub(crate) fn new(contract: &'c C, cap: usize) -> Result<Self> {
        Ok(Self {
            buf: RawBuffer::allocate(contract, cap)?,
            contract,
        })
    }

    #[inline]
    pub(crate) fn slot(&self, offset: usize) -> *mut C::Item {
        self.buf.slot(offset)
    }
}

impl<C: ElementContract + ?Sized> Drop for Scratch<'_, C> {
    fn drop(&mut self) {
        let buf = core::mem::replace(&mut self.buf, RawBuffer::empty());
        buf.release(self.contract);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Natural;
    use alloc::string::{String, ToString};

    #[test]
    fn shift_handles_both_directions() {
        let c = Natural::<String>::new();
        let mut buf = RawBuffer::allocate(&c, 6).unwrap();
        unsafe {
            for (i, s) in ["a", "b", "c"].iter().enumerate() {
                buf.emplace(&c, i, s.to_string());
            }
            // open a gap at 1
            buf.shift(&c, 1, 2, 2);
            buf.emplace(&c, 1, "x".to_string());
            assert_eq!(buf.as_slice(4), ["a", "x", "b", "c"]);

            // close it again
            buf.destroy_range(&c, 1..2);
            buf.shift(&c, 2, 1, 2);
            assert_eq!(buf.as_slice(3), ["a", "b", "c"]);

            buf.destroy_range(&c, 0..3);
        }
        buf.release(&c);
    }

    #[test]
    fn relocate_moves_everything() {
        let c = Natural::<String>::new();
        let mut old = RawBuffer::allocate(&c, 2).unwrap();
        let mut new = RawBuffer::allocate(&c, 4).unwrap();
        unsafe {
            old.emplace(&c, 0, "p".to_string());
            old.emplace(&c, 1, "q".to_string());
            old.relocate_into(&c, &mut new, 2);
            assert_eq!(new.as_slice(2), ["p", "q"]);
            assert_eq!(new.take(&c, 1), "q");
            new.destroy_range(&c, 0..1);
        }
        old.release(&c);
        new.release(&c);
    }

    #[test]
    fn zero_sized_items_need_no_memory() {
        let c = Natural::<()>::new();
        let mut buf = RawBuffer::allocate(&c, 1000).unwrap();
        unsafe {
            buf.emplace(&c, 999, ());
            buf.take(&c, 999);
        }
        assert_eq!(buf.capacity(), 1000);
        buf.release(&c);
    }

    #[test]
    fn scratch_releases_on_drop() {
        let c = Natural::<u32>::new();
        let s = Scratch::new(&c, 8).unwrap();
        unsafe { s.slot(3).write(5) };
        drop(s);
    }
}
