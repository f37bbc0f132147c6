//! Per-element contracts: how a container copies, relocates, compares, destroys and
//! stores the values it holds.

use crate::error::{ContainerError, Result};
use alloc::alloc::{Layout, alloc, dealloc};
use core::fmt;
use core::marker::PhantomData;
use core::mem::{size_of, size_of_val};
use core::ptr::{self, NonNull};

/// The capability table a container is bound to.
///
/// Every element operation a container performs goes through its contract, so the
/// same buffer code works for any element type and any allocation strategy.
///
/// # Safety
/// Implementors promise that:
/// - `move_to` is a faithful relocation that never panics. Containers rely on it
///   while slots are temporarily uninitialized.
/// - `allocate(n)` returns memory valid and aligned for `n` items, and
///   `deallocate(ptr, n)` accepts exactly what a matching `allocate(n)` returned.
/// - `destroy` leaves the slot logically uninitialized.
pub unsafe trait ElementContract {
    type Item;

    /// Type token used to decide whether two contracts describe the same type.
    fn type_name(&self) -> &'static str;

    #[inline]
    fn item_size(&self) -> usize {
        size_of::<Self::Item>()
    }

    /// Copy-constructs an independent element.
    fn copy(&self, src: &Self::Item) -> Self::Item;

    /// Copy-assigns `src` over an already live `dst`.
    fn copy_assign(&self, dst: &mut Self::Item, src: &Self::Item) {
        let fresh = self.copy(src);
        let slot: *mut Self::Item = dst;
        unsafe {
            if !self.is_trivial() {
                self.destroy(slot);
            }
            slot.write(fresh);
        }
    }

    /// Relocates the element at `src` into the uninitialized slot `dst`.
    ///
    /// # Safety
    /// `src` must hold a live element and `dst` must be valid for writes.
    /// Afterwards `src` is uninitialized and must never be read or destroyed.
    #[inline]
    unsafe fn move_to(&self, dst: *mut Self::Item, src: *mut Self::Item) {
        unsafe { dst.write(src.read()) }
    }

    fn equals(&self, a: &Self::Item, b: &Self::Item) -> bool;

    /// `true` when destroying an element is a no-op, containers then skip it.
    ///
    /// Defaults to `false`, so a custom `destroy` always runs. Override it only
    /// together with `destroy`.
    #[inline]
    fn is_trivial(&self) -> bool {
        false
    }

    /// # Safety
    /// `elem` must hold a live element, it is uninitialized afterwards.
    #[inline]
    unsafe fn destroy(&self, elem: *mut Self::Item) {
        unsafe { ptr::drop_in_place(elem) }
    }

    fn allocate(&self, n: usize) -> Result<NonNull<Self::Item>> {
        global_allocate(n)
    }

    /// # Safety
    /// `ptr` must come from `self.allocate(n)` with the same `n`.
    unsafe fn deallocate(&self, ptr: NonNull<Self::Item>, n: usize) {
        unsafe { global_deallocate(ptr, n) }
    }
}

/// Allocates room for `n` items from the global allocator.
pub fn global_allocate<T>(n: usize) -> Result<NonNull<T>> {
    let layout = Layout::array::<T>(n).map_err(|_| ContainerError::OutOfMemory {
        bytes: n.saturating_mul(size_of::<T>()),
    })?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }
    let raw = unsafe { alloc(layout) } as *mut T;
    NonNull::new(raw).ok_or_else(|| {
        tracing::warn!(bytes = layout.size(), "global allocation failed");
        ContainerError::OutOfMemory {
            bytes: layout.size(),
        }
    })
}

/// # Safety
/// `ptr` must come from `global_allocate::<T>(n)` with the same `n`.
pub unsafe fn global_deallocate<T>(ptr: NonNull<T>, n: usize) {
    if let Ok(layout) = Layout::array::<T>(n) {
        if layout.size() != 0 {
            unsafe { dealloc(ptr.as_ptr() as *mut u8, layout) }
        }
    }
}

/// Two contracts describe the same element type if they are the same object or
/// carry the same type token.
///
/// Address identity is only consulted for contracts that occupy memory, zero sized
/// contracts are told apart by their token alone.
pub fn same_type<A, B>(a: &A, b: &B) -> bool
where
    A: ElementContract + ?Sized,
    B: ElementContract<Item = A::Item> + ?Sized,
{
    let addressed = size_of_val(a) != 0 && size_of_val(b) != 0;
    (addressed && ptr::addr_eq(a as *const A, b as *const B)) || a.type_name() == b.type_name()
}

/// [`same_type`] as a `Result`, for the operations that refuse to mix types.
pub fn ensure_same_type<A, B>(a: &A, b: &B) -> Result<()>
where
    A: ElementContract + ?Sized,
    B: ElementContract<Item = A::Item> + ?Sized,
{
    if same_type(a, b) {
        Ok(())
    } else {
        Err(ContainerError::TypeMismatch {
            left: a.type_name(),
            right: b.type_name(),
        })
    }
}

/*──────────────────── stock contracts ───────────────────────*/

/// Contract built from the type's own `Clone` and `PartialEq`.
///
/// The type token is `core::any::type_name::<T>()`.
pub struct Natural<T>(PhantomData<fn() -> T>);

impl<T> Natural<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Natural<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Natural<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Natural<T> {}

impl<T> fmt::Debug for Natural<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Natural<{}>", core::any::type_name::<T>())
    }
}

unsafe impl<T: Clone + PartialEq> ElementContract for Natural<T> {
    type Item = T;

    #[inline]
    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    #[inline]
    fn copy(&self, src: &T) -> T {
        src.clone()
    }

    #[inline]
    fn is_trivial(&self) -> bool {
        !core::mem::needs_drop::<T>()
    }

    #[inline]
    fn copy_assign(&self, dst: &mut T, src: &T) {
        dst.clone_from(src)
    }

    #[inline]
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Like [`Natural`] but with a caller-chosen type token.
///
/// Useful when one Rust type stands for several logical types, e.g. `f64` as both
/// meters and seconds: containers tagged differently refuse to be combined.
pub struct Tagged<T> {
    name: &'static str,
    _ph: PhantomData<fn() -> T>,
}

impl<T> Tagged<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _ph: PhantomData,
        }
    }
}

impl<T> Clone for Tagged<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Tagged<T> {}

impl<T> fmt::Debug for Tagged<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tagged").field(&self.name).finish()
    }
}

unsafe impl<T: Clone + PartialEq> ElementContract for Tagged<T> {
    type Item = T;

    #[inline]
    fn type_name(&self) -> &'static str {
        self.name
    }

    #[inline]
    fn copy(&self, src: &T) -> T {
        src.clone()
    }

    #[inline]
    fn is_trivial(&self) -> bool {
        !core::mem::needs_drop::<T>()
    }

    #[inline]
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}
