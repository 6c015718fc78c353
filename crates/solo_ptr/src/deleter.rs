use alloc::boxed::Box;
use core::ptr::{self, NonNull};

// -----------------------------------------------------------------------------
// Deleter

/// The deletion policy of a [`UniquePtr`](crate::UniquePtr).
///
/// A deleter is stored by value inside the pointer and invoked exactly once
/// with the owned address when the pointer is reset, reassigned or dropped.
///
/// Any `FnMut(NonNull<T>)` closure is a deleter, so most custom policies
/// do not need a dedicated type.
///
/// A deleter may fail by panicking. The panic propagates to whoever
/// triggered the deletion and is never caught or retried.
///
/// # Examples
///
/// ```
/// use solo_ptr::{Deleter, UniquePtr};
/// use core::ptr::NonNull;
///
/// struct Recycle(usize);
///
/// impl Deleter<u64> for Recycle {
///     unsafe fn delete(&mut self, ptr: NonNull<u64>) {
///         self.0 += 1;
///         drop(unsafe { Box::from_raw(ptr.as_ptr()) });
///     }
/// }
///
/// let raw = Box::into_raw(Box::new(7u64));
/// let mut p = unsafe { UniquePtr::from_raw_with(raw, Recycle(0)) };
/// p.reset();
/// assert_eq!(p.deleter().0, 1);
/// ```
pub trait Deleter<T: ?Sized> {
    /// Releases the resource behind `ptr`.
    ///
    /// # Safety
    ///
    /// - `ptr` must have been produced by an allocation mechanism compatible
    ///   with this deleter.
    /// - The caller transfers ownership of `ptr`; it must not be used again.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

impl<T: ?Sized, F: FnMut(NonNull<T>)> Deleter<T> for F {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        self(ptr)
    }
}

// -----------------------------------------------------------------------------
// DefaultDelete

/// The default deletion policy: frees a single heap object allocated by [`Box`].
///
/// Zero-sized, so a `UniquePtr<T>` is exactly as large as its address.
///
/// # Examples
///
/// ```
/// use solo_ptr::{DefaultDelete, UniquePtr};
///
/// let p: UniquePtr<String> = UniquePtr::new("owned".into());
/// assert_eq!(size_of::<DefaultDelete>(), 0);
/// assert_eq!(*p, "owned");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefaultDelete;

impl<T: ?Sized> Deleter<T> for DefaultDelete {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // SAFETY: the caller guarantees `ptr` came from `Box::into_raw`
        // (or an equivalent global-allocator allocation of one `T`).
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }
}

// -----------------------------------------------------------------------------
// DropInPlace

/// Runs the destructor of the pointee without freeing its storage.
///
/// Useful when the memory belongs to an arena, a pool or a stack slot
/// and only the value's lifetime is handed over.
///
/// # Examples
///
/// ```
/// use solo_ptr::{DropInPlace, UniquePtr};
/// use core::mem::ManuallyDrop;
///
/// let mut slot = ManuallyDrop::new(String::from("slot"));
/// let raw: *mut String = &mut *slot;
/// let p = unsafe { UniquePtr::from_raw_with(raw, DropInPlace) };
/// assert_eq!(p.len(), 4);
/// // `p` drops the string, `slot` is never touched again.
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DropInPlace;

impl<T: ?Sized> Deleter<T> for DropInPlace {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // SAFETY: the caller guarantees `ptr` points to a live, owned value.
        unsafe { ptr::drop_in_place(ptr.as_ptr()) };
    }
}
