use alloc::boxed::Box;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use crate::{DefaultDelete, Deleter, PtrError, Upcast};

// -----------------------------------------------------------------------------
// UniquePtr

/// A single-owner pointer with a pluggable deletion policy.
///
/// A `UniquePtr` either owns one resource or is empty. When it owns one,
/// the deleter `D` runs exactly once on its address: when the pointer is
/// [`reset`](Self::reset), reassigned through [`assign`](Self::assign), or dropped.
/// [`release`](Self::release) hands the address back without running it.
///
/// # Ownership
///
/// - It cannot be cloned. Ownership only moves, and every explicit transfer
///   ([`take`](Self::take), [`assign`](Self::assign), [`upcast`](Self::upcast))
///   leaves the source empty.
/// - Two live pointers never own the same address, unless the caller breaks
///   the contract of one of the `unsafe` constructors.
/// - With [`DefaultDelete`] it is exactly the size of a `Box<T>`.
///
/// # Method resolution
///
/// Inherent methods such as [`get`](Self::get), [`take`](Self::take),
/// [`as_ref`](Self::as_ref), [`reset`](Self::reset) and [`swap`](Self::swap)
/// are found before the pointee's methods of the same name. Dereference
/// explicitly to reach the pointee's:
///
/// ```
/// use solo_ptr::UniquePtr;
///
/// let p = UniquePtr::new(vec![10u8, 20]);
/// assert!(p.get().is_some());
/// assert_eq!((*p).get(1), Some(&20));
/// ```
///
/// # Examples
///
/// ```
/// use solo_ptr::UniquePtr;
///
/// let mut p = UniquePtr::new(vec![1, 2, 3]);
/// p.push(4);
/// assert_eq!(p.len(), 4);
///
/// let q = p.take();
/// assert!(p.is_null());
/// assert_eq!(*q, [1, 2, 3, 4]);
/// ```
pub struct UniquePtr<T: ?Sized, D: Deleter<T> = DefaultDelete> {
    ptr: Option<NonNull<T>>,
    deleter: D,
    _marker: PhantomData<T>,
}

// SAFETY: `UniquePtr` owns its pointee exactly like `Box` does.
unsafe impl<T: ?Sized + Send, D: Deleter<T> + Send> Send for UniquePtr<T, D> {}

// SAFETY: shared access only hands out `&T` and `&D`.
unsafe impl<T: ?Sized + Sync, D: Deleter<T> + Sync> Sync for UniquePtr<T, D> {}

impl<T: ?Sized, D: Deleter<T>> Drop for UniquePtr<T, D> {
    #[inline]
    fn drop(&mut self) {
        self.destroy();
    }
}

#[inline]
fn trace_delete<T: ?Sized>(ptr: NonNull<T>) {
    #[cfg(any(feature = "debug", debug_assertions))]
    log::trace!("deleting `{}` at {:p}", core::any::type_name::<T>(), ptr);
    #[cfg(not(any(feature = "debug", debug_assertions)))]
    let _ = ptr;
}

#[cold]
#[track_caller]
fn empty_deref<T: ?Sized>() -> ! {
    panic!("{}", PtrError::empty::<T>())
}

impl<T> UniquePtr<T> {
    /// Moves `value` to the heap and owns it with [`DefaultDelete`].
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let p = UniquePtr::new(5u8);
    /// assert_eq!(*p, 5);
    /// ```
    #[inline]
    pub fn new(value: T) -> Self {
        Self::from(Box::new(value))
    }
}

impl<T: ?Sized> UniquePtr<T> {
    /// Converts back into a [`Box`], or `None` if empty.
    ///
    /// The deleter is not invoked; the box takes over the allocation.
    #[inline]
    pub fn into_box(self) -> Option<Box<T>> {
        let (ptr, DefaultDelete) = self.into_raw_parts();
        // SAFETY: `DefaultDelete` pointers always come from `Box`.
        ptr.map(|ptr| unsafe { Box::from_raw(ptr.as_ptr()) })
    }

    /// Like [`into_box`](Self::into_box), but reports an empty pointer as an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::{PtrError, UniquePtr};
    ///
    /// let empty = UniquePtr::<u8>::null();
    /// assert!(matches!(empty.try_into_box(), Err(PtrError::Empty { .. })));
    /// ```
    #[inline]
    pub fn try_into_box(self) -> Result<Box<T>, PtrError> {
        self.into_box().ok_or_else(PtrError::empty::<T>)
    }
}

impl<T: ?Sized> From<Box<T>> for UniquePtr<T> {
    #[inline]
    fn from(value: Box<T>) -> Self {
        Self {
            ptr: Some(NonNull::from(Box::leak(value))),
            deleter: DefaultDelete,
            _marker: PhantomData,
        }
    }
}

/// Moves `value` to the heap and returns its owning pointer.
///
/// Shorthand for [`UniquePtr::new`].
#[inline]
pub fn make_unique<T>(value: T) -> UniquePtr<T> {
    UniquePtr::new(value)
}

impl<T: ?Sized, D: Deleter<T>> UniquePtr<T, D> {
    // -------------------------------------------------------------------------
    // Construction

    /// Creates an empty pointer with a default-constructed deleter.
    #[inline]
    pub fn null() -> Self
    where
        D: Default,
    {
        Self::null_with(D::default())
    }

    /// Creates an empty pointer that will use `deleter` once it owns something.
    #[inline]
    pub const fn null_with(deleter: D) -> Self {
        Self {
            ptr: None,
            deleter,
            _marker: PhantomData,
        }
    }

    /// Takes ownership of `ptr` with a default-constructed deleter.
    ///
    /// A null `ptr` yields an empty pointer.
    ///
    /// # Safety
    ///
    /// - A non-null `ptr` must point to a valid `T` allocated in a way
    ///   `D::default()` knows how to release.
    /// - Nothing else may own `ptr` afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let raw = Box::into_raw(Box::new(1u32));
    /// let p: UniquePtr<u32> = unsafe { UniquePtr::from_raw(raw) };
    /// assert_eq!(p.as_ptr(), raw);
    /// ```
    #[inline]
    pub unsafe fn from_raw(ptr: *mut T) -> Self
    where
        D: Default,
    {
        // SAFETY: forwarded to the caller.
        unsafe { Self::from_raw_with(ptr, D::default()) }
    }

    /// Takes ownership of `ptr`, moving `deleter` in.
    ///
    /// # Safety
    ///
    /// - A non-null `ptr` must point to a valid `T` allocated in a way
    ///   `deleter` knows how to release.
    /// - Nothing else may own `ptr` afterwards.
    #[inline]
    pub const unsafe fn from_raw_with(ptr: *mut T, deleter: D) -> Self {
        Self {
            ptr: NonNull::new(ptr),
            deleter,
            _marker: PhantomData,
        }
    }

    /// Takes ownership of `ptr` using a copy of `deleter`.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw_with`](Self::from_raw_with).
    #[inline]
    pub unsafe fn from_raw_with_ref(ptr: *mut T, deleter: &D) -> Self
    where
        D: Clone,
    {
        // SAFETY: forwarded to the caller.
        unsafe { Self::from_raw_with(ptr, deleter.clone()) }
    }

    /// Like [`from_raw`](Self::from_raw), but a null `ptr` is an error
    /// instead of an empty pointer.
    ///
    /// # Safety
    ///
    /// Same as [`from_raw`](Self::from_raw).
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::{PtrError, UniquePtr};
    ///
    /// let p = unsafe { UniquePtr::<u8>::try_from_raw(core::ptr::null_mut()) };
    /// assert_eq!(p.err(), Some(PtrError::Null));
    /// ```
    #[inline]
    pub unsafe fn try_from_raw(ptr: *mut T) -> Result<Self, PtrError>
    where
        D: Default,
    {
        if ptr.is_null() {
            return Err(PtrError::Null);
        }
        // SAFETY: forwarded to the caller.
        Ok(unsafe { Self::from_raw(ptr) })
    }

    /// Moves the address and the deleter out, leaving `self` empty with a
    /// default-constructed deleter.
    ///
    /// This is the explicit form of a move when only `&mut` access is available.
    #[inline]
    pub fn take(&mut self) -> Self
    where
        D: Default,
    {
        Self {
            ptr: self.ptr.take(),
            deleter: mem::take(&mut self.deleter),
            _marker: PhantomData,
        }
    }

    /// Transfers ownership into a pointer over a more general pointee,
    /// keeping the same deleter.
    ///
    /// The address is preserved; `self` is consumed.
    #[inline]
    pub fn upcast<U: ?Sized>(self) -> UniquePtr<U, D>
    where
        T: Upcast<U>,
        D: Deleter<U>,
    {
        self.convert()
    }

    /// Transfers ownership into a pointer over a more general pointee
    /// and a deleter built from the current one.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::{impl_upcast, DefaultDelete, Deleter, UniquePtr};
    /// use core::ptr::NonNull;
    ///
    /// trait Named { fn name(&self) -> &str; }
    /// struct Cat;
    /// impl Named for Cat { fn name(&self) -> &str { "cat" } }
    /// impl_upcast!(Cat => dyn Named);
    ///
    /// #[derive(Default)]
    /// struct Logged(DefaultDelete);
    ///
    /// impl From<DefaultDelete> for Logged {
    ///     fn from(inner: DefaultDelete) -> Self { Logged(inner) }
    /// }
    ///
    /// impl<T: ?Sized> Deleter<T> for Logged {
    ///     unsafe fn delete(&mut self, ptr: NonNull<T>) {
    ///         unsafe { self.0.delete(ptr) }
    ///     }
    /// }
    ///
    /// let cat = UniquePtr::new(Cat);
    /// let named: UniquePtr<dyn Named, Logged> = cat.convert();
    /// assert_eq!(named.name(), "cat");
    /// ```
    #[inline]
    pub fn convert<U: ?Sized, E>(self) -> UniquePtr<U, E>
    where
        T: Upcast<U>,
        E: Deleter<U> + From<D>,
    {
        let (ptr, deleter) = self.into_raw_parts();
        UniquePtr {
            ptr: ptr.map(<T as Upcast<U>>::upcast),
            deleter: E::from(deleter),
            _marker: PhantomData,
        }
    }

    /// Splits into the address and the deleter without invoking it.
    #[inline]
    pub fn into_raw_parts(self) -> (Option<NonNull<T>>, D) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `deleter` is read exactly once.
        let deleter = unsafe { ptr::read(&this.deleter) };
        (this.ptr, deleter)
    }

    // -------------------------------------------------------------------------
    // Observers

    /// Returns the owned address, or `None` when empty. Ownership is unaffected.
    #[inline(always)]
    pub const fn get(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Returns `true` if this pointer owns nothing.
    #[inline(always)]
    pub const fn is_null(&self) -> bool {
        self.ptr.is_none()
    }

    /// Returns `true` if this pointer owns a resource.
    #[inline(always)]
    pub const fn is_some(&self) -> bool {
        self.ptr.is_some()
    }

    /// Borrows the pointee, or `None` when empty.
    #[inline]
    pub fn as_ref(&self) -> Option<&T> {
        // SAFETY: a non-empty address is valid and uniquely owned by `self`.
        self.ptr.map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Mutably borrows the pointee, or `None` when empty.
    #[inline]
    pub fn as_mut(&mut self) -> Option<&mut T> {
        // SAFETY: a non-empty address is valid and uniquely owned by `self`.
        self.ptr.map(|mut ptr| unsafe { ptr.as_mut() })
    }

    /// Borrows the pointee, or reports [`PtrError::Empty`].
    #[inline]
    pub fn try_get(&self) -> Result<&T, PtrError> {
        self.as_ref().ok_or_else(PtrError::empty::<T>)
    }

    /// Mutably borrows the pointee, or reports [`PtrError::Empty`].
    #[inline]
    pub fn try_get_mut(&mut self) -> Result<&mut T, PtrError> {
        self.as_mut().ok_or_else(PtrError::empty::<T>)
    }

    /// Returns a reference to the deleter.
    #[inline(always)]
    pub const fn deleter(&self) -> &D {
        &self.deleter
    }

    /// Returns a mutable reference to the deleter.
    ///
    /// # Safety
    ///
    /// While `self` owns a resource, the deleter must stay able to release
    /// it. Replacing it with one that expects a different allocation, or
    /// mutating its state so that it would, is undefined behavior once the
    /// resource is deleted.
    #[inline(always)]
    pub unsafe fn deleter_mut(&mut self) -> &mut D {
        &mut self.deleter
    }

    // -------------------------------------------------------------------------
    // Modifiers

    /// Gives up ownership without invoking the deleter.
    ///
    /// The caller becomes responsible for the returned address.
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let mut p = UniquePtr::new(7i32);
    /// let addr = p.get();
    ///
    /// let raw = p.release();
    /// assert_eq!(raw, addr);
    /// assert!(p.is_null());
    ///
    /// drop(unsafe { Box::from_raw(raw.unwrap().as_ptr()) });
    /// ```
    #[inline]
    #[must_use = "the released address leaks unless it is freed"]
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.ptr.take()
    }

    /// Deletes the owned resource, if any, and leaves `self` empty.
    ///
    /// Calling this on an empty pointer does nothing.
    #[inline]
    pub fn reset(&mut self) {
        self.destroy();
    }

    /// Deletes the owned resource, if any, and takes ownership of `ptr`.
    ///
    /// The new address is installed before the old one is deleted, so a
    /// panicking deleter cannot leak `ptr`.
    ///
    /// # Safety
    ///
    /// - Same as [`from_raw_with`](Self::from_raw_with), for the current deleter.
    /// - Passing the address `self` already owns does not transfer anything:
    ///   the call is a no-op and the deleter does not run, since deleting it
    ///   would leave `self` owning a freed resource. Ownership of that
    ///   resource stays with `self`.
    #[inline]
    pub unsafe fn reset_to(&mut self, ptr: *mut T) {
        if self.ptr.is_some() && self.addr() == ptr.cast_const().cast::<u8>() {
            return;
        }
        if let Some(old) = mem::replace(&mut self.ptr, NonNull::new(ptr)) {
            trace_delete(old);
            // SAFETY: `old` was owned by `self` and has just been unlinked.
            unsafe { self.deleter.delete(old) };
        }
    }

    /// Exchanges the addresses and deleters of two pointers.
    ///
    /// Nothing is created or destroyed.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.deleter, &mut other.deleter);
    }

    /// Replaces the content of `self` with `source`.
    ///
    /// The resource currently owned by `self` is deleted with its own deleter,
    /// then the address and deleter of `source` are moved in. If `source`
    /// claims the very address `self` already owns, this is treated as
    /// self-assignment: nothing is deleted and `self` keeps its deleter.
    ///
    /// Always returns `self`, so assignments can be chained.
    ///
    /// A pointer cannot be assigned to itself by value:
    ///
    /// ```compile_fail
    /// use solo_ptr::UniquePtr;
    ///
    /// let mut p = UniquePtr::new(1);
    /// p.assign(p);
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use solo_ptr::UniquePtr;
    ///
    /// let mut a = UniquePtr::new(1);
    /// let b = UniquePtr::new(2);
    ///
    /// assert_eq!(**a.assign(b), 2);
    /// ```
    pub fn assign(&mut self, mut source: Self) -> &mut Self {
        if source.ptr.is_some() && self.addr() == source.addr() {
            log::warn!(
                "`UniquePtr<{}>` assigned an address it already owns ({:p}); keeping the existing owner",
                core::any::type_name::<T>(),
                self.addr(),
            );
            source.ptr = None;
            return self;
        }
        self.destroy();
        self.ptr = source.ptr.take();
        mem::swap(&mut self.deleter, &mut source.deleter);
        self
    }

    #[inline]
    fn destroy(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            trace_delete(ptr);
            // SAFETY: `ptr` was owned by `self` and has just been unlinked.
            unsafe { self.deleter.delete(ptr) };
        }
    }

    /// Thin address used for comparisons; null when empty.
    #[inline(always)]
    fn addr(&self) -> *const u8 {
        match self.ptr {
            Some(ptr) => ptr.as_ptr().cast_const().cast::<u8>(),
            None => ptr::null(),
        }
    }
}

impl<T, D: Deleter<T>> UniquePtr<T, D> {
    /// Returns the owned address as a raw pointer, null when empty.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *mut T {
        match self.ptr {
            Some(ptr) => ptr.as_ptr(),
            None => ptr::null_mut(),
        }
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<T: ?Sized, D: Deleter<T> + Default> Default for UniquePtr<T, D> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T: ?Sized, D: Deleter<T>> Deref for UniquePtr<T, D> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the pointer is empty.
    #[inline]
    #[track_caller]
    fn deref(&self) -> &T {
        match self.as_ref() {
            Some(value) => value,
            None => empty_deref::<T>(),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> DerefMut for UniquePtr<T, D> {
    /// # Panics
    ///
    /// Panics if the pointer is empty.
    #[inline]
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.as_mut() {
            Some(value) => value,
            None => empty_deref::<T>(),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> fmt::Pointer for UniquePtr<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.addr(), f)
    }
}

impl<T: ?Sized, D: Deleter<T>> fmt::Debug for UniquePtr<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UniquePtr").field(&self.addr()).finish()
    }
}

// -----------------------------------------------------------------------------
// Comparison
//
// Pointers compare by address only, across any pointee and deleter types.
// An empty pointer compares as the null address.

impl<T, D, U, E> PartialEq<UniquePtr<U, E>> for UniquePtr<T, D>
where
    T: ?Sized,
    U: ?Sized,
    D: Deleter<T>,
    E: Deleter<U>,
{
    #[inline]
    fn eq(&self, other: &UniquePtr<U, E>) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized, D: Deleter<T>> Eq for UniquePtr<T, D> {}

impl<T, D, U, E> PartialOrd<UniquePtr<U, E>> for UniquePtr<T, D>
where
    T: ?Sized,
    U: ?Sized,
    D: Deleter<T>,
    E: Deleter<U>,
{
    #[inline]
    fn partial_cmp(&self, other: &UniquePtr<U, E>) -> Option<Ordering> {
        Some(self.addr().cmp(&other.addr()))
    }
}

impl<T: ?Sized, D: Deleter<T>> Ord for UniquePtr<T, D> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl<T: ?Sized, D: Deleter<T>> Hash for UniquePtr<T, D> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

// -----------------------------------------------------------------------------
// Tests
