use core::ptr::NonNull;

/// Address-preserving conversion from a pointer to `Self` into a pointer to `U`.
///
/// This is what allows ownership of a concrete value to move into a
/// [`UniquePtr`](crate::UniquePtr) over a more general type, usually a
/// trait object. Every type converts to itself.
///
/// Implementations are normally generated by [`impl_upcast!`](crate::impl_upcast),
/// whose body is a plain unsized coercion.
///
/// # Safety
///
/// `upcast` must return a pointer to the same allocation, at the same address,
/// that is valid to use as a `U` for as long as it was valid as a `Self`.
/// Deleters rely on this to release the original allocation.
pub unsafe trait Upcast<U: ?Sized> {
    /// Converts the pointer.
    fn upcast(ptr: NonNull<Self>) -> NonNull<U>;
}

// SAFETY: identity.
unsafe impl<T: ?Sized> Upcast<T> for T {
    #[inline(always)]
    fn upcast(ptr: NonNull<T>) -> NonNull<T> {
        ptr
    }
}

/// Implements [`Upcast`] from a concrete type to one or more unsized targets.
///
/// The generated body relies on the compiler's unsized coercion, so the
/// address never changes and only metadata (a vtable or length) is attached.
///
/// # Examples
///
/// ```
/// use solo_ptr::{impl_upcast, UniquePtr};
/// use core::fmt::Debug;
///
/// trait Shape: Debug {
///     fn area(&self) -> f64;
/// }
///
/// #[derive(Debug)]
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 { self.0 * self.0 }
/// }
///
/// impl_upcast!(Square => dyn Shape, dyn Debug);
///
/// let square = UniquePtr::new(Square(2.0));
/// let addr = square.get();
///
/// let shape: UniquePtr<dyn Shape> = square.upcast();
/// assert_eq!(shape.area(), 4.0);
/// assert_eq!(shape.get().map(|p| p.cast::<u8>()), addr.map(|p| p.cast::<u8>()));
/// ```
#[macro_export]
macro_rules! impl_upcast {
    ($from:ty => $($to:ty),+ $(,)?) => {
        $(
            // SAFETY: unsized coercion keeps the data address.
            unsafe impl $crate::Upcast<$to> for $from {
                #[inline(always)]
                fn upcast(ptr: ::core::ptr::NonNull<Self>) -> ::core::ptr::NonNull<$to> {
                    ptr
                }
            }
        )+
    };
}
