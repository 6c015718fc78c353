use thiserror::Error;

// -----------------------------------------------------------------------------
// Error

/// Errors reported by the checked accessors of [`UniquePtr`](crate::UniquePtr).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PtrError {
    #[error("`UniquePtr<{type_name}>` is empty and owns no value")]
    Empty { type_name: &'static str },

    #[error("a null address was given where an owned allocation is required")]
    Null,
}

impl PtrError {
    #[inline]
    pub(crate) fn empty<T: ?Sized>() -> Self {
        PtrError::Empty {
            type_name: core::any::type_name::<T>(),
        }
    }
}
