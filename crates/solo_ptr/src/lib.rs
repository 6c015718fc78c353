//! This crate provides [`UniquePtr`], a single-owner heap pointer whose
//! deletion policy is a type parameter.
//!
//! It behaves like `Box<T>` with two differences: it may be empty, and the
//! way the resource is released is pluggable.
//!
//! **UniquePtr**
//!
//! [`UniquePtr<T, D>`] owns at most one resource. Ownership only moves, never
//! copies. The deleter `D` runs exactly once on the owned address, when the
//! pointer is reset, reassigned or dropped; [`release`](UniquePtr::release)
//! gives the address back without running it.
//!
//! **Deleter**
//!
//! [`Deleter<T>`] is the deletion policy. [`DefaultDelete`] frees a `Box`
//! allocation, [`DropInPlace`] only runs the destructor, and any
//! `FnMut(NonNull<T>)` closure works as a custom policy.
//!
//! **Upcast**
//!
//! [`Upcast<U>`] moves ownership of a concrete value into a pointer over a
//! more general type, usually a trait object, without touching the address.
//! Use [`impl_upcast!`] to derive it through unsized coercion.
//!
//! # Examples
//!
//! ```
//! use solo_ptr::{impl_upcast, UniquePtr};
//!
//! trait Animal { fn speak(&self) -> &'static str; }
//!
//! struct Dog;
//! impl Animal for Dog { fn speak(&self) -> &'static str { "woof" } }
//! impl_upcast!(Dog => dyn Animal);
//!
//! let mut dog = UniquePtr::new(Dog);
//! let addr = dog.get().map(|p| p.cast::<u8>());
//!
//! let animal: UniquePtr<dyn Animal> = dog.take().upcast();
//! assert!(dog.is_null());
//! assert_eq!(animal.speak(), "woof");
//! assert_eq!(animal.get().map(|p| p.cast::<u8>()), addr);
//! ```
#![expect(unsafe_code, reason = "Owning raw addresses is inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod deleter;
mod error;
mod unique;
mod upcast;

#[cfg(feature = "serde")]
mod serde;

// -----------------------------------------------------------------------------
// Top-level exports

pub use deleter::{DefaultDelete, Deleter, DropInPlace};
pub use error::PtrError;
pub use unique::{UniquePtr, make_unique};
pub use upcast::Upcast;
