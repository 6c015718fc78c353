#![allow(unsafe_code, reason = "Tests hand raw allocations to `UniquePtr`.")]

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use solo_ptr::{DefaultDelete, Deleter, UniquePtr, impl_upcast};

/// Frees `Box` allocations and records the address of each one.
#[derive(Clone, Default)]
struct Recorder {
    deleted: Rc<RefCell<Vec<usize>>>,
}

impl Recorder {
    fn deleted(&self) -> Vec<usize> {
        self.deleted.borrow().clone()
    }
}

impl<T: ?Sized> Deleter<T> for Recorder {
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        self.deleted.borrow_mut().push(ptr.cast::<u8>().as_ptr().addr());
        unsafe { DefaultDelete.delete(ptr) };
    }
}

fn alloc<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

#[test]
fn release_then_move_then_drop() {
    let recorder = Recorder::default();

    let a = alloc(1u32);
    let mut p1 = unsafe { UniquePtr::from_raw_with_ref(a, &recorder) };
    assert_eq!(p1.release().map(NonNull::as_ptr), Some(a));
    assert!(p1.is_null());
    assert!(recorder.deleted().is_empty());

    let b = alloc(2u32);
    let mut p2 = unsafe { UniquePtr::from_raw_with_ref(b, &recorder) };
    let p3 = p2.take();
    assert!(p2.is_null());
    assert_eq!(p3.as_ptr(), b);

    drop(p3);
    assert_eq!(recorder.deleted(), [b.addr()]);

    drop(p1);
    drop(p2);
    assert_eq!(recorder.deleted(), [b.addr()]);

    drop(unsafe { Box::from_raw(a) });
}

trait Shape {
    fn sides(&self) -> u32;
}

struct Triangle([f32; 3]);

impl Shape for Triangle {
    fn sides(&self) -> u32 {
        self.0.len() as u32
    }
}

impl_upcast!(Triangle => dyn Shape);

#[test]
fn upcast_preserves_address() {
    let recorder = Recorder::default();
    let raw = alloc(Triangle([1.0, 1.0, 1.0]));

    let mut triangle = unsafe { UniquePtr::from_raw_with_ref(raw, &recorder) };
    let shape: UniquePtr<dyn Shape, Recorder> = triangle.take().upcast();

    assert!(triangle.is_null());
    assert_eq!(shape.get().map(|p| p.cast::<Triangle>().as_ptr()), Some(raw));
    assert_eq!(shape.sides(), 3);

    drop(shape);
    assert_eq!(recorder.deleted(), [raw.addr()]);
}

#[test]
fn upcast_empty_stays_empty() {
    let empty = UniquePtr::<Triangle>::null();
    let shape: UniquePtr<dyn Shape> = empty.upcast();
    assert!(shape.is_null());
}

#[test]
fn sorted_by_address() {
    let mut pointers: Vec<UniquePtr<u8>> = (0..8).map(UniquePtr::new).collect();
    pointers.push(UniquePtr::null());
    pointers.sort();

    assert!(pointers[0].is_null());
    assert!(pointers.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn deleter_panic_propagates() {
    let raw = alloc(0u8);
    let mut p = unsafe {
        UniquePtr::from_raw_with(raw, |ptr: NonNull<u8>| {
            drop(unsafe { Box::from_raw(ptr.as_ptr()) });
            panic!("deleter failed");
        })
    };

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| p.reset()));
    assert!(result.is_err());
    assert!(p.is_null());
}

/// Frees like `Recorder`, then panics when `fail` is set.
struct Failing {
    recorder: Recorder,
    fail: bool,
}

impl Failing {
    fn new(recorder: &Recorder, fail: bool) -> Self {
        Failing {
            recorder: recorder.clone(),
            fail,
        }
    }
}

impl Deleter<u8> for Failing {
    unsafe fn delete(&mut self, ptr: NonNull<u8>) {
        unsafe { self.recorder.delete(ptr) };
        if self.fail {
            panic!("deleter failed");
        }
    }
}

#[test]
fn deleter_panic_propagates_from_assign() {
    let recorder = Recorder::default();
    let (old, new) = (alloc(1u8), alloc(2u8));

    let mut target = unsafe { UniquePtr::from_raw_with(old, Failing::new(&recorder, true)) };
    let source = unsafe { UniquePtr::from_raw_with(new, Failing::new(&recorder, false)) };

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        target.assign(source);
    }));
    assert!(result.is_err());
    assert!(target.is_null());

    // The incoming pointer is dropped while unwinding and still deletes its resource once.
    assert_eq!(recorder.deleted(), [old.addr(), new.addr()]);
}

#[test]
fn deleter_panic_propagates_from_drop() {
    let recorder = Recorder::default();
    let raw = alloc(3u8);
    let p = unsafe { UniquePtr::from_raw_with(raw, Failing::new(&recorder, true)) };

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || drop(p)));
    assert!(result.is_err());
    assert_eq!(recorder.deleted(), [raw.addr()]);
}
