//! Thin [`GlobalAlloc`] adapter over a single, lazily constructed
//! [`RAllocator`] instance.
//!
//! This is the "public entry-point shim" the allocator's design
//! deliberately keeps out of its behavioural core: a one-line-per-method
//! translation from the `GlobalAlloc` trait to [`RAllocator`]'s own
//! methods. It carries no policy of its own.

use crate::allocator::RAllocator;
use std::alloc::{GlobalAlloc, Layout};
use std::cell::UnsafeCell;
use std::ptr;

/// Process-wide adapter wrapping one [`RAllocator`].
///
/// The allocator has exactly one logical owner (see the crate's
/// Non-goals: no thread safety). `Sync` is asserted here, not earned: a
/// program registering this as `#[global_allocator]` takes on the same
/// single-threaded obligation the rest of the crate does. There is no
/// lock, by design — adding one would be the coarse-grained mutual
/// exclusion the design notes describe as out of scope.
pub struct GlobalRAllocator {
  inner: UnsafeCell<Option<RAllocator>>,
}

impl GlobalRAllocator {
  pub const fn new() -> Self {
    Self { inner: UnsafeCell::new(None) }
  }

  #[allow(clippy::mut_from_ref)]
  unsafe fn get(&self) -> &mut RAllocator {
    unsafe {
      let slot = &mut *self.inner.get();
      slot.get_or_insert_with(RAllocator::new)
    }
  }
}

unsafe impl Sync for GlobalRAllocator {}

unsafe impl GlobalAlloc for GlobalRAllocator {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    debug_assert!(layout.align() <= 8, "this allocator only supports alignments up to 8 bytes");
    unsafe { self.get().allocate(layout.size()) }
  }

  unsafe fn dealloc(
    &self,
    ptr: *mut u8,
    _layout: Layout,
  ) {
    unsafe { self.get().release(ptr) }
  }

  unsafe fn realloc(
    &self,
    ptr: *mut u8,
    layout: Layout,
    new_size: usize,
  ) -> *mut u8 {
    debug_assert!(layout.align() <= 8, "this allocator only supports alignments up to 8 bytes");
    unsafe { self.get().resize(ptr, new_size) }
  }

  unsafe fn alloc_zeroed(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    debug_assert!(layout.align() <= 8, "this allocator only supports alignments up to 8 bytes");
    unsafe { self.get().zeroed_allocate(1, layout.size()) }
  }
}

impl Default for GlobalRAllocator {
  fn default() -> Self {
    Self::new()
  }
}

// Shares the real process break with `allocator`'s tests; see the note
// there about running with `--test-threads=1`.
#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn alloc_dealloc_round_trip() {
    let alloc = GlobalRAllocator::new();
    unsafe {
      let layout = Layout::new::<u64>();
      let p = alloc.alloc(layout) as *mut u64;
      assert!(!p.is_null());
      p.write(0x1122334455667788);
      assert_eq!(p.read(), 0x1122334455667788);
      alloc.dealloc(p as *mut u8, layout);
    }
  }

  #[test]
  fn dealloc_accepts_null_layout_arg_without_use() {
    let alloc = GlobalRAllocator::new();
    unsafe {
      alloc.dealloc(ptr::null_mut(), Layout::new::<u8>());
    }
  }
}
