//! Allocation policy front: the decision layer for `allocate`, `release`,
//! `zeroed_allocate` and `resize`, which routes each call to the
//! heap-break manager or the mapping manager and orchestrates
//! split/coalesce/relocation.

use crate::config::MMAP_THRESHOLD;
use crate::header::{BlockHeader, BlockStatus, HEADER_SIZE, padded_size};
use crate::heap;
use crate::mapping;
use crate::registry::BlockList;
use std::ptr;

/// A single, process-private heap managed by this allocator.
///
/// Not thread-safe: the allocator has exactly one logical owner. Two
/// lists track every live block (`free_list`, `used_list`); `heap_end`
/// tracks the current program break as last observed by this instance, so
/// "is this the last heap block" can be answered without an extra
/// syscall.
pub struct RAllocator {
  free_list: BlockList,
  used_list: BlockList,
  heap_initialized: bool,
  heap_end: usize,
  /// Mapping threshold used by [`RAllocator::zeroed_allocate`]; cached at
  /// construction since it is a single lazily-queried OS constant.
  page_size: usize,
}

impl RAllocator {
  pub fn new() -> Self {
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    Self {
      free_list: BlockList::new(),
      used_list: BlockList::new(),
      heap_initialized: false,
      heap_end: 0,
      page_size,
    }
  }

  /// Allocates `n` bytes, routing to the heap or to a fresh mapping based
  /// on the 128 KiB mapping threshold. Returns null for `n == 0`.
  pub fn allocate(
    &mut self,
    n: usize,
  ) -> *mut u8 {
    self.allocate_with_threshold(n, MMAP_THRESHOLD)
  }

  /// Allocates `count * element_size` zeroed bytes, using the OS page
  /// size as the mapping threshold instead of the 128 KiB default. Returns
  /// null if either argument is zero or the product overflows.
  pub fn zeroed_allocate(
    &mut self,
    count: usize,
    element_size: usize,
  ) -> *mut u8 {
    if count == 0 || element_size == 0 {
      return ptr::null_mut();
    }
    let Some(total) = count.checked_mul(element_size) else {
      return ptr::null_mut();
    };

    let payload = self.allocate_with_threshold(total, self.page_size);
    if !payload.is_null() {
      unsafe { ptr::write_bytes(payload, 0, total) };
    }
    payload
  }

  /// Releases a previously allocated block. Null is a no-op.
  pub fn release(
    &mut self,
    p: *mut u8,
  ) {
    if p.is_null() {
      return;
    }
    let header = unsafe { BlockHeader::from_payload(p) };
    match unsafe { (*header).status } {
      BlockStatus::Allocated => {
        unsafe {
          self.used_list.remove(header);
          (*header).status = BlockStatus::Free;
          self.free_list.insert(header);
        }
        heap::coalesce(&mut self.free_list);
      }
      BlockStatus::Mapped => unsafe { mapping::release(&mut self.used_list, header) },
      BlockStatus::Free => {
        debug_assert!(false, "release() called on an already-free block (double free)");
      }
    }
  }

  /// Resizes the block at `p` to hold `n` bytes, per the ten-branch
  /// decision tree: no-op, in-place shrink with tail split, in-place
  /// growth into a free/empty successor, extension of the break if the
  /// block is the last heap allocation, or fresh allocate-and-copy.
  pub fn resize(
    &mut self,
    p: *mut u8,
    n: usize,
  ) -> *mut u8 {
    // 1. p == null: equivalent to allocate(n, 128 KiB).
    if p.is_null() {
      return self.allocate_with_threshold(n, MMAP_THRESHOLD);
    }
    // 2. n == 0: equivalent to release(p); return null.
    if n == 0 {
      self.release(p);
      return ptr::null_mut();
    }

    let header = unsafe { BlockHeader::from_payload(p) };

    // 3. Header is Free: resize of a free block fails.
    if unsafe { (*header).status } == BlockStatus::Free {
      return ptr::null_mut();
    }

    let n_padded = padded_size(n);
    let old_size = unsafe { (*header).size };

    // 4. Stored payload size equals n + padding(n): no-op.
    if old_size == n_padded {
      return p;
    }

    // 5. Header is Mapped: always relocate.
    if unsafe { (*header).status } == BlockStatus::Mapped {
      return self.relocate(p, header, old_size, n);
    }

    if n_padded < old_size {
      // 6. Shrink in place.
      self.shrink_in_place(header, old_size, n_padded);
      return p;
    }

    // Growing an Allocated block: n_padded > old_size from here on.
    match self.next_block(header) {
      Some(next) => {
        let next_addr = next as usize;
        let grown_end = header as usize + HEADER_SIZE + n_padded;

        // 7. Pure gap between this block and its neighbour.
        if grown_end < next_addr {
          unsafe { (*header).size = n_padded };
          return p;
        }

        let next_is_free = unsafe { (*next).status } == BlockStatus::Free;
        let next_end = unsafe { next_addr + HEADER_SIZE + (*next).size };

        // 9. Absorb (part of) a free successor.
        if next_is_free && grown_end <= next_end {
          unsafe {
            self.free_list.remove(next);
            let leftover = next_end - grown_end;
            if leftover > HEADER_SIZE + 1 {
              let remainder_base = grown_end as *mut u8;
              let remainder_header =
                BlockHeader::write(remainder_base, leftover - HEADER_SIZE, BlockStatus::Free);
              self.free_list.insert(remainder_header);
              (*header).size = n_padded;
            } else {
              (*header).size = n_padded + leftover;
            }
          }
          return p;
        }

        // Neither a usable gap nor an absorbable free neighbour.
        self.relocate(p, header, old_size, n)
      }
      // 8. No higher-address heap neighbour: this is the last heap
      // allocation, extend the break in place.
      None => {
        self.heap_end = heap::extend_break_for_resize(header, self.heap_end, n_padded);
        p
      }
    }
  }

  fn allocate_with_threshold(
    &mut self,
    n: usize,
    threshold: usize,
  ) -> *mut u8 {
    if n == 0 {
      return ptr::null_mut();
    }

    let header = if n + HEADER_SIZE < threshold {
      self.heap_allocate(n)
    } else {
      mapping::allocate(&mut self.used_list, n)
    };

    BlockHeader::payload_ptr(header)
  }

  fn heap_allocate(
    &mut self,
    n: usize,
  ) -> *mut BlockHeader {
    if !self.heap_initialized {
      self.heap_end = heap::preallocate(&mut self.free_list);
      self.heap_initialized = true;
    }

    let n_padded = padded_size(n);

    if let Some(block) = heap::find_fit(&mut self.free_list, n_padded) {
      heap::split(block, n_padded, &mut self.free_list);
      unsafe { self.used_list.insert(block) };
      return block;
    }

    if let Some((block, new_end)) = heap::extend_last_free(&mut self.free_list, self.heap_end, n_padded) {
      self.heap_end = new_end;
      unsafe { self.used_list.insert(block) };
      return block;
    }

    let (block, new_end) = heap::fresh_extend(&mut self.used_list, self.heap_end, n_padded);
    self.heap_end = new_end;
    block
  }

  fn shrink_in_place(
    &mut self,
    header: *mut BlockHeader,
    old_size: usize,
    n_padded: usize,
  ) {
    unsafe {
      if old_size - n_padded > HEADER_SIZE + 1 {
        let tail_base = (header as *mut u8).add(HEADER_SIZE + n_padded);
        let tail_header =
          BlockHeader::write(tail_base, old_size - n_padded - HEADER_SIZE, BlockStatus::Free);
        self.free_list.insert(tail_header);
        (*header).size = n_padded;
      }
      // else: keep the block at its current (larger) stored size.
    }
  }

  fn relocate(
    &mut self,
    p: *mut u8,
    header: *mut BlockHeader,
    old_size: usize,
    n: usize,
  ) -> *mut u8 {
    let new_ptr = self.allocate_with_threshold(n, MMAP_THRESHOLD);
    unsafe {
      ptr::copy_nonoverlapping(p, new_ptr, old_size.min(n));
    }
    let _ = header;
    self.release(p);
    new_ptr
  }

  /// Nearest block of lowest address strictly greater than `header`,
  /// scanning both registries. `Mapped` blocks are excluded: their
  /// addresses come from an unrelated mapping and are never heap-adjacent,
  /// so letting one shadow the real heap neighbour (or the lack of one)
  /// would make the gap/last-allocation checks above observe unmapped
  /// address space as if it were a "next" block.
  fn next_block(
    &self,
    header: *mut BlockHeader,
  ) -> Option<*mut BlockHeader> {
    let addr = header as usize;
    let mut best: Option<*mut BlockHeader> = None;

    let candidates = self.used_list.iter().chain(self.free_list.iter());
    for candidate in candidates {
      if unsafe { (*candidate).status } == BlockStatus::Mapped {
        continue;
      }
      let caddr = candidate as usize;
      if caddr > addr && best.map_or(true, |b| caddr < b as usize) {
        best = Some(candidate);
      }
    }
    best
  }
}

impl Default for RAllocator {
  fn default() -> Self {
    Self::new()
  }
}

// These tests each construct their own `RAllocator`, but all share the
// one real program break the OS gives this process (`sbrk` has no
// per-instance namespacing). Run with `cargo test -- --test-threads=1`;
// the crate itself has no thread-safety story to lean on here (see the
// Non-goals), so neither do its own tests.
#[cfg(test)]
mod tests {
  use super::*;

  fn is_aligned(p: *mut u8) -> bool {
    (p as usize) % 8 == 0
  }

  fn block_size(p: *mut u8) -> usize {
    let header = unsafe { BlockHeader::from_payload(p) };
    unsafe { (*header).size }
  }

  #[test]
  fn allocate_zero_returns_null() {
    let mut a = RAllocator::new();
    assert!(a.allocate(0).is_null());
  }

  #[test]
  fn first_small_alloc_preallocates_and_splits() {
    let mut a = RAllocator::new();
    let p = a.allocate(100);
    assert!(!p.is_null());
    assert!(is_aligned(p));
    assert_eq!(block_size(p), padded_size(100));
  }

  #[test]
  fn split_then_free_then_coalesce_restores_single_free_block() {
    let mut a = RAllocator::new();
    let before = a.allocate(1); // trigger pre-allocation
    a.release(before);

    let x = a.allocate(200);
    let y = a.allocate(200);
    a.release(x);
    a.release(y);

    // Adjacent frees coalesce into one block, so the next request is
    // satisfied from its front, landing back at x's address.
    let after = a.allocate(1);
    assert_eq!(after, x);
    a.release(after);
  }

  #[test]
  fn mapping_path_for_large_allocations() {
    let mut a = RAllocator::new();

    let p = a.allocate(200_000);
    assert!(!p.is_null());
    assert!(is_aligned(p));
    assert_eq!(block_size(p), 200_000);

    a.release(p);
  }

  #[test]
  fn zeroed_allocate_zeroes_payload_and_stays_on_heap() {
    let mut a = RAllocator::new();
    let p = a.zeroed_allocate(10, 10);
    assert!(!p.is_null());
    unsafe {
      for i in 0..100 {
        assert_eq!(*p.add(i), 0);
      }
    }
  }

  #[test]
  fn zeroed_allocate_boundary_cases_return_null() {
    let mut a = RAllocator::new();
    assert!(a.zeroed_allocate(0, 10).is_null());
    assert!(a.zeroed_allocate(10, 0).is_null());
  }

  #[test]
  fn resize_grow_into_trailing_free_reuses_pointer() {
    let mut a = RAllocator::new();
    let x = a.allocate(100);
    let y = a.allocate(100);
    a.release(y);

    let grown = a.resize(x, 300);
    assert_eq!(grown, x);
    assert_eq!(block_size(grown), padded_size(300));
  }

  #[test]
  fn resize_grow_past_break_extends_in_place() {
    let mut a = RAllocator::new();
    let x = a.allocate(100);
    let grown = a.resize(x, 500);
    assert_eq!(grown, x);
  }

  #[test]
  fn resize_null_is_allocate() {
    let mut a = RAllocator::new();
    let p = a.resize(ptr::null_mut(), 64);
    assert!(!p.is_null());
  }

  #[test]
  fn resize_to_zero_releases_and_returns_null() {
    let mut a = RAllocator::new();
    let p = a.allocate(64);
    assert!(a.resize(p, 0).is_null());
    // The block is back on the free list: a same-size request reuses it.
    let reused = a.allocate(64);
    assert_eq!(reused, p);
  }

  #[test]
  fn resize_noop_when_already_that_size() {
    let mut a = RAllocator::new();
    let p = a.allocate(64);
    assert_eq!(a.resize(p, 64), p);
  }

  #[test]
  fn resize_of_free_block_fails() {
    let mut a = RAllocator::new();
    let p = a.allocate(64);
    a.release(p);
    assert!(a.resize(p, 128).is_null());
  }

  #[test]
  fn resize_shrink_splits_tail_into_free_block() {
    let mut a = RAllocator::new();
    let p = a.allocate(400);
    let shrunk = a.resize(p, 16);
    assert_eq!(shrunk, p);
    assert_eq!(block_size(p), padded_size(16));

    // The split tail is large enough to satisfy a fresh request in place.
    let tail = a.allocate(200);
    assert!(!tail.is_null());
    assert!(tail as usize > p as usize);
  }

  #[test]
  fn release_null_is_noop() {
    let mut a = RAllocator::new();
    a.release(ptr::null_mut());
  }
}
