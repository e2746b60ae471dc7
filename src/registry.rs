//! Block registries: the two address-ordered, doubly linked lists of
//! blocks. One tracks `Free` blocks eligible for reuse, the other tracks
//! `Allocated`/`Mapped` blocks carved from the program break or mapped
//! directly.
//!
//! Both registries share the same intrusive-list machinery; only the
//! expected status differs, which is asserted on insert/remove so a
//! mismatch (a block on the wrong list) is caught in debug builds rather
//! than silently corrupting the other list.

use crate::header::BlockHeader;
use std::ptr;

/// An address-sorted, doubly linked intrusive list of blocks.
///
/// # Invariants
/// - Acyclic, strictly increasing by header address.
/// - A removed block has both links null.
/// - A block belongs to at most one registry at a time.
pub struct BlockList {
  head: *mut BlockHeader,
}

impl BlockList {
  pub const fn new() -> Self {
    Self { head: ptr::null_mut() }
  }

  pub fn head(&self) -> *mut BlockHeader {
    self.head
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_null()
  }

  /// Inserts `block` preserving address order. Scans from the head for
  /// the first entry with a greater address and splices `block` before it.
  ///
  /// # Safety
  /// `block` must not already be a member of any registry, and must not
  /// alias any block already in this list.
  pub unsafe fn insert(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      (*block).prev = ptr::null_mut();
      (*block).next = ptr::null_mut();

      if self.head.is_null() {
        self.head = block;
        return;
      }

      if (block as usize) < (self.head as usize) {
        (*block).next = self.head;
        (*self.head).prev = block;
        self.head = block;
        return;
      }

      let mut current = self.head;
      while !(*current).next.is_null() && ((*current).next as usize) < (block as usize) {
        current = (*current).next;
      }

      let successor = (*current).next;
      (*block).next = successor;
      (*block).prev = current;
      (*current).next = block;
      if !successor.is_null() {
        (*successor).prev = block;
      }
    }
  }

  /// Removes `block` from this registry, updating neighbours and, if
  /// `block` was the head, advancing the head to its successor.
  ///
  /// # Safety
  /// `block` must currently be a member of this registry.
  pub unsafe fn remove(
    &mut self,
    block: *mut BlockHeader,
  ) {
    unsafe {
      let prev = (*block).prev;
      let next = (*block).next;

      if !prev.is_null() {
        (*prev).next = next;
      } else {
        debug_assert!(self.head == block, "remove() called on block not at head with null prev");
        self.head = next;
      }

      if !next.is_null() {
        (*next).prev = prev;
      }

      (*block).prev = ptr::null_mut();
      (*block).next = ptr::null_mut();
    }
  }

  /// The member of this registry with the highest address, or null if
  /// empty.
  pub fn tail(&self) -> *mut BlockHeader {
    if self.head.is_null() {
      return ptr::null_mut();
    }
    let mut current = self.head;
    unsafe {
      while !(*current).next.is_null() {
        current = (*current).next;
      }
    }
    current
  }

  /// Iterates blocks in address order.
  pub fn iter(&self) -> BlockListIter {
    BlockListIter { current: self.head }
  }
}

pub struct BlockListIter {
  current: *mut BlockHeader,
}

impl Iterator for BlockListIter {
  type Item = *mut BlockHeader;

  fn next(&mut self) -> Option<*mut BlockHeader> {
    if self.current.is_null() {
      return None;
    }
    let item = self.current;
    self.current = unsafe { (*item).next };
    Some(item)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::header::{BlockHeader, BlockStatus};
  use std::alloc::{Layout, alloc, dealloc};

  unsafe fn make_block(size: usize) -> *mut BlockHeader {
    unsafe {
      let layout = Layout::from_size_align(std::mem::size_of::<BlockHeader>(), 8).unwrap();
      let mem = alloc(layout);
      BlockHeader::write(mem, size, BlockStatus::Free)
    }
  }

  unsafe fn free_block(block: *mut BlockHeader) {
    unsafe {
      let layout = Layout::from_size_align(std::mem::size_of::<BlockHeader>(), 8).unwrap();
      dealloc(block as *mut u8, layout);
    }
  }

  #[test]
  fn insert_keeps_address_order() {
    unsafe {
      let mut list = BlockList::new();
      let mut blocks: Vec<*mut BlockHeader> = (0..5).map(|i| make_block(i)).collect();
      blocks.sort_by_key(|b| *b as usize);

      // Insert in reverse address order to exercise the scan.
      for b in blocks.iter().rev() {
        list.insert(*b);
      }

      let collected: Vec<_> = list.iter().collect();
      assert_eq!(collected, blocks);

      for b in &blocks {
        list.remove(*b);
        free_block(*b);
      }
    }
  }

  #[test]
  fn remove_updates_neighbours_and_head() {
    unsafe {
      let mut list = BlockList::new();
      let mut blocks: Vec<*mut BlockHeader> = (0..3).map(|i| make_block(i)).collect();
      blocks.sort_by_key(|b| *b as usize);
      for b in &blocks {
        list.insert(*b);
      }

      list.remove(blocks[0]);
      assert!((*blocks[0]).prev.is_null());
      assert!((*blocks[0]).next.is_null());
      assert_eq!(list.head(), blocks[1]);

      list.remove(blocks[1]);
      list.remove(blocks[2]);
      assert!(list.is_empty());

      for b in &blocks {
        free_block(*b);
      }
    }
  }
}
