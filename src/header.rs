//! Block header model and payload alignment arithmetic.
//!
//! Every region the allocator manages, heap-backed or mapped, is prefixed
//! by a [`BlockHeader`]. The header is manipulated exclusively through raw
//! pointers: there is no safe owning type over heap memory, because the
//! whole point of this allocator is manual, unsafe-core memory management.

use crate::config::ALIGNMENT;
use std::mem;
use std::ptr;

/// Tag distinguishing how a block's memory was obtained and whether it is
/// available for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockStatus {
  /// On the free list, eligible for best-fit reuse.
  Free,
  /// On the used list, carved from the program break.
  Allocated,
  /// On the used list, backed by its own anonymous mapping. Never
  /// transitions to any other status.
  Mapped,
}

/// Fixed-size metadata record prefixed to every block.
///
/// `size` never includes the header itself; it is the payload size,
/// already padded to a multiple of [`ALIGNMENT`] for `Allocated` blocks.
/// `Mapped` blocks are the one exception: they store the *unpadded*
/// requested size (see [`crate::mapping`]).
#[repr(C)]
pub struct BlockHeader {
  pub size: usize,
  pub status: BlockStatus,
  pub prev: *mut BlockHeader,
  pub next: *mut BlockHeader,
}

/// Size, in bytes, of [`BlockHeader`]. Asserted at compile time to be a
/// multiple of [`ALIGNMENT`], since the program break starts page-aligned
/// and every header must therefore land on an aligned address.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

const _: () = assert!(HEADER_SIZE % ALIGNMENT == 0, "BlockHeader must be alignment-sized");

/// Padding required to round `size` up to a multiple of [`ALIGNMENT`].
#[inline]
pub const fn padding(size: usize) -> usize {
  (ALIGNMENT - size % ALIGNMENT) % ALIGNMENT
}

/// `size` rounded up to a multiple of [`ALIGNMENT`].
#[inline]
pub const fn padded_size(size: usize) -> usize {
  size + padding(size)
}

impl BlockHeader {
  /// Writes a fresh header at `base`, with empty list links.
  ///
  /// # Safety
  /// `base` must point to at least `HEADER_SIZE` writable, aligned bytes.
  pub unsafe fn write(
    base: *mut u8,
    size: usize,
    status: BlockStatus,
  ) -> *mut BlockHeader {
    let header = base as *mut BlockHeader;
    unsafe {
      ptr::write(
        header,
        BlockHeader { size, status, prev: ptr::null_mut(), next: ptr::null_mut() },
      );
    }
    header
  }

  /// The payload pointer returned to callers for this header.
  #[inline]
  pub fn payload_ptr(header: *mut BlockHeader) -> *mut u8 {
    unsafe { (header as *mut u8).add(HEADER_SIZE) }
  }

  /// Recovers the header for a payload pointer previously handed to a
  /// caller. Inverse of [`BlockHeader::payload_ptr`].
  ///
  /// # Safety
  /// `payload` must have been produced by [`BlockHeader::payload_ptr`] on a
  /// header written by this allocator.
  #[inline]
  pub unsafe fn from_payload(payload: *mut u8) -> *mut BlockHeader {
    unsafe { payload.sub(HEADER_SIZE) as *mut BlockHeader }
  }

  /// Address of the first byte past this block's footprint
  /// (`header + HEADER_SIZE + size`) — where a contiguous neighbour would
  /// begin.
  #[inline]
  pub fn end_addr(header: *mut BlockHeader) -> usize {
    unsafe { header as usize + HEADER_SIZE + (*header).size }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn padding_rounds_up_to_multiple_of_eight() {
    assert_eq!(padding(0), 0);
    assert_eq!(padding(1), 7);
    assert_eq!(padding(7), 1);
    assert_eq!(padding(8), 0);
    assert_eq!(padding(9), 7);
  }

  #[test]
  fn padded_size_is_always_multiple_of_eight() {
    for s in 0..64usize {
      assert_eq!(padded_size(s) % ALIGNMENT, 0);
      assert!(padded_size(s) >= s);
    }
  }

  #[test]
  fn header_size_is_alignment_sized() {
    assert_eq!(HEADER_SIZE % ALIGNMENT, 0);
  }
}
