//! Mapping manager: services requests that exceed the mapping threshold
//! with anonymous, private, read-write virtual-memory mappings, bypassing
//! the heap entirely.

use crate::error::{AllocatorError, die};
use crate::header::{BlockHeader, BlockStatus, HEADER_SIZE, padded_size};
use crate::registry::BlockList;
use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void, mmap, munmap};
use std::ptr;

/// Requests a fresh anonymous mapping of `HEADER_SIZE + padded_size(n)`
/// bytes and writes a `Mapped` header at its base.
///
/// Unlike heap-allocated blocks, the stored size is the *unpadded*
/// requested size `n` — an intentional asymmetry the mapping manager's
/// own release path compensates for by recomputing padding. Inserts the
/// new block into `used_list`.
pub fn allocate(
  used_list: &mut BlockList,
  n: usize,
) -> *mut BlockHeader {
  let mapped_bytes = HEADER_SIZE + padded_size(n);
  let addr = unsafe {
    mmap(
      ptr::null_mut(),
      mapped_bytes,
      PROT_READ | PROT_WRITE,
      MAP_PRIVATE | MAP_ANONYMOUS,
      -1,
      0,
    )
  };
  if addr == MAP_FAILED {
    die("mmap failed to service a large allocation", AllocatorError::MappingFailed);
  }

  let header = unsafe { BlockHeader::write(addr as *mut u8, n, BlockStatus::Mapped) };
  unsafe { used_list.insert(header) };
  log::debug!("mapped {} bytes at {:p} for a {}-byte request", mapped_bytes, addr, n);
  header
}

/// Releases a `Mapped` block back to the OS. Padding is recomputed from
/// the stored (unpadded) size, matching [`allocate`]'s asymmetry.
///
/// # Safety
/// `header` must currently be a `Mapped` member of `used_list`.
pub unsafe fn release(
  used_list: &mut BlockList,
  header: *mut BlockHeader,
) {
  unsafe {
    debug_assert_eq!((*header).status, BlockStatus::Mapped);
    used_list.remove(header);
    let mapped_bytes = HEADER_SIZE + padded_size((*header).size);
    let rc = munmap(header as *mut c_void, mapped_bytes);
    debug_assert_eq!(rc, 0, "munmap failed on a block this allocator owns");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn allocate_and_release_round_trip() {
    let mut used = BlockList::new();
    let header = allocate(&mut used, 200_000);
    unsafe {
      assert_eq!((*header).status, BlockStatus::Mapped);
      assert_eq!((*header).size, 200_000);

      let payload = BlockHeader::payload_ptr(header);
      assert_eq!(payload as usize % 8, 0);
      ptr::write_bytes(payload, 0xAB, 200_000);

      release(&mut used, header);
      assert!(used.is_empty());
    }
  }
}
