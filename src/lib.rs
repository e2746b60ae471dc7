//! # rallocator - A Custom Memory Allocator Library
//!
//! This crate provides a general-purpose, user-space allocator that
//! replaces the standard `malloc`/`free`/`calloc`/`realloc` family with an
//! implementation built directly on the operating system's program-break
//! and anonymous-mapping primitives.
//!
//! ## Overview
//!
//! Small requests are served from a process-private heap grown with
//! `sbrk`; large requests bypass the heap entirely and go straight to an
//! anonymous `mmap`. The heap is managed with a classic best-fit,
//! split/coalesce block allocator:
//!
//! ```text
//!   Heap Memory (grows upward via sbrk):
//!
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                               │
//!   │                                                                    │
//!   │   ┌─────┬──────────┬─────┬──────────────┬─────┬──────────────┐    │
//!   │   │ A1  │   free    │ A2  │    free       │ A3  │    free      │    │
//!   │   └─────┴──────────┴─────┴──────────────┴─────┴──────────────┘    │
//!   │                                                    ▲               │
//!   │                                               Program Break        │
//!   └──────────────────────────────────────────────────────────────────┘
//!
//!   Freed regions are tracked on an address-sorted free list, reused by
//!   best-fit search, split when oversized, and coalesced with
//!   address-adjacent neighbours on every release.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rallocator
//!   ├── config     - Compile-time thresholds (alignment, mapping, pre-alloc)
//!   ├── error      - Fatal OS-primitive-failure taxonomy
//!   ├── header     - Block header model and alignment arithmetic
//!   ├── registry   - Address-ordered doubly linked block lists
//!   ├── heap       - Heap-break manager (best-fit, split, coalesce, extend)
//!   ├── mapping    - Anonymous-mapping manager for oversized requests
//!   ├── allocator  - Allocation policy front: RAllocator
//!   └── global     - GlobalAlloc adapter over one RAllocator instance
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rallocator::RAllocator;
//!
//! let mut allocator = RAllocator::new();
//!
//! unsafe {
//!     let ptr = allocator.allocate(64) as *mut u64;
//!     *ptr = 42;
//!     println!("Value: {}", *ptr);
//!     allocator.release(ptr as *mut u8);
//! }
//! ```
//!
//! ## Block Layout
//!
//! Each region, heap-backed or mapped, is prefixed by a fixed-size header:
//!
//! ```text
//!   Single Allocation:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ status          │  │  │                          │  │
//!   │  │ prev/next       │  │  │   N bytes, 8-aligned     │  │
//!   │  └─────────────────┘  │  │                          │  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! ## Features
//!
//! - **Best-fit reuse**: freed regions are tracked and reused, not
//!   abandoned.
//! - **Split and coalesce**: oversized reuse is split; adjacent frees are
//!   merged on every release.
//! - **Mapping passthrough**: requests at or above 128 KiB skip the heap
//!   entirely via `mmap`.
//! - **Proper alignment**: every payload is 8-byte aligned by
//!   construction.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: no synchronization primitives; a single
//!   logical owner must call the allocator.
//! - **No native `free` interop**: pointers from this allocator may only
//!   be released through its own interface.
//! - **Unix-only**: requires `libc`'s `sbrk`/`mmap`/`munmap`/`sysconf`.
//!
//! ## Safety
//!
//! This crate is inherently unsafe: it computes header addresses by
//! byte-offset arithmetic from payload pointers and back. All allocation
//! and deallocation operations require `unsafe` blocks.

pub mod config;
pub mod error;
mod header;
pub mod global;
mod heap;
mod mapping;
mod registry;
pub mod allocator;

pub use allocator::RAllocator;
pub use error::AllocatorError;
pub use global::GlobalRAllocator;
pub use header::{BlockStatus, HEADER_SIZE};
