//! Compile-time tunables.
//!
//! None of these are runtime-configurable: the allocator has no config
//! file, no CLI, no environment variables (see the allocator's design
//! notes). They live here, centralized, the way [`crate::header::ALIGNMENT`]
//! keeps its alignment math in one place.

/// Payload alignment, in bytes. All returned pointers satisfy
/// `ptr % ALIGNMENT == 0`.
pub const ALIGNMENT: usize = 8;

/// Requests where `size + header size >= MMAP_THRESHOLD` bypass the heap
/// and are served directly from an anonymous mapping.
pub const MMAP_THRESHOLD: usize = 128 * 1024;

/// Size of the one-shot program-break pre-allocation.
pub const PREALLOC_SIZE: usize = 128 * 1024;
