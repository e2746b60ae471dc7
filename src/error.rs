//! Fatal OS-primitive failures.
//!
//! Per the allocator's error taxonomy there are three kinds of failure:
//! invalid input (handled by returning null/no-op, no type needed here),
//! OS primitive failure (fatal, modelled below), and internal
//! inconsistency (a programming error, caught with `debug_assert!` at the
//! call sites in [`crate::registry`] and [`crate::heap`]).
//!
//! Callers cannot observe an [`AllocatorError`]: there is no recovery
//! path, by design. It exists only so [`die`] has something structured to
//! log before aborting.

/// Reason the allocator is about to abort the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorError {
  /// `sbrk` was denied by the kernel (e.g. `RLIMIT_DATA` exceeded).
  BreakAdjustFailed,
  /// `mmap` was denied by the kernel.
  MappingFailed,
}

impl std::fmt::Display for AllocatorError {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    match self {
      AllocatorError::BreakAdjustFailed => write!(f, "program break adjustment failed"),
      AllocatorError::MappingFailed => write!(f, "anonymous mapping request failed"),
    }
  }
}

/// Logs `msg` and `err` at error level, then aborts the process.
///
/// This is the allocator's only response to OS primitive failure: there is
/// no recoverable path, and callers cannot observe the failure.
pub fn die(
  msg: &str,
  err: AllocatorError,
) -> ! {
  log::error!("{msg}: {err}");
  std::process::abort()
}
