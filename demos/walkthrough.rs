use std::io::Read;

use brkalloc::RAllocator;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`,
/// `htop`, `gdb`, or just visually track how allocations change the
/// program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn main() {
  env_logger::init();

  let mut allocator = RAllocator::new();

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate space for a u32. Triggers the one-shot 128 KiB
  //    pre-allocation and carves a 4-byte (padded to 8) region off it.
  // --------------------------------------------------------------------
  unsafe {
    let first = allocator.allocate(4) as *mut u32;
    println!("\n[1] Allocate u32 -> {:p}", first);
    first.write(0xDEADBEEF);
    println!("[1] Value written = 0x{:X}", first.read());
  }
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 12 bytes; observe padding to the next 8-byte multiple.
  // --------------------------------------------------------------------
  let second;
  unsafe {
    second = allocator.allocate(12);
    println!("\n[2] Allocate 12 bytes -> {:p}", second);
    std::ptr::write_bytes(second, 0xAB, 12);
    println!("[2] Initialized second block with 0xAB");
  }
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Grow the first allocation; it can't grow in place (block 2 sits
  //    right after it), so this relocates and copies.
  // --------------------------------------------------------------------
  unsafe {
    let grown = allocator.resize(second, 512);
    println!("\n[3] Grow block 2 to 512 bytes -> {:p}", grown);
    allocator.release(grown);
  }
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) A request past the mapping threshold bypasses the heap entirely.
  // --------------------------------------------------------------------
  unsafe {
    let mapped = allocator.allocate(200_000);
    println!("\n[4] Allocate 200000 bytes (mapped) -> {:p}", mapped);
    allocator.release(mapped);
  }
}
