//! The free dispatcher: classifies a returned pointer by which arena's
//! range it falls in and whether its header currently reads allocated,
//! then routes it there. Anything else — null, foreign, a pointer whose
//! magic has already been flipped by a prior free — is silently ignored.
use std::ptr::NonNull;

use crate::state::{BUDDY_ARENA, MAIN_ARENA};

/// Reclaim a pointer previously returned by any `alloc_*` entry point.
///
/// A null pointer, a pointer into neither arena, or a pointer whose
/// header no longer reads as allocated (already freed, or foreign bytes
/// that happen to land in range) is a silent no-op — this allocator
/// never aborts or prints on misuse.
pub fn free(ptr: *mut u8) {
    let Some(ptr) = NonNull::new(ptr) else {
        return;
    };

    {
        let mut buddy = BUDDY_ARENA.lock();
        if buddy.contains(ptr.as_ptr()) {
            if buddy.looks_allocated(ptr) {
                unsafe { buddy.free(ptr) };
            } else {
                log::debug!("free: ignoring pointer with stale buddy-arena magic at {ptr:p}");
            }
            return;
        }
    }

    {
        let mut main = MAIN_ARENA.lock();
        if main.contains(ptr.as_ptr()) {
            if main.looks_allocated(ptr) {
                unsafe { main.free(ptr) };
            } else {
                log::debug!("free: ignoring pointer with stale main-arena magic at {ptr:p}");
            }
            return;
        }
    }

    log::debug!("free: ignoring foreign pointer at {ptr:p}");
}
