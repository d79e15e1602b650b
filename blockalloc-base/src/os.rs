//! The allocator's single point of contact with the operating system.
//!
//! `map_anonymous` is the one primitive every arena bootstraps from.
//! Everything above this module treats an arena's bytes as already-owned,
//! zero-initialized memory; it never calls into libc again.
use std::io;
use std::ptr::NonNull;

use crate::error::MapError;

/// Request a zero-initialized, private, anonymous mapping of `len` bytes.
///
/// The mapping is never unmapped by this crate — no reclamation of arena
/// pages back to the OS; it lives until the process exits.
pub fn map_anonymous(len: usize) -> Result<NonNull<u8>, MapError> {
    // SAFETY: `mmap` with `MAP_PRIVATE | MAP_ANONYMOUS` never reads from
    // `fd`/`offset`, and its return value is checked below before use.
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };

    if ptr == libc::MAP_FAILED {
        return Err(MapError::Mmap { len, source: io::Error::last_os_error() });
    }

    // Anonymous mappings are zero-filled by the kernel; callers rely on
    // this instead of writing zeroes themselves.
    Ok(NonNull::new(ptr as *mut u8).expect("mmap succeeded but returned a null pointer"))
}
