//! The header written at the base of every main-arena block.
use blockalloc_base::config::{MAGIC_ALLOC, MAGIC_FREE, SKIP_HEIGHT};
use blockalloc_list::{Linked, Links};
use std::ptr::NonNull;

/// A main-arena block header, present at the base of both free and
/// allocated blocks.
///
/// A free block participates in two structures at once: the address list
/// (via `addr_links`, inherited through [`Linked`]) and the size index
/// (via `forward`, this type's own up-to-`SKIP_HEIGHT` forward pointers).
/// An allocated block's `forward` and `addr_links` are both stale and
/// must not be read until the block is freed and reinitialized.
#[repr(C)]
pub struct MainBlock {
    magic: u32,
    is_free: bool,
    height: u8,
    payload_size: usize,
    addr_links: Links<MainBlock>,
    forward: [Option<NonNull<MainBlock>>; SKIP_HEIGHT],
}

unsafe impl Linked for MainBlock {
    fn links(&self) -> &Links<Self> {
        &self.addr_links
    }

    fn links_mut(&mut self) -> &mut Links<Self> {
        &mut self.addr_links
    }
}

impl MainBlock {
    /// Write a fresh free-block header with the given `payload_size` and
    /// size-index `height` at `*ptr`.
    ///
    /// # Safety
    /// `ptr` must point to at least `size_of::<MainBlock>()` writable
    /// bytes that are not concurrently observed through another reference.
    pub unsafe fn write_free(ptr: *mut MainBlock, payload_size: usize, height: u8) {
        unsafe {
            ptr.write(MainBlock {
                magic: MAGIC_FREE,
                is_free: true,
                height,
                payload_size,
                addr_links: Links::default(),
                forward: [None; SKIP_HEIGHT],
            });
        }
    }

    /// Number of usable payload bytes following this header.
    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Number of size-index levels this block currently participates in.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether this header currently reads as free.
    pub fn is_free(&self) -> bool {
        self.is_free
    }

    /// Whether this header currently reads as allocated.
    pub fn is_allocated(&self) -> bool {
        self.magic == MAGIC_ALLOC
    }

    /// This block's forward pointer at `level`, or `None` above its height.
    pub fn forward(&self, level: usize) -> Option<NonNull<MainBlock>> {
        self.forward[level]
    }

    /// Set this block's forward pointer at `level`.
    pub fn set_forward(&mut self, level: usize, next: Option<NonNull<MainBlock>>) {
        self.forward[level] = next;
    }

    /// Flip this header to the allocated state, recording the
    /// caller-visible size actually assigned.
    ///
    /// Address-list and size-index links are left as-is; they are dead
    /// once `is_free` is false and must not be read again until this
    /// block is freed and rewritten.
    pub fn mark_allocated(&mut self, payload_size: usize) {
        self.magic = MAGIC_ALLOC;
        self.is_free = false;
        self.payload_size = payload_size;
    }

    /// Flip this header back to the free state at the given
    /// `payload_size`/`height`, clearing any stale forward pointers.
    pub fn mark_free(&mut self, payload_size: usize, height: u8) {
        self.magic = MAGIC_FREE;
        self.is_free = true;
        self.payload_size = payload_size;
        self.height = height;
        self.forward = [None; SKIP_HEIGHT];
    }
}
