//! The header written at the base of every buddy-arena block.
use blockalloc_base::config::{MAGIC_ALLOC, MAGIC_FREE};
use blockalloc_list::{Linked, Links};

/// A buddy block header, present at the base of both free and allocated
/// blocks.
///
/// `size` and `order` always agree (`size == 1 << order`); both are kept
/// because the free dispatcher and the split/merge logic each find one
/// more convenient than the other.
#[repr(C)]
pub struct BuddyBlock {
    magic: u32,
    is_free: bool,
    order: u8,
    size: usize,
    links: Links<BuddyBlock>,
}

unsafe impl Linked for BuddyBlock {
    fn links(&self) -> &Links<Self> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<Self> {
        &mut self.links
    }
}

impl BuddyBlock {
    /// Write a fresh free-block header of the given `order` at `*ptr`.
    ///
    /// # Safety
    /// `ptr` must point to at least `size_of::<BuddyBlock>()` writable
    /// bytes that are not concurrently observed through another
    /// reference.
    pub unsafe fn write_free(ptr: *mut BuddyBlock, order: u8) {
        unsafe {
            ptr.write(BuddyBlock {
                magic: MAGIC_FREE,
                is_free: true,
                order,
                size: 1usize << order,
                links: Links::default(),
            });
        }
    }

    /// This block's order.
    pub fn order(&self) -> u8 {
        self.order
    }

    /// This block's size in bytes (`1 << order`).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether this header currently reads as free.
    pub fn is_free(&self) -> bool {
        self.is_free
    }

    /// Whether this header currently reads as allocated.
    pub fn is_allocated(&self) -> bool {
        self.magic == MAGIC_ALLOC
    }

    /// Flip this header to the allocated state, updating both `magic`
    /// and its `is_free` mirror.
    pub fn mark_allocated(&mut self) {
        self.magic = MAGIC_ALLOC;
        self.is_free = false;
    }

    /// Flip this header to the free state at the given `order`,
    /// refreshing `size` to match.
    pub fn mark_free(&mut self, order: u8) {
        self.magic = MAGIC_FREE;
        self.is_free = true;
        self.order = order;
        self.size = 1usize << order;
    }
}
