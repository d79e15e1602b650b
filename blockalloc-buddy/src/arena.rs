//! The buddy arena: per-order free lists over a single OS-mapped region.
use std::mem::size_of;
use std::ptr::NonNull;

use blockalloc_base::config::{HEAP_BYTES, MAX_ORDER};
use blockalloc_base::{os, AllocError};
use blockalloc_list::List;

use crate::block::BuddyBlock;

/// Size, in bytes, of a buddy-block header.
pub fn header_bytes() -> usize {
    size_of::<BuddyBlock>()
}

/// The top order's block size — also the whole mapped arena's size.
const TOP_ORDER: u8 = (MAX_ORDER - 1) as u8;

/// The independent power-of-two buddy arena.
///
/// Lazily mapped on first use (`ensure_init`); never unmapped. A failed
/// OS mapping is treated as fatal and is handled inside `ensure_init`
/// rather than surfaced as a `Result`.
pub struct BuddyArena {
    base: Option<NonNull<u8>>,
    free_lists: [List<BuddyBlock>; MAX_ORDER],
}

// SAFETY: access is serialized by the caller under this crate's
// single-threaded usage contract; this crate performs no interior
// synchronization of its own.
unsafe impl Send for BuddyArena {}

impl Default for BuddyArena {
    fn default() -> Self {
        Self::new()
    }
}

impl BuddyArena {
    /// An arena with no backing mapping yet.
    pub const fn new() -> Self {
        BuddyArena {
            base: None,
            free_lists: [
                List::new(), List::new(), List::new(), List::new(),
                List::new(), List::new(), List::new(), List::new(),
                List::new(), List::new(), List::new(), List::new(),
                List::new(),
            ],
        }
    }

    /// Map the backing arena and install the initial order-`TOP_ORDER`
    /// free block, if this hasn't happened yet.
    pub fn ensure_init(&mut self) {
        if self.base.is_some() {
            return;
        }

        let base = match os::map_anonymous(HEAP_BYTES) {
            Ok(base) => base,
            Err(err) => {
                log::error!("buddy arena bootstrap failed: {err}");
                std::process::abort();
            }
        };

        log::debug!("buddy arena mapped at {:p}, {} bytes", base.as_ptr(), HEAP_BYTES);

        let block_ptr = base.as_ptr() as *mut BuddyBlock;
        unsafe {
            BuddyBlock::write_free(block_ptr, TOP_ORDER);
            self.free_lists[TOP_ORDER as usize].push_front(NonNull::new_unchecked(block_ptr));
        }
        self.base = Some(base);
    }

    /// The arena's base address, for alignment assertions in tests.
    #[cfg(test)]
    pub(crate) fn base_addr(&self) -> usize {
        self.base.unwrap().as_ptr() as usize
    }

    /// Whether `ptr` falls within this arena's mapped range.
    pub fn contains(&self, ptr: *mut u8) -> bool {
        match self.base {
            Some(base) => {
                let start = base.as_ptr() as usize;
                let addr = ptr as usize;
                addr >= start && addr < start + HEAP_BYTES
            }
            None => false,
        }
    }

    /// Whether `ptr`, read as a payload pointer into this arena, names a
    /// currently-allocated block. Used by the free dispatcher to decide
    /// whether an incoming pointer belongs here before committing to
    /// this arena's free path.
    pub fn looks_allocated(&self, ptr: NonNull<u8>) -> bool {
        let Some(base) = self.base else { return false };
        let start = base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        let header = header_bytes();
        if addr < start + header || addr >= start + HEAP_BYTES {
            return false;
        }
        let block_ptr = (addr - header) as *const BuddyBlock;
        unsafe { (*block_ptr).is_allocated() }
    }

    /// The minimal order whose block can hold `request` payload bytes
    /// plus a header, or `None` if that exceeds `MAX_ORDER`.
    fn order_for(request: usize) -> Option<u8> {
        let required = request.checked_add(header_bytes())?;
        (0..MAX_ORDER as u8).find(|&k| (1usize << k) >= required)
    }

    /// Allocate a block able to hold `request` payload bytes.
    pub fn alloc(&mut self, request: usize) -> Result<NonNull<u8>, AllocError> {
        if request == 0 {
            return Err(AllocError::ZeroSize);
        }
        let min_order = Self::order_for(request)
            .ok_or(AllocError::OrderOutOfRange { requested: request })?;

        self.ensure_init();

        let found_order = (min_order..MAX_ORDER as u8)
            .find(|&j| !self.free_lists[j as usize].is_empty())
            .ok_or(AllocError::NoFit { requested: request })?;

        let mut block = unsafe { self.free_lists[found_order as usize].pop_front() }.unwrap();

        // Split downward from `found_order` to `min_order`: each step
        // halves the block, pushes the upper half onto the next order
        // down, and recurses on the lower half.
        for order in (min_order..found_order).rev() {
            let lower = block;
            let half = 1usize << order;
            let upper_ptr = unsafe { (lower.as_ptr() as *mut u8).add(half) } as *mut BuddyBlock;
            unsafe {
                BuddyBlock::write_free(upper_ptr, order);
                self.free_lists[order as usize]
                    .push_front(NonNull::new_unchecked(upper_ptr));
                lower.as_ptr().write(BuddyBlock::new_in_place_free(order));
            }
            block = lower;
        }

        unsafe { (*block.as_ptr()).mark_allocated() };
        let header_bytes = header_bytes();
        let payload = unsafe { (block.as_ptr() as *mut u8).add(header_bytes) };
        log::debug!("buddy alloc: order {min_order}, {request} bytes at {payload:p}");
        Ok(unsafe { NonNull::new_unchecked(payload) })
    }

    /// Return the buddy of the order-`order` block at `block`, if one
    /// could exist. The top order's single block has none: it is the
    /// whole arena, with no sibling to pair against.
    fn buddy_of(&self, block: NonNull<BuddyBlock>, order: u8) -> Option<NonNull<BuddyBlock>> {
        if order == TOP_ORDER {
            return None;
        }
        let base = self.base? .as_ptr() as usize;
        let addr = block.as_ptr() as usize;
        let buddy_addr = base + ((addr - base) ^ (1usize << order));
        NonNull::new(buddy_addr as *mut BuddyBlock)
    }

    /// Free a previously allocated block whose payload pointer is `ptr`.
    ///
    /// # Safety
    /// `ptr` must be a pointer this arena previously returned from
    /// `alloc`, not already freed.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        let header_bytes = header_bytes();
        let block_ptr = unsafe { ptr.as_ptr().sub(header_bytes) } as *mut BuddyBlock;
        let mut block = unsafe { NonNull::new_unchecked(block_ptr) };
        let mut order = unsafe { block.as_ref() }.order();

        loop {
            match self.buddy_of(block, order) {
                Some(buddy_ptr) => {
                    let merged = unsafe {
                        self.free_lists[order as usize].remove_first(|candidate| {
                            std::ptr::eq(candidate as *const BuddyBlock, buddy_ptr.as_ptr())
                                && candidate.is_free()
                                && candidate.order() == order
                        })
                    };
                    match merged {
                        Some(buddy) => {
                            let survivor = std::cmp::min(block.as_ptr() as usize, buddy.as_ptr() as usize);
                            block = unsafe { NonNull::new_unchecked(survivor as *mut BuddyBlock) };
                            order += 1;
                        }
                        None => break,
                    }
                }
                None => break,
            }
        }

        unsafe { (*block.as_ptr()).mark_free(order) };
        unsafe { self.free_lists[order as usize].push_front(block) };
        log::debug!("buddy free: merged up to order {order}");
    }
}

impl BuddyBlock {
    /// Construct an in-place free header value for overwriting a block
    /// that is about to be halved (the lower half keeps living at the
    /// same address, just at a smaller order).
    fn new_in_place_free(order: u8) -> Self {
        BuddyBlock {
            magic: blockalloc_base::config::MAGIC_FREE,
            is_free: true,
            order,
            size: 1usize << order,
            links: blockalloc_list::Links::default(),
        }
    }
}
