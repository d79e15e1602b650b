//! The main arena: one mapping, one address list, one size index, four
//! fit policies sharing the same split/merge core.
use std::ptr::NonNull;

use blockalloc_base::config::{HEAP_BYTES, MIN_TAIL};
use blockalloc_base::{os, AllocError, Strategy};

use crate::block::MainBlock;
use crate::freeset::{header_bytes, FreeSet};

/// The address-ordered main arena backing first/next/best/worst-fit.
pub struct MainArena {
    base: Option<NonNull<u8>>,
    free_set: FreeSet,
    rover: Option<NonNull<MainBlock>>,
}

// SAFETY: see `blockalloc_buddy::BuddyArena` — access is serialized by
// the caller under this crate's single-threaded usage contract.
unsafe impl Send for MainArena {}

impl Default for MainArena {
    fn default() -> Self {
        Self::new()
    }
}

impl MainArena {
    /// An arena with no backing mapping yet.
    pub const fn new() -> Self {
        MainArena { base: None, free_set: FreeSet::new(), rover: None }
    }

    /// Map the backing arena and install the initial whole-arena free
    /// block, if this hasn't happened yet.
    pub fn ensure_init(&mut self) {
        if self.base.is_some() {
            return;
        }

        let base = match os::map_anonymous(HEAP_BYTES) {
            Ok(base) => base,
            Err(err) => {
                log::error!("main arena bootstrap failed: {err}");
                std::process::abort();
            }
        };

        log::debug!("main arena mapped at {:p}, {} bytes", base.as_ptr(), HEAP_BYTES);

        let block_ptr = base.as_ptr() as *mut MainBlock;
        let payload_size = HEAP_BYTES - header_bytes();
        unsafe {
            MainBlock::write_free(block_ptr, payload_size, 0);
            let node = NonNull::new_unchecked(block_ptr);
            self.free_set.insert_after(None, node);
            self.rover = Some(node);
        }
        self.base = Some(base);
    }

    /// The underlying free set, for invariant checks in tests.
    #[cfg(test)]
    pub(crate) fn free_set(&self) -> &FreeSet {
        &self.free_set
    }

    /// The current next-fit rover, for invariant checks in tests.
    #[cfg(test)]
    pub(crate) fn rover(&self) -> Option<NonNull<MainBlock>> {
        self.rover
    }

    /// The arena's base address, for tests.
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
    /// currently-allocated block.
    pub fn looks_allocated(&self, ptr: NonNull<u8>) -> bool {
        let Some(base) = self.base else { return false };
        let start = base.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        let header = header_bytes();
        if addr < start + header || addr >= start + HEAP_BYTES {
            return false;
        }
        let block_ptr = (addr - header) as *const MainBlock;
        unsafe { (*block_ptr).is_allocated() }
    }

    fn find_first(&self, request: usize) -> Option<NonNull<MainBlock>> {
        unsafe { self.free_set.iter_by_address() }
            .find(|b| b.payload_size() >= request)
            .map(|b| unsafe { NonNull::new_unchecked(b as *const MainBlock as *mut MainBlock) })
    }

    fn find_next(&self, request: usize) -> Option<NonNull<MainBlock>> {
        let blocks: Vec<NonNull<MainBlock>> = unsafe { self.free_set.iter_by_address() }
            .map(|b| unsafe { NonNull::new_unchecked(b as *const MainBlock as *mut MainBlock) })
            .collect();
        if blocks.is_empty() {
            return None;
        }
        let start = match self.rover {
            Some(r) => blocks.iter().position(|&b| b == r).unwrap_or(0),
            None => 0,
        };
        (0..blocks.len())
            .map(|i| blocks[(start + i) % blocks.len()])
            .find(|b| unsafe { b.as_ref() }.payload_size() >= request)
    }

    fn find_worst(&self, request: usize) -> Option<NonNull<MainBlock>> {
        let candidate = self.free_set.find_max()?;
        if unsafe { candidate.as_ref() }.payload_size() >= request {
            Some(candidate)
        } else {
            None
        }
    }

    /// Allocate `request` payload bytes using the given policy.
    pub fn alloc(&mut self, request: usize, policy: Strategy) -> Result<NonNull<u8>, AllocError> {
        if request == 0 {
            return Err(AllocError::ZeroSize);
        }
        self.ensure_init();

        let selected = match policy {
            Strategy::First => self.find_first(request),
            Strategy::Next => self.find_next(request),
            Strategy::Best => self.free_set.find_ge(request),
            Strategy::Worst => self.find_worst(request),
            Strategy::Buddy => {
                unreachable!("the main arena never serves buddy-policy requests")
            }
        };
        let block = selected.ok_or(AllocError::NoFit { requested: request })?;

        let (prev, next) = unsafe { self.free_set.member_neighbors(block) };
        unsafe { self.free_set.remove(block) };

        let header = header_bytes();
        let total = header + unsafe { block.as_ref() }.payload_size();
        let needed = header + request;
        let split = total >= needed + header + MIN_TAIL;

        let tail = if split {
            let tail_ptr = unsafe { (block.as_ptr() as *mut u8).add(needed) } as *mut MainBlock;
            let tail_payload = total - needed - header;
            unsafe {
                MainBlock::write_free(tail_ptr, tail_payload, 0);
                let tail_node = NonNull::new_unchecked(tail_ptr);
                self.free_set.insert_after(prev, tail_node);
                (*block.as_ptr()).mark_allocated(request);
                Some(tail_node)
            }
        } else {
            unsafe {
                let whole = (*block.as_ptr()).payload_size();
                (*block.as_ptr()).mark_allocated(whole);
            }
            None
        };

        match policy {
            Strategy::First | Strategy::Next => {
                self.rover = tail.or(next).or_else(|| self.free_set.head());
            }
            Strategy::Best | Strategy::Worst => {}
            Strategy::Buddy => unreachable!(),
        }

        let payload = unsafe { (block.as_ptr() as *mut u8).add(header) };
        log::debug!("main alloc: {policy} policy, {request} bytes at {payload:p}");
        Ok(unsafe { NonNull::new_unchecked(payload) })
    }

    /// Free a previously allocated block whose payload pointer is `ptr`,
    /// coalescing it with address-adjacent free neighbors.
    ///
    /// # Safety
    /// `ptr` must be a pointer this arena previously returned from
    /// `alloc` and not already freed.
    pub unsafe fn free(&mut self, ptr: NonNull<u8>) {
        let header = header_bytes();
        let block_ptr = unsafe { ptr.as_ptr().sub(header) } as *mut MainBlock;
        let block = unsafe { NonNull::new_unchecked(block_ptr) };
        let payload_size = unsafe { block.as_ref() }.payload_size();
        unsafe { (*block_ptr).mark_free(payload_size, 0) };

        let survivor = unsafe { self.free_set.coalesce_and_insert(block) };

        // The rover only ever references free blocks, so it could not
        // have pointed at `block` itself (allocated until this call). If
        // it pointed at a neighbor that coalescing just absorbed, that
        // address now falls inside the survivor's grown range.
        if let Some(rover) = self.rover {
            let survivor_addr = survivor.as_ptr() as usize;
            let survivor_end = survivor_addr + header + unsafe { survivor.as_ref() }.payload_size();
            let absorbed = rover != survivor
                && (rover.as_ptr() as usize) >= survivor_addr
                && (rover.as_ptr() as usize) < survivor_end;
            if absorbed {
                self.rover = Some(survivor);
            }
        }
        if self.free_set.is_empty() {
            self.rover = None;
        } else if self.rover.is_none() {
            self.rover = self.free_set.head();
        }

        log::debug!("main free: {payload_size} bytes at {ptr:p}");
    }
}
