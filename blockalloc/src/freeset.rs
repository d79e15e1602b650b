//! The dual-indexed free-block set: one address-ordered list, one
//! size-ordered probabilistic skip structure, kept consistent as a
//! single abstraction so no caller can update one without the other.
use std::ptr::NonNull;

use blockalloc_base::config::SKIP_HEIGHT;
use blockalloc_base::Xorshift32;
use blockalloc_list::{Linked, List};

use crate::block::MainBlock;

type Key = (usize, usize);

fn key_of(block: &MainBlock) -> Key {
    (block.payload_size(), block as *const MainBlock as usize)
}

/// The free set's header bytes, exposed so `arena` can compute adjacency
/// and split thresholds without duplicating `size_of`.
pub fn header_bytes() -> usize {
    std::mem::size_of::<MainBlock>()
}

/// The address list plus size index over one arena's free blocks.
pub struct FreeSet {
    addr_list: List<MainBlock>,
    size_heads: [Option<NonNull<MainBlock>>; SKIP_HEIGHT],
    rng: Xorshift32,
}

impl FreeSet {
    /// An empty free set with the skip-height RNG reset to its seed.
    pub const fn new() -> Self {
        FreeSet {
            addr_list: List::new(),
            size_heads: [None; SKIP_HEIGHT],
            rng: Xorshift32::new(),
        }
    }

    /// The lowest-addressed free block, or `None` if the set is empty.
    pub fn head(&self) -> Option<NonNull<MainBlock>> {
        self.addr_list.head()
    }

    /// True if no blocks are free.
    pub fn is_empty(&self) -> bool {
        self.addr_list.is_empty()
    }

    /// An iterator over the address list, head to tail.
    ///
    /// # Safety
    /// Every linked block must be live and unmoved for the iterator's
    /// lifetime.
    pub unsafe fn iter_by_address(&self) -> blockalloc_list::Iter<'_, MainBlock> {
        unsafe { self.addr_list.iter() }
    }

    fn forward_at(&self, level: usize, cur: Option<NonNull<MainBlock>>) -> Option<NonNull<MainBlock>> {
        match cur {
            Some(n) => unsafe { n.as_ref() }.forward(level),
            None => self.size_heads[level],
        }
    }

    /// The predecessor at each level of the size index immediately before
    /// where `target` would be inserted.
    fn search(&self, target: Key) -> [Option<NonNull<MainBlock>>; SKIP_HEIGHT] {
        let mut update = [None; SKIP_HEIGHT];
        let mut cur: Option<NonNull<MainBlock>> = None;
        for level in (0..SKIP_HEIGHT).rev() {
            loop {
                let next = self.forward_at(level, cur);
                let advance = match next {
                    Some(n) => key_of(unsafe { n.as_ref() }) < target,
                    None => false,
                };
                if advance {
                    cur = next;
                } else {
                    break;
                }
            }
            update[level] = cur;
        }
        update
    }

    /// The smallest free block whose payload is at least `k` bytes,
    /// ties broken by lowest address; `None` if none qualifies.
    pub fn find_ge(&self, k: usize) -> Option<NonNull<MainBlock>> {
        let update = self.search((k, 0));
        self.forward_at(0, update[0])
    }

    /// The largest free block by `(size, address)`, or `None` if empty.
    pub fn find_max(&self) -> Option<NonNull<MainBlock>> {
        let mut cur: Option<NonNull<MainBlock>> = None;
        for level in (0..SKIP_HEIGHT).rev() {
            loop {
                match self.forward_at(level, cur) {
                    Some(n) => cur = Some(n),
                    None => break,
                }
            }
        }
        cur
    }

    fn size_index_insert(&mut self, mut node: NonNull<MainBlock>) {
        let height = {
            let h = self.rng.rand_height();
            unsafe { node.as_mut() }.mark_free(unsafe { node.as_ref() }.payload_size(), h as u8);
            h
        };
        let target = key_of(unsafe { node.as_ref() });
        let update = self.search(target);
        for level in 0..height {
            let next = self.forward_at(level, update[level]);
            unsafe { node.as_mut() }.set_forward(level, next);
            match update[level] {
                Some(mut u) => unsafe { u.as_mut() }.set_forward(level, Some(node)),
                None => self.size_heads[level] = Some(node),
            }
        }
    }

    fn size_index_remove(&mut self, node: NonNull<MainBlock>) {
        let target = key_of(unsafe { node.as_ref() });
        let update = self.search(target);
        let height = unsafe { node.as_ref() }.height() as usize;
        for level in 0..height {
            let next = unsafe { node.as_ref() }.forward(level);
            match update[level] {
                Some(mut u) => unsafe { u.as_mut() }.set_forward(level, next),
                None => self.size_heads[level] = next,
            }
        }
    }

    /// Remove `node` from both the address list and the size index. The
    /// caller takes ownership of the now fully-unlinked block (typically
    /// to mark it allocated, or to merge it into a larger free block).
    ///
    /// # Safety
    /// `node` must currently be a member of this free set.
    pub unsafe fn remove(&mut self, node: NonNull<MainBlock>) {
        self.size_index_remove(node);
        unsafe { self.addr_list.unlink(node) };
    }

    /// Address-list predecessor and successor of `addr`, found by linear
    /// scan (the one intentionally O(n) operation in this module — used
    /// only when freeing, never on the allocation hot path).
    fn neighbors_of(&self, addr: usize) -> (Option<NonNull<MainBlock>>, Option<NonNull<MainBlock>>) {
        let mut pred = None;
        let mut iter = unsafe { self.addr_list.iter() };
        for block in &mut iter {
            let block_addr = block as *const MainBlock as usize;
            if block_addr < addr {
                pred = Some(unsafe { NonNull::new_unchecked(block as *const MainBlock as *mut MainBlock) });
            } else {
                return (pred, Some(unsafe {
                    NonNull::new_unchecked(block as *const MainBlock as *mut MainBlock)
                }));
            }
        }
        (pred, None)
    }

    /// The address-list predecessor and successor of `node`, which must
    /// currently be a member. Used to capture a block's former neighbors
    /// before removing it, so a split's residual tail (or the next-fit
    /// rover) can be repositioned — O(1), read directly off `node`'s own
    /// link pointers rather than scanning the address list, since this
    /// runs on the allocation hot path for every policy.
    ///
    /// # Safety
    /// `node` must currently be a member of this free set's address list.
    pub(crate) unsafe fn member_neighbors(
        &self,
        node: NonNull<MainBlock>,
    ) -> (Option<NonNull<MainBlock>>, Option<NonNull<MainBlock>>) {
        let links = unsafe { node.as_ref() }.links();
        (links.prev(), links.next())
    }

    /// Insert `node` — known, via `after`, to belong immediately after a
    /// specific address-list member (or at the head if `after` is
    /// `None`) — into both structures. O(1) in the address list; used by
    /// the split path, which already knows the residual tail's position.
    ///
    /// # Safety
    /// `after`, if given, must be a current member of this free set;
    /// `node` must not currently be linked anywhere.
    pub unsafe fn insert_after(&mut self, after: Option<NonNull<MainBlock>>, node: NonNull<MainBlock>) {
        unsafe {
            match after {
                Some(after) => self.addr_list.insert_after(after, node),
                None => self.addr_list.push_front(node),
            }
        }
        self.size_index_insert(node);
    }

    /// Insert a freshly-freed, not-yet-linked `node` into the free set,
    /// coalescing it with any address-adjacent free neighbors first.
    ///
    /// Returns the survivor block — `node` itself unless it merged with
    /// its predecessor, in which case the predecessor survives at its
    /// original (lower) address.
    ///
    /// # Safety
    /// `node` must not currently be linked in either structure; it must
    /// already carry a correct free `payload_size` (its size-index
    /// height is reassigned here regardless of what it held before).
    pub unsafe fn coalesce_and_insert(&mut self, node: NonNull<MainBlock>) -> NonNull<MainBlock> {
        let header = header_bytes();
        let addr = node.as_ptr() as usize;
        let (pred, succ) = self.neighbors_of(addr);

        let mut survivor = node;
        let mut already_linked = false;

        if let Some(mut p) = pred {
            let p_end = p.as_ptr() as usize + header + unsafe { p.as_ref() }.payload_size();
            if p_end == addr {
                self.size_index_remove(p);
                let grown = unsafe { p.as_ref() }.payload_size()
                    + header
                    + unsafe { node.as_ref() }.payload_size();
                unsafe { p.as_mut() }.mark_free(grown, 0);
                survivor = p;
                already_linked = true;
            }
        }

        if let Some(s) = succ {
            let survivor_end =
                survivor.as_ptr() as usize + header + unsafe { survivor.as_ref() }.payload_size();
            if survivor_end == s.as_ptr() as usize {
                unsafe { self.remove(s) };
                let grown = unsafe { survivor.as_ref() }.payload_size()
                    + header
                    + unsafe { s.as_ref() }.payload_size();
                unsafe { survivor.as_mut() }.mark_free(grown, 0);
            }
        }

        if !already_linked {
            unsafe {
                match pred {
                    Some(p) => self.addr_list.insert_after(p, survivor),
                    None => self.addr_list.push_front(survivor),
                }
            }
        }

        self.size_index_insert(survivor);
        survivor
    }
}

#[cfg(test)]
impl FreeSet {
    /// All blocks reachable via the size index's bottom level, in
    /// ascending `(size, address)` order. Test-only, for checking the
    /// address list and size index agree on membership.
    pub(crate) fn size_index_members(&self) -> Vec<NonNull<MainBlock>> {
        let mut out = Vec::new();
        let mut cur = self.size_heads[0];
        while let Some(n) = cur {
            out.push(n);
            cur = unsafe { n.as_ref() }.forward(0);
        }
        out
    }

    /// All blocks reachable at `level` of the size index, for checking
    /// that forward traversal at every level is non-decreasing.
    pub(crate) fn size_index_level(&self, level: usize) -> Vec<NonNull<MainBlock>> {
        let mut out = Vec::new();
        let mut cur = self.size_heads[level];
        while let Some(n) = cur {
            out.push(n);
            cur = unsafe { n.as_ref() }.forward(level);
        }
        out
    }
}

impl Default for FreeSet {
    fn default() -> Self {
        Self::new()
    }
}
