// ••• blockalloc: a placement-policy allocator over OS-mapped arenas
// --- released under the terms of the MIT license.
//
//! The power-of-two buddy allocator: an independent arena, mapped
//! separately from the main address-ordered heap, that splits and
//! merges blocks along `size = 1 << order` boundaries.
//!
//! Unlike the main arena's four address-ordered policies, the buddy
//! allocator never scans a free set by address: splitting always comes
//! from the smallest non-empty order at or above the request, and
//! merging always comes from an O(1) XOR computed against the arena
//! base. The per-order free lists only ever need head/pop and a single
//! predicate-based removal for the merge step.
#![deny(missing_docs)]

mod arena;
mod block;

pub use arena::{header_bytes, BuddyArena};
pub use block::BuddyBlock;

#[cfg(test)]
mod tests;
