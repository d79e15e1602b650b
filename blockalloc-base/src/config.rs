//! Compile-time tunables.
//!
//! Every constant here is fixed at build time by design: reproducible
//! fragmentation studies require that a given allocation trace always
//! produces the same placement decisions, which rules out a
//! runtime-configurable heap size or skip height.

/// Size, in bytes, of the main arena and of the buddy arena (each is an
/// independent mapping of this size).
pub const HEAP_BYTES: usize = 4096;

/// The smallest residual payload, in bytes, that still justifies
/// splitting a block rather than handing the whole thing to the caller.
pub const MIN_TAIL: usize = 32;

/// Maximum number of forward-link levels a size-index node may occupy.
pub const SKIP_HEIGHT: usize = 6;

/// Number of buddy free-list orders. The largest order, `MAX_ORDER - 1`,
/// is `2^(MAX_ORDER - 1) = 4096` bytes — the initial whole-arena block.
pub const MAX_ORDER: usize = 13;

/// Sentinel tagging a header as belonging to a free block.
pub const MAGIC_FREE: u32 = 0xF4EE_B10C;

/// Sentinel tagging a header as belonging to an allocated block.
pub const MAGIC_ALLOC: u32 = 0xA110_C8ED;
