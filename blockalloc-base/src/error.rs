//! Error taxonomy.
//!
//! [`AllocError`] is internal: every public `alloc_*` entry point in the
//! root crate collapses it to a null pointer, logging at `debug` level.
//! [`MapError`] is the one case allowed to reach the fatal path — a
//! failed OS mapping is not recoverable, because without it there is no
//! arena to serve anything from.

/// Why a single allocation attempt failed.
///
/// Never surfaced to callers directly; every public entry point maps
/// this to a null return. Allocation failure is a first-class,
/// recoverable outcome, not an error worth aborting over.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// A request for zero bytes is never satisfiable.
    #[error("requested size 0 is not a valid allocation")]
    ZeroSize,
    /// No free block (main arena) was large enough.
    #[error("no free block large enough for {requested} bytes")]
    NoFit {
        /// The payload size that was requested.
        requested: usize,
    },
    /// The buddy order required for the request exceeds `MAX_ORDER`.
    #[error("order for {requested} bytes exceeds MAX_ORDER")]
    OrderOutOfRange {
        /// The payload size that was requested.
        requested: usize,
    },
}

/// Why the OS anonymous-mapping primitive failed.
///
/// Unlike [`AllocError`], this is fatal: the bootstrapper that encounters
/// it logs and terminates the process, since there is no way to serve
/// any future request without a mapped arena.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    /// The underlying `mmap(2)` call failed.
    #[error("anonymous mapping of {len} bytes failed: {source}")]
    Mmap {
        /// The length, in bytes, that was requested.
        len: usize,
        /// The OS error reported by `mmap`.
        source: std::io::Error,
    },
}
