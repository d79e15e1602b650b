// ••• blockalloc: a placement-policy allocator over OS-mapped arenas
// --- released under the terms of the MIT license.
//
//! A pedagogical user-space allocator modeling five classical
//! block-placement policies — first-fit, next-fit, best-fit, worst-fit,
//! and binary buddy — over two independent OS-anonymous-mapped arenas.
//!
//! Each policy has its own entry point so a caller (benchmark harness,
//! synthetic trace replayer) can observe the fragmentation, latency, and
//! placement behavior of a single strategy in isolation. A single
//! [`free`] entry point routes any returned pointer back to whichever
//! arena owns it.
//!
//! This crate carries no thread safety beyond what's needed to give its
//! process-wide state a safe `Sync` type (see [`state`]); callers must
//! serialize their own access.
#![deny(missing_docs)]

mod arena;
mod block;
mod dispatch;
mod freeset;
mod state;


pub use blockalloc_base::Strategy;
pub use dispatch::free;

use std::ptr::NonNull;

use blockalloc_base::AllocError;

fn collapse(result: Result<NonNull<u8>, AllocError>) -> *mut u8 {
    match result {
        Ok(ptr) => ptr.as_ptr(),
        Err(err) => {
            log::debug!("alloc failed: {err}");
            std::ptr::null_mut()
        }
    }
}

/// Allocate `n` bytes with first-fit: the first address-ordered free
/// block in the main arena large enough to hold the request.
///
/// Returns a null pointer on failure (`n == 0`, or no block large
/// enough); never mutates state beyond recording the strategy
/// identifier.
pub fn alloc_first(n: usize) -> *mut u8 {
    state::record_strategy(Strategy::First);
    collapse(state::MAIN_ARENA.lock().alloc(n, Strategy::First))
}

/// Allocate `n` bytes with next-fit: search forward from the rover,
/// wrapping at most once, in the main arena.
pub fn alloc_next(n: usize) -> *mut u8 {
    state::record_strategy(Strategy::Next);
    collapse(state::MAIN_ARENA.lock().alloc(n, Strategy::Next))
}

/// Allocate `n` bytes with best-fit: the smallest main-arena free block
/// large enough, ties broken by lowest address.
pub fn alloc_best(n: usize) -> *mut u8 {
    state::record_strategy(Strategy::Best);
    collapse(state::MAIN_ARENA.lock().alloc(n, Strategy::Best))
}

/// Allocate `n` bytes with worst-fit: the largest main-arena free block,
/// if it is large enough.
pub fn alloc_worst(n: usize) -> *mut u8 {
    state::record_strategy(Strategy::Worst);
    collapse(state::MAIN_ARENA.lock().alloc(n, Strategy::Worst))
}

/// Allocate `n` bytes from the independent power-of-two buddy arena,
/// rounding the request up to the smallest adequate order.
pub fn alloc_buddy(n: usize) -> *mut u8 {
    state::record_strategy(Strategy::Buddy);
    collapse(state::BUDDY_ARENA.lock().alloc(n))
}

/// The policy identifier recorded by the most recently invoked (or
/// attempted) `alloc_*` call. Defaults to [`Strategy::First`] before any
/// allocation has been attempted.
pub fn current_strategy() -> Strategy {
    *state::STRATEGY.lock()
}

/// A stable, human-readable name for a strategy identifier.
pub fn strategy_name(s: Strategy) -> &'static str {
    s.name()
}
