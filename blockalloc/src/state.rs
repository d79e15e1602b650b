//! Process-wide singleton state.
//!
//! Neither arena nor the strategy identifier is exposed as a bare
//! `static mut`; each lives behind a `spin::Mutex`, lazily populated on
//! first use of the family of operations that touches it. A spinlock
//! that is never actually contended under this crate's single-threaded
//! usage contract is simply the cheapest legal way to give a `static`
//! `Sync` interior mutability — not a concurrency feature.
use blockalloc_base::Strategy;
use blockalloc_buddy::BuddyArena;
use spin::Mutex;

use crate::arena::MainArena;

/// The main address-ordered arena, shared by first/next/best/worst-fit.
pub static MAIN_ARENA: Mutex<MainArena> = Mutex::new(MainArena::new());

/// The independent power-of-two buddy arena.
pub static BUDDY_ARENA: Mutex<BuddyArena> = Mutex::new(BuddyArena::new());

/// The identifier of the most recently invoked (or attempted) policy.
pub static STRATEGY: Mutex<Strategy> = Mutex::new(Strategy::First);

/// Record which policy just ran, regardless of whether it succeeded.
pub fn record_strategy(s: Strategy) {
    *STRATEGY.lock() = s;
}
