// ••• blockalloc: a placement-policy allocator over OS-mapped arenas
// --- released under the terms of the MIT license.
//
//! Shared building blocks for `blockalloc`'s arenas: compile-time
//! configuration, the OS anonymous-mapping primitive, the deterministic
//! PRNG used for skip-list heights, the error taxonomy, and the
//! strategy-identifier vocabulary shared between the main and buddy
//! allocators.
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod os;
pub mod rng;
pub mod strategy;

pub use error::{AllocError, MapError};
pub use rng::Xorshift32;
pub use strategy::Strategy;
