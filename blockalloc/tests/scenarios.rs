//! Integration tests against the public API, exercising it the way an
//! external consumer (a benchmark harness, a trace replayer) would.
//!
//! All of this crate's state is process-wide, so every test here takes
//! a shared lock for its duration — cargo's default test harness runs
//! tests in one process across multiple threads, and without
//! serialization two tests would trample each other's arenas.
use std::sync::Mutex;

static SERIAL: Mutex<()> = Mutex::new(());

#[test]
fn boundary_b1_zero_size_is_rejected_by_every_policy() {
    let _guard = SERIAL.lock().unwrap();
    assert!(blockalloc::alloc_first(0).is_null());
    assert!(blockalloc::alloc_next(0).is_null());
    assert!(blockalloc::alloc_best(0).is_null());
    assert!(blockalloc::alloc_worst(0).is_null());
    assert!(blockalloc::alloc_buddy(0).is_null());
}

#[test]
fn boundary_b2_oversized_requests_return_null() {
    let _guard = SERIAL.lock().unwrap();
    assert!(blockalloc::alloc_first(1 << 20).is_null());
    assert!(blockalloc::alloc_buddy(1 << 20).is_null());
}

#[test]
fn scenario_s5_buddy_alloc_then_free_restores_capacity() {
    let _guard = SERIAL.lock().unwrap();
    let ptr = blockalloc::alloc_buddy(100);
    assert!(!ptr.is_null());
    blockalloc::free(ptr);

    // The arena must be able to satisfy a near-whole-arena request again
    // once the single order-(MAX_ORDER-1) block is restored.
    let whole = blockalloc::alloc_buddy(3000);
    assert!(!whole.is_null());
    blockalloc::free(whole);
}

#[test]
fn scenario_s6_freeing_a_foreign_pointer_does_not_disturb_later_allocations() {
    let _guard = SERIAL.lock().unwrap();
    let bogus = 0x2usize as *mut u8;
    blockalloc::free(bogus);

    let ptr = blockalloc::alloc_first(32);
    assert!(!ptr.is_null());
    blockalloc::free(ptr);
}

#[test]
fn r2_freeing_null_is_a_no_op() {
    let _guard = SERIAL.lock().unwrap();
    blockalloc::free(std::ptr::null_mut());
}

#[test]
fn r3_a_second_free_of_the_same_pointer_is_a_no_op() {
    let _guard = SERIAL.lock().unwrap();
    let ptr = blockalloc::alloc_first(48);
    assert!(!ptr.is_null());
    blockalloc::free(ptr);
    // The header's magic has already flipped to the free sentinel; a
    // second free must not panic or corrupt the arena.
    blockalloc::free(ptr);

    let next = blockalloc::alloc_first(48);
    assert!(!next.is_null());
    blockalloc::free(next);
}

#[test]
fn strategy_accessor_reports_the_last_attempted_policy() {
    let _guard = SERIAL.lock().unwrap();
    let _ = blockalloc::alloc_worst(16);
    assert_eq!(blockalloc::current_strategy(), blockalloc::Strategy::Worst);
    assert_eq!(blockalloc::strategy_name(blockalloc::Strategy::Worst), "worst");

    let _ = blockalloc::alloc_buddy(16);
    assert_eq!(blockalloc::current_strategy(), blockalloc::Strategy::Buddy);
}
