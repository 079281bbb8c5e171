//! Integration tests for entities_epoll_state crate
//!
//! These tests follow a descriptor state through a registration's life:
//! built from an `epoll_ctl` bitset, updated by classified I/O results.

use entities_epoll_state::*;

#[test]
fn test_state_follows_classified_reads() {
    let mut state = DescriptorState::from_events(Interest::EPOLLIN);

    // Nothing available yet
    if let Some(outcome) = classify_read(-1, libc::EAGAIN) {
        if outcome.is_activity() {
            state = state.with_in_activity();
        }
    }
    assert!(!state.had_in_ops_after_monitoring());

    // Interrupted calls are not recorded at all
    assert!(classify_read(-1, libc::EINTR).is_none());

    // Data arrives
    if let Some(outcome) = classify_read(128, 0) {
        if outcome.is_activity() {
            state = state.with_in_activity();
        }
    }
    assert!(state.had_in_ops_after_monitoring());
}

#[test]
fn test_reregistration_starts_fresh() {
    let state = DescriptorState::from_events(Interest::EPOLLIN | Interest::EPOLLOUT)
        .with_in_activity()
        .with_out_activity();

    let next = DescriptorState::from_events(Interest::EPOLLOUT);
    assert!(!state.loses_undrained_input(&next));
    assert!(!next.had_in_ops_after_monitoring());
    assert!(!next.had_out_ops_after_monitoring());
}

#[test]
fn test_raw_bits_roundtrip_through_interest() {
    let raw = (libc::EPOLLIN | libc::EPOLLET) as u32;
    let interest = Interest::from_bits_retain(raw);
    assert!(interest.is_readable());
    assert!(interest.is_edge_triggered());
    assert_eq!(interest.bits(), raw);
}

#[test]
fn test_write_error_counts_as_activity() {
    let state = DescriptorState::from_events(Interest::EPOLLOUT);
    let outcome = classify_write(-1, libc::EPIPE).unwrap();
    assert_eq!(outcome, WriteOutcome::Error);
    assert!(outcome.is_activity());
    let next = DescriptorState::from_events(Interest::empty());
    assert!(!state.with_out_activity().loses_unflushed_output(&next));
    assert!(state.loses_unflushed_output(&next));
}
