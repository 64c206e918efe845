// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_at_known_epoch() {
    let clock = FakeClock::new();
    assert_eq!(clock.epoch_ms(), 1_000_000);
}

#[test]
fn fake_clock_advance_moves_both_timelines() {
    let clock = FakeClock::new();
    let before = clock.now();

    clock.advance(Duration::from_secs(5));

    assert_eq!(clock.now().duration_since(before), Duration::from_secs(5));
    assert_eq!(clock.epoch_ms(), 1_005_000);
}

#[test]
fn fake_clock_utc_tracks_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(1_700_000_000_000);

    let utc = clock.utc_now();
    assert_eq!(utc.timestamp_millis(), 1_700_000_000_000);
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::new();
    let other = clock.clone();

    clock.advance(Duration::from_millis(250));

    assert_eq!(other.epoch_ms(), 1_000_250);
}

#[test]
fn system_clock_epoch_is_plausible() {
    let clock = SystemClock;
    // Any time after 2020-01-01 is fine; this guards against unit mixups.
    assert!(clock.epoch_ms() > 1_577_836_800_000);
}
