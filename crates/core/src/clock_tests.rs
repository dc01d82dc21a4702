// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;

#[test]
fn fake_clock_advances_epoch_ms() {
    let clock = FakeClock::new();
    let before = clock.epoch_ms();
    clock.advance(Duration::from_secs(60));
    assert_eq!(clock.epoch_ms(), before + 60_000);
}

#[test]
fn fake_clock_today_reflects_epoch_ms() {
    let clock = FakeClock::new();
    clock.set_epoch_ms(0);
    assert_eq!(clock.today(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
}

#[test]
fn system_clock_today_is_not_epoch() {
    let clock = SystemClock;
    assert!(clock.today() > NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
}
