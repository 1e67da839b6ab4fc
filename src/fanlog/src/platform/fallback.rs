// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Portable fallback implementations of the platform adapters, used on
//! targets without a Unix-style libc. Time is reported in UTC and no
//! distinct thread id is available, so the tid field of formatted output
//! stays empty.

use std::time::{SystemTime, UNIX_EPOCH};

use super::WallClock;

/// Without a known console protocol no styling bytes are emitted.
pub(crate) const CONSOLE_STYLING: bool = false;

/// The current time, in UTC for lack of zone information.
pub(crate) fn now() -> WallClock {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let secs = since_epoch.as_secs();
    let days = secs / 86_400;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(i64::try_from(days).unwrap_or(0));
    WallClock {
        year,
        month,
        day,
        hour: u32::try_from(rem / 3600).unwrap_or(0),
        minute: u32::try_from(rem % 3600 / 60).unwrap_or(0),
        second: u32::try_from(rem % 60).unwrap_or(0),
        millisecond: since_epoch.subsec_millis(),
        // The epoch was a Thursday.
        weekday: u32::try_from((days + 4) % 7).unwrap_or(0),
        utc_offset_minutes: 0,
    }
}

// Days-since-epoch to civil date (Gregorian calendar).
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year + 1 } else { year };
    (
        i32::try_from(year).unwrap_or(1970),
        u32::try_from(month).unwrap_or(1),
        u32::try_from(day).unwrap_or(1),
    )
}

/// The process id.
pub(crate) fn process_id() -> u32 {
    std::process::id()
}

/// No portable thread id exists; reporting the process id keeps the tid
/// field of formatted output empty.
pub(crate) fn thread_id() -> u32 {
    std::process::id()
}
