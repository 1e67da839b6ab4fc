// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Unix implementations of the platform adapters.

use super::WallClock;

/// Unix consoles take in-band ANSI escape sequences.
pub(crate) const CONSOLE_STYLING: bool = true;

/// The current local time with millisecond resolution.
pub(crate) fn now() -> WallClock {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid out-pointer for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts) };
    if rc != 0 {
        ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
    }

    // SAFETY: the all-zero bit pattern is a valid `libc::tm`.
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    // SAFETY: `tm` is a valid out-pointer; on failure it keeps its zeroed
    // contents, which render as the epoch.
    unsafe { libc::localtime_r(&ts.tv_sec, &mut tm) };

    WallClock {
        year: tm.tm_year + 1900,
        month: u32::try_from(tm.tm_mon + 1).unwrap_or(1),
        day: u32::try_from(tm.tm_mday).unwrap_or(1),
        hour: u32::try_from(tm.tm_hour).unwrap_or(0),
        minute: u32::try_from(tm.tm_min).unwrap_or(0),
        second: u32::try_from(tm.tm_sec).unwrap_or(0),
        millisecond: u32::try_from(ts.tv_nsec / 1_000_000).unwrap_or(0),
        weekday: u32::try_from(tm.tm_wday).unwrap_or(0),
        utc_offset_minutes: i32::try_from(tm.tm_gmtoff / 60).unwrap_or(0),
    }
}

/// The process id.
pub(crate) fn process_id() -> u32 {
    std::process::id()
}

/// The kernel thread id of the calling thread. Equal to the process id on
/// the process's first thread.
#[cfg(target_os = "linux")]
pub(crate) fn thread_id() -> u32 {
    // SAFETY: gettid has no preconditions and cannot fail.
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    u32::try_from(tid).unwrap_or(0)
}

/// The thread id of the calling thread.
#[cfg(not(target_os = "linux"))]
pub(crate) fn thread_id() -> u32 {
    // SAFETY: pthread_self has no preconditions and cannot fail.
    let tid = unsafe { libc::pthread_self() };
    #[allow(clippy::cast_possible_truncation)]
    {
        tid as u32
    }
}
