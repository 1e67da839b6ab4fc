// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Platform adapters: wall-clock time with milliseconds, process and thread
//! identifiers. One implementation per target family, selected at build
//! time; everything above this module is platform-neutral.

use std::fmt::Write;

use crate::buffer::FixedString;
use crate::{MAX_MSEC, MAX_TIME};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub(crate) use unix::{now, process_id, thread_id, CONSOLE_STYLING};

#[cfg(not(unix))]
mod fallback;
#[cfg(not(unix))]
pub(crate) use fallback::{now, process_id, thread_id, CONSOLE_STYLING};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A broken-down local time with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WallClock {
    pub year: i32,
    /// 1-12.
    pub month: u32,
    /// 1-31.
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// 0-999.
    pub millisecond: u32,
    /// 0 = Sunday.
    pub weekday: u32,
    /// Offset from UTC in minutes, east positive.
    pub utc_offset_minutes: i32,
}

impl WallClock {
    /// `HH:MM:SS`, the time stamp at the head of log lines.
    pub(crate) fn write_clock(&self, out: &mut FixedString<MAX_TIME>) {
        let _ = write!(out, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
    }

    /// `.mmm`, appended to the time stamp unless suppressed.
    pub(crate) fn write_msec(&self, out: &mut FixedString<MAX_MSEC>) {
        let _ = write!(out, ".{:03}", self.millisecond);
    }

    /// `YYYY-MM-DD-HHMMSS`, the stamp embedded in archive file names.
    pub(crate) fn write_archive_stamp(&self, out: &mut FixedString<MAX_TIME>) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}-{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        );
    }

    /// `HH:MM:SS Www dd Mmm yy (+hhmm)`, the stamp used in file headers.
    pub(crate) fn write_header_stamp(&self, out: &mut FixedString<MAX_TIME>) {
        let weekday = WEEKDAYS
            .get(self.weekday as usize)
            .copied()
            .unwrap_or("???");
        let month = MONTHS
            .get((self.month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("???");
        let offset = self.utc_offset_minutes;
        let sign = if offset < 0 { '-' } else { '+' };
        let offset = offset.abs();
        let _ = write!(
            out,
            "{:02}:{:02}:{:02} {} {:02} {} {:02} ({}{:02}{:02})",
            self.hour,
            self.minute,
            self.second,
            weekday,
            self.day,
            month,
            self.year.rem_euclid(100),
            sign,
            offset / 60,
            offset % 60
        );
    }
}
