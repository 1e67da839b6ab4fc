// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Assembly of one output line from the rendered field buffers.
//!
//! The full layout is
//!
//! ```text
//! <style>HH:MM:SS.mmm [LVL] name (pid.tid): message\n<reset>
//! ```
//!
//! with each segment dropped when its suppress option is set or its field
//! is empty. Separator rules: a segment's leading space is suppressed when
//! nothing precedes it; the pid/tid group is parenthesized only when the
//! process name was emitted; the colon-space before the message appears
//! only when any earlier segment was emitted. The trailing newline is
//! always present.

use crate::buffer::FixedString;
use crate::options::FormatOptions;
use crate::style::RESET_SEQUENCE;
use crate::MAX_OUTPUT;

/// The rendered fields of one message, each in its own bounded buffer on
/// the dispatching thread's stack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields<'a> {
    /// Style escape sequence, empty when resolution failed.
    pub style: &'a str,
    /// `HH:MM:SS`.
    pub timestamp: &'a str,
    /// `.mmm`.
    pub msec: &'a str,
    /// `[LVL]`.
    pub level_tag: &'a str,
    /// Process name, possibly empty.
    pub name: &'a str,
    /// Process id digits.
    pub pid: &'a str,
    /// Thread id or name; empty when the thread is the process's first.
    pub tid: &'a str,
    /// The user's formatted message.
    pub message: &'a str,
}

/// Assembles one line into `out` according to `options`. Styling bytes are
/// emitted only when `styling` is set (console destinations on platforms
/// with escape-sequence consoles).
pub(crate) fn assemble(
    styling: bool,
    options: FormatOptions,
    fields: &Fields<'_>,
    out: &mut FixedString<MAX_OUTPUT>,
) {
    out.clear();

    if styling {
        out.push_str(fields.style);
    }

    let mut first = true;

    if !options.contains(FormatOptions::NO_TIME) && !fields.timestamp.is_empty() {
        out.push_str(fields.timestamp);
        if !options.contains(FormatOptions::NO_MSEC) {
            out.push_str(fields.msec);
        }
        first = false;
    }

    if !options.contains(FormatOptions::NO_LEVEL) {
        if !first {
            out.push_str(" ");
        }
        out.push_str(fields.level_tag);
        first = false;
    }

    let mut named = false;
    if !options.contains(FormatOptions::NO_NAME) && !fields.name.is_empty() {
        if !first {
            out.push_str(" ");
        }
        out.push_str(fields.name);
        first = false;
        named = true;
    }

    let want_pid = !options.contains(FormatOptions::NO_PID) && !fields.pid.is_empty();
    let want_tid = !options.contains(FormatOptions::NO_TID) && !fields.tid.is_empty();
    if want_pid || want_tid {
        if !first {
            out.push_str(" ");
        }
        if named {
            out.push_str("(");
        }
        if want_pid {
            out.push_str(fields.pid);
        }
        if want_pid && want_tid {
            out.push_str(".");
        }
        if want_tid {
            out.push_str(fields.tid);
        }
        if named {
            out.push_str(")");
        }
        first = false;
    }

    if !first {
        out.push_str(": ");
    }

    out.push_str(fields.message);

    if styling {
        out.push_str(RESET_SEQUENCE);
    }

    out.push_str("\n");
}
