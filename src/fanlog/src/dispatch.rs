// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The dispatch path from one severity-tagged call to every destination
//! whose mask admits the level.
//!
//! A call snapshots the configuration under the state lock, renders every
//! field into bounded buffers on its own stack, and then fans out in a
//! fixed order: stdout, stderr, system log, files. The section locks are
//! taken one at a time and never nested, so racing threads can interleave
//! across destinations but never within one destination's bytes.

use std::fmt;
use std::fmt::Write as _;

use crate::buffer::FixedString;
use crate::error::{fail, ErrorKind, Failure, OpResult};
use crate::filecache::FILE_CACHE;
use crate::format::{assemble, Fields};
use crate::level::Level;
use crate::state::{lock_section, sanity, snapshot, LibraryState};
use crate::{console, platform, style, syslog};
use crate::{MAX_LEVEL, MAX_MESSAGE, MAX_MSEC, MAX_OUTPUT, MAX_PID, MAX_STYLE, MAX_TIME};

/// Formats `args` and fans the message out; the body of every per-level
/// public call.
pub(crate) fn logv(level: Level, args: fmt::Arguments<'_>) -> OpResult {
    sanity()?;

    // Reject bad input before any destination is touched.
    let mut message = FixedString::<MAX_MESSAGE>::new();
    let _ = message.write_fmt(args);
    if message.is_empty() {
        fail!(ErrorKind::InvalidString);
    }

    // Decouple formatting from later configuration changes; the lock is
    // held only for a structure copy.
    let state = snapshot();

    let mut style_buf = FixedString::<MAX_STYLE>::new();
    // On failure the prefix stays empty and the line goes out unstyled.
    let _ = style::resolved_style(level).render(&mut style_buf);

    let now = platform::now();
    let mut timestamp = FixedString::<MAX_TIME>::new();
    now.write_clock(&mut timestamp);
    let mut msec = FixedString::<MAX_MSEC>::new();
    now.write_msec(&mut msec);

    let mut level_tag = FixedString::<MAX_LEVEL>::new();
    let _ = write!(level_tag, "[{}]", level.tag());

    let pid = platform::process_id();
    let mut pid_buf = FixedString::<MAX_PID>::new();
    let _ = write!(pid_buf, "{pid}");

    // The thread field shows the thread's name when it has one, its id
    // otherwise, and nothing at all on the process's first thread.
    let tid = platform::thread_id();
    let current = std::thread::current();
    let mut tid_buf = FixedString::<MAX_PID>::new();
    if tid != pid {
        match current.name() {
            Some(name) if !name.is_empty() => tid_buf.push_str(name),
            _ => {
                let _ = write!(tid_buf, "{tid}");
            }
        }
    }

    let fields = Fields {
        style: style_buf.as_str(),
        timestamp: timestamp.as_str(),
        msec: msec.as_str(),
        level_tag: level_tag.as_str(),
        name: state.name.as_str(),
        pid: pid_buf.as_str(),
        tid: tid_buf.as_str(),
        message: message.as_str(),
    };

    fan_out(&state, level, &fields)
}

fn fan_out(state: &LibraryState, level: Level, fields: &Fields<'_>) -> OpResult {
    let mut wanted = 0;
    let mut dispatched = 0;
    let mut out = FixedString::<MAX_OUTPUT>::new();
    let styling = platform::CONSOLE_STYLING;

    if state.stdout.levels.admits(level) {
        wanted += 1;
        assemble(styling, state.stdout.options, fields, &mut out);
        if console::write_stdout(out.as_str()).is_ok() {
            dispatched += 1;
        }
    }

    if state.stderr.levels.admits(level) {
        wanted += 1;
        assemble(styling, state.stderr.options, fields, &mut out);
        if console::write_stderr(out.as_str()).is_ok() {
            dispatched += 1;
        }
    }

    if state.syslog.levels.admits(level) {
        wanted += 1;
        if syslog::emit(level, fields.message).is_ok() {
            dispatched += 1;
        }
    }

    {
        let mut cache = lock_section(&FILE_CACHE);
        let (file_wanted, file_dispatched) = cache.dispatch(level, fields);
        wanted += file_wanted;
        dispatched += file_dispatched;
    }

    if wanted == 0 {
        fail!(ErrorKind::NoDestination);
    }
    if dispatched == wanted {
        Ok(())
    } else {
        // The failing destination already recorded the error.
        Err(Failure)
    }
}
