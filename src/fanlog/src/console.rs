// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Writers for the standard streams.
//!
//! Serialization is explicit: every write takes the standard library's own
//! stream lock, so the bytes of one message stay contiguous on a stream no
//! matter how many threads are logging. Styling travels in-band (the escape
//! sequence is already part of `text`).

use std::io::Write;

use crate::error::{fail_io, OpResult};

/// Writes one formatted line to stdout.
pub(crate) fn write_stdout(text: &str) -> OpResult {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    if let Err(err) = handle.write_all(text.as_bytes()) {
        fail_io!(err);
    }
    Ok(())
}

/// Writes one formatted line to stderr.
pub(crate) fn write_stderr(text: &str) -> OpResult {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    if let Err(err) = handle.write_all(text.as_bytes()) {
        fail_io!(err);
    }
    Ok(())
}
