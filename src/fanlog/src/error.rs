// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Error kinds and the per-thread last-error carrier.
//!
//! Every public call clears the carrier on entry; a failing call records
//! what went wrong (and where) before returning its falsy value, so the
//! carrier always describes the most recent failed call on the current
//! thread. The carrier is strictly thread-local and needs no locking.

use std::cell::Cell;
use std::fmt::Write;
use std::io;

use crate::buffer::FixedString;
use crate::MAX_ERROR;

/// The kinds of error a call can leave in the thread carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[repr(u16)]
pub enum ErrorKind {
    /// The operation completed successfully.
    #[error("the operation completed successfully")]
    NoError = 0,
    /// The library has not been initialized.
    #[error("logging has not been initialized")]
    NotReady = 1,
    /// The library is already initialized.
    #[error("logging is already initialized")]
    AlreadyInit = 2,
    /// The file is already registered.
    #[error("file already managed")]
    DuplicateFile = 3,
    /// The file is not registered.
    #[error("file not managed")]
    NoSuchFile = 4,
    /// The maximum number of files is already registered.
    #[error("maximum number of files already managed")]
    CacheFull = 5,
    /// Option flags are invalid.
    #[error("option flags are invalid")]
    InvalidOptions = 6,
    /// Level flags are invalid.
    #[error("level flags are invalid")]
    InvalidLevels = 7,
    /// The text style is invalid.
    #[error("text style is invalid")]
    InvalidTextStyle = 8,
    /// A string argument is empty or over its bound.
    #[error("invalid string argument")]
    InvalidString = 9,
    /// No destination is registered for the level.
    #[error("no destinations registered for level")]
    NoDestination = 10,
    /// An operating system call failed; the carrier holds the OS code and
    /// message.
    #[error("platform error")]
    Platform = 11,
    /// The error is not known.
    #[error("error is not known")]
    Unknown = 4095,
}

impl ErrorKind {
    /// The numeric code for this kind.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// A read-out of the thread carrier: the kind of the last error on this
/// thread and a human-readable message locating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// `error in <module> (<file>:<line>): '<detail>'`, with the OS error
    /// code and text substituted when `kind` is [`ErrorKind::Platform`].
    pub message: String,
}

impl LastError {
    /// The numeric code of [`LastError::kind`].
    pub fn code(&self) -> u16 {
        self.kind.code()
    }
}

/// Marker for a failure whose details are already in the thread carrier.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Failure;

/// Internal result type; `Err` means the carrier holds the error.
pub(crate) type OpResult<T = ()> = Result<T, Failure>;

const UNKNOWN: &str = "<unknown>";

#[derive(Debug, Clone, Copy)]
struct ThreadError {
    kind: ErrorKind,
    os_code: i32,
    os_msg: FixedString<MAX_ERROR>,
    module: &'static str,
    file: &'static str,
    line: u32,
}

impl ThreadError {
    const UNSET: ThreadError = ThreadError {
        kind: ErrorKind::NoError,
        os_code: 0,
        os_msg: FixedString::new(),
        module: UNKNOWN,
        file: UNKNOWN,
        line: 0,
    };
}

thread_local! {
    static LAST: Cell<ThreadError> = const { Cell::new(ThreadError::UNSET) };
}

/// Resets the carrier to "no error"; called on entry to every public call.
pub(crate) fn clear() {
    LAST.set(ThreadError::UNSET);
}

/// Records a failure in the carrier.
pub(crate) fn record(kind: ErrorKind, module: &'static str, file: &'static str, line: u32) {
    LAST.set(ThreadError {
        kind,
        os_code: 0,
        os_msg: FixedString::new(),
        module,
        file,
        line,
    });
}

/// Records an OS failure, keeping its code and (bounded) message.
pub(crate) fn record_os(
    code: i32,
    message: &str,
    module: &'static str,
    file: &'static str,
    line: u32,
) {
    let mut os_msg = FixedString::new();
    os_msg.push_str(message);
    LAST.set(ThreadError {
        kind: ErrorKind::Platform,
        os_code: code,
        os_msg,
        module,
        file,
        line,
    });
}

/// Records an `io::Error` as a platform error.
pub(crate) fn record_io(err: &io::Error, module: &'static str, file: &'static str, line: u32) {
    record_os(
        err.raw_os_error().unwrap_or(0),
        &err.to_string(),
        module,
        file,
        line,
    );
}

/// Reads the carrier into a [`LastError`].
pub(crate) fn read() -> LastError {
    let err = LAST.get();
    let mut message = String::with_capacity(MAX_ERROR);
    let _ = write!(message, "error in {} ({}:{}): '", err.module, err.file, err.line);
    match err.kind {
        ErrorKind::Platform => {
            let _ = write!(message, "{} {}", err.os_code, err.os_msg.as_str());
        }
        kind => {
            let _ = write!(message, "{kind}");
        }
    }
    message.push('\'');
    LastError {
        kind: err.kind,
        message,
    }
}

/// Records the error and returns `Err(Failure)` from the enclosing function.
macro_rules! fail {
    ($kind:expr) => {{
        $crate::error::record($kind, module_path!(), file!(), line!());
        return Err($crate::error::Failure);
    }};
}

/// Records an `io::Error` and returns `Err(Failure)` from the enclosing
/// function.
macro_rules! fail_io {
    ($err:expr) => {{
        $crate::error::record_io(&$err, module_path!(), file!(), line!());
        return Err($crate::error::Failure);
    }};
}

pub(crate) use fail;
pub(crate) use fail_io;
