// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # fanlog
//!
//! A process-wide logging library that accepts formatted messages at one of
//! eight severity levels from any thread and fans them out to a
//! configurable set of destinations: stdout, stderr, the platform system
//! log, and up to sixteen append-mode log files.
//!
//! ## Behavior
//!
//! The library is initialized once per process with [`init`] and torn down
//! with [`cleanup`]. Every destination independently selects the levels it
//! accepts (a [`LevelMask`]) and the fields it renders (a
//! [`FormatOptions`] mask); both can be updated at runtime, as can the
//! per-level console colours ([`TextStyle`]). Log files are rolled to
//! timestamped archives when they reach 10 MiB.
//!
//! A message is emitted with one of the per-level macros:
//!
//! ```no_run
//! let config = fanlog::InitConfig {
//!     name: String::from("example"),
//!     ..Default::default()
//! };
//! assert!(fanlog::init(config));
//! fanlog::info!("started, answer={}", 42);
//! fanlog::cleanup();
//! ```
//!
//! Within one call the destinations are written in a fixed order (stdout,
//! stderr, system log, files), and the bytes of one message are contiguous
//! on every destination; messages racing from different threads may
//! interleave across destinations but not within one.
//!
//! ## Failure model
//!
//! No call panics or returns a `Result`: failures surface as a falsy return
//! value plus a record in a per-thread error carrier read back with
//! [`last_error`]. Every public call clears the carrier on entry, so the
//! carrier always describes the most recent failed call on the current
//! thread. Nothing is retried; a destination that fails to write simply
//! fails that call.
//!
//! ## Limitations
//!
//! Field rendering happens in fixed-size buffers on the calling thread's
//! stack: messages are truncated at [`MAX_MESSAGE`] bytes. Writes from
//! outside the library to the same streams or files keep no particular
//! interleaving with logged messages.

use std::fmt;
use std::path::Path;

mod buffer;
mod config;
mod console;
mod dispatch;
mod error;
mod facade;
mod filecache;
mod format;
mod level;
mod options;
mod platform;
mod state;
mod style;
mod syslog;

pub use config::{InitConfig, Setting, StreamConfig, SyslogConfig};
pub use error::{ErrorKind, LastError};
pub use facade::attach_log_facade;
pub use filecache::FileId;
pub use level::{Level, LevelMask};
pub use options::FormatOptions;
pub use style::TextStyle;

/// The maximum number of log files that may be registered at once.
pub const MAX_FILES: usize = 16;

/// The maximum size, in bytes, of one formatted message; longer messages
/// are truncated.
pub const MAX_MESSAGE: usize = 2048;

/// The maximum size, in bytes, of the process name.
pub const MAX_NAME: usize = 32;

/// The maximum size, in bytes, of the stored OS error message.
pub const MAX_ERROR: usize = 256;

// Internal rendering bounds.
pub(crate) const MAX_TIME: usize = 64;
pub(crate) const MAX_MSEC: usize = 5;
pub(crate) const MAX_LEVEL: usize = 7;
pub(crate) const MAX_PID: usize = 16;
pub(crate) const MAX_STYLE: usize = 16;
pub(crate) const MAX_MISC: usize = 7;
pub(crate) const MAX_OUTPUT: usize =
    MAX_MESSAGE + 2 * MAX_STYLE + MAX_TIME + MAX_LEVEL + MAX_NAME + 2 * MAX_PID + MAX_MISC + 1;

/// Initializes the library with `config`.
///
/// Any thread may initialize; until this call completes every other call
/// fails with [`ErrorKind::NotReady`]. Fails with
/// [`ErrorKind::AlreadyInit`] when the library is already initialized.
/// Fields left at [`Setting::Default`] resolve to the destination's
/// documented default. When the resolved system-log mask is non-empty the
/// system-log connection is opened here, registering the process name and
/// the pid flag.
pub fn init(config: InitConfig) -> bool {
    error::clear();
    state::init(config).is_ok()
}

/// Tears the library down: flushes and closes every cached log file,
/// closes the system log, zeroes the configuration, and resets the style
/// overrides. After cleanup only [`init`] succeeds.
pub fn cleanup() -> bool {
    error::clear();
    state::cleanup().is_ok()
}

/// Reads this thread's last-error record.
pub fn last_error() -> LastError {
    error::read()
}

/// Dispatches one formatted message at `level`; the per-level macros
/// expand to this. Returns true iff every destination that admits `level`
/// wrote successfully; fails with [`ErrorKind::NoDestination`] when no
/// destination admits it.
pub fn log(level: Level, args: fmt::Arguments<'_>) -> bool {
    error::clear();
    dispatch::logv(level, args).is_ok()
}

/// Replaces the set of levels sent to stdout.
pub fn set_stdout_levels(levels: Setting<LevelMask>) -> bool {
    error::clear();
    state::set_stdout_levels(levels.resolve(config::STDOUT_DEFAULT_LEVELS)).is_ok()
}

/// Replaces the formatting options for stdout.
pub fn set_stdout_options(options: Setting<FormatOptions>) -> bool {
    error::clear();
    state::set_stdout_options(options.resolve(config::STDOUT_DEFAULT_OPTIONS)).is_ok()
}

/// Replaces the set of levels sent to stderr.
pub fn set_stderr_levels(levels: Setting<LevelMask>) -> bool {
    error::clear();
    state::set_stderr_levels(levels.resolve(config::STDERR_DEFAULT_LEVELS)).is_ok()
}

/// Replaces the formatting options for stderr.
pub fn set_stderr_options(options: Setting<FormatOptions>) -> bool {
    error::clear();
    state::set_stderr_options(options.resolve(config::STDERR_DEFAULT_OPTIONS)).is_ok()
}

/// Replaces the set of levels sent to the system log.
pub fn set_syslog_levels(levels: Setting<LevelMask>) -> bool {
    error::clear();
    state::set_syslog_levels(levels.resolve(config::SYSLOG_DEFAULT_LEVELS)).is_ok()
}

/// Opens `path` in append mode and registers it as a log destination.
///
/// Returns a stable handle for later updates and removal, or `None` on
/// failure ([`ErrorKind::CacheFull`] at [`MAX_FILES`] files,
/// [`ErrorKind::DuplicateFile`] for an already-registered path). Unless
/// [`FormatOptions::NO_HEADER`] is set a session-begin banner is written
/// on open.
pub fn add_file<P: AsRef<Path>>(
    path: P,
    levels: Setting<LevelMask>,
    options: Setting<FormatOptions>,
) -> Option<FileId> {
    error::clear();
    filecache::add(path.as_ref(), levels, options).ok()
}

/// Flushes, closes, and unregisters the file behind `id`. A handle is
/// valid for exactly one removal; afterwards it fails with
/// [`ErrorKind::NoSuchFile`].
pub fn remove_file(id: FileId) -> bool {
    error::clear();
    filecache::remove(id).is_ok()
}

/// Replaces the set of levels sent to the file behind `id`.
pub fn set_file_levels(id: FileId, levels: Setting<LevelMask>) -> bool {
    error::clear();
    filecache::set_levels(id, levels).is_ok()
}

/// Replaces the formatting options for the file behind `id`.
pub fn set_file_options(id: FileId, options: Setting<FormatOptions>) -> bool {
    error::clear();
    filecache::set_options(id, options).is_ok()
}

/// Overrides the console style used for `level`. Fails with
/// [`ErrorKind::InvalidTextStyle`] when a region of `style` is out of
/// range, leaving the previous style in effect.
pub fn set_text_style(level: Level, style: TextStyle) -> bool {
    error::clear();
    let result = (|| {
        state::sanity()?;
        style::set_override(level, style)
    })();
    result.is_ok()
}

/// Returns every level's console style to its documented default.
pub fn reset_text_styles() -> bool {
    error::clear();
    let result: error::OpResult = (|| {
        state::sanity()?;
        style::reset_overrides();
        Ok(())
    })();
    result.is_ok()
}

/// Logs a formatted message at debug level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Debug, ::core::format_args!($($arg)*))
    };
}

/// Logs a formatted message at info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Info, ::core::format_args!($($arg)*))
    };
}

/// Logs a formatted message at notice level.
#[macro_export]
macro_rules! notice {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Notice, ::core::format_args!($($arg)*))
    };
}

/// Logs a formatted message at warning level.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Warn, ::core::format_args!($($arg)*))
    };
}

/// Logs a formatted message at error level.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Error, ::core::format_args!($($arg)*))
    };
}

/// Logs a formatted message at critical level.
#[macro_export]
macro_rules! crit {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Crit, ::core::format_args!($($arg)*))
    };
}

/// Logs a formatted message at alert level.
#[macro_export]
macro_rules! alert {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Alert, ::core::format_args!($($arg)*))
    };
}

/// Logs a formatted message at emergency level.
#[macro_export]
macro_rules! emerg {
    ($($arg:tt)*) => {
        $crate::log($crate::Level::Emerg, ::core::format_args!($($arg)*))
    };
}
