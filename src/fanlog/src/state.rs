// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The process-wide library state and its lifecycle.
//!
//! One record per process holds the resolved stdio and system-log
//! configuration and the process name, guarded by its own lock. A magic
//! sentinel word, checked without the lock, guards against use before init
//! and double init. The dispatch path takes the lock only long enough to
//! copy the record out.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;

use crate::buffer::FixedString;
use crate::config::{
    InitConfig, STDERR_DEFAULT_LEVELS, STDERR_DEFAULT_OPTIONS, STDOUT_DEFAULT_LEVELS,
    STDOUT_DEFAULT_OPTIONS, SYSLOG_DEFAULT_LEVELS,
};
use crate::error::{fail, ErrorKind, OpResult};
use crate::level::LevelMask;
use crate::options::FormatOptions;
use crate::{filecache, style, syslog, MAX_NAME};

/// Magic word held by [`SENTINEL`] while the library is initialized.
const MAGIC: u32 = 0x6090_6090;

static SENTINEL: AtomicU32 = AtomicU32::new(0);

/// Resolved configuration for one standard stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StreamState {
    pub levels: LevelMask,
    pub options: FormatOptions,
}

/// Resolved configuration for the system log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SyslogState {
    pub levels: LevelMask,
    pub include_pid: bool,
}

/// The process-wide configuration record. `Copy` so the dispatch snapshot
/// is a plain structure copy under the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LibraryState {
    pub stdout: StreamState,
    pub stderr: StreamState,
    pub syslog: SyslogState,
    pub name: FixedString<MAX_NAME>,
}

impl LibraryState {
    const EMPTY: LibraryState = LibraryState {
        stdout: StreamState {
            levels: LevelMask::empty(),
            options: FormatOptions::empty(),
        },
        stderr: StreamState {
            levels: LevelMask::empty(),
            options: FormatOptions::empty(),
        },
        syslog: SyslogState {
            levels: LevelMask::empty(),
            include_pid: false,
        },
        name: FixedString::new(),
    };
}

lazy_static! {
    pub(crate) static ref STATE: Mutex<LibraryState> = Mutex::new(LibraryState::EMPTY);
}

/// Locks a protected section, riding through poisoning: a panic elsewhere
/// must not take the logger down, and every critical section leaves its
/// data consistent.
pub(crate) fn lock_section<T>(section: &Mutex<T>) -> MutexGuard<'_, T> {
    section.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Whether init has completed and cleanup has not.
pub(crate) fn is_initialized() -> bool {
    SENTINEL.load(Ordering::Acquire) == MAGIC
}

/// Fails with [`ErrorKind::NotReady`] unless the library is initialized.
pub(crate) fn sanity() -> OpResult {
    if !is_initialized() {
        fail!(ErrorKind::NotReady);
    }
    Ok(())
}

/// Resolves and validates `config`, copies it into the process-wide record,
/// opens the system log when configured, and sets the sentinel.
pub(crate) fn init(config: InitConfig) -> OpResult {
    if is_initialized() {
        fail!(ErrorKind::AlreadyInit);
    }

    if config.name.len() > MAX_NAME {
        fail!(ErrorKind::InvalidString);
    }
    let mut name = FixedString::new();
    name.push_str(&config.name);

    let resolved = LibraryState {
        stdout: StreamState {
            levels: config.stdout.levels.resolve(STDOUT_DEFAULT_LEVELS),
            options: config.stdout.options.resolve(STDOUT_DEFAULT_OPTIONS),
        },
        stderr: StreamState {
            levels: config.stderr.levels.resolve(STDERR_DEFAULT_LEVELS),
            options: config.stderr.options.resolve(STDERR_DEFAULT_OPTIONS),
        },
        syslog: SyslogState {
            levels: config.syslog.levels.resolve(SYSLOG_DEFAULT_LEVELS),
            include_pid: config.syslog.include_pid,
        },
        name,
    };
    resolved.stdout.levels.validate()?;
    resolved.stdout.options.validate()?;
    resolved.stderr.levels.validate()?;
    resolved.stderr.options.validate()?;
    resolved.syslog.levels.validate()?;

    let mut state = lock_section(&STATE);
    // Two racing inits both pass the unlocked check; only one wins here.
    if is_initialized() {
        fail!(ErrorKind::AlreadyInit);
    }
    *state = resolved;
    if !state.syslog.levels.is_empty() {
        syslog::open(state.name.as_str(), state.syslog.include_pid);
    }
    SENTINEL.store(MAGIC, Ordering::Release);
    Ok(())
}

/// Tears down the file cache, closes the system log, zeroes the
/// configuration, resets the style overrides, and clears the sentinel.
pub(crate) fn cleanup() -> OpResult {
    sanity()?;

    {
        let mut cache = lock_section(&filecache::FILE_CACHE);
        cache.destroy();
    }

    {
        let mut state = lock_section(&STATE);
        syslog::close();
        *state = LibraryState::EMPTY;
    }

    style::reset_overrides();
    SENTINEL.store(0, Ordering::Release);
    Ok(())
}

/// Replaces the stdout level mask.
pub(crate) fn set_stdout_levels(levels: LevelMask) -> OpResult {
    sanity()?;
    levels.validate()?;
    lock_section(&STATE).stdout.levels = levels;
    Ok(())
}

/// Replaces the stdout option mask.
pub(crate) fn set_stdout_options(options: FormatOptions) -> OpResult {
    sanity()?;
    options.validate()?;
    lock_section(&STATE).stdout.options = options;
    Ok(())
}

/// Replaces the stderr level mask.
pub(crate) fn set_stderr_levels(levels: LevelMask) -> OpResult {
    sanity()?;
    levels.validate()?;
    lock_section(&STATE).stderr.levels = levels;
    Ok(())
}

/// Replaces the stderr option mask.
pub(crate) fn set_stderr_options(options: FormatOptions) -> OpResult {
    sanity()?;
    options.validate()?;
    lock_section(&STATE).stderr.options = options;
    Ok(())
}

/// Replaces the system-log level mask.
pub(crate) fn set_syslog_levels(levels: LevelMask) -> OpResult {
    sanity()?;
    levels.validate()?;
    lock_section(&STATE).syslog.levels = levels;
    Ok(())
}

/// Copies the configuration record out under its lock.
pub(crate) fn snapshot() -> LibraryState {
    *lock_section(&STATE)
}
