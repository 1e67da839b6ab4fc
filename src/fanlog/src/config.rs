// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Public configuration types and the per-destination defaults.

use serde::{Deserialize, Serialize};

use crate::level::LevelMask;
use crate::options::FormatOptions;

/// A configuration field that is either left at its destination-specific
/// default or set explicitly.
///
/// The default sentinel is resolved to a concrete value inside the library,
/// at init time or when an update call stores the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Setting<T> {
    /// Use the destination-specific default.
    Default,
    /// Use this value.
    Explicit(T),
}

impl<T> Setting<T> {
    /// The explicit value, or `default` for the sentinel.
    pub fn resolve(self, default: T) -> T {
        match self {
            Setting::Default => default,
            Setting::Explicit(value) => value,
        }
    }
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Default
    }
}

/// Configuration for one standard-stream destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Which levels the stream accepts.
    pub levels: Setting<LevelMask>,
    /// Which fields appear in the stream's output.
    pub options: Setting<FormatOptions>,
}

/// Configuration for the system-log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyslogConfig {
    /// Which levels are forwarded to the system log.
    pub levels: Setting<LevelMask>,
    /// Whether the service should stamp entries with the process id.
    pub include_pid: bool,
}

/// Initialization data for the library.
///
/// `InitConfig::default()` leaves every destination at its documented
/// default; [`crate::init`] copies the resolved configuration into the
/// process-wide state, so the value need not be retained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitConfig {
    /// The stdout destination.
    pub stdout: StreamConfig,
    /// The stderr destination.
    pub stderr: StreamConfig,
    /// The system-log destination.
    pub syslog: SyslogConfig,
    /// The name that appears in formatted output; at most
    /// [`crate::MAX_NAME`] bytes, empty to suppress the field.
    pub name: String,
}

/// Default levels for stdout: everything below error severity.
pub(crate) const STDOUT_DEFAULT_LEVELS: LevelMask = LevelMask::DEBUG
    .union(LevelMask::INFO)
    .union(LevelMask::NOTICE)
    .union(LevelMask::WARN);

/// Default options for stdout.
pub(crate) const STDOUT_DEFAULT_OPTIONS: FormatOptions = FormatOptions::NO_TIME
    .union(FormatOptions::NO_PID)
    .union(FormatOptions::NO_TID);

/// Default levels for stderr: hard failures.
pub(crate) const STDERR_DEFAULT_LEVELS: LevelMask = LevelMask::ERROR
    .union(LevelMask::CRIT)
    .union(LevelMask::EMERG);

/// Default options for stderr.
pub(crate) const STDERR_DEFAULT_OPTIONS: FormatOptions = STDOUT_DEFAULT_OPTIONS;

/// Default levels for the system log.
pub(crate) const SYSLOG_DEFAULT_LEVELS: LevelMask = LevelMask::WARN
    .union(LevelMask::CRIT)
    .union(LevelMask::ALERT)
    .union(LevelMask::EMERG);

/// Default levels for log files: everything.
pub(crate) const FILE_DEFAULT_LEVELS: LevelMask = LevelMask::all();

/// Default options for log files: full output.
pub(crate) const FILE_DEFAULT_OPTIONS: FormatOptions = FormatOptions::empty();
