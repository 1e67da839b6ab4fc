// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Severity levels and level masks.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{fail, ErrorKind, OpResult};

/// One of the eight severity levels, in increasing urgency from
/// [`Level::Debug`] to [`Level::Emerg`].
///
/// Each level occupies a distinct bit so that sets of levels combine into a
/// [`LevelMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Level {
    /// Nuclear war, Armageddon, etc.
    Emerg = 0x1,
    /// Action required ASAP.
    Alert = 0x2,
    /// Critical errors.
    Crit = 0x4,
    /// Errors.
    Error = 0x8,
    /// Warnings that could likely be ignored.
    Warn = 0x10,
    /// Normal but significant.
    Notice = 0x20,
    /// Informational messages.
    Info = 0x40,
    /// Debugging/diagnostic output.
    Debug = 0x80,
}

impl Level {
    /// All levels, most urgent first.
    pub const ALL: [Level; 8] = [
        Level::Emerg,
        Level::Alert,
        Level::Crit,
        Level::Error,
        Level::Warn,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// The single-bit mask for this level.
    pub fn mask(self) -> LevelMask {
        LevelMask::from_bits_truncate(self as u16)
    }

    /// The fixed four-character tag used in formatted output.
    pub fn tag(self) -> &'static str {
        match self {
            Level::Emerg => "EMRG",
            Level::Alert => "ALRT",
            Level::Crit => "CRIT",
            Level::Error => "ERRO",
            Level::Warn => "WARN",
            Level::Notice => "NOTI",
            Level::Info => "INFO",
            Level::Debug => "DEBG",
        }
    }

    /// Stable index into per-level tables (0 = emergency .. 7 = debug).
    pub(crate) fn slot(self) -> usize {
        match self {
            Level::Emerg => 0,
            Level::Alert => 1,
            Level::Crit => 2,
            Level::Error => 3,
            Level::Warn => 4,
            Level::Notice => 5,
            Level::Info => 6,
            Level::Debug => 7,
        }
    }
}

bitflags! {
    /// Bitwise-OR of severity levels selecting which levels a destination
    /// accepts. An empty mask makes the destination silent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LevelMask: u16 {
        /// Accept emergency messages.
        const EMERG = 0x1;
        /// Accept alert messages.
        const ALERT = 0x2;
        /// Accept critical messages.
        const CRIT = 0x4;
        /// Accept error messages.
        const ERROR = 0x8;
        /// Accept warning messages.
        const WARN = 0x10;
        /// Accept notice messages.
        const NOTICE = 0x20;
        /// Accept informational messages.
        const INFO = 0x40;
        /// Accept debug messages.
        const DEBUG = 0x80;
    }
}

impl LevelMask {
    /// Whether the mask admits `level`.
    pub fn admits(self, level: Level) -> bool {
        self.contains(level.mask())
    }

    // Raw bits can arrive through `from_bits_retain` or deserialization;
    // the configuration boundaries reject anything outside the eight
    // defined levels.
    pub(crate) fn validate(self) -> OpResult {
        if LevelMask::from_bits(self.bits()).is_none() {
            fail!(ErrorKind::InvalidLevels);
        }
        Ok(())
    }
}
