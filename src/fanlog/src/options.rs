// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Per-destination formatting options.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{fail, ErrorKind, OpResult};

bitflags! {
    /// Suppression toggles controlling which fields appear in a
    /// destination's output.
    ///
    /// The bit values sit above the level-mask region so the two can never
    /// be confused for one another.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FormatOptions: u32 {
        /// Don't include time stamps in output.
        const NO_TIME = 0x200;
        /// Don't include the human-readable level tag in output.
        const NO_LEVEL = 0x400;
        /// Don't include the process name in output.
        const NO_NAME = 0x800;
        /// Don't append the current millisecond to time stamps. Has no
        /// effect when `NO_TIME` is set.
        const NO_MSEC = 0x1000;
        /// Don't include the process ID in output.
        const NO_PID = 0x2000;
        /// Don't include the thread ID/name in output.
        const NO_TID = 0x4000;
        /// Don't write header messages when logging begins or the file is
        /// rolled. Only applicable to log files.
        const NO_HEADER = 0x1_0000;
        /// Every suppression except `NO_HEADER`; leaves only the formatted
        /// message.
        const MSG_ONLY = Self::NO_TIME.bits()
            | Self::NO_LEVEL.bits()
            | Self::NO_NAME.bits()
            | Self::NO_MSEC.bits()
            | Self::NO_PID.bits()
            | Self::NO_TID.bits();
    }
}

impl FormatOptions {
    // Raw bits can arrive through `from_bits_retain` or deserialization;
    // the configuration boundaries reject undefined bits, which includes
    // the whole level-mask region.
    pub(crate) fn validate(self) -> OpResult {
        if FormatOptions::from_bits(self.bits()).is_none() {
            fail!(ErrorKind::InvalidOptions);
        }
        Ok(())
    }
}
