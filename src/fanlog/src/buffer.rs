// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Bounded, stack-resident string buffers used for field rendering.
//!
//! Every piece of a formatted log line is rendered into one of these before
//! dispatch, which keeps the hot path free of heap allocation and bounds the
//! memory used by a single call. Writes that do not fit are truncated on a
//! UTF-8 boundary rather than failing.

use std::fmt;
use std::str;

/// Fixed-capacity string buffer backed by a `[u8; N]` array.
///
/// Implements [`fmt::Write`]; writes past the capacity are silently dropped
/// and the truncation is recorded.
#[derive(Clone, Copy)]
pub(crate) struct FixedString<const N: usize> {
    buf: [u8; N],
    len: usize,
    truncated: bool,
}

impl<const N: usize> FixedString<N> {
    /// An empty buffer.
    pub(crate) const fn new() -> Self {
        FixedString {
            buf: [0; N],
            len: 0,
            truncated: false,
        }
    }

    /// The buffered text.
    pub(crate) fn as_str(&self) -> &str {
        // Writes only ever land on UTF-8 boundaries.
        str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
    }

    /// Appends as much of `s` as fits.
    pub(crate) fn push_str(&mut self, s: &str) {
        let _ = fmt::Write::write_str(self, s);
    }
}

// Observers used only by tests across the crate.
#[cfg(test)]
impl<const N: usize> FixedString<N> {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Whether any write has been cut short by the capacity.
    pub(crate) fn truncated(&self) -> bool {
        self.truncated
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for FixedString<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let available = N - self.len;
        let bytes = s.as_bytes();
        if bytes.len() <= available {
            self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
            self.len += bytes.len();
        } else {
            // Back off to the closest character boundary that fits.
            let mut take = available;
            while take > 0 && !s.is_char_boundary(take) {
                take -= 1;
            }
            self.buf[self.len..self.len + take].copy_from_slice(&bytes[..take]);
            self.len += take;
            self.truncated = true;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("FixedString")
            .field("text", &self.as_str())
            .field("truncated", &self.truncated)
            .finish()
    }
}

impl<const N: usize> PartialEq for FixedString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<const N: usize> Eq for FixedString<N> {}
