// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The system-log destination.
//!
//! On Unix this binds the platform syslog service through a single "emit at
//! mapped priority" call; the connection is opened at init time when the
//! destination's level mask is non-empty and closed again at cleanup. On
//! other targets the configuration is accepted but every emit is a no-op
//! that reports failure.

#[cfg(not(unix))]
use crate::error::OpResult;
#[cfg(not(unix))]
use crate::level::Level;

#[cfg(unix)]
pub(crate) use imp::{close, emit, open};

#[cfg(unix)]
mod imp {
    use std::ffi::CString;
    use std::sync::Mutex;

    use lazy_static::lazy_static;

    use crate::error::{fail, ErrorKind, OpResult};
    use crate::level::Level;
    use crate::state::lock_section;

    lazy_static! {
        // openlog(3) keeps the ident pointer; the string must stay alive
        // for as long as the connection is open.
        static ref IDENT: Mutex<Option<CString>> = Mutex::new(None);
    }

    /// Opens the connection, registering `name` and whether the service
    /// should stamp entries with the process id.
    pub(crate) fn open(name: &str, include_pid: bool) {
        let ident = CString::new(name).unwrap_or_default();
        let mut slot = lock_section(&IDENT);
        let flags = (if include_pid { libc::LOG_PID } else { 0 }) | libc::LOG_ODELAY;
        // SAFETY: the ident pointer stays valid until `close` drops the
        // string out of `IDENT`.
        unsafe { libc::openlog(ident.as_ptr(), flags, libc::LOG_USER) };
        *slot = Some(ident);
    }

    /// Emits the raw, undecorated message at the priority mapped from
    /// `level`.
    pub(crate) fn emit(level: Level, message: &str) -> OpResult {
        let Ok(text) = CString::new(message.replace('\0', " ")) else {
            fail!(ErrorKind::InvalidString);
        };
        // SAFETY: both pointers are NUL-terminated; the fixed "%s" format
        // keeps user text out of the format-string path.
        unsafe { libc::syslog(priority(level), b"%s\0".as_ptr().cast(), text.as_ptr()) };
        Ok(())
    }

    /// Closes the connection if `open` established one.
    pub(crate) fn close() {
        let mut slot = lock_section(&IDENT);
        if slot.take().is_some() {
            // SAFETY: closes the connection opened by `open`; takes no
            // arguments.
            unsafe { libc::closelog() };
        }
    }

    fn priority(level: Level) -> libc::c_int {
        match level {
            Level::Emerg => libc::LOG_EMERG,
            Level::Alert => libc::LOG_ALERT,
            Level::Crit => libc::LOG_CRIT,
            Level::Error => libc::LOG_ERR,
            Level::Warn => libc::LOG_WARNING,
            Level::Notice => libc::LOG_NOTICE,
            Level::Info => libc::LOG_INFO,
            Level::Debug => libc::LOG_DEBUG,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_priority_mapping() {
            assert_eq!(priority(Level::Emerg), libc::LOG_EMERG);
            assert_eq!(priority(Level::Alert), libc::LOG_ALERT);
            assert_eq!(priority(Level::Crit), libc::LOG_CRIT);
            assert_eq!(priority(Level::Error), libc::LOG_ERR);
            assert_eq!(priority(Level::Warn), libc::LOG_WARNING);
            assert_eq!(priority(Level::Notice), libc::LOG_NOTICE);
            assert_eq!(priority(Level::Info), libc::LOG_INFO);
            assert_eq!(priority(Level::Debug), libc::LOG_DEBUG);
        }

        #[test]
        fn test_open_emit_close() {
            open("fanlog-test", true);
            assert!(emit(Level::Debug, "fanlog syslog self-test").is_ok());
            close();
            // A second close is a no-op.
            close();
        }
    }
}

/// Accepts the configuration but reports the destination as unavailable.
#[cfg(not(unix))]
pub(crate) fn open(_name: &str, _include_pid: bool) {}

/// No system-log service is bound on this target; emits fail.
#[cfg(not(unix))]
pub(crate) fn emit(_level: Level, _message: &str) -> OpResult {
    crate::error::record_os(
        0,
        "system log is not supported on this platform",
        module_path!(),
        file!(),
        line!(),
    );
    Err(crate::error::Failure)
}

/// Nothing to close on this target.
#[cfg(not(unix))]
pub(crate) fn close() {}
