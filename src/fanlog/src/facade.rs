// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Optional bridge from the `log` crate's macros into the dispatcher.
//!
//! Code that already speaks `log::info!` and friends can route through the
//! library's destinations without taking a direct dependency; `log` has no
//! notice/alert/emergency severities, so trace maps onto debug and the
//! remaining levels map one-to-one.

use log::{Log, Metadata, Record};

use crate::level::Level;
use crate::state::{is_initialized, lock_section};

#[derive(Debug)]
struct Facade;

static FACADE: Facade = Facade;

impl Log for Facade {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        is_initialized()
    }

    fn log(&self, record: &Record) {
        // Level filtering happens per destination inside the dispatcher.
        let _ = crate::log(map_level(record.level()), *record.args());
    }

    fn flush(&self) {
        let mut cache = lock_section(&crate::filecache::FILE_CACHE);
        cache.flush_all();
    }
}

fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    }
}

/// Installs the library as the `log` crate's global backend. Returns false
/// when another backend is already installed. The library itself may be
/// initialized before or after this call; records arriving while it is
/// uninitialized are dropped.
pub fn attach_log_facade() -> bool {
    log::set_logger(&FACADE)
        .map(|()| log::set_max_level(log::LevelFilter::Trace))
        .is_ok()
}
