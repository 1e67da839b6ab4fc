// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A basic example of initializing, configuring destinations, and emitting
//! one message per severity level.
//!
//! When it is finished running the console shows the styled output and
//! `log-example.log` in the current directory holds every level, topped by
//! a session-begin banner.

use std::process::ExitCode;

use fanlog::{
    FormatOptions, InitConfig, LevelMask, Setting, StreamConfig, SyslogConfig,
};

fn main() -> ExitCode {
    // The library copies the configuration during init; it does not need
    // to be retained.
    let config = InitConfig {
        // Send debug, info, notice, and warning messages to stdout,
        // without the time stamp or process id.
        stdout: StreamConfig {
            levels: Setting::Explicit(
                LevelMask::DEBUG | LevelMask::INFO | LevelMask::NOTICE | LevelMask::WARN,
            ),
            options: Setting::Explicit(FormatOptions::NO_TIME | FormatOptions::NO_PID),
        },
        // Send error and above to stderr, formatted the same way.
        stderr: StreamConfig {
            levels: Setting::Explicit(
                LevelMask::ERROR | LevelMask::CRIT | LevelMask::ALERT | LevelMask::EMERG,
            ),
            options: Setting::Explicit(FormatOptions::NO_TIME | FormatOptions::NO_PID),
        },
        // Nothing goes to the system log.
        syslog: SyslogConfig {
            levels: Setting::Explicit(LevelMask::empty()),
            include_pid: false,
        },
        // The name that appears in formatted output.
        name: String::from("example"),
    };

    if !fanlog::init(config) {
        return report_error();
    }

    // Add a log file taking every level, without the process name.
    let Some(_file) = fanlog::add_file(
        "log-example.log",
        Setting::Explicit(LevelMask::all()),
        Setting::Explicit(FormatOptions::NO_NAME),
    ) else {
        return report_error();
    };

    let n = 123_456_789;
    let s = "This is a test string";
    let f = 0.0009_f64;

    // One message per level; a trailing newline is appended automatically.
    fanlog::debug!("debug message: {{ n={n}, s='{s}', f={f:.4} }}");
    fanlog::info!("info message: {{ n={n}, s='{s}', f={f:.4} }}");
    fanlog::notice!("notice message: {{ n={n}, s='{s}', f={f:.4} }}");
    fanlog::warn!("warning message: {{ n={n}, s='{s}', f={f:.4} }}");
    fanlog::error!("error message: {{ n={n}, s='{s}', f={f:.4} }}");
    fanlog::crit!("critical message: {{ n={n}, s='{s}', f={f:.4} }}");
    fanlog::alert!("alert message: {{ n={n}, s='{s}', f={f:.4} }}");
    fanlog::emerg!("emergency message: {{ n={n}, s='{s}', f={f:.4} }}");

    fanlog::cleanup();
    ExitCode::SUCCESS
}

fn report_error() -> ExitCode {
    let err = fanlog::last_error();
    eprintln!("fanlog error: ({}, {})", err.code(), err.message);
    ExitCode::FAILURE
}
