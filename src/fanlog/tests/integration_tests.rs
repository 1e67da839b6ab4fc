// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests against the process-wide logger.
//!
//! The library holds one state record per process, so every test takes
//! `SESSION` for the duration and tears the library down when it drops,
//! keeping the harness's parallel test threads out of each other's way.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;

use fanlog::{
    ErrorKind, FormatOptions, InitConfig, LevelMask, Setting, StreamConfig, SyslogConfig,
};

static SESSION: Mutex<()> = Mutex::new(());

/// Holds the session lock, initializes with `config`, and cleans up on
/// drop (also when the test panics).
struct Session {
    _guard: MutexGuard<'static, ()>,
}

impl Session {
    fn start(config: InitConfig) -> Session {
        let guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
        assert!(fanlog::init(config));
        assert_eq!(fanlog::last_error().kind, ErrorKind::NoError);
        Session { _guard: guard }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        fanlog::cleanup();
    }
}

/// A quiet configuration: no console, no syslog; tests observe through
/// file destinations.
fn files_only() -> InitConfig {
    InitConfig {
        stdout: StreamConfig {
            levels: Setting::Explicit(LevelMask::empty()),
            options: Setting::Default,
        },
        stderr: StreamConfig {
            levels: Setting::Explicit(LevelMask::empty()),
            options: Setting::Default,
        },
        syslog: SyslogConfig {
            levels: Setting::Explicit(LevelMask::empty()),
            include_pid: false,
        },
        name: String::from("itest"),
    }
}

fn scratch(tag: &str) -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("fanlog-itest-{}-{tag}-{n}.log", std::process::id()))
}

#[test]
fn test_init_cleanup_lifecycle() {
    let guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);

    assert!(fanlog::init(files_only()));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NoError);

    // A second init fails and reports it.
    assert!(!fanlog::init(files_only()));
    assert_eq!(fanlog::last_error().kind, ErrorKind::AlreadyInit);

    assert!(fanlog::cleanup());

    // After cleanup every call other than init fails with "not ready".
    assert!(!fanlog::cleanup());
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);
    assert!(!fanlog::info!("x"));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);
    assert!(fanlog::add_file("unused.log", Setting::Default, Setting::Default).is_none());
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);
    assert!(!fanlog::set_stdout_levels(Setting::Default));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);
    assert!(!fanlog::set_stderr_options(Setting::Default));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);
    assert!(!fanlog::set_syslog_levels(Setting::Default));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);
    assert!(!fanlog::set_text_style(
        fanlog::Level::Info,
        fanlog::TextStyle::FG_RED
    ));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);
    assert!(!fanlog::reset_text_styles());
    assert_eq!(fanlog::last_error().kind, ErrorKind::NotReady);

    // Re-initialization works.
    assert!(fanlog::init(files_only()));
    assert!(fanlog::cleanup());

    drop(guard);
}

#[test]
fn test_no_destination() {
    let session = Session::start(files_only());

    assert!(!fanlog::info!("x"));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NoDestination);
    assert_eq!(fanlog::last_error().code(), 10);

    drop(session);
}

#[test]
fn test_empty_message_rejected() {
    let session = Session::start(files_only());
    let path = scratch("empty-message");
    fanlog::add_file(&path, Setting::Default, Setting::Default).unwrap();

    assert!(!fanlog::info!(""));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidString);

    drop(session);
    fs::remove_file(path).unwrap();
}

#[test]
fn test_file_cache_limits() {
    let session = Session::start(files_only());

    let mut paths = Vec::new();
    let mut ids = Vec::new();
    for n in 0..16 {
        let path = scratch(&format!("limits-{n}"));
        // Alternate full formatting and message-only, as real setups mix.
        let options = if n % 2 == 0 {
            Setting::Explicit(FormatOptions::MSG_ONLY)
        } else {
            Setting::Default
        };
        let id = fanlog::add_file(&path, Setting::Default, options).unwrap();
        assert!(!ids.contains(&id), "handles must be distinct");
        ids.push(id);
        paths.push(path);
        assert!(fanlog::info!("test {n}"));
    }

    // The seventeenth file is refused.
    let extra = scratch("limits-extra");
    assert!(fanlog::add_file(&extra, Setting::Default, Setting::Default).is_none());
    assert_eq!(fanlog::last_error().kind, ErrorKind::CacheFull);

    // A duplicate path is refused.
    assert!(fanlog::add_file(&paths[5], Setting::Default, Setting::Default).is_none());
    assert_eq!(fanlog::last_error().kind, ErrorKind::DuplicateFile);

    // Each handle removes exactly once; removed handles stay dead.
    for id in &ids {
        assert!(fanlog::remove_file(*id));
    }
    for id in &ids {
        assert!(!fanlog::remove_file(*id));
        assert_eq!(fanlog::last_error().kind, ErrorKind::NoSuchFile);
    }
    let replacement = fanlog::add_file(&extra, Setting::Default, Setting::Default).unwrap();
    assert!(!ids.contains(&replacement));
    assert!(fanlog::remove_file(replacement));

    drop(session);
    for path in paths {
        fs::remove_file(path).unwrap();
    }
    fs::remove_file(extra).unwrap();
}

#[test]
fn test_level_masks_select_destinations() {
    let session = Session::start(files_only());

    let admitted_path = scratch("masks-admitted");
    let ignored_path = scratch("masks-ignored");
    fanlog::add_file(
        &admitted_path,
        Setting::Explicit(LevelMask::WARN | LevelMask::EMERG),
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();
    fanlog::add_file(
        &ignored_path,
        Setting::Explicit(LevelMask::INFO),
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();

    assert!(fanlog::warn!("warned"));
    assert!(fanlog::emerg!("paged"));
    assert!(fanlog::info!("chatted"));
    // Nothing admits debug: the call fails.
    assert!(!fanlog::debug!("dropped"));
    assert_eq!(fanlog::last_error().kind, ErrorKind::NoDestination);

    drop(session);
    assert_eq!(fs::read_to_string(&admitted_path).unwrap(), "warned\npaged\n");
    assert_eq!(fs::read_to_string(&ignored_path).unwrap(), "chatted\n");
    fs::remove_file(admitted_path).unwrap();
    fs::remove_file(ignored_path).unwrap();
}

#[test]
fn test_file_output_shape() {
    // The demonstration setup: a file taking every level without the
    // process name, one message per level.
    let session = Session::start(files_only());
    let path = scratch("shape");
    fanlog::add_file(
        &path,
        Setting::Explicit(LevelMask::all()),
        Setting::Explicit(FormatOptions::NO_NAME),
    )
    .unwrap();

    let n = 123_456_789;
    let s = "This is a test string";
    let f = 0.0009_f64;
    assert!(fanlog::debug!("debug message: {{ n={n}, s='{s}', f={f:.4} }}"));
    assert!(fanlog::info!("info message: {{ n={n}, s='{s}', f={f:.4} }}"));
    assert!(fanlog::notice!("notice message: {{ n={n}, s='{s}', f={f:.4} }}"));
    assert!(fanlog::warn!("warn message: {{ n={n}, s='{s}', f={f:.4} }}"));
    assert!(fanlog::error!("error message: {{ n={n}, s='{s}', f={f:.4} }}"));
    assert!(fanlog::crit!("crit message: {{ n={n}, s='{s}', f={f:.4} }}"));
    assert!(fanlog::alert!("alert message: {{ n={n}, s='{s}', f={f:.4} }}"));
    assert!(fanlog::emerg!("emerg message: {{ n={n}, s='{s}', f={f:.4} }}"));

    drop(session);
    let text = fs::read_to_string(&path).unwrap();

    // Session-begin banner at the top.
    assert!(text.starts_with("\n\n----- session begin @ "));

    let lines: Vec<&str> = text
        .lines()
        .filter(|line| line.contains(" message: "))
        .collect();
    assert_eq!(lines.len(), 8);
    let pid = std::process::id().to_string();
    for (line, tag) in lines.iter().zip([
        "[DEBG]", "[INFO]", "[NOTI]", "[WARN]", "[ERRO]", "[CRIT]", "[ALRT]", "[EMRG]",
    ]) {
        // HH:MM:SS.mmm, then the tag, then pid (no name, so no parens).
        let bytes = line.as_bytes();
        assert_eq!(bytes[2], b':');
        assert_eq!(bytes[5], b':');
        assert_eq!(bytes[8], b'.');
        assert!(line.contains(tag), "{line}");
        assert!(!line.contains("itest"));
        assert!(line.contains(&pid));
        assert!(line.ends_with("{ n=123456789, s='This is a test string', f=0.0009 }"));
    }

    fs::remove_file(path).unwrap();
}

#[test]
fn test_update_operations() {
    let session = Session::start(files_only());
    let path = scratch("updates");
    let id = fanlog::add_file(
        &path,
        Setting::Explicit(LevelMask::INFO),
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();

    assert!(fanlog::info!("first"));
    assert!(!fanlog::debug!("invisible"));

    // Widen the file to every level, then log at debug.
    assert!(fanlog::set_file_levels(id, Setting::Default));
    assert!(fanlog::debug!("second"));

    // Turn decorations back on for the file.
    assert!(fanlog::set_file_options(id, Setting::Default));
    assert!(fanlog::info!("third"));

    // Stream and syslog updates accept values and sentinels.
    assert!(fanlog::set_stdout_levels(Setting::Explicit(LevelMask::empty())));
    assert!(fanlog::set_stdout_options(Setting::Default));
    assert!(fanlog::set_stderr_levels(Setting::Explicit(LevelMask::empty())));
    assert!(fanlog::set_stderr_options(Setting::Default));
    assert!(fanlog::set_syslog_levels(Setting::Explicit(LevelMask::empty())));

    drop(session);
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "first");
    assert_eq!(lines[1], "second");
    // The third line is decorated again.
    assert!(lines[2].contains("[INFO]"));
    assert!(lines[2].contains("itest"));
    assert!(lines[2].ends_with(": third"));
    fs::remove_file(path).unwrap();
}

#[test]
fn test_invalid_style_leaves_default() {
    let session = Session::start(files_only());
    let path = scratch("style");
    fanlog::add_file(
        &path,
        Setting::Default,
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();

    assert!(!fanlog::set_text_style(
        fanlog::Level::Info,
        fanlog::TextStyle::from_bits(0xf313)
    ));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidTextStyle);
    assert_eq!(fanlog::last_error().code(), 8);

    // Logging still works after the rejected override.
    assert!(fanlog::info!("still standing"));

    // A valid override and a reset both succeed.
    assert!(fanlog::set_text_style(
        fanlog::Level::Info,
        fanlog::TextStyle::FG_RED
    ));
    assert!(fanlog::reset_text_styles());

    drop(session);
    assert_eq!(fs::read_to_string(&path).unwrap(), "still standing\n");
    fs::remove_file(path).unwrap();
}

#[test]
fn test_invalid_mask_bits_rejected() {
    let guard = SESSION.lock().unwrap_or_else(PoisonError::into_inner);

    // Masks carrying bits outside their regions survive
    // `from_bits_retain` but are refused at every configuration boundary.
    let junk_levels = LevelMask::from_bits_retain(0x4100);
    let junk_options = FormatOptions::from_bits_retain(0x242);

    // An init carrying them is refused outright.
    let mut config = files_only();
    config.stdout.levels = Setting::Explicit(junk_levels);
    assert!(!fanlog::init(config));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidLevels);
    assert_eq!(fanlog::last_error().code(), 7);

    let mut config = files_only();
    config.stderr.options = Setting::Explicit(junk_options);
    assert!(!fanlog::init(config));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidOptions);
    assert_eq!(fanlog::last_error().code(), 6);

    // So is every update path, leaving the running setup untouched.
    assert!(fanlog::init(files_only()));
    let path = scratch("invalid-masks");
    let id = fanlog::add_file(
        &path,
        Setting::Default,
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();

    assert!(!fanlog::set_stdout_levels(Setting::Explicit(junk_levels)));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidLevels);
    assert!(!fanlog::set_syslog_levels(Setting::Explicit(junk_levels)));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidLevels);
    assert!(!fanlog::set_stderr_options(Setting::Explicit(junk_options)));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidOptions);
    assert!(!fanlog::set_file_levels(id, Setting::Explicit(junk_levels)));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidLevels);
    assert!(!fanlog::set_file_options(id, Setting::Explicit(junk_options)));
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidOptions);
    let rejected = scratch("invalid-masks-rejected");
    assert!(fanlog::add_file(&rejected, Setting::Explicit(junk_levels), Setting::Default).is_none());
    assert_eq!(fanlog::last_error().kind, ErrorKind::InvalidLevels);
    // Validation fires before the open: nothing was created on disk.
    assert!(!rejected.exists());

    assert!(fanlog::debug!("still configured"));

    fanlog::cleanup();
    drop(guard);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("still configured"));
    fs::remove_file(path).unwrap();
}

#[test]
fn test_message_truncation() {
    let session = Session::start(files_only());
    let path = scratch("truncation");
    fanlog::add_file(
        &path,
        Setting::Default,
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();

    let oversize = "y".repeat(fanlog::MAX_MESSAGE + 100);
    assert!(fanlog::info!("{oversize}"));

    drop(session);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with('\n'));
    assert_eq!(text.len(), fanlog::MAX_MESSAGE + 1);
    fs::remove_file(path).unwrap();
}

#[test]
fn test_roll_creates_one_archive() {
    let session = Session::start(files_only());
    let path = scratch("roll");

    // Fill to 10 MiB minus 1 KiB by direct bytes, the way a previous
    // session would have.
    fs::write(&path, vec![b'z'; 10 * 1024 * 1024 - 1024]).unwrap();

    fanlog::add_file(
        &path,
        Setting::Explicit(LevelMask::DEBUG),
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();

    let line = "b".repeat(39);
    for _ in 0..40 {
        assert!(fanlog::debug!("{line}"));
    }

    drop(session);

    let stem = path.file_stem().unwrap().to_string_lossy().into_owned();
    let archives: Vec<PathBuf> = fs::read_dir(std::env::temp_dir())
        .unwrap()
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p != &path
                && p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(&format!("{stem}-")))
        })
        .collect();
    assert_eq!(archives.len(), 1, "exactly one archive expected");

    // The live file restarted and notes where the old bytes went.
    let live = fs::read_to_string(&path).unwrap();
    assert!(live.contains("due to size @"));
    let modified_archive = fs::metadata(&archives[0]).unwrap().modified().unwrap();
    let modified_live = fs::metadata(&path).unwrap().modified().unwrap();
    assert!(modified_archive <= modified_live);

    fs::remove_file(&path).unwrap();
    fs::remove_file(&archives[0]).unwrap();
}

#[test]
fn test_two_threads_race() {
    let session = Session::start(files_only());

    let run = |tag: &'static str, level_mask: LevelMask, level: fanlog::Level| {
        move || {
            let path = scratch(tag);
            let options =
                Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER);
            let mut id = fanlog::add_file(&path, Setting::Explicit(level_mask), options).unwrap();

            for n in 0..1000 {
                assert!(fanlog::log(
                    level,
                    format_args!("{tag} line {n:04} abcdefghijklmnopqrstuvwxyz")
                ));

                // Periodically bounce the file and the style table.
                if n % 250 == 249 {
                    assert!(fanlog::remove_file(id));
                    id = fanlog::add_file(&path, Setting::Explicit(level_mask), options).unwrap();
                }
                if n % 100 == 0 {
                    let style = if n % 200 == 0 {
                        fanlog::TextStyle::FG_RED
                    } else {
                        fanlog::TextStyle::FG_CYAN | fanlog::TextStyle::BG_YELLOW
                    };
                    assert!(fanlog::set_text_style(level, style));
                }
            }
            path
        }
    };

    let a = thread::spawn(run("race-a", LevelMask::DEBUG, fanlog::Level::Debug));
    let b = thread::spawn(run("race-b", LevelMask::NOTICE, fanlog::Level::Notice));
    let path_a = a.join().unwrap();
    let path_b = b.join().unwrap();

    drop(session);

    for (path, tag) in [(&path_a, "race-a"), (&path_b, "race-b")] {
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1000);
        for (n, line) in lines.iter().enumerate() {
            // Every message is intact: never split, never interleaved.
            assert_eq!(
                line,
                &format!("{tag} line {n:04} abcdefghijklmnopqrstuvwxyz")
            );
        }
    }
    fs::remove_file(path_a).unwrap();
    fs::remove_file(path_b).unwrap();
}

#[test]
fn test_log_crate_facade() {
    let session = Session::start(files_only());
    let path = scratch("facade");
    fanlog::add_file(
        &path,
        Setting::Default,
        Setting::Explicit(FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER),
    )
    .unwrap();

    // First registration wins; in this process that is ours.
    assert!(fanlog::attach_log_facade());
    log::info!("routed {}", 1);
    log::warn!("routed {}", 2);
    // A second registration reports failure.
    assert!(!fanlog::attach_log_facade());

    drop(session);
    assert_eq!(fs::read_to_string(&path).unwrap(), "routed 1\nrouted 2\n");
    fs::remove_file(path).unwrap();
}
