// Copyright 2023 Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The log-file cache: up to sixteen open append-mode files, each with its
//! own level mask and option mask, plus the size-triggered roll/archive
//! path.
//!
//! Entries are addressed through stable [`FileId`] handles drawn from a
//! process-global counter, so a handle can never come back to life after
//! its file is removed. The whole cache sits behind one lock; dispatch
//! renders once per distinct option mask while walking the entries.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::buffer::FixedString;
use crate::config::{Setting, FILE_DEFAULT_LEVELS, FILE_DEFAULT_OPTIONS};
use crate::error::{fail, fail_io, ErrorKind, OpResult};
use crate::format::{assemble, Fields};
use crate::level::{Level, LevelMask};
use crate::options::FormatOptions;
use crate::state::{lock_section, sanity};
use crate::{platform, MAX_FILES, MAX_OUTPUT, MAX_TIME};

/// A log file is rolled once it reaches this size.
pub(crate) const ROLL_SIZE: u64 = 10 * 1024 * 1024;

const SESSION_BEGIN: &str = "session begin @";

/// Opaque, stable handle to one cached log file, valid until
/// [`crate::remove_file`]. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(u64);

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

// Disambiguates archives rolled within the same second, process-wide.
static ARCHIVE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
struct LogFile {
    id: FileId,
    path: PathBuf,
    levels: LevelMask,
    options: FormatOptions,
    writer: BufWriter<File>,
}

impl LogFile {
    fn open(path: &Path, levels: LevelMask, options: FormatOptions) -> OpResult<LogFile> {
        let file = match OpenOptions::new().append(true).create(true).open(path) {
            Ok(file) => file,
            Err(err) => fail_io!(err),
        };
        Ok(LogFile {
            id: FileId(NEXT_FILE_ID.fetch_add(1, Ordering::SeqCst)),
            path: path.to_path_buf(),
            levels,
            options,
            writer: BufWriter::new(file),
        })
    }

    /// Appends `text`, rolling the file first when it has reached
    /// [`ROLL_SIZE`]. A failed roll fails the write and leaves the file as
    /// it was.
    fn write(&mut self, text: &str) -> OpResult {
        if self.needs_roll() {
            let archive = self.roll()?;
            let mut note = FixedString::<MAX_OUTPUT>::new();
            let _ = write!(note, "archived as {} due to size @", archive.display());
            self.write_header(note.as_str())?;
        }
        if let Err(err) = self.writer.write_all(text.as_bytes()) {
            fail_io!(err);
        }
        Ok(())
    }

    /// Writes the banner line `\n\n----- <what> <stamp> -----\n\n`.
    fn write_header(&mut self, what: &str) -> OpResult {
        let mut stamp = FixedString::<MAX_TIME>::new();
        platform::now().write_header_stamp(&mut stamp);
        let mut header = FixedString::<MAX_OUTPUT>::new();
        let _ = write!(header, "\n\n----- {what} {} -----\n\n", stamp.as_str());
        self.write(header.as_str())
    }

    // Unflushed bytes are not counted; dispatch flushes after every walk,
    // so the drift is at most one message.
    fn needs_roll(&self) -> bool {
        match self.writer.get_ref().metadata() {
            Ok(metadata) => metadata.len() >= ROLL_SIZE,
            Err(err) => {
                crate::error::record_io(&err, module_path!(), file!(), line!());
                false
            }
        }
    }

    /// Renames the file to its archive name and reopens the original path.
    /// Fails without touching the file when the archive name is taken.
    fn roll(&mut self) -> OpResult<PathBuf> {
        let mut stamp = FixedString::<MAX_TIME>::new();
        platform::now().write_archive_stamp(&mut stamp);
        let sequence = ARCHIVE_SEQUENCE.fetch_add(1, Ordering::SeqCst);
        let archive = archive_path(&self.path, stamp.as_str(), sequence);

        if archive.exists() {
            let err = std::io::Error::from(std::io::ErrorKind::AlreadyExists);
            fail_io!(err);
        }

        // Land buffered bytes in the file that is about to become the
        // archive. The descriptor stays open across the rename.
        if let Err(err) = self.writer.flush() {
            fail_io!(err);
        }
        if let Err(err) = std::fs::rename(&self.path, &archive) {
            fail_io!(err);
        }
        let reopened = match OpenOptions::new().append(true).create(true).open(&self.path) {
            Ok(file) => file,
            Err(err) => fail_io!(err),
        };
        self.writer = BufWriter::new(reopened);
        Ok(archive)
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

/// `<stem>-<stamp>-<sequence><extension>` alongside the original.
fn archive_path(path: &Path, stamp: &str, sequence: u64) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(format!("-{stamp}-{sequence}"));
    if let Some(extension) = path.extension() {
        name.push(".");
        name.push(extension);
    }
    path.with_file_name(name)
}

#[cfg(unix)]
fn same_path(a: &Path, b: &Path) -> bool {
    a == b
}

// File names are not case sensitive elsewhere.
#[cfg(not(unix))]
fn same_path(a: &Path, b: &Path) -> bool {
    a.to_string_lossy()
        .eq_ignore_ascii_case(&b.to_string_lossy())
}

/// The bounded set of open log files.
#[derive(Debug, Default)]
pub(crate) struct FileCache {
    files: Vec<LogFile>,
}

lazy_static! {
    pub(crate) static ref FILE_CACHE: Mutex<FileCache> = Mutex::new(FileCache::default());
}

impl FileCache {
    /// Opens `path` in append mode and caches it. Writes the session-begin
    /// header unless suppressed. Fails when the cache is full or the path
    /// is already cached.
    fn add(&mut self, path: &Path, levels: LevelMask, options: FormatOptions) -> OpResult<FileId> {
        if self.files.len() >= MAX_FILES {
            fail!(ErrorKind::CacheFull);
        }
        if self.files.iter().any(|file| same_path(&file.path, path)) {
            fail!(ErrorKind::DuplicateFile);
        }

        let mut file = LogFile::open(path, levels, options)?;
        if !options.contains(FormatOptions::NO_HEADER) {
            // Header failures don't unwind the add; the file is usable.
            let _ = file.write_header(SESSION_BEGIN);
        }
        let id = file.id;
        self.files.push(file);
        Ok(id)
    }

    fn find(&mut self, id: FileId) -> OpResult<&mut LogFile> {
        match self.files.iter_mut().find(|file| file.id == id) {
            Some(file) => Ok(file),
            None => fail!(ErrorKind::NoSuchFile),
        }
    }

    fn set_levels(&mut self, id: FileId, levels: LevelMask) -> OpResult {
        self.find(id)?.levels = levels;
        Ok(())
    }

    fn set_options(&mut self, id: FileId, options: FormatOptions) -> OpResult {
        self.find(id)?.options = options;
        Ok(())
    }

    fn remove(&mut self, id: FileId) -> OpResult {
        match self.files.iter().position(|file| file.id == id) {
            Some(index) => {
                let mut file = self.files.remove(index);
                file.flush();
                Ok(())
            }
            None => fail!(ErrorKind::NoSuchFile),
        }
    }

    /// Formats and appends to every file whose mask admits `level`,
    /// re-rendering only when the option mask changes between entries.
    /// Returns `(wanted, dispatched)` so the caller can detect partial
    /// failure.
    pub(crate) fn dispatch(&mut self, level: Level, fields: &Fields<'_>) -> (usize, usize) {
        let mut wanted = 0;
        let mut dispatched = 0;
        let mut out = FixedString::<MAX_OUTPUT>::new();
        let mut rendered: Option<FormatOptions> = None;

        for file in &mut self.files {
            if !file.levels.admits(level) {
                continue;
            }
            wanted += 1;
            if rendered != Some(file.options) {
                assemble(false, file.options, fields, &mut out);
                rendered = Some(file.options);
            }
            if file.write(out.as_str()).is_ok() {
                dispatched += 1;
            }
        }

        if dispatched > 0 {
            self.flush_all();
        }
        (wanted, dispatched)
    }

    pub(crate) fn flush_all(&mut self) {
        for file in &mut self.files {
            file.flush();
        }
    }

    /// Flushes and closes everything; used by cleanup.
    pub(crate) fn destroy(&mut self) {
        for file in &mut self.files {
            file.flush();
        }
        self.files.clear();
    }
}

/// Adds a file to the process-wide cache; see [`crate::add_file`].
pub(crate) fn add(
    path: &Path,
    levels: Setting<LevelMask>,
    options: Setting<FormatOptions>,
) -> OpResult<FileId> {
    sanity()?;
    if path.as_os_str().is_empty() {
        fail!(ErrorKind::InvalidString);
    }
    let levels = levels.resolve(FILE_DEFAULT_LEVELS);
    let options = options.resolve(FILE_DEFAULT_OPTIONS);
    levels.validate()?;
    options.validate()?;
    let mut cache = lock_section(&FILE_CACHE);
    cache.add(path, levels, options)
}

/// Replaces a cached file's level mask; see [`crate::set_file_levels`].
pub(crate) fn set_levels(id: FileId, levels: Setting<LevelMask>) -> OpResult {
    sanity()?;
    let levels = levels.resolve(FILE_DEFAULT_LEVELS);
    levels.validate()?;
    let mut cache = lock_section(&FILE_CACHE);
    cache.set_levels(id, levels)
}

/// Replaces a cached file's option mask; see [`crate::set_file_options`].
pub(crate) fn set_options(id: FileId, options: Setting<FormatOptions>) -> OpResult {
    sanity()?;
    let options = options.resolve(FILE_DEFAULT_OPTIONS);
    options.validate()?;
    let mut cache = lock_section(&FILE_CACHE);
    cache.set_options(id, options)
}

/// Closes and uncaches a file; see [`crate::remove_file`].
pub(crate) fn remove(id: FileId) -> OpResult {
    sanity()?;
    let mut cache = lock_section(&FILE_CACHE);
    cache.remove(id)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    // Unique scratch paths; the cache under test is always a local one.
    fn scratch(tag: &str) -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "fanlog-filecache-{}-{tag}-{n}.log",
            std::process::id()
        ))
    }

    fn fields<'a>(message: &'a str) -> Fields<'a> {
        Fields {
            style: "",
            timestamp: "10:20:30",
            msec: ".400",
            level_tag: "[DEBG]",
            name: "cache-test",
            pid: "1",
            tid: "",
            message,
        }
    }

    #[test]
    fn test_archive_path_shapes() {
        assert_eq!(
            archive_path(Path::new("foo.log"), "2023-07-04-090503", 3),
            PathBuf::from("foo-2023-07-04-090503-3.log")
        );
        assert_eq!(
            archive_path(Path::new("/var/log/app.out.log"), "S", 0),
            PathBuf::from("/var/log/app.out-S-0.log")
        );
        // No extension: the stamp lands at the end.
        assert_eq!(
            archive_path(Path::new("/tmp/noext"), "S", 7),
            PathBuf::from("/tmp/noext-S-7")
        );
    }

    #[test]
    fn test_add_writes_session_header() {
        let path = scratch("header");
        let mut cache = FileCache::default();
        cache
            .add(&path, LevelMask::all(), FormatOptions::empty())
            .unwrap();
        cache.destroy();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("\n\n----- session begin @ "));
        assert!(text.trim_end().ends_with("-----"));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_no_header_option() {
        let path = scratch("no-header");
        let mut cache = FileCache::default();
        cache
            .add(&path, LevelMask::all(), FormatOptions::NO_HEADER)
            .unwrap();
        cache.destroy();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_duplicate_and_full_and_remove() {
        let mut cache = FileCache::default();
        let mut paths = Vec::new();
        let mut ids = Vec::new();
        for n in 0..MAX_FILES {
            let path = scratch(&format!("full-{n}"));
            let id = cache
                .add(&path, LevelMask::all(), FormatOptions::NO_HEADER)
                .unwrap();
            assert!(!ids.contains(&id));
            ids.push(id);
            paths.push(path);
        }

        // Same path again: duplicate.
        assert!(cache
            .add(&paths[0], LevelMask::all(), FormatOptions::NO_HEADER)
            .is_err());
        // Seventeenth file: full.
        let extra = scratch("extra");
        assert!(cache
            .add(&extra, LevelMask::all(), FormatOptions::NO_HEADER)
            .is_err());

        // Remove once works, twice fails, and the handle never returns.
        cache.remove(ids[3]).unwrap();
        assert!(cache.remove(ids[3]).is_err());
        let replacement = cache
            .add(&extra, LevelMask::all(), FormatOptions::NO_HEADER)
            .unwrap();
        assert!(!ids.contains(&replacement));

        cache.destroy();
        for path in paths {
            fs::remove_file(path).unwrap();
        }
        fs::remove_file(extra).unwrap();
    }

    #[test]
    fn test_update_masks_by_handle() {
        let path = scratch("update");
        let mut cache = FileCache::default();
        let id = cache
            .add(&path, LevelMask::all(), FormatOptions::NO_HEADER)
            .unwrap();

        cache.set_levels(id, LevelMask::EMERG).unwrap();
        cache.set_options(id, FormatOptions::MSG_ONLY).unwrap();
        assert_eq!(cache.files[0].levels, LevelMask::EMERG);
        assert_eq!(cache.files[0].options, FormatOptions::MSG_ONLY);

        let bogus = FileId(u64::MAX);
        assert!(cache.set_levels(bogus, LevelMask::all()).is_err());
        assert!(cache.set_options(bogus, FormatOptions::empty()).is_err());

        cache.destroy();
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_dispatch_respects_masks_and_counts() {
        let debug_path = scratch("dispatch-debug");
        let emerg_path = scratch("dispatch-emerg");
        let mut cache = FileCache::default();
        cache
            .add(
                &debug_path,
                LevelMask::DEBUG,
                FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER,
            )
            .unwrap();
        cache
            .add(
                &emerg_path,
                LevelMask::EMERG,
                FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER,
            )
            .unwrap();

        let (wanted, dispatched) = cache.dispatch(Level::Debug, &fields("only debug"));
        assert_eq!((wanted, dispatched), (1, 1));
        let (wanted, dispatched) = cache.dispatch(Level::Warn, &fields("nobody"));
        assert_eq!((wanted, dispatched), (0, 0));

        cache.destroy();
        assert_eq!(fs::read_to_string(&debug_path).unwrap(), "only debug\n");
        assert_eq!(fs::read_to_string(&emerg_path).unwrap(), "");
        fs::remove_file(debug_path).unwrap();
        fs::remove_file(emerg_path).unwrap();
    }

    #[test]
    fn test_dispatch_renders_per_option_mask() {
        let decorated = scratch("render-decorated");
        let bare = scratch("render-bare");
        let mut cache = FileCache::default();
        cache
            .add(&decorated, LevelMask::all(), FormatOptions::NO_HEADER)
            .unwrap();
        cache
            .add(
                &bare,
                LevelMask::all(),
                FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER,
            )
            .unwrap();

        cache.dispatch(Level::Debug, &fields("two ways"));
        cache.destroy();

        assert_eq!(
            fs::read_to_string(&decorated).unwrap(),
            "10:20:30.400 [DEBG] cache-test (1): two ways\n"
        );
        assert_eq!(fs::read_to_string(&bare).unwrap(), "two ways\n");
        fs::remove_file(decorated).unwrap();
        fs::remove_file(bare).unwrap();
    }

    #[test]
    fn test_roll_archives_once() {
        let path = scratch("roll");
        // Pre-fill to just under the threshold, as a foreign writer would.
        let filler = vec![b'x'; usize::try_from(ROLL_SIZE).unwrap() - 1024];
        fs::write(&path, &filler).unwrap();

        let mut cache = FileCache::default();
        cache
            .add(
                &path,
                LevelMask::DEBUG,
                FormatOptions::MSG_ONLY | FormatOptions::NO_HEADER,
            )
            .unwrap();

        let line = "a".repeat(39);
        for _ in 0..40 {
            let (wanted, dispatched) = cache.dispatch(Level::Debug, &fields(&line));
            assert_eq!((wanted, dispatched), (1, 1));
        }
        cache.destroy();

        // Exactly one archive next to the live file.
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
        assert_eq!(archives.len(), 1);

        // The archive holds the pre-fill; the live file restarted small
        // with a roll note.
        assert!(fs::metadata(&archives[0]).unwrap().len() >= ROLL_SIZE);
        let live = fs::read_to_string(&path).unwrap();
        assert!(live.len() < 8192);
        assert!(live.contains("due to size @"));
        assert!(live.contains(&archives[0].file_name().unwrap().to_string_lossy().into_owned()));

        fs::remove_file(&path).unwrap();
        fs::remove_file(&archives[0]).unwrap();
    }
}
