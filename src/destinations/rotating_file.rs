//! Size-bounded rotating file manager and the file destination built on it
//!
//! The manager owns one log file: appends are serialized under an exclusive
//! lock, and when an append pushes the file over its byte ceiling a trim is
//! scheduled on a dedicated worker thread so callers never wait on trim I/O.
//! A trim keeps the maximal suffix of whole lines that fits under the
//! ceiling and replaces the file atomically, so a concurrent reader sees
//! either the pre-trim or the post-trim file, never a torn one.

use crate::core::destination::Destination;
use crate::core::error::{default_reporter, ErrorReporter, FlexError, Result};
use crate::core::record::LogRecord;
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Absolute ceiling for a single log file, in whole megabytes. Requests
/// beyond this are a configuration error, not a clamp: it bounds worst-case
/// trim cost and catches misconfiguration before a file grows unchecked.
pub const MAX_FILE_SIZE_MB: u64 = 10;

/// State shared between the appending side and the trim worker.
struct FileState {
    path: PathBuf,
    max_bytes: u64,
    /// Exclusive lock over every file operation. Appends are serialized
    /// against each other and against trims; a trim never observes a
    /// half-written entry.
    io_lock: Mutex<()>,
    /// Trims scheduled but not yet completed. Lets `wait_idle` observe the
    /// worker settling without touching the file.
    pending_trims: AtomicUsize,
    /// Swappable so a reporter injected after construction reaches the
    /// worker thread too.
    on_error: Mutex<ErrorReporter>,
}

impl FileState {
    fn report(&self, err: &FlexError) {
        let reporter = Arc::clone(&self.on_error.lock());
        reporter(err);
    }
}

impl FileState {
    /// Discard the oldest lines until the file fits under the ceiling.
    ///
    /// Keeps, from the end of the file backward, the maximal suffix of
    /// lines whose re-encoded size (UTF-8 bytes plus one per newline) stays
    /// within `max_bytes`. A single line larger than the whole ceiling is
    /// dropped, never split. Trimming nothing is a no-op, which makes
    /// redundant scheduling harmless.
    fn trim(&self) -> Result<()> {
        let _guard = self.io_lock.lock();

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(FlexError::file_trim(
                    self.path.display().to_string(),
                    format!("Failed to read log file: {}", e),
                ))
            }
        };
        // A crashed prior run can leave a torn multibyte sequence behind;
        // replace it rather than letting every future trim fail on it.
        let content = String::from_utf8_lossy(&bytes);

        let lines: Vec<&str> = content.lines().collect();
        let (kept_from, _kept_bytes) = trailing_fit(&lines, self.max_bytes);

        if kept_from == 0 {
            // Whole file already fits; nothing to rewrite.
            return Ok(());
        }

        let mut trimmed = lines[kept_from..].join("\n");
        if !trimmed.is_empty() {
            trimmed.push('\n');
        }

        // Write to a temporary sibling first, then swap it in atomically so
        // a crash mid-trim never leaves a truncated log behind.
        let tmp_path = sibling_tmp_path(&self.path);
        let mut tmp = File::create(&tmp_path).map_err(|e| {
            FlexError::file_trim(
                self.path.display().to_string(),
                format!("Failed to create temp file '{}': {}", tmp_path.display(), e),
            )
        })?;
        tmp.write_all(trimmed.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                FlexError::file_trim(
                    self.path.display().to_string(),
                    format!("Failed to write trimmed content: {}", e),
                )
            })?;
        drop(tmp);

        if let Err(first) = fs::rename(&tmp_path, &self.path) {
            // Some platforms refuse to rename over an existing file.
            // Fall back to remove-then-rename.
            let _ = fs::remove_file(&self.path);
            fs::rename(&tmp_path, &self.path).map_err(|_| {
                let _ = fs::remove_file(&tmp_path);
                FlexError::file_trim(
                    self.path.display().to_string(),
                    format!("Failed to replace log file: {}", first),
                )
            })?;
        }

        Ok(())
    }
}

/// Index of the first line in the maximal trailing run of `lines` whose
/// cumulative re-encoded size fits in `max_bytes`, plus that run's size.
fn trailing_fit(lines: &[&str], max_bytes: u64) -> (usize, u64) {
    let mut kept_bytes: u64 = 0;
    let mut kept_from = lines.len();

    for (idx, line) in lines.iter().enumerate().rev() {
        let line_bytes = line.len() as u64 + 1; // +1 for the newline
        if kept_bytes + line_bytes > max_bytes {
            break;
        }
        kept_bytes += line_bytes;
        kept_from = idx;
    }

    (kept_from, kept_bytes)
}

fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let file_name = tmp
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("flexlog");
    tmp.set_file_name(format!("{}.trim", file_name));
    tmp
}

/// Owns one append-only log file with a byte-size ceiling.
///
/// One manager instance exclusively owns its path for its lifetime; never
/// create a second manager for the same file concurrently.
pub struct RotatingFileManager {
    state: Arc<FileState>,
    trim_tx: Option<Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for RotatingFileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileManager")
            .field("path", &self.state.path)
            .field("max_bytes", &self.state.max_bytes)
            .finish_non_exhaustive()
    }
}

impl RotatingFileManager {
    /// Create a manager with the ceiling given in whole megabytes.
    ///
    /// # Errors
    ///
    /// Fails if `max_mb` is zero or exceeds [`MAX_FILE_SIZE_MB`], or if the
    /// parent directory cannot be created.
    pub fn new<P: AsRef<Path>>(path: P, max_mb: u64) -> Result<Self> {
        if max_mb > MAX_FILE_SIZE_MB {
            return Err(FlexError::config(
                "RotatingFileManager",
                format!(
                    "Requested size ceiling {} MB exceeds the {} MB maximum",
                    max_mb, MAX_FILE_SIZE_MB
                ),
            ));
        }
        Self::with_max_bytes(path, max_mb * 1024 * 1024)
    }

    /// Byte-granular constructor, subject to the same absolute ceiling.
    pub fn with_max_bytes<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<Self> {
        if max_bytes == 0 {
            return Err(FlexError::config(
                "RotatingFileManager",
                "Size ceiling must be greater than zero",
            ));
        }
        if max_bytes > MAX_FILE_SIZE_MB * 1024 * 1024 {
            return Err(FlexError::config(
                "RotatingFileManager",
                format!(
                    "Requested size ceiling {} bytes exceeds the {} MB maximum",
                    max_bytes, MAX_FILE_SIZE_MB
                ),
            ));
        }

        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FlexError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let state = Arc::new(FileState {
            path,
            max_bytes,
            io_lock: Mutex::new(()),
            pending_trims: AtomicUsize::new(0),
            on_error: Mutex::new(default_reporter()),
        });

        // Single-slot channel: one queued trim absorbs any burst of
        // over-ceiling appends, and the worker serializes trims.
        let (trim_tx, trim_rx) = bounded::<()>(1);
        let worker_state = Arc::clone(&state);
        let worker = thread::Builder::new()
            .name("flexlog-trim".to_string())
            .spawn(move || {
                while trim_rx.recv().is_ok() {
                    if let Err(e) = worker_state.trim() {
                        worker_state.report(&e);
                    }
                    worker_state.pending_trims.fetch_sub(1, Ordering::Release);
                }
            })
            .map_err(|e| {
                FlexError::io_operation(
                    "spawn trim worker",
                    "Failed to spawn trim worker thread",
                    e,
                )
            })?;

        Ok(Self {
            state,
            trim_tx: Some(trim_tx),
            worker: Some(worker),
        })
    }

    /// Replace the fallback reporter used for trim failures.
    #[must_use]
    pub fn with_error_reporter(self, reporter: ErrorReporter) -> Self {
        *self.state.on_error.lock() = reporter;
        self
    }

    /// Serialize one entry and append it to the end of the file.
    ///
    /// The entry is the formatted text, then (when the record carries an
    /// error) a newline-separated rendering of the error message and stack
    /// trace, then the terminating newline. If the append leaves the file
    /// over its ceiling, a trim is scheduled on the worker; the caller
    /// never blocks beyond the append itself.
    pub fn append(&self, record: &LogRecord, formatted: &str) -> Result<()> {
        let mut entry = String::with_capacity(formatted.len() + 1);
        entry.push_str(formatted);
        if let Some(error) = &record.error {
            entry.push('\n');
            entry.push_str(&error.render());
        }
        entry.push('\n');

        let size_after = {
            let _guard = self.state.io_lock.lock();

            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.state.path)
                .map_err(|e| {
                    FlexError::file_destination(
                        self.state.path.display().to_string(),
                        format!("Failed to open: {}", e),
                    )
                })?;

            file.write_all(entry.as_bytes()).map_err(|e| {
                FlexError::file_destination(
                    self.state.path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })?;

            file.metadata()
                .map_err(|e| {
                    FlexError::file_destination(
                        self.state.path.display().to_string(),
                        format!("Cannot access file metadata: {}", e),
                    )
                })?
                .len()
        };

        if size_after > self.state.max_bytes {
            self.schedule_trim();
        }

        Ok(())
    }

    /// Run a trim synchronously on the calling thread.
    ///
    /// Takes the same lock as appends and worker trims, so it composes with
    /// both; a second trim right after a first is a no-op.
    pub fn trim(&self) -> Result<()> {
        self.state.trim()
    }

    /// Block until every scheduled trim has completed.
    pub fn wait_idle(&self) {
        while self.state.pending_trims.load(Ordering::Acquire) > 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.state.path
    }

    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.state.max_bytes
    }

    fn schedule_trim(&self) {
        if let Some(tx) = &self.trim_tx {
            // Count first so the worker's decrement can never race ahead of
            // the increment for the message it is servicing.
            self.state.pending_trims.fetch_add(1, Ordering::Release);
            // A full slot means a trim is already pending; that trim will
            // see this append's bytes too, so dropping the request is safe.
            if tx.try_send(()).is_err() {
                self.state.pending_trims.fetch_sub(1, Ordering::Release);
            }
        }
    }
}

impl Drop for RotatingFileManager {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain queued trims and exit.
        drop(self.trim_tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// A [`Destination`] that writes formatted records to a size-bounded file.
///
/// I/O failures never propagate to the logging caller; they are routed to
/// the fallback reporter instead.
pub struct FileDestination {
    manager: RotatingFileManager,
    id: String,
    on_error: ErrorReporter,
}

impl FileDestination {
    /// Create a file destination with the ceiling given in megabytes.
    ///
    /// # Errors
    ///
    /// Fails on an over-limit ceiling or an uncreatable log directory.
    pub fn new<P: AsRef<Path>>(path: P, max_mb: u64) -> Result<Self> {
        let file_name = path
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("log")
            .to_string();
        let manager = RotatingFileManager::new(path, max_mb)?;

        Ok(Self {
            manager,
            id: format!("flexlog.file.{}", file_name),
            on_error: default_reporter(),
        })
    }

    /// Wrap an existing manager, for callers that need a byte-level ceiling.
    pub fn from_manager(manager: RotatingFileManager) -> Self {
        let file_name = manager
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("log")
            .to_string();

        Self {
            id: format!("flexlog.file.{}", file_name),
            manager,
            on_error: default_reporter(),
        }
    }

    /// Replace the fallback reporter for append and trim failures.
    #[must_use]
    pub fn with_error_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.manager = self.manager.with_error_reporter(Arc::clone(&reporter));
        self.on_error = reporter;
        self
    }

    #[must_use]
    pub fn manager(&self) -> &RotatingFileManager {
        &self.manager
    }
}

impl Destination for FileDestination {
    fn send(&self, record: &LogRecord, formatted: &str) -> Result<()> {
        // The logging contract: a broken file must never crash the host.
        if let Err(e) = self.manager.append(record, formatted) {
            (self.on_error)(&e);
        }
        Ok(())
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn flush(&self) -> Result<()> {
        self.manager.wait_idle();
        Ok(())
    }

    fn is_file_backed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::LogLevel;
    use crate::core::record::ErrorInfo;
    use tempfile::tempdir;

    fn record(message: &str) -> LogRecord {
        LogRecord::new(LogLevel::Info, "App/Test", message)
    }

    #[test]
    fn test_ceiling_validation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("too_big.log");

        let err = RotatingFileManager::new(&path, MAX_FILE_SIZE_MB + 1).unwrap_err();
        assert!(matches!(err, FlexError::InvalidConfiguration { .. }));

        let err = RotatingFileManager::new(&path, 0).unwrap_err();
        assert!(matches!(err, FlexError::InvalidConfiguration { .. }));

        assert!(RotatingFileManager::new(&path, MAX_FILE_SIZE_MB).is_ok());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.log");

        let manager = RotatingFileManager::new(&path, 1).unwrap();
        manager.append(&record("first"), "first entry").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_appends_stay_in_order_below_ceiling() {
        let dir = tempdir().unwrap();
        let manager =
            RotatingFileManager::with_max_bytes(dir.path().join("order.log"), 64 * 1024).unwrap();

        for i in 0..50 {
            let line = format!("entry {}", i);
            manager.append(&record(&line), &line).unwrap();
        }
        manager.wait_idle();

        let content = fs::read_to_string(manager.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 50);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(*line, format!("entry {}", i));
        }
    }

    #[test]
    fn test_error_payload_is_rendered_on_following_lines() {
        let dir = tempdir().unwrap();
        let manager =
            RotatingFileManager::with_max_bytes(dir.path().join("err.log"), 64 * 1024).unwrap();

        let record = record("boom happened")
            .with_error(ErrorInfo::new("boom").with_trace("at lib.rs:10\nat main.rs:3"));
        manager.append(&record, "formatted line").unwrap();

        let content = fs::read_to_string(manager.path()).unwrap();
        assert_eq!(content, "formatted line\nboom\nat lib.rs:10\nat main.rs:3\n");
    }

    #[test]
    fn test_trim_keeps_maximal_suffix() {
        let dir = tempdir().unwrap();
        // Each entry is "line XX\n" = 8 bytes; ceiling fits exactly 4 lines.
        let manager =
            RotatingFileManager::with_max_bytes(dir.path().join("trim.log"), 32).unwrap();

        for i in 10..20 {
            let line = format!("line {}", i);
            manager.append(&record(&line), &line).unwrap();
        }
        manager.wait_idle();

        let content = fs::read_to_string(manager.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["line 16", "line 17", "line 18", "line 19"]);
        assert!(fs::metadata(manager.path()).unwrap().len() <= 32);
    }

    #[test]
    fn test_trim_is_idempotent() {
        let dir = tempdir().unwrap();
        let manager =
            RotatingFileManager::with_max_bytes(dir.path().join("idem.log"), 32).unwrap();

        for i in 10..20 {
            let line = format!("line {}", i);
            manager.append(&record(&line), &line).unwrap();
        }
        manager.wait_idle();

        let after_first = fs::read_to_string(manager.path()).unwrap();
        manager.trim().unwrap();
        let after_second = fs::read_to_string(manager.path()).unwrap();
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn test_oversized_line_is_dropped_whole() {
        let dir = tempdir().unwrap();
        let manager =
            RotatingFileManager::with_max_bytes(dir.path().join("big.log"), 16).unwrap();

        let huge = "x".repeat(64);
        manager.append(&record(&huge), &huge).unwrap();
        manager.wait_idle();

        let content = fs::read_to_string(manager.path()).unwrap();
        assert!(content.is_empty(), "oversized line must not be split");
    }

    #[test]
    fn test_trim_survives_invalid_utf8() {
        let dir = tempdir().unwrap();
        let manager =
            RotatingFileManager::with_max_bytes(dir.path().join("torn.log"), 32).unwrap();

        // Start with a truncated multibyte sequence, as left by a writer
        // that died mid-entry.
        let mut seeded: Vec<u8> = b"line a\xC3\n".to_vec();
        for i in 0..8 {
            seeded.extend_from_slice(format!("line {:02}\n", i).as_bytes());
        }
        fs::write(manager.path(), &seeded).unwrap();

        manager.trim().unwrap();

        assert!(fs::metadata(manager.path()).unwrap().len() <= 32);
        let content = fs::read_to_string(manager.path()).unwrap();
        assert_eq!(
            content.lines().collect::<Vec<_>>(),
            vec!["line 04", "line 05", "line 06", "line 07"]
        );
    }

    #[test]
    fn test_no_trim_when_under_ceiling() {
        let dir = tempdir().unwrap();
        let manager =
            RotatingFileManager::with_max_bytes(dir.path().join("small.log"), 1024).unwrap();

        manager.append(&record("one"), "one").unwrap();
        manager.append(&record("two"), "two").unwrap();
        manager.wait_idle();

        assert_eq!(fs::read_to_string(manager.path()).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_trailing_fit() {
        // 4 bytes per line with the newline
        let lines = vec!["aaa", "bbb", "ccc"];
        assert_eq!(trailing_fit(&lines, 12), (0, 12));
        assert_eq!(trailing_fit(&lines, 11), (1, 8));
        assert_eq!(trailing_fit(&lines, 4), (2, 4));
        assert_eq!(trailing_fit(&lines, 3), (3, 0));
        assert_eq!(trailing_fit(&[], 10), (0, 0));
    }

    #[test]
    fn test_trailing_fit_counts_utf8_bytes() {
        // 'é' is 2 bytes in UTF-8, so "éé" re-encodes to 5 bytes with its
        // newline even though it is 2 chars long.
        let lines = vec!["éé", "ab"];
        assert_eq!(trailing_fit(&lines, 8), (0, 8));
        assert_eq!(trailing_fit(&lines, 7), (1, 3));
    }

    #[test]
    fn test_file_destination_swallows_io_failures() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempdir().unwrap();
        let reported = Arc::new(AtomicUsize::new(0));
        let reported_clone = Arc::clone(&reported);

        let destination = FileDestination::new(dir.path().join("swallow.log"), 1)
            .unwrap()
            .with_error_reporter(Arc::new(move |_err| {
                reported_clone.fetch_add(1, Ordering::Relaxed);
            }));

        // Replace the log file path with a directory to force open() to fail.
        fs::create_dir_all(destination.manager().path()).unwrap();

        let result = destination.send(&record("lost"), "lost");
        assert!(result.is_ok(), "send must never surface I/O failures");
        assert_eq!(reported.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_destination_id_uses_file_name() {
        let dir = tempdir().unwrap();
        let destination = FileDestination::new(dir.path().join("app_log.txt"), 5).unwrap();
        assert_eq!(destination.id(), "flexlog.file.app_log.txt");
        assert!(destination.is_file_backed());
    }
}
