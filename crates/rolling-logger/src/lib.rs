//! Rolling file logger with an in-memory ring buffer.
//!
//! Installs a `tracing` subscriber that writes every event to
//! `<log_dir>/<app_name>.log`, rotating the file once it grows past a size
//! limit, and keeps the most recent lines in memory for diagnostics. Records
//! emitted through the `log` facade are forwarded to the same subscriber.
//!
//! ```rust,no_run
//! rolling_logger::init_logger("logs".into(), "TodoList").unwrap();
//! let _ = rolling_logger::info("service started");
//! ```

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;
const DEFAULT_MAX_FILES: usize = 5;
const DEFAULT_BUFFER_LINES: usize = 500;

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Logger settings
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub app_name: String,
    /// `EnvFilter` directive, e.g. `info` or `todo_list_lib=debug,info`
    pub filter: String,
    /// Size at which the active file is rotated
    pub max_file_bytes: u64,
    /// Rotated files kept next to the active one
    pub max_files: usize,
    /// Lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
    /// Also print to stdout
    pub stdout: bool,
}

impl LoggerConfig {
    pub fn new(log_dir: PathBuf, app_name: &str) -> Self {
        Self {
            log_dir,
            app_name: app_name.to_string(),
            filter: "info".to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files: DEFAULT_MAX_FILES,
            buffer_lines: DEFAULT_BUFFER_LINES,
            stdout: true,
        }
    }

    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = filter.to_string();
        self
    }

    pub fn with_stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }
}

/// Initialize the global logger with default settings
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init(LoggerConfig::new(log_dir, app_name))
}

/// Initialize the global logger. Fails if called twice.
pub fn init(config: LoggerConfig) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Err("logger already initialized".to_string());
    }

    let writer = RollingWriter::open(&config)?;
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| format!("invalid log filter '{}': {}", config.filter, e))?;

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_writer(writer.clone());
    let stdout_layer = config.stdout.then(|| fmt::layer().with_timer(LocalTime));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| format!("failed to install subscriber: {}", e))?;

    let path = writer.active_path();
    LOGGER
        .set(writer)
        .map_err(|_| "logger already initialized".to_string())?;

    tracing::info!(app = %config.app_name, file = %path.display(), "Logger started");
    Ok(())
}

/// Local wall-clock timestamps with milliseconds
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        use std::fmt::Write as _;
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn logger() -> Result<&'static RollingWriter, String> {
    LOGGER.get().ok_or_else(|| "logger not initialized".to_string())
}

pub fn info(msg: &str) -> Result<(), String> {
    logger()?;
    log::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    logger()?;
    log::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    logger()?;
    log::error!("{}", msg);
    Ok(())
}

/// Up to `n` of the most recent log lines, oldest first
pub fn recent_lines(n: usize) -> Vec<String> {
    LOGGER.get().map(|w| w.recent_lines(n)).unwrap_or_default()
}

/// Path of the active log file, once initialized
pub fn log_file() -> Option<PathBuf> {
    LOGGER.get().map(|w| w.active_path())
}

struct RollingState {
    dir: PathBuf,
    base_name: String,
    max_file_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
    recent: VecDeque<String>,
    capacity: usize,
}

impl RollingState {
    fn active_path(&self) -> PathBuf {
        self.dir.join(&self.base_name)
    }

    fn archive_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", self.base_name, n))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files == 0 {
            self.file = File::create(self.active_path())?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.archive_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.max_files).rev() {
            let from = self.archive_path(n);
            if from.exists() {
                fs::rename(&from, self.archive_path(n + 1))?;
            }
        }
        fs::rename(self.active_path(), self.archive_path(1))?;

        self.file = open_append(&self.active_path())?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.capacity == 0 {
            return;
        }
        for line in String::from_utf8_lossy(buf).lines() {
            if line.trim().is_empty() {
                continue;
            }
            if self.recent.len() == self.capacity {
                self.recent.pop_front();
            }
            self.recent.push_back(line.to_string());
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Size-rotated log file that also remembers recent lines.
///
/// Cloning shares the same file and buffer.
#[derive(Clone)]
pub struct RollingWriter {
    state: Arc<Mutex<RollingState>>,
}

impl RollingWriter {
    pub fn open(config: &LoggerConfig) -> Result<Self, String> {
        fs::create_dir_all(&config.log_dir)
            .map_err(|e| format!("failed to create log dir {}: {}", config.log_dir.display(), e))?;

        let base_name = format!("{}.log", config.app_name);
        let path = config.log_dir.join(&base_name);
        let file = open_append(&path)
            .map_err(|e| format!("failed to open log file {}: {}", path.display(), e))?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                dir: config.log_dir.clone(),
                base_name,
                max_file_bytes: config.max_file_bytes,
                max_files: config.max_files,
                file,
                written,
                recent: VecDeque::with_capacity(config.buffer_lines),
                capacity: config.buffer_lines,
            })),
        })
    }

    pub fn recent_lines(&self, n: usize) -> Vec<String> {
        match self.state.lock() {
            Ok(state) => {
                let skip = state.recent.len().saturating_sub(n);
                state.recent.iter().skip(skip).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn active_path(&self) -> PathBuf {
        match self.state.lock() {
            Ok(state) => state.active_path(),
            Err(poisoned) => poisoned.into_inner().active_path(),
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;

        if state.written > 0 && state.written + buf.len() as u64 > state.max_file_bytes {
            state.rotate()?;
        }
        state.file.write_all(buf)?;
        state.written += buf.len() as u64;
        state.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
