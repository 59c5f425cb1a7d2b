//! `log` backend for the boot firmware.
//!
//! Records logged before the console is up are kept in a small buffer and
//! replayed once [`serial_ready`] is called; after that every record goes
//! straight to the UART.

use core::fmt::{self, Write};
use log::{Level, Log, Metadata, Record};
use spin::Mutex;

const BUFFER_SIZE: usize = 4096;

/// Buffer for storing log messages before serial is initialized
struct LogBuffer {
    buffer: [u8; BUFFER_SIZE],
    position: usize,
    dropped: usize,
}

impl LogBuffer {
    const fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
            position: 0,
            dropped: 0,
        }
    }

    fn contents(&self) -> &str {
        core::str::from_utf8(&self.buffer[..self.position]).unwrap_or("<invalid UTF-8>")
    }

    fn clear(&mut self) {
        self.position = 0;
        self.dropped = 0;
    }
}

impl Write for LogBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let remaining = BUFFER_SIZE - self.position;

        if bytes.len() > remaining {
            // Keep the oldest records; the first failure is the interesting one.
            self.dropped += bytes.len();
            return Ok(());
        }

        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }
}

/// State of the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoggerState {
    /// Buffering messages until serial is ready
    Buffering,
    /// Serial is initialized, output directly
    SerialReady,
}

pub struct FirmwareLogger {
    buffer: Mutex<LogBuffer>,
    state: Mutex<LoggerState>,
    level: Level,
}

impl FirmwareLogger {
    const fn new(level: Level) -> Self {
        FirmwareLogger {
            buffer: Mutex::new(LogBuffer::new()),
            state: Mutex::new(LoggerState::Buffering),
            level,
        }
    }

    /// Call this after serial is initialized
    pub fn serial_ready(&self) {
        let mut state = self.state.lock();
        let mut buffer = self.buffer.lock();

        if buffer.position > 0 {
            emit(format_args!("{}", buffer.contents()));
        }
        if buffer.dropped > 0 {
            emit(format_args!("[ WARN] logger: {} bytes of early log dropped\n", buffer.dropped));
        }
        buffer.clear();

        *state = LoggerState::SerialReady;
    }
}

impl Log for FirmwareLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let state = *self.state.lock();
        match state {
            LoggerState::Buffering => {
                let mut buffer = self.buffer.lock();
                let _ = write!(
                    &mut *buffer,
                    "[{:>5}] {}: {}\n",
                    record.level(),
                    record.target(),
                    record.args()
                );
            }
            LoggerState::SerialReady => {
                emit(format_args!(
                    "[{:>5}] {}: {}\n",
                    record.level(),
                    record.target(),
                    record.args()
                ));
            }
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "aarch64")]
fn emit(args: fmt::Arguments) {
    crate::serial_aarch64::_print(args);
}

// No console off-target; records are simply discarded after the switch.
#[cfg(not(target_arch = "aarch64"))]
fn emit(_args: fmt::Arguments) {}

#[cfg(debug_assertions)]
const DEFAULT_LEVEL: Level = Level::Debug;
#[cfg(not(debug_assertions))]
const DEFAULT_LEVEL: Level = Level::Info;

pub static LOGGER: FirmwareLogger = FirmwareLogger::new(DEFAULT_LEVEL);

/// Install the logger. Can be called before serial is ready.
pub fn init_early() {
    // A second call (or another logger) keeps whatever is installed.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(DEFAULT_LEVEL.to_level_filter());
    }
}

/// Call after serial port is initialized
pub fn serial_ready() {
    LOGGER.serial_ready();
}
