//! Ganymede logging utilities
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
use core::{cell::RefCell, fmt::Write};

use critical_section::Mutex;
use heapless::String;

/// A logging buffer for storing serialized logs pending transmission.
///
/// # Notes
/// The BufferedLog contains a character buffer of the log data waiting to be written. It is
/// intended to be consumed asynchronously by the application, for example from a serial port
/// task.
pub struct BufferedLog {
    buffer: Mutex<RefCell<LogBuffer>>,
    level: log::LevelFilter,
}

impl BufferedLog {
    /// Construct a new buffered log object.
    ///
    /// # Args
    /// * `level` - The most verbose level that is recorded.
    pub const fn new(level: log::LevelFilter) -> Self {
        Self {
            buffer: Mutex::new(RefCell::new(LogBuffer::new())),
            level,
        }
    }

    /// Process all of the available log data.
    ///
    /// # Args
    /// * `sink` - Receives the pending log data.
    pub fn process(&self, mut sink: impl FnMut(&[u8])) {
        critical_section::with(|cs| {
            let mut buffer = self.buffer.borrow(cs).borrow_mut();
            sink(buffer.data());
            buffer.clear();
        });
    }
}

impl log::Log for BufferedLog {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let source_file = record.file().unwrap_or("Unknown");
        let source_line = record.line().unwrap_or(u32::MAX);

        // Print the record into the buffer. Records that do not fit are truncated.
        let mut string: String<128> = String::new();
        write!(
            &mut string,
            "[{}] {}:{} - {}\n",
            record.level(),
            source_file,
            source_line,
            record.args()
        )
        .ok();

        critical_section::with(|cs| {
            self.buffer
                .borrow(cs)
                .borrow_mut()
                .append(string.as_bytes());
        });
    }

    // The log is not capable of being flushed as it does not own the data consumer.
    fn flush(&self) {}
}

/// An internal buffer for storing serialized log data. This is essentially a vector of u8.
struct LogBuffer {
    data: [u8; 1024],
    index: usize,
}

impl LogBuffer {
    /// Construct the buffer.
    pub const fn new() -> Self {
        Self {
            data: [0u8; 1024],
            index: 0,
        }
    }

    /// Append data into the buffer.
    ///
    /// # Args
    /// * `data` - The data to append. If space isn't available, as much data will be appended as
    ///   possible.
    pub fn append(&mut self, data: &[u8]) {
        let tail = &mut self.data[self.index..];
        self.index += if data.len() > tail.len() {
            let len = tail.len();
            tail.copy_from_slice(&data[..len]);
            len
        } else {
            tail[..data.len()].copy_from_slice(data);
            data.len()
        }
    }

    /// Get the data in the buffer.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.index]
    }

    /// Clear contents of the buffer.
    pub fn clear(&mut self) {
        self.index = 0;
    }
}
