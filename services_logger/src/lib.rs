//! # Logger Service
//!
//! This crate implements the task that owns the [`Endpoint::Logger`] mailbox.
//!
//! ## Philosophy
//!
//! Tasks never print. They send `Log` messages to the logger endpoint and the
//! logger task forwards each line to the `log` facade, tagged with the
//! sending endpoint. Whatever the host installs as the logger backend
//! decides where the lines end up.

use core_types::Endpoint;
use ipc::{Message, MessageKind};
use kernel_api::KernelApi;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};

/// A log line received by the logger task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Endpoint that sent the line
    pub source: Endpoint,
    /// The line, decoded lossily from UTF-8
    pub line: String,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(source: Endpoint, line: impl Into<String>) -> Self {
        Self {
            source,
            line: line.into(),
        }
    }

    /// Decodes a `Log` message, returning `None` for every other kind
    pub fn from_message(msg: &Message) -> Option<Self> {
        if !msg.is(MessageKind::Log) {
            return None;
        }
        Some(Self::new(
            msg.from,
            String::from_utf8_lossy(msg.payload()).into_owned(),
        ))
    }
}

/// Sends `text` to the logger endpoint without waiting
///
/// Returns false (and drops the line) if the logger mailbox is full. Lines
/// longer than one message payload are truncated.
pub fn log_line<K: KernelApi + ?Sized>(kernel: &K, from: Endpoint, text: &str) -> bool {
    kernel
        .try_send(from, Endpoint::Logger, MessageKind::Log.into(), text.as_bytes())
        .is_ok()
}

/// Counters kept by [`LoggerService`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggerStats {
    /// `Log` messages forwarded
    pub lines: u64,
    /// `NotifyShared` messages answered with a snapshot read
    pub snapshots: u64,
    /// Messages of any other kind
    pub ignored: u64,
}

/// The logger task
pub struct LoggerService<'k, K: KernelApi + ?Sized> {
    kernel: &'k K,
    stats: LoggerStats,
}

impl<'k, K: KernelApi + ?Sized> LoggerService<'k, K> {
    /// Creates a logger bound to `kernel`
    pub fn new(kernel: &'k K) -> Self {
        Self {
            kernel,
            stats: LoggerStats::default(),
        }
    }

    /// Returns the counters
    pub fn stats(&self) -> LoggerStats {
        self.stats
    }

    /// Handles at most one waiting message
    ///
    /// Returns the forwarded entry, if the message produced one.
    /// `NotifyShared` yields an entry describing the current shared region
    /// snapshot, attributed to the notifying endpoint.
    pub fn step(&mut self) -> Option<LogEntry> {
        let msg = self.kernel.try_receive(Endpoint::Logger)?;
        self.handle(&msg)
    }

    /// Drains the logger mailbox until `stop` is set, then drains what is left
    pub fn serve_until(&mut self, stop: &AtomicBool) -> LoggerStats {
        while !stop.load(Ordering::Acquire) {
            if self.step().is_none() {
                self.kernel.yield_now();
            }
        }
        while let Some(msg) = self.kernel.try_receive(Endpoint::Logger) {
            self.handle(&msg);
        }
        self.stats
    }

    fn handle(&mut self, msg: &Message) -> Option<LogEntry> {
        match msg.message_kind() {
            Ok(MessageKind::Log) => {
                let entry = LogEntry::from_message(msg)?;
                info!("[{}] {}", entry.source.name(), entry.line);
                self.stats.lines += 1;
                Some(entry)
            }
            Ok(MessageKind::NotifyShared) => {
                let mut buf = [0u8; ipc::MAX_PAYLOAD];
                let (seq, n) = self.kernel.shared_region().read(&mut buf);
                let entry = LogEntry::new(
                    msg.from,
                    format!(
                        "shared snapshot #{}: {}",
                        seq,
                        String::from_utf8_lossy(&buf[..n])
                    ),
                );
                debug!("[{}] {}", entry.source.name(), entry.line);
                self.stats.snapshots += 1;
                Some(entry)
            }
            _ => {
                debug!("logger ignoring kind {} from {}", msg.kind, msg.from);
                self.stats.ignored += 1;
                None
            }
        }
    }
}
