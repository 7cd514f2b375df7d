//! # Host Runtime
//!
//! Boots the kernel and runs the demo tasks to completion.

use core_types::Endpoint;
use ipc::MessageKind;
use kernel_api::{ticks_to_duration, KernelApi, KernelConfig, KernelError};
use kernel_core::retry::{receive_budgeted, send_budgeted};
use kernel_core::Kernel;
use log::{info, warn};
use services_logger::{log_line, LoggerService, LoggerStats};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("Failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to spawn {task} task: {source}")]
    Spawn {
        task: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Round {round}: unexpected reply")]
    UnexpectedReply { round: u32 },

    #[error("{0} task panicked")]
    TaskPanicked(&'static str),
}

/// Host runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRuntimeConfig {
    /// Kernel tunables
    pub kernel: KernelConfig,
    /// Ping/pong round trips to run
    pub rounds: u32,
}

impl HostRuntimeConfig {
    /// Replaces the kernel tunables with the contents of a JSON file
    pub fn with_kernel_config_file(mut self, path: &Path) -> Result<Self, HostRuntimeError> {
        let text = fs::read_to_string(path).map_err(|source| HostRuntimeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        self.kernel = KernelConfig::from_json(&text)?;
        Ok(self)
    }
}

impl Default for HostRuntimeConfig {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::default(),
            rounds: 16,
        }
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Round trips completed
    pub rounds: u32,
    /// Ticks between start and finish
    pub elapsed_ticks: u64,
    /// `elapsed_ticks` converted with the configured quantum
    pub elapsed: Duration,
    /// Replies sent by the pong task
    pub replies: u64,
    /// What the logger task handled
    pub logger: LoggerStats,
    /// Shared region sequence number at the end of the run
    pub shared_seq: u32,
}

/// Host runtime
pub struct HostRuntime {
    config: HostRuntimeConfig,
    kernel: Arc<Kernel>,
}

impl HostRuntime {
    /// Creates a new host runtime
    pub fn new(config: HostRuntimeConfig) -> Result<Self, HostRuntimeError> {
        let kernel = Arc::new(Kernel::with_config(config.kernel)?);
        Ok(Self { config, kernel })
    }

    /// Returns the kernel
    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }

    /// Runs the configured number of round trips
    ///
    /// Starts the tick task, a logger task and a pong task, then drives the
    /// ping side from the calling thread. Each round sends the round number
    /// to pong, waits for the echo, publishes a snapshot to the shared
    /// region and notifies the logger. The runtime is consumed because the
    /// tick task can only be started once.
    pub fn run(self) -> Result<RunReport, HostRuntimeError> {
        let kernel = self.kernel;
        kernel.start_tick()?;
        let started_at = kernel.ticks();
        let stop = Arc::new(AtomicBool::new(false));
        let replies = Arc::new(AtomicU64::new(0));

        let logger = spawn_task("logger", {
            let kernel = Arc::clone(&kernel);
            let stop = Arc::clone(&stop);
            move || LoggerService::new(&*kernel).serve_until(&stop)
        })?;

        let pong = match spawn_task("pong", {
            let kernel = Arc::clone(&kernel);
            let stop = Arc::clone(&stop);
            let replies = Arc::clone(&replies);
            move || pong_task(&kernel, &stop, &replies)
        }) {
            Ok(handle) => handle,
            Err(e) => {
                stop.store(true, Ordering::Release);
                let _ = logger.join();
                return Err(e);
            }
        };

        let budget = self.config.kernel.retry_budget_ticks;
        let outcome = ping_task(&kernel, self.config.rounds, budget);

        stop.store(true, Ordering::Release);
        pong.join()
            .map_err(|_| HostRuntimeError::TaskPanicked("pong"))?;
        let logger_stats = logger
            .join()
            .map_err(|_| HostRuntimeError::TaskPanicked("logger"))?;
        let rounds = outcome?;

        let elapsed_ticks = kernel.ticks().saturating_sub(started_at);
        let report = RunReport {
            rounds,
            elapsed_ticks,
            elapsed: ticks_to_duration(elapsed_ticks, self.config.kernel.tick_quantum_micros),
            replies: replies.load(Ordering::Acquire),
            logger: logger_stats,
            shared_seq: kernel.shared_region().seq(),
        };
        info!(
            "{} rounds in {} ticks ({:?})",
            report.rounds, report.elapsed_ticks, report.elapsed
        );
        Ok(report)
    }
}

fn spawn_task<T, F>(task: &'static str, body: F) -> Result<JoinHandle<T>, HostRuntimeError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(task.to_string())
        .spawn(body)
        .map_err(|source| HostRuntimeError::Spawn { task, source })
}

/// Echoes every `Ping` back to its sender until `stop` is set
fn pong_task(kernel: &Kernel, stop: &AtomicBool, replies: &AtomicU64) {
    log_line(kernel, Endpoint::Pong, "pong ready");
    let budget = kernel.config().retry_budget_ticks;

    while !stop.load(Ordering::Acquire) {
        let Some(msg) = kernel.try_receive(Endpoint::Pong) else {
            kernel.yield_now();
            continue;
        };
        if !msg.is(MessageKind::Ping) {
            continue;
        }
        match send_budgeted(
            kernel,
            Endpoint::Pong,
            msg.from,
            MessageKind::Pong.into(),
            msg.payload(),
            budget,
        ) {
            Ok(()) => {
                replies.fetch_add(1, Ordering::AcqRel);
            }
            Err(e) => warn!("pong reply to {} dropped: {}", msg.from, e),
        }
    }
}

/// Drives `rounds` round trips, returning how many completed
fn ping_task(kernel: &Kernel, rounds: u32, budget: u64) -> Result<u32, HostRuntimeError> {
    for round in 0..rounds {
        let payload = round.to_le_bytes();
        send_budgeted(
            kernel,
            Endpoint::Ping,
            Endpoint::Pong,
            MessageKind::Ping.into(),
            &payload,
            budget,
        )?;

        let reply = receive_budgeted(kernel, Endpoint::Ping, budget)?;
        if !reply.is(MessageKind::Pong) || reply.payload() != payload {
            return Err(HostRuntimeError::UnexpectedReply { round });
        }

        kernel
            .shared_region()
            .write(format!("round={}", round).as_bytes());
        kernel.send(
            Endpoint::Ping,
            Endpoint::Logger,
            MessageKind::NotifyShared.into(),
            &[],
        );
    }
    log_line(kernel, Endpoint::Ping, "ping done");
    Ok(rounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_config(rounds: u32) -> HostRuntimeConfig {
        HostRuntimeConfig {
            kernel: KernelConfig {
                tick_quantum_micros: 1_000,
                retry_budget_ticks: 5_000,
            },
            rounds,
        }
    }

    #[test]
    fn test_run_completes_rounds() {
        let runtime = HostRuntime::new(test_config(10)).unwrap();
        let report = runtime.run().unwrap();

        assert_eq!(report.rounds, 10);
        assert_eq!(report.replies, 10);
        assert_eq!(report.shared_seq, 10);
        assert_eq!(report.logger.snapshots, 10);
        assert_eq!(
            report.elapsed,
            ticks_to_duration(report.elapsed_ticks, 1_000)
        );
    }

    #[test]
    fn test_zero_rounds() {
        let report = HostRuntime::new(test_config(0)).unwrap().run().unwrap();
        assert_eq!(report.rounds, 0);
        assert_eq!(report.shared_seq, 0);
    }

    #[test]
    fn test_invalid_kernel_config_rejected() {
        let mut config = test_config(1);
        config.kernel.tick_quantum_micros = 0;
        assert!(matches!(
            HostRuntime::new(config),
            Err(HostRuntimeError::Kernel(KernelError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn test_kernel_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tick_quantum_micros": 250 }}"#).unwrap();

        let config = HostRuntimeConfig::default()
            .with_kernel_config_file(file.path())
            .unwrap();
        assert_eq!(config.kernel.tick_quantum_micros, 250);
        assert_eq!(
            config.kernel.retry_budget_ticks,
            KernelConfig::default().retry_budget_ticks
        );
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = HostRuntimeConfig::default()
            .with_kernel_config_file(&dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, HostRuntimeError::ConfigIo { .. }));
    }

    #[test]
    fn test_malformed_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = HostRuntimeConfig::default()
            .with_kernel_config_file(file.path())
            .unwrap_err();
        assert!(matches!(
            err,
            HostRuntimeError::Kernel(KernelError::InvalidConfig(_))
        ));
    }
}
