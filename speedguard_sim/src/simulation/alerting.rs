// speedguard_sim/src/simulation/alerting.rs

//! Alert players. A session fires these without waiting on them, so a slow
//! or broken player never holds up sample processing.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use speedguard_core::messages::AlertEvent;
use tracing::{info, warn};

use crate::simulation::core::error::AlertError;

/// Something that can play the over-limit warning.
#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    /// Sink name for logs.
    fn name(&self) -> &str;

    /// Plays the alert once.
    async fn play(&self) -> Result<(), AlertError>;
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct ConsoleAlertSink;

#[async_trait::async_trait]
impl AlertSink for ConsoleAlertSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn play(&self) -> Result<(), AlertError> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")
            .and_then(|_| err.flush())
            .map_err(|e| AlertError::Playback(e.to_string()))
    }
}

/// Counts alerts without making a sound. Used for `--quiet` runs.
#[derive(Debug, Default)]
pub struct SilentAlertSink {
    played: AtomicU64,
}

impl SilentAlertSink {
    pub fn played(&self) -> u64 {
        self.played.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AlertSink for SilentAlertSink {
    fn name(&self) -> &str {
        "silent"
    }

    async fn play(&self) -> Result<(), AlertError> {
        self.played.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fire-and-forget dispatch. Failures are logged and otherwise dropped.
pub fn dispatch_alert(sink: Arc<dyn AlertSink>, event: AlertEvent) {
    info!(
        speed = event.speed,
        limit = %event.limit,
        at = event.triggered_at,
        sink = sink.name(),
        "Speed limit exceeded"
    );
    tokio::spawn(async move {
        if let Err(e) = sink.play().await {
            warn!(sink = sink.name(), error = %e, "Alert sink failed to play alert");
        }
    });
}
