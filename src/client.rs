// SPDX-License-Identifier: GPL-3.0-only

//! Recording client
//!
//! Drives a [`Sensor`]'s lifecycle for a bounded or unbounded
//! duration. Whatever happens inside the loop — duration expiry,
//! Ctrl+C, or a start failure — `stop()` and `cleanup()` run exactly
//! once each, in that order.

use crate::errors::{SensorError, SensorResult};
use crate::sensors::Sensor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Client for recording sensor sessions
pub struct RecordingClient {
    api_key: String,
    upload: bool,
}

impl RecordingClient {
    /// Create a client. The API key must be non-empty.
    pub fn new(api_key: impl Into<String>) -> SensorResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(SensorError::Configuration(
                "api_key must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            api_key,
            upload: false,
        })
    }

    /// Enable the cloud-sync placeholder. Uploads are not implemented;
    /// the flag is stored for forward compatibility.
    pub fn with_upload(mut self, upload: bool) -> Self {
        self.upload = upload;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn upload(&self) -> bool {
        self.upload
    }

    /// Record from `sensor` until `duration` elapses, or until Ctrl+C
    /// when no duration is given.
    ///
    /// The interrupt is only observed between loop iterations: a grab
    /// blocked inside a webcam driver cannot be cancelled mid-call.
    pub fn record(&self, sensor: &mut dyn Sensor, duration: Option<Duration>) -> SensorResult<()> {
        let interrupt = interrupt_flag();
        interrupt.store(false, Ordering::SeqCst);
        self.record_with_interrupt(sensor, duration, &interrupt)
    }

    /// Like [`record`](Self::record), with a caller-supplied interrupt
    /// flag instead of the process Ctrl+C handler.
    pub fn record_with_interrupt(
        &self,
        sensor: &mut dyn Sensor,
        duration: Option<Duration>,
        interrupt: &AtomicBool,
    ) -> SensorResult<()> {
        let outcome = run_loop(sensor, duration, interrupt);

        // Unconditional teardown, fixed order
        sensor.stop();
        sensor.cleanup();

        if outcome.is_ok() {
            info!(sensor = %sensor.name(), "Recording finished");
        }
        outcome
    }
}

fn run_loop(
    sensor: &mut dyn Sensor,
    duration: Option<Duration>,
    interrupt: &AtomicBool,
) -> SensorResult<()> {
    sensor.start()?;
    let started = Instant::now();

    loop {
        // The return value only signals whether a frame was produced;
        // transient misses are retried on the next iteration.
        sensor.read();

        if interrupt.load(Ordering::SeqCst) {
            info!("Stopping recording (interrupt)");
            break;
        }
        if let Some(limit) = duration {
            if started.elapsed() >= limit {
                break;
            }
        }
    }

    Ok(())
}

/// Process-wide interrupt flag, wired to Ctrl+C on first use
fn interrupt_flag() -> Arc<AtomicBool> {
    static FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

    FLAG.get_or_init(|| {
        let flag = Arc::new(AtomicBool::new(false));
        let handler = flag.clone();
        if let Err(e) = ctrlc::set_handler(move || handler.store(true, Ordering::SeqCst)) {
            warn!(error = %e, "Could not install Ctrl+C handler");
        }
        flag
    })
    .clone()
}
