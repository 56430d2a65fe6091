// SPDX-License-Identifier: GPL-3.0-only

//! Depth sensor adapter
//!
//! Prefers a real depth camera and degrades to a webcam or a synthetic
//! generator when hardware is missing or fails to open. The downgrade
//! is best-effort, not a retry: exactly one hardware attempt is made
//! per session.

use super::probe;
use super::synthetic::SyntheticSource;
use super::webcam::WebcamSource;
use super::{resolve_mode, CaptureMode, Sensor};
use crate::config::{FallbackSource, SensorConfig};
use crate::errors::{SensorError, SensorResult};
use crate::sink::VideoSink;
use crate::storage;
use std::path::{Path, PathBuf};
use tracing::{error, info};
#[cfg(feature = "hardware")]
use tracing::warn;

/// Sensor adapter for one recording target
///
/// Owns the video sink and at most one capture handle; neither is
/// shared across adapters, and one adapter carries at most one active
/// session at a time.
pub struct DepthSensor {
    config: SensorConfig,
    mode: CaptureMode,
    initialized: bool,
    running: bool,
    #[cfg(feature = "hardware")]
    depth_device: Option<probe::DepthDevice>,
    #[cfg(feature = "hardware")]
    hardware: Option<super::hardware::HardwareSource>,
    webcam: Option<WebcamSource>,
    synthetic: Option<SyntheticSource>,
    sink: Option<VideoSink>,
    current_file: Option<PathBuf>,
}

impl DepthSensor {
    /// Create an adapter for `config`.
    ///
    /// Fails with a configuration error when the video stack is
    /// unusable, or when depth support is compiled out and fallback is
    /// disabled. Device presence is checked later, in `initialize()`.
    pub fn new(config: SensorConfig) -> SensorResult<Self> {
        if !probe::video_stack_available() {
            return Err(SensorError::Configuration(
                "GStreamer is required for recording video".to_string(),
            ));
        }

        let mode = if cfg!(feature = "hardware") {
            CaptureMode::Hardware
        } else {
            resolve_mode(false, config.allow_fallback, config.fallback)?
        };

        Ok(Self {
            config,
            mode,
            initialized: false,
            running: false,
            #[cfg(feature = "hardware")]
            depth_device: None,
            #[cfg(feature = "hardware")]
            hardware: None,
            webcam: None,
            synthetic: None,
            sink: None,
            current_file: None,
        })
    }

    /// The currently selected capture mode
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Immutable configuration this adapter was built with
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Path of the most recent recording, if a session was started
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Probe for devices and settle the capture mode
    fn select_mode(&mut self) -> SensorResult<()> {
        if self.mode != CaptureMode::Hardware {
            // Settled at construction, nothing to re-evaluate
            return Ok(());
        }

        #[cfg(feature = "hardware")]
        {
            self.depth_device = probe::find_depth_device();
            let available = self.depth_device.is_some();
            self.mode = resolve_mode(available, self.config.allow_fallback, self.config.fallback)
                .map_err(|_| {
                    SensorError::Configuration(
                        "no depth camera detected and fallback is disabled".to_string(),
                    )
                })?;
            if self.mode != CaptureMode::Hardware {
                info!(mode = %self.mode, "No depth camera detected, falling back");
            }
        }

        Ok(())
    }

    /// Downgrade after a failed hardware open, or surface the error
    /// when fallback is disallowed.
    #[cfg(feature = "hardware")]
    fn downgrade_or_fail(&mut self, err: SensorError) -> SensorResult<()> {
        if !self.config.allow_fallback {
            return Err(err);
        }
        self.mode = super::fallback_mode(self.config.fallback);
        warn!(error = %err, mode = %self.mode, "Depth camera start failed, falling back");
        Ok(())
    }

    fn open_sink(&mut self) -> SensorResult<()> {
        let path = storage::recording_path(
            &self.config.output_dir,
            Some(&self.config.model),
            &self.mode.to_string(),
        );
        let sink = VideoSink::open(path, self.config.width, self.config.height, self.config.fps)?;
        self.current_file = Some(sink.path().to_path_buf());
        self.sink = Some(sink);
        Ok(())
    }

    fn next_frame(&mut self) -> Option<super::Frame> {
        match self.mode {
            CaptureMode::Hardware => {
                #[cfg(feature = "hardware")]
                {
                    self.hardware.as_mut().and_then(|h| h.try_read())
                }
                #[cfg(not(feature = "hardware"))]
                {
                    None
                }
            }
            CaptureMode::Webcam => self.webcam.as_mut().and_then(|w| w.grab()),
            CaptureMode::Synthetic => self.synthetic.as_ref().map(|s| s.generate()),
        }
    }
}

impl Sensor for DepthSensor {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn initialize(&mut self) -> SensorResult<()> {
        storage::ensure_output_dir(&self.config.output_dir)?;
        self.select_mode()?;
        self.initialized = true;
        Ok(())
    }

    fn start(&mut self) -> SensorResult<()> {
        if !self.initialized {
            return Err(SensorError::Configuration(
                "initialize() must be called before start()".to_string(),
            ));
        }

        #[cfg(feature = "hardware")]
        if self.mode == CaptureMode::Hardware {
            let open_result = match self.depth_device.as_ref() {
                Some(device) => super::hardware::HardwareSource::open(device, &self.config),
                None => Err(SensorError::DeviceOpen(
                    "depth device disappeared after probing".to_string(),
                )),
            };
            match open_result {
                Ok(source) => self.hardware = Some(source),
                Err(e) => self.downgrade_or_fail(e)?,
            }
        }

        match self.mode {
            CaptureMode::Webcam => {
                let index = match self.config.fallback {
                    FallbackSource::Webcam(index) => index,
                    FallbackSource::Synthetic => 0,
                };
                self.webcam = Some(WebcamSource::open(index, &self.config)?);
            }
            CaptureMode::Synthetic => {
                self.synthetic = Some(SyntheticSource::new(&self.config));
            }
            CaptureMode::Hardware => {}
        }

        self.open_sink()?;
        self.running = true;
        info!(mode = %self.mode, model = %self.config.model, "Recording started");
        Ok(())
    }

    fn read(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let Some(frame) = self.next_frame() else {
            return false;
        };
        let frame = frame.resized(self.config.width, self.config.height);

        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        match sink.write(frame) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to write frame");
                false
            }
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn cleanup(&mut self) {
        // Release order matters: sink first so the file is finalized,
        // then the capture handles. Each release is independent and
        // never propagates a failure.
        if let Some(mut sink) = self.sink.take() {
            sink.close();
        }
        self.webcam = None;
        #[cfg(feature = "hardware")]
        if let Some(mut hardware) = self.hardware.take() {
            hardware.close();
        }
        self.synthetic = None;
        info!("Cleanup complete");
    }
}
