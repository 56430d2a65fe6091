// SPDX-License-Identifier: GPL-3.0-only

//! Sensor abstraction
//!
//! One lifecycle trait over a closed set of frame sources:
//!
//! ```text
//! ┌──────────────────┐
//! │ RecordingClient  │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Sensor trait   │  ← initialize / start / read / stop / cleanup
//! └────────┬─────────┘
//!          │
//!     ┌────┴─────┐
//!     ▼          ▼
//! DepthSensor  MockSensor
//!  hardware │ webcam │ synthetic
//! ```
//!
//! `DepthSensor` prefers real depth hardware and owns the fallback
//! policy; `MockSensor` is a file-or-pattern test double.

pub mod adapter;
pub mod convert;
#[cfg(feature = "hardware")]
pub mod hardware;
pub mod mock;
pub mod probe;
pub mod synthetic;
pub mod webcam;

pub use adapter::DepthSensor;
pub use mock::MockSensor;

use crate::config::{FallbackSource, SensorConfig};
use crate::errors::{SensorError, SensorResult};

/// Which frame source is active for a session
///
/// Settled during initialization; may be downgraded from `Hardware`
/// exactly once, at start time, when the device fails to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Real depth camera via the V4L2 kernel driver
    Hardware,
    /// Webcam at a configured device index
    Webcam,
    /// Generated test pattern, no device required
    Synthetic,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Hardware => write!(f, "hardware"),
            CaptureMode::Webcam => write!(f, "webcam"),
            CaptureMode::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// One RGB24 image buffer, produced by a frame source and consumed
/// immediately by the video sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Packed RGB24 pixel data, `width * height * 3` bytes
    pub data: Vec<u8>,
}

impl Frame {
    /// An all-black frame
    pub fn black(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// A frame filled with a uniform gray level
    pub fn filled(width: u32, height: u32, level: u8) -> Self {
        Frame {
            width,
            height,
            data: vec![level; (width * height * 3) as usize],
        }
    }

    /// Return this frame scaled to `width` x `height`
    ///
    /// A frame that already matches is passed through untouched. The
    /// sink's writer has a fixed size, so every produced frame goes
    /// through here before being written.
    pub fn resized(self, width: u32, height: u32) -> Frame {
        if self.width == width && self.height == height {
            return self;
        }

        let Some(img) = image::RgbImage::from_raw(self.width, self.height, self.data) else {
            return Frame::black(width, height);
        };
        let scaled = image::imageops::resize(&img, width, height, image::imageops::FilterType::Triangle);

        Frame {
            width,
            height,
            data: scaled.into_raw(),
        }
    }
}

/// Lifecycle interface shared by all recording sensors
///
/// The expected call order is `initialize`, `start`, any number of
/// `read` calls, `stop`, `cleanup`. `cleanup` is valid from any state
/// after `initialize` and is safe to call twice. Starting a second
/// session without an intervening `cleanup` leaks the prior handles.
pub trait Sensor {
    /// Model identifier, used in output file names and logs
    fn name(&self) -> &str;

    /// Prepare the sensor: create the output directory and settle the
    /// capture mode.
    fn initialize(&mut self) -> SensorResult<()>;

    /// Open the capture source and the output writer
    fn start(&mut self) -> SensorResult<()>;

    /// Poll for one frame and write it to the output file.
    ///
    /// Returns true if a frame was produced and written, false when
    /// nothing was available yet. Safe to call in a tight loop.
    fn read(&mut self) -> bool;

    /// Mark the sensor inactive; subsequent `read` calls return false
    fn stop(&mut self);

    /// Release the writer and any capture handles. Never fails.
    fn cleanup(&mut self);
}

/// Decide the capture mode from hardware availability and the
/// fallback configuration.
///
/// Evaluated once at initialization, and once more at start time if
/// the hardware open fails (with `depth_available = false`).
pub fn resolve_mode(
    depth_available: bool,
    allow_fallback: bool,
    fallback: FallbackSource,
) -> SensorResult<CaptureMode> {
    if depth_available {
        return Ok(CaptureMode::Hardware);
    }
    if !allow_fallback {
        return Err(SensorError::Configuration(
            "no depth camera support and fallback is disabled".to_string(),
        ));
    }
    Ok(fallback_mode(fallback))
}

/// The capture mode a fallback selector maps to
pub fn fallback_mode(fallback: FallbackSource) -> CaptureMode {
    match fallback {
        FallbackSource::Webcam(_) => CaptureMode::Webcam,
        FallbackSource::Synthetic => CaptureMode::Synthetic,
    }
}

/// Construct and initialize a [`DepthSensor`] in one call
pub fn get_depth_sensor(config: SensorConfig) -> SensorResult<DepthSensor> {
    let mut sensor = DepthSensor::new(config)?;
    sensor.initialize()?;
    Ok(sensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mode_prefers_hardware() {
        let mode = resolve_mode(true, true, FallbackSource::Synthetic).unwrap();
        assert_eq!(mode, CaptureMode::Hardware);
        // Availability wins even when fallback is disabled
        let mode = resolve_mode(true, false, FallbackSource::Webcam(0)).unwrap();
        assert_eq!(mode, CaptureMode::Hardware);
    }

    #[test]
    fn test_resolve_mode_integer_selector_is_webcam() {
        let mode = resolve_mode(false, true, FallbackSource::Webcam(2)).unwrap();
        assert_eq!(mode, CaptureMode::Webcam);
    }

    #[test]
    fn test_resolve_mode_synthetic_selector() {
        let mode = resolve_mode(false, true, FallbackSource::Synthetic).unwrap();
        assert_eq!(mode, CaptureMode::Synthetic);
    }

    #[test]
    fn test_resolve_mode_fallback_disabled_is_an_error() {
        let err = resolve_mode(false, false, FallbackSource::Webcam(0)).unwrap_err();
        assert!(matches!(err, SensorError::Configuration(_)));
    }

    #[test]
    fn test_mode_display_tags() {
        assert_eq!(CaptureMode::Hardware.to_string(), "hardware");
        assert_eq!(CaptureMode::Webcam.to_string(), "webcam");
        assert_eq!(CaptureMode::Synthetic.to_string(), "synthetic");
    }

    #[test]
    fn test_frame_resized_passthrough() {
        let frame = Frame::black(4, 4);
        let same = frame.clone().resized(4, 4);
        assert_eq!(same, frame);
    }

    #[test]
    fn test_frame_resized_changes_geometry() {
        let frame = Frame::filled(4, 4, 200);
        let scaled = frame.resized(8, 2);
        assert_eq!(scaled.width, 8);
        assert_eq!(scaled.height, 2);
        assert_eq!(scaled.data.len(), 8 * 2 * 3);
    }
}
