// SPDX-License-Identifier: GPL-3.0-only

//! depthrec - a depth-camera recording client
//!
//! Records video frames from a depth camera (or a webcam / synthetic
//! fallback) to timestamped MP4 files.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`sensors`]: frame sources, capability probing, and the sensor
//!   lifecycle trait
//! - [`sink`]: the GStreamer-backed video file writer
//! - [`client`]: the recording loop with duration and Ctrl+C handling
//! - [`config`]: sensor configuration
//! - [`storage`]: output naming and directory handling
//!
//! # Example
//!
//! ```no_run
//! use depthrec::{get_depth_sensor, RecordingClient, SensorConfig};
//! use std::time::Duration;
//!
//! # fn main() -> depthrec::SensorResult<()> {
//! let mut sensor = get_depth_sensor(SensorConfig::default())?;
//! let client = RecordingClient::new("test")?;
//! client.record(&mut sensor, Some(Duration::from_secs(5)))?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod sensors;
pub mod sink;
pub mod storage;

// Re-export commonly used types
pub use client::RecordingClient;
pub use config::{FallbackSource, SensorConfig};
pub use errors::{SensorError, SensorResult};
pub use sensors::{get_depth_sensor, CaptureMode, DepthSensor, Frame, MockSensor, Sensor};
pub use sink::VideoSink;
