// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for recording operations
//!
//! This module provides command-line functionality for:
//! - Probing capture capabilities
//! - Recording from the depth sensor (or its fallback source)
//! - Recording with the mock sensor

use depthrec::config::FallbackSource;
use depthrec::sensors::{self, probe, MockSensor, Sensor};
use depthrec::RecordingClient;
use std::path::PathBuf;
use std::time::Duration;

/// Report what the capture stack can do on this machine
pub fn probe_capabilities() -> Result<(), Box<dyn std::error::Error>> {
    let video = if probe::video_stack_available() {
        "available"
    } else {
        "unavailable"
    };
    println!("Video stack (GStreamer): {}", video);

    #[cfg(feature = "hardware")]
    match probe::find_depth_device() {
        Some(device) => println!(
            "Depth camera: {} ({})",
            device.card,
            device.path.display()
        ),
        None => println!("Depth camera: none detected"),
    }
    #[cfg(not(feature = "hardware"))]
    println!("Depth camera: support compiled out");

    Ok(())
}

/// Record from the depth sensor
pub fn record(
    config: depthrec::SensorConfig,
    api_key: &str,
    duration: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = RecordingClient::new(api_key)?;
    let mut sensor = sensors::get_depth_sensor(config)?;

    println!("Capture mode: {}", sensor.mode());
    match duration {
        Some(secs) => println!("Recording for {} seconds...", secs),
        None => println!("Recording... (press Ctrl+C to stop)"),
    }

    client.record(&mut sensor, duration.map(Duration::from_secs))?;

    if let Some(path) = sensor.current_file() {
        println!("Recording saved: {}", path.display());
    }
    Ok(())
}

/// Record with the mock sensor
pub fn record_mock(
    source: Option<PathBuf>,
    output_dir: PathBuf,
    api_key: &str,
    duration: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = RecordingClient::new(api_key)?;
    let mut sensor = MockSensor::new(source, output_dir);
    sensor.initialize()?;

    match duration {
        Some(secs) => println!("Recording for {} seconds...", secs),
        None => println!("Recording... (press Ctrl+C to stop)"),
    }

    client.record(&mut sensor, duration.map(Duration::from_secs))?;

    if let Some(path) = sensor.current_file() {
        println!("Recording saved: {}", path.display());
    }
    Ok(())
}

/// Parse a fallback selector: a webcam device index or `synthetic`
pub fn parse_fallback(s: &str) -> Result<FallbackSource, String> {
    if s == "synthetic" {
        return Ok(FallbackSource::Synthetic);
    }
    s.parse::<u32>().map(FallbackSource::Webcam).map_err(|_| {
        format!(
            "expected a webcam device index or \"synthetic\", got '{}'",
            s
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fallback_index() {
        assert_eq!(parse_fallback("2"), Ok(FallbackSource::Webcam(2)));
    }

    #[test]
    fn test_parse_fallback_synthetic() {
        assert_eq!(parse_fallback("synthetic"), Ok(FallbackSource::Synthetic));
    }

    #[test]
    fn test_parse_fallback_rejects_garbage() {
        assert!(parse_fallback("webcam").is_err());
        assert!(parse_fallback("-1").is_err());
    }
}
