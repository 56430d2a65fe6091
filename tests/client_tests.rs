// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the recording client
//!
//! A scripted sensor stands in for real capture so the lifecycle
//! guarantees can be checked without devices: stop() and cleanup()
//! must run exactly once, in that order, however the loop exits.

use depthrec::{RecordingClient, Sensor, SensorError, SensorResult};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

#[derive(Default)]
struct ScriptedSensor {
    fail_start: bool,
    starts: usize,
    reads: usize,
    stops: usize,
    cleanups: usize,
    cleanup_before_stop: bool,
}

impl Sensor for ScriptedSensor {
    fn name(&self) -> &str {
        "scripted"
    }

    fn initialize(&mut self) -> SensorResult<()> {
        Ok(())
    }

    fn start(&mut self) -> SensorResult<()> {
        if self.fail_start {
            return Err(SensorError::DeviceOpen("scripted failure".to_string()));
        }
        self.starts += 1;
        Ok(())
    }

    fn read(&mut self) -> bool {
        self.reads += 1;
        std::thread::sleep(Duration::from_millis(2));
        true
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn cleanup(&mut self) {
        if self.stops == 0 {
            self.cleanup_before_stop = true;
        }
        self.cleanups += 1;
    }
}

#[test]
fn test_duration_expiry_stops_and_cleans_exactly_once() {
    let client = RecordingClient::new("test").unwrap();
    let mut sensor = ScriptedSensor::default();
    let interrupt = AtomicBool::new(false);

    client
        .record_with_interrupt(&mut sensor, Some(Duration::from_millis(30)), &interrupt)
        .unwrap();

    assert_eq!(sensor.starts, 1);
    assert!(sensor.reads >= 1, "the loop should have polled at least once");
    assert_eq!(sensor.stops, 1);
    assert_eq!(sensor.cleanups, 1);
    assert!(!sensor.cleanup_before_stop, "stop() must precede cleanup()");
}

#[test]
fn test_interrupt_stops_and_cleans_exactly_once() {
    let client = RecordingClient::new("test").unwrap();
    let mut sensor = ScriptedSensor::default();
    // Unbounded recording, interrupted before the first iteration check
    let interrupt = AtomicBool::new(true);

    client
        .record_with_interrupt(&mut sensor, None, &interrupt)
        .unwrap();

    assert!(sensor.reads >= 1);
    assert_eq!(sensor.stops, 1);
    assert_eq!(sensor.cleanups, 1);
    assert!(!sensor.cleanup_before_stop);
}

#[test]
fn test_start_failure_still_stops_and_cleans() {
    let client = RecordingClient::new("test").unwrap();
    let mut sensor = ScriptedSensor {
        fail_start: true,
        ..Default::default()
    };
    let interrupt = AtomicBool::new(false);

    let result =
        client.record_with_interrupt(&mut sensor, Some(Duration::from_millis(10)), &interrupt);

    assert!(matches!(result, Err(SensorError::DeviceOpen(_))));
    assert_eq!(sensor.reads, 0, "a failed start must not be polled");
    assert_eq!(sensor.stops, 1);
    assert_eq!(sensor.cleanups, 1);
}

#[test]
fn test_empty_api_key_is_rejected() {
    let err = RecordingClient::new("").unwrap_err();
    assert!(matches!(err, SensorError::Configuration(_)));
}

#[test]
fn test_upload_flag_is_stored() {
    let client = RecordingClient::new("test").unwrap().with_upload(true);
    assert!(client.upload());
    assert_eq!(client.api_key(), "test");
}
