// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the configuration module

use depthrec::{FallbackSource, SensorConfig};

#[test]
fn test_config_defaults() {
    let config = SensorConfig::default();

    assert_eq!(config.model, "oak-d-pro");
    assert_eq!(config.output_dir.to_string_lossy(), "recordings");
    assert!(config.allow_fallback, "fallback should be allowed by default");
    assert_eq!(config.fallback, FallbackSource::Webcam(0));
    assert_eq!((config.width, config.height, config.fps), (1280, 720, 30));
}

#[test]
fn test_fallback_selector_integer_form() {
    let config: SensorConfig = serde_json::from_str(r#"{"fallback": 1}"#).unwrap();
    assert_eq!(config.fallback, FallbackSource::Webcam(1));
}

#[test]
fn test_fallback_selector_string_form() {
    let config: SensorConfig = serde_json::from_str(r#"{"fallback": "synthetic"}"#).unwrap();
    assert_eq!(config.fallback, FallbackSource::Synthetic);
}

#[test]
fn test_fallback_selector_rejects_unknown_string() {
    let result: Result<SensorConfig, _> = serde_json::from_str(r#"{"fallback": "webcam"}"#);
    assert!(result.is_err(), "unknown selector strings must not parse");
}

#[test]
fn test_config_round_trip() {
    let config = SensorConfig {
        model: "oak-d-lite".to_string(),
        fallback: FallbackSource::Synthetic,
        width: 640,
        height: 480,
        ..Default::default()
    };

    let json = serde_json::to_string(&config).unwrap();
    let restored: SensorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, config);
}

#[test]
fn test_partial_config_takes_defaults() {
    let config: SensorConfig = serde_json::from_str(r#"{"model": "custom-cam"}"#).unwrap();
    assert_eq!(config.model, "custom-cam");
    assert_eq!(config.width, 1280);
    assert!(config.allow_fallback);
}

#[test]
fn test_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"fallback": "synthetic", "fps": 15}"#).unwrap();

    let config = SensorConfig::load(&path).unwrap();
    assert_eq!(config.fallback, FallbackSource::Synthetic);
    assert_eq!(config.fps, 15);
}

#[test]
fn test_config_load_rejects_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(SensorConfig::load(&path).is_err());
}
