// SPDX-License-Identifier: GPL-3.0-only

//! Sensor configuration

use crate::constants::{DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_MODEL, DEFAULT_OUTPUT_DIR, DEFAULT_WIDTH};
use crate::errors::{SensorError, SensorResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Which frame source to use when the depth camera is unavailable
///
/// Serialized as a bare integer (webcam device index) or the string
/// `"synthetic"`, so config files read e.g. `"fallback": 0` or
/// `"fallback": "synthetic"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackSource {
    /// V4L2 webcam at `/dev/video{index}`
    Webcam(u32),
    /// Generated test-pattern frames, no device required
    Synthetic,
}

impl Serialize for FallbackSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FallbackSource::Webcam(index) => serializer.serialize_u32(*index),
            FallbackSource::Synthetic => serializer.serialize_str("synthetic"),
        }
    }
}

impl<'de> Deserialize<'de> for FallbackSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Index(u32),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Index(index) => Ok(FallbackSource::Webcam(index)),
            Raw::Name(name) if name == "synthetic" => Ok(FallbackSource::Synthetic),
            Raw::Name(name) => Err(D::Error::custom(format!(
                "unknown fallback source '{}' (expected a device index or \"synthetic\")",
                name
            ))),
        }
    }
}

/// Immutable configuration for one recording target
///
/// Supplied at construction and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Depth camera model identifier, used in output file names
    pub model: String,
    /// Directory recordings are written to, created if absent
    pub output_dir: PathBuf,
    /// Whether a failed hardware path may degrade to the fallback source
    pub allow_fallback: bool,
    /// Source used when hardware is unavailable or fails to open
    pub fallback: FallbackSource,
    /// Output frame width in pixels
    pub width: u32,
    /// Output frame height in pixels
    pub height: u32,
    /// Target frame rate
    pub fps: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            allow_fallback: true,
            fallback: FallbackSource::Webcam(0),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
        }
    }
}

impl SensorConfig {
    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults, so a partial config is valid.
    pub fn load(path: &Path) -> SensorResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            SensorError::Configuration(format!("invalid config {}: {}", path.display(), e))
        })
    }
}
