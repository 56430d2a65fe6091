// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Default capture width in pixels
pub const DEFAULT_WIDTH: u32 = 1280;

/// Default capture height in pixels
pub const DEFAULT_HEIGHT: u32 = 720;

/// Default target frame rate
pub const DEFAULT_FPS: u32 = 30;

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "recordings";

/// Default depth camera model identifier
pub const DEFAULT_MODEL: &str = "oak-d-pro";

/// Depth of the hardware frame queue. The capture thread drops frames
/// once this many are waiting, so a stalled consumer never builds up
/// unbounded backlog.
pub const HARDWARE_QUEUE_DEPTH: usize = 8;

/// Number of V4L2 MMAP buffers used per capture stream
pub const CAPTURE_BUFFER_COUNT: u32 = 4;

/// Width of the moving bar in synthetic frames, in pixels
pub const SYNTHETIC_BAR_WIDTH: u32 = 40;

/// The synthetic bar advances this many pixels per second of wall-clock time
pub const SYNTHETIC_BAR_SPEED: f64 = 100.0;

/// Pause after a failed webcam dequeue before reporting "no frame"
pub const WEBCAM_RETRY_PAUSE_MS: u64 = 5;

/// Encoder bitrate in kbps, tuned for 720p30 screen-quality output
pub const ENCODER_BITRATE_KBPS: u32 = 5_000;

/// How long close() waits for the muxer to finalize the file
pub const SINK_EOS_TIMEOUT_SECS: u64 = 5;
