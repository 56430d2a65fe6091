// SPDX-License-Identifier: GPL-3.0-only

//! Mock sensor
//!
//! Test double for the recording client: replays a video file in a
//! loop when given one, otherwise emits flat stamped frames. No
//! hardware, no fallback policy, output named `{timestamp}_mock.mp4`.

use super::synthetic::draw_label;
use super::{Frame, Sensor};
use crate::constants::{DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::errors::{SensorError, SensorResult};
use crate::sink::VideoSink;
use crate::storage;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

/// Looping video-file frame source
struct FilePlayer {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
}

impl FilePlayer {
    fn open(path: &Path, width: u32, height: u32) -> SensorResult<Self> {
        gst::init()
            .map_err(|e| SensorError::Configuration(format!("GStreamer init failed: {}", e)))?;

        let pipeline_str = format!(
            "filesrc location=\"{}\" ! decodebin ! \
             videoconvert ! videoscale ! video/x-raw,format=RGB,width={},height={} ! \
             appsink name=sink max-buffers=2 sync=false",
            path.to_string_lossy(),
            width,
            height
        );

        let pipeline = gst::parse::launch(&pipeline_str)
            .map_err(|e| {
                SensorError::Configuration(format!(
                    "failed to open mock source {}: {}",
                    path.display(),
                    e
                ))
            })?
            .downcast::<gst::Pipeline>()
            .map_err(|_| SensorError::Configuration("not a pipeline".to_string()))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| SensorError::Configuration("no appsink in pipeline".to_string()))?
            .downcast::<gst_app::AppSink>()
            .map_err(|_| SensorError::Configuration("failed to cast appsink".to_string()))?;

        pipeline.set_state(gst::State::Playing).map_err(|e| {
            SensorError::Configuration(format!(
                "failed to play mock source {}: {:?}",
                path.display(),
                e
            ))
        })?;

        Ok(Self { pipeline, appsink })
    }

    /// Pull the next frame, rewinding at end of file
    fn next_frame(&self) -> Option<Frame> {
        if let Some(frame) = self.pull() {
            return Some(frame);
        }

        // End of file: rewind and try once more
        if self
            .pipeline
            .seek_simple(gst::SeekFlags::FLUSH, gst::ClockTime::ZERO)
            .is_err()
        {
            debug!("Mock source rewind failed");
            return None;
        }
        self.pull()
    }

    fn pull(&self) -> Option<Frame> {
        let sample = self
            .appsink
            .try_pull_sample(gst::ClockTime::from_mseconds(500))?;
        extract_frame(&sample)
    }

    fn close(&self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

fn extract_frame(sample: &gst::Sample) -> Option<Frame> {
    let caps = sample.caps()?;
    let structure = caps.structure(0)?;
    let width = structure.get::<i32>("width").ok()? as u32;
    let height = structure.get::<i32>("height").ok()? as u32;

    let buffer = sample.buffer()?;
    let map = buffer.map_readable().ok()?;

    Some(Frame {
        width,
        height,
        data: map.as_slice().to_vec(),
    })
}

/// Recording sensor backed by a video file or generated frames
pub struct MockSensor {
    source: Option<PathBuf>,
    output_dir: PathBuf,
    width: u32,
    height: u32,
    fps: u32,
    player: Option<FilePlayer>,
    sink: Option<VideoSink>,
    running: bool,
    current_file: Option<PathBuf>,
}

impl MockSensor {
    /// Create a mock sensor; `source` is an optional video file to
    /// replay in a loop.
    pub fn new(source: Option<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            output_dir: output_dir.into(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fps: DEFAULT_FPS,
            player: None,
            sink: None,
            running: false,
            current_file: None,
        }
    }

    /// Path of the most recent recording, if a session was started
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    fn generated_frame(&self) -> Frame {
        let ticks = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
            / 100;
        let mut frame = Frame::filled(self.width, self.height, 40);
        draw_label(&mut frame, &format!("MOCK {}", ticks), 50, 80, 4);
        frame
    }
}

impl Sensor for MockSensor {
    fn name(&self) -> &str {
        "mock"
    }

    fn initialize(&mut self) -> SensorResult<()> {
        storage::ensure_output_dir(&self.output_dir)?;
        if let Some(source) = self.source.clone() {
            self.player = Some(FilePlayer::open(&source, self.width, self.height)?);
        }
        Ok(())
    }

    fn start(&mut self) -> SensorResult<()> {
        let path = storage::recording_path(&self.output_dir, None, "mock");
        let sink = VideoSink::open(path, self.width, self.height, self.fps)?;
        self.current_file = Some(sink.path().to_path_buf());
        self.sink = Some(sink);
        self.running = true;
        info!("Mock recording started");
        Ok(())
    }

    fn read(&mut self) -> bool {
        if !self.running {
            return false;
        }

        let frame = match self.player.as_ref() {
            Some(player) => match player.next_frame() {
                Some(frame) => frame,
                None => return false,
            },
            None => self.generated_frame(),
        };

        let Some(sink) = self.sink.as_mut() else {
            return false;
        };
        let written = match sink.write(frame) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to write mock frame");
                false
            }
        };

        // Simulate the device frame rate
        std::thread::sleep(Duration::from_secs_f64(1.0 / self.fps.max(1) as f64));
        written
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn cleanup(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.close();
        }
        if let Some(player) = self.player.take() {
            player.close();
        }
        info!("Cleanup complete");
    }
}
