// SPDX-License-Identifier: GPL-3.0-only

//! Video sink
//!
//! Writes successive RGB frames to an MP4 file through a GStreamer
//! pipeline: `appsrc ! videoconvert ! x264enc ! h264parse !
//! mp4mux ! filesink`. The writer has a fixed geometry; callers must
//! resize frames before writing.

use crate::constants::{ENCODER_BITRATE_KBPS, SINK_EOS_TIMEOUT_SECS};
use crate::errors::{SensorError, SensorResult};
use crate::sensors::Frame;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Codec-backed file writer for one recording session
pub struct VideoSink {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    path: PathBuf,
    frame_duration_ns: u64,
    frames_written: u64,
    closed: bool,
}

impl VideoSink {
    /// Create the writer pipeline and start it
    pub fn open(path: PathBuf, width: u32, height: u32, fps: u32) -> SensorResult<Self> {
        gst::init().map_err(|e| SensorError::SinkOpen(format!("GStreamer init failed: {}", e)))?;

        let fps = fps.max(1);
        let video_info =
            gst_video::VideoInfo::builder(gst_video::VideoFormat::Rgb, width, height)
                .fps(gst::Fraction::new(fps as i32, 1))
                .build()
                .map_err(|e| SensorError::SinkOpen(format!("invalid video info: {}", e)))?;
        let caps = video_info
            .to_caps()
            .map_err(|e| SensorError::SinkOpen(format!("invalid caps: {}", e)))?;

        let appsrc = gst_app::AppSrc::builder()
            .name("src")
            .caps(&caps)
            .format(gst::Format::Time)
            .is_live(true)
            .build();

        let videoconvert = make_element("videoconvert")?;
        let encoder = make_element("x264enc")?;
        let _ = encoder.set_property_from_str("speed-preset", "veryfast");
        let _ = encoder.set_property_from_str("tune", "zerolatency");
        encoder.set_property("bitrate", ENCODER_BITRATE_KBPS);

        let parser = make_element("h264parse")?;
        let muxer = make_element("mp4mux")?;
        // faststart writes the index up front so files are seekable
        muxer.set_property("faststart", true);

        let filesink = make_element("filesink")?;
        filesink.set_property("location", path.to_string_lossy().to_string());

        let pipeline = gst::Pipeline::new();
        pipeline
            .add_many([
                appsrc.upcast_ref(),
                &videoconvert,
                &encoder,
                &parser,
                &muxer,
                &filesink,
            ])
            .map_err(|e| SensorError::SinkOpen(format!("failed to assemble pipeline: {}", e)))?;
        gst::Element::link_many([
            appsrc.upcast_ref(),
            &videoconvert,
            &encoder,
            &parser,
            &muxer,
            &filesink,
        ])
        .map_err(|e| SensorError::SinkOpen(format!("failed to link pipeline: {}", e)))?;

        pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| SensorError::SinkOpen(format!("failed to start pipeline: {:?}", e)))?;

        info!(path = %path.display(), width, height, fps, "Recording to file");

        Ok(Self {
            pipeline,
            appsrc,
            path,
            frame_duration_ns: 1_000_000_000 / fps as u64,
            frames_written: 0,
            closed: false,
        })
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of frames pushed so far
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Append one frame.
    ///
    /// The frame must match the geometry the sink was opened with;
    /// mismatched data produces a corrupt stream.
    pub fn write(&mut self, frame: Frame) -> SensorResult<()> {
        if self.closed {
            return Err(SensorError::SinkOpen("sink already closed".to_string()));
        }

        let mut buffer = gst::Buffer::from_mut_slice(frame.data);
        {
            let buffer = buffer.get_mut().expect("new buffer is uniquely owned");
            buffer.set_pts(gst::ClockTime::from_nseconds(
                self.frames_written * self.frame_duration_ns,
            ));
            buffer.set_duration(gst::ClockTime::from_nseconds(self.frame_duration_ns));
        }

        self.appsrc
            .push_buffer(buffer)
            .map_err(|e| SensorError::SinkOpen(format!("failed to push frame: {:?}", e)))?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush the encoder and finalize the file. Safe to call twice.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.appsrc.end_of_stream() {
            warn!(error = ?e, "Failed to send EOS to writer");
        }

        // Wait for the muxer to write the index before tearing down
        if let Some(bus) = self.pipeline.bus() {
            for msg in bus.iter_timed(gst::ClockTime::from_seconds(SINK_EOS_TIMEOUT_SECS)) {
                match msg.view() {
                    gst::MessageView::Eos(..) => break,
                    gst::MessageView::Error(err) => {
                        error!(error = %err.error(), "Writer pipeline error during close");
                        break;
                    }
                    _ => {}
                }
            }
        }

        let _ = self.pipeline.set_state(gst::State::Null);

        info!(
            path = %self.path.display(),
            frames = self.frames_written,
            "Recording finalized"
        );
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        self.close();
    }
}

fn make_element(name: &str) -> SensorResult<gst::Element> {
    gst::ElementFactory::make(name)
        .build()
        .map_err(|e| SensorError::SinkOpen(format!("failed to create {}: {}", name, e)))
}
