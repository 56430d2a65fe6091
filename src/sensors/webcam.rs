// SPDX-License-Identifier: GPL-3.0-only

//! Webcam frame source
//!
//! V4L2 MMAP capture from `/dev/video{index}`. The configured
//! resolution and frame rate are requested best-effort; many UVC
//! drivers substitute the nearest mode they support, so frames are
//! decoded at whatever geometry the driver granted and resized by the
//! adapter before they reach the sink.

use super::convert::{uyvy_to_rgb, yuyv_to_rgb};
use super::Frame;
use crate::config::SensorConfig;
use crate::constants::{CAPTURE_BUFFER_COUNT, WEBCAM_RETRY_PAUSE_MS};
use crate::errors::{SensorError, SensorResult};
use std::time::Duration;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::capture::Parameters;
use v4l::video::Capture;
use v4l::{Device, FourCC};

/// An open webcam capture stream
pub struct WebcamSource {
    stream: MmapStream<'static>,
    width: u32,
    height: u32,
    fourcc: FourCC,
}

impl WebcamSource {
    /// Open the webcam at `/dev/video{index}` and start streaming
    pub fn open(index: u32, config: &SensorConfig) -> SensorResult<Self> {
        let path = format!("/dev/video{}", index);
        let dev = Device::with_path(&path).map_err(|e| {
            SensorError::DeviceOpen(format!(
                "{}: {} (try a different index or fallback \"synthetic\")",
                path, e
            ))
        })?;

        // Request the configured mode; keep whatever the driver grants
        let mut format = dev
            .format()
            .map_err(|e| SensorError::DeviceOpen(format!("{}: query format: {}", path, e)))?;
        format.width = config.width;
        format.height = config.height;
        format.fourcc = FourCC::new(b"YUYV");

        let actual = match dev.set_format(&format) {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "Could not set webcam format, using current");
                dev.format()
                    .map_err(|e| SensorError::DeviceOpen(format!("{}: query format: {}", path, e)))?
            }
        };
        if actual.width != config.width || actual.height != config.height {
            debug!(
                requested_width = config.width,
                requested_height = config.height,
                granted_width = actual.width,
                granted_height = actual.height,
                "Webcam substituted capture size"
            );
        }

        match dev.set_params(&Parameters::with_fps(config.fps)) {
            Ok(params) => debug!(interval = ?params.interval, "Webcam frame interval set"),
            Err(e) => warn!(error = %e, "Could not set webcam frame rate"),
        }

        let stream = MmapStream::with_buffers(&dev, Type::VideoCapture, CAPTURE_BUFFER_COUNT)
            .map_err(|e| SensorError::DeviceOpen(format!("{}: start stream: {}", path, e)))?;

        info!(
            path = %path,
            width = actual.width,
            height = actual.height,
            fourcc = ?actual.fourcc,
            "Webcam opened"
        );

        Ok(Self {
            stream,
            width: actual.width,
            height: actual.height,
            fourcc: actual.fourcc,
        })
    }

    /// Grab the next frame, blocking on the driver dequeue.
    ///
    /// The dequeue cannot be interrupted mid-call; cancellation is only
    /// observed by the recording loop between grabs. A transient
    /// failure pauses briefly and returns None.
    pub fn grab(&mut self) -> Option<Frame> {
        match self.stream.next() {
            Ok((buf, meta)) => {
                let used = meta.bytesused as usize;
                let data = if used > 0 && used <= buf.len() {
                    &buf[..used]
                } else {
                    buf
                };
                decode_frame(data, self.width, self.height, self.fourcc)
            }
            Err(e) => {
                debug!(error = %e, "Webcam dequeue failed");
                std::thread::sleep(Duration::from_millis(WEBCAM_RETRY_PAUSE_MS));
                None
            }
        }
    }
}

fn decode_frame(data: &[u8], width: u32, height: u32, fourcc: FourCC) -> Option<Frame> {
    match &fourcc.repr {
        b"YUYV" => Some(Frame {
            width,
            height,
            data: yuyv_to_rgb(data, width, height),
        }),
        b"UYVY" => Some(Frame {
            width,
            height,
            data: uyvy_to_rgb(data, width, height),
        }),
        b"MJPG" | b"JPEG" => {
            let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
                .map_err(|e| debug!(error = %e, "Dropping undecodable MJPG frame"))
                .ok()?;
            let rgb = img.to_rgb8();
            Some(Frame {
                width: rgb.width(),
                height: rgb.height(),
                data: rgb.into_raw(),
            })
        }
        other => {
            debug!(fourcc = %String::from_utf8_lossy(other), "Unsupported webcam pixel format");
            None
        }
    }
}
