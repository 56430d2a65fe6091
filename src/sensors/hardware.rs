// SPDX-License-Identifier: GPL-3.0-only

//! Depth-camera frame source
//!
//! Streams the depth device over V4L2 MMAP on a capture thread that
//! feeds a bounded frame queue. The adapter polls the queue without
//! blocking, the way the depth SDK's own output queue would be polled;
//! when the consumer stalls, the capture thread drops frames instead
//! of building backlog.

use super::convert::{y10b_to_rgb, y16_to_rgb};
use super::probe::{DepthDevice, DepthFormat};
use super::Frame;
use crate::config::SensorConfig;
use crate::constants::{CAPTURE_BUFFER_COUNT, HARDWARE_QUEUE_DEPTH};
use crate::errors::{SensorError, SensorResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::capture::Parameters;
use v4l::video::Capture;
use v4l::Device;

/// An open depth-camera session: capture thread plus frame queue
pub struct HardwareSource {
    queue: Receiver<Frame>,
    stop_signal: Arc<AtomicBool>,
    capture_thread: Option<JoinHandle<()>>,
}

impl HardwareSource {
    /// Open the depth device and start the capture thread
    pub fn open(device: &DepthDevice, config: &SensorConfig) -> SensorResult<Self> {
        let dev = Device::with_path(&device.path).map_err(|e| {
            SensorError::DeviceOpen(format!("{}: {}", device.path.display(), e))
        })?;

        // Request the configured size in the device's depth format;
        // keep whatever the driver grants
        let mut format = dev.format().map_err(|e| {
            SensorError::DeviceOpen(format!("{}: query format: {}", device.path.display(), e))
        })?;
        format.width = config.width;
        format.height = config.height;
        format.fourcc = device.format.fourcc();

        let actual = match dev.set_format(&format) {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "Could not set depth format, using current");
                dev.format().map_err(|e| {
                    SensorError::DeviceOpen(format!(
                        "{}: query format: {}",
                        device.path.display(),
                        e
                    ))
                })?
            }
        };
        if actual.fourcc != device.format.fourcc() {
            warn!(
                expected = ?device.format.fourcc(),
                got = ?actual.fourcc,
                "Device did not accept the requested depth format"
            );
        }

        if let Err(e) = dev.set_params(&Parameters::with_fps(config.fps)) {
            warn!(error = %e, "Could not set depth frame rate");
        }

        info!(
            path = %device.path.display(),
            card = %device.card,
            width = actual.width,
            height = actual.height,
            "Depth camera opened"
        );

        let (sender, queue) = std::sync::mpsc::sync_channel(HARDWARE_QUEUE_DEPTH);
        let stop_signal = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let depth_format = device.format;
        let (width, height) = (actual.width, actual.height);
        let capture_thread = std::thread::Builder::new()
            .name("depth-capture".to_string())
            .spawn(move || capture_loop(dev, width, height, depth_format, sender, stop))
            .map_err(|e| SensorError::DeviceOpen(format!("capture thread: {}", e)))?;

        Ok(Self {
            queue,
            stop_signal,
            capture_thread: Some(capture_thread),
        })
    }

    /// Pull one frame if available, without blocking
    pub fn try_read(&mut self) -> Option<Frame> {
        self.queue.try_recv().ok()
    }

    /// Stop the capture thread and release the device.
    ///
    /// A failed join is logged and swallowed so cleanup can continue
    /// unconditionally. Safe to call twice.
    pub fn close(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(thread) = self.capture_thread.take() {
            if thread.join().is_err() {
                warn!("Depth capture thread panicked during shutdown");
            }
        }
    }
}

impl Drop for HardwareSource {
    fn drop(&mut self) {
        self.close();
    }
}

fn capture_loop(
    dev: Device,
    width: u32,
    height: u32,
    format: DepthFormat,
    sender: SyncSender<Frame>,
    stop: Arc<AtomicBool>,
) {
    let mut stream = match MmapStream::with_buffers(&dev, Type::VideoCapture, CAPTURE_BUFFER_COUNT)
    {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "Failed to start depth capture stream");
            return;
        }
    };

    debug!("Depth capture stream started");

    while !stop.load(Ordering::SeqCst) {
        match stream.next() {
            Ok((buf, meta)) => {
                let used = meta.bytesused as usize;
                let data = if used > 0 && used <= buf.len() {
                    &buf[..used]
                } else {
                    &buf[..]
                };

                let rgb = match format {
                    DepthFormat::Y16 => y16_to_rgb(data, width, height),
                    DepthFormat::Y10B => y10b_to_rgb(data, width, height),
                };
                let frame = Frame {
                    width,
                    height,
                    data: rgb,
                };

                match sender.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        debug!(sequence = meta.sequence, "Depth frame dropped (queue full)");
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to capture depth frame");
                std::thread::sleep(std::time::Duration::from_millis(10));
            }
        }
    }

    debug!("Depth capture stream stopped");
}
