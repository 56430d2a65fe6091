// SPDX-License-Identifier: GPL-3.0-only

//! Capability probing
//!
//! Answers "is a depth camera present on this machine" without ever
//! failing the caller: enumeration errors, permission problems, and a
//! missing /dev all read as "no device", so the fallback policy can
//! proceed in restricted or headless environments.

#[cfg(feature = "hardware")]
use tracing::debug;

/// Depth pixel formats the capture path understands
#[cfg(feature = "hardware")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFormat {
    /// 16-bit little-endian depth in millimeters
    Y16,
    /// Packed 10-bit luma, 4 pixels in 5 bytes
    Y10B,
}

#[cfg(feature = "hardware")]
impl DepthFormat {
    pub fn fourcc(&self) -> v4l::FourCC {
        match self {
            DepthFormat::Y16 => v4l::FourCC::new(b"Y16 "),
            DepthFormat::Y10B => v4l::FourCC::new(b"Y10B"),
        }
    }
}

/// A depth-capable V4L2 device found by the probe
#[cfg(feature = "hardware")]
#[derive(Debug, Clone)]
pub struct DepthDevice {
    /// Device node, e.g. /dev/video4
    pub path: std::path::PathBuf,
    /// V4L2 card name
    pub card: String,
    /// Preferred depth format advertised by the device
    pub format: DepthFormat,
}

/// Whether the video stack required for writing recordings is usable.
///
/// Mirrors the "recording needs OpenCV" precondition of the original
/// client: GStreamer must initialize or nothing can be recorded at all.
pub fn video_stack_available() -> bool {
    gstreamer::init().is_ok()
}

/// Find the first depth-capable capture device
///
/// Scans `/dev/video*` and classifies a device as a depth camera when
/// it enumerates a `Y16 ` or `Y10B` capture format. Any error on any
/// device is treated as "not a depth camera" and the scan continues.
#[cfg(feature = "hardware")]
pub fn find_depth_device() -> Option<DepthDevice> {
    let entries: Vec<_> = std::fs::read_dir("/dev")
        .into_iter()
        .flatten()
        .flatten()
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("video"))
                .unwrap_or(false)
        })
        .collect();

    for entry in entries {
        let path = entry.path();
        if let Some(device) = classify_depth_device(&path) {
            debug!(path = %device.path.display(), card = %device.card, "Found depth device");
            return Some(device);
        }
    }

    None
}

#[cfg(feature = "hardware")]
fn classify_depth_device(path: &std::path::Path) -> Option<DepthDevice> {
    use v4l::video::Capture;

    let dev = v4l::Device::with_path(path).ok()?;
    let caps = dev.query_caps().ok()?;

    let formats: Vec<_> = dev.enum_formats().into_iter().flatten().collect();
    let fourcc_y16 = v4l::FourCC::new(b"Y16 ");
    let fourcc_y10b = v4l::FourCC::new(b"Y10B");

    let format = if formats.iter().any(|f| f.fourcc == fourcc_y16) {
        DepthFormat::Y16
    } else if formats.iter().any(|f| f.fourcc == fourcc_y10b) {
        DepthFormat::Y10B
    } else {
        return None;
    };

    Some(DepthDevice {
        path: path.to_path_buf(),
        card: caps.card,
        format,
    })
}

/// Whether at least one depth camera is present
///
/// Compiled without the `hardware` feature this is always false and
/// the adapter resolves its fallback source instead.
pub fn depth_device_available() -> bool {
    #[cfg(feature = "hardware")]
    {
        find_depth_device().is_some()
    }
    #[cfg(not(feature = "hardware"))]
    {
        false
    }
}
