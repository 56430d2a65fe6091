// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic frame source
//!
//! Generates a moving test pattern: a white vertical bar whose
//! horizontal position advances with wall-clock time, plus a clock
//! overlay. The bar position is a pure function of time so recordings
//! from two runs at the same instant look identical.

use super::Frame;
use crate::config::SensorConfig;
use crate::constants::{SYNTHETIC_BAR_SPEED, SYNTHETIC_BAR_WIDTH};
use chrono::Local;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Test-pattern generator, the only self-throttling frame source.
///
/// Hardware and webcam capture are paced by the device; this source
/// sleeps `1/fps` per generated frame instead.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    fps: u32,
}

impl SyntheticSource {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            fps: config.fps,
        }
    }

    /// Generate the next frame and pace to the configured frame rate
    pub fn generate(&self) -> Frame {
        let t = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();

        let mut frame = render_pattern(self.width, self.height, t);
        let label = format!("SYNTH {}", Local::now().format("%H:%M:%S"));
        draw_label(&mut frame, &label, 20, 30, 3);

        std::thread::sleep(Duration::from_secs_f64(1.0 / self.fps.max(1) as f64));
        frame
    }
}

/// Horizontal bar position at wall-clock time `t` seconds:
/// `floor(t * 100) mod width`.
pub fn bar_position(t: f64, width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    ((t * SYNTHETIC_BAR_SPEED).floor() as u64 % width as u64) as u32
}

fn render_pattern(width: u32, height: u32, t: f64) -> Frame {
    let mut frame = Frame::black(width, height);
    let x0 = bar_position(t, width);
    let x1 = (x0 + SYNTHETIC_BAR_WIDTH).min(width);

    for row in 0..height {
        let row_start = (row * width) as usize * 3;
        let bar = &mut frame.data[row_start + x0 as usize * 3..row_start + x1 as usize * 3];
        bar.fill(255);
    }

    frame
}

// 5x7 glyph rows, bit 4 = leftmost column. Only the characters the
// synthetic and mock overlays use.
const GLYPHS: &[(char, [u8; 7])] = &[
    ('0', [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e]),
    ('1', [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e]),
    ('2', [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f]),
    ('3', [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e]),
    ('4', [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02]),
    ('5', [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e]),
    ('6', [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e]),
    ('7', [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e]),
    ('9', [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c]),
    (':', [0x00, 0x0c, 0x0c, 0x00, 0x0c, 0x0c, 0x00]),
    ('S', [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e]),
    ('Y', [0x11, 0x11, 0x0a, 0x04, 0x04, 0x04, 0x04]),
    ('N', [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11]),
    ('T', [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('H', [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11]),
    ('M', [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('O', [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e]),
    ('C', [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
];

/// Draw white block-glyph text onto a frame at (x, y)
///
/// Characters without a glyph render as a space. Pixels falling
/// outside the frame are clipped.
pub(crate) fn draw_label(frame: &mut Frame, text: &str, x: u32, y: u32, scale: u32) {
    let advance = 6 * scale;

    for (i, c) in text.chars().enumerate() {
        let Some((_, rows)) = GLYPHS.iter().find(|(g, _)| *g == c) else {
            continue;
        };
        let glyph_x = x + i as u32 * advance;

        for (row, bits) in rows.iter().enumerate() {
            for col in 0..5u32 {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                fill_block(
                    frame,
                    glyph_x + col * scale,
                    y + row as u32 * scale,
                    scale,
                );
            }
        }
    }
}

fn fill_block(frame: &mut Frame, x: u32, y: u32, scale: u32) {
    for py in y..(y + scale).min(frame.height) {
        for px in x..(x + scale).min(frame.width) {
            let idx = ((py * frame.width + px) * 3) as usize;
            frame.data[idx..idx + 3].fill(255);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_WIDTH;

    #[test]
    fn test_bar_position_formula() {
        // position = floor(t * 100) mod width
        assert_eq!(bar_position(0.0, DEFAULT_WIDTH), 0);
        assert_eq!(bar_position(1.0, DEFAULT_WIDTH), 100);
        assert_eq!(bar_position(0.999, DEFAULT_WIDTH), 99);
        assert_eq!(bar_position(13.0, DEFAULT_WIDTH), 20); // 1300 mod 1280
    }

    #[test]
    fn test_bar_position_advances_between_nearby_instants() {
        // Two reads a few hundredths of a second apart land on
        // consecutive formula values.
        assert_eq!(bar_position(2.0, 640), 200);
        assert_eq!(bar_position(2.055, 640), 205);
    }

    #[test]
    fn test_pattern_geometry_and_bar() {
        let frame = render_pattern(640, 480, 1.0);
        assert_eq!(frame.data.len(), 640 * 480 * 3);

        // Bar at x=100, 40 pixels wide, white on black
        let row = 240usize;
        let probe = |x: usize| frame.data[(row * 640 + x) * 3];
        assert_eq!(probe(99), 0);
        assert_eq!(probe(100), 255);
        assert_eq!(probe(139), 255);
        assert_eq!(probe(140), 0);
    }

    #[test]
    fn test_pattern_bar_clamps_at_right_edge() {
        // Bar origin 10 pixels from the edge: the overhang is clipped,
        // not wrapped to column zero.
        let width = 630;
        let frame = render_pattern(width, 16, 6.25); // floor(625) mod 630 = 625
        let probe = |x: usize| frame.data[x * 3];
        assert_eq!(probe(624), 0);
        assert_eq!(probe(625), 255);
        assert_eq!(probe(width as usize - 1), 255);
        assert_eq!(probe(0), 0);
    }

    #[test]
    fn test_draw_label_marks_pixels() {
        let mut frame = Frame::black(200, 60);
        draw_label(&mut frame, "12:34:56", 4, 4, 2);
        assert!(frame.data.iter().any(|&b| b == 255));
    }

    #[test]
    fn test_draw_label_clips_outside_frame() {
        let mut frame = Frame::black(10, 10);
        draw_label(&mut frame, "88:88:88", 4, 4, 3);
        assert_eq!(frame.data.len(), 10 * 10 * 3);
    }
}
