// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

//! Framebuffer preview and export.
//!
//! The off-screen framebuffer has no attached video hardware. For inspection
//! the packed frame is converted back to RGB and saved as a .PNG graphic, or
//! dumped as raw big-endian words.

use anyhow::Context;
use bmpctl_xfb::XfbScreen;
use image::{Rgb, RgbImage};
use log::debug;
use std::fs;
use std::path::Path;

// Inverse BT.601 full-range coefficients, scaled by 2^6:
// 1.402, 1.772, 0.714, 0.344
const CR_COEF: i32 = 90;
const CB_COEF: i32 = 113;
const G_COEF_1: i32 = 46;
const G_COEF_2: i32 = 22;

/// Unpack one Y1CbY2Cr word into two RGB 888 pixels.
pub fn unpack_pair(word: u32) -> ([u8; 3], [u8; 3]) {
    let y1 = ((word >> 24) & 0xff) as i32;
    let cb = ((word >> 16) & 0xff) as i32 - 128;
    let y2 = ((word >> 8) & 0xff) as i32;
    let cr = (word & 0xff) as i32 - 128;

    (rgb(y1, cb, cr), rgb(y2, cb, cr))
}

fn rgb(y: i32, cb: i32, cr: i32) -> [u8; 3] {
    let y = y << 6;
    let r = ((y + CR_COEF * cr) >> 6).clamp(0, 255);
    let g = ((y - G_COEF_1 * cr - G_COEF_2 * cb) >> 6).clamp(0, 255);
    let b = ((y + CB_COEF * cb) >> 6).clamp(0, 255);

    [r as u8, g as u8, b as u8]
}

/// Convert the displayed frame back to an RGB image.
pub fn frame_to_rgb(screen: &XfbScreen) -> RgbImage {
    let (width, height) = screen.mode().size();
    let words_per_row = width / 2;
    let mut img = RgbImage::new(width, height);

    for (idx, word) in screen.front().iter().enumerate() {
        let x = (idx as u32 % words_per_row) * 2;
        let y = idx as u32 / words_per_row;
        let (p1, p2) = unpack_pair(*word);
        img.put_pixel(x, y, Rgb(p1));
        img.put_pixel(x + 1, y, Rgb(p2));
    }

    img
}

/// Save a .PNG preview of the displayed frame.
pub fn save_png(screen: &XfbScreen, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    debug!("Saving frame preview {path:?}");

    frame_to_rgb(screen)
        .save(path)
        .with_context(|| format!("Error saving frame preview {path:?}"))
}

/// Dump the displayed frame as raw big-endian words (byte sequence `y1 cb y2 cr`).
pub fn save_raw(screen: &XfbScreen, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    debug!("Saving raw frame {path:?}");

    fs::write(path, screen.frame_bytes()).with_context(|| format!("Error saving raw frame {path:?}"))
}
