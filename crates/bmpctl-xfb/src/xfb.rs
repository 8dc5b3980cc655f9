// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

//! Off-screen external framebuffer in packed Y1CbY2Cr pixel format.

use crate::ToYuy2;
use crate::bmp::BmpHeader;
use crate::yuy2_pair;

use anyhow::anyhow;
use bytes::{BufMut, BytesMut};
use log::{debug, info};

/// Framebuffer width in pixels, fixed for all video modes.
pub const XFB_WIDTH: u32 = 640;

/// Packed words per framebuffer row, two pixels per word.
const WORDS_PER_ROW: usize = (XFB_WIDTH / 2) as usize;

/// Packed YCbCr black: zero luma, neutral chroma.
pub const BLACK: u32 = 0x0080_0080;

/// Supported TV standards and their framebuffer heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoMode {
    #[default]
    Ntsc,
    Pal,
    Mpal,
}

impl VideoMode {
    pub fn width(&self) -> u32 {
        XFB_WIDTH
    }

    pub fn height(&self) -> u32 {
        match self {
            VideoMode::Ntsc | VideoMode::Mpal => 480,
            VideoMode::Pal => 528,
        }
    }

    /// Width, height in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }
}

#[derive(Default)]
pub struct XfbScreenBuilder {
    mode: Option<VideoMode>,
    double_buffer: Option<bool>,
}

impl XfbScreenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the video mode determining the framebuffer dimensions. Defaults to NTSC.
    pub fn mode(&mut self, mode: VideoMode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    /// Decode onto the hidden framebuffer and flip on show. Enabled by default.
    pub fn double_buffer(&mut self, enable: bool) -> &mut Self {
        self.double_buffer = Some(enable);
        self
    }

    pub fn build(&self) -> XfbScreen {
        let mode = self.mode.unwrap_or_default();
        let buffers = if self.double_buffer.unwrap_or(true) { 2 } else { 1 };
        let words = WORDS_PER_ROW * mode.height() as usize;

        info!(
            "Creating {}x{} {mode:?} framebuffer, {buffers} buffer(s)",
            mode.width(),
            mode.height()
        );

        XfbScreen {
            mode,
            fb: vec![vec![BLACK; words]; buffers],
            which: 0,
        }
    }
}

/// Double-buffered off-screen framebuffer in packed Y1CbY2Cr pixel format.
///
/// All drawing operations target the next (hidden) framebuffer and flip it to
/// the front when done, so [XfbScreen::front] always returns a complete frame.
pub struct XfbScreen {
    mode: VideoMode,
    fb: Vec<Vec<u32>>,
    which: usize,
}

impl XfbScreen {
    pub fn mode(&self) -> VideoMode {
        self.mode
    }

    /// Decode a 24-bit uncompressed Windows bitmap onto the next framebuffer
    /// and flip.
    ///
    /// The bitmap is centered on the framebuffer. Smaller images leave the
    /// surrounding framebuffer contents untouched. Bitmaps larger than the
    /// framebuffer are rejected.
    pub fn show_bmp(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let header = BmpHeader::parse(data)?;
        let (width, height) = (header.width, header.height);

        if width > self.mode.width() || height > self.mode.height() {
            return Err(anyhow!(
                "Bitmap {width}x{height} exceeds the {:?} framebuffer {}x{}",
                self.mode,
                self.mode.width(),
                self.mode.height()
            ));
        }

        let pixels = header.pixel_data(data)?;
        let stride = header.row_stride();

        // Round odd widths up to a whole number of pixel pairs.
        let fb_width = width + (width & 1);

        // Centered target region: word column and top row.
        let word_offset = ((XFB_WIDTH - fb_width) / 2 / 2) as usize;
        let top_row = ((self.mode.height() - height) / 2) as usize;

        debug!("Blitting {width}x{height} bitmap at row {top_row}, word column {word_offset}");

        let back = self.back_index();
        // Bitmap rows are stored left-to-right, bottom-to-top.
        for row in 0..height as usize {
            let src = &pixels[(height as usize - 1 - row) * stride..][..width as usize * 3];
            let dst_start = (top_row + row) * WORDS_PER_ROW + word_offset;
            let dst = &mut self.fb[back][dst_start..dst_start + (fb_width / 2) as usize];

            for (pair, word) in dst.iter_mut().enumerate() {
                let (r1, g1, b1) = bgr_pixel(src, pair * 2, width as usize);
                let (r2, g2, b2) = bgr_pixel(src, pair * 2 + 1, width as usize);
                *word = yuy2_pair(r1, g1, b1, r2, g2, b2);
            }
        }

        self.flip();

        Ok(())
    }

    /// Blit a full packed frame onto the next framebuffer and flip.
    ///
    /// The image must match the framebuffer dimensions exactly; the caller is
    /// responsible for scaling.
    pub fn show_image(&mut self, image: impl ToYuy2) -> anyhow::Result<()> {
        let words = image.to_yuy2();
        let expected = WORDS_PER_ROW * self.mode.height() as usize;
        if words.len() != expected {
            return Err(anyhow!(
                "Frame size mismatch: {} words, {:?} framebuffer needs {expected}",
                words.len(),
                self.mode
            ));
        }

        let back = self.back_index();
        self.fb[back].copy_from_slice(&words);
        self.flip();

        Ok(())
    }

    /// Fill the next framebuffer with YCbCr black and flip.
    pub fn clear(&mut self) {
        let back = self.back_index();
        self.fb[back].fill(BLACK);
        self.flip();
    }

    /// Toggle the displayed framebuffer. No-op when double buffering is off.
    pub fn flip(&mut self) {
        if self.fb.len() > 1 {
            self.which ^= 1;
        }
    }

    /// The currently displayed frame.
    pub fn front(&self) -> &[u32] {
        &self.fb[self.which]
    }

    /// Raw export of the displayed frame: big-endian words, i.e. the byte
    /// sequence `y1 cb y2 cr`.
    pub fn frame_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.front().len() * 4);
        for word in self.front() {
            buf.put_u32(*word);
        }
        buf
    }

    fn back_index(&self) -> usize {
        if self.fb.len() > 1 { self.which ^ 1 } else { 0 }
    }
}

/// BGR 888 pixel at column `x`, clamped to the row so that rounded-up odd
/// widths repeat the last pixel.
fn bgr_pixel(row: &[u8], x: usize, width: usize) -> (u8, u8, u8) {
    let x = x.min(width - 1);
    (row[x * 3 + 2], row[x * 3 + 1], row[x * 3])
}
