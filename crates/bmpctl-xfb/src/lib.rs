// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use image::{RgbImage, RgbaImage};

mod bmp;
mod xfb;

pub use bmp::BmpHeader;
pub use xfb::{BLACK, VideoMode, XFB_WIDTH, XfbScreen, XfbScreenBuilder};

/// Convert two RGB 888 pixels to one packed `Y1 Cb Y2 Cr` word.
///
/// Chroma of the pixel pair is averaged. All intermediate values stay within
/// 0..=255 for 8-bit inputs, so the conversion never clamps.
pub fn yuy2_pair(r1: u8, g1: u8, b1: u8, r2: u8, g2: u8, b2: u8) -> u32 {
    let (y1, cb1, cr1) = ycbcr(r1, g1, b1);
    let (y2, cb2, cr2) = ycbcr(r2, g2, b2);

    let cb = (cb1 + cb2) >> 1;
    let cr = (cr1 + cr2) >> 1;

    ((y1 as u32) << 24) | ((cb as u32) << 16) | ((y2 as u32) << 8) | cr as u32
}

fn ycbcr(r: u8, g: u8, b: u8) -> (i32, i32, i32) {
    let (r, g, b) = (r as i32, g as i32, b as i32);

    let y = (299 * r + 587 * g + 114 * b) / 1000;
    let cb = (-16874 * r - 33126 * g + 50000 * b + 12_800_000) / 100_000;
    let cr = (50000 * r - 41869 * g - 8131 * b + 12_800_000) / 100_000;

    (y, cb, cr)
}

/// Trait definition to get a packed Y1CbY2Cr representation from a source image.
pub trait ToYuy2 {
    /// Get the image as packed Y1CbY2Cr words, two horizontal pixels per word.
    ///
    /// Odd image widths are rounded up to a whole number of pixel pairs by
    /// repeating the last pixel of each row.
    fn to_yuy2(&self) -> Vec<u32>;

    /// Convert two RGB 888 pixels to a single packed Y1CbY2Cr word.
    fn convert_rgb_pair(&self, r1: u8, g1: u8, b1: u8, r2: u8, g2: u8, b2: u8) -> u32 {
        yuy2_pair(r1, g1, b1, r2, g2, b2)
    }
}

// TODO quick & dirty approach for converting RgbImage & RgbaImage to Y1CbY2Cr.
//      There should be a more generic way, maybe with PixelEnumerator...
impl ToYuy2 for &RgbImage {
    fn to_yuy2(&self) -> Vec<u32> {
        let (width, height) = self.dimensions();
        let mut words = Vec::with_capacity((width.div_ceil(2) * height) as usize);

        for y in 0..height {
            for x in (0..width).step_by(2) {
                let p1 = self.get_pixel(x, y).0;
                let p2 = self.get_pixel((x + 1).min(width - 1), y).0;
                words.push(self.convert_rgb_pair(p1[0], p1[1], p1[2], p2[0], p2[1], p2[2]));
            }
        }

        words
    }
}

impl ToYuy2 for &RgbaImage {
    fn to_yuy2(&self) -> Vec<u32> {
        let (width, height) = self.dimensions();
        let mut words = Vec::with_capacity((width.div_ceil(2) * height) as usize);

        for y in 0..height {
            for x in (0..width).step_by(2) {
                let p1 = self.get_pixel(x, y).0;
                let p2 = self.get_pixel((x + 1).min(width - 1), y).0;
                words.push(self.convert_rgb_pair(p1[0], p1[1], p1[2], p2[0], p2[1], p2[2]));
            }
        }

        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case((0, 0, 0), (0, 128, 128))]
    #[case((255, 255, 255), (255, 128, 128))]
    #[case((255, 0, 0), (76, 84, 255))]
    #[case((0, 255, 0), (149, 43, 21))]
    #[case((0, 0, 255), (29, 255, 107))]
    fn ycbcr_known_colors(#[case] rgb: (u8, u8, u8), #[case] expected: (i32, i32, i32)) {
        assert_eq!(expected, ycbcr(rgb.0, rgb.1, rgb.2));
    }

    #[test]
    fn ycbcr_stays_in_byte_range() {
        for r in (0..=255).step_by(17) {
            for g in (0..=255).step_by(17) {
                for b in (0..=255).step_by(17) {
                    let (y, cb, cr) = ycbcr(r, g, b);
                    assert!((0..=255).contains(&y), "y={y} for rgb({r},{g},{b})");
                    assert!((0..=255).contains(&cb), "cb={cb} for rgb({r},{g},{b})");
                    assert!((0..=255).contains(&cr), "cr={cr} for rgb({r},{g},{b})");
                }
            }
        }
    }

    #[test]
    fn pair_packs_luma_and_averaged_chroma() {
        // black + white pair: y1=0, y2=255, chroma stays neutral
        assert_eq!(0x0080_FF80, yuy2_pair(0, 0, 0, 255, 255, 255));
    }

    #[test]
    fn rgb_image_odd_width_repeats_last_pixel() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(2, 0, image::Rgb([255, 255, 255]));

        let words = (&img).to_yuy2();
        assert_eq!(2, words.len());
        assert_eq!(yuy2_pair(0, 0, 0, 0, 0, 0), words[0]);
        assert_eq!(yuy2_pair(255, 255, 255, 255, 255, 255), words[1]);
    }

    #[test]
    fn rgba_image_ignores_alpha() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 0]));
        img.put_pixel(1, 0, image::Rgba([255, 0, 0, 255]));

        let words = (&img).to_yuy2();
        assert_eq!(vec![yuy2_pair(255, 0, 0, 255, 0, 0)], words);
    }
}
