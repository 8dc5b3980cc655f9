// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

//! Windows bitmap header parsing and validation.
//!
//! Only the subset needed for the supported format is parsed: 24-bit,
//! uncompressed, single plane. All multi-byte header fields are stored
//! little-endian in the file.

use anyhow::anyhow;

/// Combined size of the file header (14 bytes) and the minimal info header (40 bytes).
const MIN_HEADER_SIZE: usize = 54;

/// Relevant fields of the BMP file and info headers.
///
/// Field offsets follow the BITMAPFILEHEADER / BITMAPINFOHEADER layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    /// Offset from the start of the file to the pixel array.
    pub pixel_offset: u32,
    /// Size of the info header, 40 for BITMAPINFOHEADER.
    pub info_size: u32,
    pub width: u32,
    pub height: u32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    /// 0 = BI_RGB, uncompressed.
    pub compression: u32,
}

impl BmpHeader {
    /// Parse and validate the bitmap headers.
    ///
    /// Unsupported formats (multi-plane, compressed, anything other than
    /// 24 bits per pixel) are rejected with a diagnostic error.
    pub fn parse(data: &[u8]) -> anyhow::Result<BmpHeader> {
        if data.len() < MIN_HEADER_SIZE {
            return Err(anyhow!(
                "Bitmap header truncated: {} bytes, expected at least {MIN_HEADER_SIZE}",
                data.len()
            ));
        }
        if &data[0..2] != b"BM" {
            return Err(anyhow!("Not a Windows bitmap, missing BM magic"));
        }

        let header = BmpHeader {
            pixel_offset: u32_le(data, 10),
            info_size: u32_le(data, 14),
            width: u32_le(data, 18),
            height: u32_le(data, 22),
            planes: u16_le(data, 26),
            bits_per_pixel: u16_le(data, 28),
            compression: u32_le(data, 30),
        };

        if header.planes != 1 {
            return Err(anyhow!(
                "Only single plane bitmaps are supported, got {} planes",
                header.planes
            ));
        }
        if header.compression != 0 {
            return Err(anyhow!(
                "Only uncompressed bitmaps are supported, got compression {}",
                header.compression
            ));
        }
        if header.bits_per_pixel != 24 {
            return Err(anyhow!(
                "Only 24 bits per pixel is supported, got {}",
                header.bits_per_pixel
            ));
        }

        Ok(header)
    }

    /// Row stride in bytes. Bitmap rows are padded to a 4 byte boundary.
    pub fn row_stride(&self) -> usize {
        (self.width as usize * 3 + 3) & !3
    }

    /// The pixel array, bounds-checked against the input buffer.
    ///
    /// Rows are stored left-to-right, bottom-to-top.
    pub fn pixel_data<'a>(&self, data: &'a [u8]) -> anyhow::Result<&'a [u8]> {
        let needed = self.row_stride() * self.height as usize;
        let start = self.pixel_offset as usize;

        match data.get(start..) {
            Some(pixels) if pixels.len() >= needed => Ok(&pixels[..needed]),
            _ => Err(anyhow!(
                "Bitmap pixel data truncated: need {needed} bytes at offset {start}, file has {}",
                data.len()
            )),
        }
    }
}

fn u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Build a minimal bottom-up 24-bit BMP from top-down RGB rows.
#[cfg(test)]
pub(crate) fn make_test_bmp(rows: &[Vec<(u8, u8, u8)>]) -> Vec<u8> {
    let height = rows.len() as u32;
    let width = rows.first().map(|r| r.len()).unwrap_or_default() as u32;
    let stride = (width as usize * 3 + 3) & !3;
    let file_size = MIN_HEADER_SIZE as u32 + stride as u32 * height;

    let mut data = Vec::with_capacity(file_size as usize);
    data.extend_from_slice(b"BM");
    data.extend_from_slice(&file_size.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes()); // reserved
    data.extend_from_slice(&(MIN_HEADER_SIZE as u32).to_le_bytes()); // pixel offset
    data.extend_from_slice(&40u32.to_le_bytes()); // info header size
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes()); // planes
    data.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    data.extend_from_slice(&0u32.to_le_bytes()); // compression
    data.resize(MIN_HEADER_SIZE, 0); // remaining info header fields are zero

    for row in rows.iter().rev() {
        let row_start = data.len();
        for &(r, g, b) in row {
            data.extend_from_slice(&[b, g, r]);
        }
        data.resize(row_start + stride, 0);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn solid_bmp(width: usize, height: usize) -> Vec<u8> {
        make_test_bmp(&vec![vec![(10, 20, 30); width]; height])
    }

    #[test]
    fn parse_reads_header_fields() {
        let data = solid_bmp(3, 2);

        let header = BmpHeader::parse(&data).unwrap();
        assert_eq!(54, header.pixel_offset);
        assert_eq!(40, header.info_size);
        assert_eq!(3, header.width);
        assert_eq!(2, header.height);
        assert_eq!(1, header.planes);
        assert_eq!(24, header.bits_per_pixel);
        assert_eq!(0, header.compression);
    }

    #[test]
    fn parse_rejects_truncated_header() {
        let data = solid_bmp(2, 2);
        let err = BmpHeader::parse(&data[..53]).unwrap_err();
        assert!(err.to_string().contains("truncated"), "{err}");
    }

    #[test]
    fn parse_rejects_missing_magic() {
        let mut data = solid_bmp(2, 2);
        data[0] = b'P';
        let err = BmpHeader::parse(&data).unwrap_err();
        assert!(err.to_string().contains("magic"), "{err}");
    }

    #[rstest]
    #[case(26, 2, "plane")] // planes = 2
    #[case(28, 32, "bits per pixel")] // 32 bpp
    #[case(30, 1, "compression")] // BI_RLE8
    fn parse_rejects_unsupported_format(
        #[case] offset: usize,
        #[case] value: u8,
        #[case] diagnostic: &str,
    ) {
        let mut data = solid_bmp(2, 2);
        data[offset] = value;
        let err = BmpHeader::parse(&data).unwrap_err();
        assert!(err.to_string().contains(diagnostic), "{err}");
    }

    #[rstest]
    #[case(1, 4)]
    #[case(2, 8)]
    #[case(3, 12)]
    #[case(4, 12)]
    #[case(640, 1920)]
    fn row_stride_pads_to_four_bytes(#[case] width: u32, #[case] stride: usize) {
        let header = BmpHeader::parse(&solid_bmp(width as usize, 1)).unwrap();
        assert_eq!(stride, header.row_stride());
    }

    #[test]
    fn pixel_data_returns_padded_rows() {
        let data = make_test_bmp(&[vec![(1, 2, 3)], vec![(4, 5, 6)]]);

        let header = BmpHeader::parse(&data).unwrap();
        let pixels = header.pixel_data(&data).unwrap();
        assert_eq!(8, pixels.len());
        // bottom row first, BGR byte order
        assert_eq!(&[6, 5, 4, 0], &pixels[0..4]);
        assert_eq!(&[3, 2, 1, 0], &pixels[4..8]);
    }

    #[test]
    fn pixel_data_rejects_truncated_file() {
        let data = solid_bmp(2, 2);
        let header = BmpHeader::parse(&data).unwrap();
        let err = header.pixel_data(&data[..data.len() - 1]).unwrap_err();
        assert!(err.to_string().contains("truncated"), "{err}");
    }
}
