// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

//! Image loading for sources the direct bitmap decoder cannot handle.

use anyhow::Context;
use image::imageops::FilterType;
use image::{GenericImageView, ImageReader, RgbImage};
use log::{debug, warn};
use std::path::Path;

/// Width, height type
pub type Size = (u32, u32);

/// Load an image file and scale it to the exact framebuffer size if needed.
pub fn load_scaled<P>(path: P, size: Size) -> anyhow::Result<RgbImage>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open image {path:?}"))?
        .decode()
        .with_context(|| format!("Failed to decode image {path:?}"))?;
    debug!(
        "Image dimensions: {:?}, {:?}",
        img.dimensions(),
        img.color()
    );

    if img.dimensions() != size {
        warn!(
            "Scaling image dimensions {:?} to framebuffer size {size:?}, ignoring aspect ratio",
            img.dimensions()
        );
        Ok(img
            .resize_exact(size.0, size.1, FilterType::Lanczos3)
            .to_rgb8())
    } else {
        Ok(img.to_rgb8())
    }
}
