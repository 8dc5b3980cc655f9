// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

//! Framebuffer demo: display a 75% color-bar test pattern.

use bmpctl::cfg::TvStandard;
use bmpctl::preview;
use bmpctl_xfb::XfbScreenBuilder;

use clap::Parser;
use env_logger::Env;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use log::info;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Display a 75% color-bar test pattern on the framebuffer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// TV standard: ntsc, pal or mpal. Default: ntsc
    #[arg(short, long)]
    mode: Option<String>,

    /// Save a .PNG preview of the displayed frame. Default: `./out/colorbars.png`
    #[arg(short, long)]
    save: Option<Option<PathBuf>>,
}

// SMPTE bar order: white, yellow, cyan, green, magenta, red, blue
const BARS_75: [Rgb<u8>; 7] = [
    Rgb([191, 191, 191]),
    Rgb([191, 191, 0]),
    Rgb([0, 191, 191]),
    Rgb([0, 191, 0]),
    Rgb([191, 0, 191]),
    Rgb([191, 0, 0]),
    Rgb([0, 0, 191]),
];

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut builder = XfbScreenBuilder::new();
    if let Some(mode) = args.mode.as_deref() {
        builder.mode(TvStandard::from_str(mode)?.into());
    }
    let mut screen = builder.build();

    info!("Displaying color bars...");
    let bars = color_bars(screen.mode().size());
    screen.show_image(&bars)?;

    if let Some(path) = args.save {
        let path = path.unwrap_or_else(|| "out/colorbars.png".into());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        preview::save_png(&screen, &path)?;
        info!("Frame preview saved to {path:?}");
    }

    info!("Bye bye!");

    Ok(())
}

/// Render vertical 75% color bars covering the full frame.
fn color_bars(size: (u32, u32)) -> RgbImage {
    let mut img = RgbImage::new(size.0, size.1);
    let bar_width = size.0 as f32 / BARS_75.len() as f32;

    for (idx, color) in BARS_75.iter().enumerate() {
        let x = (idx as f32 * bar_width).round() as i32;
        let width = ((idx as f32 + 1.0) * bar_width).round() as u32 - x as u32;
        draw_filled_rect_mut(&mut img, Rect::at(x, 0).of_size(width, size.1), *color);
    }

    img
}
