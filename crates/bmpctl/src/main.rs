// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

#![forbid(non_ascii_idents)]
#![deny(unsafe_code)]

use bmpctl::cfg::{self, SlideshowConfig, TvStandard};
use bmpctl::{img, preview};
use bmpctl_xfb::{XfbScreen, XfbScreenBuilder};

use anyhow::{Context, anyhow};
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Display Windows bitmaps on an off-screen YCbCr console framebuffer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Image to display. 24-bit uncompressed BMP files are decoded directly
    /// onto the framebuffer, anything else is decoded with the image crate
    /// and scaled to the framebuffer size.
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Slideshow json configuration file to parse.
    ///
    /// The configuration file will be loaded from the `config_dir` directory if no full path is
    /// specified.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration directory containing configuration files and the images
    /// specified in the `config` file. Default: `./cfg`
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// TV standard: ntsc, pal or mpal. Takes priority over the `config` file setting.
    #[arg(short, long)]
    mode: Option<String>,

    /// Decode directly onto the displayed framebuffer instead of flipping buffers.
    #[arg(long)]
    single_buffer: bool,

    /// Stop the slideshow after n seconds.
    #[arg(short, long)]
    off_after: Option<u32>,

    /// Save a .PNG preview of every displayed frame in the output folder.
    #[arg(short, long)]
    save: bool,

    /// Dump every displayed frame as raw Y1CbY2Cr data in the output folder.
    #[arg(short, long)]
    raw: bool,

    /// Output directory for saved frames. Default: `./out`
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let cfg_dir = args.config_dir.unwrap_or_else(|| "cfg".into());
    let config = match &args.config {
        Some(config) => Some(load_configuration(config, &cfg_dir)?),
        None => None,
    };

    // initialize the framebuffer with the given video mode parameter
    let mut builder = XfbScreenBuilder::new();
    builder.double_buffer(!args.single_buffer);
    if let Some(mode) = args.mode.as_deref() {
        builder.mode(TvStandard::from_str(mode)?.into());
    } else if let Some(cfg) = &config {
        builder.mode(cfg.tv_mode.into());
    }
    let mut screen = builder.build();

    let export = FrameExport::new(args.save, args.raw, args.out_dir.unwrap_or_else(|| "out".into()))?;

    if let Some(config) = config {
        info!("Starting slideshow mode");
        run_slideshow(&mut screen, config, &cfg_dir, &export, args.off_after)?;
        return Ok(());
    }

    if let Some(image) = args.image {
        info!("Loading and displaying image {image:?}...");
        let timestamp = Instant::now();
        show_file(&mut screen, &image)?;
        debug!("Image displayed in {}ms", timestamp.elapsed().as_millis());

        let name = image
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "frame".to_string());
        export.export(&screen, &name)?;
    }

    info!("Bye bye!");

    Ok(())
}

fn load_configuration(config: &Path, config_dir: &Path) -> anyhow::Result<SlideshowConfig> {
    if config.is_absolute() {
        cfg::load_cfg(config)
    } else {
        cfg::load_cfg(config_dir.join(config))
    }
}

/// Display a single image file.
///
/// Supported bitmaps are decoded directly onto the framebuffer, everything
/// else goes through the image crate and is scaled to the framebuffer size.
fn show_file(screen: &mut XfbScreen, path: &Path) -> anyhow::Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read image {path:?}"))?;

    if data.starts_with(b"BM") {
        match screen.show_bmp(&data) {
            Ok(()) => return Ok(()),
            Err(e) => warn!("Direct bitmap decode failed ({e}), retrying with the image crate"),
        }
    }

    let rgb_img = img::load_scaled(path, screen.mode().size())?;
    screen.show_image(&rgb_img)
}

fn run_slideshow(
    screen: &mut XfbScreen,
    mut cfg: SlideshowConfig,
    config_dir: &Path,
    export: &FrameExport,
    off_after: Option<u32>,
) -> anyhow::Result<()> {
    let switch_time = Duration::from_millis((cfg.switch_time * 1000f32) as u64);
    let started = Instant::now();
    let mut frame_count = 0u32;

    // image switching loop
    loop {
        let image = cfg
            .next_image()
            .ok_or(anyhow!("No images configured"))?
            .to_path_buf();
        let image = if image.is_absolute() {
            image
        } else {
            config_dir.join(image)
        };

        info!("Switching image: {image:?}");
        let upd_start_time = Instant::now();

        match show_file(screen, &image) {
            Ok(()) => {
                frame_count += 1;
                export.export(screen, &format!("slideshow-{frame_count:03}"))?;
            }
            Err(e) => error!("Error displaying {image:?}: {e:?}"),
        }

        if let Some(off) = off_after
            && started.elapsed() >= Duration::from_secs(off as u64)
        {
            info!("Stopping slideshow after {off}s");
            return Ok(());
        }

        let elapsed = upd_start_time.elapsed();
        if switch_time > elapsed {
            sleep(switch_time - elapsed);
        }
    }
}

/// Optional frame export for inspecting displayed frames.
struct FrameExport {
    save_png: bool,
    save_raw: bool,
    out_dir: PathBuf,
}

impl FrameExport {
    fn new(save_png: bool, save_raw: bool, out_dir: PathBuf) -> anyhow::Result<Self> {
        if save_png || save_raw {
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Error creating output path {out_dir:?}"))?;
        }

        Ok(Self {
            save_png,
            save_raw,
            out_dir,
        })
    }

    fn export(&self, screen: &XfbScreen, name: &str) -> anyhow::Result<()> {
        if self.save_png {
            preview::save_png(screen, self.out_dir.join(format!("{name}.png")))?;
        }
        if self.save_raw {
            preview::save_raw(screen, self.out_dir.join(format!("{name}.yuv")))?;
        }

        Ok(())
    }
}
