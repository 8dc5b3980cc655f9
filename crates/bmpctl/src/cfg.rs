// SPDX-License-Identifier: MIT OR Apache-2.0
// SPDX-FileCopyrightText: Copyright (c) 2025 Markus Zehnder

//! Slideshow json configuration file format.

use anyhow::{Context, anyhow};
use bmpctl_xfb::VideoMode;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn load_cfg<P: AsRef<Path>>(path: P) -> anyhow::Result<SlideshowConfig> {
    let path = path.as_ref();
    let file = fs::File::open(path).with_context(|| format!("Failed to load config {path:?}"))?;
    let reader = BufReader::new(file);
    let config: SlideshowConfig = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse config {path:?}"))?;

    Ok(config)
}

/// TV standard code as stored in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, Default)]
#[repr(u8)]
pub enum TvStandard {
    #[default]
    Ntsc = 0,
    Pal = 1,
    Mpal = 2,
}

impl From<TvStandard> for VideoMode {
    fn from(value: TvStandard) -> Self {
        match value {
            TvStandard::Ntsc => VideoMode::Ntsc,
            TvStandard::Pal => VideoMode::Pal,
            TvStandard::Mpal => VideoMode::Mpal,
        }
    }
}

impl FromStr for TvStandard {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ntsc" => Ok(TvStandard::Ntsc),
            "pal" => Ok(TvStandard::Pal),
            "mpal" => Ok(TvStandard::Mpal),
            _ => Err(anyhow!("Unknown TV standard: {s}. Expected ntsc, pal or mpal.")),
        }
    }
}

/// Slideshow configuration file.
#[derive(Debug, Serialize, Deserialize)]
pub struct SlideshowConfig {
    /// TV standard determining the framebuffer dimensions. Default: NTSC
    #[serde(default)]
    pub tv_mode: TvStandard,
    /// Image switch time in seconds. Default: 5
    #[serde(default = "default_switch_time")]
    pub switch_time: f32,
    /// Image files to display. Relative paths are resolved against the
    /// configuration directory.
    pub images: Vec<PathBuf>,
    /// Internal index of the currently displayed image.
    #[serde(skip)]
    current: Option<usize>,
}

fn default_switch_time() -> f32 {
    5.0
}

impl SlideshowConfig {
    /// Round-robin through the configured image list.
    pub fn next_image(&mut self) -> Option<&Path> {
        if self.images.is_empty() {
            return None;
        }

        let next = match self.current {
            Some(idx) => (idx + 1) % self.images.len(),
            None => 0,
        };
        self.current = Some(next);

        self.images.get(next).map(|p| p.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, TvStandard::Ntsc)]
    #[case(1, TvStandard::Pal)]
    #[case(2, TvStandard::Mpal)]
    fn parse_tv_mode_codes(#[case] code: u8, #[case] expected: TvStandard) {
        let json = format!(r#"{{"tv_mode": {code}, "images": []}}"#);
        let cfg: SlideshowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(expected, cfg.tv_mode);
    }

    #[test]
    fn parse_rejects_unknown_tv_mode_code() {
        let json = r#"{"tv_mode": 7, "images": []}"#;
        assert!(serde_json::from_str::<SlideshowConfig>(json).is_err());
    }

    #[test]
    fn parse_applies_defaults() {
        let json = r#"{"images": ["a.bmp"]}"#;
        let cfg: SlideshowConfig = serde_json::from_str(json).unwrap();
        assert_eq!(TvStandard::Ntsc, cfg.tv_mode);
        assert_eq!(5.0, cfg.switch_time);
        assert_eq!(vec![PathBuf::from("a.bmp")], cfg.images);
    }

    #[rstest]
    #[case("ntsc", TvStandard::Ntsc)]
    #[case("PAL", TvStandard::Pal)]
    #[case("MPal", TvStandard::Mpal)]
    fn tv_standard_from_str(#[case] input: &str, #[case] expected: TvStandard) {
        assert_eq!(expected, TvStandard::from_str(input).unwrap());
    }

    #[test]
    fn tv_standard_from_str_rejects_unknown() {
        assert!(TvStandard::from_str("secam").is_err());
    }

    #[test]
    fn next_image_cycles_through_list() {
        let json = r#"{"images": ["a.bmp", "b.png"]}"#;
        let mut cfg: SlideshowConfig = serde_json::from_str(json).unwrap();

        assert_eq!(Some(Path::new("a.bmp")), cfg.next_image());
        assert_eq!(Some(Path::new("b.png")), cfg.next_image());
        assert_eq!(Some(Path::new("a.bmp")), cfg.next_image());
    }

    #[test]
    fn next_image_returns_none_without_images() {
        let json = r#"{"images": []}"#;
        let mut cfg: SlideshowConfig = serde_json::from_str(json).unwrap();
        assert_eq!(None, cfg.next_image());
    }
}
