//! Render configuration: every tunable constant of the diagram and overlay.
//!
//! Stored as plain `key=value` lines, `#` comments allowed, unknown keys
//! ignored. The file is only ever read.
//!
//!   Linux:    `~/.config/goldenfe/goldenfe.cfg` (XDG_CONFIG_HOME respected)
//!   Windows:  `%APPDATA%\GoldenFE\goldenfe.cfg`
//!   macOS:    `~/Library/Application Support/GoldenFE/goldenfe.cfg`

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::ops::geometry::StrokeStyle;
use crate::ops::overlay::{NestingRule, OverlayStyle};

pub const CONFIG_FILE_NAME: &str = "goldenfe.cfg";

/// Largest accepted edge, in pixels, for the display box and the diagram.
pub const MAX_DIMENSION: u32 = 4096;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config line {line}: invalid value {value:?} for `{key}`")]
    BadValue {
        line: usize,
        key: String,
        value: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub max_display_width: u32,
    pub max_display_height: u32,
    pub diagram_width: u32,
    pub diagram_height: u32,
    pub grid: StrokeStyle,
    pub spiral: StrokeStyle,
    pub diagram_rect: StrokeStyle,
    pub diagram_arc: StrokeStyle,
    pub nesting: NestingRule,
    /// Empty = detect from the system locale.
    pub language: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_display_width: 900,
            max_display_height: 700,
            diagram_width: 600,
            diagram_height: 400,
            grid: StrokeStyle::new([0x33, 0x33, 0x33, 255], 1.5),
            spiral: StrokeStyle::new([0xD4, 0xAF, 0x37, 255], 2.5),
            diagram_rect: StrokeStyle::new([0xE5, 0xE5, 0xE5, 255], 2.0),
            diagram_arc: StrokeStyle::new([0xD4, 0xAF, 0x37, 255], 3.0),
            nesting: NestingRule::default(),
            language: String::new(),
        }
    }
}

impl RenderConfig {
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            grid: self.grid,
            spiral: self.spiral,
            nesting: self.nesting,
        }
    }

    /// Default location of the config file for this platform.
    pub fn default_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let base = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
                .ok()?;
            return Some(base.join("goldenfe").join(CONFIG_FILE_NAME));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            return Some(PathBuf::from(appdata).join("GoldenFE").join(CONFIG_FILE_NAME));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("GoldenFE")
                    .join(CONFIG_FILE_NAME),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE_NAME)))
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// GUI startup: the platform file if it exists, defaults otherwise.
    /// A broken file is logged and ignored.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else { return Self::default() };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(cfg) => {
                crate::log_info!("Loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                crate::log_warn!("Ignoring config: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut c = Self::default();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            let bad = || ConfigError::BadValue {
                line: idx + 1,
                key: key.to_string(),
                value: val.to_string(),
            };
            match key {
                "max_width" => c.max_display_width = parse_dimension(val).ok_or_else(bad)?,
                "max_height" => c.max_display_height = parse_dimension(val).ok_or_else(bad)?,
                "diagram_width" => c.diagram_width = parse_dimension(val).ok_or_else(bad)?,
                "diagram_height" => c.diagram_height = parse_dimension(val).ok_or_else(bad)?,
                "grid_color" => c.grid.color = parse_hex_color(val).ok_or_else(bad)?,
                "grid_width" => c.grid.width = parse_width(val).ok_or_else(bad)?,
                "spiral_color" => c.spiral.color = parse_hex_color(val).ok_or_else(bad)?,
                "spiral_width" => c.spiral.width = parse_width(val).ok_or_else(bad)?,
                "diagram_rect_color" => {
                    c.diagram_rect.color = parse_hex_color(val).ok_or_else(bad)?
                }
                "diagram_rect_width" => c.diagram_rect.width = parse_width(val).ok_or_else(bad)?,
                "diagram_arc_color" => c.diagram_arc.color = parse_hex_color(val).ok_or_else(bad)?,
                "diagram_arc_width" => c.diagram_arc.width = parse_width(val).ok_or_else(bad)?,
                "descend_above" => c.nesting.descend_above = parse_threshold(val).ok_or_else(bad)?,
                "trailing_above" => {
                    c.nesting.trailing_above = parse_threshold(val).ok_or_else(bad)?
                }
                "max_depth" => c.nesting.max_depth = val.parse().map_err(|_| bad())?,
                "language" => c.language = val.to_string(),
                _ => {}
            }
        }
        Ok(c)
    }
}

fn parse_dimension(val: &str) -> Option<u32> {
    val.parse::<u32>()
        .ok()
        .filter(|v| (1..=MAX_DIMENSION).contains(v))
}

fn parse_width(val: &str) -> Option<f32> {
    val.parse::<f32>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_threshold(val: &str) -> Option<f64> {
    val.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// `#RRGGBB` or `#RRGGBBAA`, leading `#` optional.
pub fn parse_hex_color(val: &str) -> Option<[u8; 4]> {
    let hex = val.strip_prefix('#').unwrap_or(val);
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Some([byte(0)?, byte(2)?, byte(4)?, a])
}
