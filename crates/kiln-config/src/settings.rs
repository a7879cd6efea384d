//! Configuration types and defaults.
//!
//! Defaults mirror the conventional project layout: sources under `app/`,
//! compiled CSS in `app/css`, minified scripts in `app/js/dest`, optimized
//! images in `app/img/dest`, and the release tree in `dist/`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level kiln configuration.
///
/// All paths are relative to the project root unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    /// Base directory served by the dev server and used as the copy root
    /// for dist assembly
    pub base_dir: PathBuf,

    /// Distributable output directory
    pub dist_dir: PathBuf,

    /// Stylesheet pipeline settings
    pub styles: StylesConfig,

    /// Script pipeline settings
    pub scripts: ScriptsConfig,

    /// Image pipeline settings
    pub images: ImagesConfig,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("app"),
            dist_dir: PathBuf::from("dist"),
            styles: StylesConfig::default(),
            scripts: ScriptsConfig::default(),
            images: ImagesConfig::default(),
        }
    }
}

/// Stylesheet pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Sass source tree
    pub src: PathBuf,

    /// Compiled CSS output directory
    pub out: PathBuf,

    /// Name of the concatenated bundle
    pub bundle: String,

    /// Browserslist queries driving vendor prefixing
    ///
    /// Examples: `["last 10 versions"]`, `[">0.2%", "not dead"]`.
    pub targets: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("app/scss"),
            out: PathBuf::from("app/css"),
            bundle: "style.min.css".to_string(),
            targets: vec!["last 10 versions".to_string()],
        }
    }
}

/// Script pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Script source tree
    pub src: PathBuf,

    /// Minified bundle output directory
    pub out: PathBuf,

    /// Name of the concatenated, minified bundle
    pub bundle: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("app/js/src"),
            out: PathBuf::from("app/js/dest"),
            bundle: "script.min.js".to_string(),
        }
    }
}

/// Image pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Image source tree
    pub src: PathBuf,

    /// Optimized image output directory
    pub out: PathBuf,

    /// PNG optimization level (oxipng preset, 0-6)
    pub png_level: u8,

    /// JPEG re-encode quality (1-100)
    pub jpeg_quality: u8,

    /// SVG minification options
    pub svg: SvgConfig,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("app/img/src"),
            out: PathBuf::from("app/img/dest"),
            png_level: 5,
            jpeg_quality: 75,
            svg: SvgConfig::default(),
        }
    }
}

/// SVG minification options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Preserve `id` attributes (they may be referenced from CSS or scripts)
    pub keep_ids: bool,

    /// Strip the `viewBox` attribute from the root element
    pub remove_viewbox: bool,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            keep_ids: true,
            remove_viewbox: true,
        }
    }
}
