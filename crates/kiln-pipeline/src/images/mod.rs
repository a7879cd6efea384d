//! ImageOptimizer: copy changed images with per-format compression.
//!
//! ```text
//! img/src/**  -> changed filter -> format pass -> generic pass -> img/dest/**
//! ```
//!
//! The changed filter skips files whose destination counterpart is at least
//! as new, so repeat runs over an unchanged tree rewrite nothing. The format
//! pass re-encodes GIF interlaced, JPEG progressive, PNG through oxipng, and
//! minifies SVG text; a generic raster re-encode then runs as a catch-all
//! and its result is kept only when smaller (SVG is skipped to avoid double
//! transformation). A file that fails to decode is copied through verbatim
//! and recorded on the report.

mod svg;

use crate::error::Result;
use crate::report::TaskReport;
use crate::sources;
use kiln_config::{ImagesConfig, KilnConfig};
use std::path::Path;
use std::time::Instant;

/// Recognized image kinds, by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageKind {
    Gif,
    Jpeg,
    Png,
    Svg,
    Other,
}

impl ImageKind {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("gif") => Self::Gif,
            Some("jpg") | Some("jpeg") => Self::Jpeg,
            Some("png") => Self::Png,
            Some("svg") => Self::Svg,
            _ => Self::Other,
        }
    }
}

/// Optimize new or modified images from the source tree into the
/// destination tree, preserving relative paths.
///
/// # Errors
///
/// Returns an error for a missing source root or destination write
/// failures. Decode/encode failures are recorded per file and the original
/// bytes are copied through.
pub fn build(config: &KilnConfig, root: &Path) -> Result<TaskReport> {
    let started = Instant::now();
    let mut report = TaskReport::new("images");

    let src_root = sources::resolve(&config.images.src, root);
    let out_root = sources::resolve(&config.images.out, root);

    for file in sources::collect_files(&src_root)? {
        // strip_prefix cannot fail: collect_files only yields paths under src_root
        let rel = file.strip_prefix(&src_root).unwrap_or(&file);
        let dest = out_root.join(rel);

        if !sources::is_changed(&file, &dest) {
            report.unchanged += 1;
            continue;
        }

        if let Some(parent) = dest.parent() {
            sources::ensure_dir(parent)?;
        }

        let data = std::fs::read(&file)?;
        let output = match ImageKind::from_path(&file) {
            ImageKind::Svg => {
                let text = String::from_utf8_lossy(&data);
                svg::minify(&text, &config.images.svg).into_bytes()
            }
            kind => optimize_raster(&file, &data, kind, &config.images, &mut report),
        };

        std::fs::write(&dest, output)?;
        report.wrote(dest);
    }

    report.duration = started.elapsed();
    Ok(report)
}

/// Run the format-specific pass, then the generic catch-all, keeping the
/// smallest result. Failures fall back to the original bytes.
fn optimize_raster(
    file: &Path,
    data: &[u8],
    kind: ImageKind,
    options: &ImagesConfig,
    report: &mut TaskReport,
) -> Vec<u8> {
    let mut best: Vec<u8> = match format_pass(data, kind, options) {
        Ok(Some(optimized)) => optimized,
        Ok(None) => data.to_vec(),
        Err(message) => {
            report.record_failure(file, "optimize", message);
            return data.to_vec();
        }
    };

    // Catch-all second pass; only kept when it actually wins.
    if let Some(generic) = generic_pass(data, kind, options) {
        if generic.len() < best.len() {
            best = generic;
        }
    }

    best
}

fn format_pass(
    data: &[u8],
    kind: ImageKind,
    options: &ImagesConfig,
) -> std::result::Result<Option<Vec<u8>>, String> {
    match kind {
        ImageKind::Gif => interlace_gif(data).map(Some),
        ImageKind::Jpeg => progressive_jpeg(data, options.jpeg_quality).map(Some),
        ImageKind::Png => {
            oxipng::optimize_from_memory(data, &oxipng::Options::from_preset(options.png_level))
                .map(Some)
                .map_err(|e| e.to_string())
        }
        ImageKind::Svg | ImageKind::Other => Ok(None),
    }
}

/// Generic lossless-ish re-encode via the image crate. Best-effort: any
/// failure simply skips the pass.
fn generic_pass(data: &[u8], kind: ImageKind, options: &ImagesConfig) -> Option<Vec<u8>> {
    let format = match kind {
        ImageKind::Gif => image::ImageFormat::Gif,
        ImageKind::Jpeg => image::ImageFormat::Jpeg,
        ImageKind::Png => image::ImageFormat::Png,
        // Svg never reaches here; unknown formats are detected from content
        ImageKind::Svg => return None,
        ImageKind::Other => image::guess_format(data).ok()?,
    };

    let img = image::load_from_memory_with_format(data, format).ok()?;
    let output_format = match format {
        image::ImageFormat::Jpeg => image::ImageOutputFormat::Jpeg(options.jpeg_quality),
        image::ImageFormat::Png => image::ImageOutputFormat::Png,
        image::ImageFormat::Gif => image::ImageOutputFormat::Gif,
        image::ImageFormat::Bmp => image::ImageOutputFormat::Bmp,
        image::ImageFormat::Tiff => image::ImageOutputFormat::Tiff,
        _ => return None,
    };

    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), output_format)
        .ok()?;
    Some(buf)
}

/// Re-encode a GIF with interlaced frames.
fn interlace_gif(data: &[u8]) -> std::result::Result<Vec<u8>, String> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options
        .read_info(std::io::Cursor::new(data))
        .map_err(|e| e.to_string())?;

    let width = decoder.width();
    let height = decoder.height();
    let global_palette = decoder
        .global_palette()
        .map(|palette| palette.to_vec())
        .unwrap_or_default();

    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().map_err(|e| e.to_string())? {
        let mut frame = frame.clone();
        interlace_frame(&mut frame);
        frames.push(frame);
    }

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &global_palette)
            .map_err(|e| e.to_string())?;
        if frames.len() > 1 {
            encoder
                .set_repeat(gif::Repeat::Infinite)
                .map_err(|e| e.to_string())?;
        }
        for frame in &frames {
            encoder.write_frame(frame).map_err(|e| e.to_string())?;
        }
    }
    Ok(out)
}

/// Reorder a frame's rows into the GIF89a four-pass sequence and mark it
/// interlaced. The encoder writes buffers as-is, so the reordering happens
/// here.
fn interlace_frame(frame: &mut gif::Frame<'_>) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    if width == 0 || height == 0 || frame.buffer.len() < width * height {
        return;
    }

    let mut reordered = Vec::with_capacity(width * height);
    for row in interlaced_rows(height) {
        let start = row * width;
        reordered.extend_from_slice(&frame.buffer[start..start + width]);
    }
    frame.buffer = std::borrow::Cow::Owned(reordered);
    frame.interlaced = true;
}

/// GIF89a interlace row order: every 8th row from 0, from 4, every 4th from
/// 2, then the odd rows.
fn interlaced_rows(height: usize) -> impl Iterator<Item = usize> {
    (0..height)
        .step_by(8)
        .chain((4..height).step_by(8))
        .chain((2..height).step_by(4))
        .chain((1..height).step_by(2))
}

/// Re-encode a JPEG in progressive mode at the configured quality.
fn progressive_jpeg(data: &[u8], quality: u8) -> std::result::Result<Vec<u8>, String> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map_err(|e| e.to_string())?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    // mozjpeg reports errors by unwinding out of libjpeg
    std::panic::catch_unwind(move || -> std::result::Result<Vec<u8>, String> {
        let mut compress = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
        compress.set_size(width as usize, height as usize);
        compress.set_quality(quality as f32);
        compress.set_progressive_mode();

        let mut started = compress
            .start_compress(Vec::new())
            .map_err(|e| e.to_string())?;
        started
            .write_scanlines(rgb.as_raw())
            .map_err(|e| e.to_string())?;
        started.finish().map_err(|e| e.to_string())
    })
    .map_err(|_| "jpeg encoder aborted".to_string())?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixels = vec![128u8; (width * height * 3) as usize];
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, width, height, image::ColorType::Rgb8)
            .unwrap();
        out
    }

    fn project() -> (tempfile::TempDir, KilnConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app/img/src")).unwrap();
        (dir, KilnConfig::default())
    }

    #[test]
    fn test_png_roundtrip_is_valid() {
        let (dir, config) = project();
        let src = dir.path().join("app/img/src/dot.png");
        std::fs::write(&src, png_bytes(4, 4)).unwrap();

        let report = build(&config, dir.path()).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.written.len(), 1);

        let dest = dir.path().join("app/img/dest/dot.png");
        let optimized = std::fs::read(&dest).unwrap();
        // Output is still a decodable PNG
        image::load_from_memory_with_format(&optimized, image::ImageFormat::Png).unwrap();
    }

    #[test]
    fn test_unchanged_files_are_skipped() {
        let (dir, config) = project();
        let src = dir.path().join("app/img/src/dot.png");
        std::fs::write(&src, png_bytes(4, 4)).unwrap();

        build(&config, dir.path()).unwrap();
        let dest = dir.path().join("app/img/dest/dot.png");
        let first_mtime = std::fs::metadata(&dest).unwrap().modified().unwrap();

        let report = build(&config, dir.path()).unwrap();
        assert_eq!(report.unchanged, 1);
        assert!(report.written.is_empty());
        let second_mtime = std::fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(first_mtime, second_mtime);
    }

    #[test]
    fn test_relative_structure_is_preserved() {
        let (dir, config) = project();
        std::fs::create_dir_all(dir.path().join("app/img/src/icons")).unwrap();
        std::fs::write(dir.path().join("app/img/src/icons/a.png"), png_bytes(2, 2)).unwrap();

        build(&config, dir.path()).unwrap();
        assert!(dir.path().join("app/img/dest/icons/a.png").exists());
    }

    #[test]
    fn test_corrupt_image_is_copied_through() {
        let (dir, config) = project();
        let src = dir.path().join("app/img/src/broken.png");
        std::fs::write(&src, b"not a png at all").unwrap();

        let report = build(&config, dir.path()).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, "optimize");

        // Copied verbatim despite the failure
        let dest = std::fs::read(dir.path().join("app/img/dest/broken.png")).unwrap();
        assert_eq!(dest, b"not a png at all");
    }

    #[test]
    fn test_unknown_formats_are_copied() {
        let (dir, config) = project();
        std::fs::write(dir.path().join("app/img/src/notes.txt"), b"hello").unwrap();

        let report = build(&config, dir.path()).unwrap();
        assert!(report.is_clean());
        let dest = std::fs::read(dir.path().join("app/img/dest/notes.txt")).unwrap();
        assert_eq!(dest, b"hello");
    }

    #[test]
    fn test_interlaced_rows_cover_all_rows() {
        let mut rows: Vec<_> = interlaced_rows(11).collect();
        rows.sort_unstable();
        assert_eq!(rows, (0..11).collect::<Vec<_>>());

        // First pass starts at the top
        assert_eq!(interlaced_rows(11).next(), Some(0));
    }

    #[test]
    fn test_gif_interlace_roundtrip() {
        // 2x2 single-frame GIF via the image crate, then through the optimizer
        let (dir, config) = project();
        let src = dir.path().join("app/img/src/tiny.gif");
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            2,
            2,
            image::Rgba([255, 0, 0, 255]),
        ));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageOutputFormat::Gif,
        )
        .unwrap();
        std::fs::write(&src, bytes).unwrap();

        let report = build(&config, dir.path()).unwrap();
        assert!(report.is_clean());

        let out = std::fs::read(dir.path().join("app/img/dest/tiny.gif")).unwrap();
        // Still a decodable GIF after interlacing
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(std::io::Cursor::new(&out[..])).unwrap();
        assert!(decoder.read_next_frame().unwrap().is_some());
    }
}
