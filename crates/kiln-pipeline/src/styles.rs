//! StyleBuilder: Sass sources to one vendor-prefixed, minified CSS bundle.
//!
//! ```text
//! *.scss -> grass (compressed) -> concat -> lightningcss minify/prefix -> style.min.css (+ .map)
//! ```
//!
//! Each source file compiles inside the error channel: a malformed file is
//! recorded on the report and the bundle is built from whatever compiled
//! successfully. Concatenation follows the path-sorted enumeration order.

use crate::error::{Error, Result};
use crate::report::TaskReport;
use crate::sources;
use kiln_config::KilnConfig;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::path::Path;
use std::time::Instant;

/// Compile, concatenate, prefix and minify the style source tree.
///
/// # Arguments
///
/// * `config` - Project configuration (paths, bundle name, browser targets)
/// * `root` - Project root that relative configured paths resolve against
///
/// # Errors
///
/// Returns an error for a missing source root, unwritable output directory,
/// or invalid browserslist queries. Per-file compile failures are recorded
/// on the report instead.
pub fn build(config: &KilnConfig, root: &Path) -> Result<TaskReport> {
    let started = Instant::now();
    let mut report = TaskReport::new("styles");

    let src_root = sources::resolve(&config.styles.src, root);
    let out_dir = sources::resolve(&config.styles.out, root);

    // Partials (underscore-prefixed) are reachable via @use/@import, never
    // compiled as entries.
    let entries: Vec<_> = sources::collect_with_extensions(&src_root, &["scss", "sass"])?
        .into_iter()
        .filter(|path| !is_partial(path))
        .collect();

    let grass_options = grass::Options::default().style(grass::OutputStyle::Compressed);
    let mut concatenated = String::new();
    for file in &entries {
        match grass::from_path(file, &grass_options) {
            Ok(css) => {
                concatenated.push_str(&css);
                if !css.ends_with('\n') {
                    concatenated.push('\n');
                }
            }
            Err(e) => report.record_failure(file, "compile", e),
        }
    }

    if concatenated.is_empty() {
        tracing::info!(src = %src_root.display(), "no stylesheets compiled; nothing to write");
        report.duration = started.elapsed();
        return Ok(report);
    }

    let targets = browser_targets(&config.styles.targets)?;
    match print_bundle(&concatenated, &config.styles.bundle, targets) {
        Ok((css, map_json)) => {
            sources::ensure_dir(&out_dir)?;

            let map_name = format!("{}.map", config.styles.bundle);
            let map_path = out_dir.join(&map_name);
            std::fs::write(&map_path, map_json)?;

            let bundle_path = out_dir.join(&config.styles.bundle);
            let mut css = css;
            css.push_str(&format!("\n/*# sourceMappingURL={} */\n", map_name));
            std::fs::write(&bundle_path, css)?;

            report.wrote(bundle_path);
            report.wrote(map_path);
        }
        Err(message) => {
            // The concatenated bundle itself failed to parse or print; the
            // bundle cannot be attributed to a single input file.
            report.record_failure(&src_root.join(&config.styles.bundle), "print", message);
        }
    }

    report.duration = started.elapsed();
    Ok(report)
}

/// Translate browserslist queries into lightningcss targets.
pub(crate) fn browser_targets(queries: &[String]) -> Result<Targets> {
    let browsers = Browsers::from_browserslist(queries.iter().map(String::as_str))
        .map_err(|e| Error::BrowserTargets(e.to_string()))?;
    Ok(browsers.map(Targets::from).unwrap_or_default())
}

/// Minify and vendor-prefix the concatenated CSS, producing the bundle text
/// and its source map JSON.
fn print_bundle(
    concatenated: &str,
    bundle_name: &str,
    targets: Targets,
) -> std::result::Result<(String, String), String> {
    let mut stylesheet = StyleSheet::parse(
        concatenated,
        ParserOptions {
            filename: bundle_name.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let mut source_map = parcel_sourcemap::SourceMap::new("/");
    let output = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            source_map: Some(&mut source_map),
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map_json = source_map.to_json(None).map_err(|e| e.to_string())?;
    Ok((output.code, map_json))
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('_'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn project(scss: &[(&str, &str)]) -> (tempfile::TempDir, KilnConfig) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app/scss");
        std::fs::create_dir_all(&src).unwrap();
        for (name, body) in scss {
            std::fs::write(src.join(name), body).unwrap();
        }
        (dir, KilnConfig::default())
    }

    #[test]
    fn test_compiles_and_minifies() {
        let (dir, config) = project(&[("main.scss", "$c: #ff0000;\nbody { color: $c; }\n")]);
        let report = build(&config, dir.path()).unwrap();

        assert!(report.is_clean());
        let bundle = dir.path().join("app/css/style.min.css");
        let css = std::fs::read_to_string(bundle).unwrap();
        assert!(css.contains("body"));
        assert!(css.contains("red") || css.contains("#ff0000") || css.contains("#f00"));
        // Compressed output has no indentation
        assert!(!css.contains("\n  "));
        assert!(css.contains("sourceMappingURL=style.min.css.map"));
        assert!(dir.path().join("app/css/style.min.css.map").exists());
    }

    #[test]
    fn test_deterministic_output() {
        let (dir, config) = project(&[
            ("a.scss", "a { color: blue; }\n"),
            ("b.scss", "b { color: green; }\n"),
        ]);
        build(&config, dir.path()).unwrap();
        let first = std::fs::read(dir.path().join("app/css/style.min.css")).unwrap();
        build(&config, dir.path()).unwrap();
        let second = std::fs::read(dir.path().join("app/css/style.min.css")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_concat_order_follows_enumeration() {
        let (dir, config) = project(&[
            ("b.scss", "b { color: green; }\n"),
            ("a.scss", "a { color: blue; }\n"),
        ]);
        build(&config, dir.path()).unwrap();
        let css = std::fs::read_to_string(dir.path().join("app/css/style.min.css")).unwrap();
        let a_pos = css.find("a{").or_else(|| css.find("a {")).unwrap();
        let b_pos = css.find("b{").or_else(|| css.find("b {")).unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn test_malformed_file_is_isolated() {
        let (dir, config) = project(&[
            ("bad.scss", "body { color: ; }\n"),
            ("good.scss", "p { margin: 0; }\n"),
        ]);
        let report = build(&config, dir.path()).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, "compile");
        assert!(report.failures[0].file.ends_with("bad.scss"));

        // The good rule still made it into the bundle
        let css = std::fs::read_to_string(dir.path().join("app/css/style.min.css")).unwrap();
        assert!(css.contains("margin"));
    }

    #[test]
    fn test_partials_are_not_entries() {
        let (dir, config) = project(&[
            ("_vars.scss", "$c: red;"),
            ("main.scss", "@use \"vars\";\nbody { color: vars.$c; }\n"),
        ]);
        let report = build(&config, dir.path()).unwrap();
        assert!(report.is_clean());
        let css = std::fs::read_to_string(dir.path().join("app/css/style.min.css")).unwrap();
        // The partial's variable resolved, and its contents appear only once
        assert_eq!(css.matches("body").count(), 1);
    }

    #[test]
    fn test_missing_source_root_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KilnConfig::default();
        config.styles.src = PathBuf::from("nope/scss");
        let err = build(&config, dir.path()).unwrap_err();
        assert!(matches!(err, Error::SourceRootNotFound(_)));
    }

    #[test]
    fn test_invalid_targets_error() {
        let err = browser_targets(&["definitely not a query".to_string()]).unwrap_err();
        assert!(matches!(err, Error::BrowserTargets(_)));
    }
}
