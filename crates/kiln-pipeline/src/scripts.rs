//! ScriptBuilder: script sources to one concatenated, minified bundle.
//!
//! ```text
//! *.js -> parse check -> concat -> oxc minify -> codegen -> script.min.js (+ .map)
//! ```
//!
//! Every source file is parsed on its own first; files that fail to parse
//! are recorded on the report and dropped from the bundle, so one broken
//! script never takes the build down. Already-minified files (`*.min.js`)
//! are excluded as inputs.

use crate::error::Result;
use crate::report::TaskReport;
use crate::sources;
use kiln_config::KilnConfig;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Concatenate and minify the script source tree.
///
/// # Errors
///
/// Returns an error for a missing source root or unwritable output
/// directory. Parse and minify failures are recorded on the report.
pub fn build(config: &KilnConfig, root: &Path) -> Result<TaskReport> {
    let started = Instant::now();
    let mut report = TaskReport::new("scripts");

    let src_root = sources::resolve(&config.scripts.src, root);
    let out_dir = sources::resolve(&config.scripts.out, root);

    let files: Vec<_> = sources::collect_with_extensions(&src_root, &["js", "mjs"])?
        .into_iter()
        .filter(|path| !is_minified(path))
        .collect();

    // Per-file parse validation inside the error channel. Surviving sources
    // are concatenated in enumeration order.
    let mut concatenated = String::new();
    for file in &files {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                report.record_failure(file, "read", e);
                continue;
            }
        };

        if let Some(message) = parse_error(&source, source_type_for(file)) {
            report.record_failure(file, "parse", message);
            continue;
        }

        concatenated.push_str(&source);
        if !source.ends_with('\n') {
            concatenated.push('\n');
        }
    }

    if concatenated.is_empty() {
        tracing::info!(src = %src_root.display(), "no scripts to bundle; nothing to write");
        report.duration = started.elapsed();
        return Ok(report);
    }

    match minify_bundle(&concatenated, &config.scripts.bundle) {
        Ok(output) => {
            sources::ensure_dir(&out_dir)?;

            let mut code = output.code;
            if let Some(map_json) = output.map_json {
                let map_name = format!("{}.map", config.scripts.bundle);
                let map_path = out_dir.join(&map_name);
                std::fs::write(&map_path, map_json)?;
                code.push_str(&format!("\n//# sourceMappingURL={}\n", map_name));
                report.wrote(map_path);
            }

            let bundle_path = out_dir.join(&config.scripts.bundle);
            std::fs::write(&bundle_path, code)?;
            report.wrote(bundle_path);
        }
        Err(message) => {
            // Individually valid files can still clash once concatenated
            // (e.g. duplicate lexical declarations).
            report.record_failure(&src_root.join(&config.scripts.bundle), "minify", message);
        }
    }

    report.duration = started.elapsed();
    Ok(report)
}

struct MinifiedBundle {
    code: String,
    map_json: Option<String>,
}

/// Minify the concatenated bundle and render it with a source map.
fn minify_bundle(
    concatenated: &str,
    bundle_name: &str,
) -> std::result::Result<MinifiedBundle, String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, concatenated, SourceType::cjs()).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        return Err(first_error(&parsed.errors));
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

    let output = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            source_map_path: Some(PathBuf::from(bundle_name)),
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program);

    Ok(MinifiedBundle {
        code: output.code,
        map_json: output.map.map(|map| map.to_json_string()),
    })
}

/// Parse a single source, returning the first error message if any.
fn parse_error(source: &str, source_type: SourceType) -> Option<String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        Some(first_error(&parsed.errors))
    } else {
        None
    }
}

fn first_error<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "parse error".to_string())
}

fn source_type_for(path: &Path) -> SourceType {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mjs") => SourceType::mjs(),
        _ => SourceType::cjs(),
    }
}

fn is_minified(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(".min.js"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(js: &[(&str, &str)]) -> (tempfile::TempDir, KilnConfig) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("app/js/src");
        std::fs::create_dir_all(&src).unwrap();
        for (name, body) in js {
            std::fs::write(src.join(name), body).unwrap();
        }
        (dir, KilnConfig::default())
    }

    #[test]
    fn test_bundle_is_minified_with_map() {
        let (dir, config) = project(&[(
            "main.js",
            "function greet(name) {\n  return 'hello ' + name;\n}\nconsole.log(greet('kiln'));\n",
        )]);
        let report = build(&config, dir.path()).unwrap();
        assert!(report.is_clean());

        let bundle = dir.path().join("app/js/dest/script.min.js");
        let code = std::fs::read_to_string(&bundle).unwrap();
        // Whitespace-stripped output, with the map reference appended
        assert!(!code.contains("\n  "));
        assert!(code.contains("sourceMappingURL=script.min.js.map"));
        assert!(dir.path().join("app/js/dest/script.min.js.map").exists());
    }

    #[test]
    fn test_broken_file_is_dropped_not_fatal() {
        let (dir, config) = project(&[
            ("broken.js", "function ( {\n"),
            ("ok.js", "var answer = 40 + 2;\nconsole.log(answer);\n"),
        ]);
        let report = build(&config, dir.path()).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, "parse");
        assert!(report.failures[0].file.ends_with("broken.js"));

        let code =
            std::fs::read_to_string(dir.path().join("app/js/dest/script.min.js")).unwrap();
        assert!(code.contains("console.log"));
    }

    #[test]
    fn test_minified_inputs_are_excluded() {
        let (dir, config) = project(&[
            ("vendor.min.js", "var v=1;"),
            ("app.js", "console.log('app');\n"),
        ]);
        let report = build(&config, dir.path()).unwrap();
        assert!(report.is_clean());

        let code =
            std::fs::read_to_string(dir.path().join("app/js/dest/script.min.js")).unwrap();
        assert!(!code.contains("var v=1"));
        assert!(code.contains("app"));
    }

    #[test]
    fn test_concat_order_is_deterministic() {
        let (dir, config) = project(&[
            ("b.js", "console.log('second');\n"),
            ("a.js", "console.log('first');\n"),
        ]);
        build(&config, dir.path()).unwrap();
        let first = std::fs::read(dir.path().join("app/js/dest/script.min.js")).unwrap();
        build(&config, dir.path()).unwrap();
        let second = std::fs::read(dir.path().join("app/js/dest/script.min.js")).unwrap();
        assert_eq!(first, second);

        let code = String::from_utf8(first).unwrap();
        assert!(code.find("first").unwrap() < code.find("second").unwrap());
    }

    #[test]
    fn test_is_minified() {
        assert!(is_minified(Path::new("app/js/vendor.min.js")));
        assert!(!is_minified(Path::new("app/js/vendor.js")));
    }
}
