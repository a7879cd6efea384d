//! SVG text minification.
//!
//! Strips comments and inter-tag whitespace, with configurable removal of
//! the root `viewBox` and of `id` attributes.

use kiln_config::SvgConfig;
use regex::Regex;
use std::sync::OnceLock;

fn comments() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
}

fn between_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r">\s+<").expect("valid regex"))
}

fn viewbox() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\s+viewBox\s*=\s*"[^"]*""#).expect("valid regex"))
}

fn id_attr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\s+id\s*=\s*"[^"]*""#).expect("valid regex"))
}

/// Minify an SVG document according to the configured options.
pub fn minify(source: &str, options: &SvgConfig) -> String {
    let out = comments().replace_all(source, "");
    let mut out = between_tags().replace_all(&out, "><").into_owned();

    if options.remove_viewbox {
        // Root element only; nested symbols keep theirs
        out = viewbox().replace(&out, "").into_owned();
    }
    if !options.keep_ids {
        out = id_attr().replace_all(&out, "").into_owned();
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<!-- generated -->
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
  <circle id="dot" cx="12" cy="12" r="10" />
</svg>
"#;

    #[test]
    fn test_strips_comments_and_whitespace() {
        let out = minify(SAMPLE, &SvgConfig::default());
        assert!(!out.contains("generated"));
        assert!(!out.contains(">\n"));
        assert!(out.starts_with("<svg"));
    }

    #[test]
    fn test_viewbox_removed_by_default() {
        let out = minify(SAMPLE, &SvgConfig::default());
        assert!(!out.contains("viewBox"));
    }

    #[test]
    fn test_viewbox_kept_when_disabled() {
        let options = SvgConfig {
            remove_viewbox: false,
            ..SvgConfig::default()
        };
        let out = minify(SAMPLE, &options);
        assert!(out.contains(r#"viewBox="0 0 24 24""#));
    }

    #[test]
    fn test_ids_preserved_by_default() {
        let out = minify(SAMPLE, &SvgConfig::default());
        assert!(out.contains(r#"id="dot""#));
    }

    #[test]
    fn test_ids_stripped_when_configured() {
        let options = SvgConfig {
            keep_ids: false,
            ..SvgConfig::default()
        };
        let out = minify(SAMPLE, &options);
        assert!(!out.contains("id="));
    }

    #[test]
    fn test_only_root_viewbox_is_removed() {
        let nested = r#"<svg viewBox="0 0 1 1"><symbol viewBox="0 0 2 2"/></svg>"#;
        let out = minify(nested, &SvgConfig::default());
        assert_eq!(out.matches("viewBox").count(), 1);
        assert!(out.contains(r#"<symbol viewBox="0 0 2 2""#));
    }
}
