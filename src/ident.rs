//! Identifier helpers: custom-property names, kebab-casing, and font-name quoting.

use std::sync::LazyLock;

use regex::Regex;

/// Generic CSS font families, emitted without quotes.
const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
    "emoji",
    "math",
    "fangsong",
    "inherit",
    "initial",
    "unset",
];

/// A font name that is a single CSS identifier and can stay unquoted.
static CSS_IDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[A-Za-z_][A-Za-z0-9_-]*$").expect("CSS identifier regex must compile")
});

/// Normalize a user prefix: strip leading/trailing dashes and append a single `-`.
///
/// Returns an empty string when nothing is left after trimming.
#[must_use]
pub fn sanitize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('-');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}-")
    }
}

/// Turn a token id into a custom-property suffix (`color.blue_500` → `color-blue-500`).
#[must_use]
pub fn sanitize_id(id: &str) -> String {
    id.replace(['.', '_'], "-")
}

/// Full custom-property name. `prefix` must already be sanitized.
#[must_use]
pub fn custom_property(prefix: &str, id: &str) -> String {
    format!("--{prefix}{}", sanitize_id(id))
}

/// `fontFamily` → `font-family`.
#[must_use]
pub fn kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Format a font stack: `["Helvetica Neue", "sans-serif"]` → `"Helvetica Neue", sans-serif`.
#[must_use]
pub fn format_font_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if GENERIC_FAMILIES.contains(&name) || CSS_IDENT_RE.is_match(name) {
                name.to_string()
            } else {
                format!("\"{}\"", name.replace('"', "\\\""))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_trims_dashes() {
        assert_eq!(sanitize_prefix("--ds--"), "ds-");
        assert_eq!(sanitize_prefix("acme"), "acme-");
        assert_eq!(sanitize_prefix("my-brand"), "my-brand-");
    }

    #[test]
    fn empty_prefix_stays_empty() {
        assert_eq!(sanitize_prefix(""), "");
        assert_eq!(sanitize_prefix("---"), "");
    }

    #[test]
    fn id_dots_and_underscores_become_dashes() {
        assert_eq!(sanitize_id("color.blue_500"), "color-blue-500");
        assert_eq!(sanitize_id("space"), "space");
    }

    #[test]
    fn custom_property_with_prefix() {
        assert_eq!(custom_property("ds-", "color.bg"), "--ds-color-bg");
        assert_eq!(custom_property("", "color.bg"), "--color-bg");
    }

    #[test]
    fn kebab_case_camel() {
        assert_eq!(kebab_case("fontFamily"), "font-family");
        assert_eq!(kebab_case("letterSpacing"), "letter-spacing");
        assert_eq!(kebab_case("size"), "size");
    }

    #[test]
    fn font_names_quote_when_needed() {
        assert_eq!(
            format_font_names(&["Helvetica Neue", "Arial", "sans-serif"]),
            "\"Helvetica Neue\", Arial, sans-serif"
        );
    }

    #[test]
    fn font_names_single() {
        assert_eq!(format_font_names(&["Inter"]), "Inter");
    }

    #[test]
    fn font_names_leading_digit_is_quoted() {
        assert_eq!(format_font_names(&["3Dumb"]), "\"3Dumb\"");
    }
}
