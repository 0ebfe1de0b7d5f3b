//! Mode selectors: `group#mode` keys mapped to output selectors.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{Result, TokencastError};
use crate::models::Token;

/// Opening brace (and the whitespace before it) users sometimes leave on a selector.
static SELECTOR_BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{").expect("selector bracket regex must compile"));

/// Split a `group#mode` key into its trimmed parts.
///
/// The group may be empty (`#dark` applies to every token with a `dark` mode).
///
/// # Errors
///
/// Returns [`TokencastError::ModeSelector`] if the key has no `#`, more than
/// one `#`, or nothing after the `#`.
pub fn parse_mode_selector(key: &str) -> Result<(String, String)> {
    let fail = |message: &str| TokencastError::ModeSelector {
        key: key.to_string(),
        message: message.to_string(),
    };
    let parts: Vec<&str> = key.split('#').map(str::trim).collect();
    match parts.as_slice() {
        [_] => Err(fail("must have \"#\" character")),
        [_, ""] => Err(fail("must name a mode after \"#\"")),
        [group, mode] => Ok((group.to_string(), mode.to_string())),
        _ => Err(fail("must have only 1 \"#\" character")),
    }
}

/// One `modeSelectors` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelector {
    /// Token id prefix; empty matches every token.
    pub group: String,
    pub mode: String,
    pub selectors: Vec<String>,
}

impl ModeSelector {
    /// Parse a rule from its config key and selector list.
    pub fn parse(key: &str, selectors: Vec<String>) -> Result<Self> {
        let (group, mode) = parse_mode_selector(key)?;
        Ok(Self {
            group,
            mode,
            selectors,
        })
    }

    /// Returns `true` if `token` is in the rule's group and carries its mode.
    #[must_use]
    pub fn applies_to(&self, token: &Token) -> bool {
        (self.group.is_empty() || token.id.starts_with(&self.group)) && token.has_mode(&self.mode)
    }
}

/// The selector text a block is opened with: trimmed, without a trailing `{`.
#[must_use]
pub fn selector_wrapper(selector: &str) -> String {
    SELECTOR_BRACKET_RE
        .replacen(selector.trim(), 1, "")
        .into_owned()
}

/// `@media`/`@container`-style selectors need an inner `:root` rule.
#[must_use]
pub fn is_at_rule(wrapper: &str) -> bool {
    wrapper.starts_with('@')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenValue;
    use serde_json::json;

    #[test]
    fn parses_group_and_mode() {
        assert_eq!(
            parse_mode_selector("color#dark").unwrap(),
            ("color".to_string(), "dark".to_string())
        );
    }

    #[test]
    fn trims_parts() {
        assert_eq!(
            parse_mode_selector(" color.ui # light ").unwrap(),
            ("color.ui".to_string(), "light".to_string())
        );
    }

    #[test]
    fn empty_group_is_allowed() {
        assert_eq!(
            parse_mode_selector("#dark").unwrap(),
            (String::new(), "dark".to_string())
        );
    }

    #[test]
    fn missing_hash_fails() {
        let err = parse_mode_selector("color").unwrap_err();
        assert!(err.to_string().contains("must have \"#\""));
    }

    #[test]
    fn two_hashes_fail() {
        let err = parse_mode_selector("color#dark#hc").unwrap_err();
        assert!(err.to_string().contains("only 1"));
    }

    #[test]
    fn empty_mode_fails() {
        assert!(parse_mode_selector("color#").is_err());
    }

    #[test]
    fn applies_by_prefix_and_mode() {
        let rule = ModeSelector::parse("color#dark", vec![".dark".into()]).unwrap();
        let dark = Token::new("color.bg", TokenValue::Color("#fff".into()))
            .with_mode("dark", json!("#000"));
        let other_group = Token::new("size.bg", TokenValue::Dimension("1px".into()))
            .with_mode("dark", json!("2px"));
        let no_mode = Token::new("color.fg", TokenValue::Color("#000".into()));
        assert!(rule.applies_to(&dark));
        assert!(!rule.applies_to(&other_group));
        assert!(!rule.applies_to(&no_mode));
    }

    #[test]
    fn wrapper_strips_bracket() {
        assert_eq!(selector_wrapper("  .dark {  "), ".dark");
        assert_eq!(
            selector_wrapper("@media (prefers-color-scheme: dark){"),
            "@media (prefers-color-scheme: dark)"
        );
        assert_eq!(selector_wrapper("[data-theme=dark]"), "[data-theme=dark]");
    }

    #[test]
    fn at_rule_detection() {
        assert!(is_at_rule("@media print"));
        assert!(!is_at_rule(".print"));
    }
}
