//! CSS custom-property output.
//!
//! Produces a single stylesheet:
//!
//! ```text
//! /** header */
//! :root { --token: value; ... }
//! <mode selector> { --token: mode value; ... }        (per configured selector)
//! @supports (color: color(display-p3 1 1 1)) { ... }  (when colors are present)
//! ```

pub mod embed;
pub mod selector;
pub mod transform;

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::color::rewrite_hex_to_p3;
use crate::diagnostics::{Diagnostic, W001};
use crate::errors::Result;
use crate::ident::{custom_property, sanitize_prefix};
use crate::models::{Token, TokenKind};
use crate::plugin::{indent, BuildContext, OutputFile, Plugin, PluginOutput};

pub use selector::{parse_mode_selector, ModeSelector};
pub use transform::{default_transformer, CssTransform, CssValue};

/// Default output filename.
pub const DEFAULT_FILENAME: &str = "tokens.css";

/// Feature query guarding the display-P3 block.
const P3_SUPPORTS: &str = "@supports (color: color(display-p3 1 1 1)) {";

/// Token id → CSS value, in insertion order.
type Declarations = IndexMap<String, String>;

/// CSS plugin options.
#[derive(Clone)]
pub struct CssOptions {
    /// Output filename, relative to the output directory.
    pub filename: String,
    /// Inline `link` tokens as base64 data URIs.
    pub embed_files: bool,
    /// `group#mode` → selectors, in configuration order.
    pub mode_selectors: IndexMap<String, Vec<String>>,
    /// Custom-property name prefix (dashes are trimmed).
    pub prefix: Option<String>,
    /// Override consulted before the default transformer.
    pub transform: Option<CssTransform>,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            embed_files: false,
            mode_selectors: IndexMap::new(),
            prefix: None,
            transform: None,
        }
    }
}

impl fmt::Debug for CssOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssOptions")
            .field("filename", &self.filename)
            .field("embed_files", &self.embed_files)
            .field("mode_selectors", &self.mode_selectors)
            .field("prefix", &self.prefix)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Emits CSS custom properties.
#[derive(Debug, Clone, Default)]
pub struct CssPlugin {
    options: CssOptions,
}

impl CssPlugin {
    #[must_use]
    pub fn new(options: CssOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &CssOptions {
        &self.options
    }

    /// Transform one token (override first, then the default), embedding
    /// linked files when requested.
    fn transform(&self, ctx: &BuildContext<'_>, token: &Token, mode: Option<&str>) -> Result<CssValue> {
        let custom = self.options.transform.as_ref().and_then(|f| f(token, mode));
        let value = match custom {
            Some(value) => value,
            None => default_transformer(token, mode)?,
        };
        match value {
            CssValue::Single(url) if self.options.embed_files && token.kind() == TokenKind::Link => {
                Ok(CssValue::Single(embed::encode(&url, ctx.out_dir)?))
            }
            other => Ok(other),
        }
    }

    /// Render `name: value;` lines, optionally wrapped in `:root { }`.
    fn make_vars(&self, vars: &Declarations, level: usize, wrap_root: bool) -> Vec<String> {
        let prefix = self
            .options
            .prefix
            .as_deref()
            .map(sanitize_prefix)
            .unwrap_or_default();
        let mut out = Vec::with_capacity(vars.len() + 2);
        if wrap_root {
            out.push(indent(":root {", level));
        }
        let inner = level + usize::from(wrap_root);
        for (id, value) in vars {
            let name = custom_property(&prefix, id);
            out.push(indent(&format!("{name}: {value};"), inner));
        }
        if wrap_root {
            out.push(indent("}", level));
        }
        out
    }

    /// Render one mode block at `level`.
    fn make_mode_block(&self, selector: &str, vars: &Declarations, level: usize) -> Vec<String> {
        let wrapper = selector::selector_wrapper(selector);
        let mut out = vec![indent(&format!("{wrapper} {{"), level)];
        out.extend(self.make_vars(vars, level + 1, selector::is_at_rule(&wrapper)));
        out.push(indent("}", level));
        out
    }
}

/// Store a transformed value under the token id (typography fans out to `<id>-<field>`).
fn insert_value(vars: &mut Declarations, token: &Token, value: CssValue) {
    match value {
        CssValue::Single(v) => {
            vars.insert(token.id.clone(), v);
        }
        CssValue::Group(entries) => {
            for (field, v) in entries {
                vars.insert(format!("{}-{field}", token.id), v);
            }
        }
    }
}

/// Rewrite hex colors in declarations to display-P3.
///
/// Lines opening or closing a block are left alone: selectors such as
/// `#face` look like hex colors.
fn make_p3(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| {
            if line.contains('{') || line.contains('}') {
                line
            } else {
                rewrite_hex_to_p3(&line)
            }
        })
        .collect()
}

impl Plugin for CssPlugin {
    fn name(&self) -> &'static str {
        "css"
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<PluginOutput> {
        let rules = self
            .options
            .mode_selectors
            .iter()
            .map(|(key, selectors)| ModeSelector::parse(key, selectors.clone()))
            .collect::<Result<Vec<_>>>()?;

        let mut root_vars = Declarations::new();
        let mut mode_vars: IndexMap<String, Declarations> = IndexMap::new();

        for token in ctx.tokens {
            let value = self.transform(ctx, token, None)?;
            insert_value(&mut root_vars, token, value);

            if token.modes.is_empty() {
                continue;
            }
            for rule in rules.iter().filter(|r| r.applies_to(token)) {
                let value = self.transform(ctx, token, Some(&rule.mode))?;
                for selector in &rule.selectors {
                    let vars = mode_vars.entry(selector.clone()).or_default();
                    insert_value(vars, token, value.clone());
                }
            }
        }

        let mut output = PluginOutput::default();
        let mut warned = HashSet::new();
        for selector in rules.iter().flat_map(|r| r.selectors.iter()) {
            let empty = mode_vars.get(selector).map_or(true, IndexMap::is_empty);
            if empty && warned.insert(selector.as_str()) {
                tracing::warn!(plugin = "css", selector = %selector, "can't find any tokens for selector");
                output.diagnostics.push(Diagnostic::warning(
                    "css",
                    W001,
                    format!("can't find any tokens for \"{selector}\""),
                ));
            }
        }
        mode_vars.retain(|_, vars| !vars.is_empty());

        let name = ctx.metadata.name.as_deref().unwrap_or("Design Tokens");
        let mut code: Vec<String> = vec![
            "/**".into(),
            format!(" * {name}"),
            " * Autogenerated from tokens.json.".into(),
            " * DO NOT EDIT!".into(),
            " */".into(),
            String::new(),
        ];
        code.extend(self.make_vars(&root_vars, 0, true));

        for (selector, vars) in &mode_vars {
            code.push(String::new());
            code.extend(self.make_mode_block(selector, vars, 0));
        }

        if ctx.tokens.iter().any(|t| t.kind().carries_color()) {
            code.push(String::new());
            code.push(P3_SUPPORTS.to_string());
            code.extend(make_p3(self.make_vars(&root_vars, 1, true)));
            for (selector, vars) in &mode_vars {
                code.push(String::new());
                code.extend(make_p3(self.make_mode_block(selector, vars, 1)));
            }
            code.push("}".into());
        }
        code.push(String::new());

        tracing::debug!(
            plugin = "css",
            properties = root_vars.len(),
            selectors = mode_vars.len(),
            "generated {}",
            self.options.filename
        );

        output.files.push(OutputFile {
            filename: self.options.filename.clone(),
            contents: code.join("\n"),
        });
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TokencastError;
    use crate::models::{Metadata, TokenValue};
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    fn tok(id: &str, kind: TokenKind, value: serde_json::Value) -> Token {
        Token::new(id, TokenValue::from_json(kind, value).unwrap())
    }

    fn run(plugin: &CssPlugin, tokens: &[Token]) -> Result<PluginOutput> {
        let metadata = Metadata {
            name: Some("Acme".into()),
        };
        let ctx = BuildContext {
            tokens,
            metadata: &metadata,
            out_dir: Path::new("."),
        };
        plugin.build(&ctx)
    }

    fn css(plugin: &CssPlugin, tokens: &[Token]) -> String {
        let out = run(plugin, tokens).unwrap();
        out.files[0].contents.clone()
    }

    fn selectors(pairs: &[(&str, &[&str])]) -> IndexMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    fn root_block(css: &str) -> Vec<&str> {
        css.lines()
            .skip_while(|l| *l != ":root {")
            .skip(1)
            .take_while(|l| *l != "}")
            .collect()
    }

    #[test]
    fn header_and_root_without_colors() {
        let tokens = [tok("space.sm", TokenKind::Dimension, json!("4px"))];
        let out = css(&CssPlugin::default(), &tokens);
        assert_eq!(
            out,
            "/**\n * Acme\n * Autogenerated from tokens.json.\n * DO NOT EDIT!\n */\n\n\
             :root {\n  --space-sm: 4px;\n}\n"
        );
    }

    #[test]
    fn default_name_in_header() {
        let tokens = [tok("space.sm", TokenKind::Dimension, json!("4px"))];
        let metadata = Metadata::default();
        let ctx = BuildContext {
            tokens: &tokens,
            metadata: &metadata,
            out_dir: Path::new("."),
        };
        let out = CssPlugin::default().build(&ctx).unwrap();
        assert!(out.files[0].contents.contains(" * Design Tokens\n"));
        assert_eq!(out.files[0].filename, "tokens.css");
    }

    #[test]
    fn prefix_is_sanitized() {
        let plugin = CssPlugin::new(CssOptions {
            prefix: Some("--ds-".into()),
            ..CssOptions::default()
        });
        let tokens = [tok("space.sm_2", TokenKind::Dimension, json!("4px"))];
        assert!(css(&plugin, &tokens).contains("  --ds-space-sm-2: 4px;\n"));
    }

    #[test]
    fn root_has_one_property_per_token_plus_typography_fields() {
        let tokens = [
            tok("space.sm", TokenKind::Dimension, json!("4px")),
            tok("ease.out", TokenKind::CubicBezier, json!([0.1, 0.2, 0.3, 0.4])),
            tok(
                "type.body",
                TokenKind::Typography,
                json!({"fontFamily": ["Inter"], "fontSize": "16px", "fontWeight": 400}),
            ),
        ];
        let out = css(&CssPlugin::default(), &tokens);
        let root = root_block(&out);
        assert_eq!(root.len(), 2 + 3);
        assert!(root.contains(&"  --ease-out: cubic-bezier(0.1, 0.2, 0.3, 0.4);"));
        assert!(root.contains(&"  --type-body-font-family: Inter;"));
        assert!(root.contains(&"  --type-body-font-size: 16px;"));
        assert!(root.contains(&"  --type-body-font-weight: 400;"));
    }

    #[test]
    fn mode_selectors_emit_blocks() {
        let tokens = [
            tok("color.bg", TokenKind::Color, json!("#ffffff")).with_mode("dark", json!("#000000")),
            tok("space.sm", TokenKind::Dimension, json!("4px")),
        ];
        let plugin = CssPlugin::new(CssOptions {
            mode_selectors: selectors(&[
                ("color#dark", &["[data-theme=dark]", "@media (prefers-color-scheme: dark)"]),
            ]),
            ..CssOptions::default()
        });
        let out = css(&plugin, &tokens);
        assert!(out.contains("\n[data-theme=dark] {\n  --color-bg: #000000;\n}\n"));
        assert!(out.contains(
            "\n@media (prefers-color-scheme: dark) {\n  :root {\n    --color-bg: #000000;\n  }\n}\n"
        ));
    }

    #[test]
    fn selectors_keep_first_seen_order_and_merge_rules() {
        let tokens = [
            tok("color.bg", TokenKind::Color, json!("#fff")).with_mode("dark", json!("#000")),
            tok("size.gap", TokenKind::Dimension, json!("8px")).with_mode("compact", json!("4px")),
        ];
        let plugin = CssPlugin::new(CssOptions {
            mode_selectors: selectors(&[
                ("size#compact", &[".b"]),
                ("color#dark", &[".a", ".b"]),
            ]),
            ..CssOptions::default()
        });
        let out = css(&plugin, &tokens);
        let a = out.find("\n.a {").unwrap();
        let b = out.find("\n.b {").unwrap();
        assert!(a < b, "selector .a was seen first");
        assert!(out.contains("\n.b {\n  --color-bg: #000;\n  --size-gap: 4px;\n}\n"));
    }

    #[test]
    fn empty_selector_warns_and_is_skipped() {
        let tokens = [tok("color.bg", TokenKind::Color, json!("#fff"))];
        let plugin = CssPlugin::new(CssOptions {
            mode_selectors: selectors(&[("color#dark", &[".dark"])]),
            ..CssOptions::default()
        });
        let output = run(&plugin, &tokens).unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code, W001);
        assert!(output.diagnostics[0].message.contains(".dark"));
        assert!(!output.files[0].contents.contains(".dark"));
    }

    #[test]
    fn malformed_mode_selector_key_fails() {
        let plugin = CssPlugin::new(CssOptions {
            mode_selectors: selectors(&[("dark", &[".dark"])]),
            ..CssOptions::default()
        });
        let err = run(&plugin, &[]).unwrap_err();
        assert!(matches!(err, TokencastError::ModeSelector { .. }));
    }

    #[test]
    fn p3_block_rewrites_hex() {
        let tokens = [
            tok("color.red", TokenKind::Color, json!("#ff0000")),
            tok("space.sm", TokenKind::Dimension, json!("4px")),
        ];
        let out = css(&CssPlugin::default(), &tokens);
        let (plain, p3) = out.split_once(P3_SUPPORTS).unwrap();
        assert!(plain.contains("  --color-red: #ff0000;"));
        assert!(!p3.contains("#ff0000"));
        assert!(p3.contains("    --color-red: color(display-p3 "));
        assert!(p3.contains("    --space-sm: 4px;"));
        assert!(p3.starts_with("\n  :root {\n"));
        assert!(out.ends_with("  }\n}\n"));
    }

    #[test]
    fn p3_block_includes_mode_blocks() {
        let tokens = [tok("color.bg", TokenKind::Color, json!("#fff")).with_mode("dark", json!("#000"))];
        let plugin = CssPlugin::new(CssOptions {
            mode_selectors: selectors(&[("#dark", &[".dark"])]),
            ..CssOptions::default()
        });
        let out = css(&plugin, &tokens);
        let p3 = out.split_once(P3_SUPPORTS).unwrap().1;
        assert!(p3.contains("\n  .dark {\n    --color-bg: color(display-p3 0 0 0);\n  }\n"));
    }

    #[test]
    fn p3_block_keeps_hex_like_selectors() {
        let tokens = [tok("color.bg", TokenKind::Color, json!("#fff")).with_mode("dark", json!("#000"))];
        let plugin = CssPlugin::new(CssOptions {
            mode_selectors: selectors(&[("#dark", &["#face", "@media (min-width: 0) and #bad"])]),
            ..CssOptions::default()
        });
        let out = css(&plugin, &tokens);
        let p3 = out.split_once(P3_SUPPORTS).unwrap().1;
        assert!(p3.contains("\n  #face {\n    --color-bg: color(display-p3 0 0 0);\n  }\n"));
        assert!(p3.contains("\n  @media (min-width: 0) and #bad {\n    :root {\n"));
        assert_eq!(p3.matches("color(display-p3").count(), 3);
    }

    #[test]
    fn no_p3_block_without_color_tokens() {
        let tokens = [tok("space.sm", TokenKind::Dimension, json!("4px"))];
        assert!(!css(&CssPlugin::default(), &tokens).contains("@supports"));
    }

    #[test]
    fn custom_transform_takes_precedence() {
        let transform: CssTransform = Arc::new(|token: &Token, mode: Option<&str>| {
            (token.id == "space.sm").then(|| CssValue::from(format!("calc(4px * {})", mode.unwrap_or("1"))))
        });
        let plugin = CssPlugin::new(CssOptions {
            transform: Some(transform),
            ..CssOptions::default()
        });
        let tokens = [
            tok("space.sm", TokenKind::Dimension, json!("4px")),
            tok("space.md", TokenKind::Dimension, json!("8px")),
        ];
        let out = css(&plugin, &tokens);
        assert!(out.contains("  --space-sm: calc(4px * 1);"));
        assert!(out.contains("  --space-md: 8px;"));
    }

    #[test]
    fn unsupported_type_fails_build() {
        let tokens = [tok("flag.beta", TokenKind::Boolean, json!(true))];
        let err = run(&CssPlugin::default(), &tokens).unwrap_err();
        assert!(matches!(err, TokencastError::UnsupportedType { .. }));
    }

    #[test]
    fn output_is_deterministic() {
        let tokens = [
            tok("color.bg", TokenKind::Color, json!("#fff")).with_mode("dark", json!("#000")),
            tok("shadow.sm", TokenKind::Shadow, json!({"color": "#0003", "offsetX": "0", "offsetY": "1px", "blur": "2px", "spread": "0"})),
        ];
        let plugin = CssPlugin::new(CssOptions {
            mode_selectors: selectors(&[("#dark", &[".dark"])]),
            ..CssOptions::default()
        });
        assert_eq!(css(&plugin, &tokens), css(&plugin, &tokens));
    }

    #[test]
    fn embed_files_inlines_links() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dot.svg"), "<svg/>").unwrap();
        let tokens = [tok("icon.dot", TokenKind::Link, json!("dot.svg"))];
        let metadata = Metadata::default();
        let ctx = BuildContext {
            tokens: &tokens,
            metadata: &metadata,
            out_dir: dir.path(),
        };
        let plugin = CssPlugin::new(CssOptions {
            embed_files: true,
            ..CssOptions::default()
        });
        let out = plugin.build(&ctx).unwrap();
        assert!(out.files[0]
            .contents
            .contains("  --icon-dot: url('data:image/svg+xml;base64,PHN2Zy8+');"));
    }
}
