//! Project configuration (`tokencast.yaml` / `tokencast.json`).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::errors::{Result, TokencastError};
use crate::fs_util::is_regular_file;
use crate::parser::DocumentFormat;
use crate::plugin::css::{self, CssOptions};
use crate::plugin::js::{JsOptions, OutputToggle, DEFAULT_TYPES_MODULE};

/// File names probed by [`find_config`], in order.
pub const CONFIG_FILENAMES: &[&str] = &["tokencast.yaml", "tokencast.yml", "tokencast.json"];

const DEFAULT_TOKENS: &str = "tokens.json";
const DEFAULT_OUT_DIR: &str = "tokens";

/// A selector list, written either as one string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SelectorList {
    One(String),
    Many(Vec<String>),
}

impl SelectorList {
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            SelectorList::One(s) => vec![s.clone()],
            SelectorList::Many(list) => list.clone(),
        }
    }
}

/// `plugins.css`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CssConfig {
    pub filename: Option<String>,
    #[serde(default)]
    pub embed_files: bool,
    #[serde(default)]
    pub mode_selectors: IndexMap<String, SelectorList>,
    pub prefix: Option<String>,
}

impl CssConfig {
    #[must_use]
    pub fn to_options(&self) -> CssOptions {
        CssOptions {
            filename: self
                .filename
                .clone()
                .unwrap_or_else(|| css::DEFAULT_FILENAME.to_string()),
            embed_files: self.embed_files,
            mode_selectors: self
                .mode_selectors
                .iter()
                .map(|(key, list)| (key.clone(), list.to_vec()))
                .collect(),
            prefix: self.prefix.clone(),
            transform: None,
        }
    }
}

/// `plugins.js`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JsConfig {
    pub js: Option<OutputToggle>,
    pub json: Option<OutputToggle>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub deep: bool,
    pub types_module: Option<String>,
}

impl JsConfig {
    #[must_use]
    pub fn to_options(&self) -> JsOptions {
        let defaults = JsOptions::default();
        JsOptions {
            js: self.js.clone().unwrap_or(defaults.js),
            json: self.json.clone().unwrap_or(defaults.json),
            exclude: self.exclude.clone(),
            deep: self.deep,
            types_module: self
                .types_module
                .clone()
                .unwrap_or_else(|| DEFAULT_TYPES_MODULE.to_string()),
            transform: None,
        }
    }
}

/// Enabled plugins. A missing block disables that plugin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    pub css: Option<CssConfig>,
    pub js: Option<JsConfig>,
}

fn default_plugins() -> PluginsConfig {
    PluginsConfig {
        css: Some(CssConfig::default()),
        js: None,
    }
}

fn default_tokens() -> PathBuf {
    PathBuf::from(DEFAULT_TOKENS)
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

/// Parsed project configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Display name for generated headers.
    pub name: Option<String>,
    #[serde(default = "default_tokens")]
    pub tokens: PathBuf,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "default_plugins")]
    pub plugins: PluginsConfig,
    /// Directory relative paths resolve against (the config file's directory).
    #[serde(skip)]
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            tokens: default_tokens(),
            out_dir: default_out_dir(),
            plugins: default_plugins(),
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Token file path, resolved against the config root.
    #[must_use]
    pub fn tokens_path(&self) -> PathBuf {
        self.root.join(&self.tokens)
    }

    /// Output directory, resolved against the config root.
    #[must_use]
    pub fn out_dir_path(&self) -> PathBuf {
        self.root.join(&self.out_dir)
    }
}

/// Parse configuration text. `root` is recorded for resolving relative paths.
///
/// # Errors
///
/// Returns [`TokencastError::Config`] for unknown keys or values of the wrong shape.
pub fn parse_config(content: &str, format: DocumentFormat, root: &Path) -> Result<Config> {
    // An empty document is a valid "all defaults" config.
    let value = if content.trim().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        format.parse_value(content)?
    };
    let mut config: Config =
        serde_json::from_value(value).map_err(|e| TokencastError::Config {
            message: e.to_string(),
        })?;
    config.root = root.to_path_buf();
    Ok(config)
}

/// Read a configuration file.
///
/// # Errors
///
/// Fails if the file cannot be read or does not parse as a configuration.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let root = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    parse_config(&content, DocumentFormat::from_path(path), root).map_err(|e| match e {
        TokencastError::Config { message } => TokencastError::Config {
            message: format!("{}: {message}", path.display()),
        },
        other => other,
    })
}

/// Find a configuration file in `dir`.
#[must_use]
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| is_regular_file(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn yaml(content: &str) -> Result<Config> {
        parse_config(content, DocumentFormat::Yaml, Path::new("/project"))
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = yaml("").unwrap();
        assert_eq!(config.tokens, PathBuf::from("tokens.json"));
        assert_eq!(config.out_dir_path(), PathBuf::from("/project/tokens"));
        assert!(config.plugins.css.is_some());
        assert!(config.plugins.js.is_none());
    }

    #[test]
    fn full_yaml_config() {
        let config = yaml(
            r#"
name: Acme
tokens: design/tokens.yaml
outDir: dist
plugins:
  css:
    prefix: ds
    embedFiles: true
    modeSelectors:
      "color#dark": "[data-theme=dark]"
      "color#light": ["[data-theme=light]", ".light"]
  js:
    json: true
    deep: true
    exclude: ["internal.*"]
"#,
        )
        .unwrap();
        assert_eq!(config.name.as_deref(), Some("Acme"));
        assert_eq!(config.tokens_path(), PathBuf::from("/project/design/tokens.yaml"));

        let css = config.plugins.css.as_ref().unwrap().to_options();
        assert_eq!(css.prefix.as_deref(), Some("ds"));
        assert!(css.embed_files);
        assert_eq!(css.filename, "tokens.css");
        assert_eq!(css.mode_selectors["color#dark"], vec!["[data-theme=dark]"]);
        assert_eq!(css.mode_selectors["color#light"].len(), 2);
        let keys: Vec<&String> = css.mode_selectors.keys().collect();
        assert_eq!(keys, ["color#dark", "color#light"]);

        let js = config.plugins.js.as_ref().unwrap().to_options();
        assert_eq!(js.json, OutputToggle::Enabled(true));
        assert_eq!(js.js, OutputToggle::Enabled(true));
        assert!(js.deep);
        assert_eq!(js.exclude, ["internal.*"]);
    }

    #[test]
    fn plugins_block_replaces_defaults() {
        let config = yaml("plugins:\n  js: {}\n").unwrap();
        assert!(config.plugins.css.is_none());
        assert!(config.plugins.js.is_some());
    }

    #[test]
    fn unknown_key_is_config_error() {
        let err = yaml("outdir: dist\n").unwrap_err();
        assert!(matches!(err, TokencastError::Config { .. }));
    }

    #[test]
    fn json_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokencast.json");
        fs::write(&path, r#"{"name": "Acme", "outDir": "out"}"#).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.out_dir_path(), dir.path().join("out"));
    }

    #[test]
    fn load_error_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokencast.yaml");
        fs::write(&path, "plugins:\n  scss: {}\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("tokencast.yaml"));
    }

    #[test]
    fn finds_config_by_priority() {
        let dir = tempdir().unwrap();
        assert!(find_config(dir.path()).is_none());
        fs::write(dir.path().join("tokencast.json"), "{}").unwrap();
        fs::write(dir.path().join("tokencast.yaml"), "").unwrap();
        assert_eq!(
            find_config(dir.path()),
            Some(dir.path().join("tokencast.yaml"))
        );
    }
}
