//! Build orchestration: read tokens, run plugins, write or check outputs.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use similar::TextDiff;

use crate::config::Config;
use crate::diagnostics::Diagnostic;
use crate::errors::{Result, TokencastError};
use crate::fs_util::{read_existing, write_if_changed, WriteStatus};
use crate::models::{Metadata, Token};
use crate::parser::read_tokens;
use crate::plugin::css::CssPlugin;
use crate::plugin::js::JsPlugin;
use crate::plugin::{BuildContext, OutputFile, Plugin};

/// Everything a build produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub files: Vec<OutputFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// An output file whose on-disk contents differ from the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleFile {
    pub path: PathBuf,
    /// Unified diff from the current file to the generated one.
    pub diff: String,
}

/// Instantiate the plugins enabled in `config`, in output order (css, js).
#[must_use]
pub fn plugins_from_config(config: &Config) -> Vec<Box<dyn Plugin>> {
    let mut plugins: Vec<Box<dyn Plugin>> = Vec::new();
    if let Some(css) = &config.plugins.css {
        plugins.push(Box::new(CssPlugin::new(css.to_options())));
    }
    if let Some(js) = &config.plugins.js {
        plugins.push(Box::new(JsPlugin::new(js.to_options())));
    }
    plugins
}

/// Output filenames must stay inside the output directory.
fn check_filename(plugin: &str, filename: &str) -> Result<()> {
    let path = Path::new(filename);
    let escapes = filename.is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(TokencastError::Build {
            message: format!("{plugin} output {filename:?} must be a relative path inside the output directory"),
        });
    }
    Ok(())
}

/// Run `plugins` in order over one context.
///
/// # Errors
///
/// Fails on the first plugin error, on an output path outside the output
/// directory, or when two plugins produce the same file.
pub fn run_plugins(plugins: &[Box<dyn Plugin>], ctx: &BuildContext<'_>) -> Result<BuildReport> {
    let mut report = BuildReport::default();
    let mut seen = HashSet::new();
    for plugin in plugins {
        tracing::debug!(plugin = plugin.name(), tokens = ctx.tokens.len(), "running plugin");
        let output = plugin.build(ctx)?;
        for file in &output.files {
            check_filename(plugin.name(), &file.filename)?;
            if !seen.insert(file.filename.clone()) {
                return Err(TokencastError::Build {
                    message: format!("{} output {} was already produced", plugin.name(), file.filename),
                });
            }
        }
        report.files.extend(output.files);
        report.diagnostics.extend(output.diagnostics);
    }
    Ok(report)
}

/// Run the plugins enabled in `config` over an already parsed token list.
///
/// # Errors
///
/// See [`run_plugins`].
pub fn build_tokens(config: &Config, tokens: &[Token]) -> Result<BuildReport> {
    let metadata = Metadata {
        name: config.name.clone(),
    };
    let out_dir = config.out_dir_path();
    let ctx = BuildContext {
        tokens,
        metadata: &metadata,
        out_dir: &out_dir,
    };
    run_plugins(&plugins_from_config(config), &ctx)
}

/// Read the configured token file and run every enabled plugin.
///
/// # Errors
///
/// Fails if the token file cannot be read or parsed, or if any plugin fails.
pub fn build(config: &Config) -> Result<BuildReport> {
    let tokens_path = config.tokens_path();
    let tokens = read_tokens(&tokens_path)?;
    tracing::info!(tokens = tokens.len(), path = %tokens_path.display(), "loaded tokens");
    build_tokens(config, &tokens)
}

/// Write generated files under `out_dir`, skipping files that are already current.
///
/// # Errors
///
/// Fails on I/O errors or when a target is not a regular file.
pub fn write_outputs(out_dir: &Path, files: &[OutputFile]) -> Result<Vec<(PathBuf, WriteStatus)>> {
    files
        .iter()
        .map(|file| {
            let path = out_dir.join(&file.filename);
            let status = write_if_changed(&path, &file.contents)?;
            tracing::debug!(path = %path.display(), ?status, "wrote output");
            Ok((path, status))
        })
        .collect()
}

/// Compare generated files with what is on disk without writing anything.
///
/// # Errors
///
/// Fails on I/O errors or when a target is not a regular file.
pub fn check_outputs(out_dir: &Path, files: &[OutputFile]) -> Result<Vec<StaleFile>> {
    let mut stale = Vec::new();
    for file in files {
        let path = out_dir.join(&file.filename);
        let current = read_existing(&path)?.unwrap_or_default();
        if current == file.contents {
            continue;
        }
        let name = path.display().to_string();
        let diff = TextDiff::from_lines(current.as_str(), file.contents.as_str())
            .unified_diff()
            .context_radius(3)
            .header(&name, &name)
            .to_string();
        stale.push(StaleFile { path, diff });
    }
    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JsConfig, PluginsConfig};
    use crate::plugin::PluginOutput;
    use std::fs;
    use tempfile::tempdir;

    const TOKENS: &str = r##"{
        "color.bg": {"$type": "color", "$value": "#ffffff",
                     "$extensions": {"mode": {"dark": "#000000"}}},
        "space.sm": {"$type": "dimension", "$value": "4px"}
    }"##;

    fn project(config: &str) -> (tempfile::TempDir, Config) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("tokens.json"), TOKENS).unwrap();
        let path = dir.path().join("tokencast.yaml");
        fs::write(&path, config).unwrap();
        let config = crate::config::load_config(&path).unwrap();
        (dir, config)
    }

    struct Fixed(&'static str);

    impl Plugin for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn build(&self, _ctx: &BuildContext<'_>) -> Result<PluginOutput> {
            Ok(PluginOutput {
                files: vec![OutputFile {
                    filename: self.0.to_string(),
                    contents: String::new(),
                }],
                diagnostics: Vec::new(),
            })
        }
    }

    fn run_fixed(plugins: Vec<Box<dyn Plugin>>) -> Result<BuildReport> {
        let metadata = Metadata::default();
        let ctx = BuildContext {
            tokens: &[],
            metadata: &metadata,
            out_dir: Path::new("."),
        };
        run_plugins(&plugins, &ctx)
    }

    #[test]
    fn default_build_emits_css() {
        let (_dir, config) = project("name: Acme\n");
        let report = build(&config).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].filename, "tokens.css");
        assert!(report.files[0].contents.contains("--color-bg: #ffffff;"));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn css_then_js_outputs() {
        let (_dir, config) = project("plugins:\n  css: {}\n  js:\n    json: true\n");
        let report = build(&config).unwrap();
        let names: Vec<&str> = report.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, ["tokens.css", "index.d.ts", "index.js", "tokens.json"]);
    }

    #[test]
    fn diagnostics_are_collected() {
        let (_dir, config) =
            project("plugins:\n  css:\n    modeSelectors:\n      \"size#dark\": .dark\n");
        let report = build(&config).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].is_warning());
    }

    #[test]
    fn missing_token_file_fails() {
        let config = Config {
            tokens: PathBuf::from("/nonexistent/tokens.json"),
            ..Config::default()
        };
        assert!(build(&config).is_err());
    }

    #[test]
    fn build_tokens_skips_file_io() {
        let config = Config {
            plugins: PluginsConfig {
                css: None,
                js: Some(JsConfig::default()),
            },
            ..Config::default()
        };
        let report = build_tokens(&config, &[]).unwrap();
        assert_eq!(report.files.len(), 2);
    }

    #[test]
    fn escaping_filenames_are_rejected() {
        for name in ["../tokens.css", "/tmp/tokens.css", ""] {
            let err = run_fixed(vec![Box::new(Fixed(name))]).unwrap_err();
            assert!(matches!(err, TokencastError::Build { .. }), "{name}");
        }
        assert!(run_fixed(vec![Box::new(Fixed("css/tokens.css"))]).is_ok());
    }

    #[test]
    fn duplicate_filenames_are_rejected() {
        let err = run_fixed(vec![Box::new(Fixed("a.css")), Box::new(Fixed("a.css"))]).unwrap_err();
        assert!(err.to_string().contains("already produced"));
    }

    #[test]
    fn write_then_check() {
        let (dir, config) = project("");
        let report = build(&config).unwrap();
        let out_dir = config.out_dir_path();

        let stale = check_outputs(&out_dir, &report.files).unwrap();
        assert_eq!(stale.len(), 1);
        assert!(stale[0].diff.contains("+:root {"));

        let written = write_outputs(&out_dir, &report.files).unwrap();
        assert_eq!(written[0].1, WriteStatus::Created);
        assert!(dir.path().join("tokens/tokens.css").is_file());

        assert!(check_outputs(&out_dir, &report.files).unwrap().is_empty());
        let again = write_outputs(&out_dir, &report.files).unwrap();
        assert_eq!(again[0].1, WriteStatus::Unchanged);
    }
}
