use std::path::PathBuf;

use indexmap::IndexMap;

use tokencast::{CssOptions, CssPlugin};

pub(crate) fn run(
    tokens: PathBuf,
    name: Option<String>,
    prefix: Option<String>,
    mode_selectors: Vec<String>,
    embed_files: bool,
) {
    let mut selectors: IndexMap<String, Vec<String>> = IndexMap::new();
    for arg in &mode_selectors {
        let Some((key, selector)) = arg.split_once('=') else {
            eprintln!("tokencast css: --mode-selector {arg:?} must be KEY=SELECTOR");
            std::process::exit(1);
        };
        selectors
            .entry(key.trim().to_string())
            .or_default()
            .push(selector.trim().to_string());
    }

    let plugin = CssPlugin::new(CssOptions {
        embed_files,
        mode_selectors: selectors,
        prefix,
        ..CssOptions::default()
    });
    let output = super::run_single("css", &plugin, &tokens, name);
    for file in &output.files {
        print!("{}", file.contents);
    }
}
