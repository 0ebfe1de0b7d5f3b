use std::path::PathBuf;

use tokencast::plugin::js::{declaration_filename, DEFAULT_JS_FILENAME, DEFAULT_JSON_FILENAME};
use tokencast::{JsOptions, JsPlugin, OutputToggle};

use super::Emit;

pub(crate) fn run(tokens: PathBuf, emit: Emit, deep: bool, exclude: Vec<String>) {
    let json = matches!(emit, Emit::Json);
    let plugin = JsPlugin::new(JsOptions {
        js: OutputToggle::Enabled(!json),
        json: OutputToggle::Enabled(json),
        exclude,
        deep,
        ..JsOptions::default()
    });
    let output = super::run_single("js", &plugin, &tokens, None);

    let wanted = match emit {
        Emit::Js => DEFAULT_JS_FILENAME.to_string(),
        Emit::Dts => declaration_filename(DEFAULT_JS_FILENAME),
        Emit::Json => DEFAULT_JSON_FILENAME.to_string(),
    };
    if let Some(file) = output.files.iter().find(|f| f.filename == wanted) {
        print!("{}", file.contents);
    }
}
