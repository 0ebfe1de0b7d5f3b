//! Inline linked files as base64 `data:` URIs.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::errors::{Result, TokencastError};

/// Strip a CSS `url(...)` wrapper and its quotes.
fn unwrap_url(css_url: &str) -> &str {
    let inner = css_url
        .trim()
        .strip_prefix("url(")
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(css_url);
    inner.trim_matches(|c| c == '\'' || c == '"')
}

/// Replace a `url('path')` value with `url('data:<mime>;base64,<bytes>')`.
///
/// Relative paths resolve against `base_dir`.
///
/// # Errors
///
/// Returns [`TokencastError::Embed`] if the file cannot be read.
pub fn encode(css_url: &str, base_dir: &Path) -> Result<String> {
    let target = unwrap_url(css_url);
    let path = base_dir.join(target);
    let bytes = std::fs::read(&path).map_err(|source| TokencastError::Embed {
        path: path.clone(),
        source,
    })?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(format!(
        "url('data:{};base64,{}')",
        mime.essence_str(),
        BASE64.encode(bytes)
    ))
}
