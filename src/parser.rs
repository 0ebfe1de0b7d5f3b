use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{Result, TokencastError};
use crate::models::{Token, TokenKind, TokenValue};

/// Serialization format of a token or config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from a file extension (`.yaml`/`.yml` → YAML, anything else → JSON).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }

    /// Parse `content` into a JSON value tree, keeping key order.
    pub fn parse_value(self, content: &str) -> Result<Value> {
        Ok(match self {
            DocumentFormat::Json => serde_json::from_str(content)?,
            DocumentFormat::Yaml => serde_yaml_ng::from_str(content)?,
        })
    }
}

/// One token as written in a normalized token document.
#[derive(Debug, Deserialize)]
struct RawToken {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "$type")]
    kind: String,
    #[serde(rename = "$value")]
    value: Value,
    #[serde(rename = "$description", default)]
    description: Option<String>,
    #[serde(rename = "$extensions", default)]
    extensions: Option<RawExtensions>,
}

#[derive(Debug, Default, Deserialize)]
struct RawExtensions {
    #[serde(default)]
    mode: IndexMap<String, Value>,
}

/// Parse a normalized token document.
///
/// Accepts either an array of token objects (each with an `id`) or an object
/// keyed by token id. Document order is preserved.
///
/// # Errors
///
/// Returns [`TokencastError::UnsupportedType`] for an unknown `$type`,
/// [`TokencastError::InvalidToken`] for a value that does not match its type,
/// and a JSON/YAML error for malformed input.
pub fn parse_tokens(content: &str, format: DocumentFormat) -> Result<Vec<Token>> {
    match format.parse_value(content)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let raw: RawToken = serde_json::from_value(item)?;
                let id = raw.id.clone().ok_or_else(|| TokencastError::InvalidToken {
                    id: format!("#{i}"),
                    message: "missing \"id\"".into(),
                })?;
                token_from_raw(id, raw)
            })
            .collect(),
        Value::Object(entries) => entries
            .into_iter()
            .map(|(id, item)| {
                let raw: RawToken =
                    serde_json::from_value(item).map_err(|e| TokencastError::InvalidToken {
                        id: id.clone(),
                        message: e.to_string(),
                    })?;
                token_from_raw(id, raw)
            })
            .collect(),
        _ => Err(TokencastError::InvalidToken {
            id: "<document>".into(),
            message: "expected an array of tokens or an object keyed by token id".into(),
        }),
    }
}

fn token_from_raw(id: String, raw: RawToken) -> Result<Token> {
    let kind: TokenKind = raw.kind.parse()?;
    let value = TokenValue::from_json(kind, raw.value).map_err(|e| {
        TokencastError::InvalidToken {
            id: id.clone(),
            message: format!("$value is not a valid {kind}: {e}"),
        }
    })?;
    Ok(Token {
        id,
        value,
        description: raw.description,
        modes: raw.extensions.map(|e| e.mode).unwrap_or_default(),
    })
}

/// Read and parse a token file, picking the format from its extension.
pub fn read_tokens(path: &Path) -> Result<Vec<Token>> {
    let content = std::fs::read_to_string(path)?;
    parse_tokens(&content, DocumentFormat::from_path(path))
}
