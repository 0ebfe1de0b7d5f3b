use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading tokens or running output plugins.
#[derive(Error, Debug)]
pub enum TokencastError {
    /// A token kind has no transformer for the requested output.
    #[error("no transformer defined for $type: {kind} tokens")]
    UnsupportedType { kind: String },

    /// A mode was requested that the token does not carry.
    #[error("token {id} missing \"$extensions.mode.{mode}\"")]
    MissingMode { id: String, mode: String },

    /// A `modeSelectors` key is not of the form `group#mode`.
    #[error("modeSelector key {key:?} {message}")]
    ModeSelector { key: String, message: String },

    /// A token is malformed (wrong shape for its `$type`, missing id, ...).
    #[error("invalid token {id}: {message}")]
    InvalidToken { id: String, message: String },

    /// Configuration file problem.
    #[error("config error: {message}")]
    Config { message: String },

    /// Plugin output could not be assembled.
    #[error("build error: {message}")]
    Build { message: String },

    /// A linked file could not be embedded.
    #[error("cannot embed {}: {source}", path.display())]
    Embed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Convenience alias for `Result<T, TokencastError>`.
pub type Result<T> = std::result::Result<T, TokencastError>;
