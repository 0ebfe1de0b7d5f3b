//! Design-token code generation: CSS custom properties, JS modules and JSON.

pub mod builder;
pub mod color;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod fs_util;
pub mod ident;
pub mod models;
pub mod parser;
pub mod plugin;

// Re-export key types at crate root for convenience.
pub use errors::{Result, TokencastError};
pub use models::{Metadata, Token, TokenKind, TokenValue};
pub use parser::{parse_tokens, read_tokens, DocumentFormat};

pub use builder::{
    build, build_tokens, check_outputs, plugins_from_config, run_plugins, write_outputs,
    BuildReport, StaleFile,
};
pub use config::{find_config, load_config, Config};
pub use diagnostics::{Diagnostic, Severity};
pub use fs_util::WriteStatus;
pub use plugin::css::{CssOptions, CssPlugin, CssTransform, CssValue};
pub use plugin::js::{JsOptions, JsPlugin, JsTransform, OutputToggle};
pub use plugin::{BuildContext, OutputFile, Plugin, PluginOutput};
