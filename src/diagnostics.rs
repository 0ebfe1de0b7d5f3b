//! Non-fatal build diagnostics.
//!
//! Fatal problems are [`TokencastError`](crate::TokencastError)s. Everything a
//! plugin can recover from (a selector nothing maps to, an exclude pattern that
//! matches nothing) is reported as a [`Diagnostic`] with a stable code and
//! travels with the plugin output.

use std::fmt;

use serde::Serialize;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The output was produced but probably not as intended.
    Warning,
    /// Informational note.
    Info,
}

/// A structured diagnostic emitted by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable code (e.g., `"W001"`).
    pub code: &'static str,
    /// Name of the plugin that produced it.
    pub plugin: &'static str,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn warning(plugin: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            plugin,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(plugin: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            plugin,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// `warning: [plugin] message` / `info: [plugin] message`.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(f, "{label}: [{}] {}", self.plugin, self.message)
    }
}

// ── Codes ───────────────────────────────────────────────────────────────

/// A configured mode selector received no tokens.
pub const W001: &str = "W001";
/// An exclude pattern matched no token.
pub const W002: &str = "W002";
/// Tokens were excluded from the output.
pub const I001: &str = "I001";
