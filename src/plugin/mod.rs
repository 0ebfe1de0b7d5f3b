//! Output plugins: each turns the normalized token list into one or more files.

pub mod css;
pub mod js;

use std::path::Path;

use crate::diagnostics::Diagnostic;
use crate::errors::Result;
use crate::models::{Metadata, Token};

/// Read-only inputs shared by every plugin in a build.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub tokens: &'a [Token],
    pub metadata: &'a Metadata,
    /// Directory generated files are written to; linked assets resolve against it.
    pub out_dir: &'a Path,
}

/// A generated artifact, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub filename: String,
    pub contents: String,
}

/// Files and non-fatal diagnostics produced by one plugin.
#[derive(Debug, Default)]
pub struct PluginOutput {
    pub files: Vec<OutputFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// An output format.
pub trait Plugin {
    /// Short name used in diagnostics (`css`, `js`).
    fn name(&self) -> &'static str;

    /// Generate this plugin's files.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole build; recoverable problems go into
    /// [`PluginOutput::diagnostics`] instead.
    fn build(&self, ctx: &BuildContext<'_>) -> Result<PluginOutput>;
}

/// Indent `line` by `level` steps of two spaces.
pub(crate) fn indent(line: &str, level: usize) -> String {
    format!("{}{line}", "  ".repeat(level))
}
