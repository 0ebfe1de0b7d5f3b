//! JavaScript module, TypeScript declarations and JSON output.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::diagnostics::{Diagnostic, I001, W002};
use crate::errors::{Result, TokencastError};
use crate::models::{Token, TokenKind};
use crate::plugin::{indent, BuildContext, OutputFile, Plugin, PluginOutput};

/// Mode key holding a token's base value.
pub const DEFAULT_MODE: &str = ".";

pub const DEFAULT_JS_FILENAME: &str = "index.js";
pub const DEFAULT_JSON_FILENAME: &str = "tokens.json";
pub const DEFAULT_TYPES_MODULE: &str = "@terrazzo/parser";

pub const FILE_HEADER: &str = "/** ------------------------------------------
 *  Autogenerated by tokencast. DO NOT EDIT!
 * ------------------------------------------- */";

/// Override consulted before the default value; receives the token and the
/// mode (`"."` for the base value).
pub type JsTransform = Arc<dyn Fn(&Token, &str) -> Option<Value> + Send + Sync>;

/// `true`/`false` or an explicit filename.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OutputToggle {
    Enabled(bool),
    File(String),
}

impl OutputToggle {
    /// The filename to write, if enabled.
    #[must_use]
    pub fn filename(&self, default: &str) -> Option<String> {
        match self {
            OutputToggle::Enabled(true) => Some(default.to_string()),
            OutputToggle::Enabled(false) => None,
            OutputToggle::File(name) => Some(name.clone()),
        }
    }
}

/// JS plugin options.
#[derive(Clone)]
pub struct JsOptions {
    pub js: OutputToggle,
    pub json: OutputToggle,
    /// Glob patterns on token ids to leave out.
    pub exclude: Vec<String>,
    /// Nest tokens by their `.`-separated id segments.
    pub deep: bool,
    /// Module the declaration file imports token types from.
    pub types_module: String,
    pub transform: Option<JsTransform>,
}

impl Default for JsOptions {
    fn default() -> Self {
        Self {
            js: OutputToggle::Enabled(true),
            json: OutputToggle::Enabled(false),
            exclude: Vec::new(),
            deep: false,
            types_module: DEFAULT_TYPES_MODULE.to_string(),
            transform: None,
        }
    }
}

impl fmt::Debug for JsOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsOptions")
            .field("js", &self.js)
            .field("json", &self.json)
            .field("exclude", &self.exclude)
            .field("deep", &self.deep)
            .field("types_module", &self.types_module)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

// ── Exclusion ───────────────────────────────────────────────────────────

struct Exclusions {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Exclusions {
    fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| TokencastError::Config {
                message: format!("invalid exclude pattern {pattern:?}: {e}"),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| TokencastError::Config {
            message: format!("invalid exclude patterns: {e}"),
        })?;
        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }
}

// ── Token tree ──────────────────────────────────────────────────────────

/// One token's output: its kind and a value per mode.
#[derive(Debug, Clone)]
struct Leaf {
    kind: TokenKind,
    values: Map<String, Value>,
}

impl Leaf {
    /// `"." | "dark"`
    fn mode_union(&self) -> String {
        self.values
            .keys()
            .map(|m| quote(m))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn value_type(&self) -> String {
        format!("{}[\"$value\"]", self.kind.normalized_type_name())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(Leaf),
    Group(IndexMap<String, Node>),
}

type Tree = IndexMap<String, Node>;

fn collision(id: &str, other: &str) -> TokencastError {
    TokencastError::Build {
        message: format!("token {id} collides with {other} when nesting ids"),
    }
}

fn insert_flat(tree: &mut Tree, id: &str, leaf: Leaf) -> Result<()> {
    match tree.entry(id.to_string()) {
        Entry::Occupied(_) => Err(TokencastError::Build {
            message: format!("duplicate token id {id}"),
        }),
        Entry::Vacant(slot) => {
            slot.insert(Node::Leaf(leaf));
            Ok(())
        }
    }
}

fn insert_deep(tree: &mut Tree, id: &str, leaf: Leaf) -> Result<()> {
    let parts: Vec<&str> = id.split('.').collect();
    let Some((last, groups)) = parts.split_last() else {
        return Err(collision(id, id));
    };
    let mut level = tree;
    for (i, part) in groups.iter().enumerate() {
        let node = level
            .entry((*part).to_string())
            .or_insert_with(|| Node::Group(IndexMap::new()));
        match node {
            Node::Group(children) => level = children,
            Node::Leaf(_) => return Err(collision(id, &parts[..=i].join("."))),
        }
    }
    match level.entry((*last).to_string()) {
        Entry::Occupied(_) => Err(collision(id, id)),
        Entry::Vacant(slot) => {
            slot.insert(Node::Leaf(leaf));
            Ok(())
        }
    }
}

fn tree_to_json(tree: &Tree) -> Value {
    let map = tree
        .iter()
        .map(|(key, node)| {
            let value = match node {
                Node::Leaf(leaf) => Value::Object(leaf.values.clone()),
                Node::Group(children) => tree_to_json(children),
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(map)
}

fn collect_kinds(tree: &Tree, kinds: &mut BTreeSet<&'static str>) {
    for node in tree.values() {
        match node {
            Node::Leaf(leaf) => {
                kinds.insert(leaf.kind.normalized_type_name());
            }
            Node::Group(children) => collect_kinds(children, kinds),
        }
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

// ── Rendering ───────────────────────────────────────────────────────────

fn render_js(tree: &Tree, deep: bool) -> Result<String> {
    let json = serde_json::to_string_pretty(&tree_to_json(tree))?;
    let accessor = if deep {
        "export function token(tokenID, modeName = \".\") {
  let node = tokens;
  for (const part of tokenID.split(\".\")) {
    node = node?.[part];
  }
  return node?.[modeName];
}"
    } else {
        "export function token(tokenID, modeName = \".\") {
  return tokens[tokenID]?.[modeName];
}"
    };
    Ok(format!(
        "{FILE_HEADER}\n\nexport const tokens = {json};\n\n/** Get individual token */\n{accessor}\n"
    ))
}

fn render_type_members(tree: &Tree, level: usize, out: &mut Vec<String>) {
    for (key, node) in tree {
        let key = quote(key);
        match node {
            Node::Leaf(leaf) => out.push(indent(
                &format!("{key}: Record<{}, {}>;", leaf.mode_union(), leaf.value_type()),
                level,
            )),
            Node::Group(children) => {
                out.push(indent(&format!("{key}: {{"), level));
                render_type_members(children, level + 1, out);
                out.push(indent("};", level));
            }
        }
    }
}

fn render_dts(tree: &Tree, leaves: &[(&str, &Leaf)], types_module: &str) -> String {
    let mut kinds = BTreeSet::new();
    collect_kinds(tree, &mut kinds);

    let mut out = vec![FILE_HEADER.to_string(), String::new()];
    if !kinds.is_empty() {
        out.push("import type {".into());
        out.extend(kinds.iter().map(|k| indent(&format!("{k},"), 1)));
        out.push(format!("}} from {};", quote(types_module)));
        out.push(String::new());
    }
    out.push("export declare const tokens: {".into());
    render_type_members(tree, 1, &mut out);
    out.push("};".into());
    out.push(String::new());
    out.push("/** Get individual token */".into());
    for (id, leaf) in leaves {
        out.push(format!(
            "export declare function token(tokenID: {}, modeName?: {}): {};",
            quote(id),
            leaf.mode_union(),
            leaf.value_type()
        ));
    }
    out.push("export declare function token(tokenID: string, modeName?: string): unknown;".into());
    out.push(String::new());
    out.join("\n")
}

/// `index.js` → `index.d.ts`; other names get `.d.ts` appended.
#[must_use]
pub fn declaration_filename(js_filename: &str) -> String {
    let stem = js_filename
        .strip_suffix(".mjs")
        .or_else(|| js_filename.strip_suffix(".js"))
        .unwrap_or(js_filename);
    format!("{stem}.d.ts")
}

// ── Plugin ──────────────────────────────────────────────────────────────

/// Emits a JS module with typings and/or a JSON document.
#[derive(Debug, Clone, Default)]
pub struct JsPlugin {
    options: JsOptions,
}

impl JsPlugin {
    #[must_use]
    pub fn new(options: JsOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &JsOptions {
        &self.options
    }

    fn value_in(&self, token: &Token, mode: &str) -> Result<Value> {
        if let Some(value) = self.options.transform.as_ref().and_then(|f| f(token, mode)) {
            return Ok(value);
        }
        let resolved = token.value_for_mode((mode != DEFAULT_MODE).then_some(mode))?;
        Ok(resolved.to_json()?)
    }

    fn leaf(&self, token: &Token) -> Result<Leaf> {
        let mut values = Map::new();
        values.insert(DEFAULT_MODE.to_string(), self.value_in(token, DEFAULT_MODE)?);
        for mode in token.modes.keys() {
            if mode == DEFAULT_MODE || !token.has_mode(mode) {
                continue;
            }
            values.insert(mode.clone(), self.value_in(token, mode)?);
        }
        Ok(Leaf {
            kind: token.kind(),
            values,
        })
    }
}

impl Plugin for JsPlugin {
    fn name(&self) -> &'static str {
        "js"
    }

    fn build(&self, ctx: &BuildContext<'_>) -> Result<PluginOutput> {
        let mut output = PluginOutput::default();
        let js_file = self.options.js.filename(DEFAULT_JS_FILENAME);
        let json_file = self.options.json.filename(DEFAULT_JSON_FILENAME);
        if js_file.is_none() && json_file.is_none() {
            return Ok(output);
        }

        let exclusions = Exclusions::new(&self.options.exclude)?;
        let mut used = vec![false; exclusions.patterns.len()];
        let mut excluded = 0usize;

        let mut tree = Tree::new();
        let mut leaves: Vec<(&str, Leaf)> = Vec::new();
        for token in ctx.tokens {
            let hits = exclusions.set.matches(&token.id);
            if !hits.is_empty() {
                for i in hits {
                    used[i] = true;
                }
                excluded += 1;
                tracing::trace!(plugin = "js", token = %token.id, "excluded");
                continue;
            }
            let leaf = self.leaf(token)?;
            if self.options.deep {
                insert_deep(&mut tree, &token.id, leaf.clone())?;
            } else {
                insert_flat(&mut tree, &token.id, leaf.clone())?;
            }
            leaves.push((token.id.as_str(), leaf));
        }

        for (pattern, _) in exclusions.patterns.iter().zip(&used).filter(|(_, u)| !**u) {
            tracing::warn!(plugin = "js", pattern = %pattern, "exclude pattern matched no tokens");
            output.diagnostics.push(Diagnostic::warning(
                "js",
                W002,
                format!("exclude pattern \"{pattern}\" matched no tokens"),
            ));
        }
        if excluded > 0 {
            output.diagnostics.push(Diagnostic::info(
                "js",
                I001,
                format!("excluded {excluded} token(s)"),
            ));
        }

        if let Some(js_file) = js_file {
            let borrowed: Vec<(&str, &Leaf)> = leaves.iter().map(|(id, l)| (*id, l)).collect();
            output.files.push(OutputFile {
                filename: declaration_filename(&js_file),
                contents: render_dts(&tree, &borrowed, &self.options.types_module),
            });
            output.files.push(OutputFile {
                filename: js_file,
                contents: render_js(&tree, self.options.deep)?,
            });
        }
        if let Some(json_file) = json_file {
            let mut contents = serde_json::to_string_pretty(&tree_to_json(&tree))?;
            contents.push('\n');
            output.files.push(OutputFile {
                filename: json_file,
                contents,
            });
        }

        tracing::debug!(
            plugin = "js",
            tokens = leaves.len(),
            excluded,
            files = output.files.len(),
            "generated js output"
        );
        Ok(output)
    }
}
