//! Normalized design-token model.
//!
//! A [`Token`] carries a closed [`TokenValue`] plus the raw per-mode
//! overrides found under `$extensions.mode`. Mode values are merged over the
//! base value on demand by [`Token::value_for_mode`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, TokencastError};

/// The `$type` of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Boolean,
    Border,
    Color,
    CubicBezier,
    Dimension,
    Duration,
    FontFamily,
    FontWeight,
    Gradient,
    Link,
    Number,
    Shadow,
    String,
    StrokeStyle,
    Transition,
    Typography,
}

impl TokenKind {
    /// Every kind, in the order used for generated type imports.
    pub const ALL: [TokenKind; 16] = [
        TokenKind::Boolean,
        TokenKind::Border,
        TokenKind::Color,
        TokenKind::CubicBezier,
        TokenKind::Dimension,
        TokenKind::Duration,
        TokenKind::FontFamily,
        TokenKind::FontWeight,
        TokenKind::Gradient,
        TokenKind::Link,
        TokenKind::Number,
        TokenKind::Shadow,
        TokenKind::String,
        TokenKind::StrokeStyle,
        TokenKind::Transition,
        TokenKind::Typography,
    ];

    /// The `$type` string as it appears in token documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Boolean => "boolean",
            TokenKind::Border => "border",
            TokenKind::Color => "color",
            TokenKind::CubicBezier => "cubicBezier",
            TokenKind::Dimension => "dimension",
            TokenKind::Duration => "duration",
            TokenKind::FontFamily => "fontFamily",
            TokenKind::FontWeight => "fontWeight",
            TokenKind::Gradient => "gradient",
            TokenKind::Link => "link",
            TokenKind::Number => "number",
            TokenKind::Shadow => "shadow",
            TokenKind::String => "string",
            TokenKind::StrokeStyle => "strokeStyle",
            TokenKind::Transition => "transition",
            TokenKind::Typography => "typography",
        }
    }

    /// Name of the normalized token type used in generated TypeScript declarations.
    #[must_use]
    pub fn normalized_type_name(self) -> &'static str {
        match self {
            TokenKind::Boolean => "BooleanTokenNormalized",
            TokenKind::Border => "BorderTokenNormalized",
            TokenKind::Color => "ColorTokenNormalized",
            TokenKind::CubicBezier => "CubicBezierTokenNormalized",
            TokenKind::Dimension => "DimensionTokenNormalized",
            TokenKind::Duration => "DurationTokenNormalized",
            TokenKind::FontFamily => "FontFamilyTokenNormalized",
            TokenKind::FontWeight => "FontWeightTokenNormalized",
            TokenKind::Gradient => "GradientTokenNormalized",
            TokenKind::Link => "LinkTokenNormalized",
            TokenKind::Number => "NumberTokenNormalized",
            TokenKind::Shadow => "ShadowTokenNormalized",
            TokenKind::String => "StringTokenNormalized",
            TokenKind::StrokeStyle => "StrokeStyleTokenNormalized",
            TokenKind::Transition => "TransitionTokenNormalized",
            TokenKind::Typography => "TypographyTokenNormalized",
        }
    }

    /// Returns `true` for kinds whose CSS output can contain color literals.
    #[must_use]
    pub fn carries_color(self) -> bool {
        matches!(
            self,
            TokenKind::Color | TokenKind::Gradient | TokenKind::Shadow
        )
    }
}

impl FromStr for TokenKind {
    type Err = TokencastError;

    fn from_str(s: &str) -> Result<Self> {
        // `font` is the older spelling of `fontFamily`.
        if s == "font" {
            return Ok(TokenKind::FontFamily);
        }
        TokenKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| TokencastError::UnsupportedType { kind: s.to_string() })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Composite value types ───────────────────────────────────────────────

/// Stroke style: a CSS keyword or a custom dash pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrokeStyle {
    Keyword(String),
    Custom {
        #[serde(rename = "dashArray")]
        dash_array: Vec<String>,
        #[serde(rename = "lineCap")]
        line_cap: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub color: String,
    pub width: String,
    pub style: StrokeStyle,
}

/// A single shadow layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowLayer {
    pub color: String,
    pub offset_x: String,
    pub offset_y: String,
    pub blur: String,
    pub spread: String,
}

/// A shadow value: one layer or a stack of layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shadow {
    Single(ShadowLayer),
    Layers(Vec<ShadowLayer>),
}

impl Shadow {
    /// Layers in paint order.
    #[must_use]
    pub fn layers(&self) -> &[ShadowLayer] {
        match self {
            Shadow::Single(layer) => std::slice::from_ref(layer),
            Shadow::Layers(layers) => layers,
        }
    }
}

/// A gradient stop; `position` is a fraction in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: String,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_function: Option<[f64; 4]>,
}

/// Format a number the way token authors write it: positional for ordinary
/// magnitudes, `1e+21` / `1.5e-7` style below `1e-6` and from `1e21` up.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }
    let s = format!("{n:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => s,
    }
}

/// Font weight: numeric (`400`) or keyword (`bold`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(f64),
    Keyword(String),
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeight::Numeric(n) => f.write_str(&format_number(*n)),
            FontWeight::Keyword(k) => f.write_str(k),
        }
    }
}

/// Typography sub-properties in document order (`fontFamily`, `fontSize`, ...).
pub type Typography = IndexMap<String, Value>;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

// ── TokenValue ──────────────────────────────────────────────────────────

/// A token value, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenValue {
    Boolean(bool),
    Border(Border),
    Color(String),
    CubicBezier([f64; 4]),
    Dimension(String),
    Duration(String),
    FontFamily(Vec<String>),
    FontWeight(FontWeight),
    Gradient(Vec<GradientStop>),
    Link(String),
    Number(f64),
    Shadow(Shadow),
    String(String),
    StrokeStyle(StrokeStyle),
    Transition(Transition),
    Typography(Typography),
}

impl TokenValue {
    /// Interpret a raw `$value` as a value of the given kind.
    pub fn from_json(kind: TokenKind, value: Value) -> serde_json::Result<Self> {
        use serde_json::from_value;
        Ok(match kind {
            TokenKind::Boolean => TokenValue::Boolean(from_value(value)?),
            TokenKind::Border => TokenValue::Border(from_value(value)?),
            TokenKind::Color => TokenValue::Color(from_value(value)?),
            TokenKind::CubicBezier => TokenValue::CubicBezier(from_value(value)?),
            TokenKind::Dimension => TokenValue::Dimension(from_value(value)?),
            TokenKind::Duration => TokenValue::Duration(from_value(value)?),
            TokenKind::FontFamily => TokenValue::FontFamily(match from_value::<OneOrMany>(value)? {
                OneOrMany::One(name) => vec![name],
                OneOrMany::Many(names) => names,
            }),
            TokenKind::FontWeight => TokenValue::FontWeight(from_value(value)?),
            TokenKind::Gradient => TokenValue::Gradient(from_value(value)?),
            TokenKind::Link => TokenValue::Link(from_value(value)?),
            TokenKind::Number => TokenValue::Number(from_value(value)?),
            TokenKind::Shadow => TokenValue::Shadow(from_value(value)?),
            TokenKind::String => TokenValue::String(from_value(value)?),
            TokenKind::StrokeStyle => TokenValue::StrokeStyle(from_value(value)?),
            TokenKind::Transition => TokenValue::Transition(from_value(value)?),
            TokenKind::Typography => TokenValue::Typography(from_value(value)?),
        })
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenValue::Boolean(_) => TokenKind::Boolean,
            TokenValue::Border(_) => TokenKind::Border,
            TokenValue::Color(_) => TokenKind::Color,
            TokenValue::CubicBezier(_) => TokenKind::CubicBezier,
            TokenValue::Dimension(_) => TokenKind::Dimension,
            TokenValue::Duration(_) => TokenKind::Duration,
            TokenValue::FontFamily(_) => TokenKind::FontFamily,
            TokenValue::FontWeight(_) => TokenKind::FontWeight,
            TokenValue::Gradient(_) => TokenKind::Gradient,
            TokenValue::Link(_) => TokenKind::Link,
            TokenValue::Number(_) => TokenKind::Number,
            TokenValue::Shadow(_) => TokenKind::Shadow,
            TokenValue::String(_) => TokenKind::String,
            TokenValue::StrokeStyle(_) => TokenKind::StrokeStyle,
            TokenValue::Transition(_) => TokenKind::Transition,
            TokenValue::Typography(_) => TokenKind::Typography,
        }
    }

    /// The value in its JSON document form.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

// ── Token ───────────────────────────────────────────────────────────────

/// A normalized design token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Dot-separated identifier, e.g. `color.blue.500`.
    pub id: String,
    pub value: TokenValue,
    pub description: Option<String>,
    /// Raw `$extensions.mode` overrides, keyed by mode name.
    pub modes: IndexMap<String, Value>,
}

impl Token {
    #[must_use]
    pub fn new(id: impl Into<String>, value: TokenValue) -> Self {
        Self {
            id: id.into(),
            value,
            description: None,
            modes: IndexMap::new(),
        }
    }

    /// Add a raw mode override.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>, value: Value) -> Self {
        self.modes.insert(mode.into(), value);
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.value.kind()
    }

    /// Returns `true` if the token carries a non-null value for `mode`.
    #[must_use]
    pub fn has_mode(&self, mode: &str) -> bool {
        self.modes.get(mode).is_some_and(|v| !v.is_null())
    }

    /// Resolve the token value for `mode`, or the base value when `mode` is `None`.
    ///
    /// Object overrides are merged field-wise over an object base value;
    /// anything else replaces the base value. The result is re-read as the
    /// token's kind.
    ///
    /// # Errors
    ///
    /// Returns [`TokencastError::MissingMode`] if the mode is absent, or
    /// [`TokencastError::InvalidToken`] if the merged value does not fit the kind.
    pub fn value_for_mode(&self, mode: Option<&str>) -> Result<Cow<'_, TokenValue>> {
        let Some(mode) = mode else {
            return Ok(Cow::Borrowed(&self.value));
        };
        let overlay = self
            .modes
            .get(mode)
            .filter(|v| !v.is_null())
            .ok_or_else(|| TokencastError::MissingMode {
                id: self.id.clone(),
                mode: mode.to_string(),
            })?;
        let merged = shallow_merge(self.value.to_json()?, overlay);
        let value = TokenValue::from_json(self.kind(), merged).map_err(|e| {
            TokencastError::InvalidToken {
                id: self.id.clone(),
                message: format!("mode \"{mode}\": {e}"),
            }
        })?;
        Ok(Cow::Owned(value))
    }
}

/// Merge `overlay` over `base` one level deep when both are objects.
fn shallow_merge(base: Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut fields), Value::Object(over)) => {
            for (key, value) in over {
                fields.insert(key.clone(), value.clone());
            }
            Value::Object(fields)
        }
        (_, other) => other.clone(),
    }
}

/// Build metadata handed to every plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Display name used in generated file headers.
    pub name: Option<String>,
}
