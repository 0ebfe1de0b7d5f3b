//! Token value → CSS text.

use std::sync::Arc;

use serde_json::Value;

use crate::errors::{Result, TokencastError};
use crate::ident::{format_font_names, kebab_case};
use crate::models::{
    format_number, Border, GradientStop, Shadow, StrokeStyle, Token, TokenValue, Transition, Typography,
};

/// The CSS form of one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssValue {
    /// One custom property.
    Single(String),
    /// One custom property per entry, suffixed with the entry name (typography).
    Group(Vec<(String, String)>),
}

impl From<String> for CssValue {
    fn from(s: String) -> Self {
        CssValue::Single(s)
    }
}

impl From<&str> for CssValue {
    fn from(s: &str) -> Self {
        CssValue::Single(s.to_string())
    }
}

/// User override consulted before [`default_transformer`].
///
/// Receives the token and the mode being emitted (`None` for the base value).
/// Returning `None` falls back to the default transformer.
pub type CssTransform = Arc<dyn Fn(&Token, Option<&str>) -> Option<CssValue> + Send + Sync>;

pub fn transform_color(value: &str) -> String {
    value.to_string()
}

pub fn transform_dimension(value: &str) -> String {
    value.to_string()
}

pub fn transform_duration(value: &str) -> String {
    value.to_string()
}

pub fn transform_font_family(names: &[String]) -> String {
    format_font_names(names)
}

pub fn transform_cubic_bezier(value: &[f64; 4]) -> String {
    let args: Vec<String> = value.iter().copied().map(format_number).collect();
    format!("cubic-bezier({})", args.join(", "))
}

pub fn transform_link(value: &str) -> String {
    format!("url('{value}')")
}

/// Custom dash patterns have no CSS keyword; they fall back to `dashed`.
pub fn transform_stroke_style(value: &StrokeStyle) -> String {
    match value {
        StrokeStyle::Keyword(keyword) => keyword.clone(),
        StrokeStyle::Custom { .. } => "dashed".to_string(),
    }
}

/// `<width> <style> <color>`
pub fn transform_border(value: &Border) -> String {
    [
        transform_dimension(&value.width),
        transform_stroke_style(&value.style),
        transform_color(&value.color),
    ]
    .join(" ")
}

/// `<offsetX> <offsetY> <blur> <spread> <color>`, layers joined by `, `.
pub fn transform_shadow(value: &Shadow) -> String {
    value
        .layers()
        .iter()
        .map(|l| {
            format!(
                "{} {} {} {} {}",
                l.offset_x, l.offset_y, l.blur, l.spread, l.color
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn transform_gradient(stops: &[GradientStop]) -> String {
    stops
        .iter()
        .map(|s| format!("{} {}%", s.color, format_number(s.position * 100.0)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `<duration> [<delay>] [cubic-bezier(a,b,c,d)]`
pub fn transform_transition(value: &Transition) -> String {
    let mut parts = vec![transform_duration(&value.duration)];
    if let Some(delay) = &value.delay {
        parts.push(transform_duration(delay));
    }
    if let Some(tf) = &value.timing_function {
        let args: Vec<String> = tf.iter().copied().map(format_number).collect();
        parts.push(format!("cubic-bezier({})", args.join(",")));
    }
    parts.join(" ")
}

/// One `(kebab-name, value)` entry per typography field, in document order.
pub fn transform_typography(value: &Typography) -> Vec<(String, String)> {
    value
        .iter()
        .map(|(key, v)| (kebab_case(key), typography_field(v)))
        .collect()
}

fn typography_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let names: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            format_font_names(&names)
        }
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), format_number),
        other => other.to_string(),
    }
}

/// CSS text for an already resolved value.
///
/// # Errors
///
/// Returns [`TokencastError::UnsupportedType`] for `boolean` and `string`
/// tokens, which have no CSS representation.
pub fn transform_value(value: &TokenValue) -> Result<CssValue> {
    let text = match value {
        TokenValue::Color(v) => transform_color(v),
        TokenValue::Dimension(v) => transform_dimension(v),
        TokenValue::Duration(v) => transform_duration(v),
        TokenValue::FontFamily(names) => transform_font_family(names),
        TokenValue::FontWeight(w) => w.to_string(),
        TokenValue::Number(n) => format_number(*n),
        TokenValue::CubicBezier(v) => transform_cubic_bezier(v),
        TokenValue::Link(v) => transform_link(v),
        TokenValue::StrokeStyle(v) => transform_stroke_style(v),
        TokenValue::Border(v) => transform_border(v),
        TokenValue::Shadow(v) => transform_shadow(v),
        TokenValue::Gradient(v) => transform_gradient(v),
        TokenValue::Transition(v) => transform_transition(v),
        TokenValue::Typography(v) => return Ok(CssValue::Group(transform_typography(v))),
        TokenValue::Boolean(_) | TokenValue::String(_) => {
            return Err(TokencastError::UnsupportedType {
                kind: value.kind().to_string(),
            })
        }
    };
    Ok(CssValue::Single(text))
}

/// Default CSS transform for a token, optionally in a mode.
///
/// # Errors
///
/// Fails if the mode is missing on the token, the merged mode value is
/// malformed, or the token kind has no CSS form.
pub fn default_transformer(token: &Token, mode: Option<&str>) -> Result<CssValue> {
    let value = token.value_for_mode(mode)?;
    transform_value(&value)
}
