//! Response normalizer: untrusted backend text → fully-populated `Analysis`.
//!
//! Parsing is a two-step affair. First the text is parsed into a generic JSON
//! object (failure → the fixed fallback analysis). Then each of the seven keys
//! is coerced independently, so one bad field never discards the others.

use serde_json::{Map, Value};
use tracing::warn;

use crate::qualification::models::{Analysis, BuyingIntent, UrgencyLevel};

pub const FALLBACK_PAIN_POINT: &str = "Analysis failed - manual review needed";
pub const FALLBACK_RECOMMENDED_ACTION: &str = "Manual review required";

/// How the raw text was turned into an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// Parsed as a JSON object; individual fields may still have been defaulted.
    Parsed,
    /// Not a JSON object; the fixed fallback analysis was returned.
    Fallback,
}

/// The analysis returned whenever the backend text is not a JSON object.
pub fn fallback_analysis() -> Analysis {
    Analysis {
        industry: Some("Unknown".to_string()),
        company_size: Some("Unknown".to_string()),
        budget_signals: vec![],
        pain_points: vec![FALLBACK_PAIN_POINT.to_string()],
        urgency_level: UrgencyLevel::Medium,
        buying_intent: BuyingIntent::Exploring,
        recommended_action: FALLBACK_RECOMMENDED_ACTION.to_string(),
    }
}

/// Total over all inputs: never fails, never panics.
#[allow(dead_code)] // the pipeline uses `normalize_with_outcome`
pub fn normalize(raw: &str) -> Analysis {
    normalize_with_outcome(raw).0
}

pub fn normalize_with_outcome(raw: &str) -> (Analysis, NormalizeOutcome) {
    let cleaned = strip_code_fence(raw);

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(fields)) => (coerce_fields(&fields), NormalizeOutcome::Parsed),
        Ok(other) => {
            warn!(
                "Backend returned JSON {} instead of an object; using fallback analysis",
                json_kind(&other)
            );
            (fallback_analysis(), NormalizeOutcome::Fallback)
        }
        Err(e) => {
            warn!("Failed to parse backend response as JSON: {e}");
            warn!("Response was: {raw}");
            (fallback_analysis(), NormalizeOutcome::Fallback)
        }
    }
}

/// Strips at most one leading "```json" / "```" marker and one trailing "```".
/// Text without a fence comes back trimmed and otherwise unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

fn coerce_fields(fields: &Map<String, Value>) -> Analysis {
    let defaults = Analysis::default();

    Analysis {
        industry: coerce_string(fields.get("industry")),
        company_size: coerce_string(fields.get("company_size")),
        budget_signals: coerce_string_list(fields.get("budget_signals")),
        pain_points: coerce_string_list(fields.get("pain_points")),
        urgency_level: coerce_string(fields.get("urgency_level"))
            .map(UrgencyLevel::from)
            .unwrap_or(defaults.urgency_level),
        buying_intent: coerce_string(fields.get("buying_intent"))
            .map(BuyingIntent::from)
            .unwrap_or(defaults.buying_intent),
        recommended_action: coerce_string(fields.get("recommended_action"))
            .unwrap_or(defaults.recommended_action),
    }
}

/// Non-empty trimmed string, or `None` for anything else.
fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

/// Arrays keep string/number/bool items; a lone string becomes a one-item list.
fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(_)) => coerce_string(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
