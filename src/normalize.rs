use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::token::{TokenConfig, TokenFeature, MAX_DECIMALS, MAX_TOTAL_SUPPLY};

// Model output promises a single JSON object but routinely arrives fenced,
// single-quoted or with bare keys. Repair is purely textual; no I/O here.

const NORMALIZED_TAX_MAX: i64 = 10;
const DEFAULT_DECIMALS: u8 = 18;
const DEFAULT_TOTAL_SUPPLY: u64 = 1_000_000;

static BARE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*:"#).unwrap());
static BARE_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#":\s*([A-Za-z_][A-Za-z0-9_ -]*[A-Za-z0-9_])\s*([,}\]])"#).unwrap());
static DUPLICATE_COMMAS: Lazy<Regex> = Lazy::new(|| Regex::new(r#",\s*,+"#).unwrap());
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r#",\s*([}\]])"#).unwrap());

#[derive(Debug, Clone)]
pub struct NormalizedMetadata {
    pub config: TokenConfig,
    // Set when the model output was unusable and the fixed record was
    // substituted, so callers can tell the two apart.
    pub fallback: bool,
}

pub fn fallback_config() -> TokenConfig {
    TokenConfig {
        name: "Quantum Flux".to_string(),
        symbol: "QFX".to_string(),
        decimals: DEFAULT_DECIMALS,
        total_supply: DEFAULT_TOTAL_SUPPLY,
        description: "A token born at the edge of the observable market.".to_string(),
        logo_uri: String::new(),
        buy_tax: 0,
        sell_tax: 0,
        features: Vec::new(),
    }
}

/// Slice the completion down to the substring bounded by the first `{` and
/// the last `}`. The model often wraps the object in prose or markdown.
pub fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Apply the fixed repair sequence to a candidate JSON object.
pub fn repair(text: &str) -> String {
    let mut out = text.replace("```json", "").replace("```", "");
    out = out.replace('\'', "\"");
    out = BARE_KEY.replace_all(&out, "$1\"$2\":").to_string();
    out = BARE_VALUE
        .replace_all(&out, |caps: &Captures| {
            let value = caps[1].trim();
            if value == "true" || value == "false" || value == "null" {
                return format!(": {}{}", value, &caps[2]);
            }
            format!(": \"{}\"{}", value, &caps[2])
        })
        .to_string();
    out = DUPLICATE_COMMAS.replace_all(&out, ",").to_string();
    out = TRAILING_COMMA.replace_all(&out, "$1").to_string();
    out.chars().filter(|c| !c.is_control()).collect()
}

/// Turn a raw chat completion into a token configuration. Never errors: if
/// the text cannot be coaxed into a usable object the fixed fallback record
/// is returned with the `fallback` flag set.
pub fn normalize_completion(text: &str) -> NormalizedMetadata {
    let Some(candidate) = extract_object(text) else {
        warn!("No JSON object bounds in model output, using fallback record");
        return NormalizedMetadata {
            config: fallback_config(),
            fallback: true,
        };
    };

    let repaired = repair(candidate);
    debug!("Repaired model output: {}", repaired);

    let value: Value = match serde_json::from_str(&repaired) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model output unparseable after repair: {}", e);
            return NormalizedMetadata {
                config: fallback_config(),
                fallback: true,
            };
        }
    };

    // name and symbol are the only hard requirements; anything else gets a
    // type-correct default.
    let (Some(name), Some(symbol)) = (
        value.get("name").and_then(Value::as_str),
        value.get("symbol").and_then(Value::as_str),
    ) else {
        warn!("Model output missing name or symbol, using fallback record");
        return NormalizedMetadata {
            config: fallback_config(),
            fallback: true,
        };
    };

    let config = TokenConfig {
        name: name.to_string(),
        symbol: symbol.to_string(),
        decimals: coerce_decimals(value.get("decimals")),
        total_supply: coerce_total_supply(value.get("totalSupply")),
        description: value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        logo_uri: value
            .get("logoUri")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        buy_tax: coerce_tax(value.get("buyTax")),
        sell_tax: coerce_tax(value.get("sellTax")),
        features: coerce_features(value.get("features")),
    };

    NormalizedMetadata {
        config,
        fallback: false,
    }
}

fn coerce_decimals(value: Option<&Value>) -> u8 {
    match value.and_then(Value::as_u64) {
        Some(d) if d <= MAX_DECIMALS as u64 => d as u8,
        _ => DEFAULT_DECIMALS,
    }
}

fn coerce_total_supply(value: Option<&Value>) -> u64 {
    match value.and_then(Value::as_u64) {
        Some(s) if s > 0 && s <= MAX_TOTAL_SUPPLY => s,
        _ => DEFAULT_TOTAL_SUPPLY,
    }
}

fn coerce_tax(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    raw.unwrap_or(0).clamp(0, NORMALIZED_TAX_MAX) as u8
}

fn coerce_features(value: Option<&Value>) -> Vec<TokenFeature> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(TokenFeature::parse)
        .collect()
}
