//! Token Domain Model
//!
//! The canonical token record returned to callers and the normalizer that
//! builds it from whatever shape a backend stored.
//!
//! Normalization is driven entirely by [`TOKEN_FIELDS`]: scalar fields are
//! emitted only when non-null, boolean flags only when true, and the structured
//! `categories`/`logos` fields are always emitted, falling back to an empty
//! value when missing or malformed.

use serde::Serialize;
use serde_json::{Map, Value};

/// A record as read from storage, before normalization
pub type RawTokenRecord = Map<String, Value>;

/// How a field of the canonical record is derived from the raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Copied when present and non-null, otherwise omitted
    OmitIfNull,
    /// Emitted as `true` when set, otherwise omitted
    OmitIfFalse,
    /// Always emitted as a string array, `[]` when absent or malformed
    DefaultList,
    /// Always emitted as a string map, `{}` when absent or malformed
    DefaultMap,
}

/// Field table of the canonical token record
pub const TOKEN_FIELDS: &[(&str, FieldRule)] = &[
    ("blockchain", FieldRule::OmitIfNull),
    ("network", FieldRule::OmitIfNull),
    ("address", FieldRule::OmitIfNull),
    ("ticker", FieldRule::OmitIfNull),
    ("name", FieldRule::OmitIfNull),
    ("symbol", FieldRule::OmitIfNull),
    ("type", FieldRule::OmitIfNull),
    ("decimals", FieldRule::OmitIfNull),
    ("chainId", FieldRule::OmitIfNull),
    ("genesis", FieldRule::OmitIfNull),
    ("expiration", FieldRule::OmitIfNull),
    ("altSymbol", FieldRule::OmitIfNull),
    ("flag", FieldRule::OmitIfNull),
    ("totalSupply", FieldRule::OmitIfNull),
    ("url", FieldRule::OmitIfNull),
    ("testnet", FieldRule::OmitIfFalse),
    ("altCounting", FieldRule::OmitIfFalse),
    ("categories", FieldRule::DefaultList),
    ("logos", FieldRule::DefaultMap),
];

/// Canonical token record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TokenRecord(Map<String, Value>);

impl TokenRecord {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.str_field("address")
    }

    #[must_use]
    pub fn network(&self) -> Option<&str> {
        self.str_field("network")
    }

    #[must_use]
    pub fn ticker(&self) -> Option<&str> {
        self.str_field("ticker")
    }

    #[must_use]
    pub fn testnet(&self) -> bool {
        self.0.contains_key("testnet")
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }
}

/// Normalize a raw stored record into the canonical shape
#[must_use]
pub fn normalize(raw: &RawTokenRecord) -> TokenRecord {
    let mut out = Map::new();

    for &(field, rule) in TOKEN_FIELDS {
        let value = raw.get(field);
        match rule {
            FieldRule::OmitIfNull => {
                if let Some(v) = value.filter(|v| !v.is_null()) {
                    out.insert(field.to_string(), v.clone());
                }
            }
            FieldRule::OmitIfFalse => {
                if value.is_some_and(is_truthy) {
                    out.insert(field.to_string(), Value::Bool(true));
                }
            }
            FieldRule::DefaultList => {
                out.insert(field.to_string(), Value::Array(string_list(value)));
            }
            FieldRule::DefaultMap => {
                out.insert(field.to_string(), Value::Object(string_map(value)));
            }
        }
    }

    TokenRecord(out)
}

/// Flags may be stored as JSON booleans or as SQLite integers
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

/// Structured fields may arrive already decoded or as serialized JSON text
fn decode_structured(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::String(text) => serde_json::from_str(text).ok(),
        other => Some(other.clone()),
    }
}

fn string_list(value: Option<&Value>) -> Vec<Value> {
    match decode_structured(value) {
        Some(Value::Array(items)) => items.into_iter().filter(Value::is_string).collect(),
        _ => Vec::new(),
    }
}

fn string_map(value: Option<&Value>) -> Map<String, Value> {
    match decode_structured(value) {
        Some(Value::Object(entries)) => entries.into_iter().filter(|(_, v)| v.is_string()).collect(),
        _ => Map::new(),
    }
}
