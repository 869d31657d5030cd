/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Helpers over opaque response payloads.
//!
//! Domain records are passed through as `serde_json::Value`; these helpers
//! only look at the few fields the client itself needs.

use crate::constants::RAW_RESPONSE_KEY;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Items of a collection response, which is either a bare array or `{"items": [...]}`
#[must_use]
pub fn items(response: &Value) -> &[Value] {
    match response {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("items") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    }
}

/// String value of `field` on `item`, if present and a string
#[must_use]
pub fn str_field<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field).and_then(Value::as_str)
}

/// Wraps a successful body that is not valid JSON
#[must_use]
pub fn raw_response(text: &str) -> Value {
    let mut map = Map::new();
    map.insert(RAW_RESPONSE_KEY.to_string(), Value::String(text.to_string()));
    Value::Object(map)
}

/// Text carried by a payload produced by [`raw_response`]
#[must_use]
pub fn raw_text(response: &Value) -> Option<&str> {
    match response {
        Value::Object(map) if map.len() == 1 => map.get(RAW_RESPONSE_KEY).and_then(Value::as_str),
        _ => None,
    }
}

/// Whether the payload is empty: null, `{}`, an empty string or an empty raw body
#[must_use]
pub fn is_empty_result(response: &Value) -> bool {
    match response {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) if map.is_empty() => true,
        _ => raw_text(response).is_some_and(|t| t.trim().is_empty()),
    }
}

/// The identifier, if the payload is only an identifier and not a record
///
/// Covers a JSON string (`"3f25..."`) and a raw body holding the id unquoted.
#[must_use]
pub fn bare_identifier(response: &Value) -> Option<String> {
    let text = match response {
        Value::String(s) => s.as_str(),
        _ => raw_text(response)?,
    };
    let id = text.trim().trim_matches('"');
    (!id.is_empty()).then(|| id.to_string())
}

/// Whether the payload is empty or merely an identifier, i.e. not a full record
#[must_use]
pub fn is_bare_result(response: &Value) -> bool {
    is_empty_result(response) || bare_identifier(response).is_some()
}

/// Parses the `errors` map of a 400 body: `{"errors": {"field": ["msg", ...]}}`
///
/// Single string messages are accepted as well. Returns `None` if the body
/// carries no such map.
#[must_use]
pub fn field_errors(body: &Value) -> Option<BTreeMap<String, Vec<String>>> {
    let errors = body.get("errors")?.as_object()?;
    let fields = errors
        .iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::Array(list) => list
                    .iter()
                    .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_string))
                    .collect(),
                Value::String(s) => vec![s.clone()],
                other => vec![other.to_string()],
            };
            (field.clone(), messages)
        })
        .collect();
    Some(fields)
}
