/*!
 * Schema validation for JSON-object completions.
 *
 * A completion is accepted only when it parses as a JSON object, carries no
 * service-reported `error`, has every required field present and non-null,
 * and decodes into the target type.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::SchemaError;

/// Markdown code fence some local models wrap JSON in
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
});

/// A payload type that can be validated from raw completion text
pub trait ResponseSchema: DeserializeOwned {
    /// Human-readable schema name for logs
    const NAME: &'static str;

    /// Fields that must be present and non-null
    const REQUIRED_FIELDS: &'static [&'static str];

    /// Required fields that must also not be blank strings
    const NON_EMPTY_FIELDS: &'static [&'static str] = &[];
}

/// Validate `raw` against the schema `T`
pub fn validate<T: ResponseSchema>(raw: &str) -> Result<T, SchemaError> {
    let object = parse_object(raw)?;

    if let Some(reported) = reported_error(&object) {
        return Err(SchemaError::ServiceReported(reported));
    }

    for field in T::REQUIRED_FIELDS {
        match object.get(*field) {
            None | Some(Value::Null) => return Err(SchemaError::MissingField(field.to_string())),
            _ => {}
        }
    }

    for field in T::NON_EMPTY_FIELDS {
        if let Some(Value::String(s)) = object.get(*field) {
            if s.trim().is_empty() {
                return Err(SchemaError::MissingField(field.to_string()));
            }
        }
    }

    serde_json::from_value(Value::Object(object)).map_err(|e| {
        debug!("{} payload failed to decode: {}", T::NAME, e);
        SchemaError::InvalidShape(e.to_string())
    })
}

/// Parse raw completion text into a JSON object
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, SchemaError> {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(SchemaError::NotAnObject),
        Err(e) => Err(SchemaError::InvalidJson(e.to_string())),
    }
}

/// The service's explicit `error` field, if it carries anything
fn reported_error(object: &Map<String, Value>) -> Option<String> {
    match object.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Deserialize a JSON object into string values, stringifying scalars
///
/// Models occasionally emit numbers or booleans as attribute values.
pub fn string_map<'de, D>(deserializer: D) -> Result<std::collections::BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}
