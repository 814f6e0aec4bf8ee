use serde::Serialize;
use serde_json::Value;

use crate::error::{DbAccessError, Result};
use crate::types::SqlValue;

/// Named parameter values extracted from a caller's payload.
///
/// Entries keep the payload's field order: struct fields in declaration
/// order, map entries in insertion order. Stored-procedure calls on engines
/// without named arguments rely on that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, SqlValue)>,
}

impl Parameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a payload into named parameters.
    ///
    /// The payload must serialize to a struct or map; unit and `None` mean no
    /// parameters. Nested objects and arrays are passed as [`SqlValue::Json`].
    pub fn from_serialize<U: Serialize + ?Sized>(payload: &U) -> Result<Self> {
        let value = serde_json::to_value(payload)
            .map_err(|e| DbAccessError::InvalidParameters(e.to_string()))?;

        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => {
                let entries = map
                    .into_iter()
                    .map(|(name, value)| {
                        let value = json_to_sql_value(&name, value)?;
                        Ok((name, value))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self { entries })
            }
            other => Err(DbAccessError::InvalidParameters(format!(
                "payload must serialize to a struct or map, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Add a named parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Look up a parameter by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    /// Index of the parameter with the given name, ignoring ASCII case.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn json_to_sql_value(name: &str, value: Value) -> Result<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Int64(i)
            } else if n.is_u64() {
                return Err(DbAccessError::InvalidParameters(format!(
                    "integer parameter `{}` is out of range: {}",
                    name, n
                )));
            } else {
                // Non-integer numbers always have an f64 form
                SqlValue::Float64(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => SqlValue::Text(s),
        v @ (Value::Array(_) | Value::Object(_)) => SqlValue::Json(v),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}
