//! Request validation from declarative per-field rules.

use chrono::{DateTime, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for errors that concern the payload as a whole.
pub const SCHEMA_KEY: &str = "_schema";

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    DateTime,
    IntegerList,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            name,
            kind,
            required: true,
            min_length: None,
            max_length: None,
            minimum: None,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            required: false,
            ..FieldRule::required(name, kind)
        }
    }

    pub const fn min_length(self, n: usize) -> Self {
        FieldRule {
            min_length: Some(n),
            ..self
        }
    }

    pub const fn max_length(self, n: usize) -> Self {
        FieldRule {
            max_length: Some(n),
            ..self
        }
    }

    pub const fn minimum(self, n: f64) -> Self {
        FieldRule {
            minimum: Some(n),
            ..self
        }
    }
}

/// Input schema of one resource: validated fields plus keys that are accepted and dropped.
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [FieldRule],
    pub ignored: &'static [&'static str],
}

/// Field name to every message raised for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, msgs)| format!("{}: {}", field, msgs.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against the schema, collecting every failure. Returns the declared
    /// fields only, with datetimes normalised to naive UTC.
    pub fn validate(body: &Value, schema: &Schema) -> Result<Map<String, Value>, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let obj = match body {
            Value::Object(m) => m,
            _ => {
                errors.add(SCHEMA_KEY, "Invalid input type.");
                return Err(errors);
            }
        };

        for key in obj.keys() {
            let known = schema.fields.iter().any(|r| r.name == key) || schema.ignored.contains(&key.as_str());
            if !known {
                errors.add(key, "Unknown field.");
            }
        }

        let mut out = Map::new();
        for rule in schema.fields {
            match obj.get(rule.name) {
                None if rule.required => errors.add(rule.name, "Missing data for required field."),
                None => {}
                Some(Value::Null) if rule.required => errors.add(rule.name, "Field may not be null."),
                Some(Value::Null) => {
                    out.insert(rule.name.to_string(), Value::Null);
                }
                Some(v) => match validate_field(rule, v) {
                    Ok(clean) => {
                        out.insert(rule.name.to_string(), clean);
                    }
                    Err(msgs) => {
                        for m in msgs {
                            errors.add(rule.name, m);
                        }
                    }
                },
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }

    /// Validate and deserialize into the typed input record.
    pub fn load<T: DeserializeOwned>(body: &Value, schema: &Schema) -> Result<T, ValidationErrors> {
        let clean = Self::validate(body, schema)?;
        serde_json::from_value(Value::Object(clean)).map_err(|e| {
            let mut errors = ValidationErrors::default();
            errors.add(SCHEMA_KEY, e.to_string());
            errors
        })
    }
}

fn validate_field(rule: &FieldRule, v: &Value) -> Result<Value, Vec<String>> {
    let clean = match rule.kind {
        FieldKind::String => match v.as_str() {
            Some(_) => v.clone(),
            None => return Err(vec!["Not a valid string.".into()]),
        },
        FieldKind::Integer => match as_integer(v) {
            Some(n) => Value::Number(n.into()),
            None => return Err(vec!["Not a valid integer.".into()]),
        },
        FieldKind::Number => match as_number(v) {
            Some(n) => number_value(n, v),
            None => return Err(vec!["Not a valid number.".into()]),
        },
        FieldKind::DateTime => match v.as_str().and_then(parse_datetime) {
            Some(dt) => Value::String(dt.format(NAIVE_FORMAT).to_string()),
            None => return Err(vec!["Not a valid datetime.".into()]),
        },
        FieldKind::IntegerList => {
            let items = match v.as_array() {
                Some(items) => items,
                None => return Err(vec!["Not a valid list.".into()]),
            };
            let mut ids = Vec::with_capacity(items.len());
            let mut msgs = Vec::new();
            for (i, item) in items.iter().enumerate() {
                match as_integer(item) {
                    Some(n) => ids.push(Value::Number(n.into())),
                    None => msgs.push(format!("{}: Not a valid integer.", i)),
                }
            }
            if !msgs.is_empty() {
                return Err(msgs);
            }
            Value::Array(ids)
        }
    };

    let mut msgs = Vec::new();
    if let Some(s) = clean.as_str() {
        let len = s.chars().count();
        if let Some(min) = rule.min_length {
            if len < min {
                msgs.push(format!("Shorter than minimum length {}.", min));
            }
        }
        if let Some(max) = rule.max_length {
            if len > max {
                msgs.push(format!("Longer than maximum length {}.", max));
            }
        }
    }
    if let Some(min) = rule.minimum {
        if let Some(n) = clean.as_f64() {
            if n < min {
                msgs.push(format!("Must be greater than or equal to {}.", min));
            }
        }
    }
    if msgs.is_empty() {
        Ok(clean)
    } else {
        Err(msgs)
    }
}

/// Finite numbers and numeric strings are accepted.
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// JSON numbers pass through unchanged; parsed strings become numbers.
fn number_value(n: f64, original: &Value) -> Value {
    match original {
        Value::Number(_) => original.clone(),
        _ => serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
    }
}

/// Integers, integral floats and numeric strings are accepted.
fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, NAIVE_FORMAT).ok()
}
