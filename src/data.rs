//! Cell values and the coercion helpers shared by inference and validation.
//!
//! Every cell is a [`Value`]; the CSV reader assigns the variant once per
//! column (see [`SourceKind`]) and the analyzer and validator only ever
//! pattern-match on it.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

// NaN equals NaN; `Hash` below relies on it.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            // 0.0 and -0.0 compare equal, so they must hash equal too
            Value::Float(f) if *f == 0.0 => 0u64.hash(state),
            Value::Float(f) if f.is_nan() => f64::NAN.to_bits().hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Timestamp(ts) => ts.hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 {
                    format!("{f:.1}")
                } else {
                    f.to_string()
                }
            }
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Length in characters of the value's textual form.
    pub fn char_len(&self) -> usize {
        match self {
            Value::Text(s) => s.chars().count(),
            other => other.as_display().chars().count(),
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Integer(i) => Some(Number::Integer(*i)),
            Value::Float(f) if !f.is_nan() => Some(Number::Float(*f)),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            Value::Text(s) => parse_timestamp(s).ok(),
            _ => None,
        }
    }

    pub fn is_boolean_token(&self) -> bool {
        match self {
            Value::Boolean(_) => true,
            Value::Integer(i) => matches!(i, 0 | 1),
            Value::Float(f) => *f == 0.0 || *f == 1.0,
            Value::Text(s) => parse_boolean_token(s).is_some(),
            Value::Null | Value::Timestamp(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Raw storage kind of a column, before any SQL type is inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Integer,
    Float,
    Boolean,
    DateTime,
    Text,
    Mixed,
}

impl SourceKind {
    /// Classifies a column by the variants of its non-null values.
    ///
    /// Integers mixed with floats widen to `Float`; any other combination is
    /// `Mixed`. A column without non-null values is `Text`.
    pub fn of(values: &[Value]) -> Self {
        let mut kind: Option<SourceKind> = None;
        for value in values {
            let current = match value {
                Value::Null => continue,
                Value::Boolean(_) => SourceKind::Boolean,
                Value::Integer(_) => SourceKind::Integer,
                Value::Float(_) => SourceKind::Float,
                Value::Timestamp(_) => SourceKind::DateTime,
                Value::Text(_) => SourceKind::Text,
            };
            kind = Some(match (kind, current) {
                (None, current) => current,
                (Some(existing), current) if existing == current => existing,
                (Some(SourceKind::Integer), SourceKind::Float)
                | (Some(SourceKind::Float), SourceKind::Integer) => SourceKind::Float,
                _ => return SourceKind::Mixed,
            });
        }
        kind.unwrap_or(SourceKind::Text)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SourceKind::Integer | SourceKind::Float)
    }

    pub fn is_textual(self) -> bool {
        matches!(self, SourceKind::Text | SourceKind::Mixed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Integer => "integer",
            SourceKind::Float => "float",
            SourceKind::Boolean => "boolean",
            SourceKind::DateTime => "datetime",
            SourceKind::Text => "text",
            SourceKind::Mixed => "mixed",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Returns the integer value when no fractional part would be discarded
    /// and the value fits in an `i64`.
    pub fn as_integer(self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(i),
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 => float_to_i64(f),
            Number::Float(_) => None,
        }
    }
}

pub fn float_to_i64(value: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; 2^63 is the first value past it.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    (value >= -UPPER && value < UPPER).then_some(value as i64)
}

pub fn parse_number(value: &str) -> Option<Number> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Some(Number::Integer(parsed));
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Some(Number::Float(parsed)),
        _ => None,
    }
}

pub fn parse_boolean_token(value: &str) -> Option<bool> {
    let lowered = value.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "true" | "t" | "yes" | "1" => Some(true),
        "false" | "f" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Parses a date, a date-time, or an RFC 3339 timestamp (normalized to UTC).
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(parsed) = parse_naive_datetime(trimmed) {
        return Ok(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }
    parse_naive_date(trimmed)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| anyhow!("Failed to parse '{value}' as timestamp"))
}
