//! SQL column types produced by inference and checked by validation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::SqlTypeError;

pub const SMALLINT_MIN: i64 = -32_768;
pub const SMALLINT_MAX: i64 = 32_767;
pub const INTEGER_MIN: i64 = -2_147_483_648;
pub const INTEGER_MAX: i64 = 2_147_483_647;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SqlType {
    SmallInt,
    Integer,
    BigInt,
    Double,
    Real,
    Numeric(Option<(u32, u32)>),
    Decimal(Option<(u32, u32)>),
    Boolean,
    Timestamp,
    Varchar(usize),
    Text,
}

impl SqlType {
    /// Narrowest integer tier whose bounds contain both `min` and `max`.
    pub fn for_integer_range(min: i64, max: i64) -> Self {
        if SMALLINT_MIN <= min && max <= SMALLINT_MAX {
            SqlType::SmallInt
        } else if INTEGER_MIN <= min && max <= INTEGER_MAX {
            SqlType::Integer
        } else {
            SqlType::BigInt
        }
    }

    pub fn for_text_length(max_length: usize, max_varchar_length: usize) -> Self {
        if max_length <= max_varchar_length {
            SqlType::Varchar(max_length)
        } else {
            SqlType::Text
        }
    }

    /// The keyword before any parenthesized modifier.
    pub fn base_keyword(&self) -> &'static str {
        match self {
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Real => "REAL",
            SqlType::Numeric(_) => "NUMERIC",
            SqlType::Decimal(_) => "DECIMAL",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Varchar(_) => "VARCHAR",
            SqlType::Text => "TEXT",
        }
    }

    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            SqlType::SmallInt => Some((SMALLINT_MIN, SMALLINT_MAX)),
            SqlType::Integer => Some((INTEGER_MIN, INTEGER_MAX)),
            SqlType::BigInt => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Varchar(length) => write!(f, "VARCHAR({length})"),
            SqlType::Numeric(Some((precision, scale)))
            | SqlType::Decimal(Some((precision, scale))) => {
                write!(f, "{}({precision},{scale})", self.base_keyword())
            }
            other => f.write_str(other.base_keyword()),
        }
    }
}

impl FromStr for SqlType {
    type Err = SqlTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        let (base, modifier) = match normalized.find('(') {
            Some(start) => {
                let inner = normalized[start + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| SqlTypeError::InvalidModifier(value.to_string()))?;
                (normalized[..start].trim(), Some(inner.trim()))
            }
            None => (normalized.as_str(), None),
        };
        let base = base.split_whitespace().collect::<Vec<_>>().join(" ");

        let parsed = match base.as_str() {
            "SMALLINT" | "INT2" => SqlType::SmallInt,
            "INTEGER" | "INT" | "INT4" => SqlType::Integer,
            "BIGINT" | "INT8" => SqlType::BigInt,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => SqlType::Double,
            "REAL" | "FLOAT4" => SqlType::Real,
            "NUMERIC" => SqlType::Numeric(parse_precision(value, modifier)?),
            "DECIMAL" => SqlType::Decimal(parse_precision(value, modifier)?),
            "BOOLEAN" | "BOOL" => SqlType::Boolean,
            "TIMESTAMP" => SqlType::Timestamp,
            "VARCHAR" | "CHARACTER VARYING" => {
                let length = modifier
                    .ok_or_else(|| SqlTypeError::MissingLength(value.to_string()))?
                    .parse::<usize>()
                    .map_err(|_| SqlTypeError::InvalidModifier(value.to_string()))?;
                return Ok(SqlType::Varchar(length));
            }
            "TEXT" => SqlType::Text,
            _ => return Err(SqlTypeError::Unknown(value.to_string())),
        };
        if modifier.is_some() && !matches!(parsed, SqlType::Numeric(_) | SqlType::Decimal(_)) {
            return Err(SqlTypeError::InvalidModifier(value.to_string()));
        }
        Ok(parsed)
    }
}

fn parse_precision(original: &str, modifier: Option<&str>) -> Result<Option<(u32, u32)>, SqlTypeError> {
    let Some(modifier) = modifier else {
        return Ok(None);
    };
    let invalid = || SqlTypeError::InvalidModifier(original.to_string());
    let mut parts = modifier.split(',').map(str::trim);
    let precision = parts
        .next()
        .and_then(|p| p.parse::<u32>().ok())
        .ok_or_else(invalid)?;
    let scale = match parts.next() {
        Some(s) => s.parse::<u32>().map_err(|_| invalid())?,
        None => 0,
    };
    if parts.next().is_some() || scale > precision {
        return Err(invalid());
    }
    Ok(Some((precision, scale)))
}

impl Serialize for SqlType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SqlType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        SqlType::from_str(&token).map_err(de::Error::custom)
    }
}
