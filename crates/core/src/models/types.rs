//! Scalar data types for contract fields
//!
//! The loader normalizes the loosely-typed `type:` strings of a contract
//! document into [`DataType`]. Aliases collapse to one variant so that
//! `integer` and `int` compare equal. Nested containers (`object`, `record`,
//! `struct`, arrays of objects) are not scalar types and are represented by
//! [`FieldKind::Nested`](super::field::FieldKind) instead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of integer digits a decimal needs to hold every 32-bit integer
const INT_DIGITS: u32 = 10;
/// Number of integer digits a decimal needs to hold every 64-bit integer
const LONG_DIGITS: u32 = 19;

/// Scalar field type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    String,
    Varchar,
    Int,
    Long,
    Float,
    Double,
    /// Fixed-point number; `None` precision means unbounded
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    /// Any numeric value
    Number,
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    TimestampNtz,
    Bytes,
    Null,
    Map,
    /// Array of scalars; `None` when the element type is not declared
    Array(Option<Box<DataType>>),
}

/// Whether values of an old type remain valid under a new type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Identical,
    /// Every old value is representable in the new type
    Widened,
    /// Values may be lost or fail to cast
    Incompatible,
}

impl DataType {
    /// Compare an old type with its replacement
    pub fn compatibility(&self, new: &DataType) -> Compatibility {
        use DataType::*;

        if self == new {
            return Compatibility::Identical;
        }

        let widened = match (self, new) {
            (Null, _) => true,
            (Varchar, String) => true,
            (Int, Long | Double | Number) => true,
            (Int, Decimal { precision, scale }) => holds_integer(*precision, *scale, INT_DIGITS),
            (Long, Number) => true,
            (Long, Decimal { precision, scale }) => holds_integer(*precision, *scale, LONG_DIGITS),
            (Float, Double | Number) => true,
            (Double, Number) => true,
            (Decimal { .. }, Number) => true,
            (
                Decimal {
                    precision: old_p,
                    scale: old_s,
                },
                Decimal {
                    precision: new_p,
                    scale: new_s,
                },
            ) => decimal_widens((*old_p, *old_s), (*new_p, *new_s)),
            (Date, Timestamp | TimestampNtz) => true,
            (Array(Some(_)), Array(None)) => true,
            (Array(Some(old)), Array(Some(new))) => {
                return old.compatibility(new);
            }
            _ => false,
        };

        if widened {
            Compatibility::Widened
        } else {
            Compatibility::Incompatible
        }
    }

    /// Check whether this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int
                | DataType::Long
                | DataType::Float
                | DataType::Double
                | DataType::Decimal { .. }
                | DataType::Number
        )
    }

    /// Check whether this is a textual type
    pub fn is_textual(&self) -> bool {
        matches!(self, DataType::String | DataType::Varchar)
    }
}

fn holds_integer(precision: Option<u32>, scale: Option<u32>, digits: u32) -> bool {
    match precision {
        None => true,
        Some(p) => p.saturating_sub(scale.unwrap_or(0)) >= digits,
    }
}

fn decimal_widens(old: (Option<u32>, Option<u32>), new: (Option<u32>, Option<u32>)) -> bool {
    let (old_p, old_s) = old;
    let (new_p, new_s) = new;
    let old_s = old_s.unwrap_or(0);
    let new_s = new_s.unwrap_or(0);
    if new_s < old_s {
        return false;
    }
    match (old_p, new_p) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(op), Some(np)) => np.saturating_sub(new_s) >= op.saturating_sub(old_s),
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => write!(f, "string"),
            DataType::Varchar => write!(f, "varchar"),
            DataType::Int => write!(f, "int"),
            DataType::Long => write!(f, "long"),
            DataType::Float => write!(f, "float"),
            DataType::Double => write!(f, "double"),
            DataType::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "decimal({},{})", p, s),
                (Some(p), None) => write!(f, "decimal({})", p),
                _ => write!(f, "decimal"),
            },
            DataType::Number => write!(f, "number"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::Timestamp => write!(f, "timestamp"),
            DataType::TimestampTz => write!(f, "timestamp_tz"),
            DataType::TimestampNtz => write!(f, "timestamp_ntz"),
            DataType::Bytes => write!(f, "bytes"),
            DataType::Null => write!(f, "null"),
            DataType::Map => write!(f, "map"),
            DataType::Array(None) => write!(f, "array"),
            DataType::Array(Some(items)) => write!(f, "array<{}>", items),
        }
    }
}

/// Error returned when a type name is not part of the closed type set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data type '{0}'")]
pub struct UnknownDataType(pub String);

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        if let Some(inner) = lower
            .strip_prefix("array<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            let items: DataType = inner.parse().map_err(|_| UnknownDataType(s.to_string()))?;
            return Ok(DataType::Array(Some(Box::new(items))));
        }

        if let Some(args) = lower
            .strip_prefix("decimal(")
            .or_else(|| lower.strip_prefix("numeric("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut parts = args.split(',').map(|p| p.trim().parse::<u32>());
            let precision = match parts.next() {
                Some(Ok(p)) => Some(p),
                _ => return Err(UnknownDataType(s.to_string())),
            };
            let scale = match parts.next() {
                Some(Ok(v)) => Some(v),
                Some(Err(_)) => return Err(UnknownDataType(s.to_string())),
                None => None,
            };
            if parts.next().is_some() {
                return Err(UnknownDataType(s.to_string()));
            }
            return Ok(DataType::Decimal { precision, scale });
        }

        let data_type = match lower.as_str() {
            "string" | "text" => DataType::String,
            "varchar" => DataType::Varchar,
            "int" | "integer" => DataType::Int,
            "long" | "bigint" => DataType::Long,
            "float" => DataType::Float,
            "double" => DataType::Double,
            "decimal" | "numeric" => DataType::Decimal {
                precision: None,
                scale: None,
            },
            "number" => DataType::Number,
            "boolean" | "bool" => DataType::Boolean,
            "date" => DataType::Date,
            "time" => DataType::Time,
            "timestamp" => DataType::Timestamp,
            "timestamp_tz" => DataType::TimestampTz,
            "timestamp_ntz" => DataType::TimestampNtz,
            "bytes" => DataType::Bytes,
            "null" => DataType::Null,
            "map" => DataType::Map,
            "array" => DataType::Array(None),
            _ => return Err(UnknownDataType(s.to_string())),
        };
        Ok(data_type)
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
