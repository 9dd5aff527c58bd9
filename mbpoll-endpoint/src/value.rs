//! Attribute values as returned by a management endpoint.
//!
//! The endpoint adapter converts whatever the wire format carries into this
//! closed set of shapes; nothing downstream inspects runtime types.

use std::fmt;

/// Text used for a null value.
pub const NULL_PLACEHOLDER: &str = "null";

/// A single leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str(NULL_PLACEHOLDER),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            // Debug keeps the fractional part: 1.0 rather than 1
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// One fetched attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum SampledValue {
    Scalar(Scalar),
    /// Ordered sequence; elements may themselves be arrays or composites.
    Array(Vec<SampledValue>),
    /// Named sub-fields in the order the endpoint produced them.
    Composite(Vec<(String, SampledValue)>),
}

impl SampledValue {
    pub fn null() -> Self {
        SampledValue::Scalar(Scalar::Null)
    }

    /// Build a composite from `(key, value)` pairs, keeping their order.
    pub fn composite<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<SampledValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        SampledValue::Composite(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build an array from anything convertible into values.
    pub fn array<V, I>(items: I) -> Self
    where
        V: Into<SampledValue>,
        I: IntoIterator<Item = V>,
    {
        SampledValue::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Text form: scalars as-is, arrays as `[a, b]`, composites as `{k=v}` with
/// keys sorted.
impl fmt::Display for SampledValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampledValue::Scalar(s) => fmt::Display::fmt(s, f),
            SampledValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Display::fmt(item, f)?;
                }
                f.write_str("]")
            }
            SampledValue::Composite(entries) => {
                let mut sorted: Vec<&(String, SampledValue)> = entries.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));

                f.write_str("{")?;
                for (i, (key, value)) in sorted.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<Scalar> for SampledValue {
    fn from(s: Scalar) -> Self {
        SampledValue::Scalar(s)
    }
}

impl From<bool> for SampledValue {
    fn from(b: bool) -> Self {
        SampledValue::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for SampledValue {
    fn from(i: i64) -> Self {
        SampledValue::Scalar(Scalar::Integer(i))
    }
}

impl From<f64> for SampledValue {
    fn from(x: f64) -> Self {
        SampledValue::Scalar(Scalar::Float(x))
    }
}

impl From<&str> for SampledValue {
    fn from(s: &str) -> Self {
        SampledValue::Scalar(Scalar::Text(s.to_string()))
    }
}

impl From<String> for SampledValue {
    fn from(s: String) -> Self {
        SampledValue::Scalar(Scalar::Text(s))
    }
}

impl<T: Into<SampledValue>> From<Option<T>> for SampledValue {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(SampledValue::null, Into::into)
    }
}
