//! Scalar cell values and key equality
//!
//! A cell is either missing, a number or text. Key comparison goes through
//! [`KeyRef`], which folds integral floats onto integers and NaN onto
//! missing so that `1`, `1.0` and `1.00` land on the same key.

use serde::{Serialize, Serializer};
use std::fmt;

/// Display token for a missing value in duplicate reports
pub const MISSING_TOKEN: &str = "\"\"";

/// A single cell value
#[derive(Debug, Clone)]
pub enum Scalar {
    /// Empty cell or NA marker
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Build a text scalar
    pub fn text(s: impl Into<String>) -> Self {
        Scalar::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.key(), KeyRef::Missing)
    }

    /// Canonical form used for hashing and equality
    pub fn key(&self) -> KeyRef<'_> {
        match self {
            Scalar::Missing => KeyRef::Missing,
            Scalar::Int(i) => KeyRef::Int(*i),
            Scalar::Float(f) => float_key(*f),
            Scalar::Text(s) => KeyRef::Text(s),
        }
    }

    /// Value as written back into a CSV field (missing is an empty field)
    pub fn to_field(&self) -> String {
        match self {
            Scalar::Missing => String::new(),
            other => other.to_string(),
        }
    }
}

fn float_key(f: f64) -> KeyRef<'static> {
    if f.is_nan() {
        return KeyRef::Missing;
    }
    // i64::MIN is exactly representable, i64::MAX rounds up to 2^63
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return KeyRef::Int(f as i64);
    }
    KeyRef::Float(f.to_bits())
}

/// Borrowed canonical key. Two scalars are the same key iff their `KeyRef`s
/// are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRef<'a> {
    Missing,
    Int(i64),
    /// Bit pattern of a finite, non-integral float or an infinity
    Float(u64),
    Text(&'a str),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Scalar {}

impl std::hash::Hash for Scalar {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Scalar {
    /// Canonical display conversion used for every report
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Missing => f.write_str(MISSING_TOKEN),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) if x.is_nan() => f.write_str(MISSING_TOKEN),
            // Debug keeps the trailing `.0` on integral floats
            Scalar::Float(x) => write!(f, "{:?}", x),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Missing => serializer.serialize_none(),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            Scalar::Float(_) => serializer.serialize_none(),
            Scalar::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_equality_across_int_and_float() {
        assert_eq!(Scalar::Int(1), Scalar::Float(1.0));
        assert_eq!(Scalar::Float(-0.0), Scalar::Int(0));
        assert_ne!(Scalar::Float(1.5), Scalar::Int(1));
    }

    #[test]
    fn test_text_never_equals_number() {
        assert_ne!(Scalar::text("1"), Scalar::Int(1));
        assert_ne!(Scalar::text(""), Scalar::Missing);
    }

    #[test]
    fn test_missing_and_nan_are_one_key() {
        assert_eq!(Scalar::Missing, Scalar::Missing);
        assert_eq!(Scalar::Float(f64::NAN), Scalar::Missing);
        assert!(Scalar::Float(f64::NAN).is_missing());
    }

    #[test]
    fn test_text_is_case_and_space_sensitive() {
        assert_ne!(Scalar::text("Alice"), Scalar::text("alice"));
        assert_ne!(Scalar::text("alice "), Scalar::text("alice"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::Int(-7).to_string(), "-7");
        assert_eq!(Scalar::Float(2.0).to_string(), "2.0");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
        assert_eq!(Scalar::text("abc").to_string(), "abc");
        assert_eq!(Scalar::Missing.to_string(), "\"\"");
        assert_eq!(Scalar::Float(f64::NAN).to_string(), "\"\"");
    }

    #[test]
    fn test_to_field_writes_missing_as_empty() {
        assert_eq!(Scalar::Missing.to_field(), "");
        assert_eq!(Scalar::Int(3).to_field(), "3");
    }

    #[test]
    fn test_large_floats_do_not_overflow_into_int_keys() {
        let big = Scalar::Float(1e19);
        assert!(matches!(big.key(), KeyRef::Float(_)));
        assert_eq!(Scalar::Float(f64::INFINITY), Scalar::Float(f64::INFINITY));
    }
}
